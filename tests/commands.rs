//! Command integration tests

mod common;

use common::TestContext;
use docfixture::{DocumentStore, cmd_check_dump, cmd_inspect, cmd_populate};
use serde_json::json;

fn write_config(ctx: &TestContext, extra: &str) -> std::path::PathBuf {
    let path = ctx.root().join("docfixture.toml");
    let store = ctx.root().join("store.db");
    std::fs::write(
        &path,
        format!(
            "dsn = \"docdb://{}/app_test\"\ndump = \"tests/_data/dump.js\"\n{extra}",
            store.display()
        ),
    )
    .unwrap();
    path
}

#[test]
fn test_populate_writes_dump_into_store() {
    let ctx = TestContext::default();
    let config = write_config(&ctx, "populate = false\n");

    // populate is forced on regardless of the config flag
    cmd_populate(Some(config.as_path())).unwrap();

    let store = DocumentStore::open(&ctx.root().join("store.db")).unwrap();
    assert_eq!(store.count("app_test", "users", &json!({})).unwrap(), 2);
    assert_eq!(store.count("app_test", "posts", &json!({})).unwrap(), 2);
}

#[test]
fn test_populate_twice_is_idempotent() {
    let ctx = TestContext::default();
    let config = write_config(&ctx, "");

    cmd_populate(Some(config.as_path())).unwrap();
    cmd_populate(Some(config.as_path())).unwrap();

    let store = DocumentStore::open(&ctx.root().join("store.db")).unwrap();
    assert_eq!(store.count("app_test", "users", &json!({})).unwrap(), 2);
}

#[test]
fn test_inspect_and_check_dump() {
    let ctx = TestContext::default();
    let config = write_config(&ctx, "");

    cmd_populate(Some(config.as_path())).unwrap();
    cmd_inspect(Some(config.as_path()), None, "json").unwrap();
    cmd_inspect(Some(config.as_path()), Some("empty_db".into()), "table").unwrap();
    cmd_check_dump(Some(config.as_path())).unwrap();
}

#[test]
fn test_check_dump_reports_missing_file() {
    let ctx = TestContext::default();
    std::fs::remove_file(ctx.dump_path()).unwrap();
    let config = write_config(&ctx, "");

    let err = cmd_check_dump(Some(config.as_path())).unwrap_err();
    assert!(err.to_string().contains("doesn't exist"));
}

#[test]
fn test_check_dump_reports_syntax_errors() {
    let ctx = TestContext::with_dump("db.users.update({}, {});\n");
    let config = write_config(&ctx, "");

    assert!(cmd_check_dump(Some(config.as_path())).is_err());
}
