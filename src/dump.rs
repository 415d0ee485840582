//! Dump files: resolution, emptiness detection and the insertion script parser
//!
//! A dump is a script of insertion statements:
//!
//! ```text
//! /* seed users */
//! db.users.insert({"name": "john"});
//! db.getCollection("audit.log").insertMany([{"at": 1}, {"at": 2}]);
//! ```

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::{Error, Result, StoreError, StoreResult};

static BLOCK_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("block comment pattern"));

/// Remove `/* ... */` block comments
pub fn strip_block_comments(content: &str) -> Cow<'_, str> {
    BLOCK_COMMENT.replace_all(content, "")
}

/// True when nothing but block comments and whitespace remains
pub fn is_effectively_empty(content: &str) -> bool {
    strip_block_comments(content)
        .trim()
        .lines()
        .all(|line| line.trim().is_empty())
}

/// A dump file resolved at suite initialization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpFile {
    path: PathBuf,
    is_empty: bool,
}

impl DumpFile {
    /// Resolve `dump` against `project_root` and inspect its content
    pub fn resolve(project_root: &Path, dump: &Path) -> Result<Self> {
        let candidate = if dump.is_absolute() {
            dump.to_path_buf()
        } else {
            project_root.join(dump)
        };

        if !candidate.is_file() {
            return Err(Error::Configuration(format!(
                "File with dump doesn't exist: {}. Please, check path for dump file",
                candidate.display()
            )));
        }

        let path = candidate.canonicalize().map_err(|e| {
            Error::Configuration(format!("Failed to resolve {}: {e}", candidate.display()))
        })?;
        let content = std::fs::read_to_string(&path).map_err(|e| {
            Error::Configuration(format!("Failed to read dump {}: {e}", path.display()))
        })?;

        Ok(Self {
            is_empty: is_effectively_empty(&content),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_empty(&self) -> bool {
        self.is_empty
    }
}

/// One insertion statement from a dump script
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub line: usize,
    pub collection: String,
    pub documents: Vec<Value>,
}

/// Parse a dump script into insertion statements
pub fn parse_script(source: &str) -> StoreResult<Vec<Statement>> {
    let mut scanner = Scanner::new(source);
    let mut statements = Vec::new();

    loop {
        scanner.skip_trivia()?;
        if scanner.at_end() {
            break;
        }
        statements.push(scanner.statement()?);
    }

    Ok(statements)
}

struct Scanner<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0, line: 1 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn error(&self, reason: impl Into<String>) -> StoreError {
        StoreError::DumpSyntax {
            line: self.line,
            reason: reason.into(),
        }
    }

    /// Skip one block or line comment at the current position, if any
    fn skip_comment(&mut self) -> StoreResult<bool> {
        let rest = self.rest();
        if rest.starts_with("/*") {
            let start_line = self.line;
            let Some(end) = rest.find("*/") else {
                return Err(StoreError::DumpSyntax {
                    line: start_line,
                    reason: "unterminated block comment".into(),
                });
            };
            for _ in rest[..end + 2].chars() {
                self.bump();
            }
            Ok(true)
        } else if rest.starts_with("//") {
            while let Some(c) = self.peek() {
                if c == '\n' {
                    break;
                }
                self.bump();
            }
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Skip whitespace, block comments and line comments
    fn skip_trivia(&mut self) -> StoreResult<()> {
        loop {
            if self.skip_comment()? {
                continue;
            }
            if self.peek().is_some_and(char::is_whitespace) {
                self.bump();
            } else {
                return Ok(());
            }
        }
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.rest().starts_with(token) {
            for _ in token.chars() {
                self.bump();
            }
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &str) -> StoreResult<()> {
        self.skip_trivia()?;
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{token}'")))
        }
    }

    fn ident(&mut self) -> StoreResult<&'a str> {
        self.skip_trivia()?;
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' || c == '$' || c == '-' {
                self.bump();
            } else {
                break;
            }
        }
        if start == self.pos {
            return Err(self.error("expected a name"));
        }
        Ok(&self.src[start..self.pos])
    }

    fn string_literal(&mut self) -> StoreResult<String> {
        self.skip_trivia()?;
        let quote = match self.peek() {
            Some(q @ ('"' | '\'')) => q,
            _ => return Err(self.error("expected a quoted collection name")),
        };
        self.bump();

        let mut out = String::new();
        loop {
            match self.bump() {
                Some('\\') => out.push(self.escape()?),
                Some(c) if c == quote => return Ok(out),
                Some(c) => out.push(c),
                None => break,
            }
        }
        Err(self.error("unterminated string"))
    }

    /// Decode the character after a backslash in a quoted name
    fn escape(&mut self) -> StoreResult<char> {
        let decoded = match self.bump() {
            Some('n') => '\n',
            Some('t') => '\t',
            Some('r') => '\r',
            Some('b') => '\u{8}',
            Some('f') => '\u{c}',
            Some('v') => '\u{b}',
            Some('0') => '\0',
            Some(c @ ('\\' | '\'' | '"' | '/')) => c,
            Some('u') => {
                let hex = self.rest().get(..4).unwrap_or_default();
                let code = u32::from_str_radix(hex, 16)
                    .ok()
                    .filter(|_| hex.len() == 4 && hex.chars().all(|c| c.is_ascii_hexdigit()))
                    .and_then(char::from_u32)
                    .ok_or_else(|| self.error("invalid \\u escape"))?;
                for _ in 0..4 {
                    self.bump();
                }
                code
            }
            Some(other) => return Err(self.error(format!("unknown escape '\\{other}'"))),
            None => return Err(self.error("unterminated string")),
        };
        Ok(decoded)
    }

    /// Text between the current `(` and its matching `)`, with comments
    /// outside string literals replaced by a space
    fn call_argument(&mut self) -> StoreResult<String> {
        self.expect("(")?;
        let mut arg = String::new();
        let mut depth = 0usize;
        let mut quote: Option<char> = None;

        while let Some(c) = self.peek() {
            match quote {
                Some(q) => {
                    if c == '\\' {
                        arg.push(c);
                        self.bump();
                        if let Some(escaped) = self.bump() {
                            arg.push(escaped);
                        }
                        continue;
                    } else if c == q {
                        quote = None;
                    }
                }
                None => {
                    if self.skip_comment()? {
                        arg.push(' ');
                        continue;
                    }
                    match c {
                        '"' | '\'' => quote = Some(c),
                        '(' | '[' | '{' => depth += 1,
                        ')' if depth == 0 => {
                            self.bump();
                            return Ok(arg);
                        }
                        ')' | ']' | '}' => depth = depth.saturating_sub(1),
                        _ => {}
                    }
                }
            }
            arg.push(c);
            self.bump();
        }

        Err(self.error("unbalanced parentheses"))
    }

    fn statement(&mut self) -> StoreResult<Statement> {
        let line = self.line;

        if self.ident()? != "db" {
            return Err(StoreError::DumpSyntax {
                line,
                reason: "statements must start with 'db.'".into(),
            });
        }
        self.expect(".")?;

        let collection = match self.ident()? {
            "getCollection" => {
                self.expect("(")?;
                let name = self.string_literal()?;
                self.expect(")")?;
                name
            }
            name => name.to_string(),
        };
        self.expect(".")?;

        let method = self.ident()?;
        let argument = self.call_argument()?;
        self.skip_trivia()?;
        self.eat(";");

        let value: Value = serde_json::from_str(argument.trim()).map_err(|e| StoreError::DumpSyntax {
            line,
            reason: format!("invalid JSON argument to {method}: {e}"),
        })?;

        let documents = match (method, value) {
            ("insert", Value::Array(docs)) | ("insertMany", Value::Array(docs)) => docs,
            ("insert" | "insertOne" | "save", doc @ Value::Object(_)) => vec![doc],
            ("insert" | "insertOne" | "save" | "insertMany", _) => {
                return Err(StoreError::DumpSyntax {
                    line,
                    reason: format!("unexpected argument type for {method}"),
                });
            }
            (other, _) => {
                return Err(StoreError::DumpSyntax {
                    line,
                    reason: format!("unsupported method '{other}'"),
                });
            }
        };

        if let Some(bad) = documents.iter().find(|d| !d.is_object()) {
            return Err(StoreError::DumpSyntax {
                line,
                reason: format!("documents must be objects, got {bad}"),
            });
        }

        Ok(Statement {
            line,
            collection,
            documents,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strip_block_comments() {
        let content = "/* header\nspanning lines */\ndb.users.insert({}); /* trailing */";
        assert_eq!(strip_block_comments(content), "\ndb.users.insert({}); ");
    }

    #[test]
    fn test_emptiness() {
        assert!(is_effectively_empty(""));
        assert!(is_effectively_empty("   \n\t\n"));
        assert!(is_effectively_empty("/* only a comment */\n\n/* and another\n one */"));
        assert!(!is_effectively_empty("/* seed */\ndb.users.insert({\"a\": 1});"));
    }

    #[test]
    fn test_resolve_missing_dump_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = DumpFile::resolve(dir.path(), Path::new("tests/_data/dump.js")).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(err.to_string().contains("dump.js"));
    }

    #[test]
    fn test_resolve_relative_to_project_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("data")).unwrap();
        std::fs::write(dir.path().join("data/dump.js"), "/* nothing yet */\n").unwrap();

        let dump = DumpFile::resolve(dir.path(), Path::new("data/dump.js")).unwrap();
        assert!(dump.path().is_absolute());
        assert!(dump.path().ends_with("data/dump.js"));
        assert!(dump.is_empty());
    }

    #[test]
    fn test_parse_script() {
        let script = r#"
            /* users */
            db.users.insert({"name": "john", "bio": "likes ; and ) chars"});
            // audit trail
            db.getCollection('audit.log').insertMany([
                {"event": "login"},
                {"event": "logout"}
            ])
            db.posts.insertOne({"title": "hello"});
            db.posts.insert([{"title": "a"}, {"title": "b"}]);
        "#;

        let statements = parse_script(script).unwrap();
        assert_eq!(statements.len(), 4);

        assert_eq!(statements[0].collection, "users");
        assert_eq!(statements[0].line, 3);
        assert_eq!(
            statements[0].documents,
            vec![json!({"name": "john", "bio": "likes ; and ) chars"})]
        );

        assert_eq!(statements[1].collection, "audit.log");
        assert_eq!(statements[1].documents.len(), 2);
        assert_eq!(statements[1].line, 5);

        assert_eq!(statements[2].collection, "posts");
        assert_eq!(statements[3].documents.len(), 2);
    }

    #[test]
    fn test_parse_script_errors_name_the_line() {
        let err = parse_script("db.users.insert({\"a\": 1});\ndb.users.remove({});").unwrap_err();
        match err {
            StoreError::DumpSyntax { line, reason } => {
                assert_eq!(line, 2);
                assert!(reason.contains("remove"));
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!(parse_script("users.insert({})").is_err());
        assert!(parse_script("db.users.insert({\"a\": 1}").is_err());
        assert!(parse_script("db.users.insert({not json})").is_err());
        assert!(parse_script("db.users.insertMany([1, 2])").is_err());
        assert!(parse_script("/* unterminated").is_err());
    }

    #[test]
    fn test_comments_inside_arguments_are_ignored() {
        let statements = parse_script("db.users.insert({\"a\": 1 /* seeded */});").unwrap();
        assert_eq!(statements[0].documents, vec![json!({"a": 1})]);

        let script = "db.users.insertMany([\n {\"a\": 1}, // john's row\n {\"a\": 2}\n]);\ndb.posts.insert({});";
        let statements = parse_script(script).unwrap();
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0].documents, vec![json!({"a": 1}), json!({"a": 2})]);
        assert_eq!(statements[1].line, 5);
    }

    #[test]
    fn test_comment_markers_inside_strings_are_kept() {
        let statements =
            parse_script(r#"db.links.insert({"url": "http://example.com/*x*/", "note": "it's"});"#)
                .unwrap();
        assert_eq!(
            statements[0].documents,
            vec![json!({"url": "http://example.com/*x*/", "note": "it's"})]
        );
    }

    #[test]
    fn test_collection_name_escapes() {
        let statements = parse_script(r#"db.getCollection("a\tb\u0041\'").insert({});"#).unwrap();
        assert_eq!(statements[0].collection, "a\tbA'");

        let err = parse_script(r#"db.getCollection("a\qb").insert({});"#).unwrap_err();
        assert!(err.to_string().contains("unknown escape"));
    }

    #[test]
    fn test_parse_empty_script() {
        assert!(parse_script("").unwrap().is_empty());
        assert!(parse_script("/* nothing */\n// at all\n").unwrap().is_empty());
    }
}
