//! Hooks a test runner calls on a module around a suite

use std::path::PathBuf;

use crate::error::Result;

/// The test about to run or just finished
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestCase {
    pub name: String,
    pub file: Option<PathBuf>,
}

impl TestCase {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file: None,
        }
    }

    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }
}

impl std::fmt::Display for TestCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{} ({})", self.name, file.display()),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Lifecycle hooks, invoked sequentially by the runner:
/// `initialize` once per suite, then `before`/`after` around every test.
pub trait TestModule {
    fn initialize(&mut self) -> Result<()>;

    fn before(&mut self, _test: &TestCase) -> Result<()> {
        Ok(())
    }

    fn after(&mut self, _test: &TestCase) -> Result<()> {
        Ok(())
    }
}

/// Run `body` for each test, wrapped in the module's hooks.
///
/// Stops at the first hook failure. Test body results are collected so an
/// assertion failure in one test does not prevent the next from running.
pub fn run_suite<M, F>(
    module: &mut M,
    tests: &[TestCase],
    mut body: F,
) -> Result<Vec<(TestCase, Result<()>)>>
where
    M: TestModule,
    F: FnMut(&mut M, &TestCase) -> Result<()>,
{
    module.initialize()?;

    let mut outcomes = Vec::with_capacity(tests.len());
    for test in tests {
        module.before(test)?;
        let outcome = body(module, test);
        module.after(test)?;
        outcomes.push((test.clone(), outcome));
    }

    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl TestModule for Recorder {
        fn initialize(&mut self) -> Result<()> {
            self.calls.push("initialize".into());
            Ok(())
        }

        fn before(&mut self, test: &TestCase) -> Result<()> {
            self.calls.push(format!("before {}", test.name));
            Ok(())
        }

        fn after(&mut self, test: &TestCase) -> Result<()> {
            self.calls.push(format!("after {}", test.name));
            Ok(())
        }
    }

    #[test]
    fn test_hook_order() {
        let mut module = Recorder::default();
        let tests = [TestCase::new("one"), TestCase::new("two")];

        let outcomes = run_suite(&mut module, &tests, |m, t| {
            m.calls.push(format!("run {}", t.name));
            if t.name == "one" {
                Err(Error::Assertion(crate::error::AssertionFailure::new("nope")))
            } else {
                Ok(())
            }
        })
        .unwrap();

        assert_eq!(
            module.calls,
            vec![
                "initialize",
                "before one",
                "run one",
                "after one",
                "before two",
                "run two",
                "after two"
            ]
        );
        assert!(outcomes[0].1.as_ref().is_err_and(Error::is_assertion));
        assert!(outcomes[1].1.is_ok());
    }

    #[test]
    fn test_case_display() {
        let test = TestCase::new("seeUser").with_file("tests/UserCest.php");
        assert_eq!(test.to_string(), "seeUser (tests/UserCest.php)");
    }
}
