use std::env;
use std::io::{self, IsTerminal};
#[cfg(any(test, feature = "test"))]
use std::collections::HashMap;

/// Allows concrete types for the process abstraction.
#[derive(Clone, Debug)]
pub enum Process {
    OsProcess(OsProcess),
    #[cfg(any(test, feature = "test"))]
    TestProcess(TestContext),
}

impl Process {
    pub fn os() -> Self {
        Self::OsProcess(OsProcess::new())
    }

    pub fn var(&self, key: &str) -> Result<String, env::VarError> {
        match self {
            Process::OsProcess(_) => env::var(key),
            #[cfg(any(test, feature = "test"))]
            Process::TestProcess(p) => match p.vars.get(key) {
                Some(val) => Ok(val.to_owned()),
                None => Err(env::VarError::NotPresent),
            },
        }
    }

    /// Whether log output should be colored.
    pub(crate) fn stderr_is_a_tty(&self) -> bool {
        match self {
            Process::OsProcess(p) => p.stderr_is_a_tty,
            #[cfg(any(test, feature = "test"))]
            Process::TestProcess(_) => false,
        }
    }
}

// ----------- real process -----------------

#[derive(Clone, Debug)]
pub struct OsProcess {
    pub(self) stderr_is_a_tty: bool,
}

impl OsProcess {
    pub fn new() -> Self {
        OsProcess {
            stderr_is_a_tty: io::stderr().is_terminal(),
        }
    }
}

impl Default for OsProcess {
    fn default() -> Self {
        OsProcess::new()
    }
}

// ------------ test process ----------------

#[cfg(any(test, feature = "test"))]
#[derive(Clone, Debug, Default)]
pub struct TestContext {
    vars: HashMap<String, String>,
}

#[cfg(any(test, feature = "test"))]
impl Process {
    pub fn with_vars(vars: HashMap<String, String>) -> Self {
        Self::TestProcess(TestContext { vars })
    }
}
