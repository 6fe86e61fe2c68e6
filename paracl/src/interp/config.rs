//! Interpreter configuration

/// Default maximum number of nested calls
pub const DEFAULT_MAX_CALL_DEPTH: usize = 10_000;

/// What reading an unbound identifier evaluates to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnboundPolicy {
    /// Fail with `UnboundIdentifier`
    #[default]
    Error,
    /// Evaluate to `undefined`
    Undefined,
}

/// Interpreter configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub unbound: UnboundPolicy,
    /// Calls nested deeper than this fail with `StackOverflow`
    pub max_call_depth: usize,
}

impl Config {
    pub fn lenient(mut self, lenient: bool) -> Self {
        if lenient {
            self.unbound = UnboundPolicy::Undefined;
        }
        self
    }

    pub fn max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            unbound: UnboundPolicy::Error,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}
