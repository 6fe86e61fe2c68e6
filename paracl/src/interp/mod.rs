//! Tree-walking interpreter

mod config;
mod error;
mod eval;
mod ops;
mod scope;
mod value;

pub use config::{Config, DEFAULT_MAX_CALL_DEPTH, UnboundPolicy};
pub use error::{ErrorKind, InterpResult, RuntimeError, report_runtime_error};
pub use eval::{Flow, Interpreter};
pub use ops::{binary, unary};
pub use scope::{Frame, ScopeStack};
pub use value::{FunctionRef, Value};
