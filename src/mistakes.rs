//! 错误与诊断

pub mod error;
pub mod show;

pub use error::{AssignError, DeclError, Error, EvalError, GrammarError, LexError};
