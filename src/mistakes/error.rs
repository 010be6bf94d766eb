//! 各阶段错误类型
//!
//! offset 均为表达式源码中的字符偏移（从 0 开始）

use thiserror::Error;

/// 文法配置错误，只会在构造 [`crate::grammar::Grammar`] 时出现
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GrammarError {
    #[error("grammar has no productions")]
    Empty,
    #[error("production for `{lhs}` has an empty body")]
    EmptyBody { lhs: String },
    #[error("start symbol `{start}` is not a nonterminal of the grammar")]
    UnknownStart { start: String },
    #[error("reserved symbol `{symbol}` cannot be a left-hand side")]
    ReservedLhs { symbol: String },
    #[error("end marker `{symbol}` used inside the body of `{lhs}`")]
    ReservedInBody { lhs: String, symbol: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LexError {
    #[error("unknown character `{ch}` at {offset}")]
    UnknownChar { ch: char, offset: usize },
    #[error("malformed number `{text}` at {offset}")]
    MalformedNumber { text: String, offset: usize },
}

impl LexError {
    /// (起始偏移, 长度)
    pub fn span(&self) -> (usize, usize) {
        match self {
            LexError::UnknownChar { offset, .. } => (*offset, 1),
            LexError::MalformedNumber { text, offset } => (*offset, text.chars().count()),
        }
    }
}

/// `name = expression` 切分错误，出现时不进行求值
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssignError {
    #[error("the expression must contain an assignment (e.g. `c = a * b + 2`)")]
    MissingAssignment,
    #[error("`{target}` is not a valid assignment target")]
    BadTarget { target: String },
}

/// 变量声明错误，报告后跳过该声明
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeclError {
    #[error("invalid declaration `{text}`, use a=3")]
    MissingSeparator { text: String },
    #[error("value `{value}` of `{name}` is not numeric, declaration ignored")]
    NotNumeric { name: String, value: String },
    #[error("`{name}` is not a valid variable name")]
    BadName { name: String },
}

#[derive(Debug, Error, PartialEq)]
pub enum EvalError {
    #[error("variable `{name}` is not defined")]
    Unresolved { name: String, offset: usize },
    #[error("unexpected `{found}` at {offset}")]
    UnexpectedToken { found: String, offset: usize },
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("parenthesis opened at {offset} is never closed")]
    UnclosedParen { offset: usize },
    #[error("unexpected `{found}` after a complete expression at {offset}")]
    TrailingInput { found: String, offset: usize },
    #[error("parentheses nested deeper than {limit} levels at {offset}")]
    TooDeep { offset: usize, limit: usize },
    #[error("division by zero at {offset}")]
    DivisionByZero { offset: usize },
    #[error("`{text}` is not a number")]
    BadNumber { text: String, offset: usize },
}

impl EvalError {
    /// (起始偏移, 长度)，表达式结束类错误没有位置
    pub fn span(&self) -> Option<(usize, usize)> {
        match self {
            EvalError::Unresolved { name, offset } => Some((*offset, name.chars().count())),
            EvalError::UnexpectedToken { found, offset }
            | EvalError::TrailingInput { found, offset }
            | EvalError::BadNumber { text: found, offset } => {
                Some((*offset, found.chars().count()))
            }
            EvalError::UnclosedParen { offset }
            | EvalError::TooDeep { offset, .. }
            | EvalError::DivisionByZero { offset } => {
                Some((*offset, 1))
            }
            EvalError::UnexpectedEnd => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Grammar(#[from] GrammarError),
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Assign(#[from] AssignError),
    #[error(transparent)]
    Decl(#[from] DeclError),
    #[error(transparent)]
    Eval(#[from] EvalError),
    #[error("render failed: {0}")]
    Render(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
