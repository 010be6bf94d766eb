//! 词法分析器

pub mod analysis;
pub mod preprocessor;

/// 词法单元
/// 运算符号：
/// 1. + - * /
/// 分隔符：
/// 1. ( )
/// 数字：
/// 1. 形式为 4 / 4.25，保留原文，值在求值时解析
/// 标识符：
/// 1. 以字母或者 _ 开头，之后可由字母、_、数字组成
#[derive(PartialEq, Debug, Clone)]
pub enum Tokens {
    /// 加
    Plus,
    /// 减
    Minus,
    /// 乘
    Mul,
    /// 除
    Div,
    /// (
    LeftC,
    /// )
    RightC,
    /// 数字
    Num(String),
    /// 标识符
    Identity(String),
}

impl Tokens {
    pub fn dump(&self) -> String {
        match self {
            Tokens::Plus => "(Plus, )".to_string(),
            Tokens::Minus => "(Minus, )".to_string(),
            Tokens::Mul => "(Mul, )".to_string(),
            Tokens::Div => "(Div, )".to_string(),
            Tokens::LeftC => "(LeftC, )".to_string(),
            Tokens::RightC => "(RightC, )".to_string(),
            Tokens::Num(x) => format!("(Num, \"{}\")", x),
            Tokens::Identity(x) => format!("(Identity, \"{}\")", x),
        }
    }

    /// 源码中的写法
    pub fn lexeme(&self) -> String {
        match self {
            Tokens::Plus => "+".to_string(),
            Tokens::Minus => "-".to_string(),
            Tokens::Mul => "*".to_string(),
            Tokens::Div => "/".to_string(),
            Tokens::LeftC => "(".to_string(),
            Tokens::RightC => ")".to_string(),
            Tokens::Num(x) | Tokens::Identity(x) => x.clone(),
        }
    }
}

/// 带位置的词法单元，offset 为字符偏移
#[derive(PartialEq, Debug, Clone)]
pub struct Lexeme {
    pub tok: Tokens,
    pub offset: usize,
}

impl Lexeme {
    pub fn new(tok: Tokens, offset: usize) -> Self {
        Self { tok, offset }
    }
}
