use std::fmt::{Display, Formatter};

use super::error::{AssignError, DeclError, Error, EvalError, LexError};
use crate::lex::preprocessor::split_assignment;

/// 来源
#[derive(PartialEq, Debug, Clone, Copy)]
pub enum Froms {
    Preprocessor,
    Lex,
    Syntax,
    Semantic,
    Table,
    Output
}

impl Display for Froms {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Froms::Preprocessor => write!(f, "预处理阶段"),
            Froms::Lex => write!(f, "词法分析阶段"),
            Froms::Syntax => write!(f, "语法分析阶段"),
            Froms::Semantic => write!(f, "语义分析阶段"),
            Froms::Table => write!(f, "符号表"),
            Froms::Output => write!(f, "输出阶段"),
        }
    }
}

/// 类型
#[derive(PartialEq, Debug, Clone, Copy)]
pub enum Types {
    Warning,
    Error
}

impl Display for Types {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Types::Warning => write!(f, "警告"),
            Types::Error => write!(f, "错误"),
        }
    }
}

/// 各行的类型
#[derive(PartialEq, Debug, Clone, Copy)]
pub enum LineType {
    Note,
    Happen,
    Relate
}

/// 一行提示：行号，行类型，起始列（从 1 开始）与长度，提示信息，具体代码
#[derive(PartialEq, Debug)]
struct MisLine {
    line: usize,
    line_type: Option<LineType>,
    pos: Option<(usize, usize)>,
    info: String,
    code: String,
}

/// 诊断信息
/// 1. 来源阶段与类型
/// 2. 发生错误的位置和报错
/// 3. 和错误有关的位置的提示
#[derive(PartialEq, Debug)]
pub struct Mis {
    who: Froms,
    wtype: Types,
    intro: String,
    file: String,
    lines: Vec<MisLine>,
}

impl Mis {
    pub fn new(
        who: Froms,
        wtype: Types,
        intro: impl Into<String>,
        file: impl Into<String>,
    ) -> Self {
        Mis {
            who,
            wtype,
            intro: intro.into(),
            file: file.into(),
            lines: vec![],
        }
    }

    pub fn add_line(
        &mut self,
        line: usize,
        info: impl Into<String>,
        code: impl Into<String>,
        line_type: Option<LineType>,
        pos: Option<(usize, usize)>,
    ) {
        self.lines.push(MisLine {
            line,
            line_type,
            pos,
            info: info.into(),
            code: code.into(),
        });
    }

    pub fn who(&self) -> Froms {
        self.who
    }

    pub fn wtype(&self) -> Types {
        self.wtype
    }

    /// 求值错误，`code` 为被求值的表达式
    pub fn from_eval(e: &EvalError, file: &str, code: &str) -> Self {
        let who = match e {
            EvalError::Unresolved { .. }
            | EvalError::DivisionByZero { .. }
            | EvalError::BadNumber { .. } => Froms::Semantic,
            _ => Froms::Syntax,
        };
        let mut m = Mis::new(who, Types::Error, e.to_string(), file);
        match e.span() {
            Some((offset, len)) => {
                let pos = Some((offset + 1, len.max(1)));
                m.add_line(1, e.to_string(), code, Some(LineType::Happen), pos)
            }
            None => {
                let end = code.chars().count();
                m.add_line(1, "表达式不完整", code, Some(LineType::Happen), Some((end + 1, 1)))
            }
        }
        m
    }

    pub fn from_lex(e: &LexError, file: &str, code: &str) -> Self {
        let (offset, len) = e.span();
        let mut m = Mis::new(Froms::Lex, Types::Error, e.to_string(), file);
        let pos = Some((offset + 1, len.max(1)));
        m.add_line(1, "词法分析无法识别", code, Some(LineType::Happen), pos);
        m
    }

    pub fn from_assign(e: &AssignError, file: &str, code: &str) -> Self {
        let mut m = Mis::new(Froms::Preprocessor, Types::Error, e.to_string(), file);
        m.add_line(1, "需要形如 name = expression 的赋值", code, Some(LineType::Note), None);
        m
    }

    /// 声明错误只作为警告，声明会被跳过
    pub fn from_decl(e: &DeclError, file: &str, line: usize, code: &str) -> Self {
        let mut m = Mis::new(Froms::Table, Types::Warning, e.to_string(), file);
        m.add_line(line, "已忽略该声明", code, Some(LineType::Relate), None);
        m
    }

    /// 一条赋值语句处理中的任意错误，`line` 为整条赋值语句
    ///
    /// 词法与求值错误的位置相对于 `=` 右侧的表达式
    pub fn from_error(e: &Error, file: &str, line: &str) -> Self {
        let expr = || {
            split_assignment(line)
                .map(|(_, expr)| expr)
                .unwrap_or_else(|_| line.to_string())
        };
        match e {
            Error::Assign(e) => Mis::from_assign(e, file, line),
            Error::Lex(e) => Mis::from_lex(e, file, &expr()),
            Error::Eval(e) => Mis::from_eval(e, file, &expr()),
            Error::Decl(e) => Mis::from_decl(e, file, 1, line),
            Error::Grammar(_) => Mis::new(Froms::Syntax, Types::Error, e.to_string(), file),
            Error::Render(_) | Error::Io(_) => {
                Mis::new(Froms::Output, Types::Error, e.to_string(), file)
            }
        }
    }
}

impl Display for Mis {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // 出错行号
        let mut l = String::new();
        // 提示信息
        let mut s = String::new();
        let width: usize = 6;
        if !self.lines.is_empty() {
            s.push_str(format!("{:width$}|\n", ' ', width = width).as_str());
        }
        for MisLine { line, line_type, pos, info, code } in &self.lines {
            let start_from: usize;
            let how_many: usize;
            l.push_str(format!("{}", line).as_str());
            match *pos {
                Some((start, offset)) => {
                    l.push_str(format!(":{}", start).as_str());
                    start_from = start.saturating_sub(1);
                    how_many = offset;
                },
                None => {
                    start_from = 0;
                    how_many = 1;
                }
            }
            l.push(';');
            let stand = match line_type {
                Some(LineType::Note) => '*',
                Some(LineType::Happen) => '^',
                Some(LineType::Relate) => '&',
                None => '-'
            };
            s.push_str(format!("{:width$}|\t{}\n", line, code, width = width).as_str());
            s.push_str(
                format!("{:width$}|\t{:from$}", "", "", width = width, from = start_from).as_str(),
            );
            for _ in 1..=how_many {
                s.push(stand);
            }
            s.push_str(format!("-->{}\n", info).as_str());
        }
        write!(
            f,
            "{} from {}: {}\n In {}:{}\n{}",
            self.wtype, self.who, self.intro, self.file, l, s
        )
    }
}
