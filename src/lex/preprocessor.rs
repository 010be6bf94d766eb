//! 预处理 - 多个空白替换成一个空格，读取交互输入，切分赋值语句

use std::io::BufRead;

use crate::mistakes::AssignError;

/// 多个空白替换成一个空格，去掉首尾空白
pub fn normalize(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn is_identity(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => chars.all(|c| c.is_alphanumeric() || c == '_'),
        _ => false,
    }
}

/// 切分 `name = expression`，返回 (name, expression)
///
/// 只在第一个 `=` 处切分，表达式中多余的 `=` 留给词法分析报错
pub fn split_assignment(line: &str) -> Result<(String, String), AssignError> {
    let (target, expr) = line.split_once('=').ok_or(AssignError::MissingAssignment)?;
    let target = target.trim();
    if !is_identity(target) {
        return Err(AssignError::BadTarget { target: target.to_string() });
    }
    Ok((target.to_string(), normalize(expr)))
}

/// 交互输入：若干行变量声明（空行结束），然后一行赋值语句
#[derive(Debug, Default, PartialEq)]
pub struct Session {
    pub declarations: Vec<String>,
    pub assignment: Option<String>,
}

pub fn read_session<R: BufRead>(r: R) -> std::io::Result<Session> {
    let mut session = Session::default();
    let mut lines = r.lines();
    for line in lines.by_ref() {
        let line = normalize(&line?);
        if line.is_empty() {
            break;
        }
        session.declarations.push(line);
    }
    for line in lines {
        let line = normalize(&line?);
        if !line.is_empty() {
            session.assignment = Some(line);
            break;
        }
    }
    Ok(session)
}
