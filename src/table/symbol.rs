//! 符号表

use std::fmt::{Display, Formatter};

use log::{debug, warn};

use crate::lex::preprocessor::is_identity;
use crate::mistakes::{DeclError, EvalError};
use crate::syntax::fmt_val;

/// 类型标记
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// 声明的变量
    Int,
    /// 数字常量、赋值结果
    Real,
}

impl Display for TypeTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeTag::Int => write!(f, "INT"),
            TypeTag::Real => write!(f, "REAL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entry {
    pub val: f64,
    pub tipo: TypeTag,
}

/// 名字 -> {值, 类型}，保持插入顺序
#[derive(Debug, Default, Clone)]
pub struct SymbolTable {
    entries: Vec<(String, Entry)>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已存在时原位覆盖，返回旧值
    pub fn insert(&mut self, name: &str, val: f64, tipo: TypeTag) -> Option<Entry> {
        let entry = Entry { val, tipo };
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some((_, old)) => Some(std::mem::replace(old, entry)),
            None => {
                self.entries.push((name.to_string(), entry));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, e)| e)
    }

    /// 表达式中的名字查找，`offset` 为名字在表达式中的位置
    pub fn lookup(&self, name: &str, offset: usize) -> Result<&Entry, EvalError> {
        self.get(name).ok_or_else(|| EvalError::Unresolved { name: name.to_string(), offset })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.entries.iter().map(|(n, e)| (n.as_str(), e))
    }

    /// 单个声明 `a=4`，类型固定为 INT
    pub fn declare(&mut self, text: &str) -> Result<(), DeclError> {
        let (name, value) = text
            .split_once('=')
            .ok_or_else(|| DeclError::MissingSeparator { text: text.trim().to_string() })?;
        let (name, value) = (name.trim(), value.trim());
        if !is_identity(name) {
            return Err(DeclError::BadName { name: name.to_string() });
        }
        let val: f64 = value.parse().map_err(|_| DeclError::NotNumeric {
            name: name.to_string(),
            value: value.to_string(),
        })?;
        debug!("declare {} = {}", name, val);
        self.insert(name, val, TypeTag::Int);
        Ok(())
    }

    /// 一行中逗号分隔的多个声明，出错的声明跳过并返回
    pub fn declare_line(&mut self, line: &str) -> Vec<DeclError> {
        let mut errors = vec![];
        for text in line.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            if let Err(e) = self.declare(text) {
                warn!("{}", e);
                errors.push(e);
            }
        }
        errors
    }

    pub fn dump(&self) -> String {
        let mut s = String::new();
        for (name, e) in &self.entries {
            s.push_str(&format!("{} -> {{val={}, tipo={}}}\n", name, fmt_val(e.val), e.tipo));
        }
        s
    }
}

#[cfg(test)]
mod symbol_tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let mut t = SymbolTable::new();
        t.insert("a", 4.0, TypeTag::Int);
        assert_eq!(t.lookup("a", 0).unwrap().val, 4.0);
        assert_eq!(
            t.lookup("z", 3),
            Err(EvalError::Unresolved { name: "z".to_string(), offset: 3 })
        );
    }

    #[test]
    fn test_declare_line() {
        let mut t = SymbolTable::new();
        let errors = t.declare_line("a=4, b = 3 ,c=x, d, 9e=1");
        assert_eq!(t.len(), 2);
        assert_eq!(t.get("a"), Some(&Entry { val: 4.0, tipo: TypeTag::Int }));
        assert_eq!(t.get("b").unwrap().val, 3.0);
        assert_eq!(
            errors,
            vec![
                DeclError::NotNumeric { name: "c".to_string(), value: "x".to_string() },
                DeclError::MissingSeparator { text: "d".to_string() },
                DeclError::BadName { name: "9e".to_string() },
            ]
        );
    }

    #[test]
    fn test_insert_keeps_order() {
        let mut t = SymbolTable::new();
        t.insert("b", 1.0, TypeTag::Int);
        t.insert("a", 2.0, TypeTag::Int);
        let old = t.insert("b", 2.5, TypeTag::Real);
        assert_eq!(old, Some(Entry { val: 1.0, tipo: TypeTag::Int }));
        let names: Vec<&str> = t.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(t.dump(), "b -> {val=2.5, tipo=REAL}\na -> {val=2.0, tipo=INT}\n");
        assert!(!t.contains("c"));
    }
}
