//! 文法模型
//!
//! 开始符号为 E，四个非终结符（含开始符号），九条产生式：
//!
//! ```text
//! E -> E + T | E - T | T
//! T -> T * F | T / F | F
//! F -> ( E ) | id | num
//! ```
//!
//! 出现在某条产生式左部的符号为非终结符，其余均为终结符

pub mod sets;

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use lazy_static::lazy_static;

use crate::mistakes::GrammarError;

/// 文法符号
pub type Symbol = String;

/// 空串
pub const EPSILON: &str = "ε";
/// 输入结束
pub const END: &str = "$";

lazy_static! {
    /// 算术表达式文法
    pub static ref GRAMMAR: Grammar = Grammar::build(
        "E",
        vec![
            Production::new("E", &["E", "+", "T"]),
            Production::new("E", &["E", "-", "T"]),
            Production::new("E", &["T"]),
            Production::new("T", &["T", "*", "F"]),
            Production::new("T", &["T", "/", "F"]),
            Production::new("T", &["F"]),
            Production::new("F", &["(", "E", ")"]),
            Production::new("F", &["id"]),
            Production::new("F", &["num"]),
        ],
    );
}

/// 产生式 lhs -> rhs
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Production {
    lhs: Symbol,
    rhs: Vec<Symbol>,
}

impl Production {
    pub fn new(lhs: &str, rhs: &[&str]) -> Self {
        Self {
            lhs: lhs.to_string(),
            rhs: rhs.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn lhs(&self) -> &str {
        &self.lhs
    }

    pub fn rhs(&self) -> &[Symbol] {
        &self.rhs
    }

    /// 产生式体的第一个符号，构造文法时已保证产生式体非空
    pub fn first_symbol(&self) -> &str {
        &self.rhs[0]
    }

    pub fn body(&self) -> String {
        self.rhs.join(" ")
    }
}

impl Display for Production {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} → {}", self.lhs, self.body())
    }
}

#[derive(Debug, Clone)]
pub struct Grammar {
    start: Symbol,
    productions: Vec<Production>,
    /// 按首次作为左部出现的顺序
    nonterminals: Vec<Symbol>,
}

impl Grammar {
    /// 检查后构造文法
    pub fn new(start: &str, productions: Vec<Production>) -> Result<Self, GrammarError> {
        if productions.is_empty() {
            return Err(GrammarError::Empty);
        }
        for p in &productions {
            if p.lhs == EPSILON || p.lhs == END {
                return Err(GrammarError::ReservedLhs { symbol: p.lhs.clone() });
            }
            if p.rhs.is_empty() {
                return Err(GrammarError::EmptyBody { lhs: p.lhs.clone() });
            }
            if p.rhs.iter().any(|s| s == END) {
                return Err(GrammarError::ReservedInBody {
                    lhs: p.lhs.clone(),
                    symbol: END.to_string(),
                });
            }
        }
        if !productions.iter().any(|p| p.lhs == start) {
            return Err(GrammarError::UnknownStart { start: start.to_string() });
        }
        Ok(Self::build(start, productions))
    }

    fn build(start: &str, productions: Vec<Production>) -> Self {
        let mut nonterminals: Vec<Symbol> = vec![];
        for p in &productions {
            if !nonterminals.contains(&p.lhs) {
                nonterminals.push(p.lhs.clone());
            }
        }
        Self { start: start.to_string(), productions, nonterminals }
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn nonterminals(&self) -> &[Symbol] {
        &self.nonterminals
    }

    pub fn is_nonterminal(&self, symbol: &str) -> bool {
        self.nonterminals.iter().any(|nt| nt == symbol)
    }

    /// 产生式体中出现的终结符（含 ε）
    pub fn terminals(&self) -> BTreeSet<Symbol> {
        self.productions
            .iter()
            .flat_map(|p| p.rhs.iter())
            .filter(|s| !self.is_nonterminal(s))
            .cloned()
            .collect()
    }

    /// 某个非终结符的全部候选式
    pub fn alternatives<'a>(&'a self, nt: &'a str) -> impl Iterator<Item = &'a Production> + 'a {
        self.productions.iter().filter(move |p| p.lhs == nt)
    }

    pub fn dump(&self) -> String {
        let mut s = String::new();
        for nt in &self.nonterminals {
            let bodies: Vec<String> = self.alternatives(nt).map(|p| p.body()).collect();
            s.push_str(&format!("{} → {}\n", nt, bodies.join(" | ")));
        }
        s
    }
}

#[cfg(test)]
mod grammar_tests {
    use super::*;

    #[test]
    fn test_fixed_grammar() {
        assert_eq!(GRAMMAR.start(), "E");
        assert_eq!(GRAMMAR.productions().len(), 9);
        assert_eq!(GRAMMAR.nonterminals(), &["E", "T", "F"]);
        assert!(GRAMMAR.is_nonterminal("T"));
        assert!(!GRAMMAR.is_nonterminal("id"));
        assert!(!GRAMMAR.is_nonterminal("+"));
        let terms: Vec<String> = GRAMMAR.terminals().into_iter().collect();
        assert_eq!(terms, vec!["(", ")", "*", "+", "-", "/", "id", "num"]);
        assert_eq!(GRAMMAR.alternatives("F").count(), 3);
    }

    #[test]
    fn test_fixed_grammar_passes_checks() {
        let g = Grammar::new("E", GRAMMAR.productions().to_vec()).unwrap();
        assert_eq!(g.nonterminals(), GRAMMAR.nonterminals());
    }

    #[test]
    fn test_dump() {
        assert_eq!(
            GRAMMAR.dump(),
            "E → E + T | E - T | T\nT → T * F | T / F | F\nF → ( E ) | id | num\n"
        );
        assert_eq!(GRAMMAR.productions()[6].to_string(), "F → ( E )");
    }

    #[test]
    fn test_rejects_bad_configuration() {
        assert_eq!(Grammar::new("S", vec![]).unwrap_err(), GrammarError::Empty);
        assert_eq!(
            Grammar::new("S", vec![Production::new("S", &[])]).unwrap_err(),
            GrammarError::EmptyBody { lhs: "S".to_string() }
        );
        assert_eq!(
            Grammar::new("X", vec![Production::new("S", &["a"])]).unwrap_err(),
            GrammarError::UnknownStart { start: "X".to_string() }
        );
        assert_eq!(
            Grammar::new(
                "S",
                vec![Production::new("S", &["a"]), Production::new(EPSILON, &["b"])]
            )
            .unwrap_err(),
            GrammarError::ReservedLhs { symbol: EPSILON.to_string() }
        );
        assert_eq!(
            Grammar::new("S", vec![Production::new("S", &["a", END])]).unwrap_err(),
            GrammarError::ReservedInBody { lhs: "S".to_string(), symbol: END.to_string() }
        );
    }
}
