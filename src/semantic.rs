//! 语义分析
//!
//! 属性文法（综合属性 val，叶子另有 tipo）：
//!
//! ```text
//! E -> E1 + T   { E.val = E1.val + T.val }
//! E -> E1 - T   { E.val = E1.val - T.val }
//! E -> T        { E.val = T.val }
//! T -> T1 * F   { T.val = T1.val * F.val }
//! T -> T1 / F   { T.val = T1.val / F.val }
//! T -> F        { T.val = F.val }
//! F -> ( E )    { F.val = E.val }
//! F -> id       { F.val = lookup(id) }
//! F -> num      { F.val = num.lexval }
//! ```
//!
//! 规则的记录顺序：进入某一层时先记录该层的基本规则（E -> T、T -> F），
//! 识别出 F 的候选式时记录对应规则，运算符被读入时记录运算规则（在读右操作数之前）

use std::fmt::{Display, Formatter};

use crate::grammar::{Production, GRAMMAR};
use crate::lex::analysis::tokenize;
use crate::lex::preprocessor::split_assignment;
use crate::lex::Lexeme;
use crate::mistakes::error::{EvalError, Result};
use crate::syntax::ll_parser::RecursiveDescentParser;
use crate::syntax::AstNode;
use crate::table::symbol::{SymbolTable, TypeTag};

/// 语义规则
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticRule {
    EAdd,
    ESub,
    ETerm,
    TMul,
    TDiv,
    TFactor,
    FGroup,
    FId,
    FNum,
}

impl SemanticRule {
    /// 对应 GRAMMAR 中的产生式
    pub fn production(&self) -> &'static Production {
        let i = match self {
            SemanticRule::EAdd => 0,
            SemanticRule::ESub => 1,
            SemanticRule::ETerm => 2,
            SemanticRule::TMul => 3,
            SemanticRule::TDiv => 4,
            SemanticRule::TFactor => 5,
            SemanticRule::FGroup => 6,
            SemanticRule::FId => 7,
            SemanticRule::FNum => 8,
        };
        &GRAMMAR.productions()[i]
    }
}

impl Display for SemanticRule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SemanticRule::EAdd => "E → E1 + T\t{ E.val = E1.val + T.val }",
            SemanticRule::ESub => "E → E1 - T\t{ E.val = E1.val - T.val }",
            SemanticRule::ETerm => "E → T\t{ E.val = T.val }",
            SemanticRule::TMul => "T → T1 * F\t{ T.val = T1.val * F.val }",
            SemanticRule::TDiv => "T → T1 / F\t{ T.val = T1.val / F.val }",
            SemanticRule::TFactor => "T → F\t{ T.val = F.val }",
            SemanticRule::FGroup => "F → (E)\t{ F.val = E.val }",
            SemanticRule::FId => "F → id\t{ F.val = lookup(id) }",
            SemanticRule::FNum => "F → num\t{ F.val = num.lexval }",
        };
        write!(f, "{}", s)
    }
}

/// 一次求值中按触发顺序记录的语义规则，只追加
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Trace {
    rules: Vec<SemanticRule>,
}

impl Trace {
    pub(crate) fn push(&mut self, rule: SemanticRule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[SemanticRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn lines(&self) -> Vec<String> {
        self.rules.iter().map(|r| r.to_string()).collect()
    }

    pub fn dump(&self) -> String {
        self.rules.iter().map(|r| format!("{}\n", r)).collect()
    }
}

/// 除零的处理方式
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DivisionPolicy {
    /// 报 DivisionByZero
    #[default]
    Fail,
    /// 按浮点数规则得到 inf / NaN
    Ieee,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EvalConfig {
    pub division: DivisionPolicy,
}

/// 求值结果：带属性的语法树与语义规则记录
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub ast: AstNode,
    pub trace: Trace,
}

impl Evaluation {
    pub fn value(&self) -> f64 {
        self.ast.val()
    }
}

pub fn evaluate(
    tokens: &[Lexeme],
    table: &SymbolTable,
) -> std::result::Result<Evaluation, EvalError> {
    evaluate_with(tokens, table, EvalConfig::default())
}

pub fn evaluate_with(
    tokens: &[Lexeme],
    table: &SymbolTable,
    config: EvalConfig,
) -> std::result::Result<Evaluation, EvalError> {
    RecursiveDescentParser::new(tokens, table, config).parse()
}

/// 赋值结果写回符号表，类型为 REAL
pub fn assign(table: &mut SymbolTable, target: &str, evaluation: &Evaluation) {
    table.insert(target, evaluation.value(), TypeTag::Real);
}

/// 一条赋值语句：切分、词法分析、求值、写回符号表
pub fn run_assignment(
    line: &str,
    table: &mut SymbolTable,
    config: EvalConfig,
) -> Result<(String, Evaluation)> {
    let (target, expr) = split_assignment(line)?;
    let tokens = tokenize(&expr)?;
    let evaluation = evaluate_with(&tokens, table, config)?;
    assign(table, &target, &evaluation);
    Ok((target, evaluation))
}

#[cfg(test)]
mod semantic_tests {
    use super::*;
    use crate::mistakes::Error;

    #[test]
    fn test_rules_match_grammar() {
        assert_eq!(SemanticRule::EAdd.production().to_string(), "E → E + T");
        assert_eq!(SemanticRule::TFactor.production().to_string(), "T → F");
        assert_eq!(SemanticRule::FGroup.production().to_string(), "F → ( E )");
        assert_eq!(SemanticRule::FNum.production().to_string(), "F → num");
        let rules = [SemanticRule::ESub, SemanticRule::TMul, SemanticRule::TDiv, SemanticRule::FId];
        for rule in rules {
            let p = rule.production();
            assert!(rule.to_string().starts_with(&format!("{} →", p.lhs())));
        }
    }

    #[test]
    fn test_run_assignment() {
        let mut table = SymbolTable::new();
        table.declare_line("a=4, b=3");
        let (target, ev) =
            run_assignment("c = a * b + 2", &mut table, EvalConfig::default()).unwrap();
        assert_eq!(target, "c");
        assert_eq!(ev.value(), 14.0);
        assert_eq!(table.get("c").unwrap().val, 14.0);
        assert_eq!(table.get("c").unwrap().tipo, TypeTag::Real);
        // 结果可以在下一条赋值中使用
        let (_, ev) = run_assignment("d = c / 7", &mut table, EvalConfig::default()).unwrap();
        assert_eq!(ev.value(), 2.0);
    }

    #[test]
    fn test_run_assignment_errors() {
        let mut table = SymbolTable::new();
        let cfg = EvalConfig::default();
        assert!(matches!(run_assignment("1 + 2", &mut table, cfg), Err(Error::Assign(_))));
        assert!(matches!(run_assignment("x = 1 % 2", &mut table, cfg), Err(Error::Lex(_))));
        assert!(matches!(
            run_assignment("x = z + 1", &mut table, cfg),
            Err(Error::Eval(EvalError::Unresolved { .. }))
        ));
        assert!(table.is_empty());
    }

    #[test]
    fn test_trace_dump() {
        let mut trace = Trace::default();
        trace.push(SemanticRule::TFactor);
        trace.push(SemanticRule::FNum);
        assert_eq!(trace.dump(), "T → F\t{ T.val = F.val }\nF → num\t{ F.val = num.lexval }\n");
        assert_eq!(trace.lines().len(), 2);
    }
}
