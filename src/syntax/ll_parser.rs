//! 递归下降分析，同时计算综合属性并记录语义规则

use log::trace;

use crate::lex::{Lexeme, Tokens};
use crate::mistakes::EvalError;
use crate::semantic::{DivisionPolicy, EvalConfig, Evaluation, SemanticRule, Trace};
use crate::table::symbol::{SymbolTable, TypeTag};

use super::{AstNode, BinOp, Label, NodeId};

/// 括号最大嵌套层数，超过时报错而不是耗尽调用栈
pub const MAX_DEPTH: usize = 256;

pub struct RecursiveDescentParser<'a> {
    // 词法单元流
    tokens: &'a [Lexeme],
    // 当前分析词法索引
    current: usize,
    table: &'a SymbolTable,
    config: EvalConfig,
    trace: Trace,
    // 下一个结点编号
    next_id: usize,
    // 当前括号嵌套层数
    depth: usize,
}

impl<'a> RecursiveDescentParser<'a> {
    pub fn new(tokens: &'a [Lexeme], table: &'a SymbolTable, config: EvalConfig) -> Self {
        Self {
            tokens,
            current: 0,
            table,
            config,
            trace: Trace::default(),
            next_id: 0,
            depth: 0,
        }
    }

    /// 分析整个词法单元流，E 之后不允许剩余
    pub fn parse(mut self) -> Result<Evaluation, EvalError> {
        let ast = self.match_e()?;
        if let Some(l) = self.copy_now() {
            return Err(EvalError::TrailingInput {
                found: l.tok.lexeme(),
                offset: l.offset,
            });
        }
        Ok(Evaluation { ast, trace: self.trace })
    }

    /// 返回当前词法单元
    fn copy_now(&self) -> Option<&'a Lexeme> {
        self.tokens.get(self.current)
    }

    fn fire(&mut self, rule: SemanticRule) {
        trace!("rule #{}: {}", self.trace.len(), rule);
        self.trace.push(rule);
    }

    fn new_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// 当前词法单元是给定运算符之一时读入，返回运算符与位置
    fn term_op(&mut self, ops: &[BinOp]) -> Option<(BinOp, usize)> {
        let l = self.copy_now()?;
        let op = BinOp::from_token(&l.tok).filter(|op| ops.contains(op))?;
        self.current += 1;
        Some((op, l.offset))
    }

    /// 新建运算结点，左操作数为之前的累积结点
    fn combine(
        &mut self,
        op: BinOp,
        left: AstNode,
        right: AstNode,
        offset: usize,
    ) -> Result<AstNode, EvalError> {
        let fail = self.config.division == DivisionPolicy::Fail;
        if op == BinOp::Div && right.val() == 0.0 && fail {
            return Err(EvalError::DivisionByZero { offset });
        }
        let val = op.apply(left.val(), right.val());
        Ok(AstNode::binary(self.new_id(), op, left, right, val))
    }

    /// E -> T { (+ | -) T }
    fn match_e(&mut self) -> Result<AstNode, EvalError> {
        self.fire(SemanticRule::ETerm);
        let mut node = self.match_t()?;
        while let Some((op, offset)) = self.term_op(&[BinOp::Add, BinOp::Sub]) {
            self.fire(match op {
                BinOp::Add => SemanticRule::EAdd,
                _ => SemanticRule::ESub,
            });
            let right = self.match_t()?;
            node = self.combine(op, node, right, offset)?;
        }
        Ok(node)
    }

    /// T -> F { (* | /) F }
    fn match_t(&mut self) -> Result<AstNode, EvalError> {
        self.fire(SemanticRule::TFactor);
        let mut node = self.match_f()?;
        while let Some((op, offset)) = self.term_op(&[BinOp::Mul, BinOp::Div]) {
            self.fire(match op {
                BinOp::Mul => SemanticRule::TMul,
                _ => SemanticRule::TDiv,
            });
            let right = self.match_f()?;
            node = self.combine(op, node, right, offset)?;
        }
        Ok(node)
    }

    /// F -> ( E ) | id | num
    fn match_f(&mut self) -> Result<AstNode, EvalError> {
        let l = self.copy_now().ok_or(EvalError::UnexpectedEnd)?;
        match &l.tok {
            Tokens::LeftC => {
                if self.depth == MAX_DEPTH {
                    return Err(EvalError::TooDeep { offset: l.offset, limit: MAX_DEPTH });
                }
                self.current += 1;
                self.depth += 1;
                self.fire(SemanticRule::FGroup);
                let inner = self.match_e()?;
                match self.copy_now() {
                    Some(Lexeme { tok: Tokens::RightC, .. }) => self.current += 1,
                    Some(other) => {
                        return Err(EvalError::UnexpectedToken {
                            found: other.tok.lexeme(),
                            offset: other.offset,
                        })
                    }
                    None => return Err(EvalError::UnclosedParen { offset: l.offset }),
                }
                self.depth -= 1;
                let tipo = inner.tipo().unwrap_or(TypeTag::Real);
                Ok(AstNode::group(self.new_id(), inner, tipo))
            }
            Tokens::Identity(name) => {
                self.current += 1;
                self.fire(SemanticRule::FId);
                let entry = self.table.lookup(name, l.offset)?;
                Ok(AstNode::leaf(self.new_id(), Label::Id(name.clone()), entry.tipo, entry.val))
            }
            Tokens::Num(text) => {
                self.current += 1;
                self.fire(SemanticRule::FNum);
                let val: f64 = text.parse().map_err(|_| EvalError::BadNumber {
                    text: text.clone(),
                    offset: l.offset,
                })?;
                Ok(AstNode::leaf(self.new_id(), Label::Num(text.clone()), TypeTag::Real, val))
            }
            other => Err(EvalError::UnexpectedToken {
                found: other.lexeme(),
                offset: l.offset,
            }),
        }
    }
}
