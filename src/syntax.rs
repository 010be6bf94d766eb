//! 语法分析与抽象语法树

pub mod ll_parser;

use std::fmt::{Display, Formatter};

use crate::lex::Tokens;
use crate::table::symbol::TypeTag;

/*

开始符号为 E，按优先级从低到高：

E -> E + T | E - T | T
T -> T * F | T / F | F
F -> ( E ) | id | num

递归下降时消去左递归，用循环实现左结合：

E -> T { (+ | -) T }
T -> F { (* | /) F }
F -> ( E ) | id | num

与 crate::grammar::GRAMMAR 中的产生式一一对应，修改时两边需同步

*/

/// 结点标识，构造时按顺序分配，渲染时使用
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// 二元运算符
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinOp {
    pub fn from_token(tok: &Tokens) -> Option<BinOp> {
        match tok {
            Tokens::Plus => Some(BinOp::Add),
            Tokens::Minus => Some(BinOp::Sub),
            Tokens::Mul => Some(BinOp::Mul),
            Tokens::Div => Some(BinOp::Div),
            _ => None,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            BinOp::Add => '+',
            BinOp::Sub => '-',
            BinOp::Mul => '*',
            BinOp::Div => '/',
        }
    }

    /// 浮点运算，除零得到 inf / NaN
    pub fn apply(&self, l: f64, r: f64) -> f64 {
        match self {
            BinOp::Add => l + r,
            BinOp::Sub => l - r,
            BinOp::Mul => l * r,
            BinOp::Div => l / r,
        }
    }
}

/// 结点显示标签
#[derive(Debug, Clone, PartialEq)]
pub enum Label {
    /// op(+)
    Op(BinOp),
    /// ()
    Group,
    /// id(a)
    Id(String),
    /// num(2)
    Num(String),
}

impl Display for Label {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Label::Op(op) => write!(f, "op({})", op.symbol()),
            Label::Group => write!(f, "()"),
            Label::Id(name) => write!(f, "id({})", name),
            Label::Num(text) => write!(f, "num({})", text),
        }
    }
}

/// 值的输出格式，整数值也带 .0
pub fn fmt_val(v: f64) -> String {
    format!("{:?}", v)
}

/// 抽象语法树结点（带综合属性 val 与 tipo）
///
/// 构造后不再修改；子结点由父结点独占
#[derive(Debug, Clone, PartialEq)]
pub struct AstNode {
    id: NodeId,
    label: Label,
    tipo: Option<TypeTag>,
    val: f64,
    left: Option<Box<AstNode>>,
    right: Option<Box<AstNode>>,
}

impl AstNode {
    /// 叶子：id 或 num
    pub fn leaf(id: NodeId, label: Label, tipo: TypeTag, val: f64) -> Self {
        Self { id, label, tipo: Some(tipo), val, left: None, right: None }
    }

    /// 括号，值与内部表达式相同
    pub fn group(id: NodeId, inner: AstNode, tipo: TypeTag) -> Self {
        let val = inner.val;
        Self {
            id,
            label: Label::Group,
            tipo: Some(tipo),
            val,
            left: Some(Box::new(inner)),
            right: None,
        }
    }

    pub fn binary(id: NodeId, op: BinOp, left: AstNode, right: AstNode, val: f64) -> Self {
        Self {
            id,
            label: Label::Op(op),
            tipo: None,
            val,
            left: Some(Box::new(left)),
            right: Some(Box::new(right)),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn label(&self) -> &Label {
        &self.label
    }

    pub fn tipo(&self) -> Option<TypeTag> {
        self.tipo
    }

    pub fn val(&self) -> f64 {
        self.val
    }

    pub fn left(&self) -> Option<&AstNode> {
        self.left.as_deref()
    }

    pub fn right(&self) -> Option<&AstNode> {
        self.right.as_deref()
    }

    pub fn children(&self) -> impl Iterator<Item = &AstNode> {
        self.left().into_iter().chain(self.right())
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// 前序遍历，用显式栈，很长的运算链也不会耗尽调用栈
    pub fn pre_order(&self) -> Vec<&AstNode> {
        self.pre_order_levels().into_iter().map(|(_, n)| n).collect()
    }

    /// 前序遍历，同时给出结点所在层（根为 0）
    pub fn pre_order_levels(&self) -> Vec<(usize, &AstNode)> {
        let mut r = vec![];
        let mut stack = vec![(0, self)];
        while let Some((level, node)) = stack.pop() {
            r.push((level, node));
            if let Some(right) = node.right() {
                stack.push((level + 1, right));
            }
            if let Some(left) = node.left() {
                stack.push((level + 1, left));
            }
        }
        r
    }

    /// 缩进形式输出，每层两个空格
    pub fn dump(&self) -> String {
        let mut s = String::new();
        for (level, node) in self.pre_order_levels() {
            s.push_str(&"  ".repeat(level));
            s.push_str(&node.label.to_string());
            s.push_str(" -> ");
            if let Some(t) = node.tipo {
                s.push_str(&format!("tipo={} ", t));
            }
            s.push_str(&format!("val={}\n", fmt_val(node.val)));
        }
        s
    }
}

impl Drop for AstNode {
    // 逐个摘下子结点释放，避免沿左链递归析构
    fn drop(&mut self) {
        let mut stack: Vec<Box<AstNode>> =
            self.left.take().into_iter().chain(self.right.take()).collect();
        while let Some(mut node) = stack.pop() {
            stack.extend(node.left.take());
            stack.extend(node.right.take());
        }
    }
}
