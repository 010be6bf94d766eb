//! 借助外部库输出语法树

pub mod graphviz;
pub mod id_tree;
