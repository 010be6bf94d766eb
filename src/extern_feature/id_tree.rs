//! 语法树转成 id_tree 的树，用 id_tree_layout 输出 SVG

use std::path::Path;

use id_tree::InsertBehavior::{AsRoot, UnderNode};
use id_tree::{Node, NodeId as TreeId, Tree};
use id_tree_layout::{Layouter, Visualize};

use crate::mistakes::Error;
use crate::syntax::{fmt_val, AstNode, Label, NodeId};
use crate::table::symbol::TypeTag;

/// 树中保存的结点信息（不含子结点）
#[derive(Debug, Clone, PartialEq)]
pub struct AstView {
    pub id: NodeId,
    pub label: Label,
    pub tipo: Option<TypeTag>,
    pub val: f64,
}

impl AstView {
    fn of(node: &AstNode) -> Self {
        Self { id: node.id(), label: node.label().clone(), tipo: node.tipo(), val: node.val() }
    }
}

impl Visualize for AstView {
    fn visualize(&self) -> String {
        format!("{} val={}", self.label, fmt_val(self.val))
    }

    fn emphasize(&self) -> bool {
        self.tipo.is_some()
    }
}

pub type AstTree = Tree<AstView>;

pub fn to_tree(ast: &AstNode) -> Result<AstTree, Error> {
    let mut tree = AstTree::new();
    let root = tree
        .insert(Node::new(AstView::of(ast)), AsRoot)
        .map_err(|e| Error::Render(format!("{:?}", e)))?;
    let mut stack: Vec<(TreeId, &AstNode)> = vec![(root, ast)];
    while let Some((parent, node)) = stack.pop() {
        for c in node.children() {
            let id = tree
                .insert(Node::new(AstView::of(c)), UnderNode(&parent))
                .map_err(|e| Error::Render(format!("{:?}", e)))?;
            stack.push((id, c));
        }
    }
    Ok(tree)
}

/// 缩进形式输出
pub fn dump(tree: &AstTree) -> Result<String, Error> {
    let mut s = String::new();
    tree.write_formatted(&mut s).map_err(|e| Error::Render(e.to_string()))?;
    Ok(s)
}

pub fn write_layout(ast: &AstNode, path: &Path) -> Result<(), Error> {
    let tree = to_tree(ast)?;
    Layouter::new(&tree)
        .with_file_path(path)
        .write()
        .map_err(|e| Error::Render(format!("{:?}", e)))
}

#[cfg(test)]
mod extern_id_tree_tests {
    use crate::lex::analysis::tokenize;
    use crate::semantic::evaluate;
    use crate::table::symbol::SymbolTable;

    use super::*;

    fn tree_of(src: &str) -> AstTree {
        let mut t = SymbolTable::new();
        t.insert("a", 4.0, TypeTag::Int);
        let ev = evaluate(&tokenize(src).unwrap(), &t).unwrap();
        to_tree(&ev.ast).unwrap()
    }

    #[test]
    fn test_shape() {
        let tree = tree_of("(a + 1) * 2");
        let root_id = tree.root_node_id().unwrap();
        assert_eq!(tree.get(root_id).unwrap().data().label.to_string(), "op(*)");

        let mut childerns = tree.children(root_id).unwrap();
        let group = childerns.next().unwrap();
        assert_eq!(group.data().label, Label::Group);
        assert_eq!(childerns.next().unwrap().data().label, Label::Num("2".to_string()));
        assert!(childerns.next().is_none());
        assert_eq!(tree.traverse_pre_order(root_id).unwrap().count(), 6);
    }

    #[test]
    fn test_ancestors() {
        let tree = tree_of("(a + 1) * 2");
        let root_id = tree.root_node_id().unwrap().clone();
        let leaf = tree
            .traverse_pre_order_ids(&root_id)
            .unwrap()
            .find(|id| tree.get(id).unwrap().data().label == Label::Id("a".to_string()))
            .unwrap();
        let labels: Vec<String> =
            tree.ancestors(&leaf).unwrap().map(|n| n.data().label.to_string()).collect();
        assert_eq!(labels, vec!["op(+)", "()", "op(*)"]);
    }

    #[test]
    fn test_visualize() {
        let tree = tree_of("a");
        let root = tree.get(tree.root_node_id().unwrap()).unwrap().data();
        assert_eq!(root.visualize(), "id(a) val=4.0");
        assert!(root.emphasize());
    }

    #[test]
    fn test_long_chain() {
        let tree = tree_of(&vec!["1"; 20_000].join(" - "));
        let root_id = tree.root_node_id().unwrap();
        assert_eq!(tree.traverse_pre_order(root_id).unwrap().count(), 39_999);
    }

    #[test]
    fn test_dump() {
        let s = dump(&tree_of("a + 1")).unwrap();
        assert_eq!(s.lines().count(), 3);
        assert!(s.lines().next().unwrap().contains("Op(Add)"));
    }

    #[test]
    fn test_write_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ast.svg");
        let mut t = SymbolTable::new();
        t.insert("a", 4.0, TypeTag::Int);
        let ev = evaluate(&tokenize("a * 2").unwrap(), &t).unwrap();
        write_layout(&ev.ast, &path).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("<svg"));
    }
}
