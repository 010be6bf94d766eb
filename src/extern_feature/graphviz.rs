//! 语法树转成 DOT 图，需要时调用 graphviz 生成图片

use std::path::Path;

use graphviz_rust::cmd::{CommandArg, Format};
use graphviz_rust::dot_structures::{
    Attribute, Edge, EdgeTy, Graph, Id, Node, NodeId as DotId, Stmt, Vertex,
};
use graphviz_rust::exec;
use graphviz_rust::printer::{DotPrinter, PrinterContext};
use log::debug;

use crate::mistakes::Error;
use crate::syntax::{fmt_val, AstNode};

fn dot_id(node: &AstNode) -> DotId {
    DotId(Id::Plain(node.id().to_string()), None)
}

fn attr(key: &str, value: String) -> Attribute {
    Attribute(Id::Plain(key.to_string()), Id::Escaped(format!("\"{}\"", value)))
}

fn label(node: &AstNode) -> String {
    let mut s = format!("{}\\nval={}", node.label(), fmt_val(node.val()));
    if let Some(tipo) = node.tipo() {
        s.push_str(&format!("\\ntipo={}", tipo));
    }
    s
}

pub fn to_graph(ast: &AstNode) -> Graph {
    let mut stmts = Vec::new();
    for node in ast.pre_order() {
        let mut attributes = vec![attr("label", label(node))];
        if node.is_leaf() {
            attributes.push(attr("shape", "box".to_string()));
        }
        stmts.push(Stmt::Node(Node::new(dot_id(node), attributes)));
        for c in node.children() {
            stmts.push(Stmt::Edge(Edge {
                ty: EdgeTy::Pair(Vertex::N(dot_id(node)), Vertex::N(dot_id(c))),
                attributes: vec![],
            }));
        }
    }
    Graph::DiGraph { id: Id::Plain("ast".to_string()), strict: false, stmts }
}

pub fn to_dot(ast: &AstNode) -> String {
    let mut ctx = PrinterContext::default();
    to_graph(ast).print(&mut ctx)
}

/// 调用 dot 程序输出图片
pub fn render(ast: &AstNode, path: &Path, format: Format) -> Result<(), Error> {
    let output = path
        .to_str()
        .ok_or_else(|| Error::Render(format!("path is not valid UTF-8: {}", path.display())))?
        .to_string();
    debug!("rendering AST to {}", output);
    let mut ctx = PrinterContext::default();
    ctx.always_inline();
    exec(to_graph(ast), &mut ctx, vec![CommandArg::Format(format), CommandArg::Output(output)])?;
    Ok(())
}

#[cfg(test)]
mod extern_graphviz_tests {
    use crate::lex::analysis::tokenize;
    use crate::semantic::evaluate;
    use crate::table::symbol::{SymbolTable, TypeTag};

    use super::*;

    fn ast_of(src: &str) -> AstNode {
        let mut t = SymbolTable::new();
        t.insert("a", 4.0, TypeTag::Int);
        evaluate(&tokenize(src).unwrap(), &t).unwrap().ast
    }

    #[test]
    fn test_graph_statements() {
        let ast = ast_of("a * 2");
        match to_graph(&ast) {
            Graph::DiGraph { id, strict, stmts } => {
                assert_eq!(id, Id::Plain("ast".to_string()));
                assert!(!strict);
                let nodes = stmts.iter().filter(|s| matches!(s, Stmt::Node(_))).count();
                let edges = stmts.iter().filter(|s| matches!(s, Stmt::Edge(_))).count();
                assert_eq!(nodes, 3);
                assert_eq!(edges, 2);
            }
            Graph::Graph { .. } => panic!("expected a digraph"),
        }
    }

    #[test]
    fn test_dot_text() {
        let dot = to_dot(&ast_of("a * 2"));
        assert!(dot.starts_with("digraph ast"));
        assert!(dot.contains("n2 -> n0"));
        assert!(dot.contains("n2 -> n1"));
        assert!(dot.contains("op(*)\\nval=8.0"));
        assert!(dot.contains("id(a)\\nval=4.0\\ntipo=INT"));
    }
}
