//! 命令行入口：FIRST/FOLLOW/PREDICT 集合与赋值语句的属性求值

use std::fmt::Display;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::process;

use attrigram::extern_feature::{graphviz, id_tree};
use attrigram::grammar::sets::GrammarSets;
use attrigram::grammar::GRAMMAR;
use attrigram::lex::preprocessor::{normalize, read_session};
use attrigram::mistakes::show::Mis;
use attrigram::mistakes::Error;
use attrigram::semantic::{run_assignment, DivisionPolicy, EvalConfig};
use attrigram::syntax::{fmt_val, AstNode};
use attrigram::table::symbol::SymbolTable;
use clap::Parser;
use graphviz_rust::cmd::Format;
use log::{debug, info, LevelFilter};

#[derive(Parser, Debug)]
#[command(name = "attrigram", version, about)]
struct Cli {
    /// 变量声明，如 "a=4, b=3"，可重复
    #[arg(short = 'd', long = "declare", value_name = "DECLS")]
    declare: Vec<String>,
    /// 从标准输入读取声明（空行结束）和赋值语句
    #[arg(short, long)]
    interactive: bool,
    /// 输出文法与 FIRST/FOLLOW/PREDICT 集合
    #[arg(long)]
    sets: bool,
    /// 输出带属性的语法树
    #[arg(long)]
    ast: bool,
    /// 输出语义规则记录
    #[arg(long)]
    trace: bool,
    /// 输出符号表
    #[arg(long)]
    table: bool,
    /// 语法树的 DOT 文本
    #[arg(long, value_name = "FILE")]
    dot: Option<PathBuf>,
    /// 语法树的 PNG 图片（需要 graphviz）
    #[arg(long, value_name = "FILE")]
    png: Option<PathBuf>,
    /// 语法树的 SVG 布局
    #[arg(long, value_name = "FILE")]
    svg: Option<PathBuf>,
    /// 除零按浮点数规则得到 inf / NaN
    #[arg(long)]
    ieee_division: bool,
    /// 输出调试日志（相当于 RUST_LOG=debug）
    #[arg(short, long)]
    verbose: bool,
    /// 赋值语句，如 "c = a * b + 2"
    assignment: Option<String>,
}

impl Cli {
    /// 未指定任何部分时全部输出
    fn show_all(&self) -> bool {
        !(self.sets || self.ast || self.trace || self.table)
    }
}

fn init_logger(verbose: bool) {
    let env = env_logger::Env::default().default_filter_or("warn");
    let mut builder = env_logger::Builder::from_env(env);
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
}

/// 输出诊断信息并以 1 退出
fn fail(msg: impl Display) -> ! {
    eprint!("{}", msg);
    process::exit(1)
}

fn section(title: &str, body: &str) {
    println!("{}", title);
    print!("{}", body);
    println!();
}

fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let mut declarations = cli.declare.clone();
    let mut assignment = cli.assignment.clone();
    let file = if cli.interactive { "<stdin>" } else { "<argv>" };
    if cli.interactive {
        eprintln!("输入变量声明（如 a=4, b=3），空行结束，再输入赋值语句：");
        let session = match read_session(io::stdin().lock()) {
            Ok(s) => s,
            Err(e) => fail(format!("无法读取标准输入: {}\n", e)),
        };
        declarations.extend(session.declarations);
        if assignment.is_none() {
            assignment = session.assignment;
        }
    }

    let mut table = SymbolTable::new();
    for (i, line) in declarations.iter().enumerate() {
        for e in table.declare_line(line) {
            eprint!("{}", Mis::from_decl(&e, file, i + 1, line));
        }
    }
    debug!("{} variables declared", table.len());

    if cli.show_all() || cli.sets {
        let sets = GrammarSets::compute(&GRAMMAR);
        // 左递归文法，E 与 T 的候选式之间必然冲突
        for (p, q, overlap) in sets.predict.conflicts() {
            debug!("PREDICT conflict between {} and {} on {:?}", p, q, overlap);
        }
        section("GRAMMAR", &GRAMMAR.dump());
        section("FIRST", &sets.dump_first(&GRAMMAR));
        section("FOLLOW", &sets.dump_follow(&GRAMMAR));
        section("PREDICT", &sets.predict.dump());
    }

    let line = normalize(assignment.as_deref().unwrap_or(""));
    let division = match cli.ieee_division {
        true => DivisionPolicy::Ieee,
        false => DivisionPolicy::Fail,
    };
    let (target, evaluation) = match run_assignment(&line, &mut table, EvalConfig { division }) {
        Ok(r) => r,
        Err(e) => fail(Mis::from_error(&e, file, &line)),
    };
    info!("{} = {} ({} rules fired)", target, evaluation.value(), evaluation.trace.len());

    if cli.show_all() || cli.table {
        section("SYMBOL TABLE", &table.dump());
    }
    if cli.show_all() || cli.ast {
        section("AST", &evaluation.ast.dump());
    }
    if cli.show_all() || cli.trace {
        section("TRACE", &evaluation.trace.dump());
    }
    println!("Result of {}: {}", target, fmt_val(evaluation.value()));

    if let Err(e) = write_outputs(&cli, &evaluation.ast) {
        fail(Mis::from_error(&e, file, &line));
    }
}

/// 按参数写出 DOT / PNG / SVG 文件
fn write_outputs(cli: &Cli, ast: &AstNode) -> Result<(), Error> {
    if let Some(path) = &cli.dot {
        fs::write(path, graphviz::to_dot(ast))?;
    }
    if let Some(path) = &cli.png {
        graphviz::render(ast, path, Format::Png)?;
    }
    if let Some(path) = &cli.svg {
        id_tree::write_layout(ast, path)?;
    }
    Ok(())
}
