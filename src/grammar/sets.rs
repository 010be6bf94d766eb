//! FIRST / FOLLOW / PREDICT 集合
//!
//! FIRST 与 FOLLOW 均为不动点迭代：每一轮扫描全部产生式，集合只增不减，
//! 某一轮没有任何集合发生变化时结束。集合大小受终结符个数限制，所以一定终止。
//! FIRST 只看产生式体的第一个符号（本文法中没有产生式体以可推出空串的非终结符开头）

use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use super::{Grammar, Production, Symbol, END, EPSILON};

/// 非终结符 -> 终结符集合
pub type SetMap = BTreeMap<Symbol, BTreeSet<Symbol>>;

fn fmt_set(set: &BTreeSet<Symbol>) -> String {
    let items: Vec<&str> = set.iter().map(|s| s.as_str()).collect();
    format!("{{{}}}", items.join(", "))
}

/// 保证每个非终结符都有一项
fn cover(grammar: &Grammar, mut map: SetMap) -> SetMap {
    for nt in grammar.nonterminals() {
        map.entry(nt.clone()).or_default();
    }
    map
}

fn insert_all(target: &mut BTreeSet<Symbol>, add: BTreeSet<Symbol>) -> bool {
    let mut changed = false;
    for s in add {
        changed |= target.insert(s);
    }
    changed
}

/// FIRST 集合的一轮扫描，返回是否有集合变化
fn first_pass(grammar: &Grammar, first: &mut SetMap) -> bool {
    let mut changed = false;
    for p in grammar.productions() {
        let s = p.first_symbol();
        let add = match grammar.is_nonterminal(s) {
            true => first.get(s).cloned().unwrap_or_default(),
            false => BTreeSet::from([s.to_string()]),
        };
        changed |= insert_all(first.entry(p.lhs().to_string()).or_default(), add);
    }
    changed
}

/// FOLLOW 集合的一轮扫描，返回是否有集合变化
fn follow_pass(grammar: &Grammar, first: &SetMap, follow: &mut SetMap) -> bool {
    let mut changed = false;
    for p in grammar.productions() {
        let rhs = p.rhs();
        for (i, s) in rhs.iter().enumerate() {
            if !grammar.is_nonterminal(s) {
                continue;
            }
            let add: BTreeSet<Symbol> = match rhs.get(i + 1) {
                Some(next) if grammar.is_nonterminal(next) => first
                    .get(next)
                    .map(|f| f.iter().filter(|x| *x != EPSILON).cloned().collect())
                    .unwrap_or_default(),
                Some(next) if next == EPSILON => BTreeSet::new(),
                Some(next) => BTreeSet::from([next.clone()]),
                None => follow.get(p.lhs()).cloned().unwrap_or_default(),
            };
            changed |= insert_all(follow.entry(s.clone()).or_default(), add);
        }
    }
    changed
}

pub fn compute_first(grammar: &Grammar) -> SetMap {
    first_from(grammar, SetMap::new())
}

/// 从给定初值开始迭代 FIRST 集合
pub fn first_from(grammar: &Grammar, seed: SetMap) -> SetMap {
    let mut first = cover(grammar, seed);
    let mut pass = 0;
    loop {
        pass += 1;
        let changed = first_pass(grammar, &mut first);
        debug!("FIRST pass {}: changed = {}", pass, changed);
        if !changed {
            return first;
        }
    }
}

pub fn compute_follow(grammar: &Grammar, first: &SetMap) -> SetMap {
    follow_from(grammar, first, SetMap::new())
}

/// 从给定初值开始迭代 FOLLOW 集合，开始符号总会加入 $
pub fn follow_from(grammar: &Grammar, first: &SetMap, seed: SetMap) -> SetMap {
    let mut follow = cover(grammar, seed);
    follow.entry(grammar.start().to_string()).or_default().insert(END.to_string());
    let mut pass = 0;
    loop {
        pass += 1;
        let changed = follow_pass(grammar, first, &mut follow);
        debug!("FOLLOW pass {}: changed = {}", pass, changed);
        if !changed {
            return follow;
        }
    }
}

/// 每条产生式的预测集合，按产生式顺序
#[derive(Debug, Clone, PartialEq)]
pub struct PredictSets {
    entries: Vec<(Production, BTreeSet<Symbol>)>,
}

impl PredictSets {
    pub fn get(&self, lhs: &str, rhs: &[&str]) -> Option<&BTreeSet<Symbol>> {
        self.entries
            .iter()
            .find(|(p, _)| {
                p.lhs() == lhs && p.rhs().iter().map(|s| s.as_str()).eq(rhs.iter().copied())
            })
            .map(|(_, set)| set)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Production, BTreeSet<Symbol>)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 同一非终结符的两个候选式预测集合相交，即 LL(1) 冲突
    pub fn conflicts(&self) -> Vec<(&Production, &Production, BTreeSet<Symbol>)> {
        let mut r = vec![];
        for (i, (p, a)) in self.entries.iter().enumerate() {
            for (q, b) in &self.entries[i + 1..] {
                if p.lhs() != q.lhs() {
                    continue;
                }
                let common: BTreeSet<Symbol> = a.intersection(b).cloned().collect();
                if !common.is_empty() {
                    r.push((p, q, common));
                }
            }
        }
        r
    }

    pub fn dump(&self) -> String {
        let mut s = String::new();
        for (p, set) in &self.entries {
            s.push_str(&format!("PREDICT({}) = {}\n", p, fmt_set(set)));
        }
        s
    }
}

/// 只读取已经稳定的 FIRST 与 FOLLOW，一次扫描
pub fn compute_predict(grammar: &Grammar, first: &SetMap, follow: &SetMap) -> PredictSets {
    let entries = grammar
        .productions()
        .iter()
        .map(|p| {
            let s = p.first_symbol();
            let mut set = match grammar.is_nonterminal(s) {
                true => first.get(s).cloned().unwrap_or_default(),
                false => BTreeSet::from([s.to_string()]),
            };
            if set.remove(EPSILON) {
                set.extend(follow.get(p.lhs()).cloned().unwrap_or_default());
            }
            (p.clone(), set)
        })
        .collect();
    PredictSets { entries }
}

/// 三种集合一起计算
#[derive(Debug, Clone)]
pub struct GrammarSets {
    pub first: SetMap,
    pub follow: SetMap,
    pub predict: PredictSets,
}

impl GrammarSets {
    pub fn compute(grammar: &Grammar) -> Self {
        let first = compute_first(grammar);
        let follow = compute_follow(grammar, &first);
        let predict = compute_predict(grammar, &first, &follow);
        Self { first, follow, predict }
    }

    /// 按文法中非终结符的顺序输出
    pub fn dump_first(&self, grammar: &Grammar) -> String {
        dump_map("FIRST", &self.first, grammar)
    }

    pub fn dump_follow(&self, grammar: &Grammar) -> String {
        dump_map("FOLLOW", &self.follow, grammar)
    }
}

fn dump_map(name: &str, map: &SetMap, grammar: &Grammar) -> String {
    let mut s = String::new();
    for nt in grammar.nonterminals() {
        if let Some(set) = map.get(nt) {
            s.push_str(&format!("{}({}) = {}\n", name, nt, fmt_set(set)));
        }
    }
    s
}

#[cfg(test)]
mod sets_tests {
    use super::*;
    use crate::grammar::GRAMMAR;

    macro_rules! set {
        ($($s:expr),*) => {
            BTreeSet::<Symbol>::from([$($s.to_string()),*])
        };
    }

    #[test]
    fn test_first() {
        let first = compute_first(&GRAMMAR);
        assert_eq!(first.len(), 3);
        for nt in ["E", "T", "F"] {
            assert_eq!(first[nt], set!["(", "id", "num"]);
        }
    }

    #[test]
    fn test_follow() {
        let first = compute_first(&GRAMMAR);
        let follow = compute_follow(&GRAMMAR, &first);
        assert_eq!(follow["E"], set!["$", "+", "-", ")"]);
        assert_eq!(follow["T"], set!["$", "+", "-", ")", "*", "/"]);
        assert_eq!(follow["F"], set!["$", "+", "-", ")", "*", "/"]);
    }

    #[test]
    fn test_predict() {
        let sets = GrammarSets::compute(&GRAMMAR);
        let predict = &sets.predict;
        assert_eq!(predict.len(), 9);
        assert_eq!(predict.get("F", &["(", "E", ")"]), Some(&set!["("]));
        assert_eq!(predict.get("F", &["id"]), Some(&set!["id"]));
        assert_eq!(predict.get("F", &["num"]), Some(&set!["num"]));
        assert_eq!(predict.get("E", &["E", "+", "T"]), Some(&set!["(", "id", "num"]));
        assert_eq!(predict.get("F", &["E"]), None);
        // 左递归，E 与 T 的候选式互相冲突，F 的候选式两两不相交
        let conflicts = predict.conflicts();
        assert!(!conflicts.is_empty());
        assert!(conflicts.iter().all(|(p, _, _)| p.lhs() != "F"));
    }

    #[test]
    fn test_predict_replaces_epsilon() {
        let g = Grammar::new("S", vec![
            Production::new("S", &["A", "b"]),
            Production::new("A", &["a"]),
            Production::new("A", &[EPSILON]),
        ]).unwrap();
        let sets = GrammarSets::compute(&g);
        assert_eq!(sets.first["A"], set!["a", EPSILON]);
        assert_eq!(sets.follow["A"], set!["b"]);
        assert_eq!(sets.predict.get("A", &[EPSILON]), Some(&set!["b"]));
        assert_eq!(sets.predict.get("A", &["a"]), Some(&set!["a"]));
    }

    #[test]
    fn test_fixed_point_is_stable() {
        let first = compute_first(&GRAMMAR);
        assert_eq!(first_from(&GRAMMAR, first.clone()), first);
        let follow = compute_follow(&GRAMMAR, &first);
        assert_eq!(follow_from(&GRAMMAR, &first, follow.clone()), follow);
    }

    #[test]
    fn test_passes_are_monotonic() {
        let mut first = cover(&GRAMMAR, SetMap::new());
        loop {
            let before = first.clone();
            let changed = first_pass(&GRAMMAR, &mut first);
            for (nt, set) in &before {
                assert!(set.is_subset(&first[nt]));
            }
            if !changed {
                break;
            }
        }
        let mut follow = cover(&GRAMMAR, SetMap::new());
        follow.get_mut("E").unwrap().insert(END.to_string());
        loop {
            let before = follow.clone();
            let changed = follow_pass(&GRAMMAR, &first, &mut follow);
            for (nt, set) in &before {
                assert!(set.is_subset(&follow[nt]));
            }
            if !changed {
                break;
            }
        }
        assert_eq!(follow, compute_follow(&GRAMMAR, &first));
    }

    #[test]
    fn test_start_always_has_end() {
        let g = Grammar::new("S", vec![Production::new("S", &["x"])]).unwrap();
        let first = compute_first(&g);
        assert_eq!(compute_follow(&g, &first)["S"], set!["$"]);
        assert!(compute_follow(&GRAMMAR, &compute_first(&GRAMMAR))["E"].contains(END));
    }

    #[test]
    fn test_dump() {
        let sets = GrammarSets::compute(&GRAMMAR);
        assert_eq!(
            sets.dump_first(&GRAMMAR),
            "FIRST(E) = {(, id, num}\nFIRST(T) = {(, id, num}\nFIRST(F) = {(, id, num}\n"
        );
        assert!(sets.dump_follow(&GRAMMAR).starts_with("FOLLOW(E) = {$, ), +, -}\n"));
        assert!(sets.predict.dump().contains("PREDICT(F → ( E )) = {(}\n"));
    }
}
