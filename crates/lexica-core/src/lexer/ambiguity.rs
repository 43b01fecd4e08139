use std::collections::{BTreeSet, HashSet, VecDeque};
use std::rc::Rc;

use super::alphabet::partition;
use super::nfa::{Fragment, Nfa, StateId};

type Subset = Rc<BTreeSet<StateId>>;

struct Node {
    pair: (Subset, Subset),
    /// index of the parent node and the input leading here from it
    parent: Option<(usize, char)>,
}

/// Searches for the shortest non-empty input accepted by both fragments.
///
/// The search is a breadth-first walk over pairs of epsilon-closed subsets,
/// one per fragment, expanding only by code points both sides can consume.
/// Cells are visited in ascending order, so among the shortest witnesses the
/// one picking the smallest code point at each step is returned.
pub(crate) fn find_witness(nfa: &Nfa, a: &Fragment, b: &Fragment) -> Option<Vec<char>> {
    let start = (
        Rc::new(nfa.epsilon_closure([a.start])),
        Rc::new(nfa.epsilon_closure([b.start])),
    );
    // the start pair stays out of `seen` so that a path back to it is found
    let mut seen = HashSet::new();
    let mut nodes = vec![Node {
        pair: start,
        parent: None,
    }];
    let mut queue = VecDeque::from([0]);

    while let Some(idx) = queue.pop_front() {
        let (qa, qb) = nodes[idx].pair.clone();
        if idx != 0 && qa.contains(&a.accept) && qb.contains(&b.accept) {
            return Some(witness(&nodes, idx));
        }

        let out_a = nfa.outgoing(&qa).collect::<Vec<_>>();
        let out_b = nfa.outgoing(&qb).collect::<Vec<_>>();
        let ranges = out_a
            .iter()
            .chain(out_b.iter())
            .flat_map(|(class, _)| class.ranges());

        for cell in partition(ranges) {
            let Some(c) = cell.first_char() else {
                continue;
            };
            let next_a = nfa.step(&out_a, c as u32);
            if next_a.is_empty() {
                continue;
            }
            let next_b = nfa.step(&out_b, c as u32);
            if next_b.is_empty() {
                continue;
            }

            let pair = (Rc::new(next_a), Rc::new(next_b));
            if seen.insert(pair.clone()) {
                queue.push_back(nodes.len());
                nodes.push(Node {
                    pair,
                    parent: Some((idx, c)),
                });
            }
        }
    }

    None
}

fn witness(nodes: &[Node], mut idx: usize) -> Vec<char> {
    let mut out = Vec::new();
    while let Some((parent, c)) = nodes[idx].parent {
        out.push(c);
        idx = parent;
    }
    out.reverse();
    out
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lexer::nfa::{Builder, State};
    use crate::lexer::parser::parse;
    use crate::lexer::pattern::PatternId;

    fn witness_of(a: &str, b: &str) -> Option<String> {
        let mut builder = Builder::default();
        let root = builder.push(State::Split { targets: vec![] });
        let fa = parse(a).unwrap().to_nfa(&mut builder, PatternId::new(0));
        let fb = parse(b).unwrap().to_nfa(&mut builder, PatternId::new(1));
        let nfa = builder.build(root);
        find_witness(&nfa, &fa, &fb).map(String::from_iter)
    }

    #[test]
    fn shortest_common_input() {
        assert_eq!(witness_of("a+", "a+b?").as_deref(), Some("a"));
        assert_eq!(witness_of("[a-z]+", "if").as_deref(), Some("if"));
        assert_eq!(witness_of("x*yz", "[w-z]+").as_deref(), Some("yz"));
    }

    #[test]
    fn smallest_code_point_wins_ties() {
        assert_eq!(witness_of("[b-d][0-9]", "[a-c][5-9]").as_deref(), Some("b5"));
    }

    #[test]
    fn disjoint_languages_have_no_witness() {
        assert_eq!(witness_of("a+", "b+"), None);
        assert_eq!(witness_of("ab", "abc"), None);
        assert_eq!(witness_of("[^a]", "a"), None);
    }

    #[test]
    fn the_empty_input_is_not_a_witness() {
        assert_eq!(witness_of("a*", "b*"), None);
        assert_eq!(witness_of("a*", "ba?"), None);
        assert_eq!(witness_of("a*", "(aa)?"), Some("aa".to_owned()));
    }
}
