//! The feature tree: a tagged union of `Location`, `CartesianProduct`, and `UnionList` nodes,
//! evaluated against a configuration to grow a multiset of sparse [`FeatureKey`]s.
//!
//! Modeled as a tagged union rather than a trait-object hierarchy: there are exactly three node
//! shapes, evaluation always dispatches on all of them together, and a `match` is both cheaper
//! and easier to exhaustively reason about than virtual calls.

use crate::features::key::FeatureKey;
use crate::sentence::Sentence;
use crate::state::{LocationName, ParseState};

#[derive(Debug, Clone)]
pub enum FeatureNode {
    Location {
        location: LocationName,
        namespace_id: i32,
        token_specific_ns: i32,
    },
    CartesianProduct {
        lhs: Box<FeatureNode>,
        rhs: Box<FeatureNode>,
    },
    UnionList {
        members: Vec<FeatureNode>,
    },
}

impl FeatureNode {
    /// Whether this node can currently produce anything: a `Location` is good when its token
    /// index is defined and that token carries a matching namespace; compound nodes are good
    /// when their children are.
    pub fn good(&self, state: &ParseState, sent: &Sentence) -> bool {
        match self {
            FeatureNode::Location {
                location,
                namespace_id,
                token_specific_ns,
            } => {
                let idx = state.location(*location);
                idx >= 0
                    && sent.tokens[idx as usize]
                        .namespace(*namespace_id, *token_specific_ns)
                        .is_some()
            }
            FeatureNode::CartesianProduct { lhs, rhs } => lhs.good(state, sent) && rhs.good(state, sent),
            FeatureNode::UnionList { members } => members.iter().any(|m| m.good(state, sent)),
        }
    }

    /// Extends `out[start_index..]` in place. The contract:
    /// - `Location` combines every existing key in the range with every attribute of the
    ///   matching namespace front, replacing the range with the expanded set (or clearing it if
    ///   the location or namespace is absent).
    /// - `CartesianProduct` is **chained**: `lhs` fills the range first, then `rhs` fills the
    ///   resulting (already-`lhs`-expanded) range. This is a deliberate departure from the
    ///   original combiner, which calls both children at the same `start_index`; the chained
    ///   reading is the one this crate implements.
    /// - `UnionList` seeds one fresh key per good member and lets that member fill from it.
    pub fn fill_features(&self, state: &ParseState, sent: &Sentence, out: &mut Vec<FeatureKey>, start_index: usize) {
        match self {
            FeatureNode::Location {
                location,
                namespace_id,
                token_specific_ns,
            } => {
                let idx = state.location(*location);
                if idx < 0 {
                    out.truncate(start_index);
                    return;
                }
                let ns = sent.tokens[idx as usize].namespace(*namespace_id, *token_specific_ns);
                let Some(ns) = ns else {
                    out.truncate(start_index);
                    return;
                };
                if ns.attributes.is_empty() {
                    out.truncate(start_index);
                    return;
                }
                let prefix: Vec<FeatureKey> = out.drain(start_index..).collect();
                for f in &prefix {
                    for attr in ns.attributes.iter() {
                        out.push(f.combine(attr.id, attr.value));
                    }
                }
            }
            FeatureNode::CartesianProduct { lhs, rhs } => {
                lhs.fill_features(state, sent, out, start_index);
                rhs.fill_features(state, sent, out, start_index);
            }
            FeatureNode::UnionList { members } => {
                for (i, member) in members.iter().enumerate() {
                    if !member.good(state, sent) {
                        continue;
                    }
                    out.push(FeatureKey::seed(i));
                    let seed_index = out.len() - 1;
                    member.fill_features(state, sent, out, seed_index);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentence::{Attribute, NamespaceFront, Token};

    fn token_with_attrs(namespace_id: i32, attrs: &[(i32, f32)]) -> Token {
        let mut ns = NamespaceFront::new(namespace_id, -1);
        for &(id, value) in attrs {
            ns.attributes.push(Attribute::new(id, value));
        }
        Token {
            id: "t".to_string(),
            index: 0,
            head: -1,
            label: -1,
            namespaces: vec![ns],
        }
    }

    fn state_at(loc: LocationName, idx: i32, len: usize) -> ParseState {
        let sent = Sentence {
            tokens: (0..len)
                .map(|i| Token {
                    id: format!("w{i}"),
                    index: i,
                    head: -1,
                    label: -1,
                    namespaces: vec![],
                })
                .collect(),
            arc_constraints: vec![],
            span_constraints: vec![],
        };
        let mut state = ParseState::new(&sent);
        state.locations[loc as usize] = idx;
        state
    }

    #[test]
    fn location_clears_range_when_undefined() {
        let state = state_at(LocationName::S0, -1, 2);
        let sent = Sentence {
            tokens: vec![token_with_attrs(0, &[(1, 1.0)]), Token::default()],
            arc_constraints: vec![],
            span_constraints: vec![],
        };
        let node = FeatureNode::Location {
            location: LocationName::S0,
            namespace_id: 0,
            token_specific_ns: -1,
        };
        let mut out = vec![FeatureKey::seed(0)];
        node.fill_features(&state, &sent, &mut out, 0);
        assert!(out.is_empty());
    }

    #[test]
    fn location_expands_one_key_per_attribute() {
        let state = state_at(LocationName::S0, 0, 2);
        let sent = Sentence {
            tokens: vec![token_with_attrs(0, &[(1, 1.0), (2, 1.0)]), Token::default()],
            arc_constraints: vec![],
            span_constraints: vec![],
        };
        let node = FeatureNode::Location {
            location: LocationName::S0,
            namespace_id: 0,
            token_specific_ns: -1,
        };
        let mut out = vec![FeatureKey::seed(0)];
        node.fill_features(&state, &sent, &mut out, 0);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn cartesian_product_chains_sequentially() {
        // S0 has 2 attributes in ns 0, N0 has 2 attributes in ns 1: chained extension produces
        // 1 seed -> 2 (after lhs) -> 4 (after rhs), matching the pinned semantics.
        let mut s0 = token_with_attrs(0, &[(1, 1.0), (2, 1.0)]);
        s0.index = 0;
        let mut n0 = token_with_attrs(1, &[(3, 1.0), (4, 1.0)]);
        n0.index = 1;
        let sent = Sentence {
            tokens: vec![s0, n0, Token::default()],
            arc_constraints: vec![],
            span_constraints: vec![],
        };
        let mut state = ParseState::new(&sent);
        state.locations[LocationName::S0 as usize] = 0;
        state.locations[LocationName::N0 as usize] = 1;

        let node = FeatureNode::CartesianProduct {
            lhs: Box::new(FeatureNode::Location {
                location: LocationName::S0,
                namespace_id: 0,
                token_specific_ns: -1,
            }),
            rhs: Box::new(FeatureNode::Location {
                location: LocationName::N0,
                namespace_id: 1,
                token_specific_ns: -1,
            }),
        };

        let mut out = vec![FeatureKey::seed(0)];
        node.fill_features(&state, &sent, &mut out, 0);
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn union_list_seeds_one_key_per_good_member() {
        let mut s0 = token_with_attrs(0, &[(1, 1.0)]);
        s0.index = 0;
        let sent = Sentence {
            tokens: vec![s0, Token::default()],
            arc_constraints: vec![],
            span_constraints: vec![],
        };
        let mut state = ParseState::new(&sent);
        state.locations[LocationName::S0 as usize] = 0;
        state.locations[LocationName::N0 as usize] = -1;

        let node = FeatureNode::UnionList {
            members: vec![
                FeatureNode::Location {
                    location: LocationName::S0,
                    namespace_id: 0,
                    token_specific_ns: -1,
                },
                FeatureNode::Location {
                    location: LocationName::N0,
                    namespace_id: 0,
                    token_specific_ns: -1,
                },
            ],
        };

        let mut out = Vec::new();
        node.fill_features(&state, &sent, &mut out, 0);
        // only the S0 member is good; the N0 member contributes nothing.
        assert_eq!(out.len(), 1);
    }
}
