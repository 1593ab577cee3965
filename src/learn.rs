//! The averaged-perceptron learner: the training loop (early update against the dynamic oracle,
//! with lazy sparse averaging) and greedy inference.

use crate::features::{FeatureKey, FeatureNode};
use crate::moves::{enumerate_moves, LabeledMove, Move};
use crate::sentence::Sentence;
use crate::state::ParseState;
use crate::transition::{
    allowed_labeled_moves, enforce_arc_constraints, enforce_span_constraints, oracle, perform_move,
    update_span_states,
};
use crate::weights::WeightStore;

pub struct Learner {
    moves: Vec<LabeledMove>,
    weights: WeightStore,
    feature_tree: FeatureNode,
    num_updates: u64,
}

impl Learner {
    pub fn new(num_labels: usize, feature_tree: FeatureNode) -> Self {
        let moves = enumerate_moves(num_labels);
        let block_size = moves.len();
        Learner {
            moves,
            weights: WeightStore::new(block_size),
            feature_tree,
            num_updates: 0,
        }
    }

    fn legal_moves(&self, state: &ParseState, sent: &Sentence) -> crate::moves::LabeledMoveSet {
        let mut legal = allowed_labeled_moves(state);
        if !sent.arc_constraints.is_empty() {
            legal = enforce_arc_constraints(legal, state, &sent.arc_constraints);
        }
        if !sent.span_constraints.is_empty() {
            legal = enforce_span_constraints(legal, state, &sent.span_constraints, &state.span_states);
        }
        legal
    }

    fn extract_features(&self, state: &ParseState, sent: &Sentence) -> Vec<FeatureKey> {
        let mut keys = Vec::new();
        self.feature_tree.fill_features(state, sent, &mut keys, 0);
        keys
    }

    /// Scores every move in `candidates` under the current weights, for the given feature keys.
    fn score_moves(&self, keys: &[FeatureKey], candidates: &crate::moves::LabeledMoveSet) -> Vec<f32> {
        let mut scores = vec![0.0f32; self.moves.len()];
        for key in keys {
            if let Some(block) = self.weights.lookup(key.table_key()) {
                for (i, lmove) in self.moves.iter().enumerate() {
                    if candidates.test(lmove) {
                        scores[i] += block[i].live * key.value;
                    }
                }
            }
        }
        scores
    }

    /// Picks the highest-scoring move among `candidates`, breaking ties toward the
    /// later-enumerated move (the comparison is `>=`).
    fn argmax_move(&self, scores: &[f32], candidates: &crate::moves::LabeledMoveSet) -> usize {
        let mut best: Option<usize> = None;
        for (i, lmove) in self.moves.iter().enumerate() {
            if !candidates.test(lmove) {
                continue;
            }
            match best {
                None => best = Some(i),
                Some(b) => {
                    if scores[i] >= scores[b] {
                        best = Some(i);
                    }
                }
            }
        }
        best.expect("candidate set must be non-empty at a non-terminal state")
    }

    /// Applies a sparse averaged-perceptron update that rewards `gold` and penalizes `pred` for
    /// every feature key currently active, lazily catching up each touched slot's accumulator.
    fn do_update(&mut self, keys: &[FeatureKey], pred: usize, gold: usize) {
        self.num_updates += 1;
        let n = self.num_updates;
        for key in keys {
            let block = self.weights.get_or_insert(key.table_key());
            for &m in &[gold, pred] {
                let w = &mut block[m];
                if w.timestamp != 0 {
                    let elapsed = n - w.timestamp - 1;
                    w.acc += elapsed as f32 * w.live;
                } else {
                    // first touch of this slot: nothing yet to catch up.
                }
                w.timestamp = n;
            }
            block[gold].live += key.value;
            block[gold].acc += key.value;
            block[pred].live -= key.value;
            block[pred].acc -= key.value;
        }
    }

    /// Trains for `num_rounds` passes over `sentences`, following the gold move at every step
    /// (early update).
    pub fn fit(&mut self, sentences: &[Sentence], num_rounds: usize) {
        for round in 0..num_rounds {
            let mut correct = 0u64;
            let mut total = 0u64;
            for sent in sentences {
                let mut state = ParseState::new(sent);
                while !state.is_terminal() {
                    let keys = self.extract_features(&state, sent);
                    let legal = self.legal_moves(&state, sent);
                    let gold_set = oracle(&state, sent, &legal);
                    let scores = self.score_moves(&keys, &legal);

                    let pred = self.argmax_move(&scores, &legal);
                    let gold = self.argmax_move(&scores, &gold_set);

                    total += 1;
                    if self.moves[pred] == self.moves[gold] {
                        correct += 1;
                    } else {
                        self.do_update(&keys, pred, gold);
                    }

                    let gold_move = self.moves[gold];
                    let mut span_states = state.span_states.clone();
                    update_span_states(&gold_move, &state, &sent.span_constraints, &mut span_states);
                    state.span_states = span_states;
                    perform_move(&gold_move, &mut state);
                }
            }
            log::info!(
                "round {}/{}: {correct}/{total} correct ({:.1}%)",
                round + 1,
                num_rounds,
                100.0 * correct as f64 / total.max(1) as f64
            );
        }
        self.weights.finalize(self.num_updates);
    }

    /// Greedily parses `sent` using the current (averaged, post-`fit`) weights.
    pub fn parse(&self, sent: &Sentence) -> (Vec<i32>, Vec<i32>) {
        let mut state = ParseState::new(sent);
        while !state.is_terminal() {
            let keys = self.extract_features(&state, sent);
            let legal = self.legal_moves(&state, sent);
            let scores = self.score_moves(&keys, &legal);
            let pred = self.argmax_move(&scores, &legal);
            let lmove = self.moves[pred];
            let mut span_states = state.span_states.clone();
            update_span_states(&lmove, &state, &sent.span_constraints, &mut span_states);
            state.span_states = span_states;
            perform_move(&lmove, &mut state);
        }
        (state.heads, state.labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentence::{Attribute, NamespaceFront, Token};
    use crate::state::LocationName;

    fn toy_sentence() -> Sentence {
        // "dog(det) root": dog attaches to root with label 0.
        let mut dog = Token {
            id: "dog".to_string(),
            index: 0,
            head: 1,
            label: 0,
            namespaces: vec![],
        };
        let mut ns = NamespaceFront::new(0, -1);
        ns.attributes.push(Attribute::new(0, 1.0));
        dog.namespaces.push(ns);

        let root = Token {
            id: "root".to_string(),
            index: 1,
            head: -1,
            label: 1,
            namespaces: vec![],
        };

        Sentence {
            tokens: vec![dog, root],
            arc_constraints: vec![],
            span_constraints: vec![],
        }
    }

    fn toy_feature_tree() -> FeatureNode {
        FeatureNode::UnionList {
            members: vec![FeatureNode::Location {
                location: LocationName::S0,
                namespace_id: 0,
                token_specific_ns: -1,
            }],
        }
    }

    #[test]
    fn fit_then_parse_recovers_the_gold_tree_on_a_toy_sentence() {
        let sent = toy_sentence();
        let mut learner = Learner::new(2, toy_feature_tree());
        learner.fit(&[sent.clone()], 10);
        let (heads, labels) = learner.parse(&sent);
        assert_eq!(heads, vec![1, -1]);
        assert_eq!(labels, vec![0, -1]);
    }
}
