//! The arc-eager transition system: move execution, structural legality, the dynamic oracle, and
//! the arc/span constraint layer.

use crate::moves::{LabeledMove, LabeledMoveSet, Move, ANY_LABEL};
use crate::sentence::{ArcConstraint, Sentence, SpanConstraint};
use crate::state::{ParseState, UNDEFINED};

/// Applies `lmove` to `state`, mutating the stack, buffer pointer, and head/label arrays, then
/// recomputes the `locations` cache. Panics if the move's preconditions do not hold; the caller
/// (the learner's inner loop and `parse`) only ever applies moves drawn from a legal or oracle
/// set, so a violation here indicates a bug rather than a malformed corpus.
pub fn perform_move(lmove: &LabeledMove, state: &mut ParseState) {
    match lmove.mv {
        Move::Shift => {
            assert!(state.n0 < state.length - 1, "SHIFT requires a non-final buffer front");
            state.stack.push(state.n0);
            state.n0 += 1;
        }
        Move::Reduce => {
            let top = state.stack.pop().expect("REDUCE requires a non-empty stack");
            assert!(state.heads[top] != UNDEFINED, "REDUCE requires s0 to already have a head");
        }
        Move::LeftArc => {
            let top = *state.stack.last().expect("LEFT_ARC requires a non-empty stack");
            assert!(state.heads[top] == UNDEFINED, "LEFT_ARC requires s0 to be headless");
            state.heads[top] = state.n0 as i32;
            state.labels[top] = lmove.label;
            state.stack.pop();
        }
        Move::RightArc => {
            assert!(!state.stack.is_empty(), "RIGHT_ARC requires a non-empty stack");
            assert!(state.n0 < state.length - 1, "RIGHT_ARC requires a non-final buffer front");
            let top = *state.stack.last().unwrap();
            state.heads[state.n0] = top as i32;
            state.labels[state.n0] = lmove.label;
            state.stack.push(state.n0);
            state.n0 += 1;
        }
    }
    state.update_locations();
}

/// The base, unconstrained arc-eager legal-move set.
pub fn allowed_labeled_moves(state: &ParseState) -> LabeledMoveSet {
    let mut set = LabeledMoveSet::empty();
    let buffer_has_more = state.n0 < state.length - 1;

    match state.s0() {
        None => {
            if buffer_has_more {
                set.enable_shift();
            }
        }
        Some(top) => {
            if buffer_has_more {
                set.enable_shift();
                set.enable_right_arc(ANY_LABEL);
            }
            if state.heads[top] != UNDEFINED {
                set.enable_reduce();
            } else {
                set.enable_left_arc(ANY_LABEL);
            }
        }
    }
    set
}

fn has_head_in_buffer(sent: &Sentence, state: &ParseState, x: usize) -> bool {
    sent.gold_head(x) >= state.n0 as i32
}

fn has_head_in_stack(sent: &Sentence, state: &ParseState, x: usize) -> bool {
    let h = sent.gold_head(x);
    h != UNDEFINED && state.stack.contains(&(h as usize))
}

fn has_dep_in_buffer(sent: &Sentence, state: &ParseState, x: usize) -> bool {
    (state.n0..state.length).any(|i| sent.gold_head(i) == x as i32)
}

fn has_dep_in_stack(sent: &Sentence, state: &ParseState, x: usize) -> bool {
    state.stack.iter().any(|&i| sent.gold_head(i) == x as i32)
}

/// The dynamic oracle: the subset of `legal` that does not cost any recoverable gold arc. `legal`
/// must already reflect this sentence's arc/span constraints (the caller's `legal_moves`), so the
/// zero-cost set never recommends a move the constrained legality would reject. Falls back to the
/// full legal set if every move would be pruned (can happen once the configuration has already
/// diverged from any gold-reachable state).
pub fn oracle(state: &ParseState, sent: &Sentence, legal: &LabeledMoveSet) -> LabeledMoveSet {
    let legal = *legal;
    let mut zero_cost = LabeledMoveSet::empty();

    let s0 = state.s0();
    let b = state.n0;

    if let Some(s0) = s0 {
        let s0_gold_head = sent.gold_head(s0);
        let left_arc_is_gold = s0_gold_head == b as i32;
        if (left_arc_is_gold || !has_head_in_buffer(sent, state, s0)) && legality_has_left_arc(&legal) {
            zero_cost.enable_left_arc(sent.gold_label(s0));
        }
    }

    if b < state.length {
        let b_gold_head = sent.gold_head(b);
        let right_arc_is_gold = s0.map(|s0| b_gold_head == s0 as i32).unwrap_or(false);
        let disable = has_head_in_stack(sent, state, b)
            || has_head_in_buffer(sent, state, b)
            || has_dep_in_stack(sent, state, b);
        if (right_arc_is_gold || !disable) && legality_has_right_arc(&legal) {
            zero_cost.enable_right_arc(sent.gold_label(b));
        }
    }

    if let Some(s0) = s0 {
        let disable = has_dep_in_stack(sent, state, s0) || has_dep_in_buffer(sent, state, s0);
        if !disable && legal.test(&LabeledMove::new(Move::Reduce, ANY_LABEL, 0)) {
            zero_cost.enable_reduce();
        }
    }

    if b < state.length {
        let disable = has_head_in_stack(sent, state, b) || has_dep_in_stack(sent, state, b);
        if !disable && legal.test(&LabeledMove::new(Move::Shift, ANY_LABEL, 0)) {
            zero_cost.enable_shift();
        }
    }

    if zero_cost.is_empty() {
        legal
    } else {
        zero_cost
    }
}

fn legality_has_left_arc(legal: &LabeledMoveSet) -> bool {
    legal.test(&LabeledMove::new(Move::LeftArc, 0, 0))
}

fn legality_has_right_arc(legal: &LabeledMoveSet) -> bool {
    legal.test(&LabeledMove::new(Move::RightArc, 0, 0))
}

/// Filters `legal` down to the moves permitted by this sentence's arc constraints, given the
/// current configuration.
pub fn enforce_arc_constraints(
    mut legal: LabeledMoveSet,
    state: &ParseState,
    constraints: &[ArcConstraint],
) -> LabeledMoveSet {
    let s0 = state.s0();
    let n0 = state.n0;

    for c in constraints {
        let (h, d) = (c.head as usize, c.dep as usize);

        if let Some(s0) = s0 {
            if (h == s0 && d >= n0) || (d == s0 && c.head as i32 > n0 as i32) {
                legal = disable_left_arc(legal);
            }
            if (h == s0 && d >= n0) || (d == s0 && c.head as i32 >= n0 as i32) {
                legal = disable_reduce(legal);
            }
        }

        let touches_n0 = h == n0 || d == n0;
        let touches_s0_n0_pair = s0.map(|s0| h == s0 && d == n0).unwrap_or(false);
        if touches_n0 && !touches_s0_n0_pair {
            let other_in_stack = if h == n0 {
                state.stack.contains(&d)
            } else {
                state.stack.contains(&h)
            };
            if other_in_stack {
                legal = disable_right_arc(legal);
                legal = disable_shift(legal);
            }
        }
    }

    legal
}

fn disable_left_arc(mut set: LabeledMoveSet) -> LabeledMoveSet {
    set.disable_left_arc();
    set
}
fn disable_right_arc(mut set: LabeledMoveSet) -> LabeledMoveSet {
    set.disable_right_arc();
    set
}
fn disable_reduce(mut set: LabeledMoveSet) -> LabeledMoveSet {
    set.disable_reduce();
    set
}
fn disable_shift(mut set: LabeledMoveSet) -> LabeledMoveSet {
    set.disable_shift();
    set
}

/// Filters `legal` down to the moves permitted by this sentence's span constraints, given the
/// current configuration and tracked span state.
pub fn enforce_span_constraints(
    mut legal: LabeledMoveSet,
    state: &ParseState,
    constraints: &[SpanConstraint],
    span_states: &[crate::state::SpanState],
) -> LabeledMoveSet {
    let s0 = state.s0();
    let n0 = state.n0;

    for (sc, sp) in constraints.iter().zip(span_states.iter()) {
        let n0_inside = n0 < state.length && sc.contains(n0);
        let s0_inside = s0.map(|s0| sc.contains(s0)).unwrap_or(false);
        let has_root = sp.designated_root != UNDEFINED;

        if let Some(s0) = s0 {
            let s0_is_root = has_root && sp.designated_root == s0 as i32;

            if s0_is_root && n0_inside {
                legal = disable_left_arc(legal);
                legal = disable_reduce(legal);
            }
            if has_root && !s0_is_root && !n0_inside {
                legal = disable_left_arc(legal);
            }
            if sc.permit_root_deps && has_root && n0 as i32 != sp.designated_root && n0_inside && !s0_inside {
                legal = disable_left_arc(legal);
            }
            if !sc.permit_root_deps && n0_inside && !s0_inside {
                legal = disable_left_arc(legal);
            }
        }

        if n0 == sc.end && sp.headless_in_stack > 1 {
            legal = disable_right_arc(legal);
            legal = disable_shift(legal);
        }
    }

    legal
}

/// Updates each span's tracked state for the move about to be (or just) applied, following
/// `original_source/src/learn.cc::update_span_states`.
pub fn update_span_states(
    lmove: &LabeledMove,
    state_before: &ParseState,
    constraints: &[SpanConstraint],
    span_states: &mut [crate::state::SpanState],
) {
    let s0 = state_before.s0();
    let n0 = state_before.n0;

    for (sc, sp) in constraints.iter().zip(span_states.iter_mut()) {
        match lmove.mv {
            Move::Shift => {
                if sc.contains(n0) {
                    sp.headless_in_stack += 1;
                }
            }
            Move::RightArc => {
                if let Some(s0) = s0 {
                    if s0 == sc.start {
                        sp.headless_in_stack = 1;
                    }
                    // an arc crosses the span boundary when exactly one endpoint lies inside it.
                    if sc.contains(n0) ^ sc.contains(s0) {
                        sp.designated_root = if sc.contains(n0) { n0 as i32 } else { s0 as i32 };
                    }
                }
            }
            Move::LeftArc => {
                if let Some(s0) = s0 {
                    if sc.contains(s0) && sc.contains(n0) {
                        sp.headless_in_stack = sp.headless_in_stack.saturating_sub(1);
                    }
                    if sc.contains(s0) ^ sc.contains(n0) {
                        sp.designated_root = if sc.contains(s0) { s0 as i32 } else { n0 as i32 };
                    }
                }
            }
            Move::Reduce => {}
        }
    }
}
