//! Pre-training tree repair: lift the dependents of non-projective edges until the gold tree is
//! projective. Arc-eager as specified here can only produce projective trees, so any
//! non-projective gold tree in the training corpus has to be made projective first or it could
//! never be reached by the oracle.

use itertools::Itertools;

/// `true` when the edge `(v, heads[v])` crosses another token whose head lies outside the span
/// between `v` and its head.
pub fn is_nonprojective(heads: &[i32], v: usize) -> bool {
    let h = heads[v];
    if h < 0 {
        return false;
    }
    let (lo, hi) = if (v as i32) < h { (v, h as usize) } else { (h as usize, v) };
    if hi - lo <= 1 {
        return false;
    }
    (lo + 1..hi).any(|i| {
        let hi_head = heads[i];
        hi_head < 0 || (hi_head as usize) < lo || (hi_head as usize) > hi
    })
}

/// Finds the non-projective edge spanning the most tokens, breaking ties toward the
/// lowest-indexed dependent. Returns `None` if the tree is already projective.
pub fn longest_nonprojective_edge(heads: &[i32]) -> Option<usize> {
    (0..heads.len())
        .filter(|&v| is_nonprojective(heads, v))
        .map(|v| (v.abs_diff(heads[v] as usize), v))
        // position_max_by_key would break ties toward the last maximum; fold manually instead so
        // ties favor the lowest-indexed dependent, matching the original edge-selection order.
        .fold1(|a, b| if b.0 > a.0 { b } else { a })
        .map(|(_, v)| v)
}

/// Repeatedly lifts the longest-spanning non-projective edge's dependent to its grandparent
/// (`heads[v] := heads[heads[v]]`) until the tree is projective.
pub fn projectivize(heads: &mut [i32]) {
    while let Some(v) = longest_nonprojective_edge(heads) {
        let h = heads[v];
        assert!(h >= 0, "non-projective edge must have a defined head");
        heads[v] = heads[h as usize];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacent_edges_are_always_projective() {
        let heads = [1, -1];
        assert!(!is_nonprojective(&heads, 0));
    }

    #[test]
    fn crossing_edge_is_detected() {
        // 0 <- 2, 1 <- 3: edge (2,0) spans token 1 whose head (3) lies outside [0,2].
        let heads = [2, 3, -1, 2];
        assert!(is_nonprojective(&heads, 0));
    }

    #[test]
    fn projectivize_terminates_with_no_crossings() {
        let mut heads = [2, 3, -1, 2];
        projectivize(&mut heads);
        for v in 0..heads.len() {
            assert!(!is_nonprojective(&heads, v));
        }
    }

    #[test]
    fn already_projective_tree_is_unchanged() {
        let mut heads = [1, -1];
        let before = heads;
        projectivize(&mut heads);
        assert_eq!(heads, before);
    }
}
