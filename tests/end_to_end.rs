//! Drives the library's public entry points end to end on a small in-memory corpus, without
//! shelling out to the binary.

use hanstholm::dictionary::Dictionary;
use hanstholm::features::{read_feature_file, FeatureNode};
use hanstholm::learn::Learner;
use hanstholm::moves::{LabeledMove, Move, ANY_LABEL};
use hanstholm::sentence::{ArcConstraint, Attribute, NamespaceFront, Sentence, SpanConstraint, Token};
use hanstholm::state::{LocationName, ParseState};
use hanstholm::transition::{allowed_labeled_moves, enforce_arc_constraints, perform_move};

fn write_corpus(dir: &std::path::Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn trains_and_parses_a_tiny_corpus_above_chance_uas() {
    let dir = std::env::temp_dir().join(format!("hanstholm-e2e-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    // Three short, unambiguous two-and-three-token sentences: a determiner attaches to the
    // following noun, which attaches to root.
    let corpus = "\
-1-root 'the |w the |p det\n\
0-det 'cat |w cat |p noun\n\
\n\
-1-root 'the |w the |p det\n\
0-det 'dog |w dog |p noun\n\
\n\
-1-root 'a |w a |p det\n\
0-det 'bird |w bird |p noun\n";

    let template = "S0:w\nN0:w\nS0:p ++ N0:p\n";

    let train_path = write_corpus(&dir, "train.vw", corpus);
    let eval_path = write_corpus(&dir, "eval.vw", corpus);

    let mut dict = Dictionary::new();
    let train_sents = hanstholm::input::read_corpus(&train_path, &mut dict).unwrap();
    let eval_sents = hanstholm::input::read_corpus(&eval_path, &mut dict).unwrap();
    let feature_tree = read_feature_file(template, &mut dict).unwrap();

    dict.freeze();

    let mut learner = Learner::new(dict.num_labels(), feature_tree);
    learner.fit(&train_sents, 10);

    let mut score = hanstholm::sentence::ParseScore::default();
    for sent in &eval_sents {
        let (heads, labels) = learner.parse(sent);
        assert_eq!(heads.len(), sent.len());
        assert_eq!(labels.len(), sent.len());
        // invariant 1/2: root has no head, and exactly one token points at it.
        assert_eq!(heads[sent.root_index()], -1);
        assert_eq!(heads.iter().filter(|&&h| h == sent.root_index() as i32).count(), 1);
        sent.score(&heads, &labels, &mut score);
    }

    assert!(score.uas() > 0.5, "expected better than chance UAS, got {}", score.uas());

    std::fs::remove_dir_all(&dir).ok();
}

/// S4: an arc constraint pinning `dep`'s head must hold in the final parse produced by any
/// trajectory the constrained legal-move set permits, not just a trained/gold-driven one.
#[test]
fn arc_constraint_head_holds_under_a_legal_move_trajectory() {
    fn token(index: usize) -> Token {
        Token { id: format!("t{index}"), index, head: -1, label: 0, namespaces: vec![] }
    }

    let sent = Sentence {
        tokens: vec![token(0), token(1), token(2), token(3)],
        arc_constraints: vec![ArcConstraint { head: 2, dep: 0, label: ANY_LABEL }],
        span_constraints: vec![],
    };

    let mut state = ParseState::new(&sent);
    while !state.is_terminal() {
        let legal = enforce_arc_constraints(allowed_labeled_moves(&state), &state, &sent.arc_constraints);
        let mv = if legal.test(&LabeledMove::new(Move::LeftArc, 0, 0)) {
            LabeledMove::new(Move::LeftArc, 0, 0)
        } else if legal.test(&LabeledMove::new(Move::RightArc, 0, 0)) {
            LabeledMove::new(Move::RightArc, 0, 0)
        } else if legal.test(&LabeledMove::new(Move::Reduce, ANY_LABEL, 0)) {
            LabeledMove::new(Move::Reduce, ANY_LABEL, 0)
        } else if legal.test(&LabeledMove::new(Move::Shift, ANY_LABEL, 0)) {
            LabeledMove::new(Move::Shift, ANY_LABEL, 0)
        } else {
            panic!("no legal move available at a non-terminal state under the arc constraint");
        };
        perform_move(&mv, &mut state);
    }

    assert_eq!(state.heads[0], 2, "arc constraint head=2, dep=0 must hold in the final parse");
}

/// S5: a span constraint with `permit_root_deps = false` must leave exactly one member of the
/// span attached outside it, once the learner has memorized a gold tree that satisfies the
/// constraint.
#[test]
fn span_constraint_leaves_exactly_one_member_attached_outside_the_span() {
    fn token(index: usize, head: i32, word_id: i32) -> Token {
        let mut ns = NamespaceFront::new(0, -1);
        ns.attributes.push(Attribute::new(word_id, 1.0));
        Token {
            id: format!("t{index}"),
            index,
            head,
            label: 0,
            namespaces: vec![ns],
        }
    }

    // Span [0, 1]: b(1) attaches to a(0) inside the span; a(0) is the span's single external
    // connection point, routed through c(2) and on to the synthetic root.
    let sent = Sentence {
        tokens: vec![
            token(0, 3, 0),
            token(1, 0, 1),
            token(2, 0, 2),
            token(3, -1, 3),
        ],
        arc_constraints: vec![],
        span_constraints: vec![SpanConstraint { start: 0, end: 1, permit_root_deps: false }],
    };

    let feature_tree = FeatureNode::UnionList {
        members: vec![FeatureNode::CartesianProduct {
            lhs: Box::new(FeatureNode::Location { location: LocationName::S0, namespace_id: 0, token_specific_ns: -1 }),
            rhs: Box::new(FeatureNode::Location { location: LocationName::N0, namespace_id: 0, token_specific_ns: -1 }),
        }],
    };

    let mut learner = Learner::new(1, feature_tree);
    learner.fit(&[sent.clone()], 30);
    let (heads, _labels) = learner.parse(&sent);

    assert_eq!(heads, vec![3, 0, 0, -1]);
    let inside_span = |h: i32| h == 0 || h == 1;
    assert_eq!(
        inside_span(heads[0]) as u8 + inside_span(heads[1]) as u8,
        1,
        "exactly one of heads[0], heads[1] must lie outside the span"
    );
}
