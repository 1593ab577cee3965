//! The move vocabulary of the arc-eager transition system, and the labeled-move enumeration used
//! to size weight blocks.

/// The four arc-eager actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    Shift,
    Reduce,
    LeftArc,
    RightArc,
}

/// Sentinel label id meaning "no label" (SHIFT/REDUCE) or, inside a [`LabeledMoveSet`], "any
/// label".
pub const ANY_LABEL: i32 = -1;

/// One specific transition: a move, the label it assigns (`ANY_LABEL` for SHIFT/REDUCE), and its
/// dense position in the enumeration returned by [`enumerate_moves`]. `index` is used to address
/// weight blocks and is ignored by equality/hashing.
#[derive(Debug, Clone, Copy)]
pub struct LabeledMove {
    pub mv: Move,
    pub label: i32,
    pub index: usize,
}

impl PartialEq for LabeledMove {
    fn eq(&self, other: &Self) -> bool {
        self.mv == other.mv && self.label == other.label
    }
}
impl Eq for LabeledMove {}

impl LabeledMove {
    pub fn new(mv: Move, label: i32, index: usize) -> Self {
        LabeledMove { mv, label, index }
    }
}

/// A set of candidate moves: one bit per [`Move`] kind, plus an optional label restriction
/// (`ANY_LABEL` accepts every label the corresponding move might carry).
#[derive(Debug, Clone, Copy, Default)]
pub struct LabeledMoveSet {
    shift: bool,
    reduce: bool,
    left_arc: Option<i32>,
    right_arc: Option<i32>,
}

impl LabeledMoveSet {
    pub fn empty() -> Self {
        LabeledMoveSet::default()
    }

    pub fn enable_shift(&mut self) {
        self.shift = true;
    }
    pub fn enable_reduce(&mut self) {
        self.reduce = true;
    }
    pub fn enable_left_arc(&mut self, label: i32) {
        self.left_arc = Some(label);
    }
    pub fn enable_right_arc(&mut self, label: i32) {
        self.right_arc = Some(label);
    }

    pub fn disable_shift(&mut self) {
        self.shift = false;
    }
    pub fn disable_reduce(&mut self) {
        self.reduce = false;
    }
    pub fn disable_left_arc(&mut self) {
        self.left_arc = None;
    }
    pub fn disable_right_arc(&mut self) {
        self.right_arc = None;
    }

    pub fn is_empty(&self) -> bool {
        !self.shift && !self.reduce && self.left_arc.is_none() && self.right_arc.is_none()
    }

    /// Tests whether `lmove` is a member: the move kind must be enabled, and if a label
    /// restriction was recorded it must match exactly or be `ANY_LABEL`.
    pub fn test(&self, lmove: &LabeledMove) -> bool {
        match lmove.mv {
            Move::Shift => self.shift,
            Move::Reduce => self.reduce,
            Move::LeftArc => match self.left_arc {
                Some(l) => l == ANY_LABEL || l == lmove.label,
                None => false,
            },
            Move::RightArc => match self.right_arc {
                Some(l) => l == ANY_LABEL || l == lmove.label,
                None => false,
            },
        }
    }
}

/// Enumerates every labeled move for a vocabulary of `num_labels` dependency labels, in the
/// canonical order used to size and address weight blocks: SHIFT, REDUCE, then one LEFT_ARC and
/// one RIGHT_ARC per label id.
pub fn enumerate_moves(num_labels: usize) -> Vec<LabeledMove> {
    let mut out = Vec::with_capacity(2 + 2 * num_labels);
    out.push(LabeledMove::new(Move::Shift, ANY_LABEL, out.len()));
    out.push(LabeledMove::new(Move::Reduce, ANY_LABEL, out.len()));
    for label in 0..num_labels as i32 {
        let idx = out.len();
        out.push(LabeledMove::new(Move::LeftArc, label, idx));
    }
    for label in 0..num_labels as i32 {
        let idx = out.len();
        out.push(LabeledMove::new(Move::RightArc, label, idx));
    }
    out
}
