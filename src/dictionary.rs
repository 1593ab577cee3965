//! String interning for the three independent vocabularies a corpus uses: dependency labels,
//! attribute (feature) names, and namespace names. Each is a dense, zero-based id space assigned
//! in first-seen order.
//!
//! Training unfreezes the dictionary so new strings seen in the training corpus are assigned
//! fresh ids; once training is done the dictionary is frozen and reused for evaluation data, so
//! an evaluation sentence cannot silently grow the vocabulary the learned weights were trained
//! against.

use fnv::FnvHashMap;

/// Returned by a frozen lookup of a string that was never seen during training.
pub const ABSENT_ID: i32 = -1;

#[derive(Debug, Default, Clone)]
struct Vocabulary {
    ids: FnvHashMap<String, i32>,
    frozen: bool,
}

impl Vocabulary {
    fn map(&mut self, key: &str) -> i32 {
        if let Some(&id) = self.ids.get(key) {
            return id;
        }
        if self.frozen {
            return ABSENT_ID;
        }
        let id = self.ids.len() as i32;
        self.ids.insert(key.to_string(), id);
        id
    }

    fn get(&self, key: &str) -> i32 {
        self.ids.get(key).copied().unwrap_or(ABSENT_ID)
    }

    fn len(&self) -> usize {
        self.ids.len()
    }

    fn invert(&self) -> Vec<String> {
        let mut out = vec![String::new(); self.ids.len()];
        for (k, &v) in &self.ids {
            out[v as usize] = k.clone();
        }
        out
    }
}

/// The three interning tables shared by every sentence and feature template in a run.
#[derive(Debug, Default, Clone)]
pub struct Dictionary {
    labels: Vocabulary,
    attributes: Vocabulary,
    namespaces: Vocabulary,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn map_label(&mut self, key: &str) -> i32 {
        self.labels.map(key)
    }

    pub fn map_attribute(&mut self, key: &str) -> i32 {
        self.attributes.map(key)
    }

    pub fn map_namespace(&mut self, key: &str) -> i32 {
        self.namespaces.map(key)
    }

    pub fn label_id(&self, key: &str) -> i32 {
        self.labels.get(key)
    }

    pub fn namespace_id(&self, key: &str) -> i32 {
        self.namespaces.get(key)
    }

    pub fn num_labels(&self) -> usize {
        self.labels.len()
    }

    pub fn label_names(&self) -> Vec<String> {
        self.labels.invert()
    }

    /// Freezes every vocabulary: subsequent unseen lookups return [`ABSENT_ID`] instead of
    /// allocating a new id. Call once training is complete and before reading evaluation data.
    pub fn freeze(&mut self) {
        self.labels.frozen = true;
        self.attributes.frozen = true;
        self.namespaces.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.labels.frozen
    }
}
