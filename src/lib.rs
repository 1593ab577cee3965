//! A transition-based dependency parser: an arc-eager shift-reduce automaton guided by an
//! averaged perceptron trained online against a dynamic oracle, with configuration features
//! produced by a small expression language compiled from a text template.

pub mod dictionary;
pub mod error;
pub mod features;
pub mod input;
pub mod learn;
pub mod moves;
pub mod nonproj;
pub mod output;
pub mod sentence;
pub mod state;
pub mod transition;
pub mod weights;

pub use dictionary::Dictionary;
pub use error::{ParserError, Result};
pub use learn::Learner;
pub use sentence::{ParseScore, Sentence};
