//! The feature expression engine: lexing and parsing a textual template into a [`tree::FeatureNode`]
//! tree, and evaluating that tree against a configuration to produce sparse [`key::FeatureKey`]s.

pub mod key;
pub mod lexer;
pub mod parser;
pub mod tree;

pub use key::FeatureKey;
pub use parser::read_feature_file;
pub use tree::FeatureNode;
