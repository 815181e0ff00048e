//! Complexity estimation.
//!
//! Static keyword dictionaries plus a memoizing scorer that turns a
//! blueprint's title, description and skill list into a [0,1] score.

pub mod complexity;
pub mod keywords;

pub use complexity::ComplexityScorer;
