//! Pattern representation and matching kernel.
//!
//! - [`pattern`]: connected labelled patterns and their canonical keys.
//! - [`search`]: backtracking embedding search against a [`DataGraph`].
//! - [`support`]: minimum-image-based support computed from that search.
//!
//! [`DataGraph`]: sopagrami_common::DataGraph

pub mod pattern;
pub mod search;
pub mod support;

pub use pattern::{CanonicalForm, EdgeDir, PEdge, Pattern};
pub use search::{Embedding, EmbeddingSearch, SearchPlan, SearchStats, find_embeddings};
pub use support::{Evaluation, SupportEvaluator, mni_support};
