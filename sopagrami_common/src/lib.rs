//! Common types for the SoPaGraMi workspace.
//!
//! This crate provides the immutable labelled data graph and its `.lg`
//! loader, the engine parameters, and the error type shared by the search
//! and scheduling crates.

mod error;
pub mod graph;
mod params;

pub use crate::error::{Error, Result};
pub use crate::graph::{Adjacent, DataGraph, Direction, GraphBuilder, LabelId, Labels, VertexId};
pub use crate::params::Params;
