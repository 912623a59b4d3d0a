//! Exact nearest-neighbour index over dense embeddings.

pub mod flat;

pub use flat::{squared_l2, FlatL2Index};
