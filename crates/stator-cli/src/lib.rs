//! Built-in demonstration models and output rendering for the `stator`
//! binary.

pub mod models;
pub mod render;
