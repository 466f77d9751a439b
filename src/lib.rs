// @file: src/lib.rs
// @description: Exposes the modular architecture for integration testing and external usage.
// @author: LAS.

pub mod api;
pub mod core;
pub mod connectors;
pub mod error;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::core::normalizer::RateNormalizer;
pub use crate::error::{IngestError, Result};
