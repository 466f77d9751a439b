// @file: src/core/mod.rs
// @description: Exports domain logic and data structures.
// @author: LAS.

pub mod models;
pub mod interfaces;
pub mod normalizer;
