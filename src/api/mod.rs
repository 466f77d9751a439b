// @file: src/api/mod.rs
// @description: Outward surface: bundle ingestion and writers.
// @author: LAS.

pub mod bundle;
pub mod json_writer;
