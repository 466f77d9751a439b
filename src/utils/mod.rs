// @file: src/utils/mod.rs
// @description: Configuration and time helpers.
// @author: LAS.

pub mod config;
pub mod time;
