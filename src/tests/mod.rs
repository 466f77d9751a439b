// @file: src/tests/mod.rs
// @description: Test doubles and suites for the normalizer, bundle glue and configuration.
// @author: LAS.

mod bundle_suite;
