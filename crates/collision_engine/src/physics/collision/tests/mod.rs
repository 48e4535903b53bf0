//! End-to-end tests for zones, keepers and first-hit queries

pub(crate) mod support;
