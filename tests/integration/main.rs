//! Integration tests for broken-links
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! check cycle end-to-end.

mod check_tests;
mod pipeline_tests;
