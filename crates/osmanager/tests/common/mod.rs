//! Shared test utilities for osmanager integration tests.
//!
//! This module provides:
//! - `TestHarness` for isolated runs against a file-backed database
//! - Builders for spreadsheets and order rows

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::TestHarness;
