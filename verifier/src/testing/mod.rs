//! Testing Framework
//!
//! Assertion results and check helpers shared by the scenarios.

pub mod assertions;

// Re-export main types
pub use assertions::AssertionResult;
