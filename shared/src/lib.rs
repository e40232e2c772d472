//! Shared types for the blueprint verification harness
//!
//! Contains only the types shared between the verifier library, its
//! binary, and the integration tests: error types and the annotate
//! endpoint's request/response payloads. Scenario-internal types live
//! in the verifier crate.

pub mod errors;
pub mod types;

pub use errors::*;
pub use types::*;
