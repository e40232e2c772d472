//! Configuration Management
//!
//! Configuration structures and builders for a verification run.

pub mod blueprint;
pub mod builder;
pub mod retry;

// Re-export main types
pub use blueprint::BlueprintConfig;
pub use builder::BlueprintConfigBuilder;
pub use retry::RetryRule;
