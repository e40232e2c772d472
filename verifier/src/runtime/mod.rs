//! Runtime Clients
//!
//! This module holds the pieces that touch the deployed blueprint: the
//! polling loop, the cloud CLI runner, deployment output lookup, and
//! the annotate endpoint client.

pub mod annotate;
pub mod gcloud;
pub mod outputs;
pub mod poller;

// Re-export main types
pub use annotate::{AnnotateClient, AnnotateReply};
pub use gcloud::{GcloudRunner, JsonDoc};
pub use outputs::BlueprintOutputs;
pub use poller::{PollBudget, ProbeStatus, poll};
