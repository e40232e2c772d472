//! Shared error types for the blueprint verification harness

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("Deployment output '{name}' is missing or empty")]
    MissingOutput { name: String },

    #[error("Failed to launch `{command}`: {message}")]
    CommandSpawn { command: String, message: String },

    #[error("Command `{command}` failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("HTTP request to {url} failed: {message}")]
    HttpError { url: String, message: String },

    #[error("Invalid JSON: {message}")]
    JsonError { message: String },

    #[error("JSON field '{path}' is missing or empty")]
    FieldMissing { path: String },

    #[error("Invalid configuration: {field} = {value}")]
    InvalidConfig { field: String, value: String },
}

pub type VerifyResult<T> = Result<T, VerifyError>;
