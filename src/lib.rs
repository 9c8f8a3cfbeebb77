//! mediaflow - A Rust CLI client for a local media-generation service
//!
//! This library drives the service's two workflows: podcast-style audio generation
//! from a text script or a YouTube link, and the transcribe-then-generate-video
//! pipeline. Results are downloaded and written to the local filesystem.

pub mod cli;
pub mod config;
pub mod output;
pub mod service;
pub mod utils;
pub mod workflow;

pub use cli::{Cli, Commands};
pub use config::Config;
pub use output::{Artifact, ArtifactKind};
pub use service::{HttpMediaService, MediaService};
pub use workflow::{
    AudioGeneration, PipelineStage, PipelineState, RemoteMediaWorkflowClient, VideoPipeline, VideoPipelineReport,
    WorkflowRequest,
};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, WorkflowError>;

/// Error types specific to the workflow client
#[derive(thiserror::Error, Debug)]
pub enum WorkflowError {
    #[error("Remote service returned HTTP {status}: {body}")]
    RemoteService { status: u16, body: String },

    #[error("Local I/O error: {0}")]
    LocalIo(#[from] std::io::Error),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl WorkflowError {
    /// HTTP status carried by a remote failure, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            WorkflowError::RemoteService { status, .. } => Some(*status),
            _ => None,
        }
    }
}
