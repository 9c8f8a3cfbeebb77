use std::path::{Path, PathBuf};
use url::Url;

pub mod pipeline;

pub use pipeline::{PipelineStage, PipelineState, VideoPipeline, VideoPipelineReport};

use crate::config::{Config, GenerationConfig};
use crate::output::{self, Artifact, ArtifactKind};
use crate::service::{AudioSource, GenerateAudioRequest, GenerationResult, HttpMediaService, MediaService};
use crate::utils::{artifact_name, resolve_url};
use crate::{Result, WorkflowError};

/// What the caller asked the service to work from
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowRequest {
    YoutubeUrl(String),
    RawText(String),
    AudioFilePath(PathBuf),
}

impl WorkflowRequest {
    /// Payload source for audio generation. Anything that is not a YouTube
    /// link is submitted as text.
    pub fn audio_source(&self) -> AudioSource {
        match self {
            WorkflowRequest::YoutubeUrl(url) => AudioSource::YoutubeUrl(url.clone()),
            WorkflowRequest::RawText(text) => AudioSource::Text(text.clone()),
            WorkflowRequest::AudioFilePath(path) => AudioSource::Text(path.display().to_string()),
        }
    }
}

/// Outcome of `generate_audio`.
///
/// The audio download and the transcript write are independent: either can
/// fail without affecting the other, and each slot is `None` when the service
/// did not return that output.
#[derive(Debug)]
pub struct AudioGeneration {
    pub result: GenerationResult,
    pub audio: Option<Result<Artifact>>,
    pub transcript: Option<Result<Artifact>>,
}

impl AudioGeneration {
    /// Artifacts that were written successfully
    pub fn artifacts(&self) -> Vec<&Artifact> {
        [&self.audio, &self.transcript]
            .into_iter()
            .filter_map(|slot| slot.as_ref().and_then(|outcome| outcome.as_ref().ok()))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        [&self.audio, &self.transcript]
            .into_iter()
            .all(|slot| !matches!(slot, Some(Err(_))))
    }

    /// Written artifacts, or the first failure
    pub fn into_result(self) -> Result<Vec<Artifact>> {
        let mut artifacts = Vec::new();
        for outcome in [self.audio, self.transcript].into_iter().flatten() {
            artifacts.push(outcome?);
        }
        Ok(artifacts)
    }
}

/// Drives the media service's audio and video workflows and saves what they produce
pub struct RemoteMediaWorkflowClient<S = HttpMediaService> {
    service: S,
    base_url: Url,
    generation: GenerationConfig,
    output_dir: PathBuf,
}

impl RemoteMediaWorkflowClient<HttpMediaService> {
    /// Create a client talking HTTP to the configured service
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = config.base_url()?;
        let service = HttpMediaService::new(base_url.clone(), config.timeout())?;

        Ok(Self::with_service(
            service,
            base_url,
            config.generation.clone(),
            config.output_dir(),
        ))
    }
}

impl<S: MediaService> RemoteMediaWorkflowClient<S> {
    pub fn with_service(
        service: S,
        base_url: Url,
        generation: GenerationConfig,
        output_dir: PathBuf,
    ) -> Self {
        Self {
            service,
            base_url,
            generation,
            output_dir,
        }
    }

    /// Submit a generation request, then download the audio and save the transcript
    pub async fn generate_audio(&self, request: &WorkflowRequest) -> Result<AudioGeneration> {
        let body = GenerateAudioRequest::new(&self.generation, request.audio_source());

        tracing::info!("Requesting audio generation (template: {})", body.template);
        let result = self.service.generate_audio(&body).await?;

        let audio = match result.audio_url() {
            Some(audio_url) => {
                let outcome = self.download(audio_url, ArtifactKind::Audio).await;
                if let Err(e) = &outcome {
                    tracing::error!("Failed to download the audio file: {}", e);
                }
                Some(outcome)
            }
            None => {
                tracing::info!("Service returned no audio URL");
                None
            }
        };

        let transcript = result.transcript().map(|text| {
            let outcome = output::write_transcript(&self.output_dir, text);
            match &outcome {
                Ok(artifact) => tracing::info!("Transcript saved as: {}", artifact.path.display()),
                Err(e) => tracing::error!("Failed to save transcript: {}", e),
            }
            outcome
        });

        Ok(AudioGeneration {
            result,
            audio,
            transcript,
        })
    }

    /// Transcribe an audio file, render a video from it and download the video
    pub async fn run_video_pipeline(&self, audio_path: &Path) -> Result<VideoPipelineReport> {
        VideoPipeline::new(self, audio_path).finish().await
    }

    /// Fetch a service-relative URL and save it under the URL's file name
    pub(crate) async fn download(&self, relative_url: &str, kind: ArtifactKind) -> Result<Artifact> {
        let url = resolve_url(&self.base_url, relative_url)?;
        let name = artifact_name(&url)?;

        let bytes = self.service.fetch(&url).await?;
        let artifact = output::write_artifact(&self.output_dir, &name, kind, &bytes)?;

        tracing::info!(
            "{} saved as: {} ({})",
            kind,
            artifact.path.display(),
            crate::utils::format_file_size(artifact.size)
        );
        Ok(artifact)
    }
}
