use serde::Serialize;
use std::path::{Path, PathBuf};

use super::RemoteMediaWorkflowClient;
use crate::output::{Artifact, ArtifactKind};
use crate::service::{AudioUpload, GenerateVideoRequest, MediaService, TranscriptionResult, VideoResult};
use crate::utils::{check_file_accessible, format_duration, upload_file_name};
use crate::{Result, WorkflowError};

/// A request in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Transcribing,
    GeneratingVideo,
    Downloading,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineStage::Transcribing => write!(f, "transcribing audio"),
            PipelineStage::GeneratingVideo => write!(f, "generating video"),
            PipelineStage::Downloading => write!(f, "downloading video"),
        }
    }
}

/// Where the pipeline rests between requests
#[derive(Debug)]
pub enum PipelineState {
    Idle,
    Transcribed(TranscriptionResult),
    VideoGenerated {
        transcription: TranscriptionResult,
        video: VideoResult,
    },
    Done(VideoPipelineReport),
    Failed {
        stage: PipelineStage,
        error: WorkflowError,
    },
}

/// Everything a completed pipeline produced
#[derive(Debug, Clone, Serialize)]
pub struct VideoPipelineReport {
    pub transcription: TranscriptionResult,
    pub video: VideoResult,
    pub artifact: Artifact,
}

/// Transcribe → generate video → download, one request per `advance`.
///
/// Each stage consumes the previous stage's output. The first failure moves
/// the pipeline to `Failed` and no further request is sent.
pub struct VideoPipeline<'a, S> {
    client: &'a RemoteMediaWorkflowClient<S>,
    audio_path: PathBuf,
    state: PipelineState,
}

impl<'a, S: MediaService> VideoPipeline<'a, S> {
    pub fn new(client: &'a RemoteMediaWorkflowClient<S>, audio_path: &Path) -> Self {
        Self {
            client,
            audio_path: audio_path.to_path_buf(),
            state: PipelineState::Idle,
        }
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Stage the next `advance` will run, `None` once terminal
    pub fn next_stage(&self) -> Option<PipelineStage> {
        match self.state {
            PipelineState::Idle => Some(PipelineStage::Transcribing),
            PipelineState::Transcribed(_) => Some(PipelineStage::GeneratingVideo),
            PipelineState::VideoGenerated { .. } => Some(PipelineStage::Downloading),
            PipelineState::Done(_) | PipelineState::Failed { .. } => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.next_stage().is_none()
    }

    /// Run the next stage. Does nothing on a terminal state.
    pub async fn advance(&mut self) {
        let Some(stage) = self.next_stage() else {
            return;
        };

        tracing::info!("Pipeline stage: {}", stage);
        let state = std::mem::replace(&mut self.state, PipelineState::Idle);

        let outcome = self.run_stage(state).await;
        self.state = match outcome {
            Ok(next) => next,
            Err(error) => {
                tracing::error!("Pipeline failed while {}: {}", stage, error);
                PipelineState::Failed { stage, error }
            }
        };
    }

    /// Run remaining stages and return the report or the error that stopped the run
    pub async fn finish(mut self) -> Result<VideoPipelineReport> {
        while !self.is_terminal() {
            self.advance().await;
        }

        match self.state {
            PipelineState::Done(report) => Ok(report),
            PipelineState::Failed { error, .. } => Err(error),
            _ => unreachable!("pipeline stopped before a terminal state"),
        }
    }

    async fn run_stage(&self, state: PipelineState) -> Result<PipelineState> {
        match state {
            PipelineState::Idle => {
                let transcription = self.transcribe().await?;
                Ok(PipelineState::Transcribed(transcription))
            }
            PipelineState::Transcribed(transcription) => {
                let request = GenerateVideoRequest::from(&transcription);
                let video = self.client.service.generate_video(&request).await?;
                tracing::info!("Video generated: {}", video.video_url);
                Ok(PipelineState::VideoGenerated { transcription, video })
            }
            PipelineState::VideoGenerated { transcription, video } => {
                let artifact = self
                    .client
                    .download(&video.video_url, ArtifactKind::Video)
                    .await?;
                Ok(PipelineState::Done(VideoPipelineReport {
                    transcription,
                    video,
                    artifact,
                }))
            }
            terminal => Ok(terminal),
        }
    }

    async fn transcribe(&self) -> Result<TranscriptionResult> {
        check_file_accessible(&self.audio_path)?;

        let upload = AudioUpload {
            file_name: upload_file_name(&self.audio_path)?,
            bytes: fs_err::read(&self.audio_path)?,
        };

        let transcription = self.client.service.transcribe(upload).await?;
        match transcription.duration_secs() {
            Some(secs) => tracing::info!(
                "Transcribed {} ({})",
                transcription.audio_file_name,
                format_duration(secs)
            ),
            None => tracing::info!("Transcribed {}", transcription.audio_file_name),
        }

        Ok(transcription)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationConfig;
    use crate::service::MockMediaService;
    use tempfile::TempDir;
    use url::Url;

    fn client(service: MockMediaService, dir: &TempDir) -> RemoteMediaWorkflowClient<MockMediaService> {
        RemoteMediaWorkflowClient::with_service(
            service,
            Url::parse("http://localhost:3000").unwrap(),
            GenerationConfig::default(),
            dir.path().to_path_buf(),
        )
    }

    fn transcription() -> TranscriptionResult {
        serde_json::from_str(r#"{"tempFileName":"t1","audioFileName":"a1.mp3","audioDuration":12.5}"#).unwrap()
    }

    #[tokio::test]
    async fn test_stages_advance_in_order() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("episode.mp3");
        fs_err::write(&input, b"audio").unwrap();

        let mut service = MockMediaService::new();
        service.expect_transcribe().times(1).returning(|_| Ok(transcription()));
        service
            .expect_generate_video()
            .times(1)
            .returning(|_| Ok(VideoResult { video_url: "/videos/v.mp4".into() }));
        service.expect_fetch().times(1).returning(|_| Ok(b"v".to_vec()));

        let client = client(service, &dir);
        let mut pipeline = VideoPipeline::new(&client, &input);
        assert!(matches!(pipeline.state(), PipelineState::Idle));
        assert_eq!(pipeline.next_stage(), Some(PipelineStage::Transcribing));

        pipeline.advance().await;
        assert!(matches!(pipeline.state(), PipelineState::Transcribed(t) if t.temp_file_name == "t1"));
        assert_eq!(pipeline.next_stage(), Some(PipelineStage::GeneratingVideo));

        pipeline.advance().await;
        assert!(matches!(pipeline.state(), PipelineState::VideoGenerated { .. }));
        assert_eq!(pipeline.next_stage(), Some(PipelineStage::Downloading));

        pipeline.advance().await;
        assert!(pipeline.is_terminal());
        assert!(matches!(pipeline.state(), PipelineState::Done(_)));

        let report = pipeline.finish().await.unwrap();
        assert_eq!(report.artifact.path, dir.path().join("v.mp4"));
    }

    #[tokio::test]
    async fn test_failed_is_terminal() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("episode.mp3");
        fs_err::write(&input, b"audio").unwrap();

        let mut service = MockMediaService::new();
        service.expect_transcribe().times(1).returning(|_| Ok(transcription()));
        service.expect_generate_video().times(1).returning(|_| {
            Ok(VideoResult { video_url: "/videos/".into() })
        });
        service.expect_fetch().never();

        let client = client(service, &dir);
        let mut pipeline = VideoPipeline::new(&client, &input);
        pipeline.advance().await;
        pipeline.advance().await;
        pipeline.advance().await;

        assert!(matches!(
            pipeline.state(),
            PipelineState::Failed {
                stage: PipelineStage::Downloading,
                error: WorkflowError::MalformedResponse(_),
            }
        ));

        // no retry transition
        pipeline.advance().await;
        assert!(pipeline.is_terminal());
        assert!(pipeline.finish().await.is_err());
    }
}
