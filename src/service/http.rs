use async_trait::async_trait;
use reqwest::{multipart, Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use super::{
    AudioUpload, GenerateAudioRequest, GenerateVideoRequest, GenerationResult, MediaService,
    TranscriptionResult, VideoResult, GENERATE_AUDIO_PATH, GENERATE_VIDEO_PATH, TRANSCRIBE_PATH,
};
use crate::utils::resolve_url;
use crate::{Result, WorkflowError};

/// `MediaService` over HTTP with reqwest
pub struct HttpMediaService {
    client: Client,
    base_url: Url,
}

impl HttpMediaService {
    pub fn new(base_url: Url, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        resolve_url(&self.base_url, path)
    }

    /// Turn a non-2xx response into `RemoteService`, keeping the body verbatim
    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|e| format!("<unreadable body: {}>", e));
        tracing::warn!("Service error response ({}): {}", status, body);

        Err(WorkflowError::RemoteService {
            status: status.as_u16(),
            body,
        })
    }

    async fn parse_json<T: DeserializeOwned>(response: Response, call: &str) -> Result<T> {
        let response = Self::check_status(response).await?;
        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| {
            WorkflowError::MalformedResponse(format!("{} response: {} (body: {})", call, e, body))
        })
    }
}

#[async_trait]
impl MediaService for HttpMediaService {
    async fn generate_audio(&self, request: &GenerateAudioRequest) -> Result<GenerationResult> {
        let url = self.endpoint(GENERATE_AUDIO_PATH)?;
        tracing::debug!("POST {}", url);

        let response = self.client.post(url).json(request).send().await?;
        Self::parse_json(response, "generate-audio").await
    }

    async fn transcribe(&self, upload: AudioUpload) -> Result<TranscriptionResult> {
        let url = self.endpoint(TRANSCRIBE_PATH)?;
        tracing::debug!(
            "POST {} ({}, {})",
            url,
            upload.file_name,
            crate::utils::format_file_size(upload.bytes.len() as u64)
        );

        let part = multipart::Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(AudioUpload::MIME_TYPE)?;
        let form = multipart::Form::new().part(AudioUpload::FIELD_NAME, part);

        let response = self.client.post(url).multipart(form).send().await?;
        Self::parse_json(response, "transcribe").await
    }

    async fn generate_video(&self, request: &GenerateVideoRequest) -> Result<VideoResult> {
        let url = self.endpoint(GENERATE_VIDEO_PATH)?;
        tracing::debug!("POST {}", url);

        let response = self.client.post(url).json(request).send().await?;
        Self::parse_json(response, "generate-video").await
    }

    async fn fetch(&self, url: &Url) -> Result<Vec<u8>> {
        tracing::debug!("GET {}", url);

        let response = self.client.get(url.clone()).send().await?;
        let response = Self::check_status(response).await?;
        let bytes = response.bytes().await?;

        Ok(bytes.to_vec())
    }
}
