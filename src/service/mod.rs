use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use url::Url;

pub mod http;

pub use http::HttpMediaService;

use crate::config::GenerationConfig;
use crate::Result;

pub const GENERATE_AUDIO_PATH: &str = "/api/generate-audio";
pub const TRANSCRIBE_PATH: &str = "/api/transcribe";
pub const GENERATE_VIDEO_PATH: &str = "/api/generate-video";

/// Content source of an audio generation request.
///
/// Flattened into the request body, so exactly one of the two keys is sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AudioSource {
    #[serde(rename = "youtubeUrl")]
    YoutubeUrl(String),
    #[serde(rename = "text")]
    Text(String),
}

/// Body of `POST /api/generate-audio`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateAudioRequest {
    pub template: String,
    pub speaker1_voice: String,
    pub speaker2_voice: String,
    #[serde(flatten)]
    pub source: AudioSource,
}

impl GenerateAudioRequest {
    pub fn new(generation: &GenerationConfig, source: AudioSource) -> Self {
        Self {
            template: generation.template.clone(),
            speaker1_voice: generation.speaker1_voice.clone(),
            speaker2_voice: generation.speaker2_voice.clone(),
            source,
        }
    }
}

/// Response of `POST /api/generate-audio`; either field may be absent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
}

impl GenerationResult {
    /// Relative audio URL, treating an empty string as absent
    pub fn audio_url(&self) -> Option<&str> {
        self.audio_url.as_deref().filter(|url| !url.is_empty())
    }

    /// Transcript text, treating an empty string as absent
    pub fn transcript(&self) -> Option<&str> {
        self.transcript.as_deref().filter(|text| !text.is_empty())
    }
}

/// Audio bytes uploaded to `POST /api/transcribe`
#[derive(Debug, Clone, PartialEq)]
pub struct AudioUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl AudioUpload {
    pub const FIELD_NAME: &'static str = "audio";
    pub const MIME_TYPE: &'static str = "audio/mpeg";
}

/// Response of `POST /api/transcribe`.
///
/// Fields the client does not use are kept in `extra` so the whole response
/// can be shown to the operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionResult {
    pub temp_file_name: String,
    pub audio_file_name: String,
    pub audio_duration: Number,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TranscriptionResult {
    /// Audio duration in seconds
    pub fn duration_secs(&self) -> Option<f64> {
        self.audio_duration.as_f64()
    }
}

/// Body of `POST /api/generate-video`: the three transcription fields, nothing else
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVideoRequest {
    pub temp_file_name: String,
    pub audio_file_name: String,
    pub audio_duration: Number,
}

impl From<&TranscriptionResult> for GenerateVideoRequest {
    fn from(transcription: &TranscriptionResult) -> Self {
        Self {
            temp_file_name: transcription.temp_file_name.clone(),
            audio_file_name: transcription.audio_file_name.clone(),
            audio_duration: transcription.audio_duration.clone(),
        }
    }
}

/// Response of `POST /api/generate-video`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoResult {
    pub video_url: String,
}

/// The remote media-generation service.
///
/// Each method is one HTTP call. Non-2xx responses come back as
/// `WorkflowError::RemoteService` carrying the raw body.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaService: Send + Sync {
    /// Submit a script or YouTube link for audio generation
    async fn generate_audio(&self, request: &GenerateAudioRequest) -> Result<GenerationResult>;

    /// Upload audio for transcription
    async fn transcribe(&self, upload: AudioUpload) -> Result<TranscriptionResult>;

    /// Render a video from a transcribed upload
    async fn generate_video(&self, request: &GenerateVideoRequest) -> Result<VideoResult>;

    /// Download the bytes served at an absolute URL
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_youtube_request_omits_text() {
        let request = GenerateAudioRequest::new(
            &GenerationConfig::default(),
            AudioSource::YoutubeUrl("https://youtu.be/abc".into()),
        );
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(
            body,
            json!({
                "template": "podcast",
                "speaker1Voice": "aura-asteria-en",
                "speaker2Voice": "aura-arcas-en",
                "youtubeUrl": "https://youtu.be/abc",
            })
        );
        assert!(body.get("text").is_none());
    }

    #[test]
    fn test_text_request_omits_youtube_url() {
        let request = GenerateAudioRequest::new(
            &GenerationConfig::default(),
            AudioSource::Text("Hello there".into()),
        );
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["text"], "Hello there");
        assert!(body.get("youtubeUrl").is_none());
    }

    #[test]
    fn test_generation_result_fields_are_optional() {
        let empty: GenerationResult = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, GenerationResult::default());
        assert!(empty.audio_url().is_none());

        let partial: GenerationResult = serde_json::from_str(r#"{"transcript":"hi","extra":1}"#).unwrap();
        assert_eq!(partial.transcript(), Some("hi"));
        assert!(partial.audio_url().is_none());

        let blank: GenerationResult = serde_json::from_str(r#"{"audioUrl":"","transcript":""}"#).unwrap();
        assert!(blank.audio_url().is_none());
        assert!(blank.transcript().is_none());
    }

    #[test]
    fn test_transcription_keeps_extra_fields() {
        let transcription: TranscriptionResult = serde_json::from_value(json!({
            "tempFileName": "t1",
            "audioFileName": "a1.mp3",
            "audioDuration": 12.5,
            "words": [{"word": "hi"}],
        }))
        .unwrap();

        assert_eq!(transcription.duration_secs(), Some(12.5));
        assert_eq!(transcription.extra["words"], json!([{"word": "hi"}]));
    }

    #[test]
    fn test_transcription_requires_fields() {
        let err = serde_json::from_value::<TranscriptionResult>(json!({
            "tempFileName": "t1",
            "audioDuration": 3,
        }))
        .unwrap_err();
        assert!(err.to_string().contains("audioFileName"));
    }

    #[test]
    fn test_generate_video_body_is_exact() {
        let transcription: TranscriptionResult = serde_json::from_str(
            r#"{"tempFileName":"t1","audioFileName":"a1.mp3","audioDuration":12.5,"segments":[]}"#,
        )
        .unwrap();
        let body = serde_json::to_string(&GenerateVideoRequest::from(&transcription)).unwrap();

        assert_eq!(
            body,
            r#"{"tempFileName":"t1","audioFileName":"a1.mp3","audioDuration":12.5}"#
        );
    }

    #[test]
    fn test_integer_duration_passes_through_unchanged() {
        let transcription: TranscriptionResult = serde_json::from_str(
            r#"{"tempFileName":"t","audioFileName":"a.mp3","audioDuration":42}"#,
        )
        .unwrap();
        let body = serde_json::to_string(&GenerateVideoRequest::from(&transcription)).unwrap();
        assert!(body.ends_with(r#""audioDuration":42}"#));
    }
}
