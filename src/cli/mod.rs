use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;

use crate::workflow::WorkflowRequest;

#[derive(Parser)]
#[command(
    name = "mediaflow",
    about = "mediaflow - Generate podcast audio and videos with a local media-generation service",
    version,
    long_about = "A CLI client for a locally-running media-generation service. Generates podcast-style audio from a text script or a YouTube link, and turns an audio file into a video by transcribing it and rendering the result."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate audio from a YouTube link or a text script
    #[command(group(ArgGroup::new("source").required(true).args(["youtube", "script"])))]
    Audio {
        /// YouTube video URL
        #[arg(short, long, value_name = "URL")]
        youtube: Option<String>,

        /// Text script for the podcast
        #[arg(short, long, value_name = "TEXT")]
        script: Option<String>,
    },

    /// Transcribe an audio file, generate a video from it and download the video
    Video {
        /// Path to the audio file
        #[arg(short, long, value_name = "FILE")]
        audio: PathBuf,
    },

    /// Show or initialise the configuration file
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,

        /// Write a configuration file with default values
        #[arg(long, conflicts_with = "show")]
        init: bool,

        /// Overwrite an existing configuration file with --init
        #[arg(long, requires = "init")]
        force: bool,
    },
}

impl Commands {
    /// Request described by an `audio` invocation
    pub fn audio_request(youtube: Option<String>, script: Option<String>) -> Option<WorkflowRequest> {
        match (youtube, script) {
            (Some(url), _) => Some(WorkflowRequest::YoutubeUrl(url)),
            (None, Some(text)) => Some(WorkflowRequest::RawText(text)),
            (None, None) => None,
        }
    }
}
