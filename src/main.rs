use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mediaflow::{Cli, Commands, Config, PipelineState, RemoteMediaWorkflowClient, VideoPipeline};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose { "mediaflow=debug" } else { "mediaflow=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --init must work even when the current file does not parse
    if let Commands::Config { init: true, force, .. } = cli.command {
        let path = Config::init(force).await?;
        println!("Configuration written to: {}", path.display());
        return Ok(());
    }

    let config = Config::load().await?;

    match cli.command {
        Commands::Audio { youtube, script } => {
            let request = Commands::audio_request(youtube, script)
                .context("Please provide either a YouTube URL or a text script")?;
            let client = RemoteMediaWorkflowClient::new(&config)?;

            let progress = spinner(cli.quiet, "Generating audio...")?;
            let outcome = client.generate_audio(&request).await;
            progress.finish_and_clear();

            let outcome = outcome?;
            for artifact in outcome.artifacts() {
                println!("{} saved as: {}", artifact.kind, artifact.path.display());
            }
            outcome.into_result().context("Audio generation finished with errors")?;

            println!("Audio generation completed successfully");
        }
        Commands::Video { audio } => {
            if !audio.exists() {
                anyhow::bail!("Audio file '{}' not found.", audio.display());
            }
            let client = RemoteMediaWorkflowClient::new(&config)?;
            let mut pipeline = VideoPipeline::new(&client, &audio);

            let progress = spinner(cli.quiet, "Starting video pipeline...")?;
            while let Some(stage) = pipeline.next_stage() {
                progress.set_message(format!("{}...", stage));
                pipeline.advance().await;

                if let PipelineState::Transcribed(transcription) = pipeline.state() {
                    if !cli.quiet {
                        let json = serde_json::to_string_pretty(transcription)?;
                        progress.suspend(|| {
                            println!("Transcription JSON response:");
                            println!("{}", json);
                        });
                    }
                }
            }
            progress.finish_and_clear();

            let report = pipeline.finish().await?;
            println!("Video generated: {}", report.video.video_url);
            println!("Video downloaded: {}", report.artifact.path.display());
        }
        Commands::Config { .. } => config.display(),
    }

    Ok(())
}

/// Spinner for a long-running request, hidden with `--quiet`
fn spinner(quiet: bool, message: &str) -> Result<ProgressBar> {
    if quiet {
        return Ok(ProgressBar::hidden());
    }

    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    progress.set_message(message.to_string());
    progress.enable_steady_tick(Duration::from_millis(120));
    Ok(progress)
}
