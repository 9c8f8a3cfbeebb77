use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::Result;

/// Fixed name of the transcript artifact
pub const TRANSCRIPT_FILE_NAME: &str = "transcript.txt";

/// What an artifact holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Audio,
    Transcript,
    Video,
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtifactKind::Audio => write!(f, "audio"),
            ArtifactKind::Transcript => write!(f, "transcript"),
            ArtifactKind::Video => write!(f, "video"),
        }
    }
}

/// A file materialised on the local filesystem
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub kind: ArtifactKind,

    /// Where the bytes were written
    pub path: PathBuf,

    /// Size in bytes
    pub size: u64,

    pub saved_at: DateTime<Utc>,
}

/// Mode given to written artifacts, matching a plain create under the usual umask
#[cfg(unix)]
pub const ARTIFACT_MODE: u32 = 0o644;

/// Write `contents` to `dir/name`, replacing any existing file.
///
/// `dir` is created if missing. Bytes land in a temporary file in the same
/// directory first and are then renamed into place, so the final name never
/// holds a partial write.
pub fn write_artifact(dir: &Path, name: &str, kind: ArtifactKind, contents: &[u8]) -> Result<Artifact> {
    let path = dir.join(name);
    tracing::debug!("Writing {} artifact to {}", kind, path.display());

    persist_atomically(dir, &path, contents).map_err(|e| {
        io::Error::new(e.kind(), format!("Failed to write {}: {}", path.display(), e))
    })?;

    Ok(Artifact {
        kind,
        path,
        size: contents.len() as u64,
        saved_at: Utc::now(),
    })
}

fn persist_atomically(dir: &Path, path: &Path, contents: &[u8]) -> io::Result<()> {
    fs_err::create_dir_all(dir)?;

    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(contents)?;
    file.flush()?;

    // temp files are created owner-only
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.as_file()
            .set_permissions(std::fs::Permissions::from_mode(ARTIFACT_MODE))?;
    }

    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Write a transcript as UTF-8 text under its fixed name
pub fn write_transcript(dir: &Path, transcript: &str) -> Result<Artifact> {
    write_artifact(dir, TRANSCRIPT_FILE_NAME, ArtifactKind::Transcript, transcript.as_bytes())
}
