use anyhow::Result;
use std::io;
use std::path::Path;
use url::Url;

use crate::WorkflowError;

/// Validate a URL and return normalized version
pub fn validate_and_normalize_url(url: &str) -> Result<String> {
    let parsed = Url::parse(url)
        .map_err(|_| anyhow::anyhow!("Invalid URL format: {}", url))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("URL must use HTTP or HTTPS protocol");
    }

    Ok(parsed.to_string())
}

/// Resolve a service-relative URL against the base origin.
///
/// The result must stay on the base origin; anything else returned by the
/// service is treated as a malformed response.
pub fn resolve_url(base: &Url, relative: &str) -> crate::Result<Url> {
    let resolved = base
        .join(relative)
        .map_err(|e| WorkflowError::InvalidUrl(format!("{}: {}", relative, e)))?;

    if resolved.origin() != base.origin() {
        return Err(WorkflowError::MalformedResponse(format!(
            "URL {} does not belong to {}",
            resolved,
            base.origin().ascii_serialization()
        )));
    }

    Ok(resolved)
}

/// Local file name for an artifact served at `url`: the last segment of its path
pub fn artifact_name(url: &Url) -> crate::Result<String> {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
        .map(str::to_string)
        .ok_or_else(|| {
            WorkflowError::MalformedResponse(format!("Cannot derive a file name from {}", url))
        })
}

/// Format file size in human-readable format
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    const THRESHOLD: f64 = 1024.0;

    if bytes == 0 {
        return "0 B".to_string();
    }

    let bytes_f = bytes as f64;
    let unit_index = (bytes_f.log10() / THRESHOLD.log10()).floor() as usize;
    let unit_index = unit_index.min(UNITS.len() - 1);

    let size = bytes_f / THRESHOLD.powi(unit_index as i32);

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// Format duration in human-readable format
pub fn format_duration(seconds: f64) -> String {
    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Check that a path names an existing regular file
pub fn check_file_accessible(path: &Path) -> crate::Result<()> {
    if !path.exists() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("Audio file '{}' not found", path.display()),
        )
        .into());
    }

    if !fs_err::metadata(path)?.is_file() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Path is not a file: {}", path.display()),
        )
        .into());
    }

    Ok(())
}

/// Final component of a local path, used as the upload file name
pub fn upload_file_name(path: &Path) -> crate::Result<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Path has no file name: {}", path.display()),
            )
            .into()
        })
}
