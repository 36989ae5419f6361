use crate::{error::ExportError, models::ExportArtifact};
use async_trait::async_trait;
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

/// Upper bound on `-N` suffixes tried before giving up on a free filename.
const MAX_SEQUENCE: u32 = 10_000;

/// Host file-save mechanism. Consumes the artifact; returns where it landed.
#[async_trait]
pub trait DownloadSurface: Send + Sync {
    async fn save(&self, artifact: ExportArtifact) -> Result<PathBuf, ExportError>;
}

/// Saves artifacts into a directory, never overwriting an existing file.
#[derive(Debug, Clone)]
pub struct FileDownloader {
    dir: PathBuf,
}

impl FileDownloader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl DownloadSurface for FileDownloader {
    async fn save(&self, artifact: ExportArtifact) -> Result<PathBuf, ExportError> {
        let dir = self.dir.clone();
        tokio::task::spawn_blocking(move || save_into(&dir, artifact))
            .await
            .map_err(|e| ExportError::Download(format!("download task failed: {}", e)))?
    }
}

/// `image.png` -> `image.png`, `image-1.png`, `image-2.png`, ...
pub fn candidate_name(filename: &str, sequence: u32) -> String {
    if sequence == 0 {
        return filename.to_string();
    }
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{}-{}.{}", stem, sequence, ext),
        _ => format!("{}-{}", filename, sequence),
    }
}

/// Writes the bytes into a temporary file in `dir`, then links it under the first free
/// candidate name. The temporary file is removed on every path that does not persist it.
fn save_into(dir: &Path, artifact: ExportArtifact) -> Result<PathBuf, ExportError> {
    let io_err = |context: &str, e: io::Error| {
        ExportError::Download(format!("{} ({}): {}", context, dir.display(), e))
    };

    fs::create_dir_all(dir).map_err(|e| io_err("cannot create download directory", e))?;

    let mut temp = tempfile::Builder::new()
        .prefix(".pixgen-")
        .suffix(".part")
        .tempfile_in(dir)
        .map_err(|e| io_err("cannot create temporary file", e))?;

    temp.write_all(&artifact.bytes)
        .and_then(|_| temp.flush())
        .map_err(|e| io_err("cannot write temporary file", e))?;

    for sequence in 0..MAX_SEQUENCE {
        let target = dir.join(candidate_name(&artifact.filename, sequence));
        match temp.persist_noclobber(&target) {
            Ok(_) => {
                log::info!(
                    "💾 Saved {} ({} bytes, {})",
                    target.display(),
                    artifact.len(),
                    artifact.mime_type
                );
                return Ok(target);
            }
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                log::debug!("{} exists, trying next name", target.display());
                temp = e.file;
            }
            Err(e) => return Err(io_err("cannot save file", e.error)),
        }
    }

    Err(ExportError::Download(format!(
        "no free filename for {} in {}",
        artifact.filename,
        dir.display()
    )))
}
