use std::io;
use std::path::{Path, PathBuf};

use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use super::{UploadedFile, PUBLIC_PREFIX};

/// Local directory holding uploaded images.
///
/// Files are only ever created under fresh random names, so concurrent
/// uploads never contend for the same path.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    /// Create the directory if needed and pin its absolute path
    pub fn open(dir: impl AsRef<Path>) -> io::Result<Self> {
        std::fs::create_dir_all(dir.as_ref())?;
        let dir = std::fs::canonicalize(dir.as_ref())?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Start writing a new file for an upload named `original` by the client
    pub async fn create(&self, original: &str) -> io::Result<PendingFile> {
        let extension = extension_of(original);
        let stored_name = match &extension {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
            None => Uuid::new_v4().to_string(),
        };
        let path = self.dir.join(&stored_name);

        // create_new: a name collision fails instead of overwriting
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;

        Ok(PendingFile {
            file,
            finished: false,
            upload: UploadedFile {
                original_name: original.to_string(),
                public_url: format!("{}/{}", PUBLIC_PREFIX, stored_name),
                stored_name,
                extension,
                path,
            },
        })
    }

    /// Read a previously stored file. Unknown or unsafe names yield `None`.
    pub async fn read(&self, name: &str) -> Option<Vec<u8>> {
        if !is_safe_name(name) {
            tracing::warn!("Rejected upload asset name {:?}", name);
            return None;
        }

        match fs::read(self.dir.join(name)).await {
            Ok(bytes) => Some(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!("Failed to read upload asset {}: {}", name, e);
                None
            }
        }
    }
}

/// A file being written; removed from disk unless [`PendingFile::finish`] succeeds
pub struct PendingFile {
    file: File,
    finished: bool,
    upload: UploadedFile,
}

impl PendingFile {
    pub async fn write(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.file.write_all(chunk).await
    }

    pub async fn finish(mut self) -> io::Result<UploadedFile> {
        self.file.flush().await?;
        self.file.sync_all().await?;
        self.finished = true;
        Ok(self.upload.clone())
    }
}

impl Drop for PendingFile {
    fn drop(&mut self) {
        if !self.finished {
            tracing::debug!("Discarding partial upload {}", self.upload.path.display());
            let _ = std::fs::remove_file(&self.upload.path);
        }
    }
}

/// Content type served for an upload, by extension
pub fn content_type_for(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        _ => "image/jpeg",
    }
}

/// Extension of the client's file name, case preserved.
/// Anything but a plain alphanumeric extension is dropped.
fn extension_of(original: &str) -> Option<String> {
    let base = original.rsplit(&['/', '\\'][..]).next().unwrap_or(original);
    Path::new(base)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_string)
}

fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains("..")
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
}
