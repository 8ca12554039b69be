use crate::utils::error::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile};

const UPLOAD_PREFIX: &str = "upload-";
const MAX_SUFFIX_LEN: usize = 8;

/// Directory holding uploads while a request is being processed.
#[derive(Debug, Clone)]
pub struct ScratchDir {
    root: PathBuf,
}

impl ScratchDir {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 建立一個唯一命名的暫存檔，名稱由 tempfile 隨機產生
    pub fn create(&self, original_name: Option<&str>) -> Result<Upload> {
        let suffix = original_name.and_then(safe_suffix).unwrap_or_default();

        let file = Builder::new()
            .prefix(UPLOAD_PREFIX)
            .suffix(&suffix)
            .tempfile_in(&self.root)?;

        tracing::debug!("Created scratch file {}", file.path().display());

        Ok(Upload {
            file,
            original_name: original_name.map(str::to_string),
        })
    }
}

/// Keeps the extension of the client's filename when it is plain alphanumerics.
fn safe_suffix(name: &str) -> Option<String> {
    let ext = Path::new(name).extension()?.to_str()?;

    if ext.is_empty()
        || ext.len() > MAX_SUFFIX_LEN
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }

    Some(format!(".{}", ext.to_ascii_lowercase()))
}

/// An uploaded file owned by exactly one request.
///
/// The backing file is removed when the `Upload` is dropped, so early
/// returns, panics and cancelled request futures all release it.
/// [`Upload::discard`] does the same eagerly and reports failures.
#[derive(Debug)]
pub struct Upload {
    file: NamedTempFile,
    original_name: Option<String>,
}

impl Upload {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn original_name(&self) -> Option<&str> {
        self.original_name.as_deref()
    }

    /// Opens the backing file for writing, truncating whatever it held.
    pub async fn writer(&self) -> Result<tokio::fs::File> {
        let file = tokio::fs::OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(self.path())
            .await?;
        Ok(file)
    }

    pub fn discard(self) {
        let path = self.path().to_path_buf();
        match self.file.close() {
            Ok(()) => tracing::debug!("Removed scratch file {}", path.display()),
            Err(e) => tracing::warn!("Failed to remove scratch file {}: {}", path.display(), e),
        }
    }
}
