//! Photo upload capability.
//!
//! The completion transition depends on this seam; it never touches
//! multipart forms or storage backends itself.

use crate::error::DeskResult;
use anyhow::Context;
use std::path::PathBuf;
use uuid::Uuid;

/// A raw photo as received from the caller.
#[derive(Debug, Clone)]
pub struct PhotoFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Stores completion photos somewhere and returns one URI per file.
pub trait PhotoUploader: Send {
    fn upload_photos(&self, files: &[PhotoFile]) -> DeskResult<Vec<String>>;
}

/// Writes photos under a local directory. URIs are the resulting paths.
pub struct DirPhotoStore {
    root: PathBuf,
}

impl DirPhotoStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl PhotoUploader for DirPhotoStore {
    fn upload_photos(&self, files: &[PhotoFile]) -> DeskResult<Vec<String>> {
        std::fs::create_dir_all(&self.root)
            .with_context(|| format!("creating photo dir {}", self.root.display()))?;
        let mut uris = Vec::with_capacity(files.len());
        for file in files {
            // A fresh id per upload; original names are kept as a suffix
            // so the files stay recognizable on disk.
            let name = format!("{}-{}", Uuid::new_v4(), sanitize(&file.file_name));
            let path = self.root.join(&name);
            std::fs::write(&path, &file.bytes)
                .with_context(|| format!("writing photo {}", path.display()))?;
            uris.push(path.display().to_string());
        }
        Ok(uris)
    }
}

fn sanitize(file_name: &str) -> String {
    file_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect()
}
