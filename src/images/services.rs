use std::path::{Path, PathBuf};

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use thiserror::Error;
use tracing::debug;

pub const MAX_LOGO_BYTES: u64 = 5 * 1024 * 1024;

pub const ALLOWED_LOGO_TYPES: [&str; 5] = [
    "image/png",
    "image/jpeg",
    "image/gif",
    "image/webp",
    "image/svg+xml",
];

/// Multipart field the backend reads the logo from.
pub const LOGO_FIELD: &str = "logo";

#[derive(Debug, Error)]
pub enum LogoError {
    #[error("Invalid file type. Allowed types: PNG, JPEG, GIF, WEBP, SVG")]
    UnsupportedType(String),
    #[error("File is too large. Maximum size is 5MB")]
    TooLarge(u64),
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A logo picked by the user and already checked against type and size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoFile {
    pub file_name: String,
    pub content_type: String,
    pub body: Bytes,
}

impl LogoFile {
    /// A drag-and-drop: name, declared MIME and bytes come from the drop.
    pub fn from_drop(
        file_name: impl Into<String>,
        content_type: &str,
        body: impl Into<Bytes>,
    ) -> Result<Self, LogoError> {
        let body = body.into();
        let content_type = content_type.trim().to_ascii_lowercase();
        validate_logo(&content_type, body.len() as u64)?;
        Ok(Self {
            file_name: file_name.into(),
            content_type,
            body,
        })
    }

    /// A file-picker selection. The MIME type comes from the extension and
    /// the size from metadata, so oversized files are never read.
    pub async fn from_path(path: &Path) -> Result<Self, LogoError> {
        let content_type = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(mime_from_ext)
            .unwrap_or("application/octet-stream");
        let read_err = |source| LogoError::Read {
            path: path.to_path_buf(),
            source,
        };
        let meta = tokio::fs::metadata(path).await.map_err(read_err)?;
        validate_logo(content_type, meta.len())?;

        let body = tokio::fs::read(path).await.map_err(read_err)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("logo.{}", ext_from_mime(content_type).unwrap_or("bin")));
        debug!(%file_name, content_type, size = body.len(), "logo selected");
        Ok(Self {
            file_name,
            content_type: content_type.to_string(),
            body: Bytes::from(body),
        })
    }

    pub fn size(&self) -> u64 {
        self.body.len() as u64
    }

    pub fn into_form(self) -> Result<Form, reqwest::Error> {
        let part = Part::stream(self.body)
            .file_name(self.file_name)
            .mime_str(&self.content_type)?;
        Ok(Form::new().part(LOGO_FIELD, part))
    }
}

/// Type is checked before size: a large text file reports the type error.
pub fn validate_logo(content_type: &str, size: u64) -> Result<(), LogoError> {
    if !ALLOWED_LOGO_TYPES.contains(&content_type) {
        return Err(LogoError::UnsupportedType(content_type.to_string()));
    }
    if size > MAX_LOGO_BYTES {
        return Err(LogoError::TooLarge(size));
    }
    Ok(())
}

fn mime_from_ext(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "image/svg+xml" => Some("svg"),
        _ => None,
    }
}

#[cfg(test)]
mod image_tests {
    use super::*;

    const MIB: usize = 1024 * 1024;

    #[test]
    fn test_mime_and_ext() {
        assert_eq!(mime_from_ext("PNG"), Some("image/png"));
        assert_eq!(mime_from_ext("jpeg"), Some("image/jpeg"));
        assert_eq!(mime_from_ext("svg"), Some("image/svg+xml"));
        assert_eq!(mime_from_ext("txt"), None);
        assert_eq!(ext_from_mime("image/jpg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/svg+xml"), Some("svg"));
        assert_eq!(ext_from_mime("application/octet-stream"), None);
    }

    #[test]
    fn oversized_png_is_rejected() {
        let err = LogoFile::from_drop("big.png", "image/png", vec![0u8; 6 * MIB]).unwrap_err();
        assert!(matches!(err, LogoError::TooLarge(n) if n == (6 * MIB) as u64));
    }

    #[test]
    fn svg_under_the_limit_is_accepted() {
        let logo = LogoFile::from_drop("mark.svg", "image/svg+xml", vec![b' '; MIB]).unwrap();
        assert_eq!(logo.size(), MIB as u64);
        assert!(validate_logo("image/png", MAX_LOGO_BYTES).is_ok());
    }

    #[test]
    fn text_is_rejected_whatever_the_size() {
        assert!(matches!(
            validate_logo("text/plain", 10),
            Err(LogoError::UnsupportedType(_))
        ));
        assert!(matches!(
            validate_logo("text/plain", 10 * MIB as u64),
            Err(LogoError::UnsupportedType(_))
        ));
    }

    #[tokio::test]
    async fn picker_derives_type_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let notes = dir.path().join("notes.txt");
        std::fs::write(&notes, b"hello").unwrap();
        assert!(matches!(
            LogoFile::from_path(&notes).await,
            Err(LogoError::UnsupportedType(_))
        ));

        let logo = dir.path().join("logo.webp");
        std::fs::write(&logo, b"RIFF....WEBP").unwrap();
        let picked = LogoFile::from_path(&logo).await.unwrap();
        assert_eq!(picked.content_type, "image/webp");
        assert_eq!(picked.file_name, "logo.webp");
        assert_eq!(picked.body, Bytes::from_static(b"RIFF....WEBP"));
    }

    #[tokio::test]
    async fn picker_rejects_oversized_file_from_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let big = dir.path().join("big.png");
        let file = std::fs::File::create(&big).unwrap();
        file.set_len(MAX_LOGO_BYTES + 1).unwrap();
        drop(file);

        let err = LogoFile::from_path(&big).await.unwrap_err();
        assert!(matches!(err, LogoError::TooLarge(n) if n == MAX_LOGO_BYTES + 1));
        assert_eq!(err.to_string(), "File is too large. Maximum size is 5MB");

        let edge = dir.path().join("edge.png");
        std::fs::File::create(&edge)
            .unwrap()
            .set_len(MAX_LOGO_BYTES)
            .unwrap();
        assert_eq!(LogoFile::from_path(&edge).await.unwrap().size(), MAX_LOGO_BYTES);
    }

    #[tokio::test]
    async fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = LogoFile::from_path(&dir.path().join("gone.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, LogoError::Read { .. }));
    }
}
