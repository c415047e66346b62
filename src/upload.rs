use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::format::format_file_size;

pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "docx", "doc"];
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// A resume picked for upload. Only name and size are held locally; the
/// bytes are read when the upload is sent.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
}

#[derive(Debug, Error, PartialEq)]
pub enum UploadRejection {
    #[error("Unsupported file type '{name}'. Allowed: PDF, DOCX, DOC")]
    UnsupportedType { name: String },

    #[error("File is too large ({}). Maximum size is 10 MB", size_label(.size))]
    TooLarge { size: u64 },

    #[error("Cannot read file {path}: {reason}")]
    Unreadable { path: String, reason: String },
}

impl SelectedFile {
    pub fn from_path(path: &Path) -> Result<Self, UploadRejection> {
        let meta = fs::metadata(path).map_err(|e| UploadRejection::Unreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        if !meta.is_file() {
            return Err(UploadRejection::Unreadable {
                path: path.display().to_string(),
                reason: "not a regular file".to_string(),
            });
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let file = Self {
            path: path.to_path_buf(),
            name,
            size: meta.len(),
        };
        file.validate()?;
        Ok(file)
    }

    pub fn validate(&self) -> Result<(), UploadRejection> {
        validate_upload(&self.name, self.size)
    }

    pub fn mime_type(&self) -> String {
        mime_guess::from_path(&self.path)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    }
}

fn size_label(size: &u64) -> String {
    format_file_size(*size)
}

pub fn validate_upload(name: &str, size: u64) -> Result<(), UploadRejection> {
    let extension = Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());
    match extension {
        Some(ext) if ALLOWED_EXTENSIONS.contains(&ext.as_str()) => {}
        _ => {
            return Err(UploadRejection::UnsupportedType {
                name: name.to_string(),
            });
        }
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(UploadRejection::TooLarge { size });
    }
    Ok(())
}

/// Terminals deliver a dropped file as pasted text: possibly quoted,
/// possibly a `file://` URL, possibly with escaped spaces.
pub fn path_from_drop(raw: &str) -> PathBuf {
    let mut text = raw.trim();
    for quote in ['\'', '"'] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            text = &text[1..text.len() - 1];
        }
    }
    let text = text.strip_prefix("file://").unwrap_or(text);
    PathBuf::from(text.replace("\\ ", " "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    const MB: u64 = 1024 * 1024;

    #[test]
    fn test_validate_upload_extension() {
        assert!(validate_upload("resume.pdf", 100).is_ok());
        assert!(validate_upload("resume.DOCX", 100).is_ok());
        assert!(validate_upload("resume.doc", 100).is_ok());
        assert_eq!(
            validate_upload("resume.exe", 100),
            Err(UploadRejection::UnsupportedType {
                name: "resume.exe".to_string()
            })
        );
        assert!(validate_upload("resume", 100).is_err());
    }

    #[test]
    fn test_validate_upload_size_limit() {
        assert!(validate_upload("resume.pdf", MAX_UPLOAD_BYTES).is_ok());
        assert_eq!(
            validate_upload("resume.pdf", 11 * MB),
            Err(UploadRejection::TooLarge { size: 11 * MB })
        );
        assert!(validate_upload("resume.docx", 9 * MB).is_ok());
    }

    #[test]
    fn test_from_path_reads_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.docx");
        File::create(&path).unwrap().set_len(9 * MB).unwrap();

        let file = SelectedFile::from_path(&path).unwrap();
        assert_eq!(file.name, "resume.docx");
        assert_eq!(file.size, 9 * MB);
    }

    #[test]
    fn test_from_path_rejects_oversized_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.pdf");
        File::create(&path).unwrap().set_len(11 * MB).unwrap();

        assert!(matches!(
            SelectedFile::from_path(&path),
            Err(UploadRejection::TooLarge { .. })
        ));
    }

    #[test]
    fn test_from_path_missing_file() {
        let result = SelectedFile::from_path(Path::new("/nonexistent/resume.pdf"));
        assert!(matches!(result, Err(UploadRejection::Unreadable { .. })));
    }

    #[test]
    fn test_mime_type() {
        let file = SelectedFile {
            path: PathBuf::from("cv.pdf"),
            name: "cv.pdf".to_string(),
            size: 1,
        };
        assert_eq!(file.mime_type(), "application/pdf");
    }

    #[test]
    fn test_path_from_drop() {
        assert_eq!(path_from_drop("'/tmp/my cv.pdf'\n"), PathBuf::from("/tmp/my cv.pdf"));
        assert_eq!(path_from_drop("file:///tmp/cv.pdf"), PathBuf::from("/tmp/cv.pdf"));
        assert_eq!(path_from_drop("/tmp/my\\ cv.pdf"), PathBuf::from("/tmp/my cv.pdf"));
    }
}
