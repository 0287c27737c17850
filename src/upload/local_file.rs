use super::types::UploadError;
use std::fs;
use std::path::Path;

/// A file picked on this machine, read fully into memory.
#[derive(Clone, PartialEq)]
pub struct LocalFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for LocalFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalFile")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl LocalFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, UploadError> {
        let name = path
            .file_name()
            .ok_or_else(|| UploadError::Read("Invalid filename".to_string()))?
            .to_string_lossy()
            .to_string();

        let bytes = fs::read(path).map_err(|e| UploadError::Read(format!("{}: {}", name, e)))?;
        let content_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        tracing::debug!("Selected {} ({}, {} bytes)", name, content_type, bytes.len());
        Ok(Self {
            name,
            content_type,
            bytes,
        })
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_reads_bytes_and_guesses_content_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invoice.pdf");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(b"%PDF-1.7 fake").unwrap();

        let local = LocalFile::from_path(&path).unwrap();
        assert_eq!(local.name, "invoice.pdf");
        assert_eq!(local.content_type, "application/pdf");
        assert_eq!(local.bytes, b"%PDF-1.7 fake");
    }

    #[test]
    fn test_unknown_extension_is_octet_stream() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.zzzq");
        fs::write(&path, [0u8, 1, 2]).unwrap();

        let local = LocalFile::from_path(&path).unwrap();
        assert_eq!(local.content_type, "application/octet-stream");
        assert_eq!(local.size(), 3);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = LocalFile::from_path(&dir.path().join("gone.png")).unwrap_err();
        assert!(matches!(err, UploadError::Read(_)));
    }
}
