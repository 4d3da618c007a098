//! Upload candidates as seen by the admission checks.

/// Folder ID some clients send when no folder is selected.
pub const NULL_FOLDER_SENTINEL: &str = "null";

/// Lowercase extension of the last path component, including the dot.
///
/// Returns an empty string when the name has no dot. Like most path
/// libraries a trailing dot yields `"."`, and a dotfile such as `.png`
/// yields `".png"`.
pub fn file_extension(filename: &str) -> String {
    let name = filename.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(filename);
    match name.rfind('.') {
        Some(pos) => name[pos..].to_lowercase(),
        None => String::new(),
    }
}

/// A single file awaiting admission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadCandidate {
    /// Original filename supplied by the client.
    pub filename: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// Lowercase extension with leading dot. Filled in by validation.
    pub extension: String,
    /// Target folder; empty or `"null"` means no folder.
    pub folder_id: String,
    /// Uploading user.
    pub user_id: i64,
    /// Whether the upload comes from an anonymous guest.
    pub is_guest_upload: bool,
    /// Requested retention token (e.g. `7d`, `permanent`); empty for none.
    pub storage_duration: String,
}

impl UploadCandidate {
    /// Create a candidate with no folder and no storage duration.
    pub fn new(user_id: i64, filename: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            filename: filename.into(),
            size_bytes,
            user_id,
            ..Self::default()
        }
    }

    /// Set the target folder.
    pub fn with_folder(mut self, folder_id: impl Into<String>) -> Self {
        self.folder_id = folder_id.into();
        self
    }

    /// Set the requested storage duration.
    pub fn with_storage_duration(mut self, token: impl Into<String>) -> Self {
        self.storage_duration = token.into();
        self
    }

    /// Mark as a guest upload.
    pub fn as_guest(mut self) -> Self {
        self.is_guest_upload = true;
        self
    }

    /// The target folder, treating `""` and `"null"` as none.
    pub fn folder(&self) -> Option<&str> {
        match self.folder_id.as_str() {
            "" | NULL_FOLDER_SENTINEL => None,
            id => Some(id),
        }
    }
}

/// Name and size of one file in a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchCandidate {
    pub filename: String,
    pub size_bytes: u64,
}

impl BatchCandidate {
    pub fn new(filename: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            filename: filename.into(),
            size_bytes,
        }
    }
}

impl From<&UploadCandidate> for BatchCandidate {
    fn from(candidate: &UploadCandidate) -> Self {
        Self::new(candidate.filename.clone(), candidate.size_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("photo.jpg"), ".jpg");
        assert_eq!(file_extension("PHOTO.JPG"), ".jpg");
        assert_eq!(file_extension("archive.tar.gz"), ".gz");
        assert_eq!(file_extension("README"), "");
        assert_eq!(file_extension("trailing."), ".");
        assert_eq!(file_extension(".png"), ".png");
        assert_eq!(file_extension(""), "");
    }

    #[test]
    fn test_file_extension_uses_last_component() {
        assert_eq!(file_extension("dir.v2/photo"), "");
        assert_eq!(file_extension("dir.v2/photo.Png"), ".png");
        assert_eq!(file_extension("C:\\pics.old\\cat.GIF"), ".gif");
    }

    #[test]
    fn test_folder_normalization() {
        let c = UploadCandidate::new(1, "a.png", 1);
        assert_eq!(c.folder(), None);
        assert_eq!(c.clone().with_folder("null").folder(), None);
        assert_eq!(c.clone().with_folder("").folder(), None);
        assert_eq!(c.with_folder("f-1").folder(), Some("f-1"));
    }

    #[test]
    fn test_builders() {
        let c = UploadCandidate::new(9, "a.png", 10)
            .as_guest()
            .with_storage_duration("1d");
        assert!(c.is_guest_upload);
        assert_eq!(c.storage_duration, "1d");
        assert_eq!(c.extension, "");

        let b = BatchCandidate::from(&c);
        assert_eq!(b, BatchCandidate::new("a.png", 10));
    }
}
