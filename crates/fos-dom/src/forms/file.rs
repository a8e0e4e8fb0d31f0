//! File entries selected through `<input type="file">`

/// A selected file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileEntry {
    /// File name
    pub name: String,
    /// MIME type
    pub mime_type: String,
    /// File content
    pub content: Vec<u8>,
    /// Last modified timestamp (ms since epoch)
    pub last_modified: u64,
}

impl FileEntry {
    /// Create a file entry
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            content,
            last_modified: 0,
        }
    }

    /// Size in bytes
    pub fn size(&self) -> usize {
        self.content.len()
    }
}
