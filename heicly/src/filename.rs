//! Upload name validation and sanitising

/// Extensions accepted for conversion, compared case-insensitively
pub const ALLOWED_EXTENSIONS: &[&str] = &["heic"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FilenameError {
    #[error("No selected file")]
    Empty,
    #[error("File not allowed")]
    NotAllowed,
}

/// Whether the text after the last `.` is an allowed extension
pub fn allowed_file(filename: &str) -> bool {
    filename.rsplit_once('.').is_some_and(|(_, ext)| {
        let ext = ext.to_ascii_lowercase();
        ALLOWED_EXTENSIONS.contains(&ext.as_str())
    })
}

/// Reduce a client-supplied name to something safe to join onto a directory.
///
/// Non-ASCII characters are dropped, path separators become whitespace, runs of
/// whitespace become a single `_`, anything outside `[A-Za-z0-9_.-]` is removed
/// and leading/trailing `.` or `_` are trimmed. The result can be empty.
pub fn secure_filename(filename: &str) -> String {
    let ascii: String = filename
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");

    joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect::<String>()
        .trim_matches(|c| c == '.' || c == '_')
        .to_string()
}

/// A validated upload name and the names derived from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadName {
    original: String,
    sanitized: String,
    stem: String,
}

impl UploadName {
    pub fn parse(raw: &str) -> Result<Self, FilenameError> {
        if raw.is_empty() {
            return Err(FilenameError::Empty);
        }
        if !allowed_file(raw) {
            return Err(FilenameError::NotAllowed);
        }

        // the allowed extension is ASCII, so sanitising never leaves an empty name
        // or one starting with '.'
        let sanitized = secure_filename(raw);
        let stem = match sanitized.rsplit_once('.') {
            Some((stem, _)) => stem.to_string(),
            None => sanitized.clone(),
        };

        Ok(UploadName {
            original: raw.to_string(),
            sanitized,
            stem,
        })
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn sanitized(&self) -> &str {
        &self.sanitized
    }

    pub fn stem(&self) -> &str {
        &self.stem
    }

    /// Name of the JPEG handed back to the client
    pub fn converted_name(&self) -> String {
        // don't use Path::with_extension, stems may contain dots
        format!("{}.{}", self.stem, crate::image::JPEG_EXTENSION)
    }
}
