use auditorbit_protocol::FileMeta;

use crate::UploadError;

/// Pre-flight rules for a candidate file.
///
/// `allowed_types` entries match either the exact MIME type or a filename
/// suffix (`".pdf"`). An empty list allows every type; `max_size_bytes:
/// None` means no ceiling.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationRules {
    pub allowed_types: Vec<String>,
    pub max_size_bytes: Option<u64>,
}

impl ValidationRules {
    /// Allow-all rules.
    pub fn allow_all() -> Self {
        Self::default()
    }

    pub fn with_allowed_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_max_size_bytes(mut self, max: u64) -> Self {
        self.max_size_bytes = Some(max);
        self
    }

    pub fn with_max_size_mb(self, mb: u64) -> Self {
        self.with_max_size_bytes(mb * 1024 * 1024)
    }
}

/// Checks a candidate file against the rules.
///
/// Pure and synchronous; the controller runs it before any network I/O so a
/// rejected file never causes a request. The first violated rule's reason
/// is returned.
pub fn validate(file: &FileMeta, rules: &ValidationRules) -> Result<(), UploadError> {
    if !rules.allowed_types.is_empty() {
        let matched = rules.allowed_types.iter().any(|pattern| {
            file.mime_type.as_deref() == Some(pattern.as_str()) || file.name.ends_with(pattern)
        });
        if !matched {
            return Err(UploadError::Validation(format!(
                "file type not allowed: {}",
                file.mime_type.as_deref().unwrap_or(&file.name)
            )));
        }
    }

    if let Some(max) = rules.max_size_bytes
        && file.size_bytes > max
    {
        return Err(UploadError::Validation(format!(
            "file size {} exceeds the {} byte ceiling",
            file.size_bytes, max
        )));
    }

    Ok(())
}
