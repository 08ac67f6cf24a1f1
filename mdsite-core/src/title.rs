use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TitleError {
    #[error("document has no top-level '# ' heading")]
    Missing,
}

/// Text of the first `# ` line in the document, exactly as written after the marker.
///
/// This is a plain line scan, so a `# ` line inside a code block still counts.
pub fn extract_title(markdown: &str) -> Result<String, TitleError> {
    markdown
        .lines()
        .find_map(|line| line.strip_prefix("# "))
        .map(str::to_string)
        .ok_or(TitleError::Missing)
}
