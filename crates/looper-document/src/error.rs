//! Error types for document parsing.

/// Error while parsing an HTML document.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DocumentError {
    /// Markup could not be tokenized.
    #[error("markup parse error")]
    Parse(#[from] quick_xml::Error),

    /// Encoding error while decoding a token.
    #[error("encoding error")]
    Encoding(#[from] quick_xml::encoding::EncodingError),
}
