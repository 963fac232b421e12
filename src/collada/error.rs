use thiserror::Error;

/// Errors raised while translating a COLLADA document.
///
/// Only [`NotCollada`](ColladaError::NotCollada) and
/// [`Xml`](ColladaError::Xml) abort the whole document; every other variant
/// is caught at the enclosing geometry/instance boundary, logged, and the
/// offending content skipped.
#[derive(Debug, Error)]
pub enum ColladaError {
    /// The document root is not a `COLLADA` element.
    #[error("document root is '{0}', expected 'COLLADA'")]
    NotCollada(String),

    /// The document violates COLLADA structure (mismatched ids, missing
    /// required children).
    #[error("malformed document: {0}")]
    Structural(String),

    /// A primitive is missing a required input semantic.
    #[error("missing required input semantic '{0}'")]
    MissingInput(&'static str),

    /// A token could not be parsed as a number.
    #[error("invalid numeric token '{token}'")]
    NumberFormat { token: String },

    /// A url/ref attribute points at nothing in this document.
    #[error("unresolved reference '{0}'")]
    UnresolvedReference(String),

    /// Valid COLLADA that this translator does not handle.
    #[error("unsupported content: {0}")]
    Unsupported(String),

    /// The document is not well-formed XML.
    #[error("xml parse error: {0}")]
    Xml(#[from] xmltree::ParseError),
}
