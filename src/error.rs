use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("not a zip container: end of central directory not found")]
    MissingEndOfCentralDirectory,

    #[error("zip container is truncated while reading {what}")]
    Truncated { what: &'static str },

    #[error("unsupported zip feature: {0}")]
    Unsupported(&'static str),

    #[error("zip entry is encrypted: {name}")]
    Encrypted { name: String },

    #[error("zip entry {name} uses unsupported compression method {method}")]
    UnsupportedMethod { name: String, method: u16 },

    #[error("failed to inflate zip entry {name}: {status}")]
    Inflate { name: String, status: String },

    #[error("checksum mismatch in zip entry {name}: expected {expected:08x}, got {actual:08x}")]
    ChecksumMismatch {
        name: String,
        expected: u32,
        actual: u32,
    },

    #[error("package part is missing: {name}")]
    MissingPart { name: String },

    #[error("malformed xml in {part}: {message}")]
    Xml { part: String, message: String },

    #[error("document part has no w:body element")]
    MissingBody,
}

#[derive(Debug, Error)]
pub enum FormError {
    #[error("failed to open document: {0}")]
    Container(#[from] ContainerError),

    #[error("form is incomplete, still need: {}", missing.join(", "))]
    IncompleteForm { missing: Vec<String> },

    #[error("invalid built-in pattern: {0}")]
    Pattern(#[from] regex::Error),
}
