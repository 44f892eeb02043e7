use thiserror::Error;

/// Errors raised before a response reaches the denormalizer.
/// Reference resolution itself never fails.
#[derive(Error, Debug)]
pub enum FindexError {
    #[error("Failed to read {origin}: {source}")]
    Io {
        origin: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{origin} is not a valid JSON:API document: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid filter '{0}': expected filter[field]=value")]
    InvalidFilter(String),
}
