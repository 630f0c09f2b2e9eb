use thiserror::Error;

/// Failures while reading touch frames from a transport.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to read touch frames")]
    Io(#[from] std::io::Error),
    #[error("invalid touch frame")]
    Decode(#[from] serde_json::Error),
    #[error("invalid touch frame on line {line}")]
    DecodeLine {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}
