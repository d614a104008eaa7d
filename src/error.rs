use crate::config::ConfigError;
use thiserror::Error;

/// Errors returned by the buffer source.
///
/// `WouldBlock` and `EndOfStream` are flow-control signals for the graph
/// executor rather than failures. Everything else is a caller error and is
/// returned unmodified.
#[derive(Error, Debug)]
pub enum BufferSrcError {
    /// Malformed frame, channel layout/count mismatch or audio format drift.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A frame was pushed after end of stream was signaled.
    #[error("stream closed: frame pushed after end of stream")]
    StreamClosed,

    /// Growing the queue failed.
    #[error("out of memory")]
    OutOfMemory,

    /// The queue is empty but the producer has not finished. Retry later.
    #[error("no frame available yet")]
    WouldBlock,

    /// The queue is empty and end of stream was signaled.
    #[error("end of stream")]
    EndOfStream,

    /// Stream parameters could not be parsed or validated.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl BufferSrcError {
    /// Returns true for [`BufferSrcError::WouldBlock`].
    pub fn is_would_block(&self) -> bool {
        matches!(self, BufferSrcError::WouldBlock)
    }

    /// Returns true for [`BufferSrcError::EndOfStream`].
    pub fn is_eof(&self) -> bool {
        matches!(self, BufferSrcError::EndOfStream)
    }

    /// Returns true when the error is a scheduling signal and should not be
    /// reported to the user.
    pub fn is_control_flow(&self) -> bool {
        self.is_would_block() || self.is_eof()
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        BufferSrcError::InvalidArgument(msg.into())
    }
}

impl From<std::collections::TryReserveError> for BufferSrcError {
    fn from(_: std::collections::TryReserveError) -> Self {
        BufferSrcError::OutOfMemory
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, BufferSrcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_flow_classification() {
        assert!(BufferSrcError::WouldBlock.is_control_flow());
        assert!(BufferSrcError::EndOfStream.is_control_flow());
        assert!(!BufferSrcError::StreamClosed.is_control_flow());
        assert!(!BufferSrcError::OutOfMemory.is_control_flow());
        assert!(!BufferSrcError::invalid("bad").is_control_flow());
    }

    #[test]
    fn test_config_error_converts() {
        let err: BufferSrcError = ConfigError::MissingArguments.into();
        assert!(matches!(err, BufferSrcError::Config(ConfigError::MissingArguments)));
    }
}
