/// Every way a resampling session can refuse or fail an operation.
///
/// Precondition variants are returned synchronously by the accepting call and
/// never change session state. `Engine`, `EngineStalled`, `OutputOverflow` and
/// `WorkerLost` arrive through the completion channel.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum ResampleError {
    #[error("already open")]
    AlreadyOpen,

    #[error("still closing")]
    StillClosing,

    #[error("couldn't open engine: {reason}")]
    EngineOpenFailed { reason: String },

    #[error("not open")]
    NotOpen,

    #[error("already resampling")]
    AlreadyResampling,

    #[error("still resampling")]
    StillResampling,

    #[error("already flushing")]
    AlreadyFlushing,

    #[error("still flushing")]
    StillFlushing,

    #[error("already closing")]
    AlreadyClosing,

    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("engine output exceeded allocated capacity of {capacity} frames")]
    OutputOverflow { capacity: usize },

    #[error("engine failed: {reason}")]
    Engine { reason: String },

    #[error("engine made no progress with input and output room left")]
    EngineStalled,

    #[error("no operation in flight")]
    NothingPending,

    #[error("worker exited without delivering a result")]
    WorkerLost,

    #[error("no tokio runtime available to run conversions")]
    NoRuntime,
}

impl ResampleError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    pub fn open_failed(reason: impl Into<String>) -> Self {
        Self::EngineOpenFailed {
            reason: reason.into(),
        }
    }

    /// Internal invariant violations; these are logged loudly when raised.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::OutputOverflow { .. } | Self::EngineStalled | Self::WorkerLost
        )
    }
}

pub type Result<T> = std::result::Result<T, ResampleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_guard_wording() {
        assert_eq!(ResampleError::AlreadyOpen.to_string(), "already open");
        assert_eq!(ResampleError::NotOpen.to_string(), "not open");
        assert_eq!(
            ResampleError::OutputOverflow { capacity: 8 }.to_string(),
            "engine output exceeded allocated capacity of 8 frames"
        );
    }

    #[test]
    fn only_invariant_failures_are_internal() {
        assert!(ResampleError::OutputOverflow { capacity: 1 }.is_internal());
        assert!(ResampleError::WorkerLost.is_internal());
        assert!(!ResampleError::AlreadyResampling.is_internal());
        assert!(!ResampleError::open_failed("nope").is_internal());
    }
}
