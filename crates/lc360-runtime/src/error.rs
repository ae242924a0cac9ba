use tokio::task::JoinError;

/// Errors from starting or joining the tick loop.
#[derive(Debug)]
pub enum TickerError {
    /// `start` was called outside a tokio runtime.
    NoRuntime,
    /// The tick task panicked.
    Join(JoinError),
}

impl From<JoinError> for TickerError {
    fn from(e: JoinError) -> Self {
        TickerError::Join(e)
    }
}

impl std::fmt::Display for TickerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TickerError::NoRuntime => write!(f, "Tick loop needs a running tokio runtime"),
            TickerError::Join(e) => write!(f, "Tick loop failed: {}", e),
        }
    }
}

impl std::error::Error for TickerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TickerError::Join(e) => Some(e),
            TickerError::NoRuntime => None,
        }
    }
}
