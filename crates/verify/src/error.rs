use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("verification cancelled")]
    Cancelled,
    #[error("could not start verifier '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("verifier timed out after {}s", .0.as_secs_f32())]
    Timeout(Duration),
    #[error("verifier I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("verification task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
