use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransferError {
    /// The control plane rejected or never received the transfer request.
    #[error("transfer submission failed: {0}")]
    Submission(String),

    #[error("invalid control plane configuration: {0}")]
    Config(String),

    /// The call-scoped client was already released at teardown.
    #[error("transfer client is closed")]
    Closed,
}
