use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaselightError {
    #[error("Source fetch error: {0}")]
    SourceFetch(String),

    #[error("Filter error: {0}")]
    Filter(String),

    #[error("Write error: {0}")]
    Write(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Sync conflict: another sync pass is in progress")]
    SyncInProgress,

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
