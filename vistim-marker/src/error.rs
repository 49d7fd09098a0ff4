use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarkerError {
    #[error("cannot open marker device {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("marker line write failed: {0}")]
    Write(#[from] std::io::Error),
}
