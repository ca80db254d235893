use thiserror::Error;

/// Errors raised while setting up the server or client
#[derive(Debug, Error)]
pub enum Error {
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  /// Configuration file could not be read or parsed
  #[error("config '{path}': {message}")]
  Config { path: String, message: String },

  #[error("transport error: {0}")]
  Transport(#[from] tonic::transport::Error),

  #[error("invalid endpoint '{0}'")]
  InvalidEndpoint(String),

  #[error("invalid authorization token")]
  InvalidToken,
}

pub type Result<T> = std::result::Result<T, Error>;
