use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Runtime initialization failed: {0}")]
    InitializationFailed(String),
}

pub type Result<T> = std::result::Result<T, Error>;
