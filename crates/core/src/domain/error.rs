// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("{0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
