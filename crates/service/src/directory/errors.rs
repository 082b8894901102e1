use thiserror::Error;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("directory lookup failed: {0}")]
    Repository(String),
}

impl DirectoryError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            DirectoryError::Repository(_) => 1200,
        }
    }
}

impl From<models::errors::ModelError> for DirectoryError {
    fn from(e: models::errors::ModelError) -> Self {
        DirectoryError::Repository(e.to_string())
    }
}
