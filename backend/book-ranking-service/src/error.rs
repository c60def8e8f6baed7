use thiserror::Error;

#[derive(Debug, Error)]
pub enum RankingError {
    /// Request cannot be served as given (no resolvable selection, unknown intent).
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Book repository error: {0}")]
    Repository(#[source] anyhow::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl RankingError {
    pub fn is_validation(&self) -> bool {
        matches!(self, RankingError::Validation(_))
    }
}

impl From<envy::Error> for RankingError {
    fn from(err: envy::Error) -> Self {
        RankingError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RankingError>;
