use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternGraphError {
    #[error("invalid query: {0}")]
    InvalidQuery(String),
    #[error("malformed identifier: {0}")]
    MalformedIdentifier(String),
    #[error("entity not found: {0}")]
    NotFound(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("document error: {0}")]
    Document(String),
}

impl PatternGraphError {
    pub fn invalid_query<T: Into<String>>(msg: T) -> Self {
        PatternGraphError::InvalidQuery(msg.into())
    }

    pub fn malformed_identifier<T: Into<String>>(msg: T) -> Self {
        PatternGraphError::MalformedIdentifier(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        PatternGraphError::NotFound(msg.into())
    }

    pub fn invalid_input<T: Into<String>>(msg: T) -> Self {
        PatternGraphError::InvalidInput(msg.into())
    }

    pub fn document<T: Into<String>>(msg: T) -> Self {
        PatternGraphError::Document(msg.into())
    }
}
