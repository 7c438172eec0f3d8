use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Session provider failed: {0}")]
    Provider(String),

    #[error("Not authenticated")]
    NotAuthenticated,
}

pub type Result<T> = std::result::Result<T, AuthError>;
