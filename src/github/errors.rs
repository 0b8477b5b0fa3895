use thiserror::Error;

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("GitHub API error: {0}")]
    Api(#[from] octocrab::Error),

    #[error("GitHub GraphQL error: {message}")]
    Graphql { message: String },

    /// The API answered but not in the shape the query asked for.
    #[error("unexpected GitHub response: {message}")]
    UnexpectedResponse { message: String },

    #[error("GitHub token is not configured")]
    TokenNotConfigured,
}

impl GitHubError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        GitHubError::UnexpectedResponse {
            message: message.into(),
        }
    }
}
