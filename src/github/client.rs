use super::errors::GitHubError;
use octocrab::Octocrab;

/// Build an authenticated API client for one event's worth of calls.
///
/// The token travels through the call chain from configuration to here;
/// there is deliberately no process-global token state, so processing can
/// later parallelize across events without coordination.
pub fn build_client(token: &str) -> Result<Octocrab, GitHubError> {
    Ok(Octocrab::builder()
        .personal_token(token.to_string())
        .build()?)
}
