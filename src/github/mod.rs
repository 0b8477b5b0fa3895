pub mod client;
pub mod errors;
pub mod gateway;
pub mod queries;

pub use errors::GitHubError;
pub use gateway::{BoardGateway, OctocrabGateway};
