//! Profile handlers, one per identity provider

pub mod github;
pub mod google;
pub mod mock;

pub use github::GitHubHandler;
pub use google::GoogleHandler;
pub use mock::MockHandler;
