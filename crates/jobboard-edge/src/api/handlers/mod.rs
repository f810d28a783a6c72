//! API handlers

pub mod pages;
pub mod session;

pub use pages::{home, jobs, login_required, new_job};
pub use session::{get_session, mock_callback, sign_out, AppState};
