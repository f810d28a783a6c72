//! Page placeholders
//!
//! The dashboard UI is rendered elsewhere; these routes exist so the gate has
//! something to protect and deny targets resolve.

use axum::response::Html;

pub async fn home() -> Html<&'static str> {
    Html("<!doctype html><title>Jobs</title><h1>Background jobs</h1>")
}

/// GET /jobs (protected)
pub async fn jobs() -> Html<&'static str> {
    Html("<!doctype html><title>Jobs</title><div id=\"jobs\"></div>")
}

/// GET /newJob (protected)
pub async fn new_job() -> Html<&'static str> {
    Html("<!doctype html><title>New job</title><div id=\"new-job\"></div>")
}

/// GET /loginRequired
pub async fn login_required() -> Html<&'static str> {
    Html("<!doctype html><title>Login required</title><h1>You must login before you can access this feature.</h1>")
}
