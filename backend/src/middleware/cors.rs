//! Cross-origin access for browser clients.
//!
//! [`CorsPolicy`] is plain configuration; [`CorsPolicy::build`] turns it into
//! the `actix-cors` middleware once per worker. Preflights answer for the
//! methods and headers the API uses and expose the `trace-id` header so a
//! browser can report it.

use actix_cors::Cors;
use actix_web::http::header;

use crate::domain::TRACE_ID_HEADER;

const ALLOWED_METHODS: [&str; 6] = ["GET", "HEAD", "POST", "PUT", "PATCH", "DELETE"];
const PREFLIGHT_MAX_AGE_SECS: usize = 3600;

/// Which browser origins may call the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsPolicy {
    origins: Vec<String>,
}

impl CorsPolicy {
    /// Accept any origin. The response echoes the caller's origin.
    pub fn any_origin() -> Self {
        Self {
            origins: Vec::new(),
        }
    }

    /// Accept only the listed origins, e.g. `https://gifts.example`.
    /// An empty list behaves as [`CorsPolicy::any_origin`].
    pub fn allow_list(origins: Vec<String>) -> Self {
        Self { origins }
    }

    pub fn origins(&self) -> &[String] {
        &self.origins
    }

    /// Middleware for one app instance.
    pub fn build(&self) -> Cors {
        let cors = if self.origins.is_empty() {
            Cors::default().allow_any_origin()
        } else {
            self.origins
                .iter()
                .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        };
        cors.allowed_methods(ALLOWED_METHODS)
            .allowed_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .expose_headers([TRACE_ID_HEADER])
            .max_age(PREFLIGHT_MAX_AGE_SECS)
    }
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self::any_origin()
    }
}
