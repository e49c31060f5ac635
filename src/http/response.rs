//! Relaying raw backend replies.
//!
//! JSON replies go through [`crate::proxy::UpstreamReply`]; binary ones
//! (logo images, multipart save results) keep their status, headers and
//! bytes. Hop-by-hop headers are already stripped by the upstream client.

use axum::body::Body;
use axum::response::{IntoResponse, Response};

use crate::proxy::RawReply;

impl IntoResponse for RawReply {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}
