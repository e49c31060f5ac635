//! What the caller sees when the backend fails.
//!
//! | policy  | backend 5xx / unreachable                                     |
//! |---------|---------------------------------------------------------------|
//! | `Read`  | 200 `{success:true, data:[], count:0}`                         |
//! | `Write` | 503 `{success:false, message:"Backend service is not available"}` |
//! | `Relay` | 5xx relayed as is; unreachable becomes a 502 error             |

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use crate::error::ConsoleError;
use crate::observability::metrics;
use crate::proxy::upstream::UpstreamReply;

pub const UNAVAILABLE_MESSAGE: &str = "Backend service is not available";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// List reads: pretend the list is empty.
    Read,
    /// Writes: report the backend as unavailable.
    Write,
    /// No substitution.
    Relay,
}

impl Fallback {
    fn label(self) -> &'static str {
        match self {
            Fallback::Read => "read",
            Fallback::Write => "write",
            Fallback::Relay => "relay",
        }
    }

    /// Settle a backend result into the reply relayed to the caller.
    pub fn settle(
        self,
        route: &str,
        result: Result<UpstreamReply, ConsoleError>,
    ) -> Result<UpstreamReply, ConsoleError> {
        let failed = match &result {
            Ok(reply) => reply.status.is_server_error(),
            Err(ConsoleError::Upstream(_)) => true,
            Err(_) => false,
        };
        if !failed || self == Fallback::Relay {
            return result;
        }

        tracing::warn!(route, policy = self.label(), "Backend not available, substituting reply");
        metrics::record_fallback(self.label(), route);

        Ok(match self {
            Fallback::Read => UpstreamReply {
                status: StatusCode::OK,
                body: empty_list(),
            },
            _ => UpstreamReply {
                status: StatusCode::SERVICE_UNAVAILABLE,
                body: json!({ "success": false, "message": UNAVAILABLE_MESSAGE }),
            },
        })
    }
}

/// The synthetic empty-success list body.
pub fn empty_list() -> Value {
    json!({ "success": true, "data": [], "count": 0 })
}

impl IntoResponse for UpstreamReply {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
