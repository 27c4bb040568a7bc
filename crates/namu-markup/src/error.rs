//! Render errors.

use crate::host::HostError;

/// Failure of a whole render call.
///
/// Markup itself never fails to render: unmatched delimiters fall back to
/// text and bad macro parameters fall back to defaults. Only the host can
/// abort a render.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// A host request failed.
    #[error("host request failed: {0}")]
    Host(#[from] HostError),
    /// The host answered a request with the wrong kind of response.
    #[error("unexpected host response to {request}")]
    UnexpectedResponse {
        /// Name of the request that got the mismatched response.
        request: &'static str,
    },
}
