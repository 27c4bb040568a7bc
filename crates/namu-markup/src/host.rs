//! Host services reachable from macros.
//!
//! The renderer performs no I/O. Everything that needs the outside world
//! (document counts, included documents, translated labels, vote tallies)
//! goes through a single [`Host`] implementation supplied per render call,
//! as a closed set of [`HostRequest`]s answered by [`HostResponse`]s.

use crate::RenderError;

/// A request from a macro to the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostRequest {
    /// Number of documents, optionally restricted to a namespace.
    CountDocuments {
        /// Namespace to count in; `None` counts everything.
        namespace: Option<String>,
    },
    /// Current content of a document.
    FindDocument {
        /// Full document title.
        title: String,
    },
    /// Translated UI label.
    Translate {
        /// Translation key.
        key: String,
    },
    /// Tallies of the vote at `index` and the viewer's prior choice.
    VoteStatus {
        /// Vote index in source order within the render.
        index: usize,
        /// Number of options the vote offers.
        options: usize,
    },
}

impl HostRequest {
    fn name(&self) -> &'static str {
        match self {
            Self::CountDocuments { .. } => "CountDocuments",
            Self::FindDocument { .. } => "FindDocument",
            Self::Translate { .. } => "Translate",
            Self::VoteStatus { .. } => "VoteStatus",
        }
    }
}

/// The host's answer to a [`HostRequest`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostResponse {
    /// Answer to [`HostRequest::CountDocuments`].
    Count(u64),
    /// Answer to [`HostRequest::FindDocument`]; `None` when missing.
    Document(Option<String>),
    /// Answer to [`HostRequest::Translate`].
    Text(String),
    /// Answer to [`HostRequest::VoteStatus`].
    Vote(VoteTally),
}

/// Persisted state of one vote.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VoteTally {
    /// Votes per option, in option order. Missing entries count as zero.
    pub counts: Vec<u64>,
    /// Option the viewer picked earlier, if any.
    pub selected: Option<usize>,
}

/// Error reported by a host.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct HostError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl HostError {
    /// Create an error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Attach the underlying error.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

/// Services the renderer needs from its embedder.
///
/// Closures with the right signature implement this trait, which keeps
/// tests short:
///
/// ```
/// use namu_markup::{HostError, HostRequest, HostResponse, RenderOptions, Renderer};
///
/// let host = |request: HostRequest| match request {
///     HostRequest::CountDocuments { .. } => Ok(HostResponse::Count(42)),
///     _ => Err(HostError::new("not available")),
/// };
///
/// let rendered = Renderer::new()
///     .render("[pagecount]", &RenderOptions::default(), &host)
///     .unwrap();
/// assert_eq!(rendered.html, "42");
/// ```
pub trait Host: Sync {
    /// Answer one request.
    ///
    /// # Errors
    ///
    /// Any error aborts the render call that issued the request.
    fn call(&self, request: HostRequest) -> Result<HostResponse, HostError>;
}

impl<F> Host for F
where
    F: Fn(HostRequest) -> Result<HostResponse, HostError> + Sync,
{
    fn call(&self, request: HostRequest) -> Result<HostResponse, HostError> {
        self(request)
    }
}

/// Host without any services: every request fails.
///
/// Enough for markup that uses no host-backed macros.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoHost;

impl Host for NoHost {
    fn call(&self, request: HostRequest) -> Result<HostResponse, HostError> {
        Err(HostError::new(format!("{} is not available", request.name())))
    }
}

fn request(host: &dyn Host, request: HostRequest) -> Result<HostResponse, RenderError> {
    let name = request.name();
    host.call(request).map_err(|e| {
        tracing::warn!(request = name, error = %e, "Host request failed");
        RenderError::Host(e)
    })
}

pub(crate) fn count_documents(host: &dyn Host, namespace: Option<&str>) -> Result<u64, RenderError> {
    let namespace = namespace.map(str::to_owned);
    match request(host, HostRequest::CountDocuments { namespace })? {
        HostResponse::Count(count) => Ok(count),
        _ => Err(RenderError::UnexpectedResponse {
            request: "CountDocuments",
        }),
    }
}

pub(crate) fn find_document(host: &dyn Host, title: &str) -> Result<Option<String>, RenderError> {
    let title = title.to_owned();
    match request(host, HostRequest::FindDocument { title })? {
        HostResponse::Document(content) => Ok(content),
        _ => Err(RenderError::UnexpectedResponse {
            request: "FindDocument",
        }),
    }
}

pub(crate) fn translate(host: &dyn Host, key: &str) -> Result<String, RenderError> {
    let key = key.to_owned();
    match request(host, HostRequest::Translate { key })? {
        HostResponse::Text(text) => Ok(text),
        _ => Err(RenderError::UnexpectedResponse {
            request: "Translate",
        }),
    }
}

pub(crate) fn vote_status(
    host: &dyn Host,
    index: usize,
    options: usize,
) -> Result<VoteTally, RenderError> {
    match request(host, HostRequest::VoteStatus { index, options })? {
        HostResponse::Vote(tally) => Ok(tally),
        _ => Err(RenderError::UnexpectedResponse {
            request: "VoteStatus",
        }),
    }
}
