//! NamuMark to HTML compiler.
//!
//! A [`Renderer`] owns an ordered set of [`SyntaxRule`]s and an immutable
//! [`MacroRegistry`]. Each call to [`Renderer::render`] walks the source
//! once, trying the rules at every position, and collects footnotes,
//! headings and the redirect target in a fresh [`RenderContext`].
//!
//! # Architecture
//!
//! - Rules are tried in [`Priority`] order. Literal rules (`{{{...}}}`)
//!   claim their content before anything else; `Last` rules run once over
//!   the finished HTML.
//! - Block constructs (headings, tables, lists, quotes) only match at line
//!   starts and never inside inline spans.
//! - Deferred output (footnote blocks, the table of contents) is emitted as
//!   placeholders and filled in after the pass.
//! - Everything the renderer cannot know by itself goes through the
//!   [`Host`]: document lookups, counts, vote tallies and translations. A
//!   host failure fails the whole render.
//!
//! # Example
//!
//! ```
//! use namu_markup::{HostError, HostRequest, HostResponse, RenderOptions, Renderer};
//!
//! let host = |request: HostRequest| match request {
//!     HostRequest::CountDocuments { .. } => Ok(HostResponse::Count(42)),
//!     _ => Err(HostError::new("unsupported")),
//! };
//!
//! let rendered = Renderer::new()
//!     .render("== Stats ==\n[pagecount] documents", &RenderOptions::default(), &host)
//!     .unwrap();
//!
//! assert!(rendered.html.ends_with("42 documents"));
//! assert_eq!(rendered.headings[0].text, "Stats");
//! ```

mod context;
mod engine;
mod error;
mod host;
mod macros;
mod output;
mod renderer;
mod replacements;
mod rule;
mod rules;

pub use context::{Footnote, Heading, RenderContext};
pub use engine::RenderPass;
pub use error::RenderError;
pub use host::{Host, HostError, HostRequest, HostResponse, NoHost, VoteTally};
pub use macros::{Macro, MacroParams, MacroRegistry, MacroRegistryBuilder};
pub use output::Output;
pub use renderer::{RenderOptions, Rendered, Renderer, RendererConfig};
pub use replacements::Replacements;
pub use rule::{Delimiters, Matched, Priority, RuleShape, SyntaxRule};
