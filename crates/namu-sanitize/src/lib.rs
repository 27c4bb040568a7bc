//! Sanitization for rendered wiki markup.
//!
//! Two filters make up the pipeline:
//!
//! - [`sanitize_html`] / [`sanitize_html_block`]: tag and attribute
//!   allow-list for raw HTML spans
//! - [`filter_declarations`] / [`filter_stylesheet`]: CSS rule filter for
//!   `style` attributes and style sheets
//!
//! All functions are pure and never fail: input that cannot be understood
//! is reduced, not reported.

mod css;
mod html;

pub use css::{Scope, filter_declarations, filter_stylesheet};
pub use html::{HtmlPolicy, escape_html, sanitize_html, sanitize_html_block};
