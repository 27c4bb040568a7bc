//! Bracket macros: `[name]` and `[name(params)]`.
//!
//! A macro is looked up by lowercase name in an immutable
//! [`MacroRegistry`] built once with the renderer. Built-in macros cover
//! footnote blocks, the table of contents, votes, embeds and includes;
//! more can be registered as plugins.
//!
//! # Example
//!
//! ```
//! use namu_markup::{
//!     Macro, MacroParams, MacroRegistry, NoHost, Output, RenderError, RenderOptions,
//!     RenderPass, Renderer,
//! };
//!
//! struct Kbd;
//!
//! impl Macro for Kbd {
//!     fn name(&self) -> &str {
//!         "kbd"
//!     }
//!
//!     fn renders_params(&self) -> bool {
//!         true
//!     }
//!
//!     fn format(&self, params: &MacroParams, _pass: &mut RenderPass<'_>) -> Result<Output, RenderError> {
//!         Ok(Output::html(format!("<kbd>{}</kbd>", params.rendered(0).unwrap_or_default())))
//!     }
//! }
//!
//! let macros = MacroRegistry::builder().with_builtins().with_plugin(Kbd).build();
//! let renderer = Renderer::new().with_macros(macros);
//! let html = renderer
//!     .render("[kbd(Ctrl+C)]", &RenderOptions::default(), &NoHost)
//!     .unwrap()
//!     .html;
//!
//! assert_eq!(html, "<kbd>Ctrl+C</kbd>");
//! ```

mod footnote;
mod include;
mod misc;
mod toc;
mod video;
mod vote;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::{Output, RenderError, RenderPass};

/// A bracket macro.
pub trait Macro: Send + Sync {
    /// Name the macro is called by. Matched case-insensitively.
    fn name(&self) -> &str;

    /// Additional names.
    fn aliases(&self) -> &[&str] {
        &[]
    }

    /// Whether the macro renders in discussion threads. Disallowed macros
    /// render to nothing there.
    fn allow_thread(&self) -> bool {
        true
    }

    /// Whether every parameter is rendered inline before [`format`](Self::format)
    /// runs, making [`MacroParams::rendered`] available.
    fn renders_params(&self) -> bool {
        false
    }

    /// Produce the macro's output.
    ///
    /// # Errors
    ///
    /// Returns an error when a host request fails; the whole render fails
    /// with it.
    fn format(&self, params: &MacroParams, pass: &mut RenderPass<'_>) -> Result<Output, RenderError>;
}

/// Parameters of a macro call.
///
/// The parameter text is split on commas outside brackets, parentheses and
/// braces. `\,` is a literal comma. Items are trimmed.
///
/// # Example
///
/// ```
/// use namu_markup::MacroParams;
///
/// let params = MacroParams::parse("Doc, a=[[x, y]], b=1\\,5");
/// assert_eq!(params.len(), 3);
/// assert_eq!(params.positional(0), Some("Doc"));
/// assert_eq!(params.named("a"), Some("[[x, y]]"));
/// assert_eq!(params.named("b"), Some("1,5"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MacroParams {
    raw: String,
    items: Vec<String>,
    rendered: Vec<String>,
}

impl MacroParams {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut params = Self {
            raw: raw.to_owned(),
            ..Self::default()
        };
        if raw.trim().is_empty() {
            return params;
        }

        let mut depth = 0usize;
        let mut current = String::new();
        let mut chars = raw.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '\\' if chars.peek() == Some(&',') => {
                    current.push(',');
                    chars.next();
                }
                '\\' => {
                    current.push(c);
                    if let Some(escaped) = chars.next() {
                        current.push(escaped);
                    }
                }
                '[' | '(' | '{' => {
                    depth += 1;
                    current.push(c);
                }
                ']' | ')' | '}' => {
                    depth = depth.saturating_sub(1);
                    current.push(c);
                }
                ',' if depth == 0 => {
                    params.items.push(current.trim().to_owned());
                    current.clear();
                }
                _ => current.push(c),
            }
        }
        params.items.push(current.trim().to_owned());
        params
    }

    /// Parameter text as written.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn items(&self) -> &[String] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The `index`-th parameter that is not a `key=value` pair.
    #[must_use]
    pub fn positional(&self, index: usize) -> Option<&str> {
        self.items
            .iter()
            .filter(|item| split_named(item).is_none())
            .nth(index)
            .map(String::as_str)
    }

    /// Value of the `key=value` parameter named `key`. The first one wins.
    #[must_use]
    pub fn named(&self, key: &str) -> Option<&str> {
        self.named_pairs()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, value)| value)
    }

    /// Every `key=value` parameter in order.
    pub fn named_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.items.iter().filter_map(|item| split_named(item))
    }

    /// Render every parameter inline.
    ///
    /// # Errors
    ///
    /// Returns an error when a host request made while rendering fails.
    pub fn render_with(&mut self, pass: &mut RenderPass<'_>) -> Result<(), RenderError> {
        self.rendered = self
            .items
            .iter()
            .map(|item| pass.render_inline(item))
            .collect::<Result<_, _>>()?;
        Ok(())
    }

    /// HTML of the `index`-th parameter, for macros that
    /// [render their parameters](Macro::renders_params).
    #[must_use]
    pub fn rendered(&self, index: usize) -> Option<&str> {
        self.rendered.get(index).map(String::as_str)
    }
}

/// `key=value` with a plain identifier key.
fn split_named(item: &str) -> Option<(&str, &str)> {
    let (key, value) = item.split_once('=')?;
    let key = key.trim();
    let plain = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-');
    plain.then_some((key, value.trim()))
}

/// Macros by lowercase name and alias.
///
/// Built once and shared read-only by every render.
#[derive(Clone, Default)]
pub struct MacroRegistry {
    macros: HashMap<String, Arc<dyn Macro>>,
}

impl MacroRegistry {
    #[must_use]
    pub fn builder() -> MacroRegistryBuilder {
        MacroRegistryBuilder::default()
    }

    /// Look up a macro by name or alias, ignoring case.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn Macro> {
        self.macros.get(&name.to_lowercase()).map(AsRef::as_ref)
    }

    /// Registered names and aliases, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.macros.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.macros.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }
}

impl fmt::Debug for MacroRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MacroRegistry")
            .field("names", &self.names())
            .finish()
    }
}

/// Builder for [`MacroRegistry`]. A later registration of a name replaces
/// the earlier one.
#[derive(Default)]
pub struct MacroRegistryBuilder {
    macros: HashMap<String, Arc<dyn Macro>>,
}

impl MacroRegistryBuilder {
    /// Register the built-in macros.
    #[must_use]
    pub fn with_builtins(self) -> Self {
        self.with_plugin(misc::LineBreak)
            .with_plugin(misc::Clearfix)
            .with_plugin(misc::Anchor)
            .with_plugin(misc::PageCount)
            .with_plugin(footnote::FootnoteList)
            .with_plugin(toc::TableOfContents)
            .with_plugin(vote::Vote)
            .with_plugin(video::NicoVideo)
            .with_plugin(video::YouTube)
            .with_plugin(include::Include)
    }

    /// Register a macro under its name and aliases.
    #[must_use]
    pub fn with_plugin<M: Macro + 'static>(mut self, handler: M) -> Self {
        let handler: Arc<dyn Macro> = Arc::new(handler);
        let names = std::iter::once(handler.name()).chain(handler.aliases().iter().copied());
        for name in names.map(str::to_lowercase).collect::<Vec<_>>() {
            self.macros.insert(name, Arc::clone(&handler));
        }
        self
    }

    #[must_use]
    pub fn build(self) -> MacroRegistry {
        MacroRegistry {
            macros: self.macros,
        }
    }
}
