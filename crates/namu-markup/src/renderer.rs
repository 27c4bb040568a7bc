//! Renderer configuration and entry point.

use crate::context::footnote_placeholder;
use crate::rule::{Matched, Priority};
use crate::{
    Heading, Host, MacroRegistry, Output, RenderContext, RenderError, RenderPass, SyntaxRule, rules,
};

/// Site-wide renderer settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RendererConfig {
    /// Path internal links are resolved under.
    ///
    /// Default: `/w/`
    pub document_path: String,
    /// How many documents deep `[include(...)]` may nest.
    ///
    /// Default: 1
    pub max_include_depth: usize,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            document_path: "/w/".to_owned(),
            max_include_depth: 1,
        }
    }
}

impl RendererConfig {
    /// Set the document path.
    #[must_use]
    pub fn with_document_path(mut self, path: impl Into<String>) -> Self {
        self.document_path = path.into();
        self
    }

    /// Set the maximum include depth.
    #[must_use]
    pub fn with_max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = depth;
        self
    }
}

/// Per-call render flags.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Rendering a discussion thread comment rather than a document.
    pub is_thread: bool,
    /// Prefix for generated element ids, keeping comments on one page apart.
    pub comment_prefix: String,
    /// Title of the document being rendered, if known.
    pub document_title: Option<String>,
}

/// Result of a render call.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rendered {
    pub html: String,
    /// Target of a `#redirect` document.
    pub redirect_target: Option<String>,
    /// Headings in document order, for callers that show the outline
    /// outside the rendered document.
    pub headings: Vec<Heading>,
}

/// NamuMark renderer.
///
/// Immutable once built and shareable across threads; every
/// [`render`](Self::render) call owns its state.
///
/// # Example
///
/// ```
/// use namu_markup::{NoHost, RenderOptions, Renderer};
///
/// let renderer = Renderer::new();
/// let rendered = renderer
///     .render("'''bold''' and [[Front Page|home]]", &RenderOptions::default(), &NoHost)
///     .unwrap();
///
/// assert_eq!(
///     rendered.html,
///     "<strong>bold</strong> and <a class=\"wiki-link-internal\" href=\"/w/Front%20Page\">home</a>"
/// );
/// ```
pub struct Renderer {
    config: RendererConfig,
    rules: Vec<Box<dyn SyntaxRule>>,
    macros: MacroRegistry,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    /// Renderer with the built-in rules and macros and default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RendererConfig::default())
    }

    /// Renderer with the built-in rules and macros.
    #[must_use]
    pub fn with_config(config: RendererConfig) -> Self {
        Self {
            config,
            rules: rules::builtin(),
            macros: MacroRegistry::builder().with_builtins().build(),
        }
    }

    /// Register an additional rule after the existing rules of its priority.
    #[must_use]
    pub fn with_rule<R: SyntaxRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self.rules.sort_by_key(|rule| rule.priority());
        self
    }

    /// Replace the macro registry.
    #[must_use]
    pub fn with_macros(mut self, macros: MacroRegistry) -> Self {
        self.macros = macros;
        self
    }

    #[must_use]
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    #[must_use]
    pub fn macros(&self) -> &MacroRegistry {
        &self.macros
    }

    pub(crate) fn rules(&self) -> &[Box<dyn SyntaxRule>] {
        &self.rules
    }

    /// Render `source` to HTML.
    ///
    /// # Errors
    ///
    /// Returns an error when a host request fails. Markup problems never
    /// fail a render.
    pub fn render(
        &self,
        source: &str,
        options: &RenderOptions,
        host: &dyn Host,
    ) -> Result<Rendered, RenderError> {
        let source = normalize_source(source);

        let mut pass = RenderPass::new(self, host, RenderContext::new(options));
        let mut html = pass.render_block(&source)?;

        if let Some(block) = pass.context_mut().take_footnote_block() {
            html.push_str(&footnote_placeholder(block));
        }

        for rule in self.rules.iter().filter(|rule| rule.priority() == Priority::Last) {
            let matched = Matched {
                raw: &html,
                sole_line: false,
            };
            match rule.format(&matched, &mut pass)? {
                Output::Html(processed) => html = processed,
                Output::Markup(_) => {
                    tracing::debug!(rule = rule.name(), "Ignoring markup output of a post-processing rule");
                }
                Output::Skip => {}
            }
        }

        let context = pass.into_context();
        Ok(Rendered {
            html,
            redirect_target: context.redirect_target,
            headings: context.headings,
        })
    }
}

/// Unify line endings and drop the private-use characters that delimit
/// placeholders.
pub(crate) fn normalize_source(source: &str) -> String {
    source.replace("\r\n", "\n").replace(['\u{E000}', '\u{E001}'], "")
}
