//! `namu render` command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use namu_config::{CliSettings, Config};
use namu_markup::{RenderOptions, Renderer, RendererConfig};

use crate::error::CliError;
use crate::host::FsHost;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Markup file to render.
    file: PathBuf,

    /// Path to configuration file (default: auto-discover namu.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Documents directory used for includes and page counts (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Path internal links are resolved under (overrides config).
    #[arg(long)]
    document_path: Option<String>,

    /// Maximum include nesting (overrides config).
    #[arg(long)]
    max_include_depth: Option<usize>,

    /// Render as a discussion thread comment.
    #[arg(long)]
    thread: bool,

    /// Prefix for generated element ids.
    #[arg(long, default_value = "")]
    comment_prefix: String,

    /// Document title (default: derived from the file name).
    #[arg(long)]
    title: Option<String>,

    /// Print the full render result as JSON instead of bare HTML.
    #[arg(long)]
    json: bool,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, the file cannot be read or
    /// a host request fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            source_dir: self.source_dir,
            document_path: self.document_path,
            max_include_depth: self.max_include_depth,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let source = std::fs::read_to_string(&self.file)?;
        let title = self
            .title
            .unwrap_or_else(|| document_title(&self.file, &config.documents_resolved.source_dir));

        let renderer = Renderer::with_config(
            RendererConfig::default()
                .with_document_path(config.site.document_path.clone())
                .with_max_include_depth(config.render.max_include_depth),
        );
        let options = RenderOptions {
            is_thread: self.thread,
            comment_prefix: self.comment_prefix,
            document_title: Some(title.clone()),
        };
        let host = FsHost::new(&config.documents_resolved);

        tracing::info!(title = %title, site = %config.site.name, "Rendering document");
        let rendered = renderer.render(&source, &options, &host)?;

        if let Some(target) = &rendered.redirect_target {
            output.warning(&format!("{title} redirects to {target}"));
        }

        if self.json {
            output.result(&serde_json::to_string_pretty(&rendered)?)?;
        } else {
            output.result(&rendered.html)?;
        }
        Ok(())
    }
}

/// Title of a document file: its path under `source_dir` without the
/// extension, or just the file stem for files elsewhere.
fn document_title(file: &Path, source_dir: &Path) -> String {
    let absolute = std::fs::canonicalize(file).unwrap_or_else(|_| file.to_path_buf());
    let root = std::fs::canonicalize(source_dir).unwrap_or_else(|_| source_dir.to_path_buf());

    match absolute.strip_prefix(&root) {
        Ok(relative) => relative
            .with_extension("")
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => file
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default(),
    }
}
