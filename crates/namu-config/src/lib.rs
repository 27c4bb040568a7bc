//! Configuration management for namu.
//!
//! Parses `namu.toml` with serde and discovers it in the current directory
//! or its parents. CLI settings are applied during load via [`CliSettings`].
//!
//! ```toml
//! [site]
//! name = "My Wiki"
//! document_path = "/w/"
//!
//! [render]
//! max_include_depth = 1
//!
//! [documents]
//! source_dir = "documents"
//! extension = "txt"
//! ```
//!
//! ## Environment Variable Expansion
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `site.name`
//! - `site.document_path`
//! - `documents.source_dir`

mod expand;

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "namu.toml";

/// Deepest include nesting a config file may ask for.
const MAX_INCLUDE_DEPTH: usize = 16;

/// CLI settings that override configuration file values.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the documents directory.
    pub source_dir: Option<PathBuf>,
    /// Override the internal link path.
    pub document_path: Option<String>,
    /// Override the include depth limit.
    pub max_include_depth: Option<usize>,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub render: RenderConfig,
    /// Documents section as written (paths relative to the config file).
    documents: DocumentsConfigRaw,

    /// Resolved documents configuration (set after loading).
    #[serde(skip)]
    pub documents_resolved: DocumentsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Site identity.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Wiki name, shown in command output.
    pub name: String,
    /// Path internal links are resolved under. Starts and ends with `/`.
    pub document_path: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "namu".to_owned(),
            document_path: "/w/".to_owned(),
        }
    }
}

/// Renderer limits.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// How many documents deep `[include(...)]` may nest.
    pub max_include_depth: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_include_depth: 1,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DocumentsConfigRaw {
    source_dir: Option<String>,
    extension: Option<String>,
}

/// Where documents live on disk.
#[derive(Debug, Default)]
pub struct DocumentsConfig {
    /// Directory holding one file per document.
    pub source_dir: PathBuf,
    /// File extension of document files, without the dot.
    pub extension: String,
}

impl DocumentsConfig {
    /// File holding the document titled `title`. Subdocument titles
    /// (`A/B`) map to subdirectories.
    #[must_use]
    pub fn document_file(&self, title: &str) -> PathBuf {
        self.source_dir.join(format!("{title}.{}", self.extension))
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`site.document_path`").
        field: String,
        /// Error message (e.g., "${`DOC_PATH`} not set").
        message: String,
    },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise,
    /// searches for `namu.toml` in the current directory and its parents,
    /// falling back to defaults.
    ///
    /// CLI settings are applied last and take precedence over the file.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing or
    /// validation fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = std::env::current_dir()
            .ok()
            .and_then(|cwd| Self::discover_config(&cwd))
        {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(source_dir) = &settings.source_dir {
            self.documents_resolved.source_dir.clone_from(source_dir);
        }
        if let Some(document_path) = &settings.document_path {
            self.site.document_path.clone_from(document_path);
        }
        if let Some(depth) = settings.max_include_depth {
            self.render.max_include_depth = depth;
        }
    }

    /// Search for the config file in `start` and its parents.
    fn discover_config(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    fn default_with_base(base: &Path) -> Self {
        Self {
            site: SiteConfig::default(),
            render: RenderConfig::default(),
            documents: DocumentsConfigRaw::default(),
            documents_resolved: DocumentsConfig {
                source_dir: base.join("documents"),
                extension: "txt".to_owned(),
            },
            config_path: None,
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` naming the first invalid field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.site.name, "site.name")?;

        let path = &self.site.document_path;
        require_non_empty(path, "site.document_path")?;
        if !path.starts_with('/') || !path.ends_with('/') {
            return Err(ConfigError::Validation(
                "site.document_path must start and end with /".to_owned(),
            ));
        }

        if self.render.max_include_depth > MAX_INCLUDE_DEPTH {
            return Err(ConfigError::Validation(format!(
                "render.max_include_depth cannot exceed {MAX_INCLUDE_DEPTH}"
            )));
        }

        let extension = &self.documents_resolved.extension;
        require_non_empty(extension, "documents.extension")?;
        if extension.starts_with('.') || extension.contains(['/', '\\']) {
            return Err(ConfigError::Validation(
                "documents.extension must be a bare extension such as \"txt\"".to_owned(),
            ));
        }

        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.site.name = expand::expand_env(&self.site.name, "site.name")?;
        self.site.document_path =
            expand::expand_env(&self.site.document_path, "site.document_path")?;
        if let Some(ref source_dir) = self.documents.source_dir {
            self.documents.source_dir =
                Some(expand::expand_env(source_dir, "documents.source_dir")?);
        }
        Ok(())
    }

    /// Resolve relative paths against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.documents_resolved = DocumentsConfig {
            source_dir: config_dir.join(self.documents.source_dir.as_deref().unwrap_or("documents")),
            extension: self
                .documents
                .extension
                .clone()
                .unwrap_or_else(|| "txt".to_owned()),
        };
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/wiki"));
        assert_eq!(config.site.name, "namu");
        assert_eq!(config.site.document_path, "/w/");
        assert_eq!(config.render.max_include_depth, 1);
        assert_eq!(
            config.documents_resolved.source_dir,
            PathBuf::from("/wiki/documents")
        );
        assert_eq!(config.documents_resolved.extension, "txt");
        config.validate().unwrap();
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.site.document_path, "/w/");
        assert_eq!(config.render.max_include_depth, 1);
    }

    #[test]
    fn test_resolve_paths() {
        let toml = r#"
[documents]
source_dir = "pages"
extension = "namu"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));
        assert_eq!(
            config.documents_resolved.source_dir,
            PathBuf::from("/project/pages")
        );
        assert_eq!(
            config.documents_resolved.document_file("A/B"),
            PathBuf::from("/project/pages/A/B.namu")
        );
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        fs::write(
            &path,
            r#"
[site]
name = "Test Wiki"
document_path = "/wiki/"

[render]
max_include_depth = 3
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(config.site.name, "Test Wiki");
        assert_eq!(config.site.document_path, "/wiki/");
        assert_eq!(config.render.max_include_depth, 3);
        assert_eq!(config.documents_resolved.source_dir, dir.path().join("documents"));
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_missing_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        fs::write(&path, "[site\nname = 1").unwrap();
        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_discover_in_parent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "").unwrap();

        assert_eq!(
            Config::discover_config(&nested),
            Some(dir.path().join(CONFIG_FILENAME))
        );
    }

    #[test]
    fn test_document_path_validation() {
        let mut config = Config::default_with_base(Path::new("/wiki"));
        config.site.document_path = "w".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("site.document_path"));
    }

    #[test]
    fn test_include_depth_validation() {
        let mut config = Config::default_with_base(Path::new("/wiki"));
        config.render.max_include_depth = 100;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_extension_validation() {
        let mut config = Config::default_with_base(Path::new("/wiki"));
        config.documents_resolved.extension = ".txt".to_owned();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_expansion_in_file() {
        // SAFETY: the variable name is unique to this test
        unsafe {
            std::env::set_var("NAMU_TEST_DOCS_DIR", "from-env");
        }
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        fs::write(&path, "[documents]\nsource_dir = \"${NAMU_TEST_DOCS_DIR}\"\n").unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(config.documents_resolved.source_dir, dir.path().join("from-env"));
        unsafe {
            std::env::remove_var("NAMU_TEST_DOCS_DIR");
        }
    }

    #[test]
    fn test_cli_settings_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        fs::write(&path, "[render]\nmax_include_depth = 2\n").unwrap();

        let settings = CliSettings {
            source_dir: Some(PathBuf::from("/elsewhere")),
            max_include_depth: Some(4),
            ..Default::default()
        };
        let config = Config::load(Some(&path), Some(&settings)).unwrap();
        assert_eq!(config.documents_resolved.source_dir, PathBuf::from("/elsewhere"));
        assert_eq!(config.render.max_include_depth, 4);
        assert_eq!(config.site.document_path, "/w/");
    }

    #[test]
    fn test_invalid_cli_override_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        fs::write(&path, "").unwrap();

        let settings = CliSettings {
            document_path: Some("nope".to_owned()),
            ..Default::default()
        };
        assert!(Config::load(Some(&path), Some(&settings)).is_err());
    }
}
