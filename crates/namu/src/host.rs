//! Host services backed by a directory of document files.

use std::fs;
use std::io;
use std::path::{Component, Path};

use namu_config::DocumentsConfig;
use namu_markup::{Host, HostError, HostRequest, HostResponse, VoteTally};

/// Serves documents from `source_dir`, one `<title>.<extension>` file per
/// document. Votes have no storage here and always report zero counts.
pub(crate) struct FsHost<'a> {
    documents: &'a DocumentsConfig,
}

impl<'a> FsHost<'a> {
    pub(crate) fn new(documents: &'a DocumentsConfig) -> Self {
        Self { documents }
    }

    fn find_document(&self, title: &str) -> Result<Option<String>, HostError> {
        let escapes = Path::new(title)
            .components()
            .any(|component| !matches!(component, Component::Normal(_)));
        if title.is_empty() || escapes {
            return Ok(None);
        }

        let path = self.documents.document_file(title);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(HostError::new(format!("cannot read {}", path.display())).with_source(e)),
        }
    }

    /// Titles of every document, as paths relative to `source_dir`.
    fn titles(&self) -> Vec<String> {
        let mut titles = Vec::new();
        self.collect_titles(&self.documents.source_dir, "", &mut titles);
        titles
    }

    fn collect_titles(&self, dir: &Path, prefix: &str, titles: &mut Vec<String>) {
        let Ok(entries) = fs::read_dir(dir) else {
            return;
        };
        for entry in entries.filter_map(Result::ok) {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            let path = entry.path();
            let title = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{prefix}/{name}")
            };
            if entry.file_type().is_ok_and(|t| t.is_dir()) {
                self.collect_titles(&path, &title, titles);
            } else if path.extension().is_some_and(|e| e == self.documents.extension.as_str())
                && let Some(stem) = title.strip_suffix(&format!(".{}", self.documents.extension))
            {
                titles.push(stem.to_owned());
            }
        }
    }
}

impl Host for FsHost<'_> {
    fn call(&self, request: HostRequest) -> Result<HostResponse, HostError> {
        match request {
            HostRequest::CountDocuments { namespace } => {
                let titles = self.titles();
                let count = match namespace {
                    Some(namespace) => {
                        let prefix = format!("{namespace}:");
                        titles.iter().filter(|title| title.starts_with(&prefix)).count()
                    }
                    None => titles.len(),
                };
                Ok(HostResponse::Count(u64::try_from(count).unwrap_or(u64::MAX)))
            }
            HostRequest::FindDocument { title } => Ok(HostResponse::Document(self.find_document(&title)?)),
            HostRequest::Translate { key } => Ok(HostResponse::Text(translate(&key).to_owned())),
            HostRequest::VoteStatus { options, .. } => Ok(HostResponse::Vote(VoteTally {
                counts: vec![0; options],
                selected: None,
            })),
        }
    }
}

fn translate(key: &str) -> &str {
    match key {
        "toc" => "Contents",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn documents(dir: &Path) -> DocumentsConfig {
        DocumentsConfig {
            source_dir: dir.to_path_buf(),
            extension: "txt".to_owned(),
        }
    }

    fn write(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_find_document() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "Front.txt", "hello");
        write(dir.path(), "A/B.txt", "nested");
        let documents = documents(dir.path());
        let host = FsHost::new(&documents);

        assert_eq!(host.find_document("Front").unwrap().as_deref(), Some("hello"));
        assert_eq!(host.find_document("A/B").unwrap().as_deref(), Some("nested"));
        assert_eq!(host.find_document("Missing").unwrap(), None);
    }

    #[test]
    fn test_titles_cannot_leave_source_dir() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "secret.txt", "x");
        let inner = dir.path().join("docs");
        fs::create_dir_all(&inner).unwrap();
        let documents = documents(&inner);
        let host = FsHost::new(&documents);

        assert_eq!(host.find_document("../secret").unwrap(), None);
        assert_eq!(host.find_document("/etc/passwd").unwrap(), None);
    }

    #[test]
    fn test_count_documents() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "Front.txt", "");
        write(dir.path(), "File:a.png.txt", "");
        write(dir.path(), "A/B.txt", "");
        write(dir.path(), "notes.md", "");
        write(dir.path(), ".hidden.txt", "");
        let documents = documents(dir.path());
        let host = FsHost::new(&documents);

        let count = |namespace: Option<&str>| match host
            .call(HostRequest::CountDocuments {
                namespace: namespace.map(str::to_owned),
            })
            .unwrap()
        {
            HostResponse::Count(count) => count,
            other => panic!("unexpected {other:?}"),
        };
        assert_eq!(count(None), 3);
        assert_eq!(count(Some("File")), 1);
    }

    #[test]
    fn test_include_through_renderer() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "Notice.txt", "'''@what@'''");
        let documents = documents(dir.path());
        let host = FsHost::new(&documents);

        let html = namu_markup::Renderer::new()
            .render("[include(Notice, what=closed)]", &namu_markup::RenderOptions::default(), &host)
            .unwrap()
            .html;
        assert_eq!(html, "<div class=\"wiki-include\"><strong>closed</strong></div>");
    }
}
