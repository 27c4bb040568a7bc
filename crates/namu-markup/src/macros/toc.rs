use crate::context::TOC_PLACEHOLDER;
use crate::host::translate;
use crate::{Macro, MacroParams, Output, RenderError, RenderPass};

/// Table of contents, filled in once every heading of the pass is known.
pub(super) struct TableOfContents;

impl Macro for TableOfContents {
    fn name(&self) -> &str {
        "tableofcontents"
    }

    fn aliases(&self) -> &[&str] {
        &["toc", "목차"]
    }

    fn format(&self, _params: &MacroParams, pass: &mut RenderPass<'_>) -> Result<Output, RenderError> {
        if pass.context().toc_label().is_none() {
            let label = translate(pass.host(), "toc")?;
            pass.context_mut().set_toc_label(label);
        }
        Ok(Output::html(TOC_PLACEHOLDER))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{HostError, HostRequest, HostResponse, NoHost, RenderError, RenderOptions, Renderer};

    fn host(request: HostRequest) -> Result<HostResponse, HostError> {
        match request {
            HostRequest::Translate { key } if key == "toc" => Ok(HostResponse::Text("Contents".to_owned())),
            _ => Err(HostError::new("unexpected")),
        }
    }

    #[test]
    fn test_toc_lists_later_headings() {
        let html = Renderer::new()
            .render("[toc]\n== A ==\n=== B ===", &RenderOptions::default(), &host)
            .unwrap()
            .html;
        assert!(html.starts_with(
            "<div class=\"wiki-macro-toc\" id=\"toc\"><div class=\"toc-label\">Contents</div>\
             <div class=\"toc-indent\"><span class=\"toc-item\"><a href=\"#s-1\">1</a>. A</span>\
             <div class=\"toc-indent\"><span class=\"toc-item\"><a href=\"#s-1.1\">1.1</a>. B</span>\
             </div></div></div>"
        ));
    }

    #[test]
    fn test_repeated_toc_is_identical() {
        let html = Renderer::new()
            .render("[목차]\n== A ==\n[TableOfContents]", &RenderOptions::default(), &host)
            .unwrap()
            .html;
        let toc = "<div class=\"wiki-macro-toc\"";
        assert_eq!(html.matches(toc).count(), 2);
    }

    #[test]
    fn test_label_lookup_failure_fails_render() {
        let err = Renderer::new()
            .render("[toc]", &RenderOptions::default(), &NoHost)
            .unwrap_err();
        assert!(matches!(err, RenderError::Host(_)));
    }
}
