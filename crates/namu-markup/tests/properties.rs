use std::collections::HashMap;

use namu_markup::{HostError, HostRequest, HostResponse, RenderOptions, Renderer, VoteTally};
use proptest::prelude::*;

/// Answers every request with something plausible.
fn permissive_host(request: HostRequest) -> Result<HostResponse, HostError> {
    Ok(match request {
        HostRequest::CountDocuments { .. } => HostResponse::Count(1),
        HostRequest::FindDocument { title } => HostResponse::Document(Some(format!("included {title}"))),
        HostRequest::Translate { key } => HostResponse::Text(key),
        HostRequest::VoteStatus { .. } => HostResponse::Vote(VoteTally::default()),
    })
}

fn position(html: &str, needle: &str) -> usize {
    html.find(needle)
        .unwrap_or_else(|| panic!("{needle:?} missing from {html}"))
}

proptest! {
    #[test]
    fn footnotes_group_in_first_occurrence_order(
        names in prop::collection::vec(prop::sample::select(vec!["a", "b", "c", "d"]), 1..12),
    ) {
        let source: String = names.iter().map(|name| format!("[*{name} text]")).collect();
        let html = Renderer::new()
            .render(&source, &RenderOptions::default(), &permissive_host)
            .unwrap()
            .html;

        let mut order: Vec<&str> = Vec::new();
        let mut indices: HashMap<&str, Vec<usize>> = HashMap::new();
        for (i, name) in names.iter().enumerate() {
            if !order.contains(name) {
                order.push(*name);
            }
            indices.entry(*name).or_default().push(i + 1);
        }

        let block = &html[position(&html, "<div class=\"wiki-macro-footnote\">")..];
        let starts: Vec<usize> = order
            .iter()
            .map(|name| position(block, &format!("<span id=\"fn-{name}\"></span>")))
            .collect();
        prop_assert!(starts.windows(2).all(|w| w[0] < w[1]));

        for name in &order {
            let occurrences = &indices[name];
            prop_assert!(occurrences.windows(2).all(|w| w[0] < w[1]));
            if let [index] = occurrences.as_slice() {
                let link = format!("<a href=\"#rfn-{index}\">[{name}]</a>");
                prop_assert!(block.contains(&link));
            } else {
                let first = occurrences[0];
                let positions: Vec<usize> = occurrences
                    .iter()
                    .enumerate()
                    .map(|(k, index)| {
                        position(block, &format!("<a href=\"#rfn-{index}\"><sup>{first}.{}</sup></a>", k + 1))
                    })
                    .collect();
                prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
            }
        }
    }

    #[test]
    fn toc_indents_are_balanced(levels in prop::collection::vec(1usize..=6, 0..20)) {
        let mut source = String::from("[toc]\n");
        for (i, level) in levels.iter().enumerate() {
            let marks = "=".repeat(*level);
            source.push_str(&format!("{marks} h{i} {marks}\n"));
        }
        let rendered = Renderer::new()
            .render(&source, &RenderOptions::default(), &permissive_host)
            .unwrap();

        let toc = rendered.html.split("<br>").next().unwrap_or_default();
        prop_assert!(toc.starts_with("<div class=\"wiki-macro-toc\""));
        prop_assert_eq!(toc.matches("<div").count(), toc.matches("</div>").count());
        prop_assert_eq!(rendered.headings.len(), levels.len());
    }

    #[test]
    fn never_panics_on_arbitrary_text(source in "\\PC{0,200}", is_thread in any::<bool>()) {
        let options = RenderOptions { is_thread, ..RenderOptions::default() };
        let _ = Renderer::new().render(&source, &options, &permissive_host);
    }

    #[test]
    fn never_panics_on_markup_soup(
        source in "[\\[\\]{}()'=*|#!\\\\<>^v:,_~ .@a-c0-9\n-]{0,160}",
        is_thread in any::<bool>(),
    ) {
        let options = RenderOptions { is_thread, ..RenderOptions::default() };
        let rendered = Renderer::new().render(&source, &options, &permissive_host);
        prop_assert!(rendered.is_ok());
    }

    #[test]
    fn plain_text_cannot_open_tags(source in "[a-z <&\"]{0,80}") {
        let html = Renderer::new()
            .render(&source, &RenderOptions::default(), &permissive_host)
            .unwrap()
            .html;
        prop_assert!(!html.contains('<'));
    }
}
