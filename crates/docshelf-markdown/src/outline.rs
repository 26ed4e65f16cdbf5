use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

/// Text of the first heading in the document, if any.
///
/// Used as the doc title when front matter does not provide one. Inline
/// code is kept verbatim; other inline markup is stripped.
#[must_use]
pub fn content_title(markdown: &str) -> Option<String> {
    let parser = Parser::new_ext(markdown, Options::empty());
    let mut buf = String::new();
    let mut in_heading = false;
    for event in parser {
        match event {
            Event::Start(Tag::Heading { .. }) => in_heading = true,
            Event::End(TagEnd::Heading { .. }) => {
                let title = buf.trim();
                if title.is_empty() {
                    return None;
                }
                return Some(title.to_string());
            }
            Event::Text(text) | Event::Code(text) if in_heading => buf.push_str(&text),
            _ => {}
        }
    }
    None
}

/// Plain-text excerpt of the document: the first non-empty paragraph with
/// inline markup stripped and image alt text dropped.
///
/// Used as the doc description when front matter does not provide one.
#[must_use]
pub fn content_excerpt(markdown: &str) -> Option<String> {
    let parser = Parser::new_ext(markdown, Options::empty());
    let mut buf = String::new();
    let mut in_paragraph = false;
    let mut in_image = false;
    for event in parser {
        match event {
            Event::Start(Tag::Paragraph) => in_paragraph = true,
            Event::Start(Tag::Image { .. }) => in_image = true,
            Event::End(TagEnd::Image) => in_image = false,
            Event::End(TagEnd::Paragraph) => {
                let text = buf.trim();
                if !text.is_empty() {
                    return Some(text.to_string());
                }
                buf.clear();
                in_paragraph = false;
            }
            Event::Text(text) | Event::Code(text) if in_paragraph && !in_image => {
                buf.push_str(&text);
            }
            Event::SoftBreak | Event::HardBreak if in_paragraph => buf.push(' '),
            _ => {}
        }
    }
    None
}
