//! Markdown to HTML rendering.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd, html};

/// Render a Markdown body to HTML (CommonMark plus tables and strikethrough).
///
/// Raw HTML in the source is escaped, never passed through: an HTML block
/// renders as a paragraph of its literal text and inline tags stay text.
pub fn render_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown, options).map(escape_raw_html);
    let mut out = String::with_capacity(markdown.len() + markdown.len() / 2);
    html::push_html(&mut out, parser);
    out
}

fn escape_raw_html(event: Event<'_>) -> Event<'_> {
    match event {
        Event::Start(Tag::HtmlBlock) => Event::Start(Tag::Paragraph),
        Event::End(TagEnd::HtmlBlock) => Event::End(TagEnd::Paragraph),
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    }
}
