//! Markdown source to search sections.
//!
//! A content file goes through three steps before it reaches the index:
//! 1. [`strip_front_matter`] drops the `---` delimited metadata header
//! 2. [`render_html`] renders the Markdown body to HTML
//! 3. [`extract_sections`] splits the rendered HTML at heading boundaries

mod frontmatter;
mod render;
mod sections;

pub use frontmatter::{front_matter, strip_front_matter};
pub use render::render_html;
pub use sections::{Section, extract_sections};

use tracing::{debug, instrument};

/// Run the whole Markdown-to-sections conversion for one document.
#[instrument(skip(source), fields(path = %path))]
pub fn sections_from_markdown(source: &str, path: &str, original_title: &str) -> Vec<Section> {
    let body = strip_front_matter(source);
    let html = render_html(body);
    let sections = extract_sections(&html, path, original_title);

    debug!(
        body_len = body.len(),
        html_len = html.len(),
        sections = sections.len(),
        "document converted"
    );

    sections
}
