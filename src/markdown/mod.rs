//! Markdown rendering for card faces
//!
//! The display collaborator: takes card front/back text, returns an HTML
//! fragment. Pure and stateless; storage never depends on it.

use pulldown_cmark::{html, Options, Parser};

/// Render markdown to an HTML fragment (no wrapping html/body tags).
pub fn render_html(text: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(text, options);
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}
