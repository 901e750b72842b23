//! The element capabilities the rewriter needs from an HTML tokenizer.

use lol_html::html_content::{ContentType, Element};

/// Mutable view of a start tag during a streaming rewrite.
pub trait ElementView {
    /// Lowercase tag name.
    fn tag(&self) -> String;

    fn get_attr(&self, name: &str) -> Option<String>;

    fn set_attr(&mut self, name: &str, value: &str);

    /// Replace the element's children with escaped text.
    fn set_inner_text(&mut self, text: &str);

    /// Insert raw markup just before the end tag.
    fn append_html(&mut self, html: &str);
}

impl ElementView for Element<'_, '_> {
    fn tag(&self) -> String {
        self.tag_name()
    }

    fn get_attr(&self, name: &str) -> Option<String> {
        self.get_attribute(name)
    }

    fn set_attr(&mut self, name: &str, value: &str) {
        if let Err(e) = self.set_attribute(name, value) {
            tracing::debug!(attribute = name, error = %e, "Skipping invalid attribute");
        }
    }

    fn set_inner_text(&mut self, text: &str) {
        self.set_inner_content(text, ContentType::Text);
    }

    fn append_html(&mut self, html: &str) {
        self.append(html, ContentType::Html);
    }
}
