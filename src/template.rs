//! Templating collaborator.
//!
//! Views produce [`Markup`], an opaque wrapper around an HTML-shaped string.
//! The runtime hands every render call a [`TemplateTag`] so views build
//! markup through one explicit seam instead of bare strings:
//!
//! # Example
//!
//! ```ignore
//! let render = move |model: &Value, html: &TemplateTag| {
//!     html.markup(format!(
//!         "<h1>{}</h1>",
//!         html.escape(model["title"].as_str().unwrap_or_default())
//!     ))
//! };
//! ```
//!
//! The runtime parses markup for reconciliation but never builds it itself;
//! everything between the braces is the view's business.

use std::fmt;

// =============================================================================
// Markup
// =============================================================================

/// Opaque markup produced by a view's render function.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Markup(String);

impl Markup {
    pub fn new(markup: impl Into<String>) -> Self {
        Self(markup.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<String> for Markup {
    fn from(markup: String) -> Self {
        Self(markup)
    }
}

impl From<&str> for Markup {
    fn from(markup: &str) -> Self {
        Self(markup.to_string())
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// TemplateTag
// =============================================================================

/// Tag helper passed to every render call.
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateTag;

impl TemplateTag {
    /// Wrap an interpolated string as markup.
    pub fn markup(&self, markup: impl Into<String>) -> Markup {
        Markup::new(markup)
    }

    /// Escape text so it interpolates as literal content, not structure.
    pub fn escape(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for ch in text.chars() {
            match ch {
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                '"' => out.push_str("&quot;"),
                '\'' => out.push_str("&#39;"),
                _ => out.push(ch),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markup_round_trips_content() {
        let markup = Markup::new("<p>hi</p>");
        assert_eq!(markup.as_str(), "<p>hi</p>");
        assert_eq!(markup.to_string(), "<p>hi</p>");
        assert_eq!(markup.into_string(), "<p>hi</p>");
    }

    #[test]
    fn test_whitespace_only_markup_is_empty() {
        assert!(Markup::new("  \n  ").is_empty());
        assert!(!Markup::new("<br>").is_empty());
    }

    #[test]
    fn test_escape_neutralizes_structure() {
        let html = TemplateTag;
        assert_eq!(
            html.escape(r#"<a b="c">&'"#),
            "&lt;a b=&quot;c&quot;&gt;&amp;&#39;"
        );
    }

    #[test]
    fn test_escape_leaves_plain_text_alone() {
        let html = TemplateTag;
        assert_eq!(html.escape("Mock title"), "Mock title");
    }
}
