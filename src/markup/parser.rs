//! Forgiving parser for the HTML subset views emit.
//!
//! Scope is deliberately small: elements, attributes (quoted, unquoted,
//! boolean), text, comments and void elements. No entity decoding, no
//! CDATA, no implicit tag closing. Views that need more than this are
//! producing markup the reconciler could not diff cheaply anyway.
//!
//! Whitespace handling matches what multi-line `format!` templates need:
//! whitespace-only text is dropped and inner runs collapse to one space,
//! so re-indenting a template never shows up as a DOM change.

use super::{MarkupElement, MarkupNode};
use crate::error::MarkupError;

/// Elements that never have children or closing tags.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Parse markup into a node tree.
///
/// Tag and attribute names are lowercased; attribute values and text are
/// kept verbatim apart from whitespace collapsing.
pub fn parse(input: &str) -> Result<Vec<MarkupNode>, MarkupError> {
    let mut parser = Parser { src: input, pos: 0 };
    parser.parse_children(None)
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl Parser<'_> {
    /// Parse sibling nodes until `</enclosing>` (consumed) or end of input.
    fn parse_children(&mut self, enclosing: Option<&str>) -> Result<Vec<MarkupNode>, MarkupError> {
        let mut nodes = Vec::new();
        loop {
            self.take_text(&mut nodes);
            if self.pos >= self.src.len() {
                return match enclosing {
                    None => Ok(nodes),
                    Some(tag) => Err(MarkupError::UnclosedElement {
                        tag: tag.to_string(),
                    }),
                };
            }
            if self.starts_with("<!--") {
                self.skip_comment()?;
            } else if self.starts_with("<!") {
                self.skip_declaration()?;
            } else if self.starts_with("</") {
                let found = self.take_closing_tag()?;
                return match enclosing {
                    Some(tag) if tag == found => Ok(nodes),
                    Some(tag) => Err(MarkupError::MismatchedClosingTag {
                        expected: tag.to_string(),
                        found,
                    }),
                    None => Err(MarkupError::UnexpectedClosingTag { found }),
                };
            } else {
                let (mut element, self_closing) = self.take_open_tag()?;
                if !self_closing && !is_void(&element.tag) {
                    let tag = element.tag.clone();
                    element.children = self.parse_children(Some(&tag))?;
                }
                nodes.push(MarkupNode::Element(element));
            }
        }
    }

    /// Consume text up to the next `<`, pushing it unless whitespace-only.
    fn take_text(&mut self, nodes: &mut Vec<MarkupNode>) {
        let start = self.pos;
        while self.pos < self.src.len() && self.src.as_bytes()[self.pos] != b'<' {
            self.pos += 1;
        }
        if self.pos > start {
            let text = self.src[start..self.pos].trim();
            if !text.is_empty() {
                nodes.push(MarkupNode::Text(collapse_whitespace(text)));
            }
        }
    }

    fn take_open_tag(&mut self) -> Result<(MarkupElement, bool), MarkupError> {
        self.pos += 1; // consume '<'
        let tag = self.take_name();
        if tag.is_empty() || !tag.as_bytes()[0].is_ascii_alphabetic() {
            return Err(MarkupError::MalformedTag {
                context: self.context(),
            });
        }
        let mut attrs = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => {
                    return Err(MarkupError::UnexpectedEnd {
                        context: self.context(),
                    });
                }
                Some(b'>') => {
                    self.pos += 1;
                    return Ok((
                        MarkupElement {
                            tag,
                            attrs,
                            children: Vec::new(),
                        },
                        false,
                    ));
                }
                Some(b'/') => {
                    self.pos += 1;
                    self.skip_whitespace();
                    if self.peek() != Some(b'>') {
                        return Err(MarkupError::MalformedTag {
                            context: self.context(),
                        });
                    }
                    self.pos += 1;
                    return Ok((
                        MarkupElement {
                            tag,
                            attrs,
                            children: Vec::new(),
                        },
                        true,
                    ));
                }
                Some(_) => {
                    let name = self.take_name();
                    if name.is_empty() {
                        return Err(MarkupError::MalformedTag {
                            context: self.context(),
                        });
                    }
                    self.skip_whitespace();
                    if self.peek() == Some(b'=') {
                        self.pos += 1;
                        self.skip_whitespace();
                        let value = self.take_attr_value()?;
                        attrs.push((name, value));
                    } else {
                        // boolean attribute, e.g. `disabled`
                        attrs.push((name, String::new()));
                    }
                }
            }
        }
    }

    fn take_attr_value(&mut self) -> Result<String, MarkupError> {
        match self.peek() {
            Some(quote @ (b'"' | b'\'')) => {
                self.pos += 1;
                let start = self.pos;
                while let Some(byte) = self.peek() {
                    if byte == quote {
                        let value = self.src[start..self.pos].to_string();
                        self.pos += 1;
                        return Ok(value);
                    }
                    self.pos += 1;
                }
                Err(MarkupError::UnexpectedEnd {
                    context: self.context(),
                })
            }
            Some(_) => {
                let start = self.pos;
                while let Some(byte) = self.peek() {
                    if byte.is_ascii_whitespace() || byte == b'>' {
                        break;
                    }
                    self.pos += 1;
                }
                if self.pos == start {
                    return Err(MarkupError::MalformedTag {
                        context: self.context(),
                    });
                }
                Ok(self.src[start..self.pos].to_string())
            }
            None => Err(MarkupError::UnexpectedEnd {
                context: self.context(),
            }),
        }
    }

    fn take_closing_tag(&mut self) -> Result<String, MarkupError> {
        self.pos += 2; // consume "</"
        let tag = self.take_name();
        if tag.is_empty() {
            return Err(MarkupError::MalformedTag {
                context: self.context(),
            });
        }
        self.skip_whitespace();
        match self.peek() {
            Some(b'>') => {
                self.pos += 1;
                Ok(tag)
            }
            Some(_) => Err(MarkupError::MalformedTag {
                context: self.context(),
            }),
            None => Err(MarkupError::UnexpectedEnd {
                context: self.context(),
            }),
        }
    }

    fn skip_comment(&mut self) -> Result<(), MarkupError> {
        match self.src[self.pos..].find("-->") {
            Some(offset) => {
                self.pos += offset + 3;
                Ok(())
            }
            None => Err(MarkupError::UnexpectedEnd {
                context: self.context(),
            }),
        }
    }

    /// Skip `<!DOCTYPE ...>` and similar declarations.
    fn skip_declaration(&mut self) -> Result<(), MarkupError> {
        match self.src[self.pos..].find('>') {
            Some(offset) => {
                self.pos += offset + 1;
                Ok(())
            }
            None => Err(MarkupError::UnexpectedEnd {
                context: self.context(),
            }),
        }
    }

    /// Tag or attribute name, lowercased. Empty if the cursor is not on one.
    fn take_name(&mut self) -> String {
        let start = self.pos;
        while let Some(byte) = self.peek() {
            if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' || byte == b':' {
                self.pos += 1;
            } else {
                break;
            }
        }
        self.src[start..self.pos].to_ascii_lowercase()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(byte) if byte.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn starts_with(&self, prefix: &str) -> bool {
        self.src[self.pos..].starts_with(prefix)
    }

    /// Up to 24 chars around the cursor, for error messages.
    fn context(&self) -> String {
        let rest = &self.src[self.pos..];
        if !rest.is_empty() {
            return rest.chars().take(24).collect();
        }
        let total = self.src.chars().count();
        self.src.chars().skip(total.saturating_sub(24)).collect()
    }
}

/// Whether a tag names a void element. The serializer needs this too.
pub(crate) fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_run = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !in_run {
                out.push(' ');
            }
            in_run = true;
        } else {
            out.push(ch);
            in_run = false;
        }
    }
    out
}
