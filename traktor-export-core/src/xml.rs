//! Minimal indented XML writer
//!
//! rekordbox documents are element/attribute only (no text nodes), so the
//! writer only knows start, empty and end tags.

use std::borrow::Cow;
use std::io::{self, Write};

pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

const INDENT: &str = "  ";

pub struct XmlWriter<W: Write> {
    out: W,
    depth: usize,
}

impl<W: Write> XmlWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, depth: 0 }
    }

    pub fn declaration(&mut self) -> io::Result<()> {
        writeln!(self.out, "{}", XML_DECLARATION)
    }

    /// `<tag a="1">`, children follow until [`XmlWriter::end`]
    pub fn start(&mut self, tag: &str, attrs: &[(&str, &str)]) -> io::Result<()> {
        self.open_tag(tag, attrs)?;
        writeln!(self.out, ">")?;
        self.depth += 1;
        Ok(())
    }

    /// `<tag a="1"/>`
    pub fn empty(&mut self, tag: &str, attrs: &[(&str, &str)]) -> io::Result<()> {
        self.open_tag(tag, attrs)?;
        writeln!(self.out, "/>")
    }

    pub fn end(&mut self, tag: &str) -> io::Result<()> {
        self.depth = self.depth.saturating_sub(1);
        self.write_indent()?;
        writeln!(self.out, "</{}>", tag)
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn open_tag(&mut self, tag: &str, attrs: &[(&str, &str)]) -> io::Result<()> {
        self.write_indent()?;
        write!(self.out, "<{}", tag)?;
        for (name, value) in attrs {
            write!(self.out, " {}=\"{}\"", name, escape_attr(value))?;
        }
        Ok(())
    }

    fn write_indent(&mut self) -> io::Result<()> {
        for _ in 0..self.depth {
            self.out.write_all(INDENT.as_bytes())?;
        }
        Ok(())
    }
}

/// Escape an attribute value
///
/// Whitespace control characters are written as character references so they
/// survive attribute value normalization.
pub fn escape_attr(value: &str) -> Cow<'_, str> {
    if !value.contains(['&', '<', '>', '"', '\'', '\n', '\r', '\t']) {
        return Cow::Borrowed(value);
    }

    let mut escaped = String::with_capacity(value.len() + 16);
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            '\n' => escaped.push_str("&#10;"),
            '\r' => escaped.push_str("&#13;"),
            '\t' => escaped.push_str("&#9;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_passthrough() {
        assert!(matches!(escape_attr("Lane 8 - Strings"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_escape_special_characters() {
        assert_eq!(
            escape_attr(r#"Tom & Jerry <"Live">"#),
            "Tom &amp; Jerry &lt;&quot;Live&quot;&gt;"
        );
        assert_eq!(escape_attr("line\nbreak\ttab"), "line&#10;break&#9;tab");
        assert_eq!(escape_attr("it's"), "it&apos;s");
    }

    #[test]
    fn test_nested_output() {
        let mut writer = XmlWriter::new(Vec::new());
        writer.declaration().unwrap();
        writer.start("A", &[("x", "1")]).unwrap();
        writer.empty("B", &[("y", "a&b"), ("z", "")]).unwrap();
        writer.end("A").unwrap();

        let out = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(
            out,
            format!(
                "{}\n<A x=\"1\">\n  <B y=\"a&amp;b\" z=\"\"/>\n</A>\n",
                XML_DECLARATION
            )
        );
    }

    #[test]
    fn test_output_parses_back() {
        let mut writer = XmlWriter::new(Vec::new());
        writer.declaration().unwrap();
        writer.empty("T", &[("v", "<&\"\n'>")]).unwrap();
        let out = String::from_utf8(writer.into_inner()).unwrap();

        let doc = roxmltree::Document::parse(&out).unwrap();
        assert_eq!(doc.root_element().attribute("v"), Some("<&\"\n'>"));
    }
}
