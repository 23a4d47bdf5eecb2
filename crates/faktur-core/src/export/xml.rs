//! Thin element-oriented wrapper around the quick-xml writer.

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use super::Result;
use crate::error::ExportError;

pub(crate) struct XmlWriter {
    inner: Writer<Vec<u8>>,
}

impl XmlWriter {
    /// New document with an XML declaration.
    pub fn new() -> Result<Self> {
        let mut w = Self {
            inner: Writer::new_with_indent(Vec::new(), b' ', 2),
        };
        w.write(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        Ok(w)
    }

    fn write(&mut self, event: Event<'_>) -> Result<()> {
        self.inner
            .write_event(event)
            .map_err(|e| ExportError::Xml(e.to_string()))
    }

    pub fn start_element(&mut self, name: &str) -> Result<()> {
        self.write(Event::Start(BytesStart::new(name)))
    }

    pub fn end_element(&mut self, name: &str) -> Result<()> {
        self.write(Event::End(BytesEnd::new(name)))
    }

    /// `<name>text</name>`, or `<name/>` for empty text.
    pub fn text_element(&mut self, name: &str, text: &str) -> Result<()> {
        if text.is_empty() {
            return self.write(Event::Empty(BytesStart::new(name)));
        }
        self.start_element(name)?;
        self.write(Event::Text(BytesText::new(text)))?;
        self.end_element(name)
    }

    pub fn finish(self) -> Result<String> {
        Ok(String::from_utf8(self.inner.into_inner())?)
    }
}
