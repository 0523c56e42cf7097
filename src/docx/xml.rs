use std::fmt::Display;

use quick_xml::escape::{escape, partial_escape, resolve_predefined_entity, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::ContainerError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
    CData(String),
    Comment(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn push(&mut self, child: XmlElement) {
        self.children.push(XmlNode::Element(child));
    }

    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            _ => None,
        })
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut XmlElement> {
        self.children.iter_mut().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            _ => None,
        })
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.elements().filter(move |element| element.is(name))
    }

    pub fn children_named_mut<'a>(
        &'a mut self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a mut XmlElement> {
        self.elements_mut().filter(move |element| element.is(name))
    }

    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|element| element.is(name))
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut XmlElement> {
        self.elements_mut().find(|element| element.is(name))
    }

    #[cfg(test)]
    pub fn descendants(&self) -> Vec<&XmlElement> {
        let mut out = Vec::new();
        let mut stack: Vec<&XmlElement> = self.elements().collect();
        stack.reverse();
        while let Some(element) = stack.pop() {
            out.push(element);
            let before = stack.len();
            stack.extend(element.elements());
            stack[before..].reverse();
        }
        out
    }

    #[cfg(test)]
    pub fn find_descendant(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find_map(|element| {
            if element.is(name) {
                Some(element)
            } else {
                element.find_descendant(name)
            }
        })
    }

    pub fn find_descendant_mut(&mut self, name: &str) -> Option<&mut XmlElement> {
        for element in self.elements_mut() {
            if element.is(name) {
                return Some(element);
            }
            if let Some(found) = element.find_descendant_mut(name) {
                return Some(found);
            }
        }
        None
    }

    pub fn text(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            match node {
                XmlNode::Text(text) | XmlNode::CData(text) => out.push_str(text),
                _ => {}
            }
        }
        out
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children = vec![XmlNode::Text(text.into())];
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Declaration {
    version: String,
    encoding: Option<String>,
    standalone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    declaration: Option<Declaration>,
    pub root: XmlElement,
}

impl XmlDocument {
    pub fn parse(bytes: &[u8], part: &str) -> Result<Self, ContainerError> {
        let malformed = |err: &dyn Display| ContainerError::Xml {
            part: part.to_string(),
            message: err.to_string(),
        };

        let mut reader = Reader::from_reader(bytes);
        reader.config_mut().trim_text(false);

        let mut buf = Vec::new();
        let mut declaration = None;
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Decl(decl)) => {
                    let version = decl.version().map_err(|err| malformed(&err))?;
                    let encoding = match decl.encoding() {
                        Some(value) => Some(lossy(&value.map_err(|err| malformed(&err))?)),
                        None => None,
                    };
                    let standalone = match decl.standalone() {
                        Some(value) => Some(lossy(&value.map_err(|err| malformed(&err))?)),
                        None => None,
                    };
                    declaration = Some(Declaration {
                        version: lossy(&version),
                        encoding,
                        standalone,
                    });
                }
                Ok(Event::Start(start)) => {
                    stack.push(element_from_start(&reader, &start, part)?);
                }
                Ok(Event::Empty(start)) => {
                    let element = element_from_start(&reader, &start, part)?;
                    attach(&mut stack, &mut root, element, part)?;
                }
                Ok(Event::End(_)) => {
                    let element = stack.pop().ok_or_else(|| ContainerError::Xml {
                        part: part.to_string(),
                        message: "unbalanced end tag".to_string(),
                    })?;
                    attach(&mut stack, &mut root, element, part)?;
                }
                Ok(Event::Text(text)) => {
                    let decoded = reader
                        .decoder()
                        .decode(&text)
                        .map_err(|err| malformed(&err))?;
                    push_text(&mut stack, &decoded);
                }
                Ok(Event::GeneralRef(reference)) => {
                    let resolved = match reference.resolve_char_ref().map_err(|err| malformed(&err))? {
                        Some(ch) => ch.to_string(),
                        None => {
                            let name = reader
                                .decoder()
                                .decode(&reference)
                                .map_err(|err| malformed(&err))?;
                            resolve_predefined_entity(&name)
                                .map(ToOwned::to_owned)
                                .ok_or_else(|| ContainerError::Xml {
                                    part: part.to_string(),
                                    message: format!("unknown entity &{name};"),
                                })?
                        }
                    };
                    push_text(&mut stack, &resolved);
                }
                Ok(Event::CData(data)) => {
                    let decoded = reader
                        .decoder()
                        .decode(&data)
                        .map_err(|err| malformed(&err))?;
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(XmlNode::CData(decoded.into_owned()));
                    }
                }
                Ok(Event::Comment(comment)) => {
                    let decoded = reader
                        .decoder()
                        .decode(&comment)
                        .map_err(|err| malformed(&err))?;
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(XmlNode::Comment(decoded.into_owned()));
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(err) => return Err(malformed(&err)),
            }
            buf.clear();
        }

        if !stack.is_empty() {
            return Err(ContainerError::Xml {
                part: part.to_string(),
                message: format!("unclosed element <{}>", stack[stack.len() - 1].name),
            });
        }

        let root = root.ok_or_else(|| ContainerError::Xml {
            part: part.to_string(),
            message: "document has no root element".to_string(),
        })?;

        Ok(Self { declaration, root })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = String::new();
        if let Some(decl) = &self.declaration {
            out.push_str("<?xml version=\"");
            out.push_str(&decl.version);
            out.push('"');
            if let Some(encoding) = &decl.encoding {
                out.push_str(" encoding=\"");
                out.push_str(encoding);
                out.push('"');
            }
            if let Some(standalone) = &decl.standalone {
                out.push_str(" standalone=\"");
                out.push_str(standalone);
                out.push('"');
            }
            out.push_str("?>\r\n");
        }
        write_element(&mut out, &self.root);
        out.into_bytes()
    }
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn element_from_start<R>(
    reader: &Reader<R>,
    start: &BytesStart<'_>,
    part: &str,
) -> Result<XmlElement, ContainerError> {
    let malformed = |message: String| ContainerError::Xml {
        part: part.to_string(),
        message,
    };

    let name = reader
        .decoder()
        .decode(start.name().as_ref())
        .map_err(|err| malformed(err.to_string()))?
        .into_owned();

    let mut element = XmlElement::new(name);
    for attr in start.attributes() {
        let attr = attr.map_err(|err| malformed(err.to_string()))?;
        let key = reader
            .decoder()
            .decode(attr.key.as_ref())
            .map_err(|err| malformed(err.to_string()))?
            .into_owned();
        let raw = reader
            .decoder()
            .decode(&attr.value)
            .map_err(|err| malformed(err.to_string()))?;
        let value = unescape(&raw).map_err(|err| malformed(err.to_string()))?;
        element.attributes.push((key, value.into_owned()));
    }
    Ok(element)
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
    part: &str,
) -> Result<(), ContainerError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(XmlNode::Element(element)),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(ContainerError::Xml {
                part: part.to_string(),
                message: "multiple root elements".to_string(),
            });
        }
    }
    Ok(())
}

// Text outside the root element (whitespace between prolog items) is dropped.
fn push_text(stack: &mut [XmlElement], text: &str) {
    let Some(parent) = stack.last_mut() else {
        return;
    };
    if let Some(XmlNode::Text(existing)) = parent.children.last_mut() {
        existing.push_str(text);
    } else {
        parent.children.push(XmlNode::Text(text.to_string()));
    }
}

fn write_element(out: &mut String, element: &XmlElement) {
    out.push('<');
    out.push_str(&element.name);
    for (key, value) in &element.attributes {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape(value.as_str()));
        out.push('"');
    }

    if element.children.is_empty() {
        out.push_str("/>");
        return;
    }

    out.push('>');
    for node in &element.children {
        match node {
            XmlNode::Element(child) => write_element(out, child),
            XmlNode::Text(text) => out.push_str(&partial_escape(text.as_str())),
            XmlNode::CData(data) => {
                out.push_str("<![CDATA[");
                out.push_str(data);
                out.push_str("]]>");
            }
            XmlNode::Comment(comment) => {
                out.push_str("<!--");
                out.push_str(comment);
                out.push_str("-->");
            }
        }
    }
    out.push_str("</");
    out.push_str(&element.name);
    out.push('>');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_serializes_a_word_fragment() {
        let source = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="urn:w"><w:body><w:p><w:r><w:t xml:space="preserve">Name: </w:t></w:r></w:p></w:body></w:document>"#;

        let doc = XmlDocument::parse(source.as_bytes(), "word/document.xml").unwrap();
        assert_eq!(doc.root.name, "w:document");
        assert_eq!(doc.root.attr("xmlns:w"), Some("urn:w"));

        let body = doc.root.child("w:body").unwrap();
        let text = body.find_descendant("w:t").unwrap();
        assert_eq!(text.text(), "Name: ");
        assert_eq!(text.attr("xml:space"), Some("preserve"));

        let written = String::from_utf8(doc.to_bytes()).unwrap();
        assert!(written.starts_with(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\r\n<w:document"
        ));
        assert!(written.contains("<w:t xml:space=\"preserve\">Name: </w:t>"));
    }

    #[test]
    fn entity_references_round_trip() {
        let source = r#"<root a="x &amp; &quot;y&quot;"><t>Fish &amp; Chips &#9744; &lt;ok&gt;</t></root>"#;
        let doc = XmlDocument::parse(source.as_bytes(), "part.xml").unwrap();

        assert_eq!(doc.root.attr("a"), Some("x & \"y\""));
        assert_eq!(doc.root.child("t").unwrap().text(), "Fish & Chips ☐ <ok>");

        let reparsed = XmlDocument::parse(&doc.to_bytes(), "part.xml").unwrap();
        assert_eq!(reparsed.root, doc.root);
    }

    #[test]
    fn descendants_follow_document_order() {
        let source = "<a><b><c/></b><d><e/></d></a>";
        let doc = XmlDocument::parse(source.as_bytes(), "part.xml").unwrap();
        let names: Vec<&str> = doc
            .root
            .descendants()
            .into_iter()
            .map(|element| element.name.as_str())
            .collect();
        assert_eq!(names, vec!["b", "c", "d", "e"]);
    }

    #[test]
    fn rejects_malformed_markup() {
        let err = XmlDocument::parse(b"<a><b></a>", "word/document.xml").unwrap_err();
        match err {
            ContainerError::Xml { part, .. } => assert_eq!(part, "word/document.xml"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_empty_input() {
        assert!(XmlDocument::parse(b"", "word/document.xml").is_err());
    }
}
