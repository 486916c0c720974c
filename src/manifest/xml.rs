use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// A parsed XML element. Names are local names; attribute keys keep their prefix.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
    pub text: String,
}

impl Element {
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |c| c.name == name)
    }

    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// Reads a whole document into an element tree. Comments, processing
/// instructions and the XML declaration are dropped.
pub(crate) fn parse_document(text: &str) -> Result<Element, String> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(false);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| format!("{} (at byte {})", e, reader.buffer_position()))?;

        match event {
            Event::Start(start) => {
                if stack.is_empty() && root.is_some() {
                    return Err("document has more than one root element".to_string());
                }
                stack.push(open_element(&start)?);
            }
            Event::Empty(start) => {
                let element = open_element(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| "closing tag without matching opening tag".to_string())?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(|e| e.to_string())?;
                push_text(&mut stack, &text)?;
            }
            Event::CData(data) => {
                let text = String::from_utf8_lossy(&data).into_owned();
                push_text(&mut stack, &text)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(format!("element <{}> is never closed", open.name));
    }
    root.ok_or_else(|| "document has no root element".to_string())
}

fn open_element(start: &BytesStart) -> Result<Element, String> {
    let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| format!("invalid attribute on <{}>: {}", name, e))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| format!("invalid attribute '{}' on <{}>: {}", key, name, e))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(Element {
        name,
        attributes,
        ..Element::default()
    })
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), String> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_some() => {
            return Err("document has more than one root element".to_string())
        }
        None => *root = Some(element),
    }
    Ok(())
}

fn push_text(stack: &mut [Element], text: &str) -> Result<(), String> {
    match stack.last_mut() {
        Some(current) => current.text.push_str(text),
        None if text.trim().is_empty() => {}
        None => return Err("text outside of the root element".to_string()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_document() {
        let doc = parse_document(
            r#"<?xml version="1.0"?>
<!-- manifest -->
<DataStore xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
    <Name>Cassandra &amp; co</Name>
    <Empty/>
    <Description><![CDATA[a <b> c]]></Description>
</DataStore>"#,
        )
        .unwrap();

        assert_eq!(doc.name, "DataStore");
        assert_eq!(
            doc.attr("xmlns:xsi"),
            Some("http://www.w3.org/2001/XMLSchema-instance")
        );
        assert_eq!(doc.children.len(), 3);
        assert_eq!(doc.child("Name").unwrap().text, "Cassandra & co");
        assert!(doc.child("Empty").unwrap().text.is_empty());
        assert_eq!(doc.child("Description").unwrap().text, "a <b> c");
        assert!(!doc.has_text());
    }

    #[test]
    fn test_local_names_drop_prefix() {
        let doc = parse_document(r#"<xs:schema xmlns:xs="x"><xs:element name="A"/></xs:schema>"#)
            .unwrap();
        assert_eq!(doc.name, "schema");
        assert_eq!(doc.children[0].name, "element");
        assert_eq!(doc.children[0].attr("name"), Some("A"));
    }

    #[test]
    fn test_rejects_mismatched_tags() {
        assert!(parse_document("<a><b></a></b>").is_err());
    }

    #[test]
    fn test_rejects_unclosed_root() {
        assert!(parse_document("<a><b/>").is_err());
    }

    #[test]
    fn test_rejects_multiple_roots() {
        assert!(parse_document("<a/><b/>").is_err());
    }

    #[test]
    fn test_rejects_empty_document() {
        let err = parse_document("  ").unwrap_err();
        assert!(err.contains("no root element"));
    }
}
