use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Result, ScrapeError};

/// Attributes of one element, in document order.
#[derive(Debug, Clone, Default)]
pub struct Attrs(Vec<(String, String)>);

impl Attrs {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Owned copy of an optional attribute.
    pub fn opt(&self, key: &str) -> Option<String> {
        self.get(key).map(str::to_string)
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub parent: Option<usize>,
    pub attrs: Attrs,
}

impl Node {
    pub fn require(&self, key: &str) -> Result<&str> {
        self.attrs
            .get(key)
            .ok_or_else(|| ScrapeError::MissingAttribute {
                element: self.name.clone(),
                attr: key.to_string(),
            })
    }
}

/// Flat view of an XML document: every element with its parent link.
///
/// Only element names and attributes are kept; the race pages carry all
/// their data in attributes.
#[derive(Debug, Clone, Default)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        let mut nodes = Vec::new();
        let mut stack: Vec<usize> = Vec::new();

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    nodes.push(node(&e, stack.last().copied())?);
                    stack.push(nodes.len() - 1);
                }
                Event::Empty(e) => nodes.push(node(&e, stack.last().copied())?),
                Event::End(_) => {
                    stack.pop();
                }
                Event::Eof => break,
                _ => {}
            }
        }
        Ok(Self { nodes })
    }

    /// First element with this name anywhere in the document.
    pub fn find(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Every `child` element whose direct parent is a `parent` element.
    pub fn find_all<'a>(&'a self, parent: &'a str, child: &'a str) -> impl Iterator<Item = &'a Node> {
        self.nodes.iter().filter(move |n| {
            n.name == child
                && n.parent
                    .map(|p| self.nodes[p].name == parent)
                    .unwrap_or(false)
        })
    }

    /// Like [`Document::find`], failing when the element is absent.
    pub fn expect(&self, name: &'static str) -> Result<&Node> {
        self.find(name).ok_or(ScrapeError::MissingElement(name))
    }
}

fn node(e: &BytesStart<'_>, parent: Option<usize>) -> Result<Node> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let attrs: Vec<(String, String)> = e
        .attributes()
        .map(|a| -> Result<(String, String)> {
            let a = a.map_err(quick_xml::Error::from)?;
            let key = String::from_utf8_lossy(a.key.as_ref()).into_owned();
            // Unknown HTML entities: keep the raw text.
            let value = match a.unescape_value() {
                Ok(v) => v.into_owned(),
                Err(_) => String::from_utf8_lossy(&a.value).into_owned(),
            };
            Ok((key, value))
        })
        .collect::<Result<_>>()?;
    Ok(Node { name, parent, attrs: Attrs(attrs) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_paths() {
        let doc = Document::parse(
            r#"<d><pts><pt idpt="1" n="A"/><pt idpt="2" n="B"></pt></pts>
               <pass><e idpt="1" tps="01:00:00"/></pass><palm cote="612"><e year="2019"/></palm></d>"#,
        )
        .unwrap();

        let ids: Vec<_> = doc
            .find_all("pts", "pt")
            .map(|n| n.attrs.get("idpt").unwrap())
            .collect();
        assert_eq!(ids, ["1", "2"]);
        assert_eq!(doc.find_all("pass", "e").count(), 1);
        assert_eq!(doc.find_all("palm", "e").count(), 1);
        assert_eq!(doc.find("palm").unwrap().attrs.get("cote"), Some("612"));
    }

    #[test]
    fn missing_element_and_attribute() {
        let doc = Document::parse(r#"<d><state clt="3"/></d>"#).unwrap();
        assert!(matches!(doc.expect("identite"), Err(ScrapeError::MissingElement("identite"))));

        let state = doc.expect("state").unwrap();
        assert_eq!(state.require("clt").unwrap(), "3");
        assert!(state.attrs.get("cltcat").is_none());
        let err = state.require("cltsx").unwrap_err();
        assert!(err.is_schema());
    }

    #[test]
    fn entities_in_attributes() {
        let doc = Document::parse(r#"<d><identite nom="D&apos;ARC" club="A &amp; B" prenom="L&eacute;a"/></d>"#)
            .unwrap();
        let id = doc.find("identite").unwrap();
        assert_eq!(id.attrs.get("nom"), Some("D'ARC"));
        assert_eq!(id.attrs.get("club"), Some("A & B"));
        assert_eq!(id.attrs.get("prenom"), Some("L&eacute;a"));
    }

    #[test]
    fn malformed_markup_is_an_error() {
        let err = Document::parse("<d><pts></d>").unwrap_err();
        assert!(err.is_schema());
    }

    #[test]
    fn malformed_attribute_is_an_error() {
        let err = Document::parse(r#"<d><pt idpt="1" n km="0"/></d>"#).unwrap_err();
        assert!(matches!(err, ScrapeError::Xml(_)));

        let err = Document::parse(r#"<d><identite nom="A" nom="B"/></d>"#).unwrap_err();
        assert!(matches!(err, ScrapeError::Xml(_)));
    }
}
