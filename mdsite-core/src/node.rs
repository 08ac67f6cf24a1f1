use std::fmt::Write as _;

use serde::{Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeError {
    #[error("leaf node has no value")]
    MissingValue,
    #[error("parent node has no tag")]
    MissingTag,
    #[error("parent node has no children")]
    MissingChildren,
}

/// Element attributes, rendered in the order they were first inserted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name`. An existing name keeps its position and takes the new value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// ` name="value"` for every attribute. Values go out verbatim.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for (name, value) in self.iter() {
            let _ = write!(out, " {name}=\"{value}\"");
        }
        out
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attributes = Attributes::new();
        for (name, value) in iter {
            attributes.insert(name, value);
        }
        attributes
    }
}

impl Serialize for Attributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

/// One node of the rendered output tree.
///
/// Fields that the renderer requires are still optional here so that a
/// hand-built node can be invalid; [`Node::render`] reports that instead of
/// producing broken markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Leaf {
        #[serde(skip_serializing_if = "Option::is_none")]
        tag: Option<String>,
        value: Option<String>,
        #[serde(skip_serializing_if = "Attributes::is_empty")]
        attributes: Attributes,
    },
    Parent {
        tag: Option<String>,
        children: Option<Vec<Node>>,
        #[serde(skip_serializing_if = "Attributes::is_empty")]
        attributes: Attributes,
    },
}

impl Node {
    /// A leaf with no tag: renders as its value and nothing else.
    pub fn text(value: impl Into<String>) -> Self {
        Node::Leaf {
            tag: None,
            value: Some(value.into()),
            attributes: Attributes::new(),
        }
    }

    pub fn leaf(tag: impl Into<String>, value: impl Into<String>) -> Self {
        Node::Leaf {
            tag: Some(tag.into()),
            value: Some(value.into()),
            attributes: Attributes::new(),
        }
    }

    pub fn parent(tag: impl Into<String>, children: Vec<Node>) -> Self {
        Node::Parent {
            tag: Some(tag.into()),
            children: Some(children),
            attributes: Attributes::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        match &mut self {
            Node::Leaf { attributes, .. } | Node::Parent { attributes, .. } => {
                attributes.insert(name, value)
            }
        }
        self
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            Node::Leaf { tag, .. } | Node::Parent { tag, .. } => tag.as_deref(),
        }
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            Node::Leaf { value, .. } => value.as_deref(),
            Node::Parent { .. } => None,
        }
    }

    pub fn children(&self) -> Option<&[Node]> {
        match self {
            Node::Leaf { .. } => None,
            Node::Parent { children, .. } => children.as_deref(),
        }
    }

    pub fn attributes(&self) -> &Attributes {
        match self {
            Node::Leaf { attributes, .. } | Node::Parent { attributes, .. } => attributes,
        }
    }

    pub fn render(&self) -> Result<String, NodeError> {
        let mut out = String::new();
        self.render_into(&mut out)?;
        Ok(out)
    }

    fn render_into(&self, out: &mut String) -> Result<(), NodeError> {
        match self {
            Node::Leaf {
                tag,
                value,
                attributes,
            } => {
                let value = value.as_deref().ok_or(NodeError::MissingValue)?;
                match tag {
                    None => out.push_str(value),
                    Some(tag) => {
                        let _ = write!(out, "<{tag}{}>{value}</{tag}>", attributes.to_html());
                    }
                }
            }
            Node::Parent {
                tag,
                children,
                attributes,
            } => {
                let tag = tag.as_deref().ok_or(NodeError::MissingTag)?;
                let children = children.as_deref().ok_or(NodeError::MissingChildren)?;

                let _ = write!(out, "<{tag}{}>", attributes.to_html());
                for child in children {
                    child.render_into(out)?;
                }
                let _ = write!(out, "</{tag}>");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn attributes_keep_insertion_order() {
        let attributes: Attributes = [("href", "http://boot.dev"), ("some", "other")]
            .into_iter()
            .collect();
        assert_eq!(attributes.to_html(), " href=\"http://boot.dev\" some=\"other\"");
    }

    #[test]
    fn reinserting_an_attribute_keeps_its_slot() {
        let mut attributes = Attributes::new();
        attributes.insert("a", "1");
        attributes.insert("b", "2");
        attributes.insert("a", "3");
        assert_eq!(attributes.to_html(), " a=\"3\" b=\"2\"");
        assert_eq!(attributes.get("a"), Some("3"));
        assert_eq!(attributes.len(), 2);
    }

    #[test]
    fn attribute_values_are_not_escaped() {
        let node = Node::leaf("a", "x").with_attribute("title", "<\"&>");
        assert_eq!(node.render().unwrap(), "<a title=\"<\"&>\">x</a>");
    }

    #[test]
    fn untagged_leaf_renders_value_verbatim() {
        let value = "raw <b>text</b> & \"quotes\"\n";
        assert_eq!(Node::text(value).render().unwrap(), value);
    }

    #[test]
    fn tagged_leaf_with_attributes() {
        let node = Node::leaf("p", "some text")
            .with_attribute("href", "http://boot.dev")
            .with_attribute("some", "other");
        assert_eq!(
            node.render().unwrap(),
            "<p href=\"http://boot.dev\" some=\"other\">some text</p>"
        );
    }

    #[test]
    fn leaf_without_value_fails() {
        let node = Node::Leaf {
            tag: Some("p".into()),
            value: None,
            attributes: Attributes::new(),
        };
        assert_eq!(node.render(), Err(NodeError::MissingValue));
    }

    #[test]
    fn parent_renders_children_in_order() {
        let node = Node::parent(
            "p",
            vec![
                Node::leaf("b", "Bold text"),
                Node::text("Normal text"),
                Node::leaf("i", "italic text"),
                Node::text("Normal text"),
            ],
        );
        assert_eq!(
            node.render().unwrap(),
            "<p><b>Bold text</b>Normal text<i>italic text</i>Normal text</p>"
        );
    }

    #[test]
    fn nested_parents() {
        let inner = Node::parent("p", vec![Node::leaf("b", "Bold text"), Node::text("Normal text")]);
        let outer = Node::parent("div", vec![inner]);
        assert_eq!(
            outer.render().unwrap(),
            "<div><p><b>Bold text</b>Normal text</p></div>"
        );
    }

    #[test]
    fn empty_children_is_legal() {
        assert_eq!(Node::parent("ul", vec![]).render().unwrap(), "<ul></ul>");
    }

    #[test]
    fn parent_without_tag_or_children_fails() {
        let no_tag = Node::Parent {
            tag: None,
            children: Some(vec![]),
            attributes: Attributes::new(),
        };
        assert_eq!(no_tag.render(), Err(NodeError::MissingTag));

        let no_children = Node::Parent {
            tag: Some("div".into()),
            children: None,
            attributes: Attributes::new(),
        };
        assert_eq!(no_children.render(), Err(NodeError::MissingChildren));
    }

    #[test]
    fn child_errors_propagate() {
        let bad = Node::Leaf {
            tag: None,
            value: None,
            attributes: Attributes::new(),
        };
        let node = Node::parent("div", vec![Node::text("ok"), bad]);
        assert_eq!(node.render(), Err(NodeError::MissingValue));
    }

    #[test]
    fn serializes_with_type_tag() {
        let node = Node::parent("p", vec![Node::leaf("a", "x").with_attribute("href", "/")]);
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "parent",
                "tag": "p",
                "children": [
                    { "type": "leaf", "tag": "a", "value": "x", "attributes": { "href": "/" } }
                ]
            })
        );
    }
}
