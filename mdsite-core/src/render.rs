use thiserror::Error;
use tracing::debug;

use crate::block::{self, Block, BlockKind, CODE_FENCE};
use crate::inline::{self, SpanKind, TextSpan};
use crate::node::{Node, NodeError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    #[error("unknown span kind: {0}")]
    UnknownSpanKind(String),
    #[error("unknown block kind: {0}")]
    UnknownBlockKind(String),
    #[error("malformed {kind} block: {reason}")]
    MalformedBlock { kind: BlockKind, reason: String },
    #[error("render error: {0}")]
    Node(#[from] NodeError),
}

impl ConvertError {
    fn malformed(kind: BlockKind, reason: impl Into<String>) -> Self {
        ConvertError::MalformedBlock {
            kind,
            reason: reason.into(),
        }
    }
}

/// Convert a whole document into a single `div` holding one node per block.
///
/// The first block that fails to render aborts the conversion.
pub fn markdown_to_node(document: &str) -> Result<Node, ConvertError> {
    let children = block::blocks(document)
        .iter()
        .map(block_to_node)
        .collect::<Result<Vec<_>, _>>()?;

    debug!(blocks = children.len(), "converted document");
    Ok(Node::parent("div", children))
}

pub fn markdown_to_html(document: &str) -> Result<String, ConvertError> {
    Ok(markdown_to_node(document)?.render()?)
}

pub fn block_to_node(block: &Block) -> Result<Node, ConvertError> {
    let raw = block.raw();
    debug!(kind = %block.kind(), len = raw.len(), "rendering block");

    match block.kind() {
        BlockKind::Paragraph => paragraph_to_node(raw),
        BlockKind::Heading => heading_to_node(raw),
        BlockKind::Code => code_to_node(raw),
        BlockKind::Quote => quote_to_node(raw),
        BlockKind::UnorderedList => unordered_list_to_node(raw),
        BlockKind::OrderedList => ordered_list_to_node(raw),
    }
}

pub fn span_to_node(span: &TextSpan) -> Node {
    let url = span.url().unwrap_or_default();
    match span.kind() {
        SpanKind::Plain => Node::text(span.text()),
        SpanKind::Bold => Node::leaf("b", span.text()),
        SpanKind::Italic => Node::leaf("i", span.text()),
        SpanKind::Code => Node::leaf("code", span.text()),
        SpanKind::Link => Node::leaf("a", span.text()).with_attribute("href", url),
        SpanKind::Image => Node::leaf("img", "")
            .with_attribute("src", url)
            .with_attribute("alt", span.text()),
    }
}

pub fn text_to_children(text: &str) -> Vec<Node> {
    inline::tokenize(text).iter().map(span_to_node).collect()
}

fn paragraph_to_node(raw: &str) -> Result<Node, ConvertError> {
    let text = raw.lines().collect::<Vec<_>>().join(" ");
    Ok(Node::parent("p", text_to_children(&text)))
}

fn heading_to_node(raw: &str) -> Result<Node, ConvertError> {
    let level = block::heading_level(raw)
        .ok_or_else(|| ConvertError::malformed(BlockKind::Heading, "expected 1-6 '#' and a space"))?;

    let text = &raw[level + 1..];
    Ok(Node::parent(format!("h{level}"), text_to_children(text)))
}

fn code_to_node(raw: &str) -> Result<Node, ConvertError> {
    if !raw.starts_with(CODE_FENCE) || !raw.ends_with(CODE_FENCE) {
        return Err(ConvertError::malformed(
            BlockKind::Code,
            "expected an opening and closing fence",
        ));
    }

    // A lone fence is its own opener and closer.
    let inner = raw
        .get(CODE_FENCE.len()..raw.len() - CODE_FENCE.len())
        .unwrap_or_default();
    let inner = inner.strip_prefix('\n').unwrap_or(inner);

    let code = Node::parent("code", text_to_children(inner));
    Ok(Node::parent("pre", vec![code]))
}

fn quote_to_node(raw: &str) -> Result<Node, ConvertError> {
    let mut lines = Vec::new();
    for line in raw.lines() {
        let text = line
            .strip_prefix('>')
            .ok_or_else(|| ConvertError::malformed(BlockKind::Quote, format!("line without '>': {line}")))?;
        lines.push(text.trim_start());
    }

    Ok(Node::parent("blockquote", text_to_children(&lines.join(" "))))
}

fn unordered_list_to_node(raw: &str) -> Result<Node, ConvertError> {
    let marker = block::unordered_marker(raw).ok_or_else(|| {
        ConvertError::malformed(BlockKind::UnorderedList, "lines do not share a '- ' or '* ' marker")
    })?;

    let items = raw
        .lines()
        .map(|line| list_item(&line[marker.len()..]))
        .collect();
    Ok(Node::parent("ul", items))
}

fn ordered_list_to_node(raw: &str) -> Result<Node, ConvertError> {
    let mut items = Vec::new();
    for (i, line) in raw.lines().enumerate() {
        let marker = block::ordered_marker(i + 1);
        let text = line.strip_prefix(marker.as_str()).ok_or_else(|| {
            ConvertError::malformed(BlockKind::OrderedList, format!("expected line to start with '{marker}'"))
        })?;
        items.push(list_item(text));
    }

    Ok(Node::parent("ol", items))
}

fn list_item(text: &str) -> Node {
    Node::parent("li", text_to_children(text))
}
