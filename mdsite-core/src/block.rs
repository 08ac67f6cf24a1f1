use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::render::ConvertError;

pub const CODE_FENCE: &str = "```";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Paragraph,
    Heading,
    Code,
    Quote,
    UnorderedList,
    OrderedList,
}

impl BlockKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Paragraph => "paragraph",
            BlockKind::Heading => "heading",
            BlockKind::Code => "code",
            BlockKind::Quote => "quote",
            BlockKind::UnorderedList => "unordered_list",
            BlockKind::OrderedList => "ordered_list",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockKind {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "paragraph" => Ok(BlockKind::Paragraph),
            "heading" => Ok(BlockKind::Heading),
            "code" => Ok(BlockKind::Code),
            "quote" => Ok(BlockKind::Quote),
            "unordered_list" => Ok(BlockKind::UnorderedList),
            "ordered_list" => Ok(BlockKind::OrderedList),
            other => Err(ConvertError::UnknownBlockKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    raw: String,
    kind: BlockKind,
}

impl Block {
    /// Build a block with an explicit kind. The renderer checks that the text
    /// actually has that shape.
    pub fn new(raw: impl Into<String>, kind: BlockKind) -> Self {
        Self {
            raw: raw.into(),
            kind,
        }
    }

    pub fn classified(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let kind = classify(&raw);
        Self { raw, kind }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn kind(&self) -> BlockKind {
        self.kind
    }
}

/// Split a document into raw block strings.
///
/// Blocks are separated by one or more blank (empty or whitespace-only)
/// lines. Lines inside a block are kept exactly as written.
pub fn segment(document: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in document.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current.join("\n"));
    }

    blocks
}

/// Segment and classify a document in one go.
pub fn blocks(document: &str) -> Vec<Block> {
    segment(document).into_iter().map(Block::classified).collect()
}

/// Work out which kind of block `block` is. Anything that matches no rule is
/// a paragraph.
pub fn classify(block: &str) -> BlockKind {
    if block.is_empty() {
        return BlockKind::Paragraph;
    }

    if heading_level(block).is_some() {
        BlockKind::Heading
    } else if block.lines().all(|line| line.starts_with('>')) {
        BlockKind::Quote
    } else if unordered_marker(block).is_some() {
        BlockKind::UnorderedList
    } else if is_ordered_list(block) {
        BlockKind::OrderedList
    } else if block.starts_with(CODE_FENCE) && block.ends_with(CODE_FENCE) {
        BlockKind::Code
    } else {
        BlockKind::Paragraph
    }
}

/// Number of leading `#` when the block opens with a valid heading marker.
pub(crate) fn heading_level(block: &str) -> Option<usize> {
    let level = block.bytes().take_while(|&b| b == b'#').count();
    if (1..=6).contains(&level) && block[level..].starts_with(' ') {
        Some(level)
    } else {
        None
    }
}

/// The `"- "` or `"* "` marker shared by every line, if there is one.
pub(crate) fn unordered_marker(block: &str) -> Option<&'static str> {
    let marker = ["- ", "* "]
        .into_iter()
        .find(|marker| block.starts_with(marker))?;

    block
        .lines()
        .all(|line| line.starts_with(marker))
        .then_some(marker)
}

fn is_ordered_list(block: &str) -> bool {
    block
        .lines()
        .enumerate()
        .all(|(i, line)| line.starts_with(&ordered_marker(i + 1)))
}

pub(crate) fn ordered_marker(number: usize) -> String {
    format!("{number}. ")
}
