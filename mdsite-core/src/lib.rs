pub mod block;
pub mod config;
pub mod generator;
pub mod inline;
pub mod node;
pub mod render;
pub mod template;
pub mod title;

// Re-export main types
pub use block::{Block, BlockKind, blocks, classify, segment};
pub use config::Config;
pub use generator::{BuildReport, GenerateError, SiteGenerator, copy_static, generate_page};
pub use inline::{SpanKind, TextSpan, tokenize};
pub use node::{Attributes, Node, NodeError};
pub use render::{ConvertError, block_to_node, markdown_to_html, markdown_to_node};
pub use template::{PageTemplate, TemplateError};
pub use title::{TitleError, extract_title};
