use std::path::{Path, PathBuf};

use tera::{Context, Tera};
use thiserror::Error;

const PAGE_TEMPLATE: &str = "page.html";
const TITLE: &str = "{{ Title }}";
const CONTENT: &str = "{{ Content }}";

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template error: {0}")]
    Tera(#[from] tera::Error),
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The single page layout every document is rendered into.
///
/// Only the exact tokens `{{ Title }}` and `{{ Content }}` are substituted.
/// Everything else in the layout, including other `{{ }}`, `{% %}` or `{#`
/// sequences, is copied through untouched. Output is not escaped since
/// `Content` is already markup.
pub struct PageTemplate {
    tera: Tera,
}

impl PageTemplate {
    pub fn new(source: &str) -> Result<Self, TemplateError> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.add_raw_template(PAGE_TEMPLATE, &protect_literals(source))?;

        Ok(Self { tera })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TemplateError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| TemplateError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::new(&source)
    }

    /// Render a page with the given title and content markup
    pub fn render(&self, title: &str, content: &str) -> Result<String, TemplateError> {
        let mut context = Context::new();
        context.insert("Title", title);
        context.insert("Content", content);

        Ok(self.tera.render(PAGE_TEMPLATE, &context)?)
    }
}

/// Wrap every stretch of the layout between placeholders in a raw block so
/// tera treats it as plain text.
fn protect_literals(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;

    while let Some((at, token)) = next_placeholder(rest) {
        push_raw(&mut out, &rest[..at]);
        out.push_str(token);
        rest = &rest[at + token.len()..];
    }
    push_raw(&mut out, rest);

    out
}

fn next_placeholder(text: &str) -> Option<(usize, &'static str)> {
    [TITLE, CONTENT]
        .into_iter()
        .filter_map(|token| text.find(token).map(|at| (at, token)))
        .min_by_key(|(at, _)| *at)
}

fn push_raw(out: &mut String, text: &str) {
    if text.is_empty() {
        return;
    }
    // A literal "endraw" would close the block early, so split the word
    // across two raw blocks.
    out.push_str("{% raw %}");
    out.push_str(&text.replace("endraw", "end{% endraw %}{% raw %}raw"));
    out.push_str("{% endraw %}");
}
