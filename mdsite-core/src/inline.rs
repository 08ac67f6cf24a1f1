use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::render::ConvertError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanKind {
    Plain,
    Bold,
    Italic,
    Code,
    Link,
    Image,
}

impl SpanKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpanKind::Plain => "plain",
            SpanKind::Bold => "bold",
            SpanKind::Italic => "italic",
            SpanKind::Code => "code",
            SpanKind::Link => "link",
            SpanKind::Image => "image",
        }
    }
}

impl fmt::Display for SpanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpanKind {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plain" => Ok(SpanKind::Plain),
            "bold" => Ok(SpanKind::Bold),
            "italic" => Ok(SpanKind::Italic),
            "code" => Ok(SpanKind::Code),
            "link" => Ok(SpanKind::Link),
            "image" => Ok(SpanKind::Image),
            other => Err(ConvertError::UnknownSpanKind(other.to_string())),
        }
    }
}

/// A run of inline text with a single formatting kind.
///
/// Links and images always carry a url, every other kind never does. The
/// constructors are the only way to build a span, so that holds for every
/// value in circulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextSpan {
    text: String,
    kind: SpanKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
}

impl TextSpan {
    fn new(text: impl Into<String>, kind: SpanKind) -> Self {
        Self {
            text: text.into(),
            kind,
            url: None,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, SpanKind::Plain)
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self::new(text, SpanKind::Bold)
    }

    pub fn italic(text: impl Into<String>) -> Self {
        Self::new(text, SpanKind::Italic)
    }

    pub fn code(text: impl Into<String>) -> Self {
        Self::new(text, SpanKind::Code)
    }

    pub fn link(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: SpanKind::Link,
            url: Some(url.into()),
        }
    }

    pub fn image(alt: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: alt.into(),
            kind: SpanKind::Image,
            url: Some(url.into()),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> SpanKind {
        self.kind
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    fn is_plain(&self) -> bool {
        self.kind == SpanKind::Plain
    }

    // Only used by the delimiter splitter, which never builds links or images.
    fn with_kind(text: &str, kind: SpanKind) -> Self {
        Self::new(text, kind)
    }
}

/// Tokenize one run of block text into inline spans.
///
/// Stages run in a fixed order and each only re-splits spans that are still
/// plain: bold, italic, inline code, images, then links. Images have to go
/// before links because `![alt](url)` contains a link pattern.
pub fn tokenize(text: &str) -> Vec<TextSpan> {
    let spans = vec![TextSpan::plain(text)];
    let spans = split_delimiter(spans, "**", SpanKind::Bold);
    let spans = split_delimiter(spans, "*", SpanKind::Italic);
    let spans = split_delimiter(spans, "`", SpanKind::Code);
    let spans = split_images(spans);
    split_links(spans)
}

/// Promote the text between a pair of delimiters to `kind`.
///
/// A plain span is only split when it holds the delimiter exactly twice. Any
/// other count leaves it untouched, so a stray `*` stays literal text.
pub fn split_delimiter(spans: Vec<TextSpan>, delimiter: &str, kind: SpanKind) -> Vec<TextSpan> {
    let mut out = Vec::with_capacity(spans.len());

    for span in spans {
        if !span.is_plain() || span.text.matches(delimiter).count() != 2 {
            out.push(span);
            continue;
        }

        let Some((before, rest)) = span.text.split_once(delimiter) else {
            out.push(span);
            continue;
        };
        let Some((inside, after)) = rest.split_once(delimiter) else {
            out.push(span);
            continue;
        };

        if !before.is_empty() {
            out.push(TextSpan::plain(before));
        }
        out.push(TextSpan::with_kind(inside, kind));
        if !after.is_empty() {
            out.push(TextSpan::plain(after));
        }
    }

    out
}

/// Replace every `![alt](url)` inside plain spans with an image span.
pub fn split_images(spans: Vec<TextSpan>) -> Vec<TextSpan> {
    split_pattern(spans, "![", |alt, url| TextSpan::image(alt, url))
}

/// Replace every `[anchor](url)` inside plain spans with a link span.
pub fn split_links(spans: Vec<TextSpan>) -> Vec<TextSpan> {
    split_pattern(spans, "[", |text, url| TextSpan::link(text, url))
}

/// All `(alt, url)` pairs of image syntax in `text`, left to right.
pub fn extract_images(text: &str) -> Vec<(String, String)> {
    scan(text, "![")
        .into_iter()
        .map(|m| (m.text.to_string(), m.url.to_string()))
        .collect()
}

/// All `(anchor, url)` pairs of link syntax in `text`, left to right.
///
/// Image syntax also matches here (without its `!`), which is why the
/// tokenizer extracts images first.
pub fn extract_links(text: &str) -> Vec<(String, String)> {
    scan(text, "[")
        .into_iter()
        .map(|m| (m.text.to_string(), m.url.to_string()))
        .collect()
}

fn split_pattern(
    spans: Vec<TextSpan>,
    opener: &str,
    make: fn(String, String) -> TextSpan,
) -> Vec<TextSpan> {
    let mut out = Vec::with_capacity(spans.len());

    for span in spans {
        if !span.is_plain() {
            out.push(span);
            continue;
        }

        let matches = scan(&span.text, opener);
        if matches.is_empty() {
            out.push(span);
            continue;
        }

        let mut cursor = 0;
        for m in matches {
            if m.start > cursor {
                out.push(TextSpan::plain(&span.text[cursor..m.start]));
            }
            out.push(make(m.text.to_string(), m.url.to_string()));
            cursor = m.end;
        }
        if cursor < span.text.len() {
            out.push(TextSpan::plain(&span.text[cursor..]));
        }
    }

    out
}

#[derive(Debug)]
struct PatternMatch<'a> {
    start: usize,
    end: usize,
    text: &'a str,
    url: &'a str,
}

// Forward scan for `<opener>text](url)`. Neither part may cross a line break;
// both stop at the first closing token, like a lazy `\[(.*?)\]\((.*?)\)`.
fn scan<'a>(text: &'a str, opener: &str) -> Vec<PatternMatch<'a>> {
    let mut matches = Vec::new();
    let mut pos = 0;

    while let Some(offset) = text[pos..].find(opener) {
        let start = pos + offset;
        match match_at(text, start, opener.len()) {
            Some(m) => {
                pos = m.end;
                matches.push(m);
            }
            // Openers are ASCII, so one byte on is still a char boundary.
            None => pos = start + 1,
        }
    }

    matches
}

fn match_at<'a>(text: &'a str, start: usize, opener_len: usize) -> Option<PatternMatch<'a>> {
    let body_start = start + opener_len;
    let rest = &text[body_start..];
    let line = rest.find('\n').map_or(rest, |nl| &rest[..nl]);

    let close = line.find("](")?;
    let url_start = close + 2;
    let url_len = line[url_start..].find(')')?;
    let end = url_start + url_len + 1;

    Some(PatternMatch {
        start,
        end: body_start + end,
        text: &line[..close],
        url: &line[url_start..url_start + url_len],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn splits_italic_in_the_middle() {
        let spans = split_delimiter(vec![TextSpan::plain("Some *text* here")], "*", SpanKind::Italic);
        assert_eq!(
            spans,
            vec![
                TextSpan::plain("Some "),
                TextSpan::italic("text"),
                TextSpan::plain(" here"),
            ]
        );
    }

    #[test]
    fn delimiter_at_the_edges_leaves_no_empty_plain() {
        let spans = split_delimiter(vec![TextSpan::plain("Some *text*")], "*", SpanKind::Italic);
        assert_eq!(spans, vec![TextSpan::plain("Some "), TextSpan::italic("text")]);

        let spans = split_delimiter(vec![TextSpan::plain("*Some* text")], "*", SpanKind::Italic);
        assert_eq!(spans, vec![TextSpan::italic("Some"), TextSpan::plain(" text")]);
    }

    #[rstest]
    #[case("*Some text")]
    #[case("a *b* c *d")]
    #[case("*a* *b* *c*")]
    fn delimiter_count_other_than_two_passes_through(#[case] text: &str) {
        let spans = split_delimiter(vec![TextSpan::plain(text)], "*", SpanKind::Italic);
        assert_eq!(spans, vec![TextSpan::plain(text)]);
    }

    #[test]
    fn non_plain_spans_are_not_resplit() {
        let spans = split_delimiter(vec![TextSpan::code("a *b* c")], "*", SpanKind::Italic);
        assert_eq!(spans, vec![TextSpan::code("a *b* c")]);
    }

    #[test]
    fn images_and_links_stay_inside_non_plain_spans() {
        let spans = vec![TextSpan::code("[a](u)"), TextSpan::bold("![i](v)")];
        assert_eq!(split_images(spans.clone()), spans);
        assert_eq!(split_links(spans.clone()), spans);

        assert_eq!(
            tokenize("see `[a](u)` here"),
            vec![
                TextSpan::plain("see "),
                TextSpan::code("[a](u)"),
                TextSpan::plain(" here"),
            ]
        );
    }

    #[test]
    fn bold_runs_before_italic() {
        assert_eq!(
            tokenize("a **b** c"),
            vec![TextSpan::plain("a "), TextSpan::bold("b"), TextSpan::plain(" c")]
        );
    }

    #[test]
    fn tokenize_mixes_every_kind() {
        let spans = tokenize("**bold** then *it* then `code` ![pic](p.png) and [site](https://x.io)");
        assert_eq!(
            spans,
            vec![
                TextSpan::bold("bold"),
                TextSpan::plain(" then "),
                TextSpan::italic("it"),
                TextSpan::plain(" then "),
                TextSpan::code("code"),
                TextSpan::plain(" "),
                TextSpan::image("pic", "p.png"),
                TextSpan::plain(" and "),
                TextSpan::link("site", "https://x.io"),
            ]
        );
    }

    #[rstest]
    #[case("")]
    #[case("nothing special here")]
    #[case("brackets [without] a url")]
    fn delimiter_free_text_is_unchanged(#[case] text: &str) {
        assert_eq!(tokenize(text), vec![TextSpan::plain(text)]);
    }

    #[test]
    fn extracts_single_and_multiple_images() {
        assert_eq!(
            extract_images("![image](https://image.com)"),
            vec![("image".to_string(), "https://image.com".to_string())]
        );
        assert_eq!(
            extract_images("![image](https://image.com) ![another](https://another.com)"),
            vec![
                ("image".to_string(), "https://image.com".to_string()),
                ("another".to_string(), "https://another.com".to_string()),
            ]
        );
    }

    #[test]
    fn extracts_links() {
        assert_eq!(
            extract_links("[image](https://image.com) [another](https://another.com)"),
            vec![
                ("image".to_string(), "https://image.com".to_string()),
                ("another".to_string(), "https://another.com".to_string()),
            ]
        );
    }

    #[test]
    fn pattern_does_not_cross_lines() {
        assert!(extract_links("[a\nb](u)").is_empty());
        assert!(extract_links("[a](u\n)").is_empty());
    }

    #[test]
    fn image_at_start_has_no_leading_plain() {
        let spans = split_images(vec![TextSpan::plain("![alt](http://x) more")]);
        assert_eq!(spans, vec![TextSpan::image("alt", "http://x"), TextSpan::plain(" more")]);
    }

    #[test]
    fn image_keeps_surrounding_text_in_order() {
        let spans = split_images(vec![TextSpan::plain(
            "This is an image ![link](https://image.com) more text ![another](https://another.com) the end",
        )]);
        assert_eq!(
            spans,
            vec![
                TextSpan::plain("This is an image "),
                TextSpan::image("link", "https://image.com"),
                TextSpan::plain(" more text "),
                TextSpan::image("another", "https://another.com"),
                TextSpan::plain(" the end"),
            ]
        );
    }

    #[test]
    fn image_is_never_read_as_a_link() {
        let spans = tokenize("see ![a](u) and [b](v)");
        assert_eq!(
            spans,
            vec![
                TextSpan::plain("see "),
                TextSpan::image("a", "u"),
                TextSpan::plain(" and "),
                TextSpan::link("b", "v"),
            ]
        );
    }

    #[test]
    fn link_at_end_has_no_trailing_plain() {
        let spans = split_links(vec![TextSpan::plain("go [home](/)")]);
        assert_eq!(spans, vec![TextSpan::plain("go "), TextSpan::link("home", "/")]);
    }

    #[test]
    fn url_is_only_set_for_links_and_images() {
        for span in tokenize("**b** *i* `c` ![a](u) [l](v) plain") {
            let has_url = matches!(span.kind(), SpanKind::Link | SpanKind::Image);
            assert_eq!(span.url().is_some(), has_url, "{span:?}");
        }
    }

    #[test]
    fn kind_names_parse_back() {
        for kind in [
            SpanKind::Plain,
            SpanKind::Bold,
            SpanKind::Italic,
            SpanKind::Code,
            SpanKind::Link,
            SpanKind::Image,
        ] {
            assert_eq!(kind.as_str().parse::<SpanKind>().ok(), Some(kind));
        }
        assert!(matches!(
            "underline".parse::<SpanKind>(),
            Err(ConvertError::UnknownSpanKind(name)) if name == "underline"
        ));
    }
}
