//! Markdown/MDX to HTML.
//!
//! Documents are parsed with `pulldown-cmark` and the event stream is
//! rewritten before rendering:
//!
//! ```text
//! source ──strip_mdx──> markdown ──Parser──> events ──rewrite──> push_html
//!                                              │
//!                                              ├─ headings    id + anchor, recorded for the TOC
//!                                              ├─ code blocks highlighted, never re-parsed
//!                                              ├─ tables      wrapped for horizontal scroll
//!                                              ├─ html spans  JSX components → plain HTML
//!                                              └─ links       /docs/<slug> → /docs/<slug>.html
//! ```
//!
//! Since code is a separate node in the parse tree, nothing inside a fence is
//! ever treated as Markdown, JSX, or a heading.
//!
//! ## MDX Subset
//!
//! Only what a static page can express survives: top-level `import`/`export`
//! statements and `{/* comments */}` are dropped, and a fixed set of UI
//! components (`Card`, `Callout`, `Alert`, `Badge`, `Tabs`, ...) becomes
//! classed HTML. Unknown components become `<div data-component="Name">` so
//! their children still render.

use crate::highlight::{self, escape_html};
use crate::slug::{Slugger, slugify};
use pulldown_cmark::{CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd, html};
use regex::{Captures, Regex};
use serde::Serialize;
use std::sync::LazyLock;

/// A heading found while rendering, in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    /// 1 for `#`, 2 for `##`, ...
    pub depth: u8,
    pub text: String,
    /// Anchor id, unique within the document.
    pub id: String,
}

#[derive(Debug, Clone, Default)]
pub struct RenderedDoc {
    pub html: String,
    pub headings: Vec<Heading>,
}

impl RenderedDoc {
    /// Headings within `[min_depth, max_depth]`, still in source order.
    pub fn toc(&self, min_depth: u8, max_depth: u8) -> Vec<&Heading> {
        self.headings
            .iter()
            .filter(|h| h.depth >= min_depth && h.depth <= max_depth)
            .collect()
    }
}

fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES
}

/// Render a document body (frontmatter already removed) to HTML.
pub fn render(source: &str) -> RenderedDoc {
    let cleaned = strip_mdx(source);
    let mut slugger = Slugger::new();
    let mut headings = Vec::new();
    let mut events: Vec<Event> = Vec::new();

    let mut heading: Option<(u8, Vec<Event>)> = None;
    let mut code_lang: Option<String> = None;
    let mut code_text = String::new();

    for event in Parser::new_ext(&cleaned, options()) {
        if let Some(lang) = &code_lang {
            match event {
                Event::Text(text) => code_text.push_str(&text),
                Event::End(TagEnd::CodeBlock) => {
                    events.push(Event::Html(code_block_html(lang, &code_text).into()));
                    code_lang = None;
                    code_text.clear();
                }
                _ => {}
            }
            continue;
        }

        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                code_lang = Some(match kind {
                    CodeBlockKind::Fenced(info) => fence_language(&info),
                    CodeBlockKind::Indented => "text".to_string(),
                });
            }
            Event::Start(Tag::Heading { level, .. }) => {
                heading = Some((heading_depth(level), Vec::new()));
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((depth, inner)) = heading.take() {
                    let text = heading_text(&inner);
                    let id = slugger.slug(&text);
                    events.push(Event::Html(format!("<h{depth} id=\"{id}\">").into()));
                    events.extend(inner);
                    events.push(Event::Html(
                        format!(
                            "<a class=\"heading-anchor\" href=\"#{id}\" aria-label=\"Link to this section\">#</a></h{depth}>\n"
                        )
                        .into(),
                    ));
                    headings.push(Heading { depth, text, id });
                }
            }
            Event::Start(Tag::Table(alignments)) => {
                events.push(Event::Html("<div class=\"table-wrapper\">\n".into()));
                events.push(Event::Start(Tag::Table(alignments)));
            }
            Event::End(TagEnd::Table) => {
                events.push(Event::End(TagEnd::Table));
                events.push(Event::Html("</div>\n".into()));
            }
            other => {
                let other = rewrite_event(other);
                match heading.as_mut() {
                    Some((_, inner)) => inner.push(other),
                    None => events.push(other),
                }
            }
        }
    }

    let mut out = String::with_capacity(cleaned.len() * 3 / 2);
    html::push_html(&mut out, events.into_iter());
    RenderedDoc {
        html: out,
        headings,
    }
}

/// Visible text of a document, without code blocks or markup, whitespace collapsed.
pub fn plain_text(source: &str) -> String {
    let cleaned = strip_mdx(source);
    let mut out = String::new();
    let mut in_code = false;
    for event in Parser::new_ext(&cleaned, options()) {
        match event {
            Event::Start(Tag::CodeBlock(_)) => in_code = true,
            Event::End(TagEnd::CodeBlock) => in_code = false,
            Event::Text(text) | Event::Code(text) if !in_code => out.push_str(&text),
            Event::SoftBreak | Event::HardBreak => out.push(' '),
            Event::End(
                TagEnd::Paragraph
                | TagEnd::Heading(_)
                | TagEnd::Item
                | TagEnd::TableCell
                | TagEnd::BlockQuote(_),
            ) => out.push(' '),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn heading_depth(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn heading_text(events: &[Event]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            _ => {}
        }
    }
    text.trim().to_string()
}

fn fence_language(info: &str) -> String {
    let tag: String = info
        .split_whitespace()
        .next()
        .unwrap_or("")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+'))
        .collect();
    if tag.is_empty() {
        "text".to_string()
    } else {
        tag.to_ascii_lowercase()
    }
}

fn code_block_html(lang: &str, code: &str) -> String {
    format!(
        "<div class=\"code-block\" data-language=\"{lang}\"><div class=\"code-block-header\"><span class=\"code-block-language\">{lang}</span><button class=\"copy-button\" type=\"button\" aria-label=\"Copy code\">Copy</button></div><pre><code class=\"language-{lang}\">{}</code></pre></div>\n",
        highlight::highlight(code, lang)
    )
}

fn rewrite_event(event: Event) -> Event {
    match event {
        Event::Html(raw) => Event::Html(rewrite_jsx(&raw).into()),
        Event::InlineHtml(raw) => Event::InlineHtml(rewrite_jsx(&raw).into()),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: CowStr::from(rewrite_link(&dest_url)),
            title,
            id,
        }),
        other => other,
    }
}

/// Point extensionless `/docs/<slug>` links at the generated `.html` file.
pub fn rewrite_link(dest: &str) -> String {
    let Some(rest) = dest.strip_prefix("/docs/") else {
        return dest.to_string();
    };
    let (path, fragment) = match rest.find(['#', '?']) {
        Some(i) => rest.split_at(i),
        None => (rest, ""),
    };
    if path.is_empty() || path.ends_with('/') || path.rsplit('/').next().is_some_and(|s| s.contains('.')) {
        return dest.to_string();
    }
    format!("/docs/{path}.html{fragment}")
}

// ============================================================================
// MDX preprocessing
// ============================================================================

static JSX_COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{/\*[\s\S]*?\*/\}").expect("valid regex"));

/// A line holding exactly one component open, close, or self-closing tag.
static BLOCK_TAG_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^</?[A-Z][A-Za-z0-9]*(?:[^>"'{]|"[^"]*"|'[^']*'|\{[^}]*\})*/?>$"#)
        .expect("valid regex")
});

/// Drop top-level `import`/`export` statements and JSX comments, leaving
/// fenced code untouched. Component tags that stand alone on a line are
/// set off by blank lines so the Markdown between them is still parsed.
pub fn strip_mdx(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut fence: Option<(char, usize)> = None;
    let mut brace_depth: i32 = 0;
    let mut in_statement = false;

    for line in source.split_inclusive('\n') {
        let trimmed = line.trim_start();

        if let Some((marker, len)) = fence {
            if closes_fence(trimmed, marker, len) {
                fence = None;
            }
            out.push_str(line);
            continue;
        }
        if let Some(opened) = opens_fence(line) {
            fence = Some(opened);
            out.push_str(line);
            continue;
        }

        if in_statement {
            brace_depth += brace_delta(line);
            in_statement = brace_depth > 0;
            continue;
        }
        if line.starts_with("import ") || line.starts_with("export ") {
            brace_depth = brace_delta(line);
            in_statement = brace_depth > 0;
            continue;
        }

        if BLOCK_TAG_LINE_RE.is_match(line.trim()) {
            // A tag alone on its line must not swallow the Markdown after it
            // into a raw HTML block.
            if !out.is_empty() && !out.ends_with("\n\n") {
                out.push('\n');
            }
            out.push_str(line.trim_end());
            out.push_str("\n\n");
            continue;
        }

        out.push_str(&JSX_COMMENT_RE.replace_all(line, ""));
    }
    out
}

fn opens_fence(line: &str) -> Option<(char, usize)> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent > 3 {
        return None;
    }
    let trimmed = &line[indent..];
    let marker = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = trimmed.chars().take_while(|c| *c == marker).count();
    (len >= 3).then_some((marker, len))
}

fn closes_fence(trimmed: &str, marker: char, len: usize) -> bool {
    let body = trimmed.trim_end();
    body.chars().count() >= len && body.chars().all(|c| c == marker)
}

fn brace_delta(line: &str) -> i32 {
    line.chars().fold(0, |acc, c| match c {
        '{' => acc + 1,
        '}' => acc - 1,
        _ => acc,
    })
}

// ============================================================================
// JSX components
// ============================================================================

static COMPONENT_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<(/?)([A-Z][A-Za-z0-9]*)((?:[^>"'{]|"[^"]*"|'[^']*'|\{[^}]*\})*?)(/?)>"#)
        .expect("valid regex")
});

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z_][A-Za-z0-9_:.-]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|\{([^}]*)\}))?"#)
        .expect("valid regex")
});

/// HTML element and base class for each known component.
fn component(name: &str) -> Option<(&'static str, &'static str)> {
    let mapped = match name {
        "Card" => ("div", "card"),
        "CardHeader" => ("div", "card-header"),
        "CardTitle" => ("h3", "card-title"),
        "CardDescription" => ("p", "card-description"),
        "CardContent" => ("div", "card-content"),
        "CardFooter" => ("div", "card-footer"),
        "Callout" => ("div", "callout"),
        "Alert" => ("div", "alert"),
        "AlertTitle" => ("h5", "alert-title"),
        "AlertDescription" => ("div", "alert-description"),
        "Badge" => ("span", "badge"),
        "Button" => ("a", "button"),
        "Separator" => ("hr", "separator"),
        "Tabs" => ("div", "tabs"),
        "TabsList" => ("div", "tabs-list"),
        "TabsTrigger" => ("button", "tabs-trigger"),
        "TabsContent" => ("div", "tabs-content"),
        _ => return None,
    };
    Some(mapped)
}

/// Rewrite JSX component tags and React attribute names into plain HTML.
pub fn rewrite_jsx(raw: &str) -> String {
    let rewritten = COMPONENT_TAG_RE.replace_all(raw, |caps: &Captures| component_tag(caps));
    rewritten
        .replace("className=", "class=")
        .replace("htmlFor=", "for=")
}

fn component_tag(caps: &Captures) -> String {
    let closing = !caps[1].is_empty();
    let name = &caps[2];
    let known = component(name);
    let (tag, base_class) = known.unwrap_or(("div", "component"));
    let void = tag == "hr";

    if closing {
        return if void {
            String::new()
        } else {
            format!("</{tag}>")
        };
    }

    let mut classes = vec![base_class.to_string()];
    let mut attrs: Vec<(String, String)> = Vec::new();
    let mut title = None;
    if known.is_none() {
        attrs.push(("data-component".to_string(), name.to_string()));
    }

    for attr in ATTR_RE.captures_iter(&caps[3]) {
        let key = &attr[1];
        let literal = attr.get(2).or_else(|| attr.get(3)).map(|m| m.as_str());
        let is_expression = attr.get(4).is_some();
        match (key, literal) {
            ("className" | "class", Some(value)) => {
                classes.extend(value.split_whitespace().map(str::to_string));
            }
            ("variant" | "type", Some(value)) => {
                classes.push(format!("{base_class}-{}", slugify(value)));
            }
            ("title", Some(value)) if matches!(name, "Callout" | "Alert") => title = Some(value),
            ("value", Some(value)) => attrs.push(("data-value".to_string(), value.to_string())),
            ("defaultValue", Some(value)) => {
                attrs.push(("data-default-value".to_string(), value.to_string()))
            }
            (_, Some(value)) => attrs.push((key.to_string(), value.to_string())),
            (_, None) if !is_expression => attrs.push((key.to_string(), String::new())),
            _ => {}
        }
    }

    let mut out = format!("<{tag} class=\"{}\"", escape_html(&classes.join(" ")));
    for (key, value) in &attrs {
        if value.is_empty() {
            out.push_str(&format!(" {key}"));
        } else {
            out.push_str(&format!(" {key}=\"{}\"", escape_html(value)));
        }
    }
    out.push('>');

    if let Some(title) = title {
        out.push_str(&format!(
            "<p class=\"{base_class}-title\">{}</p>",
            escape_html(title)
        ));
    }
    if !caps[4].is_empty() && !void {
        out.push_str(&format!("</{tag}>"));
    }
    out
}
