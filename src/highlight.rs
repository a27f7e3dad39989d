//! Syntax highlighting for fenced code blocks.
//!
//! Each supported language has one combined regex made of named alternatives
//! (`comment`, `string`, `number`, `ident`, ...). The highlighter walks the
//! source once, left to right: the earliest match wins, its text is wrapped in
//! `<span class="...">`, and everything between matches is emitted escaped.
//! Because a string or comment is consumed as a whole, keywords inside it are
//! never highlighted.
//!
//! Identifiers are classified after matching, with a little context:
//!
//! | Context | Class |
//! |---------|-------|
//! | keyword list of the language | `keyword` |
//! | `true` / `false` / `null` ... | `boolean` |
//! | followed by `(` | `function` |
//! | preceded by `.` | `property` |
//! | command position in shell | `function` |
//!
//! Unsupported languages pass through escaped and unchanged.

use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Languages with a grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    JavaScript,
    Shell,
    Python,
    Json,
    Yaml,
    Plain,
}

impl Language {
    /// Map a fence info tag (`ts`, `bash`, `yml`, ...) to a grammar.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "js" | "javascript" | "jsx" | "mjs" | "cjs" | "ts" | "typescript" | "tsx" => {
                Language::JavaScript
            }
            "bash" | "sh" | "shell" | "zsh" | "console" => Language::Shell,
            "python" | "py" => Language::Python,
            "json" | "jsonc" => Language::Json,
            "yaml" | "yml" => Language::Yaml,
            _ => Language::Plain,
        }
    }
}

const JS_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "case", "catch", "class", "const", "continue", "debugger",
    "default", "delete", "do", "else", "enum", "export", "extends", "finally", "for", "from",
    "function", "if", "implements", "import", "in", "instanceof", "interface", "let", "new", "of",
    "private", "protected", "public", "readonly", "return", "static", "super", "switch", "this",
    "throw", "try", "type", "typeof", "var", "void", "while", "with", "yield",
];
const JS_LITERALS: &[&str] = &["true", "false", "null", "undefined"];

const SHELL_KEYWORDS: &[&str] = &[
    "if", "then", "else", "elif", "fi", "for", "while", "until", "do", "done", "case", "esac",
    "in", "function", "return", "exit", "export", "local", "source",
];

const PYTHON_KEYWORDS: &[&str] = &[
    "and", "as", "assert", "async", "await", "break", "class", "continue", "def", "del", "elif",
    "else", "except", "finally", "for", "from", "global", "if", "import", "in", "is", "lambda",
    "nonlocal", "not", "or", "pass", "raise", "return", "try", "while", "with", "yield", "True",
    "False", "None",
];

static JS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?P<comment>//[^\n]*|/\*[\s\S]*?\*/)|(?P<string>"(?:[^"\\\n]|\\.)*"|'(?:[^'\\\n]|\\.)*'|`(?:[^`\\]|\\[\s\S])*`)|(?P<number>\b(?:0[xX][0-9a-fA-F]+|\d+(?:\.\d+)?(?:[eE][+-]?\d+)?)\b)|(?P<ident>[A-Za-z_$][A-Za-z0-9_$]*)"#,
    )
    .expect("valid regex")
});

static SHELL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?m)^[ \t]*(?P<prompt>[$>])[ \t]|(?P<comment>#[^\n]*)|(?P<string>"(?:[^"\\]|\\[\s\S])*"|'[^']*')|(?P<variable>\$\{?[A-Za-z_][A-Za-z0-9_]*\}?)|(?P<op>\|\||&&|[|;\n])|(?P<flag>--?[A-Za-z][\w-]*)|(?P<word>[A-Za-z0-9_./~+:@%=,-]+)"#,
    )
    .expect("valid regex")
});

static PYTHON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?P<comment>#[^\n]*)|(?P<string>[rbfRBF]?(?:"""[\s\S]*?"""|'''[\s\S]*?'''|"(?:[^"\\\n]|\\.)*"|'(?:[^'\\\n]|\\.)*'))|(?P<number>\b\d+(?:\.\d+)?(?:[eE][+-]?\d+)?\b)|(?P<ident>[A-Za-z_][A-Za-z0-9_]*)"#,
    )
    .expect("valid regex")
});

static JSON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?P<property>"(?:[^"\\]|\\.)*")\s*:|(?P<string>"(?:[^"\\]|\\.)*")|(?P<number>-?\b\d+(?:\.\d+)?(?:[eE][+-]?\d+)?\b)|(?P<boolean>\b(?:true|false|null)\b)"#,
    )
    .expect("valid regex")
});

static YAML_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?m)(?P<comment>#[^\n]*)|^[ \t]*(?:-[ \t]+)?(?P<property>[A-Za-z0-9_.-]+|"[^"\n]*"|'[^'\n]*')[ \t]*:(?:[ \t]|$)|(?P<string>"(?:[^"\\\n]|\\.)*"|'(?:[^'\n]|'')*')|(?P<boolean>\b(?:true|false|null|yes|no|on|off|True|False|Null|TRUE|FALSE)\b)|(?P<number>-?\b\d+(?:\.\d+)?\b)|(?P<scalar>[A-Za-z_/~][^\n#]*)"#,
    )
    .expect("valid regex")
});

const GROUPS: &[&str] = &[
    "prompt", "comment", "property", "string", "variable", "op", "flag", "number", "boolean",
    "ident", "word", "scalar",
];

/// What to do with one regex match.
enum Decision {
    Span(&'static str),
    Plain,
    /// Not a token here; resume scanning one character later.
    Skip,
}

#[derive(Default)]
struct State {
    /// Shell: the next word is a command.
    command_position: bool,
    /// Python: previous identifier was `def`.
    after_def: bool,
}

/// Highlight `code` for the fence tag `lang`, returning escaped HTML.
pub fn highlight(code: &str, lang: &str) -> String {
    let language = Language::from_tag(lang);
    let re: &Regex = match language {
        Language::JavaScript => &*JS_RE,
        Language::Shell => &*SHELL_RE,
        Language::Python => &*PYTHON_RE,
        Language::Json => &*JSON_RE,
        Language::Yaml => &*YAML_RE,
        Language::Plain => return escape_html(code),
    };

    let mut out = String::with_capacity(code.len() * 2);
    let mut emitted = 0;
    let mut search = 0;
    let mut state = State {
        command_position: true,
        after_def: false,
    };

    while search < code.len() {
        let Some(caps) = re.captures_at(code, search) else {
            break;
        };
        let Some(whole) = caps.get(0) else {
            break;
        };
        let Some((group, m)) = matched_group(&caps) else {
            search = next_char_boundary(code, whole.start());
            continue;
        };
        if whole.is_empty() {
            search = next_char_boundary(code, whole.start());
            continue;
        }

        match classify(language, group, code, m.start(), m.end(), &mut state) {
            Decision::Span(class) => {
                out.push_str(&escape_html(&code[emitted..m.start()]));
                out.push_str("<span class=\"");
                out.push_str(class);
                out.push_str("\">");
                out.push_str(&escape_html(m.as_str()));
                out.push_str("</span>");
                emitted = m.end();
                search = whole.end();
            }
            Decision::Plain => search = whole.end(),
            Decision::Skip => search = next_char_boundary(code, m.start()),
        }
    }

    out.push_str(&escape_html(&code[emitted..]));
    out
}

fn matched_group<'h>(caps: &Captures<'h>) -> Option<(&'static str, regex::Match<'h>)> {
    GROUPS
        .iter()
        .find_map(|name| caps.name(name).map(|m| (*name, m)))
}

fn classify(
    language: Language,
    group: &str,
    code: &str,
    start: usize,
    end: usize,
    state: &mut State,
) -> Decision {
    let text = &code[start..end];
    match language {
        Language::JavaScript => match group {
            "comment" => Decision::Span("comment"),
            "string" => Decision::Span("string"),
            "number" => Decision::Span("number"),
            "ident" => classify_identifier(text, code, start, end, JS_KEYWORDS, JS_LITERALS),
            _ => Decision::Plain,
        },
        Language::Python => match group {
            "comment" => Decision::Span("comment"),
            "string" => Decision::Span("string"),
            "number" => Decision::Span("number"),
            "ident" => {
                if state.after_def {
                    state.after_def = false;
                    return Decision::Span("function");
                }
                if text == "def" || text == "class" {
                    state.after_def = text == "def";
                    return Decision::Span("keyword");
                }
                classify_identifier(text, code, start, end, PYTHON_KEYWORDS, &[])
            }
            _ => Decision::Plain,
        },
        Language::Shell => classify_shell(group, text, code, start, state),
        Language::Json => match group {
            "property" => Decision::Span("property"),
            "string" => Decision::Span("string"),
            "number" => Decision::Span("number"),
            "boolean" => Decision::Span("boolean"),
            _ => Decision::Plain,
        },
        Language::Yaml => match group {
            "comment" if preceded_by_space(code, start) => Decision::Span("comment"),
            "comment" => Decision::Skip,
            "property" => Decision::Span("property"),
            "string" | "scalar" => Decision::Span("string"),
            "boolean" => Decision::Span("boolean"),
            "number" => Decision::Span("number"),
            _ => Decision::Plain,
        },
        Language::Plain => Decision::Plain,
    }
}

fn classify_shell(group: &str, text: &str, code: &str, start: usize, state: &mut State) -> Decision {
    match group {
        "prompt" => {
            state.command_position = true;
            Decision::Span("shell-symbol")
        }
        "comment" if preceded_by_space(code, start) => Decision::Span("comment"),
        "comment" => Decision::Skip,
        "string" => {
            state.command_position = false;
            Decision::Span("string")
        }
        "variable" => {
            state.command_position = false;
            Decision::Span("property")
        }
        "op" => {
            state.command_position = true;
            Decision::Plain
        }
        "flag" => Decision::Span("flag"),
        "word" => {
            if SHELL_KEYWORDS.contains(&text) {
                state.command_position = !matches!(text, "in" | "export" | "local" | "return");
                Decision::Span("keyword")
            } else if state.command_position {
                state.command_position = false;
                Decision::Span("function")
            } else if text.bytes().all(|b| b.is_ascii_digit()) {
                Decision::Span("number")
            } else {
                Decision::Plain
            }
        }
        _ => Decision::Plain,
    }
}

fn classify_identifier(
    text: &str,
    code: &str,
    start: usize,
    end: usize,
    keywords: &[&str],
    literals: &[&str],
) -> Decision {
    if literals.contains(&text) {
        return Decision::Span("boolean");
    }
    if keywords.contains(&text) {
        return Decision::Span("keyword");
    }
    if code[end..].trim_start().starts_with('(') {
        return Decision::Span("function");
    }
    if code[..start].ends_with('.') {
        return Decision::Span("property");
    }
    Decision::Plain
}

fn preceded_by_space(code: &str, start: usize) -> bool {
    code[..start]
        .chars()
        .next_back()
        .is_none_or(char::is_whitespace)
}

fn next_char_boundary(code: &str, at: usize) -> usize {
    code[at..]
        .chars()
        .next()
        .map_or(code.len(), |c| at + c.len_utf8())
}

/// Escape the five HTML-significant characters.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
