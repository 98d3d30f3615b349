/*!
 * Tag-stripping and escaping helpers for inline segment content.
 *
 * Everything here operates on raw markup as stored in the model (entities
 * still escaped). The stripping functions produce lossy projections that are
 * only used to decide whether a segment carries translatable text; they are
 * never fed back into the document. Inline-code tokenizing is lossless:
 * every tag is kept and restored verbatim.
 */

use std::borrow::Cow;
use std::collections::HashSet;

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::InlineCodeError;

// @const: Any markup tag, matched lazily across line breaks
static TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<.*?>").expect("Invalid tag regex")
});

// @const: Standalone legacy placeholder such as {3}
static STANDALONE_PLACEHOLDER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\d+\}").expect("Invalid standalone placeholder regex")
});

// @const: Legacy open marker {N> or close marker <N}, escaped or not
static LEGACY_MARKER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{(\d+)(?:&gt;|>)|(?:&lt;|<)(\d+)\}").expect("Invalid legacy marker regex")
});

// @const: One inline code: a comment, a CDATA section or any tag
static INLINE_CODE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<!--.*?-->|<!\[CDATA\[.*?\]\]>|<[^>]*>").expect("Invalid inline code regex")
});

// @const: Local element name of a start or end tag
static TAG_NAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^</?\s*(?:[\w.-]+:)?([A-Za-z][\w.-]*)").expect("Invalid tag name regex")
});

// @const: Value of an `id` attribute
static ID_ATTR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\sid\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("Invalid id attribute regex")
});

// @const: Anything shaped like an inline code token: {g1>, <g1} or {x2}
static CODE_TOKEN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{[A-Za-z][\w.-]*[>}]|<[A-Za-z][\w.-]*\}").expect("Invalid code token regex")
});

/// Role of an inline code inside a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeKind {
    Open,
    Close,
    Standalone,
}

/// One inline code and the raw markup it stands for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineCode {
    /// Element local name plus id, e.g. `g1`; unique within a segment
    pub key: String,
    pub kind: CodeKind,
    pub raw: String,
}

impl InlineCode {
    /// Token shown to translators: `{g1>`, `<g1}` or `{x2}`
    pub fn token(&self) -> String {
        match self.kind {
            CodeKind::Open => format!("{{{}>", self.key),
            CodeKind::Close => format!("<{}}}", self.key),
            CodeKind::Standalone => format!("{{{}}}", self.key),
        }
    }
}

/// Editable text with inline codes replaced by tokens
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaggedText {
    /// Unescaped text with a token in place of each code
    pub text: String,
    /// Codes in document order
    pub codes: Vec<InlineCode>,
}

/// Result of scanning text for legacy `{N>...<N}` placeholder pairs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyScan {
    /// Text with every complete pair removed
    pub text: String,
    /// Number of pairs removed
    pub pairs: usize,
    /// Open or close markers left without a partner
    pub unmatched: usize,
}

#[derive(Debug, Clone, Copy)]
enum LegacyMarker {
    Open { number: u32, start: usize },
    Close { number: u32, end: usize },
}

/// Remove every tag, keeping surrounding whitespace
pub fn remove_tags(markup: &str) -> String {
    TAG_REGEX.replace_all(markup, "").into_owned()
}

/// Remove every `<...>` span and trim the result
pub fn strip_all_tags(markup: &str) -> String {
    remove_tags(markup).trim().to_string()
}

/// Remove standalone `{N}` placeholder tokens
pub fn strip_standalone_placeholders(text: &str) -> String {
    STANDALONE_PLACEHOLDER_REGEX.replace_all(text, "").into_owned()
}

/// Remove each complete `{N>...<N}` span, inner content included.
///
/// Pairs may nest or follow each other; markers without a partner are left
/// in place.
pub fn strip_legacy_placeholder_pairs(text: &str) -> String {
    scan_legacy_placeholders(text).text
}

/// Pair legacy markers in a single pass.
///
/// A close marker pairs with the earliest still-open marker carrying the same
/// number, and every marker opened after that one disappears with the span.
/// This gives the same result as repeatedly deleting the leftmost shortest
/// complete pair.
pub fn scan_legacy_placeholders(text: &str) -> LegacyScan {
    let markers: Vec<LegacyMarker> = LEGACY_MARKER_REGEX
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            if let Some(number) = caps.get(1) {
                Some(LegacyMarker::Open {
                    number: number.as_str().parse().ok()?,
                    start: whole.start(),
                })
            } else {
                Some(LegacyMarker::Close {
                    number: caps.get(2)?.as_str().parse().ok()?,
                    end: whole.end(),
                })
            }
        })
        .collect();

    let mut open: Vec<(u32, usize)> = Vec::new();
    let mut spans: Vec<(usize, usize)> = Vec::new();
    let mut unmatched_closes = 0;

    for marker in markers {
        match marker {
            LegacyMarker::Open { number, start } => open.push((number, start)),
            LegacyMarker::Close { number, end } => {
                match open.iter().position(|&(n, _)| n == number) {
                    Some(index) => {
                        let (_, start) = open[index];
                        open.truncate(index);
                        spans.push((start, end));
                    }
                    None => unmatched_closes += 1,
                }
            }
        }
    }

    // Later pairs may enclose earlier ones
    spans.sort_unstable();
    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(spans.len());
    for (start, end) in spans.iter().copied() {
        match merged.last_mut() {
            Some(last) if start < last.1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }

    let mut stripped = String::with_capacity(text.len());
    let mut cursor = 0;
    for (start, end) in &merged {
        stripped.push_str(&text[cursor..*start]);
        cursor = *end;
    }
    stripped.push_str(&text[cursor..]);

    let scan = LegacyScan {
        text: stripped,
        pairs: spans.len(),
        unmatched: open.len() + unmatched_closes,
    };
    if scan.unmatched > 0 {
        debug!("{} unpaired legacy placeholder marker(s) in {:?}", scan.unmatched, text);
    }
    scan
}

/// True when nothing but inline codes remains once tags and legacy
/// placeholders are removed
pub fn is_tag_only(source_plain: &str) -> bool {
    let without_pairs = strip_legacy_placeholder_pairs(source_plain);
    strip_standalone_placeholders(&without_pairs).trim().is_empty()
}

/// Escape text for use as element content (`&`, `<` and `>` only)
pub fn escape_text(text: &str) -> Cow<'_, str> {
    quick_xml::escape::partial_escape(text)
}

/// Resolve entities in raw text; malformed references are kept verbatim
pub fn unescape_text(raw: &str) -> Cow<'_, str> {
    quick_xml::escape::unescape(raw).unwrap_or(Cow::Borrowed(raw))
}

/// Natural-language projection of raw inline markup
pub fn plain_text(markup: &str) -> String {
    let without_tags = remove_tags(markup);
    unescape_text(&without_tags).into_owned()
}

/// Replace every inline code of raw markup with a token and unescape the rest.
///
/// `Click <g id="1">here</g> now<x id="2"/>` becomes
/// `Click {g1>here<g1} now{x2}`.
pub fn tag_inline_codes(markup: &str) -> TaggedText {
    let mut tagged = TaggedText::default();
    let mut used = HashSet::new();
    let mut open: Vec<String> = Vec::new();
    let mut cursor = 0;

    for found in INLINE_CODE_REGEX.find_iter(markup) {
        tagged.text.push_str(&unescape_text(&markup[cursor..found.start()]));
        cursor = found.end();

        let raw = found.as_str();
        let (kind, key) = if raw.starts_with("</") {
            match open.pop() {
                Some(key) => (CodeKind::Close, key),
                None => (CodeKind::Standalone, code_key(raw, &mut used)),
            }
        } else if raw.starts_with("<!") || raw.starts_with("<?") || raw.ends_with("/>") {
            (CodeKind::Standalone, code_key(raw, &mut used))
        } else {
            let key = code_key(raw, &mut used);
            open.push(key.clone());
            (CodeKind::Open, key)
        };

        let code = InlineCode { key, kind, raw: raw.to_string() };
        tagged.text.push_str(&code.token());
        tagged.codes.push(code);
    }
    tagged.text.push_str(&unescape_text(&markup[cursor..]));
    tagged
}

/// Rebuild raw markup from edited tagged text.
///
/// Every code of `exported` must appear exactly once, and paired codes must
/// open before they close and nest properly. Token-shaped text that was
/// already present in the exported text is kept as literal text.
pub fn restore_inline_codes(edited: &str, exported: &TaggedText) -> Result<String, InlineCodeError> {
    let mut markup = String::with_capacity(edited.len());
    let mut seen = HashSet::new();
    let mut open: Vec<&str> = Vec::new();
    let mut cursor = 0;

    for found in CODE_TOKEN_REGEX.find_iter(edited) {
        let token = found.as_str();
        let Some(index) = exported.codes.iter().position(|code| code.token() == token) else {
            if exported.text.contains(token) {
                continue;
            }
            return Err(InlineCodeError::Unknown(token.to_string()));
        };
        if !seen.insert(index) {
            return Err(InlineCodeError::Repeated(token.to_string()));
        }

        let code = &exported.codes[index];
        match code.kind {
            CodeKind::Open => open.push(code.key.as_str()),
            CodeKind::Close if open.pop() != Some(code.key.as_str()) => {
                return Err(InlineCodeError::Misnested(token.to_string()));
            }
            CodeKind::Close | CodeKind::Standalone => {}
        }

        markup.push_str(&escape_text(&edited[cursor..found.start()]));
        markup.push_str(&code.raw);
        cursor = found.end();
    }
    markup.push_str(&escape_text(&edited[cursor..]));

    match (0..exported.codes.len()).find(|index| !seen.contains(index)) {
        Some(index) => Err(InlineCodeError::Missing(exported.codes[index].token())),
        None => Ok(markup),
    }
}

fn code_key(tag: &str, used: &mut HashSet<String>) -> String {
    let name = TAG_NAME_REGEX
        .captures(tag)
        .and_then(|caps| caps.get(1))
        .map_or("code", |name| name.as_str());
    let id = ID_ATTR_REGEX
        .captures(tag)
        .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|id| id.as_str())
        .filter(|id| id.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
        .unwrap_or("");

    let base = format!("{}{}", name, id);
    let mut key = base.clone();
    let mut counter = 2;
    while !used.insert(key.clone()) {
        key = format!("{}_{}", base, counter);
        counter += 1;
    }
    key
}
