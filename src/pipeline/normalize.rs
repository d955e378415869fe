//! Normalisation: turn a free-form model reply into a clean skill list.
//!
//! The model is told to answer with a list literal such as
//! `["rust", "tokio"]`, but replies drift: the list gets wrapped in prose,
//! degrades into a comma-separated line, or loses its quoting. The reply is
//! untrusted text and is never evaluated; instead it goes through an ordered
//! chain of parsers where the first success wins:
//!
//! | Tier | Accepts |
//! |------|---------|
//! | [`ParseTier::Literal`]     | the whole reply is a list of quoted strings |
//! | [`ParseTier::Embedded`]    | a list literal between the first `[` and the last `]` |
//! | [`ParseTier::CommaSplit`]  | any reply containing a comma |
//! | [`ParseTier::TokenScrape`] | everything else: runs of word characters |
//!
//! An empty or whitespace-only reply short-circuits to an empty list. The
//! chain always returns a list; a parse step that fails only moves on to the
//! next tier. Every tier below [`ParseTier::Literal`] is logged at `warn` so
//! prompt-format drift shows up in the logs.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Peekable;
use std::str::Chars;
use tracing::{debug, warn};

/// Which tier of the fallback chain produced a skill list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseTier {
    /// The reply was empty or whitespace.
    Empty,
    /// The trimmed reply parsed as a list literal.
    Literal,
    /// A list literal was found inside surrounding text.
    Embedded,
    /// Comma-separated fallback.
    CommaSplit,
    /// Word-character scrape, the last resort.
    TokenScrape,
}

impl ParseTier {
    /// `true` for every tier below a clean list literal.
    pub fn is_degraded(self) -> bool {
        matches!(
            self,
            ParseTier::Embedded | ParseTier::CommaSplit | ParseTier::TokenScrape
        )
    }
}

impl fmt::Display for ParseTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParseTier::Empty => "empty-reply",
            ParseTier::Literal => "list-literal",
            ParseTier::Embedded => "embedded-list",
            ParseTier::CommaSplit => "comma-split",
            ParseTier::TokenScrape => "token-scrape",
        };
        f.write_str(s)
    }
}

/// A skill list together with the tier that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub skills: Vec<String>,
    pub tier: ParseTier,
}

/// Parse a model reply into an ordered list of trimmed, non-empty skills.
///
/// Never fails. An empty result means "could not determine skills".
///
/// ```rust
/// use resume2jobs::normalize;
///
/// assert_eq!(normalize(r#"Sure! ["rust", "tokio"]"#), vec!["rust", "tokio"]);
/// assert_eq!(normalize("a, b, c"), vec!["a", "b", "c"]);
/// assert!(normalize("   ").is_empty());
/// ```
pub fn normalize(raw: &str) -> Vec<String> {
    normalize_detailed(raw).skills
}

/// Like [`normalize`], also reporting which tier succeeded.
pub fn normalize_detailed(raw: &str) -> Normalized {
    let cleaned = raw.trim();
    if cleaned.is_empty() {
        debug!("Empty model reply, no skills");
        return Normalized {
            skills: Vec::new(),
            tier: ParseTier::Empty,
        };
    }

    if let Some(items) = parse_string_list(cleaned) {
        return finish(clean_items(items), ParseTier::Literal, cleaned);
    }

    if let Some(span) = bracket_span(cleaned) {
        if let Some(items) = parse_string_list(span) {
            return finish(clean_items(items), ParseTier::Embedded, cleaned);
        }
        debug!("Bracketed span is not a list literal: {}", preview(span));
    }

    if cleaned.contains(',') {
        return finish(comma_split(cleaned), ParseTier::CommaSplit, cleaned);
    }

    let tokens = RE_WORD
        .find_iter(cleaned)
        .map(|m| m.as_str().to_string())
        .collect();
    finish(tokens, ParseTier::TokenScrape, cleaned)
}

fn finish(skills: Vec<String>, tier: ParseTier, raw: &str) -> Normalized {
    if tier.is_degraded() {
        warn!(
            "Model reply parsed with {} fallback ({} skills): {}",
            tier,
            skills.len(),
            preview(raw)
        );
    } else {
        debug!("Model reply parsed as {} ({} skills)", tier, skills.len());
    }
    Normalized { skills, tier }
}

fn clean_items(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn preview(s: &str) -> String {
    let mut p: String = s.chars().take(80).collect();
    if p.len() < s.len() {
        p.push('…');
    }
    p
}

// ── Tier 2: bracket span ─────────────────────────────────────────────────────

/// The slice from the first `[` to the last `]`, when the first precedes the last.
fn bracket_span(s: &str) -> Option<&str> {
    let start = s.find('[')?;
    let end = s.rfind(']')?;
    if start < end {
        Some(&s[start..=end])
    } else {
        None
    }
}

// ── Tier 3: comma split ──────────────────────────────────────────────────────

fn comma_split(s: &str) -> Vec<String> {
    s.split(',')
        .map(|piece| strip_quote_pair(piece.trim()).trim().to_string())
        .filter(|piece| !piece.is_empty())
        .collect()
}

/// Remove one matching pair of surrounding quotes, nothing more.
fn strip_quote_pair(s: &str) -> &str {
    for q in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(q) && s.ends_with(q) {
            return &s[1..s.len() - 1];
        }
    }
    s
}

// ── Tier 4: token scrape ─────────────────────────────────────────────────────

static RE_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").unwrap());

// ── List-literal parser ──────────────────────────────────────────────────────
//
// Grammar: ws '[' ws ( string ws ( ',' ws string ws )* ( ',' ws )? )? ']' ws
// where string is single- or double-quoted with backslash escapes. Anything
// else, numbers and nested lists included, is rejected.

fn parse_string_list(input: &str) -> Option<Vec<String>> {
    let mut chars = input.chars().peekable();
    skip_ws(&mut chars);
    if chars.next()? != '[' {
        return None;
    }

    let mut items = Vec::new();
    loop {
        skip_ws(&mut chars);
        match *chars.peek()? {
            ']' => {
                chars.next();
                break;
            }
            '"' | '\'' => {
                items.push(parse_quoted(&mut chars)?);
                skip_ws(&mut chars);
                match chars.next()? {
                    ',' => continue,
                    ']' => break,
                    _ => return None,
                }
            }
            _ => return None,
        }
    }

    skip_ws(&mut chars);
    if chars.next().is_some() {
        return None;
    }
    Some(items)
}

fn skip_ws(chars: &mut Peekable<Chars<'_>>) {
    while chars.peek().is_some_and(|c| c.is_whitespace()) {
        chars.next();
    }
}

fn parse_quoted(chars: &mut Peekable<Chars<'_>>) -> Option<String> {
    let quote = chars.next()?;
    let mut out = String::new();
    loop {
        match chars.next()? {
            c if c == quote => return Some(out),
            '\n' => return None,
            '\\' => match chars.next()? {
                '\\' => out.push('\\'),
                '\'' => out.push('\''),
                '"' => out.push('"'),
                'n' => out.push('\n'),
                't' => out.push('\t'),
                'r' => out.push('\r'),
                // Escaped newline is a line continuation.
                '\n' => {}
                'u' => {
                    let hex: String = (0..4).filter_map(|_| chars.next()).collect();
                    let code = u32::from_str_radix(&hex, 16).ok()?;
                    out.push(char::from_u32(code)?);
                }
                other => {
                    out.push('\\');
                    out.push(other);
                }
            },
            c => out.push(c),
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn v(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_literal_double_quoted() {
        let n = normalize_detailed(r#"["machine_learning", "python", "docker"]"#);
        assert_eq!(n.tier, ParseTier::Literal);
        assert_eq!(n.skills, v(&["machine_learning", "python", "docker"]));
    }

    #[test]
    fn test_literal_single_quoted_with_trailing_comma() {
        let n = normalize_detailed("['rust', 'tokio',]");
        assert_eq!(n.tier, ParseTier::Literal);
        assert_eq!(n.skills, v(&["rust", "tokio"]));
    }

    #[test]
    fn test_literal_trims_and_drops_empty_items() {
        let n = normalize_detailed(r#"[" sql ", "", "   ", "aws"]"#);
        assert_eq!(n.tier, ParseTier::Literal);
        assert_eq!(n.skills, v(&["sql", "aws"]));
    }

    #[test]
    fn test_literal_empty_list() {
        let n = normalize_detailed("[]");
        assert_eq!(n.tier, ParseTier::Literal);
        assert!(n.skills.is_empty());
    }

    #[test]
    fn test_literal_multiline_reply() {
        let n = normalize_detailed("[\n  \"kubernetes\",\n  \"terraform\"\n]\n");
        assert_eq!(n.tier, ParseTier::Literal);
        assert_eq!(n.skills, v(&["kubernetes", "terraform"]));
    }

    #[test]
    fn test_literal_escapes() {
        let n = normalize_detailed(r#"["c++", 'it\'s', "a\\b"]"#);
        assert_eq!(n.tier, ParseTier::Literal);
        assert_eq!(n.skills, v(&["c++", "it's", r"a\b"]));
    }

    #[test]
    fn test_empty_and_whitespace_input() {
        assert_eq!(normalize_detailed("").tier, ParseTier::Empty);
        assert!(normalize("").is_empty());
        assert!(normalize("   ").is_empty());
        assert!(normalize("\n\t ").is_empty());
    }

    #[test]
    fn test_embedded_list_in_prose() {
        let n = normalize_detailed(r#"blah ["a", "b"] blah"#);
        assert_eq!(n.tier, ParseTier::Embedded);
        assert_eq!(n.skills, v(&["a", "b"]));
        assert!(n.tier.is_degraded());
    }

    #[test]
    fn test_clean_tiers_are_not_degraded() {
        assert!(!ParseTier::Literal.is_degraded());
        assert!(!ParseTier::Empty.is_degraded());
        assert!(ParseTier::TokenScrape.is_degraded());
    }

    #[test]
    fn test_embedded_list_in_code_fence() {
        let reply = "Here are the skills:\n```python\n['react', 'node_js']\n```";
        let n = normalize_detailed(reply);
        assert_eq!(n.tier, ParseTier::Embedded);
        assert_eq!(n.skills, v(&["react", "node_js"]));
    }

    #[test]
    fn test_comma_split() {
        let n = normalize_detailed("a, b, c");
        assert_eq!(n.tier, ParseTier::CommaSplit);
        assert_eq!(n.skills, v(&["a", "b", "c"]));
        assert!(n.tier.is_degraded());
    }

    #[test]
    fn test_comma_split_strips_one_quote_layer() {
        assert_eq!(
            normalize(r#""python", 'rust' , "'go'""#),
            v(&["python", "rust", "'go'"])
        );
    }

    #[test]
    fn test_comma_split_keeps_unmatched_quotes() {
        assert_eq!(normalize(r#""python, rust'"#), v(&["\"python", "rust'"]));
    }

    #[test]
    fn test_comma_split_drops_empty_pieces() {
        assert_eq!(normalize("sql,, ,\"\", aws"), v(&["sql", "aws"]));
        let n = normalize_detailed(", ,");
        assert_eq!(n.tier, ParseTier::CommaSplit);
        assert!(n.skills.is_empty());
    }

    #[test]
    fn test_unquoted_bracket_list_falls_to_comma_split() {
        let n = normalize_detailed("[python, rust]");
        assert_eq!(n.tier, ParseTier::CommaSplit);
        assert_eq!(n.skills, v(&["[python", "rust]"]));
    }

    #[test]
    fn test_reversed_brackets_skip_embedded_tier() {
        let n = normalize_detailed("][");
        assert_eq!(n.tier, ParseTier::TokenScrape);
        assert!(n.skills.is_empty());

        let n = normalize_detailed(r#"] "a", "b" ["#);
        assert_eq!(n.tier, ParseTier::CommaSplit);
        assert_eq!(n.skills, v(&["] \"a\"", "\"b\" ["]));
    }

    #[test]
    fn test_token_scrape_last_resort() {
        let n = normalize_detailed("Skills: python and sql_server");
        assert_eq!(n.tier, ParseTier::TokenScrape);
        assert_eq!(n.skills, v(&["Skills", "python", "and", "sql_server"]));
    }

    #[test]
    fn test_token_scrape_unicode_words() {
        assert_eq!(normalize("données → análisis"), v(&["données", "análisis"]));
    }

    #[test]
    fn test_non_string_elements_are_rejected_by_literal_tier() {
        let n = normalize_detailed(r#"["rust", 42]"#);
        assert_ne!(n.tier, ParseTier::Literal);
        assert_ne!(n.tier, ParseTier::Embedded);
    }

    #[test]
    fn test_unterminated_string_is_not_literal() {
        assert_eq!(parse_string_list(r#"["rust", "tok]"#), None);
        assert_eq!(parse_string_list("['a'] trailing"), None);
        assert_eq!(parse_string_list("['a\nb']"), None);
    }

    #[test]
    fn test_idempotent() {
        for raw in ["", "[\"a\"]", "x [\"a\"] y", "a, b", "][", "just words"] {
            assert_eq!(normalize_detailed(raw), normalize_detailed(raw));
        }
    }

    #[test]
    fn test_every_item_non_empty_after_trim() {
        for raw in [
            r#"["  ", "a"]"#,
            "a , , b",
            "\"\", x",
            "[' '] and more",
            "   word   ",
        ] {
            for s in normalize(raw) {
                assert!(!s.trim().is_empty(), "empty item from {raw:?}");
                assert_eq!(s, s.trim(), "untrimmed item from {raw:?}");
            }
        }
    }
}
