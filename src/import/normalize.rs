//! Title deflation: canonical comparison keys for fuzzy name matching

use regex_lite::Regex;

/// Options controlling title deflation.
#[derive(Debug, Clone)]
pub struct DeflateOptions {
    /// Leading articles stripped before comparison.
    pub articles: Vec<String>,
    /// Strip trailing edition/subtitle markers ("Game of the Year Edition", ...).
    pub strip_editions: bool,
    /// Harmonize numerals (roman to arabic, zero-padded) so "Part 2",
    /// "Part II" and "Part 02" deflate identically. Must be set the same way
    /// on both sides of a comparison.
    pub batch: bool,
}

impl Default for DeflateOptions {
    fn default() -> Self {
        Self {
            articles: vec!["the".to_string(), "a".to_string(), "an".to_string()],
            strip_editions: true,
            batch: true,
        }
    }
}

const EDITION_WORDS: &str = "ultimate|definitive|complete|enhanced|special|limited|collector'?s?|anniversary|remastered|remaster|redux|deluxe|gold|premium|digital|standard|extended|legendary|game of the year|goty|director'?s?";

/// Deflate a title into a comparison key.
///
/// Pure and deterministic; empty or whitespace input yields an empty string.
pub fn deflate(title: &str, options: &DeflateOptions) -> String {
    let mut s = title.trim().to_string();
    if s.is_empty() {
        return String::new();
    }

    s = strip_leading_article(&s, &options.articles);

    if options.strip_editions {
        s = strip_edition_markers(&s);
    }

    let cleaned: String = s
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    let mut tokens: Vec<String> = cleaned
        .split_whitespace()
        .map(|t| t.to_lowercase())
        .collect();

    if options.batch {
        for token in &mut tokens {
            if let Some(n) = roman_to_arabic(token) {
                *token = format!("{:02}", n);
            } else if token.chars().all(|c| c.is_ascii_digit()) {
                if let Ok(n) = token.parse::<u64>() {
                    *token = format!("{:02}", n);
                }
            }
        }
    }

    tokens.join(" ")
}

fn strip_leading_article(s: &str, articles: &[String]) -> String {
    for article in articles {
        let prefix_len = article.len() + 1;
        if s.len() > prefix_len && s.is_char_boundary(prefix_len) {
            let (head, rest) = s.split_at(prefix_len);
            if head[..article.len()].eq_ignore_ascii_case(article)
                && head.ends_with(' ')
                && !rest.trim().is_empty()
            {
                return rest.trim_start().to_string();
            }
        }
    }
    s.to_string()
}

fn strip_edition_markers(s: &str) -> String {
    let parenthetical = Regex::new(r"\s*\([^)]*\)\s*$").expect("valid regex");
    let delimited = Regex::new(&format!(
        r"(?i)\s*[:\-–—]\s*(the\s+)?({EDITION_WORDS})(\s+(edition|cut|version|collection))?\s*$"
    ))
    .expect("valid regex");
    let undelimited = Regex::new(&format!(
        r"(?i)\s+(the\s+)?({EDITION_WORDS})\s+(edition|cut|version)\s*$"
    ))
    .expect("valid regex");
    let bare = Regex::new(r"(?i)\s+(remastered|remaster|redux|hd)\s*$").expect("valid regex");

    let mut current = s.trim().to_string();
    loop {
        let mut next = current.clone();
        for re in [&parenthetical, &delimited, &undelimited, &bare] {
            next = re.replace(&next, "").trim().to_string();
        }
        if next == current || next.is_empty() {
            // never deflate a title down to nothing
            return if next.is_empty() { current } else { next };
        }
        current = next;
    }
}

/// Parse a strict roman numeral built from i/v/x (1..=39).
fn roman_to_arabic(token: &str) -> Option<u32> {
    if token.is_empty() || !token.chars().all(|c| matches!(c, 'i' | 'v' | 'x')) {
        return None;
    }
    let digits: Vec<i64> = token
        .chars()
        .map(|c| match c {
            'i' => 1,
            'v' => 5,
            _ => 10,
        })
        .collect();
    let mut value = 0i64;
    for (pos, &d) in digits.iter().enumerate() {
        if digits.get(pos + 1).is_some_and(|&next| next > d) {
            value -= d;
        } else {
            value += d;
        }
    }
    if !(1..=39).contains(&value) {
        return None;
    }
    let value = value as u32;
    // round-trip to reject malformed sequences like "iiii" or "vx"
    (to_roman(value) == token).then_some(value)
}

fn to_roman(mut n: u32) -> String {
    let mut out = String::new();
    for (value, glyph) in [(10, "x"), (9, "ix"), (5, "v"), (4, "iv"), (1, "i")] {
        while n >= value {
            out.push_str(glyph);
            n -= value;
        }
    }
    out
}
