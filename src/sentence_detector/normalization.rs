// WHY: per-line sanitation ahead of sentence marking; everything the marker passes rely on
// (ASCII-only text, URLs and odd symbols as placeholders, speaker prefixes removed) happens here

use anyhow::Result;
use regex_automata::meta::Regex;
use unicode_normalization::UnicodeNormalization;

use super::tokens::{push_str, Marker, Token, TokenBuf};

/// Punctuation that survives normalization; everything else outside letters and digits becomes a placeholder
const KEPT_PUNCTUATION: &str = ".'\"-,;:?!()[]*";

/// Collapse whitespace runs into single spaces and fold dash variants into ASCII hyphens.
/// Leading and trailing whitespace is kept (as one space) because speaker detection looks at it.
pub fn collapse_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    collapse_whitespace_into(text, &mut result);
    result
}

/// Buffer-reusing form of [`collapse_whitespace`]
pub fn collapse_whitespace_into(text: &str, buffer: &mut String) {
    buffer.clear();
    buffer.reserve(text.len());

    let mut prev_was_space = false;
    for ch in text.chars() {
        match ch {
            _ if ch.is_whitespace() => {
                if !prev_was_space {
                    buffer.push(' ');
                    prev_was_space = true;
                }
            }
            '\u{2012}'..='\u{2015}' | '\u{2212}' => {
                buffer.push('-');
                prev_was_space = false;
            }
            _ => {
                buffer.push(ch);
                prev_was_space = false;
            }
        }
    }
}

/// Decompose and keep only ASCII, so "café" becomes "cafe" and unmappable symbols vanish
pub fn fold_to_ascii(text: &str) -> String {
    text.nfd().filter(char::is_ascii).collect()
}

pub fn is_kept_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == ' ' || KEPT_PUNCTUATION.contains(ch)
}

/// Turns raw caption lines into tagged token lines
pub struct LineNormalizer {
    url: Regex,
    speaker: Regex,
}

impl LineNormalizer {
    pub fn new() -> Result<Self> {
        let url = Regex::new(
            r"([-a-zA-Z0-9]+:(//)?)?[-a-zA-Z0-9@:%._\+~#=]{1,256}\.[a-zA-Z0-9()]{2,6}(?-u:\b)([-a-zA-Z0-9()@:%_+.~#?&/=]*)",
        )?;
        // Name: "Stephen", "Dr. Plier", "STEVE", optionally "(VO)" or "[laughing]", then ": "
        let speaker = Regex::new(
            r"^[A-Z](?:[-a-z]+(?:(?:\. ?| )[A-Z][-a-z]*)*|[-A-Z]+(?:(?:\. ?| )[-a-z]+)*)?(?: (?:\([^)]*\)|\[[^\]]*\]))?: ",
        )?;
        Ok(Self { url, speaker })
    }

    /// Normalize every line of a group and join them with `'\n'` tokens.
    /// Returns the tokens and the URLs removed from them, indexed by their `Url` markers.
    pub fn normalize_group(&self, lines: &[String]) -> (TokenBuf, Vec<String>) {
        let mut urls = Vec::new();
        let mut tokens = TokenBuf::new();
        for (idx, line) in lines.iter().enumerate() {
            if idx > 0 {
                tokens.push(Token::Char('\n'));
            }
            tokens.extend(self.normalize_line(line, &mut urls));
        }
        (tokens, urls)
    }

    /// Normalize one line; removed URLs are appended to `urls`
    pub fn normalize_line(&self, line: &str, urls: &mut Vec<String>) -> TokenBuf {
        let ascii = fold_to_ascii(&collapse_whitespace(line));

        let mut tokens = TokenBuf::with_capacity(ascii.len());
        let mut last = 0;
        for m in self.url.find_iter(&ascii) {
            push_plain_segment(&ascii[last..m.start()], &mut tokens);
            tokens.push(Token::Mark(Marker::Url(urls.len())));
            urls.push(ascii[m.range()].to_string());
            last = m.end();
        }
        push_plain_segment(&ascii[last..], &mut tokens);

        self.strip_speaker(&mut tokens);
        drop_space_between_markers(&mut tokens);
        tokens
    }

    /// Replace a leading "NAME: " (optionally after a dash or placeholder) with a `Speaker` marker
    fn strip_speaker(&self, tokens: &mut TokenBuf) {
        let mut lead = 0;
        let mut cursor = 0;
        if tokens.first().is_some_and(|t| t.is_char(' ')) {
            cursor = 1;
        }
        if tokens
            .get(cursor)
            .is_some_and(|t| t.is_mark(Marker::Unsupported) || t.is_char('-'))
        {
            lead = cursor + 1;
        }
        if tokens.get(lead).is_some_and(|t| t.is_char(' ')) {
            lead += 1;
        }

        let plain_end = tokens[lead..]
            .iter()
            .position(|t| t.is_marker())
            .map_or(tokens.len(), |p| lead + p);
        let prefix: String = tokens[lead..plain_end].iter().filter_map(|t| t.char()).collect();

        // prefix is ASCII, so byte offsets equal token counts
        if let Some(m) = self.speaker.find(prefix.as_str()) {
            tokens.splice(0..lead + m.end(), [Token::Mark(Marker::Speaker)]);
        }
    }
}

// Digit-preceded '%' reads as " percent"; each run of other disallowed chars becomes one placeholder
fn push_plain_segment(segment: &str, tokens: &mut TokenBuf) {
    let mut prev_digit = false;
    let mut in_unsupported = false;
    for ch in segment.chars() {
        if ch == '%' && prev_digit {
            push_str(tokens, " percent");
            in_unsupported = false;
        } else if is_kept_char(ch) {
            tokens.push(Token::Char(ch));
            in_unsupported = false;
        } else if !in_unsupported {
            tokens.push(Token::Mark(Marker::Unsupported));
            in_unsupported = true;
        }
        prev_digit = ch.is_ascii_digit();
    }
}

fn drop_space_between_markers(tokens: &mut TokenBuf) {
    let keep: Vec<bool> = (0..tokens.len())
        .map(|i| {
            !(tokens[i].is_char(' ')
                && i > 0
                && tokens[i - 1].is_marker()
                && tokens.get(i + 1).is_some_and(|t| t.is_marker()))
        })
        .collect();
    let mut flags = keep.into_iter();
    tokens.retain(|_| flags.next().unwrap_or(true));
}
