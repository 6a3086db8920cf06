// WHY: boundary marking runs as a fixed sequence of whole-buffer passes; later passes depend on
// what earlier ones already converted (a period turned into `Period` can no longer become a stop)

use tracing::trace;

use super::abbreviations::AbbreviationChecker;
use super::tokens::{trim, Marker, Quote, Token, TokenBuf};

type Pass = fn(&SentenceTagger, &[Token]) -> TokenBuf;

/// Marking passes in application order
const PASSES: &[(&str, Pass)] = &[
    ("parentheticals", |_, t| mark_delimited(t, '(', ')', Marker::Paren)),
    ("brackets", |_, t| mark_delimited(t, '[', ']', Marker::Bracket)),
    ("asterisks", |_, t| mark_asterisks(t)),
    ("double_quotes", |_, t| mark_double_quotes(t)),
    ("single_quotes", |_, t| mark_single_quotes(t)),
    ("title_abbreviations", |tagger, t| tagger.mark_title_abbreviations(t)),
    ("doctorates", |_, t| mark_doctorates(t)),
    ("versus", |tagger, t| tagger.mark_versus(t)),
    ("acronyms", |_, t| mark_acronyms(t)),
    ("ellipses", |_, t| mark_ellipses(t)),
    ("decimals", |_, t| mark_decimals(t)),
    ("grouped_numbers", |_, t| mark_grouped_numbers(t)),
    ("dashes", |_, t| mark_dashes(t)),
    ("terminal_punctuation", |_, t| mark_terminal_punctuation(t)),
    ("open_quote_close", |_, t| mark_unterminated_quote_close(t)),
    ("unstopped_quote_open", |_, t| mark_unstopped_quote_open(t)),
    ("line_end_placeholders", |_, t| mark_line_end_placeholders(t)),
    ("continuations", |_, t| mark_continuations(t)),
    ("collapse_maybe", |_, t| collapse_maybe(t)),
];

/// Phase A marking and Phase B splitting over one group's token stream
pub struct SentenceTagger {
    abbreviations: AbbreviationChecker,
}

impl SentenceTagger {
    pub fn new() -> Self {
        Self {
            abbreviations: AbbreviationChecker::new(),
        }
    }

    /// Run every marking pass in order
    pub fn mark(&self, tokens: &[Token]) -> TokenBuf {
        let mut buf = tokens.to_vec();
        for (name, pass) in PASSES {
            buf = pass(self, &buf);
            trace!(pass = name, tokens = buf.len(), "Marking pass applied");
        }
        buf
    }

    /// Turn definite stops into boundaries and cut the buffer into trimmed fragments
    pub fn split(&self, marked: &[Token]) -> Vec<TokenBuf> {
        let mut expanded = TokenBuf::with_capacity(marked.len());
        for &token in marked {
            if token.is_mark(Marker::Stop) {
                expanded.push(Token::Mark(Marker::Maybe));
                expanded.push(Token::Mark(Marker::NewSentence));
            } else {
                expanded.push(token);
            }
        }
        collapse_maybe(&expanded)
            .split(|t| t.is_mark(Marker::Maybe))
            .map(|fragment| trim(fragment).to_vec())
            .collect()
    }

    /// Mark and split in one step
    pub fn fragments(&self, tokens: &[Token]) -> Vec<TokenBuf> {
        self.split(&self.mark(tokens))
    }

    fn mark_title_abbreviations(&self, tokens: &[Token]) -> TokenBuf {
        let mut out = TokenBuf::with_capacity(tokens.len() + 8);
        let mut i = 0;
        while i < tokens.len() {
            let boundary = i == 0 || tokens[i - 1].is_whitespace() || tokens[i - 1].is_marker();
            let end = letter_run_end(tokens, i);
            if boundary && end > i && tokens.get(end).is_some_and(|t| t.is_char('.')) {
                let word: String = tokens[i..end].iter().filter_map(|t| t.char()).collect();
                if self.abbreviations.is_title_abbreviation(&word) {
                    out.extend_from_slice(&tokens[i..end]);
                    out.push(Token::Mark(Marker::Period));
                    out.push(Token::Mark(Marker::Maybe));
                    i = end + 1;
                    continue;
                }
            }
            if end > i {
                out.extend_from_slice(&tokens[i..end]);
                i = end;
            } else {
                out.push(tokens[i]);
                i += 1;
            }
        }
        out
    }

    fn mark_versus(&self, tokens: &[Token]) -> TokenBuf {
        let mut out = TokenBuf::with_capacity(tokens.len());
        let mut i = 0;
        while i < tokens.len() {
            let end = letter_run_end(tokens, i);
            if end > i
                && ws_or_start_before(tokens, i)
                && tokens.get(end).is_some_and(|t| t.is_char('.'))
            {
                let word: String = tokens[i..end].iter().filter_map(|t| t.char()).collect();
                if self.abbreviations.is_versus(&word) {
                    out.extend_from_slice(&tokens[i..end]);
                    out.push(Token::Mark(Marker::Period));
                    i = end + 1;
                    continue;
                }
            }
            if end > i {
                out.extend_from_slice(&tokens[i..end]);
                i = end;
            } else {
                out.push(tokens[i]);
                i += 1;
            }
        }
        out
    }
}

impl Default for SentenceTagger {
    fn default() -> Self {
        Self::new()
    }
}

fn ws_or_start_before(tokens: &[Token], i: usize) -> bool {
    i == 0 || tokens[i - 1].is_whitespace()
}

fn ws_marker_or_end_at(tokens: &[Token], i: usize) -> bool {
    tokens.get(i).map_or(true, |t| t.is_whitespace() || t.is_marker())
}

fn run_end(tokens: &[Token], start: usize, pred: impl Fn(char) -> bool) -> usize {
    tokens[start..]
        .iter()
        .position(|t| !t.char().is_some_and(&pred))
        .map_or(tokens.len(), |p| start + p)
}

fn letter_run_end(tokens: &[Token], start: usize) -> usize {
    run_end(tokens, start, |c| c.is_ascii_alphabetic())
}

fn digit_run_end(tokens: &[Token], start: usize) -> usize {
    run_end(tokens, start, |c| c.is_ascii_digit())
}

fn find_char(tokens: &[Token], from: usize, ch: char) -> Option<usize> {
    tokens[from..].iter().position(|t| t.is_char(ch)).map(|p| from + p)
}

/// `open ... close` (first close after the open, across lines and markers) becomes one marker
fn mark_delimited(tokens: &[Token], open: char, close: char, marker: Marker) -> TokenBuf {
    let mut out = TokenBuf::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        if tokens[i].is_char(open) {
            if let Some(end) = find_char(tokens, i + 1, close) {
                out.push(Token::Mark(marker));
                i = end + 1;
                continue;
            }
        }
        out.push(tokens[i]);
        i += 1;
    }
    out
}

/// `*...*`, `**...**` and so on: an opening star run closed by a run at least as long
fn mark_asterisks(tokens: &[Token]) -> TokenBuf {
    let mut out = TokenBuf::with_capacity(tokens.len());
    let mut i = 0;
    'scan: while i < tokens.len() {
        if tokens[i].is_char('*') {
            let run = run_end(tokens, i, |c| c == '*') - i;
            for count in (1..=run).rev() {
                let content_start = i + count;
                let content_end = find_char(tokens, content_start, '*').unwrap_or(tokens.len());
                let closer = content_end + count;
                if closer <= tokens.len() && tokens[content_end..closer].iter().all(|t| t.is_char('*')) {
                    out.push(Token::Mark(Marker::Asterisk));
                    i = closer;
                    continue 'scan;
                }
            }
        }
        out.push(tokens[i]);
        i += 1;
    }
    out
}

fn mark_double_quotes(tokens: &[Token]) -> TokenBuf {
    let mut out = TokenBuf::with_capacity(tokens.len() + 4);
    let mut i = 0;
    while i < tokens.len() {
        if tokens[i].is_char('"') {
            if let Some(end) = find_char(tokens, i + 1, '"') {
                out.push(Token::Mark(Marker::QuoteOpen(Quote::Double)));
                out.extend_from_slice(&tokens[i + 1..end]);
                out.push(Token::Mark(Marker::QuoteClose(Quote::Double)));
                i = end + 1;
                continue;
            }
        }
        out.push(tokens[i]);
        i += 1;
    }
    out
}

// Contraction-safe: the opener needs whitespace before it, the closer no letter after it
fn mark_single_quotes(tokens: &[Token]) -> TokenBuf {
    let mut out = TokenBuf::with_capacity(tokens.len() + 4);
    let mut i = 0;
    while i < tokens.len() {
        if tokens[i].is_char('\'') && i > 0 && tokens[i - 1].is_whitespace() {
            if let Some(end) = find_char(tokens, i + 1, '\'') {
                let letter_follows = tokens
                    .get(end + 1)
                    .is_some_and(|t| t.char().is_some_and(|c| c.is_ascii_alphabetic()));
                if !letter_follows {
                    out.push(Token::Mark(Marker::QuoteOpen(Quote::Single)));
                    out.extend_from_slice(&tokens[i + 1..end]);
                    out.push(Token::Mark(Marker::QuoteClose(Quote::Single)));
                    i = end + 1;
                    continue;
                }
            }
        }
        out.push(tokens[i]);
        i += 1;
    }
    out
}

fn mark_doctorates(tokens: &[Token]) -> TokenBuf {
    const PHD: [char; 5] = ['P', 'h', '.', 'D', '.'];
    let mut out = TokenBuf::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        let is_phd = ws_or_start_before(tokens, i)
            && tokens.len() >= i + PHD.len()
            && tokens[i..i + PHD.len()].iter().zip(PHD).all(|(t, c)| t.is_char(c));
        if is_phd {
            out.extend_from_slice(&[
                Token::Char('P'),
                Token::Char('h'),
                Token::Mark(Marker::Period),
                Token::Char('D'),
                Token::Mark(Marker::Period),
                Token::Mark(Marker::Maybe),
            ]);
            i += PHD.len();
            continue;
        }
        out.push(tokens[i]);
        i += 1;
    }
    out
}

/// Two or more `X.` groups ("U.S.", "D.C.")
fn mark_acronyms(tokens: &[Token]) -> TokenBuf {
    let mut out = TokenBuf::with_capacity(tokens.len() + 4);
    let mut i = 0;
    while i < tokens.len() {
        let mut groups = 0;
        while tokens
            .get(i + groups * 2)
            .is_some_and(|t| t.char().is_some_and(|c| c.is_ascii_uppercase()))
            && tokens.get(i + groups * 2 + 1).is_some_and(|t| t.is_char('.'))
        {
            groups += 1;
        }
        if groups >= 2 {
            for g in 0..groups {
                out.push(tokens[i + g * 2]);
                out.push(Token::Mark(Marker::Period));
            }
            out.push(Token::Mark(Marker::Maybe));
            i += groups * 2;
            continue;
        }
        out.push(tokens[i]);
        i += 1;
    }
    out
}

fn mark_ellipses(tokens: &[Token]) -> TokenBuf {
    let mut out = TokenBuf::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        if tokens[i].is_char('.') {
            let end = run_end(tokens, i, |c| c == '.');
            if end - i >= 3 {
                if ws_or_start_before(tokens, i) {
                    out.push(Token::Mark(Marker::Maybe));
                }
                out.push(Token::Mark(Marker::Ellipsis));
                if ws_marker_or_end_at(tokens, end) {
                    out.push(Token::Mark(Marker::Maybe));
                }
            } else {
                out.extend_from_slice(&tokens[i..end]);
            }
            i = end;
            continue;
        }
        out.push(tokens[i]);
        i += 1;
    }
    out
}

fn mark_decimals(tokens: &[Token]) -> TokenBuf {
    let mut out = TokenBuf::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        let int_end = digit_run_end(tokens, i);
        if int_end > i {
            out.extend_from_slice(&tokens[i..int_end]);
            i = int_end;
            if tokens.get(i).is_some_and(|t| t.is_char('.')) {
                let frac_end = digit_run_end(tokens, i + 1);
                if frac_end > i + 1 {
                    out.push(Token::Mark(Marker::Period));
                    out.extend_from_slice(&tokens[i + 1..frac_end]);
                    i = frac_end;
                }
            }
            continue;
        }
        out.push(tokens[i]);
        i += 1;
    }
    out
}

/// "1,000" and "1, 000, 000" when the number starts a word
fn mark_grouped_numbers(tokens: &[Token]) -> TokenBuf {
    let mut out = TokenBuf::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        let first_end = digit_run_end(tokens, i);
        if first_end == i {
            out.push(tokens[i]);
            i += 1;
            continue;
        }
        if !ws_or_start_before(tokens, i) {
            out.extend_from_slice(&tokens[i..first_end]);
            i = first_end;
            continue;
        }

        out.extend_from_slice(&tokens[i..first_end]);
        let mut pos = first_end;
        while tokens.get(pos).is_some_and(|t| t.is_char(',')) {
            let mut digits_at = pos + 1;
            if tokens.get(digits_at).is_some_and(|t| t.is_char(' ')) {
                digits_at += 1;
            }
            let group_end = digit_run_end(tokens, digits_at);
            if group_end == digits_at {
                break;
            }
            out.push(Token::Mark(Marker::Comma));
            out.extend_from_slice(&tokens[pos + 1..group_end]);
            pos = group_end;
        }
        i = pos;
    }
    out
}

fn mark_dashes(tokens: &[Token]) -> TokenBuf {
    let mut spaced_before = TokenBuf::with_capacity(tokens.len() + 4);
    for (i, &token) in tokens.iter().enumerate() {
        if token.is_char('-') && i > 0 && tokens[i - 1].is_whitespace() {
            spaced_before.push(Token::Mark(Marker::Maybe));
            spaced_before.push(Token::Mark(Marker::Dash));
        } else {
            spaced_before.push(token);
        }
    }

    let mut out = TokenBuf::with_capacity(spaced_before.len() + 4);
    for (i, &token) in spaced_before.iter().enumerate() {
        if token.is_char('-') && spaced_before.get(i + 1).is_some_and(|t| t.is_whitespace()) {
            out.push(Token::Mark(Marker::Dash));
            out.push(Token::Mark(Marker::Maybe));
        } else {
            out.push(token);
        }
    }
    out
}

fn is_terminal(token: Token) -> bool {
    token.char().is_some_and(|c| matches!(c, '.' | '!' | '?'))
}

fn mark_terminal_punctuation(tokens: &[Token]) -> TokenBuf {
    let mut out = TokenBuf::with_capacity(tokens.len() + 8);
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i];
        if is_terminal(token) {
            if let Some(close @ Token::Mark(Marker::QuoteClose(_))) = tokens.get(i + 1).copied() {
                out.extend_from_slice(&[token, Token::Mark(Marker::Stop), close, Token::Mark(Marker::Maybe)]);
                i += 2;
                continue;
            }
            if ws_marker_or_end_at(tokens, i + 1) {
                out.extend_from_slice(&[token, Token::Mark(Marker::Stop)]);
                i += 1;
                continue;
            }
        }
        out.push(token);
        i += 1;
    }
    out
}

/// A quote closed without `, . ! ?` before it is an incomplete fragment
fn mark_unterminated_quote_close(tokens: &[Token]) -> TokenBuf {
    let mut out = TokenBuf::with_capacity(tokens.len() + 4);
    for (i, &token) in tokens.iter().enumerate() {
        if let Token::Mark(Marker::QuoteClose(_)) = token {
            let before = tokens[..i].iter().rev().find(|t| !t.is_mark(Marker::Stop));
            let punctuated = before
                .and_then(|t| t.char())
                .is_some_and(|c| matches!(c, ',' | '.' | '!' | '?'));
            if !punctuated {
                out.extend_from_slice(&[Token::Mark(Marker::Discard), token, Token::Mark(Marker::Maybe)]);
                continue;
            }
        }
        out.push(token);
    }
    out
}

/// A quote opening mid-sentence (no definite stop before its leading whitespace)
fn mark_unstopped_quote_open(tokens: &[Token]) -> TokenBuf {
    let mut out = TokenBuf::with_capacity(tokens.len() + 4);
    for (i, &token) in tokens.iter().enumerate() {
        if token.is_whitespace() && (i == 0 || !tokens[i - 1].is_whitespace()) {
            let run_end = tokens[i..]
                .iter()
                .position(|t| !t.is_whitespace())
                .map_or(tokens.len(), |p| i + p);
            let opens_quote = matches!(tokens.get(run_end), Some(Token::Mark(Marker::QuoteOpen(_))));
            let after_stop = i > 0 && tokens[i - 1].is_mark(Marker::Stop);
            if opens_quote && !after_stop {
                out.push(Token::Mark(Marker::Discard));
            }
        }
        out.push(token);
    }
    out
}

fn mark_line_end_placeholders(tokens: &[Token]) -> TokenBuf {
    let mut out = TokenBuf::with_capacity(tokens.len() + 4);
    for (i, &token) in tokens.iter().enumerate() {
        out.push(token);
        let placeholder = token.marker().is_some_and(Marker::is_placeholder);
        if placeholder && tokens.get(i + 1).is_some_and(|t| t.is_char('\n')) {
            out.push(Token::Mark(Marker::Maybe));
        }
    }
    out
}

fn mark_continuations(tokens: &[Token]) -> TokenBuf {
    let mut out = TokenBuf::with_capacity(tokens.len() + 8);
    for &token in tokens {
        out.push(token);
        if token.is_char(',') {
            out.push(Token::Mark(Marker::Continue));
        }
    }
    out
}

/// Two or more `Maybe` markers, each optionally followed by one whitespace, become one
pub(crate) fn collapse_maybe(tokens: &[Token]) -> TokenBuf {
    let mut out = TokenBuf::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        if tokens[i].is_mark(Marker::Maybe) {
            let mut j = i;
            let mut count = 0;
            while tokens.get(j).is_some_and(|t| t.is_mark(Marker::Maybe)) {
                count += 1;
                j += 1;
                if tokens.get(j).is_some_and(|t| t.is_whitespace()) {
                    j += 1;
                }
            }
            if count >= 2 {
                out.push(Token::Mark(Marker::Maybe));
                i = j;
                continue;
            }
        }
        out.push(tokens[i]);
        i += 1;
    }
    out
}
