// WHY: parser state travels with the text as typed markers, so real caption text can never
// collide with a sentinel and every stage can match exhaustively on marker kinds

/// Which quote character delimited a span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quote {
    Double,
    Single,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    /// Removed URL; payload indexes the group's recovered URL list
    Url(usize),
    /// A run of characters outside the allowed set
    Unsupported,
    /// Leading "NAME: " speaker annotation
    Speaker,
    /// A `( ... )` span, removed from output
    Paren,
    /// A `[ ... ]` span, removed from output
    Bracket,
    /// A `* ... *` span, removed from output
    Asterisk,
    QuoteOpen(Quote),
    QuoteClose(Quote),
    /// Period that is part of a number, acronym or abbreviation
    Period,
    /// Comma inside a grouped number
    Comma,
    /// Standalone dash
    Dash,
    Ellipsis,
    /// Ambiguous boundary
    Maybe,
    /// Definite sentence stop
    Stop,
    /// Boundary that always opens a new sentence
    NewSentence,
    /// The sentence containing this marker is dropped
    Discard,
    /// Sentence continues into the next fragment
    Continue,
}

impl Marker {
    /// Placeholders for content the normalizer could not keep
    pub fn is_placeholder(self) -> bool {
        matches!(self, Marker::Url(_) | Marker::Unsupported)
    }

    /// Literal text a marker renders to in final output, if any
    pub fn rendered(self) -> Option<&'static str> {
        match self {
            Marker::Period => Some("."),
            Marker::Comma => Some(","),
            Marker::Dash => Some("-"),
            Marker::Ellipsis => Some("..."),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    Char(char),
    Mark(Marker),
}

impl Token {
    pub fn is_whitespace(self) -> bool {
        matches!(self, Token::Char(c) if c.is_whitespace())
    }

    pub fn is_marker(self) -> bool {
        matches!(self, Token::Mark(_))
    }

    pub fn marker(self) -> Option<Marker> {
        match self {
            Token::Mark(m) => Some(m),
            Token::Char(_) => None,
        }
    }

    pub fn char(self) -> Option<char> {
        match self {
            Token::Char(c) => Some(c),
            Token::Mark(_) => None,
        }
    }

    pub fn is_char(self, expected: char) -> bool {
        self == Token::Char(expected)
    }

    pub fn is_mark(self, expected: Marker) -> bool {
        self == Token::Mark(expected)
    }
}

pub type TokenBuf = Vec<Token>;

pub fn push_str(buf: &mut TokenBuf, text: &str) {
    buf.extend(text.chars().map(Token::Char));
}

pub fn from_str(text: &str) -> TokenBuf {
    text.chars().map(Token::Char).collect()
}

/// Plain characters only, markers skipped
pub fn plain_text(tokens: &[Token]) -> String {
    tokens.iter().filter_map(|t| t.char()).collect()
}

/// Drop whitespace tokens from both ends
pub fn trim(tokens: &[Token]) -> &[Token] {
    let start = tokens.iter().position(|t| !t.is_whitespace()).unwrap_or(tokens.len());
    let end = tokens.iter().rposition(|t| !t.is_whitespace()).map_or(start, |i| i + 1);
    &tokens[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_keeps_markers() {
        let mut buf = from_str("  a");
        buf.push(Token::Mark(Marker::Stop));
        buf.push(Token::Char('\n'));
        assert_eq!(trim(&buf), &[Token::Char('a'), Token::Mark(Marker::Stop)]);
        assert!(trim(&from_str(" \n ")).is_empty());
    }

    #[test]
    fn test_plain_text_skips_markers() {
        let buf = vec![
            Token::Char('D'),
            Token::Char('r'),
            Token::Mark(Marker::Period),
            Token::Mark(Marker::Maybe),
        ];
        assert_eq!(plain_text(&buf), "Dr");
        assert_eq!(Marker::Period.rendered(), Some("."));
        assert_eq!(Marker::Speaker.rendered(), None);
    }
}
