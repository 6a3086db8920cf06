// WHY: fragment placement is a strict precedence list; keeping it as data makes the order
// visible in one place and lets each guard be tested on its own

use crate::lexicon::Lexicon;

use super::tokens::{Marker, Token, TokenBuf};

/// Where a fragment goes relative to the sentence being built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Close the running sentence and open a new one with this fragment
    Start,
    /// Join the running sentence with a single space
    Append,
    /// Join the running sentence, flagging it for discard
    MergeDiscarded,
}

/// What a guard sees when deciding one fragment
pub struct FragmentContext<'a> {
    pub fragment: &'a [Token],
    /// The preceding fragment as split, before any discard screening
    pub previous: Option<&'a [Token]>,
    pub lexicon: &'a Lexicon,
}

pub struct PlacementRule {
    pub name: &'static str,
    pub guard: fn(&FragmentContext<'_>) -> bool,
    pub placement: Placement,
}

/// First matching rule wins; a fragment matching none is appended
pub const PLACEMENT_RULES: &[PlacementRule] = &[
    PlacementRule {
        name: "new_sentence_marker",
        guard: |ctx| ctx.fragment.first().is_some_and(|t| t.is_mark(Marker::NewSentence)),
        placement: Placement::Start,
    },
    PlacementRule {
        name: "speaker_after_continuation",
        guard: |ctx| {
            leading_markers(ctx.fragment).any(|m| m == Marker::Speaker)
                && ctx.previous.is_some_and(ends_with_continuation)
        },
        placement: Placement::MergeDiscarded,
    },
    PlacementRule {
        name: "speaker_change",
        guard: |ctx| leading_markers(ctx.fragment).any(|m| m == Marker::Speaker),
        placement: Placement::Start,
    },
    PlacementRule {
        name: "after_continuation",
        guard: |ctx| ctx.previous.is_some_and(ends_with_continuation),
        placement: Placement::Append,
    },
    PlacementRule {
        name: "after_terminal_placeholder",
        guard: |ctx| ctx.previous.is_some_and(ends_with_placeholder),
        placement: Placement::Start,
    },
    PlacementRule {
        name: "opens_with_removed_content",
        guard: |ctx| {
            leading_markers(ctx.fragment).any(|m| {
                m.is_placeholder() || matches!(m, Marker::Paren | Marker::Bracket | Marker::Asterisk)
            })
        },
        placement: Placement::Start,
    },
    PlacementRule {
        name: "capitalized_common_word",
        guard: |ctx| starts_with_capitalized_common_word(ctx.fragment, ctx.lexicon),
        placement: Placement::Start,
    },
];

/// Decide a fragment's placement, returning the rule that fired
pub fn place(ctx: &FragmentContext<'_>) -> (Placement, &'static str) {
    PLACEMENT_RULES
        .iter()
        .find(|rule| (rule.guard)(ctx))
        .map_or((Placement::Append, "default_append"), |rule| (rule.placement, rule.name))
}

/// Flag a fragment whose first placeholder sits between words: an unrecognized token broke
/// the sentence. Returns whether a `Discard` was inserted.
pub fn screen_interior_placeholder(fragment: &mut TokenBuf) -> bool {
    let Some(pos) = fragment
        .iter()
        .position(|t| t.marker().is_some_and(Marker::is_placeholder))
    else {
        return false;
    };
    let is_word_char = |t: &Token| t.char().is_some_and(|c| c.is_ascii_alphanumeric() || c == '_');
    let words_before = fragment[..pos].iter().any(is_word_char);
    let words_after = fragment[pos + 1..].iter().any(is_word_char);
    if words_before && words_after {
        fragment.insert(pos, Token::Mark(Marker::Discard));
        return true;
    }
    false
}

/// Markers at the start of a fragment, each optionally followed by one whitespace token
fn leading_markers(fragment: &[Token]) -> impl Iterator<Item = Marker> + '_ {
    let mut i = 0;
    std::iter::from_fn(move || {
        let marker = fragment.get(i)?.marker()?;
        i += 1;
        if fragment.get(i).is_some_and(|t| t.is_whitespace()) {
            i += 1;
        }
        Some(marker)
    })
}

fn after_leading_markers(fragment: &[Token]) -> &[Token] {
    let mut i = 0;
    while fragment.get(i).is_some_and(|t| t.is_marker()) {
        i += 1;
        if fragment.get(i).is_some_and(|t| t.is_whitespace()) {
            i += 1;
        }
    }
    &fragment[i..]
}

// Last meaningful token: whitespace and non-placeholder markers are skipped
fn last_significant(fragment: &[Token]) -> Option<Token> {
    fragment
        .iter()
        .rev()
        .find(|t| match t {
            Token::Char(c) => !c.is_whitespace(),
            Token::Mark(m) => m.is_placeholder(),
        })
        .copied()
}

fn ends_with_placeholder(fragment: &[Token]) -> bool {
    last_significant(fragment)
        .and_then(Token::marker)
        .is_some_and(Marker::is_placeholder)
}

fn ends_with_continuation(fragment: &[Token]) -> bool {
    let trailing = fragment
        .iter()
        .rposition(|t| !t.is_whitespace() && !t.is_marker())
        .map_or(fragment, |p| &fragment[p + 1..]);
    trailing.iter().any(|t| t.is_mark(Marker::Continue))
}

/// A capitalized first word the lexicon only knows in lowercase is a real sentence start,
/// not a proper noun
fn starts_with_capitalized_common_word(fragment: &[Token], lexicon: &Lexicon) -> bool {
    let rest = after_leading_markers(fragment);
    let word: String = rest
        .iter()
        .map_while(|t| t.char().filter(|c| c.is_ascii_alphabetic()))
        .collect();
    if !word.starts_with(|c: char| c.is_ascii_uppercase()) {
        return false;
    }

    let lower = word.to_ascii_lowercase();
    let mut title = String::with_capacity(word.len());
    title.push_str(&word[..1]);
    title.push_str(&lower[1..]);

    lexicon.contains(&lower) && !lexicon.contains(&word) && !lexicon.contains(&title)
}
