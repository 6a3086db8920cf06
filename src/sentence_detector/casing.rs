// WHY: some caption tracks are entirely upper case; the lexicon tells common words (lowercase
// them) from acronyms and names (keep them)

use crate::lexicon::Lexicon;

/// Injected by the line normalizer for '%', so it says nothing about the source's casing
const PERCENT_WORD: &str = "percent";

/// Repair an all-caps sentence; sentences with any lowercase word are returned trimmed but unchanged
pub fn normalize_casing(sentence: &str, lexicon: &Lexicon) -> String {
    let trimmed = sentence.trim_matches(|c| c == ' ' || c == '-');
    if has_lowercase_word(trimmed) {
        return trimmed.to_string();
    }

    let recased = recase_upper_runs(trimmed, lexicon);
    capitalize_first(&lowercase_article(&recased))
}

/// A sentence survives filtering only if it has at least one word character
pub fn is_good_sentence(sentence: &str) -> bool {
    sentence.chars().any(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn has_lowercase_word(sentence: &str) -> bool {
    sentence
        .split(|c: char| !c.is_ascii_alphabetic())
        .filter(|w| !w.is_empty() && *w != PERCENT_WORD)
        .any(|w| w.bytes().any(|b| b.is_ascii_lowercase()))
}

fn recase_word(word: &str, lexicon: &Lexicon) -> String {
    if let Some(rest) = word.strip_prefix("I'") {
        let lower = format!("I'{}", rest.to_ascii_lowercase());
        if lexicon.contains(word) || !lexicon.contains(&lower) {
            return word.to_string();
        }
        return lower;
    }

    let lower = word.to_ascii_lowercase();
    if lexicon.contains(word) || !lexicon.contains(&lower) {
        word.to_string()
    } else {
        lower
    }
}

// Every maximal run of two or more [A-Z'] characters
fn recase_upper_runs(sentence: &str, lexicon: &Lexicon) -> String {
    let bytes = sentence.as_bytes();
    let mut out = String::with_capacity(sentence.len());
    let mut last = 0;
    let mut i = 0;
    while i < bytes.len() {
        if !is_run_byte(bytes[i]) {
            i += 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && is_run_byte(bytes[i]) {
            i += 1;
        }
        if i - start >= 2 {
            out.push_str(&sentence[last..start]);
            out.push_str(&recase_word(&sentence[start..i], lexicon));
            last = i;
        }
    }
    out.push_str(&sentence[last..]);
    out
}

fn is_run_byte(b: u8) -> bool {
    b.is_ascii_uppercase() || b == b'\''
}

/// "A" on its own is the article, unless letters follow (an acronym)
fn lowercase_article(sentence: &str) -> String {
    let bytes = sentence.as_bytes();
    let mut out = sentence.as_bytes().to_vec();
    for (i, &b) in bytes.iter().enumerate() {
        if b != b'A' || (i > 0 && bytes[i - 1] != b' ') {
            continue;
        }
        let standalone = match bytes.get(i + 1) {
            None => true,
            Some(b'.') => i + 2 == bytes.len(),
            Some(next) => b" ,;:?!".contains(next),
        };
        if standalone {
            out[i] = b'a';
        }
    }
    // Only an ASCII byte was swapped for another
    String::from_utf8(out).unwrap_or_else(|_| sentence.to_string())
}

fn capitalize_first(sentence: &str) -> String {
    let mut chars = sentence.chars();
    match chars.next() {
        Some(first) if first.is_ascii_lowercase() => {
            let mut out = String::with_capacity(sentence.len());
            out.push(first.to_ascii_uppercase());
            out.push_str(chars.as_str());
            out
        }
        _ => sentence.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexicon() -> Lexicon {
        Lexicon::from_words([
            "this", "is", "a", "test", "we", "went", "to", "NASA", "nasa", "I'm", "I", "don't", "it",
        ])
    }

    #[test]
    fn test_all_caps_sentence_recased() {
        assert_eq!(normalize_casing("THIS IS A TEST", &lexicon()), "This is a test");
    }

    #[test]
    fn test_acronyms_and_unknown_words_kept() {
        assert_eq!(normalize_casing("WE WENT TO NASA", &lexicon()), "We went to NASA");
        assert_eq!(normalize_casing("WE WENT TO ZORBLAX", &lexicon()), "We went to ZORBLAX");
    }

    #[test]
    fn test_contractions() {
        assert_eq!(normalize_casing("I'M DONE", &lexicon()), "I'm DONE");
        assert_eq!(normalize_casing("DON'T DO IT", &lexicon()), "Don't DO it");
    }

    #[test]
    fn test_mixed_case_untouched_except_trim() {
        assert_eq!(normalize_casing(" - Hello THERE - ", &lexicon()), "Hello THERE");
        assert_eq!(normalize_casing("ok", &lexicon()), "ok");
    }

    #[test]
    fn test_percent_does_not_count_as_lowercase() {
        assert_eq!(normalize_casing("50 percent IS A TEST", &lexicon()), "50 percent is a test");
    }

    #[test]
    fn test_article_rules() {
        assert_eq!(normalize_casing("IT IS A.", &lexicon()), "It is a.");
        assert_eq!(normalize_casing("A TEST", &lexicon()), "A test");
        assert_eq!(normalize_casing("IT IS AB", &lexicon()), "It is AB");
    }

    #[test]
    fn test_casing_is_idempotent() {
        let lexicon = lexicon();
        for s in [
            "THIS IS A TEST",
            "WE WENT TO NASA",
            "I'M DONE",
            "A",
            "- 42 -",
            "Hello there.",
            "ZORBLAX ZORBLAX",
            "IT IS A, TEST",
        ] {
            let once = normalize_casing(s, &lexicon);
            assert_eq!(normalize_casing(&once, &lexicon), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn test_casing_is_idempotent_over_generated_sentences() {
        const PIECES: &[&str] = &[
            "THIS", "IS", "A", "A.", "TEST", "I'M", "DON'T", "NASA", "ZORB", "percent", "Hello", "42", "-", "A,",
        ];
        let lexicon = lexicon();
        let mut checked = 0;
        for len in 1..=4u32 {
            for n in 0..PIECES.len().pow(len) {
                let mut rest = n;
                let words: Vec<&str> = (0..len)
                    .map(|_| {
                        let piece = PIECES[rest % PIECES.len()];
                        rest /= PIECES.len();
                        piece
                    })
                    .collect();
                let sentence = words.join(" ");
                let once = normalize_casing(&sentence, &lexicon);
                assert_eq!(normalize_casing(&once, &lexicon), once, "not idempotent for {sentence:?}");
                checked += 1;
            }
        }
        assert!(checked > 40_000);
    }

    #[test]
    fn test_filter_requires_word_character() {
        assert!(is_good_sentence("Hello."));
        assert!(is_good_sentence("... 42"));
        assert!(!is_good_sentence("..."));
        assert!(!is_good_sentence(""));
        assert!(!is_good_sentence(" - ! "));
    }
}
