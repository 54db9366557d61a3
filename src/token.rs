//! Tokenizer - prompt text to ordered tokens
//!
//! Splits on whitespace and punctuation. An apostrophe between two word
//! characters stays inside the token (`don't`), and combining marks stay
//! attached to the character they modify (`cafe\u{301}`). Every other
//! non-alphanumeric character is a boundary. Token text is kept exactly as
//! written; matching goes through [`Token::normalized`].

use serde::{Deserialize, Serialize};

/// A single word of the prompt and its position
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    /// Token text as it appeared in the prompt
    pub value: String,
    /// Zero-based position in the token sequence
    pub index: usize,
}

impl Token {
    pub fn new(value: impl Into<String>, index: usize) -> Self {
        Self {
            value: value.into(),
            index,
        }
    }

    /// Lower-cased form used for vocabulary matching (curly apostrophes become `'`)
    pub fn normalized(&self) -> String {
        self.value.to_lowercase().replace('\u{2019}', "'")
    }
}

fn is_apostrophe(c: char) -> bool {
    c == '\'' || c == '\u{2019}'
}

/// Combining diacritical mark blocks (Mn characters that decorate a base letter)
fn is_combining_mark(c: char) -> bool {
    matches!(
        c,
        '\u{0300}'..='\u{036F}'
            | '\u{1AB0}'..='\u{1AFF}'
            | '\u{1DC0}'..='\u{1DFF}'
            | '\u{20D0}'..='\u{20FF}'
            | '\u{FE20}'..='\u{FE2F}'
    )
}

/// Split `text` into tokens with contiguous zero-based indices.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c.is_alphanumeric() || (is_combining_mark(c) && !current.is_empty()) {
            current.push(c);
            continue;
        }

        // Inner apostrophe: keep "don't" / "it's" together
        let inner_apostrophe = is_apostrophe(c)
            && !current.is_empty()
            && chars.peek().is_some_and(|next| next.is_alphanumeric());
        if inner_apostrophe {
            current.push(c);
            continue;
        }

        if !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .into_iter()
        .enumerate()
        .map(|(index, value)| Token { value, index })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.value.as_str()).collect()
    }

    #[test]
    fn test_empty_and_whitespace() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \t\n  ").is_empty());
        assert!(tokenize("?!... ,;").is_empty());
    }

    #[test]
    fn test_splits_on_punctuation() {
        let tokens = tokenize("Hello, world! How's the neural-network?");
        assert_eq!(
            values(&tokens),
            vec!["Hello", "world", "How's", "the", "neural", "network"]
        );
    }

    #[test]
    fn test_indices_contiguous() {
        let tokens = tokenize("  one  two,three  ");
        for (i, token) in tokens.iter().enumerate() {
            assert_eq!(token.index, i);
        }
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn test_trailing_apostrophe_is_boundary() {
        let tokens = tokenize("the experts' router");
        assert_eq!(values(&tokens), vec!["the", "experts", "router"]);
    }

    #[test]
    fn test_case_preserved_normalized_lowered() {
        let tokens = tokenize("MATRIX");
        assert_eq!(tokens[0].value, "MATRIX");
        assert_eq!(tokens[0].normalized(), "matrix");
    }

    #[test]
    fn test_combining_marks_stay_in_word() {
        let tokens = tokenize("cafe\u{301} na\u{308}ive");
        assert_eq!(values(&tokens), vec!["cafe\u{301}", "na\u{308}ive"]);
        // A mark with no base letter is still a boundary
        assert!(tokenize("\u{301}").is_empty());
    }

    #[test]
    fn test_curly_apostrophe_kept_verbatim() {
        let tokens = tokenize("don\u{2019}t stop");
        assert_eq!(values(&tokens), vec!["don\u{2019}t", "stop"]);
        assert_eq!(tokens[0].normalized(), "don't");
    }

    #[test]
    fn test_unicode_words() {
        let tokens = tokenize("café über");
        assert_eq!(values(&tokens), vec!["café", "über"]);
    }
}
