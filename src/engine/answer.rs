use icu_normalizer::ComposingNormalizerBorrowed;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Empty or whitespace-only input. Not an attempt.
    Blank,
    Correct,
    Incorrect,
}

impl Verdict {
    pub fn is_attempt(self) -> bool {
        !matches!(self, Verdict::Blank)
    }
}

/// Canonical form used for comparison: trimmed, NFC-composed, lowercased.
/// Precomposed and combining-mark spellings of a letter compare equal.
pub fn normalize(text: &str) -> String {
    let nfc = ComposingNormalizerBorrowed::new_nfc();
    nfc.normalize(text.trim()).to_lowercase()
}

pub fn evaluate(input: &str, expected: &str) -> Verdict {
    if input.trim().is_empty() {
        return Verdict::Blank;
    }
    if normalize(input) == normalize(expected) {
        Verdict::Correct
    } else {
        Verdict::Incorrect
    }
}

pub fn is_correct(input: &str, expected: &str) -> bool {
    evaluate(input, expected) == Verdict::Correct
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_and_case_folds() {
        assert_eq!(evaluate(" Cat ", "cat"), Verdict::Correct);
        assert_eq!(evaluate("HOUSE", "house"), Verdict::Correct);
        assert_eq!(evaluate("car", "  Car\t"), Verdict::Correct);
    }

    #[test]
    fn test_blank_input_is_not_an_attempt() {
        assert_eq!(evaluate("", "cat"), Verdict::Blank);
        assert_eq!(evaluate("   \t ", "cat"), Verdict::Blank);
        assert!(!Verdict::Blank.is_attempt());
    }

    #[test]
    fn test_wrong_word_is_incorrect() {
        assert_eq!(evaluate("Dog", "cat"), Verdict::Incorrect);
        assert!(Verdict::Incorrect.is_attempt());
    }

    #[test]
    fn test_no_partial_credit() {
        assert_eq!(evaluate("ca", "cat"), Verdict::Incorrect);
        assert_eq!(evaluate("cats", "cat"), Verdict::Incorrect);
        assert_eq!(evaluate("c a t", "cat"), Verdict::Incorrect);
    }

    #[test]
    fn test_inner_whitespace_is_significant() {
        assert_eq!(evaluate("ice cream", "ice cream"), Verdict::Correct);
        assert_eq!(evaluate("ice  cream", "ice cream"), Verdict::Incorrect);
    }

    #[test]
    fn test_decomposed_diacritics_match_precomposed() {
        // "hơi" typed as o + combining horn
        let decomposed = "ho\u{031B}i";
        assert_eq!(evaluate(decomposed, "h\u{01A1}i"), Verdict::Correct);
    }

    #[test]
    fn test_non_ascii_case_folding() {
        assert!(is_correct("NHÀ", "nhà"));
        assert!(is_correct("Äpfel", "äpfel"));
    }
}
