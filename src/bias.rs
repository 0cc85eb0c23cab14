//! Loaded-language scan over the quote itself.

/// Sensational or loaded words worth flagging to the reader.
pub const BIAS_WORDS: &[&str] = &[
    "shocking",
    "disaster",
    "chaos",
    "crisis",
    "unprecedented",
    "slam",
    "slammed",
    "furious",
    "outrage",
    "explosive",
    "catastrophic",
    "rigged",
    "fake",
    "corrupt",
    "witch hunt",
];

/// Return the loaded words found in `text`, in [`BIAS_WORDS`] order.
///
/// Matching is case-insensitive and on whole words, so "faked" does not
/// count as "fake" and "slammed" does not also report "slam".
pub fn scan_bias(text: &str) -> Vec<String> {
    let normalized: String = text
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                ' '
            }
        })
        .collect();
    let padded = format!(" {} ", normalized.split_whitespace().collect::<Vec<_>>().join(" "));

    BIAS_WORDS
        .iter()
        .filter(|word| padded.contains(&format!(" {word} ")))
        .map(|word| (*word).to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_text_has_no_notes() {
        assert!(scan_bias("The council approved the budget on Tuesday.").is_empty());
    }

    #[test]
    fn finds_words_case_insensitively() {
        assert_eq!(
            scan_bias("SHOCKING: the election was Rigged!"),
            vec!["shocking".to_string(), "rigged".to_string()]
        );
    }

    #[test]
    fn matches_whole_words_only() {
        assert!(scan_bias("the moon landing was faked").is_empty());
        assert_eq!(scan_bias("Senator slammed the bill"), vec!["slammed".to_string()]);
    }

    #[test]
    fn multi_word_phrase_matches_across_punctuation() {
        assert_eq!(
            scan_bias("This is a witch-hunt, plain and simple"),
            vec!["witch hunt".to_string()]
        );
    }
}
