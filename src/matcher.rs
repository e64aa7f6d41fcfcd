// src/matcher.rs
//
// Candidate code extraction. Shop listings hide the real catalog number as
// `M` or `N` followed by the set number's digits reversed; only the first
// hit per text node is used.

use crate::config::consts::{CODE_MAX_DIGITS, CODE_MIN_DIGITS, CODE_PREFIXES};

/// First `[MN]<4-5 digits>` in `text`, returning the digit group only.
/// A longer digit run still matches on its first five digits.
pub fn find_code(text: &str) -> Option<String> {
    let b = text.as_bytes();
    let mut i = 0;
    while i < b.len() {
        if CODE_PREFIXES.contains(&(b[i] as char)) {
            let start = i + 1;
            let mut j = start;
            while j < b.len() && b[j].is_ascii_digit() {
                j += 1;
            }
            let run = j - start;
            if run >= CODE_MIN_DIGITS {
                let take = run.min(CODE_MAX_DIGITS);
                return Some(s!(&text[start..start + take]));
            }
        }
        i += 1;
    }
    None
}

/// Candidate code → lookup code (character-wise reversal, an involution).
pub fn reverse_digits(code: &str) -> String {
    code.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_digit_group_ignoring_prefix() {
        assert_eq!(find_code("M4321").as_deref(), Some("4321"));
        assert_eq!(find_code("N67890").as_deref(), Some("67890"));
    }

    #[test]
    fn listing_text_yields_candidate_and_lookup_code() {
        let code = find_code("Set N12345 available").unwrap();
        assert_eq!(code, "12345");
        assert_eq!(reverse_digits(&code), "54321");
    }

    #[test]
    fn reversal_round_trips() {
        for code in ["4321", "54321", "00100"] {
            assert_eq!(reverse_digits(&reverse_digits(code)), code);
        }
    }

    #[test]
    fn too_few_digits_is_no_match() {
        assert_eq!(find_code("M123"), None);
        assert_eq!(find_code("N99"), None);
    }

    #[test]
    fn long_digit_run_matches_first_five() {
        assert_eq!(find_code("M1234567").as_deref(), Some("12345"));
    }

    #[test]
    fn prefix_is_case_sensitive() {
        assert_eq!(find_code("m4321 n5432"), None);
    }

    #[test]
    fn first_match_wins() {
        assert_eq!(find_code("N1111 then M22222").as_deref(), Some("1111"));
    }

    #[test]
    fn prefix_mid_word_still_matches() {
        // mirrors the original pattern: no word-boundary requirement
        assert_eq!(find_code("ITEM12345").as_deref(), Some("12345"));
    }

    #[test]
    fn non_ascii_text_is_handled() {
        assert_eq!(find_code("Süper N54321 fiyat").as_deref(), Some("54321"));
    }
}
