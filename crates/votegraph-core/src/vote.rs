//! Vote option classification and voter-name validation.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::VoteClass;

/// Checked first: "ไม่เห็นด้วย" must not be read as "เห็นด้วย".
const NEGATIVE_TERMS: &[&str] = &["ไม่เห็น", "คัดค้าน", "against", "reject", "disapprove"];

const POSITIVE_TERMS: &[&str] = &["เห็นชอบ", "เห็นด้วย", "approve", "for", "support", "pass"];

const ABSTAIN_TERMS: &[&str] = &[
    "งดออกเสียง",
    "ไม่ลงคะแนน",
    "ไม่แสดงตน",
    "abstain",
    "absent",
    "no vote",
];

const MIN_NAME_CHARS: usize = 3;

static UUID_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[1-5][0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$").ok()
});

/// Classify a free-text vote option. Total: anything unrecognised is `Other`.
pub fn classify(option: &str) -> VoteClass {
    let o = option.to_lowercase();
    if o.trim().is_empty() {
        return VoteClass::Other;
    }
    if NEGATIVE_TERMS.iter().any(|t| o.contains(t)) {
        return VoteClass::No;
    }
    if POSITIVE_TERMS.iter().any(|t| o.contains(t)) {
        return VoteClass::Yes;
    }
    // Abstentions, absences and anything unrecognised.
    VoteClass::Other
}

/// Whether the option text explicitly records an abstention or absence.
pub fn is_abstention(option: &str) -> bool {
    let o = option.to_lowercase();
    ABSTAIN_TERMS.iter().any(|t| o.contains(t))
}

/// A voter name is usable only if it has a Latin or Thai letter, is not a
/// UUID, and is at least three characters long once trimmed.
pub fn is_valid_name(name: &str) -> bool {
    let s = name.trim();
    if !s.chars().any(|c| c.is_ascii_alphabetic() || ('\u{0E01}'..='\u{0E59}').contains(&c)) {
        return false;
    }
    if UUID_RE.as_ref().is_some_and(|re| re.is_match(s)) {
        return false;
    }
    s.chars().count() >= MIN_NAME_CHARS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thai_options() {
        assert_eq!(classify("เห็นด้วย"), VoteClass::Yes);
        assert_eq!(classify("เห็นชอบ"), VoteClass::Yes);
        assert_eq!(classify("ไม่เห็นด้วย"), VoteClass::No);
        assert_eq!(classify("ไม่เห็นชอบ"), VoteClass::No);
        assert_eq!(classify("คัดค้าน"), VoteClass::No);
        assert_eq!(classify("งดออกเสียง"), VoteClass::Other);
        assert_eq!(classify("ไม่ลงคะแนนเสียง"), VoteClass::Other);
    }

    #[test]
    fn english_options_case_insensitive() {
        assert_eq!(classify("APPROVE"), VoteClass::Yes);
        assert_eq!(classify("Disapprove"), VoteClass::No);
        assert_eq!(classify("Against"), VoteClass::No);
        assert_eq!(classify("Abstain"), VoteClass::Other);
    }

    #[test]
    fn unknown_and_empty_are_other() {
        assert_eq!(classify(""), VoteClass::Other);
        assert_eq!(classify("   "), VoteClass::Other);
        assert_eq!(classify("ลา"), VoteClass::Other);
    }

    #[test]
    fn abstention_detection() {
        assert!(is_abstention("ไม่แสดงตน"));
        assert!(is_abstention("No Vote"));
        assert!(!is_abstention("เห็นด้วย"));
    }

    #[test]
    fn valid_names() {
        assert!(is_valid_name("สมชาย ใจดี"));
        assert!(is_valid_name("John Smith"));
        assert!(is_valid_name("  Amy "));
    }

    #[test]
    fn invalid_names() {
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("12345"));
        assert!(!is_valid_name("Al"));
        assert!(!is_valid_name("--- ---"));
        assert!(!is_valid_name("550e8400-e29b-41d4-a716-446655440000"));
        assert!(!is_valid_name("550E8400-E29B-41D4-A716-446655440000"));
    }
}
