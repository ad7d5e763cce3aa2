//! Title and label normalisation.
//!
//! Thai law titles carry boilerplate that differs between the enacted record
//! and the vote event for the same bill: the "ร่าง" (draft) marker, act/decree
//! type prefixes and their abbreviations, amendment numbers, reading markers
//! and Buddhist-era year stamps. [`normalize_title`] strips all of them so the
//! remaining subject text can be compared.

use std::sync::LazyLock;

use regex::Regex;

/// Label used when a party is missing or blank.
pub const OTHER_PARTY: &str = "อื่นๆ";

/// Boilerplate rewrites, applied in order. Order matters: prefix tokens go
/// first so that e.g. "ร่างพระราชบัญญัติ" is removed before the year stamp.
const BOILERPLATE: &[(&str, &str)] = &[
    // Draft marker and act/decree type prefixes.
    ("ร่าง", ""),
    ("พระราชบัญญัติ", ""),
    ("พระราชกำหนด", ""),
    (r"พ\.ร\.บ\.", ""),
    (r"พ\.ร\.ก\.", ""),
    // "(ฉบับที่ N)" amendment parenthetical.
    (r"\(ฉบับที่\s*.*?\)", " "),
    // "วาระที่ N" reading marker, Thai or Arabic digits.
    (r"วาระที่\s*[๑-๙0-9]+", " "),
    (r"การลงมติในวาระที่หนึ่ง.*$", " "),
    ("ซึ่งคณะกรรมาธิการวิสามัญพิจารณาเสร็จแล้ว", " "),
    // Buddhist-era year stamp.
    (r"พ\.ศ\.\s*[0-9.]+", " "),
    (r#"[“”"'()\[\]{}<>:;,.!?]"#, " "),
    (r"\s+", " "),
];

static BOILERPLATE_RE: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    BOILERPLATE
        .iter()
        .filter_map(|(pattern, replacement)| Regex::new(pattern).ok().map(|re| (re, *replacement)))
        .collect()
});

/// Normalise a law or vote-event title into a comparable canonical form.
///
/// Pure and total: empty input yields `""`.
pub fn normalize_title(title: &str) -> String {
    if title.is_empty() {
        return String::new();
    }
    let mut x = title.to_string();
    for (re, replacement) in BOILERPLATE_RE.iter() {
        x = re.replace_all(&x, *replacement).into_owned();
    }
    x.trim().to_lowercase()
}

/// Lookup key for person names: whitespace collapsed, trimmed, lowercased.
pub fn keyify(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Normalise a declared party label. Blank labels become [`OTHER_PARTY`].
pub fn normalize_party(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        OTHER_PARTY.to_string()
    } else {
        collapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_patterns_compile() {
        assert_eq!(BOILERPLATE_RE.len(), BOILERPLATE.len());
    }

    #[test]
    fn strips_draft_type_and_year() {
        assert_eq!(
            normalize_title("ร่างพระราชบัญญัติงบประมาณ พ.ศ. 2567"),
            "งบประมาณ"
        );
    }

    #[test]
    fn strips_abbreviated_prefix() {
        assert_eq!(normalize_title("พ.ร.บ. งบประมาณ"), "งบประมาณ");
        assert_eq!(normalize_title("พ.ร.ก. กู้เงิน"), "กู้เงิน");
    }

    #[test]
    fn strips_amendment_parenthetical() {
        assert_eq!(
            normalize_title("พระราชบัญญัติภาษีสรรพสามิต (ฉบับที่ 3) พ.ศ. 2566"),
            "ภาษีสรรพสามิต"
        );
    }

    #[test]
    fn strips_reading_marker_and_committee_clause() {
        assert_eq!(normalize_title("ร่างงบประมาณ วาระที่ ๒"), "งบประมาณ");
        assert_eq!(
            normalize_title("ร่างงบประมาณ ซึ่งคณะกรรมาธิการวิสามัญพิจารณาเสร็จแล้ว"),
            "งบประมาณ"
        );
    }

    #[test]
    fn first_reading_clause_drops_the_tail() {
        assert_eq!(
            normalize_title("งบประมาณ การลงมติในวาระที่หนึ่ง ขั้นรับหลักการ"),
            "งบประมาณ"
        );
    }

    #[test]
    fn punctuation_and_case() {
        assert_eq!(normalize_title("  “Budget”  Act:  2024! "), "budget act 2024");
    }

    #[test]
    fn empty_input() {
        assert_eq!(normalize_title(""), "");
        assert_eq!(normalize_title("   "), "");
    }

    #[test]
    fn keyify_collapses_and_lowercases() {
        assert_eq!(keyify("  John   SMITH "), "john smith");
    }

    #[test]
    fn party_labels() {
        assert_eq!(normalize_party("  เพื่อไทย "), "เพื่อไทย");
        assert_eq!(normalize_party(""), OTHER_PARTY);
        assert_eq!(normalize_party("   "), OTHER_PARTY);
    }
}
