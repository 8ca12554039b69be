//! Confidence scoring for decoded identity documents.
//!
//! Works on both QR payload records (`name`, `uid`, `dob`, ...) and OCR
//! records (a single `text` field). Only the range `0..=10` and the
//! verification threshold of 5 are stable; the weights may change.

use crate::domain::model::{DocumentRecord, Score};
use regex::Regex;
use std::sync::OnceLock;

const GOVERNMENT_WEIGHT: u32 = 3;
const AADHAAR_WEIGHT: u32 = 2;
const UID_FORMAT_WEIGHT: u32 = 2;
const UID_CHECKSUM_WEIGHT: u32 = 1;
const BIRTH_WEIGHT: u32 = 1;
const GENDER_WEIGHT: u32 = 1;
const STRONG_NAME_WEIGHT: u32 = 2;
const WEAK_NAME_WEIGHT: u32 = 1;

const STRONG_NAME_SIMILARITY: f64 = 0.8;
const WEAK_NAME_SIMILARITY: f64 = 0.5;

struct Patterns {
    government: Regex,
    aadhaar: Regex,
    uid: Regex,
    birth: Regex,
    gender: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        government: Regex::new(r"(?i)government\s+of\s+india").expect("valid regex"),
        aadhaar: Regex::new(r"(?i)\baadha+r\b").expect("valid regex"),
        uid: Regex::new(r"\b(\d{4})\s(\d{4})\s(\d{4})\b").expect("valid regex"),
        birth: Regex::new(r"(?i)year\s+of\s+birth|\bdob\b|date\s+of\s+birth").expect("valid regex"),
        gender: Regex::new(r"(?i)\b(male|female|transgender)\b").expect("valid regex"),
    })
}

/// 計算文件可信度分數 (0-10)。空記錄回傳 0，不會失敗
pub fn score_document(record: &DocumentRecord, expected_name: Option<&str>) -> Score {
    if record.is_empty() {
        tracing::debug!("Empty document record, scoring 0");
        return Score::new(0);
    }

    let p = patterns();
    let text = record.text();
    let mut score = 0;

    if p.government.is_match(&text) {
        score += GOVERNMENT_WEIGHT;
    }

    if p.aadhaar.is_match(&text) {
        score += AADHAAR_WEIGHT;
    }

    if let Some(uid) = extract_uid(record, &text) {
        score += UID_FORMAT_WEIGHT;
        if validate_aadhaar_checksum(&uid) {
            score += UID_CHECKSUM_WEIGHT;
        } else {
            tracing::debug!("UID failed Verhoeff checksum");
        }
    }

    if record.get("dob").is_some() || record.get("yob").is_some() || p.birth.is_match(&text) {
        score += BIRTH_WEIGHT;
    }

    if record.get("gender").is_some() || p.gender.is_match(&text) {
        score += GENDER_WEIGHT;
    }

    if let Some(expected) = expected_name.filter(|n| !n.trim().is_empty()) {
        let similarity = match record.get("name") {
            Some(extracted) => name_similarity(expected, extracted),
            None => name_coverage(expected, &text),
        };

        tracing::debug!("Name similarity for {:?}: {:.2}", expected, similarity);

        if similarity >= STRONG_NAME_SIMILARITY {
            score += STRONG_NAME_WEIGHT;
        } else if similarity >= WEAK_NAME_SIMILARITY {
            score += WEAK_NAME_WEIGHT;
        }
    }

    Score::new(score)
}

fn extract_uid(record: &DocumentRecord, text: &str) -> Option<String> {
    if let Some(uid) = record.get("uid") {
        let digits: String = uid.chars().filter(|c| !c.is_whitespace()).collect();
        if digits.len() == 12 && digits.chars().all(|c| c.is_ascii_digit()) {
            return Some(digits);
        }
    }

    patterns()
        .uid
        .captures(text)
        .map(|caps| format!("{}{}{}", &caps[1], &caps[2], &caps[3]))
}

const VERHOEFF_MULTIPLICATION: [[u8; 10]; 10] = [
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9],
    [1, 2, 3, 4, 0, 6, 7, 8, 9, 5],
    [2, 3, 4, 0, 1, 7, 8, 9, 5, 6],
    [3, 4, 0, 1, 2, 8, 9, 5, 6, 7],
    [4, 0, 1, 2, 3, 9, 5, 6, 7, 8],
    [5, 9, 8, 7, 6, 0, 4, 3, 2, 1],
    [6, 5, 9, 8, 7, 1, 0, 4, 3, 2],
    [7, 6, 5, 9, 8, 2, 1, 0, 4, 3],
    [8, 7, 6, 5, 9, 3, 2, 1, 0, 4],
    [9, 8, 7, 6, 5, 4, 3, 2, 1, 0],
];

const VERHOEFF_PERMUTATION: [[u8; 10]; 8] = [
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9],
    [1, 5, 7, 6, 2, 8, 3, 0, 9, 4],
    [5, 8, 0, 3, 7, 9, 6, 1, 4, 2],
    [8, 9, 1, 6, 0, 4, 3, 5, 2, 7],
    [9, 4, 5, 3, 1, 2, 6, 8, 7, 0],
    [4, 2, 8, 6, 5, 7, 3, 9, 0, 1],
    [2, 7, 9, 3, 8, 0, 6, 4, 1, 5],
    [7, 0, 4, 6, 9, 1, 3, 2, 5, 8],
];

/// Verhoeff check over a 12-digit Aadhaar number.
pub fn validate_aadhaar_checksum(uid: &str) -> bool {
    if uid.len() != 12 || !uid.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }

    let check = uid
        .bytes()
        .rev()
        .enumerate()
        .fold(0u8, |c, (i, b)| {
            let digit = (b - b'0') as usize;
            VERHOEFF_MULTIPLICATION[c as usize][VERHOEFF_PERMUTATION[i % 8][digit] as usize]
        });

    check == 0
}

fn normalize_tokens(name: &str) -> Vec<String> {
    name.split(|c: char| !c.is_alphabetic())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Similarity in `[0, 1]` between two person names.
pub fn name_similarity(expected: &str, extracted: &str) -> f64 {
    let expected_tokens = normalize_tokens(expected);
    let extracted_tokens = normalize_tokens(extracted);

    if expected_tokens.is_empty() || extracted_tokens.is_empty() {
        return 0.0;
    }

    let overlap = expected_tokens
        .iter()
        .filter(|t| extracted_tokens.contains(t))
        .count() as f64
        / expected_tokens.len().max(extracted_tokens.len()) as f64;

    let a = expected_tokens.join(" ");
    let b = extracted_tokens.join(" ");
    let longest = a.chars().count().max(b.chars().count()) as f64;
    let ratio = 1.0 - levenshtein(&a, &b) as f64 / longest;

    overlap.max(ratio)
}

/// Share of the expected name's tokens that appear anywhere in `text`.
fn name_coverage(expected: &str, text: &str) -> f64 {
    let expected_tokens = normalize_tokens(expected);
    if expected_tokens.is_empty() {
        return 0.0;
    }

    let text_tokens = normalize_tokens(text);
    let found = expected_tokens
        .iter()
        .filter(|t| text_tokens.contains(t))
        .count();

    found as f64 / expected_tokens.len() as f64
}

fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Classification;

    // Verhoeff-valid 12 digit number
    const VALID_UID: &str = "234123412346";

    fn qr_record(name: &str, uid: &str) -> DocumentRecord {
        [
            ("name", name),
            ("uid", uid),
            ("dob", "1990-01-01"),
            ("gender", "Female"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_verhoeff_checksum() {
        assert!(validate_aadhaar_checksum(VALID_UID));
        assert!(!validate_aadhaar_checksum("234123412345"));
        assert!(!validate_aadhaar_checksum("23412341234"));
        assert!(!validate_aadhaar_checksum("23412341234a"));
    }

    #[test]
    fn test_checksum_rejects_single_digit_typos() {
        let digits: Vec<u8> = VALID_UID.bytes().collect();
        for pos in 0..digits.len() {
            let mut typo = digits.clone();
            typo[pos] = if typo[pos] == b'9' { b'0' } else { typo[pos] + 1 };
            let typo = String::from_utf8(typo).unwrap();
            assert!(!validate_aadhaar_checksum(&typo), "accepted {}", typo);
        }
    }

    #[test]
    fn test_empty_record_scores_zero() {
        let score = score_document(&DocumentRecord::default(), Some("Jane Doe"));
        assert_eq!(score.value(), 0);
        assert_eq!(score.classification(), Classification::Flagged);

        let blank: DocumentRecord = [("name", "  ")].into_iter().collect();
        assert_eq!(score_document(&blank, None).value(), 0);
    }

    #[test]
    fn test_matching_qr_record_is_verified() {
        let score = score_document(&qr_record("Jane Doe", VALID_UID), Some("jane doe"));
        // uid 2 + checksum 1 + dob 1 + gender 1 + name 2
        assert_eq!(score.value(), 7);
        assert_eq!(score.classification(), Classification::Verified);
    }

    #[test]
    fn test_mismatched_name_loses_points() {
        let matched = score_document(&qr_record("Jane Doe", VALID_UID), Some("Jane Doe"));
        let mismatched = score_document(&qr_record("Rahul Kumar", VALID_UID), Some("Jane Doe"));
        assert!(mismatched < matched);
        assert_eq!(mismatched.value(), 5);
    }

    #[test]
    fn test_bad_checksum_record_is_flagged_without_name() {
        let record: DocumentRecord = [("name", "Jane Doe"), ("uid", "234123412345")]
            .into_iter()
            .collect();
        let score = score_document(&record, None);
        assert_eq!(score.value(), 2);
        assert_eq!(score.classification(), Classification::Flagged);
    }

    #[test]
    fn test_ocr_text_scoring_is_clamped() {
        let text = "GOVERNMENT OF INDIA\nAadhaar\nJane Doe\nYear of Birth: 1990\nFemale\n2341 2341 2346";
        let record: DocumentRecord = [("text", text)].into_iter().collect();

        let score = score_document(&record, Some("Jane Doe"));
        // 3 + 2 + 2 + 1 + 1 + 1 + 2 = 12, clamped
        assert_eq!(score.value(), 10);
    }

    #[test]
    fn test_ocr_text_without_markers_is_flagged() {
        let record: DocumentRecord = [("text", "grocery list: milk, eggs")].into_iter().collect();
        let score = score_document(&record, Some("Jane Doe"));
        assert_eq!(score.value(), 0);
        assert_eq!(score.classification(), Classification::Flagged);
    }

    #[test]
    fn test_name_similarity() {
        assert_eq!(name_similarity("Jane Doe", "JANE  DOE"), 1.0);
        assert!(name_similarity("Jane Doe", "Jane Do") >= 0.8);
        assert!(name_similarity("Jane Doe", "Rahul Kumar") < 0.5);
        assert_eq!(name_similarity("", "Jane"), 0.0);
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("same", "same"), 0);
    }
}
