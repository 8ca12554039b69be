use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Whatever the decoder printed, parsed as JSON and otherwise untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DecodeResult(pub Value);

impl DecodeResult {
    pub fn into_inner(self) -> Value {
        self.0
    }

    /// 攤平成字串欄位，供評分使用。非物件或巢狀值一律略過
    pub fn to_record(&self) -> DocumentRecord {
        let mut fields = BTreeMap::new();

        if let Value::Object(obj) = &self.0 {
            for (key, value) in obj {
                let text = match value {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    Value::Null | Value::Array(_) | Value::Object(_) => continue,
                };
                fields.insert(key.to_lowercase(), text);
            }
        }

        DocumentRecord { fields }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub fields: BTreeMap<String, String>,
}

impl DocumentRecord {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.fields.values().all(|v| v.trim().is_empty())
    }

    /// All field values joined by newlines.
    pub fn text(&self) -> String {
        self.fields
            .values()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for DocumentRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into().to_lowercase(), v.into()))
                .collect(),
        }
    }
}

pub const MAX_SCORE: u8 = 10;
pub const VERIFIED_THRESHOLD: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Score(u8);

impl Score {
    /// Values above [`MAX_SCORE`] are clamped.
    pub fn new(value: u32) -> Self {
        Self(value.min(MAX_SCORE as u32) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn classification(self) -> Classification {
        if self.0 >= VERIFIED_THRESHOLD {
            Classification::Verified
        } else {
            Classification::Flagged
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.0, MAX_SCORE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Verified,
    Flagged,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Verified => write!(f, "VERIFIED"),
            Classification::Flagged => write!(f, "FLAGGED FOR REVIEW"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreReport {
    pub score: Score,
    pub max_score: u8,
    pub classification: Classification,
    pub record: DocumentRecord,
}

impl ScoreReport {
    pub fn new(score: Score, record: DocumentRecord) -> Self {
        Self {
            score,
            max_score: MAX_SCORE,
            classification: score.classification(),
            record,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_threshold_boundary_is_verified() {
        assert_eq!(Score::new(5).classification(), Classification::Verified);
        assert_eq!(Score::new(4).classification(), Classification::Flagged);
        assert_eq!(Score::new(0).classification(), Classification::Flagged);
    }

    #[test]
    fn test_score_is_clamped() {
        assert_eq!(Score::new(12).value(), 10);
        assert_eq!(Score::new(10).to_string(), "10 / 10");
    }

    #[test]
    fn test_record_flattens_scalars_only() {
        let result = DecodeResult(json!({
            "verified": true,
            "Name": "Jane Doe",
            "uid": 123456789012u64,
            "photo": null,
            "address": { "city": "Pune" }
        }));

        let record = result.to_record();
        assert_eq!(record.get("name"), Some("Jane Doe"));
        assert_eq!(record.get("verified"), Some("true"));
        assert_eq!(record.get("uid"), Some("123456789012"));
        assert_eq!(record.get("photo"), None);
        assert_eq!(record.get("address"), None);
    }

    #[test]
    fn test_non_object_result_is_empty_record() {
        assert!(DecodeResult(json!(["a", "b"])).to_record().is_empty());
        assert!(DecodeResult(json!("text")).to_record().is_empty());
    }

    #[test]
    fn test_report_serializes_lowercase_classification() {
        let report = ScoreReport::new(Score::new(7), DocumentRecord::default());
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["score"], 7);
        assert_eq!(value["max_score"], 10);
        assert_eq!(value["classification"], "verified");
    }
}
