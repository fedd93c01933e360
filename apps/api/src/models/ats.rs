use serde::{Deserialize, Deserializer, Serialize};

pub const MAX_SCORE: u8 = 100;

/// Output of the ATS collaborator. Replaced wholesale, never merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtsScoreRecord {
    /// 0 – 100
    #[serde(deserialize_with = "deserialize_score")]
    pub score: u8,
    pub suggestions: Vec<String>,
    pub keywords: Vec<String>,
}

/// Rounds any JSON number into 0..=100. Non-finite values score 0.
pub fn clamp_score(raw: f64) -> u8 {
    if raw.is_finite() {
        raw.round().clamp(0.0, f64::from(MAX_SCORE)) as u8
    } else {
        0
    }
}

fn deserialize_score<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    f64::deserialize(deserializer).map(clamp_score)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AtsRating {
    Excellent,
    Good,
    NeedsImprovement,
}

impl AtsScoreRecord {
    pub fn clamped(mut self) -> Self {
        self.score = self.score.min(MAX_SCORE);
        self
    }

    pub fn rating(&self) -> AtsRating {
        match self.score {
            80..=u8::MAX => AtsRating::Excellent,
            60..=79 => AtsRating::Good,
            _ => AtsRating::NeedsImprovement,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(score: u8) -> AtsScoreRecord {
        AtsScoreRecord {
            score,
            ..Default::default()
        }
    }

    #[test]
    fn test_rating_bands() {
        assert_eq!(record(95).rating(), AtsRating::Excellent);
        assert_eq!(record(80).rating(), AtsRating::Excellent);
        assert_eq!(record(79).rating(), AtsRating::Good);
        assert_eq!(record(60).rating(), AtsRating::Good);
        assert_eq!(record(59).rating(), AtsRating::NeedsImprovement);
        assert_eq!(record(0).rating(), AtsRating::NeedsImprovement);
    }

    #[test]
    fn test_out_of_range_blob_score_is_clamped() {
        let parsed: AtsScoreRecord = serde_json::from_str(r#"{"score": 250}"#).unwrap();
        assert_eq!(parsed.score, 100);
        assert_eq!(parsed.rating(), AtsRating::Excellent);

        let parsed: AtsScoreRecord = serde_json::from_str(r#"{"score": -4, "keywords": ["sql"]}"#).unwrap();
        assert_eq!(parsed.score, 0);
        assert_eq!(parsed.keywords, vec!["sql"]);

        let parsed: AtsScoreRecord = serde_json::from_str(r#"{"score": 71.6}"#).unwrap();
        assert_eq!(parsed.score, 72);
    }

    #[test]
    fn test_clamped_caps_direct_values() {
        assert_eq!(record(250).clamped().score, 100);
        assert_eq!(record(42).clamped().score, 42);
    }
}
