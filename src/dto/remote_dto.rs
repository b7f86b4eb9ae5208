use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// A question as the remote quiz API returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteQuestion {
    /// Opaque server id. Numeric ids are kept in their decimal form.
    #[serde(alias = "id", deserialize_with = "deserialize_id_flexible")]
    pub quiz_question_id: String,
    #[serde(default)]
    pub quiz_question_text: String,
    #[serde(default, deserialize_with = "deserialize_f64_flexible")]
    pub quiz_question_points: f64,
    #[serde(default)]
    pub quiz_question_explanation: Option<String>,
    /// Answer text keyed by uppercase letter.
    #[serde(default)]
    pub quiz_question_answers: BTreeMap<String, String>,
    #[serde(default)]
    pub quiz_question_correct: Option<String>,
}

/// The remote list endpoint answers either with a bare array or wrapped in `data`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RemoteQuestionList {
    Bare(Vec<RemoteQuestion>),
    Wrapped { data: Vec<RemoteQuestion> },
}

impl RemoteQuestionList {
    pub fn into_vec(self) -> Vec<RemoteQuestion> {
        match self {
            RemoteQuestionList::Bare(items) => items,
            RemoteQuestionList::Wrapped { data } => data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishPayload {
    pub quiz_id: String,
    pub questions: Vec<PublishQuestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishQuestion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz_question_id: Option<String>,
    pub quiz_question_quiz_id: String,
    pub quiz_question_type: String,
    pub quiz_question_text: String,
    pub quiz_question_points: f64,
    pub quiz_question_answers: BTreeMap<String, String>,
    pub quiz_question_correct: String,
    pub quiz_question_explanation: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Int(i64),
    Float(f64),
    String(String),
}

fn deserialize_id_flexible<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let id = match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Int(i) => i.to_string(),
        NumberOrString::Float(f) if f.fract() == 0.0 => format!("{:.0}", f),
        NumberOrString::Float(f) => {
            return Err(serde::de::Error::custom(format!(
                "Invalid question id: {}",
                f
            )))
        }
        NumberOrString::String(s) => s.trim().to_string(),
    };
    if id.is_empty() {
        return Err(serde::de::Error::custom("Question id cannot be empty"));
    }
    Ok(id)
}

fn deserialize_f64_flexible<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(0.0),
        Some(NumberOrString::Int(i)) => Ok(i as f64),
        Some(NumberOrString::Float(f)) => Ok(f),
        Some(NumberOrString::String(s)) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("Invalid points value: {}", s))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_numeric_strings_from_backend() {
        let q: RemoteQuestion = serde_json::from_str(
            r#"{
                "quiz_question_id": "17",
                "quiz_question_text": "2 + 2 = ?",
                "quiz_question_points": "2.5",
                "quiz_question_explanation": null,
                "quiz_question_answers": {"B": "4", "A": "3"},
                "quiz_question_correct": "B"
            }"#,
        )
        .unwrap();
        assert_eq!(q.quiz_question_id, "17");
        assert_eq!(q.quiz_question_points, 2.5);
        assert_eq!(q.quiz_question_correct.as_deref(), Some("B"));
    }

    #[test]
    fn list_may_be_wrapped_in_data() {
        let wrapped: RemoteQuestionList =
            serde_json::from_str(r#"{"data": [{"id": 3, "quiz_question_text": "x"}]}"#).unwrap();
        let items = wrapped.into_vec();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quiz_question_id, "3");
        assert_eq!(items[0].quiz_question_points, 0.0);

        let bare: RemoteQuestionList = serde_json::from_str("[]").unwrap();
        assert!(bare.into_vec().is_empty());
    }

    #[test]
    fn uuid_ids_are_accepted() {
        let list: RemoteQuestionList = serde_json::from_str(
            r#"[{
                "quiz_question_id": "3fa85f64-5717-4562-b3fc-2c963f66afa6",
                "quiz_question_text": "Planet terbesar?",
                "quiz_question_points": 1,
                "quiz_question_answers": {"A": "Jupiter", "B": "Mars"},
                "quiz_question_correct": "A"
            }]"#,
        )
        .unwrap();
        let items = list.into_vec();
        assert_eq!(items[0].quiz_question_id, "3fa85f64-5717-4562-b3fc-2c963f66afa6");
    }

    #[test]
    fn blank_id_is_rejected() {
        let parsed = serde_json::from_str::<RemoteQuestion>(r#"{"quiz_question_id": "  "}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn publish_question_omits_missing_remote_id() {
        let q = PublishQuestion {
            quiz_question_id: None,
            quiz_question_quiz_id: "9".into(),
            quiz_question_type: "single".into(),
            quiz_question_text: "t".into(),
            quiz_question_points: 1.0,
            quiz_question_answers: BTreeMap::new(),
            quiz_question_correct: "A".into(),
            quiz_question_explanation: String::new(),
        };
        let value = serde_json::to_value(&q).unwrap();
        assert!(value.get("quiz_question_id").is_none());
    }
}
