use serde_json::Value as JsonValue;

use crate::error::{Error, Result};
use crate::models::quiz::QuizDocument;
use crate::utils::slug::slugify;

pub const EXPORT_CONTENT_TYPE: &str = "application/json";

/// A serialized quiz ready to be offered as a download.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedDocument {
    pub filename: String,
    pub contents: Vec<u8>,
}

pub struct TransferService;

impl TransferService {
    pub fn export(document: &QuizDocument) -> Result<ExportedDocument> {
        Ok(ExportedDocument {
            filename: format!("{}.quiz.json", slugify(&document.title)),
            contents: serde_json::to_vec_pretty(document)?,
        })
    }

    /// Parses an exported quiz. The root must be an object with a `questions` array.
    pub fn parse(raw: &str) -> Result<QuizDocument> {
        let value: JsonValue = serde_json::from_str(raw)
            .map_err(|e| Error::Format(format!("not valid JSON: {}", e)))?;

        match value.get("questions") {
            Some(JsonValue::Array(_)) => {}
            Some(_) => return Err(Error::Format("`questions` must be an array".to_string())),
            None => return Err(Error::Format("missing `questions` array".to_string())),
        }

        serde_json::from_value(value).map_err(|e| Error::Format(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_names_file_after_title() {
        let mut doc = QuizDocument::new("1");
        doc.title = "Ujian Tengah Semester".into();
        let exported = TransferService::export(&doc).unwrap();
        assert_eq!(exported.filename, "ujian-tengah-semester.quiz.json");
    }

    #[test]
    fn rejects_documents_without_questions() {
        assert!(matches!(
            TransferService::parse(r#"{"title":"x"}"#),
            Err(Error::Format(_))
        ));
        assert!(matches!(
            TransferService::parse(r#"{"questions": {}}"#),
            Err(Error::Format(_))
        ));
        assert!(matches!(TransferService::parse("not json"), Err(Error::Format(_))));
        assert!(matches!(TransferService::parse("[]"), Err(Error::Format(_))));
    }

    #[test]
    fn malformed_question_is_a_format_error() {
        let raw = r#"{"questions": [{"id": "q", "type": "essay"}]}"#;
        assert!(matches!(TransferService::parse(raw), Err(Error::Format(_))));
    }
}
