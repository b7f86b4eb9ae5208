use std::collections::BTreeMap;

use serde::Serialize;
use tracing::warn;

use crate::dto::remote_dto::{PublishPayload, PublishQuestion};
use crate::models::question::{Question, QuestionType};
use crate::models::quiz::QuizDocument;

const REMOTE_QUESTION_TYPE: &str = "single";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublishOutcome {
    pub payload: PublishPayload,
    pub skipped: Vec<SkippedQuestion>,
}

/// A question left out of the publish payload, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedQuestion {
    pub question_id: String,
    pub question_type: QuestionType,
    pub reason: String,
}

/// Letter for the option at `index`: A..Z, then AA, AB, ...
pub fn option_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(char::from(b'A' + rem as u8));
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Inverse of [`option_letter`]; `None` for anything but uppercase ASCII letters.
pub fn letter_index(letter: &str) -> Option<usize> {
    if letter.is_empty() || !letter.bytes().all(|b| b.is_ascii_uppercase()) {
        return None;
    }
    let n = letter.bytes().try_fold(0usize, |acc, b| {
        acc.checked_mul(26)?.checked_add((b - b'A' + 1) as usize)
    })?;
    Some(n - 1)
}

pub struct PublishService;

impl PublishService {
    /// Builds the server payload. Only multiple choice questions can be sent;
    /// everything else is reported in `skipped`.
    pub fn build(document: &QuizDocument) -> PublishOutcome {
        let mut questions = Vec::new();
        let mut skipped = Vec::new();

        for question in &document.questions {
            match Self::to_publish_question(&document.id, question) {
                Ok(q) => questions.push(q),
                Err(reason) => {
                    warn!(
                        quiz_id = %document.id,
                        question_id = %question.id,
                        question_type = %question.question_type,
                        "Question excluded from publish payload: {}",
                        reason
                    );
                    skipped.push(SkippedQuestion {
                        question_id: question.id.clone(),
                        question_type: question.question_type,
                        reason,
                    });
                }
            }
        }

        PublishOutcome {
            payload: PublishPayload {
                quiz_id: document.id.clone(),
                questions,
            },
            skipped,
        }
    }

    fn to_publish_question(
        quiz_id: &str,
        question: &Question,
    ) -> std::result::Result<PublishQuestion, String> {
        if question.question_type != QuestionType::MultipleChoice {
            return Err(format!(
                "{} questions are not supported by the quiz API",
                question.question_type
            ));
        }
        let options = match question.options.as_deref() {
            Some(options) if !options.is_empty() => options,
            _ => return Err("multiple choice question has no options".to_string()),
        };

        let answers: BTreeMap<String, String> = options
            .iter()
            .enumerate()
            .map(|(idx, option)| (option_letter(idx), option.text.clone()))
            .collect();
        let correct_index = options.iter().position(|o| o.correct).unwrap_or(0);

        Ok(PublishQuestion {
            quiz_question_id: question.remote_id.clone(),
            quiz_question_quiz_id: quiz_id.to_string(),
            quiz_question_type: REMOTE_QUESTION_TYPE.to_string(),
            quiz_question_text: question.title.clone(),
            quiz_question_points: question.points,
            quiz_question_answers: answers,
            quiz_question_correct: option_letter(correct_index),
            quiz_question_explanation: question.description.clone(),
        })
    }
}
