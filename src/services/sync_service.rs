use crate::dto::remote_dto::RemoteQuestion;
use crate::models::question::{Question, QuestionType, QuizOption};
use crate::services::publish_service::letter_index;

/// Maps the remote question list into local questions. Remote questions are
/// single-answer multiple choice and arrive collapsed and clean.
pub fn map_remote_questions(remote: Vec<RemoteQuestion>) -> Vec<Question> {
    remote.into_iter().map(map_remote_question).collect()
}

fn map_remote_question(remote: RemoteQuestion) -> Question {
    let correct_key = remote
        .quiz_question_correct
        .as_deref()
        .map(|k| k.trim().to_ascii_uppercase());

    let mut answers: Vec<(String, String)> = remote.quiz_question_answers.into_iter().collect();
    answers.sort_by(|(a, _), (b, _)| {
        let ka = (letter_index(a).unwrap_or(usize::MAX), a.as_str());
        let kb = (letter_index(b).unwrap_or(usize::MAX), b.as_str());
        ka.cmp(&kb)
    });

    let options: Vec<QuizOption> = answers
        .into_iter()
        .map(|(key, text)| {
            let correct = correct_key.as_deref() == Some(key.trim());
            QuizOption::new(text, correct)
        })
        .collect();

    let mut question = Question {
        id: remote.quiz_question_id.clone(),
        remote_id: Some(remote.quiz_question_id),
        title: remote.quiz_question_text,
        description: remote.quiz_question_explanation.unwrap_or_default(),
        question_type: QuestionType::MultipleChoice,
        required: false,
        points: remote.quiz_question_points,
        options: Some(options),
        answer_key_text: None,
        collapsed: true,
        dirty: false,
    };
    question.conform_to_type();
    question
}
