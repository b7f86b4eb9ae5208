use std::collections::BTreeMap;
use std::sync::Arc;

use quiz_builder::dto::builder_dto::{OptionPatch, QuestionPatch, SettingsPatch};
use quiz_builder::dto::remote_dto::RemoteQuestion;
use quiz_builder::error::Error;
use quiz_builder::models::question::QuestionType;
use quiz_builder::models::quiz::QuizStatus;
use quiz_builder::services::document_store::QuizDocumentStore;
use quiz_builder::storage::{DocumentRepository, MemoryRepository, StorageKey};

fn new_store(quiz_id: &str) -> (Arc<MemoryRepository>, QuizDocumentStore<Arc<MemoryRepository>>) {
    let repo = Arc::new(MemoryRepository::new());
    let store = QuizDocumentStore::load(repo.clone(), Some(quiz_id));
    (repo, store)
}

#[test]
fn new_multiple_choice_question_lifecycle() {
    let (_repo, mut store) = new_store("101");
    assert!(store.document().questions.is_empty());

    let qid = store.add_question(QuestionType::MultipleChoice);
    let question = store.document().question(&qid).unwrap().clone();
    let options = question.options.clone().unwrap();
    assert_eq!(options.len(), 2);
    assert!(options[0].correct);
    assert!(!options[1].correct);
    assert!(question.dirty);
    assert!(!question.collapsed);

    store.set_single_correct(&qid, &options[1].id);
    let options = store.document().question(&qid).unwrap().options.clone().unwrap();
    assert!(!options[0].correct);
    assert!(options[1].correct);

    store.finish_editing_question(&qid);
    let question = store.document().question(&qid).unwrap();
    assert!(!question.dirty);
    assert!(question.collapsed);
}

#[test]
fn export_then_import_restores_document() {
    let (_repo, mut store) = new_store("102");
    store.set_title("Kuis Biologi");
    let mc = store.add_question(QuestionType::MultipleChoice);
    store.add_option(&mc);
    let text = store.add_question(QuestionType::Paragraph);
    store.update_question(
        &text,
        QuestionPatch {
            answer_key_text: Some("Fotosintesis".into()),
            points: Some(2.5),
            ..QuestionPatch::default()
        },
    );
    store.update_settings(SettingsPatch {
        time_limit_minutes: Some(Some(30)),
        start_at: Some(Some("2024-08-01T07:00:00Z".into())),
        ..SettingsPatch::default()
    });
    let original = store.document().clone();

    let exported = store.export_document().unwrap();
    assert_eq!(exported.filename, "kuis-biologi.quiz.json");
    let raw = String::from_utf8(exported.contents).unwrap();

    let (_other_repo, mut other) = new_store("somewhere-else");
    tokio_test::assert_ok!(other.import_document(&raw));
    assert_eq!(other.document(), &original);
}

#[test]
fn updating_content_marks_dirty_until_finished() {
    let (_repo, mut store) = new_store("103");
    let qid = store.add_question(QuestionType::ShortText);
    store.finish_editing_question(&qid);
    assert!(!store.document().question(&qid).unwrap().dirty);

    store.update_question(&qid, QuestionPatch::title("x"));
    let question = store.document().question(&qid).unwrap();
    assert!(question.dirty);
    assert_eq!(question.title, "x");

    store.finish_editing_question(&qid);
    let question = store.document().question(&qid).unwrap();
    assert!(!question.dirty);
    assert!(question.collapsed);
}

#[test]
fn option_edits_mark_owning_question_dirty() {
    let (_repo, mut store) = new_store("104");
    let qid = store.add_question(QuestionType::Checkboxes);
    store.finish_editing_question(&qid);
    let option_id = store.document().question(&qid).unwrap().options.as_ref().unwrap()[1]
        .id
        .clone();

    store.update_option(
        &qid,
        &option_id,
        OptionPatch {
            text: Some("Mitokondria".into()),
            correct: Some(true),
        },
    );
    let question = store.document().question(&qid).unwrap();
    assert!(question.dirty);
    let options = question.options.as_ref().unwrap();
    assert_eq!(options[1].text, "Mitokondria");
    // checkboxes allow several correct answers
    assert!(options[0].correct && options[1].correct);

    store.finish_editing_question(&qid);
    store.remove_option(&qid, &option_id);
    let question = store.document().question(&qid).unwrap();
    assert!(question.dirty);
    assert_eq!(question.options.as_ref().unwrap().len(), 1);
}

#[test]
fn single_correct_leaves_exactly_one_answer() {
    let (_repo, mut store) = new_store("105");
    let qid = store.add_question(QuestionType::MultipleChoice);
    store.add_option(&qid);
    store.add_option(&qid);
    let ids: Vec<String> = store.document().question(&qid).unwrap().options.as_ref().unwrap()
        .iter()
        .map(|o| o.id.clone())
        .collect();

    for target in &ids {
        store.set_single_correct(&qid, target);
        let options = store.document().question(&qid).unwrap().options.as_ref().unwrap();
        let correct: Vec<&str> = options
            .iter()
            .filter(|o| o.correct)
            .map(|o| o.id.as_str())
            .collect();
        assert_eq!(correct, vec![target.as_str()]);
    }
}

#[test]
fn duplicate_is_independent_copy() {
    let (_repo, mut store) = new_store("106");
    let first = store.add_question(QuestionType::MultipleChoice);
    let last = store.add_question(QuestionType::ShortText);
    store.update_question(&first, QuestionPatch::title("Ibu kota Jawa Barat?"));

    let copy_id = store.duplicate_question(&first).created_id.unwrap();
    let questions = &store.document().questions;
    assert_eq!(questions.len(), 3);
    assert_eq!(questions[0].id, first);
    assert_eq!(questions[1].id, copy_id);
    assert_eq!(questions[2].id, last);

    let original = questions[0].clone();
    let copy = questions[1].clone();
    assert_ne!(original.id, copy.id);
    assert_eq!(copy.title, original.title);
    assert_eq!(copy.description, original.description);
    assert_eq!(copy.question_type, original.question_type);
    assert_eq!(copy.required, original.required);
    assert_eq!(copy.points, original.points);
    assert_eq!(copy.collapsed, original.collapsed);
    assert_eq!(copy.dirty, original.dirty);

    let original_options = original.options.unwrap();
    let copy_options = copy.options.unwrap();
    assert_eq!(original_options.len(), copy_options.len());
    for (a, b) in original_options.iter().zip(copy_options.iter()) {
        assert_ne!(a.id, b.id);
        assert_eq!(a.text, b.text);
        assert_eq!(a.correct, b.correct);
    }

    store.update_option(
        &copy_id,
        &copy_options[0].id,
        OptionPatch {
            text: Some("Bandung".into()),
            ..OptionPatch::default()
        },
    );
    let untouched = store.document().question(&first).unwrap().options.as_ref().unwrap();
    assert_eq!(untouched[0].text, "Opsi 1");
}

#[test]
fn switching_type_clears_and_restores_options() {
    let (_repo, mut store) = new_store("107");
    let qid = store.add_question(QuestionType::MultipleChoice);

    store.update_question(&qid, QuestionPatch::question_type(QuestionType::ShortText));
    let question = store.document().question(&qid).unwrap();
    assert!(question.options.is_none());
    assert!(question.answer_key_text.is_some());

    store.update_question(&qid, QuestionPatch::question_type(QuestionType::MultipleChoice));
    let question = store.document().question(&qid).unwrap();
    let options = question.options.as_ref().unwrap();
    assert!(!options.is_empty());
    assert!(options[0].correct);
    assert!(question.answer_key_text.is_none());
}

#[test]
fn publish_payload_uses_letter_keys() {
    let (_repo, mut store) = new_store("108");
    let qid = store.add_question(QuestionType::MultipleChoice);
    store.update_question(&qid, QuestionPatch::title("Pilih satu"));

    let outcome = store.publish();
    assert_eq!(outcome.payload.quiz_id, "108");
    let q = &outcome.payload.questions[0];
    let expected: BTreeMap<String, String> = [("A", "Opsi 1"), ("B", "Opsi 2")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    assert_eq!(q.quiz_question_answers, expected);
    assert_eq!(q.quiz_question_correct, "A");
    assert_eq!(q.quiz_question_text, "Pilih satu");
    assert_eq!(store.document().status, QuizStatus::Published);
}

#[test]
fn import_without_questions_leaves_state_unchanged() {
    let (repo, mut store) = new_store("109");
    store.add_question(QuestionType::Checkboxes);
    let before = store.document().clone();
    let stored_before = repo.raw(store.key());

    let err = tokio_test::assert_err!(store.import_document(r#"{"title":"x"}"#));
    assert!(matches!(err, Error::Format(_)));
    assert_eq!(store.document(), &before);
    assert_eq!(repo.raw(store.key()), stored_before);
}

#[test]
fn remote_sync_replaces_questions_wholesale() {
    let (_repo, mut store) = new_store("110");
    store.add_question(QuestionType::ShortText);

    let answers: BTreeMap<String, String> = [("B", "Merah"), ("A", "Biru")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    store.sync_from_remote(vec![RemoteQuestion {
        quiz_question_id: "55".into(),
        quiz_question_text: "Warna langit?".into(),
        quiz_question_points: 1.0,
        quiz_question_explanation: None,
        quiz_question_answers: answers,
        quiz_question_correct: Some("A".into()),
    }]);

    let questions = &store.document().questions;
    assert_eq!(questions.len(), 1);
    let q = &questions[0];
    assert_eq!(q.id, "55");
    assert!(q.collapsed);
    assert!(!q.dirty);
    let options = q.options.as_ref().unwrap();
    assert_eq!(options[0].text, "Biru");
    assert!(options[0].correct);
    assert_eq!(options[1].text, "Merah");

    // re-publishing keeps the server id
    let outcome = store.prepare_publish();
    assert_eq!(outcome.payload.questions[0].quiz_question_id.as_deref(), Some("55"));
    assert_eq!(outcome.payload.questions[0].quiz_question_answers["A"], "Biru");
}

#[test]
fn reload_picks_up_mirrored_document() {
    let repo = Arc::new(MemoryRepository::new());
    let qid = {
        let mut store = QuizDocumentStore::load(repo.clone(), Some("111"));
        store.add_question(QuestionType::Paragraph)
    };

    let reloaded = QuizDocumentStore::load(repo.clone(), Some("111"));
    assert_eq!(reloaded.document().questions[0].id, qid);

    let stored = repo.load(&StorageKey::for_quiz(Some("111"))).unwrap().unwrap();
    assert_eq!(&stored, reloaded.document());
}

#[test]
fn corrupt_storage_starts_fresh_draft() {
    let repo = Arc::new(MemoryRepository::new());
    repo.insert_raw(&StorageKey::for_quiz(Some("112")), "{\"questions\": 4")
        .unwrap();

    let store = QuizDocumentStore::load(repo, Some("112"));
    assert_eq!(store.document().id, "112");
    assert!(store.document().questions.is_empty());
    assert_eq!(store.document().status, QuizStatus::Draft);
}
