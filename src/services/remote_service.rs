use std::time::Duration;

use reqwest::Client;
use tracing::info;
use url::Url;

use crate::dto::remote_dto::{PublishPayload, RemoteQuestion, RemoteQuestionList};
use crate::error::{Error, Result};

/// Client for the school backend's quiz endpoints.
#[derive(Clone)]
pub struct RemoteQuizService {
    client: Client,
    base_url: Url,
}

impl RemoteQuizService {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        info!("Remote quiz API enabled at {}", base_url);
        Ok(Self { client, base_url })
    }

    pub fn questions_url(&self, quiz_id: &str) -> Result<Url> {
        self.endpoint(&["quizzes", quiz_id, "questions"])
    }

    pub fn publish_url(&self, quiz_id: &str) -> Result<Url> {
        self.endpoint(&["quizzes", quiz_id, "publish"])
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("{} cannot be used as a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub async fn fetch_questions(&self, quiz_id: &str) -> Result<Vec<RemoteQuestion>> {
        let url = self.questions_url(quiz_id)?;
        info!("Fetching quiz questions from {}", url);
        let questions = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<RemoteQuestionList>()
            .await?
            .into_vec();
        Ok(questions)
    }

    pub async fn push_publish(&self, payload: &PublishPayload) -> Result<()> {
        let url = self.publish_url(&payload.quiz_id)?;
        info!(
            quiz_id = %payload.quiz_id,
            questions = payload.questions.len(),
            "Publishing quiz to {}",
            url
        );
        self.client
            .post(url)
            .json(payload)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
