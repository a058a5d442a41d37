use std::sync::Arc;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use secrecy::Secret;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};
use url::Url;

use crate::assessment::{NewTest, Test, TestId};
use crate::auth::AuthSession;
use crate::category::{Category, CategoryId, CategoryPayload};
use crate::error::{ApiError, ImportError, SubmitError};
use crate::handoff::HandoffStore;
use crate::import::{ImportReport, ImportRow};
use crate::question::{Question, QuestionFilter, QuestionId, QuestionPage, QuestionPayload};
use crate::raw_data::{RawErrorBody, RawLogin, RawLoginResponse, RawPublicTest, RawSubmission};
use crate::results::{ResultDetail, ResultId, ResultSummary};
use crate::session::{AssessmentSession, PublicTest, View};
use crate::tree::CategoryTree;

/// Client for the portal REST backend.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    auth: Arc<AuthSession>,
}

impl ApiClient {
    #[must_use]
    pub fn new(mut base: Url, auth: Arc<AuthSession>) -> Self {
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Self {
            http: reqwest::Client::new(),
            base,
            auth,
        }
    }

    #[must_use]
    pub fn auth(&self) -> &Arc<AuthSession> {
        &self.auth
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<(), ApiError> {
        let response: RawLoginResponse = self
            .send_json(Method::POST, "auth/login", &RawLogin { email, password })
            .await?
            .json()
            .await?;
        let role = response
            .user
            .and_then(|user| user.role)
            .map(|role| role.role_name);

        info!(role = role.as_deref().unwrap_or("none"), "signed in");
        self.auth.sign_in(Secret::new(response.token), role);

        Ok(())
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        self.get_json("categories/").await
    }

    pub async fn create_category(&self, payload: &CategoryPayload) -> Result<(), ApiError> {
        self.send_json(Method::POST, "categories/", payload).await?;
        info!(name = %payload.name, "category created");
        Ok(())
    }

    pub async fn update_category(
        &self,
        id: CategoryId,
        payload: &CategoryPayload,
    ) -> Result<(), ApiError> {
        self.send_json(Method::PUT, &format!("categories/{id}"), payload)
            .await?;
        info!(id, "category updated");
        Ok(())
    }

    pub async fn delete_category(&self, id: CategoryId) -> Result<(), ApiError> {
        self.delete(&format!("categories/{id}")).await?;
        info!(id, "category deleted");
        Ok(())
    }

    pub async fn list_questions(&self, filter: &QuestionFilter) -> Result<QuestionPage, ApiError> {
        let request = self.request(Method::GET, "questions/")?.query(filter);

        self.fetch(request).await
    }

    /// Every question in the bank, walking all pages.
    pub async fn all_questions(&self) -> Result<Vec<Question>, ApiError> {
        let mut filter = QuestionFilter::everything();
        let mut questions = Vec::new();

        loop {
            let page = self.list_questions(&filter).await?;
            let last = page.items.is_empty()
                || u64::from(filter.page) >= page.total_pages(filter.per_page);

            questions.extend(page.items);
            if last {
                return Ok(questions);
            }
            filter.page += 1;
        }
    }

    pub async fn create_question(&self, payload: &QuestionPayload) -> Result<(), ApiError> {
        self.send_json(Method::POST, "questions/", payload).await?;
        info!(category_id = payload.category_id, "question created");
        Ok(())
    }

    pub async fn update_question(
        &self,
        id: QuestionId,
        payload: &QuestionPayload,
    ) -> Result<(), ApiError> {
        self.send_json(Method::PUT, &format!("questions/{id}"), payload)
            .await?;
        info!(id, "question updated");
        Ok(())
    }

    pub async fn delete_question(&self, id: QuestionId) -> Result<(), ApiError> {
        self.delete(&format!("questions/{id}")).await?;
        info!(id, "question deleted");
        Ok(())
    }

    pub async fn list_tests(&self) -> Result<Vec<Test>, ApiError> {
        self.get_json("tests/my-tests").await
    }

    pub async fn create_test(&self, test: &NewTest) -> Result<(), ApiError> {
        self.send_json(Method::POST, "tests/create", test).await?;
        info!(
            name = %test.test_name,
            questions = test.questions.len(),
            "test created"
        );
        Ok(())
    }

    pub async fn delete_test(&self, id: TestId) -> Result<(), ApiError> {
        self.delete(&format!("tests/{id}")).await?;
        info!(id, "test deleted");
        Ok(())
    }

    pub async fn list_results(&self) -> Result<Vec<ResultSummary>, ApiError> {
        self.get_json("candidates/results").await
    }

    pub async fn result_detail(&self, id: ResultId) -> Result<ResultDetail, ApiError> {
        self.get_json(&format!("candidates/result/{id}")).await
    }

    pub async fn delete_result(&self, id: ResultId) -> Result<(), ApiError> {
        self.delete(&format!("candidates/response/{id}")).await?;
        info!(id, "result deleted");
        Ok(())
    }

    pub async fn list_candidates(
        &self,
        test_id: Option<TestId>,
    ) -> Result<Vec<serde_json::Value>, ApiError> {
        #[derive(Serialize)]
        struct Query {
            #[serde(skip_serializing_if = "Option::is_none")]
            test_id: Option<TestId>,
        }

        let request = self
            .request(Method::GET, "candidates/")?
            .query(&Query { test_id });

        self.fetch(request).await
    }

    pub async fn public_test(&self, test_code: &str) -> Result<PublicTest, ApiError> {
        let raw: RawPublicTest = self
            .get_json(&format!("candidates/test/{test_code}"))
            .await?;

        Ok(raw.into())
    }

    pub async fn submit_result(&self, submission: &RawSubmission) -> Result<(), ApiError> {
        self.send_json(Method::POST, "candidates/submit", submission)
            .await?;
        Ok(())
    }

    /// Submits a session waiting in preview. On success the candidate identity
    /// is dropped from the handoff store; on failure the session stays in
    /// preview and can be submitted again.
    pub async fn submit_session(
        &self,
        session: &mut AssessmentSession,
        handoff: &dyn HandoffStore,
    ) -> Result<View, SubmitError> {
        let submission = session.begin_submit()?;
        let test_code = submission.test_code.clone();
        let time_taken = submission.time_taken;

        let outcome = self.submit_result(&submission.into()).await;
        let view = session.finish_submit(outcome.is_ok())?;
        outcome?;

        if let Err(err) = handoff.clear(&test_code) {
            warn!(%test_code, %err, "failed to clear candidate handoff");
        }
        info!(%test_code, time_taken, "test submitted");

        Ok(view)
    }

    /// Creates every row independently and reports how many made it.
    ///
    /// Nothing is sent when a category name is used twice, since rows could
    /// not be filed unambiguously.
    pub async fn import_questions(
        &self,
        categories: &[Category],
        rows: &[ImportRow],
    ) -> Result<ImportReport, ImportError> {
        let tree = CategoryTree::validated(categories)?;
        let mut report = ImportReport::default();

        for (index, row) in rows.iter().enumerate() {
            let outcome = match row.to_payload(&tree) {
                Ok(payload) => self
                    .create_question(&payload)
                    .await
                    .map_err(|err| err.to_string()),
                Err(err) => Err(err.to_string()),
            };

            if let Err(reason) = &outcome {
                // +2: one for the header, one for 1-based line numbers.
                warn!(line = index + 2, %reason, "import row failed");
            }
            report.record(outcome.is_ok());
        }

        Ok(report)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = self.request(Method::GET, path)?;

        self.fetch(request).await
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        Ok(self.send(request).await?.json().await?)
    }

    async fn send_json<B>(&self, method: Method, path: &str, body: &B) -> Result<Response, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let request = self.request(method, path)?.json(body);

        self.send(request).await
    }

    async fn delete(&self, path: &str) -> Result<Response, ApiError> {
        let request = self.request(Method::DELETE, path)?;

        self.send(request).await
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.base.join(path)?;
        debug!(%method, %url, "request");

        let request = self.http.request(method, url);

        Ok(match self.auth.bearer() {
            Some(bearer) => request.header(reqwest::header::AUTHORIZATION, bearer),
            None => request,
        })
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            warn!("backend rejected credentials, signing out");
            self.auth.sign_out();
            return Err(ApiError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<RawErrorBody>(&body)
                .map(|body| body.error)
                .unwrap_or(body);

            return Err(ApiError::Status { status, message });
        }

        Ok(response)
    }
}
