use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use url::Url;

use crate::error::Error;
use crate::types::{
    CsrfToken, Identity, LessonCountByDate, LessonRecord, NoticeInfo, UserId, UserToken,
};

const CSRF_HEADER: &str = "X-CSRFToken";

const RELEVANT_LESSONS_PATH: &str = "api/get-relevant-lessons";
const TOKEN_PATH: &str = "api/get-token";

/// Lesson site API configuration.
///
/// ```rust,ignore
/// use lesson_notices::ApiConfig;
///
/// let config = ApiConfig::new("https://lessons.example.com/".parse()?)
///     .with_csrf_token("csrf-from-page");
/// ```
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ApiConfig {
    pub(crate) base_url: Url,
    pub(crate) csrf_token: Option<CsrfToken>,
}

impl ApiConfig {
    /// Create a configuration rooted at `base_url`.
    ///
    /// Endpoints are joined relative to the base, so a missing trailing `/` is added.
    #[must_use]
    pub fn new(mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self {
            base_url,
            csrf_token: None,
        }
    }

    /// Create config from environment variables.
    ///
    /// # Required env vars
    /// - `LESSONS_API_BASE_URL`: site root the `api/...` endpoints live under
    ///
    /// # Optional env vars
    /// - `LESSONS_CSRF_TOKEN`: value for the `X-CSRFToken` header
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the base URL is missing or invalid.
    pub fn from_env() -> Result<Self, Error> {
        let base_url_str = std::env::var("LESSONS_API_BASE_URL")
            .map_err(|_| Error::Config("LESSONS_API_BASE_URL is required".into()))?;
        let base_url: Url = base_url_str
            .parse()
            .map_err(|e| Error::Config(format!("LESSONS_API_BASE_URL: {e}")))?;

        let mut config = Self::new(base_url);
        if let Ok(token) = std::env::var("LESSONS_CSRF_TOKEN") {
            config = config.with_csrf_token(token);
        }
        Ok(config)
    }

    /// Set the anti-forgery token sent with every request.
    #[must_use]
    pub fn with_csrf_token(mut self, token: impl Into<String>) -> Self {
        self.csrf_token = Some(CsrfToken(token.into()));
        self
    }

    /// Site root.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Anti-forgery token, if configured.
    #[must_use]
    pub fn csrf_token(&self) -> Option<&CsrfToken> {
        self.csrf_token.as_ref()
    }

    fn endpoint(&self, path: &str) -> Result<Url, Error> {
        self.base_url
            .join(path)
            .map_err(|e| Error::Config(format!("{path}: {e}")))
    }

    fn notification_url(&self, user_id: &UserId) -> Result<Url, Error> {
        self.endpoint(&format!("api/notification/{user_id}/"))
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    token: UserToken,
}

#[derive(Serialize)]
struct NoticePatch {
    notice: bool,
}

/// HTTP client for the lesson site's notice endpoints.
#[derive(Clone)]
pub struct ApiClient {
    config: ApiConfig,
    http: reqwest::Client,
}

impl ApiClient {
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Fetch the lessons the backend considers relevant (it scopes the date range).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on network failure, [`Error::Status`] on any
    /// non-200 response, or [`Error::Parse`] if the body is not valid JSON.
    pub async fn relevant_lessons(&self) -> Result<Vec<LessonRecord>, Error> {
        let operation = "relevant lessons request";
        let url = self.config.endpoint(RELEVANT_LESSONS_PATH)?;
        let request = self.request(reqwest::Method::GET, url);
        let response = Self::ensure_success(request.send().await?, operation)?;
        Self::parse_json(response, operation).await
    }

    /// Fetch relevant lessons and count them per date.
    ///
    /// # Errors
    ///
    /// Same as [`relevant_lessons`](Self::relevant_lessons).
    pub async fn lesson_counts(&self) -> Result<LessonCountByDate, Error> {
        let counts: LessonCountByDate = self.relevant_lessons().await?.into_iter().collect();
        tracing::debug!(dates = counts.len(), lessons = counts.total(), "Lesson counts loaded");
        Ok(counts)
    }

    /// Exchange phone/telegram identity for a user token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Status`] if no such user exists (the backend answers 404)
    /// or on any other non-200 response.
    pub async fn get_token(&self, identity: &Identity) -> Result<UserToken, Error> {
        let operation = "token request";
        let request = self
            .request(reqwest::Method::POST, self.config.endpoint(TOKEN_PATH)?)
            .json(identity);
        let response = Self::ensure_success(request.send().await?, operation)?;
        let body: TokenResponse = Self::parse_json(response, operation).await?;
        Ok(body.token)
    }

    /// Fetch the per-user notice flag.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Status`] on any non-200 response.
    pub async fn get_notice_info(
        &self,
        user_id: &UserId,
        user_token: &UserToken,
    ) -> Result<NoticeInfo, Error> {
        let operation = "notice info request";
        let request = self
            .request(reqwest::Method::GET, self.config.notification_url(user_id)?)
            .header(AUTHORIZATION, token_auth(user_token));
        let response = Self::ensure_success(request.send().await?, operation)?;
        Self::parse_json(response, operation).await
    }

    /// Update the user's notice preference. Returns the object echoed by the backend.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Status`] on any non-200 response.
    pub async fn change_notice_status(
        &self,
        user_id: &UserId,
        user_token: &UserToken,
        notice: bool,
    ) -> Result<JsonValue, Error> {
        let operation = "notice status update";
        let request = self
            .request(reqwest::Method::PATCH, self.config.notification_url(user_id)?)
            .header(AUTHORIZATION, token_auth(user_token))
            .json(&NoticePatch { notice });
        let response = Self::ensure_success(request.send().await?, operation)?;
        Self::parse_json(response, operation).await
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        let builder = self
            .http
            .request(method, url)
            .header(CONTENT_TYPE, "application/json");
        match &self.config.csrf_token {
            Some(csrf) => builder.header(CSRF_HEADER, csrf.as_str()),
            None => builder,
        }
    }

    /// Success is strictly `200 OK`; every other status is an error.
    fn ensure_success(
        response: reqwest::Response,
        operation: &'static str,
    ) -> Result<reqwest::Response, Error> {
        let status = response.status();
        if status == StatusCode::OK {
            return Ok(response);
        }
        tracing::warn!(operation, status = status.as_u16(), "Unexpected response status");
        Err(Error::Status {
            operation,
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
        })
    }

    async fn parse_json<T: DeserializeOwned>(
        response: reqwest::Response,
        operation: &'static str,
    ) -> Result<T, Error> {
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|source| Error::Parse { operation, source })
    }
}

fn token_auth(user_token: &UserToken) -> String {
    format!("Token {}", user_token.as_str())
}
