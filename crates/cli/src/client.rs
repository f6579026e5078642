//! The REST client.
//!
//! Thin reqwest wrapper over the server API. Every call authenticates with
//! Basic credentials; error bodies are decoded into a typed [`ClientError`]
//! so the caller can tell validation problems from transport ones.

use api_types::{
    category::CategoryDto,
    expense::{ExpenseDto, UpsertExpenseDto},
    user::{MeDto, PatchMeDto, UserDto},
};
use reqwest::{Method, StatusCode, Url};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("unauthorized: check email/password")]
    Unauthorized,
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("server error: {0}")]
    Server(String),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Url,
    email: String,
    password: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str, email: &str, password: &str) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url)
            .map_err(|err| ClientError::Server(format!("invalid base_url: {err}")))?;
        Ok(Self {
            base_url,
            email: email.to_string(),
            password: password.to_string(),
            http: reqwest::Client::new(),
        })
    }

    pub async fn expenses(&self) -> Result<Vec<ExpenseDto>, ClientError> {
        self.send(Method::GET, "api/expense", None::<&()>).await
    }

    pub async fn expense(&self, id: i32) -> Result<ExpenseDto, ClientError> {
        self.send(Method::GET, &format!("api/expense/{id}"), None::<&()>)
            .await
    }

    /// Creates an expense; the returned record is the server-confirmed one
    /// to merge into the snapshot.
    pub async fn create_expense(
        &self,
        payload: &UpsertExpenseDto,
    ) -> Result<ExpenseDto, ClientError> {
        self.send(Method::POST, "api/expense", Some(payload)).await
    }

    /// Creates or replaces an expense depending on `payload.id`.
    pub async fn upsert_expense(
        &self,
        payload: &UpsertExpenseDto,
    ) -> Result<ExpenseDto, ClientError> {
        self.send(Method::PUT, "api/expense", Some(payload)).await
    }

    pub async fn delete_expense(&self, id: i32) -> Result<(), ClientError> {
        let endpoint = self.endpoint(&format!("api/expense/{id}"))?;
        let res = self
            .http
            .delete(endpoint)
            .basic_auth(&self.email, Some(&self.password))
            .send()
            .await?;
        if res.status().is_success() {
            return Ok(());
        }
        Err(Self::error_from(res).await)
    }

    pub async fn users(&self) -> Result<Vec<UserDto>, ClientError> {
        self.send(Method::GET, "api/user", None::<&()>).await
    }

    pub async fn me(&self) -> Result<MeDto, ClientError> {
        self.send(Method::GET, "api/me", None::<&()>).await
    }

    pub async fn patch_me(&self, payload: &PatchMeDto) -> Result<MeDto, ClientError> {
        self.send(Method::PATCH, "api/me", Some(payload)).await
    }

    pub async fn categories(&self) -> Result<Vec<CategoryDto>, ClientError> {
        self.send(Method::GET, "api/category", None::<&()>).await
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|err| ClientError::Server(format!("invalid base_url: {err}")))
    }

    async fn send<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, ClientError>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize,
    {
        let endpoint = self.endpoint(path)?;
        let mut request = self
            .http
            .request(method, endpoint)
            .basic_auth(&self.email, Some(&self.password));
        if let Some(body) = body {
            request = request.json(body);
        }

        let res = request.send().await?;
        if res.status().is_success() {
            return Ok(res.json::<T>().await?);
        }
        Err(Self::error_from(res).await)
    }

    async fn error_from(res: reqwest::Response) -> ClientError {
        let status = res.status();
        let body = res
            .json::<ErrorResponse>()
            .await
            .map(|err| err.error)
            .unwrap_or_else(|_| "unknown error".to_string());
        tracing::debug!("request failed: {status} {body}");

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ClientError::Unauthorized,
            StatusCode::NOT_FOUND => ClientError::NotFound(body),
            StatusCode::CONFLICT => ClientError::Conflict(body),
            StatusCode::UNPROCESSABLE_ENTITY | StatusCode::BAD_REQUEST => {
                ClientError::Validation(body)
            }
            _ => ClientError::Server(body),
        }
    }
}
