use crate::errors::{AppError, Result};
use crate::models::{
    AuthResponse, LoginRequest, RegisterRequest, SaveVoteRequest, Vote, VotePermission, VoteStatus,
};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client as ReqwestClient, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

/// Client for the voting API. Holds the base URL and, once signed in, the
/// bearer token that gets attached to every request that has one.
pub struct ApiClient {
    base_url: String,
    client: ReqwestClient,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        ApiClient {
            base_url: base_url.into(),
            client: ReqwestClient::new(),
            token: None,
        }
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<AuthResponse> {
        let response = self
            .client
            .post(self.url("/auth/login"))
            .json(&LoginRequest { username, password })
            .send()
            .await?;
        required(interpret(response).await?)
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse> {
        let response = self
            .client
            .post(self.url("/auth/register"))
            .json(&RegisterRequest {
                username,
                email,
                password,
            })
            .send()
            .await?;
        required(interpret(response).await?)
    }

    pub async fn list_votes(&self, status: Option<VoteStatus>) -> Result<Vec<Vote>> {
        let mut request = self.client.get(self.url("/votes"));
        if let Some(status) = status {
            request = request.query(&[("status", status.to_string())]);
        }
        let response = self.authed(request).send().await?;
        required(interpret(response).await?)
    }

    pub async fn get_vote(&self, id: i64) -> Result<Vote> {
        let response = self
            .authed(self.client.get(self.url(&format!("/votes/{id}"))))
            .send()
            .await?;
        required(interpret(response).await?)
    }

    pub async fn create_vote(&self, request: &SaveVoteRequest) -> Result<Vote> {
        let response = self
            .authed(self.client.post(self.url("/votes")).json(request))
            .send()
            .await?;
        required(interpret(response).await?)
    }

    pub async fn update_vote(&self, id: i64, request: &SaveVoteRequest) -> Result<Vote> {
        let response = self
            .authed(
                self.client
                    .put(self.url(&format!("/votes/{id}")))
                    .json(request),
            )
            .send()
            .await?;
        required(interpret(response).await?)
    }

    pub async fn publish_vote(&self, id: i64) -> Result<()> {
        let response = self
            .authed(self.client.post(self.url(&format!("/votes/{id}/publish"))))
            .send()
            .await?;
        interpret(response).await?;
        Ok(())
    }

    pub async fn close_vote(&self, id: i64) -> Result<()> {
        let response = self
            .authed(self.client.post(self.url(&format!("/votes/{id}/close"))))
            .send()
            .await?;
        interpret(response).await?;
        Ok(())
    }

    pub async fn delete_vote(&self, id: i64) -> Result<()> {
        let response = self
            .authed(self.client.delete(self.url(&format!("/votes/{id}"))))
            .send()
            .await?;
        interpret(response).await?;
        Ok(())
    }

    pub async fn participate(&self, id: i64, option_id: i64) -> Result<()> {
        let response = self
            .authed(
                self.client
                    .post(self.url(&format!("/votes/{id}/participate")))
                    .query(&[("optionId", option_id)]),
            )
            .send()
            .await?;
        interpret(response).await?;
        Ok(())
    }

    pub async fn set_permission(&self, id: i64, permission: VotePermission) -> Result<()> {
        let response = self
            .authed(
                self.client
                    .put(self.url(&format!("/votes/{id}/permission")))
                    .query(&[("permission", permission.to_string())]),
            )
            .send()
            .await?;
        interpret(response).await?;
        Ok(())
    }

    /// Share-token lookup. The credential is optional here: attached when
    /// present so the server can recognize a returning voter, otherwise the
    /// call goes out anonymously.
    pub async fn share_vote(&self, token: &str) -> Result<Vote> {
        let response = self
            .authed(self.client.get(self.url(&format!("/votes/share/{token}"))))
            .send()
            .await?;
        required(interpret(response).await?)
    }

    pub async fn participate_share(&self, id: i64, option_id: i64, token: &str) -> Result<()> {
        let response = self
            .authed(
                self.client
                    .post(self.url(&format!("/votes/{id}/participate-share")))
                    .query(&[
                        ("optionId", option_id.to_string()),
                        ("token", token.to_string()),
                    ]),
            )
            .send()
            .await?;
        interpret(response).await?;
        Ok(())
    }
}

/// The one shared response-interpretation routine. Success with a JSON body
/// yields the parsed value; success with an empty or non-JSON body yields
/// `None` (some endpoints reply with nothing). Failure produces a `Server`
/// error whose message comes from the decode cascade.
async fn interpret(response: Response) -> Result<Option<Value>> {
    let status = response.status();
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.contains("application/json"))
        .unwrap_or(false);
    let text = response.text().await?;

    if status.is_success() {
        if is_json && !text.trim().is_empty() {
            if let Ok(value) = serde_json::from_str(&text) {
                return Ok(Some(value));
            }
        }
        return Ok(None);
    }

    let message = failure_message(status.as_u16(), is_json, &text);
    debug!("request failed: {status} {message}");
    Err(AppError::server(status.as_u16(), message))
}

fn required<T: DeserializeOwned>(body: Option<Value>) -> Result<T> {
    match body {
        Some(value) => Ok(serde_json::from_value(value)?),
        None => Err(AppError::EmptyResponse),
    }
}

/// Decode cascade for failure bodies: JSON `message`, else `error`, else a
/// flattened `errors` map, else the body itself; non-JSON bodies are used as
/// raw text; an empty body falls back to the bare status.
fn failure_message(status: u16, is_json: bool, body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return format!("HTTP {status}");
    }
    if !is_json {
        return trimmed.to_string();
    }

    let Ok(value) = serde_json::from_str::<Value>(trimmed) else {
        return trimmed.to_string();
    };

    match value {
        Value::String(text) => text,
        Value::Object(map) => {
            if let Some(Value::String(message)) = map.get("message") {
                return message.clone();
            }
            if let Some(Value::String(error)) = map.get("error") {
                return error.clone();
            }
            if let Some(Value::Object(errors)) = map.get("errors") {
                let joined = errors
                    .iter()
                    .map(|(field, detail)| match detail {
                        Value::String(text) => format!("{field}: {text}"),
                        other => format!("{field}: {other}"),
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                if !joined.is_empty() {
                    return joined;
                }
            }
            Value::Object(map).to_string()
        }
        other => other.to_string(),
    }
}
