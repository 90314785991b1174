use crate::domain::{
    ContainerId, CreateAck, CreateRequest, Credential, Engine, LogsAck, ManagedContainer,
    ManagedNetwork, MessageAck,
};
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// `Engine` over the remote engine's JSON HTTP API.
#[derive(Debug, Clone)]
pub struct HttpEngine {
    client: Client,
    base: String,
}

#[derive(Deserialize)]
struct LoginResponse {
    #[serde(default)]
    access_token: Option<String>,
}

impl HttpEngine {
    pub fn new(client: Client, base: impl Into<String>) -> Self {
        Self {
            client,
            base: base.into(),
        }
    }

    pub fn with_timeout(base: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::new(client, base))
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn url(&self, path: &str) -> String {
        let trimmed = path.trim_start_matches('/');
        format!("{}/{}", self.base.trim_end_matches('/'), trimmed)
    }

    /// `containers/{id}[/{action}]`, with the id encoded as a single path
    /// segment so it can never address another endpoint.
    fn container_url(&self, id: &ContainerId, action: Option<&str>) -> Result<Url> {
        let mut url = Url::parse(&self.url("containers"))
            .map_err(|err| Error::EngineCall(format!("invalid engine URL: {err}")))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| Error::EngineCall(format!("invalid engine URL: {}", self.base)))?;
            segments.push(id.as_str());
            if let Some(action) = action {
                segments.push(action);
            }
        }
        Ok(url)
    }

    fn authorize(&self, req: RequestBuilder, credential: &Credential) -> Result<RequestBuilder> {
        if credential.is_empty() {
            return Err(Error::Authentication("no access token; log in first".into()));
        }
        Ok(req.bearer_auth(credential.token()))
    }

    async fn send<T>(&self, req: RequestBuilder) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let res = handle_response(req.send().await?).await?;
        Ok(res.json().await?)
    }

    async fn send_authorized<T>(&self, req: RequestBuilder, credential: &Credential) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let req = self.authorize(req, credential)?;
        self.send(req).await
    }

    async fn container_action(
        &self,
        credential: &Credential,
        id: &ContainerId,
        action: &str,
    ) -> Result<MessageAck> {
        debug!(%id, action, "container action");
        let req = self.client.post(self.container_url(id, Some(action))?);
        self.send_authorized(req, credential).await
    }
}

async fn handle_response(res: Response) -> Result<Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let body = res.text().await.unwrap_or_default();
    let detail = extract_error_message(&body);
    warn!(%status, "engine rejected request");

    if status == StatusCode::UNAUTHORIZED
        || status == StatusCode::FORBIDDEN
        || status == StatusCode::UNPROCESSABLE_ENTITY
    {
        let message = match detail {
            Some(detail) => format!("{status}: {detail}"),
            None => status.to_string(),
        };
        return Err(Error::Authentication(message));
    }

    Err(Error::EngineCall(render_engine_error(status, &body)))
}

fn render_engine_error(status: StatusCode, body: &str) -> String {
    if let Some(detail) = extract_error_message(body) {
        return format!("{status}: {detail}");
    }
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed.starts_with('<') {
        format!("request failed with status {status}")
    } else {
        format!("{status}: {trimmed}")
    }
}

fn extract_error_message(body: &str) -> Option<String> {
    let value = serde_json::from_str::<Value>(body).ok()?;
    ["message", "msg", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(Value::as_str))
        .map(str::to_string)
}

#[async_trait]
impl Engine for HttpEngine {
    async fn login(&self, username: &str, password: &str) -> Result<Credential> {
        let req = self
            .client
            .post(self.url("login"))
            .json(&json!({ "username": username, "password": password }));
        let response: LoginResponse = self.send(req).await?;
        response
            .access_token
            .map(Credential::bearer)
            .ok_or(Error::UnexpectedResponseShape {
                operation: "login",
                field: "access_token",
            })
    }

    async fn register(&self, username: &str, password: &str) -> Result<MessageAck> {
        let req = self
            .client
            .post(self.url("register"))
            .json(&json!({ "username": username, "password": password }));
        self.send(req).await
    }

    async fn list_containers(&self, credential: &Credential) -> Result<Vec<ManagedContainer>> {
        let req = self.client.get(self.url("containers"));
        self.send_authorized(req, credential).await
    }

    async fn create_container(
        &self,
        credential: &Credential,
        request: &CreateRequest,
    ) -> Result<CreateAck> {
        debug!(name = %request.name, image = %request.image, "creating container");
        let req = self.client.post(self.url("containers")).json(request);
        self.send_authorized(req, credential).await
    }

    async fn start_container(
        &self,
        credential: &Credential,
        id: &ContainerId,
    ) -> Result<MessageAck> {
        self.container_action(credential, id, "start").await
    }

    async fn stop_container(
        &self,
        credential: &Credential,
        id: &ContainerId,
    ) -> Result<MessageAck> {
        self.container_action(credential, id, "stop").await
    }

    async fn restart_container(
        &self,
        credential: &Credential,
        id: &ContainerId,
    ) -> Result<MessageAck> {
        self.container_action(credential, id, "restart").await
    }

    async fn delete_container(
        &self,
        credential: &Credential,
        id: &ContainerId,
    ) -> Result<MessageAck> {
        let req = self.client.delete(self.container_url(id, None)?);
        self.send_authorized(req, credential).await
    }

    async fn container_logs(&self, credential: &Credential, id: &ContainerId) -> Result<LogsAck> {
        let req = self.client.get(self.container_url(id, Some("logs"))?);
        self.send_authorized(req, credential).await
    }

    async fn container_stats(&self, credential: &Credential, id: &ContainerId) -> Result<Value> {
        let req = self.client.get(self.container_url(id, Some("stats"))?);
        self.send_authorized(req, credential).await
    }

    async fn list_networks(&self, credential: &Credential) -> Result<Vec<ManagedNetwork>> {
        let req = self.client.get(self.url("networks"));
        self.send_authorized(req, credential).await
    }

    async fn create_network(&self, credential: &Credential, name: &str) -> Result<MessageAck> {
        let req = self
            .client
            .post(self.url("networks"))
            .json(&json!({ "name": name }));
        self.send_authorized(req, credential).await
    }
}
