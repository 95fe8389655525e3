//! Transport shared by both HTTP call paths: authentication, status checks
//! and conversion of transport failures into [`RemoteError`].

use reqwest::header::{HeaderValue, CONTENT_TYPE, LOCATION};
use reqwest::{Client, ClientBuilder, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use url::Url;

use super::endpoints::{queue_id_from_location, Endpoints};
use super::RemoteResult;
use crate::config::JenkinsConfig;
use crate::error::{BridgeError, RemoteError};

const USER_AGENT: &str = concat!("jenkins_bridge/", env!("CARGO_PKG_VERSION"));

/// Builder with the settings common to both paths.
pub(crate) fn client_builder(config: &JenkinsConfig) -> ClientBuilder {
    Client::builder()
        .user_agent(USER_AGENT)
        .danger_accept_invalid_certs(!config.verify_ssl)
}

pub(crate) fn build_client(builder: ClientBuilder) -> Result<Client, BridgeError> {
    builder
        .build()
        .map_err(|e| BridgeError::Configuration(format!("failed to build HTTP client: {}", e)))
}

#[derive(Debug, Clone)]
pub(crate) struct HttpCore {
    client: Client,
    endpoints: Endpoints,
    auth: Option<(String, String)>,
}

impl HttpCore {
    pub fn new(config: &JenkinsConfig, client: Client) -> Result<Self, BridgeError> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| BridgeError::Configuration("Jenkins URL is not set".to_string()))?;
        let endpoints =
            Endpoints::new(url).map_err(|e| BridgeError::Configuration(e.to_string()))?;
        let auth = config
            .credentials()
            .map(|(user, secret)| (user.to_string(), secret.to_string()));

        Ok(Self {
            client,
            endpoints,
            auth,
        })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Request with credentials attached.
    pub fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.auth {
            Some((user, secret)) => builder.basic_auth(user, Some(secret)),
            None => builder,
        }
    }

    /// Sends and fails on any non-2xx status.
    pub async fn send(&self, request: RequestBuilder) -> RemoteResult<Response> {
        let response = request.send().await.map_err(RemoteError::from_reqwest)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();
        Err(RemoteError::from_status(status.as_u16(), url, &body))
    }

    pub async fn json<T: DeserializeOwned>(&self, request: RequestBuilder) -> RemoteResult<T> {
        self.send(request)
            .await?
            .json()
            .await
            .map_err(RemoteError::from_reqwest)
    }

    pub async fn text(&self, request: RequestBuilder) -> RemoteResult<String> {
        self.send(request)
            .await?
            .text()
            .await
            .map_err(RemoteError::from_reqwest)
    }
}

// == Request Helpers ==
/// Attaches an XML body.
pub(crate) fn with_xml(request: RequestBuilder, config_xml: &str) -> RequestBuilder {
    request
        .header(CONTENT_TYPE, HeaderValue::from_static("application/xml"))
        .body(config_xml.to_string())
}

/// Build parameters as query pairs; strings pass through, other values use
/// their JSON text.
pub(crate) fn parameter_pairs(params: &Map<String, Value>) -> Vec<(String, String)> {
    params
        .iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            };
            (key.clone(), value)
        })
        .collect()
}

pub(crate) fn queue_id(response: &Response) -> Option<u64> {
    response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .and_then(queue_id_from_location)
}

pub(crate) fn jenkins_version(response: &Response) -> String {
    response
        .headers()
        .get("X-Jenkins")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| "Unknown".to_string())
}
