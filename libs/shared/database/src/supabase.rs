use anyhow::{anyhow, Result};
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

use shared_config::AppConfig;

/// Postgres error codes that PostgREST surfaces when the booking guard
/// function rejects a conflicting insert/update.
const CONFLICT_CODES: &[&str] = &["23505", "23P01", "P0001"];

#[derive(Error, Debug)]
pub enum RpcError {
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("{0}")]
    Request(String),
}

pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.clone(),
            anon_key: config.supabase_anon_key.clone(),
        }
    }

    fn get_headers(&self, auth_token: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert("apikey", HeaderValue::from_str(&self.anon_key).unwrap());
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = auth_token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
            );
        }

        headers
    }

    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.request_with_headers(method, path, auth_token, body, None)
            .await
    }

    pub async fn request_with_headers<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making request to {}", url);

        let mut headers = self.get_headers(auth_token);
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url).headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("API error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                401 | 403 => anyhow!("Authentication error: {}", error_text),
                404 => anyhow!("Resource not found: {}", error_text),
                _ => anyhow!("API error ({}): {}", status, error_text),
            });
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }

    /// Invoke a Postgres function through PostgREST. Conflict-class failures
    /// (unique/exclusion violations, guard functions raising an exception)
    /// come back as `RpcError::Conflict` so callers can map them to 409.
    pub async fn rpc<T>(
        &self,
        function: &str,
        auth_token: Option<&str>,
        args: Value,
    ) -> Result<T, RpcError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}/rest/v1/rpc/{}", self.base_url, function);
        debug!("Calling rpc {}", function);

        let response = self
            .client
            .post(&url)
            .headers(self.get_headers(auth_token))
            .json(&args)
            .send()
            .await
            .map_err(|e| RpcError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .map_err(|e| RpcError::Request(e.to_string()))?;

            let code = serde_json::from_str::<Value>(&error_text)
                .ok()
                .and_then(|v| v["code"].as_str().map(String::from))
                .unwrap_or_default();

            error!("rpc {} failed ({}, code {}): {}", function, status, code, error_text);

            if status.as_u16() == 409 || CONFLICT_CODES.contains(&code.as_str()) {
                return Err(RpcError::Conflict(error_text));
            }
            return Err(RpcError::Request(format!(
                "rpc {} failed ({}): {}",
                function, status, error_text
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| RpcError::Request(e.to_string()))
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }
}
