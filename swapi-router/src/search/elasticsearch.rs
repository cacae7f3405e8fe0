//! Elasticsearch REST client.

use std::time::Duration;

use async_trait::async_trait;
use http::StatusCode;
use http::header::CONTENT_TYPE;
use url::Url;

use super::BulkEntry;
use super::BulkResponse;
use super::SearchClient;
use super::SearchRequest;
use super::SearchResponse;
use super::bulk_body;
use crate::error::EngineError;
use crate::json_ext::Value;

const NDJSON: &str = "application/x-ndjson";

/// A [`SearchClient`] talking to an Elasticsearch node over HTTP.
#[derive(Clone, Debug)]
pub struct ElasticsearchClient {
    http_client: reqwest::Client,
    endpoint: Url,
}

impl ElasticsearchClient {
    /// Construct a client for the node at `endpoint`, e.g. `http://localhost:9200`.
    pub fn new(mut endpoint: Url, timeout: Option<Duration>) -> Result<Self, EngineError> {
        // Url::join replaces the last path segment unless the base ends with a slash
        if !endpoint.path().ends_with('/') {
            let path = format!("{}/", endpoint.path());
            endpoint.set_path(&path);
        }

        let mut builder = reqwest::Client::builder().tcp_keepalive(Some(Duration::from_secs(5)));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build().map_err(|err| EngineError::EngineUnavailable {
            endpoint: endpoint.to_string(),
            reason: err.to_string(),
        })?;

        Ok(Self {
            http_client,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn url(&self, operation: &str, path: &str) -> Result<Url, EngineError> {
        self.endpoint
            .join(path)
            .map_err(|err| EngineError::request_failed(operation, None, err.to_string()))
    }

    async fn send(
        &self,
        operation: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, EngineError> {
        let response = request
            .send()
            .await
            .map_err(|err| self.transport_error(operation, err))?;
        tracing::trace!(operation, status = %response.status(), "engine responded");
        Ok(response)
    }

    fn transport_error(&self, operation: &str, error: reqwest::Error) -> EngineError {
        if error.is_connect() || error.is_timeout() {
            EngineError::EngineUnavailable {
                endpoint: self.endpoint.to_string(),
                reason: error.to_string(),
            }
        } else {
            EngineError::request_failed(
                operation,
                error.status().map(|status| status.as_u16()),
                error.to_string(),
            )
        }
    }

    async fn ensure_success(
        &self,
        operation: &str,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, EngineError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .map_err(|err| self.transport_error(operation, err))?;
        Err(EngineError::request_failed(
            operation,
            Some(status.as_u16()),
            error_reason(&body),
        ))
    }

    async fn decode<T>(
        &self,
        operation: &str,
        response: reqwest::Response,
    ) -> Result<T, EngineError>
    where
        T: serde::de::DeserializeOwned,
    {
        let status = response.status().as_u16();
        response.json().await.map_err(|err| {
            EngineError::request_failed(
                operation,
                Some(status),
                format!("response could not be decoded: {err}"),
            )
        })
    }
}

/// Elasticsearch reports failures as `{"error": {"type": ..., "reason": ...}, "status": ...}`.
fn error_reason(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            let error = value.get("error")?;
            match error.get("reason").and_then(Value::as_str) {
                Some(reason) => Some(reason.to_string()),
                None => error.as_str().map(str::to_string),
            }
        })
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl SearchClient for ElasticsearchClient {
    async fn delete_index(&self, index: &str) -> Result<(), EngineError> {
        let url = self.url("delete_index", index)?;
        let response = self.send("delete_index", self.http_client.delete(url)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!(index, "index did not exist");
            return Ok(());
        }
        self.ensure_success("delete_index", response).await?;
        Ok(())
    }

    async fn create_index(&self, index: &str) -> Result<(), EngineError> {
        let url = self.url("create_index", index)?;
        let response = self.send("create_index", self.http_client.put(url)).await?;
        self.ensure_success("create_index", response).await?;
        Ok(())
    }

    async fn search(&self, request: SearchRequest) -> Result<SearchResponse, EngineError> {
        let url = self.url(
            "search",
            &format!("{}/{}/_search", request.index, request.document_type),
        )?;
        let response = self
            .send("search", self.http_client.post(url).json(&request.body()))
            .await?;
        let response = self.ensure_success("search", response).await?;
        self.decode("search", response).await
    }

    async fn bulk(&self, entries: &[BulkEntry]) -> Result<BulkResponse, EngineError> {
        let mut url = self.url("bulk", "_bulk")?;
        url.query_pairs_mut().append_pair("refresh", "true");

        let mut body = String::new();
        for record in bulk_body(entries)? {
            body.push_str(&record.to_string());
            body.push('\n');
        }

        let response = self
            .send(
                "bulk",
                self.http_client
                    .post(url)
                    .header(CONTENT_TYPE, NDJSON)
                    .body(body),
            )
            .await?;
        let response = self.ensure_success("bulk", response).await?;
        self.decode("bulk", response).await
    }
}
