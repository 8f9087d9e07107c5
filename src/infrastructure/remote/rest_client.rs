use crate::application::ports::remote_store::{RemoteError, RemoteStore};
use crate::domain::value_objects::{EntityTable, RecordId};
use crate::infrastructure::remote::translation;
use crate::shared::config::RemoteConfig;
use crate::shared::error::AppError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// Client for the hosted row-based REST backend. Endpoints follow the
/// PostgREST convention: one route per table, `eq.` filters, upserts via
/// `on_conflict`, exact counts through the Content-Range header.
pub struct RestRemoteStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RestRemoteStore {
    pub fn new(config: &RemoteConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .build()
            .map_err(|err| AppError::ConfigurationError(err.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn table_url(&self, table: EntityTable) -> String {
        format!("{}/rest/v1/{}", self.base_url, table.as_str())
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        if self.api_key.is_empty() {
            builder
        } else {
            builder
                .header("apikey", self.api_key.as_str())
                .bearer_auth(self.api_key.as_str())
        }
    }

    async fn check(response: Response) -> Result<Response, RemoteError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        Err(RemoteError::Backend {
            status: status.as_u16(),
            message,
        })
    }

    async fn rows_from(response: Response) -> Result<Vec<Value>, RemoteError> {
        let body: Value = response
            .json()
            .await
            .map_err(|err| RemoteError::Decode(err.to_string()))?;

        match body {
            Value::Array(rows) => Ok(rows),
            single @ Value::Object(_) => Ok(vec![single]),
            other => Err(RemoteError::Decode(format!(
                "expected row array, got {other}"
            ))),
        }
    }

    fn local_from_wire(table: EntityTable, row: &Value) -> Result<Value, RemoteError> {
        translation::to_local(table, row).map_err(|err| RemoteError::Decode(err.to_string()))
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RemoteError::Timeout
        } else {
            RemoteError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl RemoteStore for RestRemoteStore {
    async fn upsert(&self, table: EntityTable, record: Value) -> Result<Value, RemoteError> {
        let row =
            translation::to_wire(table, &record).map_err(|err| RemoteError::Decode(err.to_string()))?;

        let request = self
            .authorize(self.client.post(self.table_url(table)))
            .query(&[("on_conflict", "id")])
            .header(
                "Prefer",
                "return=representation,resolution=merge-duplicates",
            )
            .json(&row);

        let response = Self::check(request.send().await?).await?;
        let rows = Self::rows_from(response).await?;
        let first = rows
            .first()
            .ok_or_else(|| RemoteError::Decode("upsert returned no rows".to_string()))?;

        Self::local_from_wire(table, first)
    }

    async fn delete_row(&self, table: EntityTable, id: &RecordId) -> Result<(), RemoteError> {
        let request = self
            .authorize(self.client.delete(self.table_url(table)))
            .query(&[("id", format!("eq.{id}"))]);

        Self::check(request.send().await?).await?;
        Ok(())
    }

    async fn get_all(&self, table: EntityTable) -> Result<Vec<Value>, RemoteError> {
        let request = self
            .authorize(self.client.get(self.table_url(table)))
            .query(&[("select", "*")]);

        let response = Self::check(request.send().await?).await?;
        let rows = Self::rows_from(response).await?;

        rows.iter()
            .map(|row| Self::local_from_wire(table, row))
            .collect()
    }

    async fn get_by_id(
        &self,
        table: EntityTable,
        id: &RecordId,
    ) -> Result<Option<Value>, RemoteError> {
        let request = self
            .authorize(self.client.get(self.table_url(table)))
            .query(&[("select", "*".to_string()), ("id", format!("eq.{id}"))]);

        let response = request.send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = Self::check(response).await?;
        let rows = Self::rows_from(response).await?;

        rows.first()
            .map(|row| Self::local_from_wire(table, row))
            .transpose()
    }

    async fn count(&self, table: EntityTable) -> Result<u64, RemoteError> {
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("count=exact"));

        let request = self
            .authorize(self.client.head(self.table_url(table)))
            .query(&[("select", "*")])
            .headers(headers);

        let response = Self::check(request.send().await?).await?;

        let range = response
            .headers()
            .get("content-range")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| RemoteError::Decode("missing Content-Range header".to_string()))?;

        // Content-Range: 0-24/25 (or */0 for an empty table)
        range
            .rsplit('/')
            .next()
            .and_then(|total| total.parse::<u64>().ok())
            .ok_or_else(|| RemoteError::Decode(format!("unparseable Content-Range: {range}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: &str) -> RemoteConfig {
        RemoteConfig {
            base_url: base_url.to_string(),
            api_key: "test-key".to_string(),
            request_timeout: 5,
        }
    }

    fn member_wire_row() -> Value {
        json!({
            "id": "m1",
            "full_name": "Ana Torres",
            "email": "ana@example.com",
            "phone": null,
            "membership_plan": "premium",
            "membership_started_at": "2025-01-10T09:00:00Z",
            "membership_expires_at": null,
            "membership_active": true,
            "created_at": "2025-01-10T09:00:00Z",
            "updated_at": "2025-01-10T09:00:00Z"
        })
    }

    fn member_local_record() -> Value {
        json!({
            "id": "m1",
            "profile": {"fullName": "Ana Torres", "email": "ana@example.com", "phone": null},
            "membership": {
                "plan": "premium",
                "startedAt": "2025-01-10T09:00:00Z",
                "expiresAt": null,
                "active": true
            },
            "createdAt": "2025-01-10T09:00:00Z",
            "updatedAt": "2025-01-10T09:00:00Z"
        })
    }

    #[tokio::test]
    async fn upsert_sends_translated_row_and_returns_local_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/members"))
            .and(query_param("on_conflict", "id"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([member_wire_row()])))
            .expect(1)
            .mount(&server)
            .await;

        let store = RestRemoteStore::new(&config(&server.uri())).unwrap();
        let result = store
            .upsert(EntityTable::Members, member_local_record())
            .await
            .unwrap();

        assert_eq!(result, member_local_record());

        let requests = server.received_requests().await.unwrap();
        let sent: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(sent["full_name"], "Ana Torres");
        assert!(sent.get("profile").is_none());
    }

    #[tokio::test]
    async fn get_by_id_translates_wire_row_back() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/members"))
            .and(query_param("id", "eq.m1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([member_wire_row()])))
            .mount(&server)
            .await;

        let store = RestRemoteStore::new(&config(&server.uri())).unwrap();
        let id = RecordId::new("m1".to_string()).unwrap();
        let record = store.get_by_id(EntityTable::Members, &id).await.unwrap();

        assert_eq!(record, Some(member_local_record()));
    }

    #[tokio::test]
    async fn get_by_id_with_no_match_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/members"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let store = RestRemoteStore::new(&config(&server.uri())).unwrap();
        let id = RecordId::new("missing".to_string()).unwrap();

        assert!(store
            .get_by_id(EntityTable::Members, &id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn backend_rejection_carries_status_and_message() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/rest/v1/products"))
            .respond_with(ResponseTemplate::new(409).set_body_string("conflict"))
            .mount(&server)
            .await;

        let store = RestRemoteStore::new(&config(&server.uri())).unwrap();
        let id = RecordId::new("p1".to_string()).unwrap();
        let err = store
            .delete_row(EntityTable::Products, &id)
            .await
            .unwrap_err();

        match err {
            RemoteError::Backend { status, message } => {
                assert_eq!(status, 409);
                assert_eq!(message, "conflict");
            }
            other => panic!("expected Backend error, got {other:?}"),
        }
    }

    fn err_is_retryable(status: u16) -> bool {
        RemoteError::Backend {
            status,
            message: String::new(),
        }
        .is_retryable()
    }

    #[tokio::test]
    async fn server_errors_are_retryable() {
        assert!(err_is_retryable(500));
        assert!(err_is_retryable(503));
        assert!(!err_is_retryable(422));
        assert!(RemoteError::Timeout.is_retryable());
        assert!(RemoteError::Transport("reset".into()).is_retryable());
        assert!(!RemoteError::Decode("bad".into()).is_retryable());
    }

    #[tokio::test]
    async fn count_parses_content_range() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/rest/v1/sales"))
            .respond_with(
                ResponseTemplate::new(200).insert_header("content-range", "0-24/25"),
            )
            .mount(&server)
            .await;

        let store = RestRemoteStore::new(&config(&server.uri())).unwrap();
        assert_eq!(store.count(EntityTable::Sales).await.unwrap(), 25);
    }
}
