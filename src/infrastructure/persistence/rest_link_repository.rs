//! PostgREST implementation of the link repository.
//!
//! Talks to a table exposed under `{base}/rest/v1/{table}` (Supabase layout),
//! authenticated with an API key sent both as `apikey` and as a Bearer token.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::IgnoredAny;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, error};

use crate::domain::entities::{NewShortLink, ShortLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// PostgreSQL error code for `unique_violation`, relayed by PostgREST.
const UNIQUE_VIOLATION: &str = "23505";

/// Makes PostgREST echo affected rows back in the response body.
const RETURN_REPRESENTATION: &str = "return=representation";

/// Row as returned by PostgREST.
#[derive(Debug, Deserialize)]
struct LinkRow {
    id: RowId,
    original_url: String,
    short_code: String,
    expiry_date: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

/// Primary key as stored remotely: `uuid` columns arrive as strings,
/// `bigserial` ones as numbers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RowId {
    Text(String),
    Number(i64),
}

impl From<LinkRow> for ShortLink {
    fn from(row: LinkRow) -> Self {
        let id = match row.id {
            RowId::Text(id) => id,
            RowId::Number(id) => id.to_string(),
        };
        ShortLink::new(
            id,
            row.original_url,
            row.short_code,
            row.expiry_date,
            row.created_at,
        )
    }
}

/// Error document PostgREST returns for failed requests.
#[derive(Debug, Default, Deserialize)]
struct PostgrestError {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

/// Link repository backed by a remote PostgREST table.
///
/// Every call is one HTTP round trip; there is no local state besides the
/// pooled HTTP client.
pub struct RestLinkRepository {
    client: Client,
    endpoint: String,
}

impl RestLinkRepository {
    /// Creates a repository for `table` on the store at `base_url`.
    ///
    /// # Arguments
    ///
    /// - `base_url` - Store origin, e.g. `https://xyz.supabase.co`
    /// - `table` - Table holding the links (`urls` by default)
    /// - `api_key` - Key sent as `apikey` and `Authorization: Bearer`
    /// - `timeout` - Per-request timeout
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidInput`] if the API key is not a valid header value.
    /// Returns [`AppError::Store`] if the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        table: &str,
        api_key: &str,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let invalid_key =
            |_| AppError::invalid_input("API key is not a valid header value", json!({}));

        let mut apikey = HeaderValue::from_str(api_key).map_err(invalid_key)?;
        apikey.set_sensitive(true);
        let mut bearer = HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(invalid_key)?;
        bearer.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static("apikey"), apikey);
        headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/rest/v1/{}", base_url.trim_end_matches('/'), table),
        })
    }

    /// Sends a request and turns transport failures into [`AppError::Store`].
    async fn send(&self, request: RequestBuilder, operation: &'static str) -> Result<Response, AppError> {
        request.send().await.map_err(|e| {
            error!(operation, error = %e, "Store request failed");
            AppError::from(e)
        })
    }

    async fn read_rows(response: Response) -> Result<Vec<ShortLink>, AppError> {
        let rows: Vec<LinkRow> = response.json().await?;
        Ok(rows.into_iter().map(ShortLink::from).collect())
    }
}

/// Reads PostgREST's error document from a failed response.
async fn read_error(response: Response) -> PostgrestError {
    let body = response.text().await.unwrap_or_default();
    serde_json::from_str(&body).unwrap_or_else(|_| PostgrestError {
        message: (!body.is_empty()).then_some(body),
        ..PostgrestError::default()
    })
}

/// Converts a non-success store response into an [`AppError::Store`].
fn store_failure(status: StatusCode, err: PostgrestError, operation: &'static str) -> AppError {
    let message = err
        .message
        .clone()
        .unwrap_or_else(|| format!("Store returned {status}"));

    error!(operation, %status, code = ?err.code, %message, "Store rejected request");

    AppError::store(
        message,
        json!({
            "status": status.as_u16(),
            "code": err.code,
            "details": err.details,
            "hint": err.hint,
        }),
    )
}

/// Formats a timestamp the way PostgREST filters expect it.
fn filter_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[async_trait]
impl LinkRepository for RestLinkRepository {
    async fn insert(&self, new_link: NewShortLink) -> Result<ShortLink, AppError> {
        let request = self
            .client
            .post(&self.endpoint)
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&new_link);
        let response = self.send(request, "insert").await?;

        let status = response.status();
        if !status.is_success() {
            let err = read_error(response).await;
            if status == StatusCode::CONFLICT || err.code.as_deref() == Some(UNIQUE_VIOLATION) {
                debug!(code = %new_link.short_code, "Short code already taken");
                return Err(AppError::code_taken(new_link.short_code));
            }
            return Err(store_failure(status, err, "insert"));
        }

        Self::read_rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::store("Store returned no row for insert", json!({})))
    }

    async fn find_by_code(&self, short_code: &str) -> Result<Option<ShortLink>, AppError> {
        let request = self.client.get(&self.endpoint).query(&[
            ("short_code", format!("eq.{short_code}").as_str()),
            ("select", "*"),
            ("limit", "1"),
        ]);
        let response = self.send(request, "find_by_code").await?;

        let status = response.status();
        if !status.is_success() {
            return Err(store_failure(status, read_error(response).await, "find_by_code"));
        }

        Ok(Self::read_rows(response).await?.into_iter().next())
    }

    async fn list_newest_first(&self) -> Result<Vec<ShortLink>, AppError> {
        let request = self
            .client
            .get(&self.endpoint)
            .query(&[("select", "*"), ("order", "created_at.desc")]);
        let response = self.send(request, "list").await?;

        let status = response.status();
        if !status.is_success() {
            return Err(store_failure(status, read_error(response).await, "list"));
        }

        Self::read_rows(response).await
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), AppError> {
        let request = self
            .client
            .delete(&self.endpoint)
            .query(&[("id", format!("eq.{id}"))]);
        let response = self.send(request, "delete_by_id").await?;

        let status = response.status();
        if !status.is_success() {
            return Err(store_failure(status, read_error(response).await, "delete_by_id"));
        }

        Ok(())
    }

    async fn delete_expired_before(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError> {
        let request = self
            .client
            .delete(&self.endpoint)
            .header("Prefer", RETURN_REPRESENTATION)
            .query(&[
                ("expiry_date", format!("lt.{}", filter_timestamp(cutoff)).as_str()),
                ("select", "id"),
            ]);
        let response = self.send(request, "delete_expired").await?;

        let status = response.status();
        if !status.is_success() {
            return Err(store_failure(status, read_error(response).await, "delete_expired"));
        }

        let deleted: Vec<IgnoredAny> = response.json().await?;
        Ok(deleted.len() as u64)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        let request = self
            .client
            .get(&self.endpoint)
            .query(&[("select", "id"), ("limit", "1")]);
        let response = self.send(request, "health_check").await?;

        let status = response.status();
        if !status.is_success() {
            return Err(store_failure(status, read_error(response).await, "health_check"));
        }

        Ok(())
    }
}
