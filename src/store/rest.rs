//! Hosted table access over the PostgREST HTTP interface.
//!
//! Speaks the REST dialect exposed by Supabase projects: every request
//! carries the public anon key both as `apikey` and as a bearer token, reads
//! use `select=`, and upserts are a `POST` with `on_conflict=id` and
//! `Prefer: resolution=merge-duplicates`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response};

use super::{DripStore, StoreError};
use crate::domain::{Drip, DripRow, DripUpdate};

const PROJECTED_COLUMNS: &str = "id,url,username,x,y";
const UPSERT_PREFER: &str = "resolution=merge-duplicates,return=minimal";

/// [`DripStore`] backed by a hosted PostgREST endpoint.
#[derive(Debug, Clone)]
pub struct RestStore {
    client: Client,
    table_url: String,
    anon_key: String,
}

impl RestStore {
    /// Creates a client for `{base_url}/rest/v1/{table}`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Request`] if the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        anon_key: &str,
        table: &str,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Request(e.to_string()))?;

        Ok(Self {
            client,
            table_url: format!("{}/rest/v1/{}", base_url.trim_end_matches('/'), table),
            anon_key: anon_key.to_string(),
        })
    }

    /// Returns the table endpoint this store talks to.
    #[must_use]
    pub fn table_url(&self) -> &str {
        &self.table_url
    }

    fn request(&self, method: Method, query: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}?{}", self.table_url, query))
            .header("apikey", &self.anon_key)
            .header(AUTHORIZATION, format!("Bearer {}", self.anon_key))
    }

    async fn send(request: RequestBuilder) -> Result<Response, StoreError> {
        let res = request
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let message = res.text().await.unwrap_or_default();
            return Err(StoreError::Api { status, message });
        }
        Ok(res)
    }

    async fn select<T: serde::de::DeserializeOwned>(
        &self,
        columns: &str,
    ) -> Result<Vec<T>, StoreError> {
        let res = Self::send(self.request(Method::GET, &format!("select={columns}"))).await?;
        res.json::<Vec<T>>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }
}

#[async_trait]
impl DripStore for RestStore {
    async fn select_drips(&self) -> Result<Vec<Drip>, StoreError> {
        self.select(PROJECTED_COLUMNS).await
    }

    async fn select_rows(&self) -> Result<Vec<DripRow>, StoreError> {
        self.select("*").await
    }

    async fn upsert(&self, updates: &[DripUpdate]) -> Result<(), StoreError> {
        check_uniform_columns(updates)?;
        let request = self
            .request(Method::POST, "on_conflict=id")
            .header(CONTENT_TYPE, "application/json")
            .header("Prefer", UPSERT_PREFER)
            .json(updates);
        Self::send(request).await?;
        Ok(())
    }
}

/// PostgREST fills keys missing from a bulk payload with NULL or the column
/// default, so a single request must carry the same key set on every row.
fn check_uniform_columns(updates: &[DripUpdate]) -> Result<(), StoreError> {
    let mut columns = updates.iter().map(DripUpdate::columns);
    let Some(first) = columns.next() else {
        return Ok(());
    };
    if columns.all(|c| c == first) {
        Ok(())
    } else {
        Err(StoreError::Rejected(
            "bulk upsert rows must set the same columns".to_string(),
        ))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;

    use axum::Router;
    use axum::extract::{RawQuery, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use tokio::sync::Mutex;

    use super::*;
    use crate::domain::DripId;

    #[derive(Debug, Clone, Default)]
    struct Recorded {
        requests: Arc<Mutex<Vec<(String, Option<String>, HeaderMap, String)>>>,
    }

    async fn record_get(
        State(rec): State<Recorded>,
        RawQuery(query): RawQuery,
        headers: HeaderMap,
    ) -> axum::Json<serde_json::Value> {
        rec.requests
            .lock()
            .await
            .push(("GET".to_string(), query, headers, String::new()));
        axum::Json(serde_json::json!([
            {"id": 1, "url": "https://cdn.example/1.png", "username": "ada", "x": 1.5, "y": -2.0, "created_at": "2024-01-01"}
        ]))
    }

    async fn record_post(
        State(rec): State<Recorded>,
        RawQuery(query): RawQuery,
        headers: HeaderMap,
        body: String,
    ) -> StatusCode {
        rec.requests
            .lock()
            .await
            .push(("POST".to_string(), query, headers, body));
        StatusCode::CREATED
    }

    async fn spawn(router: Router) -> String {
        let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
            panic!("bind failed");
        };
        let Ok(addr) = listener.local_addr() else {
            panic!("no local addr");
        };
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        format!("http://{addr}")
    }

    async fn fake_postgrest() -> (RestStore, Recorded) {
        let rec = Recorded::default();
        let router = Router::new()
            .route("/rest/v1/drips", get(record_get).post(record_post))
            .with_state(rec.clone());
        let base = spawn(router).await;
        let Ok(store) = RestStore::new(&base, "anon-key", "drips", Duration::from_secs(5)) else {
            panic!("client build failed");
        };
        (store, rec)
    }

    #[test]
    fn table_url_trims_trailing_slash() {
        let Ok(store) = RestStore::new(
            "https://abc.supabase.co/",
            "k",
            "drips",
            Duration::from_secs(1),
        ) else {
            panic!("client build failed");
        };
        assert_eq!(store.table_url(), "https://abc.supabase.co/rest/v1/drips");
    }

    #[tokio::test]
    async fn mixed_column_batch_sends_nothing() {
        let (store, rec) = fake_postgrest().await;
        let batch = [
            DripUpdate::position(DripId::new(1), 1.0, 1.0),
            DripUpdate {
                id: DripId::new(2),
                url: Some("u".to_string()),
                username: None,
                x: Some(5.0),
                y: Some(5.0),
            },
        ];
        let result = store.upsert(&batch).await;
        assert!(matches!(result, Err(StoreError::Rejected(_))));
        assert!(rec.requests.lock().await.is_empty());
    }

    #[tokio::test]
    async fn uniform_batch_is_one_request() {
        let (store, rec) = fake_postgrest().await;
        let batch = [
            DripUpdate::position(DripId::new(1), 1.0, 1.0),
            DripUpdate::position(DripId::new(3), 3.0, 3.0),
        ];
        assert!(store.upsert(&batch).await.is_ok());

        let requests = rec.requests.lock().await;
        assert_eq!(requests.len(), 1);
        let Some((_, _, _, body)) = requests.first() else {
            panic!("no request recorded");
        };
        let Ok(sent) = serde_json::from_str::<serde_json::Value>(body) else {
            panic!("body is not json");
        };
        assert_eq!(sent.as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn select_drips_sends_projection_and_key() {
        let (store, rec) = fake_postgrest().await;
        let Ok(drips) = store.select_drips().await else {
            panic!("select failed");
        };
        assert_eq!(drips.len(), 1);
        assert_eq!(drips.first().map(|d| d.username.as_str()), Some("ada"));

        let requests = rec.requests.lock().await;
        let Some((_, query, headers, _)) = requests.first() else {
            panic!("no request recorded");
        };
        assert_eq!(query.as_deref(), Some("select=id,url,username,x,y"));
        assert_eq!(
            headers.get("apikey").and_then(|v| v.to_str().ok()),
            Some("anon-key")
        );
        assert_eq!(
            headers.get("authorization").and_then(|v| v.to_str().ok()),
            Some("Bearer anon-key")
        );
    }

    #[tokio::test]
    async fn select_rows_keeps_extra_columns() {
        let (store, _rec) = fake_postgrest().await;
        let Ok(rows) = store.select_rows().await else {
            panic!("select failed");
        };
        let Some(row) = rows.first() else {
            panic!("no rows");
        };
        assert!(row.contains_key("created_at"));
    }

    #[tokio::test]
    async fn upsert_posts_merge_duplicates() {
        let (store, rec) = fake_postgrest().await;
        let result = store
            .upsert(&[DripUpdate::position(DripId::new(2), 10.0, 20.0)])
            .await;
        assert!(result.is_ok());

        let requests = rec.requests.lock().await;
        let Some((method, query, headers, body)) = requests.first() else {
            panic!("no request recorded");
        };
        assert_eq!(method, "POST");
        assert_eq!(query.as_deref(), Some("on_conflict=id"));
        assert_eq!(
            headers.get("prefer").and_then(|v| v.to_str().ok()),
            Some(UPSERT_PREFER)
        );
        let Ok(sent) = serde_json::from_str::<serde_json::Value>(body) else {
            panic!("body is not json");
        };
        assert_eq!(sent, serde_json::json!([{"id": 2, "x": 10.0, "y": 20.0}]));
    }

    #[tokio::test]
    async fn non_success_status_is_api_error() {
        let router = Router::new().route(
            "/rest/v1/drips",
            get(|| async { (StatusCode::UNAUTHORIZED, "invalid api key") }),
        );
        let base = spawn(router).await;
        let Ok(store) = RestStore::new(&base, "bad", "drips", Duration::from_secs(5)) else {
            panic!("client build failed");
        };

        match store.select_drips().await {
            Err(StoreError::Api { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "invalid api key");
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_host_is_request_error() {
        let Ok(store) = RestStore::new(
            "http://127.0.0.1:1",
            "k",
            "drips",
            Duration::from_secs(2),
        ) else {
            panic!("client build failed");
        };
        assert!(matches!(
            store.select_drips().await,
            Err(StoreError::Request(_))
        ));
    }
}
