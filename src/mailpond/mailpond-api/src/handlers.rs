/*
 * mailpond development mail sink
 * Copyright (C) 2022 viridIT SAS
 *
 * This program is free software: you can redistribute it and/or modify it under
 * the terms of the GNU General Public License as published by the Free Software
 * Foundation, either version 3 of the License, or any later version.
 *
 * This program is distributed in the hope that it will be useful, but WITHOUT
 * ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
 * FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License along with
 * this program. If not, see https://www.gnu.org/licenses/.
 *
*/

use crate::log_channels;
use mailpond_common::re::{log, serde_json};
use mailpond_common::{Mail, MailStore, StorageError};

const DEFAULT_LIMIT: i64 = 50;

/// Everything the handlers share.
#[derive(Clone)]
pub struct ApiState {
    store: std::sync::Arc<dyn MailStore + Send + Sync>,
}

impl ApiState {
    ///
    #[must_use]
    pub fn new(store: std::sync::Arc<dyn MailStore + Send + Sync>) -> Self {
        Self { store }
    }
}

/// Pagination query. Values are captured as raw strings so that a
/// mistyped `?limit=abc` falls back on the default instead of turning
/// into a `400`.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct ListParams {
    limit: Option<String>,
    offset: Option<String>,
}

impl ListParams {
    fn limit(&self) -> i64 {
        self.limit
            .as_deref()
            .and_then(|value| value.parse::<i64>().ok())
            .filter(|limit| *limit > 0)
            .unwrap_or(DEFAULT_LIMIT)
    }

    fn offset(&self) -> i64 {
        self.offset
            .as_deref()
            .and_then(|value| value.parse::<i64>().ok())
            .filter(|offset| *offset >= 0)
            .unwrap_or(0)
    }
}

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub(crate) struct ApiError(#[from] StorageError);

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = if matches!(self.0, StorageError::NotFound) {
            axum::http::StatusCode::NOT_FOUND
        } else {
            log::error!(target: log_channels::API, "storage failure: {}", self.0);
            axum::http::StatusCode::INTERNAL_SERVER_ERROR
        };

        (
            status,
            axum::Json(serde_json::json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}

pub(crate) async fn list_messages(
    axum::extract::State(state): axum::extract::State<ApiState>,
    axum::extract::Query(params): axum::extract::Query<ListParams>,
) -> Result<axum::Json<Vec<Mail>>, ApiError> {
    let mails = state.store.list(params.limit(), params.offset()).await?;
    Ok(axum::Json(mails))
}

pub(crate) async fn get_message(
    axum::extract::State(state): axum::extract::State<ApiState>,
    axum::extract::Path(id): axum::extract::Path<String>,
) -> Result<axum::Json<Mail>, ApiError> {
    Ok(axum::Json(state.store.get_by_id(&id).await?))
}

#[cfg(test)]
mod tests {
    use super::ApiState;
    use http_body_util::BodyExt;
    use mailpond_common::re::chrono::{DateTime, TimeZone, Utc};
    use mailpond_common::re::serde_json;
    use mailpond_common::{Mail, MailStore, StorageError};
    use mailpond_storage::SqliteStore;
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    fn mail(message_id: &str, date: DateTime<Utc>) -> Mail {
        Mail {
            id: None,
            message_id: message_id.to_string(),
            from: "john@doe.com".to_string(),
            to: "green@foo.net".to_string(),
            subject: "ties".to_string(),
            date,
            text_body: "hello\r\n".to_string(),
            html_body: String::new(),
        }
    }

    fn date(second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 8, 5, 12, 30, second).unwrap()
    }

    fn router_over(store: std::sync::Arc<dyn MailStore + Send + Sync>) -> axum::Router {
        crate::router(ApiState::new(store), std::path::Path::new("./web"))
    }

    async fn seeded_router() -> axum::Router {
        let store = std::sync::Arc::new(SqliteStore::open_in_memory().unwrap());

        store.save(&mail("<old@localhost>", date(0))).await.unwrap();
        store.save(&mail("<mid@localhost>", date(10))).await.unwrap();
        store.save(&mail("<new@localhost>", date(20))).await.unwrap();

        router_over(store)
    }

    async fn get(
        router: axum::Router,
        uri: &str,
    ) -> (axum::http::StatusCode, serde_json::Value) {
        let response = router
            .oneshot(
                axum::http::Request::builder()
                    .uri(uri)
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn message_ids(body: &serde_json::Value) -> Vec<&str> {
        body.as_array()
            .unwrap()
            .iter()
            .map(|mail| mail["message_id"].as_str().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn messages_come_back_newest_first() {
        let (status, body) = get(seeded_router().await, "/api/messages").await;

        assert_eq!(status, axum::http::StatusCode::OK);
        assert_eq!(
            message_ids(&body),
            ["<new@localhost>", "<mid@localhost>", "<old@localhost>"]
        );
    }

    #[tokio::test]
    async fn pagination_is_applied() {
        let (status, body) =
            get(seeded_router().await, "/api/messages?limit=1&offset=1").await;

        assert_eq!(status, axum::http::StatusCode::OK);
        assert_eq!(message_ids(&body), ["<mid@localhost>"]);
    }

    #[tokio::test]
    async fn unusable_pagination_falls_back_on_the_defaults() {
        for uri in [
            "/api/messages?limit=abc&offset=xyz",
            "/api/messages?limit=0&offset=-5",
            "/api/messages?limit=-1",
        ] {
            let (status, body) = get(seeded_router().await, uri).await;

            assert_eq!(status, axum::http::StatusCode::OK);
            assert_eq!(message_ids(&body).len(), 3, "{uri}");
        }
    }

    #[tokio::test]
    async fn an_empty_store_lists_an_empty_array() {
        let store = std::sync::Arc::new(SqliteStore::open_in_memory().unwrap());
        let (status, body) = get(router_over(store), "/api/messages").await;

        assert_eq!(status, axum::http::StatusCode::OK);
        assert_eq!(body, serde_json::json!([]));
    }

    #[tokio::test]
    async fn a_message_is_fetched_by_its_identifier() {
        let store = std::sync::Arc::new(SqliteStore::open_in_memory().unwrap());
        let id = store.save(&mail("<kept@localhost>", date(0))).await.unwrap();

        let (status, body) =
            get(router_over(store), &format!("/api/messages/{id}")).await;

        assert_eq!(status, axum::http::StatusCode::OK);
        assert_eq!(body["id"], serde_json::json!(id));
        assert_eq!(body["message_id"], serde_json::json!("<kept@localhost>"));
        assert_eq!(body["from"], serde_json::json!("john@doe.com"));
        assert_eq!(body["text_body"], serde_json::json!("hello\r\n"));
    }

    #[tokio::test]
    async fn a_missing_identifier_is_a_404() {
        for uri in ["/api/messages/1024", "/api/messages/not-a-number"] {
            let (status, body) = get(seeded_router().await, uri).await;

            assert_eq!(status, axum::http::StatusCode::NOT_FOUND, "{uri}");
            assert_eq!(body, serde_json::json!({ "error": "message not found" }));
        }
    }

    struct BrokenStore;

    #[async_trait::async_trait]
    impl MailStore for BrokenStore {
        async fn save(&self, _mail: &Mail) -> Result<String, StorageError> {
            Err(StorageError::Engine("disk on fire".to_string()))
        }

        async fn list(&self, _limit: i64, _offset: i64) -> Result<Vec<Mail>, StorageError> {
            Err(StorageError::Engine("disk on fire".to_string()))
        }

        async fn get_by_id(&self, _id: &str) -> Result<Mail, StorageError> {
            Err(StorageError::Engine("disk on fire".to_string()))
        }
    }

    #[tokio::test]
    async fn a_broken_store_is_a_500() {
        let (status, body) =
            get(router_over(std::sync::Arc::new(BrokenStore)), "/api/messages").await;

        assert_eq!(status, axum::http::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            serde_json::json!({ "error": "storage engine error: disk on fire" })
        );
    }
}
