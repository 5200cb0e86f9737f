// SPDX-License-Identifier: GPL-3.0-only
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::DirectoryError;
use crate::presenter::{AirlineDetail, AirlineListPresenter};
use crate::store::{AirlineRow, FilterMode};

#[derive(Debug, Serialize, Deserialize)]
pub struct FilterRequest {
    pub mode: FilterMode,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListSnapshot {
    pub filter: FilterMode,
    pub count: usize,
    pub rows: Vec<AirlineRow>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OpenedLink {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CallStarted {
    pub call_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn error(message: String) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

#[derive(Debug)]
pub struct ApiError(pub DirectoryError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            DirectoryError::IndexOutOfRange { .. } | DirectoryError::NotFound(_) => {
                StatusCode::NOT_FOUND
            }
            DirectoryError::MissingField { .. } | DirectoryError::InvalidUrl(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            DirectoryError::Transport(_) | DirectoryError::Decode(_) => StatusCode::BAD_GATEWAY,
            DirectoryError::StoreRead(_)
            | DirectoryError::StoreWrite(_)
            | DirectoryError::Action(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DirectoryError> for ApiError {
    fn from(e: DirectoryError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        } else {
            warn!(error = %self.0, "Request rejected");
        }
        (status, Json(ApiResponse::error(self.0.to_string()))).into_response()
    }
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

pub struct ApiHandlers {
    list: Arc<AirlineListPresenter>,
}

impl ApiHandlers {
    pub fn new(list: Arc<AirlineListPresenter>) -> Self {
        Self { list }
    }
}

impl ApiHandlers {
    pub async fn health() -> Json<ApiResponse<&'static str>> {
        Json(ApiResponse::success("ok"))
    }

    async fn snapshot(&self) -> ListSnapshot {
        let rows = self.list.rows().await;
        ListSnapshot {
            filter: self.list.filter_mode().await,
            count: rows.len(),
            rows,
        }
    }

    /// Negative indices can come in over the wire; they are out of range like any other.
    async fn index(&self, index: i64) -> Result<usize, ApiError> {
        let count = self.list.count().await;
        usize::try_from(index)
            .map_err(|_| ApiError(DirectoryError::IndexOutOfRange { index, count }))
    }

    pub async fn load(&self) -> ApiResult<ListSnapshot> {
        info!("Load airlines request received");
        self.list.load().await?;
        Ok(Json(ApiResponse::success(self.snapshot().await)))
    }

    pub async fn list(&self) -> ApiResult<ListSnapshot> {
        Ok(Json(ApiResponse::success(self.snapshot().await)))
    }

    pub async fn set_filter(&self, request: FilterRequest) -> ApiResult<ListSnapshot> {
        self.list.set_filter(request.mode).await?;
        Ok(Json(ApiResponse::success(self.snapshot().await)))
    }

    pub async fn row(&self, index: i64) -> ApiResult<AirlineRow> {
        let index = self.index(index).await?;
        Ok(Json(ApiResponse::success(self.list.row(index).await?)))
    }

    pub async fn toggle_favorite(&self, index: i64) -> ApiResult<AirlineRow> {
        let index = self.index(index).await?;
        Ok(Json(ApiResponse::success(self.list.toggle_favorite(index).await?)))
    }

    pub async fn select(&self, index: i64) -> ApiResult<AirlineDetail> {
        let index = self.index(index).await?;
        let detail = self.list.select(index).await?;
        Ok(Json(ApiResponse::success(detail.view())))
    }

    pub async fn detail(&self, code: String) -> ApiResult<AirlineDetail> {
        let detail = self.list.detail(&code).await?;
        Ok(Json(ApiResponse::success(detail.view())))
    }

    pub async fn detail_toggle_favorite(&self, code: String) -> ApiResult<AirlineDetail> {
        let mut detail = self.list.detail(&code).await?;
        detail.toggle_favorite().await?;
        Ok(Json(ApiResponse::success(detail.view())))
    }

    pub async fn detail_open_website(&self, code: String) -> ApiResult<OpenedLink> {
        let detail = self.list.detail(&code).await?;
        let url = detail.open_website().await?;
        Ok(Json(ApiResponse::success(OpenedLink { url: url.to_string() })))
    }

    pub async fn detail_call(&self, code: String) -> ApiResult<CallStarted> {
        let detail = self.list.detail(&code).await?;
        let call_id = detail.call_airline().await?;
        Ok(Json(ApiResponse::success(CallStarted { call_id })))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::broadcaster::UpdateBroadcaster;
    use crate::presenter::DetailServices;
    use crate::store::Airline;
    use crate::sync::DirectorySynchronizer;
    use crate::test_helpers::{
        airline, favorite, MemoryStore, RecordingActions, RecordingObserver, ScriptedClient,
    };

    pub(crate) fn handlers_with(stored: Vec<Airline>, client: ScriptedClient) -> ApiHandlers {
        let store = Arc::new(MemoryStore::with_airlines(stored));
        let broadcaster = UpdateBroadcaster::new();
        let sync = Arc::new(DirectorySynchronizer::new(
            store.clone(),
            Arc::new(client),
            Arc::new(RecordingObserver::default()),
            "https://www.kayak.com/".to_string(),
        ));
        let (_handle, updates) = broadcaster.subscribe_channel();
        Arc::clone(&sync).follow_updates(updates);

        let actions = Arc::new(RecordingActions::default());
        let details = DetailServices {
            store,
            broadcaster,
            calls: actions.clone(),
            links: actions,
            logo_base_url: "https://www.kayak.com/".to_string(),
        };
        ApiHandlers::new(Arc::new(AirlineListPresenter::new(sync, details)))
    }

    fn reachable(code: &str) -> Airline {
        let mut entry = airline(code, "American");
        entry.site = Some("www.aa.com".to_string());
        entry.phone = Some("1-800-433-7300".to_string());
        entry
    }

    #[tokio::test]
    async fn test_health() {
        let Json(response) = ApiHandlers::health().await;
        assert!(response.success);
        assert_eq!(response.data, Some("ok"));
    }

    #[tokio::test]
    async fn test_load_fetches_on_empty_store() {
        let handlers =
            handlers_with(vec![], ScriptedClient::returning(vec![airline("AA", "American")]));

        let Json(response) = handlers.load().await.unwrap();
        let snapshot = response.data.unwrap();
        assert_eq!(snapshot.count, 1);
        assert_eq!(snapshot.filter, FilterMode::All);
        assert_eq!(snapshot.rows[0].code, "AA");
    }

    #[tokio::test]
    async fn test_load_failure_is_bad_gateway() {
        let handlers = handlers_with(vec![], ScriptedClient::failing());

        let err = handlers.load().await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        let Json(response) = handlers.list().await.unwrap();
        assert_eq!(response.data.unwrap().count, 0);
    }

    #[tokio::test]
    async fn test_set_filter() {
        let handlers = handlers_with(
            vec![favorite("AA", "American"), airline("DL", "Delta")],
            ScriptedClient::returning(vec![]),
        );
        assert!(handlers.load().await.unwrap().0.success);

        let Json(response) = handlers
            .set_filter(FilterRequest { mode: FilterMode::Favorites })
            .await
            .unwrap();
        let snapshot = response.data.unwrap();
        assert_eq!(snapshot.filter, FilterMode::Favorites);
        assert_eq!(snapshot.count, 1);
    }

    #[tokio::test]
    async fn test_row_negative_index_is_out_of_range() {
        let handlers =
            handlers_with(vec![airline("AA", "American")], ScriptedClient::returning(vec![]));
        assert!(handlers.load().await.unwrap().0.success);

        let err = handlers.row(-1).await.unwrap_err();
        assert!(matches!(err.0, DirectoryError::IndexOutOfRange { index: -1, count: 1 }));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err = handlers.row(1).await.unwrap_err();
        assert!(matches!(err.0, DirectoryError::IndexOutOfRange { index: 1, count: 1 }));
    }

    #[tokio::test]
    async fn test_toggle_favorite() {
        let handlers =
            handlers_with(vec![airline("AA", "American")], ScriptedClient::returning(vec![]));
        assert!(handlers.load().await.unwrap().0.success);

        let Json(response) = handlers.toggle_favorite(0).await.unwrap();
        assert!(response.data.unwrap().is_favorite);
    }

    #[tokio::test]
    async fn test_select_returns_detail() {
        let handlers = handlers_with(vec![reachable("AA")], ScriptedClient::returning(vec![]));
        assert!(handlers.load().await.unwrap().0.success);

        let Json(response) = handlers.select(0).await.unwrap();
        let detail = response.data.unwrap();
        assert_eq!(detail.code, "AA");
        assert!(detail.has_phone);
    }

    #[tokio::test]
    async fn test_detail_unknown_code() {
        let handlers = handlers_with(vec![], ScriptedClient::returning(vec![]));
        let err = handlers.detail("ZZ".to_string()).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_detail_actions() {
        let handlers = handlers_with(vec![reachable("AA")], ScriptedClient::returning(vec![]));

        let Json(response) = handlers.detail_open_website("AA".to_string()).await.unwrap();
        assert_eq!(response.data.unwrap().url, "https://www.aa.com/");

        let Json(response) = handlers.detail_call("AA".to_string()).await.unwrap();
        assert!(response.data.is_some());
    }

    #[tokio::test]
    async fn test_detail_call_without_phone_is_unprocessable() {
        let handlers =
            handlers_with(vec![airline("AA", "American")], ScriptedClient::returning(vec![]));
        let err = handlers.detail_call("AA".to_string()).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_detail_toggle_updates_list() {
        let handlers =
            handlers_with(vec![airline("AA", "American")], ScriptedClient::returning(vec![]));
        assert!(handlers.load().await.unwrap().0.success);

        let Json(response) = handlers.detail_toggle_favorite("AA".to_string()).await.unwrap();
        assert!(response.data.unwrap().is_favorite);

        // The list follows the broadcast on its own task.
        for _ in 0..100 {
            let Json(row) = handlers.row(0).await.unwrap();
            if row.data.unwrap().is_favorite {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("list row never reflected the detail toggle");
    }
}
