//! HTTP handlers for `/api/books`.
//!
//! Extractor rejections (bad id, malformed JSON, bad paging) are reported
//! through the shared error envelope as 400s.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use folio_http::error::AppError;

use super::models::{Book, BookDraft, BookId, Pagination};
use super::service::BookService;

type SharedService = State<Arc<BookService>>;

pub fn router(service: Arc<BookService>) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/health", get(health_check))
        .route(
            "/{id}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .with_state(service)
}

async fn health_check() -> &'static str {
    "books module is healthy"
}

async fn list_books(
    State(service): SharedService,
    page: Result<Query<Pagination>, QueryRejection>,
) -> Result<Json<Vec<Book>>, AppError> {
    let Query(page) = page.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
    tracing::debug!(limit = page.limit, offset = page.offset, "listing books");

    let books = service.get_all_books(page.limit, page.offset).await?;
    Ok(Json(books))
}

async fn get_book(
    State(service): SharedService,
    id: Result<Path<BookId>, PathRejection>,
) -> Result<Json<Book>, AppError> {
    let id = book_id(id)?;
    Ok(Json(service.get_book_by_id(id).await?))
}

async fn create_book(
    State(service): SharedService,
    draft: Result<Json<BookDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let Json(draft) = draft.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;

    let book = service.create_book(draft).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

async fn update_book(
    State(service): SharedService,
    id: Result<Path<BookId>, PathRejection>,
    draft: Result<Json<BookDraft>, JsonRejection>,
) -> Result<Json<Book>, AppError> {
    let id = book_id(id)?;
    let Json(draft) = draft.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;

    Ok(Json(service.update_book(id, draft).await?))
}

async fn delete_book(
    State(service): SharedService,
    id: Result<Path<BookId>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let id = book_id(id)?;
    service.delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn book_id(id: Result<Path<BookId>, PathRejection>) -> Result<BookId, AppError> {
    match id {
        Ok(Path(id)) => Ok(id),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "rejected book id");
            Err(AppError::bad_request("invalid book id"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::books::{service::ServiceOptions, store::MemoryBookStore};
    use axum::body::Body;
    use folio_cache::MemoryCache;
    use folio_events::MemoryEventLog;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn app() -> Router {
        let service = BookService::new(
            Arc::new(MemoryBookStore::new()),
            Arc::new(MemoryCache::new(100)),
            Arc::new(MemoryEventLog::new()),
            ServiceOptions::default(),
        );
        router(Arc::new(service))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Vec<u8>) {
        let mut builder = axum::http::Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn create_returns_201() {
        let app = app();
        let (status, body) = send(
            &app,
            "POST",
            "/",
            Some(r#"{"title":"Dune","author":"Frank Herbert","year":1965}"#),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        let book: Book = serde_json::from_slice(&body).unwrap();
        assert_eq!(book.id, 1);
    }

    #[tokio::test]
    async fn non_numeric_id_is_bad_request() {
        let (status, body) = send(&app(), "GET", "/abc", None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["error"]["message"], "invalid book id");
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let (status, _) = send(&app(), "POST", "/", Some("{\"title\":")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn negative_paging_is_bad_request() {
        let (status, _) = send(&app(), "GET", "/?limit=-1", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn health_is_not_an_id() {
        let (status, body) = send(&app(), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"books module is healthy");
    }

    #[tokio::test]
    async fn delete_returns_204_then_404() {
        let app = app();
        send(
            &app,
            "POST",
            "/",
            Some(r#"{"title":"Dune","author":"Frank Herbert","year":1965}"#),
        )
        .await;

        let (first, _) = send(&app, "DELETE", "/1", None).await;
        let (second, _) = send(&app, "DELETE", "/1", None).await;

        assert_eq!(first, StatusCode::NO_CONTENT);
        assert_eq!(second, StatusCode::NOT_FOUND);
    }
}
