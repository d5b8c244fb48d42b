//! HTTP handlers for the books collection.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use bookshelf_http::error::AppError;
use serde_json::json;

use super::models::{Book, BookInput, BookPatch};
use super::repository::{BookRepository, StoreError};
use super::validator::{self, ValidationError};

#[derive(Clone)]
pub struct BooksState {
    repo: Arc<dyn BookRepository>,
}

/// Routes relative to the module mount point (`/api/books`)
pub fn router(repo: Arc<dyn BookRepository>) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/health", get(health_check))
        .route(
            "/{id}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .with_state(BooksState { repo })
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::validation(
            vec![json!({"field": err.field(), "error": err.reason()})],
            err.to_string(),
        )
    }
}

/// Not-found surfaces as 404 on every operation; anything else is an opaque 500.
fn store_failure(action: &'static str) -> impl FnOnce(StoreError) -> AppError {
    move |err| match err {
        StoreError::NotFound(_) => AppError::not_found("Book not found"),
        other => AppError::Internal(anyhow::Error::new(other).context(action)),
    }
}

/// Identifiers are non-negative integers that fit the store's key type.
fn parse_book_id(raw: &str) -> Result<i64, AppError> {
    raw.parse::<u64>()
        .ok()
        .and_then(|id| i64::try_from(id).ok())
        .ok_or_else(|| AppError::bad_request("Invalid book ID"))
}

async fn health_check() -> &'static str {
    "books module is healthy"
}

async fn create_book(
    State(state): State<BooksState>,
    payload: Result<Json<BookInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let Json(input) = payload?;
    validator::validate(&input)?;

    let book = state
        .repo
        .create_book(&input)
        .await
        .map_err(store_failure("failed to create the book"))?;

    tracing::info!(book_id = book.id, "book created");
    Ok((StatusCode::CREATED, Json(book)))
}

async fn get_book(
    State(state): State<BooksState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Book>, AppError> {
    let id = parse_book_id(&raw_id)?;

    let book = state
        .repo
        .get_book_by_id(id)
        .await
        .map_err(store_failure("failed to retrieve the book"))?;

    Ok(Json(book))
}

async fn list_books(State(state): State<BooksState>) -> Result<Json<Vec<Book>>, AppError> {
    let books = state
        .repo
        .get_all_books()
        .await
        .map_err(store_failure("failed to retrieve books"))?;

    Ok(Json(books))
}

async fn update_book(
    State(state): State<BooksState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<BookPatch>, JsonRejection>,
) -> Result<Json<Book>, AppError> {
    let id = parse_book_id(&raw_id)?;
    let Json(patch) = payload?;

    let book = state
        .repo
        .update_book(id, &patch)
        .await
        .map_err(store_failure("failed to update the book"))?;

    tracing::info!(book_id = book.id, "book updated");
    Ok(Json(book))
}

async fn delete_book(
    State(state): State<BooksState>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_book_id(&raw_id)?;

    state
        .repo
        .delete_book(id)
        .await
        .map_err(store_failure("failed to delete the book"))?;

    tracing::info!(book_id = id, "book deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::books::repository::InMemoryBookRepository;
    use async_trait::async_trait;
    use axum::{body::Body, extract::Request, http::header, response::Response};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    /// Fails every call with a database error and counts invocations.
    #[derive(Default)]
    struct BrokenRepository {
        calls: AtomicUsize,
    }

    impl BrokenRepository {
        fn fail(&self) -> StoreError {
            self.calls.fetch_add(1, Ordering::SeqCst);
            StoreError::Database(sqlx::Error::PoolTimedOut)
        }
    }

    #[async_trait]
    impl BookRepository for BrokenRepository {
        async fn create_book(&self, _input: &BookInput) -> Result<Book, StoreError> {
            Err(self.fail())
        }
        async fn get_book_by_id(&self, _id: i64) -> Result<Book, StoreError> {
            Err(self.fail())
        }
        async fn get_all_books(&self) -> Result<Vec<Book>, StoreError> {
            Err(self.fail())
        }
        async fn update_book(&self, _id: i64, _patch: &BookPatch) -> Result<Book, StoreError> {
            Err(self.fail())
        }
        async fn delete_book(&self, _id: i64) -> Result<(), StoreError> {
            Err(self.fail())
        }
    }

    fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn book_ids_must_be_non_negative_integers() {
        assert_eq!(parse_book_id("1").unwrap(), 1);
        assert!(parse_book_id("-1").is_err());
        assert!(parse_book_id("abc").is_err());
        assert!(parse_book_id("9223372036854775808").is_err());
    }

    #[tokio::test]
    async fn create_rejects_invalid_payload_without_touching_store() {
        let repo = Arc::new(BrokenRepository::default());
        let app = router(repo.clone());

        let response = app
            .clone()
            .oneshot(json_request("POST", "/", r#"{"author":"John Doe","published":2020}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "validation_error");
        assert_eq!(body["error"]["message"], "title is required");
        assert_eq!(body["error"]["details"][0]["field"], "title");

        let response = app
            .oneshot(json_request("POST", "/", "{not json"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "bad_request");

        assert_eq!(repo.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn create_without_content_type_is_bad_request() {
        let app = router(Arc::new(InMemoryBookRepository::new()));
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::from(r#"{"title":"A","author":"B","published":1}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn store_failures_are_opaque_server_errors() {
        let app = router(Arc::new(BrokenRepository::default()));
        let valid = r#"{"title":"Sample Book","author":"John Doe","published":2020}"#;

        let requests = vec![
            json_request("POST", "/", valid),
            empty_request("GET", "/"),
            empty_request("GET", "/1"),
            json_request("PUT", "/1", r#"{"title":"X"}"#),
            empty_request("DELETE", "/1"),
        ];

        for request in requests {
            let label = format!("{} {}", request.method(), request.uri());
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR, "{label}");

            let body = body_json(response).await;
            assert_eq!(body["error"]["code"], "internal_error", "{label}");
            assert!(!body.to_string().contains("pool"), "{label}");
        }
    }

    #[tokio::test]
    async fn invalid_ids_are_rejected_before_the_store() {
        let repo = Arc::new(BrokenRepository::default());
        let app = router(repo.clone());

        let requests = vec![
            empty_request("GET", "/abc"),
            json_request("PUT", "/-4", "{}"),
            empty_request("DELETE", "/1.5"),
        ];
        for request in requests {
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(body_json(response).await["error"]["message"], "Invalid book ID");
        }

        assert_eq!(repo.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_books_are_not_found_on_every_operation() {
        let app = router(Arc::new(InMemoryBookRepository::new()));

        let requests = vec![
            empty_request("GET", "/42"),
            json_request("PUT", "/42", r#"{"title":"X"}"#),
            empty_request("DELETE", "/42"),
        ];
        for request in requests {
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
            assert_eq!(body_json(response).await["error"]["code"], "not_found");
        }
    }

    #[tokio::test]
    async fn update_with_malformed_body_is_bad_request() {
        let repo = Arc::new(InMemoryBookRepository::new());
        repo.create_book(&BookInput {
            title: "Sample Book".to_string(),
            author: "John Doe".to_string(),
            published: 2020,
        })
        .await
        .unwrap();
        let app = router(repo);

        let response = app
            .oneshot(json_request("PUT", "/1", r#"{"published":"soon"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn update_can_set_explicit_values() {
        let repo = Arc::new(InMemoryBookRepository::new());
        let app = router(repo.clone());

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/",
                r#"{"title":"Sample Book","author":"John Doe","published":2020}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let id = body_json(response).await["id"].as_i64().unwrap();

        let response = app
            .oneshot(json_request(
                "PUT",
                &format!("/{id}"),
                r#"{"author":"Jane Roe","published":0}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["title"], "Sample Book");
        assert_eq!(body["author"], "Jane Roe");
        assert_eq!(body["published"], 0);
    }

    #[tokio::test]
    async fn module_health_is_not_shadowed_by_id_route() {
        let app = router(Arc::new(BrokenRepository::default()));
        let response = app.oneshot(empty_request("GET", "/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
