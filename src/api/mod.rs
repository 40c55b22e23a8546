//! API handlers for Shelfkeeper REST endpoints

pub mod books;
pub mod health;
pub mod openapi;
pub mod reservations;
pub mod users;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Books
        .route("/books", post(books::create_book))
        .route("/books/search", get(books::search_books))
        .route("/books/:id", get(books::get_book))
        .route("/books/:id", delete(books::delete_book))
        // Users
        .route("/users", post(users::create_user))
        .route("/users/:email/balance", patch(users::update_balance))
        // Reservations
        .route("/reservations", post(reservations::create_reservation))
        .route(
            "/reservations/book/:book_id",
            get(reservations::get_reservations_by_book_id),
        )
        .route(
            "/reservations/finish/:id",
            patch(reservations::finish_reservation),
        )
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header::CONTENT_TYPE, Method, Request, StatusCode},
        Router,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::{
        config::{AppConfig, DatabaseConfig, LoggingConfig, ServerConfig},
        repository::{
            books::MockBookStore, reservations::MockReservationStore, users::MockUserStore,
            Repository,
        },
        services::{email::MockEmailSender, Services},
        AppState,
    };

    /// Store and mail mocks behind a test router
    #[derive(Default)]
    pub struct Mocks {
        pub books: MockBookStore,
        pub users: MockUserStore,
        pub reservations: MockReservationStore,
        pub email: MockEmailSender,
    }

    pub fn test_app(mocks: Mocks) -> Router {
        let repository = Repository::from_stores(
            Arc::new(mocks.books),
            Arc::new(mocks.users),
            Arc::new(mocks.reservations),
        );
        let config = AppConfig {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
            email: Default::default(),
            scheduler: Default::default(),
        };
        super::router(AppState {
            config: Arc::new(config),
            services: Arc::new(Services::new(repository, Arc::new(mocks.email))),
        })
    }

    /// Send one request; returns the status and the JSON body (Null when empty)
    pub async fn request(
        app: Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }
}
