//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, health, reservations, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Shelfkeeper API",
        version = "1.0.0",
        description = "Library reservation REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        // Books
        books::get_book,
        books::search_books,
        books::create_book,
        books::delete_book,
        // Users
        users::create_user,
        users::update_balance,
        // Reservations
        reservations::create_reservation,
        reservations::get_reservations_by_book_id,
        reservations::finish_reservation,
    ),
    components(
        schemas(
            // Books
            crate::models::book::Book,
            crate::models::book::CreateBook,
            crate::models::book::BookQuery,
            books::BookSearchResponse,
            // Users
            crate::models::user::User,
            crate::models::user::UpdateBalance,
            // Reservations
            crate::models::reservation::Reservation,
            crate::models::reservation::CreateReservation,
            crate::models::reservation::ReservationQuery,
            reservations::ReservationsResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "books", description = "Book catalog and stock"),
        (name = "users", description = "User accounts and balances"),
        (name = "reservations", description = "Reservation lifecycle")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
