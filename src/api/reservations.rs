//! Reservation endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult, ErrorResponse},
    models::reservation::{CreateReservation, Reservation, ReservationQuery},
};

/// Reservations of a book, one page
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReservationsResponse {
    pub reservations: Vec<Reservation>,
    pub total_records: i64,
}

/// Reserve copies of a book
#[utoipa::path(
    post,
    path = "/reservations",
    tag = "reservations",
    request_body = CreateReservation,
    responses(
        (status = 201, description = "Reservation created"),
        (status = 400, description = "Invalid input, out of stock or insufficient balance", body = ErrorResponse),
        (status = 404, description = "Book or user not found", body = ErrorResponse)
    )
)]
pub async fn create_reservation(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateReservation>,
) -> AppResult<StatusCode> {
    request.validate()?;

    let now = Utc::now();
    if request.return_date <= now {
        return Err(AppError::Validation(
            "returnDate must be later than today".to_string(),
        ));
    }

    let reservation = Reservation::new(
        request.book_id,
        request.user_email,
        request.book_count,
        request.return_date,
        now,
    );
    state.services.reservations.create_reservation(reservation).await?;
    Ok(StatusCode::CREATED)
}

/// List reservations of a book
#[utoipa::path(
    get,
    path = "/reservations/book/{book_id}",
    tag = "reservations",
    params(
        ("book_id" = String, Path, description = "Book ID"),
        ReservationQuery
    ),
    responses(
        (status = 200, description = "Reservations of the book", body = ReservationsResponse),
        (status = 404, description = "No reservations found", body = ErrorResponse)
    )
)]
pub async fn get_reservations_by_book_id(
    State(state): State<crate::AppState>,
    Path(book_id): Path<String>,
    Query(query): Query<ReservationQuery>,
) -> AppResult<Json<ReservationsResponse>> {
    if query.page() < 1 || query.limit() < 1 {
        return Err(AppError::Validation("page and limit must be at least 1".to_string()));
    }

    let (reservations, total_records) = state
        .services
        .reservations
        .get_reservations_by_book_id(&book_id, query.page(), query.limit())
        .await?;
    if reservations.is_empty() {
        return Err(AppError::NotFound("No reservations found".to_string()));
    }

    Ok(Json(ReservationsResponse {
        reservations,
        total_records,
    }))
}

/// Return the copies of a reservation
#[utoipa::path(
    patch,
    path = "/reservations/finish/{id}",
    tag = "reservations",
    params(
        ("id" = Uuid, Path, description = "Reservation ID")
    ),
    responses(
        (status = 200, description = "Reservation finished"),
        (status = 400, description = "Reservation already finished", body = ErrorResponse),
        (status = 404, description = "Reservation does not exist", body = ErrorResponse)
    )
)]
pub async fn finish_reservation(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if !state.services.reservations.finish_reservation(id).await? {
        return Err(AppError::NotFound("Reservation does not exist".to_string()));
    }
    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;
    use serde_json::json;
    use uuid::Uuid;

    use crate::{
        api::test_support::{request, test_app, Mocks},
        error::AppError,
        models::{book::Book, reservation::Reservation},
    };

    fn book(stock: i32) -> Book {
        Book {
            book_id: "B1".to_string(),
            title: "Piranesi".to_string(),
            author: "Susanna Clarke".to_string(),
            publication_year: 2020,
            publisher: "Bloomsbury".to_string(),
            price: Decimal::TEN,
            stock,
        }
    }

    #[tokio::test]
    async fn test_create_reservation_in_the_past() {
        let (status, body) = request(
            test_app(Mocks::default()),
            Method::POST,
            "/api/v1/reservations",
            Some(json!({
                "bookId": "B1",
                "userEmail": "reader@example.com",
                "bookCount": 1,
                "returnDate": (Utc::now() - Duration::days(1)).to_rfc3339()
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "returnDate must be later than today");
    }

    #[tokio::test]
    async fn test_create_reservation_zero_copies() {
        let (status, _) = request(
            test_app(Mocks::default()),
            Method::POST,
            "/api/v1/reservations",
            Some(json!({
                "bookId": "B1",
                "userEmail": "reader@example.com",
                "bookCount": 0,
                "returnDate": (Utc::now() + Duration::days(7)).to_rfc3339()
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_reservation_out_of_stock() {
        let mut mocks = Mocks::default();
        mocks.books.expect_find_by_id().returning(|_| Ok(Some(book(0))));

        let (status, body) = request(
            test_app(mocks),
            Method::POST,
            "/api/v1/reservations",
            Some(json!({
                "bookId": "B1",
                "userEmail": "reader@example.com",
                "bookCount": 1,
                "returnDate": (Utc::now() + Duration::days(7)).to_rfc3339()
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Book with ID B1 out of stock.");
    }

    #[tokio::test]
    async fn test_create_reservation() {
        let mut mocks = Mocks::default();
        mocks.books.expect_find_by_id().returning(|_| Ok(Some(book(5))));
        mocks.users.expect_exists().returning(|_| Ok(true));
        mocks
            .users
            .expect_get_balance()
            .returning(|_| Ok(Some(Decimal::TEN)));
        mocks
            .users
            .expect_update_balance()
            .withf(|_, balance| *balance == Decimal::from(7))
            .returning(|_, _| Ok(true));
        mocks
            .reservations
            .expect_save()
            .withf(|r| {
                r.id.is_none() && r.book_id == "B1" && r.book_count == 2 && !r.is_returned && !r.is_bought
            })
            .returning(|_| Ok(true));

        let (status, _) = request(
            test_app(mocks),
            Method::POST,
            "/api/v1/reservations",
            Some(json!({
                "bookId": "B1",
                "userEmail": "reader@example.com",
                "bookCount": 2,
                "returnDate": (Utc::now() + Duration::days(7)).to_rfc3339()
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_get_reservations_by_book_id() {
        let mut mocks = Mocks::default();
        mocks
            .reservations
            .expect_find_by_book_id()
            .withf(|book_id, offset, limit| book_id == "B1" && *offset == 2 && *limit == 2)
            .returning(|_, _, _| {
                let now = Utc::now();
                let reservation = Reservation {
                    id: Some(Uuid::nil()),
                    ..Reservation::new("B1", "reader@example.com", 1, now + Duration::days(3), now)
                };
                Ok((vec![reservation], 3))
            });

        let (status, body) = request(
            test_app(mocks),
            Method::GET,
            "/api/v1/reservations/book/B1?page=2&limit=2",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalRecords"], 3);
        assert_eq!(body["reservations"][0]["userEmail"], "reader@example.com");
        assert_eq!(body["reservations"][0]["isReturned"], false);
    }

    #[tokio::test]
    async fn test_get_reservations_empty_page() {
        let mut mocks = Mocks::default();
        mocks
            .reservations
            .expect_find_by_book_id()
            .returning(|_, _, _| Ok((Vec::new(), 0)));

        let (status, body) =
            request(test_app(mocks), Method::GET, "/api/v1/reservations/book/B1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "No reservations found");
    }

    #[tokio::test]
    async fn test_finish_unknown_reservation() {
        let mut mocks = Mocks::default();
        mocks.reservations.expect_find_by_id().returning(|_| Ok(None));

        let uri = format!("/api/v1/reservations/finish/{}", Uuid::new_v4());
        let (status, body) = request(test_app(mocks), Method::PATCH, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Reservation does not exist");
    }

    #[tokio::test]
    async fn test_finish_reservation_store_failure() {
        let mut mocks = Mocks::default();
        mocks
            .reservations
            .expect_find_by_id()
            .returning(|_| Err(AppError::Internal("connection refused".to_string())));

        let uri = format!("/api/v1/reservations/finish/{}", Uuid::new_v4());
        let (status, body) = request(test_app(mocks), Method::PATCH, &uri, None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal server error");
    }
}
