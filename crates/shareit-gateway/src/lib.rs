use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{FromRequestParts, Path, Query, State, rejection::JsonRejection},
    http::{StatusCode, request::Parts},
    routing::{get, post},
};
use shareit_booking::{BookingEngine, Page};
use shareit_core::{BookingError, BookingId, ItemId, UserId};
use shareit_platform::{
    BookingView, BookingWindowView, ChangeStatusQuery, CreateBookingRequest, ListBookingsQuery,
};
use tracing::{error, warn};

pub const USER_HEADER: &str = "X-Sharer-User-Id";

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<BookingEngine>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/bookings", post(create_booking).get(list_for_booker))
        .route("/bookings/owner", get(list_for_owner))
        .route(
            "/bookings/{booking_id}",
            get(get_booking).patch(change_status),
        )
        .route("/bookings/{booking_id}/cancel", post(cancel_booking))
        .route("/items/{item_id}/bookings", get(item_booking_window))
        .with_state(state)
}

/// Acting user, taken from the `X-Sharer-User-Id` header.
#[derive(Debug, Clone, Copy)]
pub struct CallerId(pub UserId);

impl<S> FromRequestParts<S> for CallerId
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_HEADER)
            .ok_or_else(|| (StatusCode::BAD_REQUEST, format!("{USER_HEADER} header is required")))?;

        raw.to_str()
            .ok()
            .and_then(|value| value.trim().parse::<i64>().ok())
            .map(|id| CallerId(UserId::new(id)))
            .ok_or_else(|| {
                (
                    StatusCode::BAD_REQUEST,
                    format!("{USER_HEADER} header must be an integer user id"),
                )
            })
    }
}

async fn healthz() -> &'static str {
    "ok"
}

async fn create_booking(
    State(state): State<AppState>,
    CallerId(caller): CallerId,
    payload: Result<Json<CreateBookingRequest>, JsonRejection>,
) -> Result<Json<BookingView>, (StatusCode, String)> {
    let Json(payload) = payload.map_err(invalid_body)?;
    let booking = state
        .engine
        .create(
            caller,
            payload.item_id.map(ItemId::new),
            payload.start,
            payload.end,
        )
        .await
        .map_err(api_error)?;

    Ok(Json(booking.into()))
}

async fn change_status(
    State(state): State<AppState>,
    CallerId(caller): CallerId,
    Path(booking_id): Path<i64>,
    Query(query): Query<ChangeStatusQuery>,
) -> Result<Json<BookingView>, (StatusCode, String)> {
    let booking = state
        .engine
        .change_status(caller, BookingId::new(booking_id), query.approved)
        .await
        .map_err(api_error)?;

    Ok(Json(booking.into()))
}

async fn cancel_booking(
    State(state): State<AppState>,
    CallerId(caller): CallerId,
    Path(booking_id): Path<i64>,
) -> Result<Json<BookingView>, (StatusCode, String)> {
    let booking = state
        .engine
        .cancel(caller, BookingId::new(booking_id))
        .await
        .map_err(api_error)?;

    Ok(Json(booking.into()))
}

async fn get_booking(
    State(state): State<AppState>,
    CallerId(caller): CallerId,
    Path(booking_id): Path<i64>,
) -> Result<Json<BookingView>, (StatusCode, String)> {
    let booking = state
        .engine
        .get_by_id(caller, BookingId::new(booking_id))
        .await
        .map_err(api_error)?;

    Ok(Json(booking.into()))
}

async fn list_for_booker(
    State(state): State<AppState>,
    CallerId(caller): CallerId,
    Query(query): Query<ListBookingsQuery>,
) -> Result<Json<Vec<BookingView>>, (StatusCode, String)> {
    let page: Page = query.page().map_err(api_error)?;
    let bookings = state
        .engine
        .list_for_booker(caller, &query.state, page)
        .await
        .map_err(api_error)?;

    Ok(Json(bookings.into_iter().map(Into::into).collect()))
}

async fn list_for_owner(
    State(state): State<AppState>,
    CallerId(caller): CallerId,
    Query(query): Query<ListBookingsQuery>,
) -> Result<Json<Vec<BookingView>>, (StatusCode, String)> {
    let page: Page = query.page().map_err(api_error)?;
    let bookings = state
        .engine
        .list_for_owner(caller, &query.state, page)
        .await
        .map_err(api_error)?;

    Ok(Json(bookings.into_iter().map(Into::into).collect()))
}

async fn item_booking_window(
    State(state): State<AppState>,
    CallerId(caller): CallerId,
    Path(item_id): Path<i64>,
) -> Result<Json<BookingWindowView>, (StatusCode, String)> {
    let window = state
        .engine
        .booking_window(caller, ItemId::new(item_id))
        .await
        .map_err(api_error)?;

    Ok(Json(window.into()))
}

fn api_error(err: BookingError) -> (StatusCode, String) {
    match err {
        BookingError::NotFound(message) => {
            warn!(%message, "booking request refused: not found");
            (StatusCode::NOT_FOUND, message)
        }
        BookingError::Validation(message) => {
            warn!(%message, "booking request refused: validation");
            (StatusCode::BAD_REQUEST, message)
        }
        BookingError::Infrastructure(err) => {
            error!(error = ?err, "booking request failed");
            internal_error()
        }
    }
}

fn invalid_body(rejection: JsonRejection) -> (StatusCode, String) {
    warn!(reason = %rejection.body_text(), "booking request refused: malformed body");
    (StatusCode::BAD_REQUEST, rejection.body_text())
}

fn internal_error() -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal server error".to_string(),
    )
}
