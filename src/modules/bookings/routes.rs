//! HTTP handlers for `/api/bookings`.

use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use innkeep_http::{
    extract::JsonObject,
    pagination::{Page, PageParams, PageRequest},
    validation::FieldErrors,
    AppError,
};
use serde_json::{Map, Value};

use super::{
    models::{Booking, BookingDraft},
    payload::BookingFields,
    views::BookingView,
};
use crate::{store::AppState, utils::parse_path_id};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_bookings).post(create_booking))
        .route("/health", get(health_check))
        .route(
            "/{id}",
            get(retrieve_booking)
                .put(replace_booking)
                .patch(patch_booking)
                .delete(delete_booking),
        )
        .with_state(state)
}

async fn health_check() -> &'static str {
    "bookings module is healthy"
}

async fn list_bookings(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<BookingView>>, AppError> {
    let request = PageRequest::resolve(&params, &state.pagination)?;
    let count = state.bookings.count().await?;
    request.check_bounds(count)?;

    let bookings = state.bookings.list(request.limit(), request.offset()).await?;
    let results = bookings.iter().map(BookingView::from).collect();
    Ok(Json(Page::new(uri.path(), request, count, results)))
}

async fn create_booking(
    State(state): State<AppState>,
    JsonObject(body): JsonObject,
) -> Result<(StatusCode, Json<BookingView>), AppError> {
    let draft = validate(&state, &body, None).await?;
    let booking = state.bookings.create(draft).await?;
    Ok((StatusCode::CREATED, Json(BookingView::from(&booking))))
}

async fn retrieve_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BookingView>, AppError> {
    let booking = state.bookings.get(parse_path_id(&id)?).await?;
    Ok(Json(BookingView::from(&booking)))
}

async fn replace_booking(
    state: State<AppState>,
    id: Path<String>,
    body: JsonObject,
) -> Result<Json<BookingView>, AppError> {
    update_booking(state, id, body, false).await
}

async fn patch_booking(
    state: State<AppState>,
    id: Path<String>,
    body: JsonObject,
) -> Result<Json<BookingView>, AppError> {
    update_booking(state, id, body, true).await
}

async fn update_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonObject(body): JsonObject,
    partial: bool,
) -> Result<Json<BookingView>, AppError> {
    let existing = state.bookings.get(parse_path_id(&id)?).await?;

    // A partial update is judged on the merged record, so a new check-out
    // alone is still compared against the stored check-in.
    let draft = validate(&state, &body, partial.then_some(&existing)).await?;
    let booking = state.bookings.update(existing.id, draft).await?;
    Ok(Json(BookingView::from(&booking)))
}

async fn delete_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.bookings.delete(parse_path_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Turn a request body into a booking the store may write.
///
/// Rules apply in a fixed order and the first failing stage answers: field
/// errors (all of them), then the interval rule. The conflict rule runs in
/// the store. With `base`, absent fields are taken from that booking.
async fn validate(
    state: &AppState,
    body: &Map<String, Value>,
    base: Option<&Booking>,
) -> Result<BookingDraft, AppError> {
    let mut errors = FieldErrors::new();
    let fields = BookingFields::parse(body, base.is_none(), &mut errors);

    if let Some(room_id) = fields.room {
        if !state.rooms.exists(room_id).await? {
            errors.push(
                "room",
                "does_not_exist",
                format!("Invalid pk \"{room_id}\" - object does not exist."),
            );
        }
    }
    let fields = errors.finish(fields)?;

    let room = fields.room.or(base.map(|booking| booking.room_id));
    let check_in = fields.check_in.or(base.map(Booking::check_in));
    let check_out = fields.check_out.or(base.map(Booking::check_out));

    let (Some(room), Some(check_in), Some(check_out)) = (room, check_in, check_out) else {
        // Unreachable when required fields were enforced above.
        return Err(AppError::bad_request("Incomplete booking."));
    };

    Ok(BookingDraft::new(room, check_in, check_out)?)
}
