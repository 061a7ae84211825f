//! HTTP handlers for `/api/rooms`.

use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use innkeep_http::{
    extract::JsonObject,
    pagination::{Page, PageParams, PageRequest},
    AppError,
};

use super::{
    payload::{parse_new_room, parse_room_changes},
    views::{RoomCreated, RoomDetailView, RoomView},
};
use crate::{store::AppState, utils::parse_path_id};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_rooms).post(create_room))
        .route("/health", get(health_check))
        .route(
            "/{room_id}",
            get(retrieve_room)
                .put(replace_room)
                .patch(patch_room)
                .delete(delete_room),
        )
        .with_state(state)
}

async fn health_check() -> &'static str {
    "rooms module is healthy"
}

async fn list_rooms(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<RoomView>>, AppError> {
    let request = PageRequest::resolve(&params, &state.pagination)?;
    let count = state.rooms.count().await?;
    request.check_bounds(count)?;

    let rooms = state.rooms.list(request.limit(), request.offset()).await?;
    let results = rooms.iter().map(RoomView::from).collect();
    Ok(Json(Page::new(uri.path(), request, count, results)))
}

async fn create_room(
    State(state): State<AppState>,
    JsonObject(body): JsonObject,
) -> Result<(StatusCode, Json<RoomCreated>), AppError> {
    let new_room = parse_new_room(&body)?;
    let room = state.rooms.create(new_room).await?;
    Ok((
        StatusCode::CREATED,
        Json(RoomCreated {
            room_id: room.room_id,
        }),
    ))
}

async fn retrieve_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomDetailView>, AppError> {
    let room_id = parse_path_id(&room_id)?;
    let room = state.rooms.get(room_id).await?;
    let bookings = state.bookings.list_for_room(room_id).await?;
    Ok(Json(RoomDetailView::new(&room, &bookings)))
}

async fn replace_room(
    state: State<AppState>,
    room_id: Path<String>,
    body: JsonObject,
) -> Result<Json<RoomView>, AppError> {
    update_room(state, room_id, body, false).await
}

async fn patch_room(
    state: State<AppState>,
    room_id: Path<String>,
    body: JsonObject,
) -> Result<Json<RoomView>, AppError> {
    update_room(state, room_id, body, true).await
}

async fn update_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    JsonObject(body): JsonObject,
    partial: bool,
) -> Result<Json<RoomView>, AppError> {
    let room_id = parse_path_id(&room_id)?;
    // An unknown room is reported as such even when the body is also bad.
    state.rooms.get(room_id).await?;

    let changes = parse_room_changes(&body, partial)?;
    let room = state.rooms.update(room_id, changes).await?;
    Ok(Json(RoomView::from(&room)))
}

async fn delete_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let room_id = parse_path_id(&room_id)?;
    state.rooms.delete(room_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
