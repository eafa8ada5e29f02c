use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::CONTENT_TYPE, HeaderMap},
    response::IntoResponse,
    Json,
};
use conduit_commands::api::{
    CheckCommandOutputResponse, CommandIdRequest, CommandIdResponse, CommandStatusResponse,
    DiscoverCommandOutputResponse, RunCheckCommandRequest, RunDiscoverCommandRequest,
};
use conduit_common::metrics::encode_text;

use crate::{ApiError, AppState, Role};

type ApiResult<T> = Result<Json<T>, ApiError>;

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(v)| v)
        .map_err(|e| ApiError::MalformedBody(e.body_text()))
}

pub(crate) async fn cancel(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CommandIdRequest>, JsonRejection>,
) -> ApiResult<CommandIdResponse> {
    state.authorize(&headers, Role::Runner)?;
    Ok(Json(state.gateway.cancel(body(payload)?).await?))
}

pub(crate) async fn status(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CommandIdRequest>, JsonRejection>,
) -> ApiResult<CommandStatusResponse> {
    state.authorize(&headers, Role::Reader)?;
    Ok(Json(state.gateway.get_status(body(payload)?).await?))
}

pub(crate) async fn check_output(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CommandIdRequest>, JsonRejection>,
) -> ApiResult<CheckCommandOutputResponse> {
    state.authorize(&headers, Role::Reader)?;
    Ok(Json(state.gateway.get_check_output(body(payload)?).await?))
}

pub(crate) async fn discover_output(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CommandIdRequest>, JsonRejection>,
) -> ApiResult<DiscoverCommandOutputResponse> {
    state.authorize(&headers, Role::Reader)?;
    Ok(Json(state.gateway.get_discover_output(body(payload)?).await?))
}

pub(crate) async fn run_check(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<RunCheckCommandRequest>, JsonRejection>,
) -> ApiResult<CommandIdResponse> {
    state.authorize(&headers, Role::Runner)?;
    Ok(Json(state.gateway.run_check(body(payload)?).await?))
}

pub(crate) async fn run_discover(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<RunDiscoverCommandRequest>, JsonRejection>,
) -> ApiResult<CommandIdResponse> {
    state.authorize(&headers, Role::Runner)?;
    Ok(Json(state.gateway.run_discover(body(payload)?).await?))
}

pub(crate) async fn health() -> &'static str {
    "ok"
}

pub(crate) async fn metrics(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let text = encode_text(&state.registry)?;
    Ok(([(CONTENT_TYPE, prometheus::TEXT_FORMAT)], text))
}
