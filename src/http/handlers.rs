use crate::core::live::{FormattedSummary, MyDay, TodayAttendance};
use crate::core::service::{AttendanceService, ListParams, Page};
use crate::errors::{AppError, AppResult};
use crate::http::AppState;
use crate::http::identity::actor_from_headers;
use crate::models::day_summary::DailySummary;
use crate::models::event::{AttendanceEvent, EventPayload};
use crate::models::event_type::EventType;
use crate::models::override_record::{AttendanceRecord, OverrideRequest};
use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;

/// Run store work off the async executor.
async fn blocking<T, F>(service: &Arc<AttendanceService>, f: F) -> AppResult<T>
where
    F: FnOnce(&AttendanceService) -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    let service = Arc::clone(service);
    tokio::task::spawn_blocking(move || f(&service))
        .await
        .map_err(|e| AppError::Other(format!("worker task failed: {e}")))?
}

/// Query-string failures answer with the JSON error body like every other 400.
fn query<T>(extracted: Result<Query<T>, QueryRejection>) -> AppResult<T> {
    extracted
        .map(|Query(q)| q)
        .map_err(|e| AppError::Validation(e.body_text()))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EventView {
    id: i64,
    event_type: EventType,
    timestamp: String,
}

impl From<&AttendanceEvent> for EventView {
    fn from(e: &AttendanceEvent) -> Self {
        Self {
            id: e.id,
            event_type: e.event_type,
            timestamp: e.timestamp_str(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct RecordedResponse {
    event: EventView,
    summary: FormattedSummary,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DateQuery {
    date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListQuery {
    user_id: Option<String>,
    from: Option<String>,
    to: Option<String>,
    page: Option<String>,
    limit: Option<String>,
}

async fn record_event(
    state: &AppState,
    headers: &HeaderMap,
    body: &[u8],
    event_type: EventType,
) -> AppResult<Json<RecordedResponse>> {
    let actor = actor_from_headers(headers)?;
    let payload = EventPayload::from_json_bytes(body)?;

    let response = blocking(&state.service, move |svc| {
        let recorded = svc.aggregator.record(&actor.id, event_type, payload)?;
        Ok(RecordedResponse {
            event: EventView::from(&recorded.event),
            summary: svc.format(&recorded.summary),
        })
    })
    .await?;
    Ok(Json(response))
}

pub(crate) async fn check_in_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<(StatusCode, Json<RecordedResponse>)> {
    let json = record_event(&state, &headers, &body, EventType::CheckIn).await?;
    Ok((StatusCode::CREATED, json))
}

pub(crate) async fn check_out_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<RecordedResponse>> {
    record_event(&state, &headers, &body, EventType::CheckOut).await
}

pub(crate) async fn daily_summary_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    q: Result<Query<DateQuery>, QueryRejection>,
) -> AppResult<Json<Value>> {
    let actor = actor_from_headers(&headers)?;
    let q = query(q)?;
    let summary = blocking(&state.service, move |svc| {
        svc.daily_summary(&actor.id, q.date.as_deref())
    })
    .await?;
    Ok(Json(json!({ "summary": summary })))
}

pub(crate) async fn me_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    q: Result<Query<DateQuery>, QueryRejection>,
) -> AppResult<Json<MyDay>> {
    let actor = actor_from_headers(&headers)?;
    let q = query(q)?;
    let summary = blocking(&state.service, move |svc| {
        svc.daily_summary(&actor.id, q.date.as_deref())
    })
    .await?;
    Ok(Json(MyDay::from(summary)))
}

pub(crate) async fn today_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<Value>> {
    let actor = actor_from_headers(&headers)?;
    let summary = blocking(&state.service, move |svc| svc.daily_summary(&actor.id, None)).await?;
    Ok(Json(json!({
        "attendance": TodayAttendance::from_formatted(summary)
    })))
}

pub(crate) async fn list_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    q: Result<Query<ListQuery>, QueryRejection>,
) -> AppResult<Json<Page<DailySummary>>> {
    let actor = actor_from_headers(&headers)?;
    let q = query(q)?;
    let params = ListParams {
        user_id: q.user_id,
        from: q.from,
        to: q.to,
        page: q.page,
        limit: q.limit,
    };
    let page = blocking(&state.service, move |svc| svc.list(&actor, &params)).await?;
    Ok(Json(page))
}

pub(crate) async fn override_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: Bytes,
) -> AppResult<Json<AttendanceRecord>> {
    let actor = actor_from_headers(&headers)?;
    let request: OverrideRequest = serde_json::from_slice(&body)
        .map_err(|e| AppError::Validation(format!("invalid override body: {e}")))?;

    let record = blocking(&state.service, move |svc| {
        svc.overrides.apply(&actor, &id, request)
    })
    .await?;
    Ok(Json(record))
}

pub(crate) async fn healthz_handler() -> Json<Value> {
    Json(json!({"status": "ok"}))
}
