//! HTTP route handlers.

use std::path::Path as FsPath;

use askama::Template;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{delete, get, post},
};
use chrono::{Local, NaiveDateTime};
use tower_http::services::ServeDir;
use tracing::{error, warn};

use crate::domain::{LineId, Location, LocationId, Station, StationId, UserId};
use crate::schedule::{StationResolver, register_daily_times, register_dates};
use crate::store::{ScheduleStore, StoreError};

use super::dto::*;
use super::params::{BoardQuery, ReferenceError, ReferenceQuery};
use super::state::AppState;
use super::templates::*;

/// Create the application router.
///
/// `static_dir` is the path to the static assets directory.
pub fn create_router(state: AppState, static_dir: &FsPath) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/health", get(health))
        .route("/lines", get(list_lines).post(create_line))
        .route("/lines/:id", get(get_line).patch(rename_line))
        .route("/stations", get(list_stations).post(create_station))
        .route("/stations/:id", get(get_station).delete(delete_station))
        .route("/stations/:id/times", get(station_times).post(register_times))
        .route(
            "/stations/:id/dates",
            get(list_service_dates).post(register_service_dates),
        )
        .route("/users/:uid/locations", get(list_locations).post(create_location))
        .route(
            "/users/:uid/locations/:id",
            get(get_location).delete(delete_location),
        )
        .route(
            "/users/:uid/locations/:id/stations",
            post(add_location_station),
        )
        .route(
            "/users/:uid/locations/:id/stations/:sid",
            delete(remove_location_station),
        )
        .route("/users/:uid/locations/:id/times", get(location_times))
        .nest_service("/static", ServeDir::new(static_dir))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Index page listing every station.
async fn index_page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let mut stations = Vec::new();
    for station in state.store.stations()? {
        let line = state.store.line(station.line)?;
        stations.push(StationView::from_station(&station, &line));
    }

    render(IndexTemplate { stations })
}

/// Check if request accepts HTML.
fn accepts_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}

fn render(template: impl Template) -> Result<Html<String>, AppError> {
    template.render().map(Html).map_err(|e| AppError::Internal {
        message: format!("Template error: {}", e),
    })
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn station_result(state: &AppState, station: &Station) -> Result<StationResult, AppError> {
    let line = state.store.line(station.line)?;
    Ok(StationResult::from_station(station, &line))
}

fn location_result(state: &AppState, location: &Location) -> Result<LocationResult, AppError> {
    let display = state.store.describe_location(location)?;
    Ok(LocationResult::from_location(location, display))
}

// ============================================================================
// Lines
// ============================================================================

async fn list_lines(State(state): State<AppState>) -> Result<Json<LinesResponse>, AppError> {
    let lines = state.store.lines()?.iter().map(LineResult::from_line).collect();
    Ok(Json(LinesResponse { lines }))
}

async fn create_line(
    State(state): State<AppState>,
    Json(req): Json<LineRequest>,
) -> Result<(StatusCode, Json<LineResult>), AppError> {
    let name = required_name(&req.name)?;
    let line = state.store.create_line(name)?;
    state.committed();
    Ok((StatusCode::CREATED, Json(LineResult::from_line(&line))))
}

async fn get_line(
    State(state): State<AppState>,
    Path(id): Path<LineId>,
) -> Result<Json<LineResult>, AppError> {
    let line = state.store.line(id)?;
    Ok(Json(LineResult::from_line(&line)))
}

async fn rename_line(
    State(state): State<AppState>,
    Path(id): Path<LineId>,
    Json(req): Json<LineRequest>,
) -> Result<Json<LineResult>, AppError> {
    let name = required_name(&req.name)?;
    let line = state.store.rename_line(id, name)?;
    state.committed();
    Ok(Json(LineResult::from_line(&line)))
}

fn required_name(name: &str) -> Result<&str, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest {
            message: "name must not be empty".to_string(),
        });
    }
    Ok(name)
}

// ============================================================================
// Stations
// ============================================================================

async fn list_stations(
    State(state): State<AppState>,
    Query(query): Query<StationListQuery>,
) -> Result<Json<StationsResponse>, AppError> {
    let stations = match query.line {
        Some(line) => state.store.stations_on_line(line)?,
        None => state.store.stations()?,
    };
    let stations = stations
        .iter()
        .map(|s| station_result(&state, s))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(StationsResponse { stations }))
}

async fn create_station(
    State(state): State<AppState>,
    Json(req): Json<CreateStationRequest>,
) -> Result<(StatusCode, Json<StationResult>), AppError> {
    let name = required_name(&req.name)?;
    let station = state.store.create_station(req.line, name)?;
    state.committed();
    Ok((StatusCode::CREATED, Json(station_result(&state, &station)?)))
}

async fn get_station(
    State(state): State<AppState>,
    Path(id): Path<StationId>,
) -> Result<Json<StationResult>, AppError> {
    let station = state.store.station(id)?;
    Ok(Json(station_result(&state, &station)?))
}

async fn delete_station(
    State(state): State<AppState>,
    Path(id): Path<StationId>,
) -> Result<StatusCode, AppError> {
    state.store.delete_station(id)?;
    state.committed();
    Ok(StatusCode::NO_CONTENT)
}

/// Upcoming departures from one station.
///
/// Without `date` or `time` every registered entry is listed.
async fn station_times(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<StationId>,
    Query(query): Query<ReferenceQuery>,
) -> Result<Response, AppError> {
    let reference = query.reference(now())?;
    let station = state.store.station(id)?;
    let entries = StationResolver::new(state.store.as_ref(), state.classifier.as_ref())
        .resolve(&station, reference)?;

    // Return HTML or JSON based on Accept header
    if accepts_html(&headers) {
        let line = state.store.line(station.line)?;
        let template = BoardTemplate {
            title: station.qualified_name(&line),
            reference: reference_label(reference),
            rows: entries.iter().map(BoardRowView::from_entry).collect(),
        };
        Ok(render(template)?.into_response())
    } else {
        Ok(Json(StationTimesResponse {
            station: station_result(&state, &station)?,
            reference: reference_label(reference),
            times: entries.iter().map(EntryResult::from_entry).collect(),
        })
        .into_response())
    }
}

/// Register the cross product of days and times for a station.
async fn register_times(
    State(state): State<AppState>,
    Path(id): Path<StationId>,
    Json(req): Json<RegisterTimesRequest>,
) -> Result<(StatusCode, Json<RegisterTimesResponse>), AppError> {
    let (days, times) = req.parse().map_err(|e| AppError::BadRequest {
        message: e.to_string(),
    })?;
    let created = register_daily_times(state.store.as_ref(), id, &days, &times)?;
    state.committed();
    Ok((
        StatusCode::CREATED,
        Json(RegisterTimesResponse {
            created: created.iter().map(EntryResult::from_entry).collect(),
        }),
    ))
}

async fn list_service_dates(
    State(state): State<AppState>,
    Path(id): Path<StationId>,
) -> Result<Json<ServiceDatesResponse>, AppError> {
    let dates = state.store.service_dates(id)?;
    Ok(Json(ServiceDatesResponse {
        dates: dates.iter().map(ServiceDateResult::from_date).collect(),
    }))
}

async fn register_service_dates(
    State(state): State<AppState>,
    Path(id): Path<StationId>,
    Json(req): Json<RegisterDatesRequest>,
) -> Result<(StatusCode, Json<ServiceDatesResponse>), AppError> {
    let created = register_dates(state.store.as_ref(), id, &req.dates)?;
    state.committed();
    Ok((
        StatusCode::CREATED,
        Json(ServiceDatesResponse {
            dates: created.iter().map(ServiceDateResult::from_date).collect(),
        }),
    ))
}

// ============================================================================
// Locations
// ============================================================================

async fn list_locations(
    State(state): State<AppState>,
    Path(user): Path<UserId>,
) -> Result<Json<LocationsResponse>, AppError> {
    let locations = state
        .store
        .locations_for_user(user)?
        .iter()
        .map(|l| location_result(&state, l))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(LocationsResponse { locations }))
}

async fn create_location(
    State(state): State<AppState>,
    Path(user): Path<UserId>,
    Json(req): Json<CreateLocationRequest>,
) -> Result<(StatusCode, Json<LocationResult>), AppError> {
    let name = required_name(&req.name)?;
    let location = state.store.create_location(user, name, req.stations)?;
    state.committed();
    Ok((StatusCode::CREATED, Json(location_result(&state, &location)?)))
}

async fn get_location(
    State(state): State<AppState>,
    Path((user, id)): Path<(UserId, LocationId)>,
) -> Result<Json<LocationResult>, AppError> {
    let location = state.store.location_for_user(user, id)?;
    Ok(Json(location_result(&state, &location)?))
}

async fn delete_location(
    State(state): State<AppState>,
    Path((user, id)): Path<(UserId, LocationId)>,
) -> Result<StatusCode, AppError> {
    state.store.location_for_user(user, id)?;
    state.store.delete_location(id)?;
    state.committed();
    Ok(StatusCode::NO_CONTENT)
}

async fn add_location_station(
    State(state): State<AppState>,
    Path((user, id)): Path<(UserId, LocationId)>,
    Json(req): Json<LocationStationRequest>,
) -> Result<Json<LocationResult>, AppError> {
    state.store.location_for_user(user, id)?;
    let location = state.store.add_location_station(id, req.station)?;
    state.committed();
    Ok(Json(location_result(&state, &location)?))
}

async fn remove_location_station(
    State(state): State<AppState>,
    Path((user, id, station)): Path<(UserId, LocationId, StationId)>,
) -> Result<Json<LocationResult>, AppError> {
    state.store.location_for_user(user, id)?;
    let location = state.store.remove_location_station(id, station)?;
    state.committed();
    Ok(Json(location_result(&state, &location)?))
}

/// Merged upcoming departures across a location's stations.
async fn location_times(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((user, id)): Path<(UserId, LocationId)>,
    Query(query): Query<BoardQuery>,
) -> Result<Response, AppError> {
    let reference = query.reference_query().reference(now())?;
    let limit = query.limit.or(state.config.default_limit);
    let location = state.store.location_for_user(user, id)?;

    let departures = state
        .boards
        .departures(
            state.store.as_ref(),
            state.classifier.as_ref(),
            &location,
            reference,
            limit,
        )
        .await?;

    // Return HTML or JSON based on Accept header
    if accepts_html(&headers) {
        let template = BoardTemplate {
            title: location.name.clone(),
            reference: reference_label(reference),
            rows: departures.iter().map(BoardRowView::from_departure).collect(),
        };
        Ok(render(template)?.into_response())
    } else {
        Ok(Json(LocationTimesResponse {
            location: location.id,
            reference: reference_label(reference),
            departures: departures.iter().map(DepartureResult::from_departure).collect(),
        })
        .into_response())
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Internal { message: String },
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        if e.is_not_found() {
            AppError::NotFound {
                message: e.to_string(),
            }
        } else {
            AppError::Internal {
                message: e.to_string(),
            }
        }
    }
}

impl From<ReferenceError> for AppError {
    fn from(e: ReferenceError) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::BadRequest { message }
            | AppError::NotFound { message }
            | AppError::Internal { message } => message,
        };

        if status.is_server_error() {
            error!(%status, %message, "Request failed");
        } else {
            warn!(%status, %message, "Request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
