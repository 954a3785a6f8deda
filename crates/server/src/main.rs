use std::{net::SocketAddr, path::Path as FsPath, sync::Arc};

use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use shared::{
    domain::{City, CityId, NewCity},
    error::{ApiError, ErrorCode},
};
use storage::Storage;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod config;

use config::{load_settings, prepare_database_url};

const MAX_BODY_BYTES: usize = 64 * 1024;

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

#[derive(Clone)]
struct AppState {
    storage: Storage,
}

/// Layout of a json-server database file.
#[derive(Debug, Deserialize)]
struct SeedFile {
    cities: Vec<City>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings();
    let database_url = prepare_database_url(&settings.database_url)?;
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;

    if let Some(seed_path) = &settings.seed_path {
        seed_if_empty(&storage, seed_path).await?;
    }

    let app = build_router(Arc::new(AppState { storage }));

    let addr: SocketAddr = settings
        .server_bind
        .parse()
        .with_context(|| format!("invalid bind address '{}'", settings.server_bind))?;
    info!(%addr, "city store listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Imports the seed file into an empty store. A missing file is not an error.
async fn seed_if_empty(storage: &Storage, seed_path: &FsPath) -> anyhow::Result<u64> {
    if storage.count_cities().await? > 0 {
        return Ok(0);
    }
    let raw = match tokio::fs::read_to_string(seed_path).await {
        Ok(raw) => raw,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %seed_path.display(), "no seed file; starting with an empty store");
            return Ok(0);
        }
        Err(error) => {
            return Err(error)
                .with_context(|| format!("failed to read seed file '{}'", seed_path.display()))
        }
    };
    let seed: SeedFile = serde_json::from_str(&raw)
        .with_context(|| format!("invalid seed file '{}'", seed_path.display()))?;
    let imported = storage.import_cities(&seed.cities).await?;
    info!(imported, path = %seed_path.display(), "seeded city store");
    Ok(imported)
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/cities", get(list_cities).post(create_city))
        .route("/cities/:id", get(get_city).delete(delete_city))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}

fn internal(error: anyhow::Error) -> (StatusCode, Json<ApiError>) {
    error!(%error, "city store request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiError::new(ErrorCode::Internal, error.to_string())),
    )
}

fn bad_request(message: impl Into<String>) -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiError::new(ErrorCode::Validation, message)),
    )
}

fn not_found(id: CityId) -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiError::new(ErrorCode::NotFound, format!("city {id} not found"))),
    )
}

fn parse_id(raw: &str) -> ApiResult<CityId> {
    raw.parse().map_err(|error: shared::domain::InvalidCityId| bad_request(error.to_string()))
}

async fn healthz(State(state): State<Arc<AppState>>) -> ApiResult<&'static str> {
    state.storage.health_check().await.map_err(internal)?;
    Ok("ok")
}

async fn list_cities(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<City>>> {
    let cities = state.storage.list_cities().await.map_err(internal)?;
    Ok(Json(cities))
}

async fn get_city(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<City>> {
    let id = parse_id(&raw_id)?;
    state
        .storage
        .get_city(id)
        .await
        .map_err(internal)?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

async fn create_city(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewCity>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<City>)> {
    let Json(draft) = payload.map_err(|rejection| {
        warn!(%rejection, "rejected city payload");
        bad_request(rejection.body_text())
    })?;
    draft.validate().map_err(|error| bad_request(error.to_string()))?;

    let city = state.storage.insert_city(&draft).await.map_err(internal)?;
    info!(city_id = %city.id, city_name = %city.city_name, "city created");
    Ok((StatusCode::CREATED, Json(city)))
}

async fn delete_city(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let id = parse_id(&raw_id)?;
    if !state.storage.delete_city(id).await.map_err(internal)? {
        return Err(not_found(id));
    }
    info!(city_id = %id, "city deleted");
    Ok(Json(json!({})))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
