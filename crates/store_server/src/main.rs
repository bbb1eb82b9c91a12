use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use shared::{
    domain::{CartItem, InventoryItem, ItemId, NewCartEntry},
    error::{ApiError, ErrorCode},
    protocol::{cart_route, healthz_route, inventory_route},
};
use storage::Storage;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod config;

use config::{default_seed, load_settings, prepare_database_url, read_seed_file};

#[derive(Clone)]
struct AppState {
    storage: Storage,
}

/// `RUST_LOG` directives when present and valid, otherwise `info`.
fn log_filter(directives: Option<String>) -> EnvFilter {
    directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok()))
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

    if storage.inventory_is_empty().await? {
        let seed = match &settings.seed_inventory_path {
            Some(path) => read_seed_file(path)?,
            None => default_seed(),
        };
        for item in &seed {
            storage.insert_inventory_item(&item.content, item.price).await?;
        }
        info!(items = seed.len(), "seeded empty inventory");
    }

    let app = build_router(Arc::new(AppState { storage }));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "store listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(healthz_route(), get(healthz))
        .route(inventory_route(), get(list_inventory))
        .route("/inventory/:id", get(get_inventory_item))
        .route(cart_route(), get(list_cart).post(create_cart_entry))
        .route("/cart/:id", put(update_cart_entry).delete(delete_cart_entry))
        .with_state(state)
}

fn internal(err: anyhow::Error) -> (StatusCode, Json<ApiError>) {
    error!(error = %err, "storage failure");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiError::new(ErrorCode::Internal, err.to_string())),
    )
}

fn not_found(what: &str, id: ItemId) -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiError::new(
            ErrorCode::NotFound,
            format!("{what} {id} not found"),
        )),
    )
}

fn validation(message: impl Into<String>) -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiError::new(ErrorCode::Validation, message)),
    )
}

async fn healthz(State(state): State<Arc<AppState>>) -> ApiResult<&'static str> {
    state.storage.health_check().await.map_err(internal)?;
    Ok("ok")
}

async fn list_inventory(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<InventoryItem>>> {
    let items = state.storage.list_inventory().await.map_err(internal)?;
    Ok(Json(items))
}

async fn get_inventory_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<InventoryItem>> {
    let id = ItemId(id);
    state
        .storage
        .inventory_item(id)
        .await
        .map_err(internal)?
        .map(Json)
        .ok_or_else(|| not_found("inventory item", id))
}

async fn list_cart(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<CartItem>>> {
    let items = state.storage.list_cart().await.map_err(internal)?;
    Ok(Json(items))
}

async fn create_cart_entry(
    State(state): State<Arc<AppState>>,
    Json(entry): Json<NewCartEntry>,
) -> ApiResult<(StatusCode, Json<CartItem>)> {
    if entry.quantity == 0 {
        return Err(validation("quantity must be positive"));
    }

    let created = state
        .storage
        .insert_cart_entry(&entry)
        .await
        .map_err(internal)?
        .ok_or_else(|| {
            (
                StatusCode::CONFLICT,
                Json(ApiError::new(
                    ErrorCode::Conflict,
                    format!("cart entry {} already exists", entry.id),
                )),
            )
        })?;
    info!(item_id = %created.id, quantity = created.quantity, "cart entry created");
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_cart_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(item): Json<CartItem>,
) -> ApiResult<Json<CartItem>> {
    let id = ItemId(id);
    if item.id != id {
        return Err(validation(format!(
            "body id {} does not match path id {id}",
            item.id
        )));
    }
    if item.quantity == 0 {
        return Err(validation("quantity must be positive"));
    }

    let updated = state
        .storage
        .update_cart_entry(id, &item.content, item.quantity)
        .await
        .map_err(internal)?
        .ok_or_else(|| not_found("cart entry", id))?;
    info!(item_id = %id, quantity = updated.quantity, "cart entry updated");
    Ok(Json(updated))
}

async fn delete_cart_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<CartItem>> {
    let id = ItemId(id);
    let removed = state
        .storage
        .delete_cart_entry(id)
        .await
        .map_err(internal)?
        .ok_or_else(|| not_found("cart entry", id))?;
    info!(item_id = %id, "cart entry deleted");
    Ok(Json(removed))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
