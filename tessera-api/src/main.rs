//! Tessera API Server Entry Point
//!
//! Bootstraps configuration, wires the store, cache and search index, and
//! starts the Axum HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tessera_api::telemetry::{init_tracing, TelemetryConfig};
use tessera_api::{
    create_api_router, ApiConfig, ApiError, ApiResult, AppState, DbConfig, PgRecordStore,
    RecordService, SearchConfig, StoreKind,
};
use tessera_core::NameValidator;
use tessera_search::{
    ElasticsearchIndex, InMemorySearchIndex, IndexSynchronizer, RebuildOutcome, SearchIndex,
};
use tessera_storage::{InMemoryRecordCache, InMemoryRecordStore, RecordStore};

#[tokio::main]
async fn main() -> ApiResult<()> {
    let telemetry_config = TelemetryConfig::default();
    init_tracing(&telemetry_config)?;

    let api_config = ApiConfig::from_env();
    let search_config = SearchConfig::from_env();

    let store = build_store(&api_config).await?;
    let index = build_search_index(&search_config)?;

    let records = Arc::new(RecordService::new(
        store.clone(),
        Arc::new(InMemoryRecordCache::new()),
        Arc::new(NameValidator),
    ));
    let sync = Arc::new(IndexSynchronizer::new(store, index));

    if api_config.repopulate_on_start {
        let sync = sync.clone();
        tokio::spawn(async move {
            if let RebuildOutcome::Completed(report) = sync.rebuild().await {
                tracing::info!(report = %report.to_json(), "startup rebuild finished");
            }
        });
    }

    let app: Router = create_api_router(AppState::new(records, sync), &api_config);

    let addr = resolve_bind_addr(&api_config)?;
    tracing::info!(%addr, "Starting Tessera API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}

async fn build_store(config: &ApiConfig) -> ApiResult<Arc<dyn RecordStore>> {
    match config.store {
        StoreKind::Memory => {
            tracing::warn!("using in-memory record store; data is lost on exit");
            Ok(Arc::new(InMemoryRecordStore::new()))
        }
        StoreKind::Postgres => {
            let db_config = DbConfig::from_env();
            let store = PgRecordStore::from_config(&db_config)?;
            if config.db_auto_migrate {
                store.migrate().await?;
            }
            tracing::info!(
                host = %db_config.host,
                dbname = %db_config.dbname,
                pool_size = db_config.max_size,
                "connected record store"
            );
            Ok(Arc::new(store))
        }
    }
}

fn build_search_index(config: &SearchConfig) -> ApiResult<Arc<dyn SearchIndex>> {
    match &config.elasticsearch_url {
        Some(url) => {
            tracing::info!(%url, "using elasticsearch search index");
            Ok(Arc::new(ElasticsearchIndex::new(url, config.timeout)?))
        }
        None => {
            tracing::info!("no search backend configured, using in-memory index");
            Ok(Arc::new(InMemorySearchIndex::new()))
        }
    }
}

fn resolve_bind_addr(config: &ApiConfig) -> ApiResult<SocketAddr> {
    let addr = config.bind_addr();
    addr.parse::<SocketAddr>().map_err(|e| {
        ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e))
    })
}
