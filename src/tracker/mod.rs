//! Open tracking HTTP service.
//!
//! Serves a fixed 1x1 transparent PNG at `/pixel.png`, storing an open
//! event for every fetch, and reports the number of opens at `/stats`.

use std::future::Future;
use std::net::SocketAddr;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::task;

use crate::db::{ensure_schema, establish_connection_pool};
use crate::domain::NewOpenEvent;
use crate::errors::Error;
use crate::repository::{DieselRepository, OpenReader, OpenWriter};
use crate::settings::TrackerSettings;

/// 1x1 transparent PNG served for every pixel request.
pub const PIXEL: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR\x00\x00\x00\x01\x00\x00\x00\x01\x08\x06\x00\x00\x00\x1f\x15\xc4\x89\x00\x00\x00\nIDATx\x9cc\x00\x00\x00\x02\x00\x01\xe5\x27\xde\xfc\x00\x00\x00\x00IEND\xaeB`\x82";

/// Store requirements of the tracking endpoints.
pub trait OpenStore: OpenReader + OpenWriter + Clone + Send + Sync + 'static {}

impl<T> OpenStore for T where T: OpenReader + OpenWriter + Clone + Send + Sync + 'static {}

/// HTTP service recording tracking pixel fetches in an open event store.
pub struct TrackingService<S> {
    store: S,
    listen_address: SocketAddr,
}

impl<S: OpenStore> TrackingService<S> {
    pub fn new(store: S, settings: &TrackerSettings) -> Result<Self, Error> {
        Ok(Self {
            store,
            listen_address: settings.listen_address()?,
        })
    }

    pub fn router(&self) -> Router {
        router(self.store.clone())
    }

    /// Serves requests until `shutdown` resolves.
    pub async fn serve<F>(self, shutdown: F) -> Result<(), Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.listen_address).await?;
        log::info!("Tracking service listening on {}", self.listen_address);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;

        log::info!("Tracking service stopped");
        Ok(())
    }
}

/// Builds the tracking routes over `store`.
pub fn router<S: OpenStore>(store: S) -> Router {
    Router::new()
        .route("/pixel.png", get(pixel_handler::<S>))
        .route("/stats", get(stats_handler::<S>))
        .with_state(store)
}

#[derive(Debug, Deserialize)]
struct PixelQuery {
    email: Option<String>,
}

/// Records the open before answering, so every fetch that gets a pixel
/// back has been stored. A query string that does not parse still counts
/// as an open, just without an email.
async fn pixel_handler<S: OpenStore>(
    State(store): State<S>,
    query: Result<Query<PixelQuery>, QueryRejection>,
) -> Response {
    let email = match query {
        Ok(Query(query)) => query.email,
        Err(e) => {
            log::debug!("Ignoring pixel query: {e}");
            None
        }
    };
    let timestamp = Utc::now().naive_utc();
    let recorded = task::spawn_blocking(move || {
        store.record_open(&NewOpenEvent {
            email: email.as_deref(),
            timestamp,
        })
    })
    .await;

    match recorded {
        Ok(Ok(event)) => {
            log::debug!("Recorded open #{}", event.id);
            ([(header::CONTENT_TYPE, "image/png")], PIXEL).into_response()
        }
        Ok(Err(e)) => {
            log::error!("Cannot record open event: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
        Err(e) => {
            log::error!("Open event task failed: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn stats_handler<S: OpenStore>(State(store): State<S>) -> Response {
    match task::spawn_blocking(move || store.count_opens()).await {
        Ok(Ok(opens)) => Json(json!({ "opens": opens })).into_response(),
        Ok(Err(e)) => {
            log::error!("Cannot count open events: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
        Err(e) => {
            log::error!("Open count task failed: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Entry point for the tracking service; runs until Ctrl-C.
pub async fn run(settings: &TrackerSettings) -> Result<(), Error> {
    let pool = establish_connection_pool(&settings.database_url)?;
    ensure_schema(&pool)?;
    let service = TrackingService::new(DieselRepository::new(pool), settings)?;

    service
        .serve(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("Cannot listen for shutdown signal: {e}");
            }
            log::info!("Tracking service received shutdown signal");
        })
        .await
}
