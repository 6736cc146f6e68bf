//! Inbound HTTP endpoint the fabric calls to run actions.

use crate::core::{Result, SpawnError};
use crate::dispatch::DispatchEngine;
use crate::protocol::SPAWN_MEDIA_TYPE;
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use http::{StatusCode, header};
use std::future::{Future, IntoFuture};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{Level, event};

pub const ACTIONS_PATH: &str = "/api/v1/actors/actions";

/// Routes `POST /api/v1/actors/actions` into `engine`.
pub fn router(engine: Arc<DispatchEngine>) -> Router {
    Router::new()
        .route(ACTIONS_PATH, post(handle_actions))
        .with_state(engine)
}

async fn handle_actions(State(engine): State<Arc<DispatchEngine>>, body: Bytes) -> Response {
    match engine.handle(&body).await {
        Ok(reply) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, SPAWN_MEDIA_TYPE)],
            reply,
        )
            .into_response(),
        Err(err @ SpawnError::Decoding(_)) => {
            event!(Level::WARN, error = %err, "rejecting malformed invocation");
            (StatusCode::BAD_REQUEST, err.to_string()).into_response()
        }
        Err(err) => {
            event!(Level::ERROR, error = %err, "failed to encode invocation reply");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}

/// Serves `router` until `shutdown` resolves, then gives in-flight requests
/// up to `grace_period` to finish.
pub async fn serve<S>(
    listener: TcpListener,
    router: Router,
    shutdown: S,
    grace_period: Duration,
) -> Result<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    let (stopping_tx, stopping_rx) = oneshot::channel::<()>();
    let server = axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown.await;
            let _ = stopping_tx.send(());
        })
        .into_future();

    tokio::select! {
        served = server => served.map_err(|err| SpawnError::Transport(err.to_string())),
        _ = async {
            if stopping_rx.await.is_ok() {
                tokio::time::sleep(grace_period).await;
            } else {
                std::future::pending::<()>().await;
            }
        } => {
            event!(
                Level::WARN,
                grace_ms = grace_period.as_millis() as u64,
                "grace period elapsed with requests still in flight"
            );
            Ok(())
        }
    }
}
