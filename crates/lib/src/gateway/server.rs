//! Relay HTTP + WebSocket server (single port).

use crate::config::{self, Config};
use crate::directory;
use crate::dispatch::{ChannelId, ConnectionRegistry, Dispatcher};
use crate::events::{self, Classified, EventEnvelope};
use crate::gateway::protocol::ValidationResponse;
use crate::gateway::validate;
use anyhow::{Context, Result};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Shared state for the relay (config, registry, dispatcher).
#[derive(Clone)]
pub struct RelayState {
    pub config: Arc<Config>,
    /// Expected subscription-name header value (env override applied at startup).
    pub expected_subscription: Arc<String>,
    /// Expected secret header value (env override applied at startup).
    pub expected_secret: Arc<String>,
    pub registry: Arc<ConnectionRegistry>,
    pub dispatcher: Arc<Dispatcher>,
}

/// Run the relay server; binds to config.gateway.bind:config.gateway.port.
/// Blocks until shutdown (e.g. Ctrl+C).
pub async fn run_gateway(config: Config) -> Result<()> {
    let registry = Arc::new(ConnectionRegistry::new());
    let dispatcher = Arc::new(Dispatcher::new(registry.clone()));
    let state = RelayState {
        expected_subscription: Arc::new(config::resolve_subscription_name(&config)),
        expected_secret: Arc::new(config::resolve_webhook_secret(&config)),
        config: Arc::new(config.clone()),
        registry,
        dispatcher,
    };

    let app = Router::new()
        .route("/", get(health_http))
        .route(&config.gateway.webhook_path, post(webhook_sink))
        .route(&config.gateway.channel_path, get(channel_handler))
        .with_state(state);

    let bind_addr = format!("{}:{}", config.gateway.bind.trim(), config.gateway.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("relay listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("relay server exited")?;
    log::info!("relay stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received");
}

/// GET / returns a simple health JSON (for probes).
async fn health_http(State(state): State<RelayState>) -> Json<serde_json::Value> {
    Json(json!({
        "runtime": "running",
        "port": state.config.gateway.port,
        "connections": state.registry.len().await,
    }))
}

/// POST webhook sink — checks the shared-secret headers, then acts on the
/// first classified envelope of the batch (the distribution system sends
/// single-event batches in practice; later envelopes are ignored, matching
/// the upstream relay this replaces).
async fn webhook_sink(
    State(state): State<RelayState>,
    headers: HeaderMap,
    Json(envelopes): Json<Vec<EventEnvelope>>,
) -> Response {
    let attempt = validate::delivery_attempt(&headers);
    log::info!(
        "delivery received - type: {} (attempt {})",
        envelopes
            .first()
            .map(|e| e.event_type.as_str())
            .unwrap_or("<empty>"),
        attempt
    );

    if let Err(rejection) = validate::validate_headers(
        &headers,
        &state.expected_subscription,
        &state.expected_secret,
    ) {
        log::warn!("webhook delivery forbidden: {}", rejection);
        return StatusCode::FORBIDDEN.into_response();
    }

    for envelope in &envelopes {
        match events::classify(envelope) {
            Ok(Classified::SubscriptionValidation(data)) => {
                // Required once when the webhook subscription is registered;
                // echo the code back and skip routing.
                log::info!("subscription validation handshake");
                return (
                    StatusCode::OK,
                    Json(ValidationResponse {
                        validation_response: data.validation_code,
                    }),
                )
                    .into_response();
            }
            Ok(Classified::CallAnswered(data)) => {
                log::info!(
                    "event={} agent={} caller={}",
                    envelope.event_type,
                    data.agent_login,
                    data.caller_number
                );
                let caller_name = directory::caller_name(&data.caller_number);
                // Delivered or dropped, the distribution system gets a 200;
                // an offline agent is not a delivery failure.
                let _ = state
                    .dispatcher
                    .deliver(
                        &data.agent_login,
                        &envelope.event_type,
                        &data.caller_number,
                        &data.wait_duration,
                        &caller_name,
                    )
                    .await;
                return StatusCode::OK.into_response();
            }
            Ok(Classified::UnknownSystem) => {
                log::warn!("unhandled system event: {}", envelope.event_type);
                return StatusCode::UNPROCESSABLE_ENTITY.into_response();
            }
            Ok(Classified::UnknownDomain) => {
                log::warn!("unhandled domain event: {}", envelope.event_type);
                return StatusCode::UNPROCESSABLE_ENTITY.into_response();
            }
            Err(e) => {
                log::error!("{}", e);
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        }
    }

    StatusCode::UNPROCESSABLE_ENTITY.into_response()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelQuery {
    #[serde(default)]
    agent_login: Option<String>,
}

/// GET channel endpoint upgrades to WebSocket. The client names itself with
/// the agentLogin query parameter; the claim is not authenticated (demo
/// simplification, kept as-is).
async fn channel_handler(
    State(state): State<RelayState>,
    Query(query): Query<ChannelQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    let Some(agent_login) = query.agent_login.filter(|l| !l.trim().is_empty()) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    ws.on_upgrade(move |socket| handle_socket(socket, state, agent_login))
}

async fn handle_socket(mut socket: WebSocket, state: RelayState, agent_login: String) {
    let channel_id = ChannelId::new();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    state
        .registry
        .register(channel_id.clone(), agent_login.clone(), tx)
        .await;
    log::info!(
        "agent {} connected on channel {}",
        agent_login,
        channel_id.as_str()
    );

    loop {
        tokio::select! {
            frame = rx.recv() => {
                match frame {
                    Some(text) => {
                        if socket.send(Message::Text(text)).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }
            msg = socket.recv() => {
                match msg {
                    // Inbound client frames carry nothing the relay acts on.
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    state.registry.unregister(&channel_id).await;
    log::info!(
        "agent {} disconnected from channel {}",
        agent_login,
        channel_id.as_str()
    );
}
