use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post},
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Basic};

use std::sync::Arc;

use crate::{config, dashboard, export, goals, plans, rates, recurring, transactions, user};
use engine::{Engine, Invalidator, View};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub rates: Arc<rates::RateSource>,
}

/// Reports stale views through `tracing`.
#[derive(Debug, Default)]
pub struct TracingInvalidator;

impl Invalidator for TracingInvalidator {
    fn invalidate(&self, view: View) {
        tracing::debug!(path = view.path(), "view invalidated");
    }
}

/// Resolve the HTTP Basic credentials (`email:password`) into an
/// [`engine::AuthUser`] request extension.
async fn auth(
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(credentials) = request.headers().typed_get::<Authorization<Basic>>() else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    if credentials.username().is_empty() || credentials.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user = state
        .engine
        .authenticate(credentials.username(), credentials.password())
        .await
        .map_err(|err| {
            tracing::error!("authentication failed: {err}");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    let Some(user) = user else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    let protected = Router::new()
        .route("/config", get(config::get))
        .route("/config/currency", post(config::update_currency))
        .route("/setup", post(config::setup))
        .route("/setup/custom", post(config::setup_custom))
        .route("/plans", get(plans::list).post(plans::create))
        .route("/plans/{id}", axum::routing::patch(plans::update).delete(plans::remove))
        .route("/plans/{id}/activate", post(plans::activate))
        .route("/dashboard", get(dashboard::get))
        .route("/summary", get(dashboard::summary))
        .route("/transactions", get(transactions::list).post(transactions::create))
        .route("/transactions/{id}", delete(transactions::remove))
        .route("/tags", get(transactions::tags))
        .route("/export-csv", get(export::csv))
        .route("/goals", get(goals::list).post(goals::create))
        .route("/goals/{id}", delete(goals::remove))
        .route("/recurring", get(recurring::list).post(recurring::create))
        .route("/recurring/{id}", delete(recurring::remove))
        .route("/recurring/{id}/toggle", post(recurring::toggle))
        .route("/rates", get(rates::get))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/register", post(user::register))
        .merge(protected)
        .with_state(state)
}

pub async fn run(state: ServerState, bind: &str) {
    let listener = match tokio::net::TcpListener::bind(bind).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {bind}: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(state, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(state, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
