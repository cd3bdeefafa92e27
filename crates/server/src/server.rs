use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, patch, post, put},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};

use std::{net::SocketAddr, sync::Arc};

use crate::{balances, groups, memberships, transactions, users};
use engine::{Engine, EngineError};

/// Shared handler state. The engine is the only collaborator: it owns the
/// store handle.
#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// Basic-auth middleware: resolves the caller through the engine and exposes
/// it to handlers as an `Extension<engine::User>`.
async fn auth(
    auth_header: TypedHeader<Authorization<Basic>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user = match state
        .engine
        .authenticate(auth_header.username(), auth_header.password())
        .await
    {
        Ok(user) => user,
        Err(EngineError::Database(err)) => {
            tracing::error!("authentication failed: {err}");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
        Err(_) => return Err(StatusCode::UNAUTHORIZED),
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

async fn health() -> &'static str {
    "ok"
}

/// Builds the full API router around `engine`.
pub fn router(engine: Engine) -> Router {
    let state = ServerState {
        engine: Arc::new(engine),
    };

    let protected = Router::new()
        .route("/users/password", put(users::change_password))
        .route("/groups", get(groups::list).post(groups::create))
        .route(
            "/groups/{group_id}",
            get(groups::get).put(groups::rename).delete(groups::delete),
        )
        .route(
            "/groups/{group_id}/members",
            get(memberships::list).post(memberships::add),
        )
        .route(
            "/groups/{group_id}/members/{user_id}",
            axum::routing::delete(memberships::remove),
        )
        .route("/groups/{group_id}/expenses", post(transactions::expense_new))
        .route(
            "/groups/{group_id}/expenses/{transaction_id}",
            patch(transactions::expense_update),
        )
        .route("/groups/{group_id}/payments", post(transactions::payment_new))
        .route(
            "/groups/{group_id}/payments/{transaction_id}",
            patch(transactions::payment_update),
        )
        .route("/groups/{group_id}/transactions", get(transactions::list))
        .route(
            "/groups/{group_id}/transactions/{transaction_id}",
            get(transactions::get).delete(transactions::delete),
        )
        .route("/groups/{group_id}/balances", get(balances::list))
        .route(
            "/groups/{group_id}/balances/{user_id}",
            get(balances::pairwise),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    Router::new()
        .route("/health", get(health))
        .route("/users", post(users::signup))
        .merge(protected)
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(engine)).await
}

/// Serves on a background task and returns the bound address.
pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
