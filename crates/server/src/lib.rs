use api_types::ErrorBody;
use axum::{
    Json,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::IntoResponse,
};
use engine::{EngineError, MoneyCents};
use serde::de::DeserializeOwned;

pub use server::{ServerState, router, run_with_listener, spawn_with_listener};

mod balances;
mod groups;
mod memberships;
mod server;
mod transactions;
mod users;

pub mod types {
    pub mod user {
        pub use api_types::user::{PasswordChange, UserNew, UserView};
    }

    pub mod group {
        pub use api_types::group::{GroupName, GroupView, GroupsResponse};
    }

    pub mod membership {
        pub use api_types::membership::{MemberAdd, MemberView, MembersResponse};
    }

    pub mod transaction {
        pub use api_types::transaction::{
            DebtView, ExpenseNew, ExpenseUpdate, PaymentNew, PaymentUpdate, TransactionDetailView,
            TransactionListResponse, TransactionView,
        };
    }

    pub mod balance {
        pub use api_types::balance::{BalanceView, BalancesResponse};
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InvalidInput(_)
        | EngineError::InvalidAmount(_)
        | EngineError::InvalidPayer(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(ErrorBody { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

/// JSON request body whose rejections (bad syntax, wrong shape, missing
/// content type) come back as a 400 [`ErrorBody`] like every other error.
pub(crate) struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ServerError::Generic(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Parses a decimal amount typed by a user.
fn parse_amount(value: &str) -> Result<MoneyCents, ServerError> {
    Ok(value.parse::<MoneyCents>()?)
}
