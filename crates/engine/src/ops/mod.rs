use sea_orm::DatabaseConnection;

use crate::ResultEngine;

mod access;
mod balances;
mod expenses;
mod groups;
mod memberships;
mod payments;
mod transactions;
mod users;

pub use balances::Balance;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
///
/// Every statement in the block must go through the transaction handle: the
/// in-memory store used in tests has a single connection.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// The ledger engine.
///
/// Stateless apart from the store handle: every operation opens its own
/// scoped transaction, so an `Engine` can be shared freely behind an `Arc`.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}
