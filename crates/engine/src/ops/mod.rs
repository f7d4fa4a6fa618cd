use std::{fmt, sync::Arc};

use sea_orm::DatabaseConnection;

use crate::ResultEngine;

mod access;
mod config;
mod dashboard;
mod goals;
mod plans;
mod recurring;
mod transactions;
mod users;

pub use goals::NewSavingsGoal;
pub use recurring::NewRecurringRule;
pub use transactions::{ExportRow, NewTransaction};
pub use users::RegisterUser;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
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

/// A cached read model that goes stale after a mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum View {
    Dashboard,
    Config,
    Transactions,
}

impl View {
    /// Path of the page or endpoint serving this view.
    pub fn path(self) -> &'static str {
        match self {
            View::Dashboard => "/dashboard",
            View::Config => "/config",
            View::Transactions => "/transactions",
        }
    }
}

/// Hook notified after every successful mutation with the views it touched.
pub trait Invalidator: Send + Sync {
    fn invalidate(&self, view: View);
}

struct NoopInvalidator;

impl Invalidator for NoopInvalidator {
    fn invalidate(&self, _view: View) {}
}

pub struct Engine {
    database: DatabaseConnection,
    invalidator: Arc<dyn Invalidator>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("database", &self.database)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    fn invalidate(&self, views: &[View]) {
        for view in views {
            self.invalidator.invalidate(*view);
        }
    }
}

/// The builder for `Engine`
pub struct EngineBuilder {
    database: DatabaseConnection,
    invalidator: Arc<dyn Invalidator>,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            database: DatabaseConnection::default(),
            invalidator: Arc::new(NoopInvalidator),
        }
    }
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Install the hook told about stale views. Defaults to a no-op.
    pub fn invalidator(mut self, invalidator: Arc<dyn Invalidator>) -> EngineBuilder {
        self.invalidator = invalidator;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            invalidator: self.invalidator,
        })
    }
}
