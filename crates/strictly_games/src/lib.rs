//! Strictly Games - collaborators around the `strictly_codenames` rules
//!
//! The rules crate decides; this crate does everything else an action needs:
//!
//! - **Setup**: validating seats and dealing a board through an injectable
//!   [`RandomPort`]
//! - **Store**: loading consistent snapshots and applying event batches
//!   atomically ([`GameStore`], [`SqliteStore`])
//! - **Publish**: announcing committed changes ([`Publisher`],
//!   [`BroadcastPublisher`])
//! - **Service**: the load, decide, apply, publish cycle with conflict
//!   retries ([`GameService`])
//!
//! # Example
//!
//! ```no_run
//! use strictly_games::{
//!     BroadcastPublisher, GameService, ServiceConfig, SqliteStore, init_tracing,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServiceConfig::load(None)?;
//! init_tracing(config.log_filter());
//! let store = SqliteStore::open(config.database_path().clone())?;
//! let publisher = BroadcastPublisher::new(*config.notification_capacity());
//! let service = GameService::from_config(store, publisher, &config);
//! let events = service.pass(1, 2, 1)?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod publish;
mod service;
mod setup;
mod store;
mod telemetry;

pub use config::{ConfigError, DB_ENV, LOG_ENV, ServiceConfig};
pub use publish::{BroadcastPublisher, GameChange, Publisher};
pub use service::{GameService, ServiceError};
pub use setup::{
    FixedRandomPort, GamePlan, RandomPort, SetupError, ThreadRngPort, game_type_for, plan_game,
};
pub use store::{DbError, DbErrorKind, GameInfo, GameState, GameStore, SqliteStore};
pub use telemetry::init_tracing;
