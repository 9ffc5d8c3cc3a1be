pub mod coordinator;
pub mod db;
pub mod desktop;
mod slot;

use thiserror::Error;

pub use coordinator::{
    DetailsState, LibraryStore, ListState, ScreenCategory, ScreenCoordinator,
};
pub use db::DbHandle;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("config error: {0}")]
    Config(String),
    #[error("database error: {0}")]
    Database(String),
    #[error("api error: {0}")]
    Api(String),
    #[error("invalid link: {0}")]
    Link(String),
    #[error("desktop integration error: {0}")]
    Desktop(String),
}
