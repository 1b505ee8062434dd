//! Client-side data synchronization for the village entrepreneur directory.
//!
//! Views read through a [`DirectoryClient`], which answers from a shared
//! [`QueryCache`] and coalesces concurrent reads of the same resource into
//! one call on the [`RemoteDataGateway`]. Writes go through the
//! [`MutationCoordinator`], which invalidates the affected collections on
//! success so the next read refetches.

pub mod cache;
pub mod config;
pub mod directory;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod query;
pub mod views;

pub use cache::{CacheKey, QueryCache};
pub use directory::{DirectoryClient, MutationCoordinator};
pub use error::{SyncError, SyncResult};
pub use gateway::{GatewayError, HttpGateway, RemoteDataGateway};
pub use query::{Query, QueryState};
