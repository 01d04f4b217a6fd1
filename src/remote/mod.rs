//! The remote replica: a per-user document store reachable over the network
//!
//! `MemoryReplica` is an in-process fake for tests and offline demos;
//! `HttpReplica` talks to `flashsync-server`. `Replica` picks one of them from
//! configuration.

pub(crate) mod http;
mod memory;

pub use http::HttpReplica;
pub use memory::MemoryReplica;

use std::future::Future;

use crate::config::{Config, RemoteKind};
use crate::errors::AppError;
use crate::models::RemoteDocument;

/// How a write combines with the stored document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Only the fields present in the written document are replaced
    Merge,
    /// The stored document is replaced as a whole
    Replace,
}

/// A remote document store keyed by user id
pub trait RemoteReplica: Send + Sync + 'static {
    /// Writes `document` for `user_id`
    fn write(
        &self,
        user_id: &str,
        document: &RemoteDocument,
        mode: WriteMode,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    /// Reads the document for `user_id`, or None if none was ever written
    fn read(&self, user_id: &str) -> impl Future<Output = Result<Option<RemoteDocument>, AppError>> + Send;
}

/// A replica chosen at runtime from configuration
#[derive(Clone)]
pub enum Replica {
    Memory(MemoryReplica),
    Http(HttpReplica),
}

impl Replica {
    pub fn from_config(config: &Config) -> Self {
        match config.remote {
            RemoteKind::Memory => Replica::Memory(MemoryReplica::new()),
            RemoteKind::Http => Replica::Http(HttpReplica::new(config.server_url.clone())),
        }
    }
}

impl RemoteReplica for Replica {
    async fn write(&self, user_id: &str, document: &RemoteDocument, mode: WriteMode) -> Result<(), AppError> {
        match self {
            Replica::Memory(replica) => replica.write(user_id, document, mode).await,
            Replica::Http(replica) => replica.write(user_id, document, mode).await,
        }
    }

    async fn read(&self, user_id: &str) -> Result<Option<RemoteDocument>, AppError> {
        match self {
            Replica::Memory(replica) => replica.read(user_id).await,
            Replica::Http(replica) => replica.read(user_id).await,
        }
    }
}
