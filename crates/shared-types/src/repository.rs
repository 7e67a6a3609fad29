//! # Repository Port
//!
//! Persistence is an opaque collaborator: the core writes entities through
//! this port with at-least-once semantics and never assumes a concrete
//! layout. A persist failure surfaces as `Unavailable` at the boundary and
//! suppresses any further state change for that operation.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use thiserror::Error;

use crate::errors::RpcError;

/// Errors from repository operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// The backing store rejected or lost the write; callers may retry.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The entity does not exist.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<RepositoryError> for RpcError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Unavailable(msg) => RpcError::unavailable(msg),
            RepositoryError::NotFound(msg) => RpcError::not_found(msg),
        }
    }
}

/// An entity a repository can hold: it knows its own id and status.
pub trait Storable: Clone + Send + Sync + 'static {
    /// Entity id type.
    type Id: Clone + Eq + Hash + Debug + Send + Sync;
    /// Status type used by the `*_by_status` queries.
    type Status: Copy + Eq + Send + Sync;

    /// The entity's id.
    fn id(&self) -> Self::Id;
    /// The entity's current status.
    fn status(&self) -> Self::Status;
}

/// Async persistence port over a single entity type.
#[async_trait]
pub trait Repository<T: Storable>: Send + Sync {
    /// Write the entity (insert or overwrite). At-least-once semantics.
    async fn persist(&self, entity: &T) -> Result<(), RepositoryError>;

    /// Fetch an entity by id.
    async fn find_by_id(&self, id: &T::Id) -> Result<Option<T>, RepositoryError>;

    /// List all entities currently in `status`.
    async fn list_by_status(&self, status: T::Status) -> Result<Vec<T>, RepositoryError>;

    /// Count entities currently in `status`.
    async fn count_by_status(&self, status: T::Status) -> Result<usize, RepositoryError>;

    /// Remove an entity by id. Removing a missing entity is not an error.
    async fn remove(&self, id: &T::Id) -> Result<(), RepositoryError>;
}

/// In-memory repository used by the runtime and tests.
pub struct InMemoryRepository<T: Storable> {
    entries: RwLock<HashMap<T::Id, T>>,
}

impl<T: Storable> InMemoryRepository<T> {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the repository is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl<T: Storable> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Storable> Repository<T> for InMemoryRepository<T> {
    async fn persist(&self, entity: &T) -> Result<(), RepositoryError> {
        self.entries.write().insert(entity.id(), entity.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &T::Id) -> Result<Option<T>, RepositoryError> {
        Ok(self.entries.read().get(id).cloned())
    }

    async fn list_by_status(&self, status: T::Status) -> Result<Vec<T>, RepositoryError> {
        Ok(self
            .entries
            .read()
            .values()
            .filter(|e| e.status() == status)
            .cloned()
            .collect())
    }

    async fn count_by_status(&self, status: T::Status) -> Result<usize, RepositoryError> {
        Ok(self
            .entries
            .read()
            .values()
            .filter(|e| e.status() == status)
            .count())
    }

    async fn remove(&self, id: &T::Id) -> Result<(), RepositoryError> {
        self.entries.write().remove(id);
        Ok(())
    }
}
