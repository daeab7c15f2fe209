//! Persistence layer.
//!
//! Every entity collection sits behind a [`Repository`]. Two implementations
//! exist: [`postgres`] (diesel over an r2d2 pool) for the running service and
//! [`memory`] for tests and local experiments.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::{
    models::{
        BlogPost, BlogPostChanges, GalleryChanges, GalleryItem, NewBlogPost, NewGalleryItem,
        NewProject, NewTraining, NewUser, Project, ProjectChanges, SyncStatus, Training,
        TrainingChanges, User, UserChanges,
    },
    DbPool,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("connection pool error: {0}")]
    Pool(String),
    #[error("unique constraint violated: {0}")]
    Conflict(String),
    #[error("query failed: {0}")]
    Query(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A persisted entity together with its create and update payloads.
pub trait Record: Clone + Send + Sync + 'static {
    type New: Clone + Send + Sync + 'static;
    type Changes: Clone + Send + Sync + 'static;
}

impl Record for User {
    type New = NewUser;
    type Changes = UserChanges;
}

impl Record for BlogPost {
    type New = NewBlogPost;
    type Changes = BlogPostChanges;
}

impl Record for Project {
    type New = NewProject;
    type Changes = ProjectChanges;
}

impl Record for Training {
    type New = NewTraining;
    type Changes = TrainingChanges;
}

impl Record for GalleryItem {
    type New = NewGalleryItem;
    type Changes = GalleryChanges;
}

/// CRUD contract over one entity collection.
pub trait Repository<R: Record>: Send + Sync {
    /// All records, newest created first.
    fn list(&self) -> StoreResult<Vec<R>>;

    fn insert(&self, new: R::New) -> StoreResult<R>;

    fn find(&self, id: Uuid) -> StoreResult<Option<R>>;

    /// Applies the present fields of `changes`; `None` when `id` is unknown.
    fn update(&self, id: Uuid, changes: R::Changes) -> StoreResult<Option<R>>;

    /// `false` when nothing was deleted.
    fn delete(&self, id: Uuid) -> StoreResult<bool>;
}

pub trait GalleryRepository: Repository<GalleryItem> {
    /// One page of records, newest first, plus the total record count.
    fn page(&self, limit: i64, offset: i64) -> StoreResult<(Vec<GalleryItem>, i64)>;

    fn set_sync_status(&self, id: Uuid, status: SyncStatus) -> StoreResult<Option<GalleryItem>>;
}

pub trait UserRepository: Repository<User> {
    /// Case-insensitive lookup.
    fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;
}

pub trait HealthCheck: Send + Sync {
    fn ping(&self) -> StoreResult<()>;
}

/// Handles to every repository, shared by all requests.
#[derive(Clone)]
pub struct Store {
    pub blog: Arc<dyn Repository<BlogPost>>,
    pub projects: Arc<dyn Repository<Project>>,
    pub trainings: Arc<dyn Repository<Training>>,
    pub gallery: Arc<dyn GalleryRepository>,
    pub users: Arc<dyn UserRepository>,
    pub health: Arc<dyn HealthCheck>,
}

impl Store {
    pub fn postgres(pool: DbPool) -> Self {
        let store = Arc::new(postgres::PgStore::new(pool));
        Self {
            blog: store.clone(),
            projects: store.clone(),
            trainings: store.clone(),
            gallery: store.clone(),
            users: store.clone(),
            health: store,
        }
    }

    pub fn in_memory() -> Self {
        let store = Arc::new(memory::MemoryStore::default());
        Self {
            blog: store.clone(),
            projects: store.clone(),
            trainings: store.clone(),
            gallery: store.clone(),
            users: store.clone(),
            health: store,
        }
    }
}
