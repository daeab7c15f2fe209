//! Diesel-backed repositories.

use diesel::{
    prelude::*,
    r2d2::{ConnectionManager, PooledConnection},
    result::{DatabaseErrorKind, Error as DieselError},
};
use tracing::error;
use uuid::Uuid;

use super::{
    GalleryRepository, HealthCheck, Record, Repository, StoreError, StoreResult, UserRepository,
};
use crate::{
    models::{BlogPost, GalleryItem, Project, SyncStatus, Training, User},
    schema::{blog_posts, gallery_items, projects, trainings, users},
    DbPool,
};

type PgConn = PooledConnection<ConnectionManager<PgConnection>>;

impl From<DieselError> for StoreError {
    fn from(e: DieselError) -> Self {
        match e {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                StoreError::Conflict(info.message().to_string())
            }
            other => StoreError::Query(other.to_string()),
        }
    }
}

pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> StoreResult<PgConn> {
        self.pool.get().map_err(|e| {
            error!(error = %e, "Database connection error");
            StoreError::Pool(e.to_string())
        })
    }
}

macro_rules! pg_repository {
    ($record:ty, $table:ident) => {
        impl Repository<$record> for PgStore {
            fn list(&self) -> StoreResult<Vec<$record>> {
                let mut conn = self.conn()?;
                let rows = $table::table
                    .order(($table::created_at.desc(), $table::id.desc()))
                    .select(<$record>::as_select())
                    .load(&mut conn)?;
                Ok(rows)
            }

            fn insert(&self, new: <$record as Record>::New) -> StoreResult<$record> {
                let mut conn = self.conn()?;
                let row = diesel::insert_into($table::table)
                    .values(&new)
                    .returning(<$record>::as_returning())
                    .get_result(&mut conn)?;
                Ok(row)
            }

            fn find(&self, id: Uuid) -> StoreResult<Option<$record>> {
                let mut conn = self.conn()?;
                let row = $table::table
                    .find(id)
                    .select(<$record>::as_select())
                    .first(&mut conn)
                    .optional()?;
                Ok(row)
            }

            fn update(
                &self,
                id: Uuid,
                changes: <$record as Record>::Changes,
            ) -> StoreResult<Option<$record>> {
                let mut conn = self.conn()?;
                let row = diesel::update($table::table.find(id))
                    .set((&changes, $table::updated_at.eq(diesel::dsl::now)))
                    .returning(<$record>::as_returning())
                    .get_result(&mut conn)
                    .optional()?;
                Ok(row)
            }

            fn delete(&self, id: Uuid) -> StoreResult<bool> {
                let mut conn = self.conn()?;
                let deleted = diesel::delete($table::table.find(id)).execute(&mut conn)?;
                Ok(deleted > 0)
            }
        }
    };
}

pg_repository!(User, users);
pg_repository!(BlogPost, blog_posts);
pg_repository!(Project, projects);
pg_repository!(Training, trainings);
pg_repository!(GalleryItem, gallery_items);

impl GalleryRepository for PgStore {
    fn page(&self, limit: i64, offset: i64) -> StoreResult<(Vec<GalleryItem>, i64)> {
        let mut conn = self.conn()?;

        let total: i64 = gallery_items::table.count().get_result(&mut conn)?;
        let rows = gallery_items::table
            .order((gallery_items::created_at.desc(), gallery_items::id.desc()))
            .limit(limit)
            .offset(offset)
            .select(GalleryItem::as_select())
            .load(&mut conn)?;

        Ok((rows, total))
    }

    fn set_sync_status(&self, id: Uuid, status: SyncStatus) -> StoreResult<Option<GalleryItem>> {
        let mut conn = self.conn()?;
        let row = diesel::update(gallery_items::table.find(id))
            .set(gallery_items::sync_status.eq(status))
            .returning(GalleryItem::as_returning())
            .get_result(&mut conn)
            .optional()?;
        Ok(row)
    }
}

impl UserRepository for PgStore {
    fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let mut conn = self.conn()?;
        let row = users::table
            .filter(users::email.eq(email.trim().to_lowercase()))
            .select(User::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row)
    }
}

impl HealthCheck for PgStore {
    fn ping(&self) -> StoreResult<()> {
        let mut conn = self.conn()?;
        diesel::sql_query("SELECT 1").execute(&mut conn)?;
        Ok(())
    }
}
