//! In-process repositories backed by `Vec`s behind a mutex.

use std::sync::{Mutex, MutexGuard};

use chrono::{NaiveDateTime, Utc};
use uuid::Uuid;

use super::{
    GalleryRepository, HealthCheck, Record, Repository, StoreError, StoreResult, UserRepository,
};
use crate::models::{BlogPost, GalleryItem, Project, SyncStatus, Training, User};

/// How a record is materialized and patched without a database.
pub trait MemoryRecord: Record {
    fn id(&self) -> Uuid;

    fn build(id: Uuid, now: NaiveDateTime, new: Self::New) -> Self;

    fn apply(&mut self, changes: Self::Changes, now: NaiveDateTime);

    /// Value that must be unique across the collection, if any.
    fn unique_key(&self) -> Option<String> {
        None
    }
}

/// Rows in insertion order, which is also creation order.
pub struct MemoryCollection<R> {
    rows: Mutex<Vec<R>>,
}

impl<R> Default for MemoryCollection<R> {
    fn default() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
        }
    }
}

impl<R: MemoryRecord> MemoryCollection<R> {
    fn lock(&self) -> StoreResult<MutexGuard<'_, Vec<R>>> {
        self.rows
            .lock()
            .map_err(|_| StoreError::Pool("memory store lock poisoned".to_string()))
    }

    fn ensure_unique(rows: &[R], candidate: &R) -> StoreResult<()> {
        let Some(key) = candidate.unique_key() else {
            return Ok(());
        };
        let taken = rows
            .iter()
            .any(|row| row.id() != candidate.id() && row.unique_key().as_deref() == Some(&key));
        if taken {
            return Err(StoreError::Conflict(format!("duplicate key: {key}")));
        }
        Ok(())
    }

    pub fn list(&self) -> StoreResult<Vec<R>> {
        Ok(self.lock()?.iter().rev().cloned().collect())
    }

    pub fn page(&self, limit: i64, offset: i64) -> StoreResult<(Vec<R>, i64)> {
        let rows = self.lock()?;
        let total = rows.len() as i64;
        let page = rows
            .iter()
            .rev()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect();
        Ok((page, total))
    }

    pub fn insert(&self, new: R::New) -> StoreResult<R> {
        let mut rows = self.lock()?;
        let record = R::build(Uuid::new_v4(), Utc::now().naive_utc(), new);
        Self::ensure_unique(&rows, &record)?;
        rows.push(record.clone());
        Ok(record)
    }

    pub fn find(&self, id: Uuid) -> StoreResult<Option<R>> {
        Ok(self.lock()?.iter().find(|row| row.id() == id).cloned())
    }

    pub fn find_by(&self, predicate: impl Fn(&R) -> bool) -> StoreResult<Option<R>> {
        Ok(self.lock()?.iter().find(|row| predicate(row)).cloned())
    }

    pub fn update(&self, id: Uuid, changes: R::Changes) -> StoreResult<Option<R>> {
        let mut rows = self.lock()?;
        let Some(index) = rows.iter().position(|row| row.id() == id) else {
            return Ok(None);
        };

        let mut updated = rows[index].clone();
        updated.apply(changes, Utc::now().naive_utc());
        Self::ensure_unique(&rows, &updated)?;
        rows[index] = updated.clone();
        Ok(Some(updated))
    }

    pub fn modify(&self, id: Uuid, f: impl FnOnce(&mut R)) -> StoreResult<Option<R>> {
        let mut rows = self.lock()?;
        Ok(rows.iter_mut().find(|row| row.id() == id).map(|row| {
            f(row);
            row.clone()
        }))
    }

    pub fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let mut rows = self.lock()?;
        let before = rows.len();
        rows.retain(|row| row.id() != id);
        Ok(rows.len() < before)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    users: MemoryCollection<User>,
    blog: MemoryCollection<BlogPost>,
    projects: MemoryCollection<Project>,
    trainings: MemoryCollection<Training>,
    gallery: MemoryCollection<GalleryItem>,
}

macro_rules! memory_repository {
    ($record:ty, $field:ident) => {
        impl Repository<$record> for MemoryStore {
            fn list(&self) -> StoreResult<Vec<$record>> {
                self.$field.list()
            }

            fn insert(&self, new: <$record as Record>::New) -> StoreResult<$record> {
                self.$field.insert(new)
            }

            fn find(&self, id: Uuid) -> StoreResult<Option<$record>> {
                self.$field.find(id)
            }

            fn update(
                &self,
                id: Uuid,
                changes: <$record as Record>::Changes,
            ) -> StoreResult<Option<$record>> {
                self.$field.update(id, changes)
            }

            fn delete(&self, id: Uuid) -> StoreResult<bool> {
                self.$field.delete(id)
            }
        }
    };
}

memory_repository!(User, users);
memory_repository!(BlogPost, blog);
memory_repository!(Project, projects);
memory_repository!(Training, trainings);
memory_repository!(GalleryItem, gallery);

impl GalleryRepository for MemoryStore {
    fn page(&self, limit: i64, offset: i64) -> StoreResult<(Vec<GalleryItem>, i64)> {
        self.gallery.page(limit, offset)
    }

    fn set_sync_status(&self, id: Uuid, status: SyncStatus) -> StoreResult<Option<GalleryItem>> {
        self.gallery.modify(id, |item| item.sync_status = status)
    }
}

impl UserRepository for MemoryStore {
    fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let email = email.trim().to_lowercase();
        self.users.find_by(|user| user.email == email)
    }
}

impl HealthCheck for MemoryStore {
    fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

impl MemoryRecord for User {
    fn id(&self) -> Uuid {
        self.id
    }

    fn build(id: Uuid, now: NaiveDateTime, new: Self::New) -> Self {
        User {
            id,
            name: new.name,
            email: new.email,
            password_hash: new.password_hash,
            role: new.role,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, changes: Self::Changes, now: NaiveDateTime) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(email) = changes.email {
            self.email = email;
        }
        if let Some(password_hash) = changes.password_hash {
            self.password_hash = password_hash;
        }
        if let Some(role) = changes.role {
            self.role = role;
        }
        self.updated_at = now;
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.email.clone())
    }
}

impl MemoryRecord for BlogPost {
    fn id(&self) -> Uuid {
        self.id
    }

    fn build(id: Uuid, now: NaiveDateTime, new: Self::New) -> Self {
        BlogPost {
            id,
            title: new.title,
            content: new.content,
            cover_image: new.cover_image,
            tags: new.tags,
            published: new.published,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, changes: Self::Changes, now: NaiveDateTime) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(content) = changes.content {
            self.content = content;
        }
        if let Some(cover_image) = changes.cover_image {
            self.cover_image = cover_image;
        }
        if let Some(tags) = changes.tags {
            self.tags = tags;
        }
        if let Some(published) = changes.published {
            self.published = published;
        }
        self.updated_at = now;
    }
}

impl MemoryRecord for Project {
    fn id(&self) -> Uuid {
        self.id
    }

    fn build(id: Uuid, now: NaiveDateTime, new: Self::New) -> Self {
        Project {
            id,
            title: new.title,
            short_description: new.short_description,
            full_description: new.full_description,
            collaborators: new.collaborators,
            image_urls: new.image_urls,
            start_date: new.start_date,
            end_date: new.end_date,
            is_ongoing: new.is_ongoing,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, changes: Self::Changes, now: NaiveDateTime) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(short_description) = changes.short_description {
            self.short_description = short_description;
        }
        if let Some(full_description) = changes.full_description {
            self.full_description = full_description;
        }
        if let Some(collaborators) = changes.collaborators {
            self.collaborators = collaborators;
        }
        if let Some(image_urls) = changes.image_urls {
            self.image_urls = image_urls;
        }
        if let Some(start_date) = changes.start_date {
            self.start_date = start_date;
        }
        if let Some(end_date) = changes.end_date {
            self.end_date = end_date;
        }
        if let Some(is_ongoing) = changes.is_ongoing {
            self.is_ongoing = is_ongoing;
        }
        self.updated_at = now;
    }
}

impl MemoryRecord for Training {
    fn id(&self) -> Uuid {
        self.id
    }

    fn build(id: Uuid, now: NaiveDateTime, new: Self::New) -> Self {
        Training {
            id,
            title: new.title,
            short_description: new.short_description,
            full_description: new.full_description,
            facilitators: new.facilitators,
            target_audience: new.target_audience,
            resources: new.resources,
            image_urls: new.image_urls,
            certificate_issued: new.certificate_issued,
            mode: new.mode,
            start_date: new.start_date,
            end_date: new.end_date,
            is_ongoing: new.is_ongoing,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, changes: Self::Changes, now: NaiveDateTime) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(short_description) = changes.short_description {
            self.short_description = short_description;
        }
        if let Some(full_description) = changes.full_description {
            self.full_description = full_description;
        }
        if let Some(facilitators) = changes.facilitators {
            self.facilitators = facilitators;
        }
        if let Some(target_audience) = changes.target_audience {
            self.target_audience = target_audience;
        }
        if let Some(resources) = changes.resources {
            self.resources = resources;
        }
        if let Some(image_urls) = changes.image_urls {
            self.image_urls = image_urls;
        }
        if let Some(certificate_issued) = changes.certificate_issued {
            self.certificate_issued = certificate_issued;
        }
        if let Some(mode) = changes.mode {
            self.mode = mode;
        }
        if let Some(start_date) = changes.start_date {
            self.start_date = start_date;
        }
        if let Some(end_date) = changes.end_date {
            self.end_date = end_date;
        }
        if let Some(is_ongoing) = changes.is_ongoing {
            self.is_ongoing = is_ongoing;
        }
        self.updated_at = now;
    }
}

impl MemoryRecord for GalleryItem {
    fn id(&self) -> Uuid {
        self.id
    }

    fn build(id: Uuid, now: NaiveDateTime, new: Self::New) -> Self {
        GalleryItem {
            id,
            title: new.title,
            description: new.description,
            media_type: new.media_type,
            media_url: new.media_url,
            asset_id: new.asset_id,
            tags: new.tags,
            uploaded_by: new.uploaded_by,
            sync_status: new.sync_status,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, changes: Self::Changes, now: NaiveDateTime) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(tags) = changes.tags {
            self.tags = tags;
        }
        if let Some(sync_status) = changes.sync_status {
            self.sync_status = sync_status;
        }
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BlogPostChanges, MediaType, NewBlogPost, NewGalleryItem, NewUser, Role};

    fn post(title: &str) -> NewBlogPost {
        NewBlogPost {
            title: title.to_string(),
            content: "body".to_string(),
            cover_image: None,
            tags: vec![],
            published: false,
        }
    }

    fn gallery_item(n: usize) -> NewGalleryItem {
        NewGalleryItem {
            title: format!("item {n}"),
            description: None,
            media_type: MediaType::Image,
            media_url: format!("https://cdn.example/{n}.png"),
            asset_id: format!("asset-{n}"),
            tags: vec![],
            uploaded_by: None,
            sync_status: SyncStatus::Synced,
        }
    }

    #[test]
    fn test_list_is_newest_first() {
        let store = MemoryStore::default();
        Repository::<BlogPost>::insert(&store, post("first")).unwrap();
        Repository::<BlogPost>::insert(&store, post("second")).unwrap();

        let titles: Vec<_> = Repository::<BlogPost>::list(&store)
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["second", "first"]);
    }

    #[test]
    fn test_update_replaces_arrays_and_clears_nullable() {
        let store = MemoryStore::default();
        let mut new = post("tagged");
        new.tags = vec!["a".into(), "b".into()];
        new.cover_image = Some("https://cdn.example/c.png".into());
        let created = Repository::<BlogPost>::insert(&store, new).unwrap();

        let changes = BlogPostChanges {
            tags: Some(vec!["c".into()]),
            cover_image: Some(None),
            ..Default::default()
        };
        let updated = Repository::<BlogPost>::update(&store, created.id, changes)
            .unwrap()
            .unwrap();
        assert_eq!(updated.tags, vec!["c"]);
        assert_eq!(updated.cover_image, None);
        assert_eq!(updated.title, "tagged");
    }

    #[test]
    fn test_missing_ids() {
        let store = MemoryStore::default();
        let id = Uuid::new_v4();
        assert!(Repository::<BlogPost>::find(&store, id).unwrap().is_none());
        assert!(Repository::<BlogPost>::update(&store, id, BlogPostChanges::default())
            .unwrap()
            .is_none());
        assert!(!Repository::<BlogPost>::delete(&store, id).unwrap());
    }

    #[test]
    fn test_gallery_pages() {
        let store = MemoryStore::default();
        for n in 0..20 {
            Repository::<GalleryItem>::insert(&store, gallery_item(n)).unwrap();
        }

        let (first, total) = store.page(9, 0).unwrap();
        assert_eq!(total, 20);
        assert_eq!(first.len(), 9);
        assert_eq!(first[0].title, "item 19");

        let (last, _) = store.page(9, 18).unwrap();
        assert_eq!(last.len(), 2);

        let (beyond, _) = store.page(9, 27).unwrap();
        assert!(beyond.is_empty());
    }

    #[test]
    fn test_duplicate_email_conflicts() {
        let store = MemoryStore::default();
        let new = NewUser {
            name: "Ada".into(),
            email: "ada@example.org".into(),
            password_hash: "hash".into(),
            role: Role::Admin,
        };
        Repository::<User>::insert(&store, new.clone()).unwrap();
        let err = Repository::<User>::insert(&store, new).unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert!(store.find_by_email("ADA@example.org").unwrap().is_some());
    }

    #[test]
    fn test_set_sync_status() {
        let store = MemoryStore::default();
        let item = Repository::<GalleryItem>::insert(&store, gallery_item(1)).unwrap();
        let updated = store
            .set_sync_status(item.id, SyncStatus::Failed)
            .unwrap()
            .unwrap();
        assert_eq!(updated.sync_status, SyncStatus::Failed);
        assert!(store
            .set_sync_status(Uuid::new_v4(), SyncStatus::Synced)
            .unwrap()
            .is_none());
    }
}
