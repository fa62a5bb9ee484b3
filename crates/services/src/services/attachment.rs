use std::path::{Path, PathBuf};

use db::{
    ConnectionTrait,
    models::attachment::{Attachment, AttachmentError, CreateAttachment, UpdateAttachment},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AttachmentServiceError {
    #[error(transparent)]
    Attachment(#[from] AttachmentError),
    #[error(transparent)]
    Database(#[from] db::DatabaseError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Attachment not found")]
    NotFound,
}

/// Blob store rooted at the configured docs directory. Each attachment
/// lives at `<root>/<path>/<name>`.
#[derive(Clone)]
pub struct AttachmentStore {
    root: PathBuf,
}

impl AttachmentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn file_path(&self, path: &str, name: &str) -> PathBuf {
        self.root.join(path).join(name)
    }

    pub async fn write(&self, path: &str, name: &str, bytes: &[u8]) -> std::io::Result<()> {
        tokio::fs::create_dir_all(self.root.join(path)).await?;
        tokio::fs::write(self.file_path(path, name), bytes).await
    }

    pub async fn read(&self, path: &str, name: &str) -> std::io::Result<Vec<u8>> {
        tokio::fs::read(self.file_path(path, name)).await
    }

    pub async fn rename(
        &self,
        from_path: &str,
        from_name: &str,
        to_path: &str,
        to_name: &str,
    ) -> std::io::Result<()> {
        tokio::fs::create_dir_all(self.root.join(to_path)).await?;
        tokio::fs::rename(
            self.file_path(from_path, from_name),
            self.file_path(to_path, to_name),
        )
        .await
    }

    pub async fn remove(&self, path: &str, name: &str) -> std::io::Result<()> {
        tokio::fs::remove_file(self.file_path(path, name)).await
    }
}

/// Keeps the file and the row for an attachment in step. Each operation has
/// a fixed order so a crash in the middle leaves a predictable state:
/// - create: file first, row second (an orphan file, never a bodiless row)
/// - update: file move first, row second (a failed move leaves the row as
///   is)
/// - delete: row first, file second (the row never outlives the file's
///   deletion attempt)
#[derive(Clone)]
pub struct AttachmentService {
    store: AttachmentStore,
}

impl AttachmentService {
    pub fn new(store: AttachmentStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &AttachmentStore {
        &self.store
    }

    pub async fn create<C: ConnectionTrait>(
        &self,
        db: &C,
        data: &CreateAttachment,
        bytes: &[u8],
    ) -> Result<Attachment, AttachmentServiceError> {
        // Name check up front so we never clobber another attachment's file.
        if Attachment::find_by_name(db, &data.name).await?.is_some() {
            return Err(AttachmentError::DuplicateName.into());
        }
        self.store.write(&data.path, &data.name, bytes).await?;
        let row = Attachment::create(db, data).await?;
        Ok(row)
    }

    /// Name, path, media type and owning task are all mutable. When the
    /// on-disk location changes the file is moved first, so a failed move
    /// leaves the row pointing at the old location.
    pub async fn update<C: ConnectionTrait>(
        &self,
        db: &C,
        id: i64,
        payload: &UpdateAttachment,
    ) -> Result<Attachment, AttachmentServiceError> {
        let current = Attachment::find_by_id(db, id)
            .await?
            .ok_or(AttachmentServiceError::NotFound)?;
        let new_name = payload.name.as_deref().unwrap_or(&current.name);
        let new_path = payload.path.as_deref().unwrap_or(&current.path);
        if new_name != current.name
            && Attachment::find_by_name(db, new_name).await?.is_some()
        {
            return Err(AttachmentError::DuplicateName.into());
        }
        if new_name != current.name || new_path != current.path {
            self.store
                .rename(&current.path, &current.name, new_path, new_name)
                .await?;
        }
        let row = Attachment::update(db, id, payload).await?;
        Ok(row)
    }

    pub async fn delete<C: ConnectionTrait>(
        &self,
        db: &C,
        id: i64,
    ) -> Result<Attachment, AttachmentServiceError> {
        let snapshot = Attachment::delete_by_id(db, id)
            .await?
            .ok_or(AttachmentServiceError::NotFound)?;
        self.remove_file(&snapshot).await?;
        Ok(snapshot)
    }

    pub async fn delete_by_name<C: ConnectionTrait>(
        &self,
        db: &C,
        name: &str,
    ) -> Result<Attachment, AttachmentServiceError> {
        let snapshot = Attachment::delete_by_name(db, name)
            .await?
            .ok_or(AttachmentServiceError::NotFound)?;
        self.remove_file(&snapshot).await?;
        Ok(snapshot)
    }

    // An already-missing file is fine: the row is gone either way.
    async fn remove_file(&self, row: &Attachment) -> Result<(), AttachmentServiceError> {
        if let Err(err) = self.store.remove(&row.path, &row.name).await
            && err.kind() != std::io::ErrorKind::NotFound
        {
            return Err(err.into());
        }
        Ok(())
    }

    pub async fn read_bytes<C: ConnectionTrait>(
        &self,
        db: &C,
        id: i64,
    ) -> Result<(Attachment, Vec<u8>), AttachmentServiceError> {
        let row = Attachment::find_by_id(db, id)
            .await?
            .ok_or(AttachmentServiceError::NotFound)?;
        let bytes = self.store.read(&row.path, &row.name).await?;
        Ok((row, bytes))
    }
}

#[cfg(test)]
mod tests {
    use test_support::{temp_dir, test_db};

    use super::*;

    fn payload(name: &str) -> CreateAttachment {
        CreateAttachment {
            name: name.to_string(),
            path: "task-1".to_string(),
            media_type: "text/plain".to_string(),
            task_id: 1,
        }
    }

    #[tokio::test]
    async fn create_writes_file_and_row() {
        let db = test_db().await;
        let dir = temp_dir();
        let service = AttachmentService::new(AttachmentStore::new(dir.path()));

        let row = service
            .create(&db.pool, &payload("spec.txt"), b"contents")
            .await
            .unwrap();

        assert!(dir.path().join("task-1/spec.txt").exists());
        let (found, bytes) = service.read_bytes(&db.pool, row.id).await.unwrap();
        assert_eq!(found.name, "spec.txt");
        assert_eq!(bytes, b"contents");
    }

    #[tokio::test]
    async fn duplicate_name_leaves_existing_file_untouched() {
        let db = test_db().await;
        let dir = temp_dir();
        let service = AttachmentService::new(AttachmentStore::new(dir.path()));

        service
            .create(&db.pool, &payload("a.txt"), b"first")
            .await
            .unwrap();
        let err = service
            .create(&db.pool, &payload("a.txt"), b"second")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AttachmentServiceError::Attachment(AttachmentError::DuplicateName)
        ));
        assert_eq!(
            std::fs::read(dir.path().join("task-1/a.txt")).unwrap(),
            b"first"
        );
    }

    #[tokio::test]
    async fn failed_file_rename_leaves_row_unchanged() {
        let db = test_db().await;
        let dir = temp_dir();
        let service = AttachmentService::new(AttachmentStore::new(dir.path()));

        let row = service
            .create(&db.pool, &payload("a.txt"), b"x")
            .await
            .unwrap();
        // Pull the file out from under the service so the rename fails.
        std::fs::remove_file(dir.path().join("task-1/a.txt")).unwrap();

        let err = service
            .update(
                &db.pool,
                row.id,
                &UpdateAttachment {
                    name: Some("b.txt".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AttachmentServiceError::Io(_)));

        let unchanged = Attachment::find_by_id(&db.pool, row.id).await.unwrap().unwrap();
        assert_eq!(unchanged.name, "a.txt");
    }

    #[tokio::test]
    async fn update_moves_file_across_directories() {
        let db = test_db().await;
        let dir = temp_dir();
        let service = AttachmentService::new(AttachmentStore::new(dir.path()));

        let row = service
            .create(&db.pool, &payload("spec.txt"), b"contents")
            .await
            .unwrap();
        let moved = service
            .update(
                &db.pool,
                row.id,
                &UpdateAttachment {
                    name: Some("renamed.txt".to_string()),
                    path: Some("task-2".to_string()),
                    media_type: Some("text/markdown".to_string()),
                    task_id: Some(2),
                },
            )
            .await
            .unwrap();

        assert_eq!(moved.path, "task-2");
        assert_eq!(moved.task_id, 2);
        assert!(!dir.path().join("task-1/spec.txt").exists());
        assert_eq!(
            std::fs::read(dir.path().join("task-2/renamed.txt")).unwrap(),
            b"contents"
        );

        // Metadata-only updates leave the file where it is.
        let retyped = service
            .update(
                &db.pool,
                moved.id,
                &UpdateAttachment {
                    media_type: Some("text/plain".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(retyped.media_type, "text/plain");
        assert!(dir.path().join("task-2/renamed.txt").exists());
    }

    #[tokio::test]
    async fn delete_removes_row_then_file() {
        let db = test_db().await;
        let dir = temp_dir();
        let service = AttachmentService::new(AttachmentStore::new(dir.path()));

        let row = service
            .create(&db.pool, &payload("gone.txt"), b"x")
            .await
            .unwrap();
        let snapshot = service.delete(&db.pool, row.id).await.unwrap();
        assert_eq!(snapshot.name, "gone.txt");
        assert!(Attachment::find_by_id(&db.pool, row.id).await.unwrap().is_none());
        assert!(!dir.path().join("task-1/gone.txt").exists());
    }

    #[tokio::test]
    async fn delete_tolerates_already_missing_file() {
        let db = test_db().await;
        let dir = temp_dir();
        let service = AttachmentService::new(AttachmentStore::new(dir.path()));

        let row = service
            .create(&db.pool, &payload("lost.txt"), b"x")
            .await
            .unwrap();
        std::fs::remove_file(dir.path().join("task-1/lost.txt")).unwrap();

        let snapshot = service.delete(&db.pool, row.id).await.unwrap();
        assert_eq!(snapshot.name, "lost.txt");
    }
}
