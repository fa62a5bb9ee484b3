use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entities::attachment;

#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Attachment not found")]
    NotFound,
    #[error("An attachment with this name already exists")]
    DuplicateName,
}

/// Row side of an attachment. The bytes live on disk under
/// `<store root>/<path>/<name>` and are managed by the attachment service,
/// not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub id: i64,
    pub name: String,
    pub path: String,
    pub media_type: String,
    pub task_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAttachment {
    pub name: String,
    pub path: String,
    pub media_type: String,
    pub task_id: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAttachment {
    pub name: Option<String>,
    pub path: Option<String>,
    pub media_type: Option<String>,
    pub task_id: Option<i64>,
}

impl Attachment {
    fn from_model(model: attachment::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            path: model.path,
            media_type: model.media_type,
            task_id: model.task_id,
        }
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i64) -> Result<Option<Self>, DbErr> {
        let record = attachment::Entity::find_by_id(id).one(db).await?;
        Ok(record.map(Self::from_model))
    }

    pub async fn find_by_name<C: ConnectionTrait>(
        db: &C,
        name: &str,
    ) -> Result<Option<Self>, DbErr> {
        let record = attachment::Entity::find()
            .filter(attachment::Column::Name.eq(name))
            .one(db)
            .await?;
        Ok(record.map(Self::from_model))
    }

    pub async fn find_by_task_id<C: ConnectionTrait>(
        db: &C,
        task_id: i64,
    ) -> Result<Vec<Self>, DbErr> {
        let records = attachment::Entity::find()
            .filter(attachment::Column::TaskId.eq(task_id))
            .all(db)
            .await?;
        Ok(records.into_iter().map(Self::from_model).collect())
    }

    /// Attachment names are unique across the system, matching the on-disk
    /// layout where the file keeps the attachment's name.
    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &CreateAttachment,
    ) -> Result<Self, AttachmentError> {
        if Self::find_by_name(db, &data.name).await?.is_some() {
            return Err(AttachmentError::DuplicateName);
        }

        let active = attachment::ActiveModel {
            name: Set(data.name.clone()),
            path: Set(data.path.clone()),
            media_type: Set(data.media_type.clone()),
            task_id: Set(data.task_id),
            ..Default::default()
        };
        let model = active.insert(db).await?;
        Ok(Self::from_model(model))
    }

    pub async fn update<C: ConnectionTrait>(
        db: &C,
        id: i64,
        payload: &UpdateAttachment,
    ) -> Result<Self, AttachmentError> {
        let record = attachment::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or(AttachmentError::NotFound)?;

        if let Some(name) = payload.name.as_deref()
            && name != record.name
            && Self::find_by_name(db, name).await?.is_some()
        {
            return Err(AttachmentError::DuplicateName);
        }

        let mut active: attachment::ActiveModel = record.into();
        if let Some(name) = payload.name.clone() {
            active.name = Set(name);
        }
        if let Some(path) = payload.path.clone() {
            active.path = Set(path);
        }
        if let Some(media_type) = payload.media_type.clone() {
            active.media_type = Set(media_type);
        }
        if let Some(task_id) = payload.task_id {
            active.task_id = Set(task_id);
        }
        let updated = active.update(db).await?;
        Ok(Self::from_model(updated))
    }

    pub async fn delete_by_id<C: ConnectionTrait>(db: &C, id: i64) -> Result<Option<Self>, DbErr> {
        let record = attachment::Entity::find_by_id(id).one(db).await?;
        let Some(record) = record else {
            return Ok(None);
        };
        attachment::Entity::delete_by_id(record.id).exec(db).await?;
        Ok(Some(Self::from_model(record)))
    }

    pub async fn delete_by_name<C: ConnectionTrait>(
        db: &C,
        name: &str,
    ) -> Result<Option<Self>, DbErr> {
        let record = attachment::Entity::find()
            .filter(attachment::Column::Name.eq(name))
            .one(db)
            .await?;
        let Some(record) = record else {
            return Ok(None);
        };
        attachment::Entity::delete_by_id(record.id).exec(db).await?;
        Ok(Some(Self::from_model(record)))
    }
}
