use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect,
    Set,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entities::release;

#[derive(Debug, Error)]
pub enum ReleaseError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Release not found")]
    NotFound,
    #[error("A release with this name already exists")]
    DuplicateName,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Release {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub release_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRelease {
    pub name: String,
    pub description: String,
    pub release_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRelease {
    pub name: Option<String>,
    pub description: Option<String>,
    pub release_date: Option<DateTime<Utc>>,
}

impl Release {
    fn from_model(model: release::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            release_date: model.release_date,
        }
    }

    pub async fn find_all<C: ConnectionTrait>(
        db: &C,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Self>, DbErr> {
        let records = release::Entity::find().offset(skip).limit(limit).all(db).await?;
        Ok(records.into_iter().map(Self::from_model).collect())
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i64) -> Result<Option<Self>, DbErr> {
        let record = release::Entity::find_by_id(id).one(db).await?;
        Ok(record.map(Self::from_model))
    }

    pub async fn find_by_name<C: ConnectionTrait>(
        db: &C,
        name: &str,
    ) -> Result<Option<Self>, DbErr> {
        let record = release::Entity::find()
            .filter(release::Column::Name.eq(name))
            .one(db)
            .await?;
        Ok(record.map(Self::from_model))
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &CreateRelease,
    ) -> Result<Self, ReleaseError> {
        if Self::find_by_name(db, &data.name).await?.is_some() {
            return Err(ReleaseError::DuplicateName);
        }
        let active = release::ActiveModel {
            name: Set(data.name.clone()),
            description: Set(data.description.clone()),
            release_date: Set(data.release_date),
            ..Default::default()
        };
        let model = active.insert(db).await?;
        Ok(Self::from_model(model))
    }

    pub async fn update<C: ConnectionTrait>(
        db: &C,
        id: i64,
        payload: &UpdateRelease,
    ) -> Result<Self, ReleaseError> {
        let record = release::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or(ReleaseError::NotFound)?;
        if let Some(name) = payload.name.as_deref()
            && name != record.name
            && Self::find_by_name(db, name).await?.is_some()
        {
            return Err(ReleaseError::DuplicateName);
        }

        let mut active: release::ActiveModel = record.into();
        if let Some(name) = payload.name.clone() {
            active.name = Set(name);
        }
        if let Some(description) = payload.description.clone() {
            active.description = Set(description);
        }
        if let Some(release_date) = payload.release_date {
            active.release_date = Set(release_date);
        }
        let updated = active.update(db).await?;
        Ok(Self::from_model(updated))
    }

    pub async fn delete_by_id<C: ConnectionTrait>(db: &C, id: i64) -> Result<Option<Self>, DbErr> {
        let record = release::Entity::find_by_id(id).one(db).await?;
        let Some(record) = record else {
            return Ok(None);
        };
        release::Entity::delete_by_id(record.id).exec(db).await?;
        Ok(Some(Self::from_model(record)))
    }

    pub async fn delete_by_name<C: ConnectionTrait>(
        db: &C,
        name: &str,
    ) -> Result<Option<Self>, DbErr> {
        let record = release::Entity::find()
            .filter(release::Column::Name.eq(name))
            .one(db)
            .await?;
        let Some(record) = record else {
            return Ok(None);
        };
        release::Entity::delete_by_id(record.id).exec(db).await?;
        Ok(Some(Self::from_model(record)))
    }
}
