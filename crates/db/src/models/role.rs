use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect,
    Set,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entities::role;

#[derive(Debug, Error)]
pub enum RoleError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Role not found")]
    NotFound,
    #[error("A role with this name already exists")]
    DuplicateName,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRole {
    pub name: String,
}

impl Role {
    fn from_model(model: role::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }

    pub async fn find_all<C: ConnectionTrait>(
        db: &C,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Self>, DbErr> {
        let records = role::Entity::find().offset(skip).limit(limit).all(db).await?;
        Ok(records.into_iter().map(Self::from_model).collect())
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i64) -> Result<Option<Self>, DbErr> {
        let record = role::Entity::find_by_id(id).one(db).await?;
        Ok(record.map(Self::from_model))
    }

    pub async fn find_by_name<C: ConnectionTrait>(
        db: &C,
        name: &str,
    ) -> Result<Option<Self>, DbErr> {
        let record = role::Entity::find()
            .filter(role::Column::Name.eq(name))
            .one(db)
            .await?;
        Ok(record.map(Self::from_model))
    }

    pub async fn create<C: ConnectionTrait>(db: &C, data: &CreateRole) -> Result<Self, RoleError> {
        if Self::find_by_name(db, &data.name).await?.is_some() {
            return Err(RoleError::DuplicateName);
        }
        let active = role::ActiveModel {
            name: Set(data.name.clone()),
            ..Default::default()
        };
        let model = active.insert(db).await?;
        Ok(Self::from_model(model))
    }

    pub async fn update<C: ConnectionTrait>(
        db: &C,
        id: i64,
        name: String,
    ) -> Result<Self, RoleError> {
        let record = role::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or(RoleError::NotFound)?;
        if name != record.name && Self::find_by_name(db, &name).await?.is_some() {
            return Err(RoleError::DuplicateName);
        }
        let mut active: role::ActiveModel = record.into();
        active.name = Set(name);
        let updated = active.update(db).await?;
        Ok(Self::from_model(updated))
    }

    pub async fn delete_by_id<C: ConnectionTrait>(db: &C, id: i64) -> Result<Option<Self>, DbErr> {
        let record = role::Entity::find_by_id(id).one(db).await?;
        let Some(record) = record else {
            return Ok(None);
        };
        role::Entity::delete_by_id(record.id).exec(db).await?;
        Ok(Some(Self::from_model(record)))
    }

    pub async fn delete_by_name<C: ConnectionTrait>(
        db: &C,
        name: &str,
    ) -> Result<Option<Self>, DbErr> {
        let record = role::Entity::find()
            .filter(role::Column::Name.eq(name))
            .one(db)
            .await?;
        let Some(record) = record else {
            return Ok(None);
        };
        role::Entity::delete_by_id(record.id).exec(db).await?;
        Ok(Some(Self::from_model(record)))
    }
}
