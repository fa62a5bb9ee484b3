use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect,
    Set,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entities::user;

#[derive(Debug, Error)]
pub enum UserError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("User not found")]
    NotFound,
    #[error("A user with this name already exists")]
    DuplicateName,
    #[error("A user with this email already exists")]
    DuplicateEmail,
}

/// Public view of a user. The stored password hash never leaves the db
/// crate except through [`User::find_credentials_by_email`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub is_active: Option<bool>,
}

impl User {
    fn from_model(model: user::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            is_active: model.is_active,
        }
    }

    pub async fn find_all<C: ConnectionTrait>(
        db: &C,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Self>, DbErr> {
        let records = user::Entity::find().offset(skip).limit(limit).all(db).await?;
        Ok(records.into_iter().map(Self::from_model).collect())
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i64) -> Result<Option<Self>, DbErr> {
        let record = user::Entity::find_by_id(id).one(db).await?;
        Ok(record.map(Self::from_model))
    }

    pub async fn find_by_email<C: ConnectionTrait>(
        db: &C,
        email: &str,
    ) -> Result<Option<Self>, DbErr> {
        let record = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(db)
            .await?;
        Ok(record.map(Self::from_model))
    }

    pub async fn find_by_name<C: ConnectionTrait>(
        db: &C,
        name: &str,
    ) -> Result<Option<Self>, DbErr> {
        let record = user::Entity::find()
            .filter(user::Column::Name.eq(name))
            .one(db)
            .await?;
        Ok(record.map(Self::from_model))
    }

    pub async fn find_credentials_by_email<C: ConnectionTrait>(
        db: &C,
        email: &str,
    ) -> Result<Option<UserCredentials>, DbErr> {
        let record = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(db)
            .await?;
        Ok(record.map(|model| UserCredentials {
            password_hash: model.password_hash.clone(),
            user: Self::from_model(model),
        }))
    }

    pub async fn create<C: ConnectionTrait>(db: &C, data: &CreateUser) -> Result<Self, UserError> {
        if Self::find_by_name(db, &data.name).await?.is_some() {
            return Err(UserError::DuplicateName);
        }
        if Self::find_by_email(db, &data.email).await?.is_some() {
            return Err(UserError::DuplicateEmail);
        }

        let active = user::ActiveModel {
            name: Set(data.name.clone()),
            email: Set(data.email.clone()),
            password_hash: Set(data.password_hash.clone()),
            is_active: Set(data.is_active),
            ..Default::default()
        };
        let model = active.insert(db).await?;
        Ok(Self::from_model(model))
    }

    pub async fn update<C: ConnectionTrait>(
        db: &C,
        id: i64,
        payload: &UpdateUser,
    ) -> Result<Self, UserError> {
        let record = user::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or(UserError::NotFound)?;

        if let Some(name) = payload.name.as_deref()
            && name != record.name
            && Self::find_by_name(db, name).await?.is_some()
        {
            return Err(UserError::DuplicateName);
        }
        if let Some(email) = payload.email.as_deref()
            && email != record.email
            && Self::find_by_email(db, email).await?.is_some()
        {
            return Err(UserError::DuplicateEmail);
        }

        let mut active: user::ActiveModel = record.into();
        if let Some(name) = payload.name.clone() {
            active.name = Set(name);
        }
        if let Some(email) = payload.email.clone() {
            active.email = Set(email);
        }
        if let Some(hash) = payload.password_hash.clone() {
            active.password_hash = Set(hash);
        }
        if let Some(is_active) = payload.is_active {
            active.is_active = Set(is_active);
        }

        let updated = active.update(db).await?;
        Ok(Self::from_model(updated))
    }

    pub async fn delete_by_id<C: ConnectionTrait>(db: &C, id: i64) -> Result<Option<Self>, DbErr> {
        let record = user::Entity::find_by_id(id).one(db).await?;
        let Some(record) = record else {
            return Ok(None);
        };
        user::Entity::delete_by_id(record.id).exec(db).await?;
        Ok(Some(Self::from_model(record)))
    }

    pub async fn delete_by_email<C: ConnectionTrait>(
        db: &C,
        email: &str,
    ) -> Result<Option<Self>, DbErr> {
        let record = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(db)
            .await?;
        let Some(record) = record else {
            return Ok(None);
        };
        user::Entity::delete_by_id(record.id).exec(db).await?;
        Ok(Some(Self::from_model(record)))
    }
}
