use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect,
    Set,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{entities::project, models::release::Release};

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Project not found")]
    NotFound,
    #[error("A project with this name already exists")]
    DuplicateName,
    #[error("Referenced release does not exist")]
    ReleaseNotFound,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub creator_id: i64,
    pub release_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProject {
    pub name: String,
    pub description: String,
    pub release_id: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub description: Option<String>,
    pub release_id: Option<i64>,
}

impl Project {
    fn from_model(model: project::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            creator_id: model.creator_id,
            release_id: model.release_id,
        }
    }

    pub async fn find_all<C: ConnectionTrait>(
        db: &C,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Self>, DbErr> {
        let records = project::Entity::find().offset(skip).limit(limit).all(db).await?;
        Ok(records.into_iter().map(Self::from_model).collect())
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i64) -> Result<Option<Self>, DbErr> {
        let record = project::Entity::find_by_id(id).one(db).await?;
        Ok(record.map(Self::from_model))
    }

    pub async fn find_by_name<C: ConnectionTrait>(
        db: &C,
        name: &str,
    ) -> Result<Option<Self>, DbErr> {
        let record = project::Entity::find()
            .filter(project::Column::Name.eq(name))
            .one(db)
            .await?;
        Ok(record.map(Self::from_model))
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &CreateProject,
        creator_id: i64,
    ) -> Result<Self, ProjectError> {
        if Self::find_by_name(db, &data.name).await?.is_some() {
            return Err(ProjectError::DuplicateName);
        }
        if Release::find_by_id(db, data.release_id).await?.is_none() {
            return Err(ProjectError::ReleaseNotFound);
        }

        let active = project::ActiveModel {
            name: Set(data.name.clone()),
            description: Set(data.description.clone()),
            creator_id: Set(creator_id),
            release_id: Set(data.release_id),
            ..Default::default()
        };
        let model = active.insert(db).await?;
        Ok(Self::from_model(model))
    }

    pub async fn update<C: ConnectionTrait>(
        db: &C,
        id: i64,
        payload: &UpdateProject,
    ) -> Result<Self, ProjectError> {
        let record = project::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or(ProjectError::NotFound)?;
        if let Some(name) = payload.name.as_deref()
            && name != record.name
            && Self::find_by_name(db, name).await?.is_some()
        {
            return Err(ProjectError::DuplicateName);
        }
        if let Some(release_id) = payload.release_id
            && Release::find_by_id(db, release_id).await?.is_none()
        {
            return Err(ProjectError::ReleaseNotFound);
        }

        let mut active: project::ActiveModel = record.into();
        if let Some(name) = payload.name.clone() {
            active.name = Set(name);
        }
        if let Some(description) = payload.description.clone() {
            active.description = Set(description);
        }
        if let Some(release_id) = payload.release_id {
            active.release_id = Set(release_id);
        }
        let updated = active.update(db).await?;
        Ok(Self::from_model(updated))
    }

    pub async fn delete_by_id<C: ConnectionTrait>(db: &C, id: i64) -> Result<Option<Self>, DbErr> {
        let record = project::Entity::find_by_id(id).one(db).await?;
        let Some(record) = record else {
            return Ok(None);
        };
        // No cascade: tasks and memberships referencing this project are
        // left in place.
        project::Entity::delete_by_id(record.id).exec(db).await?;
        Ok(Some(Self::from_model(record)))
    }

    pub async fn delete_by_name<C: ConnectionTrait>(
        db: &C,
        name: &str,
    ) -> Result<Option<Self>, DbErr> {
        let record = project::Entity::find()
            .filter(project::Column::Name.eq(name))
            .one(db)
            .await?;
        let Some(record) = record else {
            return Ok(None);
        };
        project::Entity::delete_by_id(record.id).exec(db).await?;
        Ok(Some(Self::from_model(record)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::release::CreateRelease;
    use test_support::test_db;

    async fn seed_release<C: ConnectionTrait>(db: &C) -> Release {
        Release::create(
            db,
            &CreateRelease {
                name: "1.0".to_string(),
                description: "first".to_string(),
                release_date: chrono::Utc::now(),
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn create_echoes_input_and_rejects_duplicates() {
        let db = test_db().await;
        let release = seed_release(&db.pool).await;

        let data = CreateProject {
            name: "apollo".to_string(),
            description: "moonshot".to_string(),
            release_id: release.id,
        };
        let project = Project::create(&db.pool, &data, 7).await.unwrap();
        assert_eq!(project.name, "apollo");
        assert_eq!(project.description, "moonshot");
        assert_eq!(project.creator_id, 7);
        assert_eq!(project.release_id, release.id);

        let err = Project::create(&db.pool, &data, 7).await.unwrap_err();
        assert!(matches!(err, ProjectError::DuplicateName));
    }

    #[tokio::test]
    async fn create_rejects_dangling_release() {
        let db = test_db().await;
        let err = Project::create(
            &db.pool,
            &CreateProject {
                name: "zeus".to_string(),
                description: "".to_string(),
                release_id: 999,
            },
            1,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ProjectError::ReleaseNotFound));
    }
}
