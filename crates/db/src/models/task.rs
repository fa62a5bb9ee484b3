use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect,
    Set,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{entities::task, models::requirement::Requirement};
pub use crate::types::TaskState;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Task not found")]
    NotFound,
    #[error("A task with this name already exists")]
    DuplicateName,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub state: TaskState,
    pub manager_id: i64,
    pub assignee_id: Option<i64>,
    pub project_id: i64,
    pub requirement_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTask {
    pub name: String,
    pub description: Option<String>,
    pub state: Option<TaskState>,
    pub assignee_id: Option<i64>,
    pub project_id: i64,
    pub requirement_link: String,
}

/// Only the state and the assignee are mutable through the edit path;
/// name, description and project stay as created (description has its own
/// narrower operation).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EditTask {
    pub state: Option<TaskState>,
    pub assignee_id: Option<i64>,
}

impl Task {
    fn from_model(model: task::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            state: model.state,
            manager_id: model.manager_id,
            assignee_id: model.assignee_id,
            project_id: model.project_id,
            requirement_id: model.requirement_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
            finished_at: model.finished_at,
        }
    }

    pub async fn find_all<C: ConnectionTrait>(
        db: &C,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Self>, DbErr> {
        let records = task::Entity::find().offset(skip).limit(limit).all(db).await?;
        Ok(records.into_iter().map(Self::from_model).collect())
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i64) -> Result<Option<Self>, DbErr> {
        let record = task::Entity::find_by_id(id).one(db).await?;
        Ok(record.map(Self::from_model))
    }

    pub async fn find_by_name<C: ConnectionTrait>(
        db: &C,
        name: &str,
    ) -> Result<Option<Self>, DbErr> {
        let record = task::Entity::find()
            .filter(task::Column::Name.eq(name))
            .one(db)
            .await?;
        Ok(record.map(Self::from_model))
    }

    pub async fn find_by_project_id<C: ConnectionTrait>(
        db: &C,
        project_id: i64,
    ) -> Result<Vec<Self>, DbErr> {
        let records = task::Entity::find()
            .filter(task::Column::ProjectId.eq(project_id))
            .all(db)
            .await?;
        Ok(records.into_iter().map(Self::from_model).collect())
    }

    /// Creates a task under `manager_id` (the acting manager's membership).
    /// The requirement link is resolved first so that tasks sharing an
    /// identical link share one requirement row.
    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &CreateTask,
        manager_id: i64,
    ) -> Result<Self, TaskError> {
        let requirement_id = Requirement::get_or_create(db, &data.requirement_link).await?;

        // Task names are unique across the whole system, not per project.
        if Self::find_by_name(db, &data.name).await?.is_some() {
            return Err(TaskError::DuplicateName);
        }

        let now = Utc::now();
        let active = task::ActiveModel {
            name: Set(data.name.clone()),
            description: Set(data.description.clone()),
            state: Set(data.state.unwrap_or_default()),
            manager_id: Set(manager_id),
            assignee_id: Set(data.assignee_id),
            project_id: Set(data.project_id),
            requirement_id: Set(Some(requirement_id)),
            created_at: Set(now),
            updated_at: Set(now),
            finished_at: Set(None),
            ..Default::default()
        };
        let model = active.insert(db).await?;
        Ok(Self::from_model(model))
    }

    /// No transition graph is enforced: any authorized edit may set any
    /// state, including moving off `finished`.
    pub async fn edit<C: ConnectionTrait>(
        db: &C,
        id: i64,
        payload: &EditTask,
    ) -> Result<Self, TaskError> {
        let record = task::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or(TaskError::NotFound)?;

        let mut active: task::ActiveModel = record.into();
        if let Some(state) = payload.state {
            active.state = Set(state);
        }
        if let Some(assignee_id) = payload.assignee_id {
            active.assignee_id = Set(Some(assignee_id));
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(db).await?;
        Ok(Self::from_model(updated))
    }

    pub async fn edit_description<C: ConnectionTrait>(
        db: &C,
        id: i64,
        description: String,
    ) -> Result<Self, TaskError> {
        let record = task::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or(TaskError::NotFound)?;

        let mut active: task::ActiveModel = record.into();
        active.description = Set(Some(description));
        active.updated_at = Set(Utc::now());

        let updated = active.update(db).await?;
        Ok(Self::from_model(updated))
    }

    pub async fn delete_by_id<C: ConnectionTrait>(db: &C, id: i64) -> Result<Option<Self>, DbErr> {
        let record = task::Entity::find_by_id(id).one(db).await?;
        let Some(record) = record else {
            return Ok(None);
        };
        // Comments and attachments referencing this task are left behind.
        task::Entity::delete_by_id(record.id).exec(db).await?;
        Ok(Some(Self::from_model(record)))
    }

    pub async fn delete_by_name<C: ConnectionTrait>(
        db: &C,
        name: &str,
    ) -> Result<Option<Self>, DbErr> {
        let record = task::Entity::find()
            .filter(task::Column::Name.eq(name))
            .one(db)
            .await?;
        let Some(record) = record else {
            return Ok(None);
        };
        task::Entity::delete_by_id(record.id).exec(db).await?;
        Ok(Some(Self::from_model(record)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_support::test_db;

    fn task_payload(name: &str, link: &str) -> CreateTask {
        CreateTask {
            name: name.to_string(),
            description: Some("desc".to_string()),
            state: None,
            assignee_id: None,
            project_id: 1,
            requirement_link: link.to_string(),
        }
    }

    #[tokio::test]
    async fn create_dedupes_requirement_links() {
        let db = test_db().await;

        let a = Task::create(&db.pool, &task_payload("t1", "https://req/x"), 1)
            .await
            .unwrap();
        let b = Task::create(&db.pool, &task_payload("t2", "https://req/x"), 1)
            .await
            .unwrap();
        let c = Task::create(&db.pool, &task_payload("t3", "https://req/y"), 1)
            .await
            .unwrap();

        assert_eq!(a.requirement_id, b.requirement_id);
        assert_ne!(a.requirement_id, c.requirement_id);
        assert_eq!(a.state, TaskState::Created);
        assert!(a.finished_at.is_none());
    }

    #[tokio::test]
    async fn create_rejects_duplicate_name_globally() {
        let db = test_db().await;
        Task::create(&db.pool, &task_payload("unique", "l"), 1)
            .await
            .unwrap();

        // Same name under a different project still conflicts.
        let mut other_project = task_payload("unique", "l");
        other_project.project_id = 2;
        let err = Task::create(&db.pool, &other_project, 1).await.unwrap_err();
        assert!(matches!(err, TaskError::DuplicateName));
    }

    #[tokio::test]
    async fn edit_missing_task_is_not_found() {
        let db = test_db().await;
        let err = Task::edit(
            &db.pool,
            42,
            &EditTask {
                state: Some(TaskState::Worked),
                assignee_id: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, TaskError::NotFound));
        assert!(Task::find_all(&db.pool, 0, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn edit_changes_only_state_and_assignee() {
        let db = test_db().await;
        let created = Task::create(&db.pool, &task_payload("editable", "l"), 1)
            .await
            .unwrap();

        let edited = Task::edit(
            &db.pool,
            created.id,
            &EditTask {
                state: Some(TaskState::Finished),
                assignee_id: Some(9),
            },
        )
        .await
        .unwrap();

        assert_eq!(edited.state, TaskState::Finished);
        assert_eq!(edited.assignee_id, Some(9));
        assert_eq!(edited.name, created.name);
        assert_eq!(edited.description, created.description);
        // finished is not terminal; any state may follow.
        let reopened = Task::edit(
            &db.pool,
            created.id,
            &EditTask {
                state: Some(TaskState::Worked),
                assignee_id: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(reopened.state, TaskState::Worked);
        assert_eq!(reopened.assignee_id, Some(9));
    }

    #[tokio::test]
    async fn delete_by_name_returns_snapshot() {
        let db = test_db().await;
        Task::create(&db.pool, &task_payload("doomed", "l"), 1)
            .await
            .unwrap();

        let snapshot = Task::delete_by_name(&db.pool, "doomed").await.unwrap().unwrap();
        assert_eq!(snapshot.name, "doomed");
        assert!(Task::find_by_name(&db.pool, "doomed").await.unwrap().is_none());
    }
}
