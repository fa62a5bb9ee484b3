use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{entities::comment, types::TaskState};

#[derive(Debug, Error)]
pub enum CommentError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Comment not found")]
    NotFound,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub message: String,
    pub task_id: i64,
    pub creator_id: i64,
    /// State snapshot supplied by whoever wrote the comment.
    pub prev_state: TaskState,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateComment {
    pub message: String,
    pub task_id: i64,
    /// Stored verbatim; never read back from the task.
    pub prev_state: TaskState,
}

impl Comment {
    fn from_model(model: comment::Model) -> Self {
        Self {
            id: model.id,
            message: model.message,
            task_id: model.task_id,
            creator_id: model.creator_id,
            prev_state: model.prev_state,
            created_at: model.created_at,
        }
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i64) -> Result<Option<Self>, DbErr> {
        let record = comment::Entity::find_by_id(id).one(db).await?;
        Ok(record.map(Self::from_model))
    }

    pub async fn find_by_task_id<C: ConnectionTrait>(
        db: &C,
        task_id: i64,
    ) -> Result<Vec<Self>, DbErr> {
        let records = comment::Entity::find()
            .filter(comment::Column::TaskId.eq(task_id))
            .all(db)
            .await?;
        Ok(records.into_iter().map(Self::from_model).collect())
    }

    /// `task_id` and `prev_state` are taken on faith: neither is checked
    /// against the tasks table, and the row keeps its snapshot even after
    /// the task moves on or is gone.
    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &CreateComment,
        creator_id: i64,
    ) -> Result<Self, DbErr> {
        let active = comment::ActiveModel {
            message: Set(data.message.clone()),
            task_id: Set(data.task_id),
            creator_id: Set(creator_id),
            prev_state: Set(data.prev_state),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        let model = active.insert(db).await?;
        Ok(Self::from_model(model))
    }

    pub async fn update_message<C: ConnectionTrait>(
        db: &C,
        id: i64,
        message: String,
    ) -> Result<Self, CommentError> {
        let record = comment::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or(CommentError::NotFound)?;

        let mut active: comment::ActiveModel = record.into();
        active.message = Set(message);
        let updated = active.update(db).await?;
        Ok(Self::from_model(updated))
    }

    pub async fn delete_by_id<C: ConnectionTrait>(db: &C, id: i64) -> Result<Option<Self>, DbErr> {
        let record = comment::Entity::find_by_id(id).one(db).await?;
        let Some(record) = record else {
            return Ok(None);
        };
        comment::Entity::delete_by_id(record.id).exec(db).await?;
        Ok(Some(Self::from_model(record)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_support::test_db;

    #[tokio::test]
    async fn comment_keeps_prev_state_snapshot() {
        let db = test_db().await;
        let created = Comment::create(
            &db.pool,
            &CreateComment {
                message: "looks good".to_string(),
                task_id: 7,
                prev_state: TaskState::Worked,
            },
            3,
        )
        .await
        .unwrap();

        assert_eq!(created.prev_state, TaskState::Worked);
        assert_eq!(created.creator_id, 3);

        let listed = Comment::find_by_task_id(&db.pool, 7).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].message, "looks good");
    }

    #[tokio::test]
    async fn update_missing_comment_is_not_found() {
        let db = test_db().await;
        let err = Comment::update_message(&db.pool, 99, "edited".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, CommentError::NotFound));
    }
}
