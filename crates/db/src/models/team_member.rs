use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{entities::team_member, models::user::User};

#[derive(Debug, Error)]
pub enum TeamMemberError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Team member not found")]
    NotFound,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: i64,
    pub user_id: i64,
    pub project_id: i64,
    pub role_id: i64,
    pub is_manager: bool,
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTeamMember {
    pub user_id: i64,
    pub project_id: i64,
    pub role_id: i64,
    pub is_manager: bool,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTeamMember {
    pub user_id: Option<i64>,
    pub project_id: Option<i64>,
    pub role_id: Option<i64>,
    pub is_manager: Option<bool>,
    pub is_active: Option<bool>,
}

impl TeamMember {
    fn from_model(model: team_member::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            project_id: model.project_id,
            role_id: model.role_id,
            is_manager: model.is_manager,
            is_active: model.is_active,
        }
    }

    pub async fn find_all<C: ConnectionTrait>(
        db: &C,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Self>, DbErr> {
        let records = team_member::Entity::find().offset(skip).limit(limit).all(db).await?;
        Ok(records.into_iter().map(Self::from_model).collect())
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i64) -> Result<Option<Self>, DbErr> {
        let record = team_member::Entity::find_by_id(id).one(db).await?;
        Ok(record.map(Self::from_model))
    }

    pub async fn find_by_project_id<C: ConnectionTrait>(
        db: &C,
        project_id: i64,
    ) -> Result<Vec<Self>, DbErr> {
        let records = team_member::Entity::find()
            .filter(team_member::Column::ProjectId.eq(project_id))
            .all(db)
            .await?;
        Ok(records.into_iter().map(Self::from_model).collect())
    }

    /// Resolves a user name to a membership. A user may belong to several
    /// projects; the lowest membership id wins, deterministically.
    pub async fn find_by_user_name<C: ConnectionTrait>(
        db: &C,
        name: &str,
    ) -> Result<Option<Self>, DbErr> {
        let Some(user) = User::find_by_name(db, name).await? else {
            return Ok(None);
        };
        Self::find_first_by_user_id(db, user.id, None).await
    }

    /// Lowest-id membership for a user, optionally scoped to one project.
    pub async fn find_first_by_user_id<C: ConnectionTrait>(
        db: &C,
        user_id: i64,
        project_id: Option<i64>,
    ) -> Result<Option<Self>, DbErr> {
        let mut query = team_member::Entity::find()
            .filter(team_member::Column::UserId.eq(user_id));
        if let Some(project_id) = project_id {
            query = query.filter(team_member::Column::ProjectId.eq(project_id));
        }
        let record = query
            .order_by_asc(team_member::Column::Id)
            .limit(1)
            .one(db)
            .await?;
        Ok(record.map(Self::from_model))
    }

    /// Inserts unconditionally: duplicate (user, project) pairs are
    /// accepted. Callers must not rely on duplicate prevention here.
    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &CreateTeamMember,
    ) -> Result<Self, DbErr> {
        let active = team_member::ActiveModel {
            user_id: Set(data.user_id),
            project_id: Set(data.project_id),
            role_id: Set(data.role_id),
            is_manager: Set(data.is_manager),
            is_active: Set(data.is_active),
            ..Default::default()
        };
        let model = active.insert(db).await?;
        Ok(Self::from_model(model))
    }

    pub async fn update<C: ConnectionTrait>(
        db: &C,
        id: i64,
        payload: &UpdateTeamMember,
    ) -> Result<Self, TeamMemberError> {
        let record = team_member::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or(TeamMemberError::NotFound)?;

        let mut active: team_member::ActiveModel = record.into();
        if let Some(user_id) = payload.user_id {
            active.user_id = Set(user_id);
        }
        if let Some(project_id) = payload.project_id {
            active.project_id = Set(project_id);
        }
        if let Some(role_id) = payload.role_id {
            active.role_id = Set(role_id);
        }
        if let Some(is_manager) = payload.is_manager {
            active.is_manager = Set(is_manager);
        }
        if let Some(is_active) = payload.is_active {
            active.is_active = Set(is_active);
        }
        let updated = active.update(db).await?;
        Ok(Self::from_model(updated))
    }

    pub async fn delete_by_id<C: ConnectionTrait>(db: &C, id: i64) -> Result<Option<Self>, DbErr> {
        let record = team_member::Entity::find_by_id(id).one(db).await?;
        let Some(record) = record else {
            return Ok(None);
        };
        team_member::Entity::delete_by_id(record.id).exec(db).await?;
        Ok(Some(Self::from_model(record)))
    }

    pub async fn delete_by_user_name<C: ConnectionTrait>(
        db: &C,
        name: &str,
    ) -> Result<Option<Self>, DbErr> {
        let Some(member) = Self::find_by_user_name(db, name).await? else {
            return Ok(None);
        };
        team_member::Entity::delete_by_id(member.id).exec(db).await?;
        Ok(Some(member))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::{CreateUser, User};
    use test_support::test_db;

    async fn seed_user<C: ConnectionTrait>(db: &C, name: &str) -> User {
        User::create(
            db,
            &CreateUser {
                name: name.to_string(),
                email: format!("{name}@example.com"),
                password_hash: "hash".to_string(),
                is_active: true,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn duplicate_memberships_are_accepted() {
        let db = test_db().await;
        let user = seed_user(&db.pool, "carol").await;
        let data = CreateTeamMember {
            user_id: user.id,
            project_id: 1,
            role_id: 1,
            is_manager: false,
            is_active: true,
        };

        let first = TeamMember::create(&db.pool, &data).await.unwrap();
        let second = TeamMember::create(&db.pool, &data).await.unwrap();
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn user_name_lookup_picks_lowest_membership_id() {
        let db = test_db().await;
        let user = seed_user(&db.pool, "dave").await;

        let mut ids = Vec::new();
        for project_id in [3, 1, 2] {
            let member = TeamMember::create(
                &db.pool,
                &CreateTeamMember {
                    user_id: user.id,
                    project_id,
                    role_id: 1,
                    is_manager: false,
                    is_active: true,
                },
            )
            .await
            .unwrap();
            ids.push(member.id);
        }

        let resolved = TeamMember::find_by_user_name(&db.pool, "dave")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolved.id, *ids.iter().min().unwrap());

        assert!(TeamMember::find_by_user_name(&db.pool, "nobody")
            .await
            .unwrap()
            .is_none());
    }
}
