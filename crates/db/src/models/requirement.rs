use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect,
    Set,
};
use serde::{Deserialize, Serialize};

use crate::entities::requirement;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Requirement {
    pub id: i64,
    pub link: String,
}

impl Requirement {
    fn from_model(model: requirement::Model) -> Self {
        Self {
            id: model.id,
            link: model.link,
        }
    }

    pub async fn find_all<C: ConnectionTrait>(
        db: &C,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Self>, DbErr> {
        let records = requirement::Entity::find().offset(skip).limit(limit).all(db).await?;
        Ok(records.into_iter().map(Self::from_model).collect())
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i64) -> Result<Option<Self>, DbErr> {
        let record = requirement::Entity::find_by_id(id).one(db).await?;
        Ok(record.map(Self::from_model))
    }

    /// Returns the id of the requirement with exactly this link, inserting
    /// a new row only when no exact match exists.
    pub async fn get_or_create<C: ConnectionTrait>(db: &C, link: &str) -> Result<i64, DbErr> {
        let existing = requirement::Entity::find()
            .filter(requirement::Column::Link.eq(link))
            .one(db)
            .await?;
        if let Some(model) = existing {
            return Ok(model.id);
        }

        let active = requirement::ActiveModel {
            link: Set(link.to_string()),
            ..Default::default()
        };
        let model = active.insert(db).await?;
        Ok(model.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_support::test_db;

    #[tokio::test]
    async fn get_or_create_dedupes_on_exact_link() {
        let db = test_db().await;

        let first = Requirement::get_or_create(&db.pool, "https://req/1").await.unwrap();
        let again = Requirement::get_or_create(&db.pool, "https://req/1").await.unwrap();
        assert_eq!(first, again);

        // One character of difference is a distinct requirement.
        let other = Requirement::get_or_create(&db.pool, "https://req/2").await.unwrap();
        assert_ne!(first, other);
    }
}
