use sea_orm::{entity::prelude::*, DatabaseConnection};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;

/// Per-school mapping to the external systems (Metabase entity, Zendesk organization).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "school_customizations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub school_id: Uuid,
    pub proesc_id: Option<String>,
    pub zendesk_organization_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef { panic!("no relations defined here") }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn find_by_school(db: &DatabaseConnection, school_id: Uuid) -> Result<Option<Model>, ModelError> {
    Ok(Entity::find()
        .filter(Column::SchoolId.eq(school_id))
        .one(db)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn find_by_school_returns_row() {
        let school_id = Uuid::new_v4();
        let row = Model {
            id: Uuid::new_v4(),
            school_id,
            proesc_id: Some("4442".into()),
            zendesk_organization_id: Some("987".into()),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row.clone()]])
            .into_connection();

        let found = find_by_school(&db, school_id).await.unwrap();
        assert_eq!(found, Some(row));
    }

    #[tokio::test]
    async fn find_by_school_missing_is_none() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<Model>::new()])
            .into_connection();
        let found = find_by_school(&db, Uuid::new_v4()).await.unwrap();
        assert!(found.is_none());
    }
}
