use sea_orm::{entity::prelude::*, DatabaseConnection};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;

/// Row of `profiles`, keyed by the Supabase auth user id.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
    pub school_id: Option<Uuid>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef { panic!("no relations defined here") }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn find_by_user_id(db: &DatabaseConnection, user_id: Uuid) -> Result<Option<Model>, ModelError> {
    Ok(Entity::find_by_id(user_id).one(db).await?)
}
