use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::directory::domain::{Profile, TenantScope};
use crate::directory::errors::DirectoryError;
use crate::directory::repository::TenantDirectory;

/// Directory reading `profiles` and `school_customizations` straight from Postgres.
pub struct SeaOrmTenantDirectory {
    pub db: DatabaseConnection,
}

#[async_trait::async_trait]
impl TenantDirectory for SeaOrmTenantDirectory {
    async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>, DirectoryError> {
        let row = models::profile::find_by_user_id(&self.db, user_id).await?;
        Ok(row.map(Profile::from))
    }

    async fn find_tenant_scope(&self, school_id: Uuid) -> Result<Option<TenantScope>, DirectoryError> {
        let row = models::school_customization::find_by_school(&self.db, school_id).await?;
        Ok(row.map(TenantScope::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Role;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase};

    #[tokio::test]
    async fn profile_row_maps_to_domain() {
        let user_id = Uuid::new_v4();
        let school_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![models::profile::Model {
                id: user_id,
                email: Some("gestor@escola.br".into()),
                name: Some("Carlos".into()),
                role: Some("gestor".into()),
                school_id: Some(school_id),
            }]])
            .into_connection();

        let dir = SeaOrmTenantDirectory { db };
        let profile = dir.find_profile(user_id).await.unwrap().unwrap();
        assert_eq!(profile.role, Role::Gestor);
        assert_eq!(profile.school_id, Some(school_id));
    }

    #[tokio::test]
    async fn tenant_scope_row_maps_to_domain() {
        let school_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![models::school_customization::Model {
                id: Uuid::new_v4(),
                school_id,
                proesc_id: Some("4442".into()),
                zendesk_organization_id: None,
            }]])
            .into_connection();

        let dir = SeaOrmTenantDirectory { db };
        let scope = dir.find_tenant_scope(school_id).await.unwrap().unwrap();
        assert_eq!(scope.proesc_id.as_deref(), Some("4442"));
        assert_eq!(scope.zendesk_organization_id, None);
    }

    #[tokio::test]
    async fn database_errors_surface_as_repository_errors() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Custom("connection reset".into())])
            .into_connection();

        let dir = SeaOrmTenantDirectory { db };
        let err = dir.find_profile(Uuid::new_v4()).await.unwrap_err();
        assert!(err.to_string().contains("connection reset"));
    }
}
