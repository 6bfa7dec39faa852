#![allow(dead_code)]

use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use stormdesk::db::{DbPool, establish_connection_pool};
use stormdesk::domain::organization::{NewOrganization, Organization};
use stormdesk::domain::types::{OrgId, OrgName};
use stormdesk::repository::{DieselRepository, OrganizationWriter};
use tempfile::TempDir;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Migrated SQLite database living in a temporary directory.
///
/// The directory, and with it the database and WAL files, is removed on drop.
pub struct TestDb {
    pool: DbPool,
    _dir: TempDir,
}

impl TestDb {
    pub fn new(name: &str) -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join(name);
        let url = path.to_str().expect("utf-8 path").to_string();

        let pool = establish_connection_pool(&url).expect("pool");
        let mut conn = pool.get().expect("connection");
        conn.run_pending_migrations(MIGRATIONS)
            .expect("migrations");

        Self { pool, _dir: dir }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    pub fn repo(&self) -> DieselRepository {
        DieselRepository::new(self.pool())
    }
}

/// Inserts the organization if it does not exist yet.
pub fn seed_org(repo: &DieselRepository, id: i32, name: &str) -> Organization {
    repo.ensure_organization(&NewOrganization::new(
        OrgId::new(id).expect("org id"),
        OrgName::new(name).expect("org name"),
    ))
    .expect("organization")
}
