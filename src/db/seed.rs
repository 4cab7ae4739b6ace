use crate::db::{self, NewEmployee};
use crate::domain::models::Role;
use anyhow::Result;
use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2,
};
use rand_core::OsRng;
use sqlx::PgPool;

/// Creates the bootstrap admin account when the profiles table is
/// empty, so a fresh deployment can be logged into at all.
pub async fn seed_admin(pool: &PgPool) -> Result<()> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profiles")
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        return Ok(());
    }

    let email =
        std::env::var("SEED_ADMIN_EMAIL").unwrap_or_else(|_| "admin@staffsync.local".to_string());
    let password = std::env::var("SEED_ADMIN_PASSWORD").unwrap_or_else(|_| "change-me".to_string());

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("failed to hash seed password: {e}"))?
        .to_string();

    db::create_employee(
        pool,
        NewEmployee {
            full_name: "Administrator",
            email: &email,
            hash: &hash,
            department: None,
            position: None,
            role: Role::Admin,
        },
    )
    .await?;

    tracing::info!("Seeded bootstrap admin account {email}");
    Ok(())
}
