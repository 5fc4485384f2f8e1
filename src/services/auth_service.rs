use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::auth_dto::{LoginPayload, MeUser, ProfileBrief, RegisterPayload};
use crate::error::{Error, Result};
use crate::models::user::User;
use crate::utils::crypto::{hash_password, verify_password};

#[derive(Clone)]
pub struct AuthService {
    pool: PgPool,
}

impl AuthService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, created_at, updated_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Creates the user and its profile together.
    pub async fn register(&self, payload: RegisterPayload) -> Result<User> {
        let payload = payload.normalized();
        if payload.name.is_empty() {
            return Err(Error::BadRequest("Name is required".to_string()));
        }
        if payload.email.is_empty() {
            return Err(Error::BadRequest("Email is required".to_string()));
        }
        payload.validate()?;

        if self.find_by_email(&payload.email).await?.is_some() {
            return Err(Error::Conflict("Email already registered".to_string()));
        }

        let password_hash = hash_password(&payload.password)?;

        let mut tx = self.pool.begin().await?;
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash)
            VALUES ($1, $2)
            ON CONFLICT (email) DO NOTHING
            RETURNING id, email, password_hash, created_at, updated_at
            "#,
        )
        .bind(&payload.email)
        .bind(&password_hash)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| Error::Conflict("Email already registered".to_string()))?;

        sqlx::query("INSERT INTO profiles (user_id, name) VALUES ($1, $2)")
            .bind(user.id)
            .bind(&payload.name)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn login(&self, payload: LoginPayload) -> Result<User> {
        let email = payload.email.trim().to_lowercase();
        if email.is_empty() {
            return Err(Error::BadRequest("Email is required".to_string()));
        }
        if payload.password.is_empty() {
            return Err(Error::BadRequest("Password is required".to_string()));
        }

        let invalid = || Error::Unauthorized("Invalid credentials".to_string());
        let user = self.find_by_email(&email).await?.ok_or_else(invalid)?;
        if !verify_password(&payload.password, &user.password_hash) {
            tracing::warn!(user_id = %user.id, "login rejected");
            return Err(invalid());
        }
        Ok(user)
    }

    pub async fn me(&self, user_id: Uuid) -> Result<Option<MeUser>> {
        let row = sqlx::query_as::<_, (Uuid, String, Option<Uuid>, Option<String>, Option<String>)>(
            r#"
            SELECT u.id, u.email, p.id, p.name, p.avatar_url
            FROM users u
            LEFT JOIN profiles p ON p.user_id = u.id
            WHERE u.id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id, email, profile_id, name, avatar_url)| MeUser {
            id,
            email,
            profile: profile_id.map(|_| ProfileBrief { name, avatar_url }),
        }))
    }
}
