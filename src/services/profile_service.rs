use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::profile_dto::{ProfileDto, ProfileUserDto, UpdateProfilePayload};
use crate::error::{Error, Result};
use crate::models::profile::Profile;
use crate::models::user::User;
use crate::utils::validation::truncate_chars;

const PROFILE_COLUMNS: &str =
    "id, user_id, name, headline, location, bio, avatar_url, created_at, updated_at";

/// Per-field outcome of a profile PATCH: `None` leaves the column alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileChanges {
    pub name: Option<Option<String>>,
    pub headline: Option<Option<String>>,
    pub location: Option<Option<String>>,
    pub bio: Option<Option<String>>,
    pub avatar_url: Option<Option<String>>,
}

fn bounded(value: Option<String>, max_chars: usize) -> Option<Option<String>> {
    value.map(|v| Some(truncate_chars(&v, max_chars)).filter(|v| !v.is_empty()))
}

impl ProfileChanges {
    pub fn from_payload(payload: UpdateProfilePayload) -> Self {
        Self {
            name: bounded(payload.name, 80),
            headline: bounded(payload.headline, 120),
            location: bounded(payload.location, 80),
            bio: bounded(payload.bio, 280),
            avatar_url: payload
                .avatar_url
                .map(|url| url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty())),
        }
    }
}

#[derive(Clone)]
pub struct ProfileService {
    pool: PgPool,
}

impl ProfileService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, user_id: Uuid) -> Result<ProfileUserDto> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::Unauthorized("Unauthorized".to_string()))?;

        let sql = format!("SELECT {} FROM profiles WHERE user_id = $1", PROFILE_COLUMNS);
        let profile = sqlx::query_as::<_, Profile>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(ProfileUserDto {
            id: user.id,
            email: user.email,
            profile: profile.map(ProfileDto::from),
        })
    }

    /// Creates the profile on first edit; later edits only touch the fields
    /// present in the request.
    pub async fn update(&self, user_id: Uuid, payload: UpdateProfilePayload) -> Result<ProfileUserDto> {
        let changes = ProfileChanges::from_payload(payload);

        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, name, headline, location, bio, avatar_url)
            VALUES ($1, $2, $4, $6, $8, $10)
            ON CONFLICT (user_id) DO UPDATE SET
                name = CASE WHEN $3 THEN EXCLUDED.name ELSE profiles.name END,
                headline = CASE WHEN $5 THEN EXCLUDED.headline ELSE profiles.headline END,
                location = CASE WHEN $7 THEN EXCLUDED.location ELSE profiles.location END,
                bio = CASE WHEN $9 THEN EXCLUDED.bio ELSE profiles.bio END,
                avatar_url = CASE WHEN $11 THEN EXCLUDED.avatar_url ELSE profiles.avatar_url END,
                updated_at = NOW()
            "#,
        )
        .bind(user_id)
        .bind(changes.name.clone().flatten())
        .bind(changes.name.is_some())
        .bind(changes.headline.clone().flatten())
        .bind(changes.headline.is_some())
        .bind(changes.location.clone().flatten())
        .bind(changes.location.is_some())
        .bind(changes.bio.clone().flatten())
        .bind(changes.bio.is_some())
        .bind(changes.avatar_url.clone().flatten())
        .bind(changes.avatar_url.is_some())
        .execute(&self.pool)
        .await?;

        tracing::info!(%user_id, "profile updated");
        self.get(user_id).await
    }

    pub async fn set_avatar(&self, user_id: Uuid, avatar_url: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, avatar_url)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE SET avatar_url = EXCLUDED.avatar_url, updated_at = NOW()
            "#,
        )
        .bind(user_id)
        .bind(avatar_url)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_fields_are_left_alone() {
        let changes = ProfileChanges::from_payload(UpdateProfilePayload::default());
        assert_eq!(changes, ProfileChanges::default());
    }

    #[test]
    fn strings_are_trimmed_truncated_and_blank_cleared() {
        let payload = UpdateProfilePayload {
            name: Some(format!("  {}  ", "n".repeat(100))),
            headline: Some("   ".into()),
            bio: Some("Backend dev".into()),
            ..Default::default()
        };
        let changes = ProfileChanges::from_payload(payload);
        assert_eq!(changes.name, Some(Some("n".repeat(80))));
        assert_eq!(changes.headline, Some(None));
        assert_eq!(changes.bio, Some(Some("Backend dev".into())));
        assert_eq!(changes.location, None);
    }

    #[test]
    fn avatar_null_clears_and_string_sets() {
        let cleared = ProfileChanges::from_payload(UpdateProfilePayload {
            avatar_url: Some(None),
            ..Default::default()
        });
        assert_eq!(cleared.avatar_url, Some(None));

        let set = ProfileChanges::from_payload(UpdateProfilePayload {
            avatar_url: Some(Some(" /uploads/a.png ".into())),
            ..Default::default()
        });
        assert_eq!(set.avatar_url, Some(Some("/uploads/a.png".into())));
    }
}
