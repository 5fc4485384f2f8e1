use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tokio::fs;
use uuid::Uuid;

use crate::error::{Error, Result};

pub const MAX_AVATAR_BYTES: usize = 2 * 1024 * 1024;

/// File extension for an accepted avatar content type.
pub fn avatar_extension(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/png" => Some("png"),
        "image/jpeg" => Some("jpg"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

pub fn check_avatar(content_type: &str, size: usize) -> Result<&'static str> {
    let ext = avatar_extension(content_type)
        .ok_or_else(|| Error::BadRequest("Only PNG/JPG/WEBP allowed".to_string()))?;
    if size > MAX_AVATAR_BYTES {
        return Err(Error::BadRequest("Max file size is 2MB".to_string()));
    }
    Ok(ext)
}

/// Object store for avatar images, backed by a directory that is served
/// publicly under `/uploads`.
#[derive(Clone, Debug)]
pub struct AvatarStore {
    root: PathBuf,
    public_base_url: String,
}

impl AvatarStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into(),
        }
    }

    pub fn object_key(user_id: Uuid, at: DateTime<Utc>, ext: &str) -> String {
        format!("avatars/{}/{}.{}", user_id, at.timestamp_millis(), ext)
    }

    pub fn public_url(&self, key: &str) -> String {
        format!("{}/uploads/{}", self.public_base_url, key)
    }

    /// Writes the object (replacing any with the same key) and returns its
    /// public URL.
    pub async fn put(&self, key: &str, data: &[u8]) -> Result<String> {
        let path = self.root.join(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::Storage(e.to_string()))?;
        }
        fs::write(&path, data).await.map_err(|e| {
            tracing::error!("Failed to write avatar {}: {}", path.display(), e);
            Error::Storage(e.to_string())
        })?;
        Ok(self.public_url(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn only_png_jpeg_webp_under_two_megabytes() {
        assert_eq!(check_avatar("image/png", 10).unwrap(), "png");
        assert_eq!(check_avatar("image/jpeg", MAX_AVATAR_BYTES).unwrap(), "jpg");
        assert_eq!(check_avatar("image/webp", 1).unwrap(), "webp");
        assert!(check_avatar("image/gif", 10).is_err());
        assert!(check_avatar("image/png", MAX_AVATAR_BYTES + 1).is_err());
    }

    #[test]
    fn keys_are_per_user_and_timestamped() {
        let user = Uuid::nil();
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let key = AvatarStore::object_key(user, at, "png");
        assert_eq!(
            key,
            format!("avatars/{}/{}.png", user, at.timestamp_millis())
        );
        let store = AvatarStore::new("/tmp/x", "https://cdn.example");
        assert_eq!(store.public_url(&key), format!("https://cdn.example/uploads/{}", key));
    }

    #[tokio::test]
    async fn put_writes_under_root() {
        let root = std::env::temp_dir().join(format!("avatar-store-{}", Uuid::new_v4()));
        let store = AvatarStore::new(&root, "");
        let url = store.put("avatars/u/1.png", b"\x89PNG").await.unwrap();
        assert_eq!(url, "/uploads/avatars/u/1.png");
        let written = tokio::fs::read(root.join("avatars/u/1.png")).await.unwrap();
        assert_eq!(written, b"\x89PNG");
        let _ = tokio::fs::remove_dir_all(&root).await;
    }
}
