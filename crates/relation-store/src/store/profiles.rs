use super::{parse_ts, ts, RelationStore};
use crate::error::{Error, Result};
use crate::types::{NewProfile, Profile, ProfilePatch};
use chrono::Utc;
use sqlx::Row;
use std::collections::HashMap;
use tracing::debug;

const PROFILE_COLUMNS: &str = "p.id, p.name, p.company, p.role, p.intro, p.work, p.hobby, \
     p.tags, p.avatar_url, p.external_id, p.created_at, p.updated_at";

impl RelationStore {
    // ── Profiles ────────────────────────────────────────────────

    /// All profiles, most recently updated first.
    pub async fn list_profiles(&self) -> Result<Vec<Profile>> {
        let rows = sqlx::query(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles p ORDER BY p.updated_at DESC, p.id"
        ))
        .fetch_all(&self.pool)
        .await?;

        let mut profiles = rows
            .iter()
            .map(Self::row_to_profile)
            .collect::<Result<Vec<_>>>()?;
        self.attach_likes(&mut profiles).await?;
        Ok(profiles)
    }

    /// Get a profile by ID.
    pub async fn get_profile(&self, id: &str) -> Result<Option<Profile>> {
        let row = sqlx::query(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles p WHERE p.id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(mut profile) = row.as_ref().map(Self::row_to_profile).transpose()? else {
            return Ok(None);
        };
        profile.liked_by = self.likers_of(&profile.id).await?;
        Ok(Some(profile))
    }

    /// Profile owned by an external auth id.
    pub async fn find_profile_by_external_id(&self, external_id: &str) -> Result<Option<Profile>> {
        let id: Option<String> =
            sqlx::query_scalar("SELECT id FROM profiles WHERE external_id = ?1 LIMIT 1")
                .bind(external_id)
                .fetch_optional(&self.pool)
                .await?;
        match id {
            Some(id) => self.get_profile(&id).await,
            None => Ok(None),
        }
    }

    /// Most recently updated profile whose name matches exactly.
    pub async fn find_profile_by_name(&self, name: &str) -> Result<Option<Profile>> {
        let id: Option<String> = sqlx::query_scalar(
            "SELECT id FROM profiles WHERE name = ?1 ORDER BY updated_at DESC LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        match id {
            Some(id) => self.get_profile(&id).await,
            None => Ok(None),
        }
    }

    /// Insert a profile. The name must not be blank.
    pub async fn create_profile(&self, new: &NewProfile) -> Result<Profile> {
        let name = new.name.trim();
        if name.is_empty() {
            return Err(Error::Validation("name is required".to_string()));
        }

        let id = uuid::Uuid::new_v4().to_string();
        let now = ts(&Utc::now());
        sqlx::query(
            "INSERT INTO profiles
             (id, name, company, role, intro, work, hobby, tags, avatar_url, external_id,
              created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
        )
        .bind(&id)
        .bind(name)
        .bind(&new.company)
        .bind(&new.role)
        .bind(&new.intro)
        .bind(&new.work)
        .bind(&new.hobby)
        .bind(serde_json::to_string(&new.tags)?)
        .bind(&new.avatar_url)
        .bind(&new.external_id)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        debug!(profile_id = %id, "Profile created");
        self.get_profile(&id)
            .await?
            .ok_or_else(|| Error::Internal(format!("profile {id} vanished after insert")))
    }

    /// Apply a partial update and bump `updated_at`. `None` if the id is unknown.
    pub async fn update_profile(&self, id: &str, patch: &ProfilePatch) -> Result<Option<Profile>> {
        if patch.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(Error::Validation("name must not be blank".to_string()));
        }
        let tags = patch.tags.as_ref().map(serde_json::to_string).transpose()?;

        let result = sqlx::query(
            "UPDATE profiles SET
                name        = COALESCE(?2, name),
                company     = COALESCE(?3, company),
                role        = COALESCE(?4, role),
                intro       = COALESCE(?5, intro),
                work        = COALESCE(?6, work),
                hobby       = COALESCE(?7, hobby),
                tags        = COALESCE(?8, tags),
                avatar_url  = COALESCE(?9, avatar_url),
                external_id = COALESCE(?10, external_id),
                updated_at  = ?11
             WHERE id = ?1",
        )
        .bind(id)
        .bind(patch.name.as_deref().map(str::trim))
        .bind(&patch.company)
        .bind(&patch.role)
        .bind(&patch.intro)
        .bind(&patch.work)
        .bind(&patch.hobby)
        .bind(tags)
        .bind(&patch.avatar_url)
        .bind(&patch.external_id)
        .bind(ts(&Utc::now()))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_profile(id).await
    }

    /// Number of stored profiles.
    pub async fn profile_count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profiles")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    /// Profiles with a non-blank intro that still need an intro embedding,
    /// newest first. With `force` every profile with an intro qualifies.
    ///
    /// `liked_by` is left empty on the returned profiles.
    pub async fn profiles_for_intro_backfill(&self, force: bool) -> Result<Vec<Profile>> {
        let rows = sqlx::query(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles p
             LEFT JOIN profile_embeddings e ON e.profile_id = p.id
             WHERE p.intro IS NOT NULL AND TRIM(p.intro) != ''
               AND (?1 OR e.embedding IS NULL)
             ORDER BY p.updated_at DESC, p.id"
        ))
        .bind(force)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_profile).collect()
    }

    async fn attach_likes(&self, profiles: &mut [Profile]) -> Result<()> {
        if profiles.is_empty() {
            return Ok(());
        }
        let rows = sqlx::query("SELECT liker_id, likee_id FROM likes ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;

        let mut by_likee: HashMap<String, Vec<String>> = HashMap::new();
        for row in &rows {
            by_likee
                .entry(row.try_get("likee_id")?)
                .or_default()
                .push(row.try_get("liker_id")?);
        }
        for profile in profiles {
            profile.liked_by = by_likee.remove(&profile.id).unwrap_or_default();
        }
        Ok(())
    }

    pub(crate) fn row_to_profile(row: &sqlx::sqlite::SqliteRow) -> Result<Profile> {
        let tags_json: String = row.try_get("tags")?;
        let created_str: String = row.try_get("created_at")?;
        let updated_str: String = row.try_get("updated_at")?;
        Ok(Profile {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            company: row.try_get("company")?,
            role: row.try_get("role")?,
            intro: row.try_get("intro")?,
            work: row.try_get("work")?,
            hobby: row.try_get("hobby")?,
            tags: serde_json::from_str(&tags_json).unwrap_or_default(),
            avatar_url: row.try_get("avatar_url")?,
            external_id: row.try_get("external_id")?,
            liked_by: Vec::new(),
            created_at: parse_ts(&created_str),
            updated_at: parse_ts(&updated_str),
        })
    }
}
