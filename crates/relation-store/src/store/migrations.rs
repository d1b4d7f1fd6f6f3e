use super::RelationStore;
use crate::error::Result;

impl RelationStore {
    // ── Migrations ──────────────────────────────────────────────

    pub(crate) async fn run_migrations(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS profiles (
                id          TEXT PRIMARY KEY,
                name        TEXT NOT NULL,
                company     TEXT,
                role        TEXT,
                intro       TEXT,
                work        TEXT,
                hobby       TEXT,
                tags        TEXT NOT NULL DEFAULT '[]',
                avatar_url  TEXT,
                external_id TEXT,
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_profiles_updated ON profiles(updated_at)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_profiles_external ON profiles(external_id)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS likes (
                liker_id   TEXT NOT NULL,
                likee_id   TEXT NOT NULL,
                created_at TEXT NOT NULL,
                PRIMARY KEY (liker_id, likee_id)
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_likes_likee ON likes(likee_id)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS profile_embeddings (
                profile_id      TEXT PRIMARY KEY REFERENCES profiles(id) ON DELETE CASCADE,
                embedding       TEXT,
                work_embedding  TEXT,
                hobby_embedding TEXT,
                updated_at      TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_embeddings_updated
             ON profile_embeddings(updated_at)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS intro_cluster_cache (
                id                TEXT PRIMARY KEY,
                clusters          TEXT NOT NULL,
                meta              TEXT NOT NULL,
                source_updated_at TEXT,
                updated_at        TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        // ── Quiz mirror ──────────────────────────────────────────
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS quiz_sessions (
                id               TEXT PRIMARY KEY,
                deck_version     TEXT NOT NULL,
                question_count   INTEGER NOT NULL,
                participant_name TEXT NOT NULL,
                external_id      TEXT,
                status           TEXT NOT NULL DEFAULT 'in_progress',
                profile_code     TEXT,
                archetype_id     TEXT,
                dimension_scores TEXT,
                answer_vector    TEXT,
                created_at       TEXT NOT NULL,
                updated_at       TEXT NOT NULL,
                completed_at     TEXT
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS quiz_answers (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id   TEXT NOT NULL REFERENCES quiz_sessions(id) ON DELETE CASCADE,
                question_id  TEXT NOT NULL,
                answer_value INTEGER NOT NULL,
                duration_ms  INTEGER NOT NULL,
                dimension    TEXT NOT NULL,
                polarity     INTEGER NOT NULL,
                weight       REAL NOT NULL,
                recorded_at  TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_quiz_answers_session
             ON quiz_answers(session_id, id)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS quiz_analytics (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                event_type      TEXT NOT NULL,
                session_id      TEXT NOT NULL,
                user_id         TEXT,
                question_id     TEXT,
                answer          TEXT,
                response_ms     INTEGER,
                swipe_direction TEXT,
                drop_position_x REAL,
                drop_position_y REAL,
                timestamp       TEXT NOT NULL,
                metadata        TEXT NOT NULL DEFAULT '{}',
                created_at      TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_quiz_analytics_session
             ON quiz_analytics(session_id, event_type)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
