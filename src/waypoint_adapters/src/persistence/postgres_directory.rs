use sqlx::{PgPool, Pool, Postgres, Row, postgres::PgRow};
use uuid::Uuid;
use waypoint_core::{
    DirectoryError, Email, ProfileDirectory, UniqueKey, UserId, UserProfile, Username,
};

/// Profile directory on PostgreSQL.
///
/// The reservation insert uses `ON CONFLICT DO NOTHING` against the
/// primary key, so claim-or-observe is a single atomic statement.
#[derive(Clone)]
pub struct PostgresDirectory {
    pool: PgPool,
}

impl PostgresDirectory {
    pub fn new(pool: Pool<Postgres>) -> Self {
        PostgresDirectory { pool }
    }

    /// Run the embedded schema migrations.
    pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(pool).await
    }
}

#[async_trait::async_trait]
impl ProfileDirectory for PostgresDirectory {
    #[tracing::instrument(name = "Reserving unique key in PostgreSQL", skip_all, fields(key = %key))]
    async fn put_unique_if_absent(
        &self,
        key: &UniqueKey,
        owner: &UserId,
    ) -> Result<(), DirectoryError> {
        let result = sqlx::query(
            r#"
                INSERT INTO uniqueness_records (storage_key, owner_id, status)
                VALUES ($1, $2, 'claimed')
                ON CONFLICT (storage_key) DO NOTHING
            "#,
        )
        .bind(key.storage_key())
        .bind(owner.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| DirectoryError::UnexpectedError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(DirectoryError::AlreadyExists);
        }
        Ok(())
    }

    #[tracing::instrument(name = "Releasing unique key in PostgreSQL", skip_all, fields(key = %key))]
    async fn delete_unique(&self, key: &UniqueKey) -> Result<(), DirectoryError> {
        let result = sqlx::query(
            r#"
                DELETE FROM uniqueness_records
                WHERE storage_key = $1
            "#,
        )
        .bind(key.storage_key())
        .execute(&self.pool)
        .await
        .map_err(|e| DirectoryError::UnexpectedError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(DirectoryError::NotFound);
        }
        Ok(())
    }

    #[tracing::instrument(name = "Flagging reservation as pending", skip_all, fields(key = %key))]
    async fn mark_pending_profile(&self, key: &UniqueKey) -> Result<(), DirectoryError> {
        let result = sqlx::query(
            r#"
                UPDATE uniqueness_records
                SET status = 'pending_profile'
                WHERE storage_key = $1
            "#,
        )
        .bind(key.storage_key())
        .execute(&self.pool)
        .await
        .map_err(|e| DirectoryError::UnexpectedError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(DirectoryError::NotFound);
        }
        Ok(())
    }

    #[tracing::instrument(name = "Writing profile to PostgreSQL", skip_all, fields(user_id = %profile.user_id))]
    async fn put_profile(&self, profile: UserProfile) -> Result<(), DirectoryError> {
        // Upsert keyed by user id keeps the retry path idempotent.
        sqlx::query(
            r#"
                INSERT INTO profiles (
                    user_id, email, username, display_name, bio, photo_url,
                    credits, created_at, follower_count, following_count,
                    trip_count, verified
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                ON CONFLICT (user_id) DO UPDATE SET
                    email = EXCLUDED.email,
                    username = EXCLUDED.username,
                    display_name = EXCLUDED.display_name,
                    bio = EXCLUDED.bio,
                    photo_url = EXCLUDED.photo_url,
                    credits = EXCLUDED.credits,
                    follower_count = EXCLUDED.follower_count,
                    following_count = EXCLUDED.following_count,
                    trip_count = EXCLUDED.trip_count,
                    verified = EXCLUDED.verified
            "#,
        )
        .bind(profile.user_id.as_uuid())
        .bind(&profile.email)
        .bind(&profile.username)
        .bind(&profile.display_name)
        .bind(&profile.bio)
        .bind(&profile.photo_url)
        .bind(profile.credits)
        .bind(profile.created_at)
        .bind(profile.follower_count)
        .bind(profile.following_count)
        .bind(profile.trip_count)
        .bind(profile.verified)
        .execute(&self.pool)
        .await
        .map_err(|e| DirectoryError::UnexpectedError(e.to_string()))?;

        Ok(())
    }

    #[tracing::instrument(name = "Reading profile from PostgreSQL", skip_all, fields(user_id = %user_id))]
    async fn get_profile(&self, user_id: &UserId) -> Result<UserProfile, DirectoryError> {
        let row = sqlx::query(
            r#"
                SELECT user_id, email, username, display_name, bio, photo_url,
                       credits, created_at, follower_count, following_count,
                       trip_count, verified
                FROM profiles
                WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DirectoryError::UnexpectedError(e.to_string()))?;

        let Some(row) = row else {
            return Err(DirectoryError::NotFound);
        };

        profile_from_row(&row).map_err(|e| DirectoryError::UnexpectedError(e.to_string()))
    }

    #[tracing::instrument(name = "Looking up profile by email", skip_all)]
    async fn get_profile_by_email(&self, email: &Email) -> Result<UserProfile, DirectoryError> {
        let row = sqlx::query(
            r#"
                SELECT user_id, email, username, display_name, bio, photo_url,
                       credits, created_at, follower_count, following_count,
                       trip_count, verified
                FROM profiles
                WHERE email = $1
            "#,
        )
        .bind(email.normalized())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DirectoryError::UnexpectedError(e.to_string()))?;

        let Some(row) = row else {
            return Err(DirectoryError::NotFound);
        };

        profile_from_row(&row).map_err(|e| DirectoryError::UnexpectedError(e.to_string()))
    }

    #[tracing::instrument(name = "Looking up profile by username", skip_all)]
    async fn get_profile_by_username(
        &self,
        username: &Username,
    ) -> Result<UserProfile, DirectoryError> {
        let row = sqlx::query(
            r#"
                SELECT user_id, email, username, display_name, bio, photo_url,
                       credits, created_at, follower_count, following_count,
                       trip_count, verified
                FROM profiles
                WHERE username = $1
            "#,
        )
        .bind(username.normalized())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DirectoryError::UnexpectedError(e.to_string()))?;

        let Some(row) = row else {
            return Err(DirectoryError::NotFound);
        };

        profile_from_row(&row).map_err(|e| DirectoryError::UnexpectedError(e.to_string()))
    }
}

fn profile_from_row(row: &PgRow) -> Result<UserProfile, sqlx::Error> {
    Ok(UserProfile {
        user_id: UserId::from(row.try_get::<Uuid, _>("user_id")?),
        email: row.try_get("email")?,
        username: row.try_get("username")?,
        display_name: row.try_get("display_name")?,
        bio: row.try_get("bio")?,
        photo_url: row.try_get("photo_url")?,
        credits: row.try_get("credits")?,
        created_at: row.try_get("created_at")?,
        follower_count: row.try_get("follower_count")?,
        following_count: row.try_get("following_count")?,
        trip_count: row.try_get("trip_count")?,
        verified: row.try_get("verified")?,
    })
}
