use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ApiError;

use super::dto::{CreateProfileRequest, UpdateProfileRequest};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FarmerProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub village: Option<String>,
    pub district: Option<String>,
    pub state: Option<String>,
    pub land_acres: Option<f64>,
    pub soil_type: Option<String>,
    pub crops: Vec<String>,
    pub irrigation: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl FarmerProfile {
    pub async fn find_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<FarmerProfile>> {
        let profile = sqlx::query_as::<_, FarmerProfile>(
            r#"
            SELECT id, user_id, village, district, state, land_acres,
                   soil_type, crops, irrigation, created_at, updated_at
            FROM farmer_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(profile)
    }

    /// Insert the user's profile. The UNIQUE constraint on `user_id` turns a
    /// duplicate create, including a concurrent one, into `ProfileExists`.
    pub async fn create(
        db: &PgPool,
        user_id: Uuid,
        req: &CreateProfileRequest,
    ) -> Result<FarmerProfile, ApiError> {
        sqlx::query_as::<_, FarmerProfile>(
            r#"
            INSERT INTO farmer_profiles
                (user_id, village, district, state, land_acres, soil_type, crops, irrigation)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, user_id, village, district, state, land_acres,
                      soil_type, crops, irrigation, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(&req.village)
        .bind(&req.district)
        .bind(&req.state)
        .bind(req.land_acres)
        .bind(&req.soil_type)
        .bind(&req.crops)
        .bind(&req.irrigation)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if e.as_database_error()
                .is_some_and(|db_err| db_err.is_unique_violation())
            {
                ApiError::ProfileExists
            } else {
                ApiError::from(anyhow::Error::new(e).context("insert farmer profile"))
            }
        })
    }

    /// Partial update: absent fields keep their stored value via COALESCE.
    /// Returns None when the user has no profile.
    pub async fn update(
        db: &PgPool,
        user_id: Uuid,
        req: &UpdateProfileRequest,
    ) -> anyhow::Result<Option<FarmerProfile>> {
        let profile = sqlx::query_as::<_, FarmerProfile>(
            r#"
            UPDATE farmer_profiles SET
                village    = COALESCE($2, village),
                district   = COALESCE($3, district),
                state      = COALESCE($4, state),
                land_acres = COALESCE($5, land_acres),
                soil_type  = COALESCE($6, soil_type),
                crops      = COALESCE($7, crops),
                irrigation = COALESCE($8, irrigation),
                updated_at = now()
            WHERE user_id = $1
            RETURNING id, user_id, village, district, state, land_acres,
                      soil_type, crops, irrigation, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(&req.village)
        .bind(&req.district)
        .bind(&req.state)
        .bind(req.land_acres)
        .bind(&req.soil_type)
        .bind(&req.crops)
        .bind(&req.irrigation)
        .fetch_optional(db)
        .await?;
        Ok(profile)
    }

    /// Returns false when there was nothing to delete.
    pub async fn delete(db: &PgPool, user_id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM farmer_profiles WHERE user_id = $1")
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
