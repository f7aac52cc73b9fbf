use std::collections::HashSet;

use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::dto::SchemeInput;
use super::sync::PortalScheme;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Scheme {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub department: Option<String>,
    pub eligibility: Option<String>,
    pub link: Option<String>,
    pub active: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_synced: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

pub async fn list_schemes(db: &PgPool, limit: i64) -> anyhow::Result<Vec<Scheme>> {
    let schemes = sqlx::query_as::<_, Scheme>(
        r#"
        SELECT id, title, description, department, eligibility, link,
               active, last_synced, created_at
        FROM gov_schemes
        ORDER BY created_at DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(db)
    .await?;
    Ok(schemes)
}

pub async fn insert_scheme(db: &PgPool, input: &SchemeInput) -> anyhow::Result<Uuid> {
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO gov_schemes (title, description, department, eligibility, link)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(&input.title)
    .bind(&input.description)
    .bind(&input.department)
    .bind(&input.eligibility)
    .bind(&input.link)
    .fetch_one(db)
    .await?;
    Ok(id)
}

/// Titles already in the table, the dedupe key for portal sync.
pub async fn existing_titles(db: &PgPool, limit: i64) -> anyhow::Result<HashSet<String>> {
    let rows: Vec<(String,)> = sqlx::query_as("SELECT title FROM gov_schemes LIMIT $1")
        .bind(limit)
        .fetch_all(db)
        .await?;
    Ok(rows.into_iter().map(|(t,)| t).collect())
}

/// Insert a portal-fetched scheme, stamping `last_synced`.
pub async fn insert_synced(db: &PgPool, scheme: &PortalScheme) -> anyhow::Result<Uuid> {
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO gov_schemes (title, description, link, last_synced)
        VALUES ($1, $2, $3, now())
        RETURNING id
        "#,
    )
    .bind(&scheme.title)
    .bind(&scheme.description)
    .bind(&scheme.link)
    .fetch_one(db)
    .await?;
    Ok(id)
}
