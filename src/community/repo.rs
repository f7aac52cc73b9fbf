use std::collections::HashMap;

use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub author_name: String,
    pub title: String,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Reply {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub author_name: String,
    pub message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// A post with its replies inlined, the shape `/community/all` serves.
#[derive(Debug, Clone, Serialize)]
pub struct PostWithReplies {
    #[serde(flatten)]
    pub post: Post,
    pub replies: Vec<Reply>,
}

pub async fn insert_post(
    db: &PgPool,
    user_id: Uuid,
    author_name: &str,
    title: &str,
    content: &str,
) -> anyhow::Result<Uuid> {
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO community_posts (user_id, author_name, title, content)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(author_name)
    .bind(title)
    .bind(content)
    .fetch_one(db)
    .await?;
    Ok(id)
}

/// The newest `limit` posts, each carrying its replies oldest first.
/// Two queries instead of a join so a reply burst on one post cannot
/// multiply the post rows.
pub async fn recent_posts_with_replies(
    db: &PgPool,
    limit: i64,
) -> anyhow::Result<Vec<PostWithReplies>> {
    let posts = sqlx::query_as::<_, Post>(
        r#"
        SELECT id, user_id, author_name, title, content, created_at
        FROM community_posts
        ORDER BY created_at DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(db)
    .await?;

    let post_ids: Vec<Uuid> = posts.iter().map(|p| p.id).collect();
    let replies = sqlx::query_as::<_, Reply>(
        r#"
        SELECT id, post_id, user_id, author_name, message, created_at
        FROM community_replies
        WHERE post_id = ANY($1)
        ORDER BY created_at ASC
        "#,
    )
    .bind(&post_ids)
    .fetch_all(db)
    .await?;

    Ok(group_replies(posts, replies))
}

fn group_replies(posts: Vec<Post>, replies: Vec<Reply>) -> Vec<PostWithReplies> {
    let mut by_post: HashMap<Uuid, Vec<Reply>> = HashMap::new();
    for reply in replies {
        by_post.entry(reply.post_id).or_default().push(reply);
    }
    posts
        .into_iter()
        .map(|post| {
            let replies = by_post.remove(&post.id).unwrap_or_default();
            PostWithReplies { post, replies }
        })
        .collect()
}

pub async fn post_exists(db: &PgPool, post_id: Uuid) -> anyhow::Result<bool> {
    let (exists,): (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM community_posts WHERE id = $1)")
            .bind(post_id)
            .fetch_one(db)
            .await?;
    Ok(exists)
}

pub async fn insert_reply(
    db: &PgPool,
    post_id: Uuid,
    user_id: Uuid,
    author_name: &str,
    message: &str,
) -> anyhow::Result<Uuid> {
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO community_replies (post_id, user_id, author_name, message)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(post_id)
    .bind(user_id)
    .bind(author_name)
    .bind(message)
    .fetch_one(db)
    .await?;
    Ok(id)
}
