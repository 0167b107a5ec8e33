//! Owner-scoped bookmark store.
//!
//! Every query filters by the owning user id in SQL itself. Handlers never
//! fetch a row first and check ownership afterwards, so a guessed id cannot
//! leak whether another user's bookmark exists.

use chrono::Utc;

use crate::db::{Bookmark, DbPool};

pub async fn insert(
    pool: &DbPool,
    user_id: i64,
    url: &str,
    title: &str,
    favicon: &str,
    summary: &str,
) -> sqlx::Result<Bookmark> {
    let now = Utc::now().to_rfc3339();
    let result = sqlx::query(
        "INSERT INTO bookmarks (user_id, url, title, favicon, summary, created_at) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(user_id)
    .bind(url)
    .bind(title)
    .bind(favicon)
    .bind(summary)
    .bind(&now)
    .execute(pool)
    .await?;

    // Re-read so the caller sees the row exactly as stored, including the
    // server-assigned id and timestamp
    sqlx::query_as("SELECT * FROM bookmarks WHERE id = ?")
        .bind(result.last_insert_rowid())
        .fetch_one(pool)
        .await
}

/// Most recent first. The id tiebreak keeps insertion order stable when two
/// rows share a timestamp.
pub async fn list_for_user(pool: &DbPool, user_id: i64) -> sqlx::Result<Vec<Bookmark>> {
    sqlx::query_as("SELECT * FROM bookmarks WHERE user_id = ? ORDER BY created_at DESC, id DESC")
        .bind(user_id)
        .fetch_all(pool)
        .await
}

/// Deletes only a row owned by `user_id`. Returns false when nothing
/// matched, whether the id does not exist or belongs to someone else.
pub async fn delete_one(pool: &DbPool, user_id: i64, bookmark_id: i64) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM bookmarks WHERE id = ? AND user_id = ?")
        .bind(bookmark_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{test_pool, users};

    async fn two_users(pool: &DbPool) -> (i64, i64) {
        let a = users::create(pool, "a@x.com", "hash").await.unwrap();
        let b = users::create(pool, "b@x.com", "hash").await.unwrap();
        (a.id, b.id)
    }

    #[tokio::test]
    async fn insert_returns_persisted_row() {
        let pool = test_pool().await;
        let (a, _) = two_users(&pool).await;

        let bookmark = insert(&pool, a, "http://example.com", "Example", "fav", "sum")
            .await
            .unwrap();
        assert!(bookmark.id > 0);
        assert_eq!(bookmark.user_id, a);
        assert_eq!(bookmark.url, "http://example.com");
        assert!(!bookmark.created_at.is_empty());
    }

    #[tokio::test]
    async fn listing_is_scoped_to_owner() {
        let pool = test_pool().await;
        let (a, b) = two_users(&pool).await;

        insert(&pool, a, "http://one.test", "t", "f", "s").await.unwrap();
        insert(&pool, b, "http://two.test", "t", "f", "s").await.unwrap();
        insert(&pool, a, "http://three.test", "t", "f", "s").await.unwrap();

        let for_a = list_for_user(&pool, a).await.unwrap();
        assert_eq!(for_a.len(), 2);
        assert!(for_a.iter().all(|bm| bm.user_id == a));

        let for_b = list_for_user(&pool, b).await.unwrap();
        assert_eq!(for_b.len(), 1);
        assert_eq!(for_b[0].url, "http://two.test");
    }

    #[tokio::test]
    async fn listing_orders_most_recent_first() {
        let pool = test_pool().await;
        let (a, _) = two_users(&pool).await;

        let first = insert(&pool, a, "http://first.test", "t", "f", "s").await.unwrap();
        let second = insert(&pool, a, "http://second.test", "t", "f", "s").await.unwrap();
        let third = insert(&pool, a, "http://third.test", "t", "f", "s").await.unwrap();

        let listed = list_for_user(&pool, a).await.unwrap();
        let ids: Vec<i64> = listed.iter().map(|bm| bm.id).collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);
    }

    #[tokio::test]
    async fn delete_is_scoped_to_owner() {
        let pool = test_pool().await;
        let (a, b) = two_users(&pool).await;

        let bookmark = insert(&pool, a, "http://one.test", "t", "f", "s").await.unwrap();

        // Someone else's id behaves exactly like a nonexistent id
        assert!(!delete_one(&pool, b, bookmark.id).await.unwrap());
        assert!(!delete_one(&pool, a, 9999).await.unwrap());
        assert_eq!(list_for_user(&pool, a).await.unwrap().len(), 1);

        assert!(delete_one(&pool, a, bookmark.id).await.unwrap());
        assert!(!delete_one(&pool, a, bookmark.id).await.unwrap());
        assert!(list_for_user(&pool, a).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_user_cascades_to_bookmarks() {
        let pool = test_pool().await;
        let (a, _) = two_users(&pool).await;

        insert(&pool, a, "http://one.test", "t", "f", "s").await.unwrap();

        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(a)
            .execute(&pool)
            .await
            .unwrap();

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bookmarks WHERE user_id = ?")
            .bind(a)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(remaining, 0);
    }
}
