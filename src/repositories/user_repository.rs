use std::ops::Deref;
use std::sync::Arc;

use sqlx::PgPool;

use crate::models::users::User;
use crate::repositories::base_repository::PgRepository;
use crate::repositories::paged_list::{Page, PagedList};

/// User repository: the generic CRUD surface plus a name-search operation.
pub struct UserRepository {
    db: Arc<PgPool>,
    base: PgRepository<User>,
}

impl UserRepository {
    pub fn new(db: Arc<PgPool>) -> Self {
        UserRepository {
            base: PgRepository::new(db.clone()),
            db,
        }
    }

    /// Paged name match, excluding the searching user from the results.
    pub async fn search(
        &self,
        query: &str,
        page: &Page,
        excluding_user_id: i32,
    ) -> Result<PagedList<User>, sqlx::Error> {
        let pattern = like_pattern(query);

        let total_count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM social.users u
            WHERE u.id <> $1
              AND (u.first_name || ' ' || u.last_name) ILIKE $2
            "#,
        )
        .bind(excluding_user_id)
        .bind(&pattern)
        .fetch_one(self.db.as_ref())
        .await?;

        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT u.*
            FROM social.users u
            WHERE u.id <> $1
              AND (u.first_name || ' ' || u.last_name) ILIKE $2
            ORDER BY u.last_name, u.first_name
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(excluding_user_id)
        .bind(&pattern)
        .bind(page.size as i64)
        .bind(page.offset())
        .fetch_all(self.db.as_ref())
        .await?;

        Ok(PagedList::new(users, total_count, page))
    }
}

impl Deref for UserRepository {
    type Target = PgRepository<User>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

fn like_pattern(query: &str) -> String {
    format!("%{}%", query.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_is_a_trimmed_contains_match() {
        assert_eq!(like_pattern("ada"), "%ada%");
        assert_eq!(like_pattern("  ada lovelace "), "%ada lovelace%");
        assert_eq!(like_pattern(""), "%%");
    }
}
