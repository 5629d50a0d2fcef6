use chrono::{DateTime, Utc};
use sqlx::query_builder::Separated;
use sqlx::{FromRow, Postgres, QueryBuilder};

use crate::repositories::base_repository::{Entity, QueryFilter, Relation, SortKey};

/// Like edge. At most one like per (user, post) pair.
#[derive(Clone, Debug, PartialEq, FromRow)]
pub struct PostLike {
    pub id: i32,
    pub user_id: i32,
    pub post_id: i32,
    pub created_at: DateTime<Utc>,
}

impl Entity for PostLike {
    type Id = i32;
    type Filter = PostLikeFilter;
    type Relation = PostLikeRelation;
    type SortKey = PostLikeSort;

    const TABLE: &'static str = "social.post_likes";
    const ALIAS: &'static str = "pl";
    const INSERT_COLUMNS: &'static [&'static str] = &["user_id", "post_id", "created_at"];

    fn id(&self) -> i32 {
        self.id
    }

    fn push_insert_values(&self, values: &mut Separated<'_, '_, Postgres, &'static str>) {
        values
            .push_bind(self.user_id)
            .push_bind(self.post_id)
            .push_bind(self.created_at);
    }

    fn push_update_assignments(&self, assignments: &mut Separated<'_, '_, Postgres, &'static str>) {
        assignments.push("user_id = ");
        assignments.push_bind_unseparated(self.user_id);
        assignments.push("post_id = ");
        assignments.push_bind_unseparated(self.post_id);
    }
}

pub enum PostLikeFilter {
    /// One user's likes restricted to the given posts. Used to batch
    /// is-liked checks over a post listing.
    ByUserAmongPosts { user_id: i32, post_ids: Vec<i32> },
}

impl QueryFilter for PostLikeFilter {
    fn push_where(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        match self {
            PostLikeFilter::ByUserAmongPosts { user_id, post_ids } => {
                qb.push("pl.user_id = ").push_bind(*user_id);
                qb.push(" AND pl.post_id = ANY(").push_bind(post_ids.clone());
                qb.push(")");
            }
        }
    }
}

#[derive(Clone, Copy)]
pub enum PostLikeRelation {}

impl Relation for PostLikeRelation {
    fn select_expr(&self) -> &'static str {
        match *self {}
    }

    fn join_clause(&self) -> &'static str {
        match *self {}
    }
}

#[derive(Clone, Copy)]
pub enum PostLikeSort {
    CreatedAt,
}

impl SortKey for PostLikeSort {
    fn column(&self) -> &'static str {
        match self {
            PostLikeSort::CreatedAt => "pl.created_at",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_like_filter_renders_an_any_clause() {
        let mut qb: QueryBuilder<'static, Postgres> = QueryBuilder::new("");
        PostLikeFilter::ByUserAmongPosts {
            user_id: 4,
            post_ids: vec![10, 11],
        }
        .push_where(&mut qb);
        assert_eq!(qb.sql(), "pl.user_id = $1 AND pl.post_id = ANY($2)");
    }
}
