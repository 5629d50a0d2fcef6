use chrono::{DateTime, Utc};
use sqlx::query_builder::Separated;
use sqlx::types::Json;
use sqlx::{FromRow, Postgres, QueryBuilder};

use crate::models::users::User;
use crate::repositories::base_repository::{Entity, QueryFilter, Relation, SortKey};

/// Directed follow edge. At most one edge per ordered pair; self-edges are
/// rejected by the service and by the table constraints.
#[derive(Clone, Debug, PartialEq, FromRow)]
pub struct Follow {
    pub id: i32,
    pub follower_id: i32,
    pub following_id: i32,
    pub created_at: DateTime<Utc>,
    /// Populated only when the `Follower` relation is requested.
    #[sqlx(default)]
    pub follower: Option<Json<User>>,
    /// Populated only when the `Following` relation is requested.
    #[sqlx(default)]
    pub following: Option<Json<User>>,
}

impl Follow {
    pub fn new(follower_id: i32, following_id: i32) -> Self {
        Follow {
            id: 0,
            follower_id,
            following_id,
            created_at: Utc::now(),
            follower: None,
            following: None,
        }
    }
}

impl Entity for Follow {
    type Id = i32;
    type Filter = FollowFilter;
    type Relation = FollowRelation;
    type SortKey = FollowSort;

    const TABLE: &'static str = "social.follows";
    const ALIAS: &'static str = "uf";
    const INSERT_COLUMNS: &'static [&'static str] = &["follower_id", "following_id", "created_at"];

    fn id(&self) -> i32 {
        self.id
    }

    fn push_insert_values(&self, values: &mut Separated<'_, '_, Postgres, &'static str>) {
        values
            .push_bind(self.follower_id)
            .push_bind(self.following_id)
            .push_bind(self.created_at);
    }

    fn push_update_assignments(&self, assignments: &mut Separated<'_, '_, Postgres, &'static str>) {
        assignments.push("follower_id = ");
        assignments.push_bind_unseparated(self.follower_id);
        assignments.push("following_id = ");
        assignments.push_bind_unseparated(self.following_id);
    }
}

pub enum FollowFilter {
    /// The single edge follower -> following.
    Edge { follower_id: i32, following_id: i32 },
    /// Edges pointing into a user: their followers.
    FollowersOf(i32),
    /// Edges going out of a user: who they follow.
    FollowingOf(i32),
    /// Edges from one follower into any of the given users. Used to batch
    /// is-following checks over a listing page.
    FollowedByAmong {
        follower_id: i32,
        following_ids: Vec<i32>,
    },
}

impl QueryFilter for FollowFilter {
    fn push_where(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        match self {
            FollowFilter::Edge {
                follower_id,
                following_id,
            } => {
                qb.push("uf.follower_id = ").push_bind(*follower_id);
                qb.push(" AND uf.following_id = ").push_bind(*following_id);
            }
            FollowFilter::FollowersOf(user_id) => {
                qb.push("uf.following_id = ").push_bind(*user_id);
            }
            FollowFilter::FollowingOf(user_id) => {
                qb.push("uf.follower_id = ").push_bind(*user_id);
            }
            FollowFilter::FollowedByAmong {
                follower_id,
                following_ids,
            } => {
                qb.push("uf.follower_id = ").push_bind(*follower_id);
                qb.push(" AND uf.following_id = ANY(")
                    .push_bind(following_ids.clone());
                qb.push(")");
            }
        }
    }
}

#[derive(Clone, Copy)]
pub enum FollowRelation {
    Follower,
    Following,
}

impl Relation for FollowRelation {
    fn select_expr(&self) -> &'static str {
        match self {
            FollowRelation::Follower => "TO_JSONB(fu) AS follower",
            FollowRelation::Following => "TO_JSONB(gu) AS following",
        }
    }

    fn join_clause(&self) -> &'static str {
        match self {
            FollowRelation::Follower => "LEFT JOIN social.users fu ON fu.id = uf.follower_id",
            FollowRelation::Following => "LEFT JOIN social.users gu ON gu.id = uf.following_id",
        }
    }
}

#[derive(Clone, Copy)]
pub enum FollowSort {
    CreatedAt,
}

impl SortKey for FollowSort {
    fn column(&self) -> &'static str {
        match self {
            FollowSort::CreatedAt => "uf.created_at",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_edge_carries_the_ordered_pair() {
        let follow = Follow::new(1, 2);
        assert_eq!(follow.follower_id, 1);
        assert_eq!(follow.following_id, 2);
        assert!(follow.follower.is_none());
    }

    #[test]
    fn batch_filter_renders_an_any_clause() {
        let mut qb: QueryBuilder<'static, Postgres> = QueryBuilder::new("");
        FollowFilter::FollowedByAmong {
            follower_id: 7,
            following_ids: vec![1, 2, 3],
        }
        .push_where(&mut qb);
        assert_eq!(
            qb.sql(),
            "uf.follower_id = $1 AND uf.following_id = ANY($2)"
        );
    }

    #[test]
    fn directional_filters_use_the_right_column() {
        let mut qb: QueryBuilder<'static, Postgres> = QueryBuilder::new("");
        FollowFilter::FollowersOf(5).push_where(&mut qb);
        assert_eq!(qb.sql(), "uf.following_id = $1");

        let mut qb: QueryBuilder<'static, Postgres> = QueryBuilder::new("");
        FollowFilter::FollowingOf(5).push_where(&mut qb);
        assert_eq!(qb.sql(), "uf.follower_id = $1");
    }
}
