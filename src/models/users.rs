use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::query_builder::Separated;
use sqlx::types::Json;
use sqlx::{FromRow, Postgres, QueryBuilder};
use utoipa::ToSchema;

use crate::models::posts::{Post, PostResponse};
use crate::repositories::base_repository::{Entity, QueryFilter, Relation, SortKey};

#[derive(Clone, Debug, PartialEq, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub image: Option<String>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Populated only when the `Posts` relation is requested.
    #[sqlx(default)]
    #[serde(default)]
    pub posts: Option<Json<Vec<Post>>>,
}

impl Entity for User {
    type Id = i32;
    type Filter = UserFilter;
    type Relation = UserRelation;
    type SortKey = UserSort;

    const TABLE: &'static str = "social.users";
    const ALIAS: &'static str = "u";
    const INSERT_COLUMNS: &'static [&'static str] = &[
        "first_name",
        "last_name",
        "email",
        "image",
        "bio",
        "created_at",
    ];

    fn id(&self) -> i32 {
        self.id
    }

    fn push_insert_values(&self, values: &mut Separated<'_, '_, Postgres, &'static str>) {
        values
            .push_bind(self.first_name.clone())
            .push_bind(self.last_name.clone())
            .push_bind(self.email.clone())
            .push_bind(self.image.clone())
            .push_bind(self.bio.clone())
            .push_bind(self.created_at);
    }

    fn push_update_assignments(&self, assignments: &mut Separated<'_, '_, Postgres, &'static str>) {
        assignments.push("first_name = ");
        assignments.push_bind_unseparated(self.first_name.clone());
        assignments.push("last_name = ");
        assignments.push_bind_unseparated(self.last_name.clone());
        assignments.push("email = ");
        assignments.push_bind_unseparated(self.email.clone());
        assignments.push("image = ");
        assignments.push_bind_unseparated(self.image.clone());
        assignments.push("bio = ");
        assignments.push_bind_unseparated(self.bio.clone());
    }
}

pub enum UserFilter {
    IdEq(i32),
}

impl QueryFilter for UserFilter {
    fn push_where(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        match self {
            UserFilter::IdEq(id) => {
                qb.push("u.id = ").push_bind(*id);
            }
        }
    }
}

#[derive(Clone, Copy)]
pub enum UserRelation {
    Posts,
}

impl Relation for UserRelation {
    fn select_expr(&self) -> &'static str {
        match self {
            UserRelation::Posts => {
                "JSON_AGG(TO_JSONB(p) ORDER BY p.created_at DESC) \
                 FILTER (WHERE p.id IS NOT NULL) AS posts"
            }
        }
    }

    fn join_clause(&self) -> &'static str {
        match self {
            UserRelation::Posts => "LEFT JOIN social.posts p ON p.author_id = u.id",
        }
    }

    fn aggregated(&self) -> bool {
        true
    }
}

#[derive(Clone, Copy)]
pub enum UserSort {
    CreatedAt,
}

impl SortKey for UserSort {
    fn column(&self) -> &'static str {
        match self {
            UserSort::CreatedAt => "u.created_at",
        }
    }
}

/// Compact user projection used in follower/following/search listings.
#[derive(Serialize, Deserialize, ToSchema, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub image: Option<String>,
    pub is_following: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            image: user.image,
            is_following: false,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UserDetailResponse {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub image: Option<String>,
    pub bio: Option<String>,
    pub joined_at: DateTime<Utc>,
    pub is_following: bool,
    pub latest_posts: Vec<PostResponse>,
}

impl UserDetailResponse {
    pub fn new(user: User, latest_posts: Vec<PostResponse>, is_following: bool) -> Self {
        UserDetailResponse {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            image: user.image,
            bio: user.bio,
            joined_at: user.created_at,
            is_following,
            latest_posts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn user() -> User {
        User {
            id: 3,
            first_name: "Grace".into(),
            last_name: "Hopper".into(),
            email: "grace@example.com".into(),
            image: Some("grace.png".into()),
            bio: Some("compilers".into()),
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
            posts: None,
        }
    }

    #[test]
    fn user_response_projection_defaults_to_not_following() {
        let response = UserResponse::from(user());
        assert_eq!(response.id, 3);
        assert_eq!(response.first_name, "Grace");
        assert_eq!(response.image.as_deref(), Some("grace.png"));
        assert!(!response.is_following);
    }

    #[test]
    fn id_filter_renders_against_the_alias() {
        let mut qb: QueryBuilder<'static, Postgres> = QueryBuilder::new("");
        UserFilter::IdEq(3).push_where(&mut qb);
        assert_eq!(qb.sql(), "u.id = $1");
    }
}
