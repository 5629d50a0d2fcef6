use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::query_builder::Separated;
use sqlx::{FromRow, Postgres, QueryBuilder};
use utoipa::ToSchema;

use crate::repositories::base_repository::{Entity, QueryFilter, Relation, SortKey};

#[derive(Clone, Debug, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Post {
    pub id: i32,
    pub author_id: i32,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Entity for Post {
    type Id = i32;
    type Filter = PostFilter;
    type Relation = PostRelation;
    type SortKey = PostSort;

    const TABLE: &'static str = "social.posts";
    const ALIAS: &'static str = "p";
    const INSERT_COLUMNS: &'static [&'static str] = &["author_id", "content", "created_at"];

    fn id(&self) -> i32 {
        self.id
    }

    fn push_insert_values(&self, values: &mut Separated<'_, '_, Postgres, &'static str>) {
        values
            .push_bind(self.author_id)
            .push_bind(self.content.clone())
            .push_bind(self.created_at);
    }

    fn push_update_assignments(&self, assignments: &mut Separated<'_, '_, Postgres, &'static str>) {
        assignments.push("content = ");
        assignments.push_bind_unseparated(self.content.clone());
    }
}

pub enum PostFilter {
    ByAuthor(i32),
}

impl QueryFilter for PostFilter {
    fn push_where(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        match self {
            PostFilter::ByAuthor(author_id) => {
                qb.push("p.author_id = ").push_bind(*author_id);
            }
        }
    }
}

#[derive(Clone, Copy)]
pub enum PostRelation {}

impl Relation for PostRelation {
    fn select_expr(&self) -> &'static str {
        match *self {}
    }

    fn join_clause(&self) -> &'static str {
        match *self {}
    }
}

#[derive(Clone, Copy)]
pub enum PostSort {
    CreatedAt,
}

impl SortKey for PostSort {
    fn column(&self) -> &'static str {
        match self {
            PostSort::CreatedAt => "p.created_at",
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: i32,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub is_liked: bool,
}

impl PostResponse {
    pub fn new(post: Post, is_liked: bool) -> Self {
        PostResponse {
            id: post.id,
            content: post.content,
            created_at: post.created_at,
            is_liked,
        }
    }
}
