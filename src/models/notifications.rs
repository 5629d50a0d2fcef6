use chrono::{DateTime, Utc};
use sqlx::query_builder::Separated;
use sqlx::{FromRow, Postgres, QueryBuilder};

use crate::models::users::User;
use crate::repositories::base_repository::{Entity, QueryFilter, Relation, SortKey};

pub const NOTIFICATION_KIND_FOLLOW: &str = "follow";

#[derive(Clone, Debug, PartialEq, FromRow)]
pub struct Notification {
    pub id: i32,
    /// The recipient.
    pub user_id: i32,
    pub kind: String,
    pub body: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn follow(follower: &User, following: &User) -> Self {
        Notification {
            id: 0,
            user_id: following.id,
            kind: NOTIFICATION_KIND_FOLLOW.to_string(),
            body: format!(
                "{} {} started following you",
                follower.first_name, follower.last_name
            ),
            is_read: false,
            created_at: Utc::now(),
        }
    }
}

impl Entity for Notification {
    type Id = i32;
    type Filter = NotificationFilter;
    type Relation = NotificationRelation;
    type SortKey = NotificationSort;

    const TABLE: &'static str = "social.notifications";
    const ALIAS: &'static str = "n";
    const INSERT_COLUMNS: &'static [&'static str] =
        &["user_id", "kind", "body", "is_read", "created_at"];

    fn id(&self) -> i32 {
        self.id
    }

    fn push_insert_values(&self, values: &mut Separated<'_, '_, Postgres, &'static str>) {
        values
            .push_bind(self.user_id)
            .push_bind(self.kind.clone())
            .push_bind(self.body.clone())
            .push_bind(self.is_read)
            .push_bind(self.created_at);
    }

    fn push_update_assignments(&self, assignments: &mut Separated<'_, '_, Postgres, &'static str>) {
        assignments.push("is_read = ");
        assignments.push_bind_unseparated(self.is_read);
    }
}

pub enum NotificationFilter {
    ForUser(i32),
}

impl QueryFilter for NotificationFilter {
    fn push_where(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        match self {
            NotificationFilter::ForUser(user_id) => {
                qb.push("n.user_id = ").push_bind(*user_id);
            }
        }
    }
}

#[derive(Clone, Copy)]
pub enum NotificationRelation {}

impl Relation for NotificationRelation {
    fn select_expr(&self) -> &'static str {
        match *self {}
    }

    fn join_clause(&self) -> &'static str {
        match *self {}
    }
}

#[derive(Clone, Copy)]
pub enum NotificationSort {
    CreatedAt,
}

impl SortKey for NotificationSort {
    fn column(&self) -> &'static str {
        match self {
            NotificationSort::CreatedAt => "n.created_at",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn user(id: i32, first: &str, last: &str) -> User {
        User {
            id,
            first_name: first.into(),
            last_name: last.into(),
            email: format!("{first}@example.com").to_lowercase(),
            image: None,
            bio: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            posts: None,
        }
    }

    #[test]
    fn follow_notification_targets_the_followed_user() {
        let follower = user(1, "Ada", "Lovelace");
        let following = user(2, "Grace", "Hopper");

        let notification = Notification::follow(&follower, &following);

        assert_eq!(notification.user_id, 2);
        assert_eq!(notification.kind, NOTIFICATION_KIND_FOLLOW);
        assert_eq!(notification.body, "Ada Lovelace started following you");
        assert!(!notification.is_read);
    }
}
