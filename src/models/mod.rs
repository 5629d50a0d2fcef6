pub mod follows;
pub mod notifications;
pub mod post_likes;
pub mod posts;
pub mod users;
