use std::sync::Arc;

use tracing::debug;

use crate::apis::api_models::common::{PaginatedResponse, PaginationOptions};
use crate::apis::api_models::request::{FollowRequest, UserProfileRequest};
use crate::models::follows::{Follow, FollowFilter, FollowRelation, FollowSort};
use crate::models::post_likes::{PostLike, PostLikeFilter};
use crate::models::posts::{Post, PostResponse};
use crate::models::users::{User, UserDetailResponse, UserRelation, UserResponse};
use crate::repositories::base_repository::{PgRepository, SortDirection};
use crate::repositories::user_repository::UserRepository;
use crate::services::notification_service::NotificationService;
use crate::utils::errors::AppError;

const LATEST_POSTS_LIMIT: usize = 5;

#[derive(Clone)]
pub struct UserService {
    user_repository: Arc<UserRepository>,
    follow_repository: Arc<PgRepository<Follow>>,
    post_like_repository: Arc<PgRepository<PostLike>>,
    notification_service: Arc<NotificationService>,
}

impl UserService {
    pub fn new(
        user_repository: Arc<UserRepository>,
        follow_repository: Arc<PgRepository<Follow>>,
        post_like_repository: Arc<PgRepository<PostLike>>,
        notification_service: Arc<NotificationService>,
    ) -> Self {
        UserService {
            user_repository,
            follow_repository,
            post_like_repository,
            notification_service,
        }
    }

    /// Profile detail personalized for `current_user_id`: the five most
    /// recent posts with is-liked flags (one batch like query) and the
    /// is-following flag (one existence query).
    pub async fn get_user(
        &self,
        user_id: i32,
        current_user_id: i32,
    ) -> Result<UserDetailResponse, AppError> {
        let user = self
            .user_repository
            .get(user_id, &[UserRelation::Posts])
            .await?
            .ok_or(AppError::UserNotFound)?;

        let posts = user
            .posts
            .as_ref()
            .map(|json| json.0.clone())
            .unwrap_or_default();
        let posts = latest_posts(posts, LATEST_POSTS_LIMIT);

        let post_ids: Vec<i32> = posts.iter().map(|post| post.id).collect();
        let likes = self
            .post_like_repository
            .get_all_by(
                &PostLikeFilter::ByUserAmongPosts {
                    user_id: current_user_id,
                    post_ids,
                },
                &[],
            )
            .await?;

        let is_following = self
            .follow_repository
            .exists(
                &FollowFilter::Edge {
                    follower_id: current_user_id,
                    following_id: user_id,
                },
                &[],
            )
            .await?;

        let latest_posts = mark_liked(posts, &likes);
        Ok(UserDetailResponse::new(user, latest_posts, is_following))
    }

    /// Creates the follow edge and records a notification. Validation order:
    /// self-follow, then party existence, then duplicate edge. The unique
    /// index on the edge closes the check-then-insert race; a lost race
    /// surfaces as a database error.
    pub async fn follow_user(
        &self,
        user_id: i32,
        request: &FollowRequest,
    ) -> Result<(), AppError> {
        if user_id == request.following_id {
            return Err(AppError::FollowingYourself);
        }

        let follower = self
            .user_repository
            .get(user_id, &[])
            .await?
            .ok_or(AppError::UserNotFound)?;
        let following = self
            .user_repository
            .get(request.following_id, &[])
            .await?
            .ok_or(AppError::UserNotFound)?;

        let already_following = self
            .follow_repository
            .exists(
                &FollowFilter::Edge {
                    follower_id: user_id,
                    following_id: request.following_id,
                },
                &[],
            )
            .await?;
        if already_following {
            return Err(AppError::FollowAlreadyExists);
        }

        self.follow_repository
            .add(Follow::new(user_id, request.following_id))
            .await?;
        debug!(
            follower_id = user_id,
            following_id = request.following_id,
            "follow edge created"
        );

        self.notification_service
            .create_follow_notification(&follower, &following)
            .await?;

        Ok(())
    }

    pub async fn unfollow_user(
        &self,
        user_id: i32,
        request: &FollowRequest,
    ) -> Result<(), AppError> {
        let follow = self
            .follow_repository
            .get_by(
                &FollowFilter::Edge {
                    follower_id: user_id,
                    following_id: request.following_id,
                },
                &[],
            )
            .await?
            .ok_or(AppError::FollowNotFound)?;

        self.follow_repository.remove(&follow).await?;
        Ok(())
    }

    /// Paged users following into `user_id`, annotated with is-following
    /// relative to `current_user_id`. An empty page is an error, matching
    /// the upstream policy.
    pub async fn get_followers(
        &self,
        user_id: i32,
        current_user_id: i32,
        pagination: &PaginationOptions,
    ) -> Result<PaginatedResponse<UserResponse>, AppError> {
        let page = pagination.validate()?;

        let follows = self
            .follow_repository
            .get_paged_by(
                &FollowFilter::FollowersOf(user_id),
                Some((FollowSort::CreatedAt, SortDirection::Desc)),
                &page,
                &[FollowRelation::Follower],
            )
            .await?;

        if follows.is_empty() {
            return Err(AppError::FollowersNotFound);
        }

        let users: Vec<User> = follows
            .items
            .iter()
            .filter_map(|follow| follow.follower.as_ref().map(|json| json.0.clone()))
            .collect();
        let mut models: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
        self.annotate_following(&mut models, current_user_id).await?;

        Ok(PaginatedResponse::with_meta(models, &follows))
    }

    /// Symmetric to `get_followers`: the users `user_id` follows.
    pub async fn get_following(
        &self,
        user_id: i32,
        current_user_id: i32,
        pagination: &PaginationOptions,
    ) -> Result<PaginatedResponse<UserResponse>, AppError> {
        let page = pagination.validate()?;

        let follows = self
            .follow_repository
            .get_paged_by(
                &FollowFilter::FollowingOf(user_id),
                Some((FollowSort::CreatedAt, SortDirection::Desc)),
                &page,
                &[FollowRelation::Following],
            )
            .await?;

        if follows.is_empty() {
            return Err(AppError::FollowingNotFound);
        }

        let users: Vec<User> = follows
            .items
            .iter()
            .filter_map(|follow| follow.following.as_ref().map(|json| json.0.clone()))
            .collect();
        let mut models: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
        self.annotate_following(&mut models, current_user_id).await?;

        Ok(PaginatedResponse::with_meta(models, &follows))
    }

    /// Name search, excluding the searching user, annotated with
    /// is-following. An empty result is a valid empty page.
    pub async fn search_users(
        &self,
        query: &str,
        current_user_id: i32,
        pagination: &PaginationOptions,
    ) -> Result<PaginatedResponse<UserResponse>, AppError> {
        let page = pagination.validate()?;

        let users = self
            .user_repository
            .search(query, &page, current_user_id)
            .await?;

        let mut list = users.map(UserResponse::from);
        self.annotate_following(&mut list.items, current_user_id)
            .await?;

        Ok(list.into())
    }

    pub async fn update_user_profile(
        &self,
        user_id: i32,
        profile: &UserProfileRequest,
    ) -> Result<(), AppError> {
        let mut user = self
            .user_repository
            .get(user_id, &[])
            .await?
            .ok_or(AppError::UserNotFound)?;

        profile.apply_to(&mut user);
        self.user_repository.update(&user).await?;
        Ok(())
    }

    /// One batch edge query for the whole page, never per-user queries.
    async fn annotate_following(
        &self,
        models: &mut [UserResponse],
        current_user_id: i32,
    ) -> Result<(), AppError> {
        let following_ids: Vec<i32> = models.iter().map(|model| model.id).collect();
        let edges = self
            .follow_repository
            .get_all_by(
                &FollowFilter::FollowedByAmong {
                    follower_id: current_user_id,
                    following_ids,
                },
                &[],
            )
            .await?;
        mark_followed(models, &edges);
        Ok(())
    }
}

fn latest_posts(mut posts: Vec<Post>, limit: usize) -> Vec<Post> {
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    posts.truncate(limit);
    posts
}

fn mark_liked(posts: Vec<Post>, likes: &[PostLike]) -> Vec<PostResponse> {
    posts
        .into_iter()
        .map(|post| {
            let is_liked = likes.iter().any(|like| like.post_id == post.id);
            PostResponse::new(post, is_liked)
        })
        .collect()
}

fn mark_followed(models: &mut [UserResponse], edges: &[Follow]) {
    for model in models.iter_mut() {
        model.is_following = edges.iter().any(|edge| edge.following_id == model.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use sqlx::PgPool;

    fn post(id: i32, day: u32) -> Post {
        Post {
            id,
            author_id: 1,
            content: format!("post {id}"),
            created_at: Utc.with_ymd_and_hms(2024, 6, day, 12, 0, 0).unwrap(),
        }
    }

    fn like(user_id: i32, post_id: i32) -> PostLike {
        PostLike {
            id: 0,
            user_id,
            post_id,
            created_at: Utc.with_ymd_and_hms(2024, 6, 30, 0, 0, 0).unwrap(),
        }
    }

    fn response(id: i32) -> UserResponse {
        UserResponse {
            id,
            first_name: format!("User{id}"),
            last_name: "Test".into(),
            image: None,
            is_following: false,
        }
    }

    fn edge(follower_id: i32, following_id: i32) -> Follow {
        Follow::new(follower_id, following_id)
    }

    // The guard paths below return before any query runs, so a lazily
    // connected pool never has to reach a server.
    fn lazy_service() -> UserService {
        let db = Arc::new(
            PgPool::connect_lazy("postgres://postgres@localhost/chirp_social").expect("lazy pool"),
        );
        let user_repository = Arc::new(UserRepository::new(db.clone()));
        let follow_repository = Arc::new(PgRepository::new(db.clone()));
        let post_like_repository = Arc::new(PgRepository::new(db.clone()));
        let notification_service =
            Arc::new(NotificationService::new(Arc::new(PgRepository::new(db))));
        UserService::new(
            user_repository,
            follow_repository,
            post_like_repository,
            notification_service,
        )
    }

    #[test]
    fn latest_posts_are_newest_first_and_capped() {
        let posts = vec![post(1, 3), post(2, 9), post(3, 1), post(4, 27), post(5, 15), post(6, 21), post(7, 6)];

        let latest = latest_posts(posts, 5);

        assert_eq!(latest.len(), 5);
        let ids: Vec<i32> = latest.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![4, 6, 5, 2, 7]);
        assert!(latest.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    #[test]
    fn fewer_posts_than_the_cap_are_all_kept() {
        let latest = latest_posts(vec![post(1, 2), post(2, 5)], 5);
        let ids: Vec<i32> = latest.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn liked_flags_follow_the_like_set() {
        let posts = vec![post(1, 1), post(2, 2), post(3, 3)];
        let likes = vec![like(9, 1), like(9, 3)];

        let responses = mark_liked(posts, &likes);

        assert!(responses.iter().find(|p| p.id == 1).unwrap().is_liked);
        assert!(!responses.iter().find(|p| p.id == 2).unwrap().is_liked);
        assert!(responses.iter().find(|p| p.id == 3).unwrap().is_liked);
    }

    #[test]
    fn following_flags_match_the_edge_set_exactly() {
        let mut models = vec![response(1), response(2), response(3)];
        let edges = vec![edge(9, 2)];

        mark_followed(&mut models, &edges);

        for model in &models {
            let followed = edges.iter().any(|e| e.following_id == model.id);
            assert_eq!(model.is_following, followed);
        }
        assert!(!models[0].is_following);
        assert!(models[1].is_following);
        assert!(!models[2].is_following);
    }

    #[test]
    fn no_edges_means_no_following_flags() {
        let mut models = vec![response(1), response(2)];
        mark_followed(&mut models, &[]);
        assert!(models.iter().all(|m| !m.is_following));
    }

    #[tokio::test]
    async fn following_yourself_is_rejected_regardless_of_existence() {
        let service = lazy_service();
        let err = service
            .follow_user(7, &FollowRequest { following_id: 7 })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::FollowingYourself));
    }

    #[tokio::test]
    async fn zero_limit_pagination_is_rejected_up_front() {
        let service = lazy_service();
        let err = service
            .get_followers(1, 2, &PaginationOptions { page: 1, limit: 0 })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn zero_page_pagination_is_rejected_up_front() {
        let service = lazy_service();
        let err = service
            .get_following(1, 2, &PaginationOptions { page: 0, limit: 10 })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
