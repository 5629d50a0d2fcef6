use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    apis::api_models::{
        common::{PaginatedResponse, PaginationOptions},
        query::{FollowListQuery, SearchUsersQuery, ViewerQuery},
        request::{FollowRequest, FollowUnfollowUserBody, UserProfileRequest},
    },
    models::users::{UserDetailResponse, UserResponse},
    utils::errors::ErrorPayload,
    AppState,
};

use crate::utils::errors::AppError;

const TAG: &str = "users";

/// Get a user's profile with their latest posts
#[utoipa::path(
    get,
    tag = TAG,
    path = "/{id}",
    operation_id = "getUser",
    responses(
        (status = 200, description = "User detail", body = UserDetailResponse),
        (status = 404, description = "User not found", body = ErrorPayload),
        (status = 500, description = "Internal server error", body = ErrorPayload)
    ),
    params(
        ("id" = i32, Path, description = "User ID"),
        ViewerQuery
    )
)]
pub(super) async fn get_user(
    State(app_state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
    Query(viewer): Query<ViewerQuery>,
) -> Result<impl IntoResponse, AppError> {
    let user = app_state
        .user_service
        .get_user(user_id, viewer.current_user_id)
        .await?;
    Ok((StatusCode::OK, Json(user)))
}

/// Follow a user
#[utoipa::path(
    post,
    tag = TAG,
    path = "/{id}/follow",
    operation_id = "followUser",
    responses(
        (status = 200, description = "User followed successfully"),
        (status = 400, description = "Cannot follow yourself", body = ErrorPayload),
        (status = 404, description = "User not found", body = ErrorPayload),
        (status = 409, description = "Follow already exists", body = ErrorPayload),
        (status = 500, description = "Internal server error", body = ErrorPayload)
    ),
    params(
        ("id" = i32, Path, description = "User ID to follow")
    ),
    request_body = FollowUnfollowUserBody
)]
pub(super) async fn follow_user(
    State(app_state): State<Arc<AppState>>,
    Path(following_id): Path<i32>,
    Json(body): Json<FollowUnfollowUserBody>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .user_service
        .follow_user(body.follower_id, &FollowRequest { following_id })
        .await?;
    Ok(StatusCode::OK)
}

/// Unfollow a user
#[utoipa::path(
    post,
    tag = TAG,
    path = "/{id}/unfollow",
    operation_id = "unfollowUser",
    responses(
        (status = 200, description = "User unfollowed successfully"),
        (status = 404, description = "Follow not found", body = ErrorPayload),
        (status = 500, description = "Internal server error", body = ErrorPayload)
    ),
    params(
        ("id" = i32, Path, description = "User ID to unfollow")
    ),
    request_body = FollowUnfollowUserBody
)]
pub(super) async fn unfollow_user(
    State(app_state): State<Arc<AppState>>,
    Path(following_id): Path<i32>,
    Json(body): Json<FollowUnfollowUserBody>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .user_service
        .unfollow_user(body.follower_id, &FollowRequest { following_id })
        .await?;
    Ok(StatusCode::OK)
}

/// Get followers of a user
#[utoipa::path(
    get,
    tag = TAG,
    path = "/{id}/followers",
    operation_id = "getFollowers",
    responses(
        (status = 200, description = "Page of followers", body = PaginatedResponse<UserResponse>),
        (status = 404, description = "Followers not found", body = ErrorPayload),
        (status = 500, description = "Internal server error", body = ErrorPayload)
    ),
    params(
        ("id" = i32, Path, description = "User ID"),
        FollowListQuery
    )
)]
pub(super) async fn get_followers(
    State(app_state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
    Query(query): Query<FollowListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let followers = app_state
        .user_service
        .get_followers(
            user_id,
            query.current_user_id,
            &PaginationOptions {
                page: query.page,
                limit: query.limit,
            },
        )
        .await?;
    Ok((StatusCode::OK, Json(followers)))
}

/// Get users followed by a user
#[utoipa::path(
    get,
    tag = TAG,
    path = "/{id}/following",
    operation_id = "getFollowing",
    responses(
        (status = 200, description = "Page of followed users", body = PaginatedResponse<UserResponse>),
        (status = 404, description = "Following not found", body = ErrorPayload),
        (status = 500, description = "Internal server error", body = ErrorPayload)
    ),
    params(
        ("id" = i32, Path, description = "User ID"),
        FollowListQuery
    )
)]
pub(super) async fn get_following(
    State(app_state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
    Query(query): Query<FollowListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let following = app_state
        .user_service
        .get_following(
            user_id,
            query.current_user_id,
            &PaginationOptions {
                page: query.page,
                limit: query.limit,
            },
        )
        .await?;
    Ok((StatusCode::OK, Json(following)))
}

/// Search users by name
#[utoipa::path(
    get,
    tag = TAG,
    path = "/search",
    operation_id = "searchUsers",
    responses(
        (status = 200, description = "Page of matching users", body = PaginatedResponse<UserResponse>),
        (status = 500, description = "Internal server error", body = ErrorPayload)
    ),
    params(SearchUsersQuery)
)]
pub(super) async fn search_users(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<SearchUsersQuery>,
) -> Result<impl IntoResponse, AppError> {
    let users = app_state
        .user_service
        .search_users(
            &query.query,
            query.current_user_id,
            &PaginationOptions {
                page: query.page,
                limit: query.limit,
            },
        )
        .await?;
    Ok((StatusCode::OK, Json(users)))
}

/// Update a user's profile
#[utoipa::path(
    put,
    tag = TAG,
    path = "/{id}",
    operation_id = "updateUserProfile",
    responses(
        (status = 200, description = "Profile updated successfully"),
        (status = 404, description = "User not found", body = ErrorPayload),
        (status = 500, description = "Internal server error", body = ErrorPayload)
    ),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    request_body = UserProfileRequest
)]
pub(super) async fn update_user_profile(
    State(app_state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
    Json(body): Json<UserProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .user_service
        .update_user_profile(user_id, &body)
        .await?;
    Ok(StatusCode::OK)
}
