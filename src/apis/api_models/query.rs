use serde::Deserialize;
use utoipa::IntoParams;

use super::common::{default_limit, default_page};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ViewerQuery {
    /// The user the response is personalized for (is_following, is_liked).
    pub current_user_id: i32,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct FollowListQuery {
    pub current_user_id: i32,
    #[param(default = 1)]
    #[serde(default = "default_page")]
    pub page: u32,
    #[param(default = 10)]
    #[serde(default = "default_limit")]
    pub limit: u32,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchUsersQuery {
    pub query: String,
    pub current_user_id: i32,
    #[param(default = 1)]
    #[serde(default = "default_page")]
    pub page: u32,
    #[param(default = 10)]
    #[serde(default = "default_limit")]
    pub limit: u32,
}
