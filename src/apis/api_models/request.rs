use serde::Deserialize;
use utoipa::ToSchema;

use crate::models::users::User;

#[derive(Debug, Deserialize, ToSchema, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub struct FollowRequest {
    pub following_id: i32,
}

#[derive(Debug, Deserialize, ToSchema, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub struct FollowUnfollowUserBody {
    pub follower_id: i32,
}

/// Field-level overwrite of the editable profile columns. Required-field
/// checks happen at deserialization; there is no further validation.
#[derive(Debug, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileRequest {
    pub first_name: String,
    pub last_name: String,
    pub image: Option<String>,
    pub bio: Option<String>,
}

impl UserProfileRequest {
    pub fn apply_to(&self, user: &mut User) {
        user.first_name = self.first_name.clone();
        user.last_name = self.last_name.clone();
        user.image = self.image.clone();
        user.bio = self.bio.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn profile_request_overwrites_all_editable_fields() {
        let mut user = User {
            id: 1,
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            image: Some("old.png".into()),
            bio: Some("old bio".into()),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            posts: None,
        };

        let request = UserProfileRequest {
            first_name: "Augusta".into(),
            last_name: "King".into(),
            image: None,
            bio: Some("countess of lovelace".into()),
        };
        request.apply_to(&mut user);

        assert_eq!(user.first_name, "Augusta");
        assert_eq!(user.last_name, "King");
        assert_eq!(user.image, None);
        assert_eq!(user.bio.as_deref(), Some("countess of lovelace"));
        // identity and audit fields are untouched
        assert_eq!(user.id, 1);
        assert_eq!(user.email, "ada@example.com");
    }
}
