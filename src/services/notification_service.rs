use std::sync::Arc;

use tracing::debug;

use crate::models::notifications::Notification;
use crate::models::users::User;
use crate::repositories::base_repository::PgRepository;

/// Records notifications for domain events. Delivery (websocket push, email)
/// belongs to the transport layer and is out of scope here.
#[derive(Clone)]
pub struct NotificationService {
    notification_repository: Arc<PgRepository<Notification>>,
}

impl NotificationService {
    pub fn new(notification_repository: Arc<PgRepository<Notification>>) -> Self {
        NotificationService {
            notification_repository,
        }
    }

    pub async fn create_follow_notification(
        &self,
        follower: &User,
        following: &User,
    ) -> Result<(), sqlx::Error> {
        let notification = Notification::follow(follower, following);
        self.notification_repository.add(notification).await?;
        debug!(
            follower_id = follower.id,
            following_id = following.id,
            "recorded follow notification"
        );
        Ok(())
    }
}
