//! User endpoints.

use parlor_shared::UserProfile;

use crate::error::Result;
use crate::gateway::{ApiClient, Envelope};

impl ApiClient {
    /// `GET /users/me` — the authenticated user's own profile.
    pub async fn current_user(&self) -> Result<UserProfile> {
        let envelope: Envelope<UserProfile> = self.get("/users/me").await?;
        envelope.into_details()
    }
}
