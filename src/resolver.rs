use tracing::warn;

use crate::api::TornClient;

/// Label for a resolved user: `Name [id]`.
pub fn user_label(name: &str, user_id: u64) -> String {
    format!("{name} [{user_id}]")
}

/// Label used when the profile lookup fails.
pub fn unknown_label(user_id: u64) -> String {
    format!("Unknown [{user_id}]")
}

/// Resolve a display label for `user_id`. Never fails; falls back to
/// [`unknown_label`].
pub async fn resolve_username(client: &TornClient, user_id: u64, api_key: &str) -> String {
    match client.fetch_profile(user_id, api_key).await {
        Ok(profile) => user_label(&profile.name, user_id),
        Err(e) => {
            warn!("Fetching username for {user_id} failed: {e}");
            unknown_label(user_id)
        }
    }
}
