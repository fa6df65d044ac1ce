//! Snapshot of the user store state.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::model::{
    AccessTokensSetting, GeneralSetting, SessionsSetting, Shortcut, User, UserNotification,
    UserStats, WebhooksSetting,
};

static NEXT_STATE_ID: AtomicU64 = AtomicU64::new(1);

/// Returns a process-unique id, used to tag stats snapshots.
pub fn next_state_id() -> u64 {
    NEXT_STATE_ID.fetch_add(1, Ordering::Relaxed)
}

/// Everything the client knows about users.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserState {
    /// Resource name of the signed-in user.
    pub current_user: Option<String>,
    pub general_setting: Option<GeneralSetting>,
    pub sessions_setting: Option<SessionsSetting>,
    pub access_tokens_setting: Option<AccessTokensSetting>,
    pub webhooks_setting: Option<WebhooksSetting>,
    pub shortcuts: Vec<Shortcut>,
    pub notifications: Vec<UserNotification>,
    /// Users keyed by resource name.
    pub users_by_name: HashMap<String, User>,
    /// Stats keyed by stats resource name (`users/{id}/stats`).
    pub stats_by_name: HashMap<String, UserStats>,
    /// Changes whenever stats are refetched.
    pub stats_state_id: u64,
}

impl UserState {
    /// Tag counts summed across every user's stats.
    pub fn tag_count(&self) -> BTreeMap<String, i32> {
        let mut tag_count = BTreeMap::new();
        for stats in self.stats_by_name.values() {
            for (tag, count) in &stats.tag_count {
                *tag_count.entry(tag.clone()).or_insert(0) += count;
            }
        }
        tag_count
    }

    /// Stats of the signed-in user.
    pub fn current_user_stats(&self) -> Option<&UserStats> {
        let current_user = self.current_user.as_ref()?;
        self.stats_by_name.get(&format!("{}/stats", current_user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(name: &str, tags: &[(&str, i32)]) -> UserStats {
        UserStats {
            name: name.to_string(),
            tag_count: tags.iter().map(|(t, c)| (t.to_string(), *c)).collect(),
            total_memo_count: 0,
        }
    }

    #[test]
    fn test_tag_count_sums_across_users() {
        let mut state = UserState::default();
        state
            .stats_by_name
            .insert("users/1/stats".into(), stats("users/1/stats", &[("work", 2), ("home", 1)]));
        state
            .stats_by_name
            .insert("users/2/stats".into(), stats("users/2/stats", &[("work", 3)]));

        let tag_count = state.tag_count();

        assert_eq!(tag_count.get("work"), Some(&5));
        assert_eq!(tag_count.get("home"), Some(&1));
        assert_eq!(tag_count.len(), 2);
    }

    #[test]
    fn test_current_user_stats() {
        let mut state = UserState::default();
        state
            .stats_by_name
            .insert("users/1/stats".into(), stats("users/1/stats", &[]));
        assert!(state.current_user_stats().is_none());

        state.current_user = Some("users/1".to_string());
        assert_eq!(
            state.current_user_stats().map(|s| s.name.as_str()),
            Some("users/1/stats")
        );

        state.current_user = Some("users/2".to_string());
        assert!(state.current_user_stats().is_none());
    }

    #[test]
    fn test_state_ids_are_unique() {
        let a = next_state_id();
        let b = next_state_id();
        assert_ne!(a, b);
    }
}
