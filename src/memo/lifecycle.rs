//! Status transitions and the read models built on top of the action log.

use crate::memo::models::{Contact, Memo, MemoAction, MemoStatus, Ministry, PrayerStatus};
use crate::storage::{Collection, KvBackend, MemoStore};
use chrono::Utc;
use log::{info, warn};
use uuid::Uuid;

pub const UNKNOWN_CONTACT: &str = "Unknown Contact";
pub const UNKNOWN_MEMO: &str = "Unknown Memo";

/// Which action log entries a history view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryFilter {
    #[default]
    All,
    Only(MemoStatus),
}

impl HistoryFilter {
    fn matches(self, action: &MemoAction) -> bool {
        match self {
            HistoryFilter::All => true,
            HistoryFilter::Only(status) => action.action == status,
        }
    }
}

/// Result of a status change on an existing memo.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    pub action: MemoAction,
    /// False when the backend rejected the write; the stored memo is unchanged.
    pub saved: bool,
}

impl<B: KvBackend> MemoStore<B> {
    /// Sets the status of `memo_id` and appends the matching action record.
    ///
    /// Any status may follow any other. When no memo has that id nothing is
    /// written and `None` comes back. Write failures are logged, not returned;
    /// use [`MemoStore::change_memo_status`] to see whether the write landed.
    pub fn update_memo_status(
        &self,
        memo_id: &str,
        status: MemoStatus,
        comment: Option<String>,
    ) -> Option<MemoAction> {
        self.change_memo_status(memo_id, status, comment)
            .map(|change| change.action)
    }

    /// Like [`MemoStore::update_memo_status`], but reports whether the write was
    /// saved. The memo collection and the action log go to the backend in a
    /// single call, which SQLite commits as one transaction.
    pub fn change_memo_status(
        &self,
        memo_id: &str,
        status: MemoStatus,
        comment: Option<String>,
    ) -> Option<StatusChange> {
        let mut memos = self.memos(None);
        let Some(memo) = memos.iter_mut().find(|m| m.id == memo_id) else {
            warn!("Memo {memo_id} not found, status left unchanged");
            return None;
        };
        let previous = memo.status;
        memo.status = status;

        let action = MemoAction {
            id: Uuid::new_v4().to_string(),
            memo_id: memo_id.to_string(),
            action: status,
            comment,
            timestamp: Utc::now(),
        };
        let mut actions = self.actions();
        actions.push(action.clone());

        let saved = match (serde_json::to_value(&memos), serde_json::to_value(&actions)) {
            (Ok(memos), Ok(actions)) => self.write_together(&[
                (Collection::Memos, memos),
                (Collection::Actions, actions),
            ]),
            (Err(e), _) | (_, Err(e)) => {
                log::error!("Error encoding memo {memo_id} update: {e}");
                false
            }
        };
        if saved {
            info!("Memo {memo_id}: {previous} -> {status}");
        }
        Some(StatusChange { action, saved })
    }

    /// Sets a prayer's status. Returns false when no prayer has that id.
    pub fn update_prayer_status(&self, prayer_id: &str, status: PrayerStatus) -> bool {
        let mut prayers = self.prayers(None);
        let Some(prayer) = prayers.iter_mut().find(|p| p.id == prayer_id) else {
            warn!("Prayer {prayer_id} not found");
            return false;
        };
        prayer.status = status;
        self.save_prayers(&prayers);
        true
    }

    pub fn memo(&self, memo_id: &str) -> Option<Memo> {
        self.memos(None).into_iter().find(|m| m.id == memo_id)
    }

    /// Action log entries for one memo, oldest first.
    pub fn memo_actions(&self, memo_id: &str) -> Vec<MemoAction> {
        self.actions()
            .into_iter()
            .filter(|a| a.memo_id == memo_id)
            .collect()
    }

    /// Action log, newest first.
    pub fn history(&self, filter: HistoryFilter) -> Vec<MemoAction> {
        let mut actions: Vec<MemoAction> = self
            .actions()
            .into_iter()
            .filter(|a| filter.matches(a))
            .collect();
        actions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        actions
    }

    pub fn pending_count(&self, target_id: &str) -> u32 {
        let pending = self
            .memos(Some(target_id))
            .iter()
            .filter(|m| m.status == MemoStatus::Pending)
            .count();
        pending as u32
    }

    /// Contacts with `unread_count` recomputed from their pending memos.
    pub fn contact_inbox(&self) -> Vec<Contact> {
        let memos = self.memos(None);
        self.contacts()
            .into_iter()
            .map(|mut contact| {
                contact.unread_count = count_pending(&memos, &contact.id);
                contact
            })
            .collect()
    }

    /// Ministries with `unread_count` recomputed from their pending memos.
    pub fn ministry_inbox(&self) -> Vec<Ministry> {
        let memos = self.memos(None);
        self.ministries()
            .into_iter()
            .map(|mut ministry| {
                ministry.unread_count = count_pending(&memos, &ministry.id);
                ministry
            })
            .collect()
    }

    /// Display name for a routing target. Dangling ids and blank names both
    /// fall back to "Unknown Contact".
    pub fn routing_target_name(&self, target_id: &str) -> String {
        let contact_title = self
            .contacts()
            .into_iter()
            .find(|c| c.id == target_id)
            .map(|c| c.title);
        let name = match contact_title {
            Some(title) => Some(title),
            None => self
                .ministries()
                .into_iter()
                .find(|m| m.id == target_id)
                .map(|m| m.name),
        };
        name.filter(|n| !n.is_empty())
            .unwrap_or_else(|| UNKNOWN_CONTACT.to_string())
    }

    pub fn memo_title(&self, memo_id: &str) -> String {
        self.memo(memo_id)
            .map(|m| m.title)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| UNKNOWN_MEMO.to_string())
    }
}

fn count_pending(memos: &[Memo], target_id: &str) -> u32 {
    memos
        .iter()
        .filter(|m| m.contact_id == target_id && m.status == MemoStatus::Pending)
        .count() as u32
}
