use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A person memos are routed to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: String,
    pub name: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_memo: Option<Memo>,
    #[serde(default)]
    pub unread_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// A department memos are routed to. Plays the same role as [`Contact`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ministry {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_memo: Option<Memo>,
    #[serde(default)]
    pub unread_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    RequestDetails,
    Archived,
}

impl MemoStatus {
    pub const ALL: [MemoStatus; 5] = [
        MemoStatus::Pending,
        MemoStatus::Approved,
        MemoStatus::Rejected,
        MemoStatus::RequestDetails,
        MemoStatus::Archived,
    ];

    /// Stored representation, identical to the serde form.
    pub fn as_str(self) -> &'static str {
        match self {
            MemoStatus::Pending => "pending",
            MemoStatus::Approved => "approved",
            MemoStatus::Rejected => "rejected",
            MemoStatus::RequestDetails => "request_details",
            MemoStatus::Archived => "archived",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MemoStatus::Pending => "Pending",
            MemoStatus::Approved => "Approved",
            MemoStatus::Rejected => "Rejected",
            MemoStatus::RequestDetails => "Request Details",
            MemoStatus::Archived => "Archived",
        }
    }

    /// Verb used in confirmation prompts ("Use Biometrics to approve this memo").
    pub fn verb(self) -> &'static str {
        match self {
            MemoStatus::Pending => "reopen",
            MemoStatus::Approved => "approve",
            MemoStatus::Rejected => "reject",
            MemoStatus::RequestDetails => "request details on",
            MemoStatus::Archived => "archive",
        }
    }
}

impl fmt::Display for MemoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown memo status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for MemoStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MemoStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// Informational only; nothing in the lifecycle branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl MemoPriority {
    pub fn label(self) -> &'static str {
        match self {
            MemoPriority::Low => "Low",
            MemoPriority::Medium => "Medium",
            MemoPriority::High => "High",
            MemoPriority::Urgent => "Urgent",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Memo {
    pub id: String,
    /// Id of the contact or ministry this memo is routed to.
    pub contact_id: String,
    pub title: String,
    pub content: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub status: MemoStatus,
    #[serde(default)]
    pub priority: MemoPriority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<String>>,
}

impl Memo {
    /// Filing reference, e.g. `REF/2024/01/15/1`.
    pub fn reference_number(&self) -> String {
        format!(
            "REF/{}/{:02}/{:02}/{}",
            self.date.year(),
            self.date.month(),
            self.date.day(),
            self.id
        )
    }
}

/// One recorded status transition. Entries are only ever appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoAction {
    // older entries were written without an id
    #[serde(default)]
    pub id: String,
    pub memo_id: String,
    pub action: MemoStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrayerStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

/// A budget line item attached to a memo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prayer {
    pub id: String,
    pub memo_id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub status: PrayerStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}
