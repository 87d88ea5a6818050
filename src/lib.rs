//! Local-first memo routing and approval.
//!
//! Memos, the people and ministries they are routed to, and the log of status
//! decisions live as JSON collections in a key-value store. Status changes go
//! through [`auth::approval::ApprovalDesk`], which asks for a device-local
//! biometric confirmation before writing.

pub mod app;
pub mod auth;
pub mod memo;
pub mod storage;
pub mod utils;

pub use memo::models::{
    Contact, Memo, MemoAction, MemoPriority, MemoStatus, Ministry, Prayer, PrayerStatus,
};
pub use storage::{KvBackend, MemoStore, MemoryKv, SqliteKv, StoreError};
