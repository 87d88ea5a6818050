use crate::memo::models::{
    Contact, Memo, MemoPriority, MemoStatus, Ministry, Prayer, PrayerStatus,
};
use crate::storage::{KvBackend, MemoStore};
use chrono::{TimeZone, Utc};
use log::info;

fn contact(id: &str, name: &str, title: &str, unread_count: u32) -> Contact {
    Contact {
        id: id.into(),
        name: name.into(),
        title: title.into(),
        last_memo: None,
        unread_count,
        avatar: None,
    }
}

fn ministry(id: &str, name: &str, description: &str) -> Ministry {
    Ministry {
        id: id.into(),
        name: name.into(),
        description: description.into(),
        last_memo: None,
        unread_count: 0,
        avatar: None,
    }
}

fn memo(
    id: &str,
    contact_id: &str,
    title: &str,
    content: &str,
    day: u32,
    status: MemoStatus,
    priority: MemoPriority,
) -> Memo {
    Memo {
        id: id.into(),
        contact_id: contact_id.into(),
        title: title.into(),
        content: content.into(),
        date: Utc
            .with_ymd_and_hms(2024, 1, day, 0, 0, 0)
            .single()
            .unwrap_or_default(),
        status,
        priority,
        attachments: None,
    }
}

pub fn sample_contacts() -> Vec<Contact> {
    vec![
        contact("1", "Dr. Ibrahim Musa", "Permanent Secretary", 3),
        contact("2", "Alhaji Aminu Sani", "Chief of Staff", 1),
        contact("3", "Hajiya Fatima Abdullahi", "Cabinet Secretary", 2),
    ]
}

pub fn sample_ministries() -> Vec<Ministry> {
    vec![
        ministry("101", "Ministry of Education", "Schools, teachers and curriculum"),
        ministry("102", "Ministry of Health", "Hospitals and primary health care"),
        ministry("103", "Ministry of Works", "Roads, bridges and public buildings"),
    ]
}

pub fn sample_memos() -> Vec<Memo> {
    use MemoPriority::*;
    use MemoStatus::*;
    vec![
        memo(
            "1",
            "1",
            "Request for School Infrastructure Funding",
            "We need urgent funding for the construction of new classrooms in rural areas. The current facilities are inadequate for the growing student population.",
            15,
            Pending,
            High,
        ),
        memo(
            "2",
            "1",
            "Teacher Training Program Proposal",
            "Proposal for a comprehensive teacher training program to improve education quality across the state.",
            14,
            Approved,
            Medium,
        ),
        memo(
            "3",
            "1",
            "Textbook Distribution Update",
            "Status update on the distribution of textbooks to all public schools in the state.",
            13,
            Pending,
            Low,
        ),
        memo(
            "4",
            "2",
            "Hospital Equipment Procurement",
            "Request for approval to procure essential medical equipment for state hospitals.",
            16,
            Pending,
            Urgent,
        ),
        memo(
            "5",
            "3",
            "Road Construction Project",
            "Proposal for the construction of a new highway connecting major cities in the state.",
            12,
            RequestDetails,
            High,
        ),
        memo(
            "6",
            "3",
            "Bridge Maintenance Report",
            "Report on the maintenance work completed on the main bridge in the capital city.",
            11,
            Approved,
            Medium,
        ),
    ]
}

pub fn sample_prayers() -> Vec<Prayer> {
    vec![
        Prayer {
            id: "1".into(),
            memo_id: "1".into(),
            title: "Classroom blocks".into(),
            description: "Construction of 12 classroom blocks in rural LGAs".into(),
            status: PrayerStatus::Pending,
            amount: Some(250_000_000.0),
            category: Some("Capital".into()),
        },
        Prayer {
            id: "2".into(),
            memo_id: "1".into(),
            title: "Furniture".into(),
            description: "Desks and chairs for the new classrooms".into(),
            status: PrayerStatus::Pending,
            amount: Some(40_000_000.0),
            category: Some("Recurrent".into()),
        },
    ]
}

/// Writes the fixed sample dataset.
///
/// Contacts, ministries, memos and prayers are overwritten; the action log is
/// left alone. Running it twice gives the same collections, not duplicates.
pub fn seed_sample_data<B: KvBackend>(store: &MemoStore<B>) {
    store.save_contacts(&sample_contacts());
    store.save_ministries(&sample_ministries());
    store.save_memos(&sample_memos());
    store.save_prayers(&sample_prayers());
    info!("Sample data written");
}

/// Seeds on first launch, i.e. when no contacts are stored yet.
pub fn bootstrap<B: KvBackend>(store: &MemoStore<B>, enabled: bool) -> bool {
    if !enabled || !store.contacts().is_empty() {
        return false;
    }
    seed_sample_data(store);
    true
}
