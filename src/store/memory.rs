use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::complaint::{Complaint, HumanId};
use crate::domain::notification::{ListOptions, Notification};
use crate::domain::user::{DeviceRegistration, User};
use crate::error::StorageError;

use super::{
    ComplaintFilter, ComplaintStore, DeviceRegistry, NotificationStore, OfficerFilter, StorageResult, UserDirectory,
};

// ============================================================================
// In-Memory Complaint Store
// ============================================================================
//
// Enforces optimistic concurrency the same way an append-only event store
// does: the caller states the version it loaded, a mismatch is a conflict.
//
// ============================================================================

#[derive(Default)]
pub struct InMemoryComplaintStore {
    inner: RwLock<ComplaintTable>,
}

#[derive(Default)]
struct ComplaintTable {
    rows: HashMap<Uuid, StoredComplaint>,
    next_seq: u64,
}

struct StoredComplaint {
    // insertion order, breaks created_at ties
    seq: u64,
    complaint: Complaint,
}

impl InMemoryComplaintStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ComplaintStore for InMemoryComplaintStore {
    async fn find_complaint_by_id(&self, id: Uuid) -> StorageResult<Option<Complaint>> {
        let table = self.inner.read().await;
        Ok(table.rows.get(&id).map(|row| row.complaint.clone()))
    }

    async fn find_complaint_by_human_id(&self, human_id: &HumanId) -> StorageResult<Option<Complaint>> {
        let table = self.inner.read().await;
        Ok(table
            .rows
            .values()
            .find(|row| &row.complaint.human_id == human_id)
            .map(|row| row.complaint.clone()))
    }

    async fn save_complaint(&self, complaint: &Complaint) -> StorageResult<i64> {
        let mut table = self.inner.write().await;

        let current_version = table.rows.get(&complaint.id).map_or(0, |row| row.complaint.version);
        if current_version != complaint.version {
            return Err(StorageError::VersionConflict {
                id: complaint.id,
                expected: complaint.version,
                actual: current_version,
            });
        }

        let is_new = current_version == 0;
        if is_new
            && table
                .rows
                .values()
                .any(|row| row.complaint.human_id == complaint.human_id)
        {
            return Err(StorageError::DuplicateHumanId(complaint.human_id.to_string()));
        }

        let new_version = current_version + 1;
        let mut stored = complaint.clone();
        stored.version = new_version;

        let existing_seq = table.rows.get(&complaint.id).map(|row| row.seq);
        let seq = match existing_seq {
            Some(seq) => seq,
            None => {
                table.next_seq += 1;
                table.next_seq
            }
        };
        table.rows.insert(complaint.id, StoredComplaint { seq, complaint: stored });

        tracing::debug!(
            complaint_id = %complaint.id,
            new_version = new_version,
            "Saved complaint"
        );

        Ok(new_version)
    }

    async fn delete_complaint_by_id(&self, id: Uuid) -> StorageResult<bool> {
        let mut table = self.inner.write().await;
        Ok(table.rows.remove(&id).is_some())
    }

    async fn find_complaints(&self, filter: &ComplaintFilter) -> StorageResult<Vec<Complaint>> {
        let table = self.inner.read().await;

        let mut matching: Vec<&StoredComplaint> = table
            .rows
            .values()
            .filter(|row| filter.matches(&row.complaint))
            .collect();
        matching.sort_by(|a, b| {
            b.complaint
                .created_at
                .cmp(&a.complaint.created_at)
                .then(b.seq.cmp(&a.seq))
        });

        Ok(matching
            .into_iter()
            .skip(filter.offset())
            .take(filter.limit)
            .map(|row| row.complaint.clone())
            .collect())
    }

    async fn count_complaints(&self, filter: &ComplaintFilter) -> StorageResult<usize> {
        let table = self.inner.read().await;
        Ok(table.rows.values().filter(|row| filter.matches(&row.complaint)).count())
    }
}

// ============================================================================
// In-Memory User Directory
// ============================================================================

#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            users: RwLock::new(users.into_iter().map(|u| (u.id, u)).collect()),
        }
    }

    pub async fn insert_user(&self, user: User) {
        self.users.write().await.insert(user.id, user);
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_user_by_id(&self, id: Uuid) -> StorageResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_officers(&self, filter: OfficerFilter) -> StorageResult<Vec<User>> {
        let users = self.users.read().await;
        let mut officers: Vec<User> = users
            .values()
            .filter(|u| u.is_officer() && (!filter.active_only || u.is_active))
            .cloned()
            .collect();
        officers.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(officers)
    }
}

// ============================================================================
// In-Memory Notification Store
// ============================================================================

#[derive(Default)]
pub struct InMemoryNotificationStore {
    // insertion order == creation order
    notifications: RwLock<Vec<Notification>>,
}

impl InMemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored notification addressed to `user_id`, oldest first
    pub async fn all_for(&self, user_id: Uuid) -> Vec<Notification> {
        self.notifications
            .read()
            .await
            .iter()
            .filter(|n| n.recipient == user_id)
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.notifications.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.notifications.read().await.is_empty()
    }
}

#[async_trait]
impl NotificationStore for InMemoryNotificationStore {
    async fn insert(&self, notification: &Notification) -> StorageResult<()> {
        self.notifications.write().await.push(notification.clone());
        Ok(())
    }

    async fn list_for_user(&self, user_id: Uuid, options: ListOptions) -> StorageResult<Vec<Notification>> {
        let notifications = self.notifications.read().await;
        Ok(notifications
            .iter()
            .rev()
            .filter(|n| n.recipient == user_id && (!options.unread_only || !n.read))
            .skip(options.offset())
            .take(options.limit)
            .cloned()
            .collect())
    }

    async fn mark_read(&self, id: Uuid, user_id: Uuid, now: DateTime<Utc>) -> StorageResult<Option<Notification>> {
        let mut notifications = self.notifications.write().await;
        Ok(notifications
            .iter_mut()
            .find(|n| n.id == id && n.recipient == user_id)
            .map(|n| {
                n.mark_read(now);
                n.clone()
            }))
    }

    async fn mark_all_read(&self, user_id: Uuid, now: DateTime<Utc>) -> StorageResult<usize> {
        let mut notifications = self.notifications.write().await;
        let mut updated = 0;
        for n in notifications.iter_mut().filter(|n| n.recipient == user_id && !n.read) {
            n.mark_read(now);
            updated += 1;
        }
        Ok(updated)
    }

    async fn unread_count(&self, user_id: Uuid) -> StorageResult<usize> {
        let notifications = self.notifications.read().await;
        Ok(notifications.iter().filter(|n| n.recipient == user_id && !n.read).count())
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> StorageResult<bool> {
        let mut notifications = self.notifications.write().await;
        let before = notifications.len();
        notifications.retain(|n| !(n.id == id && n.recipient == user_id));
        Ok(notifications.len() < before)
    }
}

// ============================================================================
// In-Memory Device Registry
// ============================================================================

#[derive(Default)]
pub struct InMemoryDeviceRegistry {
    devices: RwLock<Vec<DeviceRegistration>>,
}

impl InMemoryDeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DeviceRegistry for InMemoryDeviceRegistry {
    async fn register(&self, device: &DeviceRegistration) -> StorageResult<()> {
        let mut devices = self.devices.write().await;
        devices.retain(|d| d.token != device.token);
        devices.push(device.clone());
        Ok(())
    }

    async fn devices_for(&self, user_id: Uuid) -> StorageResult<Vec<DeviceRegistration>> {
        let devices = self.devices.read().await;
        Ok(devices.iter().filter(|d| d.user_id == user_id).cloned().collect())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::complaint::{ComplaintStatus, NewComplaint};
    use crate::domain::notification::{NotificationDraft, NotificationType};
    use crate::domain::user::Role;
    use chrono::{Duration, NaiveDate};

    fn complaint(suffix: u32, citizen: Uuid) -> Complaint {
        let human_id = HumanId::new(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(), suffix);
        let input = NewComplaint {
            title: format!("Pothole {}", suffix),
            description: "Deep pothole near the school gate".to_string(),
            category: Some("Road".to_string()),
            ..Default::default()
        };
        Complaint::submit(human_id, input, citizen, None, Utc::now()).unwrap().0
    }

    fn notification(recipient: Uuid) -> Notification {
        Notification::from_draft(
            NotificationDraft {
                recipient,
                kind: NotificationType::General,
                title: "Notice".to_string(),
                message: "Water cut tomorrow".to_string(),
                related_complaint: None,
            },
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_save_and_reload_bumps_version() {
        let store = InMemoryComplaintStore::new();
        let mut c = complaint(10001, Uuid::new_v4());

        let v1 = store.save_complaint(&c).await.unwrap();
        assert_eq!(v1, 1);

        c.version = v1;
        let v2 = store.save_complaint(&c).await.unwrap();
        assert_eq!(v2, 2);

        let loaded = store.find_complaint_by_id(c.id).await.unwrap().unwrap();
        assert_eq!(loaded.version, 2);
        let by_human = store.find_complaint_by_human_id(&c.human_id).await.unwrap();
        assert_eq!(by_human.map(|x| x.id), Some(c.id));
    }

    #[tokio::test]
    async fn test_stale_save_is_rejected() {
        let store = InMemoryComplaintStore::new();
        let mut c = complaint(10002, Uuid::new_v4());
        c.version = store.save_complaint(&c).await.unwrap();

        let mut first = c.clone();
        let mut second = c.clone();
        first.status = ComplaintStatus::InProgress;
        second.status = ComplaintStatus::Rejected;

        store.save_complaint(&first).await.unwrap();
        let err = store.save_complaint(&second).await.unwrap_err();

        assert_eq!(
            err,
            StorageError::VersionConflict { id: c.id, expected: 1, actual: 2 }
        );
        let stored = store.find_complaint_by_id(c.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ComplaintStatus::InProgress);
    }

    #[tokio::test]
    async fn test_duplicate_human_id_rejected() {
        let store = InMemoryComplaintStore::new();
        store.save_complaint(&complaint(10003, Uuid::new_v4())).await.unwrap();

        let err = store.save_complaint(&complaint(10003, Uuid::new_v4())).await.unwrap_err();
        assert!(matches!(err, StorageError::DuplicateHumanId(_)));
    }

    #[tokio::test]
    async fn test_find_complaints_filters_and_paginates_newest_first() {
        let store = InMemoryComplaintStore::new();
        let citizen = Uuid::new_v4();
        let base = Utc::now();

        for i in 0..5u32 {
            let mut c = complaint(20000 + i, citizen);
            c.created_at = base + Duration::seconds(i as i64);
            store.save_complaint(&c).await.unwrap();
        }
        store.save_complaint(&complaint(30000, Uuid::new_v4())).await.unwrap();

        let filter = ComplaintFilter {
            submitted_by: Some(citizen),
            page: 1,
            limit: 2,
            ..Default::default()
        };
        let page1 = store.find_complaints(&filter).await.unwrap();
        assert_eq!(page1.len(), 2);
        assert_eq!(page1[0].title, "Pothole 20004");
        assert_eq!(page1[1].title, "Pothole 20003");

        let page3 = store
            .find_complaints(&ComplaintFilter { page: 3, ..filter.clone() })
            .await
            .unwrap();
        assert_eq!(page3.len(), 1);
        assert_eq!(page3[0].title, "Pothole 20000");

        assert_eq!(store.count_complaints(&filter).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_delete_complaint() {
        let store = InMemoryComplaintStore::new();
        let c = complaint(10004, Uuid::new_v4());
        store.save_complaint(&c).await.unwrap();

        assert!(store.delete_complaint_by_id(c.id).await.unwrap());
        assert!(!store.delete_complaint_by_id(c.id).await.unwrap());
        assert!(store.find_complaint_by_id(c.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_officers_ordered_by_creation() {
        let now = Utc::now();
        let late = User::new("Late", "late@city.gov", Role::Officer).with_created_at(now);
        let early = User::new("Early", "early@city.gov", Role::Officer)
            .with_created_at(now - Duration::days(30));
        let retired = User::new("Retired", "old@city.gov", Role::Officer)
            .with_created_at(now - Duration::days(90))
            .deactivated();
        let citizen = User::new("Citizen", "c@mail.com", Role::Citizen)
            .with_created_at(now - Duration::days(365));

        let directory = InMemoryUserDirectory::with_users(vec![
            late.clone(),
            early.clone(),
            retired.clone(),
            citizen,
        ]);

        let active = directory.find_officers(OfficerFilter { active_only: true }).await.unwrap();
        assert_eq!(active.iter().map(|u| u.id).collect::<Vec<_>>(), vec![early.id, late.id]);

        let all = directory.find_officers(OfficerFilter::default()).await.unwrap();
        assert_eq!(all[0].id, retired.id);
    }

    #[tokio::test]
    async fn test_notification_listing_newest_first_and_unread_only() {
        let store = InMemoryNotificationStore::new();
        let user = Uuid::new_v4();

        let first = notification(user);
        let second = notification(user);
        let third = notification(user);
        for n in [&first, &second, &third] {
            store.insert(n).await.unwrap();
        }
        store.insert(&notification(Uuid::new_v4())).await.unwrap();

        let all = store.list_for_user(user, ListOptions::default()).await.unwrap();
        assert_eq!(all.iter().map(|n| n.id).collect::<Vec<_>>(), vec![third.id, second.id, first.id]);

        store.mark_read(second.id, user, Utc::now()).await.unwrap();
        let unread = store.list_for_user(user, ListOptions::unread()).await.unwrap();
        assert_eq!(unread.iter().map(|n| n.id).collect::<Vec<_>>(), vec![third.id, first.id]);

        let paged = store
            .list_for_user(user, ListOptions { unread_only: false, page: 2, limit: 2 })
            .await
            .unwrap();
        assert_eq!(paged.len(), 1);
        assert_eq!(paged[0].id, first.id);
    }

    #[tokio::test]
    async fn test_mark_read_is_ownership_scoped() {
        let store = InMemoryNotificationStore::new();
        let owner = Uuid::new_v4();
        let n = notification(owner);
        store.insert(&n).await.unwrap();

        let stranger = store.mark_read(n.id, Uuid::new_v4(), Utc::now()).await.unwrap();
        assert!(stranger.is_none());
        assert_eq!(store.unread_count(owner).await.unwrap(), 1);

        let read = store.mark_read(n.id, owner, Utc::now()).await.unwrap().unwrap();
        assert!(read.read);
        assert!(read.read_at.is_some());
        assert_eq!(store.unread_count(owner).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_mark_all_read_and_delete() {
        let store = InMemoryNotificationStore::new();
        let user = Uuid::new_v4();
        let other = Uuid::new_v4();
        for _ in 0..3 {
            store.insert(&notification(user)).await.unwrap();
        }
        let foreign = notification(other);
        store.insert(&foreign).await.unwrap();

        assert_eq!(store.mark_all_read(user, Utc::now()).await.unwrap(), 3);
        assert_eq!(store.unread_count(user).await.unwrap(), 0);
        assert_eq!(store.unread_count(other).await.unwrap(), 1);

        assert!(!store.delete(foreign.id, user).await.unwrap());
        assert!(store.delete(foreign.id, other).await.unwrap());
        assert_eq!(store.len().await, 3);
    }
    #[tokio::test]
    async fn test_device_tokens_are_unique() {
        let registry = InMemoryDeviceRegistry::new();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
        let now = Utc::now();

        registry.register(&DeviceRegistration::new(alice, "tok-1", Some("android"), now)).await.unwrap();
        registry.register(&DeviceRegistration::new(alice, "tok-2", None, now)).await.unwrap();
        registry
            .register(&DeviceRegistration::new(alice, "tok-1", Some("android"), now + Duration::minutes(1)))
            .await
            .unwrap();

        let tokens: Vec<String> = registry.devices_for(alice).await.unwrap().into_iter().map(|d| d.token).collect();
        assert_eq!(tokens, vec!["tok-2", "tok-1"]);

        // Same handset, new owner
        registry.register(&DeviceRegistration::new(bob, "tok-2", Some("ios"), now)).await.unwrap();
        assert_eq!(registry.devices_for(alice).await.unwrap().len(), 1);
        assert_eq!(registry.devices_for(bob).await.unwrap()[0].platform, "ios");
    }
}
