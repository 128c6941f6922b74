//! In-process store
//!
//! Same contract as the PostgreSQL store: writes are staged per unit of work
//! and applied on commit, email is unique across members, ids are never
//! reused. Also exposes a few hooks to inject failures and inspect state.

use async_trait::async_trait;
use parking_lot::Mutex;
use shared::models::{Member, MemberWithMinistries};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use super::{
    EMAIL_UNIQUE_CONSTRAINT, MemberStore, NewMember, StoreError, StoreResult, UnitOfWork,
};

#[derive(Debug, Clone)]
struct MinistryRow {
    id: i64,
    member_id: i64,
    name: String,
}

#[derive(Debug, Default)]
struct Tables {
    members: Vec<Member>,
    ministries: Vec<MinistryRow>,
    next_member_id: i64,
    next_ministry_id: i64,
}

impl Tables {
    fn email_taken(&self, email: &str) -> bool {
        self.members.iter().any(|m| m.email == email)
    }

    fn with_ministries(&self, member: &Member) -> MemberWithMinistries {
        let names: Vec<&str> = self
            .ministries
            .iter()
            .filter(|row| row.member_id == member.id)
            .map(|row| row.name.as_str())
            .collect();
        MemberWithMinistries {
            member: member.clone(),
            ministries: (!names.is_empty()).then(|| names.join(",")),
        }
    }
}

#[derive(Default)]
struct Inner {
    tables: Mutex<Tables>,
    fail_next_ministry_insert: AtomicBool,
    begin_delay: Mutex<Option<Duration>>,
    open_units: AtomicUsize,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next ministry insert fail (one shot)
    pub fn fail_next_ministry_insert(&self) {
        self.inner
            .fail_next_ministry_insert
            .store(true, Ordering::SeqCst);
    }

    /// Delay every `begin` (simulates a saturated pool)
    pub fn set_begin_delay(&self, delay: Option<Duration>) {
        *self.inner.begin_delay.lock() = delay;
    }

    /// Units of work handed out and not yet committed, rolled back or dropped
    pub fn open_units(&self) -> usize {
        self.inner.open_units.load(Ordering::SeqCst)
    }

    pub fn member_count(&self) -> usize {
        self.inner.tables.lock().members.len()
    }

    pub fn ministry_count(&self) -> usize {
        self.inner.tables.lock().ministries.len()
    }

    pub fn members_with_email(&self, email: &str) -> usize {
        self.inner
            .tables
            .lock()
            .members
            .iter()
            .filter(|m| m.email == email)
            .count()
    }
}

#[async_trait]
impl MemberStore for MemoryStore {
    async fn begin(&self) -> StoreResult<Box<dyn UnitOfWork>> {
        let delay = *self.inner.begin_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.inner.open_units.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryUnit {
            inner: Arc::clone(&self.inner),
            members: Vec::new(),
            ministries: Vec::new(),
        }))
    }

    async fn list_members(&self) -> StoreResult<Vec<MemberWithMinistries>> {
        let tables = self.inner.tables.lock();
        let mut rows: Vec<MemberWithMinistries> = tables
            .members
            .iter()
            .map(|m| tables.with_ministries(m))
            .collect();
        rows.sort_by(|a, b| {
            (b.member.created_at, b.member.id).cmp(&(a.member.created_at, a.member.id))
        });
        Ok(rows)
    }

    async fn find_member(&self, id: i64) -> StoreResult<Option<MemberWithMinistries>> {
        let tables = self.inner.tables.lock();
        Ok(tables
            .members
            .iter()
            .find(|m| m.id == id)
            .map(|m| tables.with_ministries(m)))
    }
}

struct MemoryUnit {
    inner: Arc<Inner>,
    members: Vec<Member>,
    ministries: Vec<MinistryRow>,
}

fn email_conflict() -> StoreError {
    StoreError::UniqueViolation {
        constraint: Some(EMAIL_UNIQUE_CONSTRAINT.to_string()),
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnit {
    async fn insert_member(&mut self, member: &NewMember, now: i64) -> StoreResult<i64> {
        let mut tables = self.inner.tables.lock();
        if tables.email_taken(&member.email) || self.members.iter().any(|m| m.email == member.email) {
            return Err(email_conflict());
        }
        tables.next_member_id += 1;
        let id = tables.next_member_id;

        self.members.push(Member {
            id,
            first_name: member.first_name.clone(),
            last_name: member.last_name.clone(),
            email: member.email.clone(),
            phone: member.phone.clone(),
            birth_date: member.birth_date,
            address: member.address.clone(),
            city: member.city.clone(),
            state: member.state.clone(),
            zip_code: member.zip_code.clone(),
            membership_type: member.membership_type,
            attendance: member.attendance.clone(),
            baptized: member.baptized.clone(),
            salvation: member.salvation.clone(),
            emergency_contact_name: member.emergency_contact_name.clone(),
            emergency_contact_phone: member.emergency_contact_phone.clone(),
            prayer_request: member.prayer_request.clone(),
            how_heard: member.how_heard.clone(),
            created_at: now,
            updated_at: now,
        });
        Ok(id)
    }

    async fn insert_ministries(&mut self, member_id: i64, names: &[String], _now: i64) -> StoreResult<()> {
        if self
            .inner
            .fail_next_ministry_insert
            .swap(false, Ordering::SeqCst)
        {
            return Err(StoreError::Other("injected ministry insert failure".into()));
        }
        if !self.members.iter().any(|m| m.id == member_id) {
            return Err(StoreError::Other(format!(
                "member {member_id} does not exist in this transaction"
            )));
        }

        let mut tables = self.inner.tables.lock();
        for name in names {
            tables.next_ministry_id += 1;
            self.ministries.push(MinistryRow {
                id: tables.next_ministry_id,
                member_id,
                name: name.clone(),
            });
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let mut unit = self;
        let members = std::mem::take(&mut unit.members);
        let ministries = std::mem::take(&mut unit.ministries);

        let mut tables = unit.inner.tables.lock();
        if members.iter().any(|m| tables.email_taken(&m.email)) {
            return Err(email_conflict());
        }
        tables.members.extend(members);
        tables.ministries.extend(ministries);
        tables.ministries.sort_by_key(|row| row.id);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        Ok(())
    }
}

impl Drop for MemoryUnit {
    fn drop(&mut self) {
        self.inner.open_units.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use shared::models::MembershipType;

    fn new_member(email: &str) -> NewMember {
        NewMember {
            first_name: "John".into(),
            last_name: "Doe".into(),
            email: email.into(),
            phone: "555-123-4567".into(),
            birth_date: NaiveDate::from_ymd_opt(1985, 5, 15).unwrap(),
            address: None,
            city: None,
            state: None,
            zip_code: None,
            membership_type: MembershipType::Member,
            attendance: None,
            baptized: None,
            salvation: None,
            emergency_contact_name: None,
            emergency_contact_phone: None,
            prayer_request: None,
            how_heard: None,
        }
    }

    #[tokio::test]
    async fn test_writes_are_invisible_until_commit() {
        let store = MemoryStore::new();
        let mut unit = store.begin().await.unwrap();
        let id = unit.insert_member(&new_member("a@b.co"), 1).await.unwrap();
        unit.insert_ministries(id, &["Choir".to_string()], 1).await.unwrap();

        assert_eq!(store.member_count(), 0);
        assert_eq!(store.open_units(), 1);

        unit.commit().await.unwrap();
        assert_eq!(store.member_count(), 1);
        assert_eq!(store.ministry_count(), 1);
        assert_eq!(store.open_units(), 0);
    }

    #[tokio::test]
    async fn test_drop_discards_staged_writes() {
        let store = MemoryStore::new();
        {
            let mut unit = store.begin().await.unwrap();
            unit.insert_member(&new_member("a@b.co"), 1).await.unwrap();
        }
        assert_eq!(store.member_count(), 0);
        assert_eq!(store.open_units(), 0);
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_rollback() {
        let store = MemoryStore::new();

        let mut unit = store.begin().await.unwrap();
        let first = unit.insert_member(&new_member("a@b.co"), 1).await.unwrap();
        unit.rollback().await.unwrap();

        let mut unit = store.begin().await.unwrap();
        let second = unit.insert_member(&new_member("a@b.co"), 2).await.unwrap();
        unit.commit().await.unwrap();

        assert!(second > first);
        assert!(store.find_member(first).await.unwrap().is_none());
        assert!(store.find_member(second).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_email_unique_at_insert_and_commit() {
        let store = MemoryStore::new();

        let mut committed = store.begin().await.unwrap();
        committed.insert_member(&new_member("a@b.co"), 1).await.unwrap();

        // Both units staged the same email; the second commit loses
        let mut racing = store.begin().await.unwrap();
        racing.insert_member(&new_member("a@b.co"), 1).await.unwrap();

        committed.commit().await.unwrap();
        let err = racing.commit().await.unwrap_err();
        assert!(err.is_duplicate_email());

        let mut late = store.begin().await.unwrap();
        let err = late.insert_member(&new_member("a@b.co"), 2).await.unwrap_err();
        assert!(err.is_duplicate_email());
        assert_eq!(store.members_with_email("a@b.co"), 1);
    }

    #[tokio::test]
    async fn test_injected_ministry_failure_is_one_shot() {
        let store = MemoryStore::new();
        store.fail_next_ministry_insert();

        let mut unit = store.begin().await.unwrap();
        let id = unit.insert_member(&new_member("a@b.co"), 1).await.unwrap();
        assert!(unit.insert_ministries(id, &["Choir".to_string()], 1).await.is_err());
        assert!(unit.insert_ministries(id, &["Choir".to_string()], 1).await.is_ok());
    }

    #[tokio::test]
    async fn test_listing_orders_newest_first_with_ministries() {
        let store = MemoryStore::new();
        for (email, now, ministries) in [
            ("a@b.co", 10, vec![]),
            ("c@d.co", 20, vec!["Worship Team".to_string(), "Youth Ministry".to_string()]),
            ("e@f.co", 20, vec![]),
        ] {
            let mut unit = store.begin().await.unwrap();
            let id = unit.insert_member(&new_member(email), now).await.unwrap();
            unit.insert_ministries(id, &ministries, now).await.unwrap();
            unit.commit().await.unwrap();
        }

        let rows = store.list_members().await.unwrap();
        let emails: Vec<&str> = rows.iter().map(|r| r.member.email.as_str()).collect();
        assert_eq!(emails, vec!["e@f.co", "c@d.co", "a@b.co"]);
        assert_eq!(rows[1].ministries.as_deref(), Some("Worship Team,Youth Ministry"));
        assert!(rows[0].ministries.is_none());
    }
}
