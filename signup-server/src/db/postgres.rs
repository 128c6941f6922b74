//! PostgreSQL-backed store

use async_trait::async_trait;
use shared::models::MemberWithMinistries;
use sqlx::{PgPool, Postgres, Transaction};

use super::{MemberStore, NewMember, StoreResult, UnitOfWork, members};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// A pooled connection with an open transaction
///
/// sqlx rolls the transaction back when it is dropped uncommitted.
pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn insert_member(&mut self, member: &NewMember, now: i64) -> StoreResult<i64> {
        Ok(members::insert_member(&mut self.tx, member, now).await?)
    }

    async fn insert_ministries(&mut self, member_id: i64, names: &[String], now: i64) -> StoreResult<()> {
        Ok(members::insert_ministries(&mut self.tx, member_id, names, now).await?)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        Ok(self.tx.commit().await?)
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        Ok(self.tx.rollback().await?)
    }
}

#[async_trait]
impl MemberStore for PgStore {
    async fn begin(&self) -> StoreResult<Box<dyn UnitOfWork>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }

    async fn list_members(&self) -> StoreResult<Vec<MemberWithMinistries>> {
        Ok(members::list_with_ministries(&self.pool).await?)
    }

    async fn find_member(&self, id: i64) -> StoreResult<Option<MemberWithMinistries>> {
        Ok(members::find_with_ministries(&self.pool, id).await?)
    }
}
