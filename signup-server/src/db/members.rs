//! Member queries
//!
//! Writes take a `&mut PgConnection` so they can run inside a transaction;
//! reads go straight to the pool.

use shared::models::MemberWithMinistries;
use sqlx::{PgConnection, PgPool};

use super::NewMember;

/// Member columns plus ministries joined in insertion order
const MEMBER_WITH_MINISTRIES_SELECT: &str = r#"
SELECT
    m.id, m.first_name, m.last_name, m.email, m.phone, m.birth_date,
    m.address, m.city, m.state, m.zip_code, m.membership_type,
    m.attendance, m.baptized, m.salvation,
    m.emergency_contact_name, m.emergency_contact_phone,
    m.prayer_request, m.how_heard, m.created_at, m.updated_at,
    string_agg(mi.ministry_name, ',' ORDER BY mi.id) AS ministries
FROM members m
LEFT JOIN ministry_interests mi ON mi.member_id = m.id
"#;

pub async fn insert_member(
    conn: &mut PgConnection,
    member: &NewMember,
    now: i64,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO members (
            first_name, last_name, email, phone, birth_date,
            address, city, state, zip_code, membership_type,
            attendance, baptized, salvation,
            emergency_contact_name, emergency_contact_phone,
            prayer_request, how_heard, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $18)
        RETURNING id",
    )
    .bind(&member.first_name)
    .bind(&member.last_name)
    .bind(&member.email)
    .bind(&member.phone)
    .bind(member.birth_date)
    .bind(&member.address)
    .bind(&member.city)
    .bind(&member.state)
    .bind(&member.zip_code)
    .bind(member.membership_type.as_str())
    .bind(&member.attendance)
    .bind(&member.baptized)
    .bind(&member.salvation)
    .bind(&member.emergency_contact_name)
    .bind(&member.emergency_contact_phone)
    .bind(&member.prayer_request)
    .bind(&member.how_heard)
    .bind(now)
    .fetch_one(conn)
    .await
}

/// Batch insert via UNNEST; `WITH ORDINALITY` keeps ids in list order
pub async fn insert_ministries(
    conn: &mut PgConnection,
    member_id: i64,
    names: &[String],
    now: i64,
) -> Result<(), sqlx::Error> {
    if names.is_empty() {
        return Ok(());
    }
    sqlx::query(
        "INSERT INTO ministry_interests (member_id, ministry_name, created_at)
         SELECT $1, t.name, $3
         FROM UNNEST($2::text[]) WITH ORDINALITY AS t(name, ord)
         ORDER BY t.ord",
    )
    .bind(member_id)
    .bind(names)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn list_with_ministries(pool: &PgPool) -> Result<Vec<MemberWithMinistries>, sqlx::Error> {
    let sql = format!(
        "{MEMBER_WITH_MINISTRIES_SELECT} GROUP BY m.id ORDER BY m.created_at DESC, m.id DESC"
    );
    sqlx::query_as(&sql).fetch_all(pool).await
}

pub async fn find_with_ministries(
    pool: &PgPool,
    id: i64,
) -> Result<Option<MemberWithMinistries>, sqlx::Error> {
    let sql = format!("{MEMBER_WITH_MINISTRIES_SELECT} WHERE m.id = $1 GROUP BY m.id");
    sqlx::query_as(&sql).bind(id).fetch_optional(pool).await
}
