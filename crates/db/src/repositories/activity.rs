use sqlx::{sqlite::SqliteRow, Row, SqliteConnection};

use ewaste_core::domain::activity::{ActivityId, ActivityRecord};
use ewaste_core::domain::party::UserId;
use ewaste_core::domain::pickup::PickupRequestId;

use super::codec::{format_timestamp, parse_timestamp};
use super::{ActivityRepository, RepositoryError};
use crate::DbPool;

pub struct SqlActivityRepository {
    pool: DbPool,
}

impl SqlActivityRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ActivityRepository for SqlActivityRepository {
    async fn list_for_user(
        &self,
        user_id: &UserId,
        limit: Option<usize>,
    ) -> Result<Vec<ActivityRecord>, RepositoryError> {
        // SQLite treats a negative LIMIT as "no limit".
        let limit = limit.map_or(-1, |value| i64::try_from(value).unwrap_or(i64::MAX));

        let rows = sqlx::query(
            "SELECT id, user_id, request_id, message, occurred_at
             FROM activity
             WHERE user_id = ?
             ORDER BY occurred_at DESC, rowid DESC
             LIMIT ?",
        )
        .bind(&user_id.0)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(activity_from_row).collect()
    }

    async fn list_for_request(
        &self,
        request_id: &PickupRequestId,
    ) -> Result<Vec<ActivityRecord>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, user_id, request_id, message, occurred_at
             FROM activity
             WHERE request_id = ?
             ORDER BY occurred_at ASC, rowid ASC",
        )
        .bind(&request_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(activity_from_row).collect()
    }
}

pub(crate) async fn insert_activity(
    conn: &mut SqliteConnection,
    activity: &ActivityRecord,
) -> Result<(), RepositoryError> {
    sqlx::query(
        "INSERT INTO activity (id, user_id, request_id, message, occurred_at)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&activity.id.0)
    .bind(&activity.user_id.0)
    .bind(&activity.request_id.0)
    .bind(&activity.message)
    .bind(format_timestamp(&activity.occurred_at))
    .execute(&mut *conn)
    .await?;

    Ok(())
}

fn activity_from_row(row: SqliteRow) -> Result<ActivityRecord, RepositoryError> {
    Ok(ActivityRecord {
        id: ActivityId(row.try_get("id")?),
        user_id: UserId(row.try_get("user_id")?),
        request_id: PickupRequestId(row.try_get("request_id")?),
        message: row.try_get("message")?,
        occurred_at: parse_timestamp("occurred_at", row.try_get("occurred_at")?)?,
    })
}
