use sqlx::{sqlite::SqliteRow, Row};

use ewaste_core::domain::party::{BusinessId, UserId};
use ewaste_core::domain::pickup::{
    PickupRequest, PickupRequestId, PickupStatus, RecyclerSnapshot, Requester,
};
use ewaste_core::workflow::PickupTransition;

use super::activity::insert_activity;
use super::codec::{format_timestamp, parse_timestamp, parse_u32};
use super::{PickupRequestRepository, RepositoryError};
use crate::DbPool;

const SELECT_PICKUP_REQUEST: &str = "SELECT
        id,
        user_id,
        requester_name,
        requester_email,
        requester_address,
        business_id,
        recycler_name,
        recycler_address,
        recycler_mobile,
        recycler_website,
        category,
        quantity,
        status,
        created_at
     FROM pickup_request";

pub struct SqlPickupRepository {
    pool: DbPool,
}

impl SqlPickupRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl PickupRequestRepository for SqlPickupRepository {
    async fn find_by_id(
        &self,
        id: &PickupRequestId,
    ) -> Result<Option<PickupRequest>, RepositoryError> {
        let row = sqlx::query(&format!("{SELECT_PICKUP_REQUEST} WHERE id = ?"))
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.map(pickup_request_from_row).transpose()
    }

    async fn create(&self, request: PickupRequest) -> Result<(), RepositoryError> {
        let created_at = format_timestamp(&request.created_at);
        let result = sqlx::query(
            "INSERT INTO pickup_request (
                id,
                user_id,
                requester_name,
                requester_email,
                requester_address,
                business_id,
                recycler_name,
                recycler_address,
                recycler_mobile,
                recycler_website,
                category,
                quantity,
                status,
                created_at,
                updated_at
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&request.id.0)
        .bind(&request.requester.user_id.0)
        .bind(&request.requester.display_name)
        .bind(&request.requester.email)
        .bind(&request.requester.address)
        .bind(&request.recycler.business_id.0)
        .bind(&request.recycler.name)
        .bind(&request.recycler.address)
        .bind(&request.recycler.mobile)
        .bind(&request.recycler.website)
        .bind(&request.category)
        .bind(i64::from(request.quantity))
        .bind(request.status.as_str())
        .bind(&created_at)
        .bind(&created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(error)) if error.is_unique_violation() => Err(
                RepositoryError::Conflict(format!("pickup request {} already exists", request.id)),
            ),
            Err(error) => Err(error.into()),
        }
    }

    async fn list_for_business(
        &self,
        business_id: &BusinessId,
    ) -> Result<Vec<PickupRequest>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "{SELECT_PICKUP_REQUEST} WHERE business_id = ? ORDER BY created_at DESC, id ASC"
        ))
        .bind(&business_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(pickup_request_from_row).collect()
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<PickupRequest>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "{SELECT_PICKUP_REQUEST} WHERE user_id = ? ORDER BY created_at DESC, id ASC"
        ))
        .bind(&user_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(pickup_request_from_row).collect()
    }

    async fn apply_transition(&self, transition: &PickupTransition) -> Result<(), RepositoryError> {
        let request = &transition.request;
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE pickup_request
             SET status = ?, updated_at = ?
             WHERE id = ? AND status = ?",
        )
        .bind(request.status.as_str())
        .bind(format_timestamp(&transition.transitioned_at))
        .bind(&request.id.0)
        .bind(transition.from.as_str())
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(RepositoryError::Conflict(format!(
                "pickup request {} is missing or no longer `{}`",
                request.id, transition.from
            )));
        }

        insert_activity(&mut tx, &transition.activity).await?;

        tx.commit().await?;
        Ok(())
    }
}

fn pickup_request_from_row(row: SqliteRow) -> Result<PickupRequest, RepositoryError> {
    let status_raw = row.try_get::<String, _>("status")?;
    let status = PickupStatus::parse(&status_raw)
        .ok_or_else(|| RepositoryError::Decode(format!("unknown pickup status `{status_raw}`")))?;

    Ok(PickupRequest {
        id: PickupRequestId(row.try_get("id")?),
        requester: Requester {
            user_id: UserId(row.try_get("user_id")?),
            display_name: row.try_get("requester_name")?,
            email: row.try_get("requester_email")?,
            address: row.try_get("requester_address")?,
        },
        recycler: RecyclerSnapshot {
            business_id: BusinessId(row.try_get("business_id")?),
            name: row.try_get("recycler_name")?,
            address: row.try_get("recycler_address")?,
            mobile: row.try_get("recycler_mobile")?,
            website: row.try_get("recycler_website")?,
        },
        category: row.try_get("category")?,
        quantity: parse_u32("quantity", row.try_get("quantity")?)?,
        status,
        created_at: parse_timestamp("created_at", row.try_get("created_at")?)?,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};

    use ewaste_core::domain::activity::{ActivityId, ActivityRecord};
    use ewaste_core::domain::party::{BusinessId, UserId};
    use ewaste_core::domain::pickup::{
        PickupRequest, PickupRequestId, PickupStatus, RecyclerSnapshot, Requester,
    };
    use ewaste_core::workflow::{PickupTransition, PickupWorkflow};

    use super::SqlPickupRepository;
    use crate::migrations;
    use crate::repositories::{
        ActivityRepository, PickupRequestRepository, RepositoryError, SqlActivityRepository,
    };
    use crate::{connect_with_settings, DbPool};

    #[tokio::test]
    async fn sql_pickup_repo_round_trip_and_listing() {
        let pool = setup_pool().await;
        let repo = SqlPickupRepository::new(pool.clone());
        let first = sample_request("REQ-1", "biz-1", "2026-03-01T09:00:00Z");
        let second = sample_request("REQ-2", "biz-1", "2026-03-02T09:00:00Z");
        let other = sample_request("REQ-3", "biz-2", "2026-03-03T09:00:00Z");

        for request in [&first, &second, &other] {
            repo.create(request.clone()).await.expect("create request");
        }

        let found = repo.find_by_id(&first.id).await.expect("find request");
        assert_eq!(found, Some(first.clone()));

        let for_business =
            repo.list_for_business(&BusinessId("biz-1".to_string())).await.expect("list");
        assert_eq!(for_business, vec![second.clone(), first.clone()]);

        let for_user = repo.list_for_user(&UserId("user-1".to_string())).await.expect("list");
        assert_eq!(for_user.len(), 3);

        pool.close().await;
    }

    #[tokio::test]
    async fn duplicate_create_is_a_conflict() {
        let pool = setup_pool().await;
        let repo = SqlPickupRepository::new(pool.clone());
        let request = sample_request("REQ-1", "biz-1", "2026-03-01T09:00:00Z");

        repo.create(request.clone()).await.expect("create request");
        let error = repo.create(request).await.expect_err("duplicate should fail");

        assert!(matches!(error, RepositoryError::Conflict(_)));
        pool.close().await;
    }

    #[tokio::test]
    async fn apply_transition_updates_status_and_appends_activity() {
        let pool = setup_pool().await;
        let repo = SqlPickupRepository::new(pool.clone());
        let activities = SqlActivityRepository::new(pool.clone());
        let request = sample_request("REQ-1", "biz-1", "2026-03-01T09:00:00Z");
        repo.create(request.clone()).await.expect("create request");

        let transition = PickupWorkflow::default()
            .transition(&request, PickupStatus::Accepted, parse_ts("2026-03-01T10:00:00Z"))
            .expect("pending -> accepted");
        repo.apply_transition(&transition).await.expect("apply transition");

        let stored = repo.find_by_id(&request.id).await.expect("find").expect("present");
        assert_eq!(stored.status, PickupStatus::Accepted);

        let feed = activities.list_for_request(&request.id).await.expect("list activities");
        assert_eq!(feed, vec![transition.activity]);

        pool.close().await;
    }

    #[tokio::test]
    async fn stale_transition_is_rejected_without_writing() {
        let pool = setup_pool().await;
        let repo = SqlPickupRepository::new(pool.clone());
        let activities = SqlActivityRepository::new(pool.clone());
        let request = sample_request("REQ-1", "biz-1", "2026-03-01T09:00:00Z");
        repo.create(request.clone()).await.expect("create request");

        let workflow = PickupWorkflow::default();
        let at = parse_ts("2026-03-01T10:00:00Z");
        let accept = workflow.transition(&request, PickupStatus::Accepted, at).expect("accept");
        let reject = workflow.transition(&request, PickupStatus::Rejected, at).expect("reject");

        repo.apply_transition(&accept).await.expect("first writer wins");
        let error = repo.apply_transition(&reject).await.expect_err("second writer conflicts");

        assert!(matches!(error, RepositoryError::Conflict(_)));
        let stored = repo.find_by_id(&request.id).await.expect("find").expect("present");
        assert_eq!(stored.status, PickupStatus::Accepted);
        let feed = activities.list_for_request(&request.id).await.expect("list activities");
        assert_eq!(feed.len(), 1);

        pool.close().await;
    }

    #[tokio::test]
    async fn failed_activity_append_rolls_back_status() {
        let pool = setup_pool().await;
        let repo = SqlPickupRepository::new(pool.clone());
        let request = sample_request("REQ-1", "biz-1", "2026-03-01T09:00:00Z");
        repo.create(request.clone()).await.expect("create request");

        let mut transition = PickupWorkflow::default()
            .transition(&request, PickupStatus::Accepted, parse_ts("2026-03-01T10:00:00Z"))
            .expect("accept");
        transition.activity = ActivityRecord {
            id: ActivityId("ACT-TAKEN".to_string()),
            ..transition.activity
        };
        occupy_activity_id(&pool, &request, "ACT-TAKEN").await;

        let error = repo.apply_transition(&transition).await.expect_err("insert should fail");

        assert!(matches!(error, RepositoryError::Database(_)));
        let stored = repo.find_by_id(&request.id).await.expect("find").expect("present");
        assert_eq!(stored.status, PickupStatus::Pending);

        pool.close().await;
    }

    #[tokio::test]
    async fn transition_for_missing_request_is_a_conflict() {
        let pool = setup_pool().await;
        let repo = SqlPickupRepository::new(pool.clone());
        let request = sample_request("REQ-GHOST", "biz-1", "2026-03-01T09:00:00Z");

        let transition: PickupTransition = PickupWorkflow::default()
            .transition(&request, PickupStatus::Accepted, parse_ts("2026-03-01T10:00:00Z"))
            .expect("accept");

        let error = repo.apply_transition(&transition).await.expect_err("nothing to update");
        assert!(matches!(error, RepositoryError::Conflict(_)));

        pool.close().await;
    }

    async fn setup_pool() -> DbPool {
        let pool = connect_with_settings("sqlite::memory:?cache=shared", 1, 30)
            .await
            .expect("connect test pool");
        migrations::run_pending(&pool).await.expect("run migrations");
        pool
    }

    async fn occupy_activity_id(pool: &DbPool, request: &PickupRequest, id: &str) {
        sqlx::query(
            "INSERT INTO activity (id, user_id, request_id, message, occurred_at)
             VALUES (?, ?, ?, 'placeholder', '2026-03-01T09:30:00.000000000Z')",
        )
        .bind(id)
        .bind(&request.requester.user_id.0)
        .bind(&request.id.0)
        .execute(pool)
        .await
        .expect("insert placeholder activity");
    }

    fn sample_request(id: &str, business: &str, created_at: &str) -> PickupRequest {
        PickupRequest {
            id: PickupRequestId(id.to_string()),
            requester: Requester {
                user_id: UserId("user-1".to_string()),
                display_name: "Asha".to_string(),
                email: "asha@example.com".to_string(),
                address: "12 Ring Road, Surat".to_string(),
            },
            recycler: RecyclerSnapshot {
                business_id: BusinessId(business.to_string()),
                name: "Eco Recycler".to_string(),
                address: "Surat".to_string(),
                mobile: "+91 00000 00000".to_string(),
                website: "https://recycler.example".to_string(),
            },
            category: "Laptop".to_string(),
            quantity: 2,
            status: PickupStatus::Pending,
            created_at: parse_ts(created_at),
        }
    }

    fn parse_ts(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value).expect("valid rfc3339").with_timezone(&Utc)
    }
}
