use sqlx::{sqlite::SqliteRow, Row};

use ewaste_core::domain::party::{BusinessId, UserId};
use ewaste_core::domain::report::{EwasteReport, EwasteReportId};
use ewaste_core::pricing::Condition;

use super::codec::{
    format_timestamp, parse_decimal, parse_optional_decimal, parse_timestamp, parse_u32,
};
use super::{EwasteReportRepository, RepositoryError};
use crate::DbPool;

pub struct SqlEwasteReportRepository {
    pool: DbPool,
}

impl SqlEwasteReportRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl EwasteReportRepository for SqlEwasteReportRepository {
    async fn find_by_id(
        &self,
        id: &EwasteReportId,
    ) -> Result<Option<EwasteReport>, RepositoryError> {
        let row = sqlx::query(
            "SELECT
                id,
                user_id,
                business_id,
                category,
                quantity,
                weight_kg,
                brand,
                condition,
                price,
                submitted_at
             FROM ewaste_report
             WHERE id = ?",
        )
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.map(report_from_row).transpose()
    }

    async fn save(&self, report: EwasteReport) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO ewaste_report (
                id,
                user_id,
                business_id,
                category,
                quantity,
                weight_kg,
                brand,
                condition,
                price,
                submitted_at
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                user_id = excluded.user_id,
                business_id = excluded.business_id,
                category = excluded.category,
                quantity = excluded.quantity,
                weight_kg = excluded.weight_kg,
                brand = excluded.brand,
                condition = excluded.condition,
                price = excluded.price,
                submitted_at = excluded.submitted_at",
        )
        .bind(&report.id.0)
        .bind(&report.user_id.0)
        .bind(report.business_id.as_ref().map(|id| id.0.as_str()))
        .bind(&report.category)
        .bind(i64::from(report.quantity))
        .bind(report.weight_kg.map(|weight| weight.to_string()))
        .bind(report.brand.as_deref())
        .bind(report.condition.as_ref().map(Condition::as_str))
        .bind(report.price.to_string())
        .bind(format_timestamp(&report.submitted_at))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<EwasteReport>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT
                id,
                user_id,
                business_id,
                category,
                quantity,
                weight_kg,
                brand,
                condition,
                price,
                submitted_at
             FROM ewaste_report
             WHERE user_id = ?
             ORDER BY submitted_at DESC, id ASC",
        )
        .bind(&user_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(report_from_row).collect()
    }

    async fn list_for_business(
        &self,
        business_id: &BusinessId,
    ) -> Result<Vec<EwasteReport>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT
                id,
                user_id,
                business_id,
                category,
                quantity,
                weight_kg,
                brand,
                condition,
                price,
                submitted_at
             FROM ewaste_report
             WHERE business_id = ?
             ORDER BY submitted_at DESC, id ASC",
        )
        .bind(&business_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(report_from_row).collect()
    }
}

fn report_from_row(row: SqliteRow) -> Result<EwasteReport, RepositoryError> {
    let condition = row
        .try_get::<Option<String>, _>("condition")?
        .map(|value| {
            Condition::parse(&value)
                .ok_or_else(|| RepositoryError::Decode(format!("unknown condition `{value}`")))
        })
        .transpose()?;

    Ok(EwasteReport {
        id: EwasteReportId(row.try_get("id")?),
        user_id: UserId(row.try_get("user_id")?),
        business_id: row.try_get::<Option<String>, _>("business_id")?.map(BusinessId),
        category: row.try_get("category")?,
        quantity: parse_u32("quantity", row.try_get("quantity")?)?,
        weight_kg: parse_optional_decimal("weight_kg", row.try_get("weight_kg")?)?,
        brand: row.try_get("brand")?,
        condition,
        price: parse_decimal("price", row.try_get("price")?)?,
        submitted_at: parse_timestamp("submitted_at", row.try_get("submitted_at")?)?,
    })
}
