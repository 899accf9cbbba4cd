// Postgres persistence for rank tracking.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use rankwatch_common::{clean_term, Keyword, Observation, TrackingConfig};

use super::{InsertReport, RankStore, RejectedObservation};
use crate::error::{StoreError, StoreResult};

#[derive(Clone)]
pub struct PgRankStore {
    pool: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct KeywordRow {
    id: Uuid,
    keyword: String,
    created_at: DateTime<Utc>,
}

impl From<KeywordRow> for Keyword {
    fn from(row: KeywordRow) -> Self {
        Keyword {
            id: row.id,
            keyword: row.keyword,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ConfigRow {
    url: String,
    competitor_urls: Vec<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct ObservationRow {
    keyword_id: Uuid,
    url: String,
    position: i32,
    check_date: DateTime<Utc>,
}

impl From<ObservationRow> for Observation {
    fn from(row: ObservationRow) -> Self {
        Observation {
            keyword_id: row.keyword_id,
            url: row.url,
            // CHECK (position > 0) guarantees the conversion.
            position: u32::try_from(row.position).unwrap_or_default(),
            check_date: row.check_date,
        }
    }
}

impl PgRankStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self::new(pool))
    }

    /// Run the embedded SQL migrations.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl RankStore for PgRankStore {
    async fn list_keywords(&self) -> StoreResult<Vec<Keyword>> {
        let rows = sqlx::query_as::<_, KeywordRow>(
            "SELECT id, keyword, created_at FROM keywords ORDER BY keyword ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Keyword::from).collect())
    }

    async fn find_keyword(&self, id: Uuid) -> StoreResult<Option<Keyword>> {
        let row = sqlx::query_as::<_, KeywordRow>(
            "SELECT id, keyword, created_at FROM keywords WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Keyword::from))
    }

    async fn insert_keyword(&self, term: &str) -> StoreResult<Keyword> {
        let term = clean_term(term)?;
        let keyword = Keyword::new(&term)?;

        let result = sqlx::query_as::<_, KeywordRow>(
            r#"
            INSERT INTO keywords (id, keyword, created_at)
            VALUES ($1, $2, $3)
            RETURNING id, keyword, created_at
            "#,
        )
        .bind(keyword.id)
        .bind(&keyword.keyword)
        .bind(keyword.created_at)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Ok(row.into()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(StoreError::DuplicateKeyword(term))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_keyword(&self, id: Uuid) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        // The FK cascades too; deleting explicitly keeps the count visible in logs.
        let removed = sqlx::query("DELETE FROM observations WHERE keyword_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let deleted = sqlx::query("DELETE FROM keywords WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        debug!(keyword_id = %id, observations = removed, "Deleted keyword");
        Ok(deleted > 0)
    }

    async fn tracking_config(&self) -> StoreResult<Option<TrackingConfig>> {
        let row = sqlx::query_as::<_, ConfigRow>(
            "SELECT url, competitor_urls FROM tracking_config WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| TrackingConfig {
            url: r.url,
            competitor_urls: r.competitor_urls,
        }))
    }

    async fn save_tracking_config(&self, config: &TrackingConfig) -> StoreResult<TrackingConfig> {
        let row = sqlx::query_as::<_, ConfigRow>(
            r#"
            INSERT INTO tracking_config (id, url, competitor_urls, updated_at)
            VALUES (1, $1, $2, now())
            ON CONFLICT (id) DO UPDATE
                SET url = EXCLUDED.url,
                    competitor_urls = EXCLUDED.competitor_urls,
                    updated_at = now()
            RETURNING url, competitor_urls
            "#,
        )
        .bind(&config.url)
        .bind(&config.competitor_urls)
        .fetch_one(&self.pool)
        .await?;

        Ok(TrackingConfig {
            url: row.url,
            competitor_urls: row.competitor_urls,
        })
    }

    async fn insert_observations(&self, observations: &[Observation]) -> StoreResult<InsertReport> {
        let mut report = InsertReport::default();
        if observations.is_empty() {
            return Ok(report);
        }

        let ids: Vec<Uuid> = observations.iter().map(|o| o.keyword_id).collect();
        let known: HashSet<Uuid> =
            sqlx::query_scalar::<_, Uuid>("SELECT id FROM keywords WHERE id = ANY($1)")
                .bind(&ids)
                .fetch_all(&self.pool)
                .await?
                .into_iter()
                .collect();

        let mut pending: Vec<&Observation> = Vec::new();
        let mut keyword_ids = Vec::new();
        let mut urls = Vec::new();
        let mut positions = Vec::new();
        let mut check_dates = Vec::new();

        for obs in observations {
            if let Err(e) = obs.validate() {
                report.rejected.push(RejectedObservation::new(obs, e.to_string()));
                continue;
            }
            let Ok(position) = i32::try_from(obs.position) else {
                report
                    .rejected
                    .push(RejectedObservation::new(obs, "position out of range"));
                continue;
            };
            if !known.contains(&obs.keyword_id) {
                report
                    .rejected
                    .push(RejectedObservation::new(obs, "unknown keyword"));
                continue;
            }
            pending.push(obs);
            keyword_ids.push(obs.keyword_id);
            urls.push(obs.url.clone());
            positions.push(position);
            check_dates.push(obs.check_date);
        }

        if keyword_ids.is_empty() {
            return Ok(report);
        }

        // Rows whose keyword was deleted since the lookup are skipped, not fatal.
        let stored: Vec<Uuid> = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO observations (keyword_id, url, position, check_date)
            SELECT t.keyword_id, t.url, t.position, t.check_date
            FROM UNNEST($1::uuid[], $2::text[], $3::int4[], $4::timestamptz[])
                AS t(keyword_id, url, position, check_date)
            WHERE EXISTS (SELECT 1 FROM keywords k WHERE k.id = t.keyword_id)
            RETURNING keyword_id
            "#,
        )
        .bind(&keyword_ids)
        .bind(&urls)
        .bind(&positions)
        .bind(&check_dates)
        .fetch_all(&self.pool)
        .await?;

        report.inserted = stored.len();
        let stored: HashSet<Uuid> = stored.into_iter().collect();
        report.rejected.extend(vanished(&pending, &stored));
        Ok(report)
    }

    async fn recent_observations(
        &self,
        keyword_id: Uuid,
        per_url: usize,
    ) -> StoreResult<Vec<Observation>> {
        let rows = sqlx::query_as::<_, ObservationRow>(
            r#"
            SELECT keyword_id, url, position, check_date
            FROM (
                SELECT keyword_id, url, position, check_date,
                       ROW_NUMBER() OVER (PARTITION BY url ORDER BY check_date DESC) AS rn
                FROM observations
                WHERE keyword_id = $1
            ) ranked
            WHERE rn <= $2
            ORDER BY check_date DESC
            "#,
        )
        .bind(keyword_id)
        .bind(per_url as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Observation::from).collect())
    }

    async fn latest_check_date(&self) -> StoreResult<Option<DateTime<Utc>>> {
        let latest = sqlx::query_scalar::<_, Option<DateTime<Utc>>>(
            "SELECT MAX(check_date) FROM observations",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(latest)
    }
}

/// Pending rows whose keyword produced no inserted row. The keyword check is
/// per keyword, so a keyword's rows are either all stored or all dropped.
fn vanished(pending: &[&Observation], stored: &HashSet<Uuid>) -> Vec<RejectedObservation> {
    pending
        .iter()
        .filter(|obs| !stored.contains(&obs.keyword_id))
        .map(|obs| RejectedObservation::new(obs, "keyword deleted during insert"))
        .collect()
}
