use chrono::{DateTime, Duration, Utc};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};

use crate::database::entities::{measurements, measurements::Entity as Measurements};
use crate::errors::CoreError;

pub const DEFAULT_LIMIT: u64 = 1000;
pub const MAX_LIMIT: u64 = 10_000;

/// Filter for a multi-series time-window query. Both window ends are
/// inclusive; a missing end leaves that side unbounded.
#[derive(Clone, Debug)]
pub struct MeasurementFilter {
    pub series_ids: Vec<i32>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub limit: u64,
}

impl MeasurementFilter {
    pub fn new(series_ids: Vec<i32>) -> Self {
        Self {
            series_ids,
            start: None,
            end: None,
            limit: DEFAULT_LIMIT,
        }
    }

    pub fn with_quick_range(mut self, range: QuickRange, now: DateTime<Utc>) -> Self {
        let (start, end) = range.window(now);
        self.start = Some(start);
        self.end = Some(end);
        self
    }
}

/// Precomputed date window relative to the current instant, matching the
/// dashboard's "Last 24h / 7 days / 30 days" shortcuts.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum QuickRange {
    Last24h,
    Last7d,
    Last30d,
}

impl QuickRange {
    pub fn window(self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let days = match self {
            QuickRange::Last24h => 1,
            QuickRange::Last7d => 7,
            QuickRange::Last30d => 30,
        };
        (now - Duration::days(days), now)
    }
}

/// Query/Filter Engine. Purely derived from store contents at call time; no
/// caching layer, so results reflect the latest writes immediately.
#[derive(Clone)]
pub struct QueryService {
    db: DatabaseConnection,
}

impl QueryService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Union of measurements over the given series ids within the inclusive
    /// window, ordered ascending by timestamp with id as the tie-break, and
    /// truncated to `limit` entries from the head of the ordering.
    ///
    /// An empty id set means "select none" and yields an empty result; callers
    /// wanting everything must enumerate the full id set.
    pub async fn query(
        &self,
        filter: &MeasurementFilter,
    ) -> Result<Vec<measurements::Model>, CoreError> {
        if filter.series_ids.is_empty() {
            return Ok(Vec::new());
        }

        let limit = filter.limit.min(MAX_LIMIT);

        let mut query = Measurements::find()
            .filter(measurements::Column::SeriesId.is_in(filter.series_ids.iter().copied()));

        if let Some(start) = filter.start {
            query = query.filter(measurements::Column::Timestamp.gte(start));
        }
        if let Some(end) = filter.end {
            query = query.filter(measurements::Column::Timestamp.lte(end));
        }

        Ok(query
            .order_by_asc(measurements::Column::Timestamp)
            .order_by_asc(measurements::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await?)
    }
}
