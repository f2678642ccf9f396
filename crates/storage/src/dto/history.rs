use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::HistoryPoint;

#[derive(Debug, Deserialize, IntoParams, Validate)]
pub struct HistoryQuery {
    /// Newest points to return, oldest first
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 1000, message = "limit must be between 1 and 1000"))]
    pub limit: i64,
}

fn default_limit() -> i64 {
    500
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HistoryPointResponse {
    pub total_points: i64,
    pub recorded_at: DateTime<Utc>,
    pub run_id: Uuid,
}

impl From<HistoryPoint> for HistoryPointResponse {
    fn from(point: HistoryPoint) -> Self {
        Self {
            total_points: point.total_points,
            recorded_at: point.recorded_at,
            run_id: point.run_id,
        }
    }
}

/// Response containing one participant's score series
#[derive(Debug, Serialize, ToSchema)]
pub struct HistorySeriesResponse {
    pub participant_id: Uuid,
    pub participant_name: String,
    pub points: Vec<HistoryPointResponse>,
}
