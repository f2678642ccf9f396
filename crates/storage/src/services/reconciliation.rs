//! Turns a fresh standings snapshot into new score history.
//!
//! One run walks `Idle → Fetching → Scoring → Deciding → Persisting → Idle`;
//! any failure lands in `Failed` and leaves stored history untouched. Runs
//! never overlap: a trigger that arrives while another run is in flight is
//! rejected with [`ReconcileError::AlreadyRunning`].
//!
//! When at least one participant's total moved, every participant gets a new
//! point stamped with the same timestamp and run id, so all series stay
//! aligned. When nothing moved, nothing is written.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, watch};
use tracing::{debug, error, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use super::leaderboard::{LeaderboardEntry, ParticipantTotal, build_leaderboard};
use super::position_scoring::RULES_VERSION;
use super::prediction_scoring::{ParticipantScore, ScoreWarning, score_participant};
use crate::error::{ReconcileError, StorageError};
use crate::models::{HistoryPoint, NewHistoryPoint, Prediction, StandingsSnapshot};
use crate::traits::{HistoryStore, PredictionStore, StandingsProvider};

/// Appends racing another writer are re-decided this many times in total.
const MAX_APPEND_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileState {
    Idle,
    Fetching,
    Scoring,
    Deciding,
    Persisting,
    Failed,
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileStatus {
    /// A new batch of history points was committed.
    Appended,
    /// Every total matches its latest history point; nothing was written.
    Unchanged,
    /// Dry run: `points` holds the batch a real run would append.
    WouldAppend,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReconcileReport {
    pub status: ReconcileStatus,
    pub run_id: Option<Uuid>,
    pub recorded_at: Option<DateTime<Utc>>,
    pub snapshot_captured_at: DateTime<Utc>,
    pub rules_version: u32,
    pub changed_participants: Vec<Uuid>,
    pub points: Vec<NewHistoryPoint>,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub warnings: Vec<ScoreWarning>,
}

impl ReconcileReport {
    pub fn appended(&self) -> usize {
        match self.status {
            ReconcileStatus::Appended => self.points.len(),
            ReconcileStatus::Unchanged | ReconcileStatus::WouldAppend => 0,
        }
    }
}

enum Decision {
    Unchanged,
    Append {
        changed: Vec<Uuid>,
        batch: Vec<NewHistoryPoint>,
    },
}

struct Evaluation {
    snapshot_captured_at: DateTime<Utc>,
    leaderboard: Vec<LeaderboardEntry>,
    warnings: Vec<ScoreWarning>,
    decision: Decision,
}

impl Evaluation {
    fn into_report(self, status: ReconcileStatus) -> ReconcileReport {
        let (run_id, recorded_at, changed, points) = match self.decision {
            Decision::Unchanged => (None, None, Vec::new(), Vec::new()),
            Decision::Append { changed, batch } => {
                let run_id = batch.first().map(|p| p.run_id);
                let recorded_at = batch.first().map(|p| p.recorded_at);
                (run_id, recorded_at, changed, batch)
            }
        };

        ReconcileReport {
            status,
            run_id,
            recorded_at,
            snapshot_captured_at: self.snapshot_captured_at,
            rules_version: RULES_VERSION,
            changed_participants: changed,
            points,
            leaderboard: self.leaderboard,
            warnings: self.warnings,
        }
    }
}

pub struct ReconciliationService {
    provider: Arc<dyn StandingsProvider>,
    predictions: Arc<dyn PredictionStore>,
    history: Arc<dyn HistoryStore>,
    clock: Arc<dyn Clock>,
    in_flight: Mutex<()>,
    state: watch::Sender<ReconcileState>,
}

impl ReconciliationService {
    pub fn new(
        provider: Arc<dyn StandingsProvider>,
        predictions: Arc<dyn PredictionStore>,
        history: Arc<dyn HistoryStore>,
    ) -> Self {
        Self {
            provider,
            predictions,
            history,
            clock: Arc::new(SystemClock),
            in_flight: Mutex::new(()),
            state: watch::Sender::new(ReconcileState::Idle),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn state(&self) -> ReconcileState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ReconcileState> {
        self.state.subscribe()
    }

    /// Runs one reconciliation and persists its outcome.
    ///
    /// Retrying is left to the caller; a failed run can simply be triggered
    /// again since scores are recomputed from scratch every time.
    pub async fn reconcile(&self) -> Result<ReconcileReport, ReconcileError> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            warn!("Reconciliation trigger rejected: a run is already in flight");
            return Err(ReconcileError::AlreadyRunning);
        };

        info!(provider = self.provider.name(), "Starting reconciliation");
        let result = self.run().await;

        match &result {
            Ok(report) => {
                self.transition(ReconcileState::Idle);
                info!(
                    status = ?report.status,
                    appended = report.appended(),
                    warnings = report.warnings.len(),
                    "Reconciliation finished"
                );
            }
            Err(e) => {
                self.transition(ReconcileState::Failed);
                error!("Reconciliation failed: {}", e);
            }
        }

        result
    }

    /// Computes what [`reconcile`](Self::reconcile) would do without writing anything.
    pub async fn preview(&self) -> Result<ReconcileReport, ReconcileError> {
        let (snapshot, predictions) = self.fetch_inputs().await?;
        let scores = score_all(&predictions, &snapshot)?;
        let latest = self
            .history
            .latest_points()
            .await
            .map_err(ReconcileError::StoreUnavailable)?;
        let evaluation = self.evaluate(&snapshot, &scores, &latest);

        let status = match evaluation.decision {
            Decision::Unchanged => ReconcileStatus::Unchanged,
            Decision::Append { .. } => ReconcileStatus::WouldAppend,
        };
        Ok(evaluation.into_report(status))
    }

    /// Live score breakdown for one participant against a fresh snapshot.
    pub async fn score_participant(
        &self,
        participant_id: Uuid,
    ) -> Result<ParticipantScore, ReconcileError> {
        let (snapshot, predictions) = self.fetch_inputs().await?;
        let prediction = predictions
            .iter()
            .find(|p| p.participant_id == participant_id)
            .ok_or(ReconcileError::UnknownParticipant(participant_id))?;

        prediction.validate()?;
        let score = score_participant(prediction, &snapshot);
        for warning in &score.warnings {
            warn!("{}", warning);
        }
        Ok(score)
    }

    /// Fetches and normalizes the current standings.
    pub async fn current_snapshot(&self) -> Result<StandingsSnapshot, ReconcileError> {
        let raw = self.provider.fetch_standings().await?;
        Ok(StandingsSnapshot::build(raw, self.now())?)
    }

    async fn run(&self) -> Result<ReconcileReport, ReconcileError> {
        self.transition(ReconcileState::Fetching);
        let raw = self.provider.fetch_standings().await?;
        let predictions = self
            .predictions
            .load_predictions()
            .await
            .map_err(ReconcileError::StoreUnavailable)?;

        self.transition(ReconcileState::Scoring);
        let snapshot = StandingsSnapshot::build(raw, self.now())?;
        let scores = score_all(&predictions, &snapshot)?;

        let mut attempt = 1;
        loop {
            self.transition(ReconcileState::Deciding);
            let latest = self
                .history
                .latest_points()
                .await
                .map_err(ReconcileError::StoreUnavailable)?;
            let evaluation = self.evaluate(&snapshot, &scores, &latest);

            let Decision::Append { changed, batch } = &evaluation.decision else {
                info!("Totals unchanged since the last history point, nothing to append");
                return Ok(evaluation.into_report(ReconcileStatus::Unchanged));
            };

            info!(
                changed = changed.len(),
                participants = batch.len(),
                "Totals changed, appending history points"
            );

            self.transition(ReconcileState::Persisting);
            match self.history.append_points(batch, &latest).await {
                Ok(stored) => {
                    debug!(stored = stored.len(), "History batch committed");
                    return Ok(evaluation.into_report(ReconcileStatus::Appended));
                }
                Err(StorageError::StaleHistory) if attempt < MAX_APPEND_ATTEMPTS => {
                    warn!(attempt, "History moved while deciding, re-reading latest points");
                    attempt += 1;
                }
                Err(e) => return Err(ReconcileError::PersistenceFailure(e)),
            }
        }
    }

    async fn fetch_inputs(&self) -> Result<(StandingsSnapshot, Vec<Prediction>), ReconcileError> {
        let snapshot = self.current_snapshot().await?;
        let predictions = self
            .predictions
            .load_predictions()
            .await
            .map_err(ReconcileError::StoreUnavailable)?;
        Ok((snapshot, predictions))
    }

    fn evaluate(
        &self,
        snapshot: &StandingsSnapshot,
        scores: &[ParticipantScore],
        latest: &[HistoryPoint],
    ) -> Evaluation {
        let totals: Vec<ParticipantTotal> = scores.iter().map(ParticipantScore::to_total).collect();
        let leaderboard = build_leaderboard(&totals);

        let warnings: Vec<ScoreWarning> = scores
            .iter()
            .flat_map(|s| s.warnings.iter().cloned())
            .collect();
        for warning in &warnings {
            warn!("{}", warning);
        }

        Evaluation {
            snapshot_captured_at: snapshot.captured_at(),
            leaderboard,
            warnings,
            decision: decide(scores, latest, self.now()),
        }
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn transition(&self, next: ReconcileState) {
        let previous = self.state.send_replace(next);
        debug!(?previous, ?next, "Reconciliation state changed");
    }
}

/// Validates every input, then scores every participant. Nothing is scored
/// unless all predictions are well formed.
fn score_all(
    predictions: &[Prediction],
    snapshot: &StandingsSnapshot,
) -> Result<Vec<ParticipantScore>, ReconcileError> {
    if predictions.is_empty() {
        warn!("No predictions stored, leaderboard will be empty");
    }

    for prediction in predictions {
        prediction.validate()?;
    }

    let scores: Vec<ParticipantScore> = predictions
        .iter()
        .map(|p| score_participant(p, snapshot))
        .collect();

    for score in &scores {
        debug!(
            participant = %score.participant_name,
            total = score.total,
            partial = score.is_partial(),
            "Scored prediction"
        );
    }

    Ok(scores)
}

fn decide(scores: &[ParticipantScore], latest: &[HistoryPoint], now: DateTime<Utc>) -> Decision {
    let previous: HashMap<Uuid, i64> = latest
        .iter()
        .map(|p| (p.participant_id, p.total_points))
        .collect();

    let changed: Vec<Uuid> = scores
        .iter()
        .filter(|s| previous.get(&s.participant_id) != Some(&i64::from(s.total)))
        .map(|s| s.participant_id)
        .collect();

    if changed.is_empty() {
        return Decision::Unchanged;
    }

    let recorded_at = next_timestamp(now, latest);
    let run_id = Uuid::new_v4();
    let batch = scores
        .iter()
        .map(|s| NewHistoryPoint {
            participant_id: s.participant_id,
            total_points: i64::from(s.total),
            recorded_at,
            run_id,
        })
        .collect();

    Decision::Append { changed, batch }
}

/// Timestamp for a new batch: `now` at storage precision, pushed past the
/// newest existing point so every series stays strictly increasing.
fn next_timestamp(now: DateTime<Utc>, latest: &[HistoryPoint]) -> DateTime<Utc> {
    let now = now.trunc_subsecs(6);
    match latest.iter().map(|p| p.recorded_at).max() {
        Some(last) if now <= last => last + TimeDelta::microseconds(1),
        _ => now,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tokio::sync::{Barrier, Notify};

    use super::*;
    use crate::error::{InvariantViolation, ProviderError};
    use crate::models::{PredictedPosition, RawStanding};

    const TEAMS: [&str; 4] = ["Arsenal", "Chelsea", "Fulham", "Everton"];

    fn standings(order: &[&str]) -> Vec<RawStanding> {
        order
            .iter()
            .zip(1u32..)
            .map(|(team, position)| RawStanding {
                team: team.to_string(),
                position: Some(position),
                played: 3,
                won: 1,
                drawn: 1,
                lost: 1,
                goals_for: 4,
                goals_against: 4,
                goal_difference: 0,
                points: 4,
            })
            .collect()
    }

    struct FakeProvider {
        standings: std::sync::Mutex<Result<Vec<RawStanding>, ProviderError>>,
        gate: Option<Arc<Notify>>,
        calls: AtomicUsize,
    }

    impl FakeProvider {
        fn new(order: &[&str]) -> Self {
            Self {
                standings: std::sync::Mutex::new(Ok(standings(order))),
                gate: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn gated(order: &[&str], gate: Arc<Notify>) -> Self {
            Self {
                gate: Some(gate),
                ..Self::new(order)
            }
        }

        fn set_order(&self, order: &[&str]) {
            *self.standings.lock().unwrap() = Ok(standings(order));
        }

        fn set_unreachable(&self) {
            *self.standings.lock().unwrap() =
                Err(ProviderError::Unreachable("connection refused".to_string()));
        }

        fn set_malformed(&self) {
            *self.standings.lock().unwrap() =
                Err(ProviderError::Malformed("missing field `table`".to_string()));
        }

        fn set_raw(&self, raw: Vec<RawStanding>) {
            *self.standings.lock().unwrap() = Ok(raw);
        }
    }

    #[async_trait]
    impl StandingsProvider for FakeProvider {
        async fn fetch_standings(&self) -> Result<Vec<RawStanding>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.standings.lock().unwrap().clone()
        }

        fn name(&self) -> &'static str {
            "fake"
        }
    }

    struct FakePredictions(Vec<Prediction>);

    #[async_trait]
    impl PredictionStore for FakePredictions {
        async fn load_predictions(&self) -> crate::error::Result<Vec<Prediction>> {
            Ok(self.0.clone())
        }
    }

    struct UnreadablePredictions;

    #[async_trait]
    impl PredictionStore for UnreadablePredictions {
        async fn load_predictions(&self) -> crate::error::Result<Vec<Prediction>> {
            Err(StorageError::Database(sqlx::Error::PoolTimedOut))
        }
    }

    #[derive(Default)]
    struct FakeHistory {
        points: std::sync::Mutex<Vec<HistoryPoint>>,
        reject_appends: AtomicBool,
        stale_rejections: AtomicUsize,
        /// Holds the first `readers` reads until all of them have arrived.
        read_barrier: Option<(Barrier, usize)>,
        reads: AtomicUsize,
    }

    impl FakeHistory {
        fn with_read_barrier(readers: usize) -> Self {
            Self {
                read_barrier: Some((Barrier::new(readers), readers)),
                ..Self::default()
            }
        }

        fn heads(points: &[HistoryPoint]) -> HashMap<Uuid, HistoryPoint> {
            let mut latest: HashMap<Uuid, HistoryPoint> = HashMap::new();
            for point in points {
                match latest.get(&point.participant_id) {
                    Some(existing) if existing.recorded_at >= point.recorded_at => {}
                    _ => {
                        latest.insert(point.participant_id, point.clone());
                    }
                }
            }
            latest
        }

        fn all(&self) -> Vec<HistoryPoint> {
            self.points.lock().unwrap().clone()
        }

        fn series(&self, participant_id: Uuid) -> Vec<HistoryPoint> {
            self.all()
                .into_iter()
                .filter(|p| p.participant_id == participant_id)
                .collect()
        }
    }

    #[async_trait]
    impl HistoryStore for FakeHistory {
        async fn latest_points(&self) -> crate::error::Result<Vec<HistoryPoint>> {
            if let Some((barrier, readers)) = &self.read_barrier {
                if self.reads.fetch_add(1, Ordering::SeqCst) < *readers {
                    barrier.wait().await;
                }
            }
            let points = self.points.lock().unwrap();
            Ok(Self::heads(&points).into_values().collect())
        }

        async fn append_points(
            &self,
            batch: &[NewHistoryPoint],
            baseline: &[HistoryPoint],
        ) -> crate::error::Result<Vec<HistoryPoint>> {
            if self.reject_appends.load(Ordering::SeqCst) {
                return Err(StorageError::ConstraintViolation("history table locked".to_string()));
            }
            let mut points = self.points.lock().unwrap();
            let current: HashMap<Uuid, Uuid> = Self::heads(&points)
                .into_values()
                .map(|p| (p.participant_id, p.history_id))
                .collect();
            let expected: HashMap<Uuid, Uuid> = baseline
                .iter()
                .map(|p| (p.participant_id, p.history_id))
                .collect();
            if current != expected {
                self.stale_rejections.fetch_add(1, Ordering::SeqCst);
                return Err(StorageError::StaleHistory);
            }
            let stored: Vec<HistoryPoint> = batch
                .iter()
                .map(|p| HistoryPoint {
                    history_id: Uuid::new_v4(),
                    participant_id: p.participant_id,
                    total_points: p.total_points,
                    recorded_at: p.recorded_at,
                    run_id: p.run_id,
                })
                .collect();
            points.extend(stored.iter().cloned());
            Ok(stored)
        }
    }

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    struct Fixture {
        provider: Arc<FakeProvider>,
        history: Arc<FakeHistory>,
        alice: Uuid,
        bob: Uuid,
        service: ReconciliationService,
    }

    fn fixture_with(provider: FakeProvider, predictions: Vec<Prediction>) -> Fixture {
        let alice = predictions[0].participant_id;
        let bob = predictions.get(1).map(|p| p.participant_id).unwrap_or(alice);
        let provider = Arc::new(provider);
        let history = Arc::new(FakeHistory::default());
        let service = ReconciliationService::new(
            provider.clone(),
            Arc::new(FakePredictions(predictions)),
            history.clone(),
        );
        Fixture {
            provider,
            history,
            alice,
            bob,
            service,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(
            FakeProvider::new(&TEAMS),
            vec![
                Prediction::from_ranking(Uuid::new_v4(), "Alice", TEAMS),
                Prediction::from_ranking(
                    Uuid::new_v4(),
                    "Bob",
                    ["Chelsea", "Arsenal", "Fulham", "Everton"],
                ),
            ],
        )
    }

    #[tokio::test]
    async fn test_first_run_appends_one_point_per_participant() {
        let f = fixture();

        let report = f.service.reconcile().await.unwrap();

        assert_eq!(report.status, ReconcileStatus::Appended);
        assert_eq!(report.appended(), 2);
        assert_eq!(f.history.all().len(), 2);
        assert_eq!(f.service.state(), ReconcileState::Idle);

        assert_eq!(report.leaderboard[0].participant_name, "Alice");
        assert_eq!(report.leaderboard[0].total, 40);
        assert_eq!(report.leaderboard[1].total, 30);
    }

    #[tokio::test]
    async fn test_unchanged_snapshot_appends_nothing() {
        let f = fixture();

        f.service.reconcile().await.unwrap();
        let second = f.service.reconcile().await.unwrap();

        assert_eq!(second.status, ReconcileStatus::Unchanged);
        assert_eq!(second.appended(), 0);
        assert!(second.run_id.is_none());
        assert_eq!(f.history.all().len(), 2);
    }

    #[tokio::test]
    async fn test_change_appends_for_every_participant_with_increasing_timestamps() {
        let f = fixture();
        f.service.reconcile().await.unwrap();

        f.provider.set_order(&["Chelsea", "Arsenal", "Fulham", "Everton"]);
        let report = f.service.reconcile().await.unwrap();

        assert_eq!(report.status, ReconcileStatus::Appended);
        assert_eq!(report.points.len(), 2);

        for participant in [f.alice, f.bob] {
            let series = f.history.series(participant);
            assert_eq!(series.len(), 2);
            assert!(series[0].recorded_at < series[1].recorded_at);
        }

        let run_ids: std::collections::HashSet<Uuid> =
            report.points.iter().map(|p| p.run_id).collect();
        assert_eq!(run_ids.len(), 1);
    }

    #[tokio::test]
    async fn test_unchanged_participant_still_gets_aligned_point() {
        let f = fixture_with(
            FakeProvider::new(&TEAMS),
            vec![
                Prediction::from_ranking(Uuid::new_v4(), "Alice", TEAMS),
                Prediction::from_ranking(
                    Uuid::new_v4(),
                    "Bob",
                    ["Arsenal", "Chelsea", "Everton", "Fulham"],
                ),
            ],
        );
        f.service.reconcile().await.unwrap();

        // Bob trades two exact picks for two others and keeps 30 points.
        f.provider.set_order(&["Chelsea", "Arsenal", "Everton", "Fulham"]);
        let report = f.service.reconcile().await.unwrap();

        assert_eq!(report.changed_participants, vec![f.alice]);
        assert_eq!(report.points.len(), 2);
        assert_eq!(f.history.series(f.bob).len(), 2);
        assert_eq!(f.history.series(f.alice).len(), 2);
    }

    #[tokio::test]
    async fn test_stuck_clock_still_yields_strictly_increasing_timestamps() {
        let now = Utc::now();
        let mut f = fixture();
        f.service = f.service.with_clock(Arc::new(FixedClock(now)));

        f.service.reconcile().await.unwrap();
        f.provider.set_order(&["Chelsea", "Arsenal", "Fulham", "Everton"]);
        f.service.reconcile().await.unwrap();

        let series = f.history.series(f.alice);
        assert_eq!(series.len(), 2);
        assert_eq!(
            series[1].recorded_at - series[0].recorded_at,
            TimeDelta::microseconds(1)
        );
    }

    #[tokio::test]
    async fn test_upstream_failure_leaves_history_untouched() {
        let f = fixture();
        f.service.reconcile().await.unwrap();

        f.provider.set_unreachable();
        let err = f.service.reconcile().await.unwrap_err();

        assert!(matches!(err, ReconcileError::UpstreamUnavailable(_)));
        assert!(err.is_retryable());
        assert_eq!(f.service.state(), ReconcileState::Failed);
        assert_eq!(f.history.all().len(), 2);
    }

    #[tokio::test]
    async fn test_malformed_upstream_payload_leaves_history_untouched() {
        let f = fixture();
        f.service.reconcile().await.unwrap();

        f.provider.set_malformed();
        let err = f.service.reconcile().await.unwrap_err();

        assert!(matches!(
            err,
            ReconcileError::UpstreamUnavailable(ProviderError::Malformed(_))
        ));
        assert_eq!(f.service.state(), ReconcileState::Failed);
        assert_eq!(f.history.all().len(), 2);
    }

    #[tokio::test]
    async fn test_unreadable_predictions_reported_as_store_failure() {
        let history = Arc::new(FakeHistory::default());
        let service = ReconciliationService::new(
            Arc::new(FakeProvider::new(&TEAMS)),
            Arc::new(UnreadablePredictions),
            history.clone(),
        );

        let err = service.reconcile().await.unwrap_err();

        assert!(matches!(err, ReconcileError::StoreUnavailable(_)));
        assert!(err.is_retryable());
        assert_eq!(service.state(), ReconcileState::Failed);
        assert!(history.all().is_empty());

        let err = service.preview().await.unwrap_err();
        assert!(matches!(err, ReconcileError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn test_malformed_snapshot_aborts_without_writes() {
        let f = fixture();
        let mut raw = standings(&TEAMS);
        raw[1].position = Some(1);
        f.provider.set_raw(raw);

        let err = f.service.reconcile().await.unwrap_err();

        assert!(matches!(
            err,
            ReconcileError::InputInvariantViolation(InvariantViolation::SnapshotPositions { .. })
        ));
        assert!(f.history.all().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_position_prediction_rejected_before_scoring() {
        let broken = Prediction::new(
            Uuid::new_v4(),
            "Mallory",
            vec![
                PredictedPosition {
                    team: "Arsenal".to_string(),
                    position: 1,
                },
                PredictedPosition {
                    team: "Chelsea".to_string(),
                    position: 1,
                },
                PredictedPosition {
                    team: "Fulham".to_string(),
                    position: 3,
                },
                PredictedPosition {
                    team: "Everton".to_string(),
                    position: 4,
                },
            ],
        );
        let f = fixture_with(
            FakeProvider::new(&TEAMS),
            vec![Prediction::from_ranking(Uuid::new_v4(), "Alice", TEAMS), broken],
        );

        let err = f.service.reconcile().await.unwrap_err();

        assert!(matches!(
            err,
            ReconcileError::InputInvariantViolation(InvariantViolation::PredictionPositions { .. })
        ));
        assert!(!err.is_retryable());
        assert!(f.history.all().is_empty());
        assert_eq!(f.service.state(), ReconcileState::Failed);
    }

    #[tokio::test]
    async fn test_missing_team_reported_as_warning() {
        let f = fixture();
        f.provider.set_order(&TEAMS[..3]);

        let report = f.service.reconcile().await.unwrap();

        assert_eq!(report.status, ReconcileStatus::Appended);
        // Both participants predicted Everton.
        assert_eq!(report.warnings.len(), 2);
        assert!(report.warnings.iter().all(|w| matches!(
            w,
            ScoreWarning::UnresolvedTeam { team, .. } if team == "Everton"
        )));
        assert_eq!(report.leaderboard[0].total, 30);
    }

    #[tokio::test]
    async fn test_persistence_failure_discards_batch() {
        let f = fixture();
        f.history.reject_appends.store(true, Ordering::SeqCst);

        let err = f.service.reconcile().await.unwrap_err();
        assert!(matches!(err, ReconcileError::PersistenceFailure(_)));
        assert_eq!(f.service.state(), ReconcileState::Failed);
        assert!(f.history.all().is_empty());

        f.history.reject_appends.store(false, Ordering::SeqCst);
        let report = f.service.reconcile().await.unwrap();
        assert_eq!(report.status, ReconcileStatus::Appended);
        assert_eq!(f.service.state(), ReconcileState::Idle);
    }

    #[tokio::test]
    async fn test_concurrent_trigger_rejected() {
        let gate = Arc::new(Notify::new());
        let f = fixture_with(
            FakeProvider::gated(&TEAMS, gate.clone()),
            vec![Prediction::from_ranking(Uuid::new_v4(), "Alice", TEAMS)],
        );
        let service = Arc::new(f.service);

        let mut state = service.subscribe();
        let first = tokio::spawn({
            let service = service.clone();
            async move { service.reconcile().await }
        });
        state
            .wait_for(|s| *s == ReconcileState::Fetching)
            .await
            .unwrap();

        let second = service.reconcile().await;
        assert!(matches!(second, Err(ReconcileError::AlreadyRunning)));

        gate.notify_one();
        let report = first.await.unwrap().unwrap();
        assert_eq!(report.status, ReconcileStatus::Appended);
        assert_eq!(f.provider.calls.load(Ordering::SeqCst), 1);
        assert_eq!(f.history.all().len(), 1);
    }

    #[tokio::test]
    async fn test_services_sharing_history_record_snapshot_once() {
        let history = Arc::new(FakeHistory::with_read_barrier(2));
        let predictions: Arc<dyn PredictionStore> = Arc::new(FakePredictions(vec![
            Prediction::from_ranking(Uuid::new_v4(), "Alice", TEAMS),
            Prediction::from_ranking(
                Uuid::new_v4(),
                "Bob",
                ["Chelsea", "Arsenal", "Fulham", "Everton"],
            ),
        ]));

        let gates = [Arc::new(Notify::new()), Arc::new(Notify::new())];
        let services: Vec<Arc<ReconciliationService>> = gates
            .iter()
            .map(|gate| {
                Arc::new(ReconciliationService::new(
                    Arc::new(FakeProvider::gated(&TEAMS, gate.clone())),
                    predictions.clone(),
                    history.clone(),
                ))
            })
            .collect();

        let runs: Vec<_> = services
            .iter()
            .map(|service| {
                let service = service.clone();
                tokio::spawn(async move { service.reconcile().await })
            })
            .collect();
        for service in &services {
            let mut state = service.subscribe();
            state
                .wait_for(|s| *s == ReconcileState::Fetching)
                .await
                .unwrap();
        }
        for gate in &gates {
            gate.notify_one();
        }

        let mut statuses = Vec::new();
        for run in runs {
            statuses.push(run.await.unwrap().unwrap().status);
        }
        statuses.sort_by_key(|s| *s != ReconcileStatus::Appended);

        assert_eq!(
            statuses,
            vec![ReconcileStatus::Appended, ReconcileStatus::Unchanged]
        );
        assert_eq!(history.stale_rejections.load(Ordering::SeqCst), 1);
        assert_eq!(history.all().len(), 2);
        for service in &services {
            assert_eq!(service.state(), ReconcileState::Idle);
        }
    }

    #[tokio::test]
    async fn test_preview_writes_nothing() {
        let f = fixture();

        let preview = f.service.preview().await.unwrap();
        assert_eq!(preview.status, ReconcileStatus::WouldAppend);
        assert_eq!(preview.points.len(), 2);
        assert_eq!(preview.appended(), 0);
        assert!(f.history.all().is_empty());
        assert_eq!(f.service.state(), ReconcileState::Idle);

        f.service.reconcile().await.unwrap();
        let preview = f.service.preview().await.unwrap();
        assert_eq!(preview.status, ReconcileStatus::Unchanged);
    }

    #[tokio::test]
    async fn test_score_participant_breakdown() {
        let f = fixture();

        let score = f.service.score_participant(f.bob).await.unwrap();
        assert_eq!(score.total, 30);
        assert_eq!(score.lines.len(), 4);

        let err = f.service.score_participant(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ReconcileError::UnknownParticipant(_)));
    }
}
