//! Round lifecycle: countdown, time bonus and best-score bookkeeping.

use crate::model::{GroundTruthAnnotation, UserAnnotation};
use crate::scoring::{final_round_score, round_score, RoundScore};
use crate::store::KeyValueStore;
use std::time::{Duration, Instant};

/// Game modes with their own best score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameMode {
    Annotate,
    QuickId,
}

impl GameMode {
    pub fn key(&self) -> &'static str {
        match self {
            GameMode::Annotate => "best-score/annotate",
            GameMode::QuickId => "best-score/quick-id",
        }
    }
}

/// Best scores per mode, kept in an injected store.
#[derive(Debug, Clone, Default)]
pub struct BestScores<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> BestScores<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn best(&self, mode: GameMode) -> Option<i64> {
        self.store.get(mode.key())
    }

    /// Keep `score` if it beats the stored best. Returns true on a new best.
    pub fn record(&mut self, mode: GameMode, score: i64) -> bool {
        match self.best(mode) {
            Some(best) if best >= score => false,
            _ => {
                log::info!("New best for {:?}: {}", mode, score);
                self.store.set(mode.key(), score);
                true
            }
        }
    }
}

/// Countdown for one round.
#[derive(Debug, Clone, Copy)]
pub struct RoundTimer {
    limit: Duration,
    started: Instant,
}

impl RoundTimer {
    pub fn start(limit: Duration) -> Self {
        Self::started_at(limit, Instant::now())
    }

    pub fn started_at(limit: Duration, started: Instant) -> Self {
        Self { limit, started }
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    pub fn remaining_at(&self, now: Instant) -> Duration {
        let elapsed = now.saturating_duration_since(self.started);
        self.limit.saturating_sub(elapsed)
    }

    pub fn remaining(&self) -> Duration {
        self.remaining_at(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        self.remaining().is_zero()
    }

    /// Bonus proportional to the time left, capped at `max_bonus`.
    pub fn time_bonus_at(&self, now: Instant, max_bonus: u32) -> u32 {
        if self.limit.is_zero() {
            return 0;
        }
        let fraction = self.remaining_at(now).as_secs_f64() / self.limit.as_secs_f64();
        ((f64::from(max_bonus) * fraction).round() as u32).min(max_bonus)
    }

    pub fn time_bonus(&self, max_bonus: u32) -> u32 {
        self.time_bonus_at(Instant::now(), max_bonus)
    }
}

/// Result of a submitted round.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundOutcome {
    pub score: RoundScore,
    pub time_bonus: u32,
    pub final_score: i32,
    pub new_best: bool,
}

/// One image being played.
#[derive(Debug, Clone)]
pub struct Round {
    targets: Vec<GroundTruthAnnotation>,
    timer: RoundTimer,
    outcome: Option<RoundOutcome>,
}

impl Round {
    pub fn new(targets: Vec<GroundTruthAnnotation>, timer: RoundTimer) -> Self {
        log::info!("Round started with {} targets", targets.len());
        Self {
            targets,
            timer,
            outcome: None,
        }
    }

    pub fn targets(&self) -> &[GroundTruthAnnotation] {
        &self.targets
    }

    pub fn timer(&self) -> &RoundTimer {
        &self.timer
    }

    pub fn outcome(&self) -> Option<&RoundOutcome> {
        self.outcome.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    /// Time ran out before the round was submitted.
    pub fn is_overdue(&self) -> bool {
        !self.is_finished() && self.timer.is_expired()
    }

    /// Score the current rectangles without ending the round.
    pub fn live_score(&self, annotations: &[UserAnnotation]) -> RoundScore {
        round_score(annotations, &self.targets)
    }

    /// End the round. A finished round keeps its first outcome.
    pub fn finish<S: KeyValueStore>(
        &mut self,
        annotations: &[UserAnnotation],
        time_bonus: u32,
        best: &mut BestScores<S>,
    ) -> &RoundOutcome {
        let outcome = self.outcome.get_or_insert_with(|| {
            let score = round_score(annotations, &self.targets);
            let bonus = i32::try_from(time_bonus).unwrap_or(i32::MAX);
            let final_score = final_round_score(score.normalized, bonus);
            let new_best = best.record(GameMode::Annotate, i64::from(final_score));
            log::info!(
                "Round finished: {} of {} found, normalized {}, bonus {}, final {}",
                score.found_count(),
                score.per_target.len(),
                score.normalized,
                time_bonus,
                final_score
            );
            RoundOutcome {
                score,
                time_bonus,
                final_score,
                new_best,
            }
        });
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{DisplayScale, ScoringPoint};
    use crate::model::AnnotationId;
    use crate::store::MemoryStore;

    fn whale_target() -> GroundTruthAnnotation {
        GroundTruthAnnotation::rectangle(
            1,
            "Whale",
            ScoringPoint::new(0.0, 0.0),
            ScoringPoint::new(100.0, 100.0),
        )
    }

    fn whale_guess() -> UserAnnotation {
        UserAnnotation::complete(
            AnnotationId(1),
            "Whale",
            ScoringPoint::new(0.0, 0.0),
            ScoringPoint::new(100.0, 100.0),
            DisplayScale::identity(),
        )
    }

    #[test]
    fn test_time_bonus_proportional_and_capped() {
        let start = Instant::now();
        let timer = RoundTimer::started_at(Duration::from_secs(60), start);
        assert_eq!(timer.time_bonus_at(start, 25), 25);
        assert_eq!(timer.time_bonus_at(start + Duration::from_secs(30), 25), 13);
        assert_eq!(timer.time_bonus_at(start + Duration::from_secs(90), 25), 0);
    }

    #[test]
    fn test_zero_limit_gives_no_bonus() {
        let timer = RoundTimer::start(Duration::ZERO);
        assert_eq!(timer.time_bonus(25), 0);
        assert!(timer.is_expired());
    }

    #[test]
    fn test_best_scores_only_improve() {
        let mut best = BestScores::new(MemoryStore::new());
        assert_eq!(best.best(GameMode::Annotate), None);
        assert!(best.record(GameMode::Annotate, 50));
        assert!(!best.record(GameMode::Annotate, 40));
        assert!(!best.record(GameMode::Annotate, 50));
        assert!(best.record(GameMode::Annotate, 51));
        assert_eq!(best.best(GameMode::Annotate), Some(51));
        assert_eq!(best.best(GameMode::QuickId), None);
    }

    #[test]
    fn test_round_finish_combines_score_and_bonus() {
        let mut best = BestScores::new(MemoryStore::new());
        let timer = RoundTimer::start(Duration::from_secs(60));
        let mut round = Round::new(vec![whale_target()], timer);
        assert_eq!(round.live_score(&[whale_guess()]).normalized, 100);

        let outcome = round.finish(&[whale_guess()], 20, &mut best).clone();
        assert_eq!(outcome.final_score, 120);
        assert!(outcome.new_best);
        assert!(round.is_finished());
        assert_eq!(best.best(GameMode::Annotate), Some(120));
    }

    #[test]
    fn test_round_finishes_once() {
        let mut best = BestScores::new(MemoryStore::new());
        let timer = RoundTimer::start(Duration::from_secs(60));
        let mut round = Round::new(vec![whale_target()], timer);
        round.finish(&[], 0, &mut best);
        let again = round.finish(&[whale_guess()], 25, &mut best);
        assert_eq!(again.final_score, 0);
    }
}
