use crate::classify::Classifier;
use crate::geom::Point;
use crate::library::{ReferenceShape, ShapeLibrary};
use crate::overlay::{ModalOverlay, OverlayMode};
use crate::recorder::StrokeRecorder;
use rand::Rng;

/// Submissions need strictly more points than this to reach the classifier.
pub const MIN_CANDIDATE_POINTS: usize = 5;

/// Starting timer budget in seconds.
pub const DEFAULT_BUDGET_SECS: f64 = 20.0;

/// How much the budget shrinks per point of score.
const HALF_SECOND_STEP: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    Cancelled,
    TimedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Playing,
    Paused,
    Ended(EndReason),
}

/// Result of the most recent submission, shown as the HUD banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Outcome {
    #[default]
    None,
    Match,
    NoMatch,
}

/// One play attempt: goal rotation, score, and the adaptive countdown.
///
/// The remaining time after any match is a pure function of the score, so
/// the difficulty curve is reproducible; see [`SessionController::submit`].
#[derive(Debug)]
pub struct SessionController {
    phase: SessionPhase,
    score: u32,
    initial_budget: f64,
    seconds_remaining: f64,
    goal: ReferenceShape,
    last_outcome: Outcome,
}

impl SessionController {
    pub fn new<R: Rng>(library: &ShapeLibrary, initial_budget: f64, rng: &mut R) -> Self {
        Self {
            phase: SessionPhase::Playing,
            score: 0,
            initial_budget,
            seconds_remaining: initial_budget,
            goal: library.choose(rng).clone(),
            last_outcome: Outcome::None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Never negative; zero is the terminal value.
    pub fn seconds_remaining(&self) -> f64 {
        self.seconds_remaining
    }

    pub fn goal(&self) -> &ReferenceShape {
        &self.goal
    }

    pub fn last_outcome(&self) -> Outcome {
        self.last_outcome
    }

    /// Advance the countdown by one real-time interval. Crossing zero ends
    /// the session and raises the retry overlay.
    pub fn tick(&mut self, dt: f64, overlay: &mut ModalOverlay) {
        if self.phase != SessionPhase::Playing {
            return;
        }
        self.seconds_remaining -= dt;
        if self.seconds_remaining <= 0.0 {
            self.seconds_remaining = 0.0;
            self.phase = SessionPhase::Ended(EndReason::TimedOut);
            overlay.show(OverlayMode::Retry);
        }
    }

    /// Player-requested pause. The goal visualization disappears while
    /// paused (the snapshot stops exposing it) and is redrawn on resume.
    pub fn cancel(&mut self, overlay: &mut ModalOverlay) {
        if self.phase != SessionPhase::Playing {
            return;
        }
        self.phase = SessionPhase::Paused;
        overlay.show(OverlayMode::Resume);
    }

    /// Only a cancel-pause can resume; a timed-out session stays ended.
    pub fn resume(&mut self, overlay: &mut ModalOverlay) {
        if self.phase != SessionPhase::Paused {
            return;
        }
        self.phase = SessionPhase::Playing;
        overlay.hide();
    }

    /// Back out of the pause menu, ending the session for good.
    pub fn abandon(&mut self) {
        if self.phase == SessionPhase::Paused {
            self.phase = SessionPhase::Ended(EndReason::Cancelled);
        }
    }

    /// A new stroke clears the previous Right!/Wrong! banner.
    pub fn clear_outcome(&mut self) {
        self.last_outcome = Outcome::None;
    }

    /// Judge a completed candidate. Candidates at or below the minimum point
    /// count are ignored outright and never reach the classifier. On a match
    /// the score rises, a fresh goal is drawn uniformly from the library,
    /// and the timer resets to `initial_budget - score * 0.5`; the reduction
    /// stops applying once the score reaches the initial budget. A miss
    /// costs nothing.
    pub fn submit<R: Rng>(
        &mut self,
        candidate: &[Point],
        classifier: &dyn Classifier,
        library: &ShapeLibrary,
        rng: &mut R,
    ) {
        if self.phase != SessionPhase::Playing {
            return;
        }
        if candidate.len() <= MIN_CANDIDATE_POINTS {
            return;
        }

        let matched = classifier
            .classify(candidate, library.all())
            .is_some_and(|result| result.label == self.goal.name);

        if matched {
            self.score += 1;
            if (self.score as f64) < self.initial_budget {
                self.seconds_remaining =
                    self.initial_budget - self.score as f64 * HALF_SECOND_STEP;
            }
            self.goal = library.choose(rng).clone();
            self.last_outcome = Outcome::Match;
        } else {
            self.last_outcome = Outcome::NoMatch;
        }
    }

    /// Read-only view for the render layer. The core never draws.
    pub fn snapshot<'a>(
        &'a self,
        recorder: &'a StrokeRecorder,
        overlay: &ModalOverlay,
    ) -> RenderSnapshot<'a> {
        let goal_points: &[Point] = if self.phase == SessionPhase::Playing {
            &self.goal.points
        } else {
            &[]
        };
        RenderSnapshot {
            goal_name: &self.goal.name,
            goal_points,
            trail: recorder.points(),
            score: self.score,
            seconds_remaining: self.seconds_remaining.max(0.0),
            last_outcome: self.last_outcome,
            overlay_visible: overlay.visible,
            overlay_mode: overlay.mode,
        }
    }
}

/// Per-frame HUD and canvas data handed to the render layer.
#[derive(Debug, Clone, Copy)]
pub struct RenderSnapshot<'a> {
    pub goal_name: &'a str,
    pub goal_points: &'a [Point],
    pub trail: &'a [Point],
    pub score: u32,
    pub seconds_remaining: f64,
    pub last_outcome: Outcome,
    pub overlay_visible: bool,
    pub overlay_mode: OverlayMode,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Classification;
    use crate::recorder::{NullTrail, RecorderMode};
    use assert_matches::assert_matches;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::Cell;
    use tempfile::tempdir;

    /// Always answers with a fixed label and counts invocations.
    struct StubClassifier {
        label: String,
        calls: Cell<usize>,
    }

    impl StubClassifier {
        fn answering(label: &str) -> Self {
            Self {
                label: label.to_string(),
                calls: Cell::new(0),
            }
        }
    }

    impl Classifier for StubClassifier {
        fn classify(
            &self,
            _candidate: &[Point],
            _references: &[ReferenceShape],
        ) -> Option<Classification> {
            self.calls.set(self.calls.get() + 1);
            Some(Classification {
                label: self.label.clone(),
                score: 1.0,
            })
        }
    }

    fn library() -> (tempfile::TempDir, ShapeLibrary) {
        let dir = tempdir().unwrap();
        let (lib, _) = ShapeLibrary::load(dir.path()).unwrap();
        (dir, lib)
    }

    fn candidate(n: usize) -> Vec<Point> {
        (0..n).map(|i| Point::new(i as f64, 0.0, 0)).collect()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_new_session_starts_playing_with_full_budget() {
        let (_dir, lib) = library();
        let session = SessionController::new(&lib, 20.0, &mut rng());

        assert_eq!(session.phase(), SessionPhase::Playing);
        assert_eq!(session.score(), 0);
        assert_eq!(session.seconds_remaining(), 20.0);
        assert_eq!(session.last_outcome(), Outcome::None);
        assert!(lib.all().iter().any(|s| s == session.goal()));
    }

    #[test]
    fn test_match_increments_score_and_resets_timer() {
        let (_dir, lib) = library();
        let mut session = SessionController::new(&lib, 20.0, &mut rng());
        let goal_name = session.goal().name.clone();
        let classifier = StubClassifier::answering(&goal_name);

        session.tick(3.0, &mut ModalOverlay::hidden());
        session.submit(&candidate(10), &classifier, &lib, &mut rng());

        assert_eq!(session.score(), 1);
        assert_eq!(session.seconds_remaining(), 19.5);
        assert_eq!(session.last_outcome(), Outcome::Match);
        assert_eq!(session.phase(), SessionPhase::Playing);
        assert!(lib.all().iter().any(|s| s == session.goal()));
    }

    #[test]
    fn test_timer_formula_holds_for_every_score_below_budget() {
        let (_dir, lib) = library();
        let mut session = SessionController::new(&lib, 20.0, &mut rng());

        for expected_score in 1..20u32 {
            let classifier = StubClassifier::answering(&session.goal().name.clone());
            session.submit(&candidate(10), &classifier, &lib, &mut rng());
            assert_eq!(session.score(), expected_score);
            assert_eq!(
                session.seconds_remaining(),
                20.0 - expected_score as f64 * 0.5
            );
        }
    }

    #[test]
    fn test_timer_reduction_stops_at_budget_cutoff() {
        let (_dir, lib) = library();
        let mut session = SessionController::new(&lib, 3.0, &mut rng());

        // Scores 1 and 2 apply the formula; score 3 (== budget) must not.
        for _ in 0..2 {
            let classifier = StubClassifier::answering(&session.goal().name.clone());
            session.submit(&candidate(10), &classifier, &lib, &mut rng());
        }
        assert_eq!(session.seconds_remaining(), 3.0 - 2.0 * 0.5);

        session.tick(0.5, &mut ModalOverlay::hidden());
        let before = session.seconds_remaining();
        let classifier = StubClassifier::answering(&session.goal().name.clone());
        session.submit(&candidate(10), &classifier, &lib, &mut rng());

        assert_eq!(session.score(), 3);
        // No reset applied: the countdown is wherever ticking left it.
        assert_eq!(session.seconds_remaining(), before);
    }

    #[test]
    fn test_miss_is_free() {
        let (_dir, lib) = library();
        let mut session = SessionController::new(&lib, 20.0, &mut rng());
        let goal_before = session.goal().clone();
        session.tick(1.0, &mut ModalOverlay::hidden());
        let time_before = session.seconds_remaining();

        let classifier = StubClassifier::answering("definitely-not-a-shape");
        session.submit(&candidate(10), &classifier, &lib, &mut rng());

        assert_eq!(session.score(), 0);
        assert_eq!(session.seconds_remaining(), time_before);
        assert_eq!(session.last_outcome(), Outcome::NoMatch);
        assert_eq!(session.goal(), &goal_before);
        assert_eq!(session.phase(), SessionPhase::Playing);
    }

    #[test]
    fn test_tiny_candidate_never_reaches_classifier() {
        let (_dir, lib) = library();
        let mut session = SessionController::new(&lib, 20.0, &mut rng());
        let classifier = StubClassifier::answering(&session.goal().name.clone());

        session.submit(&candidate(MIN_CANDIDATE_POINTS), &classifier, &lib, &mut rng());

        assert_eq!(classifier.calls.get(), 0);
        assert_eq!(session.score(), 0);
        assert_eq!(session.last_outcome(), Outcome::None);
        assert_eq!(session.seconds_remaining(), 20.0);
    }

    #[test]
    fn test_six_points_is_enough() {
        let (_dir, lib) = library();
        let mut session = SessionController::new(&lib, 20.0, &mut rng());
        let classifier = StubClassifier::answering(&session.goal().name.clone());

        session.submit(&candidate(6), &classifier, &lib, &mut rng());
        assert_eq!(classifier.calls.get(), 1);
        assert_eq!(session.score(), 1);
    }

    #[test]
    fn test_timeout_ends_session_and_clamps_display() {
        let (_dir, lib) = library();
        let mut session = SessionController::new(&lib, 20.0, &mut rng());
        let mut overlay = ModalOverlay::hidden();

        // Drain to 0.3s, then one 0.5s frame step crosses zero.
        session.tick(19.7, &mut overlay);
        assert_eq!(session.phase(), SessionPhase::Playing);

        session.tick(0.5, &mut overlay);
        assert_matches!(session.phase(), SessionPhase::Ended(EndReason::TimedOut));
        assert_eq!(session.seconds_remaining(), 0.0);
        assert!(overlay.visible);
        assert_eq!(overlay.mode, OverlayMode::Retry);
    }

    #[test]
    fn test_pause_and_resume() {
        let (_dir, lib) = library();
        let mut session = SessionController::new(&lib, 20.0, &mut rng());
        let mut overlay = ModalOverlay::hidden();

        session.cancel(&mut overlay);
        assert_eq!(session.phase(), SessionPhase::Paused);
        assert!(overlay.visible);
        assert_eq!(overlay.mode, OverlayMode::Resume);

        // Time does not pass while paused.
        session.tick(5.0, &mut overlay);
        assert_eq!(session.seconds_remaining(), 20.0);

        session.resume(&mut overlay);
        assert_eq!(session.phase(), SessionPhase::Playing);
        assert!(!overlay.visible);
    }

    #[test]
    fn test_timed_out_session_cannot_resume() {
        let (_dir, lib) = library();
        let mut session = SessionController::new(&lib, 1.0, &mut rng());
        let mut overlay = ModalOverlay::hidden();

        session.tick(2.0, &mut overlay);
        assert_matches!(session.phase(), SessionPhase::Ended(EndReason::TimedOut));

        session.resume(&mut overlay);
        assert_matches!(session.phase(), SessionPhase::Ended(EndReason::TimedOut));
    }

    #[test]
    fn test_abandon_from_pause_ends_cancelled() {
        let (_dir, lib) = library();
        let mut session = SessionController::new(&lib, 20.0, &mut rng());
        let mut overlay = ModalOverlay::hidden();

        session.cancel(&mut overlay);
        session.abandon();
        assert_matches!(session.phase(), SessionPhase::Ended(EndReason::Cancelled));
    }

    #[test]
    fn test_no_submissions_after_end() {
        let (_dir, lib) = library();
        let mut session = SessionController::new(&lib, 1.0, &mut rng());
        let mut overlay = ModalOverlay::hidden();
        session.tick(2.0, &mut overlay);

        let classifier = StubClassifier::answering(&session.goal().name.clone());
        session.submit(&candidate(10), &classifier, &lib, &mut rng());
        assert_eq!(classifier.calls.get(), 0);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn test_snapshot_hides_goal_while_paused() {
        let (_dir, lib) = library();
        let mut session = SessionController::new(&lib, 20.0, &mut rng());
        let mut overlay = ModalOverlay::hidden();
        let recorder = StrokeRecorder::new(RecorderMode::SingleShot, Box::new(NullTrail));

        assert!(!session.snapshot(&recorder, &overlay).goal_points.is_empty());

        session.cancel(&mut overlay);
        let snap = session.snapshot(&recorder, &overlay);
        assert!(snap.goal_points.is_empty());
        assert!(snap.overlay_visible);

        session.resume(&mut overlay);
        assert!(!session.snapshot(&recorder, &overlay).goal_points.is_empty());
    }

    #[test]
    fn test_snapshot_exposes_trail_and_hud() {
        let (_dir, lib) = library();
        let mut session = SessionController::new(&lib, 20.0, &mut rng());
        let overlay = ModalOverlay::hidden();
        let mut recorder = StrokeRecorder::new(RecorderMode::SingleShot, Box::new(NullTrail));

        recorder.on_begin(1.0, 1.0);
        recorder.on_move(2.0, 2.0);
        session.clear_outcome();

        let snap = session.snapshot(&recorder, &overlay);
        assert_eq!(snap.trail.len(), 2);
        assert_eq!(snap.score, 0);
        assert_eq!(snap.last_outcome, Outcome::None);
        assert!(snap.seconds_remaining >= 0.0);
    }
}
