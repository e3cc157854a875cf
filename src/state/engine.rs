/// Game state engine
///
/// Applies classified outcomes and inactivity timeouts to the game state,
/// owns the streak announcement policy and broadcasts a full snapshot after
/// every mutation.
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::game_state::GameState;
use super::streak::streak_message;
use super::summary::BattleSummary;
use crate::config::SideNames;
use crate::detection::{classify, DetectionBuffer, MatchOutcome, Side};
use crate::messaging::{Announcer, Broadcaster, ChatMessage, Event};

/// Default time without a decided match before an active streak is dropped
pub const DEFAULT_INACTIVITY_THRESHOLD: Duration = Duration::from_secs(6 * 60);

pub struct GameStateEngine {
    state: GameState,
    names: SideNames,
    inactivity_threshold: Duration,
    announcer: Arc<dyn Announcer>,
    broadcaster: Arc<dyn Broadcaster>,
}

impl GameStateEngine {
    /// Create an engine with all counters at zero
    pub fn new(announcer: Arc<dyn Announcer>, broadcaster: Arc<dyn Broadcaster>) -> Self {
        Self {
            state: GameState::default(),
            names: SideNames::default(),
            inactivity_threshold: DEFAULT_INACTIVITY_THRESHOLD,
            announcer,
            broadcaster,
        }
    }

    pub fn with_names(mut self, names: SideNames) -> Self {
        self.names = names;
        self
    }

    pub fn with_inactivity_threshold(mut self, threshold: Duration) -> Self {
        self.inactivity_threshold = threshold;
        self
    }

    /// Current state
    pub fn snapshot(&self) -> GameState {
        self.state.clone()
    }

    pub fn names(&self) -> &SideNames {
        &self.names
    }

    pub fn summary(&self) -> BattleSummary {
        BattleSummary::new(&self.state, &self.names)
    }

    /// Publish the current state to observers
    pub fn broadcast_state(&self) {
        self.broadcaster.publish(Event::StateChanged {
            state: self.snapshot(),
        });
    }

    /// Classify a drained detection buffer and apply the result
    ///
    /// An empty buffer is a no-op and returns `None`.
    pub fn process_detections(
        &mut self,
        detections: DetectionBuffer,
        now: Instant,
    ) -> Option<MatchOutcome> {
        let outcome = classify(&detections)?;

        if !outcome.is_decided() {
            let regions: Vec<&str> = detections.regions().map(|r| r.name()).collect();
            tracing::info!(
                "Ignoring incomplete detection, stats unchanged: {:?}",
                regions
            );
        }

        self.apply_outcome(outcome, now);
        Some(outcome)
    }

    /// Apply one classified match outcome
    pub fn apply_outcome(&mut self, outcome: MatchOutcome, now: Instant) {
        match outcome {
            MatchOutcome::Incomplete => self.reset_streaks("an incomplete match"),
            MatchOutcome::Draw => {
                self.state.total_battles += 1;
                self.state.total_draws += 1;
                self.state.last_outcome_time = Some(now);
                self.reset_streaks("a draw");
                tracing::info!("Game ended in a DRAW.");
                self.log_summary();
            }
            MatchOutcome::Win(winner) => {
                self.state.total_battles += 1;
                self.state.last_outcome_time = Some(now);
                self.record_win(winner);
                self.log_summary();
                self.broadcast_state();
            }
        }
    }

    fn record_win(&mut self, winner: Side) {
        let loser = winner.opponent();

        self.state.total_wins[winner] += 1;
        self.state.streaks[loser] = 0;
        self.state.streaks[winner] += 1;
        self.state.last_winner = Some(winner);

        let streak = self.state.streaks[winner];
        tracing::info!("{} wins! Consecutive wins: {}", winner, streak);

        if let Some(message) = streak_message(streak) {
            self.announcer.announce(message);

            let author = format!("{}連勝！", self.names.get(winner));
            let chat = ChatMessage::new(author, message).for_side(winner);
            self.broadcaster.publish(Event::Chat(chat));
        }
    }

    /// Zero both streaks and clear the last winner, totals stay untouched
    pub fn reset_streaks(&mut self, reason: &str) {
        if self.state.has_active_streak() {
            tracing::info!("Win streak reset due to {}.", reason);
        }

        self.state.streaks = Default::default();
        self.state.last_winner = None;
        self.broadcast_state();
    }

    /// Drop an active streak once no match was decided for too long
    ///
    /// Returns `true` if a reset happened.
    pub fn check_inactivity(&mut self, now: Instant) -> bool {
        if !self.state.has_active_streak() {
            return false;
        }

        let expired = self
            .state
            .last_outcome_time
            .map_or(true, |last| now.saturating_duration_since(last) > self.inactivity_threshold);
        if !expired {
            return false;
        }

        self.reset_streaks("prolonged inactivity");
        self.state.last_outcome_time = None;
        true
    }

    fn log_summary(&self) {
        tracing::info!("\n{}", self.summary());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::Region;
    use crate::messaging::{EventBus, RecordingAnnouncer};
    use crate::state::streak::EXTREME_STREAK_MESSAGE;
    use crossbeam_channel::Receiver;

    struct Harness {
        engine: GameStateEngine,
        announcer: Arc<RecordingAnnouncer>,
        events: Receiver<Event>,
    }

    fn harness() -> Harness {
        let announcer = Arc::new(RecordingAnnouncer::new());
        let bus = EventBus::new();
        let (events, _id) = bus.subscribe();
        let engine = GameStateEngine::new(announcer.clone(), Arc::new(bus));
        Harness {
            engine,
            announcer,
            events,
        }
    }

    fn drain(events: &Receiver<Event>) -> Vec<Event> {
        events.try_iter().collect()
    }

    fn assert_invariants(state: &GameState) {
        assert!(state.totals_consistent());
        assert!(state.streaks.zeon == 0 || state.streaks.federation == 0);
    }

    #[test]
    fn test_three_wins_announce_hat_trick_once() {
        let mut h = harness();
        let now = Instant::now();

        for _ in 0..3 {
            h.engine.apply_outcome(MatchOutcome::SIDE_A_WINS, now);
        }

        let state = h.engine.snapshot();
        assert_eq!(state.streaks.zeon, 3);
        assert_eq!(state.streaks.federation, 0);
        assert_eq!(state.last_winner, Some(Side::Zeon));
        assert_eq!(h.announcer.announcements(), vec!["帽子戲法".to_string()]);
        assert_invariants(&state);

        let chats: Vec<ChatMessage> = drain(&h.events)
            .into_iter()
            .filter_map(|e| match e {
                Event::Chat(msg) => Some(msg),
                _ => None,
            })
            .collect();
        assert_eq!(chats.len(), 1);
        assert_eq!(chats[0].author_name, "自護連勝！");
        assert!(!chats[0].is_federation);
    }

    #[test]
    fn test_win_then_loss_moves_streak() {
        let mut h = harness();
        let now = Instant::now();

        h.engine.apply_outcome(MatchOutcome::SIDE_A_WINS, now);
        h.engine.apply_outcome(MatchOutcome::SIDE_B_WINS, now);

        let state = h.engine.snapshot();
        assert_eq!(state.streaks.zeon, 0);
        assert_eq!(state.streaks.federation, 1);
        assert_eq!(state.total_wins.zeon, 1);
        assert_eq!(state.total_wins.federation, 1);
        assert_eq!(state.total_battles, 2);
        assert_eq!(state.last_winner, Some(Side::Federation));
        assert_invariants(&state);
    }

    #[test]
    fn test_draw_resets_streaks_and_counts_battle() {
        let mut h = harness();
        let now = Instant::now();

        h.engine.apply_outcome(MatchOutcome::SIDE_B_WINS, now);
        h.engine.apply_outcome(MatchOutcome::SIDE_B_WINS, now);
        h.engine.apply_outcome(MatchOutcome::Draw, now);

        let state = h.engine.snapshot();
        assert_eq!(state.total_draws, 1);
        assert_eq!(state.total_battles, 3);
        assert_eq!(state.streaks.federation, 0);
        assert!(state.last_winner.is_none());
        assert_eq!(state.last_outcome_time, Some(now));
        assert_invariants(&state);
    }

    #[test]
    fn test_incomplete_resets_streak_without_stats() {
        let mut h = harness();
        let now = Instant::now();

        h.engine.apply_outcome(MatchOutcome::SIDE_A_WINS, now);
        h.engine.apply_outcome(MatchOutcome::SIDE_A_WINS, now);
        let before = h.engine.snapshot();

        let detections: DetectionBuffer = [Region::Area1, Region::Area3].into_iter().collect();
        let outcome = h.engine.process_detections(detections, now + Duration::from_secs(5));
        assert_eq!(outcome, Some(MatchOutcome::Incomplete));

        let state = h.engine.snapshot();
        assert_eq!(state.streaks.zeon, 0);
        assert!(state.last_winner.is_none());
        assert_eq!(state.total_battles, before.total_battles);
        assert_eq!(state.total_wins, before.total_wins);
        assert_eq!(state.total_draws, before.total_draws);
        assert_eq!(state.last_outcome_time, before.last_outcome_time);
    }

    #[test]
    fn test_process_empty_buffer_is_noop() {
        let mut h = harness();
        assert_eq!(
            h.engine.process_detections(DetectionBuffer::new(), Instant::now()),
            None
        );
        assert!(drain(&h.events).is_empty());
    }

    #[test]
    fn test_every_mutation_broadcasts_snapshot() {
        let mut h = harness();
        let now = Instant::now();

        h.engine.apply_outcome(MatchOutcome::SIDE_A_WINS, now);
        h.engine.apply_outcome(MatchOutcome::Draw, now);
        h.engine.apply_outcome(MatchOutcome::Incomplete, now);

        let snapshots = drain(&h.events)
            .into_iter()
            .filter(|e| matches!(e, Event::StateChanged { .. }))
            .count();
        assert_eq!(snapshots, 3);
    }

    #[test]
    fn test_reset_streaks_is_idempotent() {
        let mut h = harness();
        h.engine.apply_outcome(MatchOutcome::SIDE_A_WINS, Instant::now());
        drain(&h.events);

        h.engine.reset_streaks("test");
        let once = h.engine.snapshot();
        h.engine.reset_streaks("test");
        let twice = h.engine.snapshot();

        assert_eq!(once, twice);
        let events = drain(&h.events);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], events[1]);
    }

    #[test]
    fn test_inactivity_resets_streak_once() {
        let mut h = harness();
        let start = Instant::now();

        h.engine.apply_outcome(MatchOutcome::SIDE_A_WINS, start);
        h.engine.apply_outcome(MatchOutcome::SIDE_A_WINS, start);

        assert!(!h.engine.check_inactivity(start + Duration::from_secs(60)));
        assert_eq!(h.engine.snapshot().streaks.zeon, 2);

        let later = start + DEFAULT_INACTIVITY_THRESHOLD + Duration::from_secs(1);
        assert!(h.engine.check_inactivity(later));

        let state = h.engine.snapshot();
        assert_eq!(state.streaks.zeon, 0);
        assert!(state.last_winner.is_none());
        assert!(state.last_outcome_time.is_none());
        assert_eq!(state.total_wins.zeon, 2);
        assert_eq!(state.total_battles, 2);

        assert!(!h.engine.check_inactivity(later + Duration::from_secs(600)));
    }

    #[test]
    fn test_inactivity_at_threshold_does_not_reset() {
        let mut h = harness().engine.with_inactivity_threshold(Duration::from_secs(10));
        let start = Instant::now();
        h.apply_outcome(MatchOutcome::SIDE_B_WINS, start);

        assert!(!h.check_inactivity(start + Duration::from_secs(10)));
        assert!(h.check_inactivity(start + Duration::from_secs(11)));
    }

    #[test]
    fn test_eleventh_win_is_extreme_streak() {
        let mut h = harness();
        let now = Instant::now();

        for _ in 0..11 {
            h.engine.apply_outcome(MatchOutcome::SIDE_B_WINS, now);
        }

        let announcements = h.announcer.announcements();
        assert_eq!(announcements.len(), 9);
        assert_eq!(announcements.last().map(String::as_str), Some(EXTREME_STREAK_MESSAGE));
        assert_eq!(
            announcements.iter().filter(|a| *a == "十全十美").count(),
            1
        );
        assert_eq!(
            announcements
                .iter()
                .filter(|a| *a == EXTREME_STREAK_MESSAGE)
                .count(),
            1
        );
    }

    #[test]
    fn test_invariants_over_mixed_sequence() {
        let mut h = harness();
        let now = Instant::now();
        let sequence = [
            MatchOutcome::SIDE_A_WINS,
            MatchOutcome::Draw,
            MatchOutcome::SIDE_B_WINS,
            MatchOutcome::Incomplete,
            MatchOutcome::SIDE_B_WINS,
            MatchOutcome::SIDE_A_WINS,
            MatchOutcome::Draw,
        ];

        for outcome in sequence {
            h.engine.apply_outcome(outcome, now);
            assert_invariants(&h.engine.snapshot());
        }

        let state = h.engine.snapshot();
        assert_eq!(state.total_battles, 6);
        assert_eq!(state.total_draws, 2);
    }
}
