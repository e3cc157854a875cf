// Integration tests for Battle Watch
// These drive the full poller -> aggregator -> engine pipeline with scripted
// collaborators and short timings.

use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use battle_watch::messaging::{EventBus, RecordingAnnouncer};
use battle_watch::ocr::RecognizerFactory;
use battle_watch::{
    CaptureError, Event, Frame, FrameSampler, GameStateEngine, Monitor, MonitorError, OcrError,
    PollerSettings, Region, RegionRecognizer,
};

/// Shared script of what the fake feed currently shows
#[derive(Default)]
struct Feed {
    showing: Mutex<BTreeSet<Region>>,
    capture_fails: AtomicBool,
    recognize_fails: AtomicBool,
    failing_region: Mutex<Option<Region>>,
    recognize_calls: AtomicUsize,
    recognizers_built: AtomicUsize,
    terminated: AtomicUsize,
}

impl Feed {
    fn show(&self, regions: &[Region]) {
        *self.showing.lock() = regions.iter().copied().collect();
    }

    fn clear(&self) {
        self.showing.lock().clear();
    }
}

struct ScriptedSampler(Arc<Feed>);

impl FrameSampler for ScriptedSampler {
    fn capture_frame(&self) -> Result<Frame, CaptureError> {
        if self.0.capture_fails.load(Ordering::SeqCst) {
            return Err(CaptureError::EmptyFrame);
        }
        Ok(Frame::new(vec![0xFF, 0xD8]))
    }
}

struct ScriptedRecognizer(Arc<Feed>);

impl RegionRecognizer for ScriptedRecognizer {
    fn recognize(&mut self, _frame: &Frame, region: Region) -> Result<String, OcrError> {
        self.0.recognize_calls.fetch_add(1, Ordering::SeqCst);
        let region_fails = *self.0.failing_region.lock() == Some(region);
        if region_fails || self.0.recognize_fails.load(Ordering::SeqCst) {
            return Err(OcrError::RecognitionFailed {
                region: region.name().to_string(),
                source: "scripted failure".into(),
            });
        }
        if self.0.showing.lock().contains(&region) {
            Ok("GAMEOVER\n".to_string())
        } else {
            Ok(String::new())
        }
    }

    fn terminate(&mut self) -> Result<(), OcrError> {
        self.0.terminated.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn scripted_factory(feed: Arc<Feed>) -> RecognizerFactory {
    Arc::new(move || -> Result<Box<dyn RegionRecognizer>, OcrError> {
        feed.recognizers_built.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedRecognizer(Arc::clone(&feed))))
    })
}

struct Rig {
    monitor: Monitor,
    feed: Arc<Feed>,
    announcer: Arc<RecordingAnnouncer>,
    bus: EventBus,
}

fn rig(clear_delay: Duration) -> Rig {
    let feed = Arc::new(Feed::default());
    let announcer = Arc::new(RecordingAnnouncer::new());
    let bus = EventBus::new();

    let settings = PollerSettings {
        sample_interval: Duration::from_millis(20),
        clear_delay,
        ..PollerSettings::default()
    };
    let engine = GameStateEngine::new(announcer.clone(), Arc::new(bus.clone()));
    let monitor = Monitor::new(
        settings,
        engine,
        Arc::new(ScriptedSampler(Arc::clone(&feed))),
        scripted_factory(Arc::clone(&feed)),
    );

    Rig {
        monitor,
        feed,
        announcer,
        bus,
    }
}

fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    condition()
}

/// Show `regions` for a few cycles, then take the banner down
fn play_match(rig: &Rig, regions: &[Region]) {
    let calls = rig.feed.recognize_calls.load(Ordering::SeqCst);
    rig.feed.show(regions);
    assert!(wait_until(Duration::from_secs(2), || {
        rig.feed.recognize_calls.load(Ordering::SeqCst) >= calls + 8
    }));
    rig.feed.clear();
}

#[test]
fn test_side_b_down_scores_win_for_side_a() {
    let mut rig = rig(Duration::from_millis(120));
    rig.monitor.start().unwrap();

    play_match(&rig, &[Region::Area3, Region::Area4]);
    assert!(wait_until(Duration::from_secs(3), || {
        rig.monitor.snapshot().total_battles == 1
    }));

    let state = rig.monitor.snapshot();
    assert_eq!(state.total_wins.zeon, 1);
    assert_eq!(state.streaks.zeon, 1);
    assert_eq!(state.streaks.federation, 0);

    rig.monitor.stop().unwrap();
}

#[test]
fn test_three_wins_trigger_one_milestone() {
    let mut rig = rig(Duration::from_millis(120));
    rig.monitor.start().unwrap();

    for expected in 1..=3 {
        play_match(&rig, &[Region::Area1, Region::Area2]);
        assert!(wait_until(Duration::from_secs(3), || {
            rig.monitor.snapshot().total_battles == expected
        }));
    }

    let state = rig.monitor.snapshot();
    assert_eq!(state.streaks.federation, 3);
    assert_eq!(rig.announcer.announcements(), vec!["帽子戲法".to_string()]);

    rig.monitor.stop().unwrap();
}

#[test]
fn test_single_region_is_incomplete() {
    let mut rig = rig(Duration::from_millis(120));
    let (events, _id) = rig.bus.subscribe();
    rig.monitor.start().unwrap();

    play_match(&rig, &[Region::Area2]);

    // Initial broadcast on start plus the incomplete-match reset
    assert!(wait_until(Duration::from_secs(3), || events.len() >= 2));
    let state = rig.monitor.snapshot();
    assert_eq!(state.total_battles, 0);
    assert_eq!(state.total_draws, 0);
    assert!(events
        .try_iter()
        .all(|e| matches!(e, Event::StateChanged { .. })));

    rig.monitor.stop().unwrap();
}

#[test]
fn test_failed_cycles_do_not_stop_polling() {
    let mut rig = rig(Duration::from_millis(120));
    rig.monitor.start().unwrap();

    rig.feed.capture_fails.store(true, Ordering::SeqCst);
    thread::sleep(Duration::from_millis(100));
    rig.feed.capture_fails.store(false, Ordering::SeqCst);

    rig.feed.recognize_fails.store(true, Ordering::SeqCst);
    thread::sleep(Duration::from_millis(100));
    rig.feed.recognize_fails.store(false, Ordering::SeqCst);

    assert!(rig.monitor.is_running());

    play_match(&rig, &[Region::Area1, Region::Area2, Region::Area3, Region::Area4]);
    assert!(wait_until(Duration::from_secs(3), || {
        rig.monitor.snapshot().total_draws == 1
    }));

    rig.monitor.stop().unwrap();
}

#[test]
fn test_start_is_idempotent_and_stop_releases_recognizer() {
    let mut rig = rig(Duration::from_millis(120));

    rig.monitor.stop().unwrap();
    assert_eq!(rig.feed.terminated.load(Ordering::SeqCst), 0);

    rig.monitor.start().unwrap();
    rig.monitor.start().unwrap();
    assert_eq!(rig.feed.recognizers_built.load(Ordering::SeqCst), 1);

    rig.monitor.stop().unwrap();
    assert!(!rig.monitor.is_running());
    assert_eq!(rig.feed.terminated.load(Ordering::SeqCst), 1);

    rig.monitor.stop().unwrap();
    assert_eq!(rig.feed.terminated.load(Ordering::SeqCst), 1);

    // Restart keeps the accumulated state
    rig.monitor.start().unwrap();
    assert_eq!(rig.feed.recognizers_built.load(Ordering::SeqCst), 2);
    rig.monitor.stop().unwrap();
}

#[test]
fn test_stop_cancels_pending_classification() {
    let mut rig = rig(Duration::from_secs(5));
    rig.monitor.start().unwrap();

    play_match(&rig, &[Region::Area3, Region::Area4]);
    rig.monitor.stop().unwrap();

    assert_eq!(rig.monitor.snapshot().total_battles, 0);
    assert_eq!(rig.feed.terminated.load(Ordering::SeqCst), 1);
}

#[test]
fn test_recognizer_init_failure_surfaces_from_start() {
    let feed = Arc::new(Feed::default());
    let engine = GameStateEngine::new(
        Arc::new(RecordingAnnouncer::new()),
        Arc::new(EventBus::new()),
    );
    let failing: RecognizerFactory =
        Arc::new(|| -> Result<Box<dyn RegionRecognizer>, OcrError> {
            Err(OcrError::InitFailed("missing tessdata".into()))
        });
    let mut monitor = Monitor::new(
        PollerSettings::default(),
        engine,
        Arc::new(ScriptedSampler(feed)),
        failing,
    );

    assert!(matches!(
        monitor.start(),
        Err(MonitorError::RecognizerInit(_))
    ));
    assert!(!monitor.is_running());
    assert!(monitor.stop().is_ok());
}

#[test]
fn test_detections_before_a_failed_region_are_kept() {
    let mut rig = rig(Duration::from_millis(120));
    rig.monitor.start().unwrap();

    play_match(&rig, &[Region::Area3, Region::Area4]);
    assert!(wait_until(Duration::from_secs(3), || {
        rig.monitor.snapshot().streaks.zeon == 1
    }));

    // Area1 reads the marker, then recognition of Area2 fails every cycle
    *rig.feed.failing_region.lock() = Some(Region::Area2);
    play_match(&rig, &[Region::Area1]);

    assert!(wait_until(Duration::from_secs(3), || {
        rig.monitor.snapshot().streaks.zeon == 0
    }));
    let state = rig.monitor.snapshot();
    assert_eq!(state.total_battles, 1);
    assert_eq!(state.total_draws, 0);
    assert_eq!(state.total_wins.zeon, 1);

    rig.monitor.stop().unwrap();
}

#[test]
fn test_detections_across_cycles_merge_into_one_outcome() {
    let mut rig = rig(Duration::from_millis(200));
    rig.monitor.start().unwrap();

    // Each phase outlasts the clear delay; only continuous detections
    // restarting the timer keep them in one window
    rig.feed.show(&[Region::Area1, Region::Area2]);
    thread::sleep(Duration::from_millis(300));
    rig.feed.show(&[Region::Area3, Region::Area4]);
    thread::sleep(Duration::from_millis(300));
    rig.feed.clear();

    assert!(wait_until(Duration::from_secs(3), || {
        rig.monitor.snapshot().total_battles >= 1
    }));
    thread::sleep(Duration::from_millis(400));

    let state = rig.monitor.snapshot();
    assert_eq!(state.total_battles, 1);
    assert_eq!(state.total_draws, 1);
    assert_eq!(state.total_wins.zeon + state.total_wins.federation, 0);

    rig.monitor.stop().unwrap();
}
