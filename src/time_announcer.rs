/// Hourly time announcements
///
/// At the top of every evening hour the stream hears the time, the lifetime
/// win totals of both sides and a sponsor credit.
use chrono::{DateTime, Local, Timelike};
use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use rand::seq::SliceRandom;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::config::SideNames;
use crate::detection::Side;
use crate::messaging::{Announcer, Broadcaster, ChatMessage, Event};
use crate::monitor::SharedEngine;
use crate::state::SideCounts;

/// Author of announcement chat messages
pub const ANNOUNCER_NAME: &str = "報時系統";

/// Spoken hour for every announced hour, 18:00 through 02:00
fn spoken_hour(hour: u32) -> Option<&'static str> {
    match hour {
        18 => Some("六"),
        19 => Some("七"),
        20 => Some("八"),
        21 => Some("九"),
        22 => Some("十"),
        23 => Some("十一"),
        0 => Some("十二"),
        1 => Some("一"),
        2 => Some("兩"),
        _ => None,
    }
}

/// Announcement for `hour`, `None` outside the evening window
pub fn announcement_text(
    hour: u32,
    wins: &SideCounts,
    names: &SideNames,
    sponsor: &str,
) -> Option<String> {
    let hour_text = spoken_hour(hour)?;
    let period = if hour <= 2 { "凌晨" } else { "晚上" };

    Some(format!(
        "宇宙世紀標準時間，而家係 {}{}點正，{} {}勝，{} {}勝。報時訊號由 {} 贊助播出",
        period,
        hour_text,
        names.get(Side::Federation),
        wins[Side::Federation],
        names.get(Side::Zeon),
        wins[Side::Zeon],
        sponsor
    ))
}

/// Sponsors in a random order fixed at startup, credited in turn
#[derive(Debug, Clone)]
pub struct SponsorRotation {
    sponsors: Vec<String>,
    next: usize,
}

impl SponsorRotation {
    pub fn shuffled(mut sponsors: Vec<String>) -> Self {
        sponsors.shuffle(&mut rand::thread_rng());
        Self { sponsors, next: 0 }
    }

    /// Next sponsor, empty when none are configured
    pub fn next_sponsor(&mut self) -> String {
        if self.sponsors.is_empty() {
            return String::new();
        }
        let sponsor = self.sponsors[self.next].clone();
        self.next = (self.next + 1) % self.sponsors.len();
        sponsor
    }
}

/// Time left until the next full hour
fn until_next_hour(now: DateTime<Local>) -> Duration {
    let into_hour = Duration::from_secs(u64::from(now.minute() * 60 + now.second()))
        + Duration::from_nanos(u64::from(now.nanosecond().min(999_999_999)));
    Duration::from_secs(3600).saturating_sub(into_hour)
}

/// Background thread announcing the time every evening hour
pub struct TimeAnnouncer {
    shutdown_tx: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl TimeAnnouncer {
    pub fn start(
        engine: SharedEngine,
        announcer: Arc<dyn Announcer>,
        broadcaster: Arc<dyn Broadcaster>,
        sponsors: Vec<String>,
    ) -> std::io::Result<Self> {
        let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
        let mut rotation = SponsorRotation::shuffled(sponsors);

        let handle = thread::Builder::new()
            .name("time-announcer".to_string())
            .spawn(move || loop {
                let now = Local::now();
                let hour = (now.hour() + 1) % 24;

                match shutdown_rx.recv_timeout(until_next_hour(now)) {
                    Err(RecvTimeoutError::Timeout) => {}
                    _ => break,
                }

                if spoken_hour(hour).is_none() {
                    continue;
                }

                let (wins, names) = {
                    let engine = engine.lock();
                    (engine.snapshot().total_wins, engine.names().clone())
                };
                let Some(text) = announcement_text(hour, &wins, &names, &rotation.next_sponsor())
                else {
                    continue;
                };

                tracing::info!("Announcing: {}", text);
                announcer.announce(&text);
                broadcaster.publish(Event::Chat(ChatMessage::new(ANNOUNCER_NAME, text)));
            })?;

        tracing::info!("Time announcer started. Announcements scheduled for 6pm-2am.");
        Ok(Self {
            shutdown_tx,
            handle: Some(handle),
        })
    }

    pub fn stop(&mut self) {
        let _ = self.shutdown_tx.try_send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for TimeAnnouncer {
    fn drop(&mut self) {
        self.stop();
    }
}
