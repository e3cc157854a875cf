/// JSON line stream of broadcast events
///
/// The host forwards every event to the overlay process as one JSON object
/// per line.
use crossbeam_channel::Receiver;
use std::io::{self, Write};

use super::events::Event;

/// Write every received event to `out` until the bus goes away
///
/// Returns the number of lines written once the channel disconnects. A
/// write failure, such as the reader closing the pipe, ends the stream with
/// that error. Events that fail to serialize are skipped.
pub fn write_json_lines<W: Write>(events: &Receiver<Event>, mut out: W) -> io::Result<usize> {
    let mut written = 0;

    for event in events.iter() {
        let line = match serde_json::to_string(&event) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!("Failed to serialize event: {}", e);
                continue;
            }
        };

        writeln!(out, "{}", line)?;
        out.flush()?;
        written += 1;
    }

    Ok(written)
}
