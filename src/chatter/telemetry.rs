//! Rolling history of bubbles and social events, mirrored to a JSON-lines file.
use std::{
    collections::VecDeque,
    fs::{create_dir_all, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use bevy::{
    log::{debug, info, warn},
    prelude::*,
};
use serde::Serialize;

use crate::core::SimulationClock;

use super::{
    bubble::BubbleCueMessage,
    events::{InteractionMessage, MentalBreakMessage},
};

const DEFAULT_BUBBLE_TELEMETRY_LOG_PATH: &str = "logs/bubble_history.jsonl";

const DEFAULT_BUBBLE_TELEMETRY_CAPACITY: usize = 64;

/// One simulated minute at 60 ticks per second.
const SUMMARY_INTERVAL_TICKS: u64 = 3_600;

/// Most recent chatter records, oldest first.
#[derive(Resource, Debug)]
pub struct BubbleTelemetry {
    capacity: usize,
    records: VecDeque<BubbleTelemetryRecord>,
}

impl BubbleTelemetry {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            records: VecDeque::new(),
        }
    }

    pub fn push(&mut self, record: BubbleTelemetryRecord) {
        while self.records.len() >= self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    pub fn records(&self) -> impl Iterator<Item = &BubbleTelemetryRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Tallies the retained records by kind.
    pub fn summary(&self) -> BubbleTelemetrySummary {
        self.records()
            .fold(BubbleTelemetrySummary::default(), |mut summary, record| {
                match record.event {
                    BubbleTelemetryEvent::Bubble(_) => summary.bubbles += 1,
                    BubbleTelemetryEvent::Interaction(_) => summary.interactions += 1,
                    BubbleTelemetryEvent::MentalBreak(_) => summary.mental_breaks += 1,
                }
                summary.latest_seconds = Some(record.occurred_at_seconds);
                summary
            })
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct BubbleTelemetrySummary {
    pub bubbles: usize,
    pub interactions: usize,
    pub mental_breaks: usize,
    pub latest_seconds: Option<f64>,
}

impl Default for BubbleTelemetry {
    fn default() -> Self {
        Self::new(DEFAULT_BUBBLE_TELEMETRY_CAPACITY)
    }
}

#[derive(Debug, Clone)]
pub struct BubbleTelemetryRecord {
    pub occurred_at_seconds: f64,
    pub event: BubbleTelemetryEvent,
}

#[derive(Debug, Clone)]
pub enum BubbleTelemetryEvent {
    Bubble(BubbleCueMessage),
    Interaction(InteractionMessage),
    MentalBreak(MentalBreakMessage),
}

/// Collects this frame's chatter messages into the ring buffer and the log.
pub fn record_bubble_telemetry(
    clock: Res<SimulationClock>,
    mut telemetry: ResMut<BubbleTelemetry>,
    mut log: ResMut<BubbleTelemetryLog>,
    mut bubbles: MessageReader<BubbleCueMessage>,
    mut interactions: MessageReader<InteractionMessage>,
    mut breaks: MessageReader<MentalBreakMessage>,
) {
    let now = clock.elapsed().as_secs_f64();

    let events = bubbles
        .read()
        .cloned()
        .map(BubbleTelemetryEvent::Bubble)
        .chain(
            interactions
                .read()
                .cloned()
                .map(BubbleTelemetryEvent::Interaction),
        )
        .chain(breaks.read().cloned().map(BubbleTelemetryEvent::MentalBreak));

    for event in events {
        let record = BubbleTelemetryRecord {
            occurred_at_seconds: now,
            event,
        };
        log.push(&record);
        telemetry.push(record);
    }
}

/// Periodically reports what the ring buffer currently holds.
pub fn log_chatter_summary(clock: Res<SimulationClock>, telemetry: Res<BubbleTelemetry>) {
    if telemetry.is_empty() || !clock.crossed_interval(SUMMARY_INTERVAL_TICKS) {
        return;
    }
    let summary = telemetry.summary();
    debug!(
        "Recent chatter ({} records): {} bubbles, {} interactions, {} mental breaks, latest at {:.1}s",
        telemetry.len(),
        summary.bubbles,
        summary.interactions,
        summary.mental_breaks,
        summary.latest_seconds.unwrap_or_default()
    );
}

/// Pending records waiting to be appended to disk.
///
/// At most `max_pending` records are held; while the file cannot be written
/// the oldest ones are dropped.
#[derive(Resource, Debug)]
pub struct BubbleTelemetryLog {
    output_path: PathBuf,
    max_pending: usize,
    pending: VecDeque<BubbleTelemetryRecord>,
    failing: bool,
}

impl BubbleTelemetryLog {
    pub fn new(path: impl Into<PathBuf>, max_pending: usize) -> Self {
        Self {
            output_path: path.into(),
            max_pending: max_pending.max(1),
            pending: VecDeque::new(),
            failing: false,
        }
    }

    pub fn push(&mut self, record: &BubbleTelemetryRecord) {
        while self.pending.len() >= self.max_pending {
            self.pending.pop_front();
        }
        self.pending.push_back(record.clone());
    }

    /// Marks the log as failing; true only when it was healthy before.
    pub fn note_failure(&mut self) -> bool {
        !std::mem::replace(&mut self.failing, true)
    }

    /// Marks the log as healthy; true only when it was failing before.
    pub fn note_recovered(&mut self) -> bool {
        std::mem::replace(&mut self.failing, false)
    }

    fn ensure_directory(&self) -> std::io::Result<()> {
        if let Some(parent) = self.output_path.parent() {
            create_dir_all(parent)?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }

        self.ensure_directory()?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.output_path)?;

        // A record leaves the queue only once its line is written.
        while let Some(record) = self.pending.front() {
            let mut line = serde_json::to_vec(&SerializableBubbleTelemetryRecord::from(record))?;
            line.push(b'\n');
            file.write_all(&line)?;
            self.pending.pop_front();
        }

        file.flush()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.output_path
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl Default for BubbleTelemetryLog {
    fn default() -> Self {
        Self::new(
            DEFAULT_BUBBLE_TELEMETRY_LOG_PATH,
            DEFAULT_BUBBLE_TELEMETRY_CAPACITY,
        )
    }
}

/// Writes pending records, warning once when the file becomes unwritable.
pub fn flush_bubble_telemetry_log(mut log: ResMut<BubbleTelemetryLog>) {
    if log.is_empty() {
        return;
    }
    match log.flush() {
        Ok(()) => {
            if log.note_recovered() {
                info!("Bubble telemetry writing to {:?} again", log.path());
            }
        }
        Err(err) => {
            if log.note_failure() {
                warn!(
                    "Failed to persist bubble telemetry to {:?}: {} (keeping the latest {} records)",
                    log.path(),
                    err,
                    log.max_pending
                );
            }
        }
    }
}

#[derive(Serialize)]
struct SerializableBubbleTelemetryRecord {
    occurred_at_seconds: f64,
    event: SerializableBubbleTelemetryEvent,
}

impl From<&BubbleTelemetryRecord> for SerializableBubbleTelemetryRecord {
    fn from(value: &BubbleTelemetryRecord) -> Self {
        Self {
            occurred_at_seconds: value.occurred_at_seconds,
            event: (&value.event).into(),
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
enum SerializableBubbleTelemetryEvent {
    Bubble {
        bubble_id: u64,
        colonist: String,
        category: String,
        sound_cue: String,
        text: String,
    },
    Interaction {
        initiator: String,
        recipient: String,
        kind: String,
    },
    MentalBreak {
        colonist: String,
        severity: String,
    },
}

impl From<&BubbleTelemetryEvent> for SerializableBubbleTelemetryEvent {
    fn from(value: &BubbleTelemetryEvent) -> Self {
        match value {
            BubbleTelemetryEvent::Bubble(cue) => Self::Bubble {
                bubble_id: cue.bubble.value(),
                colonist: cue.colonist.to_string(),
                category: cue.category.to_string(),
                sound_cue: cue.cue.to_string(),
                text: cue.text.clone(),
            },
            BubbleTelemetryEvent::Interaction(interaction) => Self::Interaction {
                initiator: interaction.initiator.to_string(),
                recipient: interaction.recipient.to_string(),
                kind: interaction.kind.to_string(),
            },
            BubbleTelemetryEvent::MentalBreak(mental_break) => Self::MentalBreak {
                colonist: mental_break.colonist.to_string(),
                severity: mental_break.severity.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        fs,
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::*;
    use crate::chatter::bubble::{BubbleCategory, BubbleId};
    use crate::chatter::interactions::InteractionKind;
    use crate::colony::components::ColonistId;

    fn cue(id: u64) -> BubbleCueMessage {
        BubbleCueMessage {
            bubble: BubbleId::new(id),
            speaker: Entity::PLACEHOLDER,
            colonist: ColonistId::new(7),
            category: BubbleCategory::Joke,
            cue: BubbleCategory::Joke.sound_cue(),
            text: "Why did the muffalo cross the road?".to_string(),
            shown_at_secs: 1.0,
        }
    }

    fn unique_temp_dir(label: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos())
            .unwrap_or_default();
        std::env::temp_dir().join(format!("colony_chatter_{label}_{nanos}"))
    }

    #[test]
    fn ring_buffer_keeps_latest_records() {
        let mut telemetry = BubbleTelemetry::new(2);
        for id in 0..3 {
            telemetry.push(BubbleTelemetryRecord {
                occurred_at_seconds: id as f64,
                event: BubbleTelemetryEvent::Bubble(cue(id)),
            });
        }
        assert_eq!(telemetry.len(), 2);
        let first = telemetry.records().next().unwrap();
        assert_eq!(first.occurred_at_seconds, 1.0);
    }

    #[test]
    fn flush_appends_json_lines() {
        let dir = unique_temp_dir("appends");
        let path = dir.join("nested").join("bubble_history.jsonl");
        let mut log = BubbleTelemetryLog::new(&path, 8);

        log.push(&BubbleTelemetryRecord {
            occurred_at_seconds: 2.5,
            event: BubbleTelemetryEvent::Bubble(cue(4)),
        });
        log.push(&BubbleTelemetryRecord {
            occurred_at_seconds: 3.0,
            event: BubbleTelemetryEvent::Interaction(InteractionMessage {
                initiator: ColonistId::new(1),
                recipient: ColonistId::new(2),
                kind: InteractionKind::EnthusiasticChat,
            }),
        });
        log.flush().expect("flush succeeds");
        assert!(log.is_empty());

        let contents = fs::read_to_string(&path).expect("log written");
        let lines: Vec<serde_json::Value> = contents
            .lines()
            .map(|line| serde_json::from_str(line).expect("valid json"))
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["event"]["event_type"], "bubble");
        assert_eq!(lines[0]["event"]["bubble_id"], 4);
        assert_eq!(lines[0]["event"]["category"], "joke");
        assert_eq!(lines[0]["event"]["sound_cue"], "tick_tiny");
        assert_eq!(lines[1]["event"]["event_type"], "interaction");
        assert_eq!(lines[1]["event"]["kind"], "enthusiastic_chat");
        assert_eq!(lines[1]["occurred_at_seconds"], 3.0);

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn empty_flush_touches_nothing() {
        let dir = unique_temp_dir("empty");
        let path = dir.join("never.jsonl");
        let mut log = BubbleTelemetryLog::new(&path, 8);
        log.flush().expect("no-op flush");
        assert!(!path.exists());
    }

    #[test]
    fn summary_counts_retained_records_by_kind() {
        let mut telemetry = BubbleTelemetry::new(3);
        telemetry.push(BubbleTelemetryRecord {
            occurred_at_seconds: 1.0,
            event: BubbleTelemetryEvent::Bubble(cue(1)),
        });
        telemetry.push(BubbleTelemetryRecord {
            occurred_at_seconds: 2.0,
            event: BubbleTelemetryEvent::Interaction(InteractionMessage {
                initiator: ColonistId::new(1),
                recipient: ColonistId::new(2),
                kind: InteractionKind::EnthusiasticChat,
            }),
        });
        telemetry.push(BubbleTelemetryRecord {
            occurred_at_seconds: 3.0,
            event: BubbleTelemetryEvent::Bubble(cue(2)),
        });
        telemetry.push(BubbleTelemetryRecord {
            occurred_at_seconds: 4.0,
            event: BubbleTelemetryEvent::Bubble(cue(3)),
        });

        let summary = telemetry.summary();
        assert_eq!(summary.bubbles, 2);
        assert_eq!(summary.interactions, 1);
        assert_eq!(summary.mental_breaks, 0);
        assert_eq!(summary.latest_seconds, Some(4.0));
        assert_eq!(BubbleTelemetry::new(4).summary(), BubbleTelemetrySummary::default());
    }

    #[test]
    fn unwritable_log_keeps_a_bounded_backlog() {
        let dir = unique_temp_dir("unwritable");
        fs::create_dir_all(&dir).expect("temp dir");
        let blocker = dir.join("blocker");
        fs::write(&blocker, b"not a directory").expect("blocker file");
        let mut log = BubbleTelemetryLog::new(blocker.join("bubble_history.jsonl"), 4);

        for id in 0..500 {
            log.push(&BubbleTelemetryRecord {
                occurred_at_seconds: id as f64,
                event: BubbleTelemetryEvent::Bubble(cue(id)),
            });
            assert!(log.flush().is_err());
            assert!(log.pending.len() <= 4);
        }
        let oldest = log.pending.front().expect("backlog retained");
        assert_eq!(oldest.occurred_at_seconds, 496.0);

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn failure_is_reported_once_until_recovery() {
        let mut log = BubbleTelemetryLog::default();
        assert!(!log.note_recovered());
        assert!(log.note_failure());
        assert!(!log.note_failure());
        assert!(log.note_recovered());
        assert!(!log.note_recovered());
        assert!(log.note_failure());
    }

    #[test]
    fn backlog_drains_once_the_path_is_writable() {
        let dir = unique_temp_dir("drains");
        fs::create_dir_all(&dir).expect("temp dir");
        let blocked = dir.join("history");
        fs::write(&blocked, b"in the way").expect("blocker file");
        let path = blocked.join("bubble_history.jsonl");
        let mut log = BubbleTelemetryLog::new(&path, 2);

        for id in 0..3 {
            log.push(&BubbleTelemetryRecord {
                occurred_at_seconds: id as f64,
                event: BubbleTelemetryEvent::Bubble(cue(id)),
            });
        }
        assert!(log.flush().is_err());
        assert_eq!(log.pending.len(), 2);

        fs::remove_file(&blocked).expect("unblock");
        log.flush().expect("flush after unblocking");
        assert!(log.is_empty());
        let contents = fs::read_to_string(&path).expect("log written");
        let ids: Vec<u64> = contents
            .lines()
            .map(|line| {
                let value: serde_json::Value = serde_json::from_str(line).expect("valid json");
                value["event"]["bubble_id"].as_u64().expect("bubble id")
            })
            .collect();
        assert_eq!(ids, vec![1, 2]);

        fs::remove_dir_all(dir).ok();
    }
}
