//! Transport: the shared timeline that playback cues are armed on
//!
//! A transport owns an ordered queue of cues keyed by their offset (seconds
//! from transport start). It never fires anything itself; the scheduler pulls
//! due cues with `take_due()` from its `tick()`.

use anyhow::Result;
use songforge_core::compiler::PlaybackEvent;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

/// What happens when a cue comes due
#[derive(Debug, Clone, PartialEq)]
pub enum Cue {
    Chord(PlaybackEvent),
    /// End of the session; stops playback
    End,
}

/// A cue armed at a transport offset for one playback session
#[derive(Debug, Clone)]
pub struct ScheduledCue {
    pub offset: f64,
    pub session: u64,
    /// Arming order, breaks ties between equal offsets
    seq: u64,
    pub cue: Cue,
}

impl PartialEq for ScheduledCue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScheduledCue {}

impl PartialOrd for ScheduledCue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledCue {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap behavior (earliest first, then FIFO)
        other
            .offset
            .total_cmp(&self.offset)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Min-heap of armed cues
#[derive(Debug, Default)]
pub struct CueQueue {
    heap: BinaryHeap<ScheduledCue>,
    next_seq: u64,
}

impl CueQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, offset: f64, session: u64, cue: Cue) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(ScheduledCue {
            offset,
            session,
            seq,
            cue,
        });
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn next_offset(&self) -> Option<f64> {
        self.heap.peek().map(|c| c.offset)
    }

    /// Pop every cue with `offset <= now`, earliest first
    pub fn pop_due(&mut self, now: f64) -> Vec<ScheduledCue> {
        let mut due = Vec::new();
        while self.heap.peek().is_some_and(|c| c.offset <= now) {
            if let Some(cue) = self.heap.pop() {
                due.push(cue);
            }
        }
        due
    }

    /// Drop every cue at or after `offset`
    pub fn cancel_from(&mut self, offset: f64) {
        self.heap.retain(|c| c.offset < offset);
    }
}

/// Timeline primitive the scheduler drives.
///
/// `now()` is the transport position in seconds: zero while stopped, and
/// counting up from zero after `start()`.
pub trait Transport {
    /// Bring up the audio context. May be called more than once.
    fn warm_up(&mut self) -> Result<()>;
    fn set_bpm(&mut self, bpm: f64);
    fn bpm(&self) -> f64;
    fn schedule(&mut self, offset: f64, session: u64, cue: Cue);
    fn start(&mut self);
    /// Halt and rewind to zero; armed cues stay armed
    fn stop(&mut self);
    fn cancel_from(&mut self, offset: f64);
    fn now(&self) -> f64;
    fn is_running(&self) -> bool;
    /// Number of armed cues
    fn pending(&self) -> usize;
    /// Offset of the earliest armed cue
    fn next_due(&self) -> Option<f64>;
    /// Remove and return every cue due at `now()`; nothing while stopped
    fn take_due(&mut self) -> Vec<ScheduledCue>;

    /// Wall-clock wait until the next cue is due, if running
    fn time_until_next(&self) -> Option<Duration> {
        if !self.is_running() {
            return None;
        }
        self.next_due()
            .map(|offset| Duration::from_secs_f64((offset - self.now()).max(0.0)))
    }
}

/// Virtual-time transport; time only moves through `advance()`
#[derive(Debug)]
pub struct ManualTransport {
    queue: CueQueue,
    bpm: f64,
    position: f64,
    running: bool,
    warm_up_error: Option<String>,
    warm_up_calls: usize,
}

impl Default for ManualTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualTransport {
    pub fn new() -> Self {
        ManualTransport {
            queue: CueQueue::new(),
            bpm: 120.0,
            position: 0.0,
            running: false,
            warm_up_error: None,
            warm_up_calls: 0,
        }
    }

    /// A transport whose audio context can never be started
    pub fn failing_warm_up(message: &str) -> Self {
        ManualTransport {
            warm_up_error: Some(message.to_string()),
            ..Self::new()
        }
    }

    /// Move the playhead forward; ignored while stopped
    pub fn advance(&mut self, seconds: f64) {
        if self.running {
            self.position += seconds.max(0.0);
        }
    }

    pub fn warm_up_calls(&self) -> usize {
        self.warm_up_calls
    }
}

impl Transport for ManualTransport {
    fn warm_up(&mut self) -> Result<()> {
        self.warm_up_calls += 1;
        match &self.warm_up_error {
            Some(message) => Err(anyhow::anyhow!("{}", message)),
            None => Ok(()),
        }
    }

    fn set_bpm(&mut self, bpm: f64) {
        self.bpm = bpm;
    }

    fn bpm(&self) -> f64 {
        self.bpm
    }

    fn schedule(&mut self, offset: f64, session: u64, cue: Cue) {
        self.queue.push(offset, session, cue);
    }

    fn start(&mut self) {
        self.running = true;
    }

    fn stop(&mut self) {
        self.running = false;
        self.position = 0.0;
    }

    fn cancel_from(&mut self, offset: f64) {
        self.queue.cancel_from(offset);
    }

    fn now(&self) -> f64 {
        self.position
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn pending(&self) -> usize {
        self.queue.len()
    }

    fn next_due(&self) -> Option<f64> {
        self.queue.next_offset()
    }

    fn take_due(&mut self) -> Vec<ScheduledCue> {
        if !self.running {
            return Vec::new();
        }
        self.queue.pop_due(self.position)
    }
}

/// Wall-clock transport backed by a monotonic `Instant`
#[derive(Debug)]
pub struct RealtimeTransport {
    queue: CueQueue,
    bpm: f64,
    started_at: Option<Instant>,
    warmed_up: bool,
}

impl Default for RealtimeTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl RealtimeTransport {
    pub fn new() -> Self {
        RealtimeTransport {
            queue: CueQueue::new(),
            bpm: 120.0,
            started_at: None,
            warmed_up: false,
        }
    }
}

impl Transport for RealtimeTransport {
    fn warm_up(&mut self) -> Result<()> {
        if self.warmed_up {
            return Ok(());
        }
        #[cfg(feature = "cpal")]
        {
            let device = probe_output_device()?;
            log::info!("Audio output: {}", device);
        }
        self.warmed_up = true;
        Ok(())
    }

    fn set_bpm(&mut self, bpm: f64) {
        self.bpm = bpm;
    }

    fn bpm(&self) -> f64 {
        self.bpm
    }

    fn schedule(&mut self, offset: f64, session: u64, cue: Cue) {
        self.queue.push(offset, session, cue);
    }

    fn start(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(Instant::now());
        }
    }

    fn stop(&mut self) {
        self.started_at = None;
    }

    fn cancel_from(&mut self, offset: f64) {
        self.queue.cancel_from(offset);
    }

    fn now(&self) -> f64 {
        self.started_at
            .map(|start| start.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    fn pending(&self) -> usize {
        self.queue.len()
    }

    fn next_due(&self) -> Option<f64> {
        self.queue.next_offset()
    }

    fn take_due(&mut self) -> Vec<ScheduledCue> {
        if !self.is_running() {
            return Vec::new();
        }
        let now = self.now();
        self.queue.pop_due(now)
    }
}

/// Check that a default output device exists and report it
#[cfg(feature = "cpal")]
fn probe_output_device() -> Result<String> {
    use anyhow::anyhow;
    use cpal::traits::{DeviceTrait, HostTrait};

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| anyhow!("No output device available"))?;
    let config = device.default_output_config()?;
    let name = device.name().unwrap_or_else(|_| "unknown device".to_string());
    Ok(format!("{} ({} Hz)", name, config.sample_rate().0))
}
