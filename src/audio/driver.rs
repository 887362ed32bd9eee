//! Background thread that keeps a real-time scheduler ticking
//!
//! The scheduler itself is single-threaded; the driver only calls `tick()`
//! under the shared lock and sleeps until the next cue is due.

use crate::audio::scheduler::TransportScheduler;
use crate::audio::transport::Transport;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Longest the driver sleeps before re-checking for new cues
const MAX_IDLE: Duration = Duration::from_millis(20);

pub type SharedScheduler<T> = Arc<Mutex<TransportScheduler<T>>>;

pub struct PlaybackDriver {
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl PlaybackDriver {
    pub fn spawn<T>(scheduler: SharedScheduler<T>) -> Self
    where
        T: Transport + Send + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();

        let thread = thread::spawn(move || {
            while running_clone.load(Ordering::Relaxed) {
                let wait = match scheduler.lock() {
                    Ok(mut scheduler) => {
                        scheduler.tick();
                        scheduler.transport().time_until_next()
                    }
                    Err(_) => {
                        log::error!("Scheduler lock poisoned, playback driver exiting");
                        break;
                    }
                };
                thread::sleep(wait.unwrap_or(MAX_IDLE).min(MAX_IDLE));
            }
        });

        PlaybackDriver {
            running,
            thread: Some(thread),
        }
    }

    pub fn shutdown(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for PlaybackDriver {
    fn drop(&mut self) {
        self.shutdown();
    }
}
