//! `--stats-filename` progress snapshots.
//!
//! External schedulers poll `{"done": n, "total": m}`. The file is refreshed
//! every [`STATS_INTERVAL`] while a long step runs, and once more at each
//! step boundary. `total` starts at 1 and the last unit is only counted when
//! the archive is published, so a running build never reads as finished.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use serde::Serialize;

use crate::log;

pub const STATS_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct Snapshot {
    done: usize,
    total: usize,
}

pub struct StatsFile {
    path: Option<PathBuf>,
    interval: Duration,
    done: AtomicUsize,
    total: AtomicUsize,
}

impl StatsFile {
    pub fn new(path: Option<&Path>) -> Self {
        Self::with_interval(path, STATS_INTERVAL)
    }

    pub fn with_interval(path: Option<&Path>, interval: Duration) -> Self {
        Self {
            path: path.map(Path::to_path_buf),
            interval,
            done: AtomicUsize::new(0),
            total: AtomicUsize::new(1),
        }
    }

    pub fn add_total(&self, n: usize) {
        self.total.fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_done(&self, n: usize) {
        self.done.fetch_add(n, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> (usize, usize) {
        (
            self.done.load(Ordering::Relaxed),
            self.total.load(Ordering::Relaxed),
        )
    }

    /// Write the current counts. Failures are logged, never fatal.
    pub fn write(&self) {
        self.write_with(0);
    }

    fn write_with(&self, live: usize) {
        let Some(path) = &self.path else {
            return;
        };
        let (done, total) = self.snapshot();
        let snapshot = Snapshot {
            done: (done + live).min(total),
            total,
        };
        let result = serde_json::to_vec(&snapshot)
            .map_err(std::io::Error::other)
            .and_then(|json| std::fs::write(path, json));
        if let Err(e) = result {
            log!("warning"; "cannot write stats to {}: {}", path.display(), e);
        }
    }

    /// Run `work` while a background thread rewrites the file every interval.
    ///
    /// `live` reports units finished inside `work` that are not yet counted.
    pub fn refreshing<T>(&self, live: impl Fn() -> usize + Sync, work: impl FnOnce() -> T) -> T {
        self.write();
        if self.path.is_none() {
            return work();
        }
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        thread::scope(|scope| {
            let live = &live;
            scope.spawn(move || {
                while let Err(RecvTimeoutError::Timeout) = stop_rx.recv_timeout(self.interval) {
                    self.write_with(live());
                }
            });
            let result = work();
            drop(stop_tx);
            result
        })
    }
}
