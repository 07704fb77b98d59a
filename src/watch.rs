//! Scene-file watching for script refreshes.
//!
//! When the editor recompiles a project's scripts, script-component records
//! need to be re-applied without disturbing scene geometry — that is what
//! [`Scene::load_scripts_only`](crate::scene::Scene::load_scripts_only) is
//! for. The [`ScriptWatcher`] supplies the trigger: it watches scene files on
//! disk and reports, once per quiet period, which ones changed.
//!
//! ## Debounce
//!
//! Editors perform atomic saves (write temp file, rename over the original),
//! which produce several filesystem events in quick succession. Events are
//! collected per path and only reported after 100 ms of quiet time, so one
//! burst of saves yields exactly one refresh.
//!
//! ## Graceful degradation
//!
//! If the watcher fails to initialize (e.g. inotify limit reached), nothing
//! breaks — changes simply stop being detected, and a warning is logged.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};

/// Quiet time required before a changed file is reported.
const DEBOUNCE_DURATION: Duration = Duration::from_millis(100);

/// Watches scene files and reports debounced changes.
pub struct ScriptWatcher {
    /// The filesystem watcher. `None` if initialization failed.
    watcher: Option<RecommendedWatcher>,
    /// Receives filesystem events from the watcher's background thread.
    /// Only accessed from the frame loop via `poll`, so contention is zero.
    rx: Mutex<mpsc::Receiver<Result<notify::Event, notify::Error>>>,
    /// Canonical paths under watch.
    watched_paths: HashSet<PathBuf>,
    /// Debounce buffer: path → timestamp of last event.
    pending: HashMap<PathBuf, Instant>,
    /// Set once the receiver disconnects (log once, then stop polling).
    rx_disconnected: bool,
}

impl ScriptWatcher {
    /// Create a watcher. Failure to start the backend is logged, not fatal.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let watcher = notify::recommended_watcher(move |res| {
            // Ignore send errors (receiver dropped during shutdown).
            let _ = tx.send(res);
        });
        let watcher = match watcher {
            Ok(w) => Some(w),
            Err(e) => {
                log::warn!("failed to create file watcher: {e}. Script refresh disabled.");
                None
            }
        };

        Self {
            watcher,
            rx: Mutex::new(rx),
            watched_paths: HashSet::new(),
            pending: HashMap::new(),
            rx_disconnected: false,
        }
    }

    /// Register a scene file for watching.
    pub fn watch(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        let canonical = match path.canonicalize() {
            Ok(p) => p,
            Err(e) => {
                log::warn!("cannot watch '{}': {e}", path.display());
                return;
            }
        };

        if let Some(watcher) = &mut self.watcher {
            if let Err(e) = watcher.watch(&canonical, RecursiveMode::NonRecursive) {
                log::warn!("failed to watch '{}': {e}", canonical.display());
                return;
            }
        }
        self.watched_paths.insert(canonical);
    }

    /// Drain filesystem events into the debounce buffer, then return the
    /// paths that have been quiet long enough. Call once per frame; apply
    /// each returned path with `Scene::load_scripts_only`.
    pub fn poll(&mut self) -> Vec<PathBuf> {
        self.drain_events();

        let now = Instant::now();
        let mut ready = Vec::new();
        self.pending.retain(|path, timestamp| {
            if now.duration_since(*timestamp) >= DEBOUNCE_DURATION {
                ready.push(path.clone());
                false
            } else {
                true
            }
        });
        ready
    }

    fn drain_events(&mut self) {
        if self.rx_disconnected {
            return;
        }
        let rx = self.rx.get_mut().expect("ScriptWatcher rx mutex poisoned");

        loop {
            match rx.try_recv() {
                Ok(Ok(event)) => {
                    use notify::EventKind;
                    // Atomic saves surface as create events; plain saves as modify.
                    if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                        for path in &event.paths {
                            let canonical = path.canonicalize().unwrap_or_else(|_| path.clone());
                            if self.watched_paths.contains(&canonical) {
                                self.pending.insert(canonical, Instant::now());
                            }
                        }
                    }
                }
                Ok(Err(e)) => {
                    log::warn!("file watcher error: {e}");
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    log::warn!("file watcher disconnected. Script refresh disabled.");
                    self.rx_disconnected = true;
                    break;
                }
            }
        }
    }
}

impl Default for ScriptWatcher {
    fn default() -> Self {
        Self::new()
    }
}
