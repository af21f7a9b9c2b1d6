//! At-most-once-per-session QR scan tracking.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use url::{Url, form_urlencoded};

use crate::config::ENV_SESSION_ID;
use crate::error::MenuboardError;

/// Query parameter marking a landing from a QR code.
pub const QR_MARKER_KEY: &str = "source";
pub const QR_MARKER_VALUE: &str = "qr";

/// Session flag set once the scan was tracked.
pub const QR_TRACKED_FLAG: &str = "qrTracked";

/// Boolean flags scoped to one browsing session.
pub trait SessionStore {
    fn get(&self, key: &str) -> bool;

    /// Set a flag. Setting an already-set flag is a no-op.
    fn set(&mut self, key: &str) -> Result<(), MenuboardError>;
}

/// Flags kept in memory for the lifetime of the process.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    flags: HashSet<String>,
}

#[cfg(test)]
impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> bool {
        self.flags.contains(key)
    }

    fn set(&mut self, key: &str) -> Result<(), MenuboardError> {
        self.flags.insert(key.to_string());
        Ok(())
    }
}

/// Flags kept in a per-session file, one key per line.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Store for `session_id` under `dir`.
    pub fn new(dir: &Path, session_id: &str) -> Self {
        let safe: String = session_id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        Self {
            path: dir.join(format!("session-{safe}.flags")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_flags(&self) -> HashSet<String> {
        std::fs::read_to_string(&self.path)
            .map(|content| content.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> bool {
        self.read_flags().contains(key)
    }

    fn set(&mut self, key: &str) -> Result<(), MenuboardError> {
        let mut flags = self.read_flags();
        if !flags.insert(key.to_string()) {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut keys: Vec<String> = flags.into_iter().collect();
        keys.sort();
        std::fs::write(&self.path, keys.join("\n") + "\n")?;
        Ok(())
    }
}

/// Identifier of the current terminal session.
///
/// `MENUBOARD_SESSION_ID`, then the terminal's `TERM_SESSION_ID`, else
/// scoped to this process.
pub fn current_session_id() -> String {
    std::env::var(ENV_SESSION_ID)
        .or_else(|_| std::env::var("TERM_SESSION_ID"))
        .ok()
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| format!("pid-{}", std::process::id()))
}

/// Whether the URL carries the QR marker.
pub fn has_marker(url: &Url) -> bool {
    url.query_pairs()
        .any(|(k, v)| k == QR_MARKER_KEY && v == QR_MARKER_VALUE)
}

/// The URL without the QR marker; other parameters are kept verbatim.
pub fn strip_marker(url: &Url) -> Url {
    let mut stripped = url.clone();
    let remaining: Vec<&str> = url
        .query()
        .unwrap_or_default()
        .split('&')
        .filter(|segment| !segment.is_empty() && !is_marker_segment(segment))
        .collect();

    if remaining.is_empty() {
        stripped.set_query(None);
    } else {
        stripped.set_query(Some(&remaining.join("&")));
    }
    stripped
}

fn is_marker_segment(segment: &str) -> bool {
    form_urlencoded::parse(segment.as_bytes())
        .any(|(k, v)| k == QR_MARKER_KEY && v == QR_MARKER_VALUE)
}

/// Result of processing a landing URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Landing {
    /// URL to display from now on.
    pub url: String,
    /// Whether the tracking side effect ran.
    pub fired: bool,
}

/// Guards the QR tracking call so it runs at most once per session.
///
/// The in-process latch closes before the side effect runs, so a repeated
/// call never tracks twice even if the session flag could not be written.
#[derive(Debug)]
pub struct SessionTracker<S> {
    store: S,
    latched: bool,
}

impl<S: SessionStore> SessionTracker<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            latched: false,
        }
    }

    /// True exactly once per session for a URL carrying the marker.
    pub fn should_fire(&mut self, url: &Url) -> bool {
        if !has_marker(url) || self.latched || self.store.get(QR_TRACKED_FLAG) {
            return false;
        }
        self.latched = true;
        true
    }

    /// Record that tracking happened. Idempotent.
    pub fn mark_fired(&mut self) {
        if let Err(e) = self.store.set(QR_TRACKED_FLAG) {
            tracing::warn!(error = %e, "could not persist session flag");
        }
    }

    /// Run the tracking side effect if due and strip the marker.
    ///
    /// Side-effect failures are logged and swallowed; the marker is stripped
    /// whenever it was present, fired or not.
    pub fn process<F>(&mut self, raw_url: &str, side_effect: F) -> Result<Landing, MenuboardError>
    where
        F: FnOnce() -> Result<(), MenuboardError>,
    {
        let url = Url::parse(raw_url)?;
        if !has_marker(&url) {
            return Ok(Landing {
                url: url.to_string(),
                fired: false,
            });
        }

        let fired = self.should_fire(&url);
        if fired {
            if let Err(e) = side_effect() {
                tracing::warn!(error = %e, "QR tracking failed");
            }
            self.mark_fired();
        } else {
            tracing::debug!("QR scan already tracked this session");
        }

        Ok(Landing {
            url: strip_marker(&url).to_string(),
            fired,
        })
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Store whose writes always fail.
    struct BrokenStore;

    impl SessionStore for BrokenStore {
        fn get(&self, _key: &str) -> bool {
            false
        }

        fn set(&mut self, _key: &str) -> Result<(), MenuboardError> {
            Err(MenuboardError::Io("read-only".to_string()))
        }
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_should_fire_once() {
        let mut tracker = SessionTracker::new(MemorySessionStore::new());
        let landing = url("https://menu.example/menu/5?source=qr");

        assert!(tracker.should_fire(&landing));
        assert!(!tracker.should_fire(&landing));
    }

    #[test]
    fn test_should_fire_without_marker() {
        let mut tracker = SessionTracker::new(MemorySessionStore::new());
        assert!(!tracker.should_fire(&url("https://menu.example/menu/5")));
        assert!(!tracker.should_fire(&url("https://menu.example/menu/5?source=web")));
        assert!(!tracker.should_fire(&url("https://menu.example/menu/5")));
    }

    #[test]
    fn test_session_flag_blocks_new_tracker() {
        let mut store = MemorySessionStore::new();
        store.set(QR_TRACKED_FLAG).unwrap();

        let mut tracker = SessionTracker::new(store);
        assert!(!tracker.should_fire(&url("https://menu.example/menu/5?source=qr")));
    }

    #[test]
    fn test_strip_marker() {
        assert_eq!(
            strip_marker(&url("https://menu.example/menu/5?source=qr")).as_str(),
            "https://menu.example/menu/5"
        );
        assert_eq!(
            strip_marker(&url("https://menu.example/menu/5?table=3&source=qr&lang=en")).as_str(),
            "https://menu.example/menu/5?table=3&lang=en"
        );
    }

    #[test]
    fn test_strip_marker_keeps_other_params_verbatim() {
        assert_eq!(
            strip_marker(&url("https://menu.example/menu/5?flag&q=a%20b&source=qr")).as_str(),
            "https://menu.example/menu/5?flag&q=a%20b"
        );
        assert_eq!(
            strip_marker(&url("https://menu.example/menu/5?source=%71r#top")).as_str(),
            "https://menu.example/menu/5#top"
        );
    }

    #[test]
    fn test_process_tracks_once_even_when_call_fails() {
        let mut tracker = SessionTracker::new(MemorySessionStore::new());
        let calls = Cell::new(0);

        let landing = tracker
            .process("https://menu.example/menu/5?source=qr", || {
                calls.set(calls.get() + 1);
                Err(MenuboardError::Network("connection refused".to_string()))
            })
            .unwrap();

        assert_eq!(calls.get(), 1);
        assert!(landing.fired);
        assert_eq!(landing.url, "https://menu.example/menu/5");
        assert!(tracker.store().get(QR_TRACKED_FLAG));
    }

    #[test]
    fn test_process_twice_same_mount() {
        let mut tracker = SessionTracker::new(BrokenStore);
        let calls = Cell::new(0);
        let side_effect = || {
            calls.set(calls.get() + 1);
            Ok(())
        };

        tracker
            .process("https://menu.example/menu/5?source=qr", side_effect)
            .unwrap();
        let second = tracker
            .process("https://menu.example/menu/5?source=qr", side_effect)
            .unwrap();

        // Latch holds although the flag write failed
        assert_eq!(calls.get(), 1);
        assert!(!second.fired);
        assert_eq!(second.url, "https://menu.example/menu/5");
    }

    #[test]
    fn test_process_without_marker_keeps_url() {
        let mut tracker = SessionTracker::new(MemorySessionStore::new());
        let landing = tracker
            .process("https://menu.example/menu/5?table=2", || {
                panic!("must not track")
            })
            .unwrap();
        assert!(!landing.fired);
        assert_eq!(landing.url, "https://menu.example/menu/5?table=2");
    }

    #[test]
    fn test_process_invalid_url() {
        let mut tracker = SessionTracker::new(MemorySessionStore::new());
        let result = tracker.process("menu/5?source=qr", || Ok(()));
        assert!(matches!(result, Err(MenuboardError::InvalidUrl(_))));
    }

    #[test]
    fn test_file_store_survives_reload() {
        let dir = tempfile::tempdir().unwrap();

        let mut first = SessionTracker::new(FileSessionStore::new(dir.path(), "tab-1"));
        let landing = first
            .process("https://menu.example/menu/5?source=qr", || Ok(()))
            .unwrap();
        assert!(landing.fired);

        // A reload in the same session starts with a fresh latch
        let mut reloaded = SessionTracker::new(FileSessionStore::new(dir.path(), "tab-1"));
        let landing = reloaded
            .process("https://menu.example/menu/5?source=qr", || Ok(()))
            .unwrap();
        assert!(!landing.fired);

        // Another session tracks again
        let mut other = SessionTracker::new(FileSessionStore::new(dir.path(), "tab-2"));
        assert!(other.should_fire(&url("https://menu.example/menu/5?source=qr")));
    }

    #[test]
    fn test_file_store_sanitizes_session_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path(), "w0t0p0:ABC/../x");
        assert_eq!(
            store.path().file_name().unwrap().to_str().unwrap(),
            "session-w0t0p0_ABC____x.flags"
        );
    }

    #[test]
    fn test_file_store_set_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileSessionStore::new(&dir.path().join("nested"), "s");
        store.set(QR_TRACKED_FLAG).unwrap();
        store.set(QR_TRACKED_FLAG).unwrap();
        let content = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(content, "qrTracked\n");
    }
}
