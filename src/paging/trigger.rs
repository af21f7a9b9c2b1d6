//! Scroll-triggered next-page detection.

use std::time::{Duration, Instant};

/// Default rows below the viewport that still count as visible.
pub const DEFAULT_MARGIN_ROWS: usize = 2;

/// Minimum time between two transitions.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(300);

/// Delay before the request is actually sent, so "Loading..." is visible.
pub const DEFAULT_UX_DELAY: Duration = Duration::from_millis(150);

/// Tunables for [`ScrollTrigger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerConfig {
    pub margin_rows: usize,
    pub cooldown: Duration,
    pub ux_delay: Duration,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            margin_rows: DEFAULT_MARGIN_ROWS,
            cooldown: DEFAULT_COOLDOWN,
            ux_delay: DEFAULT_UX_DELAY,
        }
    }
}

/// The visible window of a list, in rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub offset: usize,
    pub height: usize,
}

/// Permission to issue one next-page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    /// List generation the request belongs to.
    pub generation: u64,
    /// Wait this long before sending.
    pub delay: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TriggerState {
    Idle,
    Fetching { generation: u64 },
}

/// Two-state machine deciding when the next page should be fetched.
///
/// Idle moves to fetching only when the sentinel (last rendered item) is
/// within the viewport plus margin, more pages exist, and the cooldown has
/// passed. Fetching returns to idle when the ticket's fetch settles.
#[derive(Debug, Clone)]
pub struct ScrollTrigger {
    config: TriggerConfig,
    state: TriggerState,
    sentinel: Option<usize>,
    last_transition: Option<Instant>,
    connected: bool,
}

impl ScrollTrigger {
    pub fn new(config: TriggerConfig) -> Self {
        Self {
            config,
            state: TriggerState::Idle,
            sentinel: None,
            last_transition: None,
            connected: true,
        }
    }

    /// Attach to the current last item (None detaches, e.g. empty list).
    ///
    /// Must be called whenever the rendered items change.
    pub fn observe(&mut self, sentinel: Option<usize>) {
        if self.connected {
            self.sentinel = sentinel;
        }
    }

    /// Whether the sentinel row is inside the viewport extended by the margin.
    pub fn sentinel_visible(&self, viewport: Viewport) -> bool {
        match self.sentinel {
            Some(row) => row < viewport.offset + viewport.height + self.config.margin_rows,
            None => false,
        }
    }

    /// Try the idle → fetching transition.
    pub fn poll(
        &mut self,
        now: Instant,
        viewport: Viewport,
        has_next_page: bool,
        generation: u64,
    ) -> Option<FetchTicket> {
        if !self.connected || !has_next_page {
            return None;
        }
        if let TriggerState::Fetching { .. } = self.state {
            return None;
        }
        if let Some(last) = self.last_transition
            && now.saturating_duration_since(last) < self.config.cooldown
        {
            return None;
        }
        if !self.sentinel_visible(viewport) {
            return None;
        }

        self.state = TriggerState::Fetching { generation };
        self.last_transition = Some(now);
        Some(FetchTicket {
            generation,
            delay: self.config.ux_delay,
        })
    }

    /// Fetching → idle once the ticket issued under `generation` settled.
    ///
    /// Returns false if no such fetch was outstanding.
    pub fn settle(&mut self, generation: u64, now: Instant) -> bool {
        match self.state {
            TriggerState::Fetching { generation: g } if g == generation => {
                self.state = TriggerState::Idle;
                self.last_transition = Some(now);
                true
            }
            _ => false,
        }
    }

    /// Stop observing for good; later polls are no-ops.
    pub fn disconnect(&mut self) {
        self.connected = false;
        self.sentinel = None;
        self.state = TriggerState::Idle;
    }

    pub fn is_fetching(&self) -> bool {
        matches!(self.state, TriggerState::Fetching { .. })
    }

    #[cfg(test)]
    pub fn is_connected(&self) -> bool {
        self.connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport(offset: usize, height: usize) -> Viewport {
        Viewport { offset, height }
    }

    #[test]
    fn test_fires_when_sentinel_visible() {
        let mut trigger = ScrollTrigger::new(TriggerConfig::default());
        trigger.observe(Some(9));

        let ticket = trigger.poll(Instant::now(), viewport(0, 10), true, 1);
        assert_eq!(
            ticket,
            Some(FetchTicket {
                generation: 1,
                delay: DEFAULT_UX_DELAY
            })
        );
        assert!(trigger.is_fetching());
    }

    #[test]
    fn test_margin_extends_viewport() {
        let mut trigger = ScrollTrigger::new(TriggerConfig::default());
        // Last item two rows below a 10-row viewport: inside the margin
        trigger.observe(Some(11));
        assert!(trigger.sentinel_visible(viewport(0, 10)));

        trigger.observe(Some(12));
        assert!(!trigger.sentinel_visible(viewport(0, 10)));
        assert!(trigger.poll(Instant::now(), viewport(0, 10), true, 0).is_none());
    }

    #[test]
    fn test_no_sentinel_no_fetch() {
        let mut trigger = ScrollTrigger::new(TriggerConfig::default());
        trigger.observe(None);
        assert!(trigger.poll(Instant::now(), viewport(0, 10), true, 0).is_none());
    }

    #[test]
    fn test_no_fetch_without_next_page() {
        let mut trigger = ScrollTrigger::new(TriggerConfig::default());
        trigger.observe(Some(3));
        assert!(trigger.poll(Instant::now(), viewport(0, 10), false, 0).is_none());
        assert!(!trigger.is_fetching());
    }

    #[test]
    fn test_single_flight_within_cooldown() {
        let mut trigger = ScrollTrigger::new(TriggerConfig::default());
        trigger.observe(Some(5));
        let start = Instant::now();

        let first = trigger.poll(start, viewport(0, 10), true, 0);
        let second = trigger.poll(start + Duration::from_millis(100), viewport(0, 10), true, 0);

        assert!(first.is_some());
        assert!(second.is_none());
    }

    #[test]
    fn test_cooldown_after_settle() {
        let mut trigger = ScrollTrigger::new(TriggerConfig::default());
        trigger.observe(Some(5));
        let start = Instant::now();

        assert!(trigger.poll(start, viewport(0, 10), true, 0).is_some());
        assert!(trigger.settle(0, start + Duration::from_millis(50)));
        assert!(!trigger.is_fetching());

        // Still inside the cooldown measured from the settle transition
        assert!(
            trigger
                .poll(start + Duration::from_millis(200), viewport(0, 10), true, 0)
                .is_none()
        );
        assert!(
            trigger
                .poll(start + Duration::from_millis(400), viewport(0, 10), true, 0)
                .is_some()
        );
    }

    #[test]
    fn test_fetching_blocks_even_after_cooldown() {
        let mut trigger = ScrollTrigger::new(TriggerConfig::default());
        trigger.observe(Some(5));
        let start = Instant::now();

        assert!(trigger.poll(start, viewport(0, 10), true, 0).is_some());
        assert!(
            trigger
                .poll(start + Duration::from_secs(5), viewport(0, 10), true, 0)
                .is_none()
        );
    }

    #[test]
    fn test_settle_requires_matching_generation() {
        let mut trigger = ScrollTrigger::new(TriggerConfig::default());
        trigger.observe(Some(5));
        let now = Instant::now();

        assert!(trigger.poll(now, viewport(0, 10), true, 3).is_some());
        assert!(!trigger.settle(2, now));
        assert!(trigger.is_fetching());
        assert!(trigger.settle(3, now));
        assert!(!trigger.settle(3, now));
    }

    #[test]
    fn test_disconnect() {
        let mut trigger = ScrollTrigger::new(TriggerConfig::default());
        trigger.observe(Some(5));
        trigger.disconnect();

        trigger.observe(Some(5));
        assert!(!trigger.is_connected());
        assert!(trigger.poll(Instant::now(), viewport(0, 10), true, 0).is_none());
    }
}
