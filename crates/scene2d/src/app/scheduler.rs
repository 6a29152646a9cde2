use std::time::{Duration, Instant};

/// Fallback frame interval when no display-synchronized primitive exists.
pub const FALLBACK_FRAME_INTERVAL: Duration = Duration::from_nanos(1_000_000_000 / 30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameToken(u64);

impl FrameToken {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(self) -> u64 {
        self.0
    }
}

/// Host primitive that calls back once per frame.
///
/// Hosts ask [`poll_due`](FrameScheduler::poll_due) when they can run a frame;
/// it hands back the token of a scheduled frame at most once.
pub trait FrameScheduler {
    fn schedule_frame(&mut self) -> FrameToken;

    fn cancel_frame(&mut self, token: FrameToken);

    fn poll_due(&mut self, now: Instant) -> Option<FrameToken>;

    /// When the pending frame becomes due. `None` means unknown or nothing
    /// pending; hosts then fall back to polling.
    fn next_due(&self) -> Option<Instant> {
        None
    }
}

/// Monotonic token source shared by scheduler implementations.
#[derive(Debug, Default)]
pub(crate) struct TokenCounter {
    next: u64,
}

impl TokenCounter {
    pub(crate) fn next_token(&mut self) -> FrameToken {
        self.next = self.next.wrapping_add(1);
        FrameToken(self.next)
    }
}

/// Fixed-interval scheduler. A frame becomes due `interval` after it was
/// scheduled; scheduling again replaces the pending frame.
#[derive(Debug)]
pub struct TimerScheduler {
    interval: Duration,
    tokens: TokenCounter,
    pending: Option<(FrameToken, Instant)>,
}

impl Default for TimerScheduler {
    fn default() -> Self {
        Self::new(FALLBACK_FRAME_INTERVAL)
    }
}

impl TimerScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            tokens: TokenCounter::default(),
            pending: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    fn schedule_at(&mut self, now: Instant) -> FrameToken {
        let token = self.tokens.next_token();
        self.pending = Some((token, now + self.interval));
        token
    }
}

impl FrameScheduler for TimerScheduler {
    fn schedule_frame(&mut self) -> FrameToken {
        self.schedule_at(Instant::now())
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        if matches!(self.pending, Some((pending, _)) if pending == token) {
            self.pending = None;
        }
    }

    fn poll_due(&mut self, now: Instant) -> Option<FrameToken> {
        let (token, due) = self.pending?;
        if now < due {
            return None;
        }
        self.pending = None;
        Some(token)
    }

    fn next_due(&self) -> Option<Instant> {
        self.pending.map(|(_, due)| due)
    }
}
