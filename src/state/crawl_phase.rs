/// Crawl phase definitions for the coordinator state machine
///
/// A crawl moves strictly forward: `Idle → Seeding → Running → Draining → Done`.
use std::fmt;

/// Represents the lifecycle phase of a single crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Coordinator built, nothing claimed yet
    Idle,

    /// Seed URL is being claimed and pushed onto the frontier
    Seeding,

    /// Worker pool is draining frontier batches
    Running,

    /// Last batch merged (or crawl cancelled); final checkpoint pending
    Draining,

    /// Final checkpoint written and resources released
    Done,
}

impl CrawlPhase {
    /// Returns true if moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Seeding)
                | (Self::Seeding, Self::Running)
                | (Self::Running, Self::Draining)
                | (Self::Draining, Self::Done)
        )
    }

    /// Returns the lowercase name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Seeding => "seeding",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
