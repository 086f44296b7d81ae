//! Event collection: the boundary between OS input hooks and the
//! platform-neutral pipeline.
//!
//! A collector owns the event channel. Real hook implementations are
//! platform integration points that feed the same channel; the noop
//! collector compiles everywhere and is what tests drive directly.

pub mod noop;
pub mod types;

pub use types::{FixedScreen, InputEvent, ScreenProbe, WheelAxis};

pub use noop::{check_permission, CollectorError, NoopCollector};

/// Platform-agnostic collector type alias.
pub type Collector = NoopCollector;
