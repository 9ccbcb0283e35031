//! Reporting time-window context.
//!
//! Single source of truth for the window every view reads. Pure and
//! deterministic: "now" is passed in by the caller, never sampled here.
//! Non-positive offsets and inverted ranges are rejected at this
//! boundary so invalid windows can never reach the poll cache.

use crate::types::ConsoleError;

// ─── Presets ─────────────────────────────────────────────────────

/// Default reporting window: 12 hours back from now.
pub const DEFAULT_OFFSET_MS: i64 = 12 * 60 * 60 * 1000;

/// A named offset preset from the console's time-picker menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPreset {
    pub label: &'static str,
    pub offset_ms: i64,
}

/// Fixed preset menu. Arbitrary custom offsets are also accepted by
/// [`TimeWindowContext::set_window`].
pub const WINDOW_PRESETS: [WindowPreset; 7] = [
    WindowPreset { label: "30m", offset_ms: 30 * 60 * 1000 },
    WindowPreset { label: "1h", offset_ms: 60 * 60 * 1000 },
    WindowPreset { label: "4h", offset_ms: 4 * 60 * 60 * 1000 },
    WindowPreset { label: "8h", offset_ms: 8 * 60 * 60 * 1000 },
    WindowPreset { label: "12h", offset_ms: 12 * 60 * 60 * 1000 },
    WindowPreset { label: "24h", offset_ms: 24 * 60 * 60 * 1000 },
    WindowPreset { label: "7d", offset_ms: 7 * 24 * 60 * 60 * 1000 },
];

/// Look up a preset offset by its menu label.
pub fn preset_offset(label: &str) -> Option<i64> {
    WINDOW_PRESETS
        .iter()
        .find(|p| p.label == label)
        .map(|p| p.offset_ms)
}

// ─── Snapshot ────────────────────────────────────────────────────

/// Value snapshot of the window, computed at read time. Not a live
/// reference — later context mutations do not affect it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSnapshot {
    pub offset_ms: i64,
    pub start_ms: i64,
    pub end_ms: i64,
}

// ─── Context ─────────────────────────────────────────────────────

/// The shared reporting window. Created once per session, mutated only
/// through its own setters, read by every view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeWindowContext {
    offset_ms: i64,
    /// Absolute end in epoch milliseconds. `None` means "now at read time".
    end_ms: Option<i64>,
}

impl Default for TimeWindowContext {
    fn default() -> Self {
        Self {
            offset_ms: DEFAULT_OFFSET_MS,
            end_ms: None,
        }
    }
}

impl TimeWindowContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the backward-looking offset and, if given, the absolute end.
    /// An omitted end keeps the previously stored one.
    pub fn set_window(&mut self, offset_ms: i64, end_ms: Option<i64>) -> Result<(), ConsoleError> {
        if offset_ms <= 0 {
            return Err(ConsoleError::Validation(format!(
                "window offset must be positive, got {offset_ms}"
            )));
        }
        self.offset_ms = offset_ms;
        if end_ms.is_some() {
            self.end_ms = end_ms;
        }
        Ok(())
    }

    /// Set the window from an absolute range; the offset is derived as
    /// `end - start`.
    pub fn set_window_by_range(&mut self, start_ms: i64, end_ms: i64) -> Result<(), ConsoleError> {
        if start_ms >= end_ms {
            return Err(ConsoleError::Validation(format!(
                "window range start {start_ms} must precede end {end_ms}"
            )));
        }
        self.offset_ms = end_ms - start_ms;
        self.end_ms = Some(end_ms);
        Ok(())
    }

    /// Snapshot the window at `now_ms`. A missing end resolves to `now_ms`.
    pub fn current_window(&self, now_ms: i64) -> WindowSnapshot {
        let end_ms = self.end_ms.unwrap_or(now_ms);
        WindowSnapshot {
            offset_ms: self.offset_ms,
            start_ms: end_ms - self.offset_ms,
            end_ms,
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────
