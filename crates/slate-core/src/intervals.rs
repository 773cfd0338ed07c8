//! Quantized time-slot ownership table.
//!
//! Answers "would this schedule overlap an existing one?" in
//! O(duration / granularity) instead of comparing against every scheduled
//! record. The table maps 15-minute slot timestamps to the owning record id;
//! a missing or unowned slot is free. On first use the grid is materialized
//! from the first record's start out to a one-year horizon, and that span is
//! fixed for the lifetime of the table.
//!
//! # Invariants
//!
//! - Windows are half-open `[start, end)`: abutting windows never conflict.
//! - Steps are walked from each record's own start in granularity increments.
//! - A record with no window (no start, or no/zero duration) is exempt and
//!   never touches the table.

use chrono::{Duration, NaiveDateTime};
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::StoreError;
use crate::model::{RecordId, Window, format_start};

/// Fixed time quantum of the table.
pub const SLOT_MINUTES: i64 = 15;

/// Fixed planning span established by the first scheduled record.
pub const HORIZON_DAYS: i64 = 365;

/// Reasons a reservation is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SlotError {
    /// Some step in the window is already owned by another record.
    #[error("schedule overlaps record {0}")]
    Overlap(RecordId),

    /// The window ends past the last timestamp the table covers.
    #[error("schedule ends at {}, beyond the planning horizon {}", format_start(*end), format_start(*horizon))]
    BeyondHorizon {
        end: NaiveDateTime,
        horizon: NaiveDateTime,
    },
}

impl From<SlotError> for StoreError {
    fn from(err: SlotError) -> Self {
        match err {
            SlotError::Overlap(other) => Self::SchedulingConflict { other },
            SlotError::BeyondHorizon { end, horizon } => Self::HorizonExceeded { end, horizon },
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SlotTable {
    /// Slot timestamp -> owner. `None` marks a materialized free slot;
    /// missing keys are free as well (release drops claimed keys).
    slots: BTreeMap<NaiveDateTime, Option<RecordId>>,
    /// Last slot timestamp covered by the materialized grid. Fixed once set.
    horizon: Option<NaiveDateTime>,
}

impl SlotTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last covered slot timestamp, once the grid exists.
    #[must_use]
    pub const fn horizon(&self) -> Option<NaiveDateTime> {
        self.horizon
    }

    /// Owner of the slot starting exactly at `at`, if any.
    #[must_use]
    pub fn owner_at(&self, at: NaiveDateTime) -> Option<RecordId> {
        self.slots.get(&at).copied().flatten()
    }

    /// Try to claim every slot of `window` for `id`.
    ///
    /// A record without a window is exempt and always accepted. The first
    /// window ever reserved materializes the grid for its one-year horizon
    /// and claims its own slots without further checks.
    ///
    /// # Errors
    ///
    /// [`SlotError::BeyondHorizon`] when the window ends past the grid;
    /// [`SlotError::Overlap`] when any step is owned by a different record.
    /// On rejection the table is unchanged.
    pub fn reserve(&mut self, id: RecordId, window: Option<Window>) -> Result<(), SlotError> {
        let Some(window) = window else {
            return Ok(());
        };

        let Some(horizon) = self.horizon else {
            self.materialize(window.start);
            self.claim(id, window);
            return Ok(());
        };

        if window.end > horizon {
            return Err(SlotError::BeyondHorizon {
                end: window.end,
                horizon,
            });
        }

        let mut step = window.start;
        while step < window.end {
            if let Some(&Some(owner)) = self.slots.get(&step) {
                if owner != id {
                    return Err(SlotError::Overlap(owner));
                }
            }
            step += Duration::minutes(SLOT_MINUTES);
        }

        self.claim(id, window);
        Ok(())
    }

    /// Free every slot currently owned by `id`.
    pub fn release(&mut self, id: RecordId) {
        self.slots.retain(|_, owner| *owner != Some(id));
    }

    /// Move `id` from `old` to `new` atomically from the caller's view:
    /// release, then reserve; on rejection the old window is claimed back
    /// before the error is returned, so a failed move never loses the prior
    /// placement.
    ///
    /// # Errors
    ///
    /// Propagates the rejection from [`Self::reserve`].
    pub fn reschedule(
        &mut self,
        id: RecordId,
        old: Option<Window>,
        new: Option<Window>,
    ) -> Result<(), SlotError> {
        self.release(id);
        if let Err(err) = self.reserve(id, new) {
            if let Some(old) = old {
                self.claim(id, old);
            }
            return Err(err);
        }
        Ok(())
    }

    /// Claim `window` for `id` without any checks. Used when reloading a
    /// store from disk, where rows are trusted as-is, and when restoring a
    /// prior placement after a rejected move.
    pub(crate) fn restore(&mut self, id: RecordId, window: Window) {
        if self.horizon.is_none() {
            self.materialize(window.start);
        }
        self.claim(id, window);
    }

    fn claim(&mut self, id: RecordId, window: Window) {
        let mut step = window.start;
        while step < window.end {
            self.slots.insert(step, Some(id));
            step += Duration::minutes(SLOT_MINUTES);
        }
    }

    fn materialize(&mut self, origin: NaiveDateTime) {
        let end = origin + Duration::days(HORIZON_DAYS);
        let mut step = origin;
        let mut last = origin;
        while step < end {
            self.slots.insert(step, None);
            last = step;
            step += Duration::minutes(SLOT_MINUTES);
        }
        self.horizon = Some(last);
        debug!(origin = %format_start(origin), horizon = %format_start(last), "slot grid materialized");
    }
}
