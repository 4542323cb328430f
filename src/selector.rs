/// Picks the puzzle for a calendar day. Everything here works on dates, never on
/// times, so the answer only changes at local midnight.
use std::sync::{Arc, Mutex};

use chrono::{Local, NaiveDate};

use crate::error::DataIntegrityError;

/// The day puzzle 0 was first served.
pub fn default_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 9).unwrap_or_default()
}

/// `select_index` maps a calendar day onto the catalog. Days before the epoch
/// count backwards from it.
pub fn select_index(
    today: NaiveDate,
    epoch: NaiveDate,
    catalog_size: usize,
) -> Result<usize, DataIntegrityError> {
    if catalog_size == 0 {
        return Err(DataIntegrityError::new(0, "the catalog has no puzzles"));
    }
    let days = (today - epoch).num_days().unsigned_abs();
    Ok((days % catalog_size as u64) as usize)
}

/// `next_index` is the sequential alternative to the daily schedule. The flag is
/// set when it wraps past the last puzzle.
pub fn next_index(current: usize, catalog_size: usize) -> (usize, bool) {
    if current + 1 < catalog_size {
        (current + 1, false)
    } else {
        (0, true)
    }
}

/// DailySelector carries the configured epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailySelector {
    pub epoch: NaiveDate,
}

impl Default for DailySelector {
    fn default() -> Self {
        DailySelector {
            epoch: default_epoch(),
        }
    }
}

impl DailySelector {
    pub fn new(epoch: NaiveDate) -> DailySelector {
        DailySelector { epoch }
    }

    pub fn index_for(
        &self,
        today: NaiveDate,
        catalog_size: usize,
    ) -> Result<usize, DataIntegrityError> {
        select_index(today, self.epoch, catalog_size)
    }
}

/// Clock tells the game what day it is. `Fixed` is set by hand and lets tests move
/// through the calendar.
#[derive(Debug, Clone, Default)]
pub enum Clock {
    #[default]
    Local,
    Fixed(Arc<Mutex<NaiveDate>>),
}

impl Clock {
    pub fn fixed(today: NaiveDate) -> Clock {
        Clock::Fixed(Arc::new(Mutex::new(today)))
    }

    pub fn today(&self) -> NaiveDate {
        match self {
            Clock::Local => Local::now().date_naive(),
            Clock::Fixed(day) => match day.lock() {
                Ok(day) => *day,
                Err(poisoned) => *poisoned.into_inner(),
            },
        }
    }

    /// Moves a fixed clock to another day. Has no effect on the local clock.
    pub fn set(&self, today: NaiveDate) {
        if let Clock::Fixed(day) = self {
            match day.lock() {
                Ok(mut day) => *day = today,
                Err(poisoned) => *poisoned.into_inner() = today,
            }
        }
    }
}
