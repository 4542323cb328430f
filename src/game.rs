/// Game drives a Session from async code. It holds the session behind a lock,
/// checks words without holding that lock, clears notices on a timer and
/// follows the calendar to the next day's puzzle.
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use chrono::NaiveDate;
use log::*;
use tokio::sync::RwLock;
#[cfg(test)]
use tokio::sync::RwLockWriteGuard;

use crate::error::PlayError;
use crate::selector::{Clock, DailySelector};
use crate::session::{Move, PendingGuess, Session, SessionView};
use crate::store::KeyValueStore;
use crate::timers::Timer;
use crate::validator::{Validator, WordOracle};

pub const DEFAULT_NOTICE_TTL: Duration = Duration::from_secs(2);
pub const DEFAULT_ROLLOVER_PERIOD: Duration = Duration::from_secs(60);

/// Game is a cheap handle; clones share the same session.
pub struct Game<S, O> {
    session: Arc<RwLock<Session<S>>>,
    validator: Arc<Validator<O>>,
    selector: DailySelector,
    clock: Clock,
    notice_ttl: Duration,
    notice_timer: Arc<Mutex<Option<Timer>>>,
    // The last day the rollover check saw.
    day: Arc<Mutex<Option<NaiveDate>>>,
}

/// InFlight owns the session's in-flight slot for one submission. If it is
/// dropped before the verdict is applied, the slot is given back.
struct InFlight<S: KeyValueStore + Send + Sync + 'static> {
    session: Arc<RwLock<Session<S>>>,
    pending: Option<PendingGuess>,
}

impl<S: KeyValueStore + Send + Sync + 'static> InFlight<S> {
    fn word(&self) -> &str {
        self.pending.as_ref().map(|p| p.word.as_str()).unwrap_or_default()
    }
}

impl<S: KeyValueStore + Send + Sync + 'static> Drop for InFlight<S> {
    fn drop(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        warn!("Submission of {} was abandoned", pending.word);
        if let Ok(mut session) = self.session.try_write() {
            session.abandon_submission(pending.generation);
            return;
        }

        let session = Arc::clone(&self.session);
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                session.write().await.abandon_submission(pending.generation);
            });
        }
    }
}

impl<S, O> Clone for Game<S, O> {
    fn clone(&self) -> Self {
        Game {
            session: Arc::clone(&self.session),
            validator: Arc::clone(&self.validator),
            selector: self.selector,
            clock: self.clock.clone(),
            notice_ttl: self.notice_ttl,
            notice_timer: Arc::clone(&self.notice_timer),
            day: Arc::clone(&self.day),
        }
    }
}

impl<S, O> Game<S, O>
where
    S: KeyValueStore + Send + Sync + 'static,
    O: WordOracle + 'static,
{
    pub fn new(
        session: Session<S>,
        validator: Arc<Validator<O>>,
        selector: DailySelector,
        clock: Clock,
    ) -> Game<S, O> {
        Game {
            session: Arc::new(RwLock::new(session)),
            validator,
            selector,
            clock,
            notice_ttl: DEFAULT_NOTICE_TTL,
            notice_timer: Arc::new(Mutex::new(None)),
            day: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_notice_ttl(mut self, ttl: Duration) -> Game<S, O> {
        self.notice_ttl = ttl;
        self
    }

    #[cfg(test)]
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub async fn view(&self) -> SessionView {
        self.session.read().await.view(self.clock.today())
    }

    /// Runs `f` against the session under the write lock.
    #[cfg(test)]
    pub async fn with_session<T>(&self, f: impl FnOnce(&mut Session<S>) -> T) -> T {
        f(&mut *self.session.write().await)
    }

    #[cfg(test)]
    pub async fn lock(&self) -> RwLockWriteGuard<'_, Session<S>> {
        self.session.write().await
    }

    /// Replaces the current notice's timer, so the newest notice gets the full time.
    fn schedule_notice_clear(&self, session: &Session<S>) {
        let Some(notice) = session.notice() else {
            return;
        };
        let id = notice.id;
        let handle = Arc::clone(&self.session);
        let timer = Timer::after(self.notice_ttl, async move {
            handle.write().await.clear_notice(id);
        });

        match self.notice_timer.lock() {
            Ok(mut slot) => *slot = Some(timer),
            Err(poisoned) => *poisoned.into_inner() = Some(timer),
        }
    }

    pub async fn type_letter(&self, c: char) {
        self.session.write().await.type_letter(c);
    }

    pub async fn backspace(&self) {
        self.session.write().await.backspace();
    }

    /// Takes the in-flight slot with `begin`, all under one write lock.
    async fn begin(
        &self,
        begin: impl FnOnce(&mut Session<S>) -> Result<PendingGuess, PlayError>,
    ) -> Result<InFlight<S>, PlayError> {
        let mut session = self.session.write().await;
        match begin(&mut *session) {
            Ok(pending) => Ok(InFlight {
                session: Arc::clone(&self.session),
                pending: Some(pending),
            }),
            Err(e) => {
                self.schedule_notice_clear(&session);
                Err(e)
            }
        }
    }

    async fn finish(&self, mut in_flight: InFlight<S>) -> Result<Move, PlayError> {
        // The lock is free while the word is looked up.
        let verdict = self.validator.check(in_flight.word()).await;

        let mut session = self.session.write().await;
        let Some(pending) = in_flight.pending.take() else {
            return Err(PlayError::Stale);
        };
        let result = session.complete_submission(pending, verdict, self.clock.today());
        // The session logs its own halt.
        match &result {
            Err(PlayError::Stale) | Err(PlayError::Data(_)) | Ok(_) => {}
            Err(_) => self.schedule_notice_clear(&session),
        }
        result
    }

    /// Submits whatever is in the guess buffer.
    pub async fn submit(&self) -> Result<Move, PlayError> {
        let in_flight = self.begin(|session| session.begin_submission()).await?;
        self.finish(in_flight).await
    }

    /// Submits `word`. The buffer is left alone if another guess is still being
    /// checked.
    pub async fn guess(&self, word: &str) -> Result<Move, PlayError> {
        let in_flight = self.begin(|session| session.begin_guess(word)).await?;
        self.finish(in_flight).await
    }

    pub async fn reset(&self) {
        self.session.write().await.reset();
    }

    pub async fn advance(&self) -> Result<usize, PlayError> {
        self.session.write().await.advance()
    }

    pub async fn toggle_high_contrast(&self) -> bool {
        self.session.write().await.gateway_mut().toggle_high_contrast()
    }

    /// Loads today's puzzle if the date has moved on. Returns true if it did.
    /// Puzzles reached with `advance` are left alone until the next day.
    pub async fn check_rollover(&self) -> Result<bool, PlayError> {
        let mut session = self.session.write().await;
        let today = self.clock.today();
        let seen = match self.day.lock() {
            Ok(mut day) => day.replace(today),
            Err(poisoned) => poisoned.into_inner().replace(today),
        };
        if seen == Some(today) {
            return Ok(false);
        }

        let index = self.selector.index_for(today, session.catalog_len())?;
        if index == session.index() {
            return Ok(false);
        }

        info!("New day {}, switching to puzzle index {}", today, index);
        session.roll_over(index)?;
        Ok(true)
    }

    /// Polls the date every `period` until the returned Timer is dropped.
    pub fn watch_dates(&self, period: Duration) -> Timer {
        let game = self.clone();
        Timer::every(period, move || {
            let game = game.clone();
            async move {
                if let Err(e) = game.check_rollover().await {
                    error!("Error checking for a new puzzle: {}", e);
                }
            }
        })
    }
}
