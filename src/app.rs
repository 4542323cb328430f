/// App is the bot state. The shared parts (catalog, validator, settings) are
/// cloned into every chat; each chat then gets its own Game and profile.
use std::{sync::Arc, time::Duration};

use anyhow::Context;
use log::*;
use mobot::*;

use crate::game::{Game, DEFAULT_NOTICE_TTL, DEFAULT_ROLLOVER_PERIOD};
use crate::puzzle::Catalog;
use crate::selector::{Clock, DailySelector};
use crate::session::Session;
use crate::store::{Gateway, JsonFileStore};
use crate::timers::Timer;
use crate::validator::{Oracle, Validator};

pub type ChatGame = Game<JsonFileStore, Oracle>;

/// App represents the bot state for the puzzle bot.
#[derive(Clone, Default, BotState)]
pub struct App {
    // App global
    pub game_name: String,
    catalog: Arc<Catalog>,
    validator: Arc<Validator<Oracle>>,
    selector: DailySelector,
    clock: Clock,
    save_dir: String,
    rollover_period: Duration,
    notice_ttl: Duration,

    // Per chat ID
    game: Option<ChatGame>,
    rollover: Option<Arc<Timer>>,
}

impl App {
    /// Creates a new App instance.
    pub fn new(game_name: String, catalog: Catalog) -> App {
        App {
            game_name,
            catalog: Arc::new(catalog),
            rollover_period: DEFAULT_ROLLOVER_PERIOD,
            notice_ttl: DEFAULT_NOTICE_TTL,
            ..Default::default()
        }
    }

    /// Set the validator used for every chat.
    pub fn set_validator(&mut self, validator: Validator<Oracle>) {
        self.validator = Arc::new(validator);
    }

    /// Set the directory where player profiles are saved.
    pub fn set_save_dir(&mut self, save_dir: String) {
        self.save_dir = save_dir;
    }

    pub fn set_selector(&mut self, selector: DailySelector) {
        self.selector = selector;
    }

    pub fn set_clock(&mut self, clock: Clock) {
        self.clock = clock;
    }

    pub fn set_rollover_period(&mut self, period: Duration) {
        self.rollover_period = period;
    }

    pub fn set_notice_ttl(&mut self, ttl: Duration) {
        self.notice_ttl = ttl;
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The chat's game, if one has been started.
    pub fn game(&self) -> Option<ChatGame> {
        self.game.clone()
    }

    /// Starts today's puzzle for `player` and begins watching for the next day.
    pub fn start_game(&mut self, player: &str) -> anyhow::Result<ChatGame> {
        let store = match JsonFileStore::for_player(&self.save_dir, player) {
            Ok(store) => store,
            Err(e) => {
                // Keep playing without saving rather than overwrite a file we can't read.
                warn!("No saved profile for {}: {:#}", player, e);
                JsonFileStore::default()
            }
        };

        let today = self.clock.today();
        let index = self.selector.index_for(today, self.catalog.len())?;
        let session = Session::new(Arc::clone(&self.catalog), index, Gateway::new(store))
            .context("Error loading today's puzzle")?;

        let game = Game::new(
            session,
            Arc::clone(&self.validator),
            self.selector,
            self.clock.clone(),
        )
        .with_notice_ttl(self.notice_ttl);

        let period = if self.rollover_period.is_zero() {
            DEFAULT_ROLLOVER_PERIOD
        } else {
            self.rollover_period
        };
        self.rollover = Some(Arc::new(game.watch_dates(period)));
        self.game = Some(game.clone());

        info!("Started puzzle index {} for {} on {}", index, player, today);
        Ok(game)
    }
}
