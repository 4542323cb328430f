use std::time::Duration;

use anyhow::Context;
use argh::FromArgs;
use chrono::NaiveDate;
use log::*;

use crate::app::App;
use crate::puzzle::Catalog;
use crate::selector::{default_epoch, DailySelector};
use crate::validator::{DictionaryApi, Oracle, Validator, WordList, DEFAULT_DICTIONARY_URL};

#[derive(FromArgs)]
/// Guess the word behind a blurred picture, one puzzle a day.
pub struct Args {
    /// JSON file with the puzzle catalog; the built-in catalog is used if not set
    #[argh(option, short = 'p')]
    pub puzzles: Option<String>,

    /// file containing valid words, one per line; replaces the dictionary API
    #[argh(option, short = 'v')]
    pub valid_words: Option<String>,

    /// base URL of the dictionary API
    #[argh(option, default = "String::from(DEFAULT_DICTIONARY_URL)")]
    pub dictionary_url: String,

    /// seconds to wait for the dictionary API, 0 for no limit
    #[argh(option, default = "10")]
    pub dictionary_timeout: u64,

    /// directory where player profiles are saved
    #[argh(option, short = 's', default = "String::new()")]
    pub save_dir: String,

    /// the day the first puzzle was served (YYYY-MM-DD)
    #[argh(option, default = "default_epoch()")]
    pub epoch: NaiveDate,

    /// seconds between checks for a new day's puzzle
    #[argh(option, default = "60")]
    pub rollover_secs: u64,

    /// seconds a "not in word list" style notice stays up
    #[argh(option, default = "2")]
    pub notice_secs: u64,

    /// name of the game shown to players
    #[argh(option, default = "String::from(\"Seecret\")")]
    pub game_name: String,
}

impl Args {
    pub fn catalog(&self) -> anyhow::Result<Catalog> {
        match &self.puzzles {
            Some(path) => Catalog::load(path),
            None => Catalog::builtin(),
        }
    }

    pub fn oracle(&self) -> anyhow::Result<Oracle> {
        if let Some(path) = &self.valid_words {
            let words = WordList::load(path)?;
            info!("Checking words against {} ({} words)", path, words.len());
            return Ok(Oracle::WordList(words));
        }

        let timeout =
            (self.dictionary_timeout > 0).then(|| Duration::from_secs(self.dictionary_timeout));
        info!("Checking words against {}", self.dictionary_url);
        Ok(Oracle::Dictionary(DictionaryApi::new(
            self.dictionary_url.clone(),
            timeout,
        )?))
    }

    /// Builds the bot state these arguments describe.
    pub fn app(&self) -> anyhow::Result<App> {
        let catalog = self.catalog().context("Error loading puzzles")?;
        info!("Loaded {} puzzles", catalog.len());

        let mut app = App::new(self.game_name.clone(), catalog);
        app.set_validator(Validator::new(self.oracle()?));
        app.set_save_dir(self.save_dir.clone());
        app.set_selector(DailySelector::new(self.epoch));
        app.set_rollover_period(Duration::from_secs(self.rollover_secs.max(1)));
        app.set_notice_ttl(Duration::from_secs(self.notice_secs));
        Ok(app)
    }
}
