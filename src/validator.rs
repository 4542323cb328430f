/// Word validation. An oracle answers "is this a word?"; the Validator in front
/// of it normalizes input, remembers answers and fails closed when the oracle
/// can't be reached.
use std::{
    collections::{HashMap, HashSet},
    future::Future,
    time::Duration,
};

use anyhow::Context;
use log::*;
use reqwest::StatusCode;
use tokio::sync::RwLock;

pub const DEFAULT_DICTIONARY_URL: &str = "https://api.dictionaryapi.dev/api/v2";

/// Lookup is an oracle's answer for a single word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found,
    NotFound,
    /// The oracle couldn't give an answer this time.
    Failed(String),
}

/// WordOracle is anything that can tell whether a lowercase word exists.
pub trait WordOracle: Send + Sync {
    fn lookup(&self, word: &str) -> impl Future<Output = Lookup> + Send;
}

/// DictionaryApi queries `GET {base}/entries/en/{word}`.
#[derive(Debug, Clone)]
pub struct DictionaryApi {
    client: reqwest::Client,
    base_url: String,
}

impl DictionaryApi {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Option<Duration>,
    ) -> anyhow::Result<DictionaryApi> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(DictionaryApi {
            client: builder.build().context("Error building HTTP client")?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

impl WordOracle for DictionaryApi {
    async fn lookup(&self, word: &str) -> Lookup {
        let url = format!("{}/entries/en/{}", self.base_url, word);
        match self.client.get(&url).send().await {
            Ok(response) if response.status().is_success() => Lookup::Found,
            Ok(response) if response.status() == StatusCode::NOT_FOUND => Lookup::NotFound,
            Ok(response) => Lookup::Failed(format!("dictionary returned {}", response.status())),
            Err(e) => Lookup::Failed(e.to_string()),
        }
    }
}

/// WordList answers from a fixed set of words.
#[derive(Debug, Clone, Default)]
pub struct WordList {
    words: HashSet<String>,
}

impl WordList {
    pub fn new(words: impl IntoIterator<Item = impl AsRef<str>>) -> WordList {
        WordList {
            words: words
                .into_iter()
                .map(|w| w.as_ref().trim().to_ascii_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    /// `load` reads a file containing one word per line. Empty lines and lines
    /// that start with a '#' are skipped.
    pub fn load(path: impl AsRef<str>) -> anyhow::Result<WordList> {
        let path = path.as_ref();
        let contents =
            std::fs::read_to_string(path).context(format!("Error reading word list {}", path))?;
        Ok(WordList::new(contents.lines().filter(|s| !s.starts_with('#'))))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }
}

impl WordOracle for WordList {
    async fn lookup(&self, word: &str) -> Lookup {
        if self.words.contains(word) {
            Lookup::Found
        } else {
            Lookup::NotFound
        }
    }
}

/// Oracle is the oracle picked at startup.
#[derive(Debug, Clone)]
pub enum Oracle {
    Dictionary(DictionaryApi),
    WordList(WordList),
}

impl Default for Oracle {
    fn default() -> Self {
        Oracle::WordList(WordList::default())
    }
}

impl WordOracle for Oracle {
    async fn lookup(&self, word: &str) -> Lookup {
        match self {
            Oracle::Dictionary(api) => api.lookup(word).await,
            Oracle::WordList(list) => list.lookup(word).await,
        }
    }
}

/// Verdict is the validator's answer for a submitted word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    NotFound,
    Unavailable(String),
}

impl Verdict {
    #[cfg(test)]
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid)
    }
}

/// Validator caches oracle answers for the life of the process. Only definite
/// answers are cached; a failed lookup is retried on the next submission.
#[derive(Debug, Default)]
pub struct Validator<O> {
    oracle: O,
    cache: RwLock<HashMap<String, bool>>,
}

impl<O: WordOracle> Validator<O> {
    pub fn new(oracle: O) -> Validator<O> {
        Validator {
            oracle,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub async fn check(&self, word: &str) -> Verdict {
        let word = word.trim().to_lowercase();
        if word.is_empty() {
            return Verdict::NotFound;
        }

        if let Some(valid) = self.cache.read().await.get(&word) {
            return if *valid {
                Verdict::Valid
            } else {
                Verdict::NotFound
            };
        }

        let valid = match self.oracle.lookup(&word).await {
            Lookup::Found => true,
            Lookup::NotFound => false,
            Lookup::Failed(reason) => {
                warn!("Word lookup for {} failed: {}", word, reason);
                return Verdict::Unavailable(reason);
            }
        };

        debug!("Word {} is {}", word, if valid { "valid" } else { "unknown" });
        self.cache.write().await.insert(word, valid);
        if valid {
            Verdict::Valid
        } else {
            Verdict::NotFound
        }
    }

    /// Returns true if the word is a valid word. Lookup failures count as invalid.
    #[cfg(test)]
    pub async fn is_valid(&self, word: &str) -> bool {
        self.check(word).await.is_valid()
    }

    #[cfg(test)]
    pub async fn cached(&self) -> usize {
        self.cache.read().await.len()
    }
}
