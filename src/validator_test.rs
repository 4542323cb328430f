use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use axum::{extract::Path, http::StatusCode, routing::get, Router};

use crate::validator::*;

/// CountingOracle knows a single word and counts how often it's asked.
#[derive(Default)]
struct CountingOracle {
    calls: Arc<AtomicUsize>,
    fail: bool,
}

impl WordOracle for CountingOracle {
    async fn lookup(&self, word: &str) -> Lookup {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Lookup::Failed("connection refused".into())
        } else if word == "lake" {
            Lookup::Found
        } else {
            Lookup::NotFound
        }
    }
}

async fn dictionary_entry(Path(word): Path<String>) -> StatusCode {
    match word.as_str() {
        "lake" => StatusCode::OK,
        "boom" => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::NOT_FOUND,
    }
}

async fn serve_dictionary() -> String {
    let app = Router::new().route("/entries/en/{word}", get(dictionary_entry));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn caches_answers() {
    let oracle = CountingOracle::default();
    let calls = oracle.calls.clone();
    let validator = Validator::new(oracle);

    assert!(validator.is_valid("LAKE").await);
    assert!(validator.is_valid("  lake ").await);
    assert_eq!(validator.check("pods").await, Verdict::NotFound);
    assert_eq!(validator.check("PODS").await, Verdict::NotFound);

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(validator.cached().await, 2);
}

#[tokio::test]
async fn failures_are_invalid_and_not_cached() {
    let oracle = CountingOracle {
        fail: true,
        ..Default::default()
    };
    let calls = oracle.calls.clone();
    let validator = Validator::new(oracle);

    assert!(matches!(validator.check("lake").await, Verdict::Unavailable(_)));
    assert!(!validator.is_valid("lake").await);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(validator.cached().await, 0);
}

#[tokio::test]
async fn empty_words_skip_the_oracle() {
    let oracle = CountingOracle::default();
    let calls = oracle.calls.clone();
    let validator = Validator::new(oracle);

    assert_eq!(validator.check("   ").await, Verdict::NotFound);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn word_list_lookups() {
    let validator = Validator::new(Oracle::WordList(WordList::new(["Lake", ""])));
    assert!(validator.is_valid("LAKE").await);
    assert!(!validator.is_valid("pond").await);
}

#[test]
fn word_list_skips_comments() {
    let path = std::env::temp_dir().join(format!("seecret-words-{}.txt", std::process::id()));
    std::fs::write(&path, "# five letter words\nlake\n\nPOND\n").unwrap();

    let list = WordList::load(path.to_string_lossy()).unwrap();
    assert_eq!(list.len(), 2);

    std::fs::remove_file(&path).unwrap();
    assert!(WordList::load(path.to_string_lossy()).is_err());
}

#[tokio::test]
async fn dictionary_status_codes() {
    let base_url = serve_dictionary().await;
    let api = DictionaryApi::new(format!("{}/", base_url), None).unwrap();

    assert_eq!(api.lookup("lake").await, Lookup::Found);
    assert_eq!(api.lookup("zzzz").await, Lookup::NotFound);
    assert!(matches!(api.lookup("boom").await, Lookup::Failed(_)));

    let validator = Validator::new(Oracle::Dictionary(api));
    assert_eq!(validator.check("Lake").await, Verdict::Valid);
    assert_eq!(validator.check("zzzz").await, Verdict::NotFound);
    assert!(matches!(validator.check("boom").await, Verdict::Unavailable(_)));
}

#[tokio::test]
async fn unreachable_dictionary_fails_closed() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = DictionaryApi::new(format!("http://{}", addr), None).unwrap();
    let validator = Validator::new(api);
    assert!(matches!(validator.check("lake").await, Verdict::Unavailable(_)));
    assert!(!validator.is_valid("lake").await);
}
