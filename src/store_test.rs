use chrono::NaiveDate;

use crate::store::*;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("seecret-{}-{}.json", name, std::process::id()))
}

#[test]
fn absent_values_read_as_defaults() {
    let gateway = Gateway::new(MemoryStore::default());
    assert_eq!(gateway.profile(), Profile::default());
}

#[test]
fn unreadable_values_read_as_defaults() {
    let mut store = MemoryStore::default();
    store.set(STREAK_KEY, "lots".into()).unwrap();
    store.set(LAST_PLAYED_KEY, "yesterday".into()).unwrap();
    store.set(HIGH_CONTRAST_KEY, "yes".into()).unwrap();
    store.set(BEST_COUNT_KEY, "3".into()).unwrap();

    let profile = Gateway::new(store).profile();
    assert_eq!(profile.streak, 0);
    assert_eq!(profile.last_played, None);
    assert!(!profile.high_contrast);
    assert_eq!(profile.best_count, 3);
}

#[test]
fn reads_legacy_dates() {
    let mut store = MemoryStore::default();
    store.set(LAST_PLAYED_KEY, "Mon Jun 09 2025".into()).unwrap();
    assert_eq!(Gateway::new(store).profile().last_played, Some(day(2025, 6, 9)));
}

#[test]
fn streak_counts_consecutive_days() {
    let mut gateway = Gateway::new(MemoryStore::default());

    assert_eq!(gateway.record_win(day(2025, 6, 9)), 1);
    assert_eq!(gateway.record_win(day(2025, 6, 10)), 2);
    // Replaying the same day doesn't add to the streak.
    assert_eq!(gateway.record_win(day(2025, 6, 10)), 2);
    assert_eq!(gateway.record_win(day(2025, 6, 11)), 3);
    // Missed the 12th.
    assert_eq!(gateway.record_win(day(2025, 6, 13)), 1);

    let profile = gateway.profile();
    assert_eq!(profile.last_played, Some(day(2025, 6, 13)));
    assert_eq!(
        gateway.store().get(LAST_PLAYED_KEY),
        Some("2025-06-13".to_string())
    );
}

#[test]
fn huge_streaks_do_not_overflow() {
    let mut store = MemoryStore::default();
    store.set(STREAK_KEY, u32::MAX.to_string()).unwrap();
    store.set(LAST_PLAYED_KEY, "2025-06-09".to_string()).unwrap();
    let mut gateway = Gateway::new(store);

    assert_eq!(gateway.record_win(day(2025, 6, 10)), u32::MAX);
}

#[test]
fn lapsed_streak_reads_as_zero() {
    let mut gateway = Gateway::new(MemoryStore::default());
    gateway.record_win(day(2025, 6, 9));
    gateway.record_win(day(2025, 6, 10));

    let profile = gateway.profile();
    assert_eq!(profile.current_streak(day(2025, 6, 10)), 2);
    assert_eq!(profile.current_streak(day(2025, 6, 11)), 2);
    assert_eq!(profile.current_streak(day(2025, 6, 12)), 0);
    // Reading never rewrites the stored streak.
    assert_eq!(gateway.profile().streak, 2);
}

#[test]
fn toggles_high_contrast() {
    let mut gateway = Gateway::new(MemoryStore::default());
    assert!(gateway.toggle_high_contrast());
    assert_eq!(gateway.store().get(HIGH_CONTRAST_KEY), Some("true".to_string()));
    assert!(!gateway.toggle_high_contrast());
    assert_eq!(gateway.store().get(HIGH_CONTRAST_KEY), Some("false".to_string()));
}

#[test]
fn file_store_survives_reopen() {
    let path = temp_path("reopen");
    let _ = std::fs::remove_file(&path);

    let mut gateway = Gateway::new(JsonFileStore::open(&path).unwrap());
    gateway.record_win(day(2025, 6, 9));
    gateway.set_best_count(4);

    let reopened = Gateway::new(JsonFileStore::open(&path).unwrap()).profile();
    assert_eq!(reopened.streak, 1);
    assert_eq!(reopened.best_count, 4);
    assert_eq!(reopened.last_played, Some(day(2025, 6, 9)));

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn file_store_rejects_corrupt_files() {
    let path = temp_path("corrupt");
    std::fs::write(&path, "not json").unwrap();
    assert!(JsonFileStore::open(&path).is_err());
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn failed_writes_do_not_stop_play() {
    let missing = std::env::temp_dir()
        .join(format!("seecret-missing-{}", std::process::id()))
        .join("profile.json");
    let mut gateway = Gateway::new(JsonFileStore::open(&missing).unwrap());

    gateway.set_best_count(2);
    // The value is still visible for the rest of the session.
    assert_eq!(gateway.profile().best_count, 2);
}

#[test]
fn no_save_dir_means_memory_only() {
    let mut store = JsonFileStore::for_player("", "42").unwrap();
    store.set(STREAK_KEY, "5".into()).unwrap();
    assert_eq!(store.get(STREAK_KEY), Some("5".to_string()));
}
