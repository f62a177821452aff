// tests/pipeline_scenarios.rs
mod common;

use std::fs;

use common::{raw, xml_link, MapFetcher, MockFeed, RecordingNotifier};
use gazette_monitor::ingest::NoContent;
use gazette_monitor::notify::SummaryPolicy;
use gazette_monitor::{
    CanonicalEntry, InclusionRules, Monitor, MonitorError, Store, StructuredContent,
};

fn justice_rules() -> InclusionRules {
    InclusionRules::new(["Ministry of Justice"], Vec::<String>::new(), Vec::<String>::new())
}

#[tokio::test]
async fn royal_decree_for_configured_department_is_added_and_notified() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("datos_boe.json");

    let feed = MockFeed::new(vec![raw("BOE-A-2024-123", "Royal Decree 123/2024", "Ministry of Justice")]);
    let notifier = RecordingNotifier::default();
    let monitor = Monitor::new(&feed, &NoContent, &notifier, justice_rules());

    let report = monitor.run(&path).await.unwrap();
    assert_eq!(report.added, 1);
    assert_eq!(report.updated, 0);
    assert_eq!(
        notifier.subjects(),
        vec!["New General entry detected", "Gazette monitor: changes found"]
    );
    let (_, body) = notifier.sent.lock().unwrap()[0].clone();
    assert!(body.contains("Royal Decree 123/2024"));
    assert!(body.contains("Ministry of Justice"));
    assert!(body.contains("xml.php?id=BOE-A-2024-123"));

    let store = Store::load_or_init(&path).unwrap();
    assert_eq!(store.entries.len(), 1);
    assert_eq!(store.stats.total_entries, 1);
    assert_eq!(store.stats.processed_entries, 1);
    assert!(store.last_updated_at.is_some());
}

#[tokio::test]
async fn university_correction_is_vetoed_and_no_changes_summary_sent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");

    let feed = MockFeed::new(vec![raw(
        "BOE-A-2024-9",
        "University of X - Correction of errors in prior notice",
        "Ministry of Justice",
    )]);
    let notifier = RecordingNotifier::default();
    let fetcher = MapFetcher::default();
    let report = Monitor::new(&feed, &fetcher, &notifier, justice_rules())
        .run(&path)
        .await
        .unwrap();

    assert_eq!(report.vetoed, 1);
    assert_eq!(report.added, 0);
    assert!(fetcher.requested.lock().unwrap().is_empty());
    assert_eq!(notifier.subjects(), vec!["Gazette monitor: no changes"]);
    assert!(Store::load_or_init(&path).unwrap().entries.is_empty());
}

#[tokio::test]
async fn second_run_on_unchanged_feed_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");

    let feed = MockFeed::new(vec![
        raw("a", "Royal Decree 1/2024", "Ministry of Justice"),
        raw("b", "Order 2/2024", "Ministry of Justice"),
    ]);
    let fetcher = MapFetcher::with(
        &xml_link("a"),
        StructuredContent {
            text: "Article one.".into(),
            department: "Ministry of Justice".into(),
            rank: "Royal Decree".into(),
            ..Default::default()
        },
    );
    let notifier = RecordingNotifier::default();
    let monitor = Monitor::new(&feed, &fetcher, &notifier, justice_rules());

    let first = monitor.run(&path).await.unwrap();
    assert_eq!(first.added, 2);
    let before = fs::read_to_string(&path).unwrap();

    let second = monitor.run(&path).await.unwrap();
    assert_eq!(second.added, 0);
    assert_eq!(second.updated, 0);
    assert_eq!(second.unchanged, 2);
    let after = fs::read_to_string(&path).unwrap();

    let strip = |s: &str| {
        s.lines()
            .filter(|l| !l.contains("fecha_ultima_actualizacion"))
            .map(str::to_string)
            .collect::<Vec<_>>()
    };
    assert_eq!(strip(&before), strip(&after));
    assert_eq!(
        notifier.subjects().last().map(String::as_str),
        Some("Gazette monitor: no changes")
    );
}

#[tokio::test]
async fn updated_entry_keeps_position_and_counter_only_counts_new() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    let rules = justice_rules();

    let feed = MockFeed::new(vec![
        raw("a", "Royal Decree 1/2024", "Ministry of Justice"),
        raw("b", "Royal Decree 2/2024", "Ministry of Justice"),
    ]);
    let notifier = RecordingNotifier::default();
    Monitor::new(&feed, &NoContent, &notifier, rules.clone())
        .run(&path)
        .await
        .unwrap();

    feed.set(vec![
        raw("c", "Royal Decree 3/2024", "Ministry of Justice"),
        raw("a", "Royal Decree 1/2024 (amended)", "Ministry of Justice"),
    ]);
    let report = Monitor::new(&feed, &NoContent, &notifier, rules)
        .run(&path)
        .await
        .unwrap();
    assert_eq!(report.added, 1);
    assert_eq!(report.updated, 1);

    let store = Store::load_or_init(&path).unwrap();
    let ids: Vec<_> = store.entries.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
    assert_eq!(store.entries[0].title, "Royal Decree 1/2024 (amended)");
    assert_eq!(store.stats.total_entries, 3);
    assert_eq!(store.stats.processed_entries, 3);
    assert!(notifier
        .subjects()
        .contains(&"Changes in General entry".to_string()));
}

#[tokio::test]
async fn enrichment_arriving_later_updates_the_entry() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    let feed = MockFeed::new(vec![raw("a", "Royal Decree 1/2024", "Ministry of Justice")]);
    let notifier = RecordingNotifier::default();
    let fetcher = MapFetcher::default();
    let monitor = Monitor::new(&feed, &fetcher, &notifier, justice_rules());

    assert_eq!(monitor.run(&path).await.unwrap().added, 1);

    fetcher.insert(
        &xml_link("a"),
        StructuredContent {
            text: "Article one.".into(),
            ..Default::default()
        },
    );
    let report = monitor.run(&path).await.unwrap();
    assert_eq!(report.updated, 1);
    let store = Store::load_or_init(&path).unwrap();
    assert_eq!(
        store.entries[0].xml_content.as_ref().map(|c| c.text.as_str()),
        Some("Article one.")
    );
}

#[tokio::test]
async fn corrupt_store_aborts_without_writing_or_notifying() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    fs::write(&path, "{\"ultimas_entradas\": [").unwrap();

    let feed = MockFeed::new(vec![raw("a", "Royal Decree 1/2024", "Ministry of Justice")]);
    let notifier = RecordingNotifier::default();
    let err = Monitor::new(&feed, &NoContent, &notifier, justice_rules())
        .run(&path)
        .await
        .unwrap_err();

    assert!(matches!(err, MonitorError::StoreCorrupt { .. }));
    assert_eq!(fs::read_to_string(&path).unwrap(), "{\"ultimas_entradas\": [");
    assert!(notifier.subjects().is_empty());
}

#[tokio::test]
async fn feed_failure_is_fatal_and_leaves_store_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    let seeded = Store::load_or_init(&path).unwrap();
    let before = fs::read_to_string(&path).unwrap();

    let feed = MockFeed::failing();
    let notifier = RecordingNotifier::default();
    let err = Monitor::new(&feed, &NoContent, &notifier, justice_rules())
        .run(&path)
        .await
        .unwrap_err();

    assert!(matches!(err, MonitorError::Fetch { .. }));
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
    assert!(seeded.entries.is_empty());
    assert!(notifier.subjects().is_empty());
}

#[tokio::test]
async fn notifier_failures_do_not_block_persistence() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    let feed = MockFeed::new(vec![raw("a", "Royal Decree 1/2024", "Ministry of Justice")]);
    let notifier = RecordingNotifier::failing();

    let report = Monitor::new(&feed, &NoContent, &notifier, justice_rules())
        .run(&path)
        .await
        .unwrap();
    assert_eq!(report.added, 1);
    assert_eq!(report.notifications_sent, 0);
    assert_eq!(report.notifications_failed, 2);
    assert_eq!(Store::load_or_init(&path).unwrap().entries.len(), 1);
}

#[tokio::test]
async fn empty_rules_fail_closed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    let feed = MockFeed::new(vec![raw("a", "Royal Decree 1/2024", "Ministry of Justice")]);
    let notifier = RecordingNotifier::default();

    let report = Monitor::new(&feed, &NoContent, &notifier, InclusionRules::default())
        .run(&path)
        .await
        .unwrap();
    assert_eq!(report.excluded, 1);
    assert_eq!(report.added, 0);
    assert_eq!(notifier.subjects(), vec!["Gazette monitor: no changes"]);
}

#[tokio::test]
async fn quiet_policy_skips_no_changes_summary() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    let feed = MockFeed::new(Vec::new());
    let notifier = RecordingNotifier::default();

    Monitor::new(&feed, &NoContent, &notifier, justice_rules())
        .with_summary_policy(SummaryPolicy::ChangesOnly)
        .run(&path)
        .await
        .unwrap();
    assert!(notifier.subjects().is_empty());
}

#[tokio::test]
async fn entries_without_id_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    let mut nameless = raw("x", "Royal Decree 1/2024", "Ministry of Justice");
    nameless.id = None;
    let feed = MockFeed::new(vec![nameless]);
    let notifier = RecordingNotifier::default();

    let report = Monitor::new(&feed, &NoContent, &notifier, justice_rules())
        .run(&path)
        .await
        .unwrap();
    assert_eq!(report.skipped, 1);
    assert!(Store::load_or_init(&path).unwrap().entries.is_empty());
}

#[tokio::test]
async fn plain_text_entries_from_an_older_store_stay_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    let stored = CanonicalEntry {
        id: "a".into(),
        title: "Royal Decree 1/2024, of 9 January.".into(),
        description: "Ministry of Justice".into(),
        link: xml_link("a"),
        published_at: "Wed, 10 Jan 2024 00:00:00 +0100".into(),
        category: "General".into(),
        department: "Not specified".into(),
        ..Default::default()
    };
    Store {
        entries: vec![stored],
        ..Default::default()
    }
    .save(&path)
    .unwrap();

    let feed = MockFeed::new(vec![raw(
        "a",
        "Royal Decree 1/2024, of 9 January.",
        "Ministry of Justice",
    )]);
    let notifier = RecordingNotifier::default();
    let report = Monitor::new(&feed, &NoContent, &notifier, justice_rules())
        .run(&path)
        .await
        .unwrap();
    assert_eq!(report.unchanged, 1);
    assert_eq!(report.updated, 0);
    assert_eq!(notifier.subjects(), vec!["Gazette monitor: no changes"]);
}
