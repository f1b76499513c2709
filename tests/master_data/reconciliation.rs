//! Bulk Reconciliation Tests

use crate::*;
use proptest::prelude::*;

const STRATEGIES: [ReconcileStrategy; 2] = [ReconcileStrategy::PerRow, ReconcileStrategy::Indexed];

// =============================================================================
// BASIC MERGE
// =============================================================================

#[test]
fn test_first_import_creates_key_and_value() {
    for strategy in STRATEGIES {
        let db = create_db_with(strategy);
        db.reconciler
            .reconcile_rows(vec![row("Priority", "High", true)])
            .unwrap();

        let keys = db.keys.find_by_group("Priority").unwrap();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].name, "Priority");
        assert!(!keys[0].is_active);
        assert_eq!(keys[0].audit.created_by, SYSTEM_ACTOR);

        let values = db.values.list_all_by_group("Priority");
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].name, "High");
        assert!(values[0].is_active);
    }
}

#[test]
fn test_second_import_overwrites_flag_without_new_row() {
    for strategy in STRATEGIES {
        let db = create_db_with(strategy);
        db.reconciler
            .reconcile_rows(vec![row("Priority", "High", true)])
            .unwrap();
        let row_id = db.values.list_all_by_group("Priority")[0].row_id.clone();

        let report = db
            .reconciler
            .reconcile_rows(vec![row("Priority", "High", false)])
            .unwrap();
        assert_eq!(report.keys_created, 0);
        assert_eq!(report.values_updated, 1);

        let values = db.values.list_all_by_group("Priority");
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].row_id, row_id);
        assert!(!values[0].is_active);
        assert_eq!(db.keys.find_by_group("Priority").unwrap().len(), 1);
    }
}

#[test]
fn test_existing_key_is_not_recreated() {
    let db = create_db();
    db.keys
        .insert(MasterKey::new("Priority", "admin").active(true))
        .unwrap();

    let report = db
        .reconciler
        .reconcile_rows(vec![row("Priority", "High", true)])
        .unwrap();

    assert_eq!(report.keys_created, 0);
    let keys = db.keys.find_by_group("Priority").unwrap();
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0].audit.created_by, "admin");
}

#[test]
fn test_match_uses_first_of_preexisting_duplicates() {
    for strategy in STRATEGIES {
        let db = create_db_with(strategy);
        let first = MasterValue::new("Priority", "High", "t");
        let second = MasterValue::new("Priority", "High", "t");
        db.values.insert(first.clone()).unwrap();
        db.values.insert(second.clone()).unwrap();

        db.reconciler
            .reconcile_rows(vec![row("Priority", "High", true)])
            .unwrap();

        let values = db.values.list_all_by_group("Priority");
        assert_eq!(values.len(), 2);
        let updated = values.iter().find(|v| v.row_id == first.row_id).unwrap();
        let untouched = values.iter().find(|v| v.row_id == second.row_id).unwrap();
        assert!(updated.is_active);
        assert!(!untouched.is_active);
    }
}

#[test]
fn test_candidate_flags_copied_including_deleted() {
    let db = create_db();
    let existing = MasterValue::new("Status", "Open", "t").active(true);
    db.values.insert(existing.clone()).unwrap();

    let candidate = MasterValue::new("Status", "Open", "importer").deleted(true);
    db.reconciler.reconcile(vec![candidate]).unwrap();

    let stored = db.values.find_by_name("Status", "Open").unwrap().unwrap();
    assert_eq!(stored.row_id, existing.row_id);
    assert!(!stored.is_active);
    assert!(stored.is_deleted);
    assert_eq!(stored.audit.created_by, "t");
    assert_eq!(stored.audit.updated_by, "importer");
}

#[test]
fn test_group_match_is_exact() {
    let db = create_db();
    db.reconciler
        .reconcile_rows(vec![row("Priority", "High", true), row("priority", "High", true)])
        .unwrap();
    assert_eq!(db.keys.list_all().unwrap().len(), 2);
    assert_eq!(db.values.list_all().unwrap().len(), 2);
}

#[test]
fn test_custom_system_actor() {
    let db = MasterData::builder().system_actor("importer").open().unwrap();
    db.reconciler
        .reconcile_rows(vec![row("Priority", "High", true)])
        .unwrap();
    assert_eq!(db.keys.list_all().unwrap()[0].audit.created_by, "importer");
    assert_eq!(db.values.list_all().unwrap()[0].audit.created_by, "importer");
}

// =============================================================================
// WITHIN-BATCH DUPLICATES
// =============================================================================

#[test]
fn test_batch_with_repeats_stores_one_row_per_pair() {
    for strategy in STRATEGIES {
        let db = create_db_with(strategy);
        let report = db
            .reconciler
            .reconcile_rows(vec![
                row("Priority", "High", true),
                row("Priority", "Low", true),
                row("Priority", "High", false),
                row("Status", "Open", true),
                row("Priority", "Low", false),
            ])
            .unwrap();

        assert_eq!(report.candidates, 5);
        assert_eq!(report.keys_created, 2);
        assert_eq!(report.values_inserted, 3);
        assert_eq!(report.values_updated, 2);
        assert_eq!(report.rows_written, 5);

        assert_eq!(
            value_state(&db),
            vec![
                ("Priority".into(), "High".into(), false, false),
                ("Priority".into(), "Low".into(), false, false),
                ("Status".into(), "Open".into(), true, false),
            ]
        );
    }
}

#[test]
fn test_repeated_update_of_stored_row_stages_once() {
    let db = create_db();
    db.reconciler
        .reconcile_rows(vec![row("Priority", "High", true)])
        .unwrap();

    let report = db
        .reconciler
        .reconcile_rows(vec![
            row("Priority", "High", false),
            row("Priority", "High", true),
        ])
        .unwrap();
    assert_eq!(report.values_updated, 2);
    assert_eq!(report.rows_written, 1);
    assert!(db.values.list_all_by_group("Priority")[0].is_active);
}

// =============================================================================
// FAILURE SEMANTICS
// =============================================================================

#[test]
fn test_empty_name_rejects_whole_batch() {
    let db = create_db();
    let err = db
        .reconciler
        .reconcile_rows(vec![row("Priority", "High", true), row("Priority", " ", true)])
        .unwrap_err();
    assert!(err.is_validation());
    assert!(db.keys.list_all().unwrap().is_empty());
    assert!(db.values.list_all().unwrap().is_empty());
}

#[test]
fn test_read_failure_aborts_before_commit() {
    let provider = FlakyProvider::new();
    let db = create_db_over(provider.clone());
    provider.fail_reads(true);

    let err = db
        .reconciler
        .reconcile_rows(vec![row("Priority", "High", true)])
        .unwrap_err();
    assert!(matches!(err, Error::BatchAborted { processed: 0, .. }));
    assert_eq!(provider.commits(), 0);

    provider.fail_reads(false);
    assert!(db.values.list_all().unwrap().is_empty());
}

#[test]
fn test_commit_failure_writes_nothing() {
    let provider = FlakyProvider::new();
    let db = create_db_over(provider.clone());
    provider.fail_commits(true);

    let err = db
        .reconciler
        .reconcile_rows(vec![row("Priority", "High", true), row("Status", "Open", true)])
        .unwrap_err();
    assert!(matches!(err, Error::BatchAborted { processed: 2, .. }));
    assert!(!err.is_retryable());
    assert_eq!(provider.commits(), 1);
    assert!(db.keys.list_all().unwrap().is_empty());
}

#[test]
fn test_earlier_batches_stay_committed() {
    let provider = FlakyProvider::new();
    let db = create_db_over(provider.clone());
    db.reconciler
        .reconcile_rows(vec![row("Priority", "High", true)])
        .unwrap();

    provider.fail_commits(true);
    assert!(db
        .reconciler
        .reconcile_rows(vec![row("Priority", "Low", true)])
        .is_err());

    provider.fail_commits(false);
    assert_eq!(
        value_state(&db),
        vec![("Priority".into(), "High".into(), true, false)]
    );
}

// =============================================================================
// RACES
// =============================================================================

fn competing_insert(group: &str, name: &str) -> WriteBatch {
    let mut batch = WriteBatch::new();
    batch.stage_insert(MasterKey::new(group, "other"));
    batch.stage_insert(MasterValue::new(group, name, "other").active(true));
    batch
}

#[test]
fn test_conflict_with_unique_names_retries_as_update() {
    let provider = RacingProvider::new(true);
    let db = create_db_over(provider.clone());
    provider.race_with(competing_insert("Priority", "High"));

    let report = db
        .reconciler
        .reconcile_rows(vec![row("Priority", "High", false)])
        .unwrap();

    assert_eq!(report.attempts, 2);
    assert_eq!(report.keys_created, 0);
    assert_eq!(report.values_updated, 1);
    assert_eq!(
        value_state(&db),
        vec![("Priority".into(), "High".into(), false, false)]
    );
    assert_eq!(db.keys.list_all().unwrap().len(), 1);
}

#[test]
fn test_conflict_without_retries_aborts() {
    let provider = RacingProvider::new(true);
    let config = MasterDataConfig {
        conflict_retries: 0,
        ..Default::default()
    };
    let db = MasterData::builder()
        .config(config)
        .provider(provider.clone())
        .open()
        .unwrap();
    provider.race_with(competing_insert("Priority", "High"));

    let err = db
        .reconciler
        .reconcile_rows(vec![row("Priority", "High", false)])
        .unwrap_err();
    assert!(err.is_retryable());
    assert!(matches!(
        err.store_error(),
        Some(StoreError::UniqueViolation { .. })
    ));
}

#[test]
fn test_race_without_unique_names_leaves_duplicate() {
    let provider = RacingProvider::new(false);
    let db = create_db_over(provider.clone());
    provider.race_with(competing_insert("Priority", "High"));

    let report = db
        .reconciler
        .reconcile_rows(vec![row("Priority", "High", false)])
        .unwrap();

    assert_eq!(report.attempts, 1);
    assert_eq!(db.values.list_all_by_group("Priority").len(), 2);
    assert_eq!(db.keys.find_by_group("Priority").unwrap().len(), 2);
}

// =============================================================================
// PROPERTIES
// =============================================================================

fn rows_strategy() -> impl Strategy<Value = Vec<ImportRow>> {
    let group = prop::sample::select(vec!["Priority", "Status", "Region"]);
    let name = prop::sample::select(vec!["High", "Low", "Open", "Closed"]);
    prop::collection::vec((group, name, any::<bool>()), 0..24)
        .prop_map(|rows| rows.into_iter().map(|(g, n, a)| row(g, n, a)).collect())
}

fn full_state(db: &MasterData) -> (Vec<(String, RowId, String, bool, bool)>, usize) {
    let mut values: Vec<_> = db
        .values
        .list_all()
        .unwrap()
        .into_iter()
        .map(|v| (v.group, v.row_id, v.name, v.is_active, v.is_deleted))
        .collect();
    values.sort();
    (values, db.keys.list_all().unwrap().len())
}

proptest! {
    #[test]
    fn prop_reconcile_is_idempotent(rows in rows_strategy()) {
        for strategy in STRATEGIES {
            let db = create_db_with(strategy);
            db.reconciler.reconcile_rows(rows.clone()).unwrap();
            let first = full_state(&db);

            let report = db.reconciler.reconcile_rows(rows.clone()).unwrap();
            prop_assert_eq!(report.keys_created, 0);
            prop_assert_eq!(report.values_inserted, 0);
            prop_assert_eq!(full_state(&db), first);
        }
    }

    #[test]
    fn prop_at_most_one_value_per_pair(rows in rows_strategy()) {
        let db = create_db();
        db.reconciler.reconcile_rows(rows.clone()).unwrap();

        let state = value_state(&db);
        let mut pairs: Vec<_> = state.iter().map(|(g, n, _, _)| (g.clone(), n.clone())).collect();
        let stored = pairs.len();
        pairs.dedup();
        prop_assert_eq!(pairs.len(), stored);

        // last occurrence of each pair decides its flag
        for (group, name, active, _) in &state {
            let last = rows.iter().rev().find(|r| &r.group == group && &r.name == name).unwrap();
            prop_assert_eq!(last.is_active, *active);
        }
    }

    #[test]
    fn prop_strategies_agree(
        seed in rows_strategy(),
        rows in rows_strategy(),
    ) {
        let per_row = create_db_with(ReconcileStrategy::PerRow);
        let indexed = create_db_with(ReconcileStrategy::Indexed);

        for db in [&per_row, &indexed] {
            db.reconciler.reconcile_rows(seed.clone()).unwrap();
            db.reconciler.reconcile_rows(rows.clone()).unwrap();
        }

        prop_assert_eq!(value_state(&per_row), value_state(&indexed));
        prop_assert_eq!(key_state(&per_row), key_state(&indexed));
    }
}
