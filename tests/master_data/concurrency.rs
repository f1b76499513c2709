//! Concurrency Tests

use crate::*;
use std::thread;

#[test]
fn test_concurrent_reconcile_with_unique_names_never_duplicates_values() {
    let config = MasterDataConfig {
        enforce_unique_names: true,
        conflict_retries: 3,
        ..Default::default()
    };
    let db = MasterData::builder().config(config).open().unwrap();
    let rows = vec![
        row("Priority", "High", true),
        row("Priority", "Low", true),
        row("Status", "Open", true),
    ];

    thread::scope(|s| {
        for _ in 0..8 {
            let db = &db;
            let rows = rows.clone();
            s.spawn(move || {
                db.reconciler.reconcile_rows(rows).unwrap();
            });
        }
    });

    assert_eq!(
        value_state(&db),
        vec![
            ("Priority".into(), "High".into(), true, false),
            ("Priority".into(), "Low".into(), true, false),
            ("Status".into(), "Open".into(), true, false),
        ]
    );
}

#[test]
fn test_reads_run_alongside_writes() {
    let db = create_db();
    db.keys.insert(MasterKey::new("Priority", "t")).unwrap();

    thread::scope(|s| {
        let writer = s.spawn(|| {
            for i in 0..200 {
                let value = MasterValue::new("Priority", format!("v{}", i), "t");
                assert!(db.values.insert(value).unwrap());
            }
        });

        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..200 {
                    let seen = db.values.try_list_all_by_group("Priority").unwrap().len();
                    assert!(seen <= 200);
                    assert_eq!(db.keys.find_by_group("Priority").unwrap().len(), 1);
                }
            });
        }

        writer.join().unwrap();
    });

    assert_eq!(db.values.list_all_by_group("Priority").len(), 200);
}

#[test]
fn test_concurrent_inserts_distinct_groups() {
    let db = create_db();

    thread::scope(|s| {
        for t in 0..4 {
            let db = &db;
            s.spawn(move || {
                for i in 0..50 {
                    let group = format!("group-{}", t);
                    assert!(db.values.insert(MasterValue::new(group, format!("{}", i), "t")).unwrap());
                }
            });
        }
    });

    for t in 0..4 {
        let names: Vec<_> = db
            .values
            .list_all_by_group(&format!("group-{}", t))
            .into_iter()
            .map(|v| v.name)
            .collect();
        let expected: Vec<_> = (0..50).map(|i| i.to_string()).collect();
        assert_eq!(names, expected);
    }
}
