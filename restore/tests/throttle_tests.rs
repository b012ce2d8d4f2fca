//! Throttle behavior under the paused tokio clock: refills happen on
//! virtual time, so TPS-limited scenarios run instantly while preserving
//! the wall-clock arithmetic.

use std::sync::Arc;
use std::time::Duration;

use backup::model::BackupEntry;
use restore::config::RestoreConfig;
use restore::engine::RestoreEngine;
use restore::status::RestoreStatus;

use mocks::{MockCluster, ScriptedBackup, sample_record, temp_backup_file};

async fn build_engine(
    cfg: RestoreConfig,
    backup: ScriptedBackup,
) -> RestoreEngine<ScriptedBackup, MockCluster> {
    common::logger::init_logger("throttle_tests");

    let status = Arc::new(RestoreStatus::init(&cfg).await.expect("init"));
    RestoreEngine::new(cfg, status, Arc::new(backup), Arc::new(MockCluster::new()))
}

#[tokio::test(start_paused = true)]
async fn tps_limit_paces_the_run() {
    // Scenario B: 10 records/sec, 100 records, one worker. The first ten
    // fit the initial allowance; every further batch of ten waits for one
    // refill, so the run takes at least nine intervals.
    let path = temp_backup_file(10_000);
    let backup = ScriptedBackup::new();
    let entries = (0..100)
        .map(|i| BackupEntry::Record(sample_record(&format!("k{i}"), "demo", 100)))
        .collect();
    backup.add_file(&path, entries).await;

    let cfg = RestoreConfig {
        file_list: vec![path.clone()],
        tps_limit: Some(10),
        parallelism: 1,
        ..Default::default()
    };
    let engine = build_engine(cfg, backup).await;

    let started = tokio::time::Instant::now();
    let snap = engine.run().await.expect("run");
    let elapsed = started.elapsed();

    assert_eq!(snap.total_records, 100);
    assert_eq!(snap.inserted, 100);
    assert!(snap.backoff_count > 0);
    assert_eq!(snap.backoff_count, 9);
    assert!(
        elapsed >= Duration::from_secs(9),
        "run finished too fast: {elapsed:?}"
    );

    let _ = std::fs::remove_file(path);
}

#[tokio::test(start_paused = true)]
async fn bandwidth_limit_paces_bytes() {
    // 1000 bytes/sec, records of 100 bytes: ten fit each interval.
    let path = temp_backup_file(2_000);
    let backup = ScriptedBackup::new();
    let entries = (0..20)
        .map(|i| BackupEntry::Record(sample_record(&format!("k{i}"), "demo", 100)))
        .collect();
    backup.add_file(&path, entries).await;

    let cfg = RestoreConfig {
        file_list: vec![path.clone()],
        bandwidth_limit: Some(1_000),
        parallelism: 1,
        ..Default::default()
    };
    let engine = build_engine(cfg, backup).await;

    let started = tokio::time::Instant::now();
    let snap = engine.run().await.expect("run");
    let elapsed = started.elapsed();

    assert_eq!(snap.inserted, 20);
    assert!(snap.backoff_count > 0);
    assert!(elapsed >= Duration::from_secs(1));

    let _ = std::fs::remove_file(path);
}

#[tokio::test(start_paused = true)]
async fn unlimited_run_never_backs_off() {
    let path = temp_backup_file(1_000);
    let backup = ScriptedBackup::new();
    let entries = (0..50)
        .map(|i| BackupEntry::Record(sample_record(&format!("k{i}"), "demo", 100)))
        .collect();
    backup.add_file(&path, entries).await;

    let cfg = RestoreConfig {
        file_list: vec![path.clone()],
        parallelism: 1,
        ..Default::default()
    };
    let engine = build_engine(cfg, backup).await;

    let started = tokio::time::Instant::now();
    let snap = engine.run().await.expect("run");

    assert_eq!(snap.backoff_count, 0);
    // No refill task, no timers: virtual time never advanced.
    assert_eq!(started.elapsed(), Duration::ZERO);

    let _ = std::fs::remove_file(path);
}

#[tokio::test(start_paused = true)]
async fn stop_interrupts_a_blocked_worker() {
    // A very low TPS limit keeps the worker blocked in the throttle most
    // of the time; stopping mid-run must end the job cleanly with the
    // partial counters intact.
    let path = temp_backup_file(10_000);
    let backup = ScriptedBackup::new();
    let entries = (0..10_000)
        .map(|i| BackupEntry::Record(sample_record(&format!("k{i}"), "demo", 10)))
        .collect();
    backup.add_file(&path, entries).await;

    let cfg = RestoreConfig {
        file_list: vec![path.clone()],
        tps_limit: Some(1),
        parallelism: 1,
        ..Default::default()
    };
    let engine = Arc::new(build_engine(cfg, backup).await);

    let runner = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move { engine.run().await })
    };

    tokio::time::sleep(Duration::from_secs(3)).await;
    engine.stop();

    let snap = runner.await.expect("join").expect("stopped run completes");
    assert!(snap.total_records < 10_000);
    assert!(snap.backoff_count > 0);
    // At most the one record the worker was holding when stopped is
    // counted in the totals without an outcome.
    assert!(snap.total_records - snap.outcome_total() <= 1);

    let _ = std::fs::remove_file(path);
}
