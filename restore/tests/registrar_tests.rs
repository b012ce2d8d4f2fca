use std::sync::Arc;

use cluster::types::ExistingIndex;
use restore::counters::CounterBlock;
use restore::registrar::Registrar;

use mocks::{MockCluster, sample_index, sample_udf};

#[tokio::test]
async fn concurrent_enqueues_lose_nothing() {
    // Scenario C: two workers, 50 index definitions each.
    let registrar = Arc::new(Registrar::new());

    let a = {
        let registrar = Arc::clone(&registrar);
        tokio::spawn(async move {
            for i in 0..50 {
                registrar.enqueue_index(sample_index(&format!("a-{i}"))).await;
            }
        })
    };
    let b = {
        let registrar = Arc::clone(&registrar);
        tokio::spawn(async move {
            for i in 0..50 {
                registrar.enqueue_index(sample_index(&format!("b-{i}"))).await;
            }
        })
    };
    a.await.unwrap();
    b.await.unwrap();

    assert_eq!(registrar.pending_indexes().await, 100);
}

#[tokio::test]
async fn drain_classifies_each_index_exactly_once() {
    let registrar = Registrar::new();
    let counters = CounterBlock::default();
    let cluster = MockCluster::new();

    {
        let mut existing = cluster.existing_indexes.lock().await;
        existing.insert("same".into(), ExistingIndex::Same);
        existing.insert("different".into(), ExistingIndex::Different);
        existing.insert("opaque".into(), ExistingIndex::Unknown);
    }

    for name in ["brand-new", "same", "different", "opaque"] {
        registrar.enqueue_index(sample_index(name)).await;
    }

    registrar.drain(&cluster, &counters).await.expect("drain");

    let snap = counters.snapshot();
    assert_eq!(snap.indexes_created, 1);
    assert_eq!(snap.indexes_matched, 1);
    assert_eq!(snap.indexes_mismatched, 1);
    assert_eq!(snap.indexes_skipped, 1);
    assert_eq!(snap.index_outcome_total(), 4);

    assert_eq!(registrar.pending_indexes().await, 0);
}

#[tokio::test]
async fn refused_creation_counts_as_skipped() {
    let registrar = Registrar::new();
    let counters = CounterBlock::default();
    let cluster = MockCluster::new();
    *cluster.refuse_index_create.lock().await = true;

    registrar.enqueue_index(sample_index("geo-idx")).await;
    registrar.drain(&cluster, &counters).await.expect("drain");

    let snap = counters.snapshot();
    assert_eq!(snap.indexes_created, 0);
    assert_eq!(snap.indexes_skipped, 1);
    assert_eq!(snap.index_outcome_total(), 1);
}

#[tokio::test]
async fn udfs_split_into_created_and_present() {
    let registrar = Registrar::new();
    let counters = CounterBlock::default();
    let cluster = MockCluster::new();
    cluster.present_udfs.lock().await.insert("old.lua".into());

    registrar.enqueue_udf(sample_udf("old.lua")).await;
    registrar.enqueue_udf(sample_udf("new.lua")).await;
    registrar.drain(&cluster, &counters).await.expect("drain");

    // Only actual registrations are counted.
    assert_eq!(counters.snapshot().udfs_created, 1);
    assert_eq!(registrar.pending_udfs().await, 0);
}

#[tokio::test]
async fn drain_on_empty_queues_is_a_noop() {
    let registrar = Registrar::new();
    let counters = CounterBlock::default();
    let cluster = MockCluster::new();

    registrar.drain(&cluster, &counters).await.expect("drain");

    let snap = counters.snapshot();
    assert_eq!(snap.index_outcome_total(), 0);
    assert_eq!(snap.udfs_created, 0);
}
