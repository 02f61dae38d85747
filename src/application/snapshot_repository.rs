// Repository trait for snapshot storage
use crate::domain::snapshot::Snapshot;
use crate::domain::units::UnitValue;
use async_trait::async_trait;

/// Outcome of removing one measure from a stored snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum MeasureRemoval {
    Removed(Snapshot),
    NotRecorded,
    SnapshotMissing,
}

#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// Every stored snapshot, oldest first
    async fn list_snapshots(&self) -> anyhow::Result<Vec<Snapshot>>;

    async fn get_snapshot(&self, id: &str) -> anyhow::Result<Option<Snapshot>>;

    /// Insert or replace by id
    async fn save_snapshot(&self, snapshot: Snapshot) -> anyhow::Result<()>;

    /// Set one measure in place, leaving the others untouched. `None` when
    /// the snapshot does not exist.
    async fn set_measure(
        &self,
        id: &str,
        measure_id: &str,
        value: UnitValue,
    ) -> anyhow::Result<Option<Snapshot>>;

    async fn remove_measure(&self, id: &str, measure_id: &str) -> anyhow::Result<MeasureRemoval>;
}
