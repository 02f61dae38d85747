// In-memory snapshot repository, optionally seeded from a JSON file
use crate::application::snapshot_repository::{MeasureRemoval, SnapshotRepository};
use crate::domain::snapshot::Snapshot;
use crate::domain::units::UnitValue;
use anyhow::Context;
use async_trait::async_trait;
use std::path::Path;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct InMemorySnapshotRepository {
    // Insertion order is list order.
    snapshots: RwLock<Vec<Snapshot>>,
}

impl InMemorySnapshotRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshots(snapshots: Vec<Snapshot>) -> Self {
        Self {
            snapshots: RwLock::new(snapshots),
        }
    }

    pub async fn from_seed_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading seed snapshots from {}", path.display()))?;
        let snapshots: Vec<Snapshot> = serde_json::from_str(&text)
            .with_context(|| format!("parsing seed snapshots in {}", path.display()))?;
        tracing::info!("Loaded {} seed snapshots from {}", snapshots.len(), path.display());
        Ok(Self::with_snapshots(snapshots))
    }
}

#[async_trait]
impl SnapshotRepository for InMemorySnapshotRepository {
    async fn list_snapshots(&self) -> anyhow::Result<Vec<Snapshot>> {
        Ok(self.snapshots.read().await.clone())
    }

    async fn get_snapshot(&self, id: &str) -> anyhow::Result<Option<Snapshot>> {
        Ok(self
            .snapshots
            .read()
            .await
            .iter()
            .find(|snapshot| snapshot.id == id)
            .cloned())
    }

    async fn save_snapshot(&self, snapshot: Snapshot) -> anyhow::Result<()> {
        let mut snapshots = self.snapshots.write().await;
        match snapshots.iter_mut().find(|stored| stored.id == snapshot.id) {
            Some(stored) => *stored = snapshot,
            None => snapshots.push(snapshot),
        }
        Ok(())
    }

    // Edits happen under one write guard so concurrent edits to different
    // measures of a snapshot all land.
    async fn set_measure(
        &self,
        id: &str,
        measure_id: &str,
        value: UnitValue,
    ) -> anyhow::Result<Option<Snapshot>> {
        let mut snapshots = self.snapshots.write().await;
        Ok(snapshots
            .iter_mut()
            .find(|stored| stored.id == id)
            .map(|stored| {
                stored.update_measure(measure_id.to_string(), value);
                stored.clone()
            }))
    }

    async fn remove_measure(&self, id: &str, measure_id: &str) -> anyhow::Result<MeasureRemoval> {
        let mut snapshots = self.snapshots.write().await;
        let Some(stored) = snapshots.iter_mut().find(|stored| stored.id == id) else {
            return Ok(MeasureRemoval::SnapshotMissing);
        };
        Ok(match stored.delete_measure(measure_id) {
            Some(_) => MeasureRemoval::Removed(stored.clone()),
            None => MeasureRemoval::NotRecorded,
        })
    }
}
