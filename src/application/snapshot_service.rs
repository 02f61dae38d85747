// Snapshot service - create, read and edit one user's measurements
use crate::application::error::{ServiceError, ServiceResult};
use crate::application::snapshot_repository::{MeasureRemoval, SnapshotRepository};
use crate::domain::filter::FilterError;
use crate::domain::measures::MeasureRegistry;
use crate::domain::snapshot::{MeasureMap, Snapshot};
use crate::domain::units::{parse_unit_value, validate_unit_value, UnitKind, UnitValue};
use serde::Deserialize;
use std::sync::Arc;

/// A measurement as a client submits it: already typed, or raw text to parse
/// in a given unit (`"5'10\""` in `ft_in`, `"7a+"` in `frenchsport`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MeasureInput {
    Value(UnitValue),
    Text { unit: UnitKind, text: String },
}

impl MeasureInput {
    pub fn into_value(self) -> ServiceResult<UnitValue> {
        let value = match self {
            MeasureInput::Value(value) => value,
            MeasureInput::Text { unit, text } => parse_unit_value(unit, &text)?,
        };
        validate_unit_value(&value)?;
        Ok(value)
    }
}

#[derive(Clone)]
pub struct SnapshotService {
    repository: Arc<dyn SnapshotRepository>,
    registry: &'static MeasureRegistry,
}

impl SnapshotService {
    pub fn new(
        repository: Arc<dyn SnapshotRepository>,
        registry: &'static MeasureRegistry,
    ) -> Self {
        Self {
            repository,
            registry,
        }
    }

    pub async fn create_snapshot(
        &self,
        user_id: String,
        measures: Vec<(String, MeasureInput)>,
    ) -> ServiceResult<Snapshot> {
        if user_id.trim().is_empty() {
            return Err(ServiceError::Invalid("userId must not be empty".to_string()));
        }
        let mut validated = MeasureMap::new();
        for (measure_id, input) in measures {
            let value = self.validate(&measure_id, input)?;
            validated.insert(measure_id, value);
        }

        let snapshot = Snapshot::new(user_id, validated);
        self.repository.save_snapshot(snapshot.clone()).await?;
        tracing::info!(
            "Created snapshot {} with {} measures",
            snapshot.id,
            snapshot.measures.len()
        );
        Ok(snapshot)
    }

    pub async fn get_snapshot(&self, id: &str) -> ServiceResult<Snapshot> {
        self.repository
            .get_snapshot(id)
            .await?
            .ok_or_else(|| ServiceError::SnapshotNotFound(id.to_string()))
    }

    pub async fn update_measure(
        &self,
        snapshot_id: &str,
        measure_id: &str,
        input: MeasureInput,
    ) -> ServiceResult<Snapshot> {
        let value = self.validate(measure_id, input)?;
        let snapshot = self
            .repository
            .set_measure(snapshot_id, measure_id, value)
            .await?
            .ok_or_else(|| ServiceError::SnapshotNotFound(snapshot_id.to_string()))?;
        tracing::debug!("Set {} on snapshot {} to {}", measure_id, snapshot_id, value);
        Ok(snapshot)
    }

    pub async fn delete_measure(
        &self,
        snapshot_id: &str,
        measure_id: &str,
    ) -> ServiceResult<Snapshot> {
        match self.repository.remove_measure(snapshot_id, measure_id).await? {
            MeasureRemoval::Removed(snapshot) => {
                tracing::debug!("Removed {} from snapshot {}", measure_id, snapshot_id);
                Ok(snapshot)
            }
            MeasureRemoval::NotRecorded => Err(ServiceError::MeasureNotRecorded {
                snapshot_id: snapshot_id.to_string(),
                measure_id: measure_id.to_string(),
            }),
            MeasureRemoval::SnapshotMissing => {
                Err(ServiceError::SnapshotNotFound(snapshot_id.to_string()))
            }
        }
    }

    /// Known measure id, a unit the measure offers, and a value within that
    /// unit's input rules.
    fn validate(&self, measure_id: &str, input: MeasureInput) -> ServiceResult<UnitValue> {
        let spec = self.registry.require(measure_id)?;
        let value = input.into_value()?;
        if !spec.allows_unit(value.unit()) {
            return Err(FilterError::UnitNotAllowed {
                measure_id: spec.id.clone(),
                unit: value.unit(),
            }
            .into());
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grade::FrenchSport;
    use crate::domain::measures::registry;
    use crate::domain::units::FeetInches;
    use crate::infrastructure::memory_repository::InMemorySnapshotRepository;

    fn service() -> SnapshotService {
        SnapshotService::new(Arc::new(InMemorySnapshotRepository::new()), registry())
    }

    fn kg(value: f64) -> MeasureInput {
        MeasureInput::Value(UnitValue::Kilogram(value))
    }

    #[tokio::test]
    async fn test_create_and_fetch() {
        let service = service();
        let created = service
            .create_snapshot(
                "climber-1".to_string(),
                vec![
                    ("weight".to_string(), kg(68.0)),
                    (
                        "grade:sport:outdoor:project".to_string(),
                        MeasureInput::Text {
                            unit: UnitKind::FrenchSport,
                            text: "7a+".to_string(),
                        },
                    ),
                ],
            )
            .await
            .unwrap();

        let fetched = service.get_snapshot(&created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(
            fetched.measure("grade:sport:outdoor:project"),
            Some(&UnitValue::FrenchSport(FrenchSport::F7aPlus))
        );
    }

    #[tokio::test]
    async fn test_rejects_unknown_measure_and_foreign_unit() {
        let service = service();
        let err = service
            .create_snapshot("u".to_string(), vec![("wingspan".to_string(), kg(1.0))])
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let err = service
            .create_snapshot("u".to_string(), vec![("height".to_string(), kg(70.0))])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Filter(FilterError::UnitNotAllowed { .. })
        ));

        let err = service
            .create_snapshot(
                "u".to_string(),
                vec![(
                    "maxreps:pullup".to_string(),
                    MeasureInput::Value(UnitValue::Count(7.5)),
                )],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unit(_)));
    }

    #[tokio::test]
    async fn test_update_and_delete_measure() {
        let service = service();
        let snapshot = service
            .create_snapshot("u".to_string(), vec![("weight".to_string(), kg(70.0))])
            .await
            .unwrap();

        let updated = service
            .update_measure(
                &snapshot.id,
                "height",
                MeasureInput::Text {
                    unit: UnitKind::FeetInches,
                    text: "5'10\"".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(
            updated.measure("height"),
            Some(&UnitValue::FeetInches(FeetInches {
                ft: 5.0,
                inches: 10.0,
            }))
        );

        let deleted = service.delete_measure(&snapshot.id, "weight").await.unwrap();
        assert!(deleted.measure("weight").is_none());
        let err = service
            .delete_measure(&snapshot.id, "weight")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::MeasureNotRecorded { .. }));

        let stored = service.get_snapshot(&snapshot.id).await.unwrap();
        assert_eq!(stored.measures.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_snapshot() {
        let service = service();
        let err = service.get_snapshot("nope").await.unwrap_err();
        assert!(matches!(err, ServiceError::SnapshotNotFound(_)));
        let err = service
            .update_measure("nope", "weight", kg(70.0))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::SnapshotNotFound(_)));
        let err = service.delete_measure("nope", "weight").await.unwrap_err();
        assert!(matches!(err, ServiceError::SnapshotNotFound(_)));
    }

    /// Yields before every storage call so concurrent requests interleave.
    struct InterleavingRepository(InMemorySnapshotRepository);

    #[async_trait::async_trait]
    impl SnapshotRepository for InterleavingRepository {
        async fn list_snapshots(&self) -> anyhow::Result<Vec<Snapshot>> {
            tokio::task::yield_now().await;
            self.0.list_snapshots().await
        }

        async fn get_snapshot(&self, id: &str) -> anyhow::Result<Option<Snapshot>> {
            tokio::task::yield_now().await;
            self.0.get_snapshot(id).await
        }

        async fn save_snapshot(&self, snapshot: Snapshot) -> anyhow::Result<()> {
            tokio::task::yield_now().await;
            self.0.save_snapshot(snapshot).await
        }

        async fn set_measure(
            &self,
            id: &str,
            measure_id: &str,
            value: UnitValue,
        ) -> anyhow::Result<Option<Snapshot>> {
            tokio::task::yield_now().await;
            self.0.set_measure(id, measure_id, value).await
        }

        async fn remove_measure(
            &self,
            id: &str,
            measure_id: &str,
        ) -> anyhow::Result<MeasureRemoval> {
            tokio::task::yield_now().await;
            self.0.remove_measure(id, measure_id).await
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_updates_keep_every_measure() {
        let service = SnapshotService::new(
            Arc::new(InterleavingRepository(InMemorySnapshotRepository::new())),
            registry(),
        );
        let snapshot = service
            .create_snapshot(
                "u".to_string(),
                vec![("age".to_string(), MeasureInput::Value(UnitValue::Year(30.0)))],
            )
            .await
            .unwrap();

        let (weight, height, removed) = tokio::join!(
            service.update_measure(&snapshot.id, "weight", kg(64.0)),
            service.update_measure(
                &snapshot.id,
                "height",
                MeasureInput::Value(UnitValue::Centimeter(172.0)),
            ),
            service.delete_measure(&snapshot.id, "age"),
        );
        weight.unwrap();
        height.unwrap();
        removed.unwrap();

        let stored = service.get_snapshot(&snapshot.id).await.unwrap();
        let mut ids: Vec<&str> = stored.measures.keys().map(String::as_str).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec!["height", "weight"]);
    }

    #[test]
    fn test_measure_input_shapes() {
        let typed: MeasureInput = serde_json::from_str(r#"{"unit":"kg","value":70}"#).unwrap();
        assert_eq!(typed, kg(70.0));
        let text: MeasureInput =
            serde_json::from_str(r#"{"unit":"ft_in","text":"6'1"}"#).unwrap();
        assert_eq!(
            text,
            MeasureInput::Text {
                unit: UnitKind::FeetInches,
                text: "6'1".to_string(),
            }
        );
    }
}
