// Plot service - scatter plots over filtered snapshots and per-user report cards
use crate::application::error::{ServiceError, ServiceResult};
use crate::application::snapshot_repository::SnapshotRepository;
use crate::domain::auto_filter::auto_filters;
use crate::domain::filter::{check_units, FilterError, SelectedFilter};
use crate::domain::measures::{InterpolationOption, MeasureClass, MeasureRegistry, ParamName};
use crate::domain::plot::{build_histogram, build_plot, Axis, Histogram, PlotData};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// "Use `sourceValue` of `param` as data for `targetMeasureId`."
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterpolationRequest {
    pub target_measure_id: String,
    pub param: ParamName,
    pub source_value: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotRequest {
    #[serde(default)]
    pub filters: Vec<SelectedFilter>,
    pub x: Axis,
    pub y: Axis,
    #[serde(default)]
    pub interpolations: Vec<InterpolationRequest>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportCard {
    pub snapshot_id: String,
    /// People the report compares against.
    pub filters: Vec<SelectedFilter>,
    /// Snapshots passing `filters`, the user's own excluded.
    pub cohort_size: usize,
    pub histograms: Vec<Histogram>,
}

#[derive(Clone)]
pub struct PlotService {
    repository: Arc<dyn SnapshotRepository>,
    registry: &'static MeasureRegistry,
}

impl PlotService {
    pub fn new(
        repository: Arc<dyn SnapshotRepository>,
        registry: &'static MeasureRegistry,
    ) -> Self {
        Self {
            repository,
            registry,
        }
    }

    pub async fn plot(&self, request: &PlotRequest) -> ServiceResult<PlotData> {
        self.check_axis(&request.x)?;
        self.check_axis(&request.y)?;
        for filter in &request.filters {
            check_units(&filter.measure_id, &filter.filter, self.registry)?;
        }
        let interpolations = request
            .interpolations
            .iter()
            .map(|interpolation| {
                self.registry.interpolation_option(
                    &interpolation.target_measure_id,
                    interpolation.param,
                    &interpolation.source_value,
                )
            })
            .collect::<Result<Vec<InterpolationOption>, _>>()?;

        let snapshots = self.repository.list_snapshots().await?;
        let plot = build_plot(
            snapshots.iter().map(|snapshot| &snapshot.measures),
            &request.filters,
            &request.x,
            &request.y,
            &interpolations,
        );
        tracing::debug!(
            "Plotted {} against {}: {} of {} snapshots",
            request.y.measure_id,
            request.x.measure_id,
            plot.point_count(),
            snapshots.len()
        );
        Ok(plot)
    }

    /// Compare a user against people with similar build and grades: one
    /// histogram for each measure they recorded that is not used as a filter.
    pub async fn report_card(&self, snapshot_id: &str) -> ServiceResult<ReportCard> {
        let snapshots = self.repository.list_snapshots().await?;
        let own = snapshots
            .iter()
            .find(|snapshot| snapshot.id == snapshot_id)
            .ok_or_else(|| ServiceError::SnapshotNotFound(snapshot_id.to_string()))?;
        let filters = auto_filters(&own.measures, self.registry)?;
        let others: Vec<_> = snapshots
            .iter()
            .filter(|snapshot| snapshot.id != snapshot_id)
            .map(|snapshot| &snapshot.measures)
            .collect();
        let cohort_size = others
            .iter()
            .filter(|measures| filters.iter().all(|filter| filter.passes(measures)))
            .count();

        let histograms = own
            .measures
            .iter()
            .filter(|(measure_id, _)| {
                self.registry.get(measure_id).is_some_and(|spec| {
                    !matches!(spec.class(), MeasureClass::Anthro | MeasureClass::Grade)
                })
            })
            .map(|(measure_id, value)| {
                let axis = Axis {
                    measure_id: measure_id.clone(),
                    unit: value.unit(),
                };
                build_histogram(others.iter().copied(), &filters, &axis, Some(value))
            })
            .collect();

        Ok(ReportCard {
            snapshot_id: snapshot_id.to_string(),
            filters,
            cohort_size,
            histograms,
        })
    }

    fn check_axis(&self, axis: &Axis) -> ServiceResult<()> {
        let spec = self.registry.require(&axis.measure_id)?;
        if !spec.allows_unit(axis.unit) {
            return Err(FilterError::UnitNotAllowed {
                measure_id: spec.id.clone(),
                unit: axis.unit,
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::filter::Filter;
    use crate::domain::measures::registry;
    use crate::domain::snapshot::{MeasureMap, Snapshot};
    use crate::domain::units::{UnitKind, UnitValue};
    use crate::infrastructure::memory_repository::InMemorySnapshotRepository;

    const HALF_CRIMP: &str = "maxhang:20mm:7s:half-crimp";
    const FULL_CRIMP: &str = "maxhang:20mm:7s:full-crimp";

    fn snapshot(id: &str, entries: &[(&str, UnitValue)]) -> Snapshot {
        let mut snapshot = Snapshot::new(
            format!("user-{id}"),
            entries
                .iter()
                .map(|(measure_id, value)| (measure_id.to_string(), *value))
                .collect::<MeasureMap>(),
        );
        snapshot.id = id.to_string();
        snapshot
    }

    fn service(snapshots: Vec<Snapshot>) -> PlotService {
        PlotService::new(
            Arc::new(InMemorySnapshotRepository::with_snapshots(snapshots)),
            registry(),
        )
    }

    fn axis(measure_id: &str, unit: UnitKind) -> Axis {
        Axis {
            measure_id: measure_id.to_string(),
            unit,
        }
    }

    #[tokio::test]
    async fn test_plot_uses_interpolation_requests() {
        let service = service(vec![
            snapshot(
                "a",
                &[
                    (HALF_CRIMP, UnitValue::Kilogram(80.0)),
                    ("weight", UnitValue::Kilogram(70.0)),
                ],
            ),
            snapshot(
                "b",
                &[
                    (FULL_CRIMP, UnitValue::Kilogram(30.0)),
                    ("weight", UnitValue::Kilogram(60.0)),
                ],
            ),
        ]);
        let mut request = PlotRequest {
            filters: Vec::new(),
            x: axis("weight", UnitKind::Kilogram),
            y: axis(FULL_CRIMP, UnitKind::Kilogram),
            interpolations: Vec::new(),
        };
        assert_eq!(service.plot(&request).await.unwrap().point_count(), 1);

        request.interpolations.push(InterpolationRequest {
            target_measure_id: FULL_CRIMP.to_string(),
            param: ParamName::Grip,
            source_value: "half-crimp".to_string(),
        });
        assert_eq!(service.plot(&request).await.unwrap().point_count(), 2);
    }

    #[tokio::test]
    async fn test_plot_validates_axes_and_filters() {
        let service = service(Vec::new());
        let mut request = PlotRequest {
            filters: Vec::new(),
            x: axis("weight", UnitKind::Meter),
            y: axis("height", UnitKind::Meter),
            interpolations: Vec::new(),
        };
        assert!(matches!(
            service.plot(&request).await,
            Err(ServiceError::Filter(FilterError::UnitNotAllowed { .. }))
        ));

        request.x = axis("weight", UnitKind::Pound);
        request.filters.push(SelectedFilter::new(
            "age",
            Filter::min_max(UnitValue::Kilogram(1.0), UnitValue::Kilogram(2.0)),
        ));
        assert!(service.plot(&request).await.is_err());
    }

    #[tokio::test]
    async fn test_report_card_compares_similar_climbers() {
        let service = service(vec![
            snapshot(
                "me",
                &[
                    ("weight", UnitValue::Kilogram(70.0)),
                    (HALF_CRIMP, UnitValue::Kilogram(25.0)),
                ],
            ),
            snapshot(
                "similar",
                &[
                    ("weight", UnitValue::Kilogram(72.0)),
                    (HALF_CRIMP, UnitValue::Kilogram(20.0)),
                ],
            ),
            snapshot(
                "heavier",
                &[
                    ("weight", UnitValue::Kilogram(95.0)),
                    (HALF_CRIMP, UnitValue::Kilogram(40.0)),
                ],
            ),
        ]);

        let card = service.report_card("me").await.unwrap();
        assert_eq!(card.filters.len(), 1);
        assert_eq!(card.cohort_size, 1);
        assert_eq!(card.histograms.len(), 1);

        let histogram = &card.histograms[0];
        assert_eq!(histogram.measure_id, HALF_CRIMP);
        assert_eq!(histogram.values, vec![20.0]);
        assert_eq!(histogram.user_value, Some(25.0));
        assert_eq!(histogram.user_percentile, Some(100.0));

        assert!(matches!(
            service.report_card("ghost").await,
            Err(ServiceError::SnapshotNotFound(_))
        ));
    }
}
