// Application state for HTTP handlers
use crate::application::measure_service::MeasureService;
use crate::application::plot_service::PlotService;
use crate::application::snapshot_repository::SnapshotRepository;
use crate::application::snapshot_service::SnapshotService;
use crate::domain::measures::MeasureRegistry;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub measure_service: MeasureService,
    pub snapshot_service: SnapshotService,
    pub plot_service: PlotService,
}

impl AppState {
    pub fn new(
        repository: Arc<dyn SnapshotRepository>,
        registry: &'static MeasureRegistry,
    ) -> Self {
        Self {
            measure_service: MeasureService::new(registry),
            snapshot_service: SnapshotService::new(repository.clone(), registry),
            plot_service: PlotService::new(repository, registry),
        }
    }
}
