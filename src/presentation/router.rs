// Route table
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    create_plot, create_snapshot, delete_measure, get_measure, get_snapshot, health_check,
    list_interpolation_options, list_measures, put_measure, report_card,
};
use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Compression is done per response in http_response, so no
    // CompressionLayer here.
    Router::new()
        .route("/healthz", get(health_check))
        .route("/measures", get(list_measures))
        .route("/measures/:id", get(get_measure))
        .route("/measures/:id/interpolations", get(list_interpolation_options))
        .route("/snapshots", post(create_snapshot))
        .route("/snapshots/:id", get(get_snapshot))
        .route(
            "/snapshots/:id/measures/:measure_id",
            put(put_measure).delete(delete_measure),
        )
        .route("/snapshots/:id/report-card", get(report_card))
        .route("/plots", post(create_plot))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
