// Plot data - axis extraction, interpolation and dotplot/heatmap/histogram shapes
use crate::domain::filter::{snapshot_passes, SelectedFilter};
use crate::domain::measures::InterpolationOption;
use crate::domain::snapshot::MeasureMap;
use crate::domain::units::{unit_value_to_number, UnitKind, UnitValue};
use serde::{Deserialize, Serialize};

/// Above this many points a plot is binned instead of drawn point by point.
pub const DOTPLOT_THRESHOLD: usize = 20;
pub const HEATMAP_BINS: usize = 10;
pub const HISTOGRAM_BINS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Axis {
    pub measure_id: String,
    pub unit: UnitKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Heatmap {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    /// `counts[row][column]`, row 0 holding the smallest y values.
    pub counts: Vec<Vec<u32>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PlotData {
    Dotplot { points: Vec<DataPoint> },
    Heatmap(Heatmap),
}

impl PlotData {
    pub fn point_count(&self) -> usize {
        match self {
            PlotData::Dotplot { points } => points.len(),
            PlotData::Heatmap(heatmap) => heatmap
                .counts
                .iter()
                .flatten()
                .map(|count| *count as usize)
                .sum(),
        }
    }
}

/// Value for `measure_id`, borrowing a sibling measure through an
/// interpolation option when the snapshot lacks the exact one.
pub fn resolve_measure<'m>(
    measures: &'m MeasureMap,
    measure_id: &str,
    interpolations: &[InterpolationOption],
) -> Option<&'m UnitValue> {
    measures.get(measure_id).or_else(|| {
        interpolations
            .iter()
            .filter(|option| option.target_measure_id == measure_id)
            .find_map(|option| measures.get(&option.source_measure_id))
    })
}

/// Plain number for `axis`, or `None` when the snapshot has nothing usable.
pub fn axis_value(
    measures: &MeasureMap,
    axis: &Axis,
    interpolations: &[InterpolationOption],
) -> Option<f64> {
    let value = resolve_measure(measures, &axis.measure_id, interpolations)?;
    if !value.unit().is_compatible_with(axis.unit) {
        return None;
    }
    Some(unit_value_to_number(&value.convert_to(axis.unit)))
}

pub fn extract_data_point(
    measures: &MeasureMap,
    x: &Axis,
    y: &Axis,
    interpolations: &[InterpolationOption],
) -> Option<DataPoint> {
    Some(DataPoint {
        x: axis_value(measures, x, interpolations)?,
        y: axis_value(measures, y, interpolations)?,
    })
}

pub fn build_plot<'a>(
    snapshots: impl IntoIterator<Item = &'a MeasureMap>,
    filters: &[SelectedFilter],
    x: &Axis,
    y: &Axis,
    interpolations: &[InterpolationOption],
) -> PlotData {
    let points: Vec<DataPoint> = snapshots
        .into_iter()
        .filter(|measures| snapshot_passes(filters, measures))
        .filter_map(|measures| extract_data_point(measures, x, y, interpolations))
        .collect();

    if points.len() <= DOTPLOT_THRESHOLD {
        PlotData::Dotplot { points }
    } else {
        PlotData::Heatmap(bin_points(&points))
    }
}

fn extent(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), value| {
        (min.min(value), max.max(value))
    })
}

/// Bin index for `value` in `[min, max]`; the top edge lands in the last bin.
fn bin_index(value: f64, min: f64, max: f64, bins: usize) -> usize {
    if max <= min {
        return 0;
    }
    let position = ((value - min) / (max - min) * bins as f64).floor();
    (position.max(0.0) as usize).min(bins - 1)
}

fn bin_points(points: &[DataPoint]) -> Heatmap {
    let (x_min, x_max) = extent(points.iter().map(|point| point.x));
    let (y_min, y_max) = extent(points.iter().map(|point| point.y));
    let mut counts = vec![vec![0u32; HEATMAP_BINS]; HEATMAP_BINS];
    for point in points {
        let column = bin_index(point.x, x_min, x_max, HEATMAP_BINS);
        let row = bin_index(point.y, y_min, y_max, HEATMAP_BINS);
        counts[row][column] += 1;
    }
    Heatmap {
        x_min,
        x_max,
        y_min,
        y_max,
        counts,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Histogram {
    pub measure_id: String,
    pub unit: UnitKind,
    /// Ascending values of every passing snapshot.
    pub values: Vec<f64>,
    pub bins: Vec<HistogramBin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_value: Option<f64>,
    /// Share of `values` strictly below `user_value`, 0 to 100.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_percentile: Option<f64>,
}

pub fn build_histogram<'a>(
    snapshots: impl IntoIterator<Item = &'a MeasureMap>,
    filters: &[SelectedFilter],
    axis: &Axis,
    user_value: Option<&UnitValue>,
) -> Histogram {
    let mut values: Vec<f64> = snapshots
        .into_iter()
        .filter(|measures| snapshot_passes(filters, measures))
        .filter_map(|measures| axis_value(measures, axis, &[]))
        .collect();
    values.sort_by(f64::total_cmp);

    let user_value = user_value
        .filter(|value| value.unit().is_compatible_with(axis.unit))
        .map(|value| unit_value_to_number(&value.convert_to(axis.unit)));
    let user_percentile = user_value.filter(|_| !values.is_empty()).map(|mine| {
        let below = values.iter().filter(|value| **value < mine).count();
        below as f64 / values.len() as f64 * 100.0
    });

    Histogram {
        measure_id: axis.measure_id.clone(),
        unit: axis.unit,
        bins: histogram_bins(&values),
        values,
        user_value,
        user_percentile,
    }
}

fn histogram_bins(values: &[f64]) -> Vec<HistogramBin> {
    if values.is_empty() {
        return Vec::new();
    }
    let (min, max) = extent(values.iter().copied());
    let bins = if max > min { HISTOGRAM_BINS } else { 1 };
    let width = (max - min) / bins as f64;
    let mut histogram: Vec<HistogramBin> = (0..bins)
        .map(|bin| HistogramBin {
            start: min + width * bin as f64,
            end: if bin + 1 == bins { max } else { min + width * (bin + 1) as f64 },
            count: 0,
        })
        .collect();
    for value in values {
        histogram[bin_index(*value, min, max, bins)].count += 1;
    }
    histogram
}
