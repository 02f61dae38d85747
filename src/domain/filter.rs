// Filter model - unit-aware predicates over snapshot measures
use crate::domain::measures::{MeasureIdError, MeasureRegistry, MeasureSpec};
use crate::domain::snapshot::MeasureMap;
use crate::domain::units::{UnitKind, UnitValue};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Filter {
    /// Inclusive range; a missing bound leaves that side open.
    #[serde(rename = "minmax", rename_all = "camelCase")]
    MinMax {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_value: Option<UnitValue>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_value: Option<UnitValue>,
    },
    #[serde(rename = "toggle")]
    Toggle { value: UnitValue },
}

impl Filter {
    pub fn min_max(min_value: UnitValue, max_value: UnitValue) -> Self {
        Filter::MinMax {
            min_value: Some(min_value),
            max_value: Some(max_value),
        }
    }

    pub fn toggle(value: UnitValue) -> Self {
        Filter::Toggle { value }
    }

    pub fn applies(&self, value: &UnitValue) -> bool {
        filter_applies(self, value)
    }

    /// Unit the filter is currently displayed in.
    pub fn unit(&self) -> Option<UnitKind> {
        match self {
            Filter::MinMax { min_value, max_value } => {
                min_value.or(*max_value).map(|value| value.unit())
            }
            Filter::Toggle { value } => Some(value.unit()),
        }
    }

    /// Re-express the bounds in `target` without moving them in canonical space
    /// (up to grade bucketing).
    pub fn convert_to(&self, target: UnitKind) -> Filter {
        match self {
            Filter::MinMax { min_value, max_value } => Filter::MinMax {
                min_value: min_value.map(|value| value.convert_to(target)),
                max_value: max_value.map(|value| value.convert_to(target)),
            },
            Filter::Toggle { value } => Filter::Toggle {
                value: value.convert_to(target),
            },
        }
    }

    fn bound_units(&self) -> Vec<UnitKind> {
        match self {
            Filter::MinMax { min_value, max_value } => min_value
                .iter()
                .chain(max_value.iter())
                .map(|value| value.unit())
                .collect(),
            Filter::Toggle { value } => vec![value.unit()],
        }
    }
}

/// Compare in canonical units so the result never depends on which unit the
/// filter or the measurement happens to be expressed in.
pub fn filter_applies(filter: &Filter, value: &UnitValue) -> bool {
    let canonical = value.canonical();
    match filter {
        Filter::MinMax { min_value, max_value } => {
            min_value.is_none_or(|min| min.canonical() <= canonical)
                && max_value.is_none_or(|max| canonical <= max.canonical())
        }
        Filter::Toggle { value: expected } => expected.canonical() == canonical,
    }
}

/// A filter bound to a measure, as it travels in plot queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedFilter {
    pub measure_id: String,
    pub filter: Filter,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

impl SelectedFilter {
    pub fn new(measure_id: impl Into<String>, filter: Filter) -> Self {
        Self {
            measure_id: measure_id.into(),
            filter,
            enabled: true,
        }
    }

    /// Disabled filters pass everything; a missing measure never passes.
    pub fn passes(&self, measures: &MeasureMap) -> bool {
        if !self.enabled {
            return true;
        }
        measures
            .get(&self.measure_id)
            .is_some_and(|value| self.filter.applies(value))
    }
}

pub fn snapshot_passes(filters: &[SelectedFilter], measures: &MeasureMap) -> bool {
    filters.iter().all(|filter| filter.passes(measures))
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    #[error("no filter at position {0}")]
    NoSuchFilter(usize),
    #[error("filter {0} has no measure selected")]
    NotSelected(usize),
    #[error("filter {0} is not a min/max filter")]
    NotMinMax(usize),
    #[error("filter {0} is not a toggle filter")]
    NotToggle(usize),
    #[error("{unit} is not a unit of {measure_id}")]
    UnitNotAllowed { measure_id: String, unit: UnitKind },
    #[error(transparent)]
    Measure(#[from] MeasureIdError),
}

/// One row of the filter editor. Rows start out as a search box and become a
/// filter once a measure is picked.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterEntry {
    Typing { query: String },
    Selected(SelectedFilter),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterList {
    entries: Vec<FilterEntry>,
}

impl FilterList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_selected(filters: Vec<SelectedFilter>) -> Self {
        Self {
            entries: filters.into_iter().map(FilterEntry::Selected).collect(),
        }
    }

    pub fn entries(&self) -> &[FilterEntry] {
        &self.entries
    }

    pub fn selected(&self) -> impl Iterator<Item = &SelectedFilter> {
        self.entries.iter().filter_map(|entry| match entry {
            FilterEntry::Selected(selected) => Some(selected),
            FilterEntry::Typing { .. } => None,
        })
    }

    /// Append an empty search row and return its position.
    pub fn add_filter(&mut self) -> usize {
        self.entries.push(FilterEntry::Typing {
            query: String::new(),
        });
        self.entries.len() - 1
    }

    pub fn set_query(&mut self, index: usize, query: impl Into<String>) -> Result<(), FilterError> {
        let entry = self.entry_mut(index)?;
        *entry = FilterEntry::Typing {
            query: query.into(),
        };
        Ok(())
    }

    /// Measures matching the search text of a typing row.
    pub fn suggestions<'r>(
        &self,
        index: usize,
        registry: &'r MeasureRegistry,
    ) -> Result<Vec<&'r MeasureSpec>, FilterError> {
        match self.entries.get(index) {
            Some(FilterEntry::Typing { query }) => Ok(registry.search(query)),
            Some(FilterEntry::Selected(_)) => Ok(Vec::new()),
            None => Err(FilterError::NoSuchFilter(index)),
        }
    }

    pub fn select_measure(
        &mut self,
        index: usize,
        measure_id: &str,
        registry: &MeasureRegistry,
    ) -> Result<(), FilterError> {
        let spec = registry.require(measure_id)?;
        let entry = self.entry_mut(index)?;
        *entry = FilterEntry::Selected(SelectedFilter::new(spec.id.clone(), spec.initial_filter));
        Ok(())
    }

    pub fn remove_filter(&mut self, index: usize) -> Result<FilterEntry, FilterError> {
        if index >= self.entries.len() {
            return Err(FilterError::NoSuchFilter(index));
        }
        Ok(self.entries.remove(index))
    }

    pub fn set_enabled(&mut self, index: usize, enabled: bool) -> Result<(), FilterError> {
        self.selected_mut(index)?.enabled = enabled;
        Ok(())
    }

    pub fn set_bounds(
        &mut self,
        index: usize,
        min_value: Option<UnitValue>,
        max_value: Option<UnitValue>,
        registry: &MeasureRegistry,
    ) -> Result<(), FilterError> {
        let selected = self.selected_mut(index)?;
        if !matches!(selected.filter, Filter::MinMax { .. }) {
            return Err(FilterError::NotMinMax(index));
        }
        let candidate = Filter::MinMax {
            min_value,
            max_value,
        };
        check_units(&selected.measure_id, &candidate, registry)?;
        selected.filter = candidate;
        Ok(())
    }

    pub fn set_toggle(
        &mut self,
        index: usize,
        value: UnitValue,
        registry: &MeasureRegistry,
    ) -> Result<(), FilterError> {
        let selected = self.selected_mut(index)?;
        if !matches!(selected.filter, Filter::Toggle { .. }) {
            return Err(FilterError::NotToggle(index));
        }
        let candidate = Filter::toggle(value);
        check_units(&selected.measure_id, &candidate, registry)?;
        selected.filter = candidate;
        Ok(())
    }

    /// Switch the display unit of a filter, keeping its canonical bounds.
    pub fn change_unit(
        &mut self,
        index: usize,
        unit: UnitKind,
        registry: &MeasureRegistry,
    ) -> Result<(), FilterError> {
        let selected = self.selected_mut(index)?;
        let spec = registry.require(&selected.measure_id)?;
        if !spec.allows_unit(unit) {
            return Err(FilterError::UnitNotAllowed {
                measure_id: spec.id.clone(),
                unit,
            });
        }
        selected.filter = selected.filter.convert_to(unit);
        Ok(())
    }

    pub fn passes(&self, measures: &MeasureMap) -> bool {
        self.selected().all(|filter| filter.passes(measures))
    }

    fn entry_mut(&mut self, index: usize) -> Result<&mut FilterEntry, FilterError> {
        self.entries
            .get_mut(index)
            .ok_or(FilterError::NoSuchFilter(index))
    }

    fn selected_mut(&mut self, index: usize) -> Result<&mut SelectedFilter, FilterError> {
        match self.entry_mut(index)? {
            FilterEntry::Selected(selected) => Ok(selected),
            FilterEntry::Typing { .. } => Err(FilterError::NotSelected(index)),
        }
    }
}

/// Reject bounds expressed in a unit the measure does not offer.
pub fn check_units(
    measure_id: &str,
    filter: &Filter,
    registry: &MeasureRegistry,
) -> Result<(), FilterError> {
    let spec = registry.require(measure_id)?;
    match filter.bound_units().into_iter().find(|unit| !spec.allows_unit(*unit)) {
        Some(unit) => Err(FilterError::UnitNotAllowed {
            measure_id: measure_id.to_string(),
            unit,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grade::Font;
    use crate::domain::measures::registry;
    use crate::domain::units::Sex;

    fn measures(entries: &[(&str, UnitValue)]) -> MeasureMap {
        entries
            .iter()
            .map(|(id, value)| (id.to_string(), *value))
            .collect()
    }

    #[test]
    fn test_min_max_filter_is_unit_independent() {
        let filter = Filter::min_max(UnitValue::Kilogram(40.0), UnitValue::Kilogram(60.0));
        assert!(filter_applies(&filter, &UnitValue::Pound(99.2)));
        assert!(!filter_applies(&filter, &UnitValue::Pound(140.0)));
    }

    #[test]
    fn test_min_max_bounds_are_inclusive() {
        let filter = Filter::min_max(UnitValue::Centimeter(170.0), UnitValue::Meter(1.8));
        assert!(filter.applies(&UnitValue::Meter(1.7)));
        assert!(filter.applies(&UnitValue::Centimeter(180.0)));
        assert!(!filter.applies(&UnitValue::Meter(1.69)));
        assert!(!filter.applies(&UnitValue::Meter(1.81)));
    }

    #[test]
    fn test_missing_bound_is_open() {
        let filter = Filter::MinMax {
            min_value: None,
            max_value: Some(UnitValue::Font(Font::F7A)),
        };
        assert!(filter.applies(&UnitValue::Ircra(3.0)));
        assert!(!filter.applies(&UnitValue::Font(Font::F7APlus)));
    }

    #[test]
    fn test_toggle_filter() {
        let filter = Filter::toggle(UnitValue::SexAtBirth(Sex::Female));
        assert!(filter.applies(&UnitValue::SexAtBirth(Sex::Female)));
        assert!(!filter.applies(&UnitValue::SexAtBirth(Sex::Male)));
    }

    #[test]
    fn test_conjunction_over_enabled_filters() {
        let snapshot = measures(&[
            ("weight", UnitValue::Kilogram(70.0)),
            ("height", UnitValue::Meter(1.9)),
        ]);
        let mut filters = vec![
            SelectedFilter::new(
                "weight",
                Filter::min_max(UnitValue::Kilogram(60.0), UnitValue::Kilogram(80.0)),
            ),
            SelectedFilter::new(
                "height",
                Filter::min_max(UnitValue::Meter(1.5), UnitValue::Meter(1.8)),
            ),
        ];
        assert!(!snapshot_passes(&filters, &snapshot));

        filters[1].enabled = false;
        assert!(snapshot_passes(&filters, &snapshot));
    }

    #[test]
    fn test_missing_measure_fails() {
        let filter = SelectedFilter::new(
            "armspan",
            Filter::min_max(UnitValue::Meter(1.5), UnitValue::Meter(2.0)),
        );
        assert!(!filter.passes(&measures(&[("weight", UnitValue::Kilogram(70.0))])));
    }

    #[test]
    fn test_filter_list_lifecycle() {
        let registry = registry();
        let mut list = FilterList::new();
        let index = list.add_filter();
        list.set_query(index, "hang").unwrap();
        let suggestions = list.suggestions(index, registry).unwrap();
        assert!(suggestions.iter().any(|spec| spec.id == "maxhang:20mm:7s:half-crimp"));

        list.select_measure(index, "weight", registry).unwrap();
        assert_eq!(list.selected().count(), 1);

        list.change_unit(index, UnitKind::Pound, registry).unwrap();
        let selected = list.selected().next().unwrap();
        assert_eq!(selected.filter.unit(), Some(UnitKind::Pound));

        assert_eq!(
            list.change_unit(index, UnitKind::Meter, registry),
            Err(FilterError::UnitNotAllowed {
                measure_id: "weight".to_string(),
                unit: UnitKind::Meter,
            })
        );

        list.remove_filter(index).unwrap();
        assert!(list.entries().is_empty());
        assert_eq!(list.remove_filter(0), Err(FilterError::NoSuchFilter(0)));
    }

    #[test]
    fn test_change_unit_keeps_canonical_bounds() {
        let registry = registry();
        let mut list = FilterList::from_selected(vec![SelectedFilter::new(
            "weight",
            Filter::min_max(UnitValue::Kilogram(50.0), UnitValue::Kilogram(70.0)),
        )]);
        list.change_unit(0, UnitKind::Pound, registry).unwrap();
        let Some(FilterEntry::Selected(selected)) = list.entries().first() else {
            panic!("expected a selected filter");
        };
        let Filter::MinMax { min_value: Some(min), .. } = selected.filter else {
            panic!("expected a min/max filter");
        };
        approx::assert_relative_eq!(min.canonical(), 50.0, epsilon = 1e-9);
    }

    #[test]
    fn test_set_bounds_validates_units() {
        let registry = registry();
        let mut list = FilterList::new();
        let index = list.add_filter();
        assert_eq!(
            list.set_enabled(index, false),
            Err(FilterError::NotSelected(index))
        );
        list.select_measure(index, "height", registry).unwrap();
        assert!(list
            .set_bounds(index, Some(UnitValue::Kilogram(3.0)), None, registry)
            .is_err());
        list.set_bounds(index, None, Some(UnitValue::Centimeter(190.0)), registry)
            .unwrap();
        assert!(list.passes(&measures(&[("height", UnitValue::Meter(1.2))])));
        assert_eq!(
            list.set_toggle(index, UnitValue::SexAtBirth(Sex::Male), registry),
            Err(FilterError::NotToggle(index))
        );
    }

    #[test]
    fn test_wire_shape() {
        let filter = Filter::MinMax {
            min_value: Some(UnitValue::Kilogram(40.0)),
            max_value: None,
        };
        assert_eq!(
            serde_json::to_value(filter).unwrap(),
            serde_json::json!({"type": "minmax", "minValue": {"unit": "kg", "value": 40.0}})
        );
        let parsed: SelectedFilter = serde_json::from_str(
            r#"{"measureId":"sex-at-birth","filter":{"type":"toggle","value":{"unit":"sex-at-birth","value":"male"}}}"#,
        )
        .unwrap();
        assert!(parsed.enabled);
        assert_eq!(parsed.filter, Filter::toggle(UnitValue::SexAtBirth(Sex::Male)));
    }
}
