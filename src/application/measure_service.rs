// Measure service - registry lookups, search and interpolation options
use crate::application::error::ServiceResult;
use crate::domain::measures::{InterpolationOption, MeasureRegistry, MeasureSpec, ParamName};

#[derive(Clone)]
pub struct MeasureService {
    registry: &'static MeasureRegistry,
}

impl MeasureService {
    pub fn new(registry: &'static MeasureRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'static MeasureRegistry {
        self.registry
    }

    pub fn list_measures(&self, query: Option<&str>) -> Vec<MeasureSpec> {
        self.registry
            .search(query.unwrap_or_default())
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn get_measure(&self, id: &str) -> ServiceResult<MeasureSpec> {
        Ok(self.registry.require(id)?.clone())
    }

    pub fn interpolation_options(
        &self,
        target_id: &str,
        param: ParamName,
    ) -> ServiceResult<Vec<InterpolationOption>> {
        Ok(self.registry.interpolation_options(target_id, param)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::error::ServiceError;
    use crate::domain::measures::registry;

    #[test]
    fn test_list_measures_filters_by_query() {
        let service = MeasureService::new(registry());
        assert_eq!(service.list_measures(None).len(), registry().len());

        let found = service.list_measures(Some("ARMSPAN"));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "armspan");
    }

    #[test]
    fn test_unknown_measure_is_not_found() {
        let service = MeasureService::new(registry());
        let err = service.get_measure("wingspan").unwrap_err();
        assert!(err.is_not_found());

        let err = service
            .interpolation_options("height", ParamName::Grip)
            .unwrap_err();
        assert!(matches!(err, ServiceError::Measure(_)));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_interpolation_options_for_grip() {
        let service = MeasureService::new(registry());
        let options = service
            .interpolation_options("continuoushang:open-hand:15mm", ParamName::Grip)
            .unwrap();
        let sources: Vec<&str> = options
            .iter()
            .map(|option| option.source_measure_id.as_str())
            .collect();
        assert_eq!(
            sources,
            vec!["continuoushang:half-crimp:15mm", "continuoushang:full-crimp:15mm"]
        );
    }
}
