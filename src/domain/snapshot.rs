// Snapshot domain model - one user's submitted measurements
use crate::domain::units::UnitValue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Measure id to the value as the user entered it (not canonicalized).
pub type MeasureMap = BTreeMap<String, UnitValue>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub measures: MeasureMap,
}

impl Snapshot {
    pub fn new(user_id: String, measures: MeasureMap) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            created_at: now,
            updated_at: now,
            measures,
        }
    }

    pub fn measure(&self, measure_id: &str) -> Option<&UnitValue> {
        self.measures.get(measure_id)
    }

    pub fn update_measure(&mut self, measure_id: String, value: UnitValue) {
        self.measures.insert(measure_id, value);
        self.updated_at = Utc::now();
    }

    pub fn delete_measure(&mut self, measure_id: &str) -> Option<UnitValue> {
        let removed = self.measures.remove(measure_id);
        if removed.is_some() {
            self.updated_at = Utc::now();
        }
        removed
    }
}
