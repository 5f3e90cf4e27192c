//! Planned maintenance windows
//!
//! Every configured day gets the full configured list of hour slots. Days and
//! slots keep their configured order and are neither deduplicated nor sorted.

use serde::Serialize;
use serde_json::{json, Value};
use ummati_common::settings::{Settings, WeekDay};
use ummati_common::Result;

use super::{to_json, ResourceKind};
use crate::output::Output;

/// Hours of one day in which maintenance may run
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeInWeek {
    /// Day of the week
    pub day: WeekDay,
    /// Hours of the day (0-24)
    pub hour_slots: Vec<i32>,
}

/// A cluster's maintenance windows, one entry per configured day
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceWindowSpec {
    /// Allowed days and their hours
    pub time_in_week: Vec<TimeInWeek>,
}

/// Pair each configured maintenance day with every configured hour slot
pub fn build_maintenance_spec(settings: &dyn Settings) -> Result<MaintenanceWindowSpec> {
    let days = settings.kubernetes_maintenance_days()?;
    let hour_slots = settings.kubernetes_maintenance_hour_slots()?;
    Ok(MaintenanceWindowSpec {
        time_in_week: days
            .into_iter()
            .map(|day| TimeInWeek {
                day,
                hour_slots: hour_slots.clone(),
            })
            .collect(),
    })
}

/// Maintenance configuration attached to a managed cluster
#[derive(Clone, Debug)]
pub struct MaintenanceConfigurationSpec {
    /// Logical name, `maintenanceconfiguration-{location}-{env}`
    pub name: String,
    /// Resource group holding the cluster
    pub resource_group_name: Output<String>,
    /// Physical name of the cluster
    pub resource_name: Output<String>,
    /// Maintenance windows
    pub window: MaintenanceWindowSpec,
}

impl MaintenanceConfigurationSpec {
    pub(crate) async fn properties(&self) -> Result<Value> {
        let resource_group_name = self.resource_group_name.get().await?;
        let resource_name = self.resource_name.get().await?;
        Ok(json!({
            "resourceGroupName": resource_group_name,
            "resourceName": resource_name,
            "timeInWeek": to_json(ResourceKind::MaintenanceConfiguration, &self.window.time_in_week)?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use ummati_common::config::MemoryStore;
    use ummati_common::settings::{keys, sample_store, StackSettings};
    use ummati_common::Error;

    use super::*;

    fn settings(days: &[&str], slots: &[&str]) -> StackSettings<MemoryStore> {
        StackSettings::new(
            sample_store()
                .with_list(keys::KUBERNETES_MAINTENANCE_DAYS, days.iter().copied())
                .with_list(keys::KUBERNETES_MAINTENANCE_HOUR_SLOTS, slots.iter().copied()),
        )
    }

    #[test]
    fn every_day_gets_every_slot() {
        let spec = build_maintenance_spec(&settings(&["Saturday", "Sunday"], &["1", "2"])).unwrap();
        assert_eq!(
            spec.time_in_week,
            vec![
                TimeInWeek {
                    day: WeekDay::Saturday,
                    hour_slots: vec![1, 2],
                },
                TimeInWeek {
                    day: WeekDay::Sunday,
                    hour_slots: vec![1, 2],
                },
            ]
        );
    }

    #[test]
    fn order_and_duplicates_are_kept() {
        let spec =
            build_maintenance_spec(&settings(&["Sunday", "Monday", "Sunday"], &["5", "0", "5"]))
                .unwrap();
        let days: Vec<_> = spec.time_in_week.iter().map(|t| t.day).collect();
        assert_eq!(days, vec![WeekDay::Sunday, WeekDay::Monday, WeekDay::Sunday]);
        assert!(spec.time_in_week.iter().all(|t| t.hour_slots == vec![5, 0, 5]));
    }

    #[test]
    fn no_days_gives_no_windows() {
        let spec = build_maintenance_spec(&settings(&[], &["1"])).unwrap();
        assert!(spec.time_in_week.is_empty());
    }

    #[test]
    fn bad_slot_fails_the_build() {
        let err = build_maintenance_spec(&settings(&["Monday"], &["0", "24", "25"])).unwrap_err();
        assert!(matches!(err, Error::ConfigurationOutOfRange { .. }));
    }

    #[test]
    fn bad_day_fails_the_build() {
        let err = build_maintenance_spec(&settings(&["Funday"], &["1"])).unwrap_err();
        assert!(matches!(err, Error::ConfigurationInvalid { .. }));
    }

    #[tokio::test]
    async fn configuration_renders_time_in_week() {
        let spec = MaintenanceConfigurationSpec {
            name: "maintenanceconfiguration-northeurope-test".to_string(),
            resource_group_name: Output::known("rg".to_string()),
            resource_name: Output::known("kubernetes-northeurope-test-abc".to_string()),
            window: build_maintenance_spec(&settings(&["Saturday"], &["3"])).unwrap(),
        };
        let properties = spec.properties().await.unwrap();
        assert_eq!(
            properties["timeInWeek"],
            json!([{ "day": "Saturday", "hourSlots": [3] }])
        );
        assert_eq!(properties["resourceName"], "kubernetes-northeurope-test-abc");
    }
}
