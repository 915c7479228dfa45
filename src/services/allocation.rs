//! Crew and equipment feasibility for a chosen start date.

use chrono::NaiveDate;

use crate::errors::AppError;
use crate::helpers::add_days;
use crate::models::{AvailableResources, ResourceAllocation};
use crate::services::catalog::ProjectType;

/// Check whether `available` covers `project` starting on `start_date`.
///
/// Shortfalls are reported as human-readable constraints, crew first, then
/// equipment in catalog order. The allocation is feasible iff there are none.
pub fn allocate_resources(
    project: &ProjectType,
    start_date: NaiveDate,
    available: &AvailableResources,
) -> Result<ResourceAllocation, AppError> {
    if project.duration_days == 0 {
        return Err(AppError::InvalidInput(format!(
            "project type '{}' has zero duration",
            project.id
        )));
    }

    let end_date = add_days(start_date, project.duration_days - 1);
    let mut constraints = Vec::new();

    if available.crew_members < project.crew_size {
        constraints.push(format!(
            "Need {} crew members, only {} available",
            project.crew_size, available.crew_members
        ));
    }

    for item in &project.equipment {
        if available.equipment.get(item).copied().unwrap_or(0) < 1 {
            constraints.push(format!("Need {}, none available", item));
        }
    }

    let feasible = constraints.is_empty();
    if !feasible {
        tracing::debug!(
            "Allocation for '{}' from {} has {} unmet constraint(s)",
            project.id,
            start_date,
            constraints.len()
        );
    }

    Ok(ResourceAllocation {
        project_type: project.id.clone(),
        start_date,
        end_date,
        duration_days: project.duration_days,
        crew_size: project.crew_size,
        equipment: project.equipment.clone(),
        constraints,
        feasible,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::catalog::{ProjectCatalog, FULL_REPLACEMENT_MEDIUM, SMALL_REPAIR};
    use std::collections::HashMap;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn stocked(crew: u32, items: &[&str]) -> AvailableResources {
        AvailableResources {
            crew_members: crew,
            equipment: items.iter().map(|i| (i.to_string(), 1)).collect(),
        }
    }

    #[test]
    fn test_end_date_is_inclusive() {
        let catalog = ProjectCatalog::default();
        let project = catalog.get(FULL_REPLACEMENT_MEDIUM).unwrap();
        let alloc = allocate_resources(project, d("2026-06-30"), &stocked(6, &[])).unwrap();
        assert_eq!(alloc.end_date, d("2026-07-02"));
        assert_eq!(alloc.duration_days, 3);
    }

    #[test]
    fn test_single_day_project_ends_same_day() {
        let catalog = ProjectCatalog::default();
        let project = catalog.get(SMALL_REPAIR).unwrap();
        let alloc = allocate_resources(project, d("2026-06-01"), &stocked(2, &[])).unwrap();
        assert_eq!(alloc.start_date, alloc.end_date);
    }

    #[test]
    fn test_feasible_when_fully_stocked() {
        let catalog = ProjectCatalog::default();
        let project = catalog.get(FULL_REPLACEMENT_MEDIUM).unwrap();
        let equipment: Vec<&str> = project.equipment.iter().map(String::as_str).collect();
        let alloc = allocate_resources(project, d("2026-06-01"), &stocked(6, &equipment)).unwrap();
        assert!(alloc.feasible);
        assert!(alloc.constraints.is_empty());
    }

    #[test]
    fn test_crew_shortfall_message() {
        let catalog = ProjectCatalog::default();
        let project = catalog.get(FULL_REPLACEMENT_MEDIUM).unwrap();
        let equipment: Vec<&str> = project.equipment.iter().map(String::as_str).collect();
        let alloc = allocate_resources(project, d("2026-06-01"), &stocked(1, &equipment)).unwrap();
        assert!(!alloc.feasible);
        assert_eq!(
            alloc.constraints,
            vec!["Need 6 crew members, only 1 available".to_string()]
        );
    }

    #[test]
    fn test_missing_equipment_in_catalog_order() {
        let catalog = ProjectCatalog::default();
        let project = catalog.get(SMALL_REPAIR).unwrap();
        let mut resources = AvailableResources {
            crew_members: 0,
            equipment: HashMap::new(),
        };
        resources.equipment.insert("ladder".to_string(), 0);
        let alloc = allocate_resources(project, d("2026-06-01"), &resources).unwrap();
        assert_eq!(
            alloc.constraints,
            vec![
                "Need 2 crew members, only 0 available".to_string(),
                "Need ladder, none available".to_string(),
                "Need hand_tools, none available".to_string(),
            ]
        );
    }

    #[test]
    fn test_feasible_iff_no_constraints() {
        let catalog = ProjectCatalog::default();
        let stock_levels: [&[&str]; 2] = [&[], &["ladder", "hand_tools"]];
        for project in catalog.entries() {
            for crew in [0, 3, 10] {
                for items in stock_levels {
                    let alloc =
                        allocate_resources(project, d("2026-06-01"), &stocked(crew, items))
                            .unwrap();
                    assert_eq!(alloc.feasible, alloc.constraints.is_empty());
                }
            }
        }
    }
}
