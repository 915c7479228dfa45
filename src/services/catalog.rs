//! Project catalog and classification.
//!
//! Maps a (repair kind, roof area) pair onto one of six canonical project
//! types, each carrying its crew size, equipment list and duration. The
//! catalog is an immutable value handed to the scheduler at construction;
//! alternate catalogs are loaded from JSON.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use utoipa::ToSchema;

use crate::errors::AppError;
use crate::services::suitability::WeatherConstraints;

pub const SMALL_REPAIR: &str = "small_repair";
pub const MEDIUM_REPAIR: &str = "medium_repair";
pub const LARGE_REPAIR: &str = "large_repair";
pub const FULL_REPLACEMENT_SMALL: &str = "full_replacement_small";
pub const FULL_REPLACEMENT_MEDIUM: &str = "full_replacement_medium";
pub const FULL_REPLACEMENT_LARGE: &str = "full_replacement_large";

/// Every project type id a catalog must define.
pub const PROJECT_TYPE_IDS: [&str; 6] = [
    SMALL_REPAIR,
    MEDIUM_REPAIR,
    LARGE_REPAIR,
    FULL_REPLACEMENT_SMALL,
    FULL_REPLACEMENT_MEDIUM,
    FULL_REPLACEMENT_LARGE,
];

/// Areas below this many squares are small jobs.
const MEDIUM_AREA_SQUARES: f64 = 10.0;
/// Areas at or above this many squares are large jobs.
const LARGE_AREA_SQUARES: f64 = 30.0;

/// A catalog entry: what a project of this type needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProjectType {
    pub id: String,
    pub crew_size: u32,
    pub equipment: Vec<String>,
    pub duration_days: u32,
}

impl ProjectType {
    fn new(id: &str, crew_size: u32, equipment: &[&str], duration_days: u32) -> Self {
        Self {
            id: id.to_string(),
            crew_size,
            equipment: equipment.iter().map(|e| e.to_string()).collect(),
            duration_days,
        }
    }
}

/// Kind of roofing work requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairKind {
    SpotRepair,
    PartialReplacement,
    FullReplacement,
}

impl RepairKind {
    /// Parse a repair kind, defaulting unknown values to a full replacement.
    pub fn parse_or_default(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "spot_repair" => Self::SpotRepair,
            "partial_replacement" => Self::PartialReplacement,
            "full_replacement" => Self::FullReplacement,
            other => {
                tracing::warn!(
                    "Unknown repair kind '{}', defaulting to full_replacement",
                    other
                );
                Self::FullReplacement
            }
        }
    }
}

/// Roof size bucket by area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeBucket {
    Small,
    Medium,
    Large,
}

impl SizeBucket {
    pub fn from_area(area_squares: f64) -> Self {
        if area_squares < MEDIUM_AREA_SQUARES {
            Self::Small
        } else if area_squares < LARGE_AREA_SQUARES {
            Self::Medium
        } else {
            Self::Large
        }
    }
}

/// Project type id for a repair kind and size.
pub fn project_type_id(kind: RepairKind, size: SizeBucket) -> &'static str {
    match (kind, size) {
        (RepairKind::SpotRepair, _) => SMALL_REPAIR,
        (RepairKind::PartialReplacement, SizeBucket::Small) => MEDIUM_REPAIR,
        (RepairKind::PartialReplacement, _) => LARGE_REPAIR,
        (RepairKind::FullReplacement, SizeBucket::Small) => FULL_REPLACEMENT_SMALL,
        (RepairKind::FullReplacement, SizeBucket::Medium) => FULL_REPLACEMENT_MEDIUM,
        (RepairKind::FullReplacement, SizeBucket::Large) => FULL_REPLACEMENT_LARGE,
    }
}

/// On-disk catalog format.
#[derive(Debug, Deserialize)]
pub struct CatalogFile {
    pub project_types: Vec<ProjectType>,
    #[serde(default)]
    pub weather_constraints: Option<WeatherConstraints>,
}

/// Immutable lookup table of project types, keyed by id.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectCatalog {
    entries: BTreeMap<String, ProjectType>,
}

impl Default for ProjectCatalog {
    fn default() -> Self {
        let base = ["ladder", "hand_tools"];
        let powered = ["ladder", "hand_tools", "power_tools"];
        let safety = ["ladder", "hand_tools", "power_tools", "safety_equipment"];
        let dumpster = [
            "ladder",
            "hand_tools",
            "power_tools",
            "safety_equipment",
            "dumpster",
        ];
        let lift = [
            "ladder",
            "hand_tools",
            "power_tools",
            "safety_equipment",
            "dumpster",
            "lift",
        ];
        let crane = [
            "ladder",
            "hand_tools",
            "power_tools",
            "safety_equipment",
            "dumpster",
            "lift",
            "crane",
        ];

        let entries = [
            ProjectType::new(SMALL_REPAIR, 2, &base, 1),
            ProjectType::new(MEDIUM_REPAIR, 3, &powered, 2),
            ProjectType::new(LARGE_REPAIR, 4, &safety, 3),
            ProjectType::new(FULL_REPLACEMENT_SMALL, 4, &dumpster, 2),
            ProjectType::new(FULL_REPLACEMENT_MEDIUM, 6, &lift, 3),
            ProjectType::new(FULL_REPLACEMENT_LARGE, 8, &crane, 5),
        ];

        Self {
            entries: entries.into_iter().map(|e| (e.id.clone(), e)).collect(),
        }
    }
}

impl ProjectCatalog {
    /// Build a catalog from explicit entries, validating completeness.
    pub fn from_entries(entries: Vec<ProjectType>) -> Result<Self, AppError> {
        let mut map = BTreeMap::new();
        for entry in entries {
            if entry.crew_size == 0 {
                return Err(AppError::Config(format!(
                    "Project type '{}' must have crew_size >= 1",
                    entry.id
                )));
            }
            if entry.duration_days == 0 {
                return Err(AppError::Config(format!(
                    "Project type '{}' must have duration_days >= 1",
                    entry.id
                )));
            }
            if map.insert(entry.id.clone(), entry).is_some() {
                return Err(AppError::Config(
                    "Duplicate project type id in catalog".to_string(),
                ));
            }
        }

        if let Some(missing) = PROJECT_TYPE_IDS.iter().find(|id| !map.contains_key(**id)) {
            return Err(AppError::Config(format!(
                "Catalog is missing project type '{}'",
                missing
            )));
        }

        Ok(Self { entries: map })
    }

    /// Load a catalog (and optional weather constraints) from a JSON file.
    pub fn from_json_file(
        path: &Path,
    ) -> Result<(Self, Option<WeatherConstraints>), AppError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read catalog {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<(Self, Option<WeatherConstraints>), AppError> {
        let file: CatalogFile = serde_json::from_str(raw)?;
        let catalog = Self::from_entries(file.project_types)?;
        Ok((catalog, file.weather_constraints))
    }

    pub fn get(&self, id: &str) -> Option<&ProjectType> {
        self.entries.get(id)
    }

    /// All entries, ordered by id.
    pub fn entries(&self) -> impl Iterator<Item = &ProjectType> {
        self.entries.values()
    }

    /// Classify a project into its catalog entry.
    ///
    /// Negative areas are treated as 0; a non-finite area is rejected.
    pub fn classify(&self, repair_kind: &str, area_squares: f64) -> Result<&ProjectType, AppError> {
        if !area_squares.is_finite() {
            return Err(AppError::InvalidInput(format!(
                "area_squares must be a finite number, got {}",
                area_squares
            )));
        }
        let area = if area_squares < 0.0 {
            tracing::warn!("Negative area {} treated as 0 squares", area_squares);
            0.0
        } else {
            area_squares
        };

        let kind = RepairKind::parse_or_default(repair_kind);
        let id = project_type_id(kind, SizeBucket::from_area(area));

        // from_entries guarantees every canonical id is present.
        self.get(id).ok_or_else(|| {
            AppError::InternalError(format!("Catalog has no entry for '{}'", id))
        })
    }
}
