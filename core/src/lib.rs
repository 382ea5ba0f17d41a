pub mod catalog;
pub mod path;
pub mod similarity;
pub mod tokenizer;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type CourseId = u32;

/// A single catalog entry. Immutable once the catalog is built; string
/// fields may be empty after upstream cleaning but are never null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub estimated_hours: f32,
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub prerequisite_ids: Vec<CourseId>,
}

/// Leveled prerequisite walk for one target course, computed per query.
///
/// `levels` runs nearest-to-target first; `flat_path` is the deduplicated
/// leaf-to-target ordering. A truncated walk (depth cap hit) is returned
/// as-is without a separate flag.
#[derive(Debug, Clone, Serialize)]
pub struct LearningPath {
    pub target: Course,
    pub levels: Vec<Vec<Course>>,
    pub flat_path: Vec<Course>,
    pub total_hours: u32,
    pub cycle_detected: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// The caller is responsible for deduplication; the catalog never
    /// silently drops a conflicting row.
    #[error("duplicate course id {0}")]
    DuplicateId(CourseId),
}
