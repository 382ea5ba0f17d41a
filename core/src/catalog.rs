use crate::{CatalogError, Course, CourseId};
use std::collections::HashMap;

/// Immutable, indexed course collection for a process lifetime.
///
/// The backing array is sorted ascending by id with no duplicates, so
/// `lookup` can binary-search it; `by_id` maps each id to its slot for the
/// O(1) path. Both always describe the same course set. Construction is the
/// only mutation point; a refresh builds a new `Catalog` off to the side and
/// swaps it in whole.
#[derive(Debug)]
pub struct Catalog {
    courses: Vec<Course>,
    by_id: HashMap<CourseId, usize>,
}

impl Catalog {
    /// Sort the courses by id and index them. Fails on a duplicate id:
    /// deduplication is the loader's job, not ours.
    pub fn build(mut courses: Vec<Course>) -> Result<Self, CatalogError> {
        courses.sort_by_key(|c| c.id);
        for pair in courses.windows(2) {
            if pair[0].id == pair[1].id {
                return Err(CatalogError::DuplicateId(pair[0].id));
            }
        }
        let by_id = courses
            .iter()
            .enumerate()
            .map(|(slot, c)| (c.id, slot))
            .collect();
        tracing::info!(num_courses = courses.len(), "catalog built");
        Ok(Self { courses, by_id })
    }

    /// Binary search over the id-sorted array, O(log n).
    pub fn lookup(&self, id: CourseId) -> Option<&Course> {
        self.courses
            .binary_search_by_key(&id, |c| c.id)
            .ok()
            .map(|slot| &self.courses[slot])
    }

    /// Hash lookup, O(1).
    pub fn lookup_fast(&self, id: CourseId) -> Option<&Course> {
        self.by_id.get(&id).map(|&slot| &self.courses[slot])
    }

    /// Case-insensitive substring scan over titles, in ascending-id order.
    pub fn search_title(&self, keyword: &str) -> Vec<&Course> {
        let needle = keyword.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.courses
            .iter()
            .filter(|c| c.title.to_lowercase().contains(&needle))
            .collect()
    }

    /// Full snapshot in ascending-id order.
    pub fn all(&self) -> &[Course] {
        &self.courses
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}
