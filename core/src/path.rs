use crate::catalog::Catalog;
use crate::{Course, CourseId, LearningPath};
use std::collections::HashSet;

/// Safety cap on BFS depth. Hitting it truncates the walk without error.
pub const DEFAULT_MAX_DEPTH: usize = 20;

/// Walk the prerequisite graph of `id` breadth-first and build a leveled
/// learning path. Returns `None` only when the target itself is unknown;
/// dangling prerequisite references and cycles are tolerated at traversal
/// time rather than treated as errors.
pub fn resolve(catalog: &Catalog, id: CourseId, max_depth: usize) -> Option<LearningPath> {
    let target = catalog.lookup_fast(id)?.clone();

    let mut cycle_detected = false;
    // Global visited set: each course lands in exactly one level.
    let mut seen: HashSet<CourseId> = HashSet::new();
    let mut levels: Vec<Vec<CourseId>> = Vec::new();

    let mut frontier = dedup_preserving(&target.prerequisite_ids);
    let mut depth = 0;

    while !frontier.is_empty() && depth < max_depth {
        let mut level: Vec<CourseId> = Vec::new();
        let mut next_frontier: Vec<CourseId> = Vec::new();

        for pid in frontier {
            // A repeat of the target is a back-edge into the walk's root;
            // any other repeat is a cycle or re-convergence of branches.
            // Either way it is flagged once and never expanded again.
            if pid == target.id || seen.contains(&pid) {
                cycle_detected = true;
                continue;
            }
            let Some(course) = catalog.lookup_fast(pid) else {
                // Dangling reference, skip silently.
                continue;
            };
            seen.insert(pid);
            level.push(pid);
            for &sub in &course.prerequisite_ids {
                if !seen.contains(&sub) {
                    next_frontier.push(sub);
                }
            }
        }

        if !level.is_empty() {
            levels.push(level);
        }
        frontier = next_frontier;
        depth += 1;
    }

    // Flatten deepest level first so the path reads leaf to target.
    let mut flat_ids: Vec<CourseId> = Vec::new();
    let mut in_flat: HashSet<CourseId> = HashSet::new();
    for level in levels.iter().rev() {
        for &cid in level {
            if in_flat.insert(cid) {
                flat_ids.push(cid);
            }
        }
    }

    let materialize = |ids: &[CourseId]| -> Vec<Course> {
        ids.iter()
            .filter_map(|&cid| catalog.lookup_fast(cid))
            .cloned()
            .collect()
    };
    let flat_path = materialize(&flat_ids);
    let total_hours = flat_path
        .iter()
        .map(|c| c.estimated_hours as u32)
        .sum();

    Some(LearningPath {
        target,
        levels: levels.iter().map(|l| materialize(l)).collect(),
        flat_path,
        total_hours,
        cycle_detected,
    })
}

fn dedup_preserving(ids: &[CourseId]) -> Vec<CourseId> {
    let mut out = Vec::with_capacity(ids.len());
    let mut seen = HashSet::new();
    for &id in ids {
        if seen.insert(id) {
            out.push(id);
        }
    }
    out
}
