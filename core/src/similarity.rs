use crate::catalog::Catalog;
use crate::tokenizer::features;
use crate::{Course, CourseId};
use serde::Deserialize;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

pub type TermId = u32;

/// Precomputed per-course weighted-term vectors for content similarity.
///
/// Row i corresponds to `catalog.all()[i]`; each vector is L2-normalized
/// tf-idf over the course's title, category, and difficulty features and is
/// kept sparse, sorted by term id. Built once at startup, read-only after.
pub struct SimilarityModel {
    pub dictionary: HashMap<String, TermId>,
    pub df: Vec<u32>,
    pub vectors: Vec<Vec<(TermId, f32)>>,
    pub row_of: HashMap<CourseId, usize>,
}

impl SimilarityModel {
    pub fn build(catalog: &Catalog) -> Self {
        let mut dictionary: HashMap<String, TermId> = HashMap::new();
        let mut df: Vec<u32> = Vec::new();
        let mut raw_counts: Vec<HashMap<TermId, u32>> = Vec::with_capacity(catalog.len());
        let mut row_of: HashMap<CourseId, usize> = HashMap::with_capacity(catalog.len());

        for (row, course) in catalog.all().iter().enumerate() {
            row_of.insert(course.id, row);
            let text = format!(
                "{} {} {}",
                course.title, course.category, course.difficulty
            );
            let mut counts: HashMap<TermId, u32> = HashMap::new();
            let mut seen: HashSet<TermId> = HashSet::new();
            for term in features(&text) {
                let next_id = dictionary.len() as TermId;
                let tid = *dictionary.entry(term).or_insert(next_id);
                if tid as usize >= df.len() {
                    df.resize(tid as usize + 1, 0);
                }
                *counts.entry(tid).or_insert(0) += 1;
                if seen.insert(tid) {
                    df[tid as usize] += 1;
                }
            }
            raw_counts.push(counts);
        }

        let n = catalog.len().max(1) as f32;
        let mut vectors: Vec<Vec<(TermId, f32)>> = Vec::with_capacity(raw_counts.len());
        for counts in raw_counts {
            let mut vec: Vec<(TermId, f32)> = counts
                .into_iter()
                .map(|(tid, tf_raw)| {
                    let tf = 1.0 + (tf_raw as f32).ln();
                    let idf = (n / df[tid as usize].max(1) as f32).ln();
                    (tid, tf * idf)
                })
                .collect();
            let mut norm: f32 = vec.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
            if norm == 0.0 {
                norm = 1.0;
            }
            for (_, w) in vec.iter_mut() {
                *w /= norm;
            }
            vec.sort_by_key(|&(tid, _)| tid);
            vectors.push(vec);
        }

        tracing::info!(
            num_courses = vectors.len(),
            num_terms = dictionary.len(),
            "similarity model built"
        );
        Self { dictionary, df, vectors, row_of }
    }

    /// Cosine of two normalized sparse vectors, in [0, 1].
    fn cosine(&self, a: usize, b: usize) -> f32 {
        let (va, vb) = (&self.vectors[a], &self.vectors[b]);
        let (mut i, mut j) = (0, 0);
        let mut dot = 0.0;
        while i < va.len() && j < vb.len() {
            match va[i].0.cmp(&vb[j].0) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    dot += va[i].1 * vb[j].1;
                    i += 1;
                    j += 1;
                }
            }
        }
        dot
    }

    /// The k courses most similar to `id`, excluding `id` itself. Ties keep
    /// ascending-id order (rows are in catalog order and the sort is
    /// stable). Empty when the id is unknown.
    pub fn top_similar(&self, catalog: &Catalog, id: CourseId, k: usize) -> Vec<Course> {
        let Some(&q) = self.row_of.get(&id) else {
            return Vec::new();
        };
        let mut scored: Vec<(usize, f32)> = (0..self.vectors.len())
            .filter(|&row| row != q)
            .map(|row| (row, self.cosine(q, row)))
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scored
            .into_iter()
            .take(k)
            .map(|(row, _)| catalog.all()[row].clone())
            .collect()
    }
}

/// Optional AND-combined recommendation filters; an absent (or blank)
/// filter is a no-op.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Filters {
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub max_hours: Option<f32>,
    pub min_rating: Option<f32>,
}

fn substring_filter(field: &str, wanted: &Option<String>) -> bool {
    match wanted.as_deref().map(str::trim) {
        Some(w) if !w.is_empty() => field.to_lowercase().contains(&w.to_lowercase()),
        _ => true,
    }
}

/// Filter the catalog, then rank by rating descending (stable, so equal
/// ratings keep catalog order) and truncate to k.
pub fn recommend_by_filters(catalog: &Catalog, filters: &Filters, k: usize) -> Vec<Course> {
    let mut matches: Vec<Course> = catalog
        .all()
        .iter()
        .filter(|c| substring_filter(&c.category, &filters.category))
        .filter(|c| substring_filter(&c.difficulty, &filters.difficulty))
        .filter(|c| filters.max_hours.map_or(true, |h| c.estimated_hours <= h))
        .filter(|c| filters.min_rating.map_or(true, |r| c.rating >= r))
        .cloned()
        .collect();
    matches.sort_by(|a, b| b.rating.partial_cmp(&a.rating).unwrap_or(Ordering::Equal));
    matches.truncate(k);
    matches
}
