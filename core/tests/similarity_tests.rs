use edupath_core::catalog::Catalog;
use edupath_core::similarity::{recommend_by_filters, Filters, SimilarityModel};
use edupath_core::{Course, CourseId};

fn course(id: CourseId, title: &str, category: &str, difficulty: &str) -> Course {
    Course {
        id,
        title: title.into(),
        category: category.into(),
        organization: String::new(),
        difficulty: difficulty.into(),
        estimated_hours: 10.0,
        rating: 4.0,
        prerequisite_ids: Vec::new(),
    }
}

fn rated(id: CourseId, category: &str, hours: f32, rating: f32) -> Course {
    Course {
        id,
        title: format!("Course {id}"),
        category: category.into(),
        organization: String::new(),
        difficulty: "Beginner".into(),
        estimated_hours: hours,
        rating,
        prerequisite_ids: Vec::new(),
    }
}

#[test]
fn top_similar_prefers_shared_vocabulary() {
    let cat = Catalog::build(vec![
        course(1, "Machine Learning Basics", "AI", "Beginner"),
        course(2, "Advanced Machine Learning", "AI", "Advanced"),
        course(3, "French Cooking", "Culinary", "Beginner"),
    ])
    .unwrap();
    let model = SimilarityModel::build(&cat);
    let hits = model.top_similar(&cat, 1, 2);
    assert_eq!(hits[0].id, 2);
    assert!(hits.iter().all(|c| c.id != 1));
}

#[test]
fn top_similar_respects_k_and_uniqueness() {
    let cat = Catalog::build(vec![
        course(1, "Rust Programming", "Programming", "Beginner"),
        course(2, "Rust Programming II", "Programming", "Intermediate"),
        course(3, "Rust Programming III", "Programming", "Advanced"),
        course(4, "Go Programming", "Programming", "Beginner"),
    ])
    .unwrap();
    let model = SimilarityModel::build(&cat);
    let hits = model.top_similar(&cat, 1, 2);
    assert_eq!(hits.len(), 2);
    let mut ids: Vec<_> = hits.iter().map(|c| c.id).collect();
    ids.dedup();
    assert_eq!(ids.len(), 2);
}

#[test]
fn top_similar_breaks_ties_by_ascending_id() {
    let cat = Catalog::build(vec![
        course(5, "Data Structures", "CS", "Beginner"),
        course(6, "Data Structures", "CS", "Beginner"),
        course(7, "Data Structures", "CS", "Beginner"),
        course(8, "Watercolor Painting", "Art", "Beginner"),
    ])
    .unwrap();
    let model = SimilarityModel::build(&cat);
    let hits = model.top_similar(&cat, 7, 2);
    assert_eq!(hits.iter().map(|c| c.id).collect::<Vec<_>>(), vec![5, 6]);
}

#[test]
fn top_similar_unknown_id_is_empty() {
    let cat = Catalog::build(vec![course(1, "Anything", "Any", "Beginner")]).unwrap();
    let model = SimilarityModel::build(&cat);
    assert!(model.top_similar(&cat, 99, 5).is_empty());
}

#[test]
fn filters_are_and_combined() {
    let cat = Catalog::build(vec![
        rated(1, "Data Science", 10.0, 4.8),
        rated(2, "Data Science", 40.0, 4.9),
        rated(3, "Web Dev", 10.0, 4.5),
        rated(4, "data science", 5.0, 3.0),
    ])
    .unwrap();
    let filters = Filters {
        category: Some("data".into()),
        max_hours: Some(20.0),
        min_rating: Some(4.0),
        ..Default::default()
    };
    let out = recommend_by_filters(&cat, &filters, 10);
    assert_eq!(out.iter().map(|c| c.id).collect::<Vec<_>>(), vec![1]);
}

#[test]
fn no_filters_means_global_top_k_by_rating() {
    let cat = Catalog::build(vec![
        rated(1, "A", 1.0, 3.0),
        rated(2, "B", 1.0, 5.0),
        rated(3, "C", 1.0, 4.0),
    ])
    .unwrap();
    let out = recommend_by_filters(&cat, &Filters::default(), 2);
    assert_eq!(out.iter().map(|c| c.id).collect::<Vec<_>>(), vec![2, 3]);
}

#[test]
fn equal_ratings_keep_catalog_order() {
    let cat = Catalog::build(vec![
        rated(3, "A", 1.0, 4.0),
        rated(1, "A", 1.0, 4.0),
        rated(2, "A", 1.0, 4.0),
    ])
    .unwrap();
    let out = recommend_by_filters(&cat, &Filters::default(), 3);
    assert_eq!(out.iter().map(|c| c.id).collect::<Vec<_>>(), vec![1, 2, 3]);
}

#[test]
fn blank_filter_strings_are_no_ops() {
    let cat = Catalog::build(vec![rated(1, "Data", 1.0, 4.0), rated(2, "Web", 1.0, 3.0)]).unwrap();
    let filters = Filters {
        category: Some("  ".into()),
        difficulty: Some(String::new()),
        ..Default::default()
    };
    let out = recommend_by_filters(&cat, &filters, 10);
    assert_eq!(out.len(), 2);
}
