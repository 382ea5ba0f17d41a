//! Rule-based chat assistant: keyword intent detection dispatching into the
//! catalog, resolver, and recommender.

use crate::{career, Engine};
use edupath_core::path::{resolve, DEFAULT_MAX_DEPTH};
use edupath_core::similarity::{recommend_by_filters, Filters};
use edupath_core::{Course, CourseId};
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Default)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub completed_courses: Vec<CourseId>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub courses: Vec<Course>,
    pub intent: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    RecommendNext,
    CareerPath,
    SkillGap,
    TimeEstimate,
    FindCourse,
    Fallback,
}

impl Intent {
    pub fn as_str(self) -> &'static str {
        match self {
            Intent::RecommendNext => "recommend_next",
            Intent::CareerPath => "career_path",
            Intent::SkillGap => "skill_gap",
            Intent::TimeEstimate => "time_estimate",
            Intent::FindCourse => "find_course",
            Intent::Fallback => "fallback",
        }
    }
}

// Checked in order; the first intent with a matching phrase wins.
const INTENT_KEYWORDS: &[(Intent, &[&str])] = &[
    (
        Intent::RecommendNext,
        &["what should i learn", "next course", "after python", "what's next", "what next", "recommend", "suggest"],
    ),
    (
        Intent::CareerPath,
        &["become", "career", "want to be", "path to", "how to become"],
    ),
    (
        Intent::SkillGap,
        &["missing", "gap", "what am i missing", "need to learn", "prerequisite"],
    ),
    (
        Intent::TimeEstimate,
        &["how long", "hours", "time", "duration", "how many hours"],
    ),
    (
        Intent::FindCourse,
        &["find", "search", "show me courses", "courses about", "courses on"],
    ),
];

pub fn detect_intent(message: &str) -> Intent {
    let msg = message.to_lowercase();
    for (intent, keywords) in INTENT_KEYWORDS {
        if keywords.iter().any(|kw| msg.contains(kw)) {
            return *intent;
        }
    }
    Intent::Fallback
}

fn extract_course_id(message: &str) -> Option<CourseId> {
    let re = Regex::new(r"\b(\d{3,6})\b").ok()?;
    re.captures(message)?.get(1)?.as_str().parse().ok()
}

pub fn respond(engine: &Engine, req: &ChatRequest) -> ChatResponse {
    let message = req.message.trim();
    if message.is_empty() {
        return ChatResponse {
            reply: "Please send a message!".into(),
            courses: Vec::new(),
            intent: "none",
        };
    }
    match detect_intent(message) {
        Intent::RecommendNext => recommend_next(engine, &req.completed_courses),
        Intent::CareerPath => career_path(engine, message),
        Intent::SkillGap => skill_gap(engine, message),
        Intent::TimeEstimate => time_estimate(engine, message),
        Intent::FindCourse => find_course(engine, message),
        Intent::Fallback => fallback(),
    }
}

fn recommend_next(engine: &Engine, completed: &[CourseId]) -> ChatResponse {
    if completed.is_empty() {
        return ChatResponse {
            reply: "You haven't marked any courses as completed yet! Here are some top-rated courses to start with:".into(),
            courses: recommend_by_filters(&engine.catalog, &Filters::default(), 5),
            intent: Intent::RecommendNext.as_str(),
        };
    }
    let last = completed[completed.len() - 1];
    let courses: Vec<Course> = engine
        .model
        .top_similar(&engine.catalog, last, 10)
        .into_iter()
        .filter(|c| !completed.contains(&c.id))
        .take(5)
        .collect();
    ChatResponse {
        reply: "Based on your last completed course, here are great next steps:".into(),
        courses,
        intent: Intent::RecommendNext.as_str(),
    }
}

fn career_path(engine: &Engine, message: &str) -> ChatResponse {
    let msg = message.to_lowercase();
    let goal = career::CAREER_GOAL_KEYWORDS
        .iter()
        .find(|(kw, _)| msg.contains(kw))
        .map(|(_, goal)| *goal);

    let Some(goal) = goal else {
        return ChatResponse {
            reply: format!(
                "Which career path are you aiming for? Options: {}.",
                career::goal_names().join(", ")
            ),
            courses: Vec::new(),
            intent: Intent::CareerPath.as_str(),
        };
    };

    let categories = career::categories_for(goal).unwrap_or(&[]);
    let mut courses: Vec<Course> = Vec::new();
    for cat in categories.iter().take(2) {
        let filters = Filters {
            category: Some((*cat).into()),
            ..Default::default()
        };
        courses.extend(recommend_by_filters(&engine.catalog, &filters, 2));
    }
    courses.truncate(5);
    ChatResponse {
        reply: format!("Great choice! Here's your {goal} learning roadmap. Start with these key courses:"),
        courses,
        intent: Intent::CareerPath.as_str(),
    }
}

fn skill_gap(engine: &Engine, message: &str) -> ChatResponse {
    if let Some(id) = extract_course_id(message) {
        if let Some(path) = resolve(&engine.catalog, id, DEFAULT_MAX_DEPTH) {
            let mut prereqs = path.flat_path;
            prereqs.truncate(5);
            return ChatResponse {
                reply: format!("To take \"{}\", you need these prerequisites:", path.target.title),
                courses: prereqs,
                intent: Intent::SkillGap.as_str(),
            };
        }
    }
    ChatResponse {
        reply: "To check skill gaps, mention a course ID, e.g. \"What am I missing for course 1010?\"".into(),
        courses: Vec::new(),
        intent: Intent::SkillGap.as_str(),
    }
}

fn time_estimate(engine: &Engine, message: &str) -> ChatResponse {
    if let Some(id) = extract_course_id(message) {
        if let Some(course) = engine.catalog.lookup_fast(id) {
            return ChatResponse {
                reply: format!(
                    "\"{}\" takes approximately {} hours to complete ({} level).",
                    course.title, course.estimated_hours, course.difficulty
                ),
                courses: vec![course.clone()],
                intent: Intent::TimeEstimate.as_str(),
            };
        }
    }

    let msg = message.to_lowercase();
    for cat in ["ai", "programming", "data science", "web dev", "cloud", "cybersecurity"] {
        if msg.contains(cat) {
            let matching: Vec<&Course> = engine
                .catalog
                .all()
                .iter()
                .filter(|c| c.category.to_lowercase().contains(cat))
                .collect();
            if !matching.is_empty() {
                let avg = matching.iter().map(|c| c.estimated_hours).sum::<f32>()
                    / matching.len() as f32;
                return ChatResponse {
                    reply: format!(
                        "The average time to complete a course in that category is ~{avg:.0} hours."
                    ),
                    courses: Vec::new(),
                    intent: Intent::TimeEstimate.as_str(),
                };
            }
        }
    }

    let all = engine.catalog.all();
    let avg = if all.is_empty() {
        0.0
    } else {
        all.iter().map(|c| c.estimated_hours).sum::<f32>() / all.len() as f32
    };
    ChatResponse {
        reply: format!("On average, courses take about {avg:.0} hours. Ask for a roadmap for full path estimates."),
        courses: Vec::new(),
        intent: Intent::TimeEstimate.as_str(),
    }
}

fn find_course(engine: &Engine, message: &str) -> ChatResponse {
    let msg = message.to_lowercase();
    let topic = Regex::new(r".*(find|search|show me courses|courses about|courses on)\s*")
        .ok()
        .map(|re| re.replace(&msg, "").trim().to_string())
        .unwrap_or_default();

    if topic.is_empty() {
        return ChatResponse {
            reply: "What topic would you like to search for? E.g. \"Show me courses on machine learning\"".into(),
            courses: Vec::new(),
            intent: Intent::FindCourse.as_str(),
        };
    }

    let mut results: Vec<Course> = engine
        .catalog
        .search_title(&topic)
        .into_iter()
        .cloned()
        .collect();
    if results.is_empty() {
        results = engine
            .catalog
            .all()
            .iter()
            .filter(|c| c.category.to_lowercase().contains(&topic))
            .cloned()
            .collect();
    }
    results.sort_by(|a, b| b.rating.partial_cmp(&a.rating).unwrap_or(std::cmp::Ordering::Equal));
    results.truncate(5);

    if results.is_empty() {
        ChatResponse {
            reply: format!("No courses found for \"{topic}\". Try a broader keyword."),
            courses: Vec::new(),
            intent: Intent::FindCourse.as_str(),
        }
    } else {
        ChatResponse {
            reply: format!("Found {} courses matching \"{topic}\":", results.len()),
            courses: results,
            intent: Intent::FindCourse.as_str(),
        }
    }
}

fn fallback() -> ChatResponse {
    ChatResponse {
        reply: "I can recommend next courses, build a career roadmap, check skill gaps, estimate course time, or find courses by topic. Try \"Show me courses on AI\".".into(),
        courses: Vec::new(),
        intent: Intent::Fallback.as_str(),
    }
}
