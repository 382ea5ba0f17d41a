/// Curated career goals and the catalog categories that feed each roadmap.
pub const CAREER_PATHS: &[(&str, &[&str])] = &[
    ("Data Scientist", &["Data Science", "AI", "Programming", "Mathematics"]),
    ("Full Stack Developer", &["Web Dev", "Programming", "Database", "Cloud"]),
    ("AI Engineer", &["AI", "Programming", "Mathematics", "Computer Sci"]),
    ("Cloud Engineer", &["Cloud", "DevOps", "Networking", "Programming"]),
    ("Cybersecurity Analyst", &["Cybersecurity", "Networking", "Programming"]),
];

/// Free-text phrases mapped onto career goals, for the chat assistant.
pub const CAREER_GOAL_KEYWORDS: &[(&str, &str)] = &[
    ("data scientist", "Data Scientist"),
    ("full stack", "Full Stack Developer"),
    ("fullstack", "Full Stack Developer"),
    ("ai engineer", "AI Engineer"),
    ("cloud engineer", "Cloud Engineer"),
    ("cybersecurity", "Cybersecurity Analyst"),
    ("security analyst", "Cybersecurity Analyst"),
];

pub fn categories_for(goal: &str) -> Option<&'static [&'static str]> {
    CAREER_PATHS
        .iter()
        .find(|(name, _)| *name == goal)
        .map(|(_, cats)| *cats)
}

pub fn goal_names() -> Vec<&'static str> {
    CAREER_PATHS.iter().map(|(name, _)| *name).collect()
}
