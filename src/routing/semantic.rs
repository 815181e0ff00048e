//! Heuristic skill similarity.
//!
//! Matching is a fixed category table plus string heuristics, not NLP.
//! The tables and weights are part of the routing contract; tests depend
//! on their exact values.

/// Broad skill categories used for same-category and related-category
/// similarity lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkillCategory {
    Programming,
    WebFrontend,
    WebBackend,
    Database,
    Devops,
    Testing,
    MlAi,
    Architecture,
}

/// Skill name to category, lowercase keys.
const SKILL_CATEGORIES: &[(&str, SkillCategory)] = &[
    ("python", SkillCategory::Programming),
    ("rust", SkillCategory::Programming),
    ("go", SkillCategory::Programming),
    ("java", SkillCategory::Programming),
    ("c++", SkillCategory::Programming),
    ("javascript", SkillCategory::Programming),
    ("typescript", SkillCategory::Programming),
    ("react", SkillCategory::WebFrontend),
    ("vue", SkillCategory::WebFrontend),
    ("angular", SkillCategory::WebFrontend),
    ("css", SkillCategory::WebFrontend),
    ("html", SkillCategory::WebFrontend),
    ("django", SkillCategory::WebBackend),
    ("flask", SkillCategory::WebBackend),
    ("fastapi", SkillCategory::WebBackend),
    ("express", SkillCategory::WebBackend),
    ("graphql", SkillCategory::WebBackend),
    ("rest", SkillCategory::WebBackend),
    ("grpc", SkillCategory::WebBackend),
    ("sql", SkillCategory::Database),
    ("postgresql", SkillCategory::Database),
    ("postgres", SkillCategory::Database),
    ("mysql", SkillCategory::Database),
    ("mongodb", SkillCategory::Database),
    ("redis", SkillCategory::Database),
    ("docker", SkillCategory::Devops),
    ("kubernetes", SkillCategory::Devops),
    ("terraform", SkillCategory::Devops),
    ("ci/cd", SkillCategory::Devops),
    ("aws", SkillCategory::Devops),
    ("gcp", SkillCategory::Devops),
    ("azure", SkillCategory::Devops),
    ("pytest", SkillCategory::Testing),
    ("jest", SkillCategory::Testing),
    ("selenium", SkillCategory::Testing),
    ("qa", SkillCategory::Testing),
    ("machine-learning", SkillCategory::MlAi),
    ("ml", SkillCategory::MlAi),
    ("tensorflow", SkillCategory::MlAi),
    ("pytorch", SkillCategory::MlAi),
    ("nlp", SkillCategory::MlAi),
    ("microservices", SkillCategory::Architecture),
    ("system-design", SkillCategory::Architecture),
    ("cqrs", SkillCategory::Architecture),
    ("event-sourcing", SkillCategory::Architecture),
    ("ddd", SkillCategory::Architecture),
];

/// Symmetric related-category pairs.
const RELATED_CATEGORIES: &[(SkillCategory, SkillCategory)] = &[
    (SkillCategory::Programming, SkillCategory::WebFrontend),
    (SkillCategory::Programming, SkillCategory::WebBackend),
    (SkillCategory::Programming, SkillCategory::MlAi),
    (SkillCategory::WebFrontend, SkillCategory::WebBackend),
    (SkillCategory::WebBackend, SkillCategory::Database),
    (SkillCategory::WebBackend, SkillCategory::Architecture),
    (SkillCategory::Devops, SkillCategory::Architecture),
    (SkillCategory::Devops, SkillCategory::Database),
    (SkillCategory::Testing, SkillCategory::Programming),
];

/// Known abbreviation/alias pairs, checked in both directions.
const ABBREVIATIONS: &[(&str, &str)] = &[
    ("python", "py"),
    ("javascript", "js"),
    ("typescript", "ts"),
    ("kubernetes", "k8s"),
    ("postgresql", "postgres"),
    ("machine-learning", "ml"),
];

fn category_of(skill: &str) -> Option<SkillCategory> {
    SKILL_CATEGORIES
        .iter()
        .find(|(name, _)| *name == skill)
        .map(|(_, cat)| *cat)
}

fn categories_related(a: SkillCategory, b: SkillCategory) -> bool {
    RELATED_CATEGORIES
        .iter()
        .any(|&(x, y)| (x == a && y == b) || (x == b && y == a))
}

fn is_abbreviation(a: &str, b: &str) -> bool {
    ABBREVIATIONS
        .iter()
        .any(|&(long, short)| (long == a && short == b) || (long == b && short == a))
}

/// Similarity between two skill names in [0,1].
///
/// Takes the maximum over the applicable heuristics: exact match 1.0,
/// same category 0.7, substring containment 0.6, known abbreviation 0.5,
/// related category 0.4, otherwise 0.0. Inputs are lowercased before
/// comparison.
pub fn semantic_similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();

    if a == b {
        return 1.0;
    }

    let mut best: f64 = 0.0;

    if let (Some(ca), Some(cb)) = (category_of(&a), category_of(&b)) {
        if ca == cb {
            best = best.max(0.7);
        } else if categories_related(ca, cb) {
            best = best.max(0.4);
        }
    }

    if a.contains(b.as_str()) || b.contains(a.as_str()) {
        best = best.max(0.6);
    }

    if is_abbreviation(&a, &b) {
        best = best.max(0.5);
    }

    best
}

/// Best similarity of `skill` against any entry in `possessed`.
pub fn best_similarity(skill: &str, possessed: &[String]) -> f64 {
    possessed
        .iter()
        .map(|have| semantic_similarity(skill, have))
        .fold(0.0, f64::max)
}
