//! Text heuristics over a submitted user prompt.

use std::sync::LazyLock;

use regex::Regex;

/// Greetings, acknowledgements, bare question marks and simple wh-questions.
/// Matched against the trimmed, lowercased prompt.
static TRIVIAL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"^(hi|hello|hey|thanks|thank you|ok|okay|yes|no|y|n)\s*[!.?]*$").unwrap(),
        Regex::new(r"^\?+$").unwrap(),
        Regex::new(
            r"^(what|how|why|when|where|who)\s+(is|are|was|were|do|does|did|can|could|would|should)\b",
        )
        .unwrap(),
    ]
});

/// Skill invocations; capture group 1 is the skill name.
static SKILL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // `/skill-name` at the start of the prompt or after whitespace
        Regex::new(r"(?:^|\s)/(\w[\w-]*)").unwrap(),
        // use skill 'name'
        Regex::new(r#"(?i)use\s+skill\s+['"]?(\w[\w-]*)['"]?"#).unwrap(),
        // invoke 'name' skill
        Regex::new(r#"(?i)invoke\s+['"]?(\w[\w-]*)['"]?\s+skill"#).unwrap(),
    ]
});

/// Verbs that suggest a multi-step request.
const TASK_INDICATORS: &[&str] = &[
    "create",
    "make",
    "build",
    "implement",
    "add",
    "fix",
    "update",
    "write",
    "generate",
    "develop",
    "design",
    "refactor",
    "test",
];

/// How a prompt should be answered by the reminder logic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptKind {
    /// Nothing worth injecting.
    Trivial,
    /// A skill/command is being invoked.
    Skill(String),
    /// Looks like a request for work.
    Task,
    Other,
}

/// Very short prompts and small talk need no reminder.
pub fn is_trivial_prompt(prompt: &str) -> bool {
    let clean = prompt.trim().to_lowercase();
    if clean.chars().count() < 5 {
        return true;
    }
    TRIVIAL_PATTERNS.iter().any(|re| re.is_match(&clean))
}

/// Name of the skill the prompt invokes, if any (first pattern wins).
pub fn detect_skill(prompt: &str) -> Option<String> {
    SKILL_PATTERNS
        .iter()
        .find_map(|re| re.captures(prompt))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

pub fn looks_like_task(prompt: &str) -> bool {
    let lower = prompt.to_lowercase();
    TASK_INDICATORS.iter().any(|ind| lower.contains(ind))
}

pub fn classify(prompt: &str) -> PromptKind {
    if is_trivial_prompt(prompt) {
        return PromptKind::Trivial;
    }
    if let Some(skill) = detect_skill(prompt) {
        return PromptKind::Skill(skill);
    }
    if looks_like_task(prompt) {
        PromptKind::Task
    } else {
        PromptKind::Other
    }
}
