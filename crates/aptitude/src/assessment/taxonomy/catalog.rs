use super::{
    AssessmentType, Category, CategoryId, OptionRule, OptionSymbol, Question, QuestionId,
    TaxonomyDefinition,
};

pub(crate) fn standard_definitions() -> Vec<TaxonomyDefinition> {
    vec![riasec(), disc(), learning_style()]
}

fn riasec() -> TaxonomyDefinition {
    // Each prompt offers one symbol per category, cycling through three symbol sets.
    const SETS: [&str; 3] = ["abcjkl", "defmno", "ghipqr"];
    const PROMPTS: [&str; 12] = [
        "Which weekend activity sounds most appealing?",
        "Which school project would you volunteer for first?",
        "Which after-school club would you join?",
        "Which summer job would you pick?",
        "Which task would you enjoy during a group assignment?",
        "Which kind of problem do you like solving?",
        "Which workplace would suit you best?",
        "Which skill would you most like to improve?",
        "Which compliment would you value most?",
        "Which subject do you look forward to?",
        "Which role would you take when organising an event?",
        "Which career headline would make you proudest?",
    ];

    TaxonomyDefinition {
        assessment_type: AssessmentType("riasec".to_string()),
        title: "Career interest profile (RIASEC)".to_string(),
        categories: vec![
            category("R", "Realistic"),
            category("I", "Investigative"),
            category("A", "Artistic"),
            category("S", "Social"),
            category("E", "Enterprising"),
            category("C", "Conventional"),
        ],
        options: vec![
            rule("adg", &["R"]),
            rule("beh", &["I"]),
            rule("cfi", &["A"]),
            rule("jmp", &["S"]),
            rule("knq", &["E"]),
            rule("lor", &["C"]),
        ]
        .into_iter()
        .flatten()
        .collect(),
        questions: PROMPTS
            .iter()
            .enumerate()
            .map(|(index, prompt)| question(index, prompt, SETS[index % SETS.len()]))
            .collect(),
    }
}

fn disc() -> TaxonomyDefinition {
    const PROMPTS: [&str; 8] = [
        "When a team project stalls, you usually...",
        "Friends would describe you as...",
        "Under a tight deadline you...",
        "In a disagreement you tend to...",
        "You feel most productive when...",
        "When starting something new you first...",
        "Feedback you appreciate most is...",
        "Your ideal study group is...",
    ];

    TaxonomyDefinition {
        assessment_type: AssessmentType("disc".to_string()),
        title: "Behavioural style (DISC)".to_string(),
        categories: vec![
            category("D", "Dominance"),
            category("I", "Influence"),
            category("S", "Steadiness"),
            category("C", "Conscientiousness"),
        ],
        options: vec![
            rule("a", &["D"]),
            rule("b", &["I"]),
            rule("c", &["S"]),
            rule("d", &["C"]),
        ]
        .into_iter()
        .flatten()
        .collect(),
        questions: PROMPTS
            .iter()
            .enumerate()
            .map(|(index, prompt)| question(index, prompt, "abcd"))
            .collect(),
    }
}

fn learning_style() -> TaxonomyDefinition {
    const PROMPTS: [(&str, &str); 8] = [
        ("To learn a new route you prefer...", "abcde"),
        ("Before an exam you revise by...", "abcd"),
        ("A new gadget arrives; you...", "abcde"),
        ("You remember a lecture best when...", "abcd"),
        ("To explain an idea to a friend you...", "abcde"),
        ("The most useful feedback format is...", "abcd"),
        ("When choosing a course you look at...", "abcd"),
        ("To master a recipe you...", "abcde"),
    ];

    TaxonomyDefinition {
        assessment_type: AssessmentType("learning-style".to_string()),
        title: "Learning preferences (VARK)".to_string(),
        categories: vec![
            category("V", "Visual"),
            category("A", "Aural"),
            category("R", "Read/Write"),
            category("K", "Kinesthetic"),
        ],
        options: vec![
            rule("a", &["V"]),
            rule("b", &["A"]),
            rule("c", &["R"]),
            rule("d", &["K"]),
            // Demonstration-style answers count as both seeing and doing.
            rule("e", &["V", "K"]),
        ]
        .into_iter()
        .flatten()
        .collect(),
        questions: PROMPTS
            .iter()
            .enumerate()
            .map(|(index, (prompt, offered))| question(index, prompt, offered))
            .collect(),
    }
}

fn category(id: &str, label: &str) -> Category {
    Category {
        id: CategoryId(id.to_string()),
        label: label.to_string(),
    }
}

fn rule(symbols: &str, categories: &[&str]) -> Vec<OptionRule> {
    symbols
        .chars()
        .map(|symbol| OptionRule {
            option: OptionSymbol(symbol),
            categories: categories
                .iter()
                .map(|id| CategoryId(id.to_string()))
                .collect(),
        })
        .collect()
}

fn question(index: usize, prompt: &str, offered: &str) -> Question {
    Question {
        id: QuestionId(format!("q{}", index + 1)),
        prompt: prompt.to_string(),
        options: offered.chars().map(OptionSymbol).collect(),
    }
}
