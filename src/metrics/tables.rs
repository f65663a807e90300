//! Static Language Tables
//!
//! Per-edition reference data bundled with the crate: Talk-namespace
//! prefixes, "citation needed" template names, quality-assessment grades
//! and edit-protection levels.

/// Talk-namespace prefix per wiki edition; editions not listed fall back
/// to the English `Talk:`.
const TALK_PREFIXES: &[(&str, &str)] = &[
    ("fr", "Discussion:"),
    ("en", "Talk:"),
    ("de", "Diskussion:"),
    ("es", "Discusión:"),
    ("it", "Discussione:"),
    ("pt", "Discussão:"),
    ("nl", "Overleg:"),
    ("pl", "Dyskusja:"),
    ("sv", "Diskussion:"),
    ("ru", "Обсуждение:"),
    ("ja", "ノート:"),
    ("zh", "Talk:"),
    ("ar", "نقاش:"),
    ("hu", "Vita:"),
];

/// Title of the discussion companion of an article
pub fn talk_title(lang: &str, title: &str) -> String {
    let prefix = TALK_PREFIXES
        .iter()
        .find(|(code, _)| *code == lang)
        .map(|(_, prefix)| *prefix)
        .unwrap_or("Talk:");
    format!("{prefix}{title}")
}

/// "Citation needed" template names per edition, matched case-insensitively
/// inside `{{...}}` calls.
const CITATION_TEMPLATES: &[(&str, &[&str])] = &[
    ("fr", &["refnec", "référence nécessaire", "citation needed", "cn"]),
    ("en", &["citation needed", "cn", "fact", "verify", "clarification needed"]),
    ("de", &["belege fehlen", "quelle fehlt", "citation needed", "cn"]),
    ("es", &["cita requerida", "cr", "verificar"]),
    ("it", &["citazione necessaria", "citation needed", "cn", "senza fonte"]),
    ("pt", &["carece de fontes", "citation needed", "cn", "verificar"]),
    ("ru", &["нет источника", "citation needed", "источник", "cn"]),
    ("ja", &["要出典", "citation needed", "cn", "出典"]),
    ("zh", &["来源请求", "citation needed", "cn", "需要来源"]),
    ("ar", &["مصدر مطلوب", "citation needed", "cn", "بحاجة لمصدر"]),
    ("nl", &["bron", "citation needed", "cn", "verificatie"]),
    ("sv", &["källa behövs", "citation needed", "cn", "källa"]),
];

const DEFAULT_CITATION_TEMPLATES: &[&str] =
    &["citation needed", "cn", "refnec", "référence nécessaire"];

/// Template names flagging an unsourced statement on the given edition
pub fn citation_templates(lang: &str) -> &'static [&'static str] {
    CITATION_TEMPLATES
        .iter()
        .find(|(code, _)| *code == lang)
        .map(|(_, templates)| *templates)
        .unwrap_or(DEFAULT_CITATION_TEMPLATES)
}

/// Quality-deficit score per assessment grade: 0.0 for the top grade,
/// rising to 1.0 for stubs. French wikis rate through
/// `{{Wikiprojet|avancement=...}}`, English through
/// `{{WikiProject ...|class=...}}`.
const FR_GRADE_SCORES: &[(&str, f64)] = &[
    ("adq", 0.0),
    ("ba", 0.2),
    ("a", 0.4),
    ("b", 0.6),
    ("bd", 0.8),
    ("ébauche", 1.0),
];

const EN_GRADE_SCORES: &[(&str, f64)] = &[
    ("fa", 0.0),
    ("a", 0.2),
    ("ga", 0.3),
    ("b", 0.5),
    ("c", 0.7),
    ("start", 0.85),
    ("stub", 1.0),
];

/// Spelled-out French grades normalized to their short form
const FR_GRADE_ALIASES: &[(&str, &str)] = &[
    ("article de qualité", "adq"),
    ("bon article", "ba"),
    ("avancé", "a"),
    ("bien construit", "b"),
    ("bon début", "bd"),
    ("e", "ébauche"),
];

/// Quality-deficit score for a raw grade string; `None` when the grade is
/// not recognized (unrated pages score 0.0 upstream).
pub fn grade_score(lang: &str, raw_grade: &str) -> Option<f64> {
    let grade = raw_grade.trim().to_lowercase();
    let table = if lang == "en" {
        EN_GRADE_SCORES
    } else {
        FR_GRADE_SCORES
    };
    let canonical = FR_GRADE_ALIASES
        .iter()
        .find(|(alias, _)| *alias == grade)
        .map(|(_, short)| *short)
        .unwrap_or(grade.as_str());
    table
        .iter()
        .find(|(name, _)| *name == canonical)
        .map(|(_, score)| *score)
}

/// Edit-protection severity per level. Levels outside the table map to the
/// midpoint: the page is protected, but the level tells us nothing more.
const PROTECTION_SCORES: &[(&str, f64)] = &[
    ("autoconfirmed", 0.25),
    ("editautopatrolprotected", 0.25),
    ("editextendedsemiprotected", 0.5),
    ("extendedconfirmed", 0.5),
    ("templateeditor", 0.75),
    ("editautoreviewprotected", 0.75),
    ("sysop", 1.0),
];

pub fn protection_score(level: &str) -> f64 {
    if level.is_empty() {
        return 0.0;
    }
    PROTECTION_SCORES
        .iter()
        .find(|(name, _)| *name == level)
        .map(|(_, score)| *score)
        .unwrap_or(0.5)
}

/// Privilege groups filtered out by the add/delete ratio when
/// `exclude_privileged` is on
pub const PRIVILEGED_GROUPS: &[&str] = &["sysop", "bureaucrat", "rollbacker", "bot"];
