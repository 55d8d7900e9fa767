//! Language-purity and completeness validation for bilingual output

use crate::model::BilingualDraft;

/// Thresholds for the character-class ratio checks
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Maximum ratio of Latin letters to total characters in `content_ko`
    pub max_latin_ratio_ko: f64,
    /// Maximum ratio of non-ASCII characters to total characters in `content_en`
    pub max_non_ascii_ratio_en: f64,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_latin_ratio_ko: 0.15,
            max_non_ascii_ratio_en: 0.05,
        }
    }
}

/// Outcome of validating one draft
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Accepted,
    Rejected { reason: String },
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }
}

/// Validator for bilingual structured output.
///
/// The verdict is the conjunction of field-presence and both language
/// checks; any failed check rejects the whole draft.
#[derive(Debug, Clone, Default)]
pub struct LanguageValidator {
    config: ValidatorConfig,
}

impl LanguageValidator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    pub fn validate(&self, draft: &BilingualDraft) -> Verdict {
        let required = [
            ("category", &draft.category),
            ("slug", &draft.slug),
            ("title_ko", &draft.title_ko),
            ("content_ko", &draft.content_ko),
            ("title_en", &draft.title_en),
            ("content_en", &draft.content_en),
        ];

        for (name, value) in required {
            if value.trim().is_empty() {
                return Verdict::Rejected {
                    reason: format!("missing or empty field: {name}"),
                };
            }
        }

        for (name, value) in [("title_ko", &draft.title_ko), ("content_ko", &draft.content_ko)] {
            if !contains_hangul(value) {
                return Verdict::Rejected {
                    reason: format!("{name} contains no Hangul"),
                };
            }
        }

        let latin_ratio = latin_ratio(&draft.content_ko);
        if latin_ratio >= self.config.max_latin_ratio_ko {
            return Verdict::Rejected {
                reason: format!(
                    "content_ko Latin ratio {latin_ratio:.2} exceeds {:.2}",
                    self.config.max_latin_ratio_ko
                ),
            };
        }

        let non_ascii_ratio = non_ascii_ratio(&draft.content_en);
        if non_ascii_ratio >= self.config.max_non_ascii_ratio_en {
            return Verdict::Rejected {
                reason: format!(
                    "content_en non-ASCII ratio {non_ascii_ratio:.2} exceeds {:.2}",
                    self.config.max_non_ascii_ratio_en
                ),
            };
        }

        Verdict::Accepted
    }
}

/// Hangul syllable block (U+AC00..U+D7A3)
fn contains_hangul(text: &str) -> bool {
    text.chars().any(|c| ('\u{AC00}'..='\u{D7A3}').contains(&c))
}

fn latin_ratio(text: &str) -> f64 {
    let total = text.chars().count();
    if total == 0 {
        return 0.0;
    }
    let latin = text.chars().filter(char::is_ascii_alphabetic).count();
    latin as f64 / total as f64
}

fn non_ascii_ratio(text: &str) -> f64 {
    let total = text.chars().count();
    if total == 0 {
        return 0.0;
    }
    let non_ascii = text.chars().filter(|c| !c.is_ascii()).count();
    non_ascii as f64 / total as f64
}
