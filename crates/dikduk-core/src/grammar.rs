//! Grammar configuration: canonical values and accepted spellings.
//!
//! The table is an immutable value handed to the validators, so alternate
//! tables can be used without any global state. [`GrammarConfig::builtin`]
//! returns the standard seven binyanim, five tenses and twelve persons.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::Field;
use crate::normalize::normalize;

/// The sub-domains that carry a variant table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrammarField {
    Binyan,
    Zman,
    Guf,
}

impl GrammarField {
    /// The table backing a field; shoresh has none.
    pub fn for_field(field: Field) -> Option<Self> {
        match field {
            Field::Shoresh => None,
            Field::Binyan => Some(GrammarField::Binyan),
            Field::Zman => Some(GrammarField::Zman),
            Field::Guf => Some(GrammarField::Guf),
        }
    }
}

/// One canonical value and the spellings accepted for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarOption {
    pub value: String,
    pub label: String,
    /// Always contains `value`.
    #[serde(default)]
    pub variants: Vec<String>,
    /// Display group (e.g. first person forms).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pronoun: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

impl GrammarOption {
    fn new(value: &str, label: &str, variants: &[&str]) -> Self {
        let mut option = Self {
            value: value.to_string(),
            label: label.to_string(),
            variants: variants.iter().map(|v| v.to_string()).collect(),
            group: None,
            pronoun: None,
            gender: None,
            example: None,
        };
        option.ensure_value_accepted();
        option
    }

    fn with_example(mut self, example: &str) -> Self {
        self.example = Some(example.to_string());
        self
    }

    fn person(mut self, group: &str, pronoun: &str, gender: &str) -> Self {
        self.group = Some(group.to_string());
        self.pronoun = Some(pronoun.to_string());
        self.gender = Some(gender.to_string());
        self
    }

    fn ensure_value_accepted(&mut self) {
        if !self.variants.iter().any(|v| v == &self.value) {
            self.variants.insert(0, self.value.clone());
        }
    }

    /// True if `answer` matches this option's value or any accepted variant.
    pub fn accepts(&self, answer: &str) -> bool {
        let answer = normalize(answer);
        self.variants.iter().any(|v| normalize(v) == answer)
    }
}

/// The full grammar table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarConfig {
    #[serde(default)]
    pub binyan: Vec<GrammarOption>,
    #[serde(default)]
    pub zman: Vec<GrammarOption>,
    #[serde(default)]
    pub guf: Vec<GrammarOption>,
}

impl Default for GrammarConfig {
    fn default() -> Self {
        Self::builtin()
    }
}

impl GrammarConfig {
    /// The standard table.
    pub fn builtin() -> Self {
        let binyan = vec![
            GrammarOption::new("פעל", "פעל / קל", &["פעל", "קל", "פעלקל", "קלפעל"]),
            GrammarOption::new("נפעל", "נפעל", &["נפעל", "ניפעל"]),
            GrammarOption::new("פיעל", "פיעל", &["פיעל"]),
            GrammarOption::new("פועל", "פועל", &["פועל"]),
            GrammarOption::new("הפעיל", "הפעיל", &["הפעיל", "היפעיל"]),
            GrammarOption::new("הופעל", "הופעל", &["הופעל"]),
            GrammarOption::new("התפעל", "התפעל", &["התפעל", "היתפעל"]),
        ];

        let zman = vec![
            GrammarOption::new("עבר", "עבר", &["עבר"]).with_example("כתב, כתבה, כתבו"),
            GrammarOption::new("הווה", "הווה / בינוני", &["הווה", "בינוני"])
                .with_example("כותב, כותבת, כותבים"),
            GrammarOption::new("עתיד", "עתיד", &["עתיד"]).with_example("יכתוב, תכתוב, יכתבו"),
            GrammarOption::new("ציווי", "ציווי", &["ציווי"]).with_example("כתוב, כתבי, כתבו"),
            GrammarOption::new("שם פועל", "שם פועל", &["שםפועל", "שם פועל"])
                .with_example("לכתוב"),
        ];

        const FIRST: &str = "גוף ראשון (מדבר)";
        const SECOND: &str = "גוף שני (נוכח)";
        const THIRD: &str = "גוף שלישי (נסתר)";
        let guf = vec![
            GrammarOption::new("מדבר", "אני → מדבר", &[]).person(FIRST, "אני", "זכר"),
            GrammarOption::new("מדברת", "אני → מדברת", &[]).person(FIRST, "אני", "נקבה"),
            GrammarOption::new("מדברים", "אנחנו → מדברים", &[]).person(FIRST, "אנחנו", "זכר/רבים"),
            GrammarOption::new("מדברות", "אנחנו → מדברות", &[]).person(FIRST, "אנחנו", "נקבה/רבות"),
            GrammarOption::new("נוכח", "אתה → נוכח", &[]).person(SECOND, "אתה", "זכר"),
            GrammarOption::new("נוכחת", "את → נוכחת", &[]).person(SECOND, "את", "נקבה"),
            GrammarOption::new("נוכחים", "אתם → נוכחים", &[]).person(SECOND, "אתם", "זכר/רבים"),
            GrammarOption::new("נוכחות", "אתן → נוכחות", &[]).person(SECOND, "אתן", "נקבה/רבות"),
            GrammarOption::new("נסתר", "הוא → נסתר", &[]).person(THIRD, "הוא", "זכר"),
            GrammarOption::new("נסתרת", "היא → נסתרת", &[]).person(THIRD, "היא", "נקבה"),
            GrammarOption::new("נסתרים", "הם → נסתרים", &[]).person(THIRD, "הם", "זכר/רבים"),
            GrammarOption::new("נסתרות", "הן → נסתרות", &[]).person(THIRD, "הן", "נקבה/רבות"),
        ];

        Self { binyan, zman, guf }
    }

    /// Load a grammar table from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read grammar file: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("failed to parse grammar file: {}", path.display()))
    }

    /// Parse a grammar table from TOML, restoring the `value ∈ variants` invariant.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config: GrammarConfig = toml::from_str(content)?;
        for option in config
            .binyan
            .iter_mut()
            .chain(config.zman.iter_mut())
            .chain(config.guf.iter_mut())
        {
            option.ensure_value_accepted();
        }
        Ok(config)
    }

    /// Serialize the table as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("failed to serialize grammar table")
    }

    /// All options for a sub-domain.
    pub fn options(&self, field: GrammarField) -> &[GrammarOption] {
        match field {
            GrammarField::Binyan => &self.binyan,
            GrammarField::Zman => &self.zman,
            GrammarField::Guf => &self.guf,
        }
    }

    /// Find the option whose canonical value matches `canonical` after normalization.
    pub fn lookup(&self, field: GrammarField, canonical: &str) -> Option<&GrammarOption> {
        let key = normalize(canonical);
        self.options(field)
            .iter()
            .find(|opt| normalize(&opt.value) == key)
    }

    /// Accepted spellings for a canonical value.
    ///
    /// Total: an unlisted value is its own only accepted spelling.
    pub fn accepted_variants<'a>(&'a self, field: GrammarField, canonical: &'a str) -> Vec<&'a str> {
        match self.lookup(field, canonical) {
            Some(option) => option.variants.iter().map(String::as_str).collect(),
            None => vec![canonical],
        }
    }

    /// True if `value` names a canonical entry of the table.
    pub fn is_known(&self, field: GrammarField, value: &str) -> bool {
        self.lookup(field, value).is_some()
    }
}
