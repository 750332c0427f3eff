use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::i18n::Language;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub criterion: String,
    pub met: bool,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailSection {
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalReview {
    #[serde(default)]
    pub mobile_preview: bool,
    #[serde(default)]
    pub links_checked: bool,
    #[serde(default)]
    pub grammar_verified: bool,
    #[serde(default)]
    pub spam_score_ok: bool,
    #[serde(default)]
    pub send_time_suggested: String,
    #[serde(default)]
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailResult {
    pub sections: Vec<EmailSection>,
    #[serde(default)]
    pub final_review: FinalReview,
    #[serde(default)]
    pub full_email_text: String,
}

impl EmailResult {
    /// Joins every section's content with a blank line, in sequence order.
    #[must_use]
    pub fn joined_text(sections: &[EmailSection]) -> String {
        sections
            .iter()
            .map(|s| s.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Replaces the section at `index` and rebuilds `full_email_text` from the whole sequence.
    pub fn replace_section(&mut self, index: usize, section: EmailSection) -> anyhow::Result<()> {
        let len = self.sections.len();
        let Some(slot) = self.sections.get_mut(index) else {
            anyhow::bail!("section index out of range: {index} (sections: {len})");
        };
        *slot = section;
        self.full_email_text = Self::joined_text(&self.sections);
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationResponse {
    #[serde(default)]
    pub pre_generation_checklist: Vec<String>,
    pub email_data: EmailResult,
}

/// User inputs that drive a full generation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmailBrief {
    pub product_name: String,
    pub audience: String,
    pub main_goal: String,
    pub pain_point: String,
    pub value_prop: String,
    pub social_proof: String,
    pub brand_name: String,
    pub sender_name: String,
    pub sender_title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Draft {
    pub generated_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub language: Language,
    #[serde(default)]
    pub pre_generation_checklist: Vec<String>,
    pub email: EmailResult,
}

impl Draft {
    pub fn new(language: Language, response: GenerationResponse) -> Self {
        let now = Utc::now();
        Self {
            generated_at: now,
            updated_at: now,
            language,
            pre_generation_checklist: response.pre_generation_checklist,
            email: response.email_data,
        }
    }
}
