use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::formats::{Draft, EmailBrief, EmailSection, GenerationResponse};
use crate::i18n::Translator;

/// Request/response contract of the generative model.
#[async_trait]
pub trait EmailModel: Send + Sync {
    async fn generate(
        &self,
        brief: &EmailBrief,
        lang: crate::i18n::Language,
    ) -> anyhow::Result<GenerationResponse>;

    async fn improve(
        &self,
        section: &EmailSection,
        notes: &str,
        lang: crate::i18n::Language,
    ) -> anyhow::Result<EmailSection>;
}

/// Current draft plus per-operation in-flight flags and the last user-facing error.
pub struct Session<M> {
    model: M,
    translator: Translator,
    draft: Option<Draft>,
    generating: bool,
    improving: BTreeSet<usize>,
    error: Option<String>,
}

impl<M: EmailModel> Session<M> {
    pub fn new(model: M, translator: Translator) -> Self {
        Self {
            model,
            translator,
            draft: None,
            generating: false,
            improving: BTreeSet::new(),
            error: None,
        }
    }

    pub fn with_draft(mut self, draft: Draft) -> Self {
        self.draft = Some(draft);
        self
    }

    pub fn draft(&self) -> Option<&Draft> {
        self.draft.as_ref()
    }

    pub fn into_draft(self) -> Option<Draft> {
        self.draft
    }

    pub fn is_generating(&self) -> bool {
        self.generating
    }

    pub fn is_improving(&self, index: usize) -> bool {
        self.improving.contains(&index)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Replaces the current draft with a fresh generation. The previous draft is dropped up
    /// front, so a failure leaves no result at all.
    pub async fn generate(&mut self, brief: &EmailBrief) -> anyhow::Result<&Draft> {
        let lang = self.translator.language();
        self.generating = true;
        self.error = None;
        self.draft = None;

        let outcome = self.model.generate(brief, lang).await;
        self.generating = false;

        match outcome {
            Ok(response) => {
                tracing::info!(
                    sections = response.email_data.sections.len(),
                    checklist = response.pre_generation_checklist.len(),
                    "email generated"
                );
                Ok(self.draft.insert(Draft::new(lang, response)))
            }
            Err(err) => {
                tracing::error!(error = %format!("{err:#}"), "generate email failed");
                let message = self.translator.t("generationError");
                self.error = Some(message.clone());
                Err(anyhow::anyhow!(message))
            }
        }
    }

    /// Improves one section in place. On failure the draft is left untouched.
    pub async fn improve(&mut self, index: usize, notes: &str) -> anyhow::Result<&EmailSection> {
        let Some(section) = self
            .draft
            .as_ref()
            .and_then(|d| d.email.sections.get(index))
            .cloned()
        else {
            let count = self.draft.as_ref().map_or(0, |d| d.email.sections.len());
            anyhow::bail!("no section at index {index} (sections: {count})");
        };

        let lang = self.translator.language();
        self.improving.insert(index);
        self.error = None;

        let outcome = self.model.improve(&section, notes, lang).await;
        self.improving.remove(&index);

        let improved = match outcome {
            Ok(improved) => improved,
            Err(err) => {
                tracing::error!(
                    index,
                    section = %section.name,
                    error = %format!("{err:#}"),
                    "improve section failed"
                );
                let message = self.translator.t("improvementError");
                self.error = Some(message.clone());
                return Err(anyhow::anyhow!(message));
            }
        };

        let draft = self
            .draft
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("draft disappeared while improving"))?;
        draft.email.replace_section(index, improved)?;
        draft.updated_at = chrono::Utc::now();
        tracing::info!(index, section = %section.name, "section improved");

        Ok(&draft.email.sections[index])
    }
}
