use std::path::Path;

use anyhow::Context as _;

use crate::formats::Draft;
use crate::i18n::Translator;
use crate::store;

pub async fn load(path: &Path) -> anyhow::Result<Draft> {
    store::read_json(path)
        .await?
        .ok_or_else(|| anyhow::anyhow!("draft not found: {}", path.display()))
}

pub async fn save(path: &Path, draft: &Draft) -> anyhow::Result<()> {
    store::write_json_atomic(path, draft)
        .await
        .with_context(|| format!("write draft: {}", path.display()))
}

/// Drops the previous draft before a new generation starts.
pub async fn discard(path: &Path) -> anyhow::Result<()> {
    if store::remove_if_exists(path).await? {
        tracing::info!(path = %path.display(), "discarded previous draft");
    }
    Ok(())
}

/// Plain-text rendering of a draft for the terminal. Model-reported errors show as warnings.
pub fn render_summary(draft: &Draft, tr: &Translator) -> String {
    let mut out = String::new();

    if !draft.pre_generation_checklist.is_empty() {
        out.push_str(&format!("{}\n", tr.t_or("preGenChecklistTitle", "Pre-generation checklist")));
        for item in &draft.pre_generation_checklist {
            out.push_str(&format!("  - {item}\n"));
        }
        out.push('\n');
    }

    out.push_str(&format!("{}\n", tr.t_or("generatedEmailTitle", "Generated email")));
    for (idx, section) in draft.email.sections.iter().enumerate() {
        out.push_str(&format!("\n[{idx}] {}\n", section.name));
        if !section.error.trim().is_empty() {
            out.push_str(&format!("  ! {}\n", section.error.trim()));
        }
        for line in section.content.lines() {
            out.push_str(&format!("  {line}\n"));
        }
        if !section.summary.trim().is_empty() {
            out.push_str(&format!("  ({})\n", section.summary.trim()));
        }
        for item in &section.checklist {
            let mark = if item.met { "x" } else { " " };
            let label = if item.description.is_empty() {
                &item.criterion
            } else {
                &item.description
            };
            out.push_str(&format!("  [{mark}] {label}\n"));
        }
    }

    let review = &draft.email.final_review;
    out.push_str(&format!("\n{}\n", tr.t_or("finalReviewTitle", "Final review")));
    if !review.error.trim().is_empty() {
        out.push_str(&format!("  ! {}\n", review.error.trim()));
    }
    for (label, ok) in [
        ("mobile_preview", review.mobile_preview),
        ("links_checked", review.links_checked),
        ("grammar_verified", review.grammar_verified),
        ("spam_score_ok", review.spam_score_ok),
    ] {
        let mark = if ok { "x" } else { " " };
        out.push_str(&format!("  [{mark}] {label}\n"));
    }
    if !review.send_time_suggested.trim().is_empty() {
        out.push_str(&format!(
            "  {}: {}\n",
            tr.t_or("suggestedSendTime", "Suggested send time"),
            review.send_time_suggested.trim()
        ));
    }

    out
}
