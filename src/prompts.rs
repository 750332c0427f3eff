use serde_json::{Value, json};

use crate::formats::{EmailBrief, EmailSection};
use crate::i18n::Language;
use crate::roles::SectionRole;

pub const GENERATION_TEMPERATURE: f32 = 0.7;
pub const IMPROVEMENT_TEMPERATURE: f32 = 0.6;

struct Criterion {
    key: &'static str,
    en: &'static str,
    ar: &'static str,
}

const fn criterion(key: &'static str, en: &'static str, ar: &'static str) -> Criterion {
    Criterion { key, en, ar }
}

const PREHEADER_CRITERIA: &[Criterion] = &[
    criterion("is_40_130_chars", "Is the text between 40-130 characters?", "هل النص بين 40-130 حرفًا؟"),
    criterion("complements_subject", "Does it complement the subject line without repeating it?", "هل يكمل سطر الموضوع دون تكراره؟"),
    criterion("creates_curiosity", "Does it create curiosity?", "هل يثير الفضول؟"),
];

const SUBJECT_LINE_CRITERIA: &[Criterion] = &[
    criterion("is_under_50_chars", "Is it under 50 characters?", "هل هو أقل من 50 حرفًا؟"),
    criterion("is_hook_based", "Is it hook-based?", "هل يعتمد على خطاف جذاب؟"),
    criterion("is_personalized", "Is it personalized?", "هل هو شخصي؟"),
    criterion("creates_curiosity_gap", "Does it create a curiosity gap?", "هل يخلق فجوة فضول؟"),
];

const HEADER_CRITERIA: &[Criterion] = &[
    criterion("is_visually_appealing", "Is the description visually appealing?", "هل الوصف جذاب بصريًا؟"),
    criterion("is_brand_consistent", "Is it brand consistent?", "هل يتوافق مع العلامة التجارية؟"),
];

const OPENING_LINE_CRITERIA: &[Criterion] = &[
    criterion("is_pattern_interrupt", "Is it a pattern interrupt?", "هل يكسر النمط المعتاد؟"),
    criterion("builds_rapport", "Does it build rapport?", "هل يبني علاقة؟"),
];

const BODY_COPY_CRITERIA: &[Criterion] = &[
    criterion("uses_pas_framework", "Does it use the Pain-Agitate-Solve framework?", "هل يستخدم إطار الألم-الإثارة-الحل؟"),
    criterion("has_clear_value_prop", "Is the value proposition clear?", "هل عرض القيمة واضح؟"),
    criterion("is_benefit_focused", "Is it benefit-focused?", "هل يركز على الفوائد؟"),
];

const SOCIAL_PROOF_CRITERIA: &[Criterion] = &[
    criterion("includes_social_proof", "Does it include social proof?", "هل يتضمن دليلاً اجتماعيًا؟"),
    criterion("is_believable", "Is it believable?", "هل هو قابل للتصديق؟"),
];

const PRIMARY_CTA_CRITERIA: &[Criterion] = &[
    criterion("is_single_clear_goal", "Is it a single, clear goal?", "هل الهدف واحد وواضح؟"),
    criterion("is_action_oriented", "Is it action-oriented?", "هل النص موجه نحو العمل؟"),
    criterion("is_high_contrast", "Is the design description high-contrast?", "هل وصف التصميم عالي التباين؟"),
];

const SECONDARY_CTA_CRITERIA: &[Criterion] = &[
    criterion("is_soft_offer", "Is it a soft offer?", "هل هو عرض بسيط أو بديل؟"),
    criterion("is_low_pressure", "Is it low-pressure?", "هل هو منخفض الضغط؟"),
];

const SIGNATURE_CRITERIA: &[Criterion] = &[
    criterion("is_humanized", "Is it humanized?", "هل التوقيع شخصي؟"),
    criterion("includes_name_brand_title", "Does it include Name, Brand, and Title?", "هل يتضمن الاسم والعلامة التجارية والمنصب؟"),
];

const FOOTER_CRITERIA: &[Criterion] = &[
    criterion("has_unsubscribe_link", "Does it have a clear unsubscribe link?", "هل يحتوي على رابط إلغاء اشتراك واضح؟"),
    criterion("has_legal_info", "Does it include legal and contact info?", "هل يتضمن المعلومات القانونية ومعلومات الاتصال؟"),
];

fn criteria(role: SectionRole) -> &'static [Criterion] {
    match role {
        SectionRole::Preheader => PREHEADER_CRITERIA,
        SectionRole::SubjectLine => SUBJECT_LINE_CRITERIA,
        SectionRole::Header => HEADER_CRITERIA,
        SectionRole::OpeningLine => OPENING_LINE_CRITERIA,
        SectionRole::BodyCopy => BODY_COPY_CRITERIA,
        SectionRole::SocialProof => SOCIAL_PROOF_CRITERIA,
        SectionRole::PrimaryCta => PRIMARY_CTA_CRITERIA,
        SectionRole::SecondaryCta => SECONDARY_CTA_CRITERIA,
        SectionRole::Signature => SIGNATURE_CRITERIA,
        SectionRole::Footer => FOOTER_CRITERIA,
    }
}

fn content_language(lang: Language) -> &'static str {
    match lang {
        Language::Ar => "اللغة العربية",
        Language::En => "English",
    }
}

pub fn generation_prompt(brief: &EmailBrief, lang: Language) -> String {
    let content_lang = content_language(lang);
    let opener = match lang {
        Language::Ar => "أنت كاتب إيميلات تسويقية خبير ومحترف.",
        Language::En => "You are an expert marketing email copywriter.",
    };

    let mut sections = String::new();
    for (idx, role) in SectionRole::ALL.into_iter().enumerate() {
        let items = criteria(role)
            .iter()
            .map(|c| {
                let description = match lang {
                    Language::Ar => c.ar,
                    Language::En => c.en,
                };
                format!(
                    "            {{ \"criterion\": \"{}\", \"description\": \"{}\" }}",
                    c.key, description
                )
            })
            .collect::<Vec<_>>()
            .join(",\n");
        sections.push_str(&format!(
            "{n}. **name**: \"{name}\"\n    - **checklist_criteria**: [\n{items}\n        ]\n",
            n = idx + 1,
            name = role.canonical_name(),
        ));
    }

    format!(
        "{opener} Your task is to create a complete marketing email based on user inputs. You must follow all steps precisely and your output must be in the specified JSON format.\n\
The content for each section must be written in {content_lang}.\n\
\n\
Step 1: Always start by creating a brief pre-generation checklist (3-5 points) that outlines the key steps you will take to create this email.\n\
\n\
Step 2: Generate the email content. For each of the 10 sections below, you must:\n\
1. Write the content for the section in {content_lang}.\n\
2. Evaluate the content you wrote against **every** specified criterion in its checklist. The 'checklist' result must be an **array of objects** with 'criterion' (the English key), 'met' (a boolean you determine) and 'description' (the {content_lang} description).\n\
\n\
User Inputs:\n\
- Product/Service: {product}\n\
- Target Audience: {audience}\n\
- Main Goal/CTA: {goal}\n\
- Main Pain Point: {pain}\n\
- Unique Value Proposition: {value}\n\
- Social Proof: {proof}\n\
- Brand Name: {brand}\n\
- Sender Name: {sender}\n\
- Sender Title: {title}\n\
\n\
---\n\
\n\
Email Sections and their Checklist Criteria:\n\
{sections}\
\n\
---\n\
\n\
Step 3: After creating all sections, conduct a \"Final Review Before Sending\" and evaluate the following points as boolean values. Also suggest an ideal send time.\n\
- mobile_preview: Is the email structure simple enough for a good mobile view?\n\
- links_checked: (Simulated) Do all links appear ready and correct?\n\
- grammar_verified: Is the grammar and spelling correct?\n\
- spam_score_ok: (Simulated) Is the email likely to have a low spam score?\n\
- send_time_suggested: Suggest an ideal day and time to send this email for the target audience.\n\
\n\
Step 4: Combine all the generated text content (from Preheader to Footer) into a single string for the 'full_email_text' field.\n\
\n\
**Very Important: Your entire response must be a single valid JSON object that strictly adheres to the provided schema. Do not add any text or markdown before or after the JSON object.**\n",
        product = brief.product_name,
        audience = brief.audience,
        goal = brief.main_goal,
        pain = brief.pain_point,
        value = brief.value_prop,
        proof = brief.social_proof,
        brand = brief.brand_name,
        sender = brief.sender_name,
        title = brief.sender_title,
    )
}

pub fn improvement_prompt(section: &EmailSection, notes: &str, lang: Language) -> String {
    let content_lang = content_language(lang);
    let notes = notes.trim();
    let feedback = if notes.is_empty() {
        String::new()
    } else {
        match lang {
            Language::Ar => format!(
                "\n\nالمستخدم قدم الملاحظات التالية للتحسين. الرجاء أخذها في الاعتبار:\n\"{notes}\""
            ),
            Language::En => format!(
                "\n\nThe user provided the following feedback for improvement. Please take it into consideration:\n\"{notes}\""
            ),
        }
    };

    let criteria = section
        .checklist
        .iter()
        .map(|item| format!("- {} (criterion: {})", item.description, item.criterion))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are an expert copywriter. Your task is to improve a specific section of a marketing email and re-evaluate its criteria. The improved content and checklist description must be in {content_lang}.\n\
\n\
Current Section:\n\
- Name: \"{name}\"\n\
- Current Content: \"{content}\"\n\
- Evaluation Criteria:\n\
{criteria}\
{feedback}\n\
\n\
Required:\n\
1. Rewrite the \"Current Content\" to make it more persuasive, effective, and impactful. If the user provided feedback, make it your priority.\n\
2. After improving, re-evaluate the new content against **all** the evaluation criteria listed above.\n\
3. Return the result as a single valid JSON object that matches the provided schema. Keep the same 'name'. The 'checklist' must be a complete array of objects, where each object contains 'criterion', 'met', and 'description' (in {content_lang}).\n\
\n\
**Very Important: Your entire response must be a single valid JSON object that strictly adheres to the provided schema. Do not add any text or markdown before or after the JSON object.**\n",
        name = section.name,
        content = section.content,
    )
}

pub fn section_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "name": { "type": "STRING", "description": "The English name of the section as specified in the instructions." },
            "content": { "type": "STRING", "description": "The proposed text for the section." },
            "checklist": {
                "type": "ARRAY",
                "description": "A list of evaluation criteria for this section.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "criterion": { "type": "STRING", "description": "The English criterion (the key)." },
                        "met": { "type": "BOOLEAN", "description": "Whether the criterion was met." },
                        "description": { "type": "STRING", "description": "The description of the criterion in the target language." }
                    },
                    "required": ["criterion", "met", "description"]
                }
            },
            "summary": { "type": "STRING", "description": "A short summary (optional). Return an empty string if no summary." },
            "error": { "type": "STRING", "description": "A description of the error if one exists, or an empty string if there is no error." }
        },
        "required": ["name", "content", "checklist", "summary", "error"]
    })
}

pub fn generation_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "pre_generation_checklist": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "A brief checklist (3-7 points) outlining the main steps for creating and evaluating the email."
            },
            "email_data": {
                "type": "OBJECT",
                "properties": {
                    "sections": { "type": "ARRAY", "items": section_schema() },
                    "final_review": {
                        "type": "OBJECT",
                        "properties": {
                            "mobile_preview": { "type": "BOOLEAN" },
                            "links_checked": { "type": "BOOLEAN" },
                            "grammar_verified": { "type": "BOOLEAN" },
                            "spam_score_ok": { "type": "BOOLEAN" },
                            "send_time_suggested": { "type": "STRING" },
                            "error": { "type": "STRING", "description": "Error description, or empty string." }
                        },
                        "required": ["mobile_preview", "links_checked", "grammar_verified", "spam_score_ok", "send_time_suggested", "error"]
                    },
                    "full_email_text": { "type": "STRING" }
                },
                "required": ["sections", "final_review", "full_email_text"]
            }
        },
        "required": ["pre_generation_checklist", "email_data"]
    })
}
