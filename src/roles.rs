use std::fmt;

use crate::formats::EmailSection;

/// The ten semantic slots a generated email is decomposed into, in generation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SectionRole {
    Preheader,
    SubjectLine,
    Header,
    OpeningLine,
    BodyCopy,
    SocialProof,
    PrimaryCta,
    SecondaryCta,
    Signature,
    Footer,
}

impl SectionRole {
    pub const ALL: [SectionRole; 10] = [
        SectionRole::Preheader,
        SectionRole::SubjectLine,
        SectionRole::Header,
        SectionRole::OpeningLine,
        SectionRole::BodyCopy,
        SectionRole::SocialProof,
        SectionRole::PrimaryCta,
        SectionRole::SecondaryCta,
        SectionRole::Signature,
        SectionRole::Footer,
    ];

    /// Prefix that identifies this role in a model-generated section name.
    pub fn label(self) -> &'static str {
        match self {
            SectionRole::Preheader => "Preheader",
            SectionRole::SubjectLine => "Subject Line",
            SectionRole::Header => "Header Image",
            SectionRole::OpeningLine => "Opening Line",
            SectionRole::BodyCopy => "Body Copy",
            SectionRole::SocialProof => "Social Proof",
            SectionRole::PrimaryCta => "Call-to-Action",
            SectionRole::SecondaryCta => "Secondary CTA",
            SectionRole::Signature => "Signature Block",
            SectionRole::Footer => "Footer",
        }
    }

    /// Full section name the model is asked to emit.
    pub fn canonical_name(self) -> &'static str {
        match self {
            SectionRole::Preheader => "Preheader / Preview Text",
            SectionRole::SubjectLine => "Subject Line (Hook-Based, Personalised, Curiosity Gap)",
            SectionRole::Header => "Header Image or Clean Hero Section",
            SectionRole::OpeningLine => "Opening Line (Pattern Interrupt / Rapport Builder)",
            SectionRole::BodyCopy => "Body Copy (Value Proposition + Pain-Agitate-Solve)",
            SectionRole::SocialProof => "Social Proof / Micro-Story / Case Snippet",
            SectionRole::PrimaryCta => "Call-to-Action (Primary CTA – One Clear Goal)",
            SectionRole::SecondaryCta => "Secondary CTA (Soft Offer / PS-CTA)",
            SectionRole::Signature => "Signature Block (Humanised – Name + Brand + Title)",
            SectionRole::Footer => "Footer (Compliance + Unsubscribe + Legal Info)",
        }
    }

    /// Key under which style overrides for this role are stored.
    pub fn style_key(self) -> &'static str {
        match self {
            SectionRole::Header => "Header Image or Clean Hero Section",
            SectionRole::SocialProof => "Social Proof / Micro-Story / Case Snippet",
            other => other.label(),
        }
    }

    /// Returns the first role whose label is a prefix of `name`.
    pub fn recognize(name: &str) -> Option<SectionRole> {
        Self::ALL
            .into_iter()
            .find(|role| name.starts_with(role.label()))
    }
}

impl fmt::Display for SectionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// First section whose name starts with `label`, if any.
pub fn find_section<'a>(sections: &'a [EmailSection], label: &str) -> Option<&'a EmailSection> {
    sections.iter().find(|s| s.name.starts_with(label))
}

/// Content of the first section matching `role`, or empty when the role is missing.
pub fn role_content(sections: &[EmailSection], role: SectionRole) -> &str {
    find_section(sections, role.label())
        .map(|s| s.content.as_str())
        .unwrap_or("")
}
