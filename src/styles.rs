use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::i18n::TextDirection;
use crate::roles::SectionRole;

pub const GLOBAL_STYLES_KEY: &str = "Global Styles";

/// Key of a style override entry: the global tier or one section role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StyleTarget {
    Global,
    Section(SectionRole),
}

impl StyleTarget {
    /// Targets offered for editing, in display order.
    pub const EDITABLE: [StyleTarget; 9] = [
        StyleTarget::Global,
        StyleTarget::Section(SectionRole::Header),
        StyleTarget::Section(SectionRole::OpeningLine),
        StyleTarget::Section(SectionRole::BodyCopy),
        StyleTarget::Section(SectionRole::SocialProof),
        StyleTarget::Section(SectionRole::PrimaryCta),
        StyleTarget::Section(SectionRole::SecondaryCta),
        StyleTarget::Section(SectionRole::Signature),
        StyleTarget::Section(SectionRole::Footer),
    ];

    pub fn key(self) -> &'static str {
        match self {
            StyleTarget::Global => GLOBAL_STYLES_KEY,
            StyleTarget::Section(role) => role.style_key(),
        }
    }
}

impl fmt::Display for StyleTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for StyleTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case(GLOBAL_STYLES_KEY) || trimmed.eq_ignore_ascii_case("global")
        {
            return Ok(StyleTarget::Global);
        }
        SectionRole::recognize(trimmed)
            .map(StyleTarget::Section)
            .ok_or_else(|| {
                let known = StyleTarget::EDITABLE
                    .iter()
                    .map(|t| t.key())
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("unknown style target: {s:?} (known: {known})")
            })
    }
}

impl TryFrom<String> for StyleTarget {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StyleTarget> for String {
    fn from(value: StyleTarget) -> Self {
        value.key().to_owned()
    }
}

/// Sparse user override for one target. `None` and `Some("")` both mean "inherit".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
}

impl StyleOverride {
    /// Set properties as `(camelCaseName, value)`, skipping empty values.
    pub fn properties(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        [
            ("fontFamily", &self.font_family),
            ("fontSize", &self.font_size),
            ("fontWeight", &self.font_weight),
            ("fontStyle", &self.font_style),
            ("color", &self.color),
            ("backgroundColor", &self.background_color),
        ]
        .into_iter()
        .filter_map(|(name, value)| {
            let value = value.as_deref()?.trim();
            (!value.is_empty()).then_some((name, value))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.properties().next().is_none()
    }

    /// Applies `patch` on top of `self`: set values replace, empty values clear.
    pub fn apply(&mut self, patch: &StyleOverride) {
        fn merge(slot: &mut Option<String>, patch: &Option<String>) {
            match patch.as_deref().map(str::trim) {
                Some("") => *slot = None,
                Some(value) => *slot = Some(value.to_owned()),
                None => {}
            }
        }

        merge(&mut self.font_family, &patch.font_family);
        merge(&mut self.font_size, &patch.font_size);
        merge(&mut self.font_weight, &patch.font_weight);
        merge(&mut self.font_style, &patch.font_style);
        merge(&mut self.color, &patch.color);
        merge(&mut self.background_color, &patch.background_color);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleOverrides(BTreeMap<StyleTarget, StyleOverride>);

impl StyleOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, target: StyleTarget) -> Option<&StyleOverride> {
        self.0.get(&target)
    }

    pub fn insert(&mut self, target: StyleTarget, style: StyleOverride) {
        self.0.insert(target, style);
    }

    /// Merges `patch` into the entry for `target`; entries left empty are dropped.
    pub fn update(&mut self, target: StyleTarget, patch: &StyleOverride) {
        let entry = self.0.entry(target).or_default();
        entry.apply(patch);
        if entry.is_empty() {
            self.0.remove(&target);
        }
    }

    pub fn reset(&mut self, target: StyleTarget) {
        self.0.remove(&target);
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(StyleOverride::is_empty)
    }

    pub fn iter(&self) -> impl Iterator<Item = (StyleTarget, &StyleOverride)> + '_ {
        self.0.iter().map(|(target, style)| (*target, style))
    }
}

/// Ordered CSS declarations keyed by camelCase property name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Style {
    decls: Vec<(String, String)>,
}

impl Style {
    fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        let mut style = Self::default();
        for (name, value) in pairs {
            style.set(name, value);
        }
        style
    }

    /// Sets `name`, keeping its original position when already present. Empty values are ignored.
    pub fn set(&mut self, name: &str, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        match self.decls.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = value.to_owned(),
            None => self.decls.push((name.to_owned(), value.to_owned())),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.decls
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    fn apply(&mut self, layer: Option<&StyleOverride>) {
        let Some(layer) = layer else {
            return;
        };
        for (name, value) in layer.properties() {
            self.set(name, value);
        }
    }

    /// Serializes as `kebab-name: value;` declarations separated by spaces.
    pub fn to_inline_css(&self) -> String {
        self.decls
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(name, value)| format!("{}: {};", css_property_name(name), value))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// `backgroundColor` -> `background-color`.
pub fn css_property_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Element classes of the exported document that carry their own inline style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StructuralRole {
    Body,
    Card,
    Paragraph,
    OpeningLine,
    Signature,
    Button,
    SecondaryLink,
    Footer,
    Header,
    SocialProof,
    Preheader,
}

impl StructuralRole {
    pub const ALL: [StructuralRole; 11] = [
        StructuralRole::Body,
        StructuralRole::Card,
        StructuralRole::Paragraph,
        StructuralRole::OpeningLine,
        StructuralRole::Signature,
        StructuralRole::Button,
        StructuralRole::SecondaryLink,
        StructuralRole::Footer,
        StructuralRole::Header,
        StructuralRole::SocialProof,
        StructuralRole::Preheader,
    ];

    /// Section whose override applies on top of the global tier.
    pub fn override_target(self) -> Option<SectionRole> {
        match self {
            StructuralRole::Paragraph => Some(SectionRole::BodyCopy),
            StructuralRole::OpeningLine => Some(SectionRole::OpeningLine),
            StructuralRole::Signature => Some(SectionRole::Signature),
            StructuralRole::Button => Some(SectionRole::PrimaryCta),
            StructuralRole::SecondaryLink => Some(SectionRole::SecondaryCta),
            StructuralRole::Footer => Some(SectionRole::Footer),
            StructuralRole::Header => Some(SectionRole::Header),
            StructuralRole::SocialProof => Some(SectionRole::SocialProof),
            StructuralRole::Body | StructuralRole::Card | StructuralRole::Preheader => None,
        }
    }

    fn is_stylable(self) -> bool {
        self != StructuralRole::Preheader
    }

    pub fn default_style(self, dir: TextDirection) -> Style {
        match self {
            StructuralRole::Body => Style::from_pairs(&[
                ("fontFamily", DEFAULT_FONT_STACK),
                ("margin", "0"),
                ("padding", "0"),
                ("backgroundColor", "#f4f4f4"),
                ("direction", dir.as_str()),
                ("color", "#333333"),
            ]),
            StructuralRole::Card => Style::from_pairs(&[
                ("padding", "20px"),
                ("borderRadius", "8px"),
                ("backgroundColor", "#ffffff"),
            ]),
            StructuralRole::Paragraph
            | StructuralRole::OpeningLine
            | StructuralRole::Signature => Style::from_pairs(&[
                ("margin", "0 0 16px 0"),
                ("lineHeight", "1.6"),
                ("fontSize", "16px"),
            ]),
            StructuralRole::Button => Style::from_pairs(&[
                ("display", "inline-block"),
                ("backgroundColor", "#34495e"),
                ("color", "#ffffff"),
                ("textDecoration", "none"),
                ("padding", "12px 24px"),
                ("borderRadius", "5px"),
                ("fontWeight", "bold"),
            ]),
            StructuralRole::SecondaryLink => Style::from_pairs(&[
                ("color", "#34495e"),
                ("textDecoration", "underline"),
            ]),
            StructuralRole::Footer => Style::from_pairs(&[
                ("backgroundColor", "#f4f4f4"),
                ("padding", "20px"),
                ("textAlign", "center"),
                ("fontSize", "12px"),
                ("color", "#777777"),
            ]),
            StructuralRole::Header => Style::from_pairs(&[
                ("paddingBottom", "20px"),
                ("textAlign", "center"),
                ("fontStyle", "italic"),
                ("color", "#888888"),
                ("borderBottom", "1px solid #eeeeee"),
                ("marginBottom", "20px"),
            ]),
            StructuralRole::SocialProof => Style::from_pairs(&[
                ("fontStyle", "italic"),
                ("borderLeft", "3px solid #cccccc"),
                ("paddingLeft", "15px"),
                ("marginBottom", "16px"),
            ]),
            // Several email clients ignore `display: none` alone.
            StructuralRole::Preheader => Style::from_pairs(&[
                ("display", "none !important"),
                ("visibility", "hidden"),
                ("opacity", "0"),
                ("color", "transparent"),
                ("height", "0"),
                ("width", "0"),
                ("maxHeight", "0"),
                ("maxWidth", "0"),
                ("overflow", "hidden"),
                ("msoHide", "all"),
            ]),
        }
    }
}

pub const DEFAULT_FONT_STACK: &str = "-apple-system, BlinkMacSystemFont, 'Segoe UI', 'Roboto', 'Oxygen', 'Ubuntu', 'Cantarell', 'Fira Sans', 'Droid Sans', 'Helvetica Neue', sans-serif";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStyles {
    styles: BTreeMap<StructuralRole, Style>,
}

impl ResolvedStyles {
    pub fn get(&self, role: StructuralRole) -> &Style {
        // Every role is populated by `resolve`.
        &self.styles[&role]
    }

    pub fn css(&self, role: StructuralRole) -> String {
        self.get(role).to_inline_css()
    }
}

/// Runs the default < global < per-role cascade for every structural role.
pub fn resolve(overrides: &StyleOverrides, dir: TextDirection) -> ResolvedStyles {
    let global = overrides.get(StyleTarget::Global);

    let styles = StructuralRole::ALL
        .into_iter()
        .map(|role| {
            let mut style = role.default_style(dir);
            if role.is_stylable() {
                style.apply(global);
                if let Some(section) = role.override_target() {
                    style.apply(overrides.get(StyleTarget::Section(section)));
                }
            }
            (role, style)
        })
        .collect();

    ResolvedStyles { styles }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn color(value: &str) -> StyleOverride {
        StyleOverride {
            color: Some(value.to_owned()),
            ..StyleOverride::default()
        }
    }

    #[test]
    fn empty_overrides_resolve_to_defaults() {
        let resolved = resolve(&StyleOverrides::new(), TextDirection::Ltr);
        for role in StructuralRole::ALL {
            assert_eq!(resolved.get(role), &role.default_style(TextDirection::Ltr));
        }
    }

    #[test]
    fn global_property_propagates_to_every_stylable_role() {
        let mut overrides = StyleOverrides::new();
        overrides.insert(StyleTarget::Global, color("#101010"));

        let resolved = resolve(&overrides, TextDirection::Ltr);
        for role in StructuralRole::ALL {
            if role == StructuralRole::Preheader {
                assert_eq!(resolved.get(role).get("color"), Some("transparent"));
                continue;
            }
            assert_eq!(resolved.get(role).get("color"), Some("#101010"), "{role:?}");
        }
    }

    #[test]
    fn role_override_wins_and_does_not_leak() {
        let mut overrides = StyleOverrides::new();
        overrides.insert(StyleTarget::Global, color("#101010"));
        overrides.insert(StyleTarget::Section(SectionRole::Footer), color("#ff0000"));

        let resolved = resolve(&overrides, TextDirection::Ltr);
        assert_eq!(
            resolved.get(StructuralRole::Footer).get("color"),
            Some("#ff0000")
        );
        assert_eq!(
            resolved.get(StructuralRole::Paragraph).get("color"),
            Some("#101010")
        );
        assert_eq!(
            resolved.get(StructuralRole::Button).get("color"),
            Some("#101010")
        );
    }

    #[test]
    fn empty_string_override_behaves_like_absent() {
        let mut with_empty = StyleOverrides::new();
        with_empty.insert(
            StyleTarget::Global,
            StyleOverride {
                color: Some(String::new()),
                background_color: Some("  ".to_owned()),
                ..StyleOverride::default()
            },
        );
        with_empty.insert(StyleTarget::Section(SectionRole::PrimaryCta), color(""));

        assert_eq!(
            resolve(&with_empty, TextDirection::Rtl),
            resolve(&StyleOverrides::new(), TextDirection::Rtl)
        );
    }

    #[test]
    fn overrides_equal_to_defaults_change_nothing() {
        let mut overrides = StyleOverrides::new();
        overrides.insert(
            StyleTarget::Section(SectionRole::PrimaryCta),
            StyleOverride {
                background_color: Some("#34495e".to_owned()),
                color: Some("#ffffff".to_owned()),
                font_weight: Some("bold".to_owned()),
                ..StyleOverride::default()
            },
        );
        overrides.insert(
            StyleTarget::Section(SectionRole::Footer),
            StyleOverride {
                background_color: Some("#f4f4f4".to_owned()),
                color: Some("#777777".to_owned()),
                font_size: Some("12px".to_owned()),
                ..StyleOverride::default()
            },
        );

        assert_eq!(
            resolve(&overrides, TextDirection::Ltr),
            resolve(&StyleOverrides::new(), TextDirection::Ltr)
        );
    }

    #[test]
    fn inline_css_uses_kebab_case_and_skips_empty_values() {
        let mut style = Style::default();
        style.set("backgroundColor", "#fff");
        style.set("fontSize", "");
        style.set("msoHide", "all");
        assert_eq!(style.to_inline_css(), "background-color: #fff; mso-hide: all;");
    }

    #[test]
    fn resolved_css_never_contains_empty_declarations() {
        let mut overrides = StyleOverrides::new();
        overrides.insert(StyleTarget::Global, color(""));
        let resolved = resolve(&overrides, TextDirection::Ltr);
        for role in StructuralRole::ALL {
            let css = resolved.css(role);
            assert!(!css.contains(": ;"), "{role:?}: {css}");
        }
    }

    #[test]
    fn new_override_properties_are_appended_after_defaults() {
        let mut overrides = StyleOverrides::new();
        overrides.insert(
            StyleTarget::Section(SectionRole::SecondaryCta),
            StyleOverride {
                font_family: Some("Georgia, serif".to_owned()),
                ..StyleOverride::default()
            },
        );
        let resolved = resolve(&overrides, TextDirection::Ltr);
        assert_eq!(
            resolved.css(StructuralRole::SecondaryLink),
            "color: #34495e; text-decoration: underline; font-family: Georgia, serif;"
        );
    }

    #[test]
    fn update_clears_properties_with_empty_values() {
        let mut overrides = StyleOverrides::new();
        overrides.update(StyleTarget::Global, &color("#123456"));
        assert!(!overrides.is_empty());

        overrides.update(StyleTarget::Global, &color(""));
        assert!(overrides.get(StyleTarget::Global).is_none());
        assert!(overrides.is_empty());
    }

    #[test]
    fn style_targets_round_trip_through_json_keys() -> anyhow::Result<()> {
        let raw = r##"{
            "Global Styles": {"fontSize": "18px"},
            "Social Proof / Micro-Story / Case Snippet": {"fontStyle": "normal"},
            "Call-to-Action": {"backgroundColor": "#000000", "padding": "ignored"}
        }"##;
        let overrides: StyleOverrides = serde_json::from_str(raw)?;
        assert_eq!(
            overrides
                .get(StyleTarget::Global)
                .and_then(|s| s.font_size.as_deref()),
            Some("18px")
        );
        assert_eq!(
            overrides
                .get(StyleTarget::Section(SectionRole::SocialProof))
                .and_then(|s| s.font_style.as_deref()),
            Some("normal")
        );

        let json = serde_json::to_value(&overrides)?;
        assert!(json.get("Call-to-Action").is_some());
        assert!(json.pointer("/Call-to-Action/padding").is_none());
        Ok(())
    }

    #[test]
    fn style_target_parse_rejects_unknown_names() {
        assert_eq!("global".parse::<StyleTarget>(), Ok(StyleTarget::Global));
        assert_eq!(
            "Footer".parse::<StyleTarget>(),
            Ok(StyleTarget::Section(SectionRole::Footer))
        );
        assert!("Sidebar".parse::<StyleTarget>().is_err());
    }
}
