use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::gemini;
use crate::i18n::{Language, TextDirection};
use crate::styles::{StyleOverride, StyleTarget};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Directory holding persisted settings (default: $EMAILFORGE_HOME or the user config dir).
    #[arg(long, global = true)]
    pub state_dir: Option<PathBuf>,

    /// Directory containing `ar.json` and `en.json` translations.
    #[arg(long, global = true, default_value = "locales")]
    pub locales_dir: PathBuf,

    /// Content and UI language (default: the stored preference).
    #[arg(long, global = true, value_enum)]
    pub lang: Option<Language>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a new ten-section email draft.
    Generate(GenerateArgs),
    /// Rewrite one section of an existing draft.
    Improve(ImproveArgs),
    /// Print a draft with its checklists and final review.
    Show(ShowArgs),
    /// Save a draft as plain text or HTML.
    Export(ExportArgs),
    /// Inspect or edit HTML export style overrides.
    Styles {
        #[command(subcommand)]
        command: StylesCommand,
    },
    /// Manage the stored API key and language.
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Debug, Args)]
pub struct ModelArgs {
    /// Gemini model name.
    #[arg(long, default_value = gemini::DEFAULT_MODEL)]
    pub model: String,

    /// Gemini API base URL.
    #[arg(long, default_value = gemini::DEFAULT_BASE_URL)]
    pub gemini_base_url: String,
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Output path for the draft JSON.
    #[arg(long)]
    pub out: PathBuf,

    /// Replace an existing draft.
    #[arg(long, default_value_t = false)]
    pub force: bool,

    #[arg(long)]
    pub product: String,

    #[arg(long)]
    pub audience: String,

    /// Main goal / call to action.
    #[arg(long)]
    pub goal: String,

    #[arg(long, default_value = "")]
    pub pain_point: String,

    #[arg(long, default_value = "")]
    pub value_prop: String,

    #[arg(long, default_value = "")]
    pub social_proof: String,

    #[arg(long)]
    pub brand: String,

    #[arg(long, default_value = "")]
    pub sender_name: String,

    #[arg(long, default_value = "")]
    pub sender_title: String,

    #[command(flatten)]
    pub model: ModelArgs,
}

#[derive(Debug, Args)]
pub struct ImproveArgs {
    /// Draft JSON created by `generate`.
    #[arg(long)]
    pub draft: PathBuf,

    /// Zero-based section index (see `show`).
    #[arg(long)]
    pub index: usize,

    /// Optional feedback for the rewrite.
    #[arg(long, default_value = "")]
    pub notes: String,

    #[command(flatten)]
    pub model: ModelArgs,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    #[arg(long)]
    pub draft: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Txt,
    Html,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[arg(long)]
    pub draft: PathBuf,

    #[arg(long, value_enum)]
    pub format: ExportFormat,

    /// Output file path.
    #[arg(long)]
    pub out: PathBuf,

    /// Text direction for HTML (default: derived from the language).
    #[arg(long, value_enum)]
    pub dir: Option<TextDirection>,

    /// Overwrite an existing output file.
    #[arg(long, default_value_t = false)]
    pub force: bool,
}

#[derive(Debug, Subcommand)]
pub enum StylesCommand {
    /// Print stored overrides as YAML.
    Show,
    /// Merge properties into one target. An empty value clears that property.
    Set(StylesSetArgs),
    /// Drop overrides for one target, or all of them.
    Reset(StylesResetArgs),
}

#[derive(Debug, Args)]
pub struct StylesSetArgs {
    /// "Global Styles" or a section label such as "Footer" or "Call-to-Action".
    #[arg(long)]
    pub target: StyleTarget,

    #[arg(long)]
    pub font_family: Option<String>,

    #[arg(long)]
    pub font_size: Option<String>,

    #[arg(long)]
    pub font_weight: Option<String>,

    #[arg(long)]
    pub font_style: Option<String>,

    #[arg(long)]
    pub color: Option<String>,

    #[arg(long)]
    pub background_color: Option<String>,
}

impl StylesSetArgs {
    pub fn patch(&self) -> StyleOverride {
        StyleOverride {
            font_family: self.font_family.clone(),
            font_size: self.font_size.clone(),
            font_weight: self.font_weight.clone(),
            font_style: self.font_style.clone(),
            color: self.color.clone(),
            background_color: self.background_color.clone(),
        }
    }
}

#[derive(Debug, Args)]
pub struct StylesResetArgs {
    #[arg(long)]
    pub target: Option<StyleTarget>,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print where settings live and what is set.
    Show,
    SetApiKey {
        key: String,
    },
    ClearApiKey,
    SetLanguage {
        #[arg(value_enum)]
        language: Language,
    },
}

impl Command {
    /// Subcommand name for logs; arguments may carry secrets.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Generate(_) => "generate",
            Command::Improve(_) => "improve",
            Command::Show(_) => "show",
            Command::Export(_) => "export",
            Command::Styles { .. } => "styles",
            Command::Config { .. } => "config",
        }
    }
}
