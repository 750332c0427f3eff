use std::path::PathBuf;

use anyhow::Context as _;

use crate::cli::{
    Cli, Command, ConfigCommand, ExportArgs, GenerateArgs, GlobalArgs, ImproveArgs, ModelArgs,
    ShowArgs, StylesCommand, StylesResetArgs, StylesSetArgs,
};
use crate::draft;
use crate::export;
use crate::formats::EmailBrief;
use crate::gemini::{GeminiConfig, GeminiModel};
use crate::i18n::{Language, Translator};
use crate::session::Session;
use crate::settings::{self, Settings};
use crate::styles::{StyleOverride, StyleOverrides};

/// Resolved per-invocation state shared by every subcommand.
struct Context {
    state_dir: PathBuf,
    settings: Settings,
    language: Language,
    translator: Translator,
}

impl Context {
    async fn open(global: &GlobalArgs) -> anyhow::Result<Self> {
        let state_dir = settings::resolve_state_dir(global.state_dir.as_deref())?;
        let settings = Settings::new(&state_dir);
        let language = match global.lang {
            Some(lang) => lang,
            None => settings.language().await,
        };
        let translator = Translator::load(&global.locales_dir, language);
        tracing::debug!(
            state_dir = %state_dir.display(),
            language = language.code(),
            "resolved context"
        );
        Ok(Self {
            state_dir,
            settings,
            language,
            translator,
        })
    }

    /// Builds the model client, refusing to go further without a credential.
    async fn model(&self, args: &ModelArgs) -> anyhow::Result<GeminiModel> {
        let Some(api_key) = self.settings.api_key().await? else {
            anyhow::bail!(
                "{} (run `emailforge config set-api-key <KEY>` or set {})",
                self.translator.t("errors.apiKeyMissing"),
                settings::API_KEY_ENV
            );
        };
        GeminiModel::new(GeminiConfig {
            base_url: args.gemini_base_url.clone(),
            model: args.model.clone(),
            api_key,
        })
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = Context::open(&cli.global).await?;
    match cli.command {
        Command::Generate(args) => generate(&ctx, args).await.context("generate"),
        Command::Improve(args) => improve(&ctx, args).await.context("improve"),
        Command::Show(args) => show(&ctx, args).await.context("show"),
        Command::Export(args) => export(&ctx, args).await.context("export"),
        Command::Styles { command } => styles(&ctx, command).await.context("styles"),
        Command::Config { command } => config(&ctx, command).await.context("config"),
    }
}

async fn generate(ctx: &Context, args: GenerateArgs) -> anyhow::Result<()> {
    if args.out.exists() && !args.force {
        anyhow::bail!("draft already exists: {}", args.out.display());
    }
    let model = ctx.model(&args.model).await?;

    let brief = EmailBrief {
        product_name: args.product,
        audience: args.audience,
        main_goal: args.goal,
        pain_point: args.pain_point,
        value_prop: args.value_prop,
        social_proof: args.social_proof,
        brand_name: args.brand,
        sender_name: args.sender_name,
        sender_title: args.sender_title,
    };
    tracing::info!(
        out = %args.out.display(),
        model = %args.model.model,
        language = ctx.language.code(),
        "generate email"
    );

    draft::discard(&args.out).await?;
    let mut session = Session::new(model, ctx.translator.clone());
    let generated = session.generate(&brief).await?;
    draft::save(&args.out, generated).await?;

    print!("{}", draft::render_summary(generated, &ctx.translator));
    Ok(())
}

async fn improve(ctx: &Context, args: ImproveArgs) -> anyhow::Result<()> {
    let current = draft::load(&args.draft).await?;
    let model = ctx.model(&args.model).await?;
    tracing::info!(
        draft = %args.draft.display(),
        index = args.index,
        model = %args.model.model,
        "improve section"
    );

    let mut session = Session::new(model, ctx.translator.clone()).with_draft(current);
    let section = session.improve(args.index, &args.notes).await?;
    println!("[{}] {}", args.index, section.name);
    println!("{}", section.content);

    let Some(updated) = session.draft() else {
        anyhow::bail!("draft missing after improvement");
    };
    draft::save(&args.draft, updated).await
}

async fn show(ctx: &Context, args: ShowArgs) -> anyhow::Result<()> {
    let current = draft::load(&args.draft).await?;
    print!("{}", draft::render_summary(&current, &ctx.translator));
    Ok(())
}

async fn export(ctx: &Context, args: ExportArgs) -> anyhow::Result<()> {
    let current = draft::load(&args.draft).await?;
    let dir = args.dir.unwrap_or_else(|| ctx.language.direction());
    let overrides = ctx.settings.html_styles().await;
    export::run(&args, &current.email, dir, &overrides)?;
    println!("{}", args.out.display());
    Ok(())
}

async fn styles(ctx: &Context, command: StylesCommand) -> anyhow::Result<()> {
    match command {
        StylesCommand::Show => {
            let overrides = ctx.settings.html_styles().await;
            print!("{}", styles_yaml(&overrides)?);
        }
        StylesCommand::Set(args) => styles_set(ctx, &args).await?,
        StylesCommand::Reset(args) => styles_reset(ctx, &args).await?,
    }
    Ok(())
}

fn styles_yaml(overrides: &StyleOverrides) -> anyhow::Result<String> {
    if overrides.is_empty() {
        return Ok("{}\n".to_owned());
    }
    serde_yaml::to_string(overrides).context("serialize style overrides")
}

async fn styles_set(ctx: &Context, args: &StylesSetArgs) -> anyhow::Result<()> {
    let patch = args.patch();
    if patch == StyleOverride::default() {
        anyhow::bail!("nothing to set; pass at least one property flag");
    }
    let mut overrides = ctx.settings.html_styles().await;
    overrides.update(args.target, &patch);
    ctx.settings.html_styles.save(&overrides).await?;
    tracing::info!(style_target = %args.target, "style override updated");
    Ok(())
}

async fn styles_reset(ctx: &Context, args: &StylesResetArgs) -> anyhow::Result<()> {
    match args.target {
        Some(target) => {
            let mut overrides = ctx.settings.html_styles().await;
            overrides.reset(target);
            ctx.settings.html_styles.save(&overrides).await?;
            tracing::info!(style_target = %target, "style override reset");
        }
        None => {
            ctx.settings.html_styles.clear().await?;
            tracing::info!("all style overrides reset");
        }
    }
    Ok(())
}

async fn config(ctx: &Context, command: ConfigCommand) -> anyhow::Result<()> {
    match command {
        ConfigCommand::Show => {
            let key_source = if std::env::var(settings::API_KEY_ENV)
                .is_ok_and(|key| !key.trim().is_empty())
            {
                settings::API_KEY_ENV
            } else if ctx.settings.api_key.load().await?.is_some() {
                "stored"
            } else {
                "missing"
            };
            println!("state_dir: {}", ctx.state_dir.display());
            println!("language: {}", ctx.language.code());
            println!("api_key: {key_source}");
            println!(
                "html_styles: {}",
                if ctx.settings.html_styles().await.is_empty() {
                    "default"
                } else {
                    "customized"
                }
            );
        }
        ConfigCommand::SetApiKey { key } => {
            ctx.settings.set_api_key(&key).await?;
            tracing::info!(path = %ctx.settings.api_key.path().display(), "api key stored");
        }
        ConfigCommand::ClearApiKey => {
            ctx.settings.api_key.clear().await?;
            tracing::info!("api key cleared");
        }
        ConfigCommand::SetLanguage { language } => {
            ctx.settings.set_language(language).await?;
            tracing::info!(language = language.code(), "language stored");
        }
    }
    Ok(())
}
