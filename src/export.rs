use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::Path;

use anyhow::Context as _;

use crate::cli::{ExportArgs, ExportFormat};
use crate::formats::EmailResult;
use crate::html::render_email_html;
use crate::i18n::TextDirection;
use crate::styles::StyleOverrides;

/// Renders the export payload for `format`.
pub fn render(
    format: ExportFormat,
    result: &EmailResult,
    dir: TextDirection,
    overrides: &StyleOverrides,
) -> String {
    match format {
        ExportFormat::Txt => result.full_email_text.clone(),
        ExportFormat::Html => render_email_html(result, dir, overrides),
    }
}

pub fn run(
    args: &ExportArgs,
    result: &EmailResult,
    dir: TextDirection,
    overrides: &StyleOverrides,
) -> anyhow::Result<()> {
    tracing::info!(
        format = ?args.format,
        dir = dir.as_str(),
        out = %args.out.display(),
        "export email"
    );
    let contents = render(args.format, result, dir, overrides);
    write_output(&args.out, &contents, args.force)
}

pub fn write_output(path: &Path, contents: &str, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("export output already exists: {}", path.display());
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create export output dir: {}", parent.display()))?;
    }

    let mut options = OpenOptions::new();
    options.write(true);
    if force {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }
    let mut file = options
        .open(path)
        .with_context(|| format!("open output: {}", path.display()))?;
    file.write_all(contents.as_bytes())
        .with_context(|| format!("write output: {}", path.display()))?;
    file.flush()
        .with_context(|| format!("flush output: {}", path.display()))?;
    Ok(())
}
