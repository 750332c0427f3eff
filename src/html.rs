use crate::formats::EmailResult;
use crate::i18n::TextDirection;
use crate::roles::{SectionRole, role_content};
use crate::styles::{DEFAULT_FONT_STACK, StructuralRole, StyleOverrides, resolve};

pub const FALLBACK_SUBJECT: &str = "Your Email Subject";
pub const MAX_CONTENT_WIDTH_PX: u32 = 600;

/// Builds a standalone, inline-styled HTML document for email clients.
///
/// Missing sections degrade to empty text; the optional header, social proof and CTA
/// blocks are left out entirely when their content is empty.
pub fn render_email_html(
    result: &EmailResult,
    dir: TextDirection,
    overrides: &StyleOverrides,
) -> String {
    let sections = &result.sections;
    let content = |role| role_content(sections, role);

    let subject = match content(SectionRole::SubjectLine) {
        "" => FALLBACK_SUBJECT,
        subject => subject,
    };

    let styles = resolve(overrides, dir);
    let font_family = styles
        .get(StructuralRole::Body)
        .get("fontFamily")
        .unwrap_or(DEFAULT_FONT_STACK)
        .to_owned();

    let wrapper_style = "width: 100%; table-layout: fixed; -webkit-text-size-adjust: 100%; -ms-text-size-adjust: 100%;";
    let outer_table_style = format!(
        "margin: 0 auto; width: 100%; max-width: {MAX_CONTENT_WIDTH_PX}px; border-spacing: 0; font-family: {font_family};"
    );

    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n");
    out.push_str(&format!(
        "<html lang=\"{}\" dir=\"{}\">\n",
        dir.lang(),
        dir.as_str()
    ));
    out.push_str("<head>\n");
    out.push_str("  <meta charset=\"UTF-8\">\n");
    out.push_str(
        "  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    out.push_str(&format!("  <title>{}</title>\n", html_escape(subject)));
    out.push_str("</head>\n");
    out.push_str(&format!(
        "<body style=\"{}\">\n",
        attr_escape(&styles.css(StructuralRole::Body))
    ));
    out.push_str(&format!(
        "  <span style=\"{}\">{}</span>\n",
        attr_escape(&styles.css(StructuralRole::Preheader)),
        html_escape(content(SectionRole::Preheader))
    ));
    out.push_str(&format!(
        "  <div dir=\"{}\" style=\"{}\">\n",
        dir.as_str(),
        wrapper_style
    ));
    out.push_str(&format!(
        "    <table role=\"presentation\" width=\"100%\" cellpadding=\"0\" cellspacing=\"0\" style=\"{}\">\n",
        attr_escape(&outer_table_style)
    ));
    out.push_str("      <tr>\n");
    out.push_str("        <td style=\"padding: 20px;\">\n");
    out.push_str("          <table role=\"presentation\" width=\"100%\" cellpadding=\"0\" cellspacing=\"0\" style=\"border-spacing: 0;\">\n");
    out.push_str("            <tr>\n");
    out.push_str(&format!(
        "              <td style=\"{}\">\n",
        attr_escape(&styles.css(StructuralRole::Card))
    ));

    let header = content(SectionRole::Header);
    if !header.is_empty() {
        out.push_str(&format!(
            "                <div style=\"{}\">{}</div>\n",
            attr_escape(&styles.css(StructuralRole::Header)),
            text_to_html(header)
        ));
    }

    out.push_str(&format!(
        "                <p style=\"{}\">{}</p>\n",
        attr_escape(&styles.css(StructuralRole::OpeningLine)),
        text_to_html(content(SectionRole::OpeningLine))
    ));
    out.push_str(&format!(
        "                <p style=\"{}\">{}</p>\n",
        attr_escape(&styles.css(StructuralRole::Paragraph)),
        text_to_html(content(SectionRole::BodyCopy))
    ));

    let social_proof = content(SectionRole::SocialProof);
    if !social_proof.is_empty() {
        out.push_str(&format!(
            "                <p style=\"{}\">{}</p>\n",
            attr_escape(&styles.css(StructuralRole::SocialProof)),
            text_to_html(social_proof)
        ));
    }

    for (role, structural) in [
        (SectionRole::PrimaryCta, StructuralRole::Button),
        (SectionRole::SecondaryCta, StructuralRole::SecondaryLink),
    ] {
        let cta = content(role);
        if cta.is_empty() {
            continue;
        }
        out.push_str(&format!(
            "                <p style=\"text-align: center; margin: 24px 0;\"><a href=\"#\" style=\"{}\">{}</a></p>\n",
            attr_escape(&styles.css(structural)),
            text_to_html(cta)
        ));
    }

    out.push_str(&format!(
        "                <div style=\"{}\">{}</div>\n",
        attr_escape(&styles.css(StructuralRole::Signature)),
        text_to_html(content(SectionRole::Signature))
    ));
    out.push_str("              </td>\n");
    out.push_str("            </tr>\n");
    out.push_str("            <tr>\n");
    out.push_str(&format!(
        "              <td style=\"{}\">{}</td>\n",
        attr_escape(&styles.css(StructuralRole::Footer)),
        text_to_html(content(SectionRole::Footer))
    ));
    out.push_str("            </tr>\n");
    out.push_str("          </table>\n");
    out.push_str("        </td>\n");
    out.push_str("      </tr>\n");
    out.push_str("    </table>\n");
    out.push_str("  </div>\n");
    out.push_str("</body>\n");
    out.push_str("</html>\n");
    out
}

/// Escapes and turns line breaks into `<br>`.
fn text_to_html(text: &str) -> String {
    html_escape(&text.replace("\r\n", "\n")).replace('\n', "<br>")
}

fn html_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

// Style values keep single quotes (font stacks); only `"` and `&` would break the attribute.
fn attr_escape(input: &str) -> String {
    input.replace('&', "&amp;").replace('"', "&quot;")
}
