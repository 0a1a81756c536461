//! Preview Composer
//!
//! Builds a standalone, read-only document from the extracted `hero` and
//! `main` fragments plus the site's shared assets. Fragments are embedded
//! verbatim between region markers; nothing is sanitized, so the result must
//! only ever be rendered inside an isolated context (see [`SandboxPolicy`]).

use crate::config::RegionNames;
use crate::extractor::MarkerConvention;
use serde::{Deserialize, Serialize};

/// Fixed assets referenced (never embedded) by every composed preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewAssets {
    pub title: String,
    /// Stylesheet paths, resolved against the hosting origin
    pub stylesheets: Vec<String>,
    /// Behaviour scripts, loaded with `defer`
    pub scripts: Vec<String>,
    pub cover_image: String,
    pub cover_alt: String,
    pub watermark_text: String,
}

impl Default for PreviewAssets {
    fn default() -> Self {
        Self {
            title: "Preview".to_string(),
            stylesheets: vec![
                "/css/normalize.css".to_string(),
                "/css/components.css".to_string(),
                "/css/site.css".to_string(),
            ],
            scripts: vec![
                "/js/jquery.min.js".to_string(),
                "/js/site.js".to_string(),
            ],
            cover_image: "/images/cover.jpg".to_string(),
            cover_alt: "".to_string(),
            watermark_text: "PREVIEW".to_string(),
        }
    }
}

const WATERMARK_STYLE: &str = "position:fixed;top:12px;right:12px;z-index:2147483647;\
pointer-events:none;user-select:none;padding:4px 10px;border-radius:4px;\
background:rgba(200,30,30,0.85);color:#fff;font:700 12px/1.4 sans-serif;letter-spacing:0.1em";

/// Compose a preview with the default shared assets, marker convention and
/// region names.
pub fn compose_preview(hero_inner: &str, main_inner: &str) -> String {
    compose_preview_with(
        &PreviewAssets::default(),
        &MarkerConvention::default(),
        &RegionNames::default(),
        hero_inner,
        main_inner,
    )
}

/// Compose a preview document. Output is a pure function of the inputs.
///
/// `hero_inner` and `main_inner` appear byte-for-byte between the `markers`
/// for `regions.hero` and `regions.main`, so the composed document can itself
/// be run through the extractor with the same convention and names. Empty
/// fragments leave an empty slot.
pub fn compose_preview_with(
    assets: &PreviewAssets,
    markers: &MarkerConvention,
    regions: &RegionNames,
    hero_inner: &str,
    main_inner: &str,
) -> String {
    let mut out = String::with_capacity(hero_inner.len() + main_inner.len() + 2048);

    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    out.push_str("<meta charset=\"utf-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    out.push_str("<meta name=\"robots\" content=\"noindex, nofollow\">\n");
    out.push_str(&format!("<title>{}</title>\n", escape_text(&assets.title)));
    for href in &assets.stylesheets {
        out.push_str(&format!(
            "<link rel=\"stylesheet\" href=\"{}\">\n",
            escape_attr(href)
        ));
    }
    for src in &assets.scripts {
        out.push_str(&format!(
            "<script src=\"{}\" defer></script>\n",
            escape_attr(src)
        ));
    }
    out.push_str("</head>\n<body>\n");

    out.push_str(&format!(
        "<div class=\"preview-watermark\" aria-hidden=\"true\" style=\"{WATERMARK_STYLE}\">{}</div>\n",
        escape_text(&assets.watermark_text)
    ));
    out.push_str(&format!(
        "<div class=\"cover-image\"><img src=\"{}\" alt=\"{}\"></div>\n",
        escape_attr(&assets.cover_image),
        escape_attr(&assets.cover_alt)
    ));

    out.push_str(&markers.wrap(&regions.hero, hero_inner));
    out.push('\n');
    out.push_str("<main>\n");
    out.push_str(&markers.wrap(&regions.main, main_inner));
    out.push_str("\n</main>\n</body>\n</html>\n");
    out
}

fn escape_text(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}

fn escape_attr(value: &str) -> String {
    html_escape::encode_double_quoted_attribute(value).into_owned()
}

// ===== SANDBOX =====

/// Capabilities granted to the isolated context that renders a preview.
///
/// Anything not listed is denied. The default grant lets embedded behaviour
/// scripts run and resolve same-origin assets, and nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxPolicy {
    pub allow_scripts: bool,
    pub allow_same_origin: bool,
    pub allow_forms: bool,
    pub allow_popups: bool,
    pub allow_top_navigation: bool,
}

impl Default for SandboxPolicy {
    fn default() -> Self {
        Self {
            allow_scripts: true,
            allow_same_origin: true,
            allow_forms: false,
            allow_popups: false,
            allow_top_navigation: false,
        }
    }
}

impl SandboxPolicy {
    /// Grant nothing at all.
    pub fn locked() -> Self {
        Self {
            allow_scripts: false,
            allow_same_origin: false,
            allow_forms: false,
            allow_popups: false,
            allow_top_navigation: false,
        }
    }

    /// Space-separated token list for an iframe `sandbox` attribute.
    pub fn tokens(&self) -> String {
        let grants = [
            (self.allow_scripts, "allow-scripts"),
            (self.allow_same_origin, "allow-same-origin"),
            (self.allow_forms, "allow-forms"),
            (self.allow_popups, "allow-popups"),
            (self.allow_top_navigation, "allow-top-navigation"),
        ];
        grants
            .iter()
            .filter(|(granted, _)| *granted)
            .map(|(_, token)| *token)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Host page that renders `composed` inside a sandboxed frame via `srcdoc`.
pub fn frame_preview(composed: &str, policy: &SandboxPolicy, title: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
<title>{title}</title>\n\
<style>html,body{{margin:0;height:100%}}iframe{{border:0;width:100%;height:100%}}</style>\n\
</head>\n<body>\n\
<iframe title=\"{title}\" sandbox=\"{sandbox}\" srcdoc=\"{srcdoc}\"></iframe>\n\
</body>\n</html>\n",
        title = escape_attr(title),
        sandbox = policy.tokens(),
        srcdoc = escape_attr(composed),
    )
}
