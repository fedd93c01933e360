//! Export normalization: rewrites a detached copy of the visual tree into a
//! form the rasterizer can paint without losing content.
//!
//! - Colors the rasterizer cannot parse are converted (`oklch`) or replaced
//!   with black.
//! - Font sizes become px: `rem`/`em`/`%` against the root font size,
//!   viewport units to the export base size, `pt` at 96 dpi.
//! - `nowrap`, `overflow: hidden` and height caps are dropped, then the
//!   tree is reflowed so every node reports its full height.

use tracing::debug;

use crate::export::color::{self, ColorFix, FALLBACK_COLOR};
use crate::export::font_metrics::FontMetricTable;
use crate::export::visual::{Overflow, Style, VisualTree, WhiteSpace};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizeOptions {
    /// Root font size used for `rem`, `em` and `%`.
    pub root_font_px: f32,
    /// Size substituted for viewport-relative and unparseable font sizes.
    pub base_font_px: f32,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            root_font_px: 16.0,
            base_font_px: 12.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub colors_converted: usize,
    pub colors_replaced: usize,
    pub font_sizes_resolved: usize,
    pub wrap_rules_relaxed: usize,
    pub clips_removed: usize,
}

/// Resolves a CSS font size to px. `None` when it already is px.
pub fn resolve_font_size(value: &str, opts: &NormalizeOptions) -> Option<f32> {
    let v = value.trim().to_ascii_lowercase();
    let number = |suffix: &str| {
        v.strip_suffix(suffix)
            .and_then(|n| n.trim().parse::<f32>().ok())
            .filter(|n| n.is_finite() && *n > 0.0)
    };

    if number("px").is_some() {
        return None;
    }
    let px = if let Some(n) = number("rem") {
        n * opts.root_font_px
    } else if let Some(n) = number("em") {
        n * opts.root_font_px
    } else if let Some(n) = number("pt") {
        n * 96.0 / 72.0
    } else if let Some(n) = number("%") {
        n / 100.0 * opts.root_font_px
    } else {
        // vw, vh, vmin, calc(), keywords
        opts.base_font_px
    };
    Some(px)
}

fn fix_color(value: &mut String, report: &mut NormalizeReport) {
    match color::normalize(value) {
        ColorFix::Unchanged => {}
        ColorFix::Converted(css) => {
            *value = css;
            report.colors_converted += 1;
        }
        ColorFix::Fallback => {
            *value = FALLBACK_COLOR.to_string();
            report.colors_replaced += 1;
        }
    }
}

fn normalize_style(style: &mut Style, opts: &NormalizeOptions, report: &mut NormalizeReport) {
    fix_color(&mut style.color, report);
    if let Some(background) = style.background.as_mut() {
        fix_color(background, report);
    }
    if let Some(border) = style.border_left.as_mut() {
        fix_color(&mut border.color, report);
    }

    if let Some(px) = resolve_font_size(&style.font_size, opts) {
        style.font_size = format!("{px}px");
        report.font_sizes_resolved += 1;
    }

    if style.white_space == WhiteSpace::Nowrap {
        style.white_space = WhiteSpace::Normal;
        report.wrap_rules_relaxed += 1;
    }
    if style.overflow == Overflow::Hidden || style.max_height.is_some() {
        style.overflow = Overflow::Visible;
        style.max_height = None;
        report.clips_removed += 1;
    }
}

/// Normalizes every node of `tree` in place and reflows it.
pub fn normalize_tree(
    tree: &mut VisualTree,
    opts: &NormalizeOptions,
    metrics: &FontMetricTable,
) -> NormalizeReport {
    let mut report = NormalizeReport::default();
    tree.root
        .walk_mut(&mut |node| normalize_style(&mut node.style, opts, &mut report));
    tree.reflow(metrics);

    debug!(
        converted = report.colors_converted,
        replaced = report.colors_replaced,
        fonts = report.font_sizes_resolved,
        height = tree.height(),
        "Normalized export copy"
    );
    report
}
