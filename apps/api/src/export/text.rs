//! Positioned text lines collected from a reflowed tree.
//!
//! The rasterizer paints boxes and images only; every wrapped line of a text
//! node becomes a [`TextRun`] that the PDF writer emits as real text. Runs
//! carry CSS-pixel geometry so the writer can place them over the canvas.

use crate::export::color::{self, Rgba};
use crate::export::font_metrics::{FontMetricTable, FontWeight};
use crate::export::visual::{NodeKind, Overflow, TextAlign, VisualNode, VisualTree, FALLBACK_FONT_PX};
use crate::export::ExportError;

/// One laid-out line of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    /// Left edge of the line, CSS px.
    pub x: f32,
    /// Top of the line box, CSS px.
    pub top: f32,
    pub line_height: f32,
    pub font_px: f32,
    pub weight: FontWeight,
    pub color: Rgba,
    /// Width the line takes in the layout font, CSS px.
    pub width: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextLayer {
    /// Layout width of the source tree, CSS px.
    pub width: f32,
    pub runs: Vec<TextRun>,
}

impl TextLayer {
    pub fn plain_text(&self) -> String {
        self.runs
            .iter()
            .map(|r| r.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Vertical clip in CSS px.
#[derive(Debug, Clone, Copy)]
struct Band {
    top: f32,
    bottom: f32,
}

/// Collects every visible line of `tree`. Lines whose middle falls outside an
/// `overflow: hidden` ancestor are dropped; fully transparent text is skipped.
pub fn collect_text(tree: &VisualTree, metrics: &FontMetricTable) -> Result<TextLayer, ExportError> {
    let mut layer = TextLayer {
        width: tree.width,
        runs: Vec::new(),
    };
    let band = Band {
        top: f32::NEG_INFINITY,
        bottom: f32::INFINITY,
    };
    visit(&tree.root, band, metrics, &mut layer.runs)?;
    Ok(layer)
}

fn visit(
    node: &VisualNode,
    band: Band,
    metrics: &FontMetricTable,
    out: &mut Vec<TextRun>,
) -> Result<(), ExportError> {
    let band = match node.style.overflow {
        Overflow::Hidden => Band {
            top: band.top.max(node.frame.y),
            bottom: band.bottom.min(node.frame.y + node.frame.height),
        },
        Overflow::Visible => band,
    };

    match &node.kind {
        NodeKind::Text(_) => collect_lines(node, band, metrics, out),
        NodeKind::Image { .. } => Ok(()),
        NodeKind::Block | NodeKind::Row => {
            for child in &node.children {
                visit(child, band, metrics, out)?;
            }
            Ok(())
        }
    }
}

fn collect_lines(
    node: &VisualNode,
    band: Band,
    metrics: &FontMetricTable,
    out: &mut Vec<TextRun>,
) -> Result<(), ExportError> {
    if node.lines.is_empty() {
        return Ok(());
    }
    let color = color::parse_srgb(&node.style.color)
        .ok_or_else(|| ExportError::UnsupportedColor(node.style.color.clone()))?;
    if color.a == 0 {
        return Ok(());
    }

    let font_px = node.style.font_px().unwrap_or(FALLBACK_FONT_PX);
    let line_height = font_px * node.style.line_height;
    let weight = node.style.font_weight;
    let (content_x, content_y, content_w) = node.content_box();

    for (i, line) in node.lines.iter().enumerate() {
        let top = content_y + i as f32 * line_height;
        let middle = top + line_height / 2.0;
        if middle < band.top || middle > band.bottom {
            continue;
        }
        let width = metrics.measure_px(line, font_px, weight);
        let x = match node.style.text_align {
            TextAlign::Left => content_x,
            TextAlign::Center => content_x + ((content_w - width) / 2.0).max(0.0),
        };
        out.push(TextRun {
            text: line.clone(),
            x,
            top,
            line_height,
            font_px,
            weight,
            color,
            width,
        });
    }
    Ok(())
}
