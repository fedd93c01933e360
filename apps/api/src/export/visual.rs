//! In-memory box tree: the rendered form of a résumé.
//!
//! Styles keep their authored values as strings (`"0.875rem"`, `"oklch(...)"`)
//! so the tree can be inspected and rewritten before rasterization. Geometry
//! (`Frame`, wrapped `lines`) is produced by [`VisualTree::reflow`], which only
//! understands pixel font sizes; anything else measures at the fallback size.
//!
//! Reflow honors `white-space: nowrap` (one unbroken line) and `max_height`
//! (height capped), so a tree that still carries those rules reports a
//! shorter height than its content needs.

use crate::export::font_metrics::{FontMetricTable, FontWeight};

/// Font size used when a node's size is not expressed in `px`.
pub const FALLBACK_FONT_PX: f32 = 16.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WhiteSpace {
    #[default]
    Normal,
    Nowrap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Border {
    pub width_px: f32,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub color: String,
    pub background: Option<String>,
    pub border_left: Option<Border>,
    pub font_size: String,
    pub font_weight: FontWeight,
    /// Multiple of the font size.
    pub line_height: f32,
    pub white_space: WhiteSpace,
    pub overflow: Overflow,
    pub max_height: Option<f32>,
    pub padding: f32,
    /// Space between consecutive children.
    pub gap: f32,
    pub margin_bottom: f32,
    /// Fixed width; `None` fills the available width.
    pub width: Option<f32>,
    pub text_align: TextAlign,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            color: "rgb(0, 0, 0)".to_string(),
            background: None,
            border_left: None,
            font_size: format!("{FALLBACK_FONT_PX}px"),
            font_weight: FontWeight::Regular,
            line_height: 1.5,
            white_space: WhiteSpace::Normal,
            overflow: Overflow::Visible,
            max_height: None,
            padding: 0.0,
            gap: 0.0,
            margin_bottom: 0.0,
            width: None,
            text_align: TextAlign::Left,
        }
    }
}

impl Style {
    /// The font size in px if it is already expressed in px.
    pub fn font_px(&self) -> Option<f32> {
        self.font_size
            .trim()
            .strip_suffix("px")
            .and_then(|v| v.trim().parse::<f32>().ok())
            .filter(|v| v.is_finite() && *v > 0.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Children stacked vertically.
    Block,
    /// Children laid out left to right.
    Row,
    Text(String),
    /// Square image box of `size_px`.
    Image { source: String, size_px: f32 },
}

/// Absolute position and size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Frame {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisualNode {
    pub kind: NodeKind,
    pub style: Style,
    pub children: Vec<VisualNode>,
    pub frame: Frame,
    /// Wrapped lines of a text node after reflow.
    pub lines: Vec<String>,
}

impl VisualNode {
    fn new(kind: NodeKind, style: Style, children: Vec<VisualNode>) -> Self {
        Self {
            kind,
            style,
            children,
            frame: Frame::default(),
            lines: Vec::new(),
        }
    }

    pub fn block(style: Style, children: Vec<VisualNode>) -> Self {
        Self::new(NodeKind::Block, style, children)
    }

    pub fn row(style: Style, children: Vec<VisualNode>) -> Self {
        Self::new(NodeKind::Row, style, children)
    }

    pub fn text(text: impl Into<String>, style: Style) -> Self {
        Self::new(NodeKind::Text(text.into()), style, Vec::new())
    }

    pub fn image(source: impl Into<String>, size_px: f32, style: Style) -> Self {
        let style = Style {
            width: Some(size_px),
            ..style
        };
        Self::new(
            NodeKind::Image {
                source: source.into(),
                size_px,
            },
            style,
            Vec::new(),
        )
    }

    fn border_width(&self) -> f32 {
        self.style.border_left.as_ref().map_or(0.0, |b| b.width_px)
    }

    /// Content box origin and width.
    pub fn content_box(&self) -> (f32, f32, f32) {
        let pad = self.style.padding;
        let inset = pad + self.border_width();
        (
            self.frame.x + inset,
            self.frame.y + pad,
            (self.frame.width - inset - pad).max(0.0),
        )
    }

    fn layout(&mut self, x: f32, y: f32, width: f32, metrics: &FontMetricTable) {
        self.frame = Frame {
            x,
            y,
            width,
            height: 0.0,
        };
        let (inner_x, inner_y, inner_w) = self.content_box();
        let center = self.style.text_align == TextAlign::Center;

        let content_h = match &self.kind {
            NodeKind::Text(text) => {
                let font_px = self.style.font_px().unwrap_or(FALLBACK_FONT_PX);
                self.lines = match self.style.white_space {
                    WhiteSpace::Nowrap => {
                        let joined = text.split_whitespace().collect::<Vec<_>>().join(" ");
                        if joined.is_empty() {
                            Vec::new()
                        } else {
                            vec![joined]
                        }
                    }
                    WhiteSpace::Normal => {
                        metrics.wrap(text, font_px, self.style.font_weight, inner_w)
                    }
                };
                self.lines.len() as f32 * font_px * self.style.line_height
            }
            NodeKind::Image { size_px, .. } => *size_px,
            NodeKind::Block => {
                let gap = self.style.gap;
                let mut cursor = inner_y;
                for (i, child) in self.children.iter_mut().enumerate() {
                    if i > 0 {
                        cursor += gap;
                    }
                    let w = child.style.width.map_or(inner_w, |w| w.min(inner_w));
                    let cx = if center { inner_x + (inner_w - w) / 2.0 } else { inner_x };
                    child.layout(cx, cursor, w, metrics);
                    cursor += child.frame.height + child.style.margin_bottom;
                }
                cursor - inner_y
            }
            NodeKind::Row => {
                let gap = self.style.gap;
                let n = self.children.len();
                let fixed: f32 = self.children.iter().filter_map(|c| c.style.width).sum();
                let flexible = self.children.iter().filter(|c| c.style.width.is_none()).count();
                let gaps = gap * n.saturating_sub(1) as f32;
                let flex_w = if flexible > 0 {
                    ((inner_w - fixed - gaps) / flexible as f32).max(0.0)
                } else {
                    0.0
                };

                let mut cursor = inner_x;
                let mut tallest = 0.0_f32;
                for child in self.children.iter_mut() {
                    let w = child.style.width.unwrap_or(flex_w);
                    child.layout(cursor, inner_y, w, metrics);
                    cursor += w + gap;
                    tallest = tallest.max(child.frame.height + child.style.margin_bottom);
                }
                tallest
            }
        };

        let mut height = content_h + 2.0 * self.style.padding;
        if let Some(cap) = self.style.max_height {
            height = height.min(cap);
        }
        self.frame.height = height;
    }

    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a VisualNode)) {
        f(self);
        for child in &self.children {
            child.walk(f);
        }
    }

    pub fn walk_mut(&mut self, f: &mut impl FnMut(&mut VisualNode)) {
        f(self);
        for child in &mut self.children {
            child.walk_mut(f);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisualTree {
    pub root: VisualNode,
    /// Layout width in CSS pixels.
    pub width: f32,
}

impl VisualTree {
    pub fn new(root: VisualNode, width: f32) -> Self {
        Self { root, width }
    }

    /// Recomputes every frame from the current styles.
    pub fn reflow(&mut self, metrics: &FontMetricTable) {
        self.root.layout(0.0, 0.0, self.width, metrics);
    }

    pub fn height(&self) -> f32 {
        self.root.frame.height
    }

    /// Concatenated text of every text node, in document order.
    pub fn text_content(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.root.walk(&mut |node| {
            if let NodeKind::Text(text) = &node.kind {
                out.push(text.as_str());
            }
        });
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::font_metrics::inter;

    fn px(size: f32) -> Style {
        Style {
            font_size: format!("{size}px"),
            ..Default::default()
        }
    }

    const PROSE: &str = "Designed and shipped a streaming ingestion service handling billions of \
                         events per day with exactly-once delivery guarantees";

    #[test]
    fn test_block_stacks_children() {
        let mut tree = VisualTree::new(
            VisualNode::block(
                Style {
                    gap: 4.0,
                    ..Default::default()
                },
                vec![VisualNode::text("One", px(10.0)), VisualNode::text("Two", px(10.0))],
            ),
            400.0,
        );
        tree.reflow(inter());
        let children = &tree.root.children;
        assert_eq!(children[0].frame.y, 0.0);
        assert_eq!(children[1].frame.y, 15.0 + 4.0);
        assert_eq!(tree.height(), 15.0 + 4.0 + 15.0);
    }

    #[test]
    fn test_text_wraps_to_width() {
        let mut tree = VisualTree::new(VisualNode::text(PROSE, px(12.0)), 200.0);
        tree.reflow(inter());
        assert!(tree.root.lines.len() > 2);
        assert_eq!(tree.height(), tree.root.lines.len() as f32 * 18.0);
    }

    #[test]
    fn test_nowrap_reports_single_line() {
        let style = Style {
            white_space: WhiteSpace::Nowrap,
            ..px(12.0)
        };
        let mut tree = VisualTree::new(VisualNode::text(PROSE, style), 200.0);
        tree.reflow(inter());
        assert_eq!(tree.root.lines.len(), 1);
        assert_eq!(tree.height(), 18.0);
    }

    #[test]
    fn test_max_height_caps_block() {
        let mut tree = VisualTree::new(
            VisualNode::block(
                Style {
                    max_height: Some(20.0),
                    overflow: Overflow::Hidden,
                    ..Default::default()
                },
                vec![VisualNode::text(PROSE, px(12.0))],
            ),
            200.0,
        );
        tree.reflow(inter());
        assert_eq!(tree.height(), 20.0);
        assert!(tree.root.children[0].frame.height > 20.0);
    }

    #[test]
    fn test_row_splits_flexible_width() {
        let mut tree = VisualTree::new(
            VisualNode::row(
                Style {
                    gap: 10.0,
                    ..Default::default()
                },
                vec![
                    VisualNode::image("", 96.0, Style::default()),
                    VisualNode::text("Name", px(16.0)),
                ],
            ),
            506.0,
        );
        tree.reflow(inter());
        let text = &tree.root.children[1];
        assert_eq!(text.frame.x, 106.0);
        assert_eq!(text.frame.width, 400.0);
        assert_eq!(tree.height(), 96.0);
    }

    #[test]
    fn test_non_px_font_uses_fallback() {
        let style = Style {
            font_size: "2vw".to_string(),
            ..Default::default()
        };
        let mut tree = VisualTree::new(VisualNode::text("Hi", style), 300.0);
        tree.reflow(inter());
        assert_eq!(tree.height(), FALLBACK_FONT_PX * 1.5);
    }
}
