//! Rasterization of a normalized visual tree into a pixel canvas.
//!
//! [`BlockRasterizer`] paints backgrounds, left borders and profile images.
//! Text is not painted; it reaches the PDF as a vector layer (see
//! [`crate::export::text`]). Only sRGB colors are understood, so a tree that
//! still carries `oklch()` or other color spaces fails here; normalize first.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{imageops::FilterType, Rgb, RgbImage};
use tracing::warn;

use crate::export::color::{self, Rgba};
use crate::export::visual::{NodeKind, Overflow, VisualNode, VisualTree};
use crate::export::ExportError;

/// Longest canvas side any rasterizer will produce.
pub const MAX_CANVAS_SIDE: u32 = 32_767;
/// Largest canvas area (16384²).
pub const MAX_CANVAS_PIXELS: u64 = 268_435_456;

const PLACEHOLDER: Rgba = Rgba::opaque(209, 213, 219);

pub trait Rasterizer: Send + Sync {
    /// Paints `tree` at `scale` device pixels per CSS pixel.
    fn rasterize(&self, tree: &VisualTree, scale: f32) -> Result<RgbImage, ExportError>;
}

/// Checks the canvas dimensions a tree would produce at `scale`.
pub fn canvas_size(tree: &VisualTree, scale: f32) -> Result<(u32, u32), ExportError> {
    let width = (tree.width * scale).round().max(0.0) as u64;
    let height = (tree.height() * scale).ceil().max(0.0) as u64;
    if width == 0 || height == 0 {
        return Err(ExportError::EmptyCanvas {
            width: width as u32,
            height: height as u32,
        });
    }
    if width > u64::from(MAX_CANVAS_SIDE)
        || height > u64::from(MAX_CANVAS_SIDE)
        || width * height > MAX_CANVAS_PIXELS
    {
        return Err(ExportError::CanvasTooLarge {
            width: width.min(u64::from(u32::MAX)) as u32,
            height: height.min(u64::from(u32::MAX)) as u32,
        });
    }
    Ok((width as u32, height as u32))
}

#[derive(Debug, Default)]
pub struct BlockRasterizer;

impl Rasterizer for BlockRasterizer {
    fn rasterize(&self, tree: &VisualTree, scale: f32) -> Result<RgbImage, ExportError> {
        let (width, height) = canvas_size(tree, scale)?;
        let mut painter = Painter {
            canvas: RgbImage::from_pixel(width, height, Rgb([255, 255, 255])),
            scale,
        };
        let full = Clip {
            x0: 0.0,
            y0: 0.0,
            x1: width as f32,
            y1: height as f32,
        };
        painter.paint(&tree.root, full)?;
        Ok(painter.canvas)
    }
}

/// Device-pixel clip rectangle.
#[derive(Debug, Clone, Copy)]
struct Clip {
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
}

impl Clip {
    fn intersect(self, other: Clip) -> Clip {
        Clip {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        }
    }
}

struct Painter {
    canvas: RgbImage,
    scale: f32,
}

fn parse(value: &str) -> Result<Rgba, ExportError> {
    color::parse_srgb(value).ok_or_else(|| ExportError::UnsupportedColor(value.to_string()))
}

impl Painter {
    fn paint(&mut self, node: &VisualNode, clip: Clip) -> Result<(), ExportError> {
        let s = self.scale;
        let frame = node.frame;
        let own = Clip {
            x0: frame.x * s,
            y0: frame.y * s,
            x1: (frame.x + frame.width) * s,
            y1: (frame.y + frame.height) * s,
        };

        if let Some(bg) = &node.style.background {
            let bg = parse(bg)?;
            self.fill(own, bg, clip);
        }
        if let Some(border) = &node.style.border_left {
            let color = parse(&border.color)?;
            let rect = Clip {
                x1: own.x0 + border.width_px * s,
                ..own
            };
            self.fill(rect, color, clip);
        }

        let inner_clip = match node.style.overflow {
            Overflow::Hidden => clip.intersect(own),
            Overflow::Visible => clip,
        };

        match &node.kind {
            NodeKind::Text(_) => {}
            NodeKind::Image { source, size_px } => self.paint_image(node, source, *size_px, inner_clip),
            NodeKind::Block | NodeKind::Row => {
                for child in &node.children {
                    self.paint(child, inner_clip)?;
                }
            }
        }
        Ok(())
    }

    fn paint_image(&mut self, node: &VisualNode, source: &str, size_px: f32, clip: Clip) {
        let s = self.scale;
        let side = (size_px * s).round().max(1.0) as u32;
        let x0 = (node.frame.x * s).round() as i64;
        let y0 = (node.frame.y * s).round() as i64;

        match decode_data_uri(source) {
            Some(img) => {
                let img = img.resize_to_fill(side, side, FilterType::Triangle).to_rgba8();
                for (px, py, pixel) in img.enumerate_pixels() {
                    let [r, g, b, a] = pixel.0;
                    self.blend_at(x0 + i64::from(px), y0 + i64::from(py), Rgba { r, g, b, a }, clip);
                }
            }
            None => {
                if source.starts_with("data:") {
                    warn!("Undecodable profile image, painting placeholder");
                }
                let radius = side as f32 / 2.0;
                for py in 0..side {
                    for px in 0..side {
                        let dx = px as f32 + 0.5 - radius;
                        let dy = py as f32 + 0.5 - radius;
                        if dx * dx + dy * dy <= radius * radius {
                            self.blend_at(x0 + i64::from(px), y0 + i64::from(py), PLACEHOLDER, clip);
                        }
                    }
                }
            }
        }
    }

    fn fill(&mut self, rect: Clip, color: Rgba, clip: Clip) {
        if color.a == 0 {
            return;
        }
        let r = rect.intersect(clip);
        let (w, h) = self.canvas.dimensions();
        let x0 = r.x0.round().max(0.0) as u32;
        let y0 = r.y0.round().max(0.0) as u32;
        let x1 = (r.x1.round().max(0.0) as u32).min(w);
        let y1 = (r.y1.round().max(0.0) as u32).min(h);
        for y in y0..y1 {
            for x in x0..x1 {
                blend(self.canvas.get_pixel_mut(x, y), color);
            }
        }
    }

    fn blend_at(&mut self, x: i64, y: i64, color: Rgba, clip: Clip) {
        let (w, h) = self.canvas.dimensions();
        let (xf, yf) = (x as f32, y as f32);
        if x < 0 || y < 0 || x >= i64::from(w) || y >= i64::from(h) {
            return;
        }
        if xf < clip.x0 || yf < clip.y0 || xf >= clip.x1 || yf >= clip.y1 {
            return;
        }
        blend(self.canvas.get_pixel_mut(x as u32, y as u32), color);
    }
}

fn blend(pixel: &mut Rgb<u8>, color: Rgba) {
    if color.a == 255 {
        *pixel = Rgb([color.r, color.g, color.b]);
        return;
    }
    let a = f32::from(color.a) / 255.0;
    let mix = |dst: u8, src: u8| (f32::from(src) * a + f32::from(dst) * (1.0 - a)).round() as u8;
    let [r, g, b] = pixel.0;
    *pixel = Rgb([mix(r, color.r), mix(g, color.g), mix(b, color.b)]);
}

/// Decodes a `data:<mime>;base64,<payload>` image. External URLs are never fetched.
fn decode_data_uri(source: &str) -> Option<image::DynamicImage> {
    let rest = source.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    if !header.ends_with(";base64") {
        return None;
    }
    let bytes = STANDARD.decode(payload.trim()).ok()?;
    image::load_from_memory(&bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::font_metrics::inter;
    use crate::export::visual::{Style, VisualNode};

    fn block(bg: &str, height: f32) -> VisualTree {
        let root = VisualNode::block(
            Style {
                background: Some(bg.to_string()),
                padding: height / 2.0,
                ..Default::default()
            },
            vec![],
        );
        let mut tree = VisualTree::new(root, 10.0);
        tree.reflow(inter());
        tree
    }

    #[test]
    fn test_canvas_is_scaled() {
        let canvas = BlockRasterizer
            .rasterize(&block("rgb(29, 78, 216)", 20.0), 2.0)
            .unwrap();
        assert_eq!(canvas.dimensions(), (20, 40));
        assert_eq!(canvas.get_pixel(5, 5).0, [29, 78, 216]);
    }

    #[test]
    fn test_unsupported_color_fails() {
        let err = BlockRasterizer
            .rasterize(&block("oklch(50% 0.1 200)", 20.0), 2.0)
            .unwrap_err();
        assert!(matches!(err, ExportError::UnsupportedColor(_)));
    }

    #[test]
    fn test_empty_tree_fails() {
        let mut tree = VisualTree::new(VisualNode::block(Style::default(), vec![]), 100.0);
        tree.reflow(inter());
        let err = BlockRasterizer.rasterize(&tree, 2.0).unwrap_err();
        assert!(matches!(err, ExportError::EmptyCanvas { .. }));
    }

    #[test]
    fn test_oversized_canvas_rejected() {
        let tree = block("#ffffff", 40_000.0);
        assert!(matches!(
            canvas_size(&tree, 2.0),
            Err(ExportError::CanvasTooLarge { .. })
        ));
    }

    #[test]
    fn test_text_leaves_canvas_untouched() {
        let mut tree = VisualTree::new(
            VisualNode::text(
                "WWW",
                Style {
                    color: "#000000".to_string(),
                    font_size: "20px".to_string(),
                    ..Default::default()
                },
            ),
            100.0,
        );
        tree.reflow(inter());
        let canvas = BlockRasterizer.rasterize(&tree, 1.0).unwrap();
        assert!(canvas.pixels().all(|p| p.0 == [255, 255, 255]));
    }

    #[test]
    fn test_data_uri_image_is_decoded() {
        let mut png = Vec::new();
        let red = RgbImage::from_pixel(4, 4, Rgb([255, 0, 0]));
        image::DynamicImage::ImageRgb8(red)
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        let uri = format!("data:image/png;base64,{}", STANDARD.encode(&png));

        let mut tree = VisualTree::new(VisualNode::image(uri, 8.0, Style::default()), 8.0);
        tree.reflow(inter());
        let canvas = BlockRasterizer.rasterize(&tree, 2.0).unwrap();
        assert_eq!(canvas.get_pixel(8, 8).0, [255, 0, 0]);
    }

    #[test]
    fn test_external_image_paints_placeholder() {
        let mut tree = VisualTree::new(
            VisualNode::image("https://cdn.example.com/me.png", 10.0, Style::default()),
            10.0,
        );
        tree.reflow(inter());
        let canvas = BlockRasterizer.rasterize(&tree, 1.0).unwrap();
        assert_eq!(canvas.get_pixel(5, 5).0, [209, 213, 219]);
        assert_eq!(canvas.get_pixel(0, 0).0, [255, 255, 255]);
    }
}
