//! PDF assembly with `lopdf`.
//!
//! The canvas is embedded once as a single image XObject. Every page draws
//! that same object, scaled to the page width and shifted up by the page's
//! offset, so the pages are windows onto one continuous image.
//!
//! Text is written over the image with the standard Helvetica faces, each
//! line stretched horizontally (`Tz`) to the width it had in the layout.
//! A line is drawn on every page its line box overlaps.

use image::RgbImage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Encoding, Object, Stream, StringFormat};

use crate::export::font_metrics::{helvetica, FontWeight};
use crate::export::paginate::PagePlan;
use crate::export::text::{TextLayer, TextRun};
use crate::export::ExportError;

const PT_PER_MM: f32 = 72.0 / 25.4;
const IMAGE_NAME: &str = "Im0";
const FONT_REGULAR: &str = "F1";
const FONT_BOLD: &str = "F2";
/// Baseline distance below the top of the em box, in ems.
const ASCENT_EM: f32 = 0.8;
const MIN_STRETCH: f32 = 50.0;
const MAX_STRETCH: f32 = 200.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfMetadata {
    pub title: String,
    pub subject: String,
    pub author: String,
}

fn pdf_err(e: impl std::fmt::Display) -> ExportError {
    ExportError::Pdf(e.to_string())
}

fn standard_font(base: &str) -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base,
        "Encoding" => "WinAnsiEncoding",
    }
}

fn channel(v: u8) -> Object {
    (f32::from(v) / 255.0).into()
}

/// Text operations for the runs visible on one page. `image_top` is the PDF
/// y of the canvas top edge; `k` converts CSS px to points.
fn text_operations(
    layer: &TextLayer,
    encoding: &Encoding,
    k: f32,
    image_top: f32,
    page_h: f32,
) -> Vec<Operation> {
    let mut ops = Vec::new();
    for run in &layer.runs {
        let box_top = image_top - run.top * k;
        let box_bottom = box_top - run.line_height * k;
        if box_bottom >= page_h || box_top <= 0.0 {
            continue;
        }
        let bytes = Document::encode_text(encoding, &run.text);
        if bytes.is_empty() {
            continue;
        }
        let font = match run.weight {
            FontWeight::Regular => FONT_REGULAR,
            FontWeight::Bold => FONT_BOLD,
        };
        let baseline =
            image_top - (run.top + (run.line_height - run.font_px) / 2.0 + ASCENT_EM * run.font_px) * k;

        ops.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![font.into(), (run.font_px * k).into()]),
            Operation::new(
                "rg",
                vec![channel(run.color.r), channel(run.color.g), channel(run.color.b)],
            ),
            Operation::new("Tz", vec![stretch(run).into()]),
            Operation::new(
                "Tm",
                vec![1.into(), 0.into(), 0.into(), 1.into(), (run.x * k).into(), baseline.into()],
            ),
            Operation::new("Tj", vec![Object::String(bytes, StringFormat::Literal)]),
            Operation::new("ET", vec![]),
        ]);
    }
    ops
}

/// Horizontal scaling, in percent, that makes Helvetica cover the width the
/// line took in the layout font.
fn stretch(run: &TextRun) -> f32 {
    let natural = helvetica(run.weight).measure_em(&run.text) * run.font_px;
    if natural <= 0.0 || run.width <= 0.0 {
        return 100.0;
    }
    (run.width / natural * 100.0).clamp(MIN_STRETCH, MAX_STRETCH)
}

/// Builds the PDF bytes for `canvas` laid out according to `plan`, with
/// `text` drawn over it.
pub fn assemble_pdf(
    canvas: &RgbImage,
    text: &TextLayer,
    plan: &PagePlan,
    page_width_mm: f32,
    page_height_mm: f32,
    metadata: &PdfMetadata,
) -> Result<Vec<u8>, ExportError> {
    let page_w = page_width_mm * PT_PER_MM;
    let page_h = page_height_mm * PT_PER_MM;
    let img_w = plan.image_width_mm * PT_PER_MM;
    let img_h = plan.image_height_mm * PT_PER_MM;

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let (width, height) = canvas.dimensions();
    let image = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(width),
            "Height" => i64::from(height),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        },
        canvas.as_raw().clone(),
    );
    let image_id = doc.add_object(image);

    let regular = standard_font("Helvetica");
    let encoding = regular.get_font_encoding(&doc).map_err(pdf_err)?;
    let regular_id = doc.add_object(regular.clone());
    let bold_id = doc.add_object(standard_font("Helvetica-Bold"));
    let k = if text.width > 0.0 { img_w / text.width } else { 0.0 };

    let mut kids: Vec<Object> = Vec::with_capacity(plan.page_count());
    for offset_mm in &plan.offsets_mm {
        // PDF space grows upward: the image's bottom edge sits below the page
        // top by its height, then moves up by the page offset.
        let y = page_h - img_h + offset_mm * PT_PER_MM;
        let mut operations = vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![img_w.into(), 0.into(), 0.into(), img_h.into(), 0.into(), y.into()],
            ),
            Operation::new("Do", vec![IMAGE_NAME.into()]),
            Operation::new("Q", vec![]),
        ];
        if k > 0.0 {
            operations.extend(text_operations(text, &encoding, k, y + img_h, page_h));
        }
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().map_err(pdf_err)?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), page_w.into(), page_h.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! { IMAGE_NAME => image_id },
                "Font" => dictionary! { FONT_REGULAR => regular_id, FONT_BOLD => bold_id },
            },
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(metadata.title.as_str()),
        "Subject" => Object::string_literal(metadata.subject.as_str()),
        "Author" => Object::string_literal(metadata.author.as_str()),
        "Producer" => Object::string_literal(concat!("vellum-api ", env!("CARGO_PKG_VERSION"))),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).map_err(pdf_err)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::color::Rgba;
    use crate::export::paginate::{plan_pages, PageGeometry};
    use image::Rgb;

    fn metadata() -> PdfMetadata {
        PdfMetadata {
            title: "Ana Lee - modern Template".to_string(),
            subject: "Professional Resume".to_string(),
            author: "Ana Lee".to_string(),
        }
    }

    fn run(text: &str, top: f32) -> TextRun {
        TextRun {
            text: text.to_string(),
            x: 10.0,
            top,
            line_height: 18.0,
            font_px: 12.0,
            weight: FontWeight::Regular,
            color: Rgba::opaque(17, 24, 39),
            width: 60.0,
        }
    }

    fn assemble_with(canvas_h: u32, text: &TextLayer) -> (Vec<u8>, usize) {
        let canvas = RgbImage::from_pixel(210, canvas_h, Rgb([10, 20, 30]));
        let geometry = PageGeometry::a4(96.0);
        let plan = plan_pages(210, canvas_h, &geometry);
        let bytes = assemble_pdf(&canvas, text, &plan, 210.0, 297.0, &metadata()).unwrap();
        (bytes, plan.page_count())
    }

    fn assemble(canvas_h: u32) -> (Vec<u8>, usize) {
        assemble_with(canvas_h, &TextLayer::default())
    }

    #[test]
    fn test_pdf_has_one_page_per_offset() {
        let (bytes, pages) = assemble(742);
        assert!(bytes.starts_with(b"%PDF-1.5"));
        assert_eq!(pages, 3);

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }

    #[test]
    fn test_pages_share_a_single_image() {
        let (bytes, _) = assemble(742);
        let doc = Document::load_mem(&bytes).unwrap();
        let images = doc
            .objects
            .values()
            .filter(|o| match o {
                Object::Stream(s) => s
                    .dict
                    .get(b"Subtype")
                    .and_then(|v| v.as_name())
                    .map(|n| n == b"Image")
                    .unwrap_or(false),
                _ => false,
            })
            .count();
        assert_eq!(images, 1);
    }

    #[test]
    fn test_metadata_is_written() {
        let (bytes, _) = assemble(100);
        let doc = Document::load_mem(&bytes).unwrap();
        let info_ref = doc.trailer.get(b"Info").and_then(|o| o.as_reference()).unwrap();
        let info = doc.get_dictionary(info_ref).unwrap();
        let title = info.get(b"Title").and_then(|o| o.as_str()).unwrap();
        assert_eq!(title, b"Ana Lee - modern Template");
    }

    #[test]
    fn test_text_is_extractable_from_its_page() {
        // 210 px wide canvas over a 210 px layout: one CSS px per canvas px.
        // A page window is 297 px tall, so a line at 400 px lands on page 2.
        let layer = TextLayer {
            width: 210.0,
            runs: vec![run("Ana Lee (Rust)", 20.0), run("Second page line", 400.0)],
        };
        let (bytes, pages) = assemble_with(742, &layer);
        assert_eq!(pages, 3);

        let doc = Document::load_mem(&bytes).unwrap();
        let first = doc.extract_text(&[1]).unwrap();
        let second = doc.extract_text(&[2]).unwrap();
        assert!(first.contains("Ana Lee (Rust)"), "page 1: {first:?}");
        assert!(!first.contains("Second page line"));
        assert!(second.contains("Second page line"), "page 2: {second:?}");
        assert!(doc.extract_text(&[3]).unwrap().trim().is_empty());
    }

    #[test]
    fn test_stretch_matches_layout_width() {
        let mut line = run("Engineer", 0.0);
        let natural = helvetica(FontWeight::Regular).measure_em("Engineer") * 12.0;
        line.width = natural * 1.1;
        assert!((stretch(&line) - 110.0).abs() < 1e-3);

        line.width = natural * 10.0;
        assert_eq!(stretch(&line), MAX_STRETCH);
    }
}
