//! Paginated PDF export.
//!
//! Pipeline, run on a snapshot taken when the export starts:
//! 1. Resolve the layout and render the live-preview tree.
//! 2. Attach a detached copy to the [`ExportHost`] and normalize it.
//! 3. Rasterize the copy at `scale` (≥ 2) and collect its text lines.
//! 4. Plan A4 pages over the scaled image and assemble the PDF, writing the
//!    text over the image.
//!
//! The detached copy is a guard: it leaves the host when dropped, which
//! covers success, error and panic alike. Exports are serialized; a second
//! request while one runs is rejected. The serialization guard travels with
//! the blocking task, so a caller that stops waiting does not release it.

pub mod color;
pub mod font_metrics;
pub mod handlers;
pub mod normalize;
pub mod paginate;
pub mod pdf;
pub mod raster;
pub mod render;
pub mod text;
pub mod visual;

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::AppSnapshot;
use crate::templates::{lookup, resolve_layout};
use font_metrics::inter;
use normalize::{normalize_tree, NormalizeOptions};
use paginate::{plan_pages, PageGeometry};
use pdf::{assemble_pdf, PdfMetadata};
use raster::Rasterizer;
use visual::VisualTree;

pub const PDF_SUBJECT: &str = "Professional Resume";
/// Lowest oversampling factor an export may use.
pub const MIN_SCALE: f32 = 2.0;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Nothing to rasterize: canvas would be {width}x{height}")]
    EmptyCanvas { width: u32, height: u32 },

    #[error("Canvas {width}x{height} exceeds raster limits")]
    CanvasTooLarge { width: u32, height: u32 },

    #[error("Unsupported color '{0}'")]
    UnsupportedColor(String),

    #[error("Rasterization failed: {0}")]
    Rasterize(String),

    #[error("PDF assembly failed: {0}")]
    Pdf(String),
}

// ────────────────────────────────────────────────────────────────────────────
// Detached copies
// ────────────────────────────────────────────────────────────────────────────

/// Tracks detached copies of the visual tree that exist during an export.
#[derive(Default)]
pub struct ExportHost {
    attached: Mutex<HashSet<u64>>,
    next_id: AtomicU64,
}

impl ExportHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Clones `live` into a new detached copy registered with this host.
    pub fn attach(self: &Arc<Self>, live: &VisualTree) -> DetachedCopy {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.set().insert(id);
        DetachedCopy {
            host: Arc::clone(self),
            id,
            tree: live.clone(),
        }
    }

    pub fn attached_count(&self) -> usize {
        self.set().len()
    }

    fn set(&self) -> std::sync::MutexGuard<'_, HashSet<u64>> {
        self.attached.lock().unwrap_or_else(|p| p.into_inner())
    }
}

pub struct DetachedCopy {
    host: Arc<ExportHost>,
    id: u64,
    pub tree: VisualTree,
}

impl Drop for DetachedCopy {
    fn drop(&mut self) {
        self.host.set().remove(&self.id);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Exporter
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportOptions {
    pub scale: f32,
    pub geometry: PageGeometry,
    pub normalize: NormalizeOptions,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            scale: MIN_SCALE,
            geometry: PageGeometry::a4(96.0),
            normalize: NormalizeOptions::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExportedPdf {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

/// `<fullName or "resume">_<YYYY-MM-DD>.pdf`
pub fn export_filename(full_name: &str, date: NaiveDate) -> String {
    let name = match full_name.trim() {
        "" => "resume",
        name => name,
    };
    format!("{name}_{}.pdf", date.format("%Y-%m-%d"))
}

pub fn pdf_metadata(snapshot: &AppSnapshot) -> PdfMetadata {
    let full_name = snapshot.resume.personal_info.full_name.trim();
    let display = if full_name.is_empty() { "Resume" } else { full_name };
    PdfMetadata {
        title: format!("{display} - {} Template", snapshot.resume.template),
        subject: PDF_SUBJECT.to_string(),
        author: full_name.to_string(),
    }
}

pub struct PdfExporter {
    host: Arc<ExportHost>,
    rasterizer: Arc<dyn Rasterizer>,
    options: ExportOptions,
    in_flight: Arc<tokio::sync::Mutex<()>>,
}

impl PdfExporter {
    pub fn new(rasterizer: Arc<dyn Rasterizer>, mut options: ExportOptions) -> Self {
        options.scale = options.scale.max(MIN_SCALE);
        Self {
            host: ExportHost::new(),
            rasterizer,
            options,
            in_flight: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    pub fn host(&self) -> &Arc<ExportHost> {
        &self.host
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Exports `snapshot`. Fails with `Conflict` if another export is running.
    pub async fn export(
        &self,
        snapshot: Arc<AppSnapshot>,
        date: NaiveDate,
    ) -> Result<ExportedPdf, AppError> {
        let guard = Arc::clone(&self.in_flight)
            .try_lock_owned()
            .map_err(|_| AppError::Conflict("An export is already in progress".to_string()))?;

        let host = Arc::clone(&self.host);
        let rasterizer = Arc::clone(&self.rasterizer);
        let options = self.options;

        let result = tokio::task::spawn_blocking(move || {
            let _guard = guard;
            run_pipeline(&host, rasterizer.as_ref(), &options, &snapshot, date)
        })
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Export task panicked: {e}")))?;

        match result {
            Ok(pdf) => Ok(pdf),
            Err(e) => {
                error!("Export failed: {e}");
                Err(AppError::Export(e))
            }
        }
    }
}

/// The synchronous export pipeline. CPU-bound; call from a blocking context.
pub fn run_pipeline(
    host: &Arc<ExportHost>,
    rasterizer: &dyn Rasterizer,
    options: &ExportOptions,
    snapshot: &AppSnapshot,
    date: NaiveDate,
) -> Result<ExportedPdf, ExportError> {
    let template = lookup(&snapshot.resume.template);
    let layout = resolve_layout(&snapshot.resume, template);
    let live = render::render_layout(&layout, options.geometry.width_px());

    let mut copy = host.attach(&live);
    let report = normalize_tree(&mut copy.tree, &options.normalize, inter());
    let canvas = rasterizer.rasterize(&copy.tree, options.scale)?;
    let text = text::collect_text(&copy.tree, inter())?;
    drop(copy);

    let (width, height) = canvas.dimensions();
    let plan = plan_pages(width, height, &options.geometry);
    let metadata = pdf_metadata(snapshot);
    let bytes = assemble_pdf(
        &canvas,
        &text,
        &plan,
        options.geometry.width_mm,
        options.geometry.height_mm,
        &metadata,
    )?;

    info!(
        template = template.id,
        canvas_width = width,
        canvas_height = height,
        pages = plan.page_count(),
        text_lines = text.runs.len(),
        colors_replaced = report.colors_replaced,
        "Exported résumé PDF"
    );

    Ok(ExportedPdf {
        filename: export_filename(&snapshot.resume.personal_info.full_name, date),
        bytes,
        page_count: plan.page_count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::models::ExperienceEntry;
    use image::RgbImage;
    use lopdf::Document;
    use raster::BlockRasterizer;

    struct FailingRasterizer;

    impl Rasterizer for FailingRasterizer {
        fn rasterize(&self, _tree: &VisualTree, _scale: f32) -> Result<RgbImage, ExportError> {
            Err(ExportError::Rasterize("device lost".to_string()))
        }
    }

    /// Holds the blocking thread long enough for callers to give up.
    struct SlowRasterizer(Duration);

    impl Rasterizer for SlowRasterizer {
        fn rasterize(&self, tree: &VisualTree, scale: f32) -> Result<RgbImage, ExportError> {
            std::thread::sleep(self.0);
            BlockRasterizer.rasterize(tree, scale)
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
    }

    fn snapshot() -> AppSnapshot {
        let mut s = AppSnapshot::default();
        s.resume.personal_info.full_name = "Ana Lee".to_string();
        s.resume.personal_info.email = "ana@example.com".to_string();
        s.resume.summary = "Backend engineer.".to_string();
        s
    }

    fn long_snapshot() -> AppSnapshot {
        let mut s = snapshot();
        s.resume.experience = (0..12)
            .map(|i| ExperienceEntry {
                id: format!("exp-{i}"),
                company: "Acme".to_string(),
                position: "Engineer".to_string(),
                start_date: "2019".to_string(),
                end_date: "2020".to_string(),
                description: "Owned the ingestion pipeline and its on-call rotation, \
                              improving reliability across every quarter."
                    .to_string(),
                achievements: vec!["Reduced incident count by half".to_string(); 4],
                ..Default::default()
            })
            .collect();
        s
    }

    fn exporter(rasterizer: Arc<dyn Rasterizer>) -> PdfExporter {
        PdfExporter::new(rasterizer, ExportOptions::default())
    }

    #[test]
    fn test_filename() {
        assert_eq!(export_filename("Ana Lee", date()), "Ana Lee_2026-03-14.pdf");
        assert_eq!(export_filename("", date()), "resume_2026-03-14.pdf");
    }

    #[test]
    fn test_metadata() {
        let meta = pdf_metadata(&snapshot());
        assert_eq!(meta.title, "Ana Lee - modern Template");
        assert_eq!(meta.subject, "Professional Resume");
        assert_eq!(meta.author, "Ana Lee");

        let meta = pdf_metadata(&AppSnapshot::default());
        assert_eq!(meta.title, "Resume - modern Template");
        assert_eq!(meta.author, "");
    }

    #[test]
    fn test_scale_clamped_to_minimum() {
        let exporter = PdfExporter::new(
            Arc::new(BlockRasterizer),
            ExportOptions {
                scale: 1.0,
                ..Default::default()
            },
        );
        assert_eq!(exporter.options().scale, MIN_SCALE);
    }

    #[test]
    fn test_detached_copy_leaves_host_on_drop() {
        let host = ExportHost::new();
        let tree = VisualTree::new(
            visual::VisualNode::block(visual::Style::default(), vec![]),
            10.0,
        );
        let a = host.attach(&tree);
        let b = host.attach(&tree);
        assert_eq!(host.attached_count(), 2);
        drop(a);
        assert_eq!(host.attached_count(), 1);
        drop(b);
        assert_eq!(host.attached_count(), 0);
    }

    #[tokio::test]
    async fn test_export_produces_pdf() {
        let exporter = exporter(Arc::new(BlockRasterizer));
        let pdf = exporter.export(Arc::new(snapshot()), date()).await.unwrap();
        assert!(pdf.bytes.starts_with(b"%PDF"));
        assert_eq!(pdf.page_count, 1);
        assert_eq!(pdf.filename, "Ana Lee_2026-03-14.pdf");
        assert_eq!(exporter.host().attached_count(), 0);
    }

    #[tokio::test]
    async fn test_long_document_spans_pages() {
        let exporter = exporter(Arc::new(BlockRasterizer));
        let pdf = exporter.export(Arc::new(long_snapshot()), date()).await.unwrap();
        assert!(pdf.page_count >= 2, "got {} pages", pdf.page_count);
    }

    #[tokio::test]
    async fn test_raster_failure_is_terminal_and_leaks_nothing() {
        let exporter = exporter(Arc::new(FailingRasterizer));
        for _ in 0..3 {
            let err = exporter.export(Arc::new(snapshot()), date()).await.unwrap_err();
            assert!(matches!(err, AppError::Export(ExportError::Rasterize(_))));
            assert_eq!(exporter.host().attached_count(), 0);
        }
    }

    #[tokio::test]
    async fn test_concurrent_export_is_rejected() {
        let exporter = exporter(Arc::new(BlockRasterizer));
        let _running = exporter.in_flight.try_lock().unwrap();
        let err = exporter.export(Arc::new(snapshot()), date()).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_abandoned_export_still_blocks_until_done() {
        let exporter = Arc::new(exporter(Arc::new(SlowRasterizer(Duration::from_millis(300)))));

        let first = tokio::spawn({
            let exporter = Arc::clone(&exporter);
            async move { exporter.export(Arc::new(snapshot()), date()).await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        first.abort();
        assert!(first.await.unwrap_err().is_cancelled());

        // The pipeline is still running on the blocking pool.
        let err = exporter.export(Arc::new(snapshot()), date()).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        tokio::time::sleep(Duration::from_millis(600)).await;
        let pdf = exporter.export(Arc::new(snapshot()), date()).await.unwrap();
        assert!(pdf.bytes.starts_with(b"%PDF"));
    }

    fn page_text(pdf: &ExportedPdf) -> String {
        let doc = Document::load_mem(&pdf.bytes).unwrap();
        doc.extract_text(&[1]).unwrap()
    }

    #[test]
    fn test_exported_text_follows_document() {
        let options = ExportOptions::default();
        let mut bank = snapshot();
        bank.resume.summary = "Senior engineer at bank".to_string();
        let mut hunk = snapshot();
        hunk.resume.summary = "Senior engineer at hunk".to_string();

        let host = ExportHost::new();
        let a = run_pipeline(&host, &BlockRasterizer, &options, &bank, date()).unwrap();
        let b = run_pipeline(&host, &BlockRasterizer, &options, &hunk, date()).unwrap();
        assert_ne!(a.bytes, b.bytes);

        let (text_a, text_b) = (page_text(&a), page_text(&b));
        assert!(text_a.contains("Senior engineer at bank"), "{text_a:?}");
        assert!(text_a.contains("Ana Lee"));
        assert!(text_b.contains("Senior engineer at hunk"), "{text_b:?}");
        assert!(!text_b.contains("bank"));
    }

    #[test]
    fn test_live_tree_not_mutated_by_normalization() {
        let host = ExportHost::new();
        let snap = snapshot();
        let layout = resolve_layout(&snap.resume, lookup("modern"));
        let live = render::render_layout(&layout, 794.0);
        let before = live.clone();

        let mut copy = host.attach(&live);
        normalize_tree(&mut copy.tree, &NormalizeOptions::default(), inter());
        assert_ne!(copy.tree, live);
        assert_eq!(live, before);
    }

    #[test]
    fn test_unnormalized_tree_cannot_be_exported() {
        let snap = snapshot();
        let layout = resolve_layout(&snap.resume, lookup("modern"));
        let mut live = render::render_layout(&layout, 794.0);
        live.reflow(inter());
        let err = text::collect_text(&live, inter()).unwrap_err();
        assert!(matches!(err, ExportError::UnsupportedColor(_)));

        let mut copy = ExportHost::new().attach(&live);
        normalize_tree(&mut copy.tree, &NormalizeOptions::default(), inter());
        assert!(!text::collect_text(&copy.tree, inter()).unwrap().runs.is_empty());
    }
}
