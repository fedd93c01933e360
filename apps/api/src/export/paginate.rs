//! Page planning for one continuous rasterized image.
//!
//! The image is scaled to the page width. Page `k` shows the same full image
//! shifted up by `k * H`, so consecutive pages tile the image with no gaps
//! and no overlap.

use serde::Serialize;

/// Tolerance (mm) absorbing float noise when the image is an exact page multiple.
const PAGE_EPSILON_MM: f32 = 1e-4;

const MM_PER_INCH: f32 = 25.4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageGeometry {
    pub width_mm: f32,
    pub height_mm: f32,
    /// Raster density used to size the layout width.
    pub dpi: f32,
}

impl PageGeometry {
    pub fn a4(dpi: f32) -> Self {
        Self {
            width_mm: 210.0,
            height_mm: 297.0,
            dpi,
        }
    }

    /// Page width in CSS pixels at this geometry's density.
    pub fn width_px(&self) -> f32 {
        self.width_mm / MM_PER_INCH * self.dpi
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PagePlan {
    pub image_width_mm: f32,
    pub image_height_mm: f32,
    /// Upward shift of the image on each page, in mm. `offsets_mm[k] == k * H`.
    pub offsets_mm: Vec<f32>,
}

impl PagePlan {
    pub fn page_count(&self) -> usize {
        self.offsets_mm.len()
    }
}

/// Plans pages for a `canvas_width x canvas_height` image. Always at least one page.
pub fn plan_pages(canvas_width: u32, canvas_height: u32, geometry: &PageGeometry) -> PagePlan {
    let w = geometry.width_mm;
    let h = geometry.height_mm;
    let image_height_mm = if canvas_width == 0 {
        0.0
    } else {
        canvas_height as f32 * w / canvas_width as f32
    };

    let mut offsets_mm = vec![0.0];
    while image_height_mm - h * offsets_mm.len() as f32 > PAGE_EPSILON_MM {
        offsets_mm.push(h * offsets_mm.len() as f32);
    }

    PagePlan {
        image_width_mm: w,
        image_height_mm,
        offsets_mm,
    }
}
