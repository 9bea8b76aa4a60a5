//! Fixed-page printable document composition.
//!
//! Embeds a captured map image into a minimally-styled page: fixed physical
//! size, a print-safe area the image scales into, and an attribution caption
//! for the map data source at the foot.

use printpdf::{BuiltinFont, ImageTransform, Mm, PdfDocument};

use crate::error::{ExportError, ExportResult};
use crate::map::RasterImage;

/// Attribution caption for the street tile source.
///
/// Kept to characters the built-in caption font can encode.
pub const TILE_ATTRIBUTION: &str = "Map data © OpenStreetMap contributors";

/// Physical page layout for the printable document.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    /// Page width in millimetres.
    pub page_width_mm: f32,
    /// Page height in millimetres.
    pub page_height_mm: f32,
    /// Uniform page margin in millimetres.
    pub margin_mm: f32,
    /// Height reserved under the image for the caption strip.
    pub caption_height_mm: f32,
    /// Caption text printed at the page foot.
    pub caption: String,
    /// Document title recorded in the PDF metadata.
    pub title: String,
}

impl Default for PageLayout {
    /// A4 portrait with a 10 mm margin and the tile attribution caption.
    fn default() -> Self {
        Self {
            page_width_mm: 210.0,
            page_height_mm: 297.0,
            margin_mm: 10.0,
            caption_height_mm: 8.0,
            caption: TILE_ATTRIBUTION.to_string(),
            title: "Strollmap".to_string(),
        }
    }
}

impl PageLayout {
    /// Width of the print-safe area in millimetres.
    #[must_use]
    pub fn safe_width_mm(&self) -> f32 {
        self.page_width_mm - self.margin_mm * 2.0
    }

    /// Height of the print-safe area in millimetres, above the caption.
    #[must_use]
    pub fn safe_height_mm(&self) -> f32 {
        self.page_height_mm - self.margin_mm * 2.0 - self.caption_height_mm
    }
}

/// Compose a single-page PDF embedding the captured image.
///
/// The image is scaled to fill the print-safe area while preserving its
/// aspect ratio, centered, with the caption along the bottom margin.
///
/// # Errors
///
/// Returns [`ExportError::Document`] when the image cannot be decoded or the
/// PDF cannot be produced.
#[allow(clippy::cast_precision_loss)]
pub fn compose_pdf(image: &RasterImage, layout: &PageLayout) -> ExportResult<Vec<u8>> {
    let (doc, page1, layer1) = PdfDocument::new(
        layout.title.as_str(),
        Mm(layout.page_width_mm),
        Mm(layout.page_height_mm),
        "Map",
    );
    let layer = doc.get_page(page1).get_layer(layer1);

    // Decode with printpdf's bundled image crate for embed compatibility.
    let dynamic_image = printpdf::image_crate::load_from_memory(&image.bytes)
        .map_err(|e| ExportError::Document(format!("failed to decode capture: {e}")))?;
    let pdf_image = printpdf::Image::from_dynamic_image(&dynamic_image);

    let img_w = image.width.max(1) as f32;
    let img_h = image.height.max(1) as f32;

    // Millimetres per pixel that fits the safe area, aspect preserved.
    let fit = (layout.safe_width_mm() / img_w).min(layout.safe_height_mm() / img_h);
    let draw_w = img_w * fit;
    let draw_h = img_h * fit;
    let translate_x = layout.margin_mm + (layout.safe_width_mm() - draw_w) / 2.0;
    let translate_y =
        layout.margin_mm + layout.caption_height_mm + (layout.safe_height_mm() - draw_h) / 2.0;

    let transform = ImageTransform {
        translate_x: Some(Mm(translate_x)),
        translate_y: Some(Mm(translate_y)),
        scale_x: Some(fit),
        scale_y: Some(fit),
        // 25.4 dpi makes one source pixel one millimetre before scaling.
        dpi: Some(25.4),
        ..Default::default()
    };
    pdf_image.add_to_layer(layer.clone(), transform);

    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ExportError::Document(format!("caption font unavailable: {e}")))?;
    layer.use_text(
        layout.caption.as_str(),
        8.0,
        Mm(layout.margin_mm),
        Mm(layout.margin_mm),
        &font,
    );

    doc.save_to_bytes()
        .map_err(|e| ExportError::Document(format!("PDF save failed: {e}")))
}
