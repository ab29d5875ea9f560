//! PDF encoding for export, using `printpdf` 0.8.
//!
//! The composited surface is first run through the JPEG encoder at maximum
//! nominal quality, baking the lossy pass into the raster, and the result
//! is embedded as the sole image on a single page sized exactly to the
//! raster's pixel dimensions.
//!
//! Pages are landscape-first: when the raster is portrait, the page
//! dimensions are swapped so the wider edge is horizontal, and the image
//! keeps its own size anchored at the page's top-left corner.
//!
//! printpdf 0.8 uses a data-oriented API: documents are built by
//! constructing `PdfPage` structs containing `Vec<Op>` operation lists,
//! then serialised via `PdfDocument::save()`.

use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};

use crate::bitmap::Bitmap;

use super::{encode_jpeg, EncodeError};

/// CSS reference density: page geometry treats one raster pixel as 1/96 inch.
const PX_DPI: f32 = 96.0;

/// Millimetres per raster pixel at the reference density.
const PX_TO_MM: f32 = 25.4 / PX_DPI;

/// Points per raster pixel at the reference density.
const PX_TO_PT: f32 = 72.0 / PX_DPI;

/// Encode a composited surface as a single-page PDF document.
///
/// # Returns
///
/// PDF bytes containing one page with one embedded image.
pub fn encode_pdf(surface: &Bitmap) -> Result<Vec<u8>, EncodeError> {
    // Maximum-quality JPEG pass first; its artifacts are part of the output
    let jpeg = encode_jpeg(&surface.pixels, surface.width, surface.height, 100)?;

    let baked = image::load_from_memory(&jpeg)
        .map_err(|e| EncodeError::EncodingFailed(format!("re-reading baked JPEG: {e}")))?
        .to_rgb8();

    let img_w = baked.width() as usize;
    let img_h = baked.height() as usize;

    // Landscape-first page sized to the raster
    let (page_w_px, page_h_px) = if img_h > img_w {
        (img_h, img_w)
    } else {
        (img_w, img_h)
    };
    let page_w = Mm(page_w_px as f32 * PX_TO_MM);
    let page_h = Mm(page_h_px as f32 * PX_TO_MM);

    let raw = RawImage {
        pixels: RawImageData::U8(baked.into_raw()),
        width: img_w,
        height: img_h,
        data_format: RawImageFormat::RGB8,
        tag: Vec::new(),
    };

    let mut doc = PdfDocument::new("cropped-image");
    let xobject_id = doc.add_image(&raw);

    // Anchor the image at the page's top-left corner. PDF origin is
    // bottom-left, so the vertical offset is the page/image height gap.
    let y_offset_pt = (page_h_px as f32 - img_h as f32) * PX_TO_PT;

    let ops = vec![Op::UseXobject {
        id: xobject_id,
        transform: XObjectTransform {
            translate_x: Some(Pt(0.0)),
            translate_y: Some(Pt(y_offset_pt)),
            scale_x: None,
            scale_y: None,
            dpi: Some(PX_DPI),
            rotate: None,
        },
    }];

    doc.with_pages(vec![PdfPage::new(page_w, page_h, ops)]);

    let mut warnings: Vec<PdfWarnMsg> = Vec::new();
    Ok(doc.save(&PdfSaveOptions::default(), &mut warnings))
}
