//! PDF renderer – takes the pages recorded by a [`Canvas`](crate::backend::Canvas)
//! and produces PDF bytes using `printpdf` (v0.8 ops-based API).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use printpdf::{
    BuiltinFont, Color as PdfColor, FontId, Line, LinePoint, Op, PaintMode, PdfDocument, PdfPage,
    PdfSaveOptions, PdfWarnMsg, Point, Polygon, PolygonRing, Pt, RawImage, Rgb, TextItem, WindingOrder,
    XObjectId, XObjectTransform,
};
use printpdf::font::ParsedFont;

use crate::backend::{CanvasPage, DocumentInfo, DrawOp, ImageDraw, Stroke};
use crate::error::{Error, Result};
use crate::fonts::{BuiltinFamily, FontKey, FontManager, FontSpec};
use crate::style::Color;
use crate::units::px_to_pt;

const PT_TO_MM: f32 = 0.352778;

/// A printpdf XObject together with the pixel dimensions of the source image.
struct ImageResource {
    xobj_id: XObjectId,
    px_width: u32,
    px_height: u32,
}

/// How a run of text is written: a base-14 font or an embedded face.
#[derive(Clone)]
enum PdfFont {
    Builtin(BuiltinFont),
    Embedded(FontId),
}

/// Render recorded pages into PDF bytes.
///
/// Images that cannot be read or decoded are skipped with a `log::warn`.
/// Text in a family that is neither builtin nor registered falls back to
/// Helvetica.
pub fn render_pdf(pages: &[CanvasPage], fonts: &FontManager, info: &DocumentInfo) -> Result<Vec<u8>> {
    let mut doc = PdfDocument::new(&info.title);
    doc.metadata.info.author = info.author.clone();
    doc.metadata.info.subject = info.subject.clone();
    doc.metadata.info.keywords = info
        .keywords
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect();
    doc.metadata.info.creator = env!("CARGO_PKG_NAME").to_string();

    // ── Embed registered faces ─────────────────────────────────────────────
    let mut warnings: Vec<PdfWarnMsg> = Vec::new();
    let mut embedded: HashMap<FontKey, FontId> = HashMap::new();
    for key in fonts.keys() {
        let Some(bytes) = fonts.font_bytes(&key) else {
            continue;
        };
        let parsed = ParsedFont::from_bytes(bytes, 0, &mut warnings)
            .ok_or_else(|| Error::Render(format!("Failed to embed font '{}'", key.family)))?;
        embedded.insert(key, doc.add_font(&parsed));
    }

    // ── Pre-register all images ────────────────────────────────────────────
    let mut images: HashMap<PathBuf, ImageResource> = HashMap::new();
    for page in pages {
        for op in &page.ops {
            let DrawOp::Image(draw) = op else { continue };
            if images.contains_key(&draw.path) {
                continue;
            }
            match load_image(&draw.path, &mut warnings) {
                Ok((raw, px_width, px_height)) => {
                    let xobj_id = doc.add_image(&raw);
                    images.insert(
                        draw.path.clone(),
                        ImageResource {
                            xobj_id,
                            px_width,
                            px_height,
                        },
                    );
                }
                Err(e) => log::warn!("Skipping image: {e}"),
            }
        }
    }

    // ── Render pages ──────────────────────────────────────────────────────
    let mut pdf_pages = Vec::with_capacity(pages.len());
    for page in pages {
        let mut ops = Vec::new();
        for op in &page.ops {
            render_op(&mut ops, op, page.height, fonts, &embedded, &images);
        }
        pdf_pages.push(PdfPage::new(
            printpdf::Mm(page.width * PT_TO_MM),
            printpdf::Mm(page.height * PT_TO_MM),
            ops,
        ));
    }

    // Ensure at least one page.
    if pdf_pages.is_empty() {
        pdf_pages.push(PdfPage::new(printpdf::Mm(612.0 * PT_TO_MM), printpdf::Mm(792.0 * PT_TO_MM), Vec::new()));
    }

    doc.with_pages(pdf_pages);
    let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
    if !warnings.is_empty() {
        log::debug!("printpdf reported {} warnings", warnings.len());
    }
    Ok(bytes)
}

fn load_image(path: &Path, warnings: &mut Vec<PdfWarnMsg>) -> Result<(RawImage, u32, u32)> {
    let bytes = std::fs::read(path)?;
    // Decode with the `image` crate to obtain pixel dimensions.
    let decoded = ::image::load_from_memory(&bytes)
        .map_err(|e| Error::ImageDecode(format!("{}: {e}", path.display())))?;
    let raw = RawImage::decode_from_bytes(&bytes, warnings)
        .map_err(|e| Error::ImageDecode(format!("{}: {e}", path.display())))?;
    Ok((raw, decoded.width(), decoded.height()))
}

fn pdf_color(c: Color) -> PdfColor {
    PdfColor::Rgb(Rgb {
        r: c.r,
        g: c.g,
        b: c.b,
        icc_profile: None,
    })
}

fn point(x: f32, y: f32) -> LinePoint {
    LinePoint {
        p: Point { x: Pt(x), y: Pt(y) },
        bezier: false,
    }
}

fn builtin_font(family: BuiltinFamily, bold: bool, italic: bool) -> BuiltinFont {
    match (family, bold, italic) {
        (BuiltinFamily::Helvetica, true, true) => BuiltinFont::HelveticaBoldOblique,
        (BuiltinFamily::Helvetica, true, false) => BuiltinFont::HelveticaBold,
        (BuiltinFamily::Helvetica, false, true) => BuiltinFont::HelveticaOblique,
        (BuiltinFamily::Helvetica, false, false) => BuiltinFont::Helvetica,
        (BuiltinFamily::Times, true, true) => BuiltinFont::TimesBoldItalic,
        (BuiltinFamily::Times, true, false) => BuiltinFont::TimesBold,
        (BuiltinFamily::Times, false, true) => BuiltinFont::TimesItalic,
        (BuiltinFamily::Times, false, false) => BuiltinFont::TimesRoman,
        (BuiltinFamily::Courier, true, true) => BuiltinFont::CourierBoldOblique,
        (BuiltinFamily::Courier, true, false) => BuiltinFont::CourierBold,
        (BuiltinFamily::Courier, false, true) => BuiltinFont::CourierOblique,
        (BuiltinFamily::Courier, false, false) => BuiltinFont::Courier,
    }
}

fn select_font(font: &FontSpec, embedded: &HashMap<FontKey, FontId>) -> PdfFont {
    let key = font.key();
    let regular = FontKey::new(&font.family, false, false);
    if let Some(id) = embedded.get(&key).or_else(|| embedded.get(&regular)) {
        return PdfFont::Embedded(id.clone());
    }
    let family = BuiltinFamily::from_family(&font.family).unwrap_or_else(|| {
        log::warn!("Font family '{}' is not available, using Helvetica", font.family);
        BuiltinFamily::Helvetica
    });
    PdfFont::Builtin(builtin_font(family, font.bold, font.italic))
}

/// Render one recorded operation into PDF ops.
fn render_op(
    ops: &mut Vec<Op>,
    op: &DrawOp,
    page_height: f32,
    fonts: &FontManager,
    embedded: &HashMap<FontKey, FontId>,
    images: &HashMap<PathBuf, ImageResource>,
) {
    // PDF coordinate system: origin at bottom-left.
    // Recorded ops use origin at top-left.
    match op {
        DrawOp::Text {
            x,
            y,
            text,
            font,
            color,
            line_height,
        } => {
            // Baseline sits half a line down plus ~0.3 × size.
            let baseline = page_height - (y + line_height / 2.0 + 0.3 * font.size);
            let pdf_font = select_font(font, embedded);

            ops.push(Op::StartTextSection);
            ops.push(Op::SetTextCursor {
                pos: Point {
                    x: Pt(*x),
                    y: Pt(baseline),
                },
            });
            ops.push(Op::SetLineHeight { lh: Pt(*line_height) });
            ops.push(Op::SetFillColor { col: pdf_color(*color) });
            match pdf_font {
                PdfFont::Builtin(builtin) => {
                    ops.push(Op::SetFontSizeBuiltinFont {
                        size: Pt(font.size),
                        font: builtin,
                    });
                    ops.push(Op::WriteTextBuiltinFont {
                        items: vec![TextItem::Text(text.clone())],
                        font: builtin,
                    });
                }
                PdfFont::Embedded(id) => {
                    ops.push(Op::SetFontSize {
                        size: Pt(font.size),
                        font: id.clone(),
                    });
                    ops.push(Op::WriteText {
                        items: vec![TextItem::Text(text.clone())],
                        font: id,
                    });
                }
            }
            ops.push(Op::EndTextSection);

            if font.underline || font.strikeout {
                let width = fonts.measure_text_width(text, font);
                ops.push(Op::SetOutlineThickness {
                    pt: Pt((font.size * 0.05).max(0.5)),
                });
                ops.push(Op::SetOutlineColor { col: pdf_color(*color) });
                if font.underline {
                    let uy = baseline - font.size * 0.1;
                    push_segment(ops, *x, uy, x + width, uy);
                }
                if font.strikeout {
                    let sy = baseline + font.size * 0.3;
                    push_segment(ops, *x, sy, x + width, sy);
                }
            }
        }
        DrawOp::Line {
            x1,
            y1,
            x2,
            y2,
            color,
            width,
        } => {
            ops.push(Op::SetOutlineThickness { pt: Pt(*width) });
            ops.push(Op::SetOutlineColor { col: pdf_color(*color) });
            push_segment(ops, *x1, page_height - y1, *x2, page_height - y2);
        }
        DrawOp::Rect {
            x,
            y,
            width,
            height,
            fill,
            stroke,
        } => {
            let x1 = *x;
            let y1 = page_height - y - height;
            let x2 = x + width;
            let y2 = page_height - y;
            let corners = vec![point(x1, y1), point(x2, y1), point(x2, y2), point(x1, y2)];

            if let Some(fill) = fill {
                ops.push(Op::SetFillColor { col: pdf_color(*fill) });
                ops.push(Op::DrawPolygon {
                    polygon: Polygon {
                        rings: vec![PolygonRing {
                            points: corners.clone(),
                        }],
                        mode: PaintMode::Fill,
                        winding_order: WindingOrder::NonZero,
                    },
                });
            }
            if let Some(Stroke { color, width }) = stroke {
                ops.push(Op::SetOutlineColor { col: pdf_color(*color) });
                ops.push(Op::SetOutlineThickness { pt: Pt(*width) });
                ops.push(Op::DrawLine {
                    line: Line {
                        points: corners,
                        is_closed: true,
                    },
                });
            }
        }
        DrawOp::Image(draw) => render_image(ops, draw, page_height, images),
    }
}

fn push_segment(ops: &mut Vec<Op>, x1: f32, y1: f32, x2: f32, y2: f32) {
    ops.push(Op::DrawLine {
        line: Line {
            points: vec![point(x1, y1), point(x2, y2)],
            is_closed: false,
        },
    });
}

/// Embed a pre-registered image XObject.
fn render_image(ops: &mut Vec<Op>, draw: &ImageDraw, page_height: f32, images: &HashMap<PathBuf, ImageResource>) {
    let Some(res) = images.get(&draw.path) else {
        return;
    };
    let (width, height) = image_size(draw, res.px_width, res.px_height);
    // translate_y = bottom edge of image in PDF coordinates.
    let img_bottom_y = page_height - draw.y - height;

    // At dpi=72 printpdf renders 1 px = 1 pt, so
    // scale = desired_pt / px_dim.
    let scale_x = if res.px_width > 0 {
        width / res.px_width as f32
    } else {
        1.0
    };
    let scale_y = if res.px_height > 0 {
        height / res.px_height as f32
    } else {
        1.0
    };

    ops.push(Op::UseXobject {
        id: res.xobj_id.clone(),
        transform: XObjectTransform {
            translate_x: Some(Pt(draw.x)),
            translate_y: Some(Pt(img_bottom_y)),
            dpi: Some(72.0),
            scale_x: Some(scale_x),
            scale_y: Some(scale_y),
            rotate: None,
        },
    });
}

/// Final point size of an image draw. A zero dimension comes from the pixel
/// size (96 DPI with `read_dpi`, 72 otherwise), keeping the aspect ratio
/// when only one is zero.
fn image_size(draw: &ImageDraw, px_width: u32, px_height: u32) -> (f32, f32) {
    let (natural_w, natural_h) = if draw.read_dpi {
        (px_to_pt(px_width as f32), px_to_pt(px_height as f32))
    } else {
        (px_width as f32, px_height as f32)
    };
    match (draw.width > 0.0, draw.height > 0.0) {
        (true, true) => (draw.width, draw.height),
        (true, false) if natural_w > 0.0 => (draw.width, draw.width * natural_h / natural_w),
        (false, true) if natural_h > 0.0 => (draw.height * natural_w / natural_h, draw.height),
        _ => (natural_w, natural_h),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ImageFormat;

    fn page_with(ops: Vec<DrawOp>) -> CanvasPage {
        CanvasPage {
            width: 612.0,
            height: 792.0,
            ops,
        }
    }

    #[test]
    fn render_empty_document() {
        let bytes = render_pdf(&[], &FontManager::new(), &DocumentInfo::default()).unwrap();
        assert!(bytes.len() > 100, "PDF should have content");
        // PDF magic number
        assert_eq!(&bytes[0..5], b"%PDF-");
    }

    #[test]
    fn render_text_lines_and_rects() {
        let page = page_with(vec![
            DrawOp::Text {
                x: 72.0,
                y: 72.0,
                text: "Hello".into(),
                font: FontSpec::new("Times", 12.0),
                color: Color::BLACK,
                line_height: 16.0,
            },
            DrawOp::Line {
                x1: 72.0,
                y1: 90.0,
                x2: 540.0,
                y2: 90.0,
                color: Color::BLACK,
                width: 1.0,
            },
            DrawOp::Rect {
                x: 72.0,
                y: 100.0,
                width: 50.0,
                height: 14.0,
                fill: Some(Color::GREY),
                stroke: Some(Stroke {
                    color: Color::BLACK,
                    width: 1.0,
                }),
            },
        ]);
        let bytes = render_pdf(&[page], &FontManager::new(), &DocumentInfo::default()).unwrap();
        assert_eq!(&bytes[0..5], b"%PDF-");
    }

    #[test]
    fn missing_image_is_skipped() {
        let page = page_with(vec![DrawOp::Image(ImageDraw {
            path: PathBuf::from("/definitely/not/here.png"),
            format: ImageFormat::Png,
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
            read_dpi: true,
        })]);
        assert!(render_pdf(&[page], &FontManager::new(), &DocumentInfo::default()).is_ok());
    }

    #[test]
    fn dpi_aware_size_fills_missing_dimension() {
        let draw = ImageDraw {
            path: PathBuf::new(),
            format: ImageFormat::Png,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            read_dpi: true,
        };
        // 96 px at 96 DPI is one inch.
        assert_eq!(image_size(&draw, 96, 48), (72.0, 36.0));
        let half = ImageDraw { width: 36.0, ..draw };
        assert_eq!(image_size(&half, 96, 48), (36.0, 18.0));
    }

    #[test]
    fn builtin_text_keeps_non_ascii_characters() {
        let text = "caf\u{e9} \u{201C}q\u{201D} \u{2013} \u{20AC}5";
        let page = page_with(vec![DrawOp::Text {
            x: 72.0,
            y: 72.0,
            text: text.into(),
            font: FontSpec::new("Helvetica", 12.0),
            color: Color::BLACK,
            line_height: 16.0,
        }]);
        let embedded = HashMap::new();
        let mut ops = Vec::new();
        for op in &page.ops {
            render_op(&mut ops, op, page.height, &FontManager::new(), &embedded, &HashMap::new());
        }
        let written: Vec<&str> = ops
            .iter()
            .filter_map(|op| match op {
                Op::WriteTextBuiltinFont { items, .. } => items.first(),
                _ => None,
            })
            .filter_map(|item| match item {
                TextItem::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(written, vec![text]);

        let bytes = render_pdf(&[page], &FontManager::new(), &DocumentInfo::default()).unwrap();
        assert_eq!(&bytes[0..5], b"%PDF-");
    }
}
