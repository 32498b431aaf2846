//! Integration tests for the styled-pdf session.
//!
//! These tests validate:
//! - Text flow positions, heading spacing and page breaks
//! - Table column sizing, fixed widths and striping
//! - Image and symbolic position placement
//! - Headers/footers on every page
//! - PDF output, `.bak` handling and determinism of the recorded pages

use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use styled_pdf::backend::{DrawOp, PageBackend};
use styled_pdf::style::{Border, BorderWidths, NORMAL};
use styled_pdf::{
    Alignment, Color, ContentBlock, Document, Error, HeaderFooter, Image, Margins, PageNumber, SessionConfig, Style,
    Table,
};

// =====================================================================
// Helpers
// =====================================================================

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn narrow_letter() -> Document {
    init_logger();
    Document::start(&SessionConfig::new("Letter", false, Margins::narrow())).unwrap()
}

fn assert_valid_pdf(bytes: &[u8]) {
    assert!(bytes.len() > 100, "PDF too small: {} bytes", bytes.len());
    assert_eq!(&bytes[0..5], b"%PDF-", "Missing PDF header");
}

fn texts_on(doc: &Document, page: usize) -> Vec<String> {
    doc.backend().pages()[page].texts().map(str::to_string).collect()
}

fn rects_on(doc: &Document, page: usize) -> Vec<(f32, Option<Color>)> {
    doc.backend().pages()[page]
        .ops
        .iter()
        .filter_map(|op| match op {
            DrawOp::Rect { width, fill, .. } => Some((*width, *fill)),
            _ => None,
        })
        .collect()
}

fn png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    image::RgbImage::new(width, height).save(&path).unwrap();
    path
}

fn bordered(style: Style) -> Style {
    style.with_border(Border {
        color: Color::BLACK,
        width: BorderWidths::all(1.0),
    })
}

// =====================================================================
// Text flow
// =====================================================================

#[test]
fn centered_title_starts_mid_page() {
    let mut doc = narrow_letter();
    doc.write_centered("Title", Alignment::Center, "Annual Report").unwrap();

    let (y, line_height) = doc.backend().pages()[0]
        .ops
        .iter()
        .find_map(|op| match op {
            DrawOp::Text { y, line_height, .. } => Some((*y, *line_height)),
            _ => None,
        })
        .unwrap();
    assert!(y >= 396.0 - line_height / 2.0);
    // The title style has a bottom border: a rule follows the text.
    assert!(doc.backend().pages()[0]
        .ops
        .iter()
        .any(|op| matches!(op, DrawOp::Line { .. })));
}

#[test]
fn write_breaks_page_when_cursor_passes_bottom_margin() {
    let mut doc = narrow_letter();
    doc.backend_mut().set_y(760.0);
    assert!(doc.check_bottom());
    doc.write(NORMAL, Alignment::Left, "On the next page").unwrap();
    assert_eq!(doc.backend().page_number(), 2);
    assert!(texts_on(&doc, 0).is_empty());
    assert_eq!(texts_on(&doc, 1), vec!["On the next page"]);
}

#[test]
fn long_flow_spans_several_pages() {
    let mut doc = narrow_letter();
    let paragraph = "The quick brown fox jumps over the lazy dog. ".repeat(40);
    for _ in 0..10 {
        doc.write(NORMAL, Alignment::Left, &paragraph).unwrap();
        doc.new_line(None);
    }
    assert!(doc.backend().page_number() > 1);
    for page in doc.backend().pages() {
        for op in &page.ops {
            if let DrawOp::Text { y, .. } = op {
                assert!(*y < page.height, "text below the page");
            }
        }
    }
}

#[test]
fn markup_variants_render_as_styled_runs() {
    let mut doc = narrow_letter();
    doc.write(NORMAL, Alignment::Left, "__Bold__ and _*Italic*_ and _#Under#_")
        .unwrap();
    let runs: Vec<(String, bool, bool, bool)> = doc.backend().pages()[0]
        .ops
        .iter()
        .filter_map(|op| match op {
            DrawOp::Text { text, font, .. } => Some((text.clone(), font.bold, font.italic, font.underline)),
            _ => None,
        })
        .collect();
    assert_eq!(runs[0], ("Bold".to_string(), true, false, false));
    assert!(runs.iter().any(|r| r.0 == "Italic" && r.2));
    assert!(runs.iter().any(|r| r.0 == "Under" && r.3));
}

#[test]
fn missing_normal_style_is_reported() {
    init_logger();
    let config =
        SessionConfig::new("Letter", false, Margins::word()).with_styles(vec![Style::new("Body", 10.0, 12.0)]);
    let mut doc = Document::start(&config).unwrap();
    let err = doc.write("Heading 7", Alignment::Left, "text").unwrap_err();
    assert!(matches!(err, Error::StyleNotFound(_)));
}

// =====================================================================
// Tables
// =====================================================================

fn sample_table() -> Table {
    Table::new(
        vec!["C**A".into(), "C**BB".into()],
        vec![
            vec!["L**X".into(), "L**YY".into()],
            vec!["L**1".into(), "R**2".into()],
            vec!["L**3".into(), "R**4".into()],
        ],
        bordered(Style::new("Header", 10.0, 14.0)),
        bordered(Style::new("Row", 8.0, 12.0)),
    )
}

#[test]
fn column_width_follows_widest_cell() {
    let mut doc = narrow_letter();
    let widths = doc.column_widths(&sample_table());
    // "BB" at 10pt is 10pt wide, "YY" at 8pt is 8pt wide.
    assert_eq!(widths[1], 16.0);
}

#[test]
fn content_driven_table_uses_computed_widths() {
    let mut doc = narrow_letter();
    let table = sample_table();
    let widths = doc.column_widths(&table);
    doc.add_table(&table, None, 0.0);
    let drawn: Vec<f32> = rects_on(&doc, 0).into_iter().map(|(w, _)| w).collect();
    assert_eq!(drawn.len(), 8);
    for (i, w) in drawn.iter().enumerate() {
        assert_eq!(*w, widths[i % 2]);
    }
}

#[test]
fn fixed_width_table_ignores_content() {
    let mut doc = narrow_letter();
    doc.add_table(&sample_table(), None, 140.0);
    let drawn = rects_on(&doc, 0);
    assert_eq!(drawn.len(), 8);
    assert!(drawn.iter().all(|(w, _)| *w == 140.0));
}

#[test]
fn alternate_style_stripes_odd_rows() {
    let mut doc = narrow_letter();
    let stripe = Style::new("Stripe", 8.0, 12.0).with_background(Color::GREY);
    doc.add_table(&sample_table(), Some(&stripe), 0.0);

    let fills: Vec<Option<Color>> = rects_on(&doc, 0).into_iter().map(|(_, f)| f).collect();
    // Header (2 cells) then rows 0, 1, 2.
    assert_eq!(fills[2], None);
    assert_eq!(fills[4], Some(Color::GREY));
    assert_eq!(fills[5], Some(Color::GREY));
    assert_eq!(fills[6], None);
}

#[test]
fn unnamed_alternate_style_disables_striping() {
    let mut doc = narrow_letter();
    let unnamed = Style {
        name: String::new(),
        ..Style::new("x", 8.0, 12.0).with_background(Color::GREY)
    };
    doc.add_table(&sample_table(), Some(&unnamed), 0.0);
    assert!(rects_on(&doc, 0).iter().all(|(_, f)| f.is_none()));
}

#[test]
fn table_restores_normal_font() {
    let mut doc = narrow_letter();
    doc.add_table(&sample_table(), None, 0.0);
    assert_eq!(doc.backend().font().size, 11.0);
}

// =====================================================================
// Positions and images
// =====================================================================

#[test]
fn position_codes_resolve_against_margins() {
    let doc = narrow_letter();
    let tl = doc.resolve_position("tl").unwrap();
    assert_eq!((tl.x, tl.y), (36.0, 36.0));
    let br = doc.resolve_position("br").unwrap();
    assert_eq!((br.x, br.y), (612.0 - 36.0, 792.0 - 36.0));
    let cc = doc.resolve_position("cc").unwrap();
    assert_eq!((cc.x, cc.y), (306.0, 396.0));
    assert!(matches!(doc.resolve_position("x"), Err(Error::InvalidPosition(_))));
}

#[test]
fn images_are_embedded_in_the_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let mut image = Image::open(png(dir.path(), "logo.png", 192, 96)).unwrap();
    image.change_width(96.0);
    assert_eq!(image.height, 48.0);

    let mut doc = narrow_letter();
    doc.place_image_at_position(&image, "tr").unwrap();
    doc.place_image_at_cursor(&image);
    doc.place_image_at(&image, 100.0, 400.0);

    let count = doc.backend().pages()[0]
        .ops
        .iter()
        .filter(|op| matches!(op, DrawOp::Image(_)))
        .count();
    assert_eq!(count, 3);
    assert_valid_pdf(&doc.to_pdf_bytes().unwrap());
}

#[test]
fn missing_image_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let err = Image::new(dir.path().join("gone.jpg"), 10.0, 10.0).unwrap_err();
    assert!(matches!(err, Error::ImageNotFound(_)));
}

// =====================================================================
// Headers and footers
// =====================================================================

#[test]
fn header_and_footer_on_every_page() {
    let mut doc = narrow_letter();
    let table_style = styled_pdf::style::basic_table();

    let mut header = HeaderFooter::new();
    header.left = ContentBlock::new("Quarterly Report", table_style.clone(), Alignment::Left);
    let mut footer = HeaderFooter::new();
    footer.right = ContentBlock::new("Page", table_style, Alignment::Right).with_page_number(PageNumber::Append);
    doc.set_header(header);
    doc.set_footer(footer);

    doc.write(NORMAL, Alignment::Left, "First page body").unwrap();
    doc.page_break();
    doc.write(NORMAL, Alignment::Left, "Second page body").unwrap();
    doc.page_break();
    let bytes = doc.to_pdf_bytes().unwrap();
    assert_valid_pdf(&bytes);

    assert_eq!(doc.backend().page_number(), 3);
    for page in 0..3 {
        let texts = texts_on(&doc, page);
        assert!(texts.contains(&"Quarterly Report".to_string()), "page {page}: {texts:?}");
        assert!(texts.contains(&format!("Page {}", page + 1)), "page {page}: {texts:?}");
    }
    // Body text is not overwritten by the header.
    let body_y = doc.backend().pages()[1]
        .ops
        .iter()
        .find_map(|op| match op {
            DrawOp::Text { text, y, .. } if text == "Second page body" => Some(*y),
            _ => None,
        })
        .unwrap();
    assert!(body_y >= 36.0 + 14.0);
}

// =====================================================================
// Output
// =====================================================================

#[test]
fn finish_moves_existing_file_to_bak() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("report.pdf");
    fs::write(&out, b"old contents").unwrap();

    let mut doc = narrow_letter();
    doc.set_details("Report", "Finance", "Q3", "report, q3");
    doc.write("Title", Alignment::Center, "Report").unwrap();
    doc.finish(&out).unwrap();

    assert_eq!(fs::read(dir.path().join("report.pdf.bak")).unwrap(), b"old contents");
    assert_valid_pdf(&fs::read(&out).unwrap());
}

#[test]
fn finish_writes_fresh_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("fresh.pdf");
    let mut doc = narrow_letter();
    doc.write(NORMAL, Alignment::Left, "Hello").unwrap();
    doc.finish(&out).unwrap();
    assert!(out.is_file());
    assert!(!dir.path().join("fresh.pdf.bak").exists());
}

#[test]
fn config_round_trips_through_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let config = SessionConfig::new("A4", true, Margins::moderate());
    fs::write(&path, config.to_json().unwrap()).unwrap();

    let loaded = SessionConfig::from_path(&path).unwrap();
    assert_eq!(loaded, config);
    let doc = Document::start(&loaded).unwrap();
    assert_eq!(doc.width(), 842.0);
}

fn recorded_digest() -> String {
    let mut doc = narrow_letter();
    doc.write_centered("Title", Alignment::Center, "Digest").unwrap();
    doc.page_break();
    doc.write("Heading 1", Alignment::Left, "Section").unwrap();
    doc.write(NORMAL, Alignment::Justify, &"lorem ipsum dolor ".repeat(30)).unwrap();
    doc.add_table(&sample_table(), None, 0.0);
    let json = serde_json::to_string(doc.backend().pages()).unwrap();
    let digest = Sha256::digest(json.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

#[test]
fn recorded_pages_are_deterministic() {
    assert_eq!(recorded_digest(), recorded_digest());
}
