//! Document session – owns the page geometry, margins, style registry and the
//! page backend for one PDF being built.
//!
//! The layout operations live next to their concerns: text flow in
//! [`crate::flow`], images in [`crate::image`], tables in [`crate::table`] and
//! header/footer decorations in [`crate::header_footer`]. All of them are
//! methods on [`Document`].

use std::fs;
use std::path::{Path, PathBuf};

use crate::backend::{apply_style, Canvas, DocumentInfo, PageBackend};
use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::flow::FlowState;
use crate::header_footer::{HeaderFooter, PageDecorations};
use crate::markup::MarkupParser;
use crate::page::{Margins, Page};
use crate::style::{default_styles, Style, StyleLookup, StyleRegistry, NORMAL};

/// One PDF document under construction.
pub struct Document<B: PageBackend = Canvas> {
    pub(crate) page: Page,
    /// Session margins in points.
    pub(crate) margins: Margins,
    pub(crate) styles: StyleRegistry,
    pub(crate) backend: B,
    pub(crate) flow_state: FlowState,
    pub(crate) markup: MarkupParser,
    info: DocumentInfo,
    header: Option<HeaderFooter>,
    footer: Option<HeaderFooter>,
}

impl Document<Canvas> {
    /// Start a session on the in-memory [`Canvas`] backend.
    pub fn start(config: &SessionConfig) -> Result<Self> {
        let page = Page::from_name(&config.page_size, config.landscape);
        Self::with_backend(Canvas::with_format(page.format()), config)
    }
}

impl<B: PageBackend> Document<B> {
    /// Start a session on a caller-supplied backend.
    ///
    /// Margins and the automatic page break are applied before the first page
    /// is added, so the first page already honours them. The font is reset to
    /// "Normal" and the custom font, when configured, is registered.
    pub fn with_backend(backend: B, config: &SessionConfig) -> Result<Self> {
        let page = Page::from_name(&config.page_size, config.landscape);
        let styles = if config.styles.is_empty() {
            log::warn!("Session config has no styles, using the default sheet");
            default_styles()
        } else {
            config.styles.clone()
        };

        let mut doc = Self {
            page,
            margins: config.margins.to_points(),
            styles: StyleRegistry::new(styles),
            backend,
            flow_state: FlowState::Idle,
            markup: MarkupParser::new(),
            info: config.info.clone(),
            header: None,
            footer: None,
        };

        doc.apply_margins();
        doc.backend.set_info(&doc.info);
        doc.backend.add_page(Some(page.format()));
        if let Some(path) = &config.font_path {
            doc.load_font(path)?;
        }
        doc.reset_font();

        log::debug!(
            "Started {:?} document ({}×{} pt)",
            page.size,
            page.effective_width(),
            page.effective_height()
        );
        Ok(doc)
    }

    // -- metadata -------------------------------------------------------------

    /// Set the title, author, subject and keywords embedded in the PDF.
    pub fn set_details(&mut self, title: &str, author: &str, subject: &str, keywords: &str) {
        self.info = DocumentInfo {
            title: title.to_string(),
            author: author.to_string(),
            subject: subject.to_string(),
            keywords: keywords.to_string(),
        };
        self.backend.set_info(&self.info);
    }

    pub fn info(&self) -> &DocumentInfo {
        &self.info
    }

    // -- fonts ----------------------------------------------------------------

    /// Register a TrueType font from a file, or from the first `.ttf` in a
    /// directory. The family name is the file stem; returns it.
    pub fn load_font(&mut self, path: impl AsRef<Path>) -> Result<String> {
        let path = path.as_ref();
        let meta = fs::metadata(path).map_err(|_| Error::FontFileMissing(path.to_path_buf()))?;
        let file = if meta.is_dir() {
            log::debug!("Font path {} is a directory, using the first .ttf found", path.display());
            first_ttf(path)?.ok_or_else(|| Error::FontFileMissing(path.to_path_buf()))?
        } else {
            path.to_path_buf()
        };

        let family = file
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Custom")
            .to_string();
        let bytes = fs::read(&file)?;
        self.backend.register_font(&family, bytes)?;
        log::debug!("Loaded font '{family}' from {}", file.display());
        Ok(family)
    }

    // -- page geometry --------------------------------------------------------

    /// Change the page size used for pages added from now on.
    pub fn set_page(&mut self, name: &str, landscape: bool) {
        self.page = Page::from_name(name, landscape);
    }

    /// Switch to `page` and start a new page in that format.
    pub fn change_page(&mut self, page: Page) {
        self.page = page;
        self.backend.add_page(Some(page.format()));
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Full page width for the current orientation, margins included.
    pub fn width(&self) -> f32 {
        self.page.effective_width()
    }

    /// Full page height for the current orientation, margins included.
    pub fn height(&self) -> f32 {
        self.page.effective_height()
    }

    // -- margins --------------------------------------------------------------

    /// Replace the session margins. They reach the backend on the next
    /// [`apply_margins`](Self::apply_margins) or [`reset_margins`](Self::reset_margins).
    pub fn set_margins(&mut self, margins: Margins) {
        self.margins = margins.to_points();
        if self.header.is_some() || self.footer.is_some() {
            self.install_decorations();
        }
    }

    pub fn margins(&self) -> &Margins {
        &self.margins
    }

    /// Push the session margins and the bottom page-break margin to the
    /// backend.
    pub fn apply_margins(&mut self) {
        let m = self.margins;
        self.backend.set_margins(m.left, m.top, m.right);
        self.backend.set_auto_page_break(true, m.bottom);
    }

    /// Restore the backend margins after a temporary change (image insets).
    pub fn reset_margins(&mut self) {
        self.apply_margins();
        self.backend.set_left_margin(self.margins.left);
        self.backend.set_right_margin(self.margins.right);
    }

    // -- styles ---------------------------------------------------------------

    pub fn styles(&self) -> &StyleRegistry {
        &self.styles
    }

    /// Resolve a style by name with the "Normal" fallback.
    pub fn style(&self, name: &str) -> Result<Style> {
        self.styles.resolve(name)
    }

    pub fn lookup_style(&self, name: &str) -> Result<StyleLookup> {
        self.styles.lookup(name)
    }

    pub fn append_style(&mut self, style: Style) {
        self.styles.append(style);
    }

    pub fn replace_styles(&mut self, styles: Vec<Style>) {
        self.styles.replace(styles);
    }

    /// Load a style into the backend. With `font_only` only the font and text
    /// color change.
    pub fn set_style(&mut self, style: &Style, font_only: bool) {
        apply_style(&mut self.backend, style, font_only);
    }

    /// Back to the "Normal" font (font only).
    pub(crate) fn reset_font(&mut self) {
        match self.styles.resolve(NORMAL) {
            Ok(normal) => self.set_style(&normal, true),
            Err(e) => log::warn!("Cannot reset font: {e}"),
        }
    }

    /// Width of `text` in the backend's current font.
    pub fn string_width(&self, text: &str) -> f32 {
        self.backend.string_width(text)
    }

    // -- cursor and pages -----------------------------------------------------

    /// Line break of `height`, or of the last line height when `None`.
    pub fn new_line(&mut self, height: Option<f32>) {
        self.backend.new_line(height);
    }

    pub fn page_break(&mut self) {
        self.backend.add_page(Some(self.page.format()));
    }

    /// True when the cursor plus the bottom margin passes the page height.
    pub fn check_bottom(&self) -> bool {
        self.backend.y() + self.margins.bottom > self.height()
    }

    pub fn flow_state(&self) -> FlowState {
        self.flow_state
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    // -- headers and footers --------------------------------------------------

    /// Header drawn at the top of every page, the current one included.
    pub fn set_header(&mut self, header: HeaderFooter) {
        self.header = Some(header);
        self.install_decorations();
    }

    /// Footer drawn at the bottom of every page, the current one included.
    pub fn set_footer(&mut self, footer: HeaderFooter) {
        self.footer = Some(footer);
        self.install_decorations();
    }

    pub fn clear_header_footer(&mut self) {
        self.header = None;
        self.footer = None;
        self.backend.set_page_hook(None);
    }

    fn install_decorations(&mut self) {
        let hook = PageDecorations {
            header: self.header.clone(),
            footer: self.footer.clone(),
            margins: self.margins,
        };
        self.backend.set_page_hook(Some(Box::new(hook)));
    }

    // -- output ---------------------------------------------------------------

    /// Close the document and return the PDF bytes.
    pub fn to_pdf_bytes(&mut self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.backend.save(&mut bytes)?;
        Ok(bytes)
    }

    /// Write the PDF to `path`. An existing file there is first renamed to
    /// `<path>.bak`; if that fails nothing is written.
    pub fn finish(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if path.is_file() {
            let backup = backup_path(path);
            fs::rename(path, &backup).map_err(|source| Error::FileMove {
                from: path.to_path_buf(),
                to: backup.clone(),
                source,
            })?;
            log::debug!("Moved existing {} to {}", path.display(), backup.display());
        }
        let bytes = self.to_pdf_bytes()?;
        fs::write(path, bytes)?;
        log::debug!("Wrote {}", path.display());
        Ok(())
    }
}

/// `<path>.bak`, keeping the original extension.
fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".bak");
    PathBuf::from(name)
}

/// First `.ttf` file in `dir`, by file name.
fn first_ttf(dir: &Path) -> Result<Option<PathBuf>> {
    let mut fonts: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("ttf"))
        })
        .collect();
    fonts.sort();
    Ok(fonts.into_iter().next())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Document {
        Document::start(&SessionConfig::new("Letter", false, Margins::narrow())).unwrap()
    }

    #[test]
    fn start_applies_margins_before_first_page() {
        let doc = session();
        assert_eq!(doc.backend().page_number(), 1);
        assert_eq!(doc.backend().x(), 36.0);
        assert_eq!(doc.backend().y(), 36.0);
        assert_eq!(doc.backend().margins(), (36.0, 36.0, 36.0, 36.0));
        assert_eq!(doc.backend().font().size, 11.0);
    }

    #[test]
    fn landscape_dimensions() {
        let doc = Document::start(&SessionConfig::new("a4", true, Margins::word())).unwrap();
        assert_eq!(doc.width(), 842.0);
        assert_eq!(doc.height(), 595.4);
        assert_eq!(doc.backend().page_size().width, 842.0);
    }

    #[test]
    fn set_page_applies_on_next_break() {
        let mut doc = session();
        doc.set_page("legal", false);
        assert_eq!(doc.backend().page_size().height, 792.0);
        doc.page_break();
        assert_eq!(doc.height(), 1008.0);
        assert_eq!(doc.backend().page_size().height, 1008.0);
        assert_eq!(doc.backend().pages()[1].height, 1008.0);
        assert_eq!(doc.backend().pages()[0].height, 792.0);
    }

    #[test]
    fn check_bottom_uses_bottom_margin() {
        let mut doc = session();
        doc.backend_mut().set_y(700.0);
        assert!(!doc.check_bottom());
        doc.backend_mut().set_y(760.0);
        assert!(doc.check_bottom());
    }

    #[test]
    fn missing_font_path_is_reported() {
        let mut doc = session();
        let err = doc.load_font("/no/such/font.ttf").unwrap_err();
        assert!(matches!(err, Error::FontFileMissing(_)));
    }

    #[test]
    fn font_directory_without_ttf_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("readme.txt"), "no fonts").unwrap();
        let mut doc = session();
        let err = doc.load_font(dir.path()).unwrap_err();
        assert!(matches!(err, Error::FontFileMissing(_)));
    }

    #[test]
    fn reset_margins_restores_backend() {
        let mut doc = session();
        doc.backend_mut().set_left_margin(200.0);
        doc.backend_mut().set_right_margin(150.0);
        doc.reset_margins();
        let (l, _, r, b) = doc.backend().margins();
        assert_eq!((l, r, b), (36.0, 36.0, 36.0));
    }

    #[test]
    fn backup_path_appends_suffix() {
        assert_eq!(backup_path(Path::new("out/report.pdf")), PathBuf::from("out/report.pdf.bak"));
    }
}
