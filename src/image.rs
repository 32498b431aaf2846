//! Image placement – images sized in pixels, placed in points at explicit
//! coordinates, at the cursor, at a symbolic position or inset beside text.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::backend::{ImageDraw, ImageFormat, PageBackend};
use crate::document::Document;
use crate::error::{Error, Result};
use crate::position::{Anchor, Horizontal, Vertical};
use crate::style::Alignment;
use crate::units::px_to_pt;

/// Padding between the cursor and an image placed at it.
const CURSOR_PADDING: f32 = 3.0;

/// An image file with its size in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub path: PathBuf,
    pub format: ImageFormat,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
    /// Width over height at construction; rescales derive from it so that
    /// rounding does not drift across repeated changes.
    #[serde(default)]
    aspect: f32,
}

impl Image {
    /// An image of the given pixel size. The file must exist and must not be
    /// a directory.
    pub fn new(path: impl AsRef<Path>, width: f32, height: f32) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            log::warn!("Image file {} was not found", path.display());
            return Err(Error::ImageNotFound(path.to_path_buf()));
        }
        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .map(ImageFormat::from_extension)
            .unwrap_or(ImageFormat::Other);
        Ok(Self {
            path: path.to_path_buf(),
            format,
            width,
            height,
            aspect: if width > 0.0 && height > 0.0 { width / height } else { 0.0 },
        })
    }

    /// An image sized from its file header.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::ImageNotFound(path.to_path_buf()));
        }
        let (width, height) = ::image::image_dimensions(path)
            .map_err(|e| Error::ImageDecode(format!("{}: {e}", path.display())))?;
        Self::new(path, width as f32, height as f32)
    }

    /// Set the width, scaling the height to keep the aspect ratio.
    pub fn change_width(&mut self, width: f32) {
        if self.aspect > 0.0 {
            self.height = (width / self.aspect).round();
        }
        self.width = width;
    }

    /// Set the height, scaling the width to keep the aspect ratio.
    pub fn change_height(&mut self, height: f32) {
        if self.aspect > 0.0 {
            self.width = (height * self.aspect).round();
        }
        self.height = height;
    }

    /// `(width, height)` in points.
    pub fn points_size(&self) -> (f32, f32) {
        (px_to_pt(self.width), px_to_pt(self.height))
    }
}

/// Which side of the text an inset image sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InsetSide {
    Left,
    Right,
}

impl InsetSide {
    /// Parse `"l"`, `"r"`, or a position code whose horizontal letter is
    /// `l` or `r` (`"tl"`, `"tr"`).
    pub fn from_code(code: &str) -> Result<Self> {
        match code.to_lowercase().chars().last() {
            Some('l') => Ok(InsetSide::Left),
            Some('r') => Ok(InsetSide::Right),
            _ => Err(Error::InvalidPosition(code.to_string())),
        }
    }
}

impl<B: PageBackend> Document<B> {
    /// Draw `image` with its top-left corner at `(x, y)`.
    pub fn place_image_at(&mut self, image: &Image, x: f32, y: f32) {
        let (width, height) = image.points_size();
        let draw = ImageDraw {
            path: image.path.clone(),
            format: image.format,
            x,
            y,
            width,
            height,
            read_dpi: image.format.has_dpi_metadata(),
        };
        self.backend.image(&draw);
    }

    /// Draw `image` at the cursor, padded by 3pt. An image that would run
    /// past the right edge goes to the start of the next line instead.
    pub fn place_image_at_cursor(&mut self, image: &Image) {
        let (width, _) = image.points_size();
        let (x, y) = (self.backend.x(), self.backend.y());
        if self.margins.left + self.margins.right + x + width > self.width() {
            log::debug!("Image does not fit on the current line, moving down");
            self.backend.new_line(None);
            let (x, y) = (self.backend.x(), self.backend.y());
            self.place_image_at(image, x, y);
        } else {
            self.place_image_at(image, x + CURSOR_PADDING, y + CURSOR_PADDING);
        }
    }

    /// Draw `image` at a symbolic position. Right and center anchors shift
    /// the image left by its full and half width, bottom anchors shift it up
    /// by its height, so the image stays inside the margins.
    ///
    /// An invalid code still draws the image, at the page origin, and the
    /// `InvalidPosition` error is returned afterwards.
    pub fn place_image_at_position(&mut self, image: &Image, code: &str) -> Result<()> {
        let anchor = match Anchor::parse(code) {
            Ok(anchor) => anchor,
            Err(e) => {
                let origin = self.position_or_origin(code);
                self.place_image_at(image, origin.x, origin.y);
                return Err(e);
            }
        };
        let mut point = self.anchor_point(anchor);
        let (width, height) = image.points_size();
        match anchor.horizontal {
            Horizontal::Left => {}
            Horizontal::Center => point.x -= width / 2.0,
            Horizontal::Right => point.x -= width,
        }
        if anchor.vertical == Vertical::Bottom {
            point.y -= height;
        }
        self.place_image_at(image, point.x, point.y);
        Ok(())
    }

    /// Write `text` beside `image`. A strip of twice the margin plus the
    /// image width is reserved on `side` for the image; the text wraps in
    /// the remaining width. When the text is shorter than the image the
    /// cursor moves below the image. Margins are restored afterwards.
    pub fn write_image_inset(
        &mut self,
        style_name: &str,
        align: Alignment,
        text: &str,
        side: InsetSide,
        image: &Image,
    ) -> Result<()> {
        self.backend.new_line(None);
        let (image_w, image_h) = image.points_size();
        let m = self.margins;

        let image_x = match side {
            InsetSide::Right => {
                self.backend.set_right_margin(2.0 * m.right + image_w);
                self.width() - 2.0 * m.right - image_w
            }
            InsetSide::Left => {
                self.backend.set_left_margin(2.0 * m.left + image_w);
                m.left
            }
        };
        let image_y = self.backend.y();
        self.place_image_at(image, image_x, image_y);

        let (text_left, _, _, _) = self.backend.margins();
        self.backend.set_x(text_left);
        let result = self.write(style_name, align, text);

        if image_y + image_h > self.backend.y() {
            let line_height = self
                .styles
                .resolve(style_name)
                .map(|s| s.line_height)
                .unwrap_or_default();
            self.backend.set_y(image_y + image_h + 1.5 * line_height);
        }
        self.reset_margins();
        self.backend.new_line(None);
        result
    }
}
