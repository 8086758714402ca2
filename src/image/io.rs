//! Loading and saving through the `image` crate.
//!
//! Available when the `image-io` feature is enabled. Images are compared as
//! RGB only; the source color mode and alpha plane are remembered so the
//! output can be written back in the same shape as the input.

use crate::image::{Color, PixelGrid};
use crate::util::{DepixError, DepixResult};
use image::{ColorType, DynamicImage, GrayAlphaImage, RgbImage, RgbaImage};
use std::path::Path;

/// Channel layout of a decoded file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Luma,
    LumaAlpha,
    Rgb,
    Rgba,
}

impl ColorMode {
    fn from_color_type(color: ColorType) -> Self {
        match color {
            ColorType::L8 | ColorType::L16 => ColorMode::Luma,
            ColorType::La8 | ColorType::La16 => ColorMode::LumaAlpha,
            ColorType::Rgba8 | ColorType::Rgba16 | ColorType::Rgba32F => ColorMode::Rgba,
            _ => ColorMode::Rgb,
        }
    }

    /// Whether the mode carries an alpha channel.
    pub fn has_alpha(self) -> bool {
        matches!(self, ColorMode::LumaAlpha | ColorMode::Rgba)
    }
}

/// A decoded file reduced to 8-bit RGB, plus what is needed to write it back.
#[derive(Clone, Debug)]
pub struct LoadedImage {
    /// RGB pixels, alpha discarded.
    pub grid: PixelGrid,
    /// Layout of the source file.
    pub color_mode: ColorMode,
    /// Source alpha plane, one byte per pixel, when the file had one.
    pub alpha: Option<Vec<u8>>,
}

impl LoadedImage {
    /// Converts an already decoded image.
    pub fn from_dynamic(img: &DynamicImage) -> DepixResult<Self> {
        let color_mode = ColorMode::from_color_type(img.color());
        let grid = grid_from_dynamic(img)?;
        let alpha = match color_mode {
            ColorMode::LumaAlpha => Some(img.to_luma_alpha8().pixels().map(|p| p.0[1]).collect()),
            ColorMode::Rgba => Some(img.to_rgba8().pixels().map(|p| p.0[3]).collect()),
            ColorMode::Luma | ColorMode::Rgb => None,
        };
        Ok(Self {
            grid,
            color_mode,
            alpha,
        })
    }

    /// Writes `grid` to `path` using this image's color mode and alpha plane.
    ///
    /// The alpha plane is reused only when `grid` has the source's size;
    /// otherwise the output is fully opaque.
    pub fn save_like<P: AsRef<Path>>(&self, grid: &PixelGrid, path: P) -> DepixResult<()> {
        let alpha = self
            .alpha
            .as_deref()
            .filter(|a| a.len() == grid.pixels().len());
        save_grid(grid, path, self.color_mode, alpha)
    }
}

/// Converts a decoded image to an RGB grid (alpha dropped, 16-bit reduced).
pub fn grid_from_dynamic(img: &DynamicImage) -> DepixResult<PixelGrid> {
    let rgb = img.to_rgb8();
    let width = rgb.width() as usize;
    let height = rgb.height() as usize;
    let data = rgb
        .as_raw()
        .chunks_exact(3)
        .map(|c| Color::new(c[0], c[1], c[2]))
        .collect();
    PixelGrid::new(data, width, height)
}

/// Loads an image file as RGB, remembering its color mode.
pub fn load_image<P: AsRef<Path>>(path: P) -> DepixResult<LoadedImage> {
    let path = path.as_ref();
    let img = image::open(path).map_err(|err| DepixError::ImageIo {
        reason: format!("{}: {err}", path.display()),
    })?;
    LoadedImage::from_dynamic(&img)
}

/// Builds an `image` buffer of `grid` in the requested layout.
pub fn to_dynamic(
    grid: &PixelGrid,
    mode: ColorMode,
    alpha: Option<&[u8]>,
) -> DepixResult<DynamicImage> {
    let too_large = || DepixError::InvalidDimensions {
        width: grid.width(),
        height: grid.height(),
    };
    let width = u32::try_from(grid.width()).map_err(|_| too_large())?;
    let height = u32::try_from(grid.height()).map_err(|_| too_large())?;
    let raw: Vec<u8> = grid.pixels().iter().flat_map(|c| c.channels()).collect();
    let rgb = RgbImage::from_raw(width, height, raw).ok_or_else(too_large)?;
    let alpha_at = |idx: usize| alpha.and_then(|a| a.get(idx).copied()).unwrap_or(u8::MAX);

    Ok(match mode {
        ColorMode::Rgb => DynamicImage::ImageRgb8(rgb),
        ColorMode::Luma => DynamicImage::ImageLuma8(DynamicImage::ImageRgb8(rgb).to_luma8()),
        ColorMode::Rgba => {
            let mut out = RgbaImage::new(width, height);
            for (idx, (dst, src)) in out.pixels_mut().zip(rgb.pixels()).enumerate() {
                dst.0 = [src.0[0], src.0[1], src.0[2], alpha_at(idx)];
            }
            DynamicImage::ImageRgba8(out)
        }
        ColorMode::LumaAlpha => {
            let luma = DynamicImage::ImageRgb8(rgb).to_luma8();
            let mut out = GrayAlphaImage::new(width, height);
            for (idx, (dst, src)) in out.pixels_mut().zip(luma.pixels()).enumerate() {
                dst.0 = [src.0[0], alpha_at(idx)];
            }
            DynamicImage::ImageLumaA8(out)
        }
    })
}

/// Saves `grid` to `path` in `mode`, creating missing parent directories.
/// The file format follows the path's extension.
pub fn save_grid<P: AsRef<Path>>(
    grid: &PixelGrid,
    path: P,
    mode: ColorMode,
    alpha: Option<&[u8]>,
) -> DepixResult<()> {
    let path = path.as_ref();
    let output_err = |reason: String| DepixError::Output {
        path: path.display().to_string(),
        reason,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|err| output_err(err.to_string()))?;
    }
    let img = to_dynamic(grid, mode, alpha)?;
    img.save(path).map_err(|err| output_err(err.to_string()))
}
