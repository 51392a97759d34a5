// Copyright 2022 Spanfile
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A library to extract a small, representative color palette from an image.
//!
//! Colors are found with modified median cut quantization (MMCQ): pixels are counted into a 32×32×32 histogram, and
//! the box bounding the histogram is repeatedly cut at the population median of its longest axis until the
//! requested number of colors is reached. By default every cut goes to the most populated box. With
//! [`Quantizer::population_fraction`] below `1.0` the remaining cuts go to boxes that are both populated and large, so
//! small but distinct color regions still get a palette entry.
//!
//! The quantizer works on plain RGB triples, see [`quantize`]. [`PaletteBuilder`] samples them from an image first.
//!
//! ```
//! let pixels = [(255, 0, 0), (255, 0, 0), (255, 0, 0), (0, 0, 255)];
//! let color_map = color_cut::quantize(&pixels, 2).unwrap();
//!
//! assert_eq!(color_map.palette(), vec![(255, 0, 0), (0, 0, 255)]);
//! ```

mod color_map;
mod error;
mod filter;
mod histogram;
mod median_cut;
mod quantizer;
mod sampling;
mod swatch;
mod vbox;

pub const MIN_COLORS: usize = 2;
pub const MAX_COLORS: usize = 20;
pub const DEFAULT_COLOR_COUNT: usize = 10;
pub const MIN_QUALITY: usize = 1;
pub const MAX_QUALITY: usize = 10;
pub const DEFAULT_QUALITY: usize = 10;
pub const DOMINANT_COLOR_COUNT: usize = 5;

pub use crate::{
    color_map::ColorMap,
    error::QuantizeError,
    filter::{DefaultFilter, Filter, MIN_ALPHA, WHITE_THRESHOLD},
    histogram::{reduce_color, Histogram, RIGHT_SHIFT, SIGNIFICANT_BITS},
    median_cut::median_cut,
    quantizer::{quantize, Quantizer, DEFAULT_POPULATION_FRACTION, MAX_ITERATIONS_PER_COLOR},
    swatch::Swatch,
    vbox::{Component, Vbox},
};
pub use image;
pub use palette;

use image::{math::Rect, GenericImageView, ImageBuffer};
use palette::IntoColor;

pub struct PaletteBuilder<P>
where
    P: image::Pixel<Subpixel = u8> + 'static,
{
    image: ImageBuffer<P, Vec<<P as image::Pixel>::Subpixel>>,
    color_count: usize,
    quality: usize,
    region: Option<Rect>,
    filters: Vec<Box<dyn Filter>>,
}

impl<P> PaletteBuilder<P>
where
    P: image::Pixel<Subpixel = u8> + 'static,
{
    pub fn from_image(image: ImageBuffer<P, Vec<<P as image::Pixel>::Subpixel>>) -> Self {
        Self {
            image,
            color_count: DEFAULT_COLOR_COUNT,
            quality: DEFAULT_QUALITY,
            region: None,
            filters: vec![Box::new(DefaultFilter)],
        }
    }

    /// Number of colors to extract, clamped to [`MIN_COLORS`]..=[`MAX_COLORS`].
    pub fn color_count(self, color_count: usize) -> Self {
        Self {
            color_count: color_count.clamp(MIN_COLORS, MAX_COLORS),
            ..self
        }
    }

    /// Sample every `quality`-th pixel, clamped to [`MIN_QUALITY`]..=[`MAX_QUALITY`]. Lower is slower but more
    /// accurate.
    pub fn quality(self, quality: usize) -> Self {
        Self {
            quality: quality.clamp(MIN_QUALITY, MAX_QUALITY),
            ..self
        }
    }

    /// Only sample pixels within the given rectangle. The rectangle is cut to fit the image.
    pub fn region(self, x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            region: Some(Rect { x, y, width, height }),
            ..self
        }
    }

    pub fn add_filter<F>(mut self, filter: F) -> Self
    where
        F: Filter + 'static,
    {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn clear_region(self) -> Self {
        Self { region: None, ..self }
    }

    pub fn clear_filters(self) -> Self {
        Self {
            filters: Vec::new(),
            ..self
        }
    }

    /// Samples the image and quantizes the sampled pixels. `None` if no pixel passed the filters.
    pub fn generate(&self) -> Option<ColorMap> {
        self.generate_with_count(self.color_count)
    }

    /// The most dominant color of the image.
    pub fn dominant_color(&self) -> Option<(u8, u8, u8)> {
        self.generate_with_count(DOMINANT_COLOR_COUNT)?.dominant_color()
    }

    /// Mean color of the sampled opaque pixels. The filters are not applied.
    pub fn average_color(&self) -> Option<(u8, u8, u8)> {
        let (x, y, width, height) = self.bounds()?;
        sampling::average_color(&*self.image.view(x, y, width, height), self.quality)
    }

    /// The pixels that would be quantized.
    pub fn sample_pixels(&self) -> Vec<(u8, u8, u8)> {
        match self.bounds() {
            Some((x, y, width, height)) => {
                sampling::sample_pixels(&*self.image.view(x, y, width, height), self.quality, &self.filters)
            }
            None => Vec::new(),
        }
    }

    fn generate_with_count(&self, color_count: usize) -> Option<ColorMap> {
        let pixels = self.sample_pixels();

        if pixels.is_empty() {
            tracing::debug!("no pixels sampled from image");
            return None;
        }

        quantize(&pixels, color_count)
    }

    // the sampled rectangle, cut to fit within the image; None if nothing of it remains
    fn bounds(&self) -> Option<(u32, u32, u32, u32)> {
        let (image_width, image_height) = self.image.dimensions();

        let (x, y, width, height) = match self.region {
            Some(region) => (region.x, region.y, region.width, region.height),
            None => (0, 0, image_width, image_height),
        };

        if x >= image_width || y >= image_height {
            return None;
        }

        let width = width.min(image_width - x);
        let height = height.min(image_height - y);

        if width == 0 || height == 0 {
            None
        } else {
            Some((x, y, width, height))
        }
    }
}

/// Formats a color as a lower case `#rrggbb` string.
pub fn rgb_to_hex((r, g, b): (u8, u8, u8)) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// Converts a color to hue in whole degrees, saturation and lightness in whole percent.
pub fn rgb_to_hsl(rgb: (u8, u8, u8)) -> (u16, u8, u8) {
    let (h, s, l) = hsl_components(rgb);
    (h.round() as u16, (s * 100.0).round() as u8, (l * 100.0).round() as u8)
}

fn hsl_components(rgb: (u8, u8, u8)) -> (f32, f32, f32) {
    let raw = palette::Srgb::from_components(rgb);
    let raw_float: palette::Srgb<f32> = raw.into_format();
    let hsl: palette::Hsl = raw_float.into_color();
    let (h, s, l) = hsl.into_components();

    (h.into_positive_degrees(), s, l)
}
