/// Pixels with an alpha below this are considered transparent.
pub const MIN_ALPHA: u8 = 125;
/// Pixels with every channel above this are considered white.
pub const WHITE_THRESHOLD: u8 = 250;

/// A trait used to implement filters for the pixel sampling process.
///
/// Before quantization, every sampled pixel is passed through the filters and only pixels allowed by all of them are
/// counted. This trait allows the library consumer to implement custom filters.
///
/// See [`crate::PaletteBuilder::add_filter`] on how to add filters to the sampling process.
pub trait Filter {
    /// Return whether a given pixel should be sampled or not. The pixel is given as red, green, blue and alpha.
    fn is_allowed(&self, rgba: (u8, u8, u8, u8)) -> bool;
}

/// The default filter included in every [`crate::PaletteBuilder`] by default.
///
/// This filter will disallow mostly transparent pixels and pixels very close to white.
#[derive(Debug)]
pub struct DefaultFilter;
impl Filter for DefaultFilter {
    fn is_allowed(&self, (r, g, b, a): (u8, u8, u8, u8)) -> bool {
        !is_transparent(a) && !is_white(r, g, b)
    }
}

impl<F> Filter for F
where
    F: Fn((u8, u8, u8, u8)) -> bool,
{
    fn is_allowed(&self, rgba: (u8, u8, u8, u8)) -> bool {
        self(rgba)
    }
}

fn is_transparent(a: u8) -> bool {
    a < MIN_ALPHA
}

fn is_white(r: u8, g: u8, b: u8) -> bool {
    r > WHITE_THRESHOLD && g > WHITE_THRESHOLD && b > WHITE_THRESHOLD
}
