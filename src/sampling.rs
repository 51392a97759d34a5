use crate::filter::{Filter, MIN_ALPHA};
use image::GenericImageView;

/// Collects every `stride`-th pixel of the view that all filters allow, as red, green, blue.
pub(crate) fn sample_pixels<V>(view: &V, stride: usize, filters: &[Box<dyn Filter>]) -> Vec<(u8, u8, u8)>
where
    V: GenericImageView,
    V::Pixel: image::Pixel<Subpixel = u8>,
{
    view.pixels()
        .step_by(stride.max(1))
        .map(|(_, _, pixel)| pixel_to_rgba(&pixel))
        .filter(|&rgba| filters.iter().all(|filter| filter.is_allowed(rgba)))
        .map(|(r, g, b, _)| (r, g, b))
        .collect()
}

/// Mean color of every `stride`-th opaque pixel of the view, each channel rounded down.
pub(crate) fn average_color<V>(view: &V, stride: usize) -> Option<(u8, u8, u8)>
where
    V: GenericImageView,
    V::Pixel: image::Pixel<Subpixel = u8>,
{
    let (count, red_sum, green_sum, blue_sum) = view
        .pixels()
        .step_by(stride.max(1))
        .map(|(_, _, pixel)| pixel_to_rgba(&pixel))
        .filter(|&(_, _, _, a)| a > MIN_ALPHA)
        .fold((0u64, 0u64, 0u64, 0u64), |(count, red_sum, green_sum, blue_sum), (r, g, b, _)| {
            (
                count + 1,
                red_sum + r as u64,
                green_sum + g as u64,
                blue_sum + b as u64,
            )
        });

    if count == 0 {
        return None;
    }

    let mean = |sum: u64| (sum / count) as u8;
    Some((mean(red_sum), mean(green_sum), mean(blue_sum)))
}

fn pixel_to_rgba<P>(pixel: &P) -> (u8, u8, u8, u8)
where
    P: image::Pixel<Subpixel = u8>,
{
    let rgba = pixel.to_rgba();
    (rgba.0[0], rgba.0[1], rgba.0[2], rgba.0[3])
}
