use crate::{histogram::reduce_color, swatch::Swatch, vbox::Component, vbox::Vbox};

/// The result of a quantization: palette colors ordered from the most to the least dominant, and lookups from an
/// arbitrary color to its palette color.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColorMap {
    entries: Vec<Entry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
struct Entry {
    swatch: Swatch,
    // reduced coordinate bounds of the box this color was averaged from
    red_range: (u8, u8),
    green_range: (u8, u8),
    blue_range: (u8, u8),
}

impl ColorMap {
    /// Builds the map from terminal boxes given in creation order.
    pub(crate) fn from_boxes(mut boxes: Vec<Vbox<'_>>) -> Self {
        // stable sort, so boxes with equal keys stay in creation order
        boxes.sort_by(|lhs, rhs| {
            let lhs_key = (lhs.population(), lhs.population() * lhs.volume() as u64);
            let rhs_key = (rhs.population(), rhs.population() * rhs.volume() as u64);
            rhs_key.cmp(&lhs_key)
        });

        let entries = boxes
            .iter()
            .map(|vbox| Entry {
                swatch: Swatch::new(vbox.average_color(), vbox.population()),
                red_range: vbox.range(Component::Red),
                green_range: vbox.range(Component::Green),
                blue_range: vbox.range(Component::Blue),
            })
            .collect();

        Self { entries }
    }

    /// Palette colors, most dominant first.
    pub fn palette(&self) -> Vec<(u8, u8, u8)> {
        self.entries.iter().map(|entry| entry.swatch.rgb()).collect()
    }

    pub fn swatches(&self) -> Vec<Swatch> {
        self.entries.iter().map(|entry| entry.swatch).collect()
    }

    /// The most dominant color.
    pub fn dominant_color(&self) -> Option<(u8, u8, u8)> {
        self.entries.first().map(|entry| entry.swatch.rgb())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The palette color closest to `rgb` by squared euclidean distance. Ties go to the more dominant color.
    pub fn nearest_color(&self, rgb: (u8, u8, u8)) -> Option<(u8, u8, u8)> {
        self.entries
            .iter()
            .map(|entry| entry.swatch.rgb())
            .min_by_key(|&color| distance_squared(color, rgb))
    }

    /// The color of the box `rgb` falls into, or the nearest palette color if it falls into none of them.
    pub fn map(&self, rgb: (u8, u8, u8)) -> Option<(u8, u8, u8)> {
        self.entries
            .iter()
            .find(|entry| entry.contains(rgb))
            .map(|entry| entry.swatch.rgb())
            .or_else(|| self.nearest_color(rgb))
    }
}

impl Entry {
    fn contains(&self, rgb: (u8, u8, u8)) -> bool {
        let (r, g, b) = reduce_color(rgb);

        (self.red_range.0..=self.red_range.1).contains(&r)
            && (self.green_range.0..=self.green_range.1).contains(&g)
            && (self.blue_range.0..=self.blue_range.1).contains(&b)
    }
}

fn distance_squared(lhs: (u8, u8, u8), rhs: (u8, u8, u8)) -> u32 {
    let dr = lhs.0 as i32 - rhs.0 as i32;
    let dg = lhs.1 as i32 - rhs.1 as i32;
    let db = lhs.2 as i32 - rhs.2 as i32;

    (dr * dr + dg * dg + db * db) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::histogram::Histogram;

    fn color_map(histogram: &Histogram) -> ColorMap {
        // two boxes covering the low and high red halves of the cube
        ColorMap::from_boxes(vec![
            Vbox::new(histogram, (0, 15), (0, 31), (0, 31)),
            Vbox::new(histogram, (16, 31), (0, 31), (0, 31)),
        ])
    }

    #[test]
    fn orders_by_population() {
        let histogram = Histogram::from_pixels(&[(0, 0, 0), (200, 0, 0), (200, 0, 0)]);
        let color_map = color_map(&histogram);

        assert_eq!(color_map.palette(), vec![(200, 0, 0), (0, 0, 0)]);
        assert_eq!(color_map.dominant_color(), Some((200, 0, 0)));
        assert_eq!(color_map.swatches()[1].population(), 1);
        assert_eq!(color_map.len(), 2);
    }

    #[test]
    fn equal_population_prefers_larger_box() {
        let histogram = Histogram::from_pixels(&[(0, 0, 0), (0, 0, 255)]);
        let color_map = ColorMap::from_boxes(vec![
            Vbox::new(&histogram, (0, 0), (0, 0), (0, 0)),
            Vbox::new(&histogram, (0, 0), (0, 0), (1, 31)),
        ]);

        assert_eq!(color_map.palette(), vec![(0, 0, 255), (0, 0, 0)]);
    }

    #[test]
    fn nearest_color_ties_go_to_first_entry() {
        let histogram = Histogram::from_pixels(&[(0, 0, 0), (200, 0, 0), (200, 0, 0)]);
        let color_map = color_map(&histogram);

        assert_eq!(color_map.nearest_color((190, 10, 10)), Some((200, 0, 0)));
        assert_eq!(color_map.nearest_color((10, 0, 0)), Some((0, 0, 0)));
        assert_eq!(color_map.nearest_color((100, 0, 0)), Some((200, 0, 0)));
    }

    #[test]
    fn map_prefers_containing_box() {
        let histogram = Histogram::from_pixels(&[(120, 0, 0), (255, 0, 0), (255, 0, 0)]);
        let color_map = color_map(&histogram);

        // closer to the low box color, but inside the high red box
        assert_eq!(color_map.map((130, 0, 0)), Some((255, 0, 0)));
        assert_eq!(color_map.nearest_color((130, 0, 0)), Some((120, 0, 0)));
        assert_eq!(color_map.map((127, 0, 0)), Some((120, 0, 0)));
    }

    #[test]
    fn map_falls_back_to_nearest_color() {
        let histogram = Histogram::from_pixels(&[(0, 0, 0), (64, 64, 64)]);
        let color_map = ColorMap::from_boxes(vec![
            Vbox::new(&histogram, (0, 0), (0, 0), (0, 0)),
            Vbox::new(&histogram, (8, 8), (8, 8), (8, 8)),
        ]);

        assert_eq!(color_map.map((250, 250, 250)), Some((64, 64, 64)));
    }
}
