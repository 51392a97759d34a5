use crate::histogram::{bucket_center, Histogram};

/// An axis-aligned box over the reduced color cube.
///
/// The bounds are inclusive on every axis. The population and the number of populated buckets inside the box are
/// counted once when the box is created; everything else is derived from the bounds and the histogram.
#[derive(Debug, Clone, Copy)]
pub struct Vbox<'a> {
    histogram: &'a Histogram,
    red_range: (u8, u8),
    green_range: (u8, u8),
    blue_range: (u8, u8),
    population: u64,
    colors: u32,
}

/// Axis of the color cube.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Red,
    Green,
    Blue,
}

impl<'a> Vbox<'a> {
    /// Creates the box bounding every populated bucket of the histogram. `None` if the histogram is empty.
    pub fn from_histogram(histogram: &'a Histogram) -> Option<Self> {
        let (red_range, green_range, blue_range) = histogram.bounds()?;
        Some(Self::new(histogram, red_range, green_range, blue_range))
    }

    pub fn new(histogram: &'a Histogram, red_range: (u8, u8), green_range: (u8, u8), blue_range: (u8, u8)) -> Self {
        debug_assert!(red_range.0 <= red_range.1 && green_range.0 <= green_range.1 && blue_range.0 <= blue_range.1);

        let mut vbox = Self {
            histogram,
            red_range,
            green_range,
            blue_range,
            population: 0,
            colors: 0,
        };

        // scan only the buckets within the bounds
        let (mut population, mut colors) = (0, 0);
        vbox.for_each_bucket(|_, _, _, count| {
            if count > 0 {
                population += count;
                colors += 1;
            }
        });

        vbox.population = population;
        vbox.colors = colors;
        vbox
    }

    pub fn range(&self, component: Component) -> (u8, u8) {
        match component {
            Component::Red => self.red_range,
            Component::Green => self.green_range,
            Component::Blue => self.blue_range,
        }
    }

    /// Returns a copy of this box with the range of one component replaced.
    pub(crate) fn with_range(&self, component: Component, range: (u8, u8)) -> Vbox<'a> {
        let (mut red_range, mut green_range, mut blue_range) = (self.red_range, self.green_range, self.blue_range);

        match component {
            Component::Red => red_range = range,
            Component::Green => green_range = range,
            Component::Blue => blue_range = range,
        }

        Vbox::new(self.histogram, red_range, green_range, blue_range)
    }

    /// Distance between the lowest and highest coordinate on the given axis.
    pub fn extent(&self, component: Component) -> u8 {
        let (min, max) = self.range(component);
        max - min
    }

    pub fn volume(&self) -> u32 {
        (self.red_range.1 - self.red_range.0 + 1) as u32
            * (self.green_range.1 - self.green_range.0 + 1) as u32
            * (self.blue_range.1 - self.blue_range.0 + 1) as u32
    }

    pub fn population(&self) -> u64 {
        self.population
    }

    /// Number of populated buckets inside the box.
    pub fn color_count(&self) -> u32 {
        self.colors
    }

    /// A box with at most one populated bucket is terminal.
    pub fn can_split(&self) -> bool {
        self.colors > 1
    }

    /// Population-weighted mean of the original pixel values inside the box, rounded to the nearest integer per
    /// channel.
    pub fn average_color(&self) -> (u8, u8, u8) {
        let (mut red_sum, mut green_sum, mut blue_sum) = (0u64, 0u64, 0u64);
        let mut total = 0u64;

        for r in self.red_range.0..=self.red_range.1 {
            for g in self.green_range.0..=self.green_range.1 {
                for b in self.blue_range.0..=self.blue_range.1 {
                    let (count, red, green, blue) = self.histogram.sums(r, g, b);

                    if count > 0 {
                        total += count;
                        red_sum += red;
                        green_sum += green;
                        blue_sum += blue;
                    }
                }
            }
        }

        if total == 0 {
            // nothing to weigh by, fall back to the center of the box
            let center = |(min, max): (u8, u8)| ((bucket_center(min as u32) + bucket_center(max as u32)) / 2) as u8;
            return (center(self.red_range), center(self.green_range), center(self.blue_range));
        }

        let mean = |sum: u64| ((sum + total / 2) / total) as u8;
        (mean(red_sum), mean(green_sum), mean(blue_sum))
    }

    /// Calls `f(r, g, b, count)` for every bucket inside the box, red outermost.
    pub(crate) fn for_each_bucket<F>(&self, mut f: F)
    where
        F: FnMut(u8, u8, u8, u64),
    {
        for r in self.red_range.0..=self.red_range.1 {
            for g in self.green_range.0..=self.green_range.1 {
                for b in self.blue_range.0..=self.blue_range.1 {
                    f(r, g, b, self.histogram.count(r, g, b));
                }
            }
        }
    }
}
