/// Number of bits kept from each 8-bit channel when building the histogram.
pub const SIGNIFICANT_BITS: u32 = 5;
/// Number of low bits discarded from each channel.
pub const RIGHT_SHIFT: u32 = 8 - SIGNIFICANT_BITS;

/// Largest reduced channel value.
pub(crate) const REDUCED_MAX: u8 = (1 << SIGNIFICANT_BITS) - 1;
const HISTOGRAM_SIZE: usize = 1 << (3 * SIGNIFICANT_BITS);

#[derive(Debug, Clone, Copy, Default)]
struct Bucket {
    count: u64,
    // sums of the original 8-bit channel values that landed in this bucket
    red_sum: u64,
    green_sum: u64,
    blue_sum: u64,
}

/// Population counts over the reduced 32×32×32 color cube.
///
/// Every bucket also keeps the sums of the full precision channel values of the pixels counted into it, so the
/// average color of any region of the cube can be reconstructed without rounding towards the bucket center.
#[derive(Debug, Clone)]
pub struct Histogram {
    buckets: Vec<Bucket>,
    population: u64,
    distinct_colors: usize,
    // min, max of the populated reduced coordinates
    red_range: (u8, u8),
    green_range: (u8, u8),
    blue_range: (u8, u8),
}

impl Histogram {
    pub fn from_pixels(pixels: &[(u8, u8, u8)]) -> Self {
        let mut buckets = vec![Bucket::default(); HISTOGRAM_SIZE];
        let mut population = 0;
        let mut distinct_colors = 0;

        let (mut min_red, mut max_red) = (REDUCED_MAX, 0);
        let (mut min_green, mut max_green) = (REDUCED_MAX, 0);
        let (mut min_blue, mut max_blue) = (REDUCED_MAX, 0);

        for &(red, green, blue) in pixels {
            let (r, g, b) = reduce_color((red, green, blue));
            let bucket = &mut buckets[color_index(r, g, b)];

            if bucket.count == 0 {
                distinct_colors += 1;
            }

            bucket.count += 1;
            bucket.red_sum += red as u64;
            bucket.green_sum += green as u64;
            bucket.blue_sum += blue as u64;
            population += 1;

            min_red = min_red.min(r);
            max_red = max_red.max(r);
            min_green = min_green.min(g);
            max_green = max_green.max(g);
            min_blue = min_blue.min(b);
            max_blue = max_blue.max(b);
        }

        tracing::debug!(population, distinct_colors, "built color histogram");

        Self {
            buckets,
            population,
            distinct_colors,
            red_range: (min_red, max_red),
            green_range: (min_green, max_green),
            blue_range: (min_blue, max_blue),
        }
    }

    /// Total number of pixels counted.
    pub fn population(&self) -> u64 {
        self.population
    }

    /// Number of populated buckets.
    pub fn distinct_colors(&self) -> usize {
        self.distinct_colors
    }

    pub fn is_empty(&self) -> bool {
        self.population == 0
    }

    /// Population of the bucket at the given reduced coordinates.
    pub fn count(&self, r: u8, g: u8, b: u8) -> u64 {
        self.bucket(r, g, b).count
    }

    /// Bounding ranges of every populated bucket, as `(red, green, blue)` inclusive `(min, max)` pairs. `None` for an
    /// empty histogram.
    pub fn bounds(&self) -> Option<((u8, u8), (u8, u8), (u8, u8))> {
        if self.is_empty() {
            None
        } else {
            Some((self.red_range, self.green_range, self.blue_range))
        }
    }

    /// Returns the count and channel sums of a bucket.
    pub(crate) fn sums(&self, r: u8, g: u8, b: u8) -> (u64, u64, u64, u64) {
        let bucket = self.bucket(r, g, b);
        (bucket.count, bucket.red_sum, bucket.green_sum, bucket.blue_sum)
    }

    fn bucket(&self, r: u8, g: u8, b: u8) -> &Bucket {
        &self.buckets[color_index(r, g, b)]
    }
}

/// Reduces a full precision color to histogram coordinates.
pub fn reduce_color((r, g, b): (u8, u8, u8)) -> (u8, u8, u8) {
    (r >> RIGHT_SHIFT, g >> RIGHT_SHIFT, b >> RIGHT_SHIFT)
}

/// Expands a reduced channel value back to 8 bits, landing at the center of its bucket.
pub(crate) fn bucket_center(value: u32) -> u32 {
    (value << RIGHT_SHIFT) + (1 << (RIGHT_SHIFT - 1))
}

// red is the most significant component, blue the least
fn color_index(r: u8, g: u8, b: u8) -> usize {
    ((r as usize) << (2 * SIGNIFICANT_BITS)) | ((g as usize) << SIGNIFICANT_BITS) | b as usize
}
