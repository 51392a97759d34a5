use crate::{
    color_map::ColorMap,
    error::QuantizeError,
    histogram::Histogram,
    median_cut::median_cut,
    vbox::Vbox,
    MAX_COLORS, MIN_COLORS,
};

/// Bound on split attempts per phase, multiplied by the requested color count.
///
/// Every attempt either splits a box or retires it as terminal, so with the default bound a phase runs out of
/// splittable boxes long before reaching it. It only guards against unbounded work.
pub const MAX_ITERATIONS_PER_COLOR: usize = 1000;
/// Share of the requested colors produced by the population-first phase.
pub const DEFAULT_POPULATION_FRACTION: f32 = 1.0;

/// Modified median cut quantizer.
///
/// Quantization runs in two phases over one queue of boxes. The first phase always splits the most populated box,
/// capturing the dominant color masses. The second phase reorders the queue by population × volume, favoring large
/// sparse regions.
///
/// By default the first phase runs all the way to `max_colors`, so the second one only splits when the first phase
/// stopped early. Set [`Quantizer::population_fraction`] below `1.0` (the classic split is `0.75`) to leave the last
/// colors to the population × volume phase, which brings out distinct colors covering only a small part of the image.
#[derive(Debug, Clone)]
pub struct Quantizer {
    max_colors: usize,
    population_fraction: f32,
    max_iterations: Option<usize>,
}

/// Ordering key of the box queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Priority {
    Population,
    PopulationVolume,
}

struct QueuedBox<'a> {
    vbox: Vbox<'a>,
    sequence: usize,
    terminal: bool,
}

/// Boxes awaiting a split, kept sorted so the last entry has the highest key. Equal keys keep the earliest created
/// box last.
pub(crate) struct BoxQueue<'a> {
    boxes: Vec<QueuedBox<'a>>,
    priority: Priority,
    next_sequence: usize,
}

impl Quantizer {
    pub fn new(max_colors: usize) -> Self {
        Self {
            max_colors,
            population_fraction: DEFAULT_POPULATION_FRACTION,
            max_iterations: None,
        }
    }

    /// Sets the share of `max_colors` reached by the population-first phase before switching to population × volume
    /// ordering. Clamped to `0.0..=1.0`.
    pub fn population_fraction(self, population_fraction: f32) -> Self {
        Self {
            population_fraction: population_fraction.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Caps the split attempts of each phase. Defaults to [`MAX_ITERATIONS_PER_COLOR`] × `max_colors`. Hitting the cap
    /// is not an error; the boxes found so far make up the palette.
    pub fn max_iterations(self, max_iterations: usize) -> Self {
        Self {
            max_iterations: Some(max_iterations),
            ..self
        }
    }

    pub fn max_colors(&self) -> usize {
        self.max_colors
    }

    pub fn quantize(&self, pixels: &[(u8, u8, u8)]) -> Result<ColorMap, QuantizeError> {
        if pixels.is_empty() {
            return Err(QuantizeError::EmptyInput);
        }

        if !(MIN_COLORS..=MAX_COLORS).contains(&self.max_colors) {
            return Err(QuantizeError::InvalidColorCount {
                count: self.max_colors,
                min: MIN_COLORS,
                max: MAX_COLORS,
            });
        }

        let histogram = Histogram::from_pixels(pixels);
        let root = Vbox::from_histogram(&histogram).ok_or(QuantizeError::EmptyHistogram)?;

        let mut queue = BoxQueue::new(Priority::Population);
        queue.push(root);

        let first_target = ((self.max_colors as f32 * self.population_fraction).ceil() as usize).max(1);
        self.split_boxes(&mut queue, first_target);

        tracing::debug!(boxes = queue.len(), "population phase finished");

        queue.reprioritize(Priority::PopulationVolume);
        self.split_boxes(&mut queue, self.max_colors);

        tracing::debug!(boxes = queue.len(), "population × volume phase finished");

        Ok(ColorMap::from_boxes(queue.into_boxes()))
    }

    fn split_boxes(&self, queue: &mut BoxQueue<'_>, target: usize) {
        let ceiling = self
            .max_iterations
            .unwrap_or(MAX_ITERATIONS_PER_COLOR * self.max_colors);
        let mut iterations = 0;

        while queue.len() < target {
            if iterations >= ceiling {
                tracing::debug!(iterations, "iteration ceiling reached, keeping the current boxes");
                return;
            }

            iterations += 1;

            // no box left that could be split
            let Some(vbox) = queue.pop_splittable() else {
                return;
            };

            match median_cut(&vbox) {
                Some((low, high)) => {
                    queue.push(low);
                    queue.push(high);
                }
                None => queue.push_terminal(vbox),
            }
        }
    }
}

/// Quantizes the pixels into at most `max_colors` colors, most dominant first.
///
/// Returns `None` if the pixel sequence is empty or `max_colors` is outside of [`MIN_COLORS`]..=[`MAX_COLORS`].
pub fn quantize(pixels: &[(u8, u8, u8)], max_colors: usize) -> Option<ColorMap> {
    match Quantizer::new(max_colors).quantize(pixels) {
        Ok(color_map) => Some(color_map),
        Err(err) => {
            tracing::debug!(%err, "no palette computed");
            None
        }
    }
}

impl Priority {
    fn key(self, vbox: &Vbox<'_>) -> u64 {
        match self {
            Priority::Population => vbox.population(),
            Priority::PopulationVolume => vbox.population() * vbox.volume() as u64,
        }
    }
}

impl QueuedBox<'_> {
    // ascending key; among equal keys the earliest created box sorts last so it pops first
    fn sort_key(&self, priority: Priority) -> (u64, std::cmp::Reverse<usize>) {
        (priority.key(&self.vbox), std::cmp::Reverse(self.sequence))
    }
}

impl<'a> BoxQueue<'a> {
    pub(crate) fn new(priority: Priority) -> Self {
        Self {
            boxes: Vec::new(),
            priority,
            next_sequence: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.boxes.len()
    }

    pub(crate) fn push(&mut self, vbox: Vbox<'a>) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        self.insert(QueuedBox {
            vbox,
            sequence,
            terminal: !vbox.can_split(),
        });
    }

    /// Puts a box back into the queue so that it is never popped for splitting again.
    pub(crate) fn push_terminal(&mut self, vbox: Vbox<'a>) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        self.insert(QueuedBox {
            vbox,
            sequence,
            terminal: true,
        });
    }

    /// Removes the highest priority box that can still be split.
    pub(crate) fn pop_splittable(&mut self) -> Option<Vbox<'a>> {
        let index = self.boxes.iter().rposition(|queued| !queued.terminal)?;
        Some(self.boxes.remove(index).vbox)
    }

    /// Reorders the queue by a different key.
    pub(crate) fn reprioritize(&mut self, priority: Priority) {
        self.priority = priority;
        self.boxes.sort_by_key(|queued| queued.sort_key(priority));
    }

    #[cfg(test)]
    pub(crate) fn populations(&self) -> impl Iterator<Item = u64> + '_ {
        self.boxes.iter().map(|queued| queued.vbox.population())
    }

    /// Consumes the queue, returning the boxes in creation order.
    pub(crate) fn into_boxes(mut self) -> Vec<Vbox<'a>> {
        self.boxes.sort_by_key(|queued| queued.sequence);
        self.boxes.into_iter().map(|queued| queued.vbox).collect()
    }

    fn insert(&mut self, queued: QueuedBox<'a>) {
        let key = queued.sort_key(self.priority);
        let index = self
            .boxes
            .partition_point(|other| other.sort_key(self.priority) <= key);
        self.boxes.insert(index, queued);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient() -> Vec<(u8, u8, u8)> {
        let mut pixels = Vec::new();

        for r in (0..=255u8).step_by(17) {
            for g in (0..=255u8).step_by(51) {
                for b in (0..=255u8).step_by(85) {
                    pixels.push((r, g, b));
                }
            }
        }

        pixels
    }

    #[test]
    fn queue_pops_highest_population_first() {
        let histogram = Histogram::from_pixels(&[(0, 0, 0), (0, 0, 0), (255, 255, 255), (0, 0, 255)]);
        let mut queue = BoxQueue::new(Priority::Population);

        queue.push(Vbox::new(&histogram, (0, 0), (0, 0), (0, 31)));
        queue.push(Vbox::new(&histogram, (31, 31), (31, 31), (31, 31)));
        queue.push(Vbox::new(&histogram, (0, 31), (0, 31), (0, 31)));

        // the single bucket box is terminal and never popped
        assert_eq!(queue.pop_splittable().map(|vbox| vbox.population()), Some(4));
        assert_eq!(queue.pop_splittable().map(|vbox| vbox.population()), Some(3));
        assert!(queue.pop_splittable().is_none());
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn queue_breaks_ties_by_creation_order() {
        let histogram = Histogram::from_pixels(&[(0, 0, 0), (0, 0, 255), (255, 0, 0), (255, 0, 255)]);
        let mut queue = BoxQueue::new(Priority::Population);

        queue.push(Vbox::new(&histogram, (31, 31), (0, 0), (0, 31)));
        queue.push(Vbox::new(&histogram, (0, 0), (0, 0), (0, 31)));

        assert_eq!(queue.pop_splittable().map(|vbox| vbox.range(crate::Component::Red)), Some((31, 31)));
    }

    #[test]
    fn reprioritize_orders_by_population_volume() {
        let histogram = Histogram::from_pixels(&[(0, 0, 0), (0, 0, 0), (0, 0, 8), (255, 0, 0), (255, 255, 255)]);
        let mut queue = BoxQueue::new(Priority::Population);

        // dense and small
        queue.push(Vbox::new(&histogram, (0, 0), (0, 0), (0, 1)));
        // sparse and large
        queue.push(Vbox::new(&histogram, (1, 31), (0, 31), (0, 31)));

        queue.reprioritize(Priority::PopulationVolume);

        assert_eq!(queue.pop_splittable().map(|vbox| vbox.population()), Some(2));
    }

    #[test]
    fn rejects_invalid_input() {
        assert_eq!(Quantizer::new(5).quantize(&[]).unwrap_err(), QuantizeError::EmptyInput);
        assert_eq!(
            Quantizer::new(1).quantize(&[(0, 0, 0)]).unwrap_err(),
            QuantizeError::InvalidColorCount {
                count: 1,
                min: MIN_COLORS,
                max: MAX_COLORS
            }
        );
        assert!(Quantizer::new(21).quantize(&[(0, 0, 0)]).is_err());
        assert!(quantize(&[], 5).is_none());
    }

    #[test]
    fn splits_conserve_population() {
        let pixels = gradient();
        let histogram = Histogram::from_pixels(&pixels);
        let quantizer = Quantizer::new(12);

        let mut queue = BoxQueue::new(Priority::Population);
        queue.push(Vbox::from_histogram(&histogram).unwrap());

        for target in 2..=12 {
            quantizer.split_boxes(&mut queue, target);

            assert_eq!(queue.len(), target);
            assert_eq!(queue.populations().sum::<u64>(), histogram.population());
        }
    }

    #[test]
    fn second_phase_fills_up_to_max_colors() {
        let pixels = gradient();

        let color_map = Quantizer::new(10).population_fraction(0.5).quantize(&pixels).unwrap();
        assert_eq!(color_map.len(), 10);

        let color_map = Quantizer::new(10).population_fraction(0.0).quantize(&pixels).unwrap();
        assert_eq!(color_map.len(), 10);
    }

    #[test]
    fn stops_when_every_box_is_terminal() {
        let pixels = [(0, 0, 0), (255, 255, 255), (0, 0, 0)];
        let color_map = Quantizer::new(20).quantize(&pixels).unwrap();

        assert_eq!(color_map.len(), 2);
    }

    #[test]
    fn iteration_ceiling_keeps_boxes_found_so_far() {
        let pixels = gradient();

        // three splits per phase
        let color_map = Quantizer::new(10).max_iterations(3).quantize(&pixels).unwrap();
        assert_eq!(color_map.len(), 7);

        let total: u64 = color_map.swatches().iter().map(|swatch| swatch.population()).sum();
        assert_eq!(total, pixels.len() as u64);

        let color_map = Quantizer::new(10).max_iterations(0).quantize(&pixels).unwrap();
        assert_eq!(color_map.len(), 1);
    }

    #[test]
    fn population_fraction_is_clamped() {
        let quantizer = Quantizer::new(8).population_fraction(4.0);
        assert_eq!(quantizer.population_fraction, 1.0);
        assert_eq!(quantizer.max_colors(), 8);
    }
}
