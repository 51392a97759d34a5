use crate::vbox::{Component, Vbox};

/// Splits a box in two at the population-weighted median of its longest axis.
///
/// Returns `None` when the box holds at most one populated bucket. Both returned boxes are always populated: the low
/// box covers `[min, split]` and the high box `[split + 1, max]` on the cut axis, the other two axes are unchanged.
pub fn median_cut<'a>(vbox: &Vbox<'a>) -> Option<(Vbox<'a>, Vbox<'a>)> {
    if !vbox.can_split() {
        return None;
    }

    let planes = plane_populations(vbox);

    for component in components_by_extent(vbox) {
        let counts = &planes[component as usize];

        // a cut along this axis can only separate populations if at least two of its planes are populated
        let first = counts.iter().position(|&count| count > 0)?;
        let last = counts.iter().rposition(|&count| count > 0)?;

        if first == last {
            continue;
        }

        let split = find_split_point(counts, vbox.population()).clamp(first, last - 1);
        let (min, max) = vbox.range(component);
        let split = min + split as u8;

        tracing::trace!(?component, min, split, max, population = vbox.population(), "splitting box");

        return Some((
            vbox.with_range(component, (min, split)),
            vbox.with_range(component, (split + 1, max)),
        ));
    }

    None
}

/// Axes ordered from the longest extent to the shortest. Equal extents keep red, green, blue order.
fn components_by_extent(vbox: &Vbox<'_>) -> [Component; 3] {
    let mut components = [Component::Red, Component::Green, Component::Blue];
    components.sort_by(|lhs, rhs| vbox.extent(*rhs).cmp(&vbox.extent(*lhs)));
    components
}

/// Population of every plane of the box, per axis, indexed relative to the box's lower bound.
fn plane_populations(vbox: &Vbox<'_>) -> [Vec<u64>; 3] {
    let (red_min, _) = vbox.range(Component::Red);
    let (green_min, _) = vbox.range(Component::Green);
    let (blue_min, _) = vbox.range(Component::Blue);

    let mut planes = [
        vec![0; vbox.extent(Component::Red) as usize + 1],
        vec![0; vbox.extent(Component::Green) as usize + 1],
        vec![0; vbox.extent(Component::Blue) as usize + 1],
    ];

    vbox.for_each_bucket(|r, g, b, count| {
        if count > 0 {
            planes[0][(r - red_min) as usize] += count;
            planes[1][(g - green_min) as usize] += count;
            planes[2][(b - blue_min) as usize] += count;
        }
    });

    planes
}

/// Index of the first plane at which the running population reaches half of the total.
fn find_split_point(counts: &[u64], population: u64) -> usize {
    let mut sum = 0;

    for (i, count) in counts.iter().enumerate() {
        sum += *count;

        if sum * 2 >= population {
            return i;
        }
    }

    counts.len() - 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::histogram::Histogram;

    fn ranges(vbox: &Vbox<'_>) -> [(u8, u8); 3] {
        [
            vbox.range(Component::Red),
            vbox.range(Component::Green),
            vbox.range(Component::Blue),
        ]
    }

    #[test]
    fn single_bucket_cannot_split() {
        let histogram = Histogram::from_pixels(&[(10, 20, 30), (12, 22, 26)]);
        let vbox = Vbox::from_histogram(&histogram).unwrap();

        assert!(median_cut(&vbox).is_none());
    }

    #[test]
    fn splits_longest_axis_at_weighted_median() {
        let mut pixels = vec![(0, 0, 0); 6];
        pixels.extend([(80, 0, 0), (160, 8, 0), (255, 8, 0)]);
        let histogram = Histogram::from_pixels(&pixels);
        let vbox = Vbox::from_histogram(&histogram).unwrap();

        let (low, high) = median_cut(&vbox).unwrap();

        // six of nine pixels sit on the first red plane, so the median is there and not at the midpoint
        assert_eq!(ranges(&low), [(0, 0), (0, 1), (0, 0)]);
        assert_eq!(ranges(&high), [(1, 31), (0, 1), (0, 0)]);
        assert_eq!(low.population(), 6);
        assert_eq!(high.population(), 3);
    }

    #[test]
    fn equal_extents_prefer_red_then_green() {
        let histogram = Histogram::from_pixels(&[(0, 0, 0), (255, 255, 0)]);
        let vbox = Vbox::from_histogram(&histogram).unwrap();
        let (low, high) = median_cut(&vbox).unwrap();
        assert_eq!(low.range(Component::Red), (0, 0));
        assert_eq!(high.range(Component::Red), (1, 31));

        let histogram = Histogram::from_pixels(&[(0, 0, 0), (0, 255, 255)]);
        let vbox = Vbox::from_histogram(&histogram).unwrap();
        let (low, high) = median_cut(&vbox).unwrap();
        assert_eq!(low.range(Component::Green), (0, 0));
        assert_eq!(high.range(Component::Green), (1, 31));
    }

    #[test]
    fn cut_is_nudged_off_the_last_populated_plane() {
        // the median lands on the top plane; cutting there would leave the high box empty
        let mut pixels = vec![(255, 0, 0); 5];
        pixels.push((0, 0, 0));
        let histogram = Histogram::from_pixels(&pixels);
        let vbox = Vbox::from_histogram(&histogram).unwrap();

        let (low, high) = median_cut(&vbox).unwrap();

        assert_eq!(low.range(Component::Red), (0, 30));
        assert_eq!(high.range(Component::Red), (31, 31));
        assert_eq!(low.population(), 1);
        assert_eq!(high.population(), 5);
    }

    #[test]
    fn falls_back_to_axis_with_populated_planes() {
        let histogram = Histogram::from_pixels(&[(0, 0, 0), (255, 0, 0), (0, 0, 16)]);
        let root = Vbox::from_histogram(&histogram).unwrap();
        let (low, _) = median_cut(&root).unwrap();

        // the low box spans the whole red axis but only a single red plane is populated
        assert_eq!(ranges(&low), [(0, 0), (0, 0), (0, 2)]);

        let wide = Vbox::new(&histogram, (0, 30), (0, 0), (0, 2));
        assert_eq!(wide.population(), 2);

        let (low, high) = median_cut(&wide).unwrap();
        assert_eq!(ranges(&low), [(0, 30), (0, 0), (0, 0)]);
        assert_eq!(ranges(&high), [(0, 30), (0, 0), (1, 2)]);
    }

    #[test]
    fn children_conserve_population() {
        let pixels: Vec<_> = (0..=255u8)
            .step_by(3)
            .map(|v| (v, v.wrapping_mul(7), 255 - v))
            .collect();
        let histogram = Histogram::from_pixels(&pixels);
        let vbox = Vbox::from_histogram(&histogram).unwrap();

        let (low, high) = median_cut(&vbox).unwrap();

        assert_eq!(low.population() + high.population(), vbox.population());
        assert!(low.population() > 0 && high.population() > 0);
    }
}
