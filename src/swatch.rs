/// A palette color together with the number of sampled pixels it represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Swatch {
    red: u8,
    green: u8,
    blue: u8,
    population: u64,
}

impl Swatch {
    pub fn new((red, green, blue): (u8, u8, u8), population: u64) -> Swatch {
        Self {
            red,
            green,
            blue,
            population,
        }
    }

    pub fn rgb(self) -> (u8, u8, u8) {
        (self.red, self.green, self.blue)
    }

    /// Hue in degrees, saturation and lightness in `0.0..=1.0`.
    pub fn hsl(self) -> (f32, f32, f32) {
        crate::hsl_components(self.rgb())
    }

    /// Lower case `#rrggbb` string.
    pub fn hex(self) -> String {
        crate::rgb_to_hex(self.rgb())
    }

    pub fn population(self) -> u64 {
        self.population
    }
}
