use glam::Vec3;

/// Piecewise-linear colour ramp over evenly spaced stops
#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    stops: Vec<Vec3>,
}

impl Gradient {
    pub fn from_hex(colors: &[u32]) -> Self {
        Self {
            stops: colors.iter().map(|&hex| hex_to_rgb(hex)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Colour at `ratio` in `[0, 1]`, clamped. Black for an empty ramp.
    pub fn color_at(&self, ratio: f32) -> Vec3 {
        let Some(&last) = self.stops.last() else {
            return Vec3::ZERO;
        };
        let scaled = ratio.clamp(0.0, 1.0) * (self.stops.len() - 1) as f32;
        let idx = scaled.floor() as usize;
        if idx >= self.stops.len() - 1 {
            return last;
        }
        let alpha = scaled - idx as f32;
        self.stops[idx].lerp(self.stops[idx + 1], alpha)
    }

    /// One colour per instance, or `None` when there is nothing to blend
    pub fn instance_colors(&self, count: usize) -> Option<Vec<Vec3>> {
        if self.stops.len() < 2 {
            return None;
        }
        Some(
            (0..count)
                .map(|i| self.color_at(i as f32 / count as f32))
                .collect(),
        )
    }
}

/// `0xRRGGBB` to channels in `[0, 1]`
pub fn hex_to_rgb(hex: u32) -> Vec3 {
    Vec3::new(
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    )
}
