/// Speed at which the trail reaches its "fast" end of the gradient.
pub const FULL_SPEED: f32 = 10.0;
/// Hue painted for the fastest samples.
pub const FAST_HUE: i32 = 250;
/// Span of the gradient; slow samples end up at `FAST_HUE + HUE_SPAN`.
pub const HUE_SPAN: f32 = 170.0;
pub const SATURATION: f32 = 100.0;
pub const LIGHTNESS: f32 = 55.0;

/// How hues outside `[0, 360)` are turned into a concrete colour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HuePolicy {
    /// Wrap around the colour wheel, the way CSS `hsl()` reads angles.
    #[default]
    Wrap,
    /// Pin to the nearest end of `[0, 359]`.
    Clamp,
}

impl HuePolicy {
    pub fn normalize(self, hue: i32) -> i32 {
        match self {
            HuePolicy::Wrap => hue.rem_euclid(360),
            HuePolicy::Clamp => hue.clamp(0, 359),
        }
    }
}

/// 8-bit RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

/// Paint for one trail sample. `hue` is kept raw, in `[250, 420]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorDescriptor {
    pub hue: i32,
    pub saturation: f32,
    pub lightness: f32,
}

impl ColorDescriptor {
    /// Maps a speed to the trail gradient: fast is blue-violet, slow wraps
    /// around through magenta and red to yellow.
    pub fn from_speed(speed: f32) -> Self {
        let ratio = if speed.is_nan() {
            0.0
        } else {
            (speed / FULL_SPEED).clamp(0.0, 1.0)
        };
        Self {
            hue: FAST_HUE + ((1.0 - ratio) * HUE_SPAN).round() as i32,
            saturation: SATURATION,
            lightness: LIGHTNESS,
        }
    }

    pub fn to_css(&self, policy: HuePolicy) -> String {
        format!(
            "hsl({}, {}%, {}%)",
            policy.normalize(self.hue),
            self.saturation,
            self.lightness
        )
    }

    pub fn to_rgba(&self, policy: HuePolicy) -> Rgba {
        let hue = policy.normalize(self.hue) as f32;
        let s = self.saturation / 100.0;
        let l = self.lightness / 100.0;

        let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let sector = hue / 60.0;
        let x = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
        let (r, g, b) = match sector as u32 {
            0 => (chroma, x, 0.0),
            1 => (x, chroma, 0.0),
            2 => (0.0, chroma, x),
            3 => (0.0, x, chroma),
            4 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };
        let m = l - chroma / 2.0;
        let channel = |value: f32| ((value + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Rgba::rgb(channel(r), channel(g), channel(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn still_marker_is_the_slow_end() {
        assert_eq!(ColorDescriptor::from_speed(0.0).hue, 420);
        assert_eq!(ColorDescriptor::from_speed(f32::NAN).hue, 420);
    }

    #[test]
    fn fast_marker_saturates_at_250() {
        assert_eq!(ColorDescriptor::from_speed(10.0).hue, 250);
        assert_eq!(ColorDescriptor::from_speed(64.0).hue, 250);
        assert_eq!(ColorDescriptor::from_speed(f32::INFINITY).hue, 250);
    }

    #[test]
    fn hue_never_rises_with_speed() {
        let mut previous = i32::MAX;
        for step in 0..=1000 {
            let hue = ColorDescriptor::from_speed(step as f32 * 0.01).hue;
            assert!(hue <= previous, "hue rose at speed {}", step as f32 * 0.01);
            previous = hue;
        }
    }

    #[test]
    fn saturation_and_lightness_are_fixed() {
        let color = ColorDescriptor::from_speed(3.3);
        assert_eq!(color.hue, 250 + 114);
        assert_eq!(color.saturation, 100.0);
        assert_eq!(color.lightness, 55.0);
    }

    #[test]
    fn policies_disagree_only_above_360() {
        assert_eq!(HuePolicy::Wrap.normalize(420), 60);
        assert_eq!(HuePolicy::Clamp.normalize(420), 359);
        assert_eq!(HuePolicy::Wrap.normalize(250), HuePolicy::Clamp.normalize(250));
    }

    #[test]
    fn css_and_rgb_use_the_wrapped_hue() {
        let slow = ColorDescriptor::from_speed(0.0);
        assert_eq!(slow.to_css(HuePolicy::Wrap), "hsl(60, 100%, 55%)");
        // hsl(60, 100%, 55%) is a saturated yellow.
        let rgba = slow.to_rgba(HuePolicy::Wrap);
        assert_eq!((rgba.r, rgba.g, rgba.a), (255, 255, 255));
        assert!((25..=26).contains(&rgba.b));

        let fast = ColorDescriptor::from_speed(20.0).to_rgba(HuePolicy::Wrap);
        assert!(fast.b > fast.r && fast.r > fast.g);
    }
}
