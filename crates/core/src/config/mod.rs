use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{PintographError, Result};

/// Every tunable parameter of the mechanism, named the way the panel shows them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Param {
    Width,
    WheelsX,
    WheelsY,
    WheelLRadius,
    WheelRRadius,
    WheelsSeparation,
    ArmsPadding,
    ArmsJoint,
    ArmLLength,
    ArmRLength,
    ArmsWidth,
    CrankLOffset,
    CrankROffset,
    SpeedL,
    SpeedR,
    TrailLength,
    TrailWidth,
}

impl Param {
    pub const ALL: [Param; 17] = [
        Param::Width,
        Param::WheelsX,
        Param::WheelsY,
        Param::WheelLRadius,
        Param::WheelRRadius,
        Param::WheelsSeparation,
        Param::ArmsPadding,
        Param::ArmsJoint,
        Param::ArmLLength,
        Param::ArmRLength,
        Param::ArmsWidth,
        Param::CrankLOffset,
        Param::CrankROffset,
        Param::SpeedL,
        Param::SpeedR,
        Param::TrailLength,
        Param::TrailWidth,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Param::Width => "width",
            Param::WheelsX => "wheels_x",
            Param::WheelsY => "wheels_y",
            Param::WheelLRadius => "wheelL_radius",
            Param::WheelRRadius => "wheelR_radius",
            Param::WheelsSeparation => "wheels_separation",
            Param::ArmsPadding => "arms_padding",
            Param::ArmsJoint => "arms_joint",
            Param::ArmLLength => "armL_length",
            Param::ArmRLength => "armR_length",
            Param::ArmsWidth => "arms_width",
            Param::CrankLOffset => "crankL_offset",
            Param::CrankROffset => "crankR_offset",
            Param::SpeedL => "speedL",
            Param::SpeedR => "speedR",
            Param::TrailLength => "trail_length",
            Param::TrailWidth => "trail_width",
        }
    }

    /// Declared valid range and liveness of the parameter.
    pub fn spec(self) -> ParamSpec {
        let (min, max, live) = match self {
            Param::Width => (200.0, 4000.0, false),
            Param::WheelsX => (0.0, 1200.0, false),
            Param::WheelsY => (0.0, 800.0, false),
            Param::WheelLRadius | Param::WheelRRadius => (10.0, 400.0, false),
            Param::WheelsSeparation => (200.0, 400.0, true),
            Param::ArmsPadding => (0.0, 100.0, false),
            Param::ArmsJoint => (0.0, 1.0, false),
            Param::ArmLLength | Param::ArmRLength => (50.0, 1000.0, false),
            Param::ArmsWidth => (1.0, 100.0, false),
            Param::CrankLOffset | Param::CrankROffset => (0.0, 400.0, false),
            Param::SpeedL | Param::SpeedR => (0.01, 1.0, true),
            Param::TrailLength => (0.0, 2000.0, true),
            Param::TrailWidth => (1.0, 40.0, true),
        };
        ParamSpec {
            min,
            max,
            live,
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Param {
    type Err = PintographError;

    fn from_str(s: &str) -> Result<Self> {
        Param::ALL
            .into_iter()
            .find(|param| param.as_str() == s)
            .ok_or_else(|| PintographError::UnknownParameter(s.to_string()))
    }
}

/// Declared range of a parameter. `live` parameters take effect on the next
/// tick or frame; the rest are only read when the mechanism is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub min: f32,
    pub max: f32,
    pub live: bool,
}

impl ParamSpec {
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Numeric parameters of the mechanism, the trail and the display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveConfig {
    pub width: f32,
    pub wheels_x: f32,
    pub wheels_y: f32,
    #[serde(rename = "wheelL_radius")]
    pub wheel_l_radius: f32,
    #[serde(rename = "wheelR_radius")]
    pub wheel_r_radius: f32,
    pub wheels_separation: f32,
    pub arms_padding: f32,
    /// Where the right arm links onto the left arm, as a fraction of the left
    /// arm's half span measured from its centre towards the marker end.
    pub arms_joint: f32,
    #[serde(rename = "armL_length")]
    pub arm_l_length: f32,
    #[serde(rename = "armR_length")]
    pub arm_r_length: f32,
    pub arms_width: f32,
    /// Distance of the left arm's pivot from the left wheel's centre.
    #[serde(rename = "crankL_offset")]
    pub crank_l_offset: f32,
    #[serde(rename = "crankR_offset")]
    pub crank_r_offset: f32,
    /// Radians added to the left wheel every physics tick.
    #[serde(rename = "speedL")]
    pub speed_l: f32,
    #[serde(rename = "speedR")]
    pub speed_r: f32,
    pub trail_length: f32,
    pub trail_width: f32,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            wheels_x: 600.0,
            wheels_y: 600.0,
            wheel_l_radius: 150.0,
            wheel_r_radius: 100.0,
            wheels_separation: 300.0,
            arms_padding: 10.0,
            arms_joint: 0.375,
            arm_l_length: 500.0,
            arm_r_length: 300.0,
            arms_width: 20.0,
            crank_l_offset: 110.0,
            crank_r_offset: 90.0,
            speed_l: 0.1,
            speed_r: 0.1,
            trail_length: 200.0,
            trail_width: 5.0,
        }
    }
}

impl LiveConfig {
    /// Number of samples the trail may hold once it has caught up.
    pub fn trail_capacity(&self) -> usize {
        if self.trail_length.is_finite() && self.trail_length > 0.0 {
            self.trail_length.round() as usize
        } else {
            0
        }
    }

    pub fn get(&self, param: Param) -> f32 {
        *self.slot(param)
    }

    fn slot(&self, param: Param) -> &f32 {
        match param {
            Param::Width => &self.width,
            Param::WheelsX => &self.wheels_x,
            Param::WheelsY => &self.wheels_y,
            Param::WheelLRadius => &self.wheel_l_radius,
            Param::WheelRRadius => &self.wheel_r_radius,
            Param::WheelsSeparation => &self.wheels_separation,
            Param::ArmsPadding => &self.arms_padding,
            Param::ArmsJoint => &self.arms_joint,
            Param::ArmLLength => &self.arm_l_length,
            Param::ArmRLength => &self.arm_r_length,
            Param::ArmsWidth => &self.arms_width,
            Param::CrankLOffset => &self.crank_l_offset,
            Param::CrankROffset => &self.crank_r_offset,
            Param::SpeedL => &self.speed_l,
            Param::SpeedR => &self.speed_r,
            Param::TrailLength => &self.trail_length,
            Param::TrailWidth => &self.trail_width,
        }
    }

    fn slot_mut(&mut self, param: Param) -> &mut f32 {
        match param {
            Param::Width => &mut self.width,
            Param::WheelsX => &mut self.wheels_x,
            Param::WheelsY => &mut self.wheels_y,
            Param::WheelLRadius => &mut self.wheel_l_radius,
            Param::WheelRRadius => &mut self.wheel_r_radius,
            Param::WheelsSeparation => &mut self.wheels_separation,
            Param::ArmsPadding => &mut self.arms_padding,
            Param::ArmsJoint => &mut self.arms_joint,
            Param::ArmLLength => &mut self.arm_l_length,
            Param::ArmRLength => &mut self.arm_r_length,
            Param::ArmsWidth => &mut self.arms_width,
            Param::CrankLOffset => &mut self.crank_l_offset,
            Param::CrankROffset => &mut self.crank_r_offset,
            Param::SpeedL => &mut self.speed_l,
            Param::SpeedR => &mut self.speed_r,
            Param::TrailLength => &mut self.trail_length,
            Param::TrailWidth => &mut self.trail_width,
        }
    }

    /// Pretty JSON snapshot of the current values.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Owner of the [`LiveConfig`]. Writes are range checked; everything else
/// borrows the config read-only through [`ConfigStore::config`].
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    values: LiveConfig,
}

impl ConfigStore {
    pub fn new(values: LiveConfig) -> Self {
        Self { values }
    }

    pub fn config(&self) -> &LiveConfig {
        &self.values
    }

    pub fn get(&self, param: Param) -> f32 {
        self.values.get(param)
    }

    /// Validates `value` against the declared range and stores it. Rejected
    /// writes leave the previous value in place.
    pub fn set(&mut self, param: Param, value: f32) -> Result<()> {
        let spec = param.spec();
        if !value.is_finite() {
            return Err(PintographError::NonFinite {
                name: param.as_str(),
            });
        }
        if !spec.contains(value) {
            return Err(PintographError::OutOfRange {
                name: param.as_str(),
                value,
                min: spec.min,
                max: spec.max,
            });
        }

        *self.values.slot_mut(param) = value;
        if spec.live {
            tracing::debug!(%param, value, "parameter updated");
        } else {
            tracing::debug!(%param, value, "parameter updated, applies on next build");
        }
        Ok(())
    }

    pub fn set_by_name(&mut self, name: &str, value: f32) -> Result<()> {
        self.set(name.parse()?, value)
    }
}

/// One slider of the parameter panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderBinding {
    pub param: Param,
    pub min: f32,
    pub max: f32,
}

/// The on-screen slider panel. Moving a slider writes straight into the store.
#[derive(Debug, Clone)]
pub struct ParameterPanel {
    sliders: Vec<SliderBinding>,
}

impl Default for ParameterPanel {
    fn default() -> Self {
        Self::new([
            Param::WheelsSeparation,
            Param::SpeedL,
            Param::SpeedR,
            Param::TrailLength,
            Param::TrailWidth,
        ])
    }
}

impl ParameterPanel {
    /// Binds one slider per parameter, using each parameter's declared range.
    pub fn new(params: impl IntoIterator<Item = Param>) -> Self {
        let sliders = params
            .into_iter()
            .map(|param| {
                let spec = param.spec();
                SliderBinding {
                    param,
                    min: spec.min,
                    max: spec.max,
                }
            })
            .collect();
        Self { sliders }
    }

    pub fn sliders(&self) -> &[SliderBinding] {
        &self.sliders
    }

    pub fn slider(&self, param: Param) -> Result<&SliderBinding> {
        self.sliders
            .iter()
            .find(|slider| slider.param == param)
            .ok_or_else(|| PintographError::msg(format!("no slider is bound to `{param}`")))
    }

    /// Moves the slider bound to `param`. A slider cannot leave its track, so
    /// the value is clamped to the slider range before it reaches the store.
    pub fn slide(&self, store: &mut ConfigStore, param: Param, value: f32) -> Result<()> {
        let slider = self.slider(param)?;
        if value.is_nan() {
            return Err(PintographError::NonFinite {
                name: param.as_str(),
            });
        }
        store.set(param, value.clamp(slider.min, slider.max))
    }
}
