//! Live effect parameters.
//!
//! The [`ParameterStore`] has exactly one writer (whatever drives [`ParamUpdate`]s into the
//! event loop) and one reader (the render loop). Updates are applied between frames, so a
//! value written now is visible from the next frame on and no locking is involved.

use crate::resources::texture::TextureSource;

/// The full set of values the warp is driven by.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterSet {
    /// Rate at which the noise field evolves along its time axis. `0` freezes the pattern.
    pub speed: f32,
    /// UV-space amplitude of the displacement.
    pub distortion: f32,
    /// Spatial scale of the noise. Higher values give finer warping.
    pub frequency: f32,
    /// Which texture the scene samples. Changing it remounts the scene.
    pub texture: TextureSource,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            speed: 0.1,
            distortion: 0.05,
            frequency: 2.0,
            texture: TextureSource::Default,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParamKey {
    Speed,
    Distortion,
    Frequency,
    TextureIdentity,
}

/// One discrete `(key, value)` mutation.
#[derive(Clone, Debug, PartialEq)]
pub enum ParamUpdate {
    Speed(f32),
    Distortion(f32),
    Frequency(f32),
    Texture(TextureSource),
}

impl ParamUpdate {
    pub fn key(&self) -> ParamKey {
        match self {
            ParamUpdate::Speed(_) => ParamKey::Speed,
            ParamUpdate::Distortion(_) => ParamKey::Distortion,
            ParamUpdate::Frequency(_) => ParamKey::Frequency,
            ParamUpdate::Texture(_) => ParamKey::TextureIdentity,
        }
    }
}

/// What applying a [`ParamUpdate`] means for the render loop.
#[derive(Clone, Debug, PartialEq)]
pub enum Applied {
    /// A scalar changed. The uniform synchronizer picks it up next frame.
    Scalar(ParamKey),
    /// The texture identity changed. The scene has to be torn down and rebuilt.
    Remount(TextureSource),
    /// The value equals the current one.
    Unchanged,
    /// The value was not finite and was dropped.
    Rejected(ParamKey),
}

#[derive(Debug)]
pub struct ParameterStore {
    current: ParameterSet,
}

impl ParameterStore {
    pub fn new(initial: ParameterSet) -> Self {
        Self { current: initial }
    }

    pub fn current(&self) -> &ParameterSet {
        &self.current
    }

    /// Apply one update, last write wins.
    ///
    /// Any finite scalar is accepted, including values outside [`SuggestedRange`]; they render
    /// as an extreme effect rather than an error.
    pub fn apply(&mut self, update: ParamUpdate) -> Applied {
        let key = update.key();
        let (field, value) = match update {
            ParamUpdate::Texture(source) => {
                if source == self.current.texture {
                    return Applied::Unchanged;
                }
                self.current.texture = source.clone();
                return Applied::Remount(source);
            }
            ParamUpdate::Speed(value) => (&mut self.current.speed, value),
            ParamUpdate::Distortion(value) => (&mut self.current.distortion, value),
            ParamUpdate::Frequency(value) => (&mut self.current.frequency, value),
        };
        if !value.is_finite() {
            log::warn!("Ignoring non-finite value {} for {:?}", value, key);
            return Applied::Rejected(key);
        }
        if *field == value {
            return Applied::Unchanged;
        }
        *field = value;
        log::debug!("{:?} set to {:.3}", key, value);
        Applied::Scalar(key)
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new(ParameterSet::default())
    }
}

/// Range and step a UI is expected to offer for a scalar.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SuggestedRange {
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl SuggestedRange {
    pub const SPEED: Self = Self {
        min: 0.0,
        max: 1.0,
        step: 0.01,
    };
    pub const DISTORTION: Self = Self {
        min: 0.0,
        max: 0.5,
        step: 0.001,
    };
    pub const FREQUENCY: Self = Self {
        min: 0.5,
        max: 10.0,
        step: 0.1,
    };

    pub fn for_key(key: ParamKey) -> Option<Self> {
        match key {
            ParamKey::Speed => Some(Self::SPEED),
            ParamKey::Distortion => Some(Self::DISTORTION),
            ParamKey::Frequency => Some(Self::FREQUENCY),
            ParamKey::TextureIdentity => None,
        }
    }

    /// Move `value` by `steps` steps and clamp the result into the range.
    pub fn nudge(&self, value: f32, steps: f32) -> f32 {
        (value + steps * self.step).clamp(self.min, self.max)
    }
}
