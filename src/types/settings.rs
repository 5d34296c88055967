use serde::{Deserialize, Serialize};

/// Per-user display preferences for the 3D scene.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisplaySettings {
    #[serde(default = "default_glow_intensity")]
    pub glow_intensity: f64,
    #[serde(default = "default_rotation_speed")]
    pub rotation_speed: f64,
    #[serde(default = "default_zoom_sensitivity")]
    pub zoom_sensitivity: f64,
    #[serde(default = "default_particle_density")]
    pub particle_density: f64,
    #[serde(default)]
    pub performance_mode: bool,
    #[serde(default)]
    pub reduced_motion: bool,
    #[serde(default)]
    pub high_contrast: bool,
}

fn default_glow_intensity() -> f64 {
    1.0
}

fn default_rotation_speed() -> f64 {
    1.0
}

fn default_zoom_sensitivity() -> f64 {
    1.0
}

fn default_particle_density() -> f64 {
    0.5
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            glow_intensity: default_glow_intensity(),
            rotation_speed: default_rotation_speed(),
            zoom_sensitivity: default_zoom_sensitivity(),
            particle_density: default_particle_density(),
            performance_mode: false,
            reduced_motion: false,
            high_contrast: false,
        }
    }
}

/// Inclusive ranges for each numeric preference.
pub const GLOW_INTENSITY_RANGE: (f64, f64) = (0.0, 2.0);
pub const ROTATION_SPEED_RANGE: (f64, f64) = (0.0, 5.0);
pub const ZOOM_SENSITIVITY_RANGE: (f64, f64) = (0.1, 5.0);
pub const PARTICLE_DENSITY_RANGE: (f64, f64) = (0.0, 1.0);

impl DisplaySettings {
    /// Checks every numeric field against its range.
    pub fn validate(&self) -> Result<(), String> {
        let fields = [
            ("glow_intensity", self.glow_intensity, GLOW_INTENSITY_RANGE),
            ("rotation_speed", self.rotation_speed, ROTATION_SPEED_RANGE),
            ("zoom_sensitivity", self.zoom_sensitivity, ZOOM_SENSITIVITY_RANGE),
            ("particle_density", self.particle_density, PARTICLE_DENSITY_RANGE),
        ];
        for (name, value, (min, max)) in fields {
            if !value.is_finite() || value < min || value > max {
                return Err(format!(
                    "{} must be between {} and {}, got {}",
                    name, min, max, value
                ));
            }
        }
        Ok(())
    }
}
