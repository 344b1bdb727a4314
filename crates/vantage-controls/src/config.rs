use serde::{Deserialize, Serialize};
use vantage_base::{Error, Result};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub gesture: GestureConfig,
    pub camera: CameraConfig,
    pub transform: TransformConfig,
}

impl ControlsConfig {
    pub fn validate(&self) -> Result<()> {
        let gesture = &self.gesture;
        unit_interval("gesture.damping_factor", gesture.damping_factor)?;
        non_negative("gesture.inertia_epsilon", gesture.inertia_epsilon)?;

        let camera = &self.camera;
        unit_interval("camera.damping_factor", camera.damping_factor)?;
        non_negative("camera.rest_epsilon", camera.rest_epsilon)?;
        non_negative("camera.min_distance", camera.min_distance)?;
        if camera.max_distance < camera.min_distance {
            return Err(Error::InvalidParameter(
                "camera.max_distance must be >= camera.min_distance".to_string(),
            ));
        }

        let transform = &self.transform;
        positive("transform.size", transform.size)?;
        for (name, snap) in [
            ("transform.translation_snap", transform.translation_snap),
            ("transform.rotation_snap", transform.rotation_snap),
            ("transform.scale_snap", transform.scale_snap),
        ] {
            if let Some(snap) = snap {
                positive(name, snap)?;
            }
        }
        if !(0.0..90.0).contains(&transform.min_grazing_angle) {
            return Err(Error::InvalidParameter(
                "transform.min_grazing_angle must be in [0, 90) degrees".to_string(),
            ));
        }
        Ok(())
    }
}

fn positive(name: &str, value: f64) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidParameter(format!("{name} must be > 0")))
    }
}

fn non_negative(name: &str, value: f64) -> Result<()> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidParameter(format!("{name} must be >= 0")))
    }
}

fn unit_interval(name: &str, value: f64) -> Result<()> {
    if (0.0..1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidParameter(format!("{name} must be in [0, 1)")))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    pub enable_damping: bool,
    /// Fraction of movement lost per frame at 60 fps.
    pub damping_factor: f64,
    /// Canvas-pixel movement below which a simulated pointer comes to rest.
    pub inertia_epsilon: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            enable_damping: false,
            damping_factor: 0.05,
            inertia_epsilon: 0.05,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub rotate_speed: f64,
    pub zoom_speed: f64,
    pub pan_speed: f64,
    /// Dolly per wheel delta unit.
    pub wheel_speed: f64,
    pub min_distance: f64,
    pub max_distance: f64,
    pub enable_damping: bool,
    /// Fraction of velocity left after one second.
    pub damping_factor: f64,
    /// Velocity magnitude treated as rest.
    pub rest_epsilon: f64,
    pub rotate_key: String,
    pub zoom_key: String,
    pub pan_key: String,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            rotate_speed: 1.0,
            zoom_speed: 1.2,
            pan_speed: 0.3,
            wheel_speed: 0.001,
            min_distance: 0.0,
            max_distance: 1.0e12,
            enable_damping: true,
            damping_factor: 0.05,
            rest_epsilon: 1.0e-5,
            rotate_key: "KeyA".to_string(),
            zoom_key: "KeyS".to_string(),
            pan_key: "KeyD".to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Gizmo size as a fraction of the view height at the object's distance.
    pub size: f64,
    pub translation_snap: Option<f64>,
    /// Radians.
    pub rotation_snap: Option<f64>,
    pub scale_snap: Option<f64>,
    /// Degrees.
    pub min_grazing_angle: f64,
    pub xr: bool,
    pub xr_rotation_speed: f64,
    /// Rotation gain per world unit of pointer offset at unit camera distance.
    pub rotation_gain: f64,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            size: 0.25,
            translation_snap: None,
            rotation_snap: None,
            scale_snap: None,
            min_grazing_angle: 20.0,
            xr: false,
            xr_rotation_speed: 1.0,
            rotation_gain: 20.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_fills_defaults() -> std::result::Result<(), serde_json::Error> {
        let config: ControlsConfig =
            serde_json::from_str(r#"{ "camera": { "rotate_speed": 2.5 }, "transform": { "translation_snap": 0.5 } }"#)?;
        assert_eq!(config.camera.rotate_speed, 2.5);
        assert_eq!(config.camera.pan_key, "KeyD");
        assert_eq!(config.transform.translation_snap, Some(0.5));
        assert_eq!(config.gesture, GestureConfig::default());
        Ok(())
    }

    #[test]
    fn defaults_are_valid() {
        assert!(ControlsConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_snap_is_rejected() {
        let mut config = ControlsConfig::default();
        config.transform.rotation_snap = Some(0.0);
        let message = match config.validate() {
            Ok(()) => String::new(),
            Err(err) => err.to_string(),
        };
        assert_eq!(message, "invalid parameter: transform.rotation_snap must be > 0");
    }
}
