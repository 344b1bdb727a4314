use std::fmt;

use serde::{Deserialize, Serialize};
use vantage_geometry::Vector3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Component {
    X,
    Y,
    Z,
}

impl Component {
    pub const ALL: [Component; 3] = [Component::X, Component::Y, Component::Z];

    pub fn unit(self) -> Vector3 {
        match self {
            Self::X => Vector3::unit_x(),
            Self::Y => Vector3::unit_y(),
            Self::Z => Vector3::unit_z(),
        }
    }

    pub fn get(self, v: Vector3) -> f64 {
        match self {
            Self::X => v.x,
            Self::Y => v.y,
            Self::Z => v.z,
        }
    }

    pub fn set(self, v: &mut Vector3, value: f64) {
        match self {
            Self::X => v.x = value,
            Self::Y => v.y = value,
            Self::Z => v.z = value,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Axis {
    X,
    Y,
    Z,
    XY,
    YZ,
    XZ,
    XYZ,
    E,
    XYZE,
    XYZX,
    XYZY,
    XYZZ,
}

impl Axis {
    pub const ALL: [Axis; 12] = [
        Axis::X,
        Axis::Y,
        Axis::Z,
        Axis::XY,
        Axis::YZ,
        Axis::XZ,
        Axis::XYZ,
        Axis::E,
        Axis::XYZE,
        Axis::XYZX,
        Axis::XYZY,
        Axis::XYZZ,
    ];

    pub fn includes(self, component: Component) -> bool {
        match self {
            Self::X => component == Component::X,
            Self::Y => component == Component::Y,
            Self::Z => component == Component::Z,
            Self::XY => component != Component::Z,
            Self::YZ => component != Component::X,
            Self::XZ => component != Component::Y,
            Self::E => false,
            Self::XYZ | Self::XYZE | Self::XYZX | Self::XYZY | Self::XYZZ => true,
        }
    }

    pub fn single(self) -> Option<Component> {
        match self {
            Self::X => Some(Component::X),
            Self::Y => Some(Component::Y),
            Self::Z => Some(Component::Z),
            _ => None,
        }
    }

    pub fn plane_normal(self) -> Option<Component> {
        match self {
            Self::XY => Some(Component::Z),
            Self::YZ => Some(Component::X),
            Self::XZ => Some(Component::Y),
            _ => None,
        }
    }

    pub fn is_uniform(self) -> bool {
        matches!(
            self,
            Self::XYZ | Self::XYZE | Self::XYZX | Self::XYZY | Self::XYZZ
        )
    }

    pub fn mask(self, v: Vector3) -> Vector3 {
        let mut out = v;
        for component in Component::ALL {
            if !self.includes(component) {
                component.set(&mut out, 0.0);
            }
        }
        out
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::X => "X",
            Self::Y => "Y",
            Self::Z => "Z",
            Self::XY => "XY",
            Self::YZ => "YZ",
            Self::XZ => "XZ",
            Self::XYZ => "XYZ",
            Self::E => "E",
            Self::XYZE => "XYZE",
            Self::XYZX => "XYZX",
            Self::XYZY => "XYZY",
            Self::XYZZ => "XYZZ",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformMode {
    #[default]
    Translate,
    Rotate,
    Scale,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Space {
    #[default]
    World,
    Local,
}
