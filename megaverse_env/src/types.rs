//! Entity model shared by the remote, the simulator and the engine.
//!
//! Goal maps arrive as compound labels (`"BLUE_SOLOON"`), current maps as
//! tagged objects (`{"type": 1, "color": "blue"}`). Both decode into
//! [`AstralObject`] once, at the boundary.

use crate::grid::Grid;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Color carried by a Soloon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoloonColor {
    Blue,
    Red,
    Purple,
    White,
}

impl SoloonColor {
    pub const ALL: [SoloonColor; 4] = [
        SoloonColor::Blue,
        SoloonColor::Red,
        SoloonColor::Purple,
        SoloonColor::White,
    ];

    /// Wire name, as sent in create bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            SoloonColor::Blue => "blue",
            SoloonColor::Red => "red",
            SoloonColor::Purple => "purple",
            SoloonColor::White => "white",
        }
    }

    /// Prefix used in goal labels.
    pub fn label(&self) -> &'static str {
        match self {
            SoloonColor::Blue => "BLUE",
            SoloonColor::Red => "RED",
            SoloonColor::Purple => "PURPLE",
            SoloonColor::White => "WHITE",
        }
    }

    fn from_label(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == prefix)
    }
}

impl fmt::Display for SoloonColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction a Cometh is facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComethDirection {
    Up,
    Down,
    Right,
    Left,
}

impl ComethDirection {
    pub const ALL: [ComethDirection; 4] = [
        ComethDirection::Up,
        ComethDirection::Down,
        ComethDirection::Right,
        ComethDirection::Left,
    ];

    /// Wire name, as sent in create bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            ComethDirection::Up => "up",
            ComethDirection::Down => "down",
            ComethDirection::Right => "right",
            ComethDirection::Left => "left",
        }
    }

    /// Prefix used in goal labels.
    pub fn label(&self) -> &'static str {
        match self {
            ComethDirection::Up => "UP",
            ComethDirection::Down => "DOWN",
            ComethDirection::Right => "RIGHT",
            ComethDirection::Left => "LEFT",
        }
    }

    fn from_label(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.label() == prefix)
    }
}

impl fmt::Display for ComethDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of an occupying object, without its attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Polyanet,
    Soloon,
    Cometh,
}

impl ObjectKind {
    /// Singular name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            ObjectKind::Polyanet => "polyanet",
            ObjectKind::Soloon => "soloon",
            ObjectKind::Cometh => "cometh",
        }
    }

    /// Collection path on the remote API.
    pub fn endpoint(&self) -> &'static str {
        match self {
            ObjectKind::Polyanet => "polyanets",
            ObjectKind::Soloon => "soloons",
            ObjectKind::Cometh => "comeths",
        }
    }

    /// Numeric `type` tag in the current map.
    pub fn type_code(&self) -> u8 {
        match self {
            ObjectKind::Polyanet => 0,
            ObjectKind::Soloon => 1,
            ObjectKind::Cometh => 2,
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An object occupying a cell.
///
/// Equality is semantic identity: two Soloons are equal only if their
/// colors match, two Comeths only if their directions match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawObject", into = "RawObject")]
pub enum AstralObject {
    Polyanet,
    Soloon { color: SoloonColor },
    Cometh { direction: ComethDirection },
}

impl AstralObject {
    pub fn kind(&self) -> ObjectKind {
        match self {
            AstralObject::Polyanet => ObjectKind::Polyanet,
            AstralObject::Soloon { .. } => ObjectKind::Soloon,
            AstralObject::Cometh { .. } => ObjectKind::Cometh,
        }
    }
}

impl fmt::Display for AstralObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AstralObject::Polyanet => f.write_str("POLYANET"),
            AstralObject::Soloon { color } => write!(f, "{}_SOLOON", color.label()),
            AstralObject::Cometh { direction } => write!(f, "{}_COMETH", direction.label()),
        }
    }
}

/// Current-map encoding of an object.
#[derive(Serialize, Deserialize)]
struct RawObject {
    #[serde(rename = "type")]
    kind: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    color: Option<SoloonColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    direction: Option<ComethDirection>,
}

impl TryFrom<RawObject> for AstralObject {
    type Error = String;

    fn try_from(raw: RawObject) -> Result<Self, Self::Error> {
        match (raw.kind, raw.color, raw.direction) {
            (0, _, _) => Ok(AstralObject::Polyanet),
            (1, Some(color), _) => Ok(AstralObject::Soloon { color }),
            (2, _, Some(direction)) => Ok(AstralObject::Cometh { direction }),
            (1, None, _) => Err("soloon without color".to_string()),
            (2, _, None) => Err("cometh without direction".to_string()),
            (other, _, _) => Err(format!("unknown object type {}", other)),
        }
    }
}

impl From<AstralObject> for RawObject {
    fn from(object: AstralObject) -> Self {
        let kind = object.kind().type_code();
        match object {
            AstralObject::Polyanet => RawObject { kind, color: None, direction: None },
            AstralObject::Soloon { color } => RawObject { kind, color: Some(color), direction: None },
            AstralObject::Cometh { direction } => RawObject { kind, color: None, direction: Some(direction) },
        }
    }
}

/// One decoded goal cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GoalCell {
    /// Unoccupied; never produces work
    Space,
    Object(AstralObject),
}

impl GoalCell {
    /// Returns the object the cell should hold, if any.
    pub fn object(&self) -> Option<&AstralObject> {
        match self {
            GoalCell::Space => None,
            GoalCell::Object(object) => Some(object),
        }
    }
}

impl FromStr for GoalCell {
    type Err = crate::EnvError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        match label {
            "SPACE" => return Ok(GoalCell::Space),
            "POLYANET" => return Ok(GoalCell::Object(AstralObject::Polyanet)),
            _ => {}
        }

        let object = label.split_once('_').and_then(|(attr, kind)| match kind {
            "SOLOON" => SoloonColor::from_label(attr).map(|color| AstralObject::Soloon { color }),
            "COMETH" => ComethDirection::from_label(attr)
                .map(|direction| AstralObject::Cometh { direction }),
            _ => None,
        });

        object
            .map(GoalCell::Object)
            .ok_or_else(|| crate::EnvError::UnknownEntityKind(label.to_string()))
    }
}

impl fmt::Display for GoalCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoalCell::Space => f.write_str("SPACE"),
            GoalCell::Object(object) => object.fmt(f),
        }
    }
}

/// Which of the two maps a read targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapKind {
    Goal,
    Current,
}

impl fmt::Display for MapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapKind::Goal => f.write_str("goal"),
            MapKind::Current => f.write_str("current"),
        }
    }
}

/// Authoritative target state, as raw labels straight off the wire.
pub type GoalGrid = Grid<String>;

/// Last observed state; `None` is empty space.
pub type CurrentGrid = Grid<Option<AstralObject>>;
