use std::collections::BTreeMap;

use indexmap::IndexMap;
use strum_macros::AsRefStr;

/// Quirk flag marking labware which the gripper must not pick up.
pub const QUIRK_GRIPPER_INCOMPATIBLE: &str = "gripperIncompatible";

/// A labware definition, as found in the labware library.
///
/// Only the fields used by step generation are modelled, unknown fields are ignored when deserializing.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LabwareDefinition {
    pub namespace: String,
    pub version: u32,
    pub metadata: LabwareMetadata,
    pub parameters: LabwareParameters,
    pub dimensions: LabwareDimensions,

    /// Well geometry, keyed by well name, e.g. `A1`.
    pub wells: IndexMap<String, WellDefinition>,

    /// Well names, one inner `Vec` per column, front-to-back within a column is `A` first.
    pub ordering: Vec<Vec<String>>,

    #[serde(default)]
    pub allowed_roles: Vec<LabwareRole>,

    /// key = load name of the labware below this one
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    #[serde(default)]
    pub stacking_offset_with_labware: BTreeMap<String, Coordinates>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LabwareMetadata {
    pub display_name: String,
    pub display_category: LabwareDisplayCategory,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq, AsRefStr)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum LabwareDisplayCategory {
    WellPlate,
    TipRack,
    TubeRack,
    Reservoir,
    AluminumBlock,
    Adapter,
    Lid,
    Trash,
    #[serde(other)]
    Other,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LabwareParameters {
    pub load_name: String,
    pub format: String,
    #[serde(default)]
    pub is_tiprack: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub tip_length: Option<f64>,
    #[serde(default)]
    pub is_magnetic_module_compatible: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[serde(default)]
    pub quirks: Vec<String>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LabwareDimensions {
    pub x_dimension: f64,
    pub y_dimension: f64,
    pub z_dimension: f64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, Copy, PartialEq, Default)]
pub struct Coordinates {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum LabwareRole {
    Labware,
    Adapter,
    Fixture,
    Lid,
}

/// Positions are relative to the front-left-bottom corner of the labware.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WellDefinition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub depth: f64,
    pub total_liquid_volume: f64,
    #[serde(flatten)]
    pub shape: WellShape,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, Copy, PartialEq)]
#[serde(tag = "shape", rename_all = "camelCase")]
pub enum WellShape {
    Circular {
        diameter: f64,
    },
    #[serde(rename_all = "camelCase")]
    Rectangular {
        x_dimension: f64,
        y_dimension: f64,
    },
}

impl WellDefinition {
    /// Returns true if the point (labware coordinates) is above the well opening.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        match self.shape {
            WellShape::Circular {
                diameter,
            } => {
                let radius = diameter / 2.0;
                (x - self.x).powi(2) + (y - self.y).powi(2) <= radius * radius
            }
            WellShape::Rectangular {
                x_dimension,
                y_dimension,
            } => (x - self.x).abs() <= x_dimension / 2.0 && (y - self.y).abs() <= y_dimension / 2.0,
        }
    }
}

impl LabwareDefinition {
    /// e.g. `opentrons/opentrons_96_tiprack_300ul/1`
    pub fn uri(&self) -> String {
        format!("{}/{}/{}", self.namespace, self.parameters.load_name, self.version)
    }

    pub fn load_name(&self) -> &str {
        &self.parameters.load_name
    }

    pub fn is_tiprack(&self) -> bool {
        self.parameters.is_tiprack
    }

    pub fn is_adapter(&self) -> bool {
        self.allowed_roles
            .contains(&LabwareRole::Adapter)
    }

    pub fn is_gripper_compatible(&self) -> bool {
        !self
            .parameters
            .quirks
            .iter()
            .any(|quirk| quirk == QUIRK_GRIPPER_INCOMPATIBLE)
    }

    pub fn height(&self) -> f64 {
        self.dimensions.z_dimension
    }

    /// Tips are expected to be uniform, the capacity of the first well is used.
    pub fn tip_max_volume(&self) -> Option<f64> {
        if !self.is_tiprack() {
            return None;
        }
        self.wells
            .values()
            .next()
            .map(|well| well.total_liquid_volume)
    }

    pub fn tip_length(&self) -> f64 {
        self.parameters.tip_length.unwrap_or(0.0)
    }

    pub fn well(&self, well_name: &str) -> Option<&WellDefinition> {
        self.wells.get(well_name)
    }

    /// All wells, column by column.
    pub fn ordered_well_names(&self) -> impl Iterator<Item = &String> {
        self.ordering.iter().flatten()
    }

    /// Returns the column (as found in the `ordering`) containing the well.
    pub fn column_of(&self, well_name: &str) -> Option<&Vec<String>> {
        self.ordering
            .iter()
            .find(|column| column.iter().any(|name| name == well_name))
    }

    /// Find the well below a point in labware coordinates, if any.
    pub fn well_at(&self, x: f64, y: f64) -> Option<&str> {
        self.wells
            .iter()
            .find(|(_name, well)| well.contains_point(x, y))
            .map(|(name, _well)| name.as_str())
    }

    pub fn stacking_offset_on(&self, lower_load_name: &str) -> Coordinates {
        self.stacking_offset_with_labware
            .get(lower_load_name)
            .copied()
            .unwrap_or_default()
    }
}
