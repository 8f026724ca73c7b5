//! Definitions for use in tests, geometry is representative of real labware but not exact.

use std::collections::BTreeMap;

use indexmap::IndexMap;

use crate::labware::{
    LabwareDefinition, LabwareDimensions, LabwareDisplayCategory, LabwareMetadata, LabwareParameters, LabwareRole,
    WellDefinition, WellShape,
};
use crate::pipette::{PipetteDisplayCategory, PipetteSpec};

const ROW_NAMES: [char; 16] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P'];

pub struct GridLabwareBuilder {
    load_name: String,
    display_category: LabwareDisplayCategory,
    rows: usize,
    columns: usize,
    pitch: f64,
    a1: (f64, f64),
    shape: WellShape,
    depth: f64,
    total_liquid_volume: f64,
    dimensions: LabwareDimensions,
    tip_length: Option<f64>,
    allowed_roles: Vec<LabwareRole>,
    quirks: Vec<String>,
    stacking_offset_with_labware: BTreeMap<String, crate::labware::Coordinates>,
}

impl GridLabwareBuilder {
    pub fn new(load_name: &str, rows: usize, columns: usize) -> Self {
        Self {
            load_name: load_name.to_string(),
            display_category: LabwareDisplayCategory::WellPlate,
            rows,
            columns,
            pitch: 9.0,
            a1: (14.38, 74.24),
            shape: WellShape::Circular {
                diameter: 5.49,
            },
            depth: 10.67,
            total_liquid_volume: 200.0,
            dimensions: LabwareDimensions {
                x_dimension: 127.76,
                y_dimension: 85.48,
                z_dimension: 14.22,
            },
            tip_length: None,
            allowed_roles: vec![LabwareRole::Labware],
            quirks: vec![],
            stacking_offset_with_labware: Default::default(),
        }
    }

    pub fn with_display_category(mut self, display_category: LabwareDisplayCategory) -> Self {
        self.display_category = display_category;
        self
    }

    pub fn with_pitch(mut self, pitch: f64) -> Self {
        self.pitch = pitch;
        self
    }

    pub fn with_a1(mut self, x: f64, y: f64) -> Self {
        self.a1 = (x, y);
        self
    }

    pub fn with_shape(mut self, shape: WellShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_total_liquid_volume(mut self, total_liquid_volume: f64) -> Self {
        self.total_liquid_volume = total_liquid_volume;
        self
    }

    pub fn with_height(mut self, height: f64) -> Self {
        self.dimensions.z_dimension = height;
        self
    }

    pub fn with_tips(mut self, tip_length: f64) -> Self {
        self.tip_length = Some(tip_length);
        self.display_category = LabwareDisplayCategory::TipRack;
        self
    }

    pub fn with_roles(mut self, allowed_roles: Vec<LabwareRole>) -> Self {
        self.allowed_roles = allowed_roles;
        self
    }

    pub fn with_quirk(mut self, quirk: &str) -> Self {
        self.quirks.push(quirk.to_string());
        self
    }

    pub fn with_stacking_offset(mut self, lower_load_name: &str, z: f64) -> Self {
        self.stacking_offset_with_labware
            .insert(lower_load_name.to_string(), crate::labware::Coordinates {
                x: 0.0,
                y: 0.0,
                z,
            });
        self
    }

    pub fn build(self) -> LabwareDefinition {
        let mut wells = IndexMap::new();
        let mut ordering = vec![];
        for column in 0..self.columns {
            let mut column_names = vec![];
            for row in 0..self.rows {
                let name = format!("{}{}", ROW_NAMES[row], column + 1);
                wells.insert(name.clone(), WellDefinition {
                    x: self.a1.0 + column as f64 * self.pitch,
                    y: self.a1.1 - row as f64 * self.pitch,
                    z: self.dimensions.z_dimension - self.depth,
                    depth: self.depth,
                    total_liquid_volume: self.total_liquid_volume,
                    shape: self.shape,
                });
                column_names.push(name);
            }
            ordering.push(column_names);
        }

        LabwareDefinition {
            namespace: "fixture".to_string(),
            version: 1,
            metadata: LabwareMetadata {
                display_name: self.load_name.replace('_', " "),
                display_category: self.display_category,
            },
            parameters: LabwareParameters {
                load_name: self.load_name,
                format: "96Standard".to_string(),
                is_tiprack: self.tip_length.is_some(),
                tip_length: self.tip_length,
                is_magnetic_module_compatible: false,
                quirks: self.quirks,
            },
            dimensions: self.dimensions,
            wells,
            ordering,
            allowed_roles: self.allowed_roles,
            stacking_offset_with_labware: self.stacking_offset_with_labware,
        }
    }
}

pub fn fixture_96_plate() -> LabwareDefinition {
    GridLabwareBuilder::new("fixture_96_plate", 8, 12).build()
}

pub fn fixture_tiprack_10_ul() -> LabwareDefinition {
    GridLabwareBuilder::new("fixture_tiprack_10_ul", 8, 12)
        .with_tips(39.2)
        .with_total_liquid_volume(10.0)
        .with_height(64.69)
        .build()
}

pub fn fixture_tiprack_300_ul() -> LabwareDefinition {
    GridLabwareBuilder::new("fixture_tiprack_300_ul", 8, 12)
        .with_tips(59.3)
        .with_total_liquid_volume(300.0)
        .with_height(64.49)
        .build()
}

pub fn fixture_tiprack_1000_ul() -> LabwareDefinition {
    GridLabwareBuilder::new("fixture_flex_96_tiprack_1000ul", 8, 12)
        .with_tips(95.6)
        .with_total_liquid_volume(1000.0)
        .with_height(99.0)
        .with_stacking_offset("fixture_flex_96_tiprack_adapter", 121.0)
        .build()
}

pub fn fixture_96_tiprack_adapter() -> LabwareDefinition {
    GridLabwareBuilder::new("fixture_flex_96_tiprack_adapter", 0, 0)
        .with_display_category(LabwareDisplayCategory::Adapter)
        .with_roles(vec![LabwareRole::Adapter])
        .with_height(132.0)
        .build()
}

pub fn fixture_12_trough() -> LabwareDefinition {
    GridLabwareBuilder::new("fixture_12_trough", 1, 12)
        .with_display_category(LabwareDisplayCategory::Reservoir)
        .with_a1(13.94, 42.9)
        .with_shape(WellShape::Rectangular {
            x_dimension: 8.33,
            y_dimension: 72.0,
        })
        .with_total_liquid_volume(22000.0)
        .with_height(44.45)
        .build()
}

pub fn fixture_tall_tube_rack() -> LabwareDefinition {
    GridLabwareBuilder::new("fixture_tall_tube_rack", 4, 6)
        .with_display_category(LabwareDisplayCategory::TubeRack)
        .with_pitch(19.89)
        .with_a1(18.21, 75.43)
        .with_shape(WellShape::Circular {
            diameter: 10.0,
        })
        .with_total_liquid_volume(1500.0)
        .with_height(120.0)
        .with_quirk(crate::labware::QUIRK_GRIPPER_INCOMPATIBLE)
        .build()
}

pub fn fixture_p20_single() -> PipetteSpec {
    PipetteSpec {
        channels: 1,
        display_category: PipetteDisplayCategory::Gen2,
        max_volume: 20.0,
        min_volume: 1.0,
        default_aspirate_flow_rate: 7.56,
        default_dispense_flow_rate: 7.56,
        default_blow_out_flow_rate: 7.56,
    }
}

pub fn fixture_p300_single() -> PipetteSpec {
    PipetteSpec {
        channels: 1,
        display_category: PipetteDisplayCategory::Gen2,
        max_volume: 300.0,
        min_volume: 20.0,
        default_aspirate_flow_rate: 92.86,
        default_dispense_flow_rate: 92.86,
        default_blow_out_flow_rate: 92.86,
    }
}

pub fn fixture_p300_multi() -> PipetteSpec {
    PipetteSpec {
        channels: 8,
        display_category: PipetteDisplayCategory::Gen2,
        max_volume: 300.0,
        min_volume: 20.0,
        default_aspirate_flow_rate: 94.0,
        default_dispense_flow_rate: 94.0,
        default_blow_out_flow_rate: 94.0,
    }
}

pub fn fixture_p300_multi_gen1() -> PipetteSpec {
    PipetteSpec {
        display_category: PipetteDisplayCategory::Gen1,
        ..fixture_p300_multi()
    }
}

pub fn fixture_p1000_96() -> PipetteSpec {
    PipetteSpec {
        channels: 96,
        display_category: PipetteDisplayCategory::Flex,
        max_volume: 1000.0,
        min_volume: 5.0,
        default_aspirate_flow_rate: 160.0,
        default_dispense_flow_rate: 160.0,
        default_blow_out_flow_rate: 80.0,
    }
}
