//! Contexts and states for tests.
//!
//! Flex deck used by [`basic_context`]:
//!
//! ```text
//!       1                  2                  3
//! A  (thermocycler)      magnetic_module    trash_bin
//! B  thermocycler        tiprack_1          trough_1
//! C  temperature_module  plate_1            absorbance_reader
//! D  heater_shaker       (tiprack_2)        waste_chute
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use hardware::deck::RobotType;
use hardware::module::ModuleModel;
use hardware::pipette::PipetteMount;
use hardware::test::{
    fixture_12_trough, fixture_96_plate, fixture_96_tiprack_adapter, fixture_p1000_96, fixture_p300_multi,
    fixture_p300_multi_gen1, fixture_p300_single, fixture_tiprack_1000_ul, fixture_tiprack_300_ul,
};

use crate::command_creator::CommandsAndWarnings;
use crate::command_key::SequentialKeyGenerator;
use crate::invariant_context::{AdditionalEquipmentName, InvariantContext, InvariantContextBuilder};
use crate::robot_state::{make_initial_robot_state, InitialLocations, LiquidVolume, ModuleState, RobotState};

pub const TIPRACK_1: &str = "tiprack_1";
pub const TIPRACK_2: &str = "tiprack_2";
pub const PLATE_1: &str = "plate_1";
pub const TROUGH_1: &str = "trough_1";
pub const P300_SINGLE: &str = "p300_single";
pub const P300_MULTI: &str = "p300_multi";
pub const P1000_96: &str = "p1000_96";
pub const TRASH_BIN: &str = "trash_bin";
pub const WASTE_CHUTE: &str = "waste_chute";
pub const TEMPERATURE_MODULE: &str = "temperature_module";
pub const THERMOCYCLER: &str = "thermocycler";
pub const HEATER_SHAKER: &str = "heater_shaker";
pub const MAGNETIC_MODULE: &str = "magnetic_module";
pub const ABSORBANCE_READER: &str = "absorbance_reader";

fn basic_builder() -> InvariantContextBuilder {
    let tiprack_uri = fixture_tiprack_300_ul().uri();

    InvariantContextBuilder::new(RobotType::Flex)
        .with_key_generator(Arc::new(SequentialKeyGenerator::default()))
        .with_pipette(
            P300_SINGLE,
            "p300_single_gen2",
            fixture_p300_single(),
            PipetteMount::Left,
            vec![tiprack_uri.clone()],
        )
        .with_pipette(
            P300_MULTI,
            "p300_multi_gen2",
            fixture_p300_multi(),
            PipetteMount::Right,
            vec![tiprack_uri],
        )
        .with_labware(TIPRACK_1, fixture_tiprack_300_ul())
        .with_labware(PLATE_1, fixture_96_plate())
        .with_labware(TROUGH_1, fixture_12_trough())
        .with_module(TEMPERATURE_MODULE, ModuleModel::TemperatureModuleV2)
        .with_module(THERMOCYCLER, ModuleModel::ThermocyclerModuleV2)
        .with_module(HEATER_SHAKER, ModuleModel::HeaterShakerModuleV1)
        .with_module(MAGNETIC_MODULE, ModuleModel::MagneticModuleV2)
        .with_module(ABSORBANCE_READER, ModuleModel::AbsorbanceReaderV1)
        .with_additional_equipment(TRASH_BIN, AdditionalEquipmentName::TrashBin, Some("cutoutA3"))
        .with_additional_equipment(WASTE_CHUTE, AdditionalEquipmentName::WasteChute, Some("cutoutD3"))
        .with_additional_equipment("gripper", AdditionalEquipmentName::Gripper, None)
}

/// Two pipettes, one tip rack, a plate, a reservoir, every module kind, a trash bin, a waste chute and a gripper.
///
/// Command keys are sequential.
pub fn basic_context() -> InvariantContext {
    basic_builder()
        .build()
        .expect("valid fixture")
}

/// [`basic_context`] with a second tip rack in `D2`.
pub fn fixture_context_with_second_tiprack() -> InvariantContext {
    basic_builder()
        .with_labware(TIPRACK_2, fixture_tiprack_300_ul())
        .build()
        .expect("valid fixture")
}

/// A 96-channel pipette with a tip rack on an adapter in `B2` and a plate in `C2`.
pub fn fixture_96_channel_context() -> InvariantContext {
    InvariantContextBuilder::new(RobotType::Flex)
        .with_key_generator(Arc::new(SequentialKeyGenerator::default()))
        .with_pipette(P1000_96, "p1000_96", fixture_p1000_96(), PipetteMount::Left, vec![
            fixture_tiprack_1000_ul().uri(),
        ])
        .with_labware("adapter", fixture_96_tiprack_adapter())
        .with_labware(TIPRACK_1, fixture_tiprack_1000_ul())
        .with_labware(PLATE_1, fixture_96_plate())
        .with_additional_equipment(TRASH_BIN, AdditionalEquipmentName::TrashBin, Some("cutoutA3"))
        .with_additional_equipment(WASTE_CHUTE, AdditionalEquipmentName::WasteChute, Some("cutoutD3"))
        .build()
        .expect("valid fixture")
}

/// An OT-2 with a GEN1 multi-channel on the right, a heater-shaker in `1`, a GEN1 temperature module in `3`, a
/// tip rack in `2`, a plate in `5` and the fixed trash.
pub fn fixture_ot2_context() -> InvariantContext {
    let tiprack_uri = fixture_tiprack_300_ul().uri();

    InvariantContextBuilder::new(RobotType::Ot2)
        .with_key_generator(Arc::new(SequentialKeyGenerator::default()))
        .with_pipette(
            P300_SINGLE,
            "p300_single_gen2",
            fixture_p300_single(),
            PipetteMount::Left,
            vec![tiprack_uri.clone()],
        )
        .with_pipette(
            P300_MULTI,
            "p300_multi",
            fixture_p300_multi_gen1(),
            PipetteMount::Right,
            vec![tiprack_uri],
        )
        .with_labware(TIPRACK_1, fixture_tiprack_300_ul())
        .with_labware(PLATE_1, fixture_96_plate())
        .with_module(HEATER_SHAKER, ModuleModel::HeaterShakerModuleV1)
        .with_module(TEMPERATURE_MODULE, ModuleModel::TemperatureModuleV1)
        .with_additional_equipment(TRASH_BIN, AdditionalEquipmentName::TrashBin, Some("cutout12"))
        .build()
        .expect("valid fixture")
}

fn initial_locations(invariant_context: &InvariantContext) -> InitialLocations {
    let (labware, modules): (Vec<(&str, &str)>, Vec<(&str, &str)>) = match invariant_context.robot_type {
        RobotType::Flex => (
            vec![
                ("adapter", "B2"),
                (TIPRACK_1, "B2"),
                (TIPRACK_2, "D2"),
                (PLATE_1, "C2"),
                (TROUGH_1, "B3"),
            ],
            vec![
                (TEMPERATURE_MODULE, "C1"),
                (THERMOCYCLER, "B1"),
                (HEATER_SHAKER, "D1"),
                (MAGNETIC_MODULE, "A2"),
                (ABSORBANCE_READER, "C3"),
            ],
        ),
        RobotType::Ot2 => (vec![(TIPRACK_1, "2"), (PLATE_1, "5")], vec![
            (HEATER_SHAKER, "1"),
            (TEMPERATURE_MODULE, "3"),
        ]),
    };

    // the 96-channel tip rack sits on its adapter
    let adapter_present = invariant_context
        .labware_entities
        .contains_key("adapter");

    InitialLocations {
        pipettes: invariant_context
            .pipette_entities
            .keys()
            .zip([PipetteMount::Left, PipetteMount::Right])
            .map(|(id, mount)| (id.clone(), mount))
            .collect(),
        labware: labware
            .into_iter()
            .filter(|(id, _slot)| invariant_context.labware_entities.contains_key(*id))
            .map(|(id, slot)| match (id, adapter_present) {
                (TIPRACK_1, true) => (id.to_string(), "adapter".to_string()),
                _ => (id.to_string(), slot.to_string()),
            })
            .collect(),
        modules: modules
            .into_iter()
            .filter(|(id, _slot)| invariant_context.module_entities.contains_key(*id))
            .map(|(id, slot)| (id.to_string(), slot.to_string()))
            .collect(),
        liquids: vec![],
    }
}

/// Everything in its place, no tips on pipettes, no liquid, modules idle.
pub fn basic_robot_state(invariant_context: &InvariantContext) -> RobotState {
    make_initial_robot_state(invariant_context, &initial_locations(invariant_context))
}

pub fn with_tip(mut robot_state: RobotState, pipette_id: &str) -> RobotState {
    robot_state
        .tip_state
        .pipettes
        .insert(pipette_id.to_string(), true);
    robot_state
}

pub fn with_liquid(mut robot_state: RobotState, labware_id: &str, well_name: &str, liquid_id: &str, volume: f64) -> RobotState {
    robot_state
        .liquid_state
        .labware
        .entry(labware_id.to_string())
        .or_insert_with(BTreeMap::new)
        .entry(well_name.to_string())
        .or_default()
        .insert(liquid_id.to_string(), LiquidVolume {
            volume,
        });
    robot_state
}

pub fn with_module_state(mut robot_state: RobotState, module_id: &str, module_state: ModuleState) -> RobotState {
    if let Some(module) = robot_state.modules.get_mut(module_id) {
        module.module_state = module_state;
    }
    robot_state
}

pub fn with_labware_at(mut robot_state: RobotState, labware_id: &str, slot: &str) -> RobotState {
    if let Some(labware) = robot_state.labware.get_mut(labware_id) {
        labware.slot = slot.to_string();
    }
    robot_state
}

/// The `commandType` of each command, in order.
pub fn command_types(result: &CommandsAndWarnings) -> Vec<String> {
    result
        .commands
        .iter()
        .map(|command| {
            serde_json::to_value(command).expect("serializable")["commandType"]
                .as_str()
                .expect("command type")
                .to_string()
        })
        .collect()
}
