use std::collections::{BTreeMap, BTreeSet};

use hardware::deck::OFF_DECK;
use hardware::module::ModuleType;
use hardware::pipette::{NozzleConfiguration, PipetteMount};
use thiserror::Error;

use crate::invariant_context::{InvariantContext, LabwareId, ModuleId, PipetteId};

/// The pseudo-liquid tracked for air gaps.
pub const AIR: &str = "__air__";

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, Copy, PartialEq, Default)]
pub struct LiquidVolume {
    pub volume: f64,
}

/// liquid id -> volume
pub type LocationLiquidState = BTreeMap<String, LiquidVolume>;

/// well name -> liquid id -> volume
pub type SingleLabwareLiquidState = BTreeMap<String, LocationLiquidState>;

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TipState {
    /// pipette id -> has tip
    pub pipettes: BTreeMap<PipetteId, bool>,
    /// tiprack id -> well name -> tip present
    pub tipracks: BTreeMap<LabwareId, BTreeMap<String, bool>>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct LiquidState {
    pub labware: BTreeMap<LabwareId, SingleLabwareLiquidState>,
    /// pipette id -> tip index -> liquid id -> volume
    pub pipettes: BTreeMap<PipetteId, BTreeMap<String, LocationLiquidState>>,
    /// trash bins and waste chutes
    #[serde(default)]
    pub additional_equipment: BTreeMap<String, LocationLiquidState>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PipetteLocation {
    #[serde(rename_all = "camelCase")]
    Well { labware_id: LabwareId, well_name: String },
    #[serde(rename_all = "camelCase")]
    AddressableArea { addressable_area_name: String },
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PipetteTemporalProperties {
    pub mount: PipetteMount,
    #[serde(default)]
    pub nozzles: Option<NozzleConfiguration>,
    /// Where the pipette was last moved to, used by in-place commands.
    #[serde(default)]
    pub location: Option<PipetteLocation>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
pub struct LabwareTemporalProperties {
    /// A deck slot, module id, labware id, `offDeck`, or a trash bin / waste chute id.
    pub slot: String,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModuleTemporalProperties {
    pub slot: String,
    pub module_state: ModuleState,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureStatus {
    #[serde(rename = "TEMPERATURE_DEACTIVATED")]
    Deactivated,
    #[serde(rename = "TEMPERATURE_APPROACHING_TARGET")]
    ApproachingTarget,
    #[serde(rename = "TEMPERATURE_AT_TARGET")]
    AtTarget,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AbsorbanceReaderMode {
    Single,
    Multi,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AbsorbanceReaderInitialization {
    pub mode: AbsorbanceReaderMode,
    pub wavelengths: Vec<u32>,
    #[serde(default)]
    pub reference_wavelength: Option<u32>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum ModuleState {
    #[serde(rename = "magneticModuleType")]
    Magnetic { engaged: bool },
    #[serde(rename = "temperatureModuleType", rename_all = "camelCase")]
    Temperature {
        status: TemperatureStatus,
        target_temperature: Option<f64>,
    },
    #[serde(rename = "thermocyclerModuleType", rename_all = "camelCase")]
    Thermocycler {
        block_target_temp: Option<f64>,
        lid_target_temp: Option<f64>,
        /// `None` until the lid is first opened or closed.
        lid_open: Option<bool>,
    },
    #[serde(rename = "heaterShakerModuleType", rename_all = "camelCase")]
    HeaterShaker {
        target_temp: Option<f64>,
        target_speed: Option<f64>,
        latch_open: bool,
    },
    #[serde(rename = "magneticBlockType")]
    MagneticBlock,
    #[serde(rename = "absorbanceReaderType", rename_all = "camelCase")]
    AbsorbanceReader {
        lid_open: Option<bool>,
        initialization: Option<AbsorbanceReaderInitialization>,
    },
}

impl ModuleState {
    pub fn initial(module_type: ModuleType) -> Self {
        match module_type {
            ModuleType::MagneticModule => ModuleState::Magnetic {
                engaged: false,
            },
            ModuleType::TemperatureModule => ModuleState::Temperature {
                status: TemperatureStatus::Deactivated,
                target_temperature: None,
            },
            ModuleType::Thermocycler => ModuleState::Thermocycler {
                block_target_temp: None,
                lid_target_temp: None,
                lid_open: None,
            },
            ModuleType::HeaterShaker => ModuleState::HeaterShaker {
                target_temp: None,
                target_speed: None,
                latch_open: false,
            },
            ModuleType::MagneticBlock => ModuleState::MagneticBlock,
            ModuleType::AbsorbanceReader => ModuleState::AbsorbanceReader {
                lid_open: None,
                initialization: None,
            },
        }
    }

    pub fn module_type(&self) -> ModuleType {
        match self {
            ModuleState::Magnetic {
                ..
            } => ModuleType::MagneticModule,
            ModuleState::Temperature {
                ..
            } => ModuleType::TemperatureModule,
            ModuleState::Thermocycler {
                ..
            } => ModuleType::Thermocycler,
            ModuleState::HeaterShaker {
                ..
            } => ModuleType::HeaterShaker,
            ModuleState::MagneticBlock => ModuleType::MagneticBlock,
            ModuleState::AbsorbanceReader {
                ..
            } => ModuleType::AbsorbanceReader,
        }
    }
}

/// A snapshot of the simulated robot.
///
/// Command creators never modify a `RobotState`, the next state is computed from the emitted commands by
/// [`crate::next_robot_state::get_next_robot_state_and_warnings`].
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RobotState {
    pub pipettes: BTreeMap<PipetteId, PipetteTemporalProperties>,
    pub labware: BTreeMap<LabwareId, LabwareTemporalProperties>,
    pub modules: BTreeMap<ModuleId, ModuleTemporalProperties>,
    pub tip_state: TipState,
    pub liquid_state: LiquidState,
}

/// Where a chain of locations ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeckLocation {
    Slot(String),
    OffDeck,
    /// A trash bin or waste chute id.
    Disposal(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    #[error("Location cycle detected. location: '{0}'")]
    Cycle(String),
    #[error("Unknown labware. labware: '{0}'")]
    UnknownLabware(String),
}

impl RobotState {
    pub fn pipette_has_tip(&self, pipette_id: &str) -> bool {
        self.tip_state
            .pipettes
            .get(pipette_id)
            .copied()
            .unwrap_or(false)
    }

    pub fn any_pipette_has_tip(&self) -> bool {
        self.tip_state
            .pipettes
            .values()
            .any(|has_tip| *has_tip)
    }

    pub fn pipette_nozzles(&self, pipette_id: &str) -> Option<NozzleConfiguration> {
        self.pipettes
            .get(pipette_id)
            .and_then(|pipette| pipette.nozzles)
    }

    pub fn pipette_location(&self, pipette_id: &str) -> Option<&PipetteLocation> {
        self.pipettes
            .get(pipette_id)
            .and_then(|pipette| pipette.location.as_ref())
    }

    pub fn module_state(&self, module_id: &str) -> Option<&ModuleState> {
        self.modules
            .get(module_id)
            .map(|module| &module.module_state)
    }

    /// Walks the location chain (labware on labware on module on slot) to the end.
    pub fn resolve_deck_location<'a>(
        &'a self,
        invariant_context: &InvariantContext,
        location: &'a str,
    ) -> Result<DeckLocation, LocationError> {
        let mut visited: BTreeSet<&str> = BTreeSet::new();
        let mut current = location;
        loop {
            if !visited.insert(current) {
                return Err(LocationError::Cycle(current.to_string()));
            }

            if let Some(module) = self.modules.get(current) {
                current = &module.slot;
            } else if let Some(labware) = self.labware.get(current) {
                current = &labware.slot;
            } else if current == OFF_DECK {
                return Ok(DeckLocation::OffDeck);
            } else if invariant_context
                .additional_equipment_entities
                .contains_key(current)
            {
                return Ok(DeckLocation::Disposal(current.to_string()));
            } else {
                return Ok(DeckLocation::Slot(current.to_string()));
            }
        }
    }

    pub fn labware_deck_location(
        &self,
        invariant_context: &InvariantContext,
        labware_id: &str,
    ) -> Result<DeckLocation, LocationError> {
        let labware = self
            .labware
            .get(labware_id)
            .ok_or_else(|| LocationError::UnknownLabware(labware_id.to_string()))?;
        self.resolve_deck_location(invariant_context, &labware.slot)
    }

    /// Every labware and module location must terminate.
    pub fn validate(&self, invariant_context: &InvariantContext) -> Result<(), LocationError> {
        for location in self
            .labware
            .keys()
            .chain(self.modules.keys())
        {
            self.resolve_deck_location(invariant_context, location)?;
        }
        Ok(())
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InitialLiquid {
    pub labware_id: LabwareId,
    pub well_name: String,
    pub liquid_id: String,
    pub volume: f64,
}

/// Placement of everything at the start of a protocol.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct InitialLocations {
    #[serde(default)]
    pub pipettes: BTreeMap<PipetteId, PipetteMount>,
    #[serde(default)]
    pub labware: BTreeMap<LabwareId, String>,
    #[serde(default)]
    pub modules: BTreeMap<ModuleId, String>,
    #[serde(default)]
    pub liquids: Vec<InitialLiquid>,
}

/// Tip racks start full, pipettes start without tips and modules start in their power-on state.
pub fn make_initial_robot_state(invariant_context: &InvariantContext, locations: &InitialLocations) -> RobotState {
    let mut robot_state = RobotState::default();

    for (pipette_id, mount) in locations.pipettes.iter() {
        robot_state
            .pipettes
            .insert(pipette_id.clone(), PipetteTemporalProperties {
                mount: *mount,
                nozzles: None,
                location: None,
            });
        robot_state
            .tip_state
            .pipettes
            .insert(pipette_id.clone(), false);
        robot_state
            .liquid_state
            .pipettes
            .insert(pipette_id.clone(), BTreeMap::new());
    }

    for (labware_id, slot) in locations.labware.iter() {
        robot_state
            .labware
            .insert(labware_id.clone(), LabwareTemporalProperties {
                slot: slot.clone(),
            });

        let Some(entity) = invariant_context
            .labware_entities
            .get(labware_id)
        else {
            continue;
        };
        if entity.def.is_tiprack() {
            let tips = entity
                .def
                .ordered_well_names()
                .map(|well_name| (well_name.clone(), true))
                .collect();
            robot_state
                .tip_state
                .tipracks
                .insert(labware_id.clone(), tips);
        }
    }

    for (module_id, slot) in locations.modules.iter() {
        let Some(entity) = invariant_context
            .module_entities
            .get(module_id)
        else {
            continue;
        };
        robot_state
            .modules
            .insert(module_id.clone(), ModuleTemporalProperties {
                slot: slot.clone(),
                module_state: ModuleState::initial(entity.module_type),
            });
    }

    for liquid in locations.liquids.iter() {
        robot_state
            .liquid_state
            .labware
            .entry(liquid.labware_id.clone())
            .or_default()
            .entry(liquid.well_name.clone())
            .or_default()
            .insert(liquid.liquid_id.clone(), LiquidVolume {
                volume: liquid.volume,
            });
    }

    robot_state
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::fixtures::{basic_context, basic_robot_state};

    #[test]
    fn initial_tipracks_are_full() {
        // given
        let context = basic_context();

        // when
        let robot_state = basic_robot_state(&context);

        // then
        let tips = &robot_state.tip_state.tipracks["tiprack_1"];
        assert_eq!(tips.len(), 96);
        assert!(tips.values().all(|present| *present));
        assert!(!robot_state.pipette_has_tip("p300_single"));
    }

    #[test]
    fn resolves_labware_on_module() {
        // given
        let context = basic_context();
        let mut robot_state = basic_robot_state(&context);
        robot_state
            .labware
            .insert("plate_1".to_string(), LabwareTemporalProperties {
                slot: "temperature_module".to_string(),
            });

        // when
        let location = robot_state.labware_deck_location(&context, "plate_1");

        // then
        assert_eq!(location, Ok(DeckLocation::Slot("C1".to_string())));
    }

    #[rstest]
    #[case("offDeck", Ok(DeckLocation::OffDeck))]
    #[case("waste_chute", Ok(DeckLocation::Disposal("waste_chute".to_string())))]
    #[case("B2", Ok(DeckLocation::Slot("B2".to_string())))]
    fn resolves_terminal_locations(#[case] slot: &str, #[case] expected: Result<DeckLocation, LocationError>) {
        // given
        let context = basic_context();
        let mut robot_state = basic_robot_state(&context);
        robot_state
            .labware
            .insert("plate_1".to_string(), LabwareTemporalProperties {
                slot: slot.to_string(),
            });

        // then
        assert_eq!(robot_state.labware_deck_location(&context, "plate_1"), expected);
    }

    #[test]
    fn detects_location_cycles() {
        // given
        let context = basic_context();
        let mut robot_state = basic_robot_state(&context);
        robot_state
            .labware
            .insert("plate_1".to_string(), LabwareTemporalProperties {
                slot: "plate_2".to_string(),
            });
        robot_state
            .labware
            .insert("plate_2".to_string(), LabwareTemporalProperties {
                slot: "plate_1".to_string(),
            });

        // then
        assert!(matches!(robot_state.validate(&context), Err(LocationError::Cycle(_))));
    }

    #[test]
    fn module_state_serializes_with_module_type_tag() {
        // given
        let state = ModuleState::Thermocycler {
            block_target_temp: Some(4.0),
            lid_target_temp: None,
            lid_open: Some(true),
        };

        // when
        let json = serde_json::to_value(&state).unwrap();

        // then
        assert_eq!(json["type"], "thermocyclerModuleType");
        assert_eq!(json["blockTargetTemp"], 4.0);
        assert_eq!(json["lidOpen"], true);
    }
}
