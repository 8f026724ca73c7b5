//! Wire-format robot commands.
//!
//! A command serializes as `{ "key": "...", "commandType": "...", "params": { ... } }`.

use hardware::pipette::NozzleConfiguration;
use serde_with::skip_serializing_none;

use crate::invariant_context::{LabwareId, ModuleId, PipetteId};
use crate::robot_state::AbsorbanceReaderMode;

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct Command {
    pub key: String,
    #[serde(flatten)]
    pub body: CommandBody,
}

impl Command {
    pub fn new(key: String, body: CommandBody) -> Self {
        Self {
            key,
            body,
        }
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, Copy, PartialEq, Default)]
pub struct Offset {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Offset {
    pub fn z(z: f64) -> Self {
        Self {
            z,
            ..Self::default()
        }
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WellOrigin {
    Top,
    Bottom,
    Center,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, Copy, PartialEq)]
pub struct WellLocation {
    pub origin: WellOrigin,
    #[serde(default)]
    pub offset: Offset,
}

impl WellLocation {
    pub fn bottom(z: f64) -> Self {
        Self {
            origin: WellOrigin::Bottom,
            offset: Offset::z(z),
        }
    }

    pub fn top(z: f64) -> Self {
        Self {
            origin: WellOrigin::Top,
            offset: Offset::z(z),
        }
    }
}

#[skip_serializing_none]
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PipettingParams {
    pub pipette_id: PipetteId,
    pub volume: f64,
    pub labware_id: LabwareId,
    pub well_name: String,
    #[serde(default)]
    pub well_location: Option<WellLocation>,
    pub flow_rate: f64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InPlaceParams {
    pub pipette_id: PipetteId,
    pub volume: f64,
    pub flow_rate: f64,
}

#[skip_serializing_none]
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BlowoutParams {
    pub pipette_id: PipetteId,
    pub labware_id: LabwareId,
    pub well_name: String,
    #[serde(default)]
    pub well_location: Option<WellLocation>,
    pub flow_rate: f64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BlowOutInPlaceParams {
    pub pipette_id: PipetteId,
    pub flow_rate: f64,
}

#[skip_serializing_none]
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TouchTipParams {
    pub pipette_id: PipetteId,
    pub labware_id: LabwareId,
    pub well_name: String,
    #[serde(default)]
    pub well_location: Option<WellLocation>,
}

#[skip_serializing_none]
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MoveToWellParams {
    pub pipette_id: PipetteId,
    pub labware_id: LabwareId,
    pub well_name: String,
    #[serde(default)]
    pub well_location: Option<WellLocation>,
    #[serde(default)]
    pub force_direct: Option<bool>,
    #[serde(default)]
    pub minimum_z_height: Option<f64>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MoveToAddressableAreaParams {
    pub pipette_id: PipetteId,
    pub addressable_area_name: String,
    pub offset: Offset,
}

#[skip_serializing_none]
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MoveToAddressableAreaForDropTipParams {
    pub pipette_id: PipetteId,
    pub addressable_area_name: String,
    pub offset: Offset,
    #[serde(default)]
    pub alternate_drop_location: Option<bool>,
}

/// Used by both `pickUpTip` and `dropTip`.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TipParams {
    pub pipette_id: PipetteId,
    pub labware_id: LabwareId,
    pub well_name: String,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PipetteParams {
    pub pipette_id: PipetteId,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigureForVolumeParams {
    pub pipette_id: PipetteId,
    pub volume: f64,
}

#[skip_serializing_none]
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NozzleConfigurationParams {
    pub style: NozzleConfiguration,
    #[serde(default)]
    pub primary_nozzle: Option<String>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigureNozzleLayoutParams {
    pub pipette_id: PipetteId,
    pub configuration_params: NozzleConfigurationParams,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
pub struct CommentParams {
    pub message: String,
}

#[skip_serializing_none]
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct WaitForDurationParams {
    pub seconds: f64,
    #[serde(default)]
    pub message: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
pub struct WaitForResumeParams {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum LabwareMovementStrategy {
    UsingGripper,
    ManualMoveWithPause,
    ManualMoveWithoutPause,
}

/// Serializes as `{"slotName": "D1"}`, `{"moduleId": "..."}`, ... or `"offDeck"`.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum LabwareLocation {
    SlotName(String),
    ModuleId(ModuleId),
    LabwareId(LabwareId),
    AddressableAreaName(String),
    OffDeck,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MoveLabwareParams {
    pub labware_id: LabwareId,
    pub strategy: LabwareMovementStrategy,
    pub new_location: LabwareLocation,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ModuleParams {
    pub module_id: ModuleId,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EngageMagnetParams {
    pub module_id: ModuleId,
    pub height: f64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureParams {
    pub module_id: ModuleId,
    pub celsius: f64,
}

#[skip_serializing_none]
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WaitForTemperatureParams {
    pub module_id: ModuleId,
    #[serde(default)]
    pub celsius: Option<f64>,
}

#[skip_serializing_none]
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BlockTemperatureParams {
    pub module_id: ModuleId,
    pub celsius: f64,
    #[serde(default)]
    pub block_max_volume: Option<f64>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileStep {
    pub hold_seconds: f64,
    pub celsius: f64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RunProfileParams {
    pub module_id: ModuleId,
    pub profile: Vec<ProfileStep>,
    pub block_max_volume: f64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShakeSpeedParams {
    pub module_id: ModuleId,
    pub rpm: f64,
}

#[skip_serializing_none]
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AbsorbanceReaderInitializeParams {
    pub module_id: ModuleId,
    pub measure_mode: AbsorbanceReaderMode,
    pub sample_wavelengths: Vec<u32>,
    #[serde(default)]
    pub reference_wavelength: Option<u32>,
}

#[skip_serializing_none]
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AbsorbanceReaderReadParams {
    pub module_id: ModuleId,
    #[serde(default)]
    pub file_name: Option<String>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(tag = "commandType", content = "params")]
pub enum CommandBody {
    #[serde(rename = "aspirate")]
    Aspirate(PipettingParams),
    #[serde(rename = "dispense")]
    Dispense(PipettingParams),
    #[serde(rename = "aspirateInPlace")]
    AspirateInPlace(InPlaceParams),
    #[serde(rename = "dispenseInPlace")]
    DispenseInPlace(InPlaceParams),
    #[serde(rename = "blowout")]
    Blowout(BlowoutParams),
    #[serde(rename = "blowOutInPlace")]
    BlowOutInPlace(BlowOutInPlaceParams),
    #[serde(rename = "touchTip")]
    TouchTip(TouchTipParams),
    #[serde(rename = "moveToWell")]
    MoveToWell(MoveToWellParams),
    #[serde(rename = "moveToAddressableArea")]
    MoveToAddressableArea(MoveToAddressableAreaParams),
    #[serde(rename = "moveToAddressableAreaForDropTip")]
    MoveToAddressableAreaForDropTip(MoveToAddressableAreaForDropTipParams),
    #[serde(rename = "pickUpTip")]
    PickUpTip(TipParams),
    #[serde(rename = "dropTip")]
    DropTip(TipParams),
    #[serde(rename = "dropTipInPlace")]
    DropTipInPlace(PipetteParams),
    #[serde(rename = "configureForVolume")]
    ConfigureForVolume(ConfigureForVolumeParams),
    #[serde(rename = "configureNozzleLayout")]
    ConfigureNozzleLayout(ConfigureNozzleLayoutParams),

    #[serde(rename = "comment")]
    Comment(CommentParams),
    #[serde(rename = "waitForDuration")]
    WaitForDuration(WaitForDurationParams),
    #[serde(rename = "waitForResume")]
    WaitForResume(WaitForResumeParams),

    #[serde(rename = "moveLabware")]
    MoveLabware(MoveLabwareParams),

    #[serde(rename = "magneticModule/engage")]
    MagneticModuleEngage(EngageMagnetParams),
    #[serde(rename = "magneticModule/disengage")]
    MagneticModuleDisengage(ModuleParams),

    #[serde(rename = "temperatureModule/setTargetTemperature")]
    TemperatureModuleSetTargetTemperature(TemperatureParams),
    #[serde(rename = "temperatureModule/waitForTemperature")]
    TemperatureModuleWaitForTemperature(WaitForTemperatureParams),
    #[serde(rename = "temperatureModule/deactivate")]
    TemperatureModuleDeactivate(ModuleParams),

    #[serde(rename = "thermocycler/setTargetBlockTemperature")]
    ThermocyclerSetTargetBlockTemperature(BlockTemperatureParams),
    #[serde(rename = "thermocycler/setTargetLidTemperature")]
    ThermocyclerSetTargetLidTemperature(TemperatureParams),
    #[serde(rename = "thermocycler/waitForBlockTemperature")]
    ThermocyclerWaitForBlockTemperature(ModuleParams),
    #[serde(rename = "thermocycler/waitForLidTemperature")]
    ThermocyclerWaitForLidTemperature(ModuleParams),
    #[serde(rename = "thermocycler/deactivateBlock")]
    ThermocyclerDeactivateBlock(ModuleParams),
    #[serde(rename = "thermocycler/deactivateLid")]
    ThermocyclerDeactivateLid(ModuleParams),
    #[serde(rename = "thermocycler/openLid")]
    ThermocyclerOpenLid(ModuleParams),
    #[serde(rename = "thermocycler/closeLid")]
    ThermocyclerCloseLid(ModuleParams),
    #[serde(rename = "thermocycler/runProfile")]
    ThermocyclerRunProfile(RunProfileParams),

    #[serde(rename = "heaterShaker/setTargetTemperature")]
    HeaterShakerSetTargetTemperature(TemperatureParams),
    #[serde(rename = "heaterShaker/waitForTemperature")]
    HeaterShakerWaitForTemperature(ModuleParams),
    #[serde(rename = "heaterShaker/deactivateHeater")]
    HeaterShakerDeactivateHeater(ModuleParams),
    #[serde(rename = "heaterShaker/openLabwareLatch")]
    HeaterShakerOpenLabwareLatch(ModuleParams),
    #[serde(rename = "heaterShaker/closeLabwareLatch")]
    HeaterShakerCloseLabwareLatch(ModuleParams),
    #[serde(rename = "heaterShaker/setAndWaitForShakeSpeed")]
    HeaterShakerSetAndWaitForShakeSpeed(ShakeSpeedParams),
    #[serde(rename = "heaterShaker/deactivateShaker")]
    HeaterShakerDeactivateShaker(ModuleParams),

    #[serde(rename = "absorbanceReader/openLid")]
    AbsorbanceReaderOpenLid(ModuleParams),
    #[serde(rename = "absorbanceReader/closeLid")]
    AbsorbanceReaderCloseLid(ModuleParams),
    #[serde(rename = "absorbanceReader/initialize")]
    AbsorbanceReaderInitialize(AbsorbanceReaderInitializeParams),
    #[serde(rename = "absorbanceReader/read")]
    AbsorbanceReaderRead(AbsorbanceReaderReadParams),
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn serializes_with_command_type_and_params() {
        // given
        let command = Command::new("key_1".to_string(), CommandBody::PickUpTip(TipParams {
            pipette_id: "p".to_string(),
            labware_id: "tiprack".to_string(),
            well_name: "B1".to_string(),
        }));

        // when
        let value = serde_json::to_value(&command).unwrap();

        // then
        assert_eq!(
            value,
            json!({
                "key": "key_1",
                "commandType": "pickUpTip",
                "params": { "pipetteId": "p", "labwareId": "tiprack", "wellName": "B1" }
            })
        );
    }

    #[test]
    fn optional_params_are_omitted() {
        // given
        let body = CommandBody::WaitForResume(WaitForResumeParams {
            message: None,
        });

        // when
        let value = serde_json::to_value(&body).unwrap();

        // then
        assert_eq!(value, json!({ "commandType": "waitForResume", "params": {} }));
    }

    #[test]
    fn labware_locations() {
        assert_eq!(
            serde_json::to_value(LabwareLocation::SlotName("D1".to_string())).unwrap(),
            json!({ "slotName": "D1" })
        );
        assert_eq!(serde_json::to_value(LabwareLocation::OffDeck).unwrap(), json!("offDeck"));
    }

    #[test]
    fn round_trips_module_commands() {
        // given
        let json = json!({
            "key": "k",
            "commandType": "thermocycler/runProfile",
            "params": {
                "moduleId": "tc",
                "profile": [{ "holdSeconds": 60.0, "celsius": 50.0 }],
                "blockMaxVolume": 20.0
            }
        });

        // when
        let command: Command = serde_json::from_value(json.clone()).unwrap();

        // then
        assert_eq!(serde_json::to_value(&command).unwrap(), json);
    }
}
