//! Creators built from other creators, folded with [`crate::command_creator::reduce_command_creators`].
//!
//! Each compound creator checks the preconditions of the step as a whole before building its list of curried
//! creators, so that a missing module or pipette is reported as such and not as the failure of some inner command.

pub mod absorbance_reader;
pub mod consolidate;
pub mod distribute;
pub mod heater_shaker;
pub mod liquid;
pub mod mix;
pub mod thermocycler;
pub mod tips;
pub mod transfer;

use hardware::deck::{movable_trash_addressable_area, waste_chute_addressable_area, RobotType, OT2_FIXED_TRASH_ADDRESSABLE_AREA};
use hardware::pipette::NozzleConfiguration;

use crate::command_creator::{curry_command_creator, CommandsAndWarnings, CurriedCommandCreator};
use crate::command_creators::compound::tips::{drop_tip_to_location, replace_tip, DropTipToLocationArgs, ReplaceTipArgs};
use crate::errors::CommandCreatorError;
use crate::invariant_context::{AdditionalEquipmentName, InvariantContext, LabwareId, PipetteId};
use crate::robot_state::RobotState;
use crate::robot_state_selectors::get_pipette_with_tip_max_vol;

/// When a liquid handling step picks up a fresh tip.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum ChangeTip {
    /// Before every aspirate.
    Always,
    /// At the start of the step.
    #[default]
    Once,
    /// Uses the tip already on the pipette.
    Never,
    PerSource,
    PerDest,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TipOptions {
    #[serde(default)]
    pub change_tip: ChangeTip,
    /// A trash bin, waste chute or labware id.
    pub drop_tip_location: String,
    /// 96-channel only.
    #[serde(default)]
    pub nozzles: Option<NozzleConfiguration>,
    /// Restricts tips to this tip rack.
    #[serde(default)]
    pub tiprack: Option<LabwareId>,
    #[serde(default)]
    pub drop_tip_after_step: bool,
}

impl TipOptions {
    pub(crate) fn replace_tip_creator(&self, pipette_id: &str) -> CurriedCommandCreator {
        curry_command_creator(replace_tip, ReplaceTipArgs {
            pipette_id: pipette_id.to_string(),
            drop_tip_location: self.drop_tip_location.clone(),
            nozzles: self.nozzles,
            tiprack: self.tiprack.clone(),
        })
    }

    /// Empty unless the step drops its tip when done.
    pub(crate) fn drop_tip_after_step_creators(&self, pipette_id: &str) -> Vec<CurriedCommandCreator> {
        match self.drop_tip_after_step {
            true => vec![curry_command_creator(drop_tip_to_location, DropTipToLocationArgs {
                pipette_id: pipette_id.to_string(),
                drop_tip_location: self.drop_tip_location.clone(),
            })],
            false => vec![],
        }
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, Copy, PartialEq)]
pub struct MixOptions {
    pub volume: f64,
    pub times: u32,
}

/// A pause after aspirating or dispensing, with the tip moved to a height above the well bottom.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DelayOptions {
    pub seconds: f64,
    pub mm_from_bottom: f64,
}

fn default_offset_from_bottom_mm() -> f64 {
    1.0
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AspirateOptions {
    /// uL/s, the pipette's default when absent.
    #[serde(default)]
    pub flow_rate: Option<f64>,
    #[serde(default = "default_offset_from_bottom_mm")]
    pub offset_from_bottom_mm: f64,
    #[serde(default)]
    pub x_offset: f64,
    #[serde(default)]
    pub y_offset: f64,
    /// Aspirate and dispense once in the source with each new tip.
    #[serde(default)]
    pub pre_wet_tip: bool,
    #[serde(default)]
    pub mix: Option<MixOptions>,
    #[serde(default)]
    pub delay: Option<DelayOptions>,
    /// Offset from the well top, usually negative.
    #[serde(default)]
    pub touch_tip_mm_from_top: Option<f64>,
    #[serde(default)]
    pub air_gap_volume: Option<f64>,
}

impl Default for AspirateOptions {
    fn default() -> Self {
        Self {
            flow_rate: None,
            offset_from_bottom_mm: default_offset_from_bottom_mm(),
            x_offset: 0.0,
            y_offset: 0.0,
            pre_wet_tip: false,
            mix: None,
            delay: None,
            touch_tip_mm_from_top: None,
            air_gap_volume: None,
        }
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DispenseOptions {
    /// uL/s, the pipette's default when absent.
    #[serde(default)]
    pub flow_rate: Option<f64>,
    #[serde(default = "default_offset_from_bottom_mm")]
    pub offset_from_bottom_mm: f64,
    #[serde(default)]
    pub x_offset: f64,
    #[serde(default)]
    pub y_offset: f64,
    #[serde(default)]
    pub mix: Option<MixOptions>,
    #[serde(default)]
    pub delay: Option<DelayOptions>,
    #[serde(default)]
    pub touch_tip_mm_from_top: Option<f64>,
    /// Air gap taken over the destination after dispensing.
    #[serde(default)]
    pub air_gap_volume: Option<f64>,
}

impl Default for DispenseOptions {
    fn default() -> Self {
        Self {
            flow_rate: None,
            offset_from_bottom_mm: default_offset_from_bottom_mm(),
            x_offset: 0.0,
            y_offset: 0.0,
            mix: None,
            delay: None,
            touch_tip_mm_from_top: None,
            air_gap_volume: None,
        }
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum BlowoutLocation {
    SourceWell,
    DestWell,
    /// A trash bin or waste chute.
    Equipment(String),
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BlowoutOptions {
    pub location: BlowoutLocation,
    /// uL/s, the pipette's default when absent.
    #[serde(default)]
    pub flow_rate: Option<f64>,
    #[serde(default)]
    pub offset_from_top_mm: f64,
}

/// A creator that contributes only python, for a group of commands created without their own python.
pub(crate) fn python_only(python: String) -> CurriedCommandCreator {
    Box::new(move |_invariant_context, _robot_state| Ok(CommandsAndWarnings::default().with_python(python.clone())))
}

/// Upper bound on the aspirates a single well pair may be split into.
pub(crate) const MAX_VOLUME_SPLITS: usize = 10_000;

/// Step volumes must be finite and positive.
pub(crate) fn check_step_volume(volume: f64) -> Result<(), CommandCreatorError> {
    match volume.is_finite() && volume > 0.0 {
        true => Ok(()),
        false => Err(CommandCreatorError::InvalidVolume {
            volume,
        }),
    }
}

/// Splits a volume into the fewest equal parts no larger than `max_volume`.
pub(crate) fn split_volume(volume: f64, max_volume: f64) -> Result<Vec<f64>, CommandCreatorError> {
    check_step_volume(volume)?;
    if volume <= max_volume || max_volume <= 0.0 {
        return Ok(vec![volume]);
    }

    let parts = (volume / max_volume).ceil();
    if parts > MAX_VOLUME_SPLITS as f64 {
        return Err(CommandCreatorError::InvalidVolume {
            volume,
        });
    }
    let parts = parts as usize;
    Ok(vec![volume / parts as f64; parts])
}

/// The largest volume one aspirate can hold with the tips the step uses.
pub(crate) fn max_volume_per_aspirate(invariant_context: &InvariantContext, pipette_id: &str, tiprack: Option<&str>) -> f64 {
    let tiprack_uri = tiprack
        .and_then(|tiprack_id| invariant_context.labware_entities.get(tiprack_id))
        .map(|entity| entity.def.uri());

    get_pipette_with_tip_max_vol(invariant_context, pipette_id, tiprack_uri.as_deref()).unwrap_or(0.0)
}

/// The addressable area a pipette moves to over a trash bin or waste chute.
pub(crate) fn disposal_addressable_area(
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
    pipette_id: &PipetteId,
    equipment_id: &str,
) -> Result<String, CommandCreatorError> {
    let pipette = invariant_context.pipette(pipette_id)?;
    let equipment = invariant_context
        .additional_equipment(equipment_id)
        .ok_or_else(|| CommandCreatorError::DropTipLocationDoesNotExist {
            location: equipment_id.to_string(),
        })?;

    match (equipment.name, invariant_context.robot_type, equipment.location.as_deref()) {
        (AdditionalEquipmentName::TrashBin, RobotType::Ot2, _) => Ok(OT2_FIXED_TRASH_ADDRESSABLE_AREA.to_string()),
        (AdditionalEquipmentName::TrashBin, RobotType::Flex, Some(cutout)) => Ok(movable_trash_addressable_area(cutout)),
        (AdditionalEquipmentName::WasteChute, _, _) => {
            let channels = pipette
                .spec
                .active_channels(robot_state.pipette_nozzles(pipette_id));
            Ok(waste_chute_addressable_area(channels as u8))
        }
        _ => Err(CommandCreatorError::DropTipLocationDoesNotExist {
            location: equipment_id.to_string(),
        }),
    }
}

/// Pipette and labware existence, checked before any command is created.
pub(crate) fn check_step_entities(
    invariant_context: &InvariantContext,
    pipette_id: &str,
    labware_ids: &[&str],
) -> Result<(), CommandCreatorError> {
    invariant_context.pipette(pipette_id)?;
    for labware_id in labware_ids {
        invariant_context.labware(labware_id)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::fixtures::*;

    #[rstest]
    #[case(100.0, 300.0, vec![100.0])]
    #[case(300.0, 300.0, vec![300.0])]
    #[case(400.0, 300.0, vec![200.0, 200.0])]
    #[case(700.0, 300.0, vec![700.0 / 3.0; 3])]
    fn split(#[case] volume: f64, #[case] max_volume: f64, #[case] expected: Vec<f64>) {
        assert_eq!(split_volume(volume, max_volume), Ok(expected));
    }

    #[rstest]
    #[case::oversize(1e300)]
    #[case::infinite(f64::INFINITY)]
    #[case::negative(-10.0)]
    #[case::zero(0.0)]
    fn split_unpipettable_volume(#[case] volume: f64) {
        // when
        let result = split_volume(volume, 300.0);

        // then
        assert_eq!(result, Err(CommandCreatorError::InvalidVolume {
            volume,
        }));
    }

    #[test]
    fn split_nan_volume() {
        // when
        let result = split_volume(f64::NAN, 300.0);

        // then
        assert!(matches!(result, Err(CommandCreatorError::InvalidVolume { volume }) if volume.is_nan()));
    }

    #[rstest]
    #[case(P300_SINGLE, TRASH_BIN, "movableTrashA3")]
    #[case(P300_SINGLE, WASTE_CHUTE, "1ChannelWasteChute")]
    #[case(P300_MULTI, WASTE_CHUTE, "8ChannelWasteChute")]
    fn disposal_area(#[case] pipette_id: &str, #[case] equipment_id: &str, #[case] expected: &str) {
        // given
        let context = basic_context();
        let robot_state = basic_robot_state(&context);

        // when
        let area = disposal_addressable_area(&context, &robot_state, &pipette_id.to_string(), equipment_id).unwrap();

        // then
        assert_eq!(area, expected);
    }

    #[test]
    fn ot2_trash() {
        // given
        let context = fixture_ot2_context();
        let robot_state = basic_robot_state(&context);

        // when
        let area = disposal_addressable_area(&context, &robot_state, &P300_SINGLE.to_string(), TRASH_BIN).unwrap();

        // then
        assert_eq!(area, "fixedTrash");
    }

    #[test]
    fn max_volume_is_limited_by_tip() {
        // given
        let context = fixture_96_channel_context();

        // then
        assert_eq!(max_volume_per_aspirate(&context, P1000_96, Some(TIPRACK_1)), 1000.0);
    }
}
