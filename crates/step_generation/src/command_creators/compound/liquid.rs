//! Building blocks shared by the liquid handling steps.

use crate::command::{
    BlowOutInPlaceParams, BlowoutParams, InPlaceParams, MoveToAddressableAreaParams, MoveToWellParams, Offset,
    PipettingParams, TouchTipParams, WellLocation, WellOrigin,
};
use crate::command_creator::{
    curry_command_creator, curry_without_python, reduce_command_creators, CommandCreatorResult, CurriedCommandCreator,
};
use crate::command_creators::atomic::flow::{delay, DelayArgs};
use crate::command_creators::atomic::pipetting::{
    aspirate, aspirate_in_place, blow_out_in_place, blowout, dispense, move_to_addressable_area, move_to_well, touch_tip,
};
use crate::command_creators::compound::{
    disposal_addressable_area, python_only, AspirateOptions, BlowoutLocation, BlowoutOptions, DelayOptions,
    DispenseOptions, MixOptions,
};
use crate::errors::CommandCreatorError;
use crate::invariant_context::{InvariantContext, LabwareId, PipetteEntity, PipetteId};
use crate::python::{format_py_call, format_py_float};
use crate::robot_state::RobotState;

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AirGapArgs {
    pub pipette_id: PipetteId,
    pub labware_id: LabwareId,
    pub well_name: String,
    pub volume: f64,
    /// uL/s, the pipette's default aspirate flow rate when absent.
    #[serde(default)]
    pub flow_rate: Option<f64>,
}

/// Moves to the top of the well and aspirates air.
pub fn air_gap(args: &AirGapArgs, invariant_context: &InvariantContext, robot_state: &RobotState) -> CommandCreatorResult {
    let pipette = invariant_context.pipette(&args.pipette_id)?;
    invariant_context.labware(&args.labware_id)?;

    let creators = vec![
        curry_without_python(move_to_well, MoveToWellParams {
            pipette_id: args.pipette_id.clone(),
            labware_id: args.labware_id.clone(),
            well_name: args.well_name.clone(),
            well_location: Some(WellLocation::top(0.0)),
            force_direct: None,
            minimum_z_height: None,
        }),
        curry_without_python(aspirate_in_place, InPlaceParams {
            pipette_id: args.pipette_id.clone(),
            volume: args.volume,
            flow_rate: args
                .flow_rate
                .unwrap_or(pipette.spec.default_aspirate_flow_rate),
        }),
        python_only(format_py_call(&format!("{}.air_gap", pipette.python_name), &[(
            Some("volume"),
            format_py_float(args.volume),
        )])),
    ];

    reduce_command_creators(&creators, invariant_context, robot_state)
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BlowoutToEquipmentArgs {
    pub pipette_id: PipetteId,
    pub equipment_id: String,
    pub flow_rate: f64,
}

/// Blows out over a trash bin or waste chute.
///
/// The addressable area depends on the nozzle layout at the time of the blowout.
pub fn blowout_to_equipment(
    args: &BlowoutToEquipmentArgs,
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    let pipette = invariant_context.pipette(&args.pipette_id)?;
    let equipment = invariant_context
        .additional_equipment(&args.equipment_id)
        .ok_or_else(|| CommandCreatorError::AdditionalEquipmentDoesNotExist {
            equipment_id: args.equipment_id.clone(),
        })?;
    let addressable_area_name =
        disposal_addressable_area(invariant_context, robot_state, &args.pipette_id, &args.equipment_id)?;

    let creators = vec![
        curry_without_python(move_to_addressable_area, MoveToAddressableAreaParams {
            pipette_id: args.pipette_id.clone(),
            addressable_area_name,
            offset: Offset::default(),
        }),
        curry_without_python(blow_out_in_place, BlowOutInPlaceParams {
            pipette_id: args.pipette_id.clone(),
            flow_rate: args.flow_rate,
        }),
        python_only(format_py_call(&format!("{}.blow_out", pipette.python_name), &[(
            None,
            equipment.python_name.clone(),
        )])),
    ];

    reduce_command_creators(&creators, invariant_context, robot_state)
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Well {
    pub labware_id: LabwareId,
    pub well_name: String,
}

impl Well {
    pub fn new(labware_id: &str, well_name: &str) -> Self {
        Self {
            labware_id: labware_id.to_string(),
            well_name: well_name.to_string(),
        }
    }
}

/// Flow rates, height and delays of an aspirate and dispense pair at the same well.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MixSettings {
    pub aspirate_flow_rate: f64,
    pub dispense_flow_rate: f64,
    pub offset: Offset,
    pub aspirate_delay: Option<DelayOptions>,
    pub dispense_delay: Option<DelayOptions>,
}

impl MixSettings {
    /// Mixing in the source, at the aspirate height.
    pub fn at_source(pipette: &PipetteEntity, aspirate: &AspirateOptions, dispense: &DispenseOptions) -> Self {
        Self {
            aspirate_flow_rate: aspirate_flow_rate(pipette, aspirate),
            dispense_flow_rate: dispense_flow_rate(pipette, dispense),
            offset: aspirate_offset(aspirate),
            aspirate_delay: aspirate.delay,
            dispense_delay: dispense.delay,
        }
    }

    /// Mixing in the destination, at the dispense height.
    pub fn at_destination(pipette: &PipetteEntity, aspirate: &AspirateOptions, dispense: &DispenseOptions) -> Self {
        Self {
            offset: dispense_offset(dispense),
            ..Self::at_source(pipette, aspirate, dispense)
        }
    }
}

pub(crate) fn aspirate_flow_rate(pipette: &PipetteEntity, options: &AspirateOptions) -> f64 {
    options
        .flow_rate
        .unwrap_or(pipette.spec.default_aspirate_flow_rate)
}

pub(crate) fn dispense_flow_rate(pipette: &PipetteEntity, options: &DispenseOptions) -> f64 {
    options
        .flow_rate
        .unwrap_or(pipette.spec.default_dispense_flow_rate)
}

fn aspirate_offset(options: &AspirateOptions) -> Offset {
    Offset {
        x: options.x_offset,
        y: options.y_offset,
        z: options.offset_from_bottom_mm,
    }
}

fn dispense_offset(options: &DispenseOptions) -> Offset {
    Offset {
        x: options.x_offset,
        y: options.y_offset,
        z: options.offset_from_bottom_mm,
    }
}

fn pipetting_params(pipette_id: &str, well: &Well, volume: f64, offset: Offset, flow_rate: f64) -> PipettingParams {
    PipettingParams {
        pipette_id: pipette_id.to_string(),
        volume,
        labware_id: well.labware_id.clone(),
        well_name: well.well_name.clone(),
        well_location: Some(WellLocation {
            origin: WellOrigin::Bottom,
            offset,
        }),
        flow_rate,
    }
}

/// Aspirate followed by the optional delay and touch tip.
pub(crate) fn aspirate_creators(
    pipette: &PipetteEntity,
    well: &Well,
    volume: f64,
    options: &AspirateOptions,
) -> Vec<CurriedCommandCreator> {
    let mut creators = vec![curry_command_creator(
        aspirate,
        pipetting_params(&pipette.id, well, volume, aspirate_offset(options), aspirate_flow_rate(pipette, options)),
    )];
    if let Some(delay_options) = options.delay {
        creators.extend(delay_creators(&pipette.id, well, delay_options));
    }
    if let Some(mm_from_top) = options.touch_tip_mm_from_top {
        creators.push(touch_tip_creator(&pipette.id, well, mm_from_top));
    }
    creators
}

/// Dispense followed by the optional delay.
pub(crate) fn dispense_creators(
    pipette: &PipetteEntity,
    well: &Well,
    volume: f64,
    options: &DispenseOptions,
) -> Vec<CurriedCommandCreator> {
    let mut creators = vec![curry_command_creator(
        dispense,
        pipetting_params(&pipette.id, well, volume, dispense_offset(options), dispense_flow_rate(pipette, options)),
    )];
    if let Some(delay_options) = options.delay {
        creators.extend(delay_creators(&pipette.id, well, delay_options));
    }
    creators
}

pub(crate) fn delay_creators(pipette_id: &str, well: &Well, options: DelayOptions) -> Vec<CurriedCommandCreator> {
    vec![
        curry_command_creator(move_to_well, MoveToWellParams {
            pipette_id: pipette_id.to_string(),
            labware_id: well.labware_id.clone(),
            well_name: well.well_name.clone(),
            well_location: Some(WellLocation::bottom(options.mm_from_bottom)),
            force_direct: None,
            minimum_z_height: None,
        }),
        curry_command_creator(delay, DelayArgs {
            message: None,
            seconds: Some(options.seconds),
        }),
    ]
}

pub(crate) fn touch_tip_creator(pipette_id: &str, well: &Well, mm_from_top: f64) -> CurriedCommandCreator {
    curry_command_creator(touch_tip, TouchTipParams {
        pipette_id: pipette_id.to_string(),
        labware_id: well.labware_id.clone(),
        well_name: well.well_name.clone(),
        well_location: Some(WellLocation::top(mm_from_top)),
    })
}

pub(crate) fn air_gap_creator(pipette: &PipetteEntity, well: &Well, volume: f64, flow_rate: f64) -> CurriedCommandCreator {
    curry_command_creator(air_gap, AirGapArgs {
        pipette_id: pipette.id.clone(),
        labware_id: well.labware_id.clone(),
        well_name: well.well_name.clone(),
        volume,
        flow_rate: Some(flow_rate),
    })
}

/// Aspirates and dispenses `times` times in the same well.
pub(crate) fn mix_creators(
    pipette_id: &str,
    well: &Well,
    mix: MixOptions,
    settings: &MixSettings,
) -> Vec<CurriedCommandCreator> {
    let mut creators = vec![];
    for _ in 0..mix.times {
        creators.push(curry_command_creator(
            aspirate,
            pipetting_params(pipette_id, well, mix.volume, settings.offset, settings.aspirate_flow_rate),
        ));
        if let Some(delay_options) = settings.aspirate_delay {
            creators.extend(delay_creators(pipette_id, well, delay_options));
        }
        creators.push(curry_command_creator(
            dispense,
            pipetting_params(pipette_id, well, mix.volume, settings.offset, settings.dispense_flow_rate),
        ));
        if let Some(delay_options) = settings.dispense_delay {
            creators.extend(delay_creators(pipette_id, well, delay_options));
        }
    }
    creators
}

/// A single aspirate and dispense in the source, wetting a new tip.
pub(crate) fn pre_wet_creators(
    pipette: &PipetteEntity,
    well: &Well,
    volume: f64,
    aspirate_options: &AspirateOptions,
    dispense_options: &DispenseOptions,
) -> Vec<CurriedCommandCreator> {
    let settings = MixSettings {
        aspirate_delay: None,
        dispense_delay: None,
        ..MixSettings::at_source(pipette, aspirate_options, dispense_options)
    };
    mix_creators(
        &pipette.id,
        well,
        MixOptions {
            volume,
            times: 1,
        },
        &settings,
    )
}

pub(crate) fn blowout_creators(
    pipette: &PipetteEntity,
    options: &BlowoutOptions,
    source: &Well,
    destination: &Well,
) -> Vec<CurriedCommandCreator> {
    let flow_rate = options
        .flow_rate
        .unwrap_or(pipette.spec.default_blow_out_flow_rate);

    let well = match &options.location {
        BlowoutLocation::SourceWell => source,
        BlowoutLocation::DestWell => destination,
        BlowoutLocation::Equipment(equipment_id) => {
            return vec![curry_command_creator(blowout_to_equipment, BlowoutToEquipmentArgs {
                pipette_id: pipette.id.clone(),
                equipment_id: equipment_id.clone(),
                flow_rate,
            })];
        }
    };

    vec![curry_command_creator(blowout, BlowoutParams {
        pipette_id: pipette.id.clone(),
        labware_id: well.labware_id.clone(),
        well_name: well.well_name.clone(),
        well_location: Some(WellLocation::top(options.offset_from_top_mm)),
        flow_rate,
    })]
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::fixtures::*;

    #[test]
    fn air_gap_at_well_top() {
        // given
        let context = basic_context();
        let robot_state = with_tip(basic_robot_state(&context), P300_SINGLE);
        let args = AirGapArgs {
            pipette_id: P300_SINGLE.to_string(),
            labware_id: PLATE_1.to_string(),
            well_name: "A1".to_string(),
            volume: 5.0,
            flow_rate: None,
        };

        // when
        let result = air_gap(&args, &context, &robot_state).unwrap();

        // then
        assert_eq!(command_types(&result), vec!["moveToWell", "aspirateInPlace"]);
        let json = serde_json::to_value(&result.commands).unwrap();
        assert_eq!(
            json[1]["params"],
            json!({"pipetteId": P300_SINGLE, "volume": 5.0, "flowRate": 92.86})
        );
        assert_eq!(result.python.as_deref(), Some("pipette_left.air_gap(volume=5)"));
    }

    #[test]
    fn blowout_into_trash() {
        // given
        let context = basic_context();
        let robot_state = with_tip(basic_robot_state(&context), P300_SINGLE);
        let args = BlowoutToEquipmentArgs {
            pipette_id: P300_SINGLE.to_string(),
            equipment_id: TRASH_BIN.to_string(),
            flow_rate: 92.86,
        };

        // when
        let result = blowout_to_equipment(&args, &context, &robot_state).unwrap();

        // then
        assert_eq!(command_types(&result), vec!["moveToAddressableArea", "blowOutInPlace"]);
        assert_eq!(result.python.as_deref(), Some("pipette_left.blow_out(trash_bin_1)"));
    }

    #[test]
    fn mix_repeats_aspirate_and_dispense() {
        // given
        let context = basic_context();
        let robot_state = with_liquid(
            with_tip(basic_robot_state(&context), P300_SINGLE),
            PLATE_1,
            "A1",
            "water",
            100.0,
        );
        let pipette = context.pipette(P300_SINGLE).unwrap();
        let settings = MixSettings::at_source(pipette, &AspirateOptions::default(), &DispenseOptions::default());
        let creators = mix_creators(
            P300_SINGLE,
            &Well::new(PLATE_1, "A1"),
            MixOptions {
                volume: 20.0,
                times: 2,
            },
            &settings,
        );

        // when
        let result = reduce_command_creators(&creators, &context, &robot_state).unwrap();

        // then
        assert_eq!(command_types(&result), vec!["aspirate", "dispense", "aspirate", "dispense"]);
        assert!(result.warnings.is_empty());
    }
}
