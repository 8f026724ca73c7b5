use hardware::pipette::NozzleConfiguration;
use tracing::debug;

use crate::command::{
    ConfigureNozzleLayoutParams, MoveToAddressableAreaForDropTipParams, MoveToAddressableAreaParams,
    NozzleConfigurationParams, Offset, PipetteParams, TipParams,
};
use crate::command_creator::{
    curry_command_creator, curry_without_python, reduce_command_creators, CommandCreatorResult, CommandsAndWarnings,
};
use crate::command_creators::atomic::pipetting::{move_to_addressable_area, move_to_addressable_area_for_drop_tip};
use crate::command_creators::atomic::tips::{configure_nozzle_layout, drop_tip, drop_tip_in_place, pick_up_tip};
use crate::command_creators::compound::{disposal_addressable_area, python_only};
use crate::errors::CommandCreatorError;
use crate::invariant_context::{AdditionalEquipmentName, InvariantContext, LabwareId, PipetteId};
use crate::python::format_py_call;
use crate::robot_state::RobotState;
use crate::robot_state_selectors::{get_labware_deck_slot, get_next_tip, get_next_tiprack, is_on_adapter, NextTip};

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceTipArgs {
    pub pipette_id: PipetteId,
    pub drop_tip_location: String,
    #[serde(default)]
    pub nozzles: Option<NozzleConfiguration>,
    #[serde(default)]
    pub tiprack: Option<LabwareId>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DropTipToLocationArgs {
    pub pipette_id: PipetteId,
    /// A trash bin, waste chute or labware id.
    pub drop_tip_location: String,
}

/// Drops the current tip, if any, reconfigures 96-channel nozzles when the layout changes, then picks up the next tip.
pub fn replace_tip(args: &ReplaceTipArgs, invariant_context: &InvariantContext, robot_state: &RobotState) -> CommandCreatorResult {
    let pipette = invariant_context.pipette(&args.pipette_id)?;
    check_drop_tip_location(invariant_context, &args.drop_tip_location)?;

    let reconfigure = match (pipette.spec.is_ninety_six_channel(), args.nozzles) {
        (true, Some(nozzles)) => {
            let current = robot_state
                .pipette_nozzles(&args.pipette_id)
                .unwrap_or(NozzleConfiguration::All);
            (current != nozzles).then_some(nozzles)
        }
        _ => None,
    };

    let next_tip = match reconfigure {
        Some(nozzles) => {
            let mut configured = robot_state.clone();
            if let Some(pipette) = configured
                .pipettes
                .get_mut(&args.pipette_id)
            {
                pipette.nozzles = Some(nozzles);
            }
            select_tip(invariant_context, &configured, &args.pipette_id, args.tiprack.as_deref())?
        }
        None => select_tip(invariant_context, robot_state, &args.pipette_id, args.tiprack.as_deref())?,
    };
    debug!(
        "Replacing tip. pipette: '{}', tiprack: '{}', well: '{}'",
        args.pipette_id, next_tip.tiprack_id, next_tip.well_name
    );

    let mut creators = vec![];
    if robot_state.pipette_has_tip(&args.pipette_id) {
        creators.push(curry_command_creator(drop_tip_to_location, DropTipToLocationArgs {
            pipette_id: args.pipette_id.clone(),
            drop_tip_location: args.drop_tip_location.clone(),
        }));
    }
    if let Some(nozzles) = reconfigure {
        creators.push(curry_command_creator(configure_nozzle_layout, ConfigureNozzleLayoutParams {
            pipette_id: args.pipette_id.clone(),
            configuration_params: NozzleConfigurationParams {
                style: nozzles,
                primary_nozzle: nozzles
                    .primary_nozzle()
                    .map(str::to_string),
            },
        }));
    }
    creators.push(curry_command_creator(pick_up_tip, TipParams {
        pipette_id: args.pipette_id.clone(),
        labware_id: next_tip.tiprack_id,
        well_name: next_tip.well_name,
    }));

    reduce_command_creators(&creators, invariant_context, robot_state)
}

/// Drops the tip into a trash bin, a waste chute or the `A1` well of a labware.
///
/// Nothing is emitted when the pipette has no tip.
pub fn drop_tip_to_location(
    args: &DropTipToLocationArgs,
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    let pipette = invariant_context.pipette(&args.pipette_id)?;
    check_drop_tip_location(invariant_context, &args.drop_tip_location)?;

    if !robot_state.pipette_has_tip(&args.pipette_id) {
        return Ok(CommandsAndWarnings::default());
    }

    let Some(equipment) = invariant_context.additional_equipment(&args.drop_tip_location) else {
        return drop_tip(
            &TipParams {
                pipette_id: args.pipette_id.clone(),
                labware_id: args.drop_tip_location.clone(),
                well_name: "A1".to_string(),
            },
            invariant_context,
            robot_state,
        );
    };

    let addressable_area_name =
        disposal_addressable_area(invariant_context, robot_state, &args.pipette_id, &args.drop_tip_location)?;

    let move_to_disposal = match equipment.name {
        AdditionalEquipmentName::TrashBin => curry_without_python(
            move_to_addressable_area_for_drop_tip,
            MoveToAddressableAreaForDropTipParams {
                pipette_id: args.pipette_id.clone(),
                addressable_area_name,
                offset: Offset::default(),
                alternate_drop_location: Some(true),
            },
        ),
        _ => curry_without_python(move_to_addressable_area, MoveToAddressableAreaParams {
            pipette_id: args.pipette_id.clone(),
            addressable_area_name,
            offset: Offset::default(),
        }),
    };

    let creators = vec![
        move_to_disposal,
        curry_without_python(drop_tip_in_place, PipetteParams {
            pipette_id: args.pipette_id.clone(),
        }),
        python_only(format_py_call(&format!("{}.drop_tip", pipette.python_name), &[(
            None,
            equipment.python_name.clone(),
        )])),
    ];

    reduce_command_creators(&creators, invariant_context, robot_state)
}

fn check_drop_tip_location(invariant_context: &InvariantContext, location: &str) -> Result<(), CommandCreatorError> {
    let is_disposal = invariant_context.is_trash_bin(location) || invariant_context.is_waste_chute(location);
    let is_labware = invariant_context
        .labware_entities
        .contains_key(location);

    match is_disposal || is_labware {
        true => Ok(()),
        false => Err(CommandCreatorError::DropTipLocationDoesNotExist {
            location: location.to_string(),
        }),
    }
}

fn select_tip(
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
    pipette_id: &str,
    tiprack: Option<&str>,
) -> Result<NextTip, CommandCreatorError> {
    let pipette = invariant_context.pipette(pipette_id)?;

    if let Some(tiprack_id) = tiprack {
        invariant_context.labware(tiprack_id)?;
        check_tiprack_adapter(invariant_context, robot_state, pipette_id, tiprack_id)?;
        return get_next_tip(invariant_context, robot_state, pipette_id, tiprack_id)
            .map(|well_name| NextTip {
                tiprack_id: tiprack_id.to_string(),
                well_name,
            })
            .ok_or(CommandCreatorError::InsufficientTips);
    }

    if pipette.tiprack_def_uris.is_empty() {
        return Err(CommandCreatorError::NoTipSelected);
    }
    if let Some(next_tip) = get_next_tiprack(invariant_context, robot_state, pipette_id) {
        return Ok(next_tip);
    }

    // a rack with tips that was skipped can only have been skipped for its adapter
    for (tiprack_id, _tips) in robot_state.tip_state.tipracks.iter() {
        let assigned = invariant_context
            .labware_entities
            .get(tiprack_id)
            .is_some_and(|entity| {
                pipette
                    .tiprack_def_uris
                    .contains(&entity.def.uri())
            });
        let on_deck = get_labware_deck_slot(invariant_context, robot_state, tiprack_id).is_some();
        if assigned && on_deck && get_next_tip(invariant_context, robot_state, pipette_id, tiprack_id).is_some() {
            check_tiprack_adapter(invariant_context, robot_state, pipette_id, tiprack_id)?;
        }
    }
    Err(CommandCreatorError::InsufficientTips)
}

/// A 96-channel pipette picks up a full rack from an adapter and a column from a rack without one.
fn check_tiprack_adapter(
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
    pipette_id: &str,
    tiprack_id: &str,
) -> Result<(), CommandCreatorError> {
    let pipette = invariant_context.pipette(pipette_id)?;
    if !pipette.spec.is_ninety_six_channel() {
        return Ok(());
    }

    let on_adapter = is_on_adapter(invariant_context, robot_state, tiprack_id);
    match (robot_state.pipette_nozzles(pipette_id), on_adapter) {
        (Some(NozzleConfiguration::Column), true) => Err(CommandCreatorError::Remove96ChannelTiprackAdapter {
            tiprack_id: tiprack_id.to_string(),
        }),
        (Some(NozzleConfiguration::Column), false) => Ok(()),
        (_, false) => Err(CommandCreatorError::Missing96ChannelTiprackAdapter {
            tiprack_id: tiprack_id.to_string(),
        }),
        (_, true) => Ok(()),
    }
}
