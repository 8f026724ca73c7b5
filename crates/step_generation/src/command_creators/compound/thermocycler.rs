use tracing::debug;

use crate::command::{BlockTemperatureParams, ModuleParams, ProfileStep, RunProfileParams, TemperatureParams};
use crate::command_creator::{
    curry_command_creator, reduce_command_creators, CommandCreatorResult, CurriedCommandCreator,
};
use crate::command_creators::atomic::get_module;
use crate::command_creators::atomic::thermocycler::{
    thermocycler_close_lid, thermocycler_deactivate_block, thermocycler_deactivate_lid, thermocycler_open_lid,
    thermocycler_run_profile, thermocycler_set_target_block_temperature, thermocycler_set_target_lid_temperature,
    thermocycler_wait_for_block_temperature, thermocycler_wait_for_lid_temperature,
};
use crate::errors::CommandCreatorError;
use crate::invariant_context::{InvariantContext, ModuleId};
use crate::robot_state::{ModuleState, RobotState};

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ThermocyclerStateStepArgs {
    pub module_id: ModuleId,
    /// `None` deactivates the block.
    #[serde(default)]
    pub block_target_temp: Option<f64>,
    /// `None` deactivates the lid.
    #[serde(default)]
    pub lid_target_temp: Option<f64>,
    pub lid_open: bool,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ThermocyclerProfileStepArgs {
    pub module_id: ModuleId,
    pub profile_target_lid_temp: f64,
    pub profile_steps: Vec<ProfileStep>,
    /// uL, the largest volume in any well.
    pub profile_volume: f64,
    /// The state the module is left in once the profile completes.
    #[serde(default)]
    pub block_target_temp_hold: Option<f64>,
    #[serde(default)]
    pub lid_target_temp_hold: Option<f64>,
    pub lid_open_hold: bool,
}

fn module_params(module_id: &str) -> ModuleParams {
    ModuleParams {
        module_id: module_id.to_string(),
    }
}

/// Block, lid temperature and lid position of a thermocycler, as currently set.
fn thermocycler_state(
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
    module_id: &str,
) -> Result<(Option<f64>, Option<f64>, Option<bool>), CommandCreatorError> {
    match get_module(invariant_context, robot_state, module_id)? {
        (
            _,
            ModuleState::Thermocycler {
                block_target_temp,
                lid_target_temp,
                lid_open,
            },
        ) => Ok((*block_target_temp, *lid_target_temp, *lid_open)),
        _ => Err(CommandCreatorError::MissingModule {
            module_id: module_id.to_string(),
        }),
    }
}

/// Brings the thermocycler to the requested state, only commands for what differs are emitted.
///
/// Temperatures are set and waited for, block first then lid, before the lid is moved.
pub fn thermocycler_state_step(
    args: &ThermocyclerStateStepArgs,
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    let (block_target_temp, lid_target_temp, lid_open) =
        thermocycler_state(invariant_context, robot_state, &args.module_id)?;

    let mut creators: Vec<CurriedCommandCreator> = vec![];

    if args.block_target_temp != block_target_temp {
        match args.block_target_temp {
            Some(celsius) => {
                creators.push(curry_command_creator(
                    thermocycler_set_target_block_temperature,
                    BlockTemperatureParams {
                        module_id: args.module_id.clone(),
                        celsius,
                        block_max_volume: None,
                    },
                ));
                creators.push(curry_command_creator(
                    thermocycler_wait_for_block_temperature,
                    module_params(&args.module_id),
                ));
            }
            None => creators.push(curry_command_creator(
                thermocycler_deactivate_block,
                module_params(&args.module_id),
            )),
        }
    }

    if args.lid_target_temp != lid_target_temp {
        match args.lid_target_temp {
            Some(celsius) => {
                creators.push(curry_command_creator(thermocycler_set_target_lid_temperature, TemperatureParams {
                    module_id: args.module_id.clone(),
                    celsius,
                }));
                creators.push(curry_command_creator(
                    thermocycler_wait_for_lid_temperature,
                    module_params(&args.module_id),
                ));
            }
            None => creators.push(curry_command_creator(
                thermocycler_deactivate_lid,
                module_params(&args.module_id),
            )),
        }
    }

    if lid_open != Some(args.lid_open) {
        creators.push(match args.lid_open {
            true => curry_command_creator(thermocycler_open_lid, module_params(&args.module_id)),
            false => curry_command_creator(thermocycler_close_lid, module_params(&args.module_id)),
        });
    }

    debug!(
        "Thermocycler state step. module: '{}', commands: {}",
        args.module_id,
        creators.len()
    );

    reduce_command_creators(&creators, invariant_context, robot_state)
}

/// Closes the lid, heats it, runs the profile, then holds the module in the requested state.
pub fn thermocycler_profile_step(
    args: &ThermocyclerProfileStepArgs,
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    let (_, _, lid_open) = thermocycler_state(invariant_context, robot_state, &args.module_id)?;

    let mut creators: Vec<CurriedCommandCreator> = vec![];
    if lid_open != Some(false) {
        creators.push(curry_command_creator(thermocycler_close_lid, module_params(&args.module_id)));
    }
    creators.push(curry_command_creator(thermocycler_set_target_lid_temperature, TemperatureParams {
        module_id: args.module_id.clone(),
        celsius: args.profile_target_lid_temp,
    }));
    creators.push(curry_command_creator(
        thermocycler_wait_for_lid_temperature,
        module_params(&args.module_id),
    ));
    creators.push(curry_command_creator(thermocycler_run_profile, RunProfileParams {
        module_id: args.module_id.clone(),
        profile: args.profile_steps.clone(),
        block_max_volume: args.profile_volume,
    }));
    creators.push(curry_command_creator(thermocycler_state_step, ThermocyclerStateStepArgs {
        module_id: args.module_id.clone(),
        block_target_temp: args.block_target_temp_hold,
        lid_target_temp: args.lid_target_temp_hold,
        lid_open: args.lid_open_hold,
    }));

    reduce_command_creators(&creators, invariant_context, robot_state)
}
