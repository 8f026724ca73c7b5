use crate::command::{ModuleParams, ShakeSpeedParams, TemperatureParams};
use crate::command_creator::{
    curry_command_creator, reduce_command_creators, CommandCreatorResult, CurriedCommandCreator,
};
use crate::command_creators::atomic::flow::{delay, DelayArgs};
use crate::command_creators::atomic::get_module;
use crate::command_creators::atomic::heater_shaker::{
    heater_shaker_close_latch, heater_shaker_deactivate_heater, heater_shaker_open_latch,
    heater_shaker_set_and_wait_for_shake_speed, heater_shaker_set_target_temperature, heater_shaker_stop_shake,
};
use crate::errors::CommandCreatorError;
use crate::invariant_context::{InvariantContext, ModuleId};
use crate::robot_state::{ModuleState, RobotState};

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HeaterShakerArgs {
    pub module_id: ModuleId,
    /// `None` turns the heater off.
    #[serde(default)]
    pub target_temperature: Option<f64>,
    /// `None` stops shaking.
    #[serde(default)]
    pub rpm: Option<f64>,
    pub latch_open: bool,
    /// Shakes and heats for this long, then turns both off.
    #[serde(default)]
    pub timer_seconds: Option<f64>,
}

/// Heater-shaker step.
///
/// The latch closes before shaking and opens last, once shaking has stopped. Opening the latch while the module is
/// still shaking is an error.
pub fn heater_shaker(args: &HeaterShakerArgs, invariant_context: &InvariantContext, robot_state: &RobotState) -> CommandCreatorResult {
    let (_module, module_state) = get_module(invariant_context, robot_state, &args.module_id)?;
    let ModuleState::HeaterShaker {
        target_temp,
        target_speed,
        latch_open,
    } = module_state
    else {
        return Err(CommandCreatorError::MissingModule {
            module_id: args.module_id.clone(),
        }
        .into());
    };

    let module = || ModuleParams {
        module_id: args.module_id.clone(),
    };

    let mut creators: Vec<CurriedCommandCreator> = vec![];
    let mut latch_closed = !*latch_open;

    if !latch_closed && (args.rpm.is_some() || !args.latch_open) {
        creators.push(curry_command_creator(heater_shaker_close_latch, module()));
        latch_closed = true;
    }

    match args.target_temperature {
        Some(celsius) => creators.push(curry_command_creator(heater_shaker_set_target_temperature, TemperatureParams {
            module_id: args.module_id.clone(),
            celsius,
        })),
        None if target_temp.is_some() => {
            creators.push(curry_command_creator(heater_shaker_deactivate_heater, module()));
        }
        None => {}
    }

    match args.rpm {
        Some(rpm) => creators.push(curry_command_creator(
            heater_shaker_set_and_wait_for_shake_speed,
            ShakeSpeedParams {
                module_id: args.module_id.clone(),
                rpm,
            },
        )),
        None if target_speed.is_some() => {
            creators.push(curry_command_creator(heater_shaker_stop_shake, module()));
        }
        None => {}
    }

    if let Some(seconds) = args.timer_seconds {
        creators.push(curry_command_creator(delay, DelayArgs {
            message: None,
            seconds: Some(seconds),
        }));
        creators.push(curry_command_creator(heater_shaker_stop_shake, module()));
        creators.push(curry_command_creator(heater_shaker_deactivate_heater, module()));
    }

    if args.latch_open && latch_closed {
        creators.push(curry_command_creator(heater_shaker_open_latch, module()));
    }

    reduce_command_creators(&creators, invariant_context, robot_state)
}
