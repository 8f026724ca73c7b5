use crate::command::CommandBody;
use crate::robot_state::{AbsorbanceReaderInitialization, ModuleState, RobotState, TemperatureStatus};

pub fn apply_module_command(robot_state: &mut RobotState, body: &CommandBody) {
    let Some(module_id) = module_id(body) else {
        return;
    };
    let Some(module) = robot_state.modules.get_mut(module_id) else {
        return;
    };

    match (&mut module.module_state, body) {
        (ModuleState::Magnetic { engaged }, CommandBody::MagneticModuleEngage(_)) => *engaged = true,
        (ModuleState::Magnetic { engaged }, CommandBody::MagneticModuleDisengage(_)) => *engaged = false,

        (
            ModuleState::Temperature {
                status,
                target_temperature,
            },
            CommandBody::TemperatureModuleSetTargetTemperature(params),
        ) => {
            *status = TemperatureStatus::ApproachingTarget;
            *target_temperature = Some(params.celsius);
        }
        (
            ModuleState::Temperature {
                status,
                target_temperature: Some(_),
            },
            CommandBody::TemperatureModuleWaitForTemperature(_),
        ) => *status = TemperatureStatus::AtTarget,
        (
            ModuleState::Temperature {
                status,
                target_temperature,
            },
            CommandBody::TemperatureModuleDeactivate(_),
        ) => {
            *status = TemperatureStatus::Deactivated;
            *target_temperature = None;
        }

        (
            ModuleState::Thermocycler {
                block_target_temp,
                ..
            },
            CommandBody::ThermocyclerSetTargetBlockTemperature(params),
        ) => *block_target_temp = Some(params.celsius),
        (
            ModuleState::Thermocycler {
                lid_target_temp,
                ..
            },
            CommandBody::ThermocyclerSetTargetLidTemperature(params),
        ) => *lid_target_temp = Some(params.celsius),
        (
            ModuleState::Thermocycler {
                block_target_temp,
                ..
            },
            CommandBody::ThermocyclerDeactivateBlock(_),
        ) => *block_target_temp = None,
        (
            ModuleState::Thermocycler {
                lid_target_temp,
                ..
            },
            CommandBody::ThermocyclerDeactivateLid(_),
        ) => *lid_target_temp = None,
        (
            ModuleState::Thermocycler {
                lid_open,
                ..
            },
            CommandBody::ThermocyclerOpenLid(_),
        ) => *lid_open = Some(true),
        (
            ModuleState::Thermocycler {
                lid_open,
                ..
            },
            CommandBody::ThermocyclerCloseLid(_),
        ) => *lid_open = Some(false),

        (
            ModuleState::HeaterShaker {
                target_temp,
                ..
            },
            CommandBody::HeaterShakerSetTargetTemperature(params),
        ) => *target_temp = Some(params.celsius),
        (
            ModuleState::HeaterShaker {
                target_temp,
                ..
            },
            CommandBody::HeaterShakerDeactivateHeater(_),
        ) => *target_temp = None,
        (
            ModuleState::HeaterShaker {
                latch_open,
                ..
            },
            CommandBody::HeaterShakerOpenLabwareLatch(_),
        ) => *latch_open = true,
        (
            ModuleState::HeaterShaker {
                latch_open,
                ..
            },
            CommandBody::HeaterShakerCloseLabwareLatch(_),
        ) => *latch_open = false,
        (
            ModuleState::HeaterShaker {
                target_speed,
                ..
            },
            CommandBody::HeaterShakerSetAndWaitForShakeSpeed(params),
        ) => *target_speed = Some(params.rpm),
        (
            ModuleState::HeaterShaker {
                target_speed,
                ..
            },
            CommandBody::HeaterShakerDeactivateShaker(_),
        ) => *target_speed = None,

        (
            ModuleState::AbsorbanceReader {
                lid_open,
                ..
            },
            CommandBody::AbsorbanceReaderOpenLid(_),
        ) => *lid_open = Some(true),
        (
            ModuleState::AbsorbanceReader {
                lid_open,
                ..
            },
            CommandBody::AbsorbanceReaderCloseLid(_),
        ) => *lid_open = Some(false),
        (
            ModuleState::AbsorbanceReader {
                initialization,
                ..
            },
            CommandBody::AbsorbanceReaderInitialize(params),
        ) => {
            *initialization = Some(AbsorbanceReaderInitialization {
                mode: params.measure_mode,
                wavelengths: params.sample_wavelengths.clone(),
                reference_wavelength: params.reference_wavelength,
            })
        }

        // waits, profiles and reads leave the state as is, as does a command for a different kind of module
        _ => {}
    }
}

fn module_id(body: &CommandBody) -> Option<&str> {
    let module_id = match body {
        CommandBody::MagneticModuleEngage(params) => &params.module_id,
        CommandBody::TemperatureModuleSetTargetTemperature(params)
        | CommandBody::ThermocyclerSetTargetLidTemperature(params)
        | CommandBody::HeaterShakerSetTargetTemperature(params) => &params.module_id,
        CommandBody::TemperatureModuleWaitForTemperature(params) => &params.module_id,
        CommandBody::ThermocyclerSetTargetBlockTemperature(params) => &params.module_id,
        CommandBody::ThermocyclerRunProfile(params) => &params.module_id,
        CommandBody::HeaterShakerSetAndWaitForShakeSpeed(params) => &params.module_id,
        CommandBody::AbsorbanceReaderInitialize(params) => &params.module_id,
        CommandBody::AbsorbanceReaderRead(params) => &params.module_id,
        CommandBody::MagneticModuleDisengage(params)
        | CommandBody::TemperatureModuleDeactivate(params)
        | CommandBody::ThermocyclerWaitForBlockTemperature(params)
        | CommandBody::ThermocyclerWaitForLidTemperature(params)
        | CommandBody::ThermocyclerDeactivateBlock(params)
        | CommandBody::ThermocyclerDeactivateLid(params)
        | CommandBody::ThermocyclerOpenLid(params)
        | CommandBody::ThermocyclerCloseLid(params)
        | CommandBody::HeaterShakerWaitForTemperature(params)
        | CommandBody::HeaterShakerDeactivateHeater(params)
        | CommandBody::HeaterShakerOpenLabwareLatch(params)
        | CommandBody::HeaterShakerCloseLabwareLatch(params)
        | CommandBody::HeaterShakerDeactivateShaker(params)
        | CommandBody::AbsorbanceReaderOpenLid(params)
        | CommandBody::AbsorbanceReaderCloseLid(params) => &params.module_id,
        _ => return None,
    };
    Some(module_id.as_str())
}
