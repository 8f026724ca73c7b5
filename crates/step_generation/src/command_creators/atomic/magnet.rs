use hardware::module::ModuleType;

use crate::command::{CommandBody, EngageMagnetParams, ModuleParams};
use crate::command_creator::{make_command, CommandCreatorResult, CommandsAndWarnings};
use crate::command_creators::atomic::get_module;
use crate::invariant_context::InvariantContext;
use crate::python::{format_py_call, format_py_float};
use crate::robot_state::RobotState;

/// # Panics
///
/// When the module is not a magnetic module.
pub fn engage_magnet(
    args: &EngageMagnetParams,
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    let (module, module_state) = get_module(invariant_context, robot_state, &args.module_id)?;
    assert!(
        module_state.module_type() == ModuleType::MagneticModule,
        "expected a magnetic module. module: '{}', type: '{}'",
        args.module_id,
        module_state.module_type()
    );

    let python = format_py_call(&format!("{}.engage", module.python_name), &[(
        Some("height_from_base"),
        format_py_float(args.height),
    )]);

    Ok(CommandsAndWarnings::new(vec![make_command(
        invariant_context,
        CommandBody::MagneticModuleEngage(args.clone()),
    )])
    .with_python(python))
}

/// # Panics
///
/// When the module is not a magnetic module.
pub fn disengage_magnet(
    args: &ModuleParams,
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    let (module, module_state) = get_module(invariant_context, robot_state, &args.module_id)?;
    assert!(
        module_state.module_type() == ModuleType::MagneticModule,
        "expected a magnetic module. module: '{}', type: '{}'",
        args.module_id,
        module_state.module_type()
    );

    Ok(CommandsAndWarnings::new(vec![make_command(
        invariant_context,
        CommandBody::MagneticModuleDisengage(args.clone()),
    )])
    .with_python(format!("{}.disengage()", module.python_name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CommandCreatorError;
    use crate::fixtures::*;

    #[test]
    fn engage() {
        // given
        let context = basic_context();
        let robot_state = basic_robot_state(&context);
        let args = EngageMagnetParams {
            module_id: MAGNETIC_MODULE.to_string(),
            height: 10.5,
        };

        // when
        let result = engage_magnet(&args, &context, &robot_state).unwrap();

        // then
        assert_eq!(result.commands[0].body, CommandBody::MagneticModuleEngage(args));
        assert_eq!(
            result.python.as_deref(),
            Some("magnetic_module_1.engage(height_from_base=10.5)")
        );
    }

    #[test]
    fn disengage() {
        // given
        let context = basic_context();
        let robot_state = basic_robot_state(&context);

        // when
        let result = disengage_magnet(
            &ModuleParams {
                module_id: MAGNETIC_MODULE.to_string(),
            },
            &context,
            &robot_state,
        )
        .unwrap();

        // then
        assert_eq!(result.python.as_deref(), Some("magnetic_module_1.disengage()"));
    }

    #[test]
    fn missing_module() {
        // given
        let context = basic_context();
        let robot_state = basic_robot_state(&context);

        // when
        let errors = disengage_magnet(
            &ModuleParams {
                module_id: "missing".to_string(),
            },
            &context,
            &robot_state,
        )
        .unwrap_err();

        // then
        assert_eq!(errors.errors, vec![CommandCreatorError::MissingModule {
            module_id: "missing".to_string(),
        }]);
    }

    #[test]
    #[should_panic(expected = "expected a magnetic module")]
    fn wrong_module_type_panics() {
        // given
        let context = basic_context();
        let robot_state = basic_robot_state(&context);

        // when
        let _ = engage_magnet(
            &EngageMagnetParams {
                module_id: TEMPERATURE_MODULE.to_string(),
                height: 10.0,
            },
            &context,
            &robot_state,
        );
    }
}
