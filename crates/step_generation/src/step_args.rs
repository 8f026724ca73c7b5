//! Protocol steps as data, and the creator each one runs.

use hardware::module::ModuleType;

use crate::command::{
    AbsorbanceReaderInitializeParams, AbsorbanceReaderReadParams, CommentParams, EngageMagnetParams, ModuleParams,
    MoveLabwareParams, TemperatureParams, WaitForTemperatureParams,
};
use crate::command_creator::{curry_command_creator, CurriedCommandCreator};
use crate::command_creators::atomic::flow::{comment, delay, DelayArgs};
use crate::command_creators::atomic::get_module;
use crate::command_creators::atomic::magnet::{disengage_magnet, engage_magnet};
use crate::command_creators::atomic::move_labware::move_labware;
use crate::command_creators::atomic::temperature::{deactivate_temperature, set_temperature, wait_for_temperature};
use crate::command_creators::compound::absorbance_reader::{
    absorbance_reader_close_initialize, absorbance_reader_close_lid_step, absorbance_reader_close_read,
    absorbance_reader_open_lid_step,
};
use crate::command_creators::compound::consolidate::{consolidate, ConsolidateArgs};
use crate::command_creators::compound::distribute::{distribute, DistributeArgs};
use crate::command_creators::compound::heater_shaker::{heater_shaker, HeaterShakerArgs};
use crate::command_creators::compound::mix::{mix, MixArgs};
use crate::command_creators::compound::thermocycler::{
    thermocycler_profile_step, thermocycler_state_step, ThermocyclerProfileStepArgs, ThermocyclerStateStepArgs,
};
use crate::command_creators::compound::transfer::{transfer, TransferArgs};
use crate::errors::CommandCreatorError;
use crate::invariant_context::ModuleId;

/// One protocol step, tagged with the name of the creator that runs it.
///
/// e.g. `{"commandCreatorFnName": "delay", "seconds": 60}`
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[derive(strum_macros::IntoStaticStr)]
#[serde(tag = "commandCreatorFnName", rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum StepArgs {
    Consolidate(ConsolidateArgs),
    Delay(DelayArgs),
    Distribute(DistributeArgs),
    Transfer(TransferArgs),
    Mix(MixArgs),
    MoveLabware(MoveLabwareParams),
    EngageMagnet(EngageMagnetParams),
    DisengageMagnet(ModuleParams),
    SetTemperature(TemperatureParams),
    DeactivateTemperature(ModuleParams),
    WaitForTemperature(WaitForTemperatureParams),
    ThermocyclerProfile(ThermocyclerProfileStepArgs),
    ThermocyclerState(ThermocyclerStateStepArgs),
    HeaterShaker(HeaterShakerArgs),
    Comment(CommentParams),
    AbsorbanceReaderOpenLid(ModuleParams),
    AbsorbanceReaderCloseLid(ModuleParams),
    AbsorbanceReaderRead(AbsorbanceReaderReadParams),
    AbsorbanceReaderInitialize(AbsorbanceReaderInitializeParams),
}

impl StepArgs {
    /// The `commandCreatorFnName` of the step.
    pub fn creator_name(&self) -> &'static str {
        self.into()
    }

    pub fn into_curried(self) -> CurriedCommandCreator {
        match self {
            StepArgs::Consolidate(args) => curry_command_creator(consolidate, args),
            StepArgs::Delay(args) => curry_command_creator(delay, args),
            StepArgs::Distribute(args) => curry_command_creator(distribute, args),
            StepArgs::Transfer(args) => curry_command_creator(transfer, args),
            StepArgs::Mix(args) => curry_command_creator(mix, args),
            StepArgs::MoveLabware(args) => curry_command_creator(move_labware, args),
            StepArgs::EngageMagnet(args) => for_module_types(
                args.module_id.clone(),
                MAGNET_MODULE_TYPES,
                curry_command_creator(engage_magnet, args),
            ),
            StepArgs::DisengageMagnet(args) => for_module_types(
                args.module_id.clone(),
                MAGNET_MODULE_TYPES,
                curry_command_creator(disengage_magnet, args),
            ),
            StepArgs::SetTemperature(args) => for_module_types(
                args.module_id.clone(),
                HEATING_MODULE_TYPES,
                curry_command_creator(set_temperature, args),
            ),
            StepArgs::DeactivateTemperature(args) => for_module_types(
                args.module_id.clone(),
                DEACTIVATABLE_MODULE_TYPES,
                curry_command_creator(deactivate_temperature, args),
            ),
            StepArgs::WaitForTemperature(args) => for_module_types(
                args.module_id.clone(),
                HEATING_MODULE_TYPES,
                curry_command_creator(wait_for_temperature, args),
            ),
            StepArgs::ThermocyclerProfile(args) => curry_command_creator(thermocycler_profile_step, args),
            StepArgs::ThermocyclerState(args) => curry_command_creator(thermocycler_state_step, args),
            StepArgs::HeaterShaker(args) => curry_command_creator(heater_shaker, args),
            StepArgs::Comment(args) => curry_command_creator(comment, args),
            StepArgs::AbsorbanceReaderOpenLid(args) => curry_command_creator(absorbance_reader_open_lid_step, args),
            StepArgs::AbsorbanceReaderCloseLid(args) => curry_command_creator(absorbance_reader_close_lid_step, args),
            StepArgs::AbsorbanceReaderRead(args) => curry_command_creator(absorbance_reader_close_read, args),
            StepArgs::AbsorbanceReaderInitialize(args) => {
                curry_command_creator(absorbance_reader_close_initialize, args)
            }
        }
    }
}

const MAGNET_MODULE_TYPES: &[ModuleType] = &[ModuleType::MagneticModule];
const HEATING_MODULE_TYPES: &[ModuleType] = &[ModuleType::TemperatureModule, ModuleType::HeaterShaker];
const DEACTIVATABLE_MODULE_TYPES: &[ModuleType] = &[
    ModuleType::TemperatureModule,
    ModuleType::Thermocycler,
    ModuleType::HeaterShaker,
];

/// Runs `creator` only when the step's module is one of `module_types`, any other module is missing.
fn for_module_types(
    module_id: ModuleId,
    module_types: &'static [ModuleType],
    creator: CurriedCommandCreator,
) -> CurriedCommandCreator {
    Box::new(move |invariant_context, robot_state| {
        let (_module, module_state) = get_module(invariant_context, robot_state, &module_id)?;
        if !module_types.contains(&module_state.module_type()) {
            return Err(CommandCreatorError::MissingModule {
                module_id: module_id.clone(),
            }
            .into());
        }
        creator(invariant_context, robot_state)
    })
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use rstest::rstest;

    use super::*;
    use crate::command_creators::compound::ChangeTip;
    use crate::fixtures::*;

    #[test]
    fn transfer_from_json() {
        // given
        let json = indoc! {r#"
            {
                "commandCreatorFnName": "transfer",
                "pipetteId": "p300_single",
                "sourceLabware": "trough_1",
                "sourceWells": ["A1"],
                "destLabware": "plate_1",
                "destWells": ["A1", "B1"],
                "volume": 50,
                "changeTip": "always",
                "dropTipLocation": "trash_bin"
            }
        "#};

        // when
        let step: StepArgs = serde_json::from_str(json).unwrap();

        // then
        let StepArgs::Transfer(args) = &step else {
            panic!("expected a transfer, got {:?}", step);
        };
        assert_eq!(step.creator_name(), "transfer");
        assert_eq!(args.dest_wells, vec!["A1".to_string(), "B1".to_string()]);
        assert_eq!(args.tip.change_tip, ChangeTip::Always);
        assert_eq!(args.tip.drop_tip_location, TRASH_BIN);
        assert_eq!(args.aspirate.offset_from_bottom_mm, 1.0);
    }

    #[rstest]
    #[case(r#"{"commandCreatorFnName": "delay", "seconds": 60}"#, "delay")]
    #[case(r#"{"commandCreatorFnName": "comment", "message": "hello"}"#, "comment")]
    #[case(r#"{"commandCreatorFnName": "disengageMagnet", "moduleId": "magnetic_module"}"#, "disengageMagnet")]
    #[case(
        r#"{"commandCreatorFnName": "absorbanceReaderOpenLid", "moduleId": "absorbance_reader"}"#,
        "absorbanceReaderOpenLid"
    )]
    #[case(
        r#"{"commandCreatorFnName": "heaterShaker", "moduleId": "heater_shaker", "latchOpen": false}"#,
        "heaterShaker"
    )]
    fn creator_names(#[case] json: &str, #[case] expected: &str) {
        // when
        let step: StepArgs = serde_json::from_str(json).unwrap();

        // then
        assert_eq!(step.creator_name(), expected);
    }

    #[test]
    fn unknown_creator() {
        // given
        let json = r#"{"commandCreatorFnName": "dance"}"#;

        // when
        let result = serde_json::from_str::<StepArgs>(json);

        // then
        assert!(result.is_err());
    }

    #[test]
    fn curried_step_runs_its_creator() {
        // given
        let context = basic_context();
        let robot_state = basic_robot_state(&context);
        let step = StepArgs::Delay(DelayArgs {
            message: None,
            seconds: Some(60.0),
        });

        // when
        let result = step.into_curried()(&context, &robot_state).unwrap();

        // then
        assert_eq!(command_types(&result), vec!["waitForDuration"]);
        assert_eq!(result.python.as_deref(), Some("protocol.delay(seconds=60)"));
    }

    #[rstest]
    #[case(r#"{"commandCreatorFnName": "engageMagnet", "moduleId": "thermocycler", "height": 10}"#, THERMOCYCLER)]
    #[case(r#"{"commandCreatorFnName": "disengageMagnet", "moduleId": "temperature_module"}"#, TEMPERATURE_MODULE)]
    #[case(r#"{"commandCreatorFnName": "setTemperature", "moduleId": "magnetic_module", "celsius": 4}"#, MAGNETIC_MODULE)]
    #[case(r#"{"commandCreatorFnName": "deactivateTemperature", "moduleId": "absorbance_reader"}"#, ABSORBANCE_READER)]
    #[case(r#"{"commandCreatorFnName": "waitForTemperature", "moduleId": "thermocycler"}"#, THERMOCYCLER)]
    fn wrong_module_type(#[case] json: &str, #[case] module_id: &str) {
        // given
        let context = basic_context();
        let robot_state = basic_robot_state(&context);
        let step: StepArgs = serde_json::from_str(json).unwrap();

        // when
        let errors = step.into_curried()(&context, &robot_state).unwrap_err();

        // then
        assert_eq!(errors.errors, vec![CommandCreatorError::MissingModule {
            module_id: module_id.to_string(),
        }]);
    }

    #[rstest]
    #[case(r#"{"commandCreatorFnName": "engageMagnet", "moduleId": "magnetic_module", "height": 10}"#, "magneticModule/engage")]
    #[case(r#"{"commandCreatorFnName": "deactivateTemperature", "moduleId": "heater_shaker"}"#, "heaterShaker/deactivateHeater")]
    fn matching_module_type(#[case] json: &str, #[case] command_type: &str) {
        // given
        let context = basic_context();
        let robot_state = basic_robot_state(&context);
        let step: StepArgs = serde_json::from_str(json).unwrap();

        // when
        let result = step.into_curried()(&context, &robot_state).unwrap();

        // then
        assert_eq!(command_types(&result), vec![command_type]);
    }

    #[test]
    fn curried_compound_step() {
        // given
        let context = basic_context();
        let robot_state = basic_robot_state(&context);
        let step = StepArgs::HeaterShaker(HeaterShakerArgs {
            module_id: HEATER_SHAKER.to_string(),
            target_temperature: Some(37.0),
            rpm: None,
            latch_open: false,
            timer_seconds: None,
        });

        // when
        let result = step.into_curried()(&context, &robot_state).unwrap();

        // then
        assert_eq!(command_types(&result), vec!["heaterShaker/setTargetTemperature"]);
    }

    #[test]
    fn serializes_with_creator_name() {
        // given
        let step = StepArgs::Comment(CommentParams {
            message: "hello".to_string(),
        });

        // when
        let json = serde_json::to_value(&step).unwrap();

        // then
        assert_eq!(json, serde_json::json!({
            "commandCreatorFnName": "comment",
            "message": "hello",
        }));
    }
}
