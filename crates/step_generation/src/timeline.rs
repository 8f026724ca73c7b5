//! Runs whole protocol steps in order, recording the robot state after each one.

use std::slice;

use tracing::{debug, info, warn, Level};

use crate::command::Command;
use crate::command_creator::{reduce_command_creators_with_state, CommandCreatorErrors, CurriedCommandCreator};
use crate::errors::{CommandCreatorError, CommandCreatorWarning};
use crate::invariant_context::InvariantContext;
use crate::robot_state::RobotState;

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[derive(strum_macros::Display, strum_macros::EnumString)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum OnStepError {
    /// Stop at the first failing step.
    #[default]
    Halt,
    /// Record the error and run the remaining steps against the last good state.
    Continue,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TimelineOptions {
    #[serde(default)]
    pub on_step_error: OnStepError,
}

impl TimelineOptions {
    pub fn with_on_step_error(mut self, on_step_error: OnStepError) -> Self {
        self.on_step_error = on_step_error;
        self
    }
}

/// The outcome of one successful step.
#[derive(Debug, serde::Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimelineFrame {
    pub step_index: usize,
    /// State after the step's commands have been applied.
    pub robot_state: RobotState,
    pub commands: Vec<Command>,
    pub warnings: Vec<CommandCreatorWarning>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub python: Option<String>,
}

#[derive(Debug, serde::Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimelineStepError {
    pub step_index: usize,
    pub errors: Vec<CommandCreatorError>,
}

#[derive(Debug, serde::Serialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    pub frames: Vec<TimelineFrame>,
    pub errors: Vec<TimelineStepError>,
}

impl Timeline {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Every command of every frame, in execution order.
    pub fn commands(&self) -> impl Iterator<Item = &Command> {
        self.frames
            .iter()
            .flat_map(|frame| frame.commands.iter())
    }

    /// The python of all frames joined into one statement sequence, `None` if no step produced any.
    pub fn python(&self) -> Option<String> {
        let fragments: Vec<&str> = self
            .frames
            .iter()
            .filter_map(|frame| frame.python.as_deref())
            .filter(|fragment| !fragment.is_empty())
            .collect();

        match fragments.is_empty() {
            true => None,
            false => Some(fragments.join("\n")),
        }
    }

    /// The state after the last successful step.
    pub fn last_robot_state<'a>(&'a self, initial_robot_state: &'a RobotState) -> &'a RobotState {
        self.frames
            .last()
            .map_or(initial_robot_state, |frame| &frame.robot_state)
    }
}

/// Runs each step against the state left by the previous successful step.
///
/// A frame is produced for each step that succeeds. A failing step contributes a [`TimelineStepError`] and, with
/// [`OnStepError::Halt`], ends the timeline.
#[tracing::instrument(level = Level::DEBUG, skip_all, fields(steps = steps.len()))]
pub fn command_creators_timeline(
    steps: &[CurriedCommandCreator],
    invariant_context: &InvariantContext,
    initial_robot_state: &RobotState,
    options: &TimelineOptions,
) -> Timeline {
    let mut timeline = Timeline::default();
    let mut robot_state = initial_robot_state.clone();

    for (step_index, step) in steps.iter().enumerate() {
        match reduce_command_creators_with_state(slice::from_ref(step), invariant_context, &robot_state) {
            Ok((result, next_robot_state)) => {
                debug!(
                    "Step complete. index: {}, commands: {}, warnings: {}",
                    step_index,
                    result.commands.len(),
                    result.warnings.len()
                );

                robot_state = next_robot_state;
                timeline.frames.push(TimelineFrame {
                    step_index,
                    robot_state: robot_state.clone(),
                    commands: result.commands,
                    warnings: result.warnings,
                    python: result.python,
                });
            }
            Err(CommandCreatorErrors {
                errors,
            }) => {
                warn!("Step failed. index: {}, errors: {:?}", step_index, errors);
                timeline.errors.push(TimelineStepError {
                    step_index,
                    errors,
                });

                if options.on_step_error == OnStepError::Halt {
                    debug!("Halting timeline. remaining steps: {}", steps.len() - step_index - 1);
                    break;
                }
            }
        }
    }

    info!(
        "Timeline complete. steps: {}, frames: {}, errors: {}",
        steps.len(),
        timeline.frames.len(),
        timeline.errors.len()
    );

    timeline
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use rstest::rstest;

    use super::*;
    use crate::command::{CommentParams, ModuleParams, TemperatureParams};
    use crate::command_creator::curry_command_creator;
    use crate::command_creators::atomic::flow::comment;
    use crate::command_creators::atomic::heater_shaker::{heater_shaker_open_latch, heater_shaker_set_target_temperature};
    use crate::command_creators::compound::liquid::{air_gap, AirGapArgs};
    use crate::fixtures::*;
    use crate::robot_state::ModuleState;
    use crate::robot_state_selectors::get_module_state;

    fn comment_step(message: &str) -> CurriedCommandCreator {
        curry_command_creator(comment, CommentParams {
            message: message.to_string(),
        })
    }

    fn heat_step(celsius: f64) -> CurriedCommandCreator {
        curry_command_creator(heater_shaker_set_target_temperature, TemperatureParams {
            module_id: HEATER_SHAKER.to_string(),
            celsius,
        })
    }

    fn failing_step() -> CurriedCommandCreator {
        curry_command_creator(heater_shaker_open_latch, ModuleParams {
            module_id: "missing".to_string(),
        })
    }

    #[test]
    fn frame_per_step() {
        // given
        let context = basic_context();
        let robot_state = basic_robot_state(&context);
        let steps = vec![heat_step(40.0), comment_step("done")];

        // when
        let timeline = command_creators_timeline(&steps, &context, &robot_state, &TimelineOptions::default());

        // then
        assert!(!timeline.has_errors());
        assert_eq!(timeline.frames.len(), 2);
        assert_eq!(
            get_module_state(&timeline.frames[0].robot_state, HEATER_SHAKER),
            Some(&ModuleState::HeaterShaker {
                target_temp: Some(40.0),
                target_speed: None,
                latch_open: false,
            })
        );
        assert_eq!(timeline.frames[1].robot_state, timeline.frames[0].robot_state);
        assert_eq!(timeline.commands().count(), 2);
        assert_eq!(timeline.python().as_deref(), Some(indoc! {r#"
            heater_shaker_1.set_target_temperature(celsius=40)
            protocol.comment("done")"#
        }));
    }

    #[rstest]
    #[case(OnStepError::Halt, vec![0], vec![1])]
    #[case(OnStepError::Continue, vec![0, 2], vec![1])]
    fn step_errors(#[case] on_step_error: OnStepError, #[case] frame_steps: Vec<usize>, #[case] error_steps: Vec<usize>) {
        // given
        let context = basic_context();
        let robot_state = basic_robot_state(&context);
        let steps = vec![heat_step(40.0), failing_step(), comment_step("after")];
        let options = TimelineOptions::default().with_on_step_error(on_step_error);

        // when
        let timeline = command_creators_timeline(&steps, &context, &robot_state, &options);

        // then
        let frames: Vec<usize> = timeline
            .frames
            .iter()
            .map(|frame| frame.step_index)
            .collect();
        let errors: Vec<usize> = timeline
            .errors
            .iter()
            .map(|error| error.step_index)
            .collect();
        assert_eq!(frames, frame_steps);
        assert_eq!(errors, error_steps);
        assert_eq!(timeline.errors[0].errors, vec![CommandCreatorError::MissingModule {
            module_id: "missing".to_string(),
        }]);
    }

    #[test]
    fn continue_uses_last_good_state() {
        // given
        let context = basic_context();
        let robot_state = basic_robot_state(&context);
        let steps = vec![heat_step(40.0), failing_step(), comment_step("after")];
        let options = TimelineOptions::default().with_on_step_error(OnStepError::Continue);

        // when
        let timeline = command_creators_timeline(&steps, &context, &robot_state, &options);

        // then
        assert_eq!(timeline.frames[1].robot_state, timeline.frames[0].robot_state);
        assert_eq!(timeline.last_robot_state(&robot_state), &timeline.frames[1].robot_state);
    }

    #[test]
    fn empty_timeline() {
        // given
        let context = basic_context();
        let robot_state = basic_robot_state(&context);

        // when
        let timeline = command_creators_timeline(&[], &context, &robot_state, &TimelineOptions::default());

        // then
        assert_eq!(timeline, Timeline::default());
        assert_eq!(timeline.python(), None);
        assert_eq!(timeline.last_robot_state(&robot_state), &robot_state);
    }

    #[test]
    fn python_of_compound_step() {
        // given
        let context = basic_context();
        let robot_state = with_tip(basic_robot_state(&context), P300_SINGLE);
        let steps = vec![curry_command_creator(air_gap, AirGapArgs {
            pipette_id: P300_SINGLE.to_string(),
            labware_id: PLATE_1.to_string(),
            well_name: "A1".to_string(),
            volume: 10.0,
            flow_rate: None,
        })];

        // when
        let timeline = command_creators_timeline(&steps, &context, &robot_state, &TimelineOptions::default());

        // then
        assert_eq!(timeline.frames[0].commands.len(), 2);
        assert_eq!(timeline.frames[0].python.as_deref(), Some("pipette_left.air_gap(volume=10)"));
    }

    #[test]
    fn options_from_json() {
        // given
        let json = r#"{"onStepError": "continue"}"#;

        // when
        let options: TimelineOptions = serde_json::from_str(json).unwrap();

        // then
        assert_eq!(options.on_step_error, OnStepError::Continue);
        assert_eq!("halt".parse::<OnStepError>().unwrap(), OnStepError::Halt);
    }
}
