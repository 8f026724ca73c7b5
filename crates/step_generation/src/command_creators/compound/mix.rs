use tracing::debug;

use crate::command_creator::{reduce_command_creators, CommandCreatorResult, CurriedCommandCreator};
use crate::command_creators::compound::liquid::{blowout_creators, mix_creators, touch_tip_creator, MixSettings, Well};
use crate::command_creators::compound::{
    check_step_entities, AspirateOptions, BlowoutOptions, ChangeTip, DispenseOptions, MixOptions, TipOptions,
};
use crate::invariant_context::{InvariantContext, LabwareId, PipetteId};
use crate::robot_state::RobotState;

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MixArgs {
    pub pipette_id: PipetteId,
    pub labware_id: LabwareId,
    pub wells: Vec<String>,
    pub volume: f64,
    pub times: u32,
    #[serde(flatten)]
    pub tip: TipOptions,
    /// Flow rate, height and delay of the aspirate half of each cycle.
    #[serde(default)]
    pub aspirate: AspirateOptions,
    #[serde(default)]
    pub dispense: DispenseOptions,
    #[serde(default)]
    pub blowout: Option<BlowoutOptions>,
    #[serde(default)]
    pub touch_tip_mm_from_top: Option<f64>,
}

/// Mixes each well in turn.
///
/// `perSource` and `perDest` both change the tip for every well, there is only one well per mix.
pub fn mix(args: &MixArgs, invariant_context: &InvariantContext, robot_state: &RobotState) -> CommandCreatorResult {
    check_step_entities(invariant_context, &args.pipette_id, &[&args.labware_id])?;
    let pipette = invariant_context.pipette(&args.pipette_id)?;

    debug!(
        "Mixing. pipette: '{}', labware: '{}', wells: {:?}, volume: {}, times: {}",
        args.pipette_id, args.labware_id, args.wells, args.volume, args.times
    );

    let settings = MixSettings::at_source(pipette, &args.aspirate, &args.dispense);
    let mix_options = MixOptions {
        volume: args.volume,
        times: args.times,
    };

    let mut creators: Vec<CurriedCommandCreator> = vec![];
    for (index, well_name) in args.wells.iter().enumerate() {
        let well = Well::new(&args.labware_id, well_name);

        let change_tip = match args.tip.change_tip {
            ChangeTip::Always | ChangeTip::PerSource | ChangeTip::PerDest => true,
            ChangeTip::Once => index == 0,
            ChangeTip::Never => false,
        };
        if change_tip {
            creators.push(
                args.tip
                    .replace_tip_creator(&args.pipette_id),
            );
        }

        creators.extend(mix_creators(&args.pipette_id, &well, mix_options, &settings));

        if let Some(blowout) = &args.blowout {
            creators.extend(blowout_creators(pipette, blowout, &well, &well));
        }
        if let Some(mm_from_top) = args.touch_tip_mm_from_top {
            creators.push(touch_tip_creator(&args.pipette_id, &well, mm_from_top));
        }
    }
    creators.extend(
        args.tip
            .drop_tip_after_step_creators(&args.pipette_id),
    );

    reduce_command_creators(&creators, invariant_context, robot_state)
}
