use tracing::debug;

use crate::command_creator::{reduce_command_creators, CommandCreatorResult, CurriedCommandCreator};
use crate::command_creators::compound::liquid::{
    air_gap_creator, aspirate_creators, aspirate_flow_rate, blowout_creators, dispense_creators, dispense_flow_rate,
    mix_creators, pre_wet_creators, touch_tip_creator, MixSettings, Well,
};
use crate::command_creators::compound::transfer::{transfer, TransferArgs};
use crate::command_creators::compound::{
    check_step_entities, check_step_volume, max_volume_per_aspirate, AspirateOptions, BlowoutOptions, ChangeTip, DispenseOptions,
    TipOptions,
};
use crate::invariant_context::{InvariantContext, LabwareId, PipetteId};
use crate::robot_state::RobotState;

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidateArgs {
    pub pipette_id: PipetteId,
    pub source_labware: LabwareId,
    pub source_wells: Vec<String>,
    pub dest_labware: LabwareId,
    pub dest_well: String,
    /// Taken from each source well.
    pub volume: f64,
    #[serde(flatten)]
    pub tip: TipOptions,
    #[serde(default)]
    pub aspirate: AspirateOptions,
    #[serde(default)]
    pub dispense: DispenseOptions,
    #[serde(default)]
    pub blowout: Option<BlowoutOptions>,
}

impl From<&ConsolidateArgs> for TransferArgs {
    fn from(args: &ConsolidateArgs) -> Self {
        Self {
            pipette_id: args.pipette_id.clone(),
            source_labware: args.source_labware.clone(),
            source_wells: args.source_wells.clone(),
            dest_labware: args.dest_labware.clone(),
            dest_wells: vec![args.dest_well.clone()],
            volume: args.volume,
            tip: args.tip.clone(),
            aspirate: args.aspirate.clone(),
            dispense: args.dispense.clone(),
            blowout: args.blowout.clone(),
        }
    }
}

/// Aspirates from as many source wells as fit in the tip, then dispenses them together into the destination.
///
/// Falls back to a transfer when a single well's volume plus air gap does not fit.
pub fn consolidate(
    args: &ConsolidateArgs,
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
) -> CommandCreatorResult {
    check_step_entities(invariant_context, &args.pipette_id, &[&args.source_labware, &args.dest_labware])?;
    check_step_volume(args.volume)?;
    let pipette = invariant_context.pipette(&args.pipette_id)?;

    let air_gap_volume = args
        .aspirate
        .air_gap_volume
        .unwrap_or(0.0);
    let max_volume = max_volume_per_aspirate(invariant_context, &args.pipette_id, args.tip.tiprack.as_deref());
    let wells_per_aspirate = (max_volume / (args.volume + air_gap_volume)).floor() as usize;

    if wells_per_aspirate == 0 {
        debug!(
            "Consolidate volume exceeds tip capacity, transferring instead. volume: {}, max volume: {}",
            args.volume, max_volume
        );
        return transfer(&TransferArgs::from(args), invariant_context, robot_state);
    }

    let source_mix = MixSettings::at_source(pipette, &args.aspirate, &args.dispense);
    let dest_mix = MixSettings::at_destination(pipette, &args.aspirate, &args.dispense);
    let dest = Well::new(&args.dest_labware, &args.dest_well);

    let mut creators: Vec<CurriedCommandCreator> = vec![];
    for (chunk_index, source_wells) in args
        .source_wells
        .chunks(wells_per_aspirate)
        .enumerate()
    {
        let change_tip = match args.tip.change_tip {
            ChangeTip::Always | ChangeTip::PerSource => true,
            ChangeTip::Once | ChangeTip::PerDest => chunk_index == 0,
            ChangeTip::Never => false,
        };
        let first_source = Well::new(&args.source_labware, &source_wells[0]);

        if change_tip {
            creators.push(
                args.tip
                    .replace_tip_creator(&args.pipette_id),
            );
            if args.aspirate.pre_wet_tip {
                creators.extend(pre_wet_creators(
                    pipette,
                    &first_source,
                    args.volume,
                    &args.aspirate,
                    &args.dispense,
                ));
            }
        }

        for (well_index, source_well) in source_wells.iter().enumerate() {
            let source = Well::new(&args.source_labware, source_well);
            // Only an empty tip can mix without contaminating the source.
            if well_index == 0 {
                if let Some(mix) = args.aspirate.mix {
                    creators.extend(mix_creators(&args.pipette_id, &source, mix, &source_mix));
                }
            }
            creators.extend(aspirate_creators(pipette, &source, args.volume, &args.aspirate));
            if air_gap_volume > 0.0 {
                creators.push(air_gap_creator(
                    pipette,
                    &source,
                    air_gap_volume,
                    aspirate_flow_rate(pipette, &args.aspirate),
                ));
            }
        }

        let dispense_volume = source_wells.len() as f64 * (args.volume + air_gap_volume);
        creators.extend(dispense_creators(pipette, &dest, dispense_volume, &args.dispense));
        if let Some(mix) = args.dispense.mix {
            creators.extend(mix_creators(&args.pipette_id, &dest, mix, &dest_mix));
        }
        if let Some(mm_from_top) = args.dispense.touch_tip_mm_from_top {
            creators.push(touch_tip_creator(&args.pipette_id, &dest, mm_from_top));
        }
        if let Some(blowout) = &args.blowout {
            creators.extend(blowout_creators(pipette, blowout, &first_source, &dest));
        }
        if let Some(dispense_air_gap) = args.dispense.air_gap_volume {
            creators.push(air_gap_creator(
                pipette,
                &dest,
                dispense_air_gap,
                dispense_flow_rate(pipette, &args.dispense),
            ));
        }
    }
    creators.extend(
        args.tip
            .drop_tip_after_step_creators(&args.pipette_id),
    );

    reduce_command_creators(&creators, invariant_context, robot_state)
}
