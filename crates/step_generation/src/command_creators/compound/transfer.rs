use tracing::{debug, warn};

use crate::command_creator::{reduce_command_creators, CommandCreatorResult, CurriedCommandCreator};
use crate::command_creators::compound::liquid::{
    air_gap_creator, aspirate_creators, aspirate_flow_rate, blowout_creators, dispense_creators, dispense_flow_rate,
    mix_creators, pre_wet_creators, touch_tip_creator, MixSettings, Well,
};
use crate::command_creators::compound::{
    check_step_entities, max_volume_per_aspirate, split_volume, AspirateOptions, BlowoutOptions, ChangeTip,
    DispenseOptions, TipOptions,
};
use crate::invariant_context::{InvariantContext, LabwareId, PipetteId};
use crate::robot_state::RobotState;

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransferArgs {
    pub pipette_id: PipetteId,
    pub source_labware: LabwareId,
    pub source_wells: Vec<String>,
    pub dest_labware: LabwareId,
    pub dest_wells: Vec<String>,
    /// Per source and destination pair.
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

/// Pairs source and destination wells, a single well on either side is used for every well on the other.
pub(crate) fn pair_wells(source_wells: &[String], dest_wells: &[String]) -> Vec<(String, String)> {
    match (source_wells, dest_wells) {
        ([source], dest_wells) => dest_wells
            .iter()
            .map(|dest| (source.clone(), dest.clone()))
            .collect(),
        (source_wells, [dest]) => source_wells
            .iter()
            .map(|source| (source.clone(), dest.clone()))
            .collect(),
        (source_wells, dest_wells) => {
            if source_wells.len() != dest_wells.len() {
                warn!(
                    "Unequal well counts, extra wells are ignored. sources: {}, destinations: {}",
                    source_wells.len(),
                    dest_wells.len()
                );
            }
            source_wells
                .iter()
                .cloned()
                .zip(dest_wells.iter().cloned())
                .collect()
        }
    }
}

/// Moves `volume` from each source well to its destination well, splitting volumes that do not fit in one tip.
pub fn transfer(args: &TransferArgs, invariant_context: &InvariantContext, robot_state: &RobotState) -> CommandCreatorResult {
    check_step_entities(invariant_context, &args.pipette_id, &[&args.source_labware, &args.dest_labware])?;
    let pipette = invariant_context.pipette(&args.pipette_id)?;

    let air_gap_volume = args
        .aspirate
        .air_gap_volume
        .unwrap_or(0.0);
    let max_volume = max_volume_per_aspirate(invariant_context, &args.pipette_id, args.tip.tiprack.as_deref()) - air_gap_volume;
    let chunks = split_volume(args.volume, max_volume)?;
    let pairs = pair_wells(&args.source_wells, &args.dest_wells);

    debug!(
        "Transferring. pipette: '{}', pairs: {}, volume: {}, chunks per pair: {}",
        args.pipette_id,
        pairs.len(),
        args.volume,
        chunks.len()
    );

    let source_mix = MixSettings::at_source(pipette, &args.aspirate, &args.dispense);
    let dest_mix = MixSettings::at_destination(pipette, &args.aspirate, &args.dispense);

    let mut creators: Vec<CurriedCommandCreator> = vec![];
    let mut previous_pair: Option<&(String, String)> = None;
    for pair in pairs.iter() {
        let (source_well, dest_well) = pair;
        let source = Well::new(&args.source_labware, source_well);
        let dest = Well::new(&args.dest_labware, dest_well);

        for (chunk_index, chunk) in chunks.iter().enumerate() {
            let first_chunk_of_pair = chunk_index == 0;
            let change_tip = match args.tip.change_tip {
                ChangeTip::Always => true,
                ChangeTip::Once => previous_pair.is_none() && first_chunk_of_pair,
                ChangeTip::Never => false,
                ChangeTip::PerSource => {
                    first_chunk_of_pair && previous_pair.map_or(true, |(previous_source, _)| previous_source != source_well)
                }
                ChangeTip::PerDest => {
                    first_chunk_of_pair && previous_pair.map_or(true, |(_, previous_dest)| previous_dest != dest_well)
                }
            };

            if change_tip {
                creators.push(
                    args.tip
                        .replace_tip_creator(&args.pipette_id),
                );
                if args.aspirate.pre_wet_tip {
                    creators.extend(pre_wet_creators(pipette, &source, *chunk, &args.aspirate, &args.dispense));
                }
            }

            if let Some(mix) = args.aspirate.mix {
                creators.extend(mix_creators(&args.pipette_id, &source, mix, &source_mix));
            }
            creators.extend(aspirate_creators(pipette, &source, *chunk, &args.aspirate));
            if air_gap_volume > 0.0 {
                creators.push(air_gap_creator(
                    pipette,
                    &source,
                    air_gap_volume,
                    aspirate_flow_rate(pipette, &args.aspirate),
                ));
            }

            creators.extend(dispense_creators(pipette, &dest, chunk + air_gap_volume, &args.dispense));
            if let Some(mix) = args.dispense.mix {
                creators.extend(mix_creators(&args.pipette_id, &dest, mix, &dest_mix));
            }
            if let Some(mm_from_top) = args.dispense.touch_tip_mm_from_top {
                creators.push(touch_tip_creator(&args.pipette_id, &dest, mm_from_top));
            }
            if let Some(blowout) = &args.blowout {
                creators.extend(blowout_creators(pipette, blowout, &source, &dest));
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
        previous_pair = Some(pair);
    }
    creators.extend(
        args.tip
            .drop_tip_after_step_creators(&args.pipette_id),
    );

    reduce_command_creators(&creators, invariant_context, robot_state)
}
