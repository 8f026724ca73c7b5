use tracing::debug;

use crate::command_creator::{reduce_command_creators, CommandCreatorResult, CurriedCommandCreator};
use crate::command_creators::compound::liquid::{
    air_gap_creator, aspirate_creators, aspirate_flow_rate, blowout_creators, dispense_creators, mix_creators,
    pre_wet_creators, touch_tip_creator, MixSettings, Well,
};
use crate::command_creators::compound::transfer::{transfer, TransferArgs};
use crate::command_creators::compound::{
    check_step_entities, check_step_volume, max_volume_per_aspirate, AspirateOptions, BlowoutLocation, BlowoutOptions, ChangeTip,
    DispenseOptions, TipOptions,
};
use crate::invariant_context::{InvariantContext, LabwareId, PipetteId};
use crate::robot_state::RobotState;

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DistributeArgs {
    pub pipette_id: PipetteId,
    pub source_labware: LabwareId,
    pub source_well: String,
    pub dest_labware: LabwareId,
    pub dest_wells: Vec<String>,
    /// Dispensed into each destination well.
    pub volume: f64,
    /// Extra volume aspirated with each multi-dispense and blown out afterwards.
    #[serde(default)]
    pub disposal_volume: Option<f64>,
    #[serde(flatten)]
    pub tip: TipOptions,
    #[serde(default)]
    pub aspirate: AspirateOptions,
    #[serde(default)]
    pub dispense: DispenseOptions,
    /// Where the disposal volume goes, the source well when absent.
    #[serde(default)]
    pub blowout: Option<BlowoutOptions>,
}

impl From<&DistributeArgs> for TransferArgs {
    fn from(args: &DistributeArgs) -> Self {
        Self {
            pipette_id: args.pipette_id.clone(),
            source_labware: args.source_labware.clone(),
            source_wells: vec![args.source_well.clone()],
            dest_labware: args.dest_labware.clone(),
            dest_wells: args.dest_wells.clone(),
            volume: args.volume,
            tip: args.tip.clone(),
            aspirate: args.aspirate.clone(),
            dispense: args.dispense.clone(),
            blowout: args.blowout.clone(),
        }
    }
}

/// Aspirates once for as many destination wells as fit in the tip and dispenses into each in turn.
///
/// Falls back to a transfer when fewer than two destinations fit in one aspirate.
pub fn distribute(args: &DistributeArgs, invariant_context: &InvariantContext, robot_state: &RobotState) -> CommandCreatorResult {
    check_step_entities(invariant_context, &args.pipette_id, &[&args.source_labware, &args.dest_labware])?;
    check_step_volume(args.volume)?;
    let pipette = invariant_context.pipette(&args.pipette_id)?;

    let air_gap_volume = args
        .aspirate
        .air_gap_volume
        .unwrap_or(0.0);
    let disposal_volume = args.disposal_volume.unwrap_or(0.0);
    let max_volume = max_volume_per_aspirate(invariant_context, &args.pipette_id, args.tip.tiprack.as_deref());
    let available = max_volume - disposal_volume - air_gap_volume;
    let dests_per_aspirate = match args.volume > 0.0 && available > 0.0 {
        true => (available / args.volume).floor() as usize,
        false => 0,
    };

    if dests_per_aspirate < 2 {
        debug!(
            "Fewer than two destinations per aspirate, transferring instead. volume: {}, max volume: {}",
            args.volume, max_volume
        );
        return transfer(&TransferArgs::from(args), invariant_context, robot_state);
    }

    let source = Well::new(&args.source_labware, &args.source_well);
    let source_mix = MixSettings::at_source(pipette, &args.aspirate, &args.dispense);
    let aspirate_air_gap_flow_rate = aspirate_flow_rate(pipette, &args.aspirate);

    let mut creators: Vec<CurriedCommandCreator> = vec![];
    for (chunk_index, dest_wells) in args
        .dest_wells
        .chunks(dests_per_aspirate)
        .enumerate()
    {
        let change_tip = match args.tip.change_tip {
            ChangeTip::Always | ChangeTip::PerDest => true,
            ChangeTip::Once | ChangeTip::PerSource => chunk_index == 0,
            ChangeTip::Never => false,
        };
        let aspirate_volume = dest_wells.len() as f64 * args.volume + disposal_volume;

        if change_tip {
            creators.push(
                args.tip
                    .replace_tip_creator(&args.pipette_id),
            );
            if args.aspirate.pre_wet_tip {
                creators.extend(pre_wet_creators(
                    pipette,
                    &source,
                    aspirate_volume,
                    &args.aspirate,
                    &args.dispense,
                ));
            }
        }
        if let Some(mix) = args.aspirate.mix {
            creators.extend(mix_creators(&args.pipette_id, &source, mix, &source_mix));
        }

        creators.extend(aspirate_creators(pipette, &source, aspirate_volume, &args.aspirate));
        if air_gap_volume > 0.0 {
            creators.push(air_gap_creator(pipette, &source, air_gap_volume, aspirate_air_gap_flow_rate));
        }

        let mut last_dest = Well::new(&args.dest_labware, &dest_wells[0]);
        for (dest_index, dest_well) in dest_wells.iter().enumerate() {
            let dest = Well::new(&args.dest_labware, dest_well);
            creators.extend(dispense_creators(pipette, &dest, args.volume + air_gap_volume, &args.dispense));
            if let Some(mm_from_top) = args.dispense.touch_tip_mm_from_top {
                creators.push(touch_tip_creator(&args.pipette_id, &dest, mm_from_top));
            }
            // The air gap is taken again between destinations, it went out with the dispense.
            if air_gap_volume > 0.0 && dest_index + 1 < dest_wells.len() {
                creators.push(air_gap_creator(pipette, &dest, air_gap_volume, aspirate_air_gap_flow_rate));
            }
            last_dest = dest;
        }

        match (&args.blowout, disposal_volume > 0.0) {
            (Some(blowout), _) => creators.extend(blowout_creators(pipette, blowout, &source, &last_dest)),
            (None, true) => {
                let to_source = BlowoutOptions {
                    location: BlowoutLocation::SourceWell,
                    flow_rate: None,
                    offset_from_top_mm: 0.0,
                };
                creators.extend(blowout_creators(pipette, &to_source, &source, &last_dest));
            }
            (None, false) => {}
        }
    }
    creators.extend(
        args.tip
            .drop_tip_after_step_creators(&args.pipette_id),
    );

    reduce_command_creators(&creators, invariant_context, robot_state)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::errors::CommandCreatorError;
    use crate::fixtures::*;

    fn distribute_args(volume: f64, disposal_volume: Option<f64>) -> DistributeArgs {
        DistributeArgs {
            pipette_id: P300_SINGLE.to_string(),
            source_labware: TROUGH_1.to_string(),
            source_well: "A1".to_string(),
            dest_labware: PLATE_1.to_string(),
            dest_wells: vec!["A1".to_string(), "B1".to_string(), "C1".to_string()],
            volume,
            disposal_volume,
            tip: TipOptions {
                change_tip: ChangeTip::Once,
                drop_tip_location: TRASH_BIN.to_string(),
                nozzles: None,
                tiprack: None,
                drop_tip_after_step: false,
            },
            aspirate: AspirateOptions::default(),
            dispense: DispenseOptions::default(),
            blowout: None,
        }
    }

    fn filled_trough_state(context: &InvariantContext) -> RobotState {
        with_liquid(basic_robot_state(context), TROUGH_1, "A1", "water", 5000.0)
    }

    #[test]
    fn one_aspirate_for_all_destinations() {
        // given
        let context = basic_context();
        let robot_state = filled_trough_state(&context);

        // when
        let result = distribute(&distribute_args(50.0, None), &context, &robot_state).unwrap();

        // then
        assert_eq!(command_types(&result), vec!["pickUpTip", "aspirate", "dispense", "dispense", "dispense"]);
        let json = serde_json::to_value(&result.commands).unwrap();
        assert_eq!(json[1]["params"]["volume"], json!(150.0));
    }

    #[rstest]
    #[case(0.0)]
    #[case(f64::INFINITY)]
    fn unpipettable_volume(#[case] volume: f64) {
        // given
        let context = basic_context();
        let robot_state = filled_trough_state(&context);

        // when
        let errors = distribute(&distribute_args(volume, None), &context, &robot_state).unwrap_err();

        // then
        assert_eq!(errors.errors, vec![CommandCreatorError::InvalidVolume {
            volume,
        }]);
    }

    #[test]
    fn disposal_volume_is_blown_out_into_source() {
        // given
        let context = basic_context();
        let robot_state = filled_trough_state(&context);

        // when
        let result = distribute(&distribute_args(100.0, Some(20.0)), &context, &robot_state).unwrap();

        // then
        assert_eq!(command_types(&result), vec![
            "pickUpTip",
            "aspirate",
            "dispense",
            "dispense",
            "blowout",
            "aspirate",
            "dispense",
            "blowout",
        ]);
        let json = serde_json::to_value(&result.commands).unwrap();
        assert_eq!(json[1]["params"]["volume"], json!(220.0));
        assert_eq!(json[4]["params"]["labwareId"], json!(TROUGH_1));
        assert_eq!(json[5]["params"]["volume"], json!(120.0));
    }

    #[test]
    fn air_gap_between_destinations() {
        // given
        let context = basic_context();
        let robot_state = filled_trough_state(&context);
        let mut args = distribute_args(50.0, None);
        args.dest_wells.truncate(2);
        args.aspirate.air_gap_volume = Some(5.0);

        // when
        let result = distribute(&args, &context, &robot_state).unwrap();

        // then
        assert_eq!(command_types(&result), vec![
            "pickUpTip",
            "aspirate",
            "moveToWell",
            "aspirateInPlace",
            "dispense",
            "moveToWell",
            "aspirateInPlace",
            "dispense",
        ]);
    }

    #[test]
    fn single_destination_per_aspirate_falls_back_to_transfer() {
        // given
        let context = basic_context();
        let robot_state = filled_trough_state(&context);

        // when
        let result = distribute(&distribute_args(200.0, None), &context, &robot_state).unwrap();

        // then
        assert_eq!(command_types(&result), vec![
            "pickUpTip",
            "aspirate",
            "dispense",
            "aspirate",
            "dispense",
            "aspirate",
            "dispense",
        ]);
    }
}
