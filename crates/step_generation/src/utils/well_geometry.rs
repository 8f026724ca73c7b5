use hardware::labware::LabwareDefinition;
use hardware::pipette::{NozzleConfiguration, PipetteSpec, NOZZLE_PITCH_MM};
use itertools::Itertools;

/// The well below each nozzle when the primary nozzle targets `well_name`, indexed by tip.
///
/// Nozzles are first placed with the primary nozzle over the center of the target well, which suits plates. When
/// that leaves nozzles outside of any well, e.g. a multi-channel in a reservoir, the nozzle column is centered on
/// the well instead and whichever placement hits more wells is used.
///
/// Returns `None` if the labware has no such well.
pub fn get_wells_for_tips(
    spec: &PipetteSpec,
    nozzles: Option<NozzleConfiguration>,
    labware: &LabwareDefinition,
    well_name: &str,
) -> Option<Vec<Option<String>>> {
    let well = labware.well(well_name)?;
    let offsets = spec.nozzle_offsets(nozzles);

    let place = |y_shift: f64| {
        offsets
            .iter()
            .map(|(dx, dy)| {
                labware
                    .well_at(well.x + dx, well.y + y_shift + dy)
                    .map(str::to_string)
            })
            .collect::<Vec<_>>()
    };

    let aligned = place(0.0);
    let hits = |wells: &[Option<String>]| wells.iter().flatten().count();
    if hits(&aligned) == aligned.len() {
        return Some(aligned);
    }

    let rows = offsets
        .iter()
        .map(|(_dx, dy)| (dy / NOZZLE_PITCH_MM).round() as i64)
        .unique()
        .count();
    let centered = place((rows.saturating_sub(1)) as f64 * NOZZLE_PITCH_MM / 2.0);

    match hits(&centered) > hits(&aligned) {
        true => Some(centered),
        false => Some(aligned),
    }
}

/// Tip rack wells emptied by a pick up with the given nozzle layout, in tip order.
pub fn get_tip_footprint(
    spec: &PipetteSpec,
    nozzles: Option<NozzleConfiguration>,
    tiprack: &LabwareDefinition,
    well_name: &str,
) -> Vec<String> {
    match spec.active_channels(nozzles) {
        1 => vec![well_name.to_string()],
        8 => tiprack
            .column_of(well_name)
            .cloned()
            .unwrap_or_else(|| vec![well_name.to_string()]),
        _ => tiprack
            .ordered_well_names()
            .cloned()
            .collect(),
    }
}
