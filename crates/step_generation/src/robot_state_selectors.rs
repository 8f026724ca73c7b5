//! Queries over a [`RobotState`] in the context of an [`InvariantContext`].

use std::cmp::Ordering;

use hardware::deck::compare_slot_names;
use hardware::pipette::NozzleConfiguration;

use crate::invariant_context::InvariantContext;
use crate::robot_state::{DeckLocation, ModuleState, RobotState};
use crate::utils::well_geometry::get_tip_footprint;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextTip {
    pub tiprack_id: String,
    pub well_name: String,
}

/// The deck slot a labware ultimately sits in, `None` when off deck or discarded.
pub fn get_labware_deck_slot(
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
    labware_id: &str,
) -> Option<String> {
    match robot_state.labware_deck_location(invariant_context, labware_id) {
        Ok(DeckLocation::Slot(slot)) => Some(slot),
        _ => None,
    }
}

/// Orders labware by the deck slot they are in, labware without a slot last.
pub fn sort_labware_by_slot(
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
    mut labware_ids: Vec<String>,
) -> Vec<String> {
    labware_ids.sort_by(|a, b| {
        let slot_a = get_labware_deck_slot(invariant_context, robot_state, a);
        let slot_b = get_labware_deck_slot(invariant_context, robot_state, b);
        match (slot_a, slot_b) {
            (Some(slot_a), Some(slot_b)) => compare_slot_names(&slot_a, &slot_b).then_with(|| a.cmp(b)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.cmp(b),
        }
    });
    labware_ids
}

pub fn get_module_state<'a>(robot_state: &'a RobotState, module_id: &str) -> Option<&'a ModuleState> {
    robot_state.module_state(module_id)
}

/// The labware placed directly on the module.
pub fn get_labware_on_module<'a>(robot_state: &'a RobotState, module_id: &str) -> Option<&'a str> {
    robot_state
        .labware
        .iter()
        .find(|(_id, labware)| labware.slot == module_id)
        .map(|(id, _labware)| id.as_str())
}

/// The module a labware is on, directly or via an adapter.
pub fn get_module_under_labware<'a>(
    robot_state: &'a RobotState,
    labware_id: &str,
) -> Option<&'a str> {
    let mut current = robot_state.labware.get(labware_id)?;
    // bounded by the number of labware, guards against location cycles
    for _ in 0..=robot_state.labware.len() {
        if let Some((module_id, _module)) = robot_state
            .modules
            .get_key_value(&current.slot)
        {
            return Some(module_id.as_str());
        }
        current = robot_state.labware.get(&current.slot)?;
    }
    None
}

/// Height of the top of the labware above the deck, including modules and adapters below it.
pub fn get_labware_stack_height(
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
    labware_id: &str,
) -> f64 {
    let mut height = 0.0;
    let mut current = labware_id;
    for _ in 0..=robot_state.labware.len() {
        let Some(entity) = invariant_context
            .labware_entities
            .get(current)
        else {
            break;
        };
        height += entity.def.height();

        let Some(labware) = robot_state.labware.get(current) else {
            break;
        };
        if let Some(below) = invariant_context
            .labware_entities
            .get(&labware.slot)
        {
            height -= entity
                .def
                .stacking_offset_on(below.def.load_name())
                .z
                .min(below.def.height());
            current = &labware.slot;
            continue;
        }
        if let Some(module) = invariant_context
            .module_entities
            .get(&labware.slot)
        {
            height += module.model.overall_height();
        }
        break;
    }
    height
}

/// The tallest labware or module in the slot, 0 when empty.
pub fn get_slot_height(invariant_context: &InvariantContext, robot_state: &RobotState, slot: &str) -> f64 {
    let labware_heights = robot_state
        .labware
        .keys()
        .filter(|labware_id| get_labware_deck_slot(invariant_context, robot_state, labware_id).as_deref() == Some(slot))
        .map(|labware_id| get_labware_stack_height(invariant_context, robot_state, labware_id));

    let module_heights = robot_state
        .modules
        .iter()
        .filter(|(_id, module)| module.slot == slot)
        .filter_map(|(id, _module)| invariant_context.module_entities.get(id))
        .map(|entity| entity.model.overall_height());

    labware_heights
        .chain(module_heights)
        .fold(0.0, f64::max)
}

/// Labware, modules or fixtures occupying a deck slot, module or labware.
pub fn is_location_occupied(robot_state: &RobotState, location: &str) -> bool {
    robot_state
        .labware
        .values()
        .any(|labware| labware.slot == location)
        || robot_state
            .modules
            .values()
            .any(|module| module.slot == location)
}

/// The first tip that can be picked up from the tip rack with the pipette's current nozzle layout.
pub fn get_next_tip(
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
    pipette_id: &str,
    tiprack_id: &str,
) -> Option<String> {
    let pipette = invariant_context
        .pipette_entities
        .get(pipette_id)?;
    let tiprack = invariant_context
        .labware_entities
        .get(tiprack_id)?;
    let tips = robot_state
        .tip_state
        .tipracks
        .get(tiprack_id)?;
    let nozzles = robot_state.pipette_nozzles(pipette_id);

    let candidates: Vec<&String> = match pipette.spec.active_channels(nozzles) {
        1 => tiprack.def.ordered_well_names().collect(),
        _ => tiprack
            .def
            .ordering
            .iter()
            .filter_map(|column| column.first())
            .collect(),
    };

    candidates
        .into_iter()
        .find(|well_name| {
            get_tip_footprint(&pipette.spec, nozzles, &tiprack.def, well_name)
                .iter()
                .all(|tip| tips.get(tip).copied().unwrap_or(false))
        })
        .cloned()
}

/// The next tip from the on-deck tip racks assigned to the pipette, racks are used in slot order.
///
/// A 96-channel pipette using all nozzles can only pick up from racks on an adapter, with a column layout only
/// from racks that are not.
pub fn get_next_tiprack(
    invariant_context: &InvariantContext,
    robot_state: &RobotState,
    pipette_id: &str,
) -> Option<NextTip> {
    let pipette = invariant_context
        .pipette_entities
        .get(pipette_id)?;
    let nozzles = robot_state.pipette_nozzles(pipette_id);

    let tipracks = robot_state
        .tip_state
        .tipracks
        .keys()
        .filter(|tiprack_id| {
            invariant_context
                .labware_entities
                .get(*tiprack_id)
                .map(|entity| {
                    pipette
                        .tiprack_def_uris
                        .contains(&entity.def.uri())
                })
                .unwrap_or(false)
        })
        .filter(|tiprack_id| get_labware_deck_slot(invariant_context, robot_state, tiprack_id).is_some())
        .filter(|tiprack_id| {
            if !pipette.spec.is_ninety_six_channel() {
                return true;
            }
            let on_adapter = is_on_adapter(invariant_context, robot_state, tiprack_id);
            match nozzles {
                Some(NozzleConfiguration::Column) => !on_adapter,
                _ => on_adapter,
            }
        })
        .cloned()
        .collect::<Vec<_>>();

    sort_labware_by_slot(invariant_context, robot_state, tipracks)
        .into_iter()
        .find_map(|tiprack_id| {
            get_next_tip(invariant_context, robot_state, pipette_id, &tiprack_id).map(|well_name| NextTip {
                tiprack_id,
                well_name,
            })
        })
}

pub fn is_on_adapter(invariant_context: &InvariantContext, robot_state: &RobotState, labware_id: &str) -> bool {
    robot_state
        .labware
        .get(labware_id)
        .and_then(|labware| {
            invariant_context
                .labware_entities
                .get(&labware.slot)
        })
        .map(|below| below.def.is_adapter())
        .unwrap_or(false)
}

/// The usable volume of the pipette with its tips, the smaller of the two capacities.
///
/// With no `tiprack_def_uri` the first tip rack assigned to the pipette is used.
pub fn get_pipette_with_tip_max_vol(
    invariant_context: &InvariantContext,
    pipette_id: &str,
    tiprack_def_uri: Option<&str>,
) -> Option<f64> {
    let pipette = invariant_context
        .pipette_entities
        .get(pipette_id)?;
    let uri = match tiprack_def_uri {
        Some(uri) => uri.to_string(),
        None => pipette
            .tiprack_def_uris
            .first()
            .cloned()?,
    };

    let tip_max_volume = invariant_context
        .labware_entities
        .values()
        .find(|entity| entity.def.uri() == uri)
        .and_then(|entity| entity.def.tip_max_volume());

    Some(match tip_max_volume {
        Some(tip_max_volume) => pipette.spec.max_volume.min(tip_max_volume),
        None => pipette.spec.max_volume,
    })
}

/// Length of the tips used by the pipette, from its first assigned tip rack.
pub fn get_pipette_tip_length(invariant_context: &InvariantContext, pipette_id: &str) -> f64 {
    invariant_context
        .pipette_entities
        .get(pipette_id)
        .and_then(|pipette| pipette.tiprack_def_uris.first())
        .and_then(|uri| {
            invariant_context
                .labware_entities
                .values()
                .find(|entity| &entity.def.uri() == uri)
        })
        .map(|entity| entity.def.tip_length())
        .unwrap_or(0.0)
}
