use std::cmp::Ordering;

use lexical_sort::natural_lexical_cmp;

/// Labware location for labware that is not on the deck.
pub const OFF_DECK: &str = "offDeck";

/// Staging area slots, only reachable by the gripper.
pub const COLUMN_4_SLOTS: [&str; 4] = ["A4", "B4", "C4", "D4"];

/// The cutout of the waste chute fixture.
pub const WASTE_CHUTE_CUTOUT: &str = "cutoutD3";

pub const OT2_FIXED_TRASH_ADDRESSABLE_AREA: &str = "fixedTrash";
pub const GRIPPER_WASTE_CHUTE_ADDRESSABLE_AREA: &str = "gripperWasteChute";

/// Labware taller than this, east or west of a heater-shaker, blocks access to the heater-shaker.
pub const MAX_LABWARE_HEIGHT_EAST_WEST_HEATER_SHAKER_MM: f64 = 53.0;

/// The slot name used by an OT-2 thermocycler, which occupies four slots.
pub const OT2_THERMOCYCLER_SLOT: &str = "span7_8_10_11";

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum RobotType {
    #[serde(rename = "OT-2 Standard")]
    Ot2,
    #[default]
    #[serde(rename = "OT-3 Standard")]
    Flex,
}

/// Grid position of a slot, row 0 is the front row, column 0 is the left column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotPosition {
    pub row: i8,
    pub column: i8,
}

const FLEX_ROWS: [char; 4] = ['D', 'C', 'B', 'A'];

pub fn slot_position(robot_type: RobotType, slot: &str) -> Option<SlotPosition> {
    match robot_type {
        RobotType::Ot2 => {
            let slot = if slot == OT2_THERMOCYCLER_SLOT { "7" } else { slot };
            let number: i8 = slot.parse().ok()?;
            if !(1..=12).contains(&number) {
                return None;
            }
            Some(SlotPosition {
                row: (number - 1) / 3,
                column: (number - 1) % 3,
            })
        }
        RobotType::Flex => {
            let mut chars = slot.chars();
            let row_char = chars.next()?;
            let column: i8 = chars.as_str().parse().ok()?;
            let row = FLEX_ROWS
                .iter()
                .position(|candidate| *candidate == row_char)?;
            if !(1..=4).contains(&column) {
                return None;
            }
            Some(SlotPosition {
                row: row as i8,
                column: column - 1,
            })
        }
    }
}

pub fn slot_at(robot_type: RobotType, position: SlotPosition) -> Option<String> {
    match robot_type {
        RobotType::Ot2 => {
            if !(0..4).contains(&position.row) || !(0..3).contains(&position.column) {
                return None;
            }
            Some((position.row * 3 + position.column + 1).to_string())
        }
        RobotType::Flex => {
            if !(0..4).contains(&position.row) || !(0..4).contains(&position.column) {
                return None;
            }
            Some(format!("{}{}", FLEX_ROWS[position.row as usize], position.column + 1))
        }
    }
}

fn offset_slot(robot_type: RobotType, slot: &str, rows: i8, columns: i8) -> Option<String> {
    let position = slot_position(robot_type, slot)?;
    slot_at(robot_type, SlotPosition {
        row: position.row + rows,
        column: position.column + columns,
    })
}

pub fn west_slot(robot_type: RobotType, slot: &str) -> Option<String> {
    offset_slot(robot_type, slot, 0, -1)
}

pub fn east_slot(robot_type: RobotType, slot: &str) -> Option<String> {
    offset_slot(robot_type, slot, 0, 1)
}

pub fn east_west_slots(robot_type: RobotType, slot: &str) -> Vec<String> {
    [west_slot(robot_type, slot), east_slot(robot_type, slot)]
        .into_iter()
        .flatten()
        .collect()
}

pub fn north_south_slots(robot_type: RobotType, slot: &str) -> Vec<String> {
    [offset_slot(robot_type, slot, 1, 0), offset_slot(robot_type, slot, -1, 0)]
        .into_iter()
        .flatten()
        .collect()
}

pub fn is_column_4_slot(slot: &str) -> bool {
    COLUMN_4_SLOTS.contains(&slot)
}

/// `cutoutA3` -> `A3`
pub fn cutout_to_slot(cutout: &str) -> &str {
    cutout
        .strip_prefix("cutout")
        .unwrap_or(cutout)
}

/// A staging area fixture in `cutoutB3` provides slot `B4`.
pub fn staging_area_slot(cutout: &str) -> Option<String> {
    let slot = cutout_to_slot(cutout);
    let row = slot.chars().next()?;
    Some(format!("{}4", row))
}

/// `cutoutA3` -> `movableTrashA3`
pub fn movable_trash_addressable_area(cutout: &str) -> String {
    format!("movableTrash{}", cutout_to_slot(cutout))
}

pub fn waste_chute_addressable_area(channels: u8) -> String {
    format!("{}ChannelWasteChute", channels)
}

/// Natural ordering of slot names, so that `2` sorts before `10`.
pub fn compare_slot_names(a: &str, b: &str) -> Ordering {
    natural_lexical_cmp(a, b)
}
