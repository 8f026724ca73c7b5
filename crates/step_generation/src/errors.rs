use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Domain violations found while creating commands.
///
/// Serialized as `{ "type": "<KIND>", "message": "<display>" }`, the `type` is stable and is what callers should
/// match on when localizing messages.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandCreatorError {
    #[error("The module for this step does not exist. module: '{module_id}'")]
    MissingModule { module_id: String },

    #[error("A 96-channel pipette picking up a full rack of tips requires the tip rack to be on an adapter. tiprack: '{tiprack_id}'")]
    Missing96ChannelTiprackAdapter { tiprack_id: String },

    #[error("A 96-channel pipette picking up a column of tips requires the tip rack to not be on an adapter. tiprack: '{tiprack_id}'")]
    Remove96ChannelTiprackAdapter { tiprack_id: String },

    #[error("The pipette may collide with adjacent labware or modules.")]
    PossiblePipetteCollision,

    #[error("Pipettes cannot access labware in column 4. step: '{type_of_step}'")]
    PipettingIntoColumn4 { type_of_step: String },

    #[error("Not enough tips to complete the step.")]
    InsufficientTips,

    #[error("No tip rack was selected for the pipette.")]
    NoTipSelected,

    #[error("There is no tip in the tip rack well. tiprack: '{labware_id}', well: '{well_name}'")]
    NoTipAvailable { labware_id: String, well_name: String },

    #[error("The pipette does not have a tip. pipette: '{pipette_id}'")]
    NoTipOnPipette { pipette_id: String },

    #[error("The pipette does not exist. pipette: '{pipette_id}'")]
    PipetteDoesNotExist { pipette_id: String },

    #[error("The pipette has no known location for an in-place command. pipette: '{pipette_id}'")]
    NoPipetteLocation { pipette_id: String },

    #[error("Volume exceeds the pipette's current capacity. volume: {volume}, max_volume: {max_volume}")]
    PipetteVolumeExceeded { volume: f64, max_volume: f64 },

    #[error("The volume cannot be pipetted. volume: {volume}")]
    InvalidVolume { volume: f64 },

    #[error("The labware does not exist. labware: '{labware_id}'")]
    LabwareDoesNotExist { labware_id: String },

    #[error("The labware is off the deck. labware: '{labware_id}'")]
    LabwareOffDeck { labware_id: String },

    #[error("The labware has been discarded in the waste chute. labware: '{labware_id}'")]
    LabwareDiscardedInWasteChute { labware_id: String },

    #[error("The labware cannot be moved with the gripper. labware: '{labware_id}'")]
    CannotMoveWithGripper { labware_id: String },

    #[error("A gripper is required to move labware with the gripper.")]
    GripperRequired,

    #[error("A pipette has a tip attached, tips must be removed before using the gripper.")]
    PipetteHasTip,

    #[error("The location is already occupied. location: '{location}'")]
    MultipleEntitiesOnSameSlotName { location: String },

    #[error("The location is not a valid deck location. location: '{location}'")]
    InvalidLocation { location: String },

    #[error("The thermocycler lid is closed.")]
    ThermocyclerLidClosed,

    #[error("The heater-shaker labware latch is closed.")]
    HeaterShakerLatchClosed,

    #[error("The heater-shaker labware latch is open.")]
    HeaterShakerLatchOpen,

    #[error("The heater-shaker is shaking.")]
    HeaterShakerIsShaking,

    #[error("The pipette cannot access labware north, south, east or west of a shaking heater-shaker.")]
    HeaterShakerNorthSouthEastWestShaking,

    #[error("The pipette cannot access labware east or west of a heater-shaker with an open latch.")]
    HeaterShakerEastWestWithLatchOpen,

    #[error("Multi-channel pipettes cannot access labware east or west of a heater-shaker.")]
    HeaterShakerEastWestMultiChannel,

    #[error("Labware east or west of the heater-shaker is too tall.")]
    TallLabwareEastWestOfHeaterShaker,

    #[error("The absorbance reader lid is closed.")]
    AbsorbanceReaderLidClosed,

    #[error("The absorbance reader has not been initialized.")]
    AbsorbanceReaderNoInitialization,

    #[error("The drop tip location does not exist. location: '{location}'")]
    DropTipLocationDoesNotExist { location: String },

    #[error("The additional equipment does not exist. equipment: '{equipment_id}'")]
    AdditionalEquipmentDoesNotExist { equipment_id: String },

    #[error("A GEN1 multi-channel pipette may collide with a GEN1 module.")]
    ModulePipetteCollisionDanger,
}

impl CommandCreatorError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingModule { .. } => "MISSING_MODULE",
            Self::Missing96ChannelTiprackAdapter { .. } => "MISSING_96_CHANNEL_TIPRACK_ADAPTER",
            Self::Remove96ChannelTiprackAdapter { .. } => "REMOVE_96_CHANNEL_TIPRACK_ADAPTER",
            Self::PossiblePipetteCollision => "POSSIBLE_PIPETTE_COLLISION",
            Self::PipettingIntoColumn4 { .. } => "PIPETTING_INTO_COLUMN_4",
            Self::InsufficientTips => "INSUFFICIENT_TIPS",
            Self::NoTipSelected => "NO_TIP_SELECTED",
            Self::NoTipAvailable { .. } => "NO_TIP_AVAILABLE",
            Self::NoTipOnPipette { .. } => "NO_TIP_ON_PIPETTE",
            Self::PipetteDoesNotExist { .. } => "PIPETTE_DOES_NOT_EXIST",
            Self::NoPipetteLocation { .. } => "NO_PIPETTE_LOCATION",
            Self::PipetteVolumeExceeded { .. } => "PIPETTE_VOLUME_EXCEEDED",
            Self::InvalidVolume { .. } => "INVALID_VOLUME",
            Self::LabwareDoesNotExist { .. } => "LABWARE_DOES_NOT_EXIST",
            Self::LabwareOffDeck { .. } => "LABWARE_OFF_DECK",
            Self::LabwareDiscardedInWasteChute { .. } => "LABWARE_DISCARDED_IN_WASTE_CHUTE",
            Self::CannotMoveWithGripper { .. } => "CANNOT_MOVE_WITH_GRIPPER",
            Self::GripperRequired => "GRIPPER_REQUIRED",
            Self::PipetteHasTip => "PIPETTE_HAS_TIP",
            Self::MultipleEntitiesOnSameSlotName { .. } => "MULTIPLE_ENTITIES_ON_SAME_SLOT_NAME",
            Self::InvalidLocation { .. } => "INVALID_LOCATION",
            Self::ThermocyclerLidClosed => "THERMOCYCLER_LID_CLOSED",
            Self::HeaterShakerLatchClosed => "HEATER_SHAKER_LATCH_CLOSED",
            Self::HeaterShakerLatchOpen => "HEATER_SHAKER_LATCH_OPEN",
            Self::HeaterShakerIsShaking => "HEATER_SHAKER_IS_SHAKING",
            Self::HeaterShakerNorthSouthEastWestShaking => "HEATER_SHAKER_NORTH_SOUTH_EAST_WEST_SHAKING",
            Self::HeaterShakerEastWestWithLatchOpen => "HEATER_SHAKER_EAST_WEST_LATCH_OPEN",
            Self::HeaterShakerEastWestMultiChannel => "HEATER_SHAKER_EAST_WEST_MULTI_CHANNEL",
            Self::TallLabwareEastWestOfHeaterShaker => "TALL_LABWARE_EAST_WEST_OF_HEATER_SHAKER",
            Self::AbsorbanceReaderLidClosed => "ABSORBANCE_READER_LID_CLOSED",
            Self::AbsorbanceReaderNoInitialization => "ABSORBANCE_READER_NO_INITIALIZATION",
            Self::DropTipLocationDoesNotExist { .. } => "DROP_TIP_LOCATION_DOES_NOT_EXIST",
            Self::AdditionalEquipmentDoesNotExist { .. } => "ADDITIONAL_EQUIPMENT_DOES_NOT_EXIST",
            Self::ModulePipetteCollisionDanger => "MODULE_PIPETTE_COLLISION_DANGER",
        }
    }
}

impl Serialize for CommandCreatorError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_kind_and_message(serializer, self.kind(), &self.to_string())
    }
}

/// Non-fatal findings, carried forward with the commands.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandCreatorWarning {
    #[error("The tip rack moved into the waste chute still has tips. labware: '{labware_id}'")]
    TiprackInWasteChuteHasTips { labware_id: String },

    #[error("The labware moved into the waste chute still has liquid. labware: '{labware_id}'")]
    LabwareInWasteChuteHasLiquid { labware_id: String },

    #[error("Aspirating more than the well contains. labware: '{labware_id}', well: '{well_name}'")]
    AspirateMoreThanWellContents { labware_id: String, well_name: String },

    #[error("Aspirating from a well with no liquid. labware: '{labware_id}', well: '{well_name}'")]
    AspirateFromPristineWell { labware_id: String, well_name: String },
}

impl CommandCreatorWarning {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TiprackInWasteChuteHasTips { .. } => "TIPRACK_IN_WASTE_CHUTE_HAS_TIPS",
            Self::LabwareInWasteChuteHasLiquid { .. } => "LABWARE_IN_WASTE_CHUTE_HAS_LIQUID",
            Self::AspirateMoreThanWellContents { .. } => "ASPIRATE_MORE_THAN_WELL_CONTENTS",
            Self::AspirateFromPristineWell { .. } => "ASPIRATE_FROM_PRISTINE_WELL",
        }
    }
}

impl Serialize for CommandCreatorWarning {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_kind_and_message(serializer, self.kind(), &self.to_string())
    }
}

fn serialize_kind_and_message<S: Serializer>(serializer: S, kind: &str, message: &str) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(2))?;
    map.serialize_entry("type", kind)?;
    map.serialize_entry("message", message)?;
    map.end()
}
