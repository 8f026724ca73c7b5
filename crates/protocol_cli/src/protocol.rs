//! The protocol file: what is on the deck, where it starts and the steps to run.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use hardware::deck::RobotType;
use hardware::labware::LabwareDefinition;
use hardware::module::ModuleModel;
use hardware::pipette::{PipetteMount, PipetteSpec};
use step_generation::command_key::CommandKeyGenerator;
use step_generation::invariant_context::{
    AdditionalEquipmentName, InvariantContext, InvariantContextBuilder, InvariantContextError,
};
use step_generation::robot_state::{make_initial_robot_state, InitialLocations, LocationError, RobotState};
use step_generation::step_args::StepArgs;
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProtocolFile {
    #[serde(default)]
    pub(crate) robot_type: RobotType,
    #[serde(default)]
    pub(crate) pipettes: Vec<PipetteItem>,
    #[serde(default)]
    pub(crate) labware: Vec<LabwareItem>,
    #[serde(default)]
    pub(crate) modules: Vec<ModuleItem>,
    #[serde(default)]
    pub(crate) additional_equipment: Vec<AdditionalEquipmentItem>,
    #[serde(default)]
    pub(crate) initial_robot_state: InitialLocations,
    #[serde(default)]
    pub(crate) steps: Vec<StepArgs>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PipetteItem {
    pub(crate) id: String,
    /// e.g. `p300_single_gen2`
    pub(crate) name: String,
    pub(crate) mount: PipetteMount,
    pub(crate) spec: PipetteSpec,
    #[serde(default)]
    pub(crate) tiprack_def_uris: Vec<String>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LabwareItem {
    pub(crate) id: String,
    pub(crate) definition: LabwareDefinition,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ModuleItem {
    pub(crate) id: String,
    pub(crate) model: ModuleModel,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AdditionalEquipmentItem {
    pub(crate) id: String,
    pub(crate) name: AdditionalEquipmentName,
    #[serde(default)]
    pub(crate) location: Option<String>,
}

#[derive(Error, Debug)]
pub(crate) enum ProtocolFileError {
    #[error("Unable to read protocol file. path: {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        reason: std::io::Error,
    },
    #[error("Invalid protocol file. path: {path:?}")]
    Json {
        path: PathBuf,
        #[source]
        reason: serde_json::Error,
    },
}

impl ProtocolFile {
    pub(crate) fn load(path: &Path) -> Result<Self, ProtocolFileError> {
        let content = fs::read_to_string(path).map_err(|reason| ProtocolFileError::Io {
            path: path.to_path_buf(),
            reason,
        })?;

        let protocol: ProtocolFile = serde_json::from_str(&content).map_err(|reason| ProtocolFileError::Json {
            path: path.to_path_buf(),
            reason,
        })?;

        debug!(
            "Loaded protocol. robot: {:?}, pipettes: {}, labware: {}, modules: {}, steps: {}",
            protocol.robot_type,
            protocol.pipettes.len(),
            protocol.labware.len(),
            protocol.modules.len(),
            protocol.steps.len()
        );

        Ok(protocol)
    }

    /// Entities are added in file order, which decides their python names.
    pub(crate) fn build_invariant_context(
        &self,
        key_generator: Arc<dyn CommandKeyGenerator>,
    ) -> Result<InvariantContext, InvariantContextError> {
        let mut builder = InvariantContextBuilder::new(self.robot_type).with_key_generator(key_generator);

        for pipette in self.pipettes.iter() {
            builder = builder.with_pipette(
                &pipette.id,
                &pipette.name,
                pipette.spec.clone(),
                pipette.mount,
                pipette.tiprack_def_uris.clone(),
            );
        }
        for labware in self.labware.iter() {
            builder = builder.with_labware(&labware.id, labware.definition.clone());
        }
        for module in self.modules.iter() {
            builder = builder.with_module(&module.id, module.model);
        }
        for equipment in self.additional_equipment.iter() {
            builder = builder.with_additional_equipment(&equipment.id, equipment.name, equipment.location.as_deref());
        }

        builder.build()
    }

    /// Pipettes are mounted where the pipette list says unless the initial state says otherwise.
    pub(crate) fn build_initial_robot_state(
        &self,
        invariant_context: &InvariantContext,
    ) -> Result<RobotState, LocationError> {
        let mut locations = self.initial_robot_state.clone();
        for pipette in self.pipettes.iter() {
            locations
                .pipettes
                .entry(pipette.id.clone())
                .or_insert(pipette.mount);
        }
        trace!("Initial locations. locations: {:?}", locations);

        let robot_state = make_initial_robot_state(invariant_context, &locations);
        robot_state.validate(invariant_context)?;

        Ok(robot_state)
    }
}
