use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;

use hardware::deck::{movable_trash_addressable_area, RobotType, OT2_FIXED_TRASH_ADDRESSABLE_AREA};
use hardware::labware::LabwareDefinition;
use hardware::module::{ModuleModel, ModuleType};
use hardware::pipette::{PipetteMount, PipetteSpec};
use heck::ToSnakeCase;
use indexmap::IndexMap;
use thiserror::Error;
use tracing::trace;

use crate::command_key::{CommandKeyGenerator, UuidKeyGenerator};
use crate::errors::CommandCreatorError;

pub type PipetteId = String;
pub type LabwareId = String;
pub type ModuleId = String;
pub type AdditionalEquipmentId = String;

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PipetteEntity {
    pub id: PipetteId,
    /// e.g. `p300_single_gen2`
    pub name: String,
    pub spec: PipetteSpec,
    /// The tip racks this pipette may pick up tips from.
    pub tiprack_def_uris: Vec<String>,
    pub python_name: String,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LabwareEntity {
    pub id: LabwareId,
    pub def: LabwareDefinition,
    pub python_name: String,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModuleEntity {
    pub id: ModuleId,
    #[serde(rename = "type")]
    pub module_type: ModuleType,
    pub model: ModuleModel,
    pub python_name: String,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AdditionalEquipmentName {
    TrashBin,
    WasteChute,
    Gripper,
    StagingArea,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalEquipmentEntity {
    pub id: AdditionalEquipmentId,
    pub name: AdditionalEquipmentName,
    /// Cutout, e.g. `cutoutA3`, the gripper has no location.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub location: Option<String>,
    pub python_name: String,
}

/// What exists for the duration of a protocol compile, never modified by command creators.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct InvariantContext {
    #[serde(default)]
    pub robot_type: RobotType,
    pub pipette_entities: IndexMap<PipetteId, PipetteEntity>,
    pub labware_entities: IndexMap<LabwareId, LabwareEntity>,
    #[serde(default)]
    pub module_entities: IndexMap<ModuleId, ModuleEntity>,
    #[serde(default)]
    pub additional_equipment_entities: IndexMap<AdditionalEquipmentId, AdditionalEquipmentEntity>,

    #[serde(skip, default = "default_key_generator")]
    pub key_generator: Arc<dyn CommandKeyGenerator>,
}

fn default_key_generator() -> Arc<dyn CommandKeyGenerator> {
    Arc::new(UuidKeyGenerator)
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvariantContextError {
    #[error("Entity id used more than once. id: '{0}'")]
    DuplicateId(String),
    #[error("Entity stored under a different id. key: '{key}', id: '{id}'")]
    MismatchedId { key: String, id: String },
}

impl InvariantContext {
    pub fn next_key(&self) -> String {
        self.key_generator.next_key()
    }

    pub fn with_key_generator(mut self, key_generator: Arc<dyn CommandKeyGenerator>) -> Self {
        self.key_generator = key_generator;
        self
    }

    pub fn pipette(&self, pipette_id: &str) -> Result<&PipetteEntity, CommandCreatorError> {
        self.pipette_entities
            .get(pipette_id)
            .ok_or_else(|| CommandCreatorError::PipetteDoesNotExist {
                pipette_id: pipette_id.to_string(),
            })
    }

    pub fn labware(&self, labware_id: &str) -> Result<&LabwareEntity, CommandCreatorError> {
        self.labware_entities
            .get(labware_id)
            .ok_or_else(|| CommandCreatorError::LabwareDoesNotExist {
                labware_id: labware_id.to_string(),
            })
    }

    pub fn module(&self, module_id: &str) -> Result<&ModuleEntity, CommandCreatorError> {
        self.module_entities
            .get(module_id)
            .ok_or_else(|| CommandCreatorError::MissingModule {
                module_id: module_id.to_string(),
            })
    }

    pub fn additional_equipment(&self, id: &str) -> Option<&AdditionalEquipmentEntity> {
        self.additional_equipment_entities.get(id)
    }

    pub fn has_gripper(&self) -> bool {
        self.additional_equipment_entities
            .values()
            .any(|entity| entity.name == AdditionalEquipmentName::Gripper)
    }

    pub fn is_waste_chute(&self, id: &str) -> bool {
        matches!(
            self.additional_equipment(id),
            Some(AdditionalEquipmentEntity {
                name: AdditionalEquipmentName::WasteChute,
                ..
            })
        )
    }

    pub fn is_trash_bin(&self, id: &str) -> bool {
        matches!(
            self.additional_equipment(id),
            Some(AdditionalEquipmentEntity {
                name: AdditionalEquipmentName::TrashBin,
                ..
            })
        )
    }

    /// The trash bin or waste chute an addressable area belongs to.
    pub fn equipment_for_addressable_area(&self, addressable_area_name: &str) -> Option<&AdditionalEquipmentEntity> {
        self.additional_equipment_entities
            .values()
            .find(|entity| match entity.name {
                AdditionalEquipmentName::TrashBin => match (self.robot_type, entity.location.as_deref()) {
                    (RobotType::Ot2, _) => addressable_area_name == OT2_FIXED_TRASH_ADDRESSABLE_AREA,
                    (RobotType::Flex, Some(cutout)) => addressable_area_name == movable_trash_addressable_area(cutout),
                    (RobotType::Flex, None) => false,
                },
                AdditionalEquipmentName::WasteChute => addressable_area_name.ends_with("WasteChute"),
                _ => false,
            })
    }

    /// Ids must be unique across all the entity kinds and match the map keys.
    pub fn validate(&self) -> Result<(), InvariantContextError> {
        let mut seen: BTreeSet<&str> = BTreeSet::new();

        let ids = self
            .pipette_entities
            .iter()
            .map(|(key, entity)| (key, &entity.id))
            .chain(
                self.labware_entities
                    .iter()
                    .map(|(key, entity)| (key, &entity.id)),
            )
            .chain(
                self.module_entities
                    .iter()
                    .map(|(key, entity)| (key, &entity.id)),
            )
            .chain(
                self.additional_equipment_entities
                    .iter()
                    .map(|(key, entity)| (key, &entity.id)),
            );

        for (key, id) in ids {
            if key != id {
                return Err(InvariantContextError::MismatchedId {
                    key: key.clone(),
                    id: id.clone(),
                });
            }
            if !seen.insert(id.as_str()) {
                return Err(InvariantContextError::DuplicateId(id.clone()));
            }
        }

        Ok(())
    }
}

/// Builds an [`InvariantContext`], assigning python names in insertion order.
///
/// Names are `pipette_<mount>`, `<display category>_<n>` for labware, `<module kind>_<n>` for modules,
/// `trash_bin_<n>` and `waste_chute`.
pub struct InvariantContextBuilder {
    robot_type: RobotType,
    pipette_entities: IndexMap<PipetteId, PipetteEntity>,
    labware_entities: IndexMap<LabwareId, LabwareEntity>,
    module_entities: IndexMap<ModuleId, ModuleEntity>,
    additional_equipment_entities: IndexMap<AdditionalEquipmentId, AdditionalEquipmentEntity>,
    key_generator: Arc<dyn CommandKeyGenerator>,

    name_counts: BTreeMap<String, usize>,
}

impl InvariantContextBuilder {
    pub fn new(robot_type: RobotType) -> Self {
        Self {
            robot_type,
            pipette_entities: Default::default(),
            labware_entities: Default::default(),
            module_entities: Default::default(),
            additional_equipment_entities: Default::default(),
            key_generator: default_key_generator(),
            name_counts: Default::default(),
        }
    }

    fn next_name(&mut self, stem: &str) -> String {
        let count = self
            .name_counts
            .entry(stem.to_string())
            .or_default();
        *count += 1;
        format!("{}_{}", stem, count)
    }

    pub fn with_key_generator(mut self, key_generator: Arc<dyn CommandKeyGenerator>) -> Self {
        self.key_generator = key_generator;
        self
    }

    pub fn with_pipette(
        mut self,
        id: &str,
        name: &str,
        spec: PipetteSpec,
        mount: PipetteMount,
        tiprack_def_uris: Vec<String>,
    ) -> Self {
        let python_name = format!("pipette_{}", mount);
        trace!("pipette python name. id: '{}', python_name: '{}'", id, python_name);
        self.pipette_entities
            .insert(id.to_string(), PipetteEntity {
                id: id.to_string(),
                name: name.to_string(),
                spec,
                tiprack_def_uris,
                python_name,
            });
        self
    }

    pub fn with_labware(mut self, id: &str, def: LabwareDefinition) -> Self {
        let stem = def
            .metadata
            .display_category
            .as_ref()
            .to_snake_case();
        let python_name = self.next_name(&stem);
        trace!("labware python name. id: '{}', python_name: '{}'", id, python_name);
        self.labware_entities
            .insert(id.to_string(), LabwareEntity {
                id: id.to_string(),
                def,
                python_name,
            });
        self
    }

    pub fn with_module(mut self, id: &str, model: ModuleModel) -> Self {
        let module_type = model.module_type();
        let python_name = self.next_name(module_type.python_name_stem());
        self.module_entities
            .insert(id.to_string(), ModuleEntity {
                id: id.to_string(),
                module_type,
                model,
                python_name,
            });
        self
    }

    pub fn with_additional_equipment(
        mut self,
        id: &str,
        name: AdditionalEquipmentName,
        location: Option<&str>,
    ) -> Self {
        let python_name = match name {
            AdditionalEquipmentName::TrashBin => self.next_name("trash_bin"),
            AdditionalEquipmentName::WasteChute => "waste_chute".to_string(),
            AdditionalEquipmentName::Gripper => "gripper".to_string(),
            AdditionalEquipmentName::StagingArea => self.next_name("staging_area"),
        };
        self.additional_equipment_entities
            .insert(id.to_string(), AdditionalEquipmentEntity {
                id: id.to_string(),
                name,
                location: location.map(str::to_string),
                python_name,
            });
        self
    }

    pub fn build(self) -> Result<InvariantContext, InvariantContextError> {
        let context = InvariantContext {
            robot_type: self.robot_type,
            pipette_entities: self.pipette_entities,
            labware_entities: self.labware_entities,
            module_entities: self.module_entities,
            additional_equipment_entities: self.additional_equipment_entities,
            key_generator: self.key_generator,
        };
        context.validate()?;

        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use hardware::deck::RobotType;
    use hardware::module::ModuleModel;
    use hardware::pipette::PipetteMount;
    use hardware::test::{fixture_12_trough, fixture_96_plate, fixture_p300_single, fixture_tiprack_300_ul};

    use super::*;

    #[test]
    fn python_names_are_assigned_in_order() {
        // when
        let context = InvariantContextBuilder::new(RobotType::Flex)
            .with_pipette("p", "p300_single_gen2", fixture_p300_single(), PipetteMount::Left, vec![])
            .with_labware("tiprack", fixture_tiprack_300_ul())
            .with_labware("plate_a", fixture_96_plate())
            .with_labware("plate_b", fixture_96_plate())
            .with_labware("trough", fixture_12_trough())
            .with_module("temp_a", ModuleModel::TemperatureModuleV2)
            .with_module("temp_b", ModuleModel::TemperatureModuleV2)
            .with_additional_equipment("trash", AdditionalEquipmentName::TrashBin, Some("cutoutA3"))
            .with_additional_equipment("chute", AdditionalEquipmentName::WasteChute, Some("cutoutD3"))
            .build()
            .unwrap();

        // then
        fn names(map: Vec<&str>) -> Vec<&str> { map }
        assert_eq!(context.pipette_entities["p"].python_name, "pipette_left");
        assert_eq!(
            names(
                context
                    .labware_entities
                    .values()
                    .map(|entity| entity.python_name.as_str())
                    .collect()
            ),
            vec!["tip_rack_1", "well_plate_1", "well_plate_2", "reservoir_1"]
        );
        assert_eq!(context.module_entities["temp_b"].python_name, "temperature_module_2");
        assert_eq!(context.additional_equipment_entities["trash"].python_name, "trash_bin_1");
        assert_eq!(context.additional_equipment_entities["chute"].python_name, "waste_chute");
    }

    #[test]
    fn duplicate_ids_across_kinds_are_rejected() {
        // when
        let result = InvariantContextBuilder::new(RobotType::Flex)
            .with_labware("shared", fixture_96_plate())
            .with_module("shared", ModuleModel::TemperatureModuleV2)
            .build();

        // then
        assert_eq!(
            result.err(),
            Some(InvariantContextError::DuplicateId("shared".to_string()))
        );
    }

    #[test]
    fn missing_entities_are_domain_errors() {
        // given
        let context = InvariantContextBuilder::new(RobotType::Flex)
            .build()
            .unwrap();

        // then
        assert_eq!(context.module("nope").unwrap_err().kind(), "MISSING_MODULE");
        assert_eq!(context.pipette("nope").unwrap_err().kind(), "PIPETTE_DOES_NOT_EXIST");
        assert_eq!(context.labware("nope").unwrap_err().kind(), "LABWARE_DOES_NOT_EXIST");
    }
}
