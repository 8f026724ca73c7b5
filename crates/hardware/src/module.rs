#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(strum_macros::Display)]
pub enum ModuleType {
    #[serde(rename = "magneticModuleType")]
    #[strum(serialize = "magneticModuleType")]
    MagneticModule,
    #[serde(rename = "temperatureModuleType")]
    #[strum(serialize = "temperatureModuleType")]
    TemperatureModule,
    #[serde(rename = "thermocyclerModuleType")]
    #[strum(serialize = "thermocyclerModuleType")]
    Thermocycler,
    #[serde(rename = "heaterShakerModuleType")]
    #[strum(serialize = "heaterShakerModuleType")]
    HeaterShaker,
    #[serde(rename = "magneticBlockType")]
    #[strum(serialize = "magneticBlockType")]
    MagneticBlock,
    #[serde(rename = "absorbanceReaderType")]
    #[strum(serialize = "absorbanceReaderType")]
    AbsorbanceReader,
}

impl ModuleType {
    /// Prefix for generated python variable names, e.g. `temperature_module` for `temperature_module_1`.
    pub fn python_name_stem(&self) -> &'static str {
        match self {
            ModuleType::MagneticModule => "magnetic_module",
            ModuleType::TemperatureModule => "temperature_module",
            ModuleType::Thermocycler => "thermocycler",
            ModuleType::HeaterShaker => "heater_shaker",
            ModuleType::MagneticBlock => "magnetic_block",
            ModuleType::AbsorbanceReader => "absorbance_reader",
        }
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ModuleModel {
    MagneticModuleV1,
    MagneticModuleV2,
    TemperatureModuleV1,
    TemperatureModuleV2,
    ThermocyclerModuleV1,
    ThermocyclerModuleV2,
    HeaterShakerModuleV1,
    MagneticBlockV1,
    AbsorbanceReaderV1,
}

impl ModuleModel {
    pub fn module_type(&self) -> ModuleType {
        match self {
            ModuleModel::MagneticModuleV1 | ModuleModel::MagneticModuleV2 => ModuleType::MagneticModule,
            ModuleModel::TemperatureModuleV1 | ModuleModel::TemperatureModuleV2 => ModuleType::TemperatureModule,
            ModuleModel::ThermocyclerModuleV1 | ModuleModel::ThermocyclerModuleV2 => ModuleType::Thermocycler,
            ModuleModel::HeaterShakerModuleV1 => ModuleType::HeaterShaker,
            ModuleModel::MagneticBlockV1 => ModuleType::MagneticBlock,
            ModuleModel::AbsorbanceReaderV1 => ModuleType::AbsorbanceReader,
        }
    }

    /// GEN1 magnetic and temperature modules are tall enough for GEN1 multi-channel pipettes to hit them.
    pub fn has_gen1_collision_issues(&self) -> bool {
        matches!(self, ModuleModel::MagneticModuleV1 | ModuleModel::TemperatureModuleV1)
    }

    /// Approximate height above the deck, mm.
    pub fn overall_height(&self) -> f64 {
        match self {
            ModuleModel::MagneticModuleV1 | ModuleModel::MagneticModuleV2 => 110.152,
            ModuleModel::TemperatureModuleV1 | ModuleModel::TemperatureModuleV2 => 84.0,
            ModuleModel::ThermocyclerModuleV1 | ModuleModel::ThermocyclerModuleV2 => 108.96,
            ModuleModel::HeaterShakerModuleV1 => 82.0,
            ModuleModel::MagneticBlockV1 => 45.0,
            ModuleModel::AbsorbanceReaderV1 => 18.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{ModuleModel, ModuleType};

    #[rstest]
    #[case(ModuleModel::MagneticModuleV2, ModuleType::MagneticModule)]
    #[case(ModuleModel::TemperatureModuleV1, ModuleType::TemperatureModule)]
    #[case(ModuleModel::ThermocyclerModuleV2, ModuleType::Thermocycler)]
    #[case(ModuleModel::HeaterShakerModuleV1, ModuleType::HeaterShaker)]
    #[case(ModuleModel::AbsorbanceReaderV1, ModuleType::AbsorbanceReader)]
    fn module_type(#[case] model: ModuleModel, #[case] expected: ModuleType) {
        assert_eq!(model.module_type(), expected);
    }

    #[test]
    fn module_type_wire_format() {
        assert_eq!(
            serde_json::to_string(&ModuleType::HeaterShaker).unwrap(),
            "\"heaterShakerModuleType\""
        );
        assert_eq!(ModuleType::Thermocycler.to_string(), "thermocyclerModuleType");
    }
}
