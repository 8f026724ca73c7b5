
/// Distance between adjacent nozzles, in both axes.
pub const NOZZLE_PITCH_MM: f64 = 9.0;

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PipetteSpec {
    /// 1, 8 or 96
    pub channels: u8,
    pub display_category: PipetteDisplayCategory,
    pub max_volume: f64,
    pub min_volume: f64,
    /// uL/s
    pub default_aspirate_flow_rate: f64,
    /// uL/s
    pub default_dispense_flow_rate: f64,
    /// uL/s
    pub default_blow_out_flow_rate: f64,
}

impl PipetteSpec {
    pub fn is_single_channel(&self) -> bool {
        self.channels == 1
    }

    pub fn is_multi_channel(&self) -> bool {
        self.channels > 1
    }

    pub fn is_ninety_six_channel(&self) -> bool {
        self.channels == 96
    }

    /// Nozzle positions relative to the primary nozzle for the given configuration.
    ///
    /// The primary nozzle is the back-left nozzle for `All` and the back nozzle of the single column for `Column`.
    /// +x = right, +y = back.
    pub fn nozzle_offsets(&self, nozzles: Option<NozzleConfiguration>) -> Vec<(f64, f64)> {
        let column = |count: u8| {
            (0..count)
                .map(|row| (0.0, -(row as f64) * NOZZLE_PITCH_MM))
                .collect::<Vec<_>>()
        };

        match (self.channels, nozzles) {
            (96, Some(NozzleConfiguration::Column)) => column(8),
            (96, _) => (0..12)
                .flat_map(|column_index| {
                    (0..8).map(move |row| {
                        (
                            column_index as f64 * NOZZLE_PITCH_MM,
                            -(row as f64) * NOZZLE_PITCH_MM,
                        )
                    })
                })
                .collect(),
            (8, _) => column(8),
            _ => vec![(0.0, 0.0)],
        }
    }

    /// The number of tips the pipette holds with the given configuration.
    pub fn active_channels(&self, nozzles: Option<NozzleConfiguration>) -> usize {
        self.nozzle_offsets(nozzles).len()
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum PipetteDisplayCategory {
    Gen1,
    Gen2,
    Flex,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[derive(strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PipetteMount {
    Left,
    Right,
}

/// 96-channel nozzle layouts.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum NozzleConfiguration {
    All,
    Column,
}

impl NozzleConfiguration {
    /// The primary nozzle used by the robot when configuring the layout.
    pub fn primary_nozzle(&self) -> Option<&'static str> {
        match self {
            NozzleConfiguration::All => None,
            NozzleConfiguration::Column => Some("A12"),
        }
    }

    /// The constant name in the python protocol api.
    pub fn python_style(&self) -> &'static str {
        match self {
            NozzleConfiguration::All => "ALL",
            NozzleConfiguration::Column => "COLUMN",
        }
    }
}
