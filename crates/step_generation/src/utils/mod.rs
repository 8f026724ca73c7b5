pub mod heater_shaker;
pub mod liquid;
pub mod pipetting_checks;
pub mod safe_pipette_movement;
pub mod thermocycler_profile;
pub mod well_geometry;
