use crate::error::{Result, SafraError};
use crate::models::EquipmentType;
use serde::{Deserialize, Serialize};

/// Carrier volume applied per hectare for each equipment type (L/ha).
///
/// These are operating policy, not physics: a ground rig typically sprays
/// 300 L/ha of calda, a drone 20 L/ha.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SprayRates {
    #[serde(default = "default_ground_rig_rate")]
    pub ground_rig_l_per_ha: f64,
    #[serde(default = "default_drone_rate")]
    pub drone_l_per_ha: f64,
}

fn default_ground_rig_rate() -> f64 {
    300.0
}

fn default_drone_rate() -> f64 {
    20.0
}

impl SprayRates {
    pub fn rate_for(&self, equipment: EquipmentType) -> f64 {
        match equipment {
            EquipmentType::GroundRig => self.ground_rig_l_per_ha,
            EquipmentType::Drone => self.drone_l_per_ha,
        }
    }
}

impl Default for SprayRates {
    fn default() -> Self {
        Self {
            ground_rig_l_per_ha: default_ground_rig_rate(),
            drone_l_per_ha: default_drone_rate(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MixResult {
    pub equipment_type: EquipmentType,
    pub area_ha: f64,
    pub dosage_per_ha: f64,
    pub tank_capacity_l: f64,
    pub spray_volume_per_ha: f64,
    pub total_mix_volume_l: f64,
    pub product_volume_l: f64,
    pub diluent_volume_l: f64,
    pub refill_count: u32,
    /// Area one full tank covers.
    pub hectares_per_tank: f64,
    /// Product to load into each full tank.
    pub product_per_tank_l: f64,
}

fn require_positive(field: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(SafraError::InvalidInput { field })
    }
}

/// Compute the calda for an application using the standard spray rates.
pub fn compute_mix(
    area_ha: f64,
    dosage_per_ha: f64,
    tank_capacity_l: f64,
    equipment: EquipmentType,
) -> Result<MixResult> {
    compute_mix_with_rates(
        &SprayRates::default(),
        area_ha,
        dosage_per_ha,
        tank_capacity_l,
        equipment,
    )
}

pub fn compute_mix_with_rates(
    rates: &SprayRates,
    area_ha: f64,
    dosage_per_ha: f64,
    tank_capacity_l: f64,
    equipment: EquipmentType,
) -> Result<MixResult> {
    let area_ha = require_positive("area_ha", area_ha)?;
    let dosage_per_ha = require_positive("dosage_per_ha", dosage_per_ha)?;
    let tank_capacity_l = require_positive("tank_capacity_l", tank_capacity_l)?;
    let spray_volume_per_ha = require_positive("spray_volume_per_ha", rates.rate_for(equipment))?;

    let total_mix_volume_l = area_ha * spray_volume_per_ha;
    let product_volume_l = area_ha * dosage_per_ha;
    let diluent_volume_l = total_mix_volume_l - product_volume_l;

    if diluent_volume_l < 0.0 {
        return Err(SafraError::InvalidDosage {
            product: product_volume_l,
            mix: total_mix_volume_l,
        });
    }

    let refills = (total_mix_volume_l / tank_capacity_l).ceil();
    if refills > u32::MAX as f64 {
        return Err(SafraError::InvalidInput {
            field: "tank_capacity_l",
        });
    }
    let refill_count = refills as u32;
    let hectares_per_tank = tank_capacity_l / spray_volume_per_ha;

    Ok(MixResult {
        equipment_type: equipment,
        area_ha,
        dosage_per_ha,
        tank_capacity_l,
        spray_volume_per_ha,
        total_mix_volume_l,
        product_volume_l,
        diluent_volume_l,
        refill_count,
        hectares_per_tank,
        product_per_tank_l: hectares_per_tank * dosage_per_ha,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ground_rig_scenario() {
        let mix = compute_mix(50.0, 2.0, 2000.0, EquipmentType::GroundRig).unwrap();

        assert_eq!(mix.spray_volume_per_ha, 300.0);
        assert_eq!(mix.total_mix_volume_l, 15000.0);
        assert_eq!(mix.product_volume_l, 100.0);
        assert_eq!(mix.diluent_volume_l, 14900.0);
        assert_eq!(mix.refill_count, 8);
        assert!((mix.hectares_per_tank - 6.6667).abs() < 0.001);
        assert!((mix.product_per_tank_l - 13.3333).abs() < 0.001);
    }

    #[test]
    fn drone_scenario() {
        let mix = compute_mix(10.0, 1.0, 10.0, EquipmentType::Drone).unwrap();

        assert_eq!(mix.spray_volume_per_ha, 20.0);
        assert_eq!(mix.total_mix_volume_l, 200.0);
        assert_eq!(mix.product_volume_l, 10.0);
        assert_eq!(mix.diluent_volume_l, 190.0);
        assert_eq!(mix.refill_count, 20);
        assert_eq!(mix.hectares_per_tank, 0.5);
        assert_eq!(mix.product_per_tank_l, 0.5);
    }

    #[test]
    fn partial_tank_rounds_up() {
        let mix = compute_mix(1.0, 1.0, 299.0, EquipmentType::GroundRig).unwrap();
        assert_eq!(mix.refill_count, 2);

        let exact = compute_mix(1.0, 1.0, 300.0, EquipmentType::GroundRig).unwrap();
        assert_eq!(exact.refill_count, 1);
    }

    #[test]
    fn refill_count_beyond_range_is_rejected() {
        let err = compute_mix(1e9, 1.0, 1.0, EquipmentType::GroundRig).unwrap_err();
        assert!(matches!(
            err,
            SafraError::InvalidInput {
                field: "tank_capacity_l"
            }
        ));

        let mix = compute_mix(1e7, 1.0, 1.0, EquipmentType::GroundRig).unwrap();
        assert_eq!(mix.refill_count, 3_000_000_000);
    }

    #[test]
    fn dosage_above_carrier_volume_fails() {
        let err = compute_mix(10.0, 25.0, 10.0, EquipmentType::Drone).unwrap_err();
        match err {
            SafraError::InvalidDosage { product, mix } => {
                assert_eq!(product, 250.0);
                assert_eq!(mix, 200.0);
            }
            other => panic!("expected InvalidDosage, got {:?}", other),
        }
    }

    #[test]
    fn dosage_equal_to_carrier_volume_leaves_no_diluent() {
        let mix = compute_mix(10.0, 20.0, 10.0, EquipmentType::Drone).unwrap();
        assert_eq!(mix.diluent_volume_l, 0.0);
    }

    #[test]
    fn invalid_inputs_name_field() {
        let cases = [
            (0.0, 1.0, 100.0, "area_ha"),
            (-5.0, 1.0, 100.0, "area_ha"),
            (f64::NAN, 1.0, 100.0, "area_ha"),
            (10.0, 0.0, 100.0, "dosage_per_ha"),
            (10.0, f64::INFINITY, 100.0, "dosage_per_ha"),
            (10.0, 1.0, -1.0, "tank_capacity_l"),
            (10.0, 1.0, f64::NAN, "tank_capacity_l"),
        ];

        for (area, dosage, tank, expected) in cases {
            match compute_mix(area, dosage, tank, EquipmentType::GroundRig) {
                Err(SafraError::InvalidInput { field }) => assert_eq!(field, expected),
                other => panic!("expected InvalidInput({}), got {:?}", expected, other),
            }
        }
    }

    #[test]
    fn custom_rates() {
        let rates = SprayRates {
            ground_rig_l_per_ha: 150.0,
            drone_l_per_ha: 15.0,
        };
        let mix = compute_mix_with_rates(&rates, 4.0, 1.0, 20.0, EquipmentType::Drone).unwrap();
        assert_eq!(mix.total_mix_volume_l, 60.0);
        assert_eq!(mix.refill_count, 3);
    }

    #[test]
    fn misconfigured_rate_is_rejected() {
        let rates = SprayRates {
            ground_rig_l_per_ha: 0.0,
            drone_l_per_ha: 20.0,
        };
        assert!(matches!(
            compute_mix_with_rates(&rates, 1.0, 1.0, 100.0, EquipmentType::GroundRig),
            Err(SafraError::InvalidInput {
                field: "spray_volume_per_ha"
            })
        ));
    }

    #[test]
    fn repeated_calls_are_identical() {
        let a = compute_mix(37.3, 1.7, 1800.0, EquipmentType::GroundRig).unwrap();
        let b = compute_mix(37.3, 1.7, 1800.0, EquipmentType::GroundRig).unwrap();
        assert_eq!(a, b);
    }
}
