use super::mix::MixResult;
use crate::error::ValidationError;
use crate::models::{EquipmentType, PlantingArea, WeatherSnapshot};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Application form state as filled in by the operator, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationDraft {
    pub equipment_type: EquipmentType,
    pub supply_id: Option<i64>,
    pub planting_area_id: Option<i64>,
    pub application_date: NaiveDate,
    pub area_applied_ha: f64,
    pub dosage_per_ha: f64,
    pub mix: Option<MixResult>,
    pub weather: Option<WeatherSnapshot>,
    pub cost: Option<f64>,
}

impl ApplicationDraft {
    pub fn new(equipment_type: EquipmentType, date: NaiveDate) -> Self {
        Self {
            equipment_type,
            supply_id: None,
            planting_area_id: None,
            application_date: date,
            area_applied_ha: 0.0,
            dosage_per_ha: 0.0,
            mix: None,
            weather: None,
            cost: None,
        }
    }

    pub fn with_supply(mut self, supply_id: i64) -> Self {
        self.supply_id = Some(supply_id);
        self
    }

    pub fn with_area(mut self, planting_area_id: i64) -> Self {
        self.planting_area_id = Some(planting_area_id);
        self
    }

    pub fn with_dosage(mut self, area_applied_ha: f64, dosage_per_ha: f64) -> Self {
        self.area_applied_ha = area_applied_ha;
        self.dosage_per_ha = dosage_per_ha;
        self
    }

    pub fn with_mix(mut self, mix: MixResult) -> Self {
        self.mix = Some(mix);
        self
    }

    pub fn with_weather(mut self, snapshot: WeatherSnapshot) -> Self {
        self.weather = Some(snapshot);
        self
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = Some(cost);
        self
    }
}

/// A draft that passed every required-field rule. Referential existence of
/// the supply and area is still checked by the record store on insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatedApplication {
    pub equipment_type: EquipmentType,
    pub supply_id: i64,
    pub planting_area_id: i64,
    pub application_date: NaiveDate,
    pub area_applied_ha: f64,
    pub dosage_per_ha: f64,
    pub product_volume_l: f64,
    pub mix_volume_l: f64,
    pub weather: Option<WeatherSnapshot>,
    pub cost: Option<f64>,
}

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// The attached calda must describe the application being recorded. Only
/// compared when the draft's own figures are usable; otherwise those fields
/// already carry their own errors.
fn mix_matches_draft(mix: &MixResult, draft: &ApplicationDraft) -> bool {
    if !positive(draft.area_applied_ha) || !positive(draft.dosage_per_ha) {
        return true;
    }
    mix.equipment_type == draft.equipment_type
        && approx_eq(mix.area_ha, draft.area_applied_ha)
        && approx_eq(mix.dosage_per_ha, draft.dosage_per_ha)
}

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

/// Check every required-field rule and report all violations at once.
pub fn validate(draft: &ApplicationDraft) -> Result<ValidatedApplication, Vec<ValidationError>> {
    let mut errors = Vec::new();

    if draft.supply_id.is_none() {
        errors.push(ValidationError::new("supply_id", "a supply must be selected"));
    }
    if draft.planting_area_id.is_none() {
        errors.push(ValidationError::new(
            "planting_area_id",
            "a planting area must be selected",
        ));
    }
    if !positive(draft.area_applied_ha) {
        errors.push(ValidationError::new(
            "area_applied_ha",
            "applied area must be greater than zero",
        ));
    }
    if !positive(draft.dosage_per_ha) {
        errors.push(ValidationError::new(
            "dosage_per_ha",
            "dosage must be greater than zero",
        ));
    }
    match &draft.mix {
        None => errors.push(ValidationError::new(
            "mix",
            "the calda must be calculated before saving",
        )),
        Some(mix) if !positive(mix.total_mix_volume_l) => errors.push(ValidationError::new(
            "mix",
            "total mix volume must be greater than zero",
        )),
        Some(mix) if !mix_matches_draft(mix, draft) => errors.push(ValidationError::new(
            "mix",
            "calda was calculated for a different area, dosage or equipment",
        )),
        Some(_) => {}
    }
    if let Some(cost) = draft.cost {
        if !cost.is_finite() || cost < 0.0 {
            errors.push(ValidationError::new("cost", "cost cannot be negative"));
        }
    }

    match (draft.supply_id, draft.planting_area_id, &draft.mix) {
        (Some(supply_id), Some(planting_area_id), Some(mix)) if errors.is_empty() => {
            Ok(ValidatedApplication {
                equipment_type: draft.equipment_type,
                supply_id,
                planting_area_id,
                application_date: draft.application_date,
                area_applied_ha: draft.area_applied_ha,
                dosage_per_ha: draft.dosage_per_ha,
                product_volume_l: mix.product_volume_l,
                mix_volume_l: mix.total_mix_volume_l,
                weather: draft.weather.filter(|w| !w.is_empty()),
                cost: draft.cost,
            })
        }
        _ => Err(errors),
    }
}

/// Applied area larger than the plot it was recorded against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CoverageWarning {
    pub area_applied_ha: f64,
    pub area_size_ha: f64,
}

impl std::fmt::Display for CoverageWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "applied area {:.2} ha exceeds plot size {:.2} ha",
            self.area_applied_ha, self.area_size_ha
        )
    }
}

pub fn coverage_warning(
    application: &ValidatedApplication,
    area: &PlantingArea,
) -> Option<CoverageWarning> {
    (application.area_applied_ha > area.area_hectares).then_some(CoverageWarning {
        area_applied_ha: application.area_applied_ha,
        area_size_ha: area.area_hectares,
    })
}
