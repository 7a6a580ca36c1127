pub mod advisor;
pub mod calculations;
pub mod consumption;
pub mod data_sync;
pub mod forecast;
pub mod mix;
pub mod rules;
pub mod validation;

pub use advisor::{assess_conditions, assess_conditions_with, AdvisoryFlag, SprayThresholds};
pub use consumption::aggregate_by_culture_and_supply;
pub use data_sync::ConditionsService;
pub use forecast::{forecast, forecast_all, forecast_with_policy, ForecastPolicy, MonthsOfData};
pub use mix::{compute_mix, compute_mix_with_rates, MixResult, SprayRates};
pub use rules::AlertEngine;
pub use validation::{coverage_warning, validate, ApplicationDraft, ValidatedApplication};
