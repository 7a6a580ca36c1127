use crate::models::{ConsumptionReport, CultureConsumption, PlantingArea, Supply, UsageRecord};
use std::collections::HashMap;
use tracing::warn;

/// Fold usage records into per-(crop, supply) totals.
///
/// Cost is priced at each supply's current unit price, not the price paid at
/// the time of use. Records whose supply or planting area is missing from the
/// catalogs, or whose quantity is negative or not finite, are skipped and
/// counted in `skipped_records`.
pub fn aggregate_by_culture_and_supply(
    records: &[UsageRecord],
    supplies: &[Supply],
    areas: &[PlantingArea],
) -> ConsumptionReport {
    let supply_by_id: HashMap<i64, &Supply> = supplies
        .iter()
        .filter_map(|s| s.id.map(|id| (id, s)))
        .collect();
    let area_by_id: HashMap<i64, &PlantingArea> = areas
        .iter()
        .filter_map(|a| a.id.map(|id| (id, a)))
        .collect();

    let mut report = ConsumptionReport::default();
    let mut index: HashMap<(String, String), usize> = HashMap::new();

    for record in records {
        let (Some(supply), Some(area)) = (
            supply_by_id.get(&record.supply_id),
            area_by_id.get(&record.planting_area_id),
        ) else {
            warn!(
                record_id = ?record.id,
                supply_id = record.supply_id,
                planting_area_id = record.planting_area_id,
                "Usage record references an unknown supply or planting area, skipping"
            );
            report.skipped_records += 1;
            continue;
        };

        if !record.quantity_used.is_finite() || record.quantity_used < 0.0 {
            warn!(
                record_id = ?record.id,
                quantity = record.quantity_used,
                "Usage record has an invalid quantity, skipping"
            );
            report.skipped_records += 1;
            continue;
        }

        let key = (area.crop.clone(), supply.name.clone());
        let slot = *index.entry(key).or_insert_with(|| {
            report.entries.push(CultureConsumption {
                crop: area.crop.clone(),
                supply_name: supply.name.clone(),
                unit: supply.unit.symbol().to_string(),
                total_quantity: 0.0,
                application_count: 0,
                total_cost: 0.0,
            });
            report.entries.len() - 1
        });

        let entry = &mut report.entries[slot];
        entry.total_quantity += record.quantity_used;
        entry.application_count += 1;
        entry.total_cost += record.quantity_used * supply.unit_price;
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SupplyCategory, UnitOfMeasure};
    use chrono::NaiveDate;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, day).unwrap()
    }

    fn catalog() -> (Vec<Supply>, Vec<PlantingArea>) {
        let supplies = vec![
            Supply::new("Glifosato", SupplyCategory::Herbicide, UnitOfMeasure::Liter)
                .with_id(1)
                .with_price(30.0),
            Supply::new("Ureia", SupplyCategory::Fertilizer, UnitOfMeasure::Kilogram)
                .with_id(2)
                .with_price(4.0),
        ];
        let areas = vec![
            PlantingArea::new("Talhão 1", "Soja", 40.0).with_id(10),
            PlantingArea::new("Talhão 2", "Soja", 25.0).with_id(11),
            PlantingArea::new("Talhão 3", "Milho", 30.0).with_id(12),
        ];
        (supplies, areas)
    }

    #[test]
    fn groups_by_crop_and_supply() {
        let (supplies, areas) = catalog();
        let records = vec![
            UsageRecord::new(1, 10, 20.0, date(1)),
            UsageRecord::new(1, 11, 10.0, date(2)),
            UsageRecord::new(2, 12, 100.0, date(3)),
            UsageRecord::new(1, 12, 5.0, date(4)),
        ];

        let report = aggregate_by_culture_and_supply(&records, &supplies, &areas);

        assert_eq!(report.skipped_records, 0);
        assert_eq!(report.entries.len(), 3);

        let soja = &report.entries[0];
        assert_eq!(soja.crop, "Soja");
        assert_eq!(soja.supply_name, "Glifosato");
        assert_eq!(soja.unit, "L");
        assert_eq!(soja.total_quantity, 30.0);
        assert_eq!(soja.application_count, 2);
        assert_eq!(soja.total_cost, 900.0);

        let milho_ureia = &report.entries[1];
        assert_eq!(milho_ureia.crop, "Milho");
        assert_eq!(milho_ureia.supply_name, "Ureia");
        assert_eq!(milho_ureia.total_cost, 400.0);

        let milho_glifosato = &report.entries[2];
        assert_eq!(milho_glifosato.total_quantity, 5.0);
        assert_eq!(milho_glifosato.application_count, 1);

        assert_eq!(report.total_cost(), 1450.0);
        assert_eq!(report.for_crop("Milho").count(), 2);
    }

    #[test]
    fn dangling_references_are_skipped_and_counted() {
        let (supplies, areas) = catalog();
        let records = vec![
            UsageRecord::new(1, 10, 20.0, date(1)),
            UsageRecord::new(99, 10, 5.0, date(2)),
            UsageRecord::new(1, 99, 5.0, date(3)),
        ];

        let report = aggregate_by_culture_and_supply(&records, &supplies, &areas);

        assert_eq!(report.skipped_records, 2);
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].total_quantity, 20.0);
    }

    #[test]
    fn invalid_quantities_are_skipped_and_counted() {
        let (supplies, areas) = catalog();
        let records = vec![
            UsageRecord::new(1, 10, 20.0, date(1)),
            UsageRecord::new(1, 10, f64::NAN, date(2)),
            UsageRecord::new(1, 10, f64::INFINITY, date(3)),
            UsageRecord::new(1, 10, -4.0, date(4)),
        ];

        let report = aggregate_by_culture_and_supply(&records, &supplies, &areas);

        assert_eq!(report.skipped_records, 3);
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].total_quantity, 20.0);
        assert_eq!(report.entries[0].application_count, 1);
        assert_eq!(report.entries[0].total_cost, 600.0);
    }

    #[test]
    fn empty_input_gives_empty_report() {
        let report = aggregate_by_culture_and_supply(&[], &[], &[]);
        assert!(report.entries.is_empty());
        assert_eq!(report.skipped_records, 0);
        assert_eq!(report.total_cost(), 0.0);
    }

    #[test]
    fn cost_uses_current_price() {
        let (mut supplies, areas) = catalog();
        let records = vec![UsageRecord::new(1, 10, 2.0, date(1))];

        supplies[0].unit_price = 45.0;
        let report = aggregate_by_culture_and_supply(&records, &supplies, &areas);
        assert_eq!(report.entries[0].total_cost, 90.0);
    }
}
