use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SupplyCategory {
    Herbicide,
    Fungicide,
    Insecticide,
    Fertilizer,
    Adjuvant,
    Seed,
    Fuel,
    Other,
}

impl SupplyCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            SupplyCategory::Herbicide => "Herbicide",
            SupplyCategory::Fungicide => "Fungicide",
            SupplyCategory::Insecticide => "Insecticide",
            SupplyCategory::Fertilizer => "Fertilizer",
            SupplyCategory::Adjuvant => "Adjuvant",
            SupplyCategory::Seed => "Seed",
            SupplyCategory::Fuel => "Fuel",
            SupplyCategory::Other => "Other",
        }
    }

    /// Accepts the English names and the Portuguese labels used on the farm
    /// inventory sheets.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace(['-', ' ', '_'], "").as_str() {
            "herbicide" | "herbicida" => Some(SupplyCategory::Herbicide),
            "fungicide" | "fungicida" => Some(SupplyCategory::Fungicide),
            "insecticide" | "inseticida" => Some(SupplyCategory::Insecticide),
            "fertilizer" | "fertilizante" | "adubo" => Some(SupplyCategory::Fertilizer),
            "adjuvant" | "adjuvante" => Some(SupplyCategory::Adjuvant),
            "seed" | "semente" => Some(SupplyCategory::Seed),
            "fuel" | "combustivel" | "combustível" => Some(SupplyCategory::Fuel),
            "other" | "outro" | "outros" => Some(SupplyCategory::Other),
            _ => None,
        }
    }

    pub fn all() -> &'static [SupplyCategory] {
        &[
            SupplyCategory::Herbicide,
            SupplyCategory::Fungicide,
            SupplyCategory::Insecticide,
            SupplyCategory::Fertilizer,
            SupplyCategory::Adjuvant,
            SupplyCategory::Seed,
            SupplyCategory::Fuel,
            SupplyCategory::Other,
        ]
    }
}

impl std::fmt::Display for SupplyCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitOfMeasure {
    Liter,
    Kilogram,
    Unit,
}

impl UnitOfMeasure {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitOfMeasure::Liter => "Liter",
            UnitOfMeasure::Kilogram => "Kilogram",
            UnitOfMeasure::Unit => "Unit",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            UnitOfMeasure::Liter => "L",
            UnitOfMeasure::Kilogram => "kg",
            UnitOfMeasure::Unit => "un",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "liter" | "litre" | "litro" | "l" => Some(UnitOfMeasure::Liter),
            "kilogram" | "quilograma" | "kg" => Some(UnitOfMeasure::Kilogram),
            "unit" | "unidade" | "un" => Some(UnitOfMeasure::Unit),
            _ => None,
        }
    }
}

impl std::fmt::Display for UnitOfMeasure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supply {
    pub id: Option<i64>,
    pub name: String,
    pub category: SupplyCategory,
    pub unit: UnitOfMeasure,
    pub unit_price: f64,
    pub stock_quantity: f64,
    pub minimum_stock: f64,
}

impl Supply {
    pub fn new(name: &str, category: SupplyCategory, unit: UnitOfMeasure) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            category,
            unit,
            unit_price: 0.0,
            stock_quantity: 0.0,
            minimum_stock: 0.0,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_price(mut self, unit_price: f64) -> Self {
        self.unit_price = unit_price;
        self
    }

    pub fn with_stock(mut self, quantity: f64) -> Self {
        self.stock_quantity = quantity;
        self
    }

    pub fn with_minimum(mut self, minimum: f64) -> Self {
        self.minimum_stock = minimum;
        self
    }

    pub fn is_below_minimum(&self) -> bool {
        self.stock_quantity <= self.minimum_stock
            && (self.minimum_stock > 0.0 || self.stock_quantity <= 0.0)
    }

    /// Value of the stock on hand at the current unit price.
    pub fn stock_value(&self) -> f64 {
        self.stock_quantity * self.unit_price
    }
}
