use serde::{Deserialize, Serialize};

/// Polygon vertex in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// A talhão: one plot inside a property, planted with a single crop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlantingArea {
    pub id: Option<i64>,
    pub name: String,
    pub crop: String,
    pub area_hectares: f64,
    pub polygon: Vec<GeoPoint>,
    pub color: Option<String>,
    pub property_id: Option<i64>,
}

impl PlantingArea {
    pub fn new(name: &str, crop: &str, area_hectares: f64) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            crop: crop.to_string(),
            area_hectares,
            polygon: Vec::new(),
            color: None,
            property_id: None,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_polygon(mut self, polygon: Vec<GeoPoint>) -> Self {
        self.polygon = polygon;
        self
    }

    pub fn with_color(mut self, color: &str) -> Self {
        self.color = Some(color.to_string());
        self
    }

    pub fn with_property(mut self, property_id: i64) -> Self {
        self.property_id = Some(property_id);
        self
    }

    pub fn has_geometry(&self) -> bool {
        self.polygon.len() >= 3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_pattern() {
        let area = PlantingArea::new("Talhão 3", "Soja", 42.5)
            .with_id(3)
            .with_color("#4caf50")
            .with_property(1);

        assert_eq!(area.id, Some(3));
        assert_eq!(area.crop, "Soja");
        assert_eq!(area.area_hectares, 42.5);
        assert_eq!(area.color.as_deref(), Some("#4caf50"));
        assert_eq!(area.property_id, Some(1));
        assert!(!area.has_geometry());
    }

    #[test]
    fn geometry_needs_three_vertices() {
        let area = PlantingArea::new("Talhão 1", "Milho", 10.0).with_polygon(vec![
            GeoPoint { lat: -21.1, lng: -47.8 },
            GeoPoint { lat: -21.1, lng: -47.7 },
            GeoPoint { lat: -21.2, lng: -47.7 },
        ]);
        assert!(area.has_geometry());
    }
}
