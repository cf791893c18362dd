use serde::Serialize;

use crate::record::Record;
use crate::split::single_value;
use crate::value::FieldValue;

const LATITUDE: &[&str] = &["Latitude", "latitude", "lat"];
const LONGITUDE: &[&str] = &["Longitude", "longitude", "lng", "lon"];
const NAME: &[&str] = &["Municipality (n=104)", "Municipality"];
const PROVINCE: &[&str] = &["Province", "province"];
const POPULATION: &[&str] = &["Population"];
const PLAN_YEAR: &[&str] = &["Year"];

/// A municipality placed on the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityMarker {
    pub name: Option<String>,
    pub province: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub population: Option<String>,
    pub plan_year: Option<String>,
}

impl CityMarker {
    pub fn name_or_unknown(&self) -> &str {
        self.name.as_deref().unwrap_or("Unknown")
    }
}

/// Approximate bounding box of Canada used to frame the map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

pub const CANADA_BOUNDS: Bounds = Bounds {
    south: 38.0,
    west: -147.0,
    north: 74.0,
    east: -40.0,
};

impl Bounds {
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        (self.south..=self.north).contains(&latitude) && (self.west..=self.east).contains(&longitude)
    }
}

/// Markers for every record carrying a usable coordinate pair.
///
/// Column names are looked up through fixed alias lists; a coordinate of
/// exactly zero counts as missing.
pub fn city_markers(cities: &[Record]) -> Vec<CityMarker> {
    cities.iter().filter_map(city_marker).collect()
}

fn city_marker(record: &Record) -> Option<CityMarker> {
    let latitude = coordinate(first_present(record, LATITUDE))?;
    let longitude = coordinate(first_present(record, LONGITUDE))?;

    Some(CityMarker {
        name: single_value(first_present(record, NAME)),
        province: single_value(first_present(record, PROVINCE)),
        latitude,
        longitude,
        population: single_value(first_present(record, POPULATION)),
        plan_year: single_value(first_present(record, PLAN_YEAR)),
    })
}

fn first_present<'a>(record: &'a Record, aliases: &[&str]) -> &'a FieldValue {
    static ABSENT: FieldValue = FieldValue::Absent;
    aliases
        .iter()
        .map(|alias| record.get(alias))
        .find(|value| !value.is_absent())
        .unwrap_or(&ABSENT)
}

fn coordinate(value: &FieldValue) -> Option<f64> {
    let parsed = match value {
        FieldValue::Number(number) => number.as_f64(),
        FieldValue::Text(text) => text.trim().parse::<f64>().ok(),
        FieldValue::Absent | FieldValue::List(_) => None,
    }?;
    (parsed.is_finite() && parsed != 0.0).then_some(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Dataset;

    #[test]
    fn reads_coordinates_through_aliases() {
        let dataset = Dataset::from_json_str(
            r#"[
                {"Municipality (n=104)": "Guelph", "Province": "ON", "Latitude": 43.55, "Longitude": -80.25, "Population": 143740, "Year": 2022},
                {"Municipality": "Whitehorse", "province": "YT", "lat": "60.72", "lon": "-135.05"}
            ]"#,
        )
        .unwrap();

        let markers = city_markers(&dataset.records);
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].name.as_deref(), Some("Guelph"));
        assert_eq!(markers[0].population.as_deref(), Some("143740"));
        assert_eq!(markers[0].plan_year.as_deref(), Some("2022"));
        assert_eq!(markers[1].province.as_deref(), Some("YT"));
        assert!((markers[1].latitude - 60.72).abs() < 1e-9);
        assert!(CANADA_BOUNDS.contains(markers[1].latitude, markers[1].longitude));
    }

    #[test]
    fn skips_records_without_coordinates() {
        let cities = vec![
            Record::new().with("Municipality", "Nowhere"),
            Record::new()
                .with("Municipality", "Null Island")
                .with("Latitude", 0)
                .with("Longitude", 0),
        ];
        assert!(city_markers(&cities).is_empty());
    }

    #[test]
    fn unnamed_markers_read_unknown() {
        let cities = vec![Record::new().with("Latitude", "45.4").with("Longitude", "-75.7")];
        assert_eq!(city_markers(&cities)[0].name_or_unknown(), "Unknown");
    }
}
