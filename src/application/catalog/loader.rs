//! Charging-station register import
//!
//! Reads the federal register CSV (semicolon or comma separated, German
//! headers) and turns the rows of one region into `ChargingStation`s.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use crate::domain::{ChargingStation, ChargingStationRepository, DomainResult, StationId};
use crate::shared::errors::InfraError;

const SNIFF_BYTES: usize = 2048;
const NAME_MAX_LEN: usize = 100;

const COL_CITY: &str = "Ort";
const COL_STATE: &str = "Bundesland";
const COL_POSTAL_CODE: &str = "Postleitzahl";
const COL_STREET: &[&str] = &["Straße", "Strasse"];
const COL_HOUSE_NUMBER: &str = "Hausnummer";
const COL_OPERATOR: &str = "Betreiber";
const COL_LATITUDE: &str = "Breitengrad";
const COL_LONGITUDE: &str = "Längengrad";

pub struct RegisterLoader {
    region: String,
}

impl RegisterLoader {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn load_file(&self, path: &Path) -> Result<Vec<ChargingStation>, InfraError> {
        if !path.exists() {
            return Err(InfraError::Catalog(format!(
                "CSV not found at: {}",
                path.display()
            )));
        }

        let bytes = std::fs::read(path)?;
        let content = String::from_utf8_lossy(&bytes);
        let stations = self.parse_str(&content);

        info!(
            path = %path.display(),
            region = %self.region,
            stations = stations.len(),
            "Station register loaded"
        );
        Ok(stations)
    }

    /// Parse register text. Rows that cannot be turned into a station are
    /// skipped rather than failing the whole import.
    pub fn parse_str(&self, content: &str) -> Vec<ChargingStation> {
        let content = content.trim_start_matches('\u{feff}');
        let delimiter = detect_delimiter(content);

        let mut records = records(content, delimiter).into_iter();
        // The published file carries a few lines of preamble before the header.
        let Some(header) = records
            .by_ref()
            .find(|r| r.iter().any(|f| f.trim() == COL_POSTAL_CODE))
        else {
            debug!("No header row found in register");
            return Vec::new();
        };
        let columns: HashMap<String, usize> = header
            .into_iter()
            .enumerate()
            .map(|(i, name)| (name.trim().to_string(), i))
            .collect();
        debug!(columns = columns.len(), "Register header parsed");

        let prefix = id_prefix(&self.region);
        let mut seen = HashSet::new();
        let mut counter = 1u32;
        let mut stations = Vec::new();

        for fields in records.filter(|r| r.iter().any(|f| !f.trim().is_empty())) {
            let row = Row {
                columns: &columns,
                fields: &fields,
            };

            if !row.get(COL_CITY).contains(&self.region)
                && !row.get(COL_STATE).contains(&self.region)
            {
                continue;
            }

            let postal_code = row.get(COL_POSTAL_CODE);
            if postal_code.is_empty() {
                continue;
            }

            let street = COL_STREET
                .iter()
                .map(|c| row.get(c))
                .find(|s| !s.is_empty())
                .unwrap_or("");
            let house_number = row.get(COL_HOUSE_NUMBER);

            if !seen.insert(format!("{}-{}-{}", postal_code, street, house_number)) {
                continue;
            }

            let Ok(station_id) =
                StationId::new(format!("{}-{}-{:04}", prefix, postal_code, counter))
            else {
                continue;
            };
            counter += 1;

            let name = station_name(row.get(COL_OPERATOR), postal_code);
            let mut station = ChargingStation::new(station_id, name, postal_code);
            if !street.is_empty() {
                let address = format!("{} {}", street, house_number);
                station = station.with_address(address.trim());
            }
            station.latitude = parse_decimal_comma(row.get(COL_LATITUDE));
            station.longitude = parse_decimal_comma(row.get(COL_LONGITUDE));

            stations.push(station);
        }

        stations
    }
}

struct Row<'a> {
    columns: &'a HashMap<String, usize>,
    fields: &'a [String],
}

impl Row<'_> {
    fn get(&self, column: &str) -> &str {
        self.columns
            .get(column)
            .and_then(|&i| self.fields.get(i))
            .map(|s| s.trim())
            .unwrap_or("")
    }
}

fn detect_delimiter(content: &str) -> char {
    let sample: String = content.chars().take(SNIFF_BYTES).collect();
    let semicolons = sample.matches(';').count();
    let commas = sample.matches(',').count();
    if semicolons > commas {
        ';'
    } else {
        ','
    }
}

/// Split CSV text into records. Double quotes group a field, `""` inside
/// them is a literal quote, and a quoted field may run over line breaks.
fn records(content: &str, delimiter: char) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            c if c == delimiter && !in_quotes => fields.push(std::mem::take(&mut current)),
            '\r' if !in_quotes && chars.peek() == Some(&'\n') => {}
            '\n' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
                records.push(std::mem::take(&mut fields));
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() || !fields.is_empty() {
        fields.push(current);
        records.push(fields);
    }
    records
}

fn id_prefix(region: &str) -> String {
    region
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .to_uppercase()
}

fn station_name(operator: &str, postal_code: &str) -> String {
    // Quoted operator names may contain line breaks.
    let operator = operator.split_whitespace().collect::<Vec<_>>().join(" ");
    let name = if operator.is_empty() {
        format!("Station {}", postal_code)
    } else {
        operator
    };

    if name.chars().count() > NAME_MAX_LEN {
        let mut truncated: String = name.chars().take(NAME_MAX_LEN - 3).collect();
        truncated.push_str("...");
        truncated
    } else {
        name
    }
}

fn parse_decimal_comma(value: &str) -> Option<f64> {
    if value.is_empty() {
        return None;
    }
    value.replace(',', ".").parse().ok()
}

// ── Summary ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogSummary {
    pub total_stations: usize,
    pub unique_postal_codes: usize,
    pub stations_per_postal_code: BTreeMap<String, usize>,
    pub stations_with_coordinates: usize,
    pub coverage_percentage: f64,
}

impl CatalogSummary {
    pub fn from_stations(stations: &[ChargingStation]) -> Self {
        let mut per_code = BTreeMap::new();
        for station in stations {
            *per_code.entry(station.postal_code().to_string()).or_insert(0) += 1;
        }

        let with_coordinates = stations.iter().filter(|s| s.coordinates().is_some()).count();
        let coverage_percentage = if stations.is_empty() {
            0.0
        } else {
            (with_coordinates as f64 / stations.len() as f64 * 1000.0).round() / 10.0
        };

        Self {
            total_stations: stations.len(),
            unique_postal_codes: per_code.len(),
            stations_per_postal_code: per_code,
            stations_with_coordinates: with_coordinates,
            coverage_percentage,
        }
    }
}

/// Upsert every station into the repository, returning how many were written.
pub async fn seed_stations(
    repo: &dyn ChargingStationRepository,
    stations: Vec<ChargingStation>,
) -> DomainResult<usize> {
    let mut written = 0;
    for station in stations {
        repo.save(station).await?;
        written += 1;
    }
    info!(stations = written, "Station catalog seeded");
    Ok(written)
}
