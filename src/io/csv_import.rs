use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ImportError, StoreError};
use crate::model::{Person, ResourceType, TagType};
use crate::reducer::IdGenerator;

const FIRST_NAMES: [&str; 20] = [
    "James", "Sarah", "Michael", "Emma", "David", "Lisa", "Robert", "Jessica", "William",
    "Jennifer", "John", "Emily", "Richard", "Ashley", "Joseph", "Amanda", "Thomas", "Melissa",
    "Charles", "Nicole",
];

/// One line of a rate card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateRow {
    pub role: String,
    pub region: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub rate_low: f64,
    #[serde(default)]
    pub rate_high: f64,
    /// Monthly cost estimate.
    #[serde(default)]
    pub estimated_cost: f64,
}

/// Rates keyed by `(role, region)`. Uploading a row with an existing key
/// replaces it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    rows: Vec<RateRow>,
    #[serde(skip)]
    by_key: BTreeMap<(String, String), usize>,
}

impl RateTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[RateRow] {
        &self.rows
    }

    pub fn lookup(&self, role: &str, region: &str) -> Option<&RateRow> {
        self.by_key
            .get(&(role.to_string(), region.to_string()))
            .map(|&i| &self.rows[i])
    }

    /// Returns how many rows were new (as opposed to replacing an existing key).
    pub fn upsert(&mut self, rows: impl IntoIterator<Item = RateRow>) -> usize {
        let mut added = 0;
        for row in rows {
            let key = (row.role.clone(), row.region.clone());
            match self.by_key.get(&key) {
                Some(&i) => self.rows[i] = row,
                None => {
                    self.by_key.insert(key, self.rows.len());
                    self.rows.push(row);
                    added += 1;
                }
            }
        }
        added
    }

    fn reindex(&mut self) {
        self.by_key = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, r)| ((r.role.clone(), r.region.clone()), i))
            .collect();
    }

    pub fn load_from(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(path)?;
        let mut table: RateTable = serde_json::from_str(&json)?;
        table.reindex();
        Ok(table)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RateImport {
    pub rows: Vec<RateRow>,
    pub skipped: usize,
}

/// Detect delimiter by checking the header line for common separators.
fn detect_delimiter(line: &str) -> u8 {
    let semicolons = line.matches(';').count();
    let commas = line.matches(',').count();
    let tabs = line.matches('\t').count();
    if semicolons > commas && semicolons >= tabs {
        b';'
    } else if tabs > commas {
        b'\t'
    } else {
        b','
    }
}

fn normalize_header(h: &str) -> String {
    h.trim().to_lowercase().replace([' ', '-', '_', '|'], "")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Role,
    Region,
    Category,
    RateLow,
    RateHigh,
    EstimatedCost,
}

fn header_to_col(normalized: &str) -> Option<Column> {
    match normalized {
        "role" | "title" | "jobtitle" | "position" => Some(Column::Role),
        "region" | "location" | "country" | "market" => Some(Column::Region),
        "categoryfunction" | "category" | "function" | "discipline" => Some(Column::Category),
        "ratelow" | "lowrate" | "minrate" => Some(Column::RateLow),
        "ratehigh" | "highrate" | "maxrate" | "rate" => Some(Column::RateHigh),
        "estimatedcost" | "monthlycost" | "cost" => Some(Column::EstimatedCost),
        _ => None,
    }
}

/// Parse a number, tolerating currency symbols and thousands separators.
fn parse_amount(s: &str) -> f64 {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    cleaned.parse().unwrap_or(0.0)
}

/// Read a rate card from a file.
pub fn import_rates(path: &Path) -> Result<RateImport, ImportError> {
    let content = std::fs::read_to_string(path)?;
    let import = parse_rates(&content)?;
    info!(
        path = %path.display(),
        rows = import.rows.len(),
        skipped = import.skipped,
        "imported rate card"
    );
    Ok(import)
}

/// Parse rate-card CSV text. Lines before the first one naming both a role
/// and a region column are treated as preamble and ignored. Rows with an
/// empty role or region are skipped.
pub fn parse_rates(content: &str) -> Result<RateImport, ImportError> {
    let header_line = content
        .lines()
        .position(|line| {
            let lower = line.to_lowercase();
            lower.contains("role") && lower.contains("region")
        })
        .ok_or_else(|| ImportError::MissingColumns(vec!["Role".into(), "Region".into()]))?;
    let body: String = content
        .lines()
        .skip(header_line)
        .collect::<Vec<_>>()
        .join("\n");
    let delimiter = detect_delimiter(body.lines().next().unwrap_or_default());

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let headers = reader.headers()?.clone();
    let col_map: Vec<Option<Column>> = headers
        .iter()
        .map(|h| header_to_col(&normalize_header(h)))
        .collect();
    let missing: Vec<String> = [(Column::Role, "Role"), (Column::Region, "Region")]
        .iter()
        .filter(|(col, _)| !col_map.contains(&Some(*col)))
        .map(|(_, name)| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ImportError::MissingColumns(missing));
    }

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for (i, result) in reader.records().enumerate() {
        let line = header_line + i + 2;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(line, "skipping CSV row: {e}");
                skipped += 1;
                continue;
            }
        };
        let mut row = RateRow {
            role: String::new(),
            region: String::new(),
            category: String::new(),
            rate_low: 0.0,
            rate_high: 0.0,
            estimated_cost: 0.0,
        };
        for (field, col) in record.iter().zip(&col_map) {
            match col {
                Some(Column::Role) => row.role = field.to_string(),
                Some(Column::Region) => row.region = field.to_string(),
                Some(Column::Category) => row.category = field.to_string(),
                Some(Column::RateLow) => row.rate_low = parse_amount(field),
                Some(Column::RateHigh) => row.rate_high = parse_amount(field),
                Some(Column::EstimatedCost) => row.estimated_cost = parse_amount(field),
                None => {}
            }
        }
        if row.role.is_empty() || row.region.is_empty() {
            warn!(line, "skipping CSV row without role or region");
            skipped += 1;
            continue;
        }
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(ImportError::NoRows(skipped));
    }
    Ok(RateImport { rows, skipped })
}

/// Build up to `count` placeholder people from rate rows, spread evenly over
/// the card. Each person gets a fresh `person_id`.
pub fn placeholder_people(rows: &[RateRow], count: usize, ids: &mut dyn IdGenerator) -> Vec<Person> {
    if rows.is_empty() || count == 0 {
        return Vec::new();
    }
    let step = (rows.len() / count).max(1);
    rows.iter()
        .step_by(step)
        .take(count)
        .enumerate()
        .map(|(i, row)| {
            let first = FIRST_NAMES[i % FIRST_NAMES.len()];
            let category = if row.category.is_empty() {
                "General"
            } else {
                row.category.as_str()
            };
            let mut person = Person::new(
                ids.next_id("person"),
                ids.next_id("p"),
                format!("{} ({})", first, row.region),
            )
            .with_role(row.role.clone())
            .with_tag(TagType::Location, row.region.clone())
            .with_tag(TagType::Skill, category);
            person.monthly_cost = (row.estimated_cost > 0.0).then_some(row.estimated_cost);
            person.billable_rate = (row.rate_high > 0.0).then_some(row.rate_high);
            person.resource_type = Some(ResourceType::FullTime);
            person
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reducer::SequentialIds;

    const CARD: &str = "Global cost rates,,,\n\
                        Role,Region,Category | Function,Rate_low,Rate_high,Estimated_Cost\n\
                        Designer,UK,Creative,50,80,\"9,500\"\n\
                        ,US,Creative,60,90,10000\n\
                        Developer,US,Engineering,70,$110,12000\n";

    #[test]
    fn skips_preamble_and_incomplete_rows() {
        let import = parse_rates(CARD).unwrap();
        assert_eq!(import.rows.len(), 2);
        assert_eq!(import.skipped, 1);
        assert_eq!(import.rows[0].estimated_cost, 9500.0);
        assert_eq!(import.rows[1].rate_high, 110.0);
        assert_eq!(import.rows[1].category, "Engineering");
    }

    #[test]
    fn missing_region_column_is_reported() {
        let err = parse_rates("Role,Cost\nDesigner,10\n").unwrap_err();
        assert!(matches!(err, ImportError::MissingColumns(cols) if cols == vec!["Role", "Region"]));
    }

    #[test]
    fn semicolon_cards_are_detected() {
        let import = parse_rates("Role;Region;Rate_high\nPM;DE;95\n").unwrap();
        assert_eq!(import.rows[0].region, "DE");
        assert_eq!(import.rows[0].rate_high, 95.0);
    }

    #[test]
    fn upsert_replaces_same_role_and_region() {
        let rows = parse_rates(CARD).unwrap().rows;
        let mut table = RateTable::default();
        assert_eq!(table.upsert(rows.clone()), 2);
        let mut cheaper = rows[0].clone();
        cheaper.rate_high = 70.0;
        assert_eq!(table.upsert([cheaper]), 0);
        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup("Designer", "UK").unwrap().rate_high, 70.0);
    }

    #[test]
    fn placeholders_are_spread_over_the_card() {
        let rows: Vec<RateRow> = (0..10)
            .map(|i| RateRow {
                role: format!("Role {i}"),
                region: "UK".into(),
                category: String::new(),
                rate_low: 0.0,
                rate_high: 100.0,
                estimated_cost: 0.0,
            })
            .collect();
        let people = placeholder_people(&rows, 5, &mut SequentialIds::default());
        let roles: Vec<&str> = people.iter().map(|p| p.role.as_str()).collect();
        assert_eq!(roles, vec!["Role 0", "Role 2", "Role 4", "Role 6", "Role 8"]);
        assert_eq!(people[0].name, "James (UK)");
        assert!(people[0].has_tag(&TagType::Skill, "General"));
        assert_eq!(people[0].monthly_cost, None);
        assert_ne!(people[0].person_id, people[1].person_id);
    }
}
