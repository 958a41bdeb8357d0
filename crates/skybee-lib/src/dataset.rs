//! Loading of the Airports and Routes tables.
//!
//! Both tables are CSV files with a header row. Headers are matched loosely
//! so that exports from different sources (`ID` vs `IATA`, `Departure` vs
//! `origin`) load without preprocessing. Structural problems fail the whole
//! load; individual bad rows are skipped and counted.

use std::collections::HashSet;
use std::env;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim};
use directories::ProjectDirs;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::geo::Coordinates;

/// Environment variable that overrides the default data directory.
pub const DATA_DIR_ENV: &str = "SKYBEE_DATA_DIR";
/// Default filename for the airports table.
pub const AIRPORTS_FILENAME: &str = "Airports.csv";
/// Default filename for the routes table.
pub const ROUTES_FILENAME: &str = "Routes.csv";

const AIRPORT_ID_COLUMNS: &[&str] = &["id", "iata", "code"];
const LATITUDE_COLUMNS: &[&str] = &["latitude", "lat"];
const LONGITUDE_COLUMNS: &[&str] = &["longitude", "lon", "lng"];
const DEPARTURE_COLUMNS: &[&str] = &["departure", "origin", "source", "from"];
const DESTINATION_COLUMNS: &[&str] = &["destination", "dest", "to", "target"];

/// Single row of the airports table.
#[derive(Debug, Clone, PartialEq)]
pub struct AirportRecord {
    pub code: String,
    pub coordinates: Coordinates,
}

/// Single row of the routes table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRecord {
    pub departure: String,
    pub destination: String,
}

/// Parsed contents of both tables.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub airports: Vec<AirportRecord>,
    pub routes: Vec<RouteRecord>,
    /// Airport rows dropped because the identifier or coordinates were unusable.
    pub skipped_airports: usize,
    /// Route rows dropped because an endpoint was blank.
    pub skipped_routes: usize,
}

/// Locations of the two input tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetPaths {
    pub airports: PathBuf,
    pub routes: PathBuf,
}

impl DatasetPaths {
    /// Paths using the default file names inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            airports: dir.join(AIRPORTS_FILENAME),
            routes: dir.join(ROUTES_FILENAME),
        }
    }

    /// Resolve the tables from an explicit directory, `$SKYBEE_DATA_DIR`, or the
    /// platform data directory, in that order.
    pub fn resolve(dir: Option<&Path>) -> Result<Self> {
        if let Some(dir) = dir {
            return Ok(Self::in_dir(dir));
        }
        if let Some(dir) = env::var_os(DATA_DIR_ENV).filter(|value| !value.is_empty()) {
            return Ok(Self::in_dir(Path::new(&dir)));
        }
        let dirs = ProjectDirs::from("com", "skybee", "skybee-routes")
            .ok_or(Error::DataDirUnavailable)?;
        Ok(Self::in_dir(dirs.data_dir()))
    }
}

/// Read both tables from disk.
pub fn load_dataset(paths: &DatasetPaths) -> Result<Dataset> {
    let airport_file = open_table("Airports", &paths.airports)?;
    let route_file = open_table("Routes", &paths.routes)?;

    let (airports, skipped_airports) = read_airports(airport_file)?;
    let (routes, skipped_routes) = read_routes(route_file)?;

    info!(
        airports = airports.len(),
        routes = routes.len(),
        skipped_airports,
        skipped_routes,
        "loaded airport tables"
    );

    Ok(Dataset {
        airports,
        routes,
        skipped_airports,
        skipped_routes,
    })
}

fn open_table(table: &'static str, path: &Path) -> Result<File> {
    if !path.exists() {
        return Err(Error::TableNotFound {
            table,
            path: path.to_path_buf(),
        });
    }
    debug!(table, path = %path.display(), "opening table");
    Ok(File::open(path)?)
}

/// Parse the airports table. Returns the usable rows and the number of rows skipped.
///
/// A repeated identifier fails the load since identifiers key the graph.
pub fn read_airports<R: Read>(reader: R) -> Result<(Vec<AirportRecord>, usize)> {
    let mut csv_reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let columns = resolve_columns(
        "Airports",
        &headers,
        &[
            ("id", AIRPORT_ID_COLUMNS),
            ("latitude", LATITUDE_COLUMNS),
            ("longitude", LONGITUDE_COLUMNS),
        ],
    )?;
    let (id_col, lat_col, lon_col) = (columns[0], columns[1], columns[2]);

    let mut airports = Vec::new();
    let mut seen = HashSet::new();
    let mut skipped = 0usize;

    for (line, record) in csv_reader.records().enumerate() {
        let record = record?;
        let code = field(&record, id_col);
        if code.is_empty() {
            warn!(row = line + 1, "skipping airport row without an identifier");
            skipped += 1;
            continue;
        }

        let latitude = parse_degrees(&record, lat_col);
        let longitude = parse_degrees(&record, lon_col);
        let coordinates = match (latitude, longitude) {
            (Some(lat), Some(lon)) => Coordinates::new(lat, lon),
            _ => {
                warn!(
                    row = line + 1,
                    code, "skipping airport with unparseable coordinates"
                );
                skipped += 1;
                continue;
            }
        };
        if !coordinates.is_valid() {
            warn!(
                row = line + 1,
                code, "skipping airport with out-of-range coordinates"
            );
            skipped += 1;
            continue;
        }

        if !seen.insert(code.to_string()) {
            return Err(Error::DuplicateAirport {
                code: code.to_string(),
            });
        }

        airports.push(AirportRecord {
            code: code.to_string(),
            coordinates,
        });
    }

    Ok((airports, skipped))
}

/// Parse the routes table. Returns the usable rows and the number of rows skipped.
///
/// Rows are not checked against the airports table here; the graph builder
/// drops routes whose endpoints are unknown.
pub fn read_routes<R: Read>(reader: R) -> Result<(Vec<RouteRecord>, usize)> {
    let mut csv_reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let columns = resolve_columns(
        "Routes",
        &headers,
        &[
            ("departure", DEPARTURE_COLUMNS),
            ("destination", DESTINATION_COLUMNS),
        ],
    )?;
    let (from_col, to_col) = (columns[0], columns[1]);

    let mut routes = Vec::new();
    let mut skipped = 0usize;

    for (line, record) in csv_reader.records().enumerate() {
        let record = record?;
        let departure = field(&record, from_col);
        let destination = field(&record, to_col);
        if departure.is_empty() || destination.is_empty() {
            warn!(row = line + 1, "skipping route row with a blank endpoint");
            skipped += 1;
            continue;
        }
        routes.push(RouteRecord {
            departure: departure.to_string(),
            destination: destination.to_string(),
        });
    }

    Ok((routes, skipped))
}

fn normalize_header(header: &str) -> String {
    header
        .trim_start_matches('\u{feff}')
        .to_ascii_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

/// Map each canonical column to its index in `headers`, failing with every
/// missing column listed.
fn resolve_columns(
    table: &'static str,
    headers: &StringRecord,
    wanted: &[(&str, &[&str])],
) -> Result<Vec<usize>> {
    let normalized: Vec<String> = headers.iter().map(normalize_header).collect();
    let mut indices = Vec::with_capacity(wanted.len());
    let mut missing = Vec::new();

    for (canonical, synonyms) in wanted {
        let found = synonyms
            .iter()
            .find_map(|alt| normalized.iter().position(|h| h == alt));
        match found {
            Some(index) => indices.push(index),
            None => missing.push((*canonical).to_string()),
        }
    }

    if !missing.is_empty() {
        return Err(Error::MissingColumns { table, missing });
    }
    Ok(indices)
}

fn field(record: &StringRecord, index: usize) -> &str {
    record.get(index).unwrap_or("").trim()
}

fn parse_degrees(record: &StringRecord, index: usize) -> Option<f64> {
    field(record, index).parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn airports_accept_header_synonyms() {
        let csv = "IATA,Lat,Lng\nLHR,51.47,-0.4543\n";
        let (airports, skipped) = read_airports(csv.as_bytes()).expect("parses");
        assert_eq!(skipped, 0);
        assert_eq!(airports.len(), 1);
        assert_eq!(airports[0].code, "LHR");
        assert_eq!(airports[0].coordinates, Coordinates::new(51.47, -0.4543));
    }

    #[test]
    fn airports_skip_malformed_rows() {
        let csv = "ID,Latitude,Longitude\n\
                   LHR,51.47,-0.4543\n\
                   ,10.0,10.0\n\
                   BAD,north,10.0\n\
                   FAR,95.0,10.0\n";
        let (airports, skipped) = read_airports(csv.as_bytes()).expect("parses");
        assert_eq!(airports.len(), 1);
        assert_eq!(skipped, 3);
    }

    #[test]
    fn duplicate_airport_fails_the_load() {
        let csv = "ID,Latitude,Longitude\nLHR,51.47,-0.45\nLHR,51.47,-0.45\n";
        let error = read_airports(csv.as_bytes()).expect_err("duplicate");
        assert!(matches!(error, Error::DuplicateAirport { code } if code == "LHR"));
    }

    #[test]
    fn missing_columns_are_reported() {
        let csv = "ID,Elevation\nLHR,83\n";
        let error = read_airports(csv.as_bytes()).expect_err("missing columns");
        match error {
            Error::MissingColumns { table, missing } => {
                assert_eq!(table, "Airports");
                assert_eq!(missing, vec!["latitude", "longitude"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn routes_skip_blank_endpoints() {
        let csv = "Departure,Destination\nLHR,JFK\n,JFK\nCDG, \n";
        let (routes, skipped) = read_routes(csv.as_bytes()).expect("parses");
        assert_eq!(
            routes,
            vec![RouteRecord {
                departure: "LHR".to_string(),
                destination: "JFK".to_string(),
            }]
        );
        assert_eq!(skipped, 2);
    }

    #[test]
    fn explicit_directory_wins() {
        let paths = DatasetPaths::resolve(Some(Path::new("/srv/data"))).expect("resolves");
        assert_eq!(paths.airports, Path::new("/srv/data/Airports.csv"));
        assert_eq!(paths.routes, Path::new("/srv/data/Routes.csv"));
    }
}
