// Handlers for the CLI subcommands.
//
// main.rs parses arguments and dispatches here. Both commands share the
// dataset location flags and load the tables once per invocation.

pub mod airports;
pub mod route;

use std::path::PathBuf;

use skybee_lib::{DatasetPaths, GraphStore};

/// Locations of the input tables as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct DataArgs {
    /// Directory containing `Airports.csv` and `Routes.csv`.
    pub data_dir: Option<PathBuf>,
    /// Explicit airports table, overriding the directory.
    pub airports: Option<PathBuf>,
    /// Explicit routes table, overriding the directory.
    pub routes: Option<PathBuf>,
}

impl DataArgs {
    /// Load the graph store. Failures leave the store unloaded so that every
    /// query still answers with the "data not loaded" sentinel.
    pub fn load_store(&self) -> GraphStore {
        let resolved = match (&self.airports, &self.routes) {
            (Some(airports), Some(routes)) => Ok(DatasetPaths {
                airports: airports.clone(),
                routes: routes.clone(),
            }),
            _ => DatasetPaths::resolve(self.data_dir.as_deref()).map(|mut paths| {
                if let Some(airports) = &self.airports {
                    paths.airports = airports.clone();
                }
                if let Some(routes) = &self.routes {
                    paths.routes = routes.clone();
                }
                paths
            }),
        };

        match resolved {
            Ok(paths) => GraphStore::load_from_paths(&paths),
            Err(err) => GraphStore::from_dataset(Err(err)),
        }
    }
}
