//! Cell-derived data
//!
//! Minimal shapes for the data the gated queries release, plus the
//! radio-layer source trait they read from.

use serde::{Deserialize, Serialize};

/// Serving-cell location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellLocation {
    /// Cell id.
    pub cid: u32,
    /// Location area code.
    pub lac: u32,
}

/// One observed cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellInfo {
    pub location: CellLocation,
    /// Whether this is the registered/serving cell.
    pub registered: bool,
    /// Signal strength in dBm.
    pub signal_dbm: i32,
}

/// Neighboring-cell measurement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighboringCellInfo {
    pub cid: u32,
    pub lac: u32,
    /// Received signal strength indication.
    pub rssi: i32,
}

/// Radio-layer source of cell observations.
///
/// The real source is the modem; tests and the scenario runner use a
/// fixed in-memory one.
pub trait CellDataSource: Send + Sync {
    fn cell_location(&self) -> Option<CellLocation>;
    fn all_cell_info(&self) -> Vec<CellInfo>;
    fn neighboring_cell_info(&self) -> Vec<NeighboringCellInfo>;
}

/// Fixed observations, for tests and demos.
#[derive(Debug, Clone, Default)]
pub struct StaticCellData {
    pub location: Option<CellLocation>,
    pub cells: Vec<CellInfo>,
    pub neighbors: Vec<NeighboringCellInfo>,
}

impl CellDataSource for StaticCellData {
    fn cell_location(&self) -> Option<CellLocation> {
        self.location
    }

    fn all_cell_info(&self) -> Vec<CellInfo> {
        self.cells.clone()
    }

    fn neighboring_cell_info(&self) -> Vec<NeighboringCellInfo> {
        self.neighbors.clone()
    }
}
