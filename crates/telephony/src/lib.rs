//! CellGate Telephony - gated cell-info queries
//!
//! The host-side surface the policy exists for: cell-location queries
//! that consult the decision engine before releasing data. Denials
//! surface as absent data, hard failures propagate, and every outcome is
//! auditable.

pub mod cell;
pub mod service;

pub use cell::{CellDataSource, CellInfo, CellLocation, NeighboringCellInfo, StaticCellData};
pub use service::CellInfoService;
