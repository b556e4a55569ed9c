//! Gated Cell-Info Queries
//!
//! Host-side facade over the decision engine: every query consults the
//! policy before touching the radio layer. A policy denial yields no
//! data; hard failures pass through untouched so the host IPC layer can
//! convert them for the caller. Every outcome is published on the audit
//! bus.

use std::sync::Arc;

use tracing::{debug, warn};

use cellgate_core::{AuditBus, AuditEvent, CallerIdentity, Result};
use cellgate_platform::SimulatedPlatform;
use cellgate_policy::{AccessContext, AccessDecisionEngine, AccessOutcome};

use crate::cell::{CellDataSource, CellInfo, CellLocation, NeighboringCellInfo};

/// Cell-info query surface, policy-gated.
pub struct CellInfoService {
    engine: AccessDecisionEngine,
    platform: Arc<SimulatedPlatform>,
    radio: Arc<dyn CellDataSource>,
    audit: Arc<AuditBus>,
}

impl CellInfoService {
    /// Create a service over a platform, a radio source and an audit bus
    pub fn new(
        platform: Arc<SimulatedPlatform>,
        radio: Arc<dyn CellDataSource>,
        audit: Arc<AuditBus>,
    ) -> Self {
        Self {
            engine: AccessDecisionEngine::new(),
            platform,
            radio,
            audit,
        }
    }

    /// Serving-cell location, or `None` when policy denies the caller.
    pub fn cell_location(&self, caller: &CallerIdentity) -> Result<Option<CellLocation>> {
        if !self.check_access(caller, "cell_location")? {
            return Ok(None);
        }
        Ok(self.radio.cell_location())
    }

    /// All observed cells, or `None` when policy denies the caller.
    pub fn all_cell_info(&self, caller: &CallerIdentity) -> Result<Option<Vec<CellInfo>>> {
        if !self.check_access(caller, "all_cell_info")? {
            return Ok(None);
        }
        Ok(Some(self.radio.all_cell_info()))
    }

    /// Neighboring-cell measurements, or `None` when policy denies the
    /// caller.
    pub fn neighboring_cell_info(
        &self,
        caller: &CallerIdentity,
    ) -> Result<Option<Vec<NeighboringCellInfo>>> {
        if !self.check_access(caller, "neighboring_cell_info")? {
            return Ok(None);
        }
        Ok(Some(self.radio.neighboring_cell_info()))
    }

    /// Runs the policy for one query. `true` means release the data.
    fn check_access(&self, caller: &CallerIdentity, message: &str) -> Result<bool> {
        self.platform.set_calling_uid(Some(caller.uid));
        let decision = {
            let ctx = AccessContext::from_platform(self.platform.as_ref());
            self.engine.can_access_cell_location(&ctx, caller, message)
        };
        self.platform.set_calling_uid(None);

        match decision {
            Ok(AccessOutcome::Granted) => {
                self.audit.publish(AuditEvent::Granted {
                    caller: caller.clone(),
                    message: message.to_string(),
                });
                Ok(true)
            }
            Ok(AccessOutcome::Denied(reason)) => {
                debug!(caller = %caller, %reason, message, "cell info query denied");
                self.audit.publish(AuditEvent::Denied {
                    caller: caller.clone(),
                    reason: reason.to_string(),
                    message: message.to_string(),
                });
                Ok(false)
            }
            Err(err) => {
                warn!(caller = %caller, %err, message, "rejecting cell info caller");
                self.audit.publish(AuditEvent::Rejected {
                    caller: caller.clone(),
                    error: err.to_string(),
                    message: message.to_string(),
                });
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::StaticCellData;
    use cellgate_core::{CellGateError, Uid, UserId};
    use cellgate_platform::{DeviceConfig, PackageConfig, UserConfig};
    use cellgate_policy::{LocationMode, OpMode, ACCESS_COARSE_LOCATION};

    fn device() -> DeviceConfig {
        DeviceConfig {
            current_user: UserId(0),
            users: vec![UserConfig {
                id: UserId(0),
                location_mode: LocationMode::HighAccuracy,
                profiles: Vec::new(),
            }],
            packages: vec![
                PackageConfig {
                    name: "com.example.maps".into(),
                    uid: Uid(10_001),
                    target_sdk: 33,
                    permissions: vec![ACCESS_COARSE_LOCATION.to_string()],
                    op_mode: OpMode::Allowed,
                },
                PackageConfig {
                    name: "com.example.nopermission".into(),
                    uid: Uid(10_002),
                    target_sdk: 33,
                    permissions: Vec::new(),
                    op_mode: OpMode::Allowed,
                },
            ],
            foreground: None,
            coarse_op_wired: true,
        }
    }

    fn radio() -> StaticCellData {
        StaticCellData {
            location: Some(CellLocation { cid: 4321, lac: 77 }),
            cells: vec![CellInfo {
                location: CellLocation { cid: 4321, lac: 77 },
                registered: true,
                signal_dbm: -85,
            }],
            neighbors: vec![NeighboringCellInfo {
                cid: 4400,
                lac: 77,
                rssi: 12,
            }],
        }
    }

    fn service() -> (CellInfoService, Arc<SimulatedPlatform>, Arc<AuditBus>) {
        let platform = Arc::new(SimulatedPlatform::new(device()).unwrap());
        let audit = Arc::new(AuditBus::new());
        let service = CellInfoService::new(
            Arc::clone(&platform),
            Arc::new(radio()),
            Arc::clone(&audit),
        );
        (service, platform, audit)
    }

    #[test]
    fn test_granted_caller_gets_data_and_audit_record() {
        let (service, _platform, audit) = service();
        let sub = audit.subscribe();
        let caller = CallerIdentity::new("com.example.maps", Uid(10_001));

        let location = service.cell_location(&caller).unwrap();
        assert_eq!(location, Some(CellLocation { cid: 4321, lac: 77 }));

        assert!(matches!(
            sub.try_recv().unwrap().event,
            AuditEvent::Granted { .. }
        ));
    }

    #[test]
    fn test_denied_caller_gets_no_data() {
        let (service, platform, audit) = service();
        let sub = audit.subscribe();
        platform
            .set_op_mode("com.example.maps", OpMode::Ignored)
            .unwrap();
        let caller = CallerIdentity::new("com.example.maps", Uid(10_001));

        let cells = service.all_cell_info(&caller).unwrap();
        assert_eq!(cells, None);

        match sub.try_recv().unwrap().event {
            AuditEvent::Denied { reason, .. } => assert_eq!(reason, "app-ops mode"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_permissionless_caller_rejected_hard() {
        let (service, _platform, audit) = service();
        let sub = audit.subscribe();
        let caller = CallerIdentity::new("com.example.nopermission", Uid(10_002));

        let result = service.neighboring_cell_info(&caller);
        assert!(matches!(
            result,
            Err(CellGateError::PermissionMissing(_))
        ));

        assert!(matches!(
            sub.try_recv().unwrap().event,
            AuditEvent::Rejected { .. }
        ));
    }

    #[test]
    fn test_spoofed_uid_rejected_hard() {
        let (service, _platform, _audit) = service();
        let caller = CallerIdentity::new("com.example.maps", Uid(10_002));

        let result = service.cell_location(&caller);
        assert!(matches!(result, Err(CellGateError::InvalidCaller(_))));
    }

    #[test]
    fn test_each_grant_notes_exactly_one_op() {
        let (service, platform, _audit) = service();
        let caller = CallerIdentity::new("com.example.maps", Uid(10_001));

        service.cell_location(&caller).unwrap();
        service.all_cell_info(&caller).unwrap();

        let notes = platform.noted_ops();
        assert_eq!(notes.len(), 2);
        assert!(notes.iter().all(|n| n.package == "com.example.maps"));
    }
}
