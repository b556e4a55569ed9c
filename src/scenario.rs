//! Scenario model for CellGate
//!
//! A scenario is a device description plus a list of access requests to
//! evaluate against it. Requests may carry an expected outcome, which
//! turns a scenario file into a conformance check: the runner reports
//! each result and fails the run when an expectation does not hold.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use cellgate_core::{CallerIdentity, CellGateError, Result, Uid};
use cellgate_platform::{DeviceConfig, SimulatedPlatform};
use cellgate_policy::{AccessContext, AccessDecisionEngine, AccessOutcome};

/// Expected result of one request, as written in scenario files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expectation {
    Granted,
    Denied,
    InvalidCaller,
    PermissionMissing,
}

/// One access request to evaluate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessRequest {
    /// Claimed package name.
    pub package: String,
    /// Caller uid.
    pub uid: Uid,
    /// Audit message attributed to the query.
    #[serde(default = "default_message")]
    pub message: String,
    /// Expected result; a mismatch fails the run.
    #[serde(default)]
    pub expect: Option<Expectation>,
}

fn default_message() -> String {
    "scenario".to_string()
}

/// Device description plus requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// The device the requests run against.
    pub device: DeviceConfig,
    /// Requests, evaluated in order against the same device.
    #[serde(default, rename = "request")]
    pub requests: Vec<AccessRequest>,
}

impl Scenario {
    /// Load a scenario from a TOML file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = tokio::fs::read_to_string(path.as_ref()).await?;
        let scenario: Scenario = toml::from_str(&contents)?;
        scenario.device.validate()?;
        if scenario.requests.is_empty() {
            return Err(CellGateError::Scenario(
                "scenario contains no requests".into(),
            ));
        }
        Ok(scenario)
    }
}

/// Result of evaluating one request.
#[derive(Debug, Clone, Serialize)]
pub struct RequestResult {
    pub package: String,
    pub uid: Uid,
    /// "granted", "denied", "invalid_caller" or "permission_missing".
    pub outcome: String,
    /// Denial reason or failure detail, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Whether the outcome matched the expectation, if one was given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<bool>,
}

/// Evaluates every request of a scenario against one simulated platform.
#[derive(Debug, Default)]
pub struct ScenarioRunner {
    engine: AccessDecisionEngine,
}

impl ScenarioRunner {
    /// Create a runner
    pub fn new() -> Self {
        Self {
            engine: AccessDecisionEngine::new(),
        }
    }

    /// Run all requests in order. Requests share the device, so earlier
    /// requests' op notes are visible to anyone inspecting the platform
    /// afterwards.
    pub fn run(&self, scenario: &Scenario) -> Result<Vec<RequestResult>> {
        let platform = SimulatedPlatform::new(scenario.device.clone())?;
        let mut results = Vec::with_capacity(scenario.requests.len());
        for request in &scenario.requests {
            results.push(self.evaluate(&platform, request));
        }
        Ok(results)
    }

    fn evaluate(&self, platform: &SimulatedPlatform, request: &AccessRequest) -> RequestResult {
        let caller = CallerIdentity::new(request.package.clone(), request.uid);

        platform.set_calling_uid(Some(request.uid));
        let decision = {
            let ctx = AccessContext::from_platform(platform);
            self.engine
                .can_access_cell_location(&ctx, &caller, &request.message)
        };
        platform.set_calling_uid(None);

        let (outcome, detail, actual) = match decision {
            Ok(AccessOutcome::Granted) => {
                ("granted".to_string(), None, Some(Expectation::Granted))
            }
            Ok(AccessOutcome::Denied(reason)) => (
                "denied".to_string(),
                Some(reason.to_string()),
                Some(Expectation::Denied),
            ),
            Err(err @ CellGateError::InvalidCaller(_)) => (
                "invalid_caller".to_string(),
                Some(err.to_string()),
                Some(Expectation::InvalidCaller),
            ),
            Err(err @ CellGateError::PermissionMissing(_)) => (
                "permission_missing".to_string(),
                Some(err.to_string()),
                Some(Expectation::PermissionMissing),
            ),
            Err(err) => {
                // The engine only produces the two hard failures above;
                // anything else is a platform defect worth surfacing.
                warn!(caller = %caller, %err, "unexpected evaluation error");
                ("error".to_string(), Some(err.to_string()), None)
            }
        };

        let matched = request.expect.map(|expected| Some(expected) == actual);
        match matched {
            Some(false) => warn!(
                caller = %caller,
                outcome,
                expected = ?request.expect,
                "request did not match its expectation"
            ),
            _ => info!(caller = %caller, outcome, "request evaluated"),
        }

        RequestResult {
            package: request.package.clone(),
            uid: request.uid,
            outcome,
            detail,
            matched,
        }
    }
}
