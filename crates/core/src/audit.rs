//! Decision Audit Bus
//!
//! Provides a pub/sub bus for access-decision records, so hosts can
//! attribute grants and denials without threading a logger through the
//! decision path.

use chrono::{DateTime, Utc};
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::RwLock;
use tracing::debug;

use crate::identity::CallerIdentity;

/// One access-decision outcome, as seen by the host surface.
#[derive(Debug, Clone)]
pub enum AuditEvent {
    /// Every gate passed; data was released.
    Granted {
        caller: CallerIdentity,
        message: String,
    },
    /// A policy gate said no; the caller received no data.
    Denied {
        caller: CallerIdentity,
        reason: String,
        message: String,
    },
    /// The caller was rejected with a hard failure before the policy
    /// finished evaluating.
    Rejected {
        caller: CallerIdentity,
        error: String,
        message: String,
    },
}

/// Timestamped audit record
#[derive(Debug, Clone)]
pub struct AuditRecord {
    /// When the decision completed.
    pub at: DateTime<Utc>,
    /// What was decided.
    pub event: AuditEvent,
}

/// Subscriber handle for receiving audit records
#[derive(Clone)]
pub struct AuditSubscription {
    receiver: Receiver<AuditRecord>,
}

impl AuditSubscription {
    /// Receive the next record (blocking)
    pub fn recv(&self) -> Result<AuditRecord, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a record (non-blocking)
    pub fn try_recv(&self) -> Result<AuditRecord, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Get an iterator over records
    pub fn iter(&self) -> impl Iterator<Item = AuditRecord> + '_ {
        self.receiver.iter()
    }
}

/// Audit bus for publish/subscribe fan-out of decision records
pub struct AuditBus {
    subscribers: RwLock<Vec<Sender<AuditRecord>>>,
}

impl AuditBus {
    /// Create a new audit bus
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
        }
    }

    /// Subscribe to decision records
    pub fn subscribe(&self) -> AuditSubscription {
        let (sender, receiver) = unbounded();
        self.subscribers.write().push(sender);
        AuditSubscription { receiver }
    }

    /// Publish a decision record to all subscribers, stamping it with the
    /// current time. Returns the number of subscribers reached.
    pub fn publish(&self, event: AuditEvent) -> usize {
        let record = AuditRecord {
            at: Utc::now(),
            event,
        };

        let subscribers = self.subscribers.read();
        let mut delivered = 0;

        for sender in subscribers.iter() {
            if sender.send(record.clone()).is_ok() {
                delivered += 1;
            }
        }

        debug!("Audit record {:?} delivered to {} subscribers", record.event, delivered);
        delivered
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }
}

impl Default for AuditBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Uid;

    fn caller() -> CallerIdentity {
        CallerIdentity::new("com.example.app", Uid(10_001))
    }

    #[test]
    fn test_audit_bus_fan_out() {
        let bus = AuditBus::new();
        let sub1 = bus.subscribe();
        let sub2 = bus.subscribe();

        assert_eq!(bus.subscriber_count(), 2);

        let delivered = bus.publish(AuditEvent::Granted {
            caller: caller(),
            message: "cell_location".into(),
        });
        assert_eq!(delivered, 2);

        assert!(sub1.try_recv().is_ok());
        assert!(sub2.try_recv().is_ok());
    }

    #[test]
    fn test_denied_record_carries_reason() {
        let bus = AuditBus::new();
        let sub = bus.subscribe();

        bus.publish(AuditEvent::Denied {
            caller: caller(),
            reason: "app-ops mode".into(),
            message: "all_cell_info".into(),
        });

        let record = sub.try_recv().unwrap();
        match record.event {
            AuditEvent::Denied { reason, .. } => assert_eq!(reason, "app-ops mode"),
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
