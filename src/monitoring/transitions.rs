//! Health transition detection between consecutive snapshots

use super::alerts::{AlertScope, HealthStatus, Transition};
use crate::core::health::ReadinessSnapshot;
use crate::core::probe::DependencyId;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
struct Baseline {
    services: BTreeMap<DependencyId, HealthStatus>,
    system: HealthStatus,
}

impl Baseline {
    fn of(snapshot: &ReadinessSnapshot) -> Self {
        Self {
            services: snapshot
                .services
                .iter()
                .map(|(id, check)| (id.clone(), HealthStatus::from(check.is_healthy())))
                .collect(),
            system: HealthStatus::from(snapshot.system_ready),
        }
    }
}

/// Compares each snapshot against the previous one.
///
/// The first snapshot only establishes the baseline. A dependency that was
/// not present in the previous snapshot joins the baseline silently.
#[derive(Debug, Default)]
pub struct TransitionDetector {
    previous: Option<Baseline>,
}

impl TransitionDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_baseline(&self) -> bool {
        self.previous.is_some()
    }

    /// Record `snapshot` and return the transitions it introduces.
    ///
    /// Dependency transitions come first in id order; the aggregate
    /// transition, if any, comes last.
    pub fn observe(&mut self, snapshot: &ReadinessSnapshot) -> Vec<Transition> {
        let current = Baseline::of(snapshot);
        let Some(previous) = self.previous.replace(current.clone()) else {
            return Vec::new();
        };

        let mut transitions = Vec::new();
        for (id, &to) in &current.services {
            let Some(&from) = previous.services.get(id) else {
                continue;
            };
            if from == to {
                continue;
            }
            let mut transition = Transition::new(AlertScope::Dependency(id.clone()), from, to);
            if let Some(label) = snapshot.service(id).and_then(|check| check.error_label()) {
                transition = transition.with_error_kind(label);
            }
            transitions.push(transition);
        }

        if previous.system != current.system {
            transitions.push(Transition::new(
                AlertScope::System,
                previous.system,
                current.system,
            ));
        }
        transitions
    }
}
