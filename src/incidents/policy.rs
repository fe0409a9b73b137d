//! Rules deciding which incidents and breakdowns the storyteller may execute.
use bevy::prelude::*;

use super::components::{BuildCost, IncidentKind};

/// Vetoes storyteller incidents before they execute.
pub trait IncidentFilter: Send + Sync + 'static {
    fn allows(&self, kind: IncidentKind) -> bool;
}

/// Blocks every incident on a fixed list.
#[derive(Debug, Clone)]
pub struct BlockListFilter {
    blocked: Vec<IncidentKind>,
}

impl BlockListFilter {
    pub fn new(blocked: Vec<IncidentKind>) -> Self {
        Self { blocked }
    }

    pub fn blocked(&self) -> &[IncidentKind] {
        &self.blocked
    }
}

impl Default for BlockListFilter {
    /// Random short circuits and solar flares. Rain short circuits still happen.
    fn default() -> Self {
        Self::new(vec![IncidentKind::ShortCircuit, IncidentKind::SolarFlare])
    }
}

impl IncidentFilter for BlockListFilter {
    fn allows(&self, kind: IncidentKind) -> bool {
        !self.blocked.contains(&kind)
    }
}

/// What a breakdown rule sees of a machine.
#[derive(Debug, Clone, Copy)]
pub struct MachineProfile<'a> {
    pub powered: bool,
    pub cost: &'a BuildCost,
}

/// Decides whether a machine may break down at all.
pub trait BreakdownPolicy: Send + Sync + 'static {
    fn can_break_down(&self, machine: MachineProfile<'_>) -> bool;
}

/// Powered machines built with industrial or spacer components never break down.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComponentMachinesNeverBreak;

impl BreakdownPolicy for ComponentMachinesNeverBreak {
    fn can_break_down(&self, machine: MachineProfile<'_>) -> bool {
        !(machine.powered && machine.cost.uses_components())
    }
}

/// Registered incident filters and breakdown policies.
///
/// An incident or breakdown goes ahead only if every registered rule allows it.
#[derive(Resource, Default)]
pub struct IncidentPolicies {
    filters: Vec<Box<dyn IncidentFilter>>,
    breakdowns: Vec<Box<dyn BreakdownPolicy>>,
}

impl IncidentPolicies {
    pub fn add_filter(&mut self, filter: Box<dyn IncidentFilter>) -> &mut Self {
        self.filters.push(filter);
        self
    }

    pub fn add_breakdown_policy(&mut self, policy: Box<dyn BreakdownPolicy>) -> &mut Self {
        self.breakdowns.push(policy);
        self
    }

    pub fn allows_incident(&self, kind: IncidentKind) -> bool {
        self.filters.iter().all(|filter| filter.allows(kind))
    }

    pub fn allows_breakdown(&self, machine: MachineProfile<'_>) -> bool {
        self.breakdowns
            .iter()
            .all(|policy| policy.can_break_down(machine))
    }
}
