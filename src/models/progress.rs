use serde::{Deserialize, Serialize};

use super::{normalize_material, CargoItem, MaterialRequirements};

/// How a requirement id is matched against a cargo item name. Both sides are
/// compared upper-cased and trimmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    /// Names must be equal ("IRON" matches "Iron" but not "Iron Ore")
    #[default]
    Exact,
    /// Requirement id contained in the cargo name ("IRON" matches "Iron Ore")
    Contains,
}

impl MatchPolicy {
    pub fn matches(self, requirement: &str, cargo_name: &str) -> bool {
        let cargo_name = normalize_material(cargo_name);
        match self {
            MatchPolicy::Exact => cargo_name == requirement,
            MatchPolicy::Contains => cargo_name.contains(requirement),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressRow {
    pub material: String,
    pub required: u64,
    pub in_cargo: u64,
    pub remaining: u64,
    pub complete: bool,
}

impl ProgressRow {
    pub fn new(material: impl Into<String>, required: u64, in_cargo: u64) -> Self {
        let remaining = required.saturating_sub(in_cargo);
        Self {
            material: material.into(),
            required,
            in_cargo,
            remaining,
            complete: remaining == 0,
        }
    }
}

/// One row per requirement, in requirement order. The first matching cargo
/// entry supplies `in_cargo`; duplicates further down are not summed.
pub fn compute_progress(
    requirements: &MaterialRequirements,
    inventory: &[CargoItem],
    policy: MatchPolicy,
) -> Vec<ProgressRow> {
    requirements
        .iter()
        .map(|(material, required)| {
            let in_cargo = inventory
                .iter()
                .find(|item| policy.matches(material, &item.name))
                .map(|item| item.quantity.max(0) as u64)
                .unwrap_or(0);
            ProgressRow::new(material, required, in_cargo)
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSummary {
    pub completed: usize,
    pub total: usize,
    pub units_remaining: u64,
}

impl ProgressSummary {
    pub fn from_rows(rows: &[ProgressRow]) -> Self {
        Self {
            completed: rows.iter().filter(|row| row.complete).count(),
            total: rows.len(),
            units_remaining: rows.iter().map(|row| row.remaining).sum(),
        }
    }

    pub fn all_complete(&self) -> bool {
        self.completed == self.total
    }
}
