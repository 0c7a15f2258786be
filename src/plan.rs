use anyhow::{ensure, Result};
use std::collections::BTreeSet;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Phase {
    pub name: String,
    pub units: Vec<String>,
}

/// Ordered phases, each with an ordered list of units to push through it.
///
/// A plan never contains the same phase twice or the same unit twice within
/// a phase, so walking it starts every (phase, unit) pair exactly once.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Plan {
    phases: Vec<Phase>,
}

impl Plan {
    pub fn builder() -> PlanBuilder {
        PlanBuilder::default()
    }

    /// Every unit goes through every phase, phase by phase.
    pub fn uniform<P, U>(phases: &[P], units: &[U]) -> Result<Self>
    where
        P: AsRef<str>,
        U: AsRef<str>,
    {
        let mut builder = Self::builder();
        for phase in phases {
            builder = builder.phase(phase.as_ref(), units);
        }
        builder.build()
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn total_units(&self) -> u64 {
        self.phases.iter().map(|p| p.units.len() as u64).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_units() == 0
    }
}

#[derive(Default)]
pub struct PlanBuilder {
    phases: Vec<Phase>,
}

impl PlanBuilder {
    pub fn phase<N, U>(mut self, name: N, units: &[U]) -> Self
    where
        N: Into<String>,
        U: AsRef<str>,
    {
        self.phases.push(Phase {
            name: name.into(),
            units: units.iter().map(|u| u.as_ref().to_string()).collect(),
        });
        self
    }

    pub fn build(self) -> Result<Plan> {
        let mut phase_names = BTreeSet::new();
        for phase in &self.phases {
            ensure!(!phase.name.is_empty(), "phase name must not be empty");
            ensure!(
                phase_names.insert(phase.name.as_str()),
                "duplicate phase `{}`",
                phase.name
            );

            let mut units = BTreeSet::new();
            for unit in &phase.units {
                ensure!(
                    !unit.is_empty(),
                    "unit path must not be empty (phase `{}`)",
                    phase.name
                );
                ensure!(
                    units.insert(unit.as_str()),
                    "duplicate unit `{}` in phase `{}`",
                    unit,
                    phase.name
                );
            }
        }

        Ok(Plan {
            phases: self.phases,
        })
    }
}
