//! End-of-run summaries.

use crate::model::world::World;
use beans_data::Reason;
use std::io::Write;
use tracing::info;

pub trait SimulationReport {
    fn generate(&self, world: &World, out: &mut dyn Write) -> anyhow::Result<()>;
}

/// Plain-text summary, echoed to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSimulationReport;

impl ConsoleSimulationReport {
    #[must_use]
    pub fn lines(world: &World) -> Vec<String> {
        let config = world.config();
        let per_year = config.world.rounds_per_year.max(1);
        let max_age = config.beans.max_age_rounds;
        let deaths = |reason: Reason| {
            world
                .dead_beans()
                .iter()
                .filter(|record| record.reason == reason)
                .count()
        };

        vec![
            "Simulation Report:".to_string(),
            format!("  Rounds completed: {}", world.round()),
            format!("  Beans surviving: {}", world.beans().len()),
            format!("  Dead beans: {}", world.dead_beans().len()),
            format!("    {}: {}", Reason::MaxAge, deaths(Reason::MaxAge)),
            format!("    {}: {}", Reason::Starvation, deaths(Reason::Starvation)),
            format!("    {}: {}", Reason::Obesity, deaths(Reason::Obesity)),
            format!("  Food energy on field: {:.2}", world.food().total_energy()),
            format!(
                "  Max age (years/months): {}/{}",
                max_age / per_year,
                max_age % per_year
            ),
            format!("  Config fingerprint: {}", config.fingerprint()),
        ]
    }
}

impl SimulationReport for ConsoleSimulationReport {
    fn generate(&self, world: &World, out: &mut dyn Write) -> anyhow::Result<()> {
        for line in Self::lines(world) {
            writeln!(out, "{line}")?;
            info!(">>>> {line}");
        }
        Ok(())
    }
}
