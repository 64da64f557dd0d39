use anyhow::Result;
use clap::Args;
use colored::Colorize;
use fitness_assess::models::{Gender, TestType};
use std::path::PathBuf;

use super::load_table;

#[derive(Args)]
pub struct NormsCommand {
    /// Only show one test type
    #[arg(short, long)]
    test: Option<TestType>,

    /// Only show one gender (other uses the male bands)
    #[arg(short, long)]
    gender: Option<Gender>,

    /// Alternative normative dataset (JSON)
    #[arg(long)]
    dataset: Option<PathBuf>,
}

impl NormsCommand {
    pub fn execute(self) -> Result<()> {
        let table = load_table(self.dataset.as_deref())?;
        let gender = self.gender.map(|gender| gender.normative_lookup());

        println!(
            "{} {} (published {})",
            "Normative dataset".bold(),
            table.version(),
            table.published()
        );
        if let Some(source) = table.source() {
            println!("Source: {}", source);
        }

        let test_types: Vec<TestType> = match self.test {
            Some(test_type) => vec![test_type],
            None => TestType::ALL.to_vec(),
        };

        for test_type in test_types {
            println!();
            println!("{}", test_type.to_string().cyan().bold());
            println!(
                "{:<8} {:<7} {:>7} {:>7} {:>7} {:>7} {:>7}",
                "gender", "ages", "p10", "p25", "p50", "p75", "p90"
            );
            for row in table
                .rows_for(test_type)
                .filter(|row| gender.map_or(true, |gender| row.gender == gender))
            {
                let p = &row.percentiles;
                println!(
                    "{:<8} {:<7} {:>7.1} {:>7.1} {:>7.1} {:>7.1} {:>7.1}",
                    row.gender.to_string(),
                    format!("{}-{}", row.age_min, row.age_max),
                    p.p10,
                    p.p25,
                    p.p50,
                    p.p75,
                    p.p90
                );
            }
        }

        Ok(())
    }
}
