use std::{fs, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use reqtree::{compile, Config, Diagnostic, DiagnosticSink, Field, ModuleRecord, Summary, TracingSink};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "Compile a JSON array of module records")]
pub struct Compile {
    /// JSON file holding an array of module records
    input: PathBuf,

    /// Where to write the compiled records (stdout if omitted)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Parse records on a thread pool
    #[arg(long)]
    parallel: bool,
}

impl Compile {
    #[instrument(level = "debug", skip(self, config), fields(input = %self.input.display()))]
    pub fn run(self, mut config: Config) -> anyhow::Result<()> {
        let input = fs::read_to_string(&self.input)
            .with_context(|| format!("failed to read {}", self.input.display()))?;
        let records: Vec<ModuleRecord> = serde_json::from_str(&input)
            .with_context(|| format!("{} is not a JSON array of module records", self.input.display()))?;

        config.parallel |= self.parallel;
        let mut sink = CountingSink::default();
        let records = compile(records, &config, &mut sink)?;

        let json = serde_json::to_string_pretty(&records)?;
        match &self.output {
            Some(path) => fs::write(path, json + "\n")
                .with_context(|| format!("failed to write {}", path.display()))?,
            None => println!("{json}"),
        }

        eprintln!("{}", Summary::of(&records).to_string().success());
        if sink.count > 0 {
            eprintln!("{}", format!("{} diagnostics reported", sink.count).warning());
        }
        Ok(())
    }
}

/// Logs diagnostics and keeps count of them.
#[derive(Debug, Default)]
struct CountingSink {
    inner: TracingSink,
    count: usize,
}

impl DiagnosticSink for CountingSink {
    fn report(&mut self, module: &str, field: Field, diagnostic: Diagnostic) {
        self.count += 1;
        self.inner.report(module, field, diagnostic);
    }
}
