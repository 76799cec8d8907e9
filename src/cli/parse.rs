use clap::Parser;
use reqtree::{
    requisite::normalize_text, normalize, parse, tokenize, Config, ModuleCode, Recovered,
};
use serde_json::json;
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "Parse one requisite string and show the result of each stage")]
pub struct Parse {
    /// The requisite text, e.g. "CS1010 or CS1101S and MA1100"
    text: String,

    /// The module the text belongs to; mentions of it are removed first
    #[arg(short, long, value_parser = super::parse_module_code)]
    module: Option<ModuleCode>,

    /// Print the stages as JSON
    #[arg(long)]
    json: bool,
}

impl Parse {
    #[instrument(level = "debug", skip(self, config))]
    pub fn run(self, config: &Config) -> anyhow::Result<()> {
        if let Some(keyword) = config.restricted_keywords.find_in(&self.text) {
            eprintln!(
                "{}",
                format!("not parsed: text contains restricted keyword '{keyword}'").warning()
            );
            return Ok(());
        }

        let normalized = match &self.module {
            Some(module) => normalize(module, &self.text),
            None => normalize_text(&self.text),
        };
        let tokens = tokenize(&normalized);
        let Recovered {
            value: tree,
            diagnostics,
        } = parse(&tokens);

        if self.json {
            let stages = json!({
                "normalized": normalized,
                "tokens": tokens,
                "tree": tree,
                "diagnostics": diagnostics,
            });
            println!("{}", serde_json::to_string_pretty(&stages)?);
            return Ok(());
        }

        println!("normalized: {normalized}");
        let rendered = tree
            .as_ref()
            .map_or_else(|| "(none)".to_string(), ToString::to_string);
        println!("tree:       {rendered}");
        for diagnostic in &diagnostics {
            eprintln!("{}", diagnostic.to_string().error());
        }
        if tree.is_none() {
            eprintln!("{}", "no module codes found".dim());
        }
        Ok(())
    }
}
