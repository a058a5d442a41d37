use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use interview_portal::import::{parse_rows, write_template};
use interview_portal::ApiClient;
use tracing::info;

#[derive(Subcommand)]
pub enum ImportCommand {
    /// Write the CSV template with one sample row.
    Template {
        /// Defaults to stdout.
        #[clap(long, short)]
        output: Option<PathBuf>,
    },
    /// Create one question per CSV row.
    Upload { path: PathBuf },
}

pub async fn import(client: &ApiClient, command: ImportCommand) -> Result<()> {
    match command {
        ImportCommand::Template { output } => match output {
            Some(path) => {
                let file = File::create(&path)
                    .with_context(|| format!("failed to create {}", path.display()))?;
                write_template(BufWriter::new(file))?;
                info!(path = %path.display(), "template written");
            }
            None => write_template(io::stdout().lock())?,
        },
        ImportCommand::Upload { path } => {
            if path.extension().and_then(|ext| ext.to_str()) != Some("csv") {
                bail!("please select a CSV file");
            }

            let file =
                File::open(&path).with_context(|| format!("failed to open {}", path.display()))?;
            let rows = parse_rows(file)?;
            let categories = client
                .list_categories()
                .await
                .context("failed to load categories")?;
            let report = client
                .import_questions(&categories, &rows)
                .await
                .context("nothing was imported")?;
            println!("{report}");

            if report.succeeded == 0 {
                bail!("no questions were imported");
            }
        }
    }

    Ok(())
}
