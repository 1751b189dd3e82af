use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::process::ExitCode;
use tracing::{error, info, warn};

use filing_importer::{
    import_records, load_records, open_database, table_counts, write_error_log, Config, VERSION,
};

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = Config::parse();
    run_import(&config)
}

fn run_import(config: &Config) -> Result<ExitCode> {
    info!("filing-importer {}", VERSION);

    // 1. Database (schema is created on first use)
    let mut conn = open_database(&config.database)?;
    info!("✓ Database ready at {}", config.database.display());

    // 2. Records
    let records = load_records(&config.input)?;
    info!("✓ Loaded {} records from {}", records.len(), config.input.display());

    // 3. Import, one transaction per record
    let progress = progress_bar(records.len() as u64, config.no_progress)?;

    let report = match import_records(&mut conn, &records, config.on_error, &progress) {
        Ok(report) => report,
        Err(aborted) => {
            error!("❌ {}: {}", aborted, aborted.error.detail());
            info!("{}", aborted.report.summary());
            let written = write_error_log(&config.errors, &aborted.report.error_lines())?;
            warn!("Wrote {} errors to {}", written, config.errors.display());
            return Err(aborted.into());
        }
    };
    progress.finish_and_clear();

    // 4. Summary
    let counts = table_counts(&conn)?;
    info!("{}", report.summary());
    info!(
        "Database now holds {} organisations, {} people",
        counts.organisations, counts.people
    );

    if report.is_clean() {
        info!("✅ All records inserted successfully, no errors");
        return Ok(ExitCode::SUCCESS);
    }

    let written = write_error_log(&config.errors, &report.error_lines())?;
    warn!(
        "⚠️ {} records failed, wrote {} errors to {}",
        report.failed(),
        written,
        config.errors.display()
    );

    Ok(ExitCode::FAILURE)
}

fn progress_bar(len: u64, hidden: bool) -> Result<ProgressBar> {
    if hidden {
        return Ok(ProgressBar::hidden());
    }

    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} ({per_sec}, eta {eta})")?
            .progress_chars("=> "),
    );
    Ok(pb)
}
