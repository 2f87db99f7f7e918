use tally_store::{
    cleanup, plan_cleanup, retention_days_to_duration, sweep_stale_temps, StoreConfig,
    TEMP_FILE_MAX_AGE,
};

pub struct GcParams<'a> {
    pub config: &'a StoreConfig,
    pub dry_run: bool,
    pub keep_days: Option<u32>,
}

/// Counts reported by a gc run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct GcReport {
    pub documents: usize,
    pub temps: usize,
}

pub fn execute(params: &GcParams) -> anyhow::Result<()> {
    let report = run(params);
    let verb = if params.dry_run { "Would remove" } else { "Removed" };
    println!(
        "{verb} {} stale state file(s), {} temp file(s)",
        report.documents, report.temps
    );
    Ok(())
}

fn retention(params: &GcParams) -> time::Duration {
    params
        .keep_days
        .map(retention_days_to_duration)
        .unwrap_or(params.config.retention)
}

fn run(params: &GcParams) -> GcReport {
    let dir = &params.config.state_dir;
    let retention = retention(params);

    if params.dry_run {
        let stale = plan_cleanup(dir, retention, time::OffsetDateTime::now_utc());
        for doc in &stale {
            println!("  {} (updated {})", doc.path.display(), doc.updated_at);
        }
        return GcReport {
            documents: stale.len(),
            temps: 0,
        };
    }

    let report = GcReport {
        documents: cleanup(dir, retention),
        temps: sweep_stale_temps(dir, TEMP_FILE_MAX_AGE),
    };
    tracing::debug!(
        documents = report.documents,
        temps = report.temps,
        "gc finished"
    );
    report
}
