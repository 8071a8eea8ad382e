use anyhow::{bail, Context};
use school_finder_lib::modules::school::InMemorySchoolRepository;
use school_finder_lib::shared::utils::init_logger;
use school_finder_lib::{build_orchestrator, ScraperSettings, ScrapingJobRequest};
use std::sync::Arc;
use std::time::Duration;

const USAGE: &str = "usage: school-scraper <places|registry|all> <region,...> [limit] [--dry-run]";

fn parse_args(args: &[String]) -> anyhow::Result<ScrapingJobRequest> {
    let dry_run = args.iter().any(|a| a == "--dry-run");
    let positional: Vec<&String> = args.iter().filter(|a| !a.starts_with("--")).collect();

    let (method, regions) = match positional.as_slice() {
        [method, regions, ..] => (method.as_str(), regions.as_str()),
        _ => bail!(USAGE),
    };
    let limit = match positional.get(2) {
        Some(raw) => raw
            .parse::<i64>()
            .with_context(|| format!("invalid limit '{}'", raw))?,
        None => 0,
    };

    let regions: Vec<&str> = regions.split(',').collect();
    let request = ScrapingJobRequest::new(method, &regions, limit);
    Ok(if dry_run { request.dry_run() } else { request })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let request = parse_args(&args)?;

    let settings = ScraperSettings::from_env().context("failed to load scraper settings")?;
    log::debug!("Settings: {:?}", settings);

    let repository = Arc::new(InMemorySchoolRepository::new());
    let orchestrator = build_orchestrator(&settings, repository.clone())
        .context("failed to build scraping orchestrator")?;

    for (source, healthy) in orchestrator.test_all_connections().await {
        if healthy {
            log::info!("Source {} reachable", source);
        } else {
            log::warn!("Source {} unreachable", source);
        }
    }

    let job_id = orchestrator.start_job(request).await?;
    log::info!("Started job {}", job_id);

    let job = loop {
        tokio::time::sleep(Duration::from_secs(1)).await;
        let Some(job) = orchestrator.get_job_status(&job_id) else {
            bail!("job {} disappeared from the registry", job_id);
        };
        if job.is_terminal() {
            break job;
        }
        log::info!("Job {}: {} at {}%", job_id, job.status, job.progress);
    };

    println!("{}", serde_json::to_string_pretty(&job)?);
    println!("{}", serde_json::to_string_pretty(&orchestrator.get_stats())?);
    log::info!("Catalog now holds {} schools", repository.all().len());

    Ok(())
}
