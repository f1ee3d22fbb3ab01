use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::{error, info};

use schedule_scraper::config::Config;
use schedule_scraper::error::Result;
use schedule_scraper::logging;
use schedule_scraper::pipeline::{RunReport, SchedulePipeline};

#[derive(Parser)]
#[command(name = "schedule_scraper")]
#[command(about = "Heuristic timetable scraper for mstimetables.ru publications")]
#[command(version = "0.1.0")]
struct Cli {
    /// Publication URL to scrape (absolute http or https)
    url: String,

    /// Directory the JSON artifacts are written to (overrides config)
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// TOML config file (default: ./config.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// WebDriver endpoint to drive the browser through (overrides config)
    #[arg(long)]
    webdriver_url: Option<String>,

    /// Skip clicking loader controls before extraction
    #[arg(long)]
    skip_probe: bool,
}

#[tokio::main]
async fn main() {
    logging::init_logging();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(report) => print_summary(&report),
        Err(e) => {
            error!("scrape failed: {}", e);
            eprintln!("❌ Scrape failed: {e}");
            process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<RunReport> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(out_dir) = cli.out_dir {
        config.output.dir = out_dir.to_string_lossy().into_owned();
    }
    if let Some(webdriver_url) = cli.webdriver_url {
        config.browser.webdriver_url = webdriver_url;
    }

    println!("🗓️  Scraping schedule from {}", cli.url);
    info!(url = %cli.url, "starting scrape");

    SchedulePipeline::new(config, cli.skip_probe).run(&cli.url).await
}

fn print_summary(report: &RunReport) {
    let snapshot = &report.snapshot;

    if !snapshot.week_range.is_empty() {
        println!("\n📅 Week: {}", snapshot.week_range);
    }

    for day in &snapshot.days {
        if day.date.is_empty() {
            println!("\n{}", day.day_name);
        } else {
            println!("\n{} ({})", day.day_name, day.date);
        }
        if day.lessons.is_empty() {
            println!("   (no lessons)");
            continue;
        }
        for entry in &day.lessons {
            for lesson in &entry.lessons {
                let mut line = format!("   {}: {}", entry.time_slot.display, lesson.subject);
                if !lesson.teacher.is_empty() {
                    line.push_str(&format!(" - {}", lesson.teacher));
                }
                if !lesson.room.is_empty() {
                    line.push_str(&format!(" ({})", lesson.room));
                }
                println!("{line}");
            }
        }
    }

    println!("\n📊 Scrape results:");
    println!("   Days: {}", report.day_count());
    println!("   Time slots: {}", report.slot_count());
    println!("   Lessons: {}", report.lesson_count());
    println!("   Teachers: {}", snapshot.teachers.len());
    println!("   Rooms: {}", snapshot.rooms.len());
    if report.activated_controls > 0 {
        println!("   Loader controls activated: {}", report.activated_controls);
    }
    println!("💾 Saved full schedule to {}", report.artifacts.full.display());
    println!(
        "💾 Saved simplified schedule to {}",
        report.artifacts.simplified.display()
    );
    println!("✅ Scrape completed successfully");
}
