use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "review-transcode", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the encoder commands a job would run, without starting the encoder.
    Plan(JobArgs),
    /// Render review outputs for a job and write the updated job JSON.
    Run(RunArgs),
    /// Resolve an overscan expression for an input size.
    Overscan(OverscanArgs),
}

#[derive(Parser, Debug)]
struct JobArgs {
    /// Extract review settings JSON.
    #[arg(long)]
    settings: PathBuf,

    /// Publish job JSON (`{"context": ..., "instance": ...}`).
    #[arg(long)]
    job: PathBuf,
}

#[derive(Parser, Debug)]
struct RunArgs {
    #[command(flatten)]
    job: JobArgs,

    /// Where to write the updated job JSON. Printed to stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct OverscanArgs {
    /// Expression, e.g. `"-10%"` or `"1920px 1080px"`.
    #[arg(long, allow_hyphen_values = true)]
    expr: String,

    #[arg(long)]
    width: u32,

    #[arg(long)]
    height: u32,

    /// Fill color for padded areas.
    #[arg(long, default_value = "black")]
    color: String,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Plan(args) => cmd_plan(args),
        Command::Run(args) => cmd_run(args),
        Command::Overscan(args) => cmd_overscan(args),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load(
    args: &JobArgs,
) -> anyhow::Result<(review_transcode::ExtractReview, review_transcode::PublishJob)> {
    let settings = review_transcode::ExtractReviewSettings::from_path(&args.settings)
        .with_context(|| format!("load settings '{}'", args.settings.display()))?;
    let job = review_transcode::PublishJob::from_path(&args.job)
        .with_context(|| format!("load job '{}'", args.job.display()))?;
    Ok((review_transcode::ExtractReview::new(settings), job))
}

fn cmd_plan(args: JobArgs) -> anyhow::Result<()> {
    let (review, mut job) = load(&args)?;
    let review = review.with_runner(review_transcode::DryRunRunner);
    let report = review.process(&job.context, &mut job.instance)?;

    for rendered in &report.rendered {
        println!("{}", rendered.command);
    }
    for skipped in &report.skipped {
        match &skipped.output {
            Some(output) => {
                eprintln!("skipped {} -> {}: {}", skipped.source, output, skipped.reason)
            }
            None => eprintln!("skipped {}: {}", skipped.source, skipped.reason),
        }
    }
    Ok(())
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let (review, mut job) = load(&args.job)?;
    let report = review.process(&job.context, &mut job.instance)?;
    let json = job.to_json_pretty()?;

    match &args.out {
        Some(out) => {
            write_json(out, &json)?;
            eprintln!(
                "rendered {} output(s), wrote {}",
                report.rendered.len(),
                out.display()
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn write_json(path: &Path, json: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, json).with_context(|| format!("write job '{}'", path.display()))
}

fn cmd_overscan(args: OverscanArgs) -> anyhow::Result<()> {
    let crop =
        review_transcode::OverscanCrop::new(args.width, args.height, &args.expr, args.color)?;
    let (width, height) = crop.filtered_size();
    println!("{width}x{height}");
    for filter in crop.video_filters()? {
        println!("{filter}");
    }
    Ok(())
}
