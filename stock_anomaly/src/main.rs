use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use stock_anomaly::{
    analyze,
    cli::{
        commands::{Cli, Commands, DetectArgs, InteractiveArgs},
        failure_message,
        params::{apply_overrides, build_range, parse_query_line},
    },
    config::AppConfig,
    detector::DetectorParams,
    io::sink::{JsonFileSink, OutputFormat, ReportSink, StdoutSink},
    logging::init_tracing,
    models::request_params::PriceRequest,
    providers::{DataProvider, build_provider},
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref()).context("loading config")?;
    match &cli.command {
        Commands::Detect(args) => apply_overrides(&mut config, &args.overrides),
        Commands::Interactive(args) => apply_overrides(&mut config, &args.overrides),
    }
    init_tracing(&config.logging)?;
    config.detector.validate().context("invalid detector settings")?;

    let provider = build_provider(&config.provider, config.cache.ttl())
        .context("setting up market data provider")?;
    info!(
        provider = provider.name(),
        window = config.detector.window,
        threshold = config.detector.threshold,
        "ready"
    );

    match cli.command {
        Commands::Detect(args) => detect(provider.as_ref(), config.detector, args).await,
        Commands::Interactive(args) => {
            interactive(provider.as_ref(), config.detector, args).await
        }
    }
}

async fn detect(
    provider: &dyn DataProvider,
    params: DetectorParams,
    args: DetectArgs,
) -> Result<ExitCode> {
    let range = build_range(args.start, args.end, args.period);
    let request = PriceRequest::new(&args.ticker, range)?;

    let report = match analyze(provider, &request, params).await {
        Ok(report) => report,
        Err(err) => {
            error!(ticker = %request.ticker, error = %err, "analysis failed");
            eprintln!("{}", failure_message(&request.ticker, &err));
            return Ok(ExitCode::FAILURE);
        }
    };

    match args.output_dir {
        Some(dir) => {
            let path = JsonFileSink::new(dir).write(&report).await?;
            println!("{}", path.display());
        }
        None => {
            StdoutSink::new(args.format, args.show_series)
                .write(&report)
                .await?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Answers one query per stdin line until EOF. Failed queries are reported
/// and the loop carries on.
async fn interactive(
    provider: &dyn DataProvider,
    params: DetectorParams,
    args: InteractiveArgs,
) -> Result<ExitCode> {
    let sink = StdoutSink::new(OutputFormat::Table, args.show_series);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stderr = tokio::io::stderr();

    loop {
        stderr.write_all(b"ticker [start|period] [end]> ").await?;
        stderr.flush().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let request = match parse_query_line(&line) {
            Ok(Some(request)) => request,
            Ok(None) => continue,
            Err(err) => {
                eprintln!("{err}");
                continue;
            }
        };

        match analyze(provider, &request, params).await {
            Ok(report) => sink.write(&report).await?,
            Err(err) => eprintln!("{}", failure_message(&request.ticker, &err)),
        }
    }
    Ok(ExitCode::SUCCESS)
}
