use color_eyre::eyre::{
    Result,
    WrapErr,
    eyre,
};
use prize_wheel::config::{
    self,
    AppConfig,
    CliOverrides,
};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling,
};
use tracing_subscriber::{
    EnvFilter,
    fmt,
};

mod client;
mod ui;

fn print_usage_and_exit() -> ! {
    println!(
        "Usage: prize-wheel [--entry <text>]... [--config <path>] [--seed <n>]\n\
         [--fps <n>] [--log-dir <path>]\n\
         \n\
         Flags:\n\
           --entry <text>      Add an initial wheel entry (repeat; replaces the defaults)\n\
           --config <path>     JSON file with entries, seed, fps and log_dir\n\
           --seed <n>          Seed the spin RNG for repeatable spins\n\
           --fps <n>           Animation frame rate, 1-{} (default {})\n\
           --log-dir <path>    Directory for the rolling log file (default {})",
        config::MAX_FPS,
        config::DEFAULT_FPS,
        config::DEFAULT_LOG_DIR,
    );
    std::process::exit(0);
}

fn parse_cli_args() -> Result<CliOverrides> {
    let mut args = std::env::args().skip(1);
    let mut cli = CliOverrides::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--entry" => {
                let text = args
                    .next()
                    .ok_or_else(|| eyre!("--entry requires a text argument"))?;
                cli.entries.push(text);
            }
            "--config" => {
                let path = args
                    .next()
                    .ok_or_else(|| eyre!("--config requires a path argument"))?;
                if cli.config_path.is_some() {
                    return Err(eyre!("--config may only be specified once"));
                }
                cli.config_path = Some(path);
            }
            "--seed" => {
                let raw = args
                    .next()
                    .ok_or_else(|| eyre!("--seed requires a number"))?;
                if cli.seed.is_some() {
                    return Err(eyre!("--seed may only be specified once"));
                }
                let seed = raw
                    .parse::<u64>()
                    .wrap_err_with(|| format!("--seed expects an unsigned integer, got {raw}"))?;
                cli.seed = Some(seed);
            }
            "--fps" => {
                let raw = args
                    .next()
                    .ok_or_else(|| eyre!("--fps requires a number"))?;
                if cli.fps.is_some() {
                    return Err(eyre!("--fps may only be specified once"));
                }
                let fps = raw
                    .parse::<u32>()
                    .wrap_err_with(|| format!("--fps expects an unsigned integer, got {raw}"))?;
                cli.fps = Some(fps);
            }
            "--log-dir" => {
                let dir = args
                    .next()
                    .ok_or_else(|| eyre!("--log-dir requires a path argument"))?;
                if cli.log_dir.is_some() {
                    return Err(eyre!("--log-dir may only be specified once"));
                }
                cli.log_dir = Some(dir);
            }
            "--help" | "-h" => print_usage_and_exit(),
            other => return Err(eyre!("Unknown argument: {other}")),
        }
    }

    Ok(cli)
}

// The terminal belongs to the UI, so logs go to a rolling file instead.
fn init_tracing(config: &AppConfig) -> Result<WorkerGuard> {
    std::fs::create_dir_all(&config.log_dir).wrap_err_with(|| {
        format!("Failed to create log directory {}", config.log_dir.display())
    })?;
    let appender = rolling::daily(&config.log_dir, config::LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init();
    Ok(guard)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = parse_cli_args()?;
    let app_config = AppConfig::resolve(cli)?;
    let _guard = init_tracing(&app_config)?;
    tracing::info!(
        entries = app_config.entries.len(),
        seed = ?app_config.seed,
        fps = app_config.fps,
        "starting prize-wheel"
    );
    client::run_app(app_config).await
}
