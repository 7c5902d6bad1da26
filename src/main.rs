mod cli;
mod config;
mod datasources;
mod error;
mod logic;
mod models;

use chrono::{DateTime, FixedOffset, Utc};
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use datasources::{NotificationSink, ResendClient, SupabaseClient, WillyWeatherClient};
use error::{Result, SwellCheckError};
use logic::geometry::{classify_wind, compass_to_degrees, degrees_to_compass, INVALID_BEARING};
use logic::{AlarmService, BeachRegistry, DecisionOrchestrator, EngineSettings, MessageContext};
use models::UserPreference;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(cli.verbose, cli.command.is_none());

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// One-shot commands stay quiet unless asked; the alarm loop logs each cycle.
fn init_logging(verbose: u8, alarm_loop: bool) {
    let default_level = match verbose {
        0 if alarm_loop => "info",
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Init) => {
            Config::setup_interactive()?;
            Ok(())
        }
        Some(Commands::Beaches) => {
            list_beaches(&load_registry(cli.config));
            Ok(())
        }
        Some(Commands::Classify {
            beach_id,
            direction,
        }) => classify(&load_registry(cli.config), beach_id, &direction),
        Some(Commands::Check { email, dry_run }) => {
            let config = load_config(cli.config);
            check_user(&config, &email, dry_run).await
        }
        Some(Commands::TestEmail { to }) => {
            let config = load_config(cli.config);
            send_test_email(&config, to).await
        }
        None => {
            let config = load_config(cli.config);
            run_alarm(&config).await
        }
    }
}

fn load_config(path: Option<PathBuf>) -> Config {
    match Config::load(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("Please copy config/config.yaml.example to config/config.yaml");
            std::process::exit(1);
        }
    }
}

/// Catalog commands work without credentials; a config is only consulted
/// for a beach catalog override.
fn load_registry(path: Option<PathBuf>) -> BeachRegistry {
    let catalog = match Config::load(path) {
        Ok(config) => config.beaches,
        Err(e) => {
            tracing::debug!("No usable config ({}), using built-in catalog", e);
            None
        }
    };

    match BeachRegistry::load(catalog.as_deref()) {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("Beach catalog error: {}", e);
            std::process::exit(1);
        }
    }
}

fn engine(config: &Config) -> Result<DecisionOrchestrator<WillyWeatherClient>> {
    let weather = WillyWeatherClient::new(config.willyweather.clone(), config.alarm.http_timeout())?;
    let registry = BeachRegistry::load(config.beaches.as_deref())?;
    tracing::debug!("Loaded {} beaches", registry.len());
    Ok(DecisionOrchestrator::new(
        weather,
        registry,
        EngineSettings::from(&config.alarm),
    ))
}

fn message_context(config: &Config) -> MessageContext {
    MessageContext {
        timezone_label: config.alarm.timezone_label.clone(),
        account_url: config.alarm.account_url.clone(),
    }
}

fn local_now(config: &Config) -> Result<DateTime<FixedOffset>> {
    Ok(Utc::now().with_timezone(&config.alarm.timezone()?))
}

async fn run_alarm(config: &Config) -> Result<()> {
    let timeout = config.alarm.http_timeout();
    let store = SupabaseClient::new(config.supabase.clone(), timeout)?;
    let sink = ResendClient::new(config.resend.clone(), timeout)?;
    let mut service = AlarmService::new(store, engine(config)?, sink, message_context(config));

    let interval = config.alarm.poll_interval();
    tracing::info!(
        "Smart surf alarm started, checking every {} minutes",
        config.alarm.poll_interval_minutes
    );

    loop {
        let now = local_now(config)?;
        tracing::info!(
            "Checking surf conditions at {} {}",
            now.format("%Y-%m-%d %H:%M:%S"),
            config.alarm.timezone_label
        );
        service.run_cycle(now).await;

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down");
                break;
            }
        }
    }

    Ok(())
}

async fn check_user(config: &Config, email: &str, dry_run: bool) -> Result<()> {
    let timeout = config.alarm.http_timeout();
    let store = SupabaseClient::new(config.supabase.clone(), timeout)?;
    let user = store.find_user_by_email(email).await?;
    print_preferences(&user);

    let now = local_now(config)?;
    let sink = ResendClient::new(config.resend.clone(), timeout)?;
    let mut service = AlarmService::new(store, engine(config)?, sink, message_context(config));

    let decision = service.engine().decide(&user, now).await?;
    println!("Decision: {}", decision);

    if !decision.is_sent() {
        return Ok(());
    }
    if dry_run {
        println!("Dry run, no alert sent");
    } else if service.deliver(&user, &decision, now).await {
        println!("Alert sent to {}", user.email);
    } else {
        return Err(SwellCheckError::DataSourceUnavailable(
            "Alert was not accepted for delivery".into(),
        ));
    }
    Ok(())
}

fn print_preferences(user: &UserPreference) {
    println!("User: {} <{}>", user.name, user.email);
    match user.beach_id {
        Some(id) => println!("  Beach: {} ({})", user.beach_name, id),
        None => println!("  Beach: not set"),
    }
    println!("  Swell: {}m - {}m", user.min_swell, user.max_swell);
    println!("  Tide: {}m - {}m", user.min_tide, user.max_tide);
    println!(
        "  Max wind: offshore {} / cross-shore {} / onshore {} km/h",
        user.offshore_max_wind, user.cross_shore_max_wind, user.onshore_max_wind
    );
    println!("  Hours: {}:00 - {}:00", user.start_hour, user.end_hour);
    if let Some(last) = user.last_alert_at {
        println!("  Last alert: {}", last.format("%Y-%m-%d %H:%M"));
    }
    println!();
}

async fn send_test_email(config: &Config, to: Option<String>) -> Result<()> {
    let to = to
        .or_else(|| std::env::var("TEST_EMAIL").ok())
        .ok_or_else(|| SwellCheckError::Config("Pass --to or set TEST_EMAIL".into()))?;

    let sink = ResendClient::new(config.resend.clone(), config.alarm.http_timeout())?;
    let now = local_now(config)?;
    let body = format!(
        "This is a test message from the surf alarm.\n\nSent: {} {}\n",
        now.format("%Y-%m-%d %H:%M:%S"),
        config.alarm.timezone_label
    );

    if !sink.send(&to, "🏄 Surf alarm test", &body).await {
        return Err(SwellCheckError::DataSourceUnavailable(
            "Test message was not accepted for delivery".into(),
        ));
    }
    println!("Test message sent to {}", to);
    Ok(())
}

fn list_beaches(registry: &BeachRegistry) {
    if registry.is_empty() {
        println!("Beach catalog is empty");
        return;
    }
    for beach in registry.iter() {
        println!("{:>6}  {} ({}, {})", beach.id, beach.name, beach.region, beach.state);
        println!("        offshore     {}", beach.offshore);
        println!(
            "        cross-shore  {}, {}",
            beach.cross_shore[0], beach.cross_shore[1]
        );
        if let Some(tide) = beach.tide {
            let (low, high) = tide.range();
            println!("        tide         {} ({}m - {}m)", tide.label(), low, high);
        }
    }
    println!();
    println!("{} beaches", registry.len());
}

fn classify(registry: &BeachRegistry, beach_id: u32, direction: &str) -> Result<()> {
    let beach = registry
        .get(beach_id)
        .ok_or_else(|| SwellCheckError::NotFound(format!("Beach {}", beach_id)))?;

    let degrees = match direction.trim().parse::<f64>() {
        Ok(d) if d.is_finite() => d.rem_euclid(360.0),
        _ => compass_to_degrees(direction),
    };
    if degrees == INVALID_BEARING {
        return Err(SwellCheckError::InvalidData(format!(
            "Unknown wind direction: {}",
            direction
        )));
    }

    let category = classify_wind(degrees, beach_id, registry);
    println!(
        "{}: {} ({}°) is {}",
        beach.name,
        degrees_to_compass(degrees),
        degrees,
        category.label()
    );
    Ok(())
}
