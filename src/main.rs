use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use weathercheck::models::icon_class;
use weathercheck::{WeatherCheckConfig, WeatherService, logging, web};

#[derive(Parser)]
#[command(name = "weathercheck")]
#[command(author, version, about = "Current weather and five-day forecasts by location name")]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true, env = "WEATHERCHECK_CONFIG")]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Print the current weather for a location
    Current { location: String },
    /// Print the five-day forecast for a location
    Forecast { location: String },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = WeatherCheckConfig::load_from_path(cli.config)?;
    logging::init(&config.logging, cli.verbose)?;

    let service = WeatherService::from_config(&config)?;

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            let provider_timeout = Duration::from_secs(config.weather.timeout_seconds.into());
            web::run(
                &host,
                port,
                Arc::new(service),
                web::request_timeout(provider_timeout),
            )
            .await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Current { location } => match service.current_weather(&location).await {
            Some(current) => {
                println!("Weather in {}", current.location);
                println!("  {} ({})", current.description, icon_class(current.id));
                println!("  Temperature: {}", current.format_temperature());
                println!("  Humidity:    {}%", current.humidity);
                println!("  Wind:        {:.1} m/s", current.wind_speed);
                Ok(ExitCode::SUCCESS)
            }
            None => {
                eprintln!("No weather data available for '{location}'");
                Ok(ExitCode::FAILURE)
            }
        },
        Commands::Forecast { location } => {
            let forecast = service.forecast(&location).await;
            if forecast.is_empty() {
                eprintln!("No forecast available for '{location}'");
                return Ok(ExitCode::FAILURE);
            }

            println!("Forecast for {}", forecast[0].location);
            for day in &forecast {
                println!(
                    "  {}  {:>5}  {:>3}%  {:>5.1} m/s  {}",
                    day.day,
                    day.format_temperature(),
                    day.humidity,
                    day.wind_speed,
                    day.description
                );
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
