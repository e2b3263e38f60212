//! Betax CLI
//!
//! Command-line front end over the Betax client core: live map polling,
//! bus search and enrollment, trip history and the driver duty toggle.

#![allow(clippy::print_stdout)]

mod render;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use application::{
    AccountService, DestinationPicker, DriverPort, DriverSession, DutyStatus, HistoryService,
    MapScreen, PermissionStatus, PickerState, PositionPoller, SessionContext, SignUpForm,
};
use chrono::Utc;
use clap::{Parser, Subcommand};
use domain::{GeoLocation, HistoryFilter, Region, SessionUser};
use infrastructure::{AppConfig, BetaxAdapter, ReplayLocationProvider, init_logging};
use tracing::debug;

/// Betax CLI
#[derive(Parser)]
#[command(name = "betax-cli")]
#[command(author, version, about = "Betax bus tracking client", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file (default: ./betax.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Account email
    #[arg(long, env = "BETAX_EMAIL", global = true)]
    email: Option<String>,

    /// Account password
    #[arg(long, env = "BETAX_PASSWORD", hide_env_values = true, global = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and show the account
    Login,

    /// Create a passenger account with --email and --password
    Signup {
        /// Full name
        #[arg(long)]
        name: String,

        /// Password confirmation
        #[arg(long)]
        confirm_password: String,

        /// Home latitude (defaults to 0 with the longitude)
        #[arg(long, allow_hyphen_values = true, requires = "longitude")]
        latitude: Option<f64>,

        /// Home longitude
        #[arg(long, allow_hyphen_values = true, requires = "latitude")]
        longitude: Option<f64>,
    },

    /// Poll nearby buses and stops
    ///
    /// Example: betax-cli map --ticks 3 --latitude -21.452 --longitude 47.09 --select bus-0
    Map {
        /// Number of snapshots to print
        #[arg(long, default_value_t = 1)]
        ticks: u32,

        /// Move the map to this latitude first
        #[arg(long, allow_hyphen_values = true, requires = "longitude")]
        latitude: Option<f64>,

        /// Move the map to this longitude first
        #[arg(long, allow_hyphen_values = true, requires = "latitude")]
        longitude: Option<f64>,

        /// Tap this marker after the last snapshot (e.g. bus-0, arret-2)
        #[arg(long)]
        select: Option<String>,
    },

    /// Find buses serving two stops, optionally enrolling on one
    Search {
        /// Departure stop
        origin: String,

        /// Arrival stop
        destination: String,

        /// Enroll on the result at this position (starting at 1)
        #[arg(long)]
        choose: Option<usize>,

        /// Retry once if the enrollment fails
        #[arg(long, requires = "choose")]
        retry: bool,
    },

    /// Show past trips
    History {
        /// Keep trips whose route or plate contains this text
        #[arg(long, default_value = "")]
        search: String,

        /// Period: all, week or month
        #[arg(long, default_value = "all")]
        filter: HistoryFilter,
    },

    /// Go on duty and forward a recorded track
    ///
    /// Track lines are `latitude,longitude[,seconds]`.
    Drive {
        /// Track file to replay
        #[arg(long)]
        fixes: PathBuf,

        /// Refuse the location permission
        #[arg(long)]
        deny_permission: bool,
    },

    /// Show the bus assigned to the signed-in driver
    Bus,
}

/// Determine log filter level from verbosity count
const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Convert a 1-based result position to an index
fn result_index(position: usize) -> anyhow::Result<usize> {
    position
        .checked_sub(1)
        .context("result positions start at 1")
}

/// Shared wiring for every command
struct App {
    config: AppConfig,
    adapter: Arc<BetaxAdapter>,
    session: SessionContext,
    accounts: AccountService,
}

impl App {
    fn new(config: AppConfig) -> anyhow::Result<Self> {
        let adapter = Arc::new(BetaxAdapter::from_config(&config.backend)?);
        let session = SessionContext::new();
        let accounts = AccountService::new(adapter.clone(), session.clone());
        Ok(Self {
            config,
            adapter,
            session,
            accounts,
        })
    }

    async fn sign_in(
        &self,
        email: Option<&str>,
        password: Option<&str>,
    ) -> anyhow::Result<SessionUser> {
        let (Some(email), Some(password)) = (email, password) else {
            bail!("--email and --password (or BETAX_EMAIL / BETAX_PASSWORD) are required");
        };
        let user = self
            .accounts
            .login(email, password)
            .await
            .context("Connexion impossible")?;
        Ok(user)
    }
}

#[tokio::main]
#[allow(clippy::too_many_lines)]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_from(cli.config.as_deref())?;
    if cli.verbose > 0 {
        config.logging.filter = log_filter_from_verbosity(cli.verbose).to_string();
    }
    init_logging(&config.logging)?;
    config.validate()?;
    debug!(base_url = %config.backend.base_url, "Configuration loaded");

    let app = App::new(config)?;
    let email = cli.email.as_deref();
    let password = cli.password.as_deref();

    match cli.command {
        Commands::Login => {
            let user = app.sign_in(email, password).await?;
            println!("✅ {}", user.greeting());
            println!("   Id: {}", user.id);
            println!("   Email: {}", user.email);
        },

        Commands::Signup {
            name,
            confirm_password,
            latitude,
            longitude,
        } => {
            let form = SignUpForm {
                full_name: name,
                email: email.unwrap_or_default().to_string(),
                password: password.unwrap_or_default().to_string(),
                confirm_password,
            };
            let location = match (latitude, longitude) {
                (Some(lat), Some(lon)) => Some(GeoLocation::new(lat, lon)?),
                _ => None,
            };

            match app.accounts.sign_up(&form, location).await {
                Ok(()) => println!("✅ Compte créé pour {}", form.email),
                Err(e) => {
                    println!("❌ {e}");
                    std::process::exit(1);
                },
            }
        },

        Commands::Map {
            ticks,
            latitude,
            longitude,
            select,
        } => {
            let picker = DestinationPicker::new(app.adapter.clone(), app.session.clone());
            let mut screen = MapScreen::new(&app.config.map, picker);

            if let (Some(lat), Some(lon)) = (latitude, longitude) {
                let current = screen.viewport().current();
                let candidate =
                    Region::new(lat, lon, current.latitude_span, current.longitude_span);
                if screen.handle_region_change(candidate) != candidate {
                    println!("⚠️  Position hors de la zone desservie, carte inchangée");
                }
            }

            let poller = PositionPoller::new(app.adapter.clone());
            let handle = poller.spawn(
                app.config.map.poll_interval(),
                app.config.map.radius_km,
                screen.region_updates(),
            );
            let mut snapshots = handle.subscribe();

            for tick in 1..=ticks {
                snapshots
                    .changed()
                    .await
                    .context("position polling stopped")?;
                let snapshot = snapshots.borrow_and_update().clone();
                screen.apply_snapshot(&snapshot);

                println!(
                    "🗺️  #{tick} {} bus, {} arrêts",
                    snapshot.vehicles.len(),
                    snapshot.stops.len()
                );
                if screen.is_degraded() {
                    println!("⚠️  Positions indisponibles");
                }
                for marker in screen.markers() {
                    println!("   {}", render::marker_line(marker));
                }
            }
            handle.stop();

            if let Some(key) = select {
                if screen.handle_marker_tap(&key).is_some() {
                    for line in screen.selection().info_lines() {
                        println!("   {line}");
                    }
                } else {
                    println!("❌ Aucun marqueur {key}");
                }
            }
        },

        Commands::Search {
            origin,
            destination,
            choose,
            retry,
        } => {
            app.sign_in(email, password).await?;
            let mut picker = DestinationPicker::new(app.adapter.clone(), app.session.clone());

            picker.search(&origin, &destination).await;
            for line in render::picker_lines(picker.state()) {
                println!("   {line}");
            }

            if let Some(position) = choose {
                if !matches!(picker.state(), PickerState::Results(_)) {
                    bail!("no bus to choose from");
                }
                picker.choose(result_index(position)?).await?;

                let can_retry = matches!(
                    picker.state(),
                    PickerState::EnrollFailed {
                        retry_available: true,
                        ..
                    }
                );
                if retry && can_retry {
                    picker.retry_enroll().await?;
                }
                for line in render::picker_lines(picker.state()) {
                    println!("   {line}");
                }
            }

            if let Some(notice) = picker.notice() {
                println!("💬 {}", notice.message);
            }
        },

        Commands::History { search, filter } => {
            app.sign_in(email, password).await?;
            let history = HistoryService::new(
                app.adapter.clone(),
                app.session.clone(),
                app.config.history.timezone.tz(),
            );

            let records = history.load().await?;
            let shown = history.filter(&records, &search, filter, Utc::now());

            println!("📜 {filter}: {} / {} trajets", shown.len(), records.len());
            for record in shown {
                println!("   {}", render::trip_line(record, history.timezone()));
            }
        },

        Commands::Drive {
            fixes,
            deny_permission,
        } => {
            let user = app.sign_in(email, password).await?;
            let mut track = ReplayLocationProvider::from_file(&fixes).await?;
            if deny_permission {
                track = track.with_permission(PermissionStatus::Denied);
            }
            let replay_length = track.duration();

            let mut driver = DriverSession::new(
                Arc::new(track),
                app.adapter.clone(),
                app.session.clone(),
                app.config.driver.watch_options(),
            );

            println!("👋 {}", user.greeting());
            if let Some(bus) = driver.assigned_bus().await? {
                for line in render::assigned_bus_lines(&bus) {
                    println!("   {line}");
                }
            }

            let DutyStatus::OnDuty { started_at } = driver.toggle().await? else {
                println!("⚠️  Permission de localisation refusée, hors service");
                return Ok(());
            };
            let tz = app.config.history.timezone.tz();
            println!("🟢 En service depuis {}", render::shift_start(started_at, tz));

            tokio::select! {
                () = tokio::time::sleep(replay_length + Duration::from_secs(1)) => {},
                _ = tokio::signal::ctrl_c() => {},
            }

            driver.toggle().await?;
            println!("🔴 Hors service");
        },

        Commands::Bus => {
            let user = app.sign_in(email, password).await?;
            match app.adapter.assigned_bus(user.id).await? {
                Some(bus) => {
                    for line in render::assigned_bus_lines(&bus) {
                        println!("{line}");
                    }
                },
                None => println!("Aucun bus assigné"),
            }
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_filter_verbosity_zero() {
        assert_eq!(log_filter_from_verbosity(0), "warn");
    }

    #[test]
    fn log_filter_verbosity_one() {
        assert_eq!(log_filter_from_verbosity(1), "info");
    }

    #[test]
    fn log_filter_verbosity_two() {
        assert_eq!(log_filter_from_verbosity(2), "debug");
    }

    #[test]
    fn log_filter_verbosity_three_or_more() {
        assert_eq!(log_filter_from_verbosity(3), "trace");
        assert_eq!(log_filter_from_verbosity(10), "trace");
    }

    #[test]
    fn result_index_is_one_based() {
        assert_eq!(result_index(1).unwrap(), 0);
        assert!(result_index(0).is_err());
    }

    #[test]
    fn cli_parses_search_with_choice() {
        let cli = Cli::try_parse_from([
            "betax-cli",
            "--email",
            "rasoa@betax.mg",
            "search",
            "Anosy Gare",
            "Ankofafa",
            "--choose",
            "2",
            "--retry",
        ])
        .unwrap();
        assert_eq!(cli.email.as_deref(), Some("rasoa@betax.mg"));
        assert!(matches!(
            cli.command,
            Commands::Search {
                choose: Some(2),
                retry: true,
                ..
            }
        ));
    }

    #[test]
    fn cli_parses_history_filter() {
        let cli = Cli::try_parse_from(["betax-cli", "history", "--filter", "week"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::History {
                filter: HistoryFilter::ThisWeek,
                ..
            }
        ));
        assert!(Cli::try_parse_from(["betax-cli", "history", "--filter", "year"]).is_err());
    }

    #[test]
    fn cli_accepts_negative_latitude() {
        let cli = Cli::try_parse_from([
            "betax-cli",
            "-vv",
            "map",
            "--latitude",
            "-21.452",
            "--longitude",
            "47.09",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(
            cli.command,
            Commands::Map {
                latitude: Some(lat),
                ticks: 1,
                ..
            } if (lat + 21.452).abs() < f64::EPSILON
        ));
    }

    #[test]
    fn cli_requires_both_coordinates() {
        assert!(Cli::try_parse_from(["betax-cli", "map", "--latitude", "-21.45"]).is_err());
    }
}
