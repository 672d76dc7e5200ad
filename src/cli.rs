// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Command-line interface and the per-subcommand drivers.
//!
//! Every driver loads the configuration it needs first, so a missing variable
//! is reported before any network or database call. Store-backed drivers
//! hold one connection for the duration of the command and release it on
//! both success and failure.

use crate::config::{Config, OAuthConfig};
use crate::db::PostgresDb;
use crate::services::activity::DEFAULT_PER_PAGE;
use crate::services::{
    ActivityIngester, AuthorizationRedirect, BackfillReport, IngestReport, MatchMode,
    StravaClient, StravaOAuthClient, TemperatureBackfill, TokenExchangeResponse, WeatherClient,
};
use crate::time_utils::format_utc_rfc3339;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "activity-pipeline",
    version,
    about = "Load Strava activities into PostgreSQL and backfill outdoor temperatures"
)]
pub struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the activities table and add the outdoor_temp column if absent
    Migrate,

    /// Run the Strava OAuth flow and print an access token
    Token,

    /// Fetch all activities from Strava and store them
    Load {
        /// Strava access token (see the `token` subcommand)
        access_token: String,

        /// Replace activities that are already stored
        #[arg(long)]
        update_existing: bool,

        /// Activities requested per page
        #[arg(long, default_value_t = DEFAULT_PER_PAGE)]
        per_page: u32,
    },

    /// Fill in outdoor_temp for stored activities from Open-Meteo
    BackfillTemps {
        /// How hourly samples are matched: hour-of-day or timestamp
        #[arg(long, default_value = "hour-of-day")]
        match_mode: MatchMode,
    },
}

/// Run the parsed command.
pub async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Migrate => migrate(&Config::from_env()?).await,
        Command::Token => token(OAuthConfig::from_env()?).await,
        Command::Load {
            access_token,
            update_existing,
            per_page,
        } => {
            let config = Config::from_env()?;
            let report = load(&config, &access_token, update_existing, per_page).await?;
            tracing::info!(
                pages = report.pages,
                fetched = report.fetched,
                inserted = report.inserted,
                replaced = report.replaced,
                skipped = report.skipped,
                failed = report.failed,
                "Activity load finished"
            );
            Ok(())
        }
        Command::BackfillTemps { match_mode } => {
            let config = Config::from_env()?;
            let report = backfill_temps(&config, match_mode).await?;
            tracing::info!(
                candidates = report.candidates,
                updated = report.updated,
                skipped = report.skipped,
                no_data = report.no_data,
                failed = report.failed,
                "Outdoor temperature backfill finished"
            );
            Ok(())
        }
    }
}

/// Apply the schema migration.
pub async fn migrate(config: &Config) -> anyhow::Result<()> {
    let db = PostgresDb::connect(&config.database_url).await?;
    let result = db.migrate().await;
    db.close().await;

    match result {
        Ok(()) => {
            tracing::info!("Column 'outdoor_temp' is present on the activities table");
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, "Error adding outdoor_temp column");
            Err(e.into())
        }
    }
}

/// Ingest activities with the given access token.
pub async fn load(
    config: &Config,
    access_token: &str,
    update_existing: bool,
    per_page: u32,
) -> anyhow::Result<IngestReport> {
    let db = PostgresDb::connect(&config.database_url).await?;

    let ingester = ActivityIngester::new(StravaClient::new(&config.strava_api_url), db.clone())
        .update_existing(update_existing)
        .per_page(per_page);
    let result = ingester.run(access_token).await;
    db.close().await;

    result.map_err(|e| {
        if e.is_strava_token_error() {
            tracing::error!("Strava rejected the access token; run the `token` subcommand");
        }
        e.into()
    })
}

/// Backfill outdoor temperatures.
pub async fn backfill_temps(
    config: &Config,
    match_mode: MatchMode,
) -> anyhow::Result<BackfillReport> {
    let db = PostgresDb::connect(&config.database_url).await?;

    let weather = WeatherClient::new(&config.weather_archive_url, &config.weather_forecast_url);
    let backfill = TemperatureBackfill::new(weather, db.clone()).match_mode(match_mode);
    let result = backfill.run(chrono::Utc::now()).await;
    db.close().await;

    result.map_err(|e| {
        tracing::error!(error = %e, "Error fetching activities");
        e.into()
    })
}

/// Interactive OAuth flow.
pub async fn token(config: OAuthConfig) -> anyhow::Result<()> {
    let client = StravaOAuthClient::new(config);

    println!("Go to URL {} and authorize application", client.authorize_url());
    println!(
        "Once you have authorized, you will be redirected to a 'localhost' address \
         (don't worry if you see a 'This site can't be reached' message)"
    );

    let pasted: String = dialoguer::Input::new()
        .with_prompt("Copy the whole URL of the page from the browser and paste it here")
        .interact_text()?;

    let tokens = exchange_redirect(&client, &pasted).await?;

    println!("Successfully retrieved access token: {}", tokens.access_token);
    println!("Refresh token: {}", tokens.refresh_token);
    if let Some(expires_at) = chrono::DateTime::from_timestamp(tokens.expires_at, 0) {
        println!("Access token expires at {}", format_utc_rfc3339(expires_at));
    }
    Ok(())
}

/// Parse the pasted redirect URL and exchange its code for tokens.
pub async fn exchange_redirect(
    client: &StravaOAuthClient,
    pasted: &str,
) -> crate::error::Result<TokenExchangeResponse> {
    let redirect = AuthorizationRedirect::parse(pasted)?;

    if !redirect.grants_read_all() {
        tracing::warn!(
            scope = redirect.scope.as_deref().unwrap_or_default(),
            "activity:read_all was not granted; private activities will not be loaded"
        );
    }

    let tokens = client.exchange_code(&redirect.code).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to obtain access token");
        e
    })?;

    if let Some(athlete) = &tokens.athlete {
        tracing::info!(athlete_id = athlete.id, "Access token issued");
    }
    Ok(tokens)
}
