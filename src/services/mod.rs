// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod activity;
pub mod backfill;
pub mod oauth;
pub mod strava;
pub mod weather;

pub use activity::{ActivityIngester, IngestReport};
pub use backfill::{BackfillReport, TemperatureBackfill};
pub use oauth::{AuthorizationRedirect, StravaOAuthClient, TokenExchangeResponse};
pub use strava::StravaClient;
pub use weather::{MatchMode, WeatherClient, WeatherSource};
