// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Activity-Pipeline: personal Strava activity store
//!
//! This crate pulls activities from the Strava API into PostgreSQL and
//! backfills each activity's outdoor temperature from Open-Meteo.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod time_utils;
