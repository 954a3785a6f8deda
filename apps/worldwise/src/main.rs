use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use chrono::{SecondsFormat, Utc};
use clap::{Parser, Subcommand};
use client_core::{AuthGate, CitiesManager, HttpCityStore, ProviderScope};
use shared::domain::{format_visit_date, City, CityId, CountrySummary, NewCity, Position};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;

use config::load_settings;

const EMPTY_LIST_HINT: &str = "Add your first city by clicking on a city on the map";

#[derive(Parser, Debug)]
#[command(name = "worldwise", about = "Keep track of the cities you have visited")]
struct Cli {
    /// Overrides the configured city store url.
    #[arg(long)]
    store_url: Option<String>,
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List visited cities.
    List,
    /// List visited countries.
    Countries,
    /// Show one city.
    Show { id: CityId },
    /// Record a new visit.
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        country: String,
        #[arg(long, default_value = "")]
        emoji: String,
        /// RFC 3339 visit date; defaults to now.
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
    },
    /// Delete a city.
    Remove { id: CityId },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings();
    if let Some(store_url) = cli.store_url.clone() {
        settings.store_url = store_url;
    }

    let gate = Arc::new(AuthGate::default());
    if !gate.login(&cli.email, &cli.password) {
        let message = gate.snapshot().error_message.unwrap_or_default();
        bail!(message);
    }
    let user = gate.require_user()?;
    info!(user = %user.name, store_url = %settings.store_url, "starting session");

    let store = HttpCityStore::with_timeout(&settings.store_url, settings.request_timeout)?;
    let manager = CitiesManager::mount(Arc::new(store), settings.delete_policy).await;
    let scope = ProviderScope::new().with_auth(gate).with_cities(manager);

    run(cli.command, &scope).await
}

async fn run(command: Command, scope: &ProviderScope) -> Result<()> {
    scope.auth()?.require_user()?;
    let cities = scope.cities()?;

    match command {
        Command::List => {
            check(&cities)?;
            println!("{}", render_cities(&cities.cities()));
        }
        Command::Countries => {
            check(&cities)?;
            println!("{}", render_countries(&cities.countries()));
        }
        Command::Show { id } => {
            cities.get(id).await;
            check(&cities)?;
            let city = cities
                .current_city()
                .ok_or_else(|| anyhow!("city {id} is not available"))?;
            println!("{}", render_city(&city));
        }
        Command::Add {
            name,
            country,
            emoji,
            date,
            notes,
            lat,
            lng,
        } => {
            let draft = NewCity {
                city_name: name,
                country,
                emoji,
                date: date
                    .unwrap_or_else(|| Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
                notes: notes.filter(|notes| !notes.trim().is_empty()),
                position: Position { lat, lng },
            };
            draft.validate()?;
            cities.create(draft).await;
            check(&cities)?;
            if let Some(city) = cities.current_city() {
                println!("{}", render_city(&city));
            }
        }
        Command::Remove { id } => {
            cities.delete(id).await;
            check(&cities)?;
            println!("{}", render_cities(&cities.cities()));
        }
    }
    Ok(())
}

/// Surfaces the manager's failure message as the command's error.
fn check(cities: &CitiesManager) -> Result<()> {
    match cities.error() {
        Some(message) => Err(anyhow!(message)),
        None => Ok(()),
    }
}

fn render_cities(cities: &[City]) -> String {
    if cities.is_empty() {
        return EMPTY_LIST_HINT.to_string();
    }
    cities
        .iter()
        .map(|city| {
            format!(
                "{} {} ({}) #{}",
                city.emoji,
                city.city_name,
                format_visit_date(&city.date),
                city.id
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_countries(countries: &[CountrySummary]) -> String {
    if countries.is_empty() {
        return EMPTY_LIST_HINT.to_string();
    }
    countries
        .iter()
        .map(|country| format!("{} {}", country.emoji, country.country))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_city(city: &City) -> String {
    let mut lines = vec![
        format!("City name: {} {}", city.emoji, city.city_name),
        format!(
            "You went to {} on {}",
            city.city_name,
            format_visit_date(&city.date)
        ),
    ];
    if let Some(notes) = city.notes.as_deref().filter(|notes| !notes.is_empty()) {
        lines.push(format!("Your notes: {notes}"));
    }
    lines.push(format!(
        "Position: {}, {} (https://en.wikipedia.org/wiki/{})",
        city.position.lat, city.position.lng, city.city_name
    ));
    lines.join("\n")
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
