use anyhow::Context;
use clap::{Parser, Subcommand};

use hazard_core::{
    CityQuery, Config, HazardKind, HazardReport, Language, RiskPipeline,
    classifier::ArtifactStore,
    descriptor,
    provider::{self, ProviderId},
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "hazard", version, about = "City hazard risk assessment")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials for a specific weather provider.
    Configure {
        /// Provider short name, e.g. "openweather" or "weatherapi".
        provider: String,
    },

    /// Assess hazard risk for a city.
    Assess {
        /// City name, e.g. "Mumbai".
        city: String,

        /// Hazard to assess: flood, cyclone or heatwave.
        #[arg(long, default_value = "flood")]
        hazard: String,

        /// Display language: en or hi. Unknown codes fall back to en.
        #[arg(long, default_value = "en")]
        lang: String,

        /// Provider override; defaults to the configured provider.
        #[arg(long)]
        provider: Option<String>,

        /// Country code override for the city query, e.g. "IN".
        #[arg(long)]
        country: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { provider } => configure(&provider),
            Command::Assess { city, hazard, lang, provider, country } => {
                assess(city, &hazard, &lang, provider.as_deref(), country).await
            }
        }
    }
}

fn configure(provider: &str) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;
    let mut config = Config::load()?;

    let api_key = inquire::Password::new(&format!("API key for {id}:"))
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    config.upsert_provider_api_key(id, api_key);
    config.save()?;

    println!("Saved credentials for provider '{id}'.");
    Ok(())
}

async fn assess(
    city: String,
    hazard: &str,
    lang: &str,
    provider_override: Option<&str>,
    country: Option<String>,
) -> anyhow::Result<()> {
    let hazard = HazardKind::try_from(hazard)?;
    let language = Language::parse_or_default(lang);
    let config = Config::load()?;

    let provider = match provider_override {
        Some(id) => provider::provider_from_config(ProviderId::try_from(id)?, &config)?,
        None => provider::default_provider_from_config(&config)?,
    };

    let artifacts_dir = config.resolve_artifacts_dir()?;
    let artifacts = ArtifactStore::load(&artifacts_dir, &[hazard]).with_context(|| {
        format!(
            "Cannot serve {hazard} predictions without its model/scaler pair in {}",
            artifacts_dir.display()
        )
    })?;

    let country = country.or_else(|| Some(config.country_code().to_string()));
    let query = CityQuery::new(city, country);

    let pipeline = RiskPipeline::new(provider, artifacts);

    match pipeline.assess(&query, hazard, language).await? {
        Some(report) => print_report(&report, language),
        None => {
            println!("Could not fetch weather data for '{}'.", query.city);
            println!("Please check the city name and try again.");
        }
    }

    Ok(())
}

fn print_report(report: &HazardReport, language: Language) {
    let obs = &report.observation;
    let a = &report.assessment;

    println!("Current weather in {} (via {}):", obs.city, obs.provider);
    println!("  {:<12} {:.1} °C", "Temperature", obs.temperature_c);
    println!("  {:<12} {:.0} %", "Humidity", obs.humidity_pct);
    println!("  {:<12} {:.0} hPa", "Pressure", obs.pressure_hpa);
    println!("  {:<12} {:.1} km/h", "Wind", obs.wind_speed_kmh);
    println!("  {:<12} {:.1} mm", "Rain (1h)", obs.rainfall_1h_mm);
    println!("  {:<12} {}", "Conditions", obs.description);
    println!("  {:<12} {}", "Observed", obs.observation_time.format("%Y-%m-%d %H:%M UTC"));
    println!();

    println!("{} {} — {}", a.emoji, a.label, a.title);
    println!("{}", a.message);
    println!("Confidence: {:.0}%", a.confidence * 100.0);
    println!();

    println!("Risk distribution:");
    for (name, p) in descriptor::class_labels(language).iter().zip(a.probabilities.iter()) {
        println!("  {:<12} {:>5.1} %", name, p * 100.0);
    }
    println!();

    println!("Recommended actions:");
    for action in &a.actions {
        println!("  - {action}");
    }

    if let Some(resources) = report.resources {
        println!();
        println!("Local emergency resources:");
        for hospital in resources.hospitals {
            println!("  {hospital}");
        }
        for shelter in resources.shelters {
            println!("  {shelter}");
        }
    }
}
