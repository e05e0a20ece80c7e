use clap::Parser;
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

use urania::calendars::CalendarKind;
use urania::ephemeris::{AnalyticEphemeris, CelestialPositionProvider};
use urania::gazetteer::{self, Gazetteer, DEFAULT_MIN_POPULATION};
use urania::zodiac::degree_in_sign;
use urania::{ChartEngine, ChartRequest, ChartResult, NearestCityTimezones};
use urania_config::{load_settings, ProviderKind, UraniaSettings};

#[derive(Parser, Debug)]
#[command(author, version, about = "Compute a birth chart")]
struct Args {
    #[arg(help = "Birth date as DD/MM/YYYY")]
    date: String,

    #[arg(help = "Hour on the 12-hour clock (1-12)")]
    hour: String,

    #[arg(help = "Minute (0-59)")]
    minute: String,

    #[arg(help = "AM or PM")]
    meridiem: String,

    #[arg(help = "City name (quote names with spaces)")]
    city: String,

    #[arg(help = "Country name or ISO code")]
    country: String,

    #[arg(long, help = "Path to urania.toml")]
    config: Option<PathBuf>,

    #[arg(long, help = "Print the chart as JSON")]
    json: bool,

    #[arg(long, help = "Ephemeris provider: analytic or swiss")]
    provider: Option<ProviderKind>,
}

fn build_gazetteer(settings: &UraniaSettings) -> anyhow::Result<Arc<Gazetteer>> {
    let min_population = settings.gazetteer.min_population;
    Ok(match &settings.gazetteer.path {
        Some(path) => Arc::new(Gazetteer::load(path, min_population)?),
        None if min_population == DEFAULT_MIN_POPULATION => gazetteer::shared(),
        None => Arc::new(Gazetteer::embedded(min_population)?),
    })
}

#[cfg(feature = "swisseph")]
fn swiss_provider(settings: &UraniaSettings) -> anyhow::Result<Arc<dyn CelestialPositionProvider>> {
    Ok(Arc::new(urania::SwissEphemerisAdapter::with_house_system(
        settings.ephemeris.path.clone(),
        &settings.ephemeris.house_system,
    )?))
}

#[cfg(not(feature = "swisseph"))]
fn swiss_provider(_settings: &UraniaSettings) -> anyhow::Result<Arc<dyn CelestialPositionProvider>> {
    anyhow::bail!("natal was built without the swisseph feature")
}

fn build_engine(settings: &UraniaSettings) -> anyhow::Result<ChartEngine> {
    let gazetteer = build_gazetteer(settings)?;
    let timezones = Arc::new(NearestCityTimezones::new(
        Arc::clone(&gazetteer),
        settings.gazetteer.timezone_max_distance_km,
    ));
    let provider: Arc<dyn CelestialPositionProvider> = match settings.ephemeris.provider {
        ProviderKind::Analytic => Arc::new(AnalyticEphemeris::new()),
        ProviderKind::Swiss => swiss_provider(settings)?,
    };
    info!(
        "Using {} ephemeris, {:?} local time policy",
        provider.name(),
        settings.time_policy
    );
    Ok(ChartEngine::new(gazetteer, timezones, provider, settings.time_policy))
}

fn print_chart(chart: &ChartResult) {
    let loc = &chart.location;
    let moment = &chart.birth_moment;
    let zodiac = &chart.zodiac;
    let pos = &chart.positions;

    println!(
        "Location:   {}, {} ({:.4}, {:.4})",
        loc.matched_name, loc.country_code, loc.latitude, loc.longitude
    );
    println!("Timezone:   {}", loc.timezone_id);
    println!(
        "Gregorian:  {:02}/{:02}/{}",
        moment.day, moment.month, moment.year
    );
    println!(
        "Time:       {} -> {:02}:{:02} ({:?})",
        chart.clock_time, moment.hour, moment.minute, chart.local_time_resolution
    );
    println!("UTC:        {}", chart.utc.format("%Y-%m-%d %H:%M"));
    println!("Julian Day: {:.5}", chart.julian_day.value());
    println!();
    println!(
        "Sun sign:   {} ({}, ruled by {})",
        zodiac.sun_sign,
        zodiac.sun_sign.element(),
        zodiac.sun_sign.ruler()
    );
    println!(
        "Moon:       {} {:.2}°",
        zodiac.moon_sign,
        degree_in_sign(pos.moon_longitude)
    );
    println!(
        "Ascendant:  {} {:.2}°",
        zodiac.ascendant_sign,
        degree_in_sign(pos.ascendant_longitude)
    );
    println!("Chinese:    {}", zodiac.chinese_animal);
    println!();
    for kind in CalendarKind::ALL {
        let date = chart.calendars.get(kind);
        println!(
            "{:<12}{} ({})",
            format!("{kind:?}:"),
            date,
            kind.month_name(&date)
        );
    }
    println!("Buddhist:   {}", chart.calendars.buddhist_year);
    println!("Japanese:   {}", chart.calendars.japanese_era);
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(provider) = args.provider {
        settings.ephemeris.provider = provider;
    }
    let engine = build_engine(&settings)?;

    let chart = ChartRequest::parse(
        &args.date,
        &args.hour,
        &args.minute,
        &args.meridiem,
        &args.city,
        &args.country,
    )
    .and_then(|request| engine.compute_chart(&request))
    .map_err(|e| anyhow::anyhow!("{:?} field: {e}", e.field()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&chart)?);
    } else {
        print_chart(&chart);
    }
    Ok(())
}
