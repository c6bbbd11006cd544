use std::fmt::Write as _;

use weather_core::{Candidate, SearchState, StateObserver, WeatherReading};

/// Prints progress lines to stderr as the workflow moves between states.
#[derive(Debug, Default)]
pub struct ProgressRenderer;

impl StateObserver for ProgressRenderer {
    fn on_transition(&self, _generation: u64, state: &SearchState) {
        match state {
            SearchState::Searching { query } => eprintln!("Searching for {query}..."),
            SearchState::Fetching { candidate } => {
                eprintln!("Fetching weather for {}...", candidate.label())
            }
            _ => {}
        }
    }
}

/// Print a settled state: the reading on stdout, a failure on stderr.
pub fn print_state(state: &SearchState) {
    match state {
        SearchState::Ready(reading) => println!("{}", format_reading(reading)),
        SearchState::Failed(err) => eprintln!("{err}"),
        SearchState::AwaitingSelection { .. } => eprintln!("No location selected."),
        _ => {}
    }
}

pub fn candidate_option(candidate: &Candidate) -> String {
    format!(
        "{} ({:.2}, {:.2})",
        candidate.label(),
        candidate.latitude,
        candidate.longitude
    )
}

pub fn format_reading(r: &WeatherReading) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", r.location_label);
    let _ = writeln!(out, "  Coordinates: lat {:.2}, lon {:.2}", r.latitude, r.longitude);
    let _ = writeln!(out, "  Temperature: {:.1}°C", r.temperature_c);
    let _ = writeln!(
        out,
        "  Wind:        {:.1} m/s from {} ({:.0}°)",
        r.wind_speed_mps,
        compass_point(r.wind_direction_deg),
        r.wind_direction_deg
    );
    if let Some(h) = r.humidity_pct {
        let _ = writeln!(out, "  Humidity:    {h}%");
    }
    if let Some(d) = &r.description {
        let _ = writeln!(out, "  Conditions:  {d}");
    }
    if let Some(icon) = &r.icon {
        let _ = writeln!(out, "  Icon:        {}", icon_url(icon));
    }
    let _ = write!(
        out,
        "  Observed:    {} (via {})",
        r.observation_time.format("%Y-%m-%d %H:%M UTC"),
        r.provider
    );

    out
}

/// Sixteen-point compass name for a bearing in degrees.
pub fn compass_point(deg: f64) -> &'static str {
    const POINTS: [&str; 16] = [
        "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
        "NNW",
    ];
    let idx = ((deg.rem_euclid(360.0) / 22.5).round() as usize) % POINTS.len();
    POINTS[idx]
}

/// Providers report icons as bare OpenWeather codes ("04d") or protocol-relative URLs.
pub fn icon_url(icon: &str) -> String {
    if icon.starts_with("http://") || icon.starts_with("https://") {
        icon.to_string()
    } else if let Some(rest) = icon.strip_prefix("//") {
        format!("https://{rest}")
    } else {
        format!("https://openweathermap.org/img/wn/{icon}@2x.png")
    }
}
