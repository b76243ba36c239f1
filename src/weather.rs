//! Daily weather readings, the seasonal weather simulator, forecasts, and
//! alert classification.

use std::f64::consts::PI;

use chrono::{Datelike, NaiveDate};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::rng::RngExt;

pub const DEFAULT_TEMPERATURE: f64 = 20.0;
pub const DEFAULT_PRECIPITATION: f64 = 0.0;
pub const DEFAULT_HUMIDITY: f64 = 50.0;

/// Days covered by a simulated forecast.
pub const FORECAST_DAYS: usize = 30;
/// Forecast days scanned for upcoming extremes.
pub const FORECAST_ALERT_DAYS: usize = 3;

/// One day of weather. Missing core readings fall back to 20 °C, 0 mm and
/// 50 % humidity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherData {
    pub temperature: Option<f64>,
    pub precipitation: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub temperature_min: Option<f64>,
    pub temperature_max: Option<f64>,
    /// Set when the values are simulated or placeholders rather than observed.
    pub is_placeholder: bool,
}

impl WeatherData {
    pub fn new(temperature: f64, precipitation: f64, humidity: f64) -> Self {
        Self {
            temperature: Some(temperature),
            precipitation: Some(precipitation),
            humidity: Some(humidity),
            ..Self::default()
        }
    }

    /// Values shown before any weather source has produced a reading.
    pub fn placeholder() -> Self {
        Self {
            temperature: Some(20.0),
            precipitation: Some(0.0),
            humidity: Some(65.0),
            wind_speed: Some(3.0),
            temperature_min: Some(15.0),
            temperature_max: Some(25.0),
            is_placeholder: true,
        }
    }

    pub fn temperature(&self) -> f64 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }

    pub fn precipitation(&self) -> f64 {
        self.precipitation.unwrap_or(DEFAULT_PRECIPITATION)
    }

    pub fn humidity(&self) -> f64 {
        self.humidity.unwrap_or(DEFAULT_HUMIDITY)
    }

    pub fn wind_speed(&self) -> f64 {
        self.wind_speed.unwrap_or(0.0)
    }
}

/// Seasonal weather for `date`: a yearly temperature sine wave with daily
/// noise, rain that is likelier in spring and autumn, and humidity tied to the
/// rain chance.
pub fn simulate_daily_weather<R: Rng + ?Sized>(date: NaiveDate, rng: &mut R) -> WeatherData {
    let day_of_year = date.ordinal() as f64;

    let base_temp = 20.0 + 10.0 * (2.0 * PI * (day_of_year - 80.0) / 365.0).sin();
    let temperature = base_temp + rng.gaussian(0.0, 3.0);
    let temperature_min = temperature - rng.gen_range(3.0..8.0);
    let temperature_max = temperature + rng.gen_range(3.0..8.0);

    let rain_chance = 0.3 + 0.2 * (2.0 * PI * (day_of_year - 100.0) / 365.0).sin();
    let precipitation = if rng.chance(rain_chance) {
        rng.exponential(5.0)
    } else {
        0.0
    };

    let humidity = (50.0 + 30.0 * rain_chance + rng.gaussian(0.0, 10.0)).clamp(10.0, 100.0);
    let wind_speed = rng.gamma2(1.5);

    WeatherData {
        temperature: Some(temperature),
        precipitation: Some(precipitation),
        humidity: Some(humidity),
        wind_speed: Some(wind_speed),
        temperature_min: Some(temperature_min),
        temperature_max: Some(temperature_max),
        is_placeholder: true,
    }
}

/// A `days`-long forecast starting at `start`. Milder seasonal swing and less
/// noise than the daily model; carries temperature and rain only.
pub fn simulate_forecast<R: Rng + ?Sized>(
    start: NaiveDate,
    days: usize,
    rng: &mut R,
) -> Vec<WeatherData> {
    start
        .iter_days()
        .take(days)
        .map(|date| {
            let day_of_year = date.ordinal() as f64;
            let seasonal = 8.0 * (2.0 * PI * (day_of_year - 80.0) / 365.0).sin();
            let temperature = 20.0 + seasonal + rng.gaussian(0.0, 2.0);
            let temperature_min = temperature - rng.gen_range(3.0..8.0);
            let temperature_max = temperature + rng.gen_range(3.0..8.0);

            let rain_chance = 0.3 + 0.2 * (2.0 * PI * (day_of_year - 100.0) / 365.0).sin();
            let precipitation = if rng.chance(rain_chance) {
                rng.exponential(5.0)
            } else {
                0.0
            };

            WeatherData {
                temperature: Some(temperature),
                precipitation: Some(precipitation),
                temperature_min: Some(temperature_min),
                temperature_max: Some(temperature_max),
                is_placeholder: true,
                ..WeatherData::default()
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherAlert {
    FrostWarning,
    FrostAlert,
    HeatWarning,
    HeatAlert,
    FloodWarning,
    HeavyRain,
    DroughtWarning,
    DryConditions,
    WindWarning,
    WindAlert,
    /// Extreme temperature expected `day` days ahead.
    ExtremeForecast { day: u32 },
    /// Heavy rain expected `day` days ahead.
    HeavyRainForecast { day: u32 },
}

impl WeatherAlert {
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            WeatherAlert::FrostWarning
                | WeatherAlert::HeatWarning
                | WeatherAlert::FloodWarning
                | WeatherAlert::DroughtWarning
                | WeatherAlert::WindWarning
        )
    }
}

impl std::fmt::Display for WeatherAlert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeatherAlert::FrostWarning => {
                write!(f, "Frost warning: extreme cold may damage unprotected crops")
            }
            WeatherAlert::FrostAlert => write!(f, "Frost alert: cold temperatures, consider protection"),
            WeatherAlert::HeatWarning => write!(f, "Heat warning: extreme heat stress on crops"),
            WeatherAlert::HeatAlert => write!(f, "Heat alert: high temperatures may stress crops"),
            WeatherAlert::FloodWarning => write!(f, "Flood warning: heavy rainfall may waterlog crops"),
            WeatherAlert::HeavyRain => write!(f, "Heavy rain alert: high precipitation"),
            WeatherAlert::DroughtWarning => write!(f, "Drought warning: very low moisture"),
            WeatherAlert::DryConditions => write!(f, "Dry conditions: low moisture may stress crops"),
            WeatherAlert::WindWarning => write!(f, "Wind warning: strong winds may damage crops"),
            WeatherAlert::WindAlert => write!(f, "Wind alert: moderate winds"),
            WeatherAlert::ExtremeForecast { day } => write!(f, "Day {day}: extreme weather forecast"),
            WeatherAlert::HeavyRainForecast { day } => write!(f, "Day {day}: heavy rain forecast"),
        }
    }
}

/// Classify a day's weather. Produces at most one alert each for
/// temperature, precipitation and wind, most severe first.
pub fn check_alerts(weather: &WeatherData) -> Vec<WeatherAlert> {
    let temperature = weather.temperature();
    let precipitation = weather.precipitation();
    let humidity = weather.humidity();
    let wind = weather.wind_speed();
    let mut alerts = Vec::new();

    if temperature <= -5.0 {
        alerts.push(WeatherAlert::FrostWarning);
    } else if temperature <= 0.0 {
        alerts.push(WeatherAlert::FrostAlert);
    } else if temperature >= 40.0 {
        alerts.push(WeatherAlert::HeatWarning);
    } else if temperature >= 35.0 {
        alerts.push(WeatherAlert::HeatAlert);
    }

    if precipitation >= 50.0 {
        alerts.push(WeatherAlert::FloodWarning);
    } else if precipitation >= 25.0 {
        alerts.push(WeatherAlert::HeavyRain);
    } else if precipitation <= 1.0 && humidity < 30.0 {
        alerts.push(WeatherAlert::DroughtWarning);
    } else if precipitation <= 5.0 && humidity < 40.0 {
        alerts.push(WeatherAlert::DryConditions);
    }

    if wind >= 15.0 {
        alerts.push(WeatherAlert::WindWarning);
    } else if wind >= 10.0 {
        alerts.push(WeatherAlert::WindAlert);
    }

    alerts
}

/// Scan the first few forecast days for extremes. Each day yields at most one
/// alert; temperature wins over rain.
pub fn check_forecast_alerts(forecast: &[WeatherData]) -> Vec<WeatherAlert> {
    forecast
        .iter()
        .take(FORECAST_ALERT_DAYS)
        .zip(1u32..)
        .filter_map(|(weather, day)| {
            let temperature = weather.temperature();
            if temperature <= -5.0 || temperature >= 40.0 {
                Some(WeatherAlert::ExtremeForecast { day })
            } else if weather.precipitation() >= 40.0 {
                Some(WeatherAlert::HeavyRainForecast { day })
            } else {
                None
            }
        })
        .collect()
}
