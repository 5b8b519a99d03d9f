//! Report assembly per destination
//!
//! Reads observations through the query facade and runs them through the
//! translation rules, yielding the literal values the form automation pushes
//! into each destination. Optional fields that are absent are `None` (or the
//! destination's "not available" term) and logged at info level.

use crate::config::Config;
use crate::db::models::ObservationRecord;
use crate::query::Observations;
use crate::reference::{ReferenceList, ReferenceLookupMiss, ReferenceSnapshot};
use crate::translate::audubon::{
    self, AudubonCloudCover, AudubonPrecipitation, AudubonWater, AudubonWindDirection,
};
use crate::translate::effort::{Effort, EffortMode};
use crate::translate::mou::{self, MouCloudCover, MouIce, MouWindDirection};
use crate::translate::numeric::{reported_number, round_for_report, snow_depth_reported};
use crate::translate::species::{Exclusion, SpeciesTally};
use crate::translate::time::{translate_time, ReportTime};
use crate::translate::vocab::{CloudCover, PrecipitationLevel, WaterCondition, WindDirection};
use crate::translate::Precipitation;
use crate::Result;
use serde::Serialize;
use tracing::{debug, info};

const WEATHER: &str = "weather";
const EFFORT: &str = "effort";
const TIME: &str = "time";
const SPECIES: &str = "species";

const PERIODS: [&str; 2] = ["am", "pm"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountTimes {
    pub start: Option<ReportTime>,
    pub end: Option<ReportTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudubonWeather {
    pub temperature_min: Option<i64>,
    pub temperature_max: Option<i64>,
    pub temperature_units: Option<String>,
    pub wind_direction: AudubonWindDirection,
    pub wind_velocity_min: Option<i64>,
    pub wind_velocity_max: Option<i64>,
    pub wind_units: Option<String>,
    pub snow_depth_min: Option<i64>,
    pub snow_depth_max: Option<i64>,
    pub snow_depth_units: Option<String>,
    pub still_water: AudubonWater,
    pub moving_water: AudubonWater,
    pub cloud_cover_am: AudubonCloudCover,
    pub cloud_cover_pm: AudubonCloudCover,
    pub rain_am: AudubonPrecipitation,
    pub snow_am: AudubonPrecipitation,
    pub rain_pm: AudubonPrecipitation,
    pub snow_pm: AudubonPrecipitation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModeRow {
    pub mode: EffortMode,
    pub hours: Option<i64>,
    pub miles: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudubonEffort {
    pub field_counters: Option<i64>,
    pub feeder_counters: Option<i64>,
    pub parties_min: Option<i64>,
    pub parties_max: Option<i64>,
    pub modes: Vec<ModeRow>,
}

/// Values for the Audubon count entry pages
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudubonReport {
    pub times: CountTimes,
    pub weather: AudubonWeather,
    pub effort: AudubonEffort,
    pub species: SpeciesTally,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MouWeather {
    pub temperature_min: Option<i64>,
    pub temperature_max: Option<i64>,
    pub wind_direction: MouWindDirection,
    pub wind_velocity_min: Option<i64>,
    pub wind_velocity_max: Option<i64>,
    pub snow_depth: i64,
    pub still_water: MouIce,
    pub moving_water: MouIce,
    pub cloud_cover_am: MouCloudCover,
    pub cloud_cover_pm: MouCloudCover,
    pub precipitation_am: Precipitation,
    pub precipitation_pm: Precipitation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MouEffort {
    pub field_counters: Option<i64>,
    pub feeder_counters: Option<i64>,
    pub parties_min: Option<i64>,
    pub parties_max: Option<i64>,
    pub total_hours: i64,
    pub total_miles: i64,
}

/// Values for the MOU count entry pages
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MouReport {
    pub times: CountTimes,
    pub weather: MouWeather,
    pub effort: MouEffort,
    pub species: SpeciesTally,
}

/// Builds destination reports from one store
pub struct ReportBuilder<'a> {
    observations: &'a Observations,
    references: &'a ReferenceSnapshot,
    count_week_suffix: String,
}

impl<'a> ReportBuilder<'a> {
    pub fn new(
        observations: &'a Observations,
        references: &'a ReferenceSnapshot,
        config: &Config,
    ) -> Self {
        Self {
            observations,
            references,
            count_week_suffix: config.count_week_suffix.clone(),
        }
    }

    pub async fn audubon(&self) -> Result<AudubonReport> {
        let precipitation = self.precipitation().await?;
        let audubon_precipitation =
            |name: &str, period: &str| audubon::precipitation(precipitation.level(name, period));

        let weather = AudubonWeather {
            temperature_min: self.number(WEATHER, "temperature", "min").await?,
            temperature_max: self.number(WEATHER, "temperature", "max").await?,
            temperature_units: self.text(WEATHER, "temperature units").await?,
            wind_direction: audubon::wind_direction(self.wind_direction().await?),
            wind_velocity_min: self.number(WEATHER, "wind velocity", "min").await?,
            wind_velocity_max: self.number(WEATHER, "wind velocity", "max").await?,
            wind_units: self.text(WEATHER, "wind units").await?,
            snow_depth_min: self.number(WEATHER, "snow depth", "min").await?,
            snow_depth_max: self.number(WEATHER, "snow depth", "max").await?,
            snow_depth_units: self.text(WEATHER, "snow depth units").await?,
            still_water: audubon::water(self.water("still water").await?),
            moving_water: audubon::water(self.water("moving water").await?),
            cloud_cover_am: audubon::cloud_cover(self.cloud_cover("am").await?),
            cloud_cover_pm: audubon::cloud_cover(self.cloud_cover("pm").await?),
            rain_am: audubon_precipitation("rain", "am"),
            snow_am: audubon_precipitation("snow", "am"),
            rain_pm: audubon_precipitation("rain", "pm"),
            snow_pm: audubon_precipitation("snow", "pm"),
        };

        let effort_records = self.observations.list_by_kind(EFFORT).await?;
        let by_mode = Effort::from_records(&effort_records)?;
        let modes = EffortMode::ALL
            .iter()
            .map(|mode| {
                let mode_effort = by_mode.mode(*mode);
                ModeRow {
                    mode: *mode,
                    hours: mode_effort.hours.map(round_for_report),
                    miles: mode_effort.miles.map(round_for_report),
                }
            })
            .collect();

        let effort = AudubonEffort {
            field_counters: self.unqualified_number(EFFORT, "field counters").await?,
            feeder_counters: self.unqualified_number(EFFORT, "feeder counters").await?,
            parties_min: self.number(EFFORT, "parties", "min").await?,
            parties_max: self.number(EFFORT, "parties", "max").await?,
            modes,
        };

        Ok(AudubonReport {
            times: self.times().await?,
            weather,
            effort,
            species: self.species().await?,
        })
    }

    pub async fn mou(&self) -> Result<MouReport> {
        let precipitation = self.precipitation().await?;
        let composite = |period: &str| {
            mou::precipitation(
                period,
                precipitation.level("rain", period),
                precipitation.level("snow", period),
            )
        };

        let weather = MouWeather {
            temperature_min: self.number(WEATHER, "temperature", "min").await?,
            temperature_max: self.number(WEATHER, "temperature", "max").await?,
            wind_direction: mou::wind_direction(self.wind_direction().await?),
            wind_velocity_min: self.number(WEATHER, "wind velocity", "min").await?,
            wind_velocity_max: self.number(WEATHER, "wind velocity", "max").await?,
            snow_depth: snow_depth_reported(
                self.raw(WEATHER, "snow depth", "min").await?.as_deref(),
                self.raw(WEATHER, "snow depth", "max").await?.as_deref(),
            )?,
            still_water: mou::ice(self.water("still water").await?),
            moving_water: mou::ice(self.water("moving water").await?),
            cloud_cover_am: mou::cloud_cover(self.cloud_cover("am").await?),
            cloud_cover_pm: mou::cloud_cover(self.cloud_cover("pm").await?),
            precipitation_am: composite(PERIODS[0])?,
            precipitation_pm: composite(PERIODS[1])?,
        };

        let effort_records = self.observations.list_by_kind(EFFORT).await?;
        let totals = Effort::from_records(&effort_records)?;
        let effort = MouEffort {
            field_counters: self.unqualified_number(EFFORT, "field counters").await?,
            feeder_counters: self.unqualified_number(EFFORT, "feeder counters").await?,
            parties_min: self.number(EFFORT, "parties", "min").await?,
            parties_max: self.number(EFFORT, "parties", "max").await?,
            total_hours: totals.required_total_hours()?,
            total_miles: totals.required_total_miles()?,
        };

        Ok(MouReport {
            times: self.times().await?,
            weather,
            effort,
            species: self.species().await?,
        })
    }

    /// Species tally; reference misses are logged once per species
    pub async fn species(&self) -> Result<SpeciesTally> {
        let counts = self
            .observations
            .list_by_kind_and_name(SPECIES, "count")
            .await?;
        let tally = SpeciesTally::from_records(&counts, self.references, &self.count_week_suffix);

        for species in &tally.species {
            if species.eligibility.excluded_for(Exclusion::NotExpected) {
                ReferenceLookupMiss::new(ReferenceList::Expected, &species.common_name).report();
            }
            if species.eligibility.excluded_for(Exclusion::NotReal) {
                ReferenceLookupMiss::new(ReferenceList::Real, &species.common_name).report();
            }
            if species.eligibility.excluded_for(Exclusion::CountWeek) {
                debug!("'{}' is a count-week entry", species.common_name);
            }
        }

        info!(
            "{} species reported, {} counted toward total species",
            tally.species.len(),
            tally.total_species
        );
        Ok(tally)
    }

    async fn times(&self) -> Result<CountTimes> {
        Ok(CountTimes {
            start: translate_time("start time", self.text(TIME, "start").await?.as_deref())?,
            end: translate_time("end time", self.text(TIME, "end").await?.as_deref())?,
        })
    }

    async fn precipitation(&self) -> Result<PrecipitationFamily> {
        let records = self
            .observations
            .list_by_kind_and_name_prefix(WEATHER, "precipitation")
            .await?;
        Ok(PrecipitationFamily { records })
    }

    async fn wind_direction(&self) -> Result<Option<WindDirection>> {
        let value = self.text(WEATHER, "wind direction").await?;
        Ok(recognized("wind direction", value, WindDirection::parse))
    }

    async fn water(&self, name: &str) -> Result<Option<WaterCondition>> {
        let value = self.text(WEATHER, name).await?;
        Ok(recognized(name, value, WaterCondition::parse))
    }

    async fn cloud_cover(&self, period: &str) -> Result<Option<CloudCover>> {
        let value = self.raw(WEATHER, "cloud cover", period).await?;
        Ok(recognized("cloud cover", value, CloudCover::parse))
    }

    async fn raw(&self, kind: &str, name: &str, qualifier: &str) -> Result<Option<String>> {
        let value = self
            .observations
            .get_qualified_value(kind, name, qualifier)
            .await?;
        if value.is_none() {
            info!("No {} {} recorded", name, qualifier);
        }
        Ok(value)
    }

    async fn text(&self, kind: &str, name: &str) -> Result<Option<String>> {
        let value = self.observations.get_value(kind, name).await?;
        if value.is_none() {
            info!("No {} recorded", name);
        }
        Ok(value)
    }

    async fn number(&self, kind: &str, name: &str, qualifier: &str) -> Result<Option<i64>> {
        let value = self.raw(kind, name, qualifier).await?;
        reported_number(&format!("{} {}", name, qualifier), value.as_deref())
    }

    async fn unqualified_number(&self, kind: &str, name: &str) -> Result<Option<i64>> {
        let value = self.text(kind, name).await?;
        reported_number(name, value.as_deref())
    }
}

/// Parse a vocabulary term, logging values outside the vocabulary
fn recognized<T>(
    field: &str,
    value: Option<String>,
    parse: fn(Option<&str>) -> Option<T>,
) -> Option<T> {
    let value = value?;
    let parsed = parse(Some(&value));
    if parsed.is_none() {
        info!("Unrecognized {} '{}', reporting not available", field, value);
    }
    parsed
}

/// The `precipitation rain`/`precipitation snow` records for both periods
struct PrecipitationFamily {
    records: Vec<ObservationRecord>,
}

impl PrecipitationFamily {
    fn level(&self, name: &str, period: &str) -> Option<PrecipitationLevel> {
        let full_name = format!("precipitation {}", name);
        let record = self
            .records
            .iter()
            .find(|r| r.name == full_name && r.qualifier == period)?;
        PrecipitationLevel::parse(Some(&record.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_memory_database;
    use crate::db::models::RawRow;
    use crate::store::FactStore;
    use crate::Error;

    async fn observations(rows: &[RawRow]) -> Observations {
        let pool = init_memory_database().await.unwrap();
        FactStore::new(pool.clone()).load(rows).await.unwrap();
        Observations::new(pool)
    }

    fn weather_rows() -> Vec<RawRow> {
        vec![
            RawRow::new("weather", "temperature", "min", "-2.5"),
            RawRow::new("weather", "temperature", "max", "12.4"),
            RawRow::new("weather", "temperature units", "", "Fahrenheit"),
            RawRow::new("weather", "wind direction", "", "NW"),
            RawRow::new("weather", "snow depth", "max", "4"),
            RawRow::new("weather", "still water", "", "partly open"),
            RawRow::new("weather", "cloud cover", "am", "local fog"),
            RawRow::new("weather", "cloud cover", "pm", "drizzle"),
            RawRow::new("weather", "precipitation rain", "am", "heavy"),
            RawRow::new("weather", "precipitation snow", "am", "none"),
            RawRow::new("weather", "precipitation rain", "pm", "light"),
            RawRow::new("weather", "precipitation snow", "pm", "light"),
            RawRow::new("effort", "hours", "foot", "2"),
            RawRow::new("effort", "hours", "vehicle", "3"),
            RawRow::new("effort", "hours", "feeder watching", "1"),
            RawRow::new("effort", "miles", "vehicle", "40.5"),
            RawRow::new("effort", "field counters", "", "9"),
            RawRow::new("time", "start", "", "0652"),
            RawRow::new("species", "count", "American Robin", "5"),
            RawRow::new("species", "count", "Snow Bunting", "3 cwp"),
            RawRow::new("species", "count", "Gull sp.", "1"),
        ]
    }

    fn references() -> ReferenceSnapshot {
        ReferenceSnapshot::new(
            ["american robin", "snow bunting", "gull sp."],
            ["american robin", "snow bunting"],
        )
    }

    #[tokio::test]
    async fn test_mou_report() {
        let obs = observations(&weather_rows()).await;
        let refs = references();
        let report = ReportBuilder::new(&obs, &refs, &Config::default())
            .mou()
            .await
            .unwrap();

        assert_eq!(report.weather.temperature_min, Some(-2));
        assert_eq!(report.weather.temperature_max, Some(12));
        assert_eq!(report.weather.wind_direction, MouWindDirection::Northwest);
        assert_eq!(report.weather.snow_depth, 2);
        assert_eq!(report.weather.still_water, MouIce::PartlyFrozen);
        assert_eq!(report.weather.cloud_cover_am, MouCloudCover::LightFog);
        assert_eq!(report.weather.cloud_cover_pm, MouCloudCover::NotAvailable);
        assert_eq!(report.weather.precipitation_am.to_string(), "heavy rain");
        assert_eq!(
            report.weather.precipitation_pm.to_string(),
            "light combination"
        );
        assert_eq!(report.effort.total_hours, 6);
        assert_eq!(report.effort.total_miles, 41);
        assert_eq!(report.effort.field_counters, Some(9));
        assert_eq!(report.times.start.unwrap().to_string(), "6:45 AM");
        assert_eq!(report.times.end, None);
        assert_eq!(report.species.total_species, 1);
        assert_eq!(report.species.species.len(), 3);
    }

    #[tokio::test]
    async fn test_audubon_report() {
        let obs = observations(&weather_rows()).await;
        let refs = references();
        let report = ReportBuilder::new(&obs, &refs, &Config::default())
            .audubon()
            .await
            .unwrap();

        assert_eq!(report.weather.temperature_units.as_deref(), Some("fahrenheit"));
        assert_eq!(report.weather.wind_direction, AudubonWindDirection::Northwest);
        assert_eq!(report.weather.still_water, AudubonWater::PartlyOpen);
        assert_eq!(report.weather.moving_water, AudubonWater::NotAvailable);
        assert_eq!(report.weather.snow_depth_min, None);
        assert_eq!(report.weather.rain_am, AudubonPrecipitation::Heavy);
        assert_eq!(report.weather.snow_pm, AudubonPrecipitation::Light);

        let vehicle = &report.effort.modes[1];
        assert_eq!(vehicle.mode, EffortMode::Vehicle);
        assert_eq!(vehicle.hours, Some(3));
        assert_eq!(vehicle.miles, Some(41));
        assert_eq!(report.species.total_species, 1);
    }

    #[tokio::test]
    async fn test_mou_requires_effort_and_precipitation() {
        let obs = observations(&[RawRow::new("weather", "precipitation rain", "am", "light")]).await;
        let refs = ReferenceSnapshot::default();
        let err = ReportBuilder::new(&obs, &refs, &Config::default())
            .mou()
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingRequiredField(_)));
    }

    #[tokio::test]
    async fn test_malformed_number_is_value_format() {
        let obs = observations(&[RawRow::new("weather", "temperature", "min", "cold")]).await;
        let refs = ReferenceSnapshot::default();
        let err = ReportBuilder::new(&obs, &refs, &Config::default())
            .audubon()
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ValueFormat { .. }));
    }
}
