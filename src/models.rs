// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Data Models
//!
//! Typed mirrors of the Xert API payloads. These are read-only views of
//! server state: the client deserializes responses into them and hands
//! them to the tool and REST layers unchanged.
//!
//! Fields the server may omit are modeled as `Option` so that absence is
//! an explicitly represented state rather than a runtime surprise.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The four-parameter fitness signature Xert maintains per athlete
///
/// FTP/LTP/PP are wattages, HIE is kilojoules. `atc` only appears inside
/// activity summaries on newer accounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitnessSignature {
    /// Functional threshold power (W)
    pub ftp: f64,
    /// Lower threshold power (W)
    pub ltp: Option<f64>,
    /// High intensity energy (kJ)
    pub hie: Option<f64>,
    /// Peak power (W)
    pub pp: f64,
    /// Aerobic threshold capacity, present on some summaries only
    pub atc: Option<f64>,
}

/// Low/high/peak strain decomposition of a training-load score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingLoad {
    pub low: f64,
    pub high: f64,
    pub peak: f64,
    pub total: f64,
}

/// How the server arrived at today's recommended workout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WotdType {
    None,
    Forecast,
    Scheduled,
}

/// Server-recommended "workout of the day" record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutOfTheDay {
    #[serde(rename = "type")]
    pub wotd_type: WotdType,
    pub name: Option<String>,
    #[serde(rename = "workoutId")]
    pub workout_id: Option<String>,
    pub description: Option<String>,
    pub difficulty: Option<f64>,
    pub url: Option<String>,
}

/// Current fitness signature, training load, and recommendation snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingInfo {
    pub success: bool,
    pub weight: f64,
    pub status: String,
    pub signature: FitnessSignature,
    /// Current training load (XSS strain scores)
    pub tl: TrainingLoad,
    /// Recommended strain targets
    #[serde(rename = "targetXSS")]
    pub target_xss: TrainingLoad,
    pub source: String,
    pub wotd: Option<WorkoutOfTheDay>,
}

/// One entry in the athlete's workout library
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workout {
    /// Workout identifier, used as the id for detail and download calls
    pub path: String,
    pub name: String,
    pub description: String,
    /// Unix seconds of the last edit
    pub last_modified: i64,
}

/// A single interval within a workout, resolved against the caller's
/// current fitness signature by the server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutInterval {
    pub name: String,
    pub index: u32,
    /// Target power (W)
    pub power: f64,
    /// Work duration (seconds)
    pub duration: f64,
    /// Recovery power (W), absent for straight efforts
    pub power_rest: Option<f64>,
    /// Recovery duration (seconds), absent for straight efforts
    pub duration_rest: Option<f64>,
    /// Repeat count for this work/rest pair
    pub interval_count: u32,
}

/// Full workout definition with resolved intervals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutDetail {
    pub success: bool,
    pub name: String,
    pub description: String,
    pub workout: Vec<WorkoutInterval>,
}

/// Server-side date representation with its timezone
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityStartDate {
    /// Local datetime, `YYYY-MM-DD HH:MM:SS`
    pub date: String,
    pub timezone_type: i32,
    pub timezone: String,
}

/// One activity as returned by the range-query list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivitySummary {
    pub name: String,
    pub start_date: ActivityStartDate,
    pub description: String,
    /// Activity identifier, used as the id for detail calls
    pub path: String,
    pub activity_type: String,
}

/// One per-second sample of a recorded session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDataPoint {
    pub power: f64,
    pub unix_time: i64,
    /// Maximal power available at this instant (W)
    pub mpa: f64,
    pub cad: Option<f64>,
    pub alt: f64,
    pub hr: Option<f64>,
    pub spd: f64,
    pub tgt: Option<f64>,
    pub lat: f64,
    pub lng: f64,
    pub dist: f64,
    pub tws: f64,
    pub xds: f64,
}

/// Recorder-level aggregates, absent for manually entered activities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub max_power: f64,
    pub avg_power: f64,
    pub max_cadence: f64,
    pub total_elevation_gain: f64,
    pub total_calories: f64,
}

/// Signature components tracked by the training/recovery load progression
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureLoad {
    pub ftp: f64,
    pub hie: f64,
    pub pp: f64,
}

/// Per-activity training progression snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progression {
    pub date: String,
    pub tl: SignatureLoad,
    pub rl: SignatureLoad,
    pub form: f64,
}

/// Summary metrics Xert computes for a single activity
///
/// The strain scores (xss/xlss/xhss/xpss) and power metrics are opaque
/// numeric payloads here; their semantics live on the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivitySummaryMetrics {
    pub session: Option<SessionSummary>,
    pub xss: f64,
    pub xlss: f64,
    pub xhss: f64,
    pub xpss: f64,
    pub xep: f64,
    pub focus: String,
    pub mep: f64,
    pub tws: f64,
    pub sp: f64,
    pub sfd: f64,
    pub specificity: String,
    pub difficulty: f64,
    pub difficulty_rating: String,
    pub distance: f64,
    pub duration: f64,
    /// Signature after this activity was processed
    pub sig: FitnessSignature,
    pub medal: Option<u32>,
    pub breakthrough: Option<u32>,
    pub prev_sig: Option<FitnessSignature>,
    pub activity_type: String,
    pub start_date: ActivityStartDate,
    pub total_grams_carbs: Option<f64>,
    pub total_grams_fat: Option<f64>,
    pub progression: Option<Progression>,
    pub training_status: Option<f64>,
    pub freshness: Option<String>,
    pub street_view: Option<String>,
    pub activity_map: Option<String>,
    pub chart_view: Option<String>,
}

/// Full activity record, with dense samples only when requested
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityDetail {
    pub success: bool,
    pub name: String,
    pub description: String,
    /// Per-second samples; large, omitted unless explicitly requested
    pub session_data: Option<Vec<SessionDataPoint>>,
    pub summary: ActivitySummaryMetrics,
}

/// Descriptor of one file accepted by the upload endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedFile {
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub file_type: String,
    pub url: String,
    #[serde(rename = "deleteType")]
    pub delete_type: String,
    #[serde(rename = "deleteUrl")]
    pub delete_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedFiles {
    pub files: Vec<UploadedFile>,
}

/// Result of a FIT file upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    pub json: Option<UploadedFiles>,
}

/// Workout file formats Xert can render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutFormat {
    /// Zwift workout XML
    #[default]
    Zwo,
    /// Plain-text ERG for other trainers
    Erg,
}

impl WorkoutFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Zwo => "zwo",
            Self::Erg => "erg",
        }
    }

    /// Content type the REST proxy serves the downloaded file with
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Zwo => "application/xml",
            Self::Erg => "text/plain",
        }
    }
}

impl fmt::Display for WorkoutFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkoutFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "zwo" => Ok(Self::Zwo),
            "erg" => Ok(Self::Erg),
            other => Err(format!("unknown workout format: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_training_info_deserialization() {
        let payload = json!({
            "success": true,
            "weight": 72.5,
            "status": "Fresh",
            "signature": { "ftp": 250.0, "ltp": 200.0, "hie": 22.4, "pp": 1050.0 },
            "tl": { "low": 40.2, "high": 8.1, "peak": 2.0, "total": 50.3 },
            "targetXSS": { "low": 45.0, "high": 10.0, "peak": 3.0, "total": 58.0 },
            "source": "garmin",
            "wotd": {
                "type": "Forecast",
                "name": "Iron Lung",
                "workoutId": "ISm75NAmocJ7eUHr",
                "difficulty": 112.3
            }
        });

        let info: TrainingInfo = serde_json::from_value(payload).unwrap();
        assert!(info.success);
        assert_eq!(info.signature.ftp, 250.0);
        assert_eq!(info.signature.ltp, Some(200.0));
        assert!(info.signature.atc.is_none());
        assert_eq!(info.target_xss.total, 58.0);

        let wotd = info.wotd.unwrap();
        assert_eq!(wotd.wotd_type, WotdType::Forecast);
        assert_eq!(wotd.workout_id.as_deref(), Some("ISm75NAmocJ7eUHr"));
        assert!(wotd.url.is_none());
    }

    #[test]
    fn test_workout_interval_optional_rest() {
        let payload = json!({
            "name": "Warmup",
            "index": 0,
            "power": 150.0,
            "duration": 600.0,
            "interval_count": 1
        });

        let interval: WorkoutInterval = serde_json::from_value(payload).unwrap();
        assert!(interval.power_rest.is_none());
        assert!(interval.duration_rest.is_none());
        assert_eq!(interval.interval_count, 1);
    }

    #[test]
    fn test_activity_detail_without_session_data() {
        let payload = json!({
            "success": true,
            "name": "Morning Ride",
            "description": "",
            "summary": {
                "xss": 75.2, "xlss": 60.0, "xhss": 10.2, "xpss": 5.0,
                "xep": 210.0, "focus": "Endurance", "mep": 215.0,
                "tws": 0.0, "sp": 0.0, "sfd": 0.0,
                "specificity": "pure", "difficulty": 98.0,
                "difficulty_rating": "Moderate", "distance": 42.1,
                "duration": 5400.0,
                "sig": { "ftp": 251.0, "ltp": 201.0, "hie": 22.6, "pp": 1048.0 },
                "activity_type": "Cycling",
                "start_date": {
                    "date": "2024-03-01 08:15:00",
                    "timezone_type": 3,
                    "timezone": "Europe/Berlin"
                }
            }
        });

        let detail: ActivityDetail = serde_json::from_value(payload).unwrap();
        assert!(detail.session_data.is_none());
        assert!(detail.summary.session.is_none());
        assert!(detail.summary.breakthrough.is_none());
        assert_eq!(detail.summary.sig.ftp, 251.0);
    }

    #[test]
    fn test_workout_format_parsing() {
        assert_eq!("zwo".parse::<WorkoutFormat>().unwrap(), WorkoutFormat::Zwo);
        assert_eq!("erg".parse::<WorkoutFormat>().unwrap(), WorkoutFormat::Erg);
        assert!("fit".parse::<WorkoutFormat>().is_err());
        assert_eq!(WorkoutFormat::default(), WorkoutFormat::Zwo);
        assert_eq!(WorkoutFormat::Zwo.content_type(), "application/xml");
        assert_eq!(WorkoutFormat::Erg.content_type(), "text/plain");
    }
}
