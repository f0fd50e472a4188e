// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Text renderers for Xert payloads.
//!
//! Pure functions that turn typed API responses into human-readable text
//! for language-model consumption. No formatting decision here feeds
//! back into the client; these are one-way views.

use chrono::NaiveDateTime;
use url::Url;

use crate::models::{
    ActivityDetail, ActivityStartDate, ActivitySummary, TrainingInfo, UploadResponse, Workout,
    WorkoutDetail, WotdType,
};

const HEAVY_RULE: &str = "═══════════════════════════════════════════════════════════";
const LIGHT_RULE: &str = "───────────────────────────────────────────────────────────";

/// Render a second count as `H:MM:SS` or `M:SS`.
pub fn format_duration(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "N/A".to_string();
    }

    let total = seconds as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}

/// Render a server-side start date in its own timezone.
pub fn format_start_date(start: &ActivityStartDate) -> String {
    match NaiveDateTime::parse_from_str(&start.date, "%Y-%m-%d %H:%M:%S") {
        Ok(dt) => format!("{} ({})", dt.format("%a, %d %b %Y %H:%M"), start.timezone),
        Err(_) => start.date.clone(),
    }
}

pub fn format_training_info(info: &TrainingInfo) -> String {
    let mut lines = Vec::new();

    lines.push(HEAVY_RULE.to_string());
    lines.push("                    XERT Training Info".to_string());
    lines.push(HEAVY_RULE.to_string());
    lines.push(String::new());

    lines.push("📊 FITNESS SIGNATURE".to_string());
    lines.push(LIGHT_RULE.to_string());
    lines.push(format!(
        "   FTP (Threshold Power):      {} W",
        info.signature.ftp.round()
    ));
    if let Some(ltp) = info.signature.ltp {
        lines.push(format!("   LTP (Lower Threshold):      {} W", ltp.round()));
    }
    if let Some(hie) = info.signature.hie {
        lines.push(format!("   HIE (High Intensity Energy): {hie:.1} kJ"));
    }
    lines.push(format!(
        "   PP (Peak Power):            {} W",
        info.signature.pp.round()
    ));
    lines.push(String::new());

    lines.push("🎯 TRAINING STATUS".to_string());
    lines.push(LIGHT_RULE.to_string());
    lines.push(format!("   Status:  {}", info.status));
    lines.push(format!("   Weight:  {} kg", info.weight));
    lines.push(format!("   Source:  {}", info.source));
    lines.push(String::new());

    lines.push("📈 CURRENT TRAINING LOAD (XSS)".to_string());
    lines.push(LIGHT_RULE.to_string());
    lines.push(format!("   Low Strain:   {:.1}", info.tl.low));
    lines.push(format!("   High Strain:  {:.1}", info.tl.high));
    lines.push(format!("   Peak Strain:  {:.1}", info.tl.peak));
    lines.push(format!("   Total:        {:.1}", info.tl.total));
    lines.push(String::new());

    lines.push("🎯 TARGET XSS (Recommended)".to_string());
    lines.push(LIGHT_RULE.to_string());
    lines.push(format!("   Low:   {:.1}", info.target_xss.low));
    lines.push(format!("   High:  {:.1}", info.target_xss.high));
    lines.push(format!("   Peak:  {:.1}", info.target_xss.peak));
    lines.push(format!("   Total: {:.1}", info.target_xss.total));
    lines.push(String::new());

    if let Some(wotd) = &info.wotd {
        if wotd.wotd_type != WotdType::None {
            lines.push("🏋️ WORKOUT OF THE DAY".to_string());
            lines.push(LIGHT_RULE.to_string());
            lines.push(format!("   Type:       {:?}", wotd.wotd_type));
            lines.push(format!(
                "   Name:       {}",
                wotd.name.as_deref().unwrap_or("N/A")
            ));
            lines.push(format!(
                "   Workout ID: {}",
                wotd.workout_id.as_deref().unwrap_or("N/A")
            ));
            if let Some(difficulty) = wotd.difficulty {
                lines.push(format!("   Difficulty: {difficulty:.2}"));
            }
            if let Some(description) = &wotd.description {
                lines.push(format!("   Description: {description}"));
            }
            lines.push(String::new());
        }
    }

    lines.push(HEAVY_RULE.to_string());
    lines.join("\n")
}

pub fn format_workout_list(workouts: &[Workout]) -> String {
    if workouts.is_empty() {
        return "No workouts found.".to_string();
    }

    let mut lines = Vec::new();
    lines.push(format!("Found {} workout(s):", workouts.len()));
    lines.push(String::new());

    for workout in workouts {
        lines.push(format!("📋 {}", workout.name));
        lines.push(format!("   ID: {}", workout.path));
        if let Some(modified) = chrono::DateTime::from_timestamp(workout.last_modified, 0) {
            lines.push(format!("   Modified: {}", modified.format("%d.%m.%Y")));
        }
        if !workout.description.is_empty() {
            lines.push(format!("   Description: {}", workout.description));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

pub fn format_workout_detail(workout: &WorkoutDetail) -> String {
    let mut lines = Vec::new();

    lines.push(HEAVY_RULE.to_string());
    lines.push(format!("   WORKOUT: {}", workout.name));
    lines.push(HEAVY_RULE.to_string());

    if !workout.description.is_empty() {
        lines.push(String::new());
        lines.push(format!("Description: {}", workout.description));
    }

    lines.push(String::new());
    lines.push("INTERVALS:".to_string());
    lines.push(LIGHT_RULE.to_string());

    for interval in &workout.workout {
        lines.push(format!(
            "   {} ({}x)",
            interval.name, interval.interval_count
        ));
        lines.push(format!(
            "      Power: {} W for {}",
            interval.power.round(),
            format_duration(interval.duration)
        ));
        if let (Some(power_rest), Some(duration_rest)) =
            (interval.power_rest, interval.duration_rest)
        {
            lines.push(format!(
                "      Rest:  {} W for {}",
                power_rest.round(),
                format_duration(duration_rest)
            ));
        }
    }

    lines.push(String::new());
    lines.push(HEAVY_RULE.to_string());
    lines.join("\n")
}

pub fn format_activity_list(activities: &[ActivitySummary]) -> String {
    if activities.is_empty() {
        return "No activities found in the specified time range.".to_string();
    }

    let mut lines = Vec::new();
    lines.push(format!("Found {} activity/activities:", activities.len()));
    lines.push(String::new());

    for activity in activities {
        let type_emoji = if activity.activity_type == "Cycling" {
            "🚴"
        } else {
            "🏃"
        };

        lines.push(format!("{type_emoji} {}", activity.name));
        lines.push(format!("   ID: {}", activity.path));
        lines.push(format!("   Type: {}", activity.activity_type));
        lines.push(format!("   Date: {}", format_start_date(&activity.start_date)));
        if !activity.description.is_empty() {
            lines.push(format!("   Description: {}", activity.description));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

pub fn format_activity_detail(activity: &ActivityDetail) -> String {
    let s = &activity.summary;
    let mut lines = Vec::new();

    lines.push(HEAVY_RULE.to_string());
    lines.push(format!("   {}", activity.name));
    lines.push(HEAVY_RULE.to_string());
    lines.push(String::new());

    lines.push("📋 BASIC INFO".to_string());
    lines.push(LIGHT_RULE.to_string());
    lines.push(format!("   Type:     {}", s.activity_type));
    lines.push(format!("   Date:     {}", format_start_date(&s.start_date)));
    lines.push(format!("   Distance: {:.2} km", s.distance));
    lines.push(format!("   Duration: {}", format_duration(s.duration)));
    if !activity.description.is_empty() {
        lines.push(format!("   Notes:    {}", activity.description));
    }
    lines.push(String::new());

    lines.push("📊 XSS METRICS".to_string());
    lines.push(LIGHT_RULE.to_string());
    lines.push(format!("   Total XSS:     {:.1}", s.xss));
    lines.push(format!("   Low Strain:    {:.1}", s.xlss));
    lines.push(format!("   High Strain:   {:.1}", s.xhss));
    lines.push(format!("   Peak Strain:   {:.1}", s.xpss));
    lines.push(format!("   Focus:         {}", s.focus));
    lines.push(format!("   Specificity:   {}", s.specificity));
    lines.push(format!("   Difficulty:    {}", s.difficulty_rating));
    lines.push(String::new());

    lines.push("⚡ POWER METRICS".to_string());
    lines.push(LIGHT_RULE.to_string());
    lines.push(format!(
        "   XEP (Xert Equivalent Power): {} W",
        s.xep.round()
    ));
    lines.push(format!(
        "   MEP (Mean Equivalent Power): {} W",
        s.mep.round()
    ));
    if let Some(session) = &s.session {
        lines.push(format!(
            "   Max Power:                   {} W",
            session.max_power
        ));
        lines.push(format!(
            "   Avg Power:                   {} W",
            session.avg_power.round()
        ));
    }
    lines.push(String::new());

    lines.push("📈 FITNESS SIGNATURE (After Activity)".to_string());
    lines.push(LIGHT_RULE.to_string());
    lines.push(format!("   FTP: {} W", s.sig.ftp.round()));
    if let Some(ltp) = s.sig.ltp {
        lines.push(format!("   LTP: {} W", ltp.round()));
    }
    if let Some(hie) = s.sig.hie {
        lines.push(format!("   HIE: {hie:.1} kJ"));
    }
    lines.push(format!("   PP:  {} W", s.sig.pp.round()));
    lines.push(String::new());

    if s.breakthrough.is_some() || s.medal.is_some() {
        lines.push("🏆 ACHIEVEMENTS".to_string());
        lines.push(LIGHT_RULE.to_string());
        if s.breakthrough.is_some() {
            lines.push("   🎉 BREAKTHROUGH!".to_string());
        }
        if let Some(medal) = s.medal {
            let medal_name = match medal {
                1 => "🥇 Gold".to_string(),
                2 => "🥈 Silver".to_string(),
                3 => "🥉 Bronze".to_string(),
                other => other.to_string(),
            };
            lines.push(format!("   Medal: {medal_name}"));
        }
        lines.push(String::new());
    }

    if let Some(freshness) = &s.freshness {
        lines.push("🎯 TRAINING STATUS".to_string());
        lines.push(LIGHT_RULE.to_string());
        lines.push(format!("   Freshness: {freshness}"));
        if let Some(training_status) = s.training_status {
            lines.push(format!("   Status Score: {training_status:.2}"));
        }
        lines.push(String::new());
    }

    if s.total_grams_carbs.is_some() || s.total_grams_fat.is_some() {
        lines.push("🍎 ESTIMATED NUTRITION".to_string());
        lines.push(LIGHT_RULE.to_string());
        if let Some(carbs) = s.total_grams_carbs {
            lines.push(format!("   Carbs burned: {} g", carbs.round()));
        }
        if let Some(fat) = s.total_grams_fat {
            lines.push(format!("   Fat burned:   {} g", fat.round()));
        }
        if let Some(calories) = s.session.as_ref().map(|sess| sess.total_calories) {
            lines.push(format!("   Total calories: {calories} kcal"));
        }
        lines.push(String::new());
    }

    lines.push(HEAVY_RULE.to_string());
    lines.join("\n")
}

pub fn format_upload_result(result: &UploadResponse, base_url: &str) -> String {
    let mut output = String::from("✅ FIT file uploaded successfully!\n\n");

    if let Some(file) = result
        .json
        .as_ref()
        .and_then(|json| json.files.first())
    {
        // The server reports activity URLs relative to its own host.
        let activity_url = Url::parse(base_url)
            .and_then(|base| base.join(&file.url))
            .map(|url| url.to_string())
            .unwrap_or_else(|_| format!("{base_url}{}", file.url));

        output.push_str(&format!("   File: {}\n", file.name));
        output.push_str(&format!("   Size: {:.1} KB\n", file.size as f64 / 1024.0));
        output.push_str(&format!("   Activity URL: {activity_url}\n"));
    }

    output.push_str("\nThe activity will be processed by Xert. Use xert_list_activities to see it.");
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        FitnessSignature, TrainingLoad, UploadedFile, UploadedFiles, WorkoutInterval,
    };

    fn sample_signature() -> FitnessSignature {
        FitnessSignature {
            ftp: 250.4,
            ltp: Some(200.0),
            hie: Some(22.4),
            pp: 1050.0,
            atc: None,
        }
    }

    fn sample_load() -> TrainingLoad {
        TrainingLoad {
            low: 40.2,
            high: 8.0,
            peak: 2.0,
            total: 50.3,
        }
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(59.0), "0:59");
        assert_eq!(format_duration(60.0), "1:00");
        assert_eq!(format_duration(3600.0), "1:00:00");
        assert_eq!(format_duration(3725.0), "1:02:05");
        assert_eq!(format_duration(-1.0), "N/A");
        assert_eq!(format_duration(f64::NAN), "N/A");
    }

    #[test]
    fn test_format_start_date() {
        let start = ActivityStartDate {
            date: "2024-03-01 08:15:00".to_string(),
            timezone_type: 3,
            timezone: "Europe/Berlin".to_string(),
        };
        let rendered = format_start_date(&start);
        assert!(rendered.contains("2024"));
        assert!(rendered.contains("Europe/Berlin"));

        let garbled = ActivityStartDate {
            date: "not-a-date".to_string(),
            timezone_type: 3,
            timezone: "UTC".to_string(),
        };
        assert_eq!(format_start_date(&garbled), "not-a-date");
    }

    #[test]
    fn test_format_training_info_sections() {
        let info = TrainingInfo {
            success: true,
            weight: 72.5,
            status: "Fresh".to_string(),
            signature: sample_signature(),
            tl: sample_load(),
            target_xss: sample_load(),
            source: "garmin".to_string(),
            wotd: None,
        };

        let text = format_training_info(&info);
        assert!(text.contains("FITNESS SIGNATURE"));
        assert!(text.contains("FTP (Threshold Power):      250 W"));
        assert!(text.contains("HIE (High Intensity Energy): 22.4 kJ"));
        assert!(text.contains("Status:  Fresh"));
        assert!(text.contains("Total:        50.3"));
        assert!(!text.contains("WORKOUT OF THE DAY"));
    }

    #[test]
    fn test_format_workout_list_empty() {
        assert_eq!(format_workout_list(&[]), "No workouts found.");
    }

    #[test]
    fn test_format_workout_detail_with_rest() {
        let detail = WorkoutDetail {
            success: true,
            name: "Iron Lung".to_string(),
            description: "VO2max intervals".to_string(),
            workout: vec![WorkoutInterval {
                name: "Main Set".to_string(),
                index: 0,
                power: 320.0,
                duration: 180.0,
                power_rest: Some(120.0),
                duration_rest: Some(120.0),
                interval_count: 5,
            }],
        };

        let text = format_workout_detail(&detail);
        assert!(text.contains("WORKOUT: Iron Lung"));
        assert!(text.contains("Main Set (5x)"));
        assert!(text.contains("Power: 320 W for 3:00"));
        assert!(text.contains("Rest:  120 W for 2:00"));
    }

    #[test]
    fn test_format_activity_list_empty() {
        assert_eq!(
            format_activity_list(&[]),
            "No activities found in the specified time range."
        );
    }

    #[test]
    fn test_format_upload_result() {
        let result = UploadResponse {
            success: true,
            json: Some(UploadedFiles {
                files: vec![UploadedFile {
                    name: "ride.fit".to_string(),
                    size: 2048,
                    file_type: "application/octet-stream".to_string(),
                    url: "/activity/abc123".to_string(),
                    delete_type: "DELETE".to_string(),
                    delete_url: "/activity/abc123".to_string(),
                }],
            }),
        };

        let text = format_upload_result(&result, "https://www.xertonline.com");
        assert!(text.contains("ride.fit"));
        assert!(text.contains("2.0 KB"));
        assert!(text.contains("https://www.xertonline.com/activity/abc123"));
    }
}
