use crate::doctors::Doctor;
use anyhow::{bail, Context, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const CONSULTATION_MINUTES: u32 = 30;
const MEETING_ROOM_BASE: &str = "https://meet.medisafe.com/room/";
const BOOKING_WINDOW_DAYS: i64 = 7;

/// Bookable start times offered for every day.
pub const TIME_SLOTS: [&str; 18] = [
    "09:00 AM", "09:30 AM", "10:00 AM", "10:30 AM", "11:00 AM", "11:30 AM",
    "02:00 PM", "02:30 PM", "03:00 PM", "03:30 PM", "04:00 PM", "04:30 PM",
    "05:00 PM", "05:30 PM", "06:00 PM", "06:30 PM", "07:00 PM", "07:30 PM",
];

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConsultationMode {
    #[default]
    Video,
    Audio,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConsultationStatus {
    Scheduled,
    Ongoing,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Consultation {
    pub id: String,
    pub user_id: String,
    pub doctor_id: String,
    pub scheduled_at: String,
    pub duration: u32,
    pub mode: ConsultationMode,
    pub status: ConsultationStatus,
    pub meeting_link: Option<String>,
    pub notes: Option<String>,
    pub fee: u32,
    pub created_at: String,
}

/// The next seven calendar days starting at `today`.
pub fn available_dates(today: NaiveDate) -> Vec<NaiveDate> {
    (0..BOOKING_WINDOW_DAYS)
        .map(|offset| today + Duration::days(offset))
        .collect()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingCalendar {
    pub dates: Vec<NaiveDate>,
    pub time_slots: &'static [&'static str],
}

/// Dates and start times a booking form offers from `today`.
pub fn booking_calendar(today: NaiveDate) -> BookingCalendar {
    BookingCalendar {
        dates: available_dates(today),
        time_slots: &TIME_SLOTS,
    }
}

fn parse_slot(date: &str, time: &str) -> Result<NaiveDateTime> {
    let day = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .with_context(|| format!("invalid consultation date: {date}"))?;
    let time = time.trim();
    let at = NaiveTime::parse_from_str(time, "%I:%M %p")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M"))
        .with_context(|| format!("invalid consultation time: {time}"))?;
    Ok(day.and_time(at))
}

/// Creates a scheduled consultation. No availability or conflict checks are made.
pub fn book_consultation(
    user_id: &str,
    doctor: &Doctor,
    date: &str,
    time: &str,
    mode: ConsultationMode,
    symptoms: &str,
) -> Result<Consultation> {
    if time.trim().is_empty() {
        bail!("a time slot must be chosen");
    }
    if symptoms.trim().is_empty() {
        bail!("describe the symptoms before booking");
    }
    let scheduled = parse_slot(date, time)?;
    let id = Uuid::new_v4();

    Ok(Consultation {
        id: id.to_string(),
        user_id: user_id.to_string(),
        doctor_id: doctor.id.clone(),
        scheduled_at: scheduled.format("%Y-%m-%dT%H:%M:%S").to_string(),
        duration: CONSULTATION_MINUTES,
        mode,
        status: ConsultationStatus::Scheduled,
        meeting_link: Some(format!("{MEETING_ROOM_BASE}{}", id.simple())),
        notes: Some(symptoms.trim().to_string()),
        fee: doctor.consultation_fee,
        created_at: Utc::now().to_rfc3339(),
    })
}
