use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub start: String,
    pub end: String,
    pub is_booked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DoctorAvailability {
    pub day: String,
    pub slots: Vec<TimeSlot>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub id: String,
    pub name: String,
    pub qualification: String,
    pub specialization: Vec<String>,
    pub experience: u32,
    pub languages: Vec<String>,
    pub rating: f64,
    pub total_consultations: u32,
    pub about: String,
    pub availability: Vec<DoctorAvailability>,
    pub consultation_fee: u32,
    pub is_verified: bool,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DoctorSort {
    #[default]
    Rating,
    Experience,
    Consultations,
    /// Cheapest first.
    Fee,
}

impl DoctorSort {
    pub fn parse_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "rating" => Some(Self::Rating),
            "experience" => Some(Self::Experience),
            "consultations" => Some(Self::Consultations),
            "fee" => Some(Self::Fee),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DoctorQuery {
    /// Matched against the name and every specialization, case-insensitively.
    pub text: String,
    /// Exact specialization; `None` means all.
    pub specialization: Option<String>,
    pub sort: DoctorSort,
}

pub struct DoctorDirectory {
    doctors: Vec<Doctor>,
}

impl DoctorDirectory {
    pub fn new(doctors: Vec<Doctor>) -> Self {
        Self { doctors }
    }

    pub fn builtin() -> Self {
        Self::new(builtin_doctors())
    }

    pub fn all(&self) -> &[Doctor] {
        &self.doctors
    }

    pub fn get(&self, id: &str) -> Option<&Doctor> {
        self.doctors.iter().find(|d| d.id == id)
    }

    /// Distinct primary specializations in directory order.
    pub fn specializations(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for doctor in &self.doctors {
            if let Some(primary) = doctor.specialization.first() {
                if !seen.contains(&primary.as_str()) {
                    seen.push(primary.as_str());
                }
            }
        }
        seen
    }

    pub fn find(&self, query: &DoctorQuery) -> Vec<&Doctor> {
        let text = query.text.trim().to_lowercase();
        let mut found: Vec<&Doctor> = self
            .doctors
            .iter()
            .filter(|d| {
                d.name.to_lowercase().contains(&text)
                    || d.specialization.iter().any(|s| s.to_lowercase().contains(&text))
            })
            .filter(|d| match &query.specialization {
                Some(spec) => d.specialization.iter().any(|s| s == spec),
                None => true,
            })
            .collect();

        match query.sort {
            DoctorSort::Rating => found.sort_by(|a, b| {
                b.rating
                    .partial_cmp(&a.rating)
                    .unwrap_or(std::cmp::Ordering::Equal)
            }),
            DoctorSort::Experience => found.sort_by(|a, b| b.experience.cmp(&a.experience)),
            DoctorSort::Consultations => {
                found.sort_by(|a, b| b.total_consultations.cmp(&a.total_consultations))
            }
            DoctorSort::Fee => found.sort_by(|a, b| a.consultation_fee.cmp(&b.consultation_fee)),
        }
        found
    }
}

#[allow(clippy::too_many_arguments)]
fn doctor(
    id: &str,
    name: &str,
    qualification: &str,
    specialization: &[&str],
    experience: u32,
    languages: &[&str],
    rating: f64,
    total_consultations: u32,
    fee: u32,
    about: &str,
) -> Doctor {
    Doctor {
        id: id.to_string(),
        name: name.to_string(),
        qualification: qualification.to_string(),
        specialization: specialization.iter().map(|s| s.to_string()).collect(),
        experience,
        languages: languages.iter().map(|s| s.to_string()).collect(),
        rating,
        total_consultations,
        about: about.to_string(),
        availability: Vec::new(),
        consultation_fee: fee,
        is_verified: true,
    }
}

fn slot(start: &str, end: &str, is_booked: bool) -> TimeSlot {
    TimeSlot {
        start: start.to_string(),
        end: end.to_string(),
        is_booked,
    }
}

fn builtin_doctors() -> Vec<Doctor> {
    let mut sharma = doctor(
        "1",
        "Dr. Priya Sharma",
        "MBBS, MD (Internal Medicine)",
        &["Internal Medicine", "Diabetes", "Hypertension"],
        12,
        &["English", "Hindi", "Punjabi"],
        4.9,
        2847,
        500,
        "Internal medicine specialist focused on diabetes management, hypertension and preventive care.",
    );
    sharma.availability = vec![DoctorAvailability {
        day: "Monday".to_string(),
        slots: vec![
            slot("09:00", "09:30", false),
            slot("09:30", "10:00", true),
            slot("10:00", "10:30", false),
        ],
    }];

    vec![
        sharma,
        doctor(
            "2",
            "Dr. Rajesh Kumar",
            "MBBS, MS (General Surgery)",
            &["General Surgery", "Laparoscopic Surgery", "Emergency Medicine"],
            15,
            &["English", "Hindi", "Bengali"],
            4.8,
            3256,
            600,
            "General surgeon with expertise in minimally invasive laparoscopic procedures.",
        ),
        doctor(
            "3",
            "Dr. Anita Patel",
            "MBBS, MD (Pediatrics)",
            &["Pediatrics", "Child Development", "Vaccination"],
            10,
            &["English", "Hindi", "Gujarati"],
            4.9,
            1892,
            450,
            "Pediatrician covering child healthcare, development monitoring and immunization.",
        ),
        doctor(
            "4",
            "Dr. Mohammed Ali",
            "MBBS, MD (Cardiology)",
            &["Cardiology", "Heart Disease", "Interventional Cardiology"],
            18,
            &["English", "Hindi", "Urdu"],
            4.9,
            4123,
            800,
            "Cardiologist experienced in interventional cardiology and heart disease management.",
        ),
        doctor(
            "5",
            "Dr. Sunita Reddy",
            "MBBS, MD (Dermatology)",
            &["Dermatology", "Skin Care", "Cosmetic Dermatology"],
            8,
            &["English", "Hindi", "Telugu"],
            4.7,
            1567,
            550,
            "Medical and cosmetic dermatologist.",
        ),
        doctor(
            "6",
            "Dr. Vikram Singh",
            "MBBS, MD (Psychiatry)",
            &["Psychiatry", "Mental Health", "Anxiety & Depression"],
            14,
            &["English", "Hindi", "Marathi"],
            4.8,
            2234,
            700,
            "Psychiatrist specializing in anxiety, depression and stress-related disorders.",
        ),
    ]
}
