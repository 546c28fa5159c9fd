use once_cell::sync::Lazy;
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use std::collections::BTreeMap;

static EMAIL: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok());
static PHONE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^\+?[0-9]{10,13}$").ok());
static DATE: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"^[0-9]{4}-(0[1-9]|1[0-2])-(0[1-9]|[12][0-9]|3[01])$").ok()
});
static PAN: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[A-Z]{5}[0-9]{4}[A-Z]$").ok());
static AADHAAR: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[0-9]{12}$").ok());

fn matches_pattern(pattern: &Lazy<Option<Regex>>, value: &str) -> bool {
    pattern.as_ref().is_some_and(|re| re.is_match(value))
}

fn valid_email(email: &str) -> bool {
    matches_pattern(&EMAIL, email)
}

fn valid_phone(phone: &str) -> bool {
    matches_pattern(&PHONE, phone)
}

fn valid_date(date: &str) -> bool {
    matches_pattern(&DATE, date)
}

fn valid_pan(pan: &str) -> bool {
    matches_pattern(&PAN, pan)
}

fn valid_aadhaar(aadhaar: &str) -> bool {
    matches_pattern(&AADHAAR, aadhaar)
}

fn secret<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SecretString, D::Error> {
    String::deserialize(deserializer).map(SecretString::from)
}

/// Text that the backend may send as `null`; read as empty.
fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Count {
    Number(u32),
    Text(String),
}

/// Bed count sent as a number, a numeric string or `null`.
fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    match Option::<Count>::deserialize(deserializer)? {
        None => Ok(0),
        Some(Count::Number(count)) => Ok(count),
        Some(Count::Text(text)) if text.trim().is_empty() => Ok(0),
        Some(Count::Text(text)) => text.trim().parse().map_err(D::Error::custom),
    }
}

/// Field name to message, in a stable order for rendering.
pub type FieldErrors = BTreeMap<&'static str, String>;

/// Response wrapper used by every backend endpoint; `status == 200` is success.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub status: u16,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginChallenge {
    pub pending_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VerifiedLogin {
    pub token: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default, deserialize_with = "secret")]
    pub password: SecretString,
    #[serde(default)]
    pub next: Option<String>,
}

impl LoginForm {
    pub(crate) fn body(&self) -> serde_json::Value {
        serde_json::json!({
            "email": self.email.trim(),
            "password": self.password.expose_secret(),
        })
    }

    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if !valid_email(self.email.trim()) {
            errors.insert("email", "Enter a valid email address".to_string());
        }
        if self.password.expose_secret().is_empty() {
            errors.insert("password", "Password is required".to_string());
        }
        errors
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OtpForm {
    #[serde(default)]
    pub otp: String,
}

impl OtpForm {
    #[must_use]
    pub fn code(&self) -> &str {
        self.otp.trim()
    }

    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        let code = self.code();
        (4..=8).contains(&code.len()) && code.chars().all(|c| c.is_ascii_digit())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    #[serde(default)]
    pub hospital_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default, deserialize_with = "secret")]
    pub password: SecretString,
}

impl Registration {
    pub(crate) fn body(&self) -> serde_json::Value {
        serde_json::json!({
            "hospitalName": self.hospital_name.trim(),
            "email": self.email.trim(),
            "phoneNumber": self.phone_number.trim(),
            "password": self.password.expose_secret(),
        })
    }

    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.hospital_name.trim().is_empty() {
            errors.insert("hospitalName", "Hospital name is required".to_string());
        }
        if !valid_email(self.email.trim()) {
            errors.insert("email", "Enter a valid email address".to_string());
        }
        if !valid_phone(self.phone_number.trim()) {
            errors.insert("phoneNumber", "Enter a valid phone number".to_string());
        }
        if self.password.expose_secret().len() < 8 {
            errors.insert(
                "password",
                "Password must be at least 8 characters".to_string(),
            );
        }
        errors
    }
}

/// Hospital record as the backend returns it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HospitalDetails {
    #[serde(deserialize_with = "text")]
    pub hospital_name: String,
    #[serde(deserialize_with = "text")]
    pub hospital_owner_details: String,
    #[serde(deserialize_with = "text")]
    pub hospital_location: String,
    #[serde(deserialize_with = "text")]
    pub hospital_phone_number: String,
    #[serde(deserialize_with = "text")]
    pub hospital_date_of_registration: String,
    #[serde(rename = "hospitalDMHORegistration", deserialize_with = "text")]
    pub hospital_dmho_registration: String,
    #[serde(deserialize_with = "text")]
    pub hospital_services_offered: String,
    #[serde(deserialize_with = "text")]
    pub hospital_specialist_services: String,
    #[serde(deserialize_with = "count")]
    pub hospital_number_of_beds: u32,
    #[serde(deserialize_with = "text")]
    pub hospital_areas_of_interest: String,
    pub hospital_incorporating_certificate: Option<String>,
}

/// Hospital profile as shown on the profile screen and sent back on update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileData {
    pub hospital_name: String,
    pub owner_details: String,
    pub hospital_location: String,
    pub phone_number: String,
    pub date_of_registration: String,
    pub dmho_registration: String,
    pub services_offered: String,
    pub specialist_services: String,
    pub number_of_beds: u32,
    pub areas_of_interest: String,
    pub incorporating_certificate: Option<String>,
    pub address: String,
}

impl From<HospitalDetails> for ProfileData {
    fn from(details: HospitalDetails) -> Self {
        let date_of_registration = date_part(&details.hospital_date_of_registration);
        let incorporating_certificate = details
            .hospital_incorporating_certificate
            .filter(|name| !name.trim().is_empty());
        Self {
            address: details.hospital_location.clone(),
            hospital_name: details.hospital_name,
            owner_details: details.hospital_owner_details,
            hospital_location: details.hospital_location,
            phone_number: details.hospital_phone_number,
            date_of_registration,
            dmho_registration: details.hospital_dmho_registration,
            services_offered: details.hospital_services_offered,
            specialist_services: details.hospital_specialist_services,
            number_of_beds: details.hospital_number_of_beds,
            areas_of_interest: details.hospital_areas_of_interest,
            incorporating_certificate,
        }
    }
}

fn date_part(timestamp: &str) -> String {
    timestamp
        .split('T')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    TextArea,
    Number,
    File,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    HospitalName,
    OwnerDetails,
    HospitalLocation,
    PhoneNumber,
    DateOfRegistration,
    DmhoRegistration,
    ServicesOffered,
    SpecialistServices,
    NumberOfBeds,
    AreasOfInterest,
    IncorporatingCertificate,
    Address,
}

impl ProfileField {
    pub const ALL: [Self; 12] = [
        Self::HospitalName,
        Self::OwnerDetails,
        Self::HospitalLocation,
        Self::PhoneNumber,
        Self::DateOfRegistration,
        Self::DmhoRegistration,
        Self::ServicesOffered,
        Self::SpecialistServices,
        Self::NumberOfBeds,
        Self::AreasOfInterest,
        Self::IncorporatingCertificate,
        Self::Address,
    ];

    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::HospitalName => "hospitalName",
            Self::OwnerDetails => "ownerDetails",
            Self::HospitalLocation => "hospitalLocation",
            Self::PhoneNumber => "phoneNumber",
            Self::DateOfRegistration => "dateOfRegistration",
            Self::DmhoRegistration => "dmhoRegistration",
            Self::ServicesOffered => "servicesOffered",
            Self::SpecialistServices => "specialistServices",
            Self::NumberOfBeds => "numberOfBeds",
            Self::AreasOfInterest => "areasOfInterest",
            Self::IncorporatingCertificate => "incorporatingCertificate",
            Self::Address => "address",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::HospitalName => "Hospital Name",
            Self::OwnerDetails => "Owner Details",
            Self::HospitalLocation => "Hospital Location",
            Self::PhoneNumber => "Phone Number",
            Self::DateOfRegistration => "Date of Registration",
            Self::DmhoRegistration => "DMHO Registration",
            Self::ServicesOffered => "Services Offered",
            Self::SpecialistServices => "Specialist Services",
            Self::NumberOfBeds => "Number of Beds",
            Self::AreasOfInterest => "Areas of Interest",
            Self::IncorporatingCertificate => "Incorporating Certificate",
            Self::Address => "Address",
        }
    }

    #[must_use]
    pub fn editable(self) -> bool {
        matches!(
            self,
            Self::OwnerDetails
                | Self::ServicesOffered
                | Self::SpecialistServices
                | Self::NumberOfBeds
                | Self::AreasOfInterest
        )
    }

    #[must_use]
    pub fn kind(self) -> FieldKind {
        match self {
            Self::NumberOfBeds => FieldKind::Number,
            Self::IncorporatingCertificate => FieldKind::File,
            Self::OwnerDetails
            | Self::ServicesOffered
            | Self::SpecialistServices
            | Self::AreasOfInterest => FieldKind::TextArea,
            _ => FieldKind::Text,
        }
    }

    #[must_use]
    pub fn value(self, profile: &ProfileData) -> String {
        match self {
            Self::HospitalName => profile.hospital_name.clone(),
            Self::OwnerDetails => profile.owner_details.clone(),
            Self::HospitalLocation => profile.hospital_location.clone(),
            Self::PhoneNumber => profile.phone_number.clone(),
            Self::DateOfRegistration => profile.date_of_registration.clone(),
            Self::DmhoRegistration => profile.dmho_registration.clone(),
            Self::ServicesOffered => profile.services_offered.clone(),
            Self::SpecialistServices => profile.specialist_services.clone(),
            Self::NumberOfBeds => profile.number_of_beds.to_string(),
            Self::AreasOfInterest => profile.areas_of_interest.clone(),
            Self::IncorporatingCertificate => profile
                .incorporating_certificate
                .clone()
                .unwrap_or_default(),
            Self::Address => profile.address.clone(),
        }
    }
}

/// Submitted profile edit form. Only editable fields are accepted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileEdits {
    pub owner_details: String,
    pub services_offered: String,
    pub specialist_services: String,
    pub number_of_beds: String,
    pub areas_of_interest: String,
}

impl ProfileEdits {
    /// `current` with the submitted text fields; the bed count is left as is.
    #[must_use]
    pub fn preview(&self, current: &ProfileData) -> ProfileData {
        ProfileData {
            owner_details: self.owner_details.trim().to_string(),
            services_offered: self.services_offered.trim().to_string(),
            specialist_services: self.specialist_services.trim().to_string(),
            areas_of_interest: self.areas_of_interest.trim().to_string(),
            ..current.clone()
        }
    }

    /// Merge the edits into `current`, keeping every non-editable field.
    ///
    /// # Errors
    /// Returns the per-field messages when the number of beds is not a count.
    pub fn apply(&self, current: &ProfileData) -> Result<ProfileData, FieldErrors> {
        let number_of_beds = self.number_of_beds.trim().parse::<u32>().map_err(|_| {
            FieldErrors::from([(
                ProfileField::NumberOfBeds.key(),
                "Number of beds must be a whole number".to_string(),
            )])
        })?;
        Ok(ProfileData {
            number_of_beds,
            ..self.preview(current)
        })
    }
}

pub const GENDERS: [&str; 3] = ["Male", "Female", "Other"];

/// Add-role form, posted as-is to the patients endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientForm {
    pub name: String,
    pub gender: String,
    pub email: String,
    pub phone_number: String,
    pub date_of_birth: String,
    pub pan_card: String,
    pub aadhaar_card: String,
    pub role_name: String,
}

impl PatientForm {
    /// Trimmed copy with PAN upper-cased.
    #[must_use]
    pub fn normalized(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            gender: self.gender.trim().to_string(),
            email: self.email.trim().to_string(),
            phone_number: self.phone_number.trim().to_string(),
            date_of_birth: self.date_of_birth.trim().to_string(),
            pan_card: self.pan_card.trim().to_uppercase(),
            aadhaar_card: self.aadhaar_card.split_whitespace().collect(),
            role_name: self.role_name.trim().to_string(),
        }
    }

    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.name.is_empty() {
            errors.insert("name", "Name is required".to_string());
        }
        if !GENDERS.contains(&self.gender.as_str()) {
            errors.insert("gender", "Select a gender".to_string());
        }
        if !valid_email(&self.email) {
            errors.insert("email", "Enter a valid email address".to_string());
        }
        if !valid_phone(&self.phone_number) {
            errors.insert("phoneNumber", "Enter a valid phone number".to_string());
        }
        if !valid_date(&self.date_of_birth) {
            errors.insert("dateOfBirth", "Enter a date of birth".to_string());
        }
        if !valid_pan(&self.pan_card) {
            errors.insert("panCard", "PAN must look like ABCDE1234F".to_string());
        }
        if !valid_aadhaar(&self.aadhaar_card) {
            errors.insert("aadhaarCard", "Aadhaar must be 12 digits".to_string());
        }
        if self.role_name.is_empty() {
            errors.insert("roleName", "Role name is required".to_string());
        }
        errors
    }
}
