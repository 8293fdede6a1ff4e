use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use locaspace_shared::{DraftDates, DraftPersonal, Masked};

static EMAIL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static pattern"));
static PHONE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\+?[0-9]{10,15}$").expect("static pattern"));
static CARD_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{16}$").expect("static pattern"));
static EXPIRY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(0[1-9]|1[0-2])/[0-9]{2}$").expect("static pattern"));
static CVV: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{3,4}$").expect("static pattern"));

const NAME_MIN_LEN: usize = 2;
const MESSAGE_MAX_LEN: usize = 500;

/// Field name → failed rule codes (`required`, `minlength`, `email`...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<&'static str, Vec<&'static str>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, rule: &'static str) {
        self.0.entry(field).or_default().push(rule);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[&'static str]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn has(&self, field: &str, rule: &str) -> bool {
        self.get(field)
            .is_some_and(|rules| rules.iter().any(|r| *r == rule))
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, rules)| format!("{} ({})", field, rules.join(", ")))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

// ============================================================================
// Step 1: dates
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatesForm {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub guests: u32,
}

impl Default for DatesForm {
    fn default() -> Self {
        Self {
            start_date: None,
            end_date: None,
            guests: 1,
        }
    }
}

impl From<DraftDates> for DatesForm {
    fn from(d: DraftDates) -> Self {
        Self {
            start_date: d.start_date,
            end_date: d.end_date,
            guests: d.guests,
        }
    }
}

impl From<&DatesForm> for DraftDates {
    fn from(f: &DatesForm) -> Self {
        Self {
            start_date: f.start_date,
            end_date: f.end_date,
            guests: f.guests,
        }
    }
}

/// Limits the dates step is checked against.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateRules {
    pub max_guests: Option<u32>,
    /// Refuse stays whose end date is not after the start date.
    pub reject_empty_stays: bool,
}

pub fn validate_dates(form: &DatesForm, rules: DateRules) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if form.start_date.is_none() {
        errors.add("startDate", "required");
    }
    if form.end_date.is_none() {
        errors.add("endDate", "required");
    }
    if form.guests == 0 {
        errors.add("guests", "required");
    }
    if let Some(max) = rules.max_guests {
        if form.guests > max {
            errors.add("guests", "max");
        }
    }
    if rules.reject_empty_stays {
        if let (Some(start), Some(end)) = (form.start_date, form.end_date) {
            if end <= start {
                errors.add("endDate", "dateRange");
            }
        }
    }

    errors
}

// ============================================================================
// Step 2: personal information
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
}

impl From<DraftPersonal> for PersonalForm {
    fn from(d: DraftPersonal) -> Self {
        Self {
            first_name: d.first_name,
            last_name: d.last_name,
            email: d.email,
            phone: d.phone,
            message: d.message,
        }
    }
}

impl From<&PersonalForm> for DraftPersonal {
    fn from(f: &PersonalForm) -> Self {
        Self {
            first_name: f.first_name.clone(),
            last_name: f.last_name.clone(),
            email: f.email.clone(),
            phone: f.phone.clone(),
            message: f.message.clone(),
        }
    }
}

pub fn validate_personal(form: &PersonalForm) -> FieldErrors {
    let mut errors = FieldErrors::new();

    for (field, value) in [("firstName", &form.first_name), ("lastName", &form.last_name)] {
        let value = value.trim();
        if value.is_empty() {
            errors.add(field, "required");
        } else if value.chars().count() < NAME_MIN_LEN {
            errors.add(field, "minlength");
        }
    }

    let email = form.email.trim();
    if email.is_empty() {
        errors.add("email", "required");
    } else if !EMAIL.is_match(email) {
        errors.add("email", "email");
    }

    let phone: String = form
        .phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '.' | '-'))
        .collect();
    if phone.is_empty() {
        errors.add("phone", "required");
    } else if !PHONE.is_match(&phone) {
        errors.add("phone", "pattern");
    }

    if form.message.chars().count() > MESSAGE_MAX_LEN {
        errors.add("message", "maxlength");
    }

    errors
}

// ============================================================================
// Step 3: payment
// ============================================================================

/// Card details. Held masked and never written to a draft.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentForm {
    pub card_holder: String,
    pub card_number: Masked<String>,
    pub expiry: String,
    pub cvv: Masked<String>,
}

pub fn validate_payment(form: &PaymentForm) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if form.card_holder.trim().is_empty() {
        errors.add("cardHolder", "required");
    }

    let number: String = form.card_number.expose().chars().filter(|c| *c != ' ').collect();
    if number.is_empty() {
        errors.add("cardNumber", "required");
    } else if !CARD_NUMBER.is_match(&number) {
        errors.add("cardNumber", "pattern");
    }

    let expiry = form.expiry.trim();
    if expiry.is_empty() {
        errors.add("expiry", "required");
    } else if !EXPIRY.is_match(expiry) {
        errors.add("expiry", "pattern");
    }

    let cvv = form.cvv.expose().trim();
    if cvv.is_empty() {
        errors.add("cvv", "required");
    } else if !CVV.is_match(cvv) {
        errors.add("cvv", "pattern");
    }

    errors
}
