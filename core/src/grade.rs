//! Grade levels and email → grade classification.
//!
//! Classification uses academic-year arithmetic only: a graduation year
//! is found (directory first, then the email's local part) and compared
//! against the ending year of the current academic year.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A student's class level. Declaration order is the fixed iteration
/// order used everywhere (sampling, aggregation, display).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    Senior,
    Junior,
    Sophomore,
    Freshman,
    /// Faculty, staff, or any identity that cannot be classified.
    /// Never charted.
    Other,
}

impl Grade {
    /// The four chartable grades, in sampling order.
    pub const CANONICAL: [Grade; 4] = [
        Grade::Senior,
        Grade::Junior,
        Grade::Sophomore,
        Grade::Freshman,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Senior => "Senior",
            Self::Junior => "Junior",
            Self::Sophomore => "Sophomore",
            Self::Freshman => "Freshman",
            Self::Other => "Other",
        }
    }

    /// Parse a stored label. Surrounding whitespace is ignored;
    /// anything unrecognised is `Other`.
    pub fn from_label(raw: &str) -> Self {
        match raw.trim() {
            "Senior" => Self::Senior,
            "Junior" => Self::Junior,
            "Sophomore" => Self::Sophomore,
            "Freshman" => Self::Freshman,
            _ => Self::Other,
        }
    }

    /// Normalize an optional stored label to a chartable grade.
    pub fn canonical(raw: Option<&str>) -> Option<Self> {
        raw.map(Self::from_label).filter(Grade::is_canonical)
    }

    pub fn is_canonical(&self) -> bool {
        !matches!(self, Self::Other)
    }

    /// Grade for a student `years_left` years from graduating.
    pub fn from_years_left(years_left: i32) -> Self {
        match years_left {
            0 => Self::Senior,
            1 => Self::Junior,
            2 => Self::Sophomore,
            3 => Self::Freshman,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Academic years end in the summer; August starts the next one.
const ACADEMIC_YEAR_START_MONTH: u32 = 8;

/// Maps emails to grades for one academic year.
#[derive(Debug, Clone)]
pub struct GradeClassifier {
    academic_year_end: i32,
    directory: HashMap<String, i32>,
}

impl GradeClassifier {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            academic_year_end: academic_year_end(today),
            directory: HashMap::new(),
        }
    }

    /// Attach a directory of `email → graduation year`. Directory entries
    /// take precedence over the pattern embedded in the address.
    pub fn with_directory<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (S, i32)>,
        S: AsRef<str>,
    {
        self.directory.extend(
            entries
                .into_iter()
                .map(|(email, year)| (email.as_ref().trim().to_lowercase(), year)),
        );
        self
    }

    pub fn classify(&self, email: &str) -> Grade {
        match self.graduation_year(email) {
            Some(year) => year
                .checked_sub(self.academic_year_end)
                .map_or(Grade::Other, Grade::from_years_left),
            None => {
                log::debug!("no graduation year for {email}; classified as Other");
                Grade::Other
            }
        }
    }

    pub fn graduation_year(&self, email: &str) -> Option<i32> {
        let key = email.trim().to_lowercase();
        if let Some(year) = self.directory.get(&key) {
            return Some(*year);
        }
        graduation_year_from_email(&key)
    }
}

/// Ending calendar year of the academic year containing `today`.
pub fn academic_year_end(today: NaiveDate) -> i32 {
    if today.month() >= ACADEMIC_YEAR_START_MONTH {
        today.year() + 1
    } else {
        today.year()
    }
}

/// Pull a graduation year out of a local part like `jdoe27` or `jdoe2027`.
fn graduation_year_from_email(email: &str) -> Option<i32> {
    let local = email.split('@').next()?;
    let digits: String = local
        .chars()
        .rev()
        .take_while(char::is_ascii_digit)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    // An all-digit local part is an account number, not name + year.
    if digits.len() == local.len() {
        return None;
    }
    match digits.len() {
        2 => digits.parse::<i32>().ok().map(|yy| 2000 + yy),
        4 if digits.starts_with("20") => digits.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fall_2025() -> GradeClassifier {
        GradeClassifier::new(NaiveDate::from_ymd_opt(2025, 9, 20).unwrap())
    }

    #[test]
    fn academic_year_rolls_over_in_august() {
        let july = NaiveDate::from_ymd_opt(2025, 7, 31).unwrap();
        let aug = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
        assert_eq!(academic_year_end(july), 2025);
        assert_eq!(academic_year_end(aug), 2026);
    }

    #[test]
    fn two_digit_years_map_to_grades() {
        let c = fall_2025();
        assert_eq!(c.classify("jdoe26@school.org"), Grade::Senior);
        assert_eq!(c.classify("jdoe27@school.org"), Grade::Junior);
        assert_eq!(c.classify("jdoe28@school.org"), Grade::Sophomore);
        assert_eq!(c.classify("jdoe29@school.org"), Grade::Freshman);
    }

    #[test]
    fn four_digit_years_are_accepted() {
        assert_eq!(fall_2025().classify("a.smith2027@school.org"), Grade::Junior);
    }

    #[test]
    fn graduated_or_far_future_is_other() {
        let c = fall_2025();
        assert_eq!(c.classify("alum25@school.org"), Grade::Other);
        assert_eq!(c.classify("kid35@school.org"), Grade::Other);
    }

    #[test]
    fn faculty_and_numeric_ids_are_other() {
        let c = fall_2025();
        assert_eq!(c.classify("coach.miller@school.org"), Grade::Other);
        assert_eq!(c.classify("123456@school.org"), Grade::Other);
        assert_eq!(c.classify(""), Grade::Other);
    }

    #[test]
    fn directory_overrides_email_pattern() {
        let c = fall_2025().with_directory([("JDoe27@School.org", 2029)]);
        assert_eq!(c.classify("jdoe27@school.org"), Grade::Freshman);
    }

    #[test]
    fn extreme_directory_years_are_other() {
        let c = fall_2025().with_directory([("lo@school.org", i32::MIN), ("hi@school.org", i32::MAX)]);
        assert_eq!(c.classify("lo@school.org"), Grade::Other);
        assert_eq!(c.classify("hi@school.org"), Grade::Other);
    }

    #[test]
    fn labels_normalize() {
        assert_eq!(Grade::canonical(Some(" Junior ")), Some(Grade::Junior));
        assert_eq!(Grade::canonical(Some("Other")), None);
        assert_eq!(Grade::canonical(Some("")), None);
        assert_eq!(Grade::canonical(Some("9")), None);
        assert_eq!(Grade::canonical(None), None);
    }
}
