use crate::error::{LendingError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const LOWER_SALARY_BAND: i64 = 10_000;
pub const UPPER_SALARY_BAND: i64 = 20_000;

/// Letter grade handed back by a credit-rating agency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreditGrade {
    A,
    B,
    C,
}

impl fmt::Display for CreditGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            CreditGrade::A => "A",
            CreditGrade::B => "B",
            CreditGrade::C => "C",
        };
        f.write_str(letter)
    }
}

/// Grades a salary into bands. The band edges themselves are unclassified.
pub fn grade(salary: i64) -> Result<CreditGrade> {
    match salary {
        s if s < LOWER_SALARY_BAND => Ok(CreditGrade::C),
        s if s > LOWER_SALARY_BAND && s < UPPER_SALARY_BAND => Ok(CreditGrade::B),
        s if s > UPPER_SALARY_BAND => Ok(CreditGrade::A),
        s => Err(LendingError::BusinessRule(format!(
            "salary {s} sits on a band edge and cannot be graded"
        ))),
    }
}
