// src/domain/template/invariants.rs

use super::entity::PlayoutTemplate;
use crate::domain::{DomainError, DomainResult};

/// Validates all PlayoutTemplate invariants
pub fn validate_playout_template(playout_template: &PlayoutTemplate) -> DomainResult<()> {
    validate_recurrence_sets(playout_template)?;
    validate_ranges(playout_template)?;
    Ok(())
}

/// An assignment with any empty recurrence set can never match a day and is
/// almost certainly a configuration mistake.
fn validate_recurrence_sets(playout_template: &PlayoutTemplate) -> DomainResult<()> {
    if playout_template.days_of_week.is_empty() {
        return Err(DomainError::EmptyRecurrence {
            field: "days_of_week",
        });
    }
    if playout_template.days_of_month.is_empty() {
        return Err(DomainError::EmptyRecurrence {
            field: "days_of_month",
        });
    }
    if playout_template.months_of_year.is_empty() {
        return Err(DomainError::EmptyRecurrence {
            field: "months_of_year",
        });
    }
    Ok(())
}

fn validate_ranges(playout_template: &PlayoutTemplate) -> DomainResult<()> {
    for &day in &playout_template.days_of_month {
        if !(1..=31).contains(&day) {
            return Err(DomainError::DayOfMonthOutOfRange { day });
        }
    }
    for &month in &playout_template.months_of_year {
        if !(1..=12).contains(&month) {
            return Err(DomainError::MonthOutOfRange { month });
        }
    }
    if let Some(range) = playout_template.date_range {
        for day in [range.start_day, range.end_day] {
            if !(1..=31).contains(&day) {
                return Err(DomainError::DayOfMonthOutOfRange { day });
            }
        }
        for month in [range.start_month, range.end_month] {
            if !(1..=12).contains(&month) {
                return Err(DomainError::MonthOutOfRange { month });
            }
        }
    }
    Ok(())
}
