// src/domain/template/entity.rs

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc, Weekday};
use uuid::Uuid;

use crate::domain::block::Block;
use crate::domain::playout::DecoTemplateItem;

/// Ordered set of Blocks placed at times-of-day.
#[derive(Debug, Clone)]
pub struct Template {
    /// Internal immutable identifier
    pub id: Uuid,

    pub name: String,

    /// Blocks placed at wall-clock times of day
    pub items: Vec<TemplateItem>,

    /// Per-time-span deco overrides for filler selection (may be empty)
    pub deco_items: Vec<DecoTemplateItem>,

    /// Last modification timestamp; part of the occurrence fingerprint
    pub updated_at: DateTime<Utc>,
}

/// One block placement inside a Template
#[derive(Debug, Clone)]
pub struct TemplateItem {
    pub id: Uuid,

    /// Wall-clock start, interpreted in the playout's timezone on the
    /// concrete calendar day the template applies to
    pub start_time: NaiveTime,

    pub block: Block,
}

/// Recurrence rule binding a Template to specific calendar days.
///
/// For a given day, exactly the assignments whose recurrence matches are
/// candidates; selection among candidates is by priority `index` (see
/// `services::block_resolver::select_template_for`).
#[derive(Debug, Clone)]
pub struct PlayoutTemplate {
    /// Internal immutable identifier
    pub id: Uuid,

    /// Disambiguation priority; lower wins when several assignments match
    pub index: u32,

    pub template: Template,

    pub days_of_week: Vec<Weekday>,

    /// 1..=31
    pub days_of_month: Vec<u32>,

    /// 1..=12
    pub months_of_year: Vec<u32>,

    /// When set, the assignment only applies inside this month/day window
    pub date_range: Option<DateRange>,

    /// Last modification timestamp; part of the occurrence fingerprint
    pub updated_at: DateTime<Utc>,
}

/// Inclusive month/day window, evaluated irrespective of year. A start
/// later than the end wraps across the new year (e.g. Nov 1 through Feb 28).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start_month: u32,
    pub start_day: u32,
    pub end_month: u32,
    pub end_day: u32,
}

impl DateRange {
    /// Month/day tuples compare lexicographically, so an endpoint that names
    /// a day the current year lacks (Feb 29) still bounds the window.
    pub fn contains(&self, date: NaiveDate) -> bool {
        let day = (date.month(), date.day());
        let start = (self.start_month, self.start_day);
        let end = (self.end_month, self.end_day);
        if start <= end {
            start <= day && day <= end
        } else {
            day >= start || day <= end
        }
    }
}

impl Template {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            items: Vec::new(),
            deco_items: Vec::new(),
            updated_at: Utc::now(),
        }
    }
}

impl PlayoutTemplate {
    pub fn new(template: Template, index: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            index,
            template,
            days_of_week: Self::all_days_of_week(),
            days_of_month: Self::all_days_of_month(),
            months_of_year: Self::all_months_of_year(),
            date_range: None,
            updated_at: Utc::now(),
        }
    }

    pub fn all_days_of_week() -> Vec<Weekday> {
        vec![
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ]
    }

    pub fn all_days_of_month() -> Vec<u32> {
        (1..=31).collect()
    }

    pub fn all_months_of_year() -> Vec<u32> {
        (1..=12).collect()
    }

    /// True when this assignment's recurrence matches the given calendar day
    pub fn applies_to(&self, date: NaiveDate) -> bool {
        self.days_of_week.contains(&date.weekday())
            && self.days_of_month.contains(&date.day())
            && self.months_of_year.contains(&date.month())
            && self.date_range.map_or(true, |range| range.contains(date))
    }
}
