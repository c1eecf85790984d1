// src/services/block_resolver.rs
//
// Resolves recurrence assignments into the concrete ordered list of block
// occurrences inside a build window. All local wall-clock times go through
// `resolve_local`, which is the single place daylight-saving rules apply.
//
// CRITICAL RULES:
// - At most one template is selected per calendar day
// - Occurrence starts are computed from the local calendar day, never by
//   adding 24h to the previous day's instant
// - An occurrence already in progress at the window start is kept; its
//   build still begins at the nominal occurrence start

use chrono::{DateTime, Days, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use uuid::Uuid;

use crate::domain::block::Block;
use crate::domain::keys::BlockKey;
use crate::domain::template::PlayoutTemplate;

/// A concrete occurrence of a block on the calendar, ready to schedule
#[derive(Debug, Clone)]
pub struct EffectiveBlock {
    pub block: Block,
    pub template_item_id: Uuid,

    /// Resolved UTC start of this occurrence
    pub start: DateTime<Utc>,

    /// Fingerprint of everything that shaped this occurrence
    pub block_key: BlockKey,
}

/// Pick the assignment for a calendar day: among those whose recurrence
/// matches, the lowest `index` wins, then the lowest id so the choice is
/// total even for misconfigured duplicate indexes.
pub fn select_template_for(
    templates: &[PlayoutTemplate],
    date: NaiveDate,
) -> Option<&PlayoutTemplate> {
    templates
        .iter()
        .filter(|pt| pt.applies_to(date))
        .min_by_key(|pt| (pt.index, pt.id))
}

/// Resolve a local wall-clock time on a calendar day to a UTC instant.
///
/// Times erased by a spring-forward gap roll forward one hour; times
/// repeated by a fall-back are taken at their earliest occurrence.
pub fn resolve_local(timezone: Tz, date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    let naive = date.and_time(time);
    match timezone.from_local_datetime(&naive) {
        LocalResult::Single(resolved) => resolved.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => {
            let shifted = naive + Duration::hours(1);
            match timezone.from_local_datetime(&shifted) {
                LocalResult::Single(resolved) => resolved.with_timezone(&Utc),
                LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
                // no real timezone has adjacent transitions; treat as UTC
                LocalResult::None => Utc.from_utc_datetime(&shifted),
            }
        }
    }
}

/// All block occurrences between `start` and `start + days_to_build` days,
/// ordered by start time. Occurrences that finish at or before `start` are
/// dropped; one still running at `start` is kept.
pub fn get_effective_blocks(
    templates: &[PlayoutTemplate],
    timezone: Tz,
    start: DateTime<Utc>,
    days_to_build: u32,
) -> Vec<EffectiveBlock> {
    let stop = start + Duration::days(i64::from(days_to_build));
    let first_date = start.with_timezone(&timezone).date_naive();

    let mut effective = Vec::new();
    for offset in 0..=u64::from(days_to_build) {
        let Some(date) = first_date.checked_add_days(Days::new(offset)) else {
            break;
        };
        let Some(playout_template) = select_template_for(templates, date) else {
            continue;
        };
        for template_item in &playout_template.template.items {
            let occurrence_start = resolve_local(timezone, date, template_item.start_time);
            if occurrence_start + template_item.block.duration() <= start {
                continue;
            }
            if occurrence_start >= stop {
                continue;
            }
            effective.push(EffectiveBlock {
                block: template_item.block.clone(),
                template_item_id: template_item.id,
                start: occurrence_start,
                block_key: BlockKey::new(
                    &template_item.block,
                    &playout_template.template,
                    playout_template,
                ),
            });
        }
    }

    effective.sort_by_key(|eb| eb.start);
    effective
}
