//! Time-of-day grouping for slot lists

use crate::i18n::Text;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DayPeriod {
    Morning,
    Afternoon,
    Evening,
}

impl DayPeriod {
    /// Period for an `HH:MM` slot; `None` when the hour is unreadable
    pub fn of(slot: &str) -> Option<Self> {
        let hour: u32 = slot.split(':').next()?.trim().parse().ok()?;
        Some(match hour {
            0..=11 => Self::Morning,
            12..=16 => Self::Afternoon,
            _ => Self::Evening,
        })
    }

    pub fn label(&self) -> Text {
        match self {
            Self::Morning => Text::Morning,
            Self::Afternoon => Text::Afternoon,
            Self::Evening => Text::Evening,
        }
    }
}

/// A period heading and the slots under it, with their indexes into the
/// original list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotGroup<'a> {
    pub period: DayPeriod,
    pub slots: Vec<(usize, &'a str)>,
}

/// Group slots by period, preserving order. Empty groups are omitted and
/// slots with an unreadable hour are left out.
pub fn group_by_period(slots: &[String]) -> Vec<SlotGroup<'_>> {
    [DayPeriod::Morning, DayPeriod::Afternoon, DayPeriod::Evening]
        .into_iter()
        .filter_map(|period| {
            let members: Vec<(usize, &str)> = slots
                .iter()
                .enumerate()
                .filter(|(_, s)| DayPeriod::of(s) == Some(period))
                .map(|(i, s)| (i, s.as_str()))
                .collect();
            (!members.is_empty()).then_some(SlotGroup {
                period,
                slots: members,
            })
        })
        .collect()
}
