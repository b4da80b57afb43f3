// Client-side filtering and sorting of a board's combined list. No network calls.
use super::{Counterpart, UsageBoard};
use crate::catalog::OperatorKey;
use std::cmp::Ordering;
use std::collections::HashSet;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UsageSort {
    #[default]
    RecentUsed,
    LongUnused,
    New,
    Old,
    UsedMost,
    UsedLeast,
}

impl UsageSort {
    pub const DETAIL_KEYS: [UsageSort; 4] = [
        UsageSort::RecentUsed,
        UsageSort::LongUnused,
        UsageSort::New,
        UsageSort::Old,
    ];

    // Keys offered on the numbers list
    pub const LIST_KEYS: [UsageSort; 4] = [
        UsageSort::New,
        UsageSort::Old,
        UsageSort::UsedMost,
        UsageSort::UsedLeast,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            UsageSort::RecentUsed => "recentUsed",
            UsageSort::LongUnused => "longUnused",
            UsageSort::New => "new",
            UsageSort::Old => "old",
            UsageSort::UsedMost => "usedMost",
            UsageSort::UsedLeast => "usedLeast",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UsageSort::RecentUsed => "Последние использованные",
            UsageSort::LongUnused => "Давно не использовались",
            UsageSort::New => "Сначала новые",
            UsageSort::Old => "Сначала старые",
            UsageSort::UsedMost => "Наиболее используемые",
            UsageSort::UsedLeast => "Наименее используемые",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        [
            UsageSort::RecentUsed,
            UsageSort::LongUnused,
            UsageSort::New,
            UsageSort::Old,
            UsageSort::UsedMost,
            UsageSort::UsedLeast,
        ]
        .into_iter()
        .find(|s| s.key() == key)
    }

    // Missing timestamps sort as the epoch, matching `Date.parse(..) || 0`
    pub fn compare<T: Counterpart>(&self, a: &T, b: &T) -> Ordering {
        let ms = |t: Option<chrono::DateTime<chrono::Utc>>| t.map(|t| t.timestamp_millis()).unwrap_or(0);
        match self {
            UsageSort::RecentUsed => ms(b.used_at()).cmp(&ms(a.used_at())),
            UsageSort::LongUnused => ms(a.used_at()).cmp(&ms(b.used_at())),
            UsageSort::New => ms(b.created_at()).cmp(&ms(a.created_at())),
            UsageSort::Old => ms(a.created_at()).cmp(&ms(b.created_at())),
            UsageSort::UsedMost => b.used_count().cmp(&a.used_count()),
            UsageSort::UsedLeast => a.used_count().cmp(&b.used_count()),
        }
    }
}

/// Sorts in place; ties keep their relative order.
pub fn sort_items<T: Counterpart>(items: &mut [&T], sort: UsageSort) {
    items.sort_by(|a, b| sort.compare(*a, *b));
}

/// Which counterparts are visible. Number pages filter by Place, Place pages by
/// the Number's operator.
#[derive(Debug, Clone, PartialEq)]
pub enum UsageFilter {
    All,
    Counterparts(HashSet<Uuid>),
    Operators(HashSet<OperatorKey>),
}

impl UsageFilter {
    pub fn all_operators() -> Self {
        UsageFilter::Operators(OperatorKey::ALL.into_iter().collect())
    }

    pub fn accepts<T: Counterpart>(&self, item: &T) -> bool {
        match self {
            UsageFilter::All => true,
            UsageFilter::Counterparts(ids) => ids.contains(&item.id()),
            UsageFilter::Operators(ops) => item.operator().map(|op| ops.contains(&op)).unwrap_or(true),
        }
    }
}

impl<T: Counterpart> UsageBoard<T> {
    pub fn view(&self, filter: &UsageFilter, sort: UsageSort) -> Vec<&T> {
        let mut visible: Vec<&T> = self.items().iter().filter(|item| filter.accepts(*item)).collect();
        sort_items(&mut visible, sort);
        visible
    }

    /// Filter that shows every counterpart currently on the board.
    pub fn select_all(&self) -> UsageFilter {
        UsageFilter::Counterparts(self.items().iter().map(|item| item.id()).collect())
    }
}
