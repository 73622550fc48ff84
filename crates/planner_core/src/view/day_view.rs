//! Day view: events of one calendar day ordered by start time.

use crate::model::event::{Category, Event};
use chrono::NaiveDate;

/// Selection criteria for a day view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayFilter {
    pub day: NaiveDate,
    /// Case-insensitive substring match on the title. Blank means no filter.
    pub title_query: Option<String>,
    /// Scope applied together with a non-blank `title_query`; ignored otherwise.
    pub category: Option<Category>,
}

impl DayFilter {
    pub fn new(day: NaiveDate) -> Self {
        Self {
            day,
            title_query: None,
            category: None,
        }
    }

    pub fn with_title_query(mut self, query: impl Into<String>) -> Self {
        self.title_query = Some(query.into());
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn matches(&self, event: &Event) -> bool {
        if event.date != self.day {
            return false;
        }
        // The category scope only narrows a search; without a query every
        // event of the day is shown.
        match self.title_query.as_deref().map(str::trim) {
            Some(query) if !query.is_empty() => {
                let in_scope = self.category.map_or(true, |category| event.category == category);
                in_scope && event.title.to_lowercase().contains(&query.to_lowercase())
            }
            _ => true,
        }
    }
}

/// Builds the filtered view, ascending by start time.
///
/// Ties keep their input order.
pub fn day_view(events: &[Event], filter: &DayFilter) -> Vec<Event> {
    let mut view: Vec<Event> = events
        .iter()
        .filter(|event| filter.matches(event))
        .cloned()
        .collect();
    sort_by_start(&mut view);
    view
}

/// Stable sort by `start_time`.
pub fn sort_by_start(events: &mut [Event]) {
    events.sort_by_key(|event| event.start_time);
}

/// Returns true when `events` is ascending by start and no two overlap.
pub fn is_ordered_without_overlap(events: &[Event]) -> bool {
    events.windows(2).all(|pair| {
        pair[0].start_time <= pair[1].start_time && pair[0].end_or_start() <= pair[1].start_time
    })
}

#[cfg(test)]
mod tests {
    use super::{day_view, is_ordered_without_overlap, DayFilter};
    use crate::model::event::{Category, Event, EventDraft};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn event(title: &str, day: u32, hour: u32, category: Category) -> Event {
        let mut draft = EventDraft::new(
            title,
            "home",
            Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 3, day, hour + 1, 0, 0).unwrap(),
        );
        draft.category = category;
        Event::new(draft).unwrap()
    }

    #[test]
    fn day_view_filters_by_day_and_sorts_by_start() {
        let events = vec![
            event("late", 1, 15, Category::Urgent),
            event("other day", 2, 9, Category::Urgent),
            event("early", 1, 8, Category::NotUrgent),
        ];
        let view = day_view(&events, &DayFilter::new(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()));

        let titles: Vec<&str> = view.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["early", "late"]);
        assert!(is_ordered_without_overlap(&view));
    }

    #[test]
    fn title_query_and_category_narrow_the_view() {
        let events = vec![
            event("Gym session", 1, 7, Category::NotUrgent),
            event("Gym payment", 1, 9, Category::Urgent),
            event("Lunch", 1, 12, Category::Urgent),
        ];
        let filter = DayFilter::new(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap())
            .with_title_query("gym")
            .with_category(Category::Urgent);

        let view = day_view(&events, &filter);
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].title, "Gym payment");
    }

    #[test]
    fn category_without_query_keeps_whole_day() {
        let events = vec![
            event("Lunch", 1, 12, Category::NotUrgent),
            event("Deadline", 1, 16, Category::Urgent),
        ];
        let filter = DayFilter::new(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap())
            .with_category(Category::Urgent);

        assert_eq!(day_view(&events, &filter).len(), 2);
        assert_eq!(day_view(&events, &filter.clone().with_title_query(" ")).len(), 2);
    }

    #[test]
    fn blank_query_is_ignored() {
        let events = vec![event("Lunch", 1, 12, Category::Urgent)];
        let filter =
            DayFilter::new(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()).with_title_query("  ");
        assert_eq!(day_view(&events, &filter).len(), 1);
    }
}
