use std::cmp::Ordering;

use serde::Serialize;

use crate::tasks::repo::Task;

/// Closed set of ordering modes. Absent or unrecognized query values
/// fall back to `Date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Date,
    Name,
    Priority,
    Tag,
}

impl SortKey {
    pub fn from_param(s: Option<&str>) -> Self {
        match s.unwrap_or("").to_ascii_lowercase().as_str() {
            "name" => SortKey::Name,
            "priority" => SortKey::Priority,
            "tag" => SortKey::Tag,
            _ => SortKey::Date,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Date => "date",
            SortKey::Name => "name",
            SortKey::Priority => "priority",
            SortKey::Tag => "tag",
        }
    }
}

/// Order tasks for display. Done tasks sink to the bottom under every
/// key; within each half the key decides. The sort is stable, so tasks
/// that compare equal keep their storage order.
pub fn order(tasks: &mut [Task], key: SortKey) {
    tasks.sort_by(|a, b| compare(a, b, key));
}

fn compare(a: &Task, b: &Task, key: SortKey) -> Ordering {
    a.done.cmp(&b.done).then_with(|| match key {
        SortKey::Date => by_due_date(a, b),
        SortKey::Name => a
            .title
            .chars()
            .flat_map(char::to_lowercase)
            .cmp(b.title.chars().flat_map(char::to_lowercase)),
        SortKey::Priority => a
            .priority
            .rank()
            .cmp(&b.priority.rank())
            .then_with(|| b.created_at.cmp(&a.created_at)),
        SortKey::Tag => match (&a.tag, &b.tag) {
            (Some(x), Some(y)) => x.cmp(y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
    })
}

// Undated tasks go last; otherwise soonest due first, most recently
// created first among equals.
fn by_due_date(a: &Task, b: &Task) -> Ordering {
    match (a.due_at, b.due_at) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| b.created_at.cmp(&a.created_at)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b.created_at.cmp(&a.created_at),
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;
    use time::OffsetDateTime;

    use super::*;
    use crate::tasks::repo::Priority;

    fn task(id: i64, title: &str) -> Task {
        let now = datetime!(2024-03-01 12:00 UTC);
        Task {
            id,
            user_id: 1,
            title: title.to_string(),
            description: None,
            bucket: "Life".to_string(),
            due_at: None,
            priority: Priority::Mid,
            tag: None,
            reminder_enabled: false,
            done: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn titles(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.title.as_str()).collect()
    }

    #[test]
    fn unrecognized_sort_param_falls_back_to_date() {
        assert_eq!(SortKey::from_param(None), SortKey::Date);
        assert_eq!(SortKey::from_param(Some("")), SortKey::Date);
        assert_eq!(SortKey::from_param(Some("none")), SortKey::Date);
        assert_eq!(SortKey::from_param(Some("PRIORITY")), SortKey::Priority);
        assert_eq!(SortKey::from_param(Some("name")), SortKey::Name);
        assert_eq!(SortKey::from_param(Some("tag")), SortKey::Tag);
    }

    #[test]
    fn done_tasks_sink_under_every_key() {
        for key in [SortKey::Date, SortKey::Name, SortKey::Priority, SortKey::Tag] {
            let mut done = task(1, "aaa earliest by any key");
            done.done = true;
            done.priority = Priority::High;
            done.due_at = Some(datetime!(2000-01-01 0:00 UTC));
            done.tag = Some("aaa".to_string());

            let open = task(2, "zzz");
            let mut tasks = vec![done, open];
            order(&mut tasks, key);
            assert!(!tasks[0].done, "open task must lead under {key:?}");
            assert!(tasks[1].done);
        }
    }

    #[test]
    fn date_sort_puts_undated_last() {
        let mut jan = task(1, "january");
        jan.due_at = Some(datetime!(2024-01-01 0:00 UTC));
        let mut feb = task(2, "february");
        feb.due_at = Some(datetime!(2024-02-01 0:00 UTC));
        let undated = task(3, "undated");

        let mut tasks = vec![undated, feb, jan];
        order(&mut tasks, SortKey::Date);
        assert_eq!(titles(&tasks), ["january", "february", "undated"]);
    }

    #[test]
    fn date_ties_break_by_most_recent_creation() {
        let due = datetime!(2024-05-01 0:00 UTC);
        let mut older = task(1, "older");
        older.due_at = Some(due);
        older.created_at = datetime!(2024-03-01 8:00 UTC);
        let mut newer = task(2, "newer");
        newer.due_at = Some(due);
        newer.created_at = datetime!(2024-03-02 8:00 UTC);

        let mut tasks = vec![older, newer];
        order(&mut tasks, SortKey::Date);
        assert_eq!(titles(&tasks), ["newer", "older"]);
    }

    #[test]
    fn name_sort_ignores_case() {
        let mut tasks = vec![task(1, "banana"), task(2, "Apple"), task(3, "cherry")];
        order(&mut tasks, SortKey::Name);
        assert_eq!(titles(&tasks), ["Apple", "banana", "cherry"]);
    }

    #[test]
    fn priority_sorts_high_mid_low_then_newest() {
        let mut low = task(1, "low");
        low.priority = Priority::Low;
        let mut high = task(2, "high");
        high.priority = Priority::High;
        let mut mid_old = task(3, "mid old");
        mid_old.created_at = datetime!(2024-03-01 9:00 UTC);
        let mut mid_new = task(4, "mid new");
        mid_new.created_at = datetime!(2024-03-01 10:00 UTC);

        let mut tasks = vec![low, mid_old, mid_new, high];
        order(&mut tasks, SortKey::Priority);
        assert_eq!(titles(&tasks), ["high", "mid new", "mid old", "low"]);
    }

    #[test]
    fn name_sort_equal_after_case_folding_keeps_storage_order() {
        let mut tasks = vec![task(1, "APPLE"), task(2, "apple"), task(3, "Apfel")];
        order(&mut tasks, SortKey::Name);
        assert_eq!(titles(&tasks), ["Apfel", "APPLE", "apple"]);
    }

    #[test]
    fn tag_sort_puts_untagged_last() {
        let mut b = task(1, "b");
        b.tag = Some("errand".to_string());
        let mut a = task(2, "a");
        a.tag = Some("chore".to_string());
        let untagged = task(3, "untagged");

        let mut tasks = vec![untagged, b, a];
        order(&mut tasks, SortKey::Tag);
        assert_eq!(titles(&tasks), ["a", "b", "untagged"]);
    }

    #[test]
    fn equal_keys_keep_storage_order() {
        // identical created_at, priority, and done flag: stable sort
        // must preserve the incoming (id ASC) order
        let now = OffsetDateTime::now_utc();
        let mut first = task(1, "first");
        first.created_at = now;
        let mut second = task(2, "second");
        second.created_at = now;

        let mut tasks = vec![first, second];
        order(&mut tasks, SortKey::Priority);
        assert_eq!(titles(&tasks), ["first", "second"]);

        let mut tasks2: Vec<Task> = tasks.clone();
        order(&mut tasks2, SortKey::Tag);
        assert_eq!(titles(&tasks2), ["first", "second"]);
    }

    #[test]
    fn high_priority_task_leads_mixed_listing() {
        let mut rent = task(1, "Pay rent");
        rent.priority = Priority::High;
        rent.bucket = "Life".to_string();
        let mut errands = task(2, "Errands");
        errands.priority = Priority::Mid;
        let mut someday = task(3, "Someday");
        someday.priority = Priority::Low;

        let mut tasks = vec![errands, someday, rent];
        order(&mut tasks, SortKey::Priority);
        assert_eq!(tasks[0].title, "Pay rent");
    }
}
