//! crates/study_buddy_core/src/matching.rs
//!
//! Finds study partners: users enrolled in a class whose weekly availability
//! overlaps a requested window.

use crate::domain::{TimeWindow, User};

/// Returns every user taking `class_name` with at least one slot overlapping
/// `window`, in collection order.
pub fn find_matches<'a>(users: &'a [User], class_name: &str, window: &TimeWindow) -> Vec<&'a User> {
    users
        .iter()
        .filter(|user| is_match(user, class_name, window))
        .collect()
}

fn is_match(user: &User, class_name: &str, window: &TimeWindow) -> bool {
    user.classes.contains(class_name) && user.availability.iter().any(|slot| slot.overlaps(window))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ClassList, Slot};
    use chrono::{NaiveTime, Weekday};

    fn user(email: &str, classes: &str, availability: &str) -> User {
        User {
            email: email.to_string(),
            password_hash: String::new(),
            classes: ClassList::parse(classes),
            availability: crate::domain::parse_availability(availability).unwrap(),
        }
    }

    fn window(text: &str) -> TimeWindow {
        text.parse().unwrap()
    }

    fn emails(matches: Vec<&User>) -> Vec<&str> {
        matches.into_iter().map(|u| u.email.as_str()).collect()
    }

    #[test]
    fn touching_endpoints_do_not_match() {
        let users = vec![user("a@x", "MTH121", "Mon 15:00-16:00")];
        assert!(find_matches(&users, "MTH121", &window("Mon 16:00-17:00")).is_empty());
    }

    #[test]
    fn partial_overlap_matches() {
        let users = vec![user("a@x", "MTH121", "Mon 15:00-16:00")];
        let matches = find_matches(&users, "MTH121", &window("Mon 15:30-16:30"));
        assert_eq!(emails(matches), vec!["a@x"]);
    }

    #[test]
    fn requires_class_and_day() {
        let users = vec![
            user("wrong-class@x", "BEM329", "Mon 15:00-16:00"),
            user("wrong-day@x", "MTH121", "Tue 15:00-16:00"),
            user("ok@x", "MTH121", "Tue 09:00-10:00, Mon 14:00-18:00"),
        ];
        let matches = find_matches(&users, "MTH121", &window("Mon 15:00-16:00"));
        assert_eq!(emails(matches), vec!["ok@x"]);
    }

    #[test]
    fn users_without_classes_or_availability_are_skipped() {
        let users = vec![
            user("no-classes@x", "", "Mon 15:00-16:00"),
            user("no-slots@x", "MTH121", ""),
        ];
        assert!(find_matches(&users, "MTH121", &window("Mon 15:00-16:00")).is_empty());
    }

    #[test]
    fn keeps_collection_order() {
        let users = vec![
            user("c@x", "MTH121", "Fri 10:00-12:00"),
            user("a@x", "MTH121", "Fri 11:00-13:00"),
            user("b@x", "MTH121", "Fri 09:00-11:30"),
        ];
        let matches = find_matches(&users, "MTH121", &window("Fri 11:00-11:15"));
        assert_eq!(emails(matches), vec!["c@x", "a@x", "b@x"]);
    }

    #[test]
    fn matches_iff_class_and_some_slot_overlaps() {
        let days = [Weekday::Mon, Weekday::Tue];
        let hours = [8u32, 9, 10, 11];
        let users: Vec<User> = hours
            .iter()
            .flat_map(|&h| days.iter().map(move |&d| (d, h)))
            .enumerate()
            .map(|(i, (day, h))| User {
                email: format!("u{i}@x"),
                password_hash: String::new(),
                classes: ClassList::parse(if i % 3 == 0 { "BEM329" } else { "MTH121" }),
                availability: vec![Slot::new(
                    day,
                    NaiveTime::from_hms_opt(h, 0, 0).unwrap(),
                    NaiveTime::from_hms_opt(h + 1, 0, 0).unwrap(),
                )],
            })
            .collect();

        for start in 7u32..12 {
            let w = TimeWindow::new(
                Weekday::Mon,
                NaiveTime::from_hms_opt(start, 30, 0).unwrap(),
                NaiveTime::from_hms_opt(start + 1, 0, 0).unwrap(),
            );
            let found = find_matches(&users, "MTH121", &w);
            for u in &users {
                let expected = u.classes.contains("MTH121")
                    && u.availability.iter().any(|s| {
                        s.day == w.day && !(s.end <= w.start || s.start >= w.end)
                    });
                assert_eq!(found.iter().any(|m| m.email == u.email), expected, "{} at {start}", u.email);
            }
        }
    }
}
