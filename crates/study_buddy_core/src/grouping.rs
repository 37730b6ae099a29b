//! crates/study_buddy_core/src/grouping.rs
//!
//! Buckets users by class code so students can see who else is in each class.

use crate::domain::{Group, GroupMember, User};
use std::collections::HashMap;

/// Partitions `users` into one group per class code.
///
/// Groups appear in the order their class code is first seen; members keep
/// collection order. When `email_filter` is given (and non-empty) only the
/// groups containing that exact email are returned.
pub fn group_by_class(users: &[User], email_filter: Option<&str>) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for user in users {
        for class_name in user.classes.iter() {
            let slot = *index.entry(class_name).or_insert_with(|| {
                groups.push(Group {
                    class_name: class_name.to_string(),
                    members: Vec::new(),
                });
                groups.len() - 1
            });
            groups[slot].members.push(GroupMember {
                email: user.email.clone(),
                availability: user.availability.clone(),
            });
        }
    }

    match email_filter.filter(|email| !email.is_empty()) {
        Some(email) => groups
            .into_iter()
            .filter(|group| group.members.iter().any(|m| m.email == email))
            .collect(),
        None => groups,
    }
}
