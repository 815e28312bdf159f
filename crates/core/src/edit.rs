//! Guard against edit suggestions that change nothing.
//!
//! An edit suggestion is compared field by field against the stored record,
//! each field with its own equality: plain equality for scalars, set
//! equality for multi-valued fields where order carries no meaning.

use std::collections::BTreeSet;

/// An edit that changes no editable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("你没有进行任何修改")]
pub struct NoChangeError;

/// A record whose editable fields can be compared with a proposed version.
pub trait Editable {
    /// Names of the editable fields in which `submitted` differs from `self`.
    fn changed_fields(&self, submitted: &Self) -> Vec<&'static str>;
}

/// Accumulates the names of differing fields.
#[derive(Debug, Default)]
pub struct FieldDiff {
    changed: Vec<&'static str>,
}

impl FieldDiff {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare a single-valued field.
    pub fn field<T: PartialEq + ?Sized>(mut self, name: &'static str, old: &T, new: &T) -> Self {
        if old != new {
            self.changed.push(name);
        }
        self
    }

    /// Compare a multi-valued field by set equality: order and repeats are
    /// ignored.
    pub fn set<T: Ord>(mut self, name: &'static str, old: &[T], new: &[T]) -> Self {
        let old: BTreeSet<&T> = old.iter().collect();
        let new: BTreeSet<&T> = new.iter().collect();
        if old != new {
            self.changed.push(name);
        }
        self
    }

    pub fn finish(self) -> Vec<&'static str> {
        self.changed
    }
}

/// Pass `submitted` through if it differs from `original` in at least one
/// editable field.
pub fn guard_changed<T: Editable>(original: &T, submitted: T) -> Result<T, NoChangeError> {
    if original.changed_fields(&submitted).is_empty() {
        Err(NoChangeError)
    } else {
        Ok(submitted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Record {
        name: String,
        year: Option<i32>,
        tags: Vec<i64>,
    }

    impl Editable for Record {
        fn changed_fields(&self, submitted: &Self) -> Vec<&'static str> {
            FieldDiff::new()
                .field("name", self.name.as_str(), submitted.name.as_str())
                .field("year", &self.year, &submitted.year)
                .set("tags", &self.tags, &submitted.tags)
                .finish()
        }
    }

    fn record() -> Record {
        Record {
            name: "Doom".to_string(),
            year: Some(1993),
            tags: vec![1, 2, 3],
        }
    }

    #[test]
    fn identical_submission_is_rejected() {
        assert_eq!(guard_changed(&record(), record()), Err(NoChangeError));
    }

    #[test]
    fn reordered_set_is_not_a_change() {
        let mut submitted = record();
        submitted.tags = vec![3, 1, 2, 2];
        assert_eq!(guard_changed(&record(), submitted), Err(NoChangeError));
    }

    #[test]
    fn any_single_field_change_passes() {
        let mut renamed = record();
        renamed.name = "Doom II".to_string();
        assert!(guard_changed(&record(), renamed).is_ok());

        let mut cleared_year = record();
        cleared_year.year = None;
        assert!(guard_changed(&record(), cleared_year).is_ok());

        let mut retagged = record();
        retagged.tags.push(4);
        assert!(guard_changed(&record(), retagged).is_ok());
    }

    #[test]
    fn changed_fields_lists_every_difference() {
        let submitted = Record {
            name: "Quake".to_string(),
            year: Some(1996),
            tags: vec![1, 2, 3],
        };
        assert_eq!(record().changed_fields(&submitted), vec!["name", "year"]);
    }

    #[test]
    fn message_is_user_facing() {
        assert_eq!(NoChangeError.to_string(), "你没有进行任何修改");
    }
}
