//! Shared field templates used by the per-entity rule tables.
//!
//! Each template returns a base [`FieldRule`] that entity schemas refine
//! with `.required()` or a custom predicate error.

use super::{FieldRule, FieldType, Predicate};

pub const fn id(label: &'static str) -> FieldRule {
    FieldRule::new(label)
        .kind(FieldType::String)
        .predicate(Predicate::ValidId)
}

pub const fn name(label: &'static str) -> FieldRule {
    FieldRule::new(label).kind(FieldType::String)
}

pub const fn email(label: &'static str) -> FieldRule {
    FieldRule::new(label)
        .kind(FieldType::String)
        .length(Some(3), Some(100))
        .predicate(Predicate::Email)
}

pub const fn phone(label: &'static str) -> FieldRule {
    FieldRule::new(label)
        .kind(FieldType::String)
        .length(Some(10), Some(13))
}

pub const fn password(label: &'static str) -> FieldRule {
    FieldRule::new(label)
        .kind(FieldType::String)
        .length(Some(8), Some(100))
}

pub const fn address(label: &'static str) -> FieldRule {
    FieldRule::new(label).kind(FieldType::String)
}

pub const fn website(label: &'static str) -> FieldRule {
    FieldRule::new(label)
        .kind(FieldType::String)
        .length(Some(3), Some(100))
}

pub const fn logo(label: &'static str) -> FieldRule {
    FieldRule::new(label).kind(FieldType::String)
}

pub const fn role(label: &'static str) -> FieldRule {
    FieldRule::new(label)
        .kind(FieldType::String)
        .one_of(&["admin", "superadmin"])
}

pub const fn gender(label: &'static str) -> FieldRule {
    FieldRule::new(label)
        .kind(FieldType::String)
        .one_of(&["male", "female"])
}

pub const fn date(label: &'static str) -> FieldRule {
    FieldRule::new(label)
        .kind(FieldType::String)
        .predicate(Predicate::Date)
}

pub const fn capacity(label: &'static str) -> FieldRule {
    FieldRule::new(label)
        .kind(FieldType::Number)
        .length(Some(1), None)
}

pub const fn quantity(label: &'static str) -> FieldRule {
    FieldRule::new(label).kind(FieldType::Number)
}
