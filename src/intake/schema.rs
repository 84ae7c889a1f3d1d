//! The fixed intake questionnaire and its option catalog.

use crate::core::models::Choice;

/// A catalog entry: `(label, value)`.
pub type CatalogEntry = (&'static str, &'static str);

pub const INDUSTRIES: &[CatalogEntry] = &[
    ("E-commerce", "ecommerce"),
    ("Tech Startup", "tech_startup"),
    ("Health & Wellness", "health_wellness"),
    ("Education", "education"),
    ("Real Estate", "real_estate"),
    ("Other", "other"),
];

pub const PROJECT_TYPES: &[CatalogEntry] = &[
    ("Branding", "branding"),
    ("Website UX/UI Design", "website"),
    ("Mobile App UX/UI Design", "mobile_app"),
    ("Marketing & Social Media Assets", "marketing"),
    ("Other", "other"),
];

pub const PROJECT_SIZES: &[CatalogEntry] = &[
    ("Small (1-2 key pages/screens)", "small"),
    ("Medium (3-5 pages/screens)", "medium"),
    ("Large (Full brand & UX strategy)", "large"),
    ("Not sure", "unsure"),
];

pub const TIMELINES: &[CatalogEntry] = &[
    ("ASAP (Within a week)", "asap"),
    ("1-2 weeks", "1_2_weeks"),
    ("1 month", "1_month"),
    ("Flexible / Not urgent", "flexible"),
];

pub const BUDGETS: &[CatalogEntry] = &[
    ("Under $5K", "under_5k"),
    ("$5K-$10K", "5k_10k"),
    ("$10K-$20K", "10k_20k"),
    ("Not sure, need a quote", "need_quote"),
];

/// One question in the intake.
#[derive(Debug, Clone, Copy)]
pub struct Slot {
    pub key: &'static str,
    /// Short human name used when the record is rendered elsewhere.
    pub label: &'static str,
    pub prompt: &'static str,
    pub choices: &'static [CatalogEntry],
    pub allows_custom_value: bool,
    pub multi_select: bool,
}

impl Slot {
    /// The offered choices, or `None` for free-text slots.
    #[must_use]
    pub fn choice_set(&self) -> Option<Vec<Choice>> {
        if self.choices.is_empty() {
            return None;
        }
        Some(
            self.choices
                .iter()
                .map(|(label, value)| Choice {
                    label: (*label).to_string(),
                    value: (*value).to_string(),
                })
                .collect(),
        )
    }

    /// Label for a catalog value, if `value` is one of the offered choices.
    #[must_use]
    pub fn label_for(&self, value: &str) -> Option<&'static str> {
        self.choices
            .iter()
            .find(|(_, v)| *v == value)
            .map(|(label, _)| *label)
    }
}

pub const BUSINESS_NAME: &str = "businessName";

/// Collection order is the slice order.
pub const SCHEMA: &[Slot] = &[
    Slot {
        key: BUSINESS_NAME,
        label: "Business name",
        prompt: "What's your business name?",
        choices: &[],
        allows_custom_value: true,
        multi_select: false,
    },
    Slot {
        key: "industry",
        label: "Industry",
        prompt: "What industry is your business in?",
        choices: INDUSTRIES,
        allows_custom_value: true,
        multi_select: false,
    },
    Slot {
        key: "projectType",
        label: "Project type",
        prompt: "What kind of design do you need?",
        choices: PROJECT_TYPES,
        allows_custom_value: true,
        multi_select: true,
    },
    Slot {
        key: "projectSize",
        label: "Project size",
        prompt: "How big is this project?",
        choices: PROJECT_SIZES,
        allows_custom_value: true,
        multi_select: false,
    },
    Slot {
        key: "timeline",
        label: "Timeline",
        prompt: "When do you need this project completed?",
        choices: TIMELINES,
        allows_custom_value: true,
        multi_select: false,
    },
    Slot {
        key: "budget",
        label: "Budget",
        prompt: "Do you have a budget range in mind?",
        choices: BUDGETS,
        allows_custom_value: true,
        multi_select: false,
    },
];

#[must_use]
pub fn slot_at(index: usize) -> Option<&'static Slot> {
    SCHEMA.get(index)
}

#[must_use]
pub fn position_of(key: &str) -> Option<usize> {
    SCHEMA.iter().position(|slot| slot.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_schema_keys_are_unique() {
        let keys: HashSet<&str> = SCHEMA.iter().map(|s| s.key).collect();
        assert_eq!(keys.len(), SCHEMA.len());
    }

    #[test]
    fn test_business_name_is_free_text() {
        let slot = slot_at(0).unwrap();
        assert_eq!(slot.key, BUSINESS_NAME);
        assert!(slot.choice_set().is_none());
    }

    #[test]
    fn test_label_lookup() {
        let industry = &SCHEMA[position_of("industry").unwrap()];
        assert_eq!(industry.label_for("tech_startup"), Some("Tech Startup"));
        assert_eq!(industry.label_for("aerospace"), None);
    }
}
