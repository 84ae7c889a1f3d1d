use chatbook::core::models::{BookingRecord, SlotValue, Turn};
use chatbook::errors::BookingError;
use chatbook::intake::{SCHEMA, advance, is_complete};

fn greeting() -> Turn {
    Turn::assistant(
        "Hi! I'm here to help you schedule a discovery call. First, could you tell me your business name?",
    )
}

fn text(s: &str) -> SlotValue {
    SlotValue::Text(s.to_string())
}

fn full_record() -> BookingRecord {
    [
        ("businessName", text("Acme")),
        ("industry", text("ecommerce")),
        ("projectType", text("website")),
        ("projectSize", text("medium")),
        ("timeline", text("1_month")),
        ("budget", text("5k_10k")),
    ]
    .into_iter()
    .collect()
}

fn assert_schema_prefix(record: &BookingRecord) {
    let k = record.len();
    for (i, slot) in SCHEMA.iter().enumerate() {
        assert_eq!(
            record.contains_key(slot.key),
            i < k,
            "slot {} presence breaks the prefix invariant",
            slot.key
        );
    }
}

#[test]
fn test_first_call_asks_business_name() {
    let step = advance(&[greeting()], &BookingRecord::new()).unwrap();

    assert_eq!(step.prompt, "What's your business name?");
    assert!(step.choices.is_none());
    assert!(!step.completed);
    assert!(step.record.is_empty());
}

#[test]
fn test_empty_transcript_asks_first_slot() {
    let step = advance(&[], &BookingRecord::new()).unwrap();
    assert_eq!(step.prompt, "What's your business name?");
    assert!(step.record.is_empty());
}

#[test]
fn test_answer_fills_pending_slot_and_asks_next() {
    let record: BookingRecord = [("businessName", text("Acme"))].into_iter().collect();
    let turns = vec![
        greeting(),
        Turn::user("Acme"),
        Turn::assistant("What industry is your business in?"),
        Turn::user("ecommerce"),
    ];

    let step = advance(&turns, &record).unwrap();

    let expected: BookingRecord = [("businessName", text("Acme")), ("industry", text("ecommerce"))]
        .into_iter()
        .collect();
    assert_eq!(step.record, expected);
    assert_eq!(step.prompt, "What kind of design do you need?");
    let choices = step.choices.unwrap();
    assert_eq!(choices.len(), 5);
    assert_eq!(choices[0].label, "Branding");
    assert_eq!(choices[1].value, "website");
    assert!(!step.completed);
}

#[test]
fn test_complete_record_returns_terminal_message() {
    let record = full_record();
    let turns = vec![greeting(), Turn::user("under_5k")];

    let step = advance(&turns, &record).unwrap();

    assert!(step.completed);
    assert!(step.choices.is_none());
    assert!(step.prompt.contains("Acme"));
    assert!(step.prompt.contains("discovery call"));
    assert_eq!(step.record, record);
}

#[test]
fn test_completion_is_idempotent() {
    let full = full_record();
    let almost: BookingRecord = SCHEMA[..SCHEMA.len() - 1]
        .iter()
        .map(|slot| (slot.key, full.get(slot.key).unwrap().clone()))
        .collect();

    let finishing = advance(&[Turn::user("need_quote")], &almost).unwrap();
    assert!(finishing.completed);

    let turns = vec![Turn::user("need_quote"), Turn::assistant(&finishing.prompt)];
    let again = advance(&turns, &finishing.record).unwrap();

    assert!(again.completed);
    assert_eq!(again.prompt, finishing.prompt);
    assert_eq!(again.record, finishing.record);
}

#[test]
fn test_walkthrough_grows_by_one_in_schema_order() {
    let answers = ["Acme", "tech_startup", "branding", "large", "asap", "10k_20k"];
    let mut record = BookingRecord::new();
    let mut turns = vec![greeting()];

    let first = advance(&turns, &record).unwrap();
    assert_eq!(first.record, record);
    turns.push(Turn::assistant(&first.prompt));

    for (i, answer) in answers.iter().enumerate() {
        turns.push(Turn::user(answer));
        let before = record.len();
        let step = advance(&turns, &record).unwrap();

        assert_eq!(step.record.len(), before + 1);
        assert_schema_prefix(&step.record);
        assert_eq!(step.record.get(SCHEMA[i].key), Some(&text(answer)));
        assert_eq!(step.completed, i == answers.len() - 1);

        turns.push(Turn::assistant(&step.prompt));
        record = step.record;
    }

    assert!(is_complete(&record));
}

#[test]
fn test_off_catalog_and_blank_answers_are_accepted() {
    let record: BookingRecord = [("businessName", text("Acme"))].into_iter().collect();

    let step = advance(&[Turn::user("aerospace")], &record).unwrap();
    assert_eq!(step.record.get("industry"), Some(&text("aerospace")));

    let step = advance(&[Turn::user("   ")], &record).unwrap();
    assert_eq!(step.record.get("industry"), Some(&text("   ")));
}

#[test]
fn test_multi_select_answer_is_preserved() {
    let record: BookingRecord = [
        ("businessName", text("Acme")),
        ("industry", text("education")),
        (
            "projectType",
            SlotValue::Many(vec!["branding".to_string(), "website".to_string()]),
        ),
    ]
    .into_iter()
    .collect();

    let step = advance(&[Turn::user("small")], &record).unwrap();

    assert_eq!(
        step.record.get("projectType"),
        Some(&SlotValue::Many(vec!["branding".to_string(), "website".to_string()]))
    );
    assert_eq!(step.record.get("projectSize"), Some(&text("small")));
    assert_eq!(step.prompt, "When do you need this project completed?");
}

#[test]
fn test_record_with_gap_is_rejected() {
    let record: BookingRecord = [("businessName", text("Acme")), ("budget", text("under_5k"))]
        .into_iter()
        .collect();

    let err = advance(&[Turn::user("ecommerce")], &record).unwrap_err();
    assert!(matches!(err, BookingError::InvalidRequest(_)));
}
