use affilink_catalog::slug::SlugRules;
use affilink_catalog::{
    Record, Table, ValidationReason, derive, is_unique, resolve_collision, validate_format,
};

fn widget_table() -> Table {
    Table::from_records([
        Record::new("1").with_name("Widget").with_slug("widget"),
        Record::new("2").with_name("Gadget"),
    ])
    .unwrap()
}

#[test]
fn derive_then_resolve_existing_widget() {
    let table = widget_table();
    let candidate = derive("Widget");
    assert_eq!(candidate, "widget");
    assert_eq!(resolve_collision(&candidate, &table).unwrap(), "widget-2");
}

#[test]
fn uniqueness_ignores_case_and_excluded_record() {
    let table = widget_table();
    assert!(!is_unique("WIDGET", &table, None));
    assert!(is_unique("widget", &table, Some("1")));
    assert!(is_unique("gadget", &table, None));
}

#[test]
fn resolved_slugs_are_valid_and_free() {
    let names = [
        "Widget",
        "Widget",
        "widget 2",
        "Widget!",
        "WIDGET",
        "Café",
        "cafe",
        "Admin",
        "a",
    ];
    let mut table = Table::default();
    let rules = SlugRules::default();
    for (i, name) in names.iter().enumerate() {
        let id = (i + 1).to_string();
        table.push(Record::new(&id).with_name(*name)).unwrap();
        let slug = rules.suggest(name, &table, Some(&id)).unwrap();
        assert!(validate_format(&slug).is_ok(), "{slug} should be valid");
        assert!(rules.validate(&slug).is_ok(), "{slug} should pass policy");
        assert!(is_unique(&slug, &table, None), "{slug} should be free");
        table.replace_slug(&id, Some(slug));
    }
    let slugs: Vec<_> = table.iter().filter_map(|r| r.slug.as_deref()).collect();
    assert_eq!(
        slugs,
        vec![
            "widget", "widget-2", "widget-2-2", "widget-3", "widget-4", "cafe", "cafe-2",
            "admin-2", "a"
        ]
    );
}

#[test]
fn taken_reason_names_owner() {
    let table = widget_table();
    let err = SlugRules::default()
        .check_assignable("widget", &table, "2")
        .unwrap_err();
    assert_eq!(
        err.reason,
        ValidationReason::Taken {
            owner: "1".to_string()
        }
    );
    assert!(
        SlugRules::default()
            .check_assignable("widget", &table, "1")
            .is_ok()
    );
}

#[test]
fn composed_and_decomposed_names_share_a_slug() {
    let table = Table::from_records([Record::new("1").with_name("Caf\u{e9}s").with_slug("cafes")])
        .unwrap();
    let rules = SlugRules::default();
    assert_eq!(derive("Cafe\u{301}s"), "cafes");
    assert_eq!(
        rules.suggest("Cafe\u{301}s", &table, None).as_deref(),
        Some("cafes-2")
    );
}
