use affilink_catalog::{LinkConfig, SlugRules, ValidationReason, load_table, parse_table};
use affilink_store::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_csv(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("products.csv");
    fs::write(&path, content).unwrap();
    path
}

fn backup_count(dir: &Path) -> usize {
    let backups = dir.join("backups");
    if !backups.exists() {
        return 0;
    }
    fs::read_dir(backups).unwrap().count()
}

#[test]
fn auto_fill_derives_and_deduplicates() {
    let tmp = TempDir::new().unwrap();
    let path = write_csv(
        tmp.path(),
        "id,name,slug\n\
         1,Top 5 Starterkit,\n\
         2,Widget,widget\n\
         3,Widget,\n\
         4,Widget,\n\
         5,!!!,\n\
         6,Admin,\n",
    );
    let mut store = RecordStore::open(&path).unwrap();

    let outcome = auto_fill(&mut store).unwrap();
    assert_eq!(outcome.updated, vec!["1", "3", "4", "6"]);
    assert_eq!(outcome.skipped, vec!["5"]);

    let slug = |id: &str| store.get(id).unwrap().slug.clone();
    assert_eq!(slug("1").as_deref(), Some("top-5-starterkit"));
    assert_eq!(slug("3").as_deref(), Some("widget-2"));
    assert_eq!(slug("4").as_deref(), Some("widget-3"));
    assert_eq!(slug("5"), None);
    assert_eq!(slug("6").as_deref(), Some("admin-2"));

    // One snapshot for the whole run.
    assert_eq!(backup_count(tmp.path()), 1);
    let reloaded = load_table(&path).unwrap();
    assert_eq!(reloaded.get("4").unwrap().slug.as_deref(), Some("widget-3"));
}

#[test]
fn auto_fill_with_nothing_to_do_takes_no_backup() {
    let tmp = TempDir::new().unwrap();
    let path = write_csv(tmp.path(), "id,name,slug\n1,Widget,widget\n");
    let mut store = RecordStore::open(&path).unwrap();

    let outcome = auto_fill(&mut store).unwrap();
    assert!(outcome.updated.is_empty());
    assert_eq!(backup_count(tmp.path()), 0);
}

#[test]
fn plan_is_a_dry_run() {
    let table = parse_table("id,name,slug\n1,Café Olé,\n2,Café Olé,\n").unwrap();
    let plan = plan_auto_fill(&table, &SlugRules::default());
    assert_eq!(
        plan.assignments,
        vec![
            ("1".to_string(), "cafe-ole".to_string()),
            ("2".to_string(), "cafe-ole-2".to_string()),
        ]
    );
    assert!(table.get("1").unwrap().slug.is_none());
}

#[test]
fn analyze_reports_missing_invalid_and_duplicates() {
    let table = parse_table(
        "id,name,slug\n\
         1,Widget,widget\n\
         2,Widget Copy,Widget\n\
         3,Bad One,bad--slug\n\
         4,Fresh Thing,\n\
         5,Login,admin\n",
    )
    .unwrap();

    let report = analyze(&table, &SlugRules::default());
    assert_eq!(report.total, 5);
    assert_eq!(report.missing_count, 1);
    assert_eq!(report.with_slugs(), 4);
    assert!((report.completion_rate() - 80.0).abs() < 1e-9);

    let invalid: Vec<(&str, &ValidationReason)> = report
        .invalid
        .iter()
        .map(|i| (i.id.as_str(), &i.reason))
        .collect();
    assert_eq!(
        invalid,
        vec![
            ("2", &ValidationReason::InvalidCharacters),
            ("3", &ValidationReason::ConsecutiveHyphens),
            ("5", &ValidationReason::Reserved),
        ]
    );

    assert_eq!(report.duplicate_groups.len(), 1);
    assert_eq!(report.duplicate_groups["widget"], vec!["1", "2"]);

    let suggested: Vec<(&str, &str)> = report
        .suggestions
        .iter()
        .map(|s| (s.id.as_str(), s.suggested.as_str()))
        .collect();
    assert_eq!(
        suggested,
        vec![
            ("2", "widget-copy"),
            ("3", "bad-one"),
            ("4", "fresh-thing"),
            ("5", "login"),
        ]
    );
    assert_eq!(report.suggestions[2].cause, SuggestionCause::Missing);
}

#[test]
fn apply_updates_rejects_per_entry() {
    let tmp = TempDir::new().unwrap();
    let path = write_csv(
        tmp.path(),
        "id,name,slug\n1,Widget,widget\n2,Gadget,\n3,Gizmo,gizmo\n",
    );
    let mut store = RecordStore::open(&path).unwrap();

    let outcome = apply_updates(
        &mut store,
        vec![
            SlugUpdate::new("2", "gadget"),
            SlugUpdate::new("99", "ghost"),
            SlugUpdate::new("3", "widget"),
            SlugUpdate::new("3", "Not Valid"),
            SlugUpdate::new("2", "again"),
            SlugUpdate::new("1", "widget"),
        ],
    )
    .unwrap();

    assert_eq!(outcome.applied, vec!["2", "1"]);
    let reasons: Vec<&RejectReason> = outcome.rejected.iter().map(|r| &r.reason).collect();
    assert_eq!(
        reasons,
        vec![
            &RejectReason::UnknownId,
            &RejectReason::Invalid(ValidationReason::Taken {
                owner: "1".to_string()
            }),
            &RejectReason::RepeatedId,
            &RejectReason::RepeatedId,
        ]
    );

    assert_eq!(store.get("2").unwrap().slug.as_deref(), Some("gadget"));
    assert_eq!(store.get("3").unwrap().slug.as_deref(), Some("gizmo"));
    assert_eq!(backup_count(tmp.path()), 1);
}

#[test]
fn apply_updates_can_move_a_released_slug() {
    let tmp = TempDir::new().unwrap();
    let path = write_csv(tmp.path(), "id,name,slug\n1,Old,widget\n2,New,\n");
    let mut store = RecordStore::open(&path).unwrap();

    let outcome = apply_updates(
        &mut store,
        vec![
            SlugUpdate::new("1", "widget-old"),
            SlugUpdate::new("2", "widget"),
        ],
    )
    .unwrap();
    assert!(outcome.rejected.is_empty());
    assert_eq!(store.get("2").unwrap().slug.as_deref(), Some("widget"));
}

#[test]
fn apply_updates_reports_persist_failure() {
    let tmp = TempDir::new().unwrap();
    let path = write_csv(tmp.path(), "id,name,slug\n1,Widget,\n2,Gadget,\n");
    let mut store = RecordStore::open(&path).unwrap();
    fs::remove_file(&path).unwrap();
    fs::create_dir(&path).unwrap();

    let err = apply_updates(
        &mut store,
        vec![SlugUpdate::new("1", "widget"), SlugUpdate::new("2", "gadget")],
    )
    .unwrap_err();
    assert_eq!(err.committed, 2);
    assert!(matches!(err.source, StoreError::Persist { .. }));
    assert!(store.is_dirty());
}

#[test]
fn read_updates_accepts_both_header_styles() {
    let updates = read_updates("id,slug\n1, widget \n".as_bytes()).unwrap();
    assert_eq!(updates, vec![SlugUpdate::new("1", "widget")]);

    let updates = read_updates("record_id,new_slug\nrec9,gizmo\n".as_bytes()).unwrap();
    assert_eq!(updates, vec![SlugUpdate::new("rec9", "gizmo")]);

    assert!(read_updates("id,name\n1,x\n".as_bytes()).is_err());
}

#[test]
fn exports_use_configured_links() {
    let table = parse_table("id,name,slug\n1,Widget,widget\n2,Gadget,\n").unwrap();
    let links = LinkConfig::default().formatter().unwrap();

    let rows = export_links(&table, &links, "7");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].direct_url, "https://entremotivator.com/widget/");
    assert_eq!(
        rows[0].affiliate_url,
        "https://entremotivator.com/slicewp_affiliate/7/widget/"
    );

    let config = program_config(&table, &links, 10.0);
    let json = serde_json::to_string_pretty(&config).unwrap();
    assert!(json.contains("\"slug\": \"widget\""));
    assert!(!json.contains("Gadget"));
}

#[test]
fn auto_fill_persist_failure_reports_committed_records() {
    let tmp = TempDir::new().unwrap();
    let path = write_csv(
        tmp.path(),
        "id,name,slug\n1,Widget,\n2,Gadget,gadget\n3,Gizmo,\n",
    );
    let mut store = RecordStore::open(&path).unwrap();
    fs::remove_file(&path).unwrap();
    fs::create_dir(&path).unwrap();

    let err = auto_fill(&mut store).unwrap_err();
    assert_eq!(err.committed, 2);
    assert!(matches!(err.source, StoreError::Persist { .. }));
    assert!(store.is_dirty());
    assert_eq!(store.get("1").unwrap().slug.as_deref(), Some("widget"));
    assert_eq!(store.get("3").unwrap().slug.as_deref(), Some("gizmo"));
    assert_eq!(backup_count(tmp.path()), 1);

    fs::remove_dir(&path).unwrap();
    store.persist().unwrap();
    let reloaded = load_table(&path).unwrap();
    assert_eq!(reloaded.get("3").unwrap().slug.as_deref(), Some("gizmo"));
}

#[test]
fn bulk_backup_failure_commits_nothing() {
    const PRODUCTS: &str = "id,name,slug\n1,Widget,\n2,Gadget,\n";
    let tmp = TempDir::new().unwrap();
    let path = write_csv(tmp.path(), PRODUCTS);
    fs::write(tmp.path().join("backups"), "not a directory").unwrap();
    let mut store = RecordStore::open(&path).unwrap();

    let err = auto_fill(&mut store).unwrap_err();
    assert_eq!(err.committed, 0);
    assert!(matches!(err.source, StoreError::Backup(_)));

    let err = apply_updates(&mut store, vec![SlugUpdate::new("1", "widget")]).unwrap_err();
    assert_eq!(err.committed, 0);
    assert!(matches!(err.source, StoreError::Backup(_)));

    assert!(!store.is_dirty());
    assert!(store.table().iter().all(|r| r.slug.is_none()));
    assert_eq!(fs::read_to_string(&path).unwrap(), PRODUCTS);
}
