use std::env;
use std::fs;
use std::sync::{Mutex, OnceLock};

use agrobill_cli::commands::{bills, catalog, doctor, new_bill};
use chrono::NaiveDate;
use serde_json::Value;
use tempfile::TempDir;

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const MANAGED_VARS: &[&str] = &[
    "AGROBILL_STORE_BILLS_PATH",
    "AGROBILL_CATALOG_SOURCE",
    "AGROBILL_CATALOG_FILE_PATH",
    "AGROBILL_CATALOG_SHEET_BASE_URL",
    "AGROBILL_CATALOG_SHEET_SPREADSHEET_ID",
    "AGROBILL_CATALOG_SHEET_RANGE",
    "AGROBILL_CATALOG_SHEET_API_KEY",
    "AGROBILL_LOGGING_LEVEL",
    "AGROBILL_LOG_LEVEL",
    "AGROBILL_LOGGING_FORMAT",
    "AGROBILL_LOG_FORMAT",
];

fn with_env(vars: &[(&str, &str)], run: impl FnOnce()) {
    let _guard = ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env lock");
    for var in MANAGED_VARS {
        env::remove_var(var);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }
    run();
    for var in MANAGED_VARS {
        env::remove_var(var);
    }
}

fn parse_payload(raw: &str) -> Value {
    serde_json::from_str(raw).expect("command output should be JSON")
}

fn write_catalog(path: &std::path::Path) {
    fs::write(path, "Item Name,Price\nMalathion 50EC,\u{20b9}120.50\nNeem Oil,99.50\n")
        .expect("write catalog fixture");
}

fn bill_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 1).expect("valid date")
}

#[test]
fn new_bill_saves_and_appears_in_listings() {
    let dir = TempDir::new().expect("temp dir");
    let bills_path = dir.path().join("bills.json");
    let catalog_path = dir.path().join("catalog.csv");
    write_catalog(&catalog_path);

    with_env(
        &[
            ("AGROBILL_STORE_BILLS_PATH", bills_path.to_str().expect("utf8 path")),
            ("AGROBILL_CATALOG_FILE_PATH", catalog_path.to_str().expect("utf8 path")),
        ],
        || {
            let result =
                new_bill::run("Asha Traders", Some(bill_date()), &["Malathion 50EC=2".to_string()]);
            assert_eq!(result.exit_code, 0, "expected successful save: {}", result.output);

            let payload = parse_payload(&result.output);
            assert_eq!(payload["command"], "new-bill");
            assert_eq!(payload["status"], "ok");
            let message = payload["message"].as_str().expect("message");
            assert!(message.contains("bill #1"));
            assert!(message.contains("241.00"));

            let listing = bills::run(None);
            assert_eq!(listing.exit_code, 0);
            assert!(listing.output.contains("Asha Traders"));
            assert!(listing.output.contains("x2"));

            let filtered = bills::run(Some("asha"));
            assert!(filtered.output.contains("bill #1"));

            let excluded = bills::run(Some("anderson"));
            assert!(excluded.output.contains("no bills found"));
        },
    );
}

#[test]
fn sequential_bills_get_increasing_ids() {
    let dir = TempDir::new().expect("temp dir");
    let bills_path = dir.path().join("bills.json");
    let catalog_path = dir.path().join("catalog.csv");
    write_catalog(&catalog_path);

    with_env(
        &[
            ("AGROBILL_STORE_BILLS_PATH", bills_path.to_str().expect("utf8 path")),
            ("AGROBILL_CATALOG_FILE_PATH", catalog_path.to_str().expect("utf8 path")),
        ],
        || {
            for expected in ["bill #1", "bill #2"] {
                let result =
                    new_bill::run("John Smith", Some(bill_date()), &["Neem Oil".to_string()]);
                let payload = parse_payload(&result.output);
                assert!(payload["message"].as_str().expect("message").contains(expected));
            }
        },
    );
}

#[test]
fn new_bill_rejects_items_missing_from_the_catalog() {
    let dir = TempDir::new().expect("temp dir");
    let bills_path = dir.path().join("bills.json");
    let catalog_path = dir.path().join("catalog.csv");
    write_catalog(&catalog_path);

    with_env(
        &[
            ("AGROBILL_STORE_BILLS_PATH", bills_path.to_str().expect("utf8 path")),
            ("AGROBILL_CATALOG_FILE_PATH", catalog_path.to_str().expect("utf8 path")),
        ],
        || {
            let result =
                new_bill::run("Asha Traders", Some(bill_date()), &["Unknown Item".to_string()]);
            assert_eq!(result.exit_code, 5);

            let payload = parse_payload(&result.output);
            assert_eq!(payload["status"], "error");
            assert_eq!(payload["error_class"], "validation");
            assert!(!bills_path.exists(), "nothing should be persisted for a rejected bill");
        },
    );
}

#[test]
fn new_bill_rejects_blank_customer_without_touching_the_store() {
    let dir = TempDir::new().expect("temp dir");
    let bills_path = dir.path().join("bills.json");
    let catalog_path = dir.path().join("catalog.csv");
    write_catalog(&catalog_path);

    with_env(
        &[
            ("AGROBILL_STORE_BILLS_PATH", bills_path.to_str().expect("utf8 path")),
            ("AGROBILL_CATALOG_FILE_PATH", catalog_path.to_str().expect("utf8 path")),
        ],
        || {
            let result = new_bill::run("   ", Some(bill_date()), &["Neem Oil".to_string()]);
            assert_eq!(result.exit_code, 5);

            let payload = parse_payload(&result.output);
            assert_eq!(payload["error_class"], "validation");

            let raw = fs::read_to_string(&bills_path).expect("store file should exist");
            assert_eq!(raw, "[]", "the store should stay empty after a rejected save");
        },
    );
}

#[test]
fn catalog_lists_and_filters_entries() {
    let dir = TempDir::new().expect("temp dir");
    let catalog_path = dir.path().join("catalog.csv");
    write_catalog(&catalog_path);

    with_env(
        &[("AGROBILL_CATALOG_FILE_PATH", catalog_path.to_str().expect("utf8 path"))],
        || {
            let all = catalog::run(None);
            assert_eq!(all.exit_code, 0);
            assert!(all.output.contains("Malathion 50EC"));
            assert!(all.output.contains("Neem Oil"));

            let filtered = catalog::run(Some("neem"));
            assert!(filtered.output.contains("Neem Oil"));
            assert!(!filtered.output.contains("Malathion"));
        },
    );
}

#[test]
fn catalog_tolerates_a_missing_source() {
    let dir = TempDir::new().expect("temp dir");

    with_env(
        &[(
            "AGROBILL_CATALOG_FILE_PATH",
            dir.path().join("absent.csv").to_str().expect("utf8 path"),
        )],
        || {
            let result = catalog::run(None);
            assert_eq!(result.exit_code, 0);
            assert!(result.output.contains("catalog is empty"));
        },
    );
}

#[test]
fn bills_degrades_to_empty_listing_on_malformed_store() {
    let dir = TempDir::new().expect("temp dir");
    let bills_path = dir.path().join("bills.json");
    fs::write(&bills_path, "{not json").expect("write corrupt store");

    with_env(
        &[("AGROBILL_STORE_BILLS_PATH", bills_path.to_str().expect("utf8 path"))],
        || {
            let result = bills::run(None);
            assert_eq!(result.exit_code, 4);
            assert!(result.output.contains("bill store unavailable"));
            assert!(result.output.contains("no bills to show"));
        },
    );
}

#[test]
fn doctor_passes_with_valid_environment() {
    let dir = TempDir::new().expect("temp dir");
    let bills_path = dir.path().join("bills.json");
    let catalog_path = dir.path().join("catalog.csv");
    write_catalog(&catalog_path);

    with_env(
        &[
            ("AGROBILL_STORE_BILLS_PATH", bills_path.to_str().expect("utf8 path")),
            ("AGROBILL_CATALOG_FILE_PATH", catalog_path.to_str().expect("utf8 path")),
        ],
        || {
            let report: Value =
                serde_json::from_str(&doctor::run(true)).expect("doctor json output");
            assert_eq!(report["overall_status"], "pass", "report: {report}");
            assert_eq!(report["checks"].as_array().expect("checks").len(), 3);
        },
    );
}

#[test]
fn doctor_flags_a_malformed_bill_store() {
    let dir = TempDir::new().expect("temp dir");
    let bills_path = dir.path().join("bills.json");
    let catalog_path = dir.path().join("catalog.csv");
    write_catalog(&catalog_path);
    fs::write(&bills_path, "{not json").expect("write corrupt store");

    with_env(
        &[
            ("AGROBILL_STORE_BILLS_PATH", bills_path.to_str().expect("utf8 path")),
            ("AGROBILL_CATALOG_FILE_PATH", catalog_path.to_str().expect("utf8 path")),
        ],
        || {
            let output = doctor::run(false);
            assert!(output.contains("one or more readiness checks failed"));
            assert!(output.contains("[fail] bill_store_access"));
            assert!(output.contains("[pass] catalog_source"));
        },
    );
}
