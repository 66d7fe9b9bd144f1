use serde::Serialize;

use agrobill_catalog::provider_from_config;
use agrobill_core::config::{AppConfig, CatalogSource, LoadOptions};
use agrobill_store::{BillStore, JsonBillStore};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> String {
    let report = build_report();

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed: {}\"}}",
                error.to_string().replace('"', "'")
            )
        });
    }

    render_human(&report)
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });

            match tokio::runtime::Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => {
                    checks.push(runtime.block_on(check_bill_store(&config)));
                    checks.push(runtime.block_on(check_catalog_source(&config)));
                }
                Err(error) => {
                    checks.push(DoctorCheck {
                        name: "runtime_init",
                        status: CheckStatus::Fail,
                        details: error.to_string(),
                    });
                    checks.push(skipped("bill_store_access", "async runtime unavailable"));
                    checks.push(skipped("catalog_source", "async runtime unavailable"));
                }
            }
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(skipped("bill_store_access", "configuration did not load"));
            checks.push(skipped("catalog_source", "configuration did not load"));
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

async fn check_bill_store(config: &AppConfig) -> DoctorCheck {
    match JsonBillStore::open(&config.store.bills_path).await {
        Ok(store) => match store.get_all().await {
            Ok(bills) => DoctorCheck {
                name: "bill_store_access",
                status: CheckStatus::Pass,
                details: format!(
                    "{} bill(s) at {}",
                    bills.len(),
                    config.store.bills_path.display()
                ),
            },
            Err(error) => DoctorCheck {
                name: "bill_store_access",
                status: CheckStatus::Fail,
                details: error.to_string(),
            },
        },
        Err(error) => DoctorCheck {
            name: "bill_store_access",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

async fn check_catalog_source(config: &AppConfig) -> DoctorCheck {
    let source = match config.catalog.source {
        CatalogSource::File => "file",
        CatalogSource::Sheet => "sheet",
    };

    let provider = match provider_from_config(&config.catalog) {
        Ok(provider) => provider,
        Err(error) => {
            return DoctorCheck {
                name: "catalog_source",
                status: CheckStatus::Fail,
                details: error.to_string(),
            };
        }
    };

    match provider.fetch().await {
        Ok(entries) => DoctorCheck {
            name: "catalog_source",
            status: CheckStatus::Pass,
            details: format!("{} catalog item(s) from the {source} source", entries.len()),
        },
        Err(error) => DoctorCheck {
            name: "catalog_source",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn skipped(name: &'static str, reason: &str) -> DoctorCheck {
    DoctorCheck {
        name,
        status: CheckStatus::Skipped,
        details: format!("skipped because {reason}"),
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = vec![report.summary.clone()];
    for check in &report.checks {
        let status = match check.status {
            CheckStatus::Pass => "pass",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("  [{status}] {}: {}", check.name, check.details));
    }
    lines.join("\n")
}
