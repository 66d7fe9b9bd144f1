use agrobill_core::config::{AppConfig, LoadOptions};
use agrobill_core::Bill;
use agrobill_store::{BillStore, JsonBillStore, StoreError};

use crate::commands::CommandResult;

pub fn run(customer: Option<&str>) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult {
                exit_code: 2,
                output: format!("config validation failed: {error}"),
            };
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult {
                exit_code: 3,
                output: format!("failed to initialize async runtime: {error}"),
            };
        }
    };

    runtime.block_on(async {
        let store = match JsonBillStore::open(&config.store.bills_path).await {
            Ok(store) => store,
            Err(error) => return degraded(&error),
        };

        let bills = match customer {
            Some(needle) => store.find_by_customer(needle).await,
            None => store.get_all().await,
        };

        match bills {
            Ok(bills) => CommandResult { exit_code: 0, output: render(&bills) },
            Err(error) => degraded(&error),
        }
    })
}

/// Reads degrade to an empty listing; the failure is still surfaced in the
/// output and the exit code.
fn degraded(error: &StoreError) -> CommandResult {
    CommandResult { exit_code: 4, output: format!("bill store unavailable: {error}\nno bills to show") }
}

fn render(bills: &[Bill]) -> String {
    if bills.is_empty() {
        return "no bills found".to_string();
    }

    let mut lines = Vec::new();
    for bill in bills {
        lines.push(format!(
            "bill #{}  {}  {}  total \u{20b9}{}",
            bill.id, bill.customer_name, bill.date, bill.total_amount
        ));
        for item in &bill.items {
            lines.push(format!(
                "    {} x{} @ \u{20b9}{} = \u{20b9}{}",
                item.name,
                item.quantity,
                item.unit_price,
                item.line_total()
            ));
        }
    }
    lines.join("\n")
}
