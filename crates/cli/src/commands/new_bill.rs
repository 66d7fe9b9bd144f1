use chrono::{Local, NaiveDate};

use agrobill_catalog::provider_from_config;
use agrobill_core::config::{AppConfig, LoadOptions};
use agrobill_core::{BillDraft, Cart, CatalogEntry};
use agrobill_store::{BillStore, JsonBillStore};

use crate::commands::CommandResult;

pub fn run(customer: &str, date: Option<NaiveDate>, item_args: &[String]) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "new-bill",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "new-bill",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let result = runtime.block_on(async {
        let provider = provider_from_config(&config.catalog)
            .map_err(|error| ("catalog_source", error.to_string(), 4u8))?;
        let entries = provider.fetch_or_empty().await;

        let mut cart = Cart::new();
        for arg in item_args {
            let (name, quantity) =
                parse_item_arg(arg).map_err(|message| ("validation", message, 5u8))?;
            let entry = resolve_entry(&entries, &name).ok_or_else(|| {
                ("validation", format!("item `{name}` is not in the catalog"), 5u8)
            })?;

            cart.add_item(entry.name.as_str(), entry.unit_price);
            if quantity > 1 {
                if let Some(index) =
                    cart.items().iter().position(|line| line.name == entry.name)
                {
                    cart.change_quantity(index, i64::from(quantity) - 1)
                        .map_err(|error| ("validation", error.to_string(), 5u8))?;
                }
            }
        }

        let date = date.unwrap_or_else(|| Local::now().date_naive());
        let draft = BillDraft::from_cart(customer, date, &cart);

        let store = JsonBillStore::open(&config.store.bills_path)
            .await
            .map_err(|error| ("persistence", error.to_string(), 4u8))?;

        match store.save(draft).await {
            Ok(bill) => {
                // The cart is only cleared once the bill is durably saved.
                cart.clear();
                Ok(bill)
            }
            Err(error) if error.is_validation() => Err(("validation", error.to_string(), 5u8)),
            Err(error) => Err(("persistence", error.to_string(), 4u8)),
        }
    });

    match result {
        Ok(bill) => CommandResult::success(
            "new-bill",
            format!(
                "saved bill #{} for {} ({}): {} line(s), total \u{20b9}{}",
                bill.id,
                bill.customer_name,
                bill.date,
                bill.items.len(),
                bill.total_amount
            ),
        ),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("new-bill", error_class, message, exit_code)
        }
    }
}

/// `NAME` or `NAME=QTY`, where QTY is a positive integer.
fn parse_item_arg(arg: &str) -> Result<(String, u32), String> {
    let arg = arg.trim();
    if arg.is_empty() {
        return Err("item argument must not be empty".to_string());
    }

    let Some((name, raw_quantity)) = arg.rsplit_once('=') else {
        return Ok((arg.to_string(), 1));
    };

    let quantity: u32 = raw_quantity
        .trim()
        .parse()
        .map_err(|_| format!("invalid quantity `{raw_quantity}` in item argument `{arg}`"))?;
    if quantity == 0 {
        return Err(format!("quantity must be at least 1 in item argument `{arg}`"));
    }

    Ok((name.trim().to_string(), quantity))
}

fn resolve_entry<'a>(entries: &'a [CatalogEntry], name: &str) -> Option<&'a CatalogEntry> {
    let needle = name.to_lowercase();
    entries.iter().find(|entry| entry.name.to_lowercase() == needle)
}
