//! Dashboard summary.

use std::io::Write;

use salesdesk_admin::state::AppState;

use super::{CommandError, app_err};

/// Print the inventory and customer summary.
///
/// # Errors
///
/// Returns an error if either collection cannot be read.
pub fn show(state: &AppState, json: bool, out: &mut dyn Write) -> Result<(), CommandError> {
    let summary = state.summary()?;

    if json {
        let text = serde_json::to_string_pretty(&summary)
            .map_err(|e| app_err(salesdesk_admin::db::RepositoryError::from(e)))?;
        writeln!(out, "{text}")?;
        return Ok(());
    }

    writeln!(out, "Products:       {}", summary.product_count)?;
    writeln!(out, "  available:    {}", summary.available_products)?;
    writeln!(out, "  out of stock: {}", summary.out_of_stock_products)?;
    writeln!(out, "Units in stock: {}", summary.total_stock)?;
    writeln!(out, "Stock value:    {:.2}", summary.inventory_value)?;
    writeln!(out, "Average price:  {:.2}", summary.average_price)?;
    writeln!(out, "Customers:      {}", summary.customer_count)?;
    writeln!(out, "  active:       {}", summary.active_customers)?;
    writeln!(out, "  inactive:     {}", summary.inactive_customers)?;

    if !summary.products_by_category.is_empty() {
        writeln!(out, "\nBy category:")?;
        for (category, count) in &summary.products_by_category {
            writeln!(out, "  {category:<14} {count}")?;
        }
    }
    if !summary.customers_by_company.is_empty() {
        writeln!(out, "\nBy company:")?;
        for (company, count) in &summary.customers_by_company {
            writeln!(out, "  {company:<18} {count}")?;
        }
    }
    if !summary.low_stock.is_empty() {
        writeln!(
            out,
            "\nLow stock (below {}):",
            state.config().low_stock_threshold
        )?;
        for item in &summary.low_stock {
            writeln!(out, "  {:<20} {:>4}  {}", item.name, item.stock, item.id)?;
        }
    }
    Ok(())
}
