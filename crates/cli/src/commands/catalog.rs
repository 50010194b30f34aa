//! Product and customer commands.
//!
//! Both collections share the list, show and delete plumbing; add and update
//! go through the entity's own form so validation messages match the ones a
//! form would show.

use std::io::Write;

use clap::{Args, Subcommand};
use tracing::info;

use salesdesk_admin::db::CollectionStore;
use salesdesk_admin::error::AppError;
use salesdesk_admin::state::AppState;
use salesdesk_core::{
    Customer, CustomerForm, CustomerPatchForm, Entity, PageRequest, Product, ProductForm,
    ProductPatchForm,
};

use super::{CommandError, app_err};

#[derive(Subcommand)]
pub enum ProductAction {
    /// List products, optionally filtered
    List(ListArgs),
    /// Show one product
    Show { id: String },
    /// Add a product
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        price: String,
        #[arg(long)]
        stock: String,
        /// `Available` or `Out of Stock`
        #[arg(long, default_value = "Available")]
        status: String,
    },
    /// Change some fields of a product
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        price: Option<String>,
        #[arg(long)]
        stock: Option<String>,
        #[arg(long)]
        status: Option<String>,
    },
    /// Delete a product
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum CustomerAction {
    /// List customers, optionally filtered
    List(ListArgs),
    /// Show one customer
    Show { id: String },
    /// Add a customer
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        company: String,
        /// `Active` or `Inactive`
        #[arg(long, default_value = "Active")]
        status: String,
    },
    /// Change some fields of a customer
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        status: Option<String>,
    },
    /// Delete a customer
    Delete { id: String },
}

#[derive(Args)]
pub struct ListArgs {
    /// Case-insensitive text to match against any field
    #[arg(short, long, default_value = "")]
    search: String,
    /// 1-based page number
    #[arg(short, long, default_value_t = 1)]
    page: u32,
    /// Rows per page (defaults to `SALESDESK_PAGE_SIZE`)
    #[arg(long)]
    per_page: Option<u32>,
}

/// Run a product subcommand.
///
/// # Errors
///
/// Returns an error for invalid input, a missing id, or a storage failure.
pub fn products(
    state: &AppState,
    action: ProductAction,
    out: &mut dyn Write,
) -> Result<(), CommandError> {
    let store = state.products();
    match action {
        ProductAction::List(args) => list(&store, &args, state.config().page_size, out),
        ProductAction::Show { id } => show(&store, id, out),
        ProductAction::Add {
            name,
            category,
            price,
            stock,
            status,
        } => {
            let new = ProductForm {
                name,
                category,
                price,
                stock,
                status,
            }
            .parse()
            .map_err(app_err)?;
            let created = store.create(new).map_err(app_err)?;
            info!(id = %created.id, "product added");
            write_record(out, &created)
        }
        ProductAction::Update {
            id,
            name,
            category,
            price,
            stock,
            status,
        } => {
            let patch = ProductPatchForm {
                name,
                category,
                price,
                stock,
                status,
            }
            .parse()
            .map_err(app_err)?;
            update(&store, id, patch, out)
        }
        ProductAction::Delete { id } => delete(&store, id, out),
    }
}

/// Run a customer subcommand.
///
/// # Errors
///
/// Returns an error for invalid input, a missing id, or a storage failure.
pub fn customers(
    state: &AppState,
    action: CustomerAction,
    out: &mut dyn Write,
) -> Result<(), CommandError> {
    let store = state.customers();
    match action {
        CustomerAction::List(args) => list(&store, &args, state.config().page_size, out),
        CustomerAction::Show { id } => show(&store, id, out),
        CustomerAction::Add {
            name,
            email,
            phone,
            company,
            status,
        } => {
            let new = CustomerForm {
                name,
                email,
                phone,
                company,
                status,
            }
            .parse()
            .map_err(app_err)?;
            let created = store.create(new).map_err(app_err)?;
            info!(id = %created.id, "customer added");
            write_record(out, &created)
        }
        CustomerAction::Update {
            id,
            name,
            email,
            phone,
            company,
            status,
        } => {
            let patch = CustomerPatchForm {
                name,
                email,
                phone,
                company,
                status,
            }
            .parse()
            .map_err(app_err)?;
            update(&store, id, patch, out)
        }
        CustomerAction::Delete { id } => delete(&store, id, out),
    }
}

/// How a record is laid out as a table row.
pub trait Row {
    const COLUMNS: &'static [&'static str];

    fn cells(&self) -> Vec<String>;
}

impl Row for Product {
    const COLUMNS: &'static [&'static str] = &["ID", "NAME", "CATEGORY", "PRICE", "STOCK", "STATUS"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.category.clone(),
            format!("{:.2}", self.price.amount()),
            self.stock.to_string(),
            self.status.to_string(),
        ]
    }
}

impl Row for Customer {
    const COLUMNS: &'static [&'static str] = &["ID", "NAME", "EMAIL", "PHONE", "COMPANY", "STATUS"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.email.to_string(),
            self.phone.to_string(),
            self.company.clone(),
            self.status.to_string(),
        ]
    }
}

fn list<E: Entity + Row>(
    store: &CollectionStore<'_, E>,
    args: &ListArgs,
    default_per_page: u32,
    out: &mut dyn Write,
) -> Result<(), CommandError> {
    let request = PageRequest::new(args.page, args.per_page.unwrap_or(default_per_page));
    let page = store.search(&args.search, request).map_err(app_err)?;

    let rows: Vec<Vec<String>> = page.items.iter().map(Row::cells).collect();
    write_table(out, E::COLUMNS, &rows)?;
    writeln!(
        out,
        "Page {} of {} ({} {} total)",
        page.page,
        page.total_pages,
        page.total,
        E::SLOT
    )?;
    Ok(())
}

fn show<E: Entity + Row>(
    store: &CollectionStore<'_, E>,
    id: String,
    out: &mut dyn Write,
) -> Result<(), CommandError>
where
    E::Id: From<String>,
{
    let id = E::Id::from(id);
    let record = store
        .get(&id)
        .map_err(app_err)?
        .ok_or_else(|| not_found::<E>(&id))?;
    write_record(out, &record)
}

fn update<E: Entity + Row>(
    store: &CollectionStore<'_, E>,
    id: String,
    patch: E::Patch,
    out: &mut dyn Write,
) -> Result<(), CommandError>
where
    E::Id: From<String>,
{
    let id = E::Id::from(id);
    let updated = store
        .update(&id, patch)
        .map_err(app_err)?
        .ok_or_else(|| not_found::<E>(&id))?;
    info!(id = %id, "{} updated", E::KIND);
    write_record(out, &updated)
}

fn delete<E: Entity>(
    store: &CollectionStore<'_, E>,
    id: String,
    out: &mut dyn Write,
) -> Result<(), CommandError>
where
    E::Id: From<String>,
{
    let id = E::Id::from(id);
    if !store.delete(&id).map_err(app_err)? {
        return Err(not_found::<E>(&id));
    }
    info!(id = %id, "{} deleted", E::KIND);
    writeln!(out, "Deleted {} {id}", E::KIND)?;
    Ok(())
}

fn not_found<E: Entity>(id: &E::Id) -> CommandError {
    CommandError::App(AppError::NotFound(format!("{} {id}", E::KIND)))
}

fn write_record<E: Row>(out: &mut dyn Write, record: &E) -> Result<(), CommandError> {
    for (column, value) in E::COLUMNS.iter().zip(record.cells()) {
        writeln!(out, "{column:<10} {value}")?;
    }
    Ok(())
}

fn write_table(
    out: &mut dyn Write,
    columns: &[&str],
    rows: &[Vec<String>],
) -> Result<(), CommandError> {
    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            rows.iter()
                .filter_map(|row| row.get(i))
                .map(String::len)
                .chain(std::iter::once(column.len()))
                .max()
                .unwrap_or_default()
        })
        .collect();

    let header: Vec<String> = columns.iter().map(|c| (*c).to_owned()).collect();
    for row in std::iter::once(&header).chain(rows) {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        writeln!(out, "{}", line.join("  ").trim_end())?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use salesdesk_admin::db::Storage;

    use super::*;
    use crate::commands::test_support::{logged_in_state, output};

    fn list_args(search: &str, page: u32) -> ListArgs {
        ListArgs {
            search: search.to_owned(),
            page,
            per_page: None,
        }
    }

    #[test]
    fn test_add_and_show_product() {
        let state = logged_in_state(false);
        let mut buf = Vec::new();
        products(
            &state,
            ProductAction::Add {
                name: "Laptop".to_owned(),
                category: "Computers".to_owned(),
                price: "999.99".to_owned(),
                stock: "12".to_owned(),
                status: "Available".to_owned(),
            },
            &mut buf,
        )
        .unwrap();
        let text = output(buf);
        assert!(text.contains("999.99"));

        let id = state.products().list().unwrap().remove(0).id;
        let mut buf = Vec::new();
        products(&state, ProductAction::Show { id: id.to_string() }, &mut buf).unwrap();
        assert!(output(buf).contains("Laptop"));
    }

    #[test]
    fn test_add_reports_every_invalid_field() {
        let state = logged_in_state(false);
        let err = products(
            &state,
            ProductAction::Add {
                name: String::new(),
                category: "Audio".to_owned(),
                price: "-1".to_owned(),
                stock: "x".to_owned(),
                status: "Sold".to_owned(),
            },
            &mut Vec::new(),
        )
        .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Product name is required"));
        assert!(message.contains("Valid price required"));
        assert!(message.contains("Valid stock required"));
        assert!(message.contains("Status required"));
        assert_eq!(state.products().count().unwrap(), 0);
    }

    #[test]
    fn test_list_paginates_seeded_customers() {
        let state = logged_in_state(true);
        let mut buf = Vec::new();
        customers(&state, CustomerAction::List(list_args("", 4)), &mut buf).unwrap();
        let text = output(buf);
        assert!(text.starts_with("ID"));
        assert!(text.contains("Page 4 of 4 (40 customers total)"));

        let mut buf = Vec::new();
        customers(&state, CustomerAction::List(list_args("", 9)), &mut buf).unwrap();
        assert!(output(buf).contains("Page 4 of 4"));
    }

    #[test]
    fn test_search_filters() {
        let state = logged_in_state(true);
        let mut buf = Vec::new();
        products(&state, ProductAction::List(list_args("laptop 1", 1)), &mut buf).unwrap();
        // "Laptop 1" only; "Laptop 11" etc. do not exist in a 40-item cycle.
        assert!(output(buf).contains("(1 products total)"));
    }

    #[test]
    fn test_update_and_delete_customer() {
        let state = logged_in_state(true);
        let target = state.customers().list().unwrap().remove(0);

        let mut buf = Vec::new();
        customers(
            &state,
            CustomerAction::Update {
                id: target.id.to_string(),
                name: None,
                email: None,
                phone: None,
                company: Some("Hooli".to_owned()),
                status: Some("Inactive".to_owned()),
            },
            &mut buf,
        )
        .unwrap();
        let updated = state.customers().get(&target.id).unwrap().unwrap();
        assert_eq!(updated.company, "Hooli");
        assert_eq!(updated.name, target.name);

        customers(
            &state,
            CustomerAction::Delete {
                id: target.id.to_string(),
            },
            &mut buf,
        )
        .unwrap();
        assert_eq!(state.customers().count().unwrap(), 39);
    }

    #[test]
    fn test_missing_id_is_not_found() {
        let state = logged_in_state(false);
        let err = products(
            &state,
            ProductAction::Delete {
                id: "missing".to_owned(),
            },
            &mut Vec::new(),
        )
        .unwrap_err();
        assert!(matches!(err, CommandError::App(AppError::NotFound(_))));
        assert!(state.storage().read("products").unwrap().is_none());
    }
}
