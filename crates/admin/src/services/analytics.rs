//! Dashboard figures derived from the catalog.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use salesdesk_core::{Customer, CustomerStatus, Product, ProductId, ProductStatus};

/// Stock level below which a product is flagged.
pub const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 10;

/// A product running low, as listed on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LowStockItem {
    pub id: ProductId,
    pub name: String,
    pub stock: u32,
}

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub product_count: usize,
    pub available_products: usize,
    pub out_of_stock_products: usize,
    pub total_stock: u64,
    /// Sum of price × stock over every product, capped at [`Decimal::MAX`].
    pub inventory_value: Decimal,
    /// Mean unit price, rounded to cents. Zero for an empty catalog.
    pub average_price: Decimal,
    /// Products whose stock is below the threshold, lowest first.
    pub low_stock: Vec<LowStockItem>,
    pub products_by_category: BTreeMap<String, usize>,
    pub customer_count: usize,
    pub active_customers: usize,
    pub inactive_customers: usize,
    pub customers_by_company: BTreeMap<String, usize>,
}

impl DashboardSummary {
    /// Compute the summary from full collections.
    #[must_use]
    pub fn compute(products: &[Product], customers: &[Customer], low_stock_threshold: u32) -> Self {
        let mut products_by_category = BTreeMap::new();
        let mut inventory_value = Decimal::ZERO;
        let mut price_sum = Decimal::ZERO;
        let mut total_stock = 0_u64;
        let mut available_products = 0;

        for product in products {
            *products_by_category
                .entry(product.category.clone())
                .or_insert(0) += 1;
            let price = product.price.amount();
            inventory_value =
                inventory_value.saturating_add(price.saturating_mul(Decimal::from(product.stock)));
            price_sum = price_sum.saturating_add(price);
            total_stock += u64::from(product.stock);
            if product.status == ProductStatus::Available {
                available_products += 1;
            }
        }

        let average_price = if products.is_empty() {
            Decimal::ZERO
        } else {
            (price_sum / Decimal::from(products.len())).round_dp(2)
        };

        let mut low_stock: Vec<LowStockItem> = products
            .iter()
            .filter(|p| p.stock < low_stock_threshold)
            .map(|p| LowStockItem {
                id: p.id.clone(),
                name: p.name.clone(),
                stock: p.stock,
            })
            .collect();
        low_stock.sort_by_key(|item| item.stock);

        let mut customers_by_company = BTreeMap::new();
        let mut active_customers = 0;
        for customer in customers {
            *customers_by_company
                .entry(customer.company.clone())
                .or_insert(0) += 1;
            if customer.status == CustomerStatus::Active {
                active_customers += 1;
            }
        }

        Self {
            product_count: products.len(),
            available_products,
            out_of_stock_products: products.len() - available_products,
            total_stock,
            inventory_value,
            average_price,
            low_stock,
            products_by_category,
            customer_count: customers.len(),
            active_customers,
            inactive_customers: customers.len() - active_customers,
            customers_by_company,
        }
    }
}
