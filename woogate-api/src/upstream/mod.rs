//! Upstream store clients.

pub mod woocommerce;

pub use woocommerce::{WooCommerceClient, TOTAL_PAGES_HEADER};
