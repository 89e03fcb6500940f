use anyhow::{Context, Result};
use chrono::Utc;
use std::fs::OpenOptions;
use std::io::Write;

use crate::dashboard::types::{Order, Product};

const HEADER: &str = "timestamp,kind,id,item,quantity,price,status,tx_hash";

/// Append-only CSV trail of listings and order status changes
pub struct CsvLogger {
    log_path: String,
}

impl CsvLogger {
    pub fn new(log_path: String) -> Result<Self> {
        // Create CSV file with headers if it doesn't exist
        if !std::path::Path::new(&log_path).exists() {
            let mut file = OpenOptions::new()
                .create(true)
                .write(true)
                .open(&log_path)
                .with_context(|| format!("Failed to create audit log: {}", log_path))?;

            writeln!(file, "{}", HEADER)?;
        }

        Ok(Self { log_path })
    }

    pub fn log_listing(&self, product: &Product) -> Result<()> {
        self.append(&format!(
            "{},LISTING,{},{},{:.2},{:.2},listed,",
            product.created_at.to_rfc3339(),
            product.id,
            escape(&product.crop_type),
            product.quantity,
            product.price,
        ))
    }

    /// Log an order at its current status
    pub fn log_order(&self, order: &Order) -> Result<()> {
        self.append(&format!(
            "{},ORDER,{},{},{:.2},,{},{:?}",
            Utc::now().to_rfc3339(),
            order.id,
            escape(&order.product_name),
            order.quantity,
            order.status,
            order.tx_hash,
        ))
    }

    fn append(&self, line: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.log_path)
            .with_context(|| format!("Failed to open audit log: {}", self.log_path))?;

        writeln!(file, "{}", line)?;
        Ok(())
    }
}

/// Quote free text that would break the column layout
fn escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
