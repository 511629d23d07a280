//! Output Formatting
//!
//! Renders estimates, rate tables and conversions either as colored terminal
//! reports or as JSON for programmatic consumption.
//!
//! ## Estimate report
//!
//! - Total monthly spend and the plan-adjusted bill
//! - Spend per category (streaming, encoding, storage)
//! - Per-SKU detail: usage, effective rate, monthly spend
//! - Input advisories and SKUs that could not be priced
//!
//! Rows with zero usage are hidden unless `show_zero_usage` is set.

use crate::models::{Category, Tier};
use crate::rate_table::RateTable;
use crate::session::Estimate;
use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;

pub struct DisplayManager {
    json_pretty: bool,
    show_zero_usage: bool,
}

impl Default for DisplayManager {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl DisplayManager {
    pub fn new(json_pretty: bool, show_zero_usage: bool) -> Self {
        Self {
            json_pretty,
            show_zero_usage,
        }
    }

    pub fn to_json<T: Serialize>(&self, value: &T) -> Result<String> {
        let rendered = if self.json_pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        rendered.context("Failed to serialize output to JSON")
    }

    pub fn display_estimate(&self, estimate: &Estimate, json_output: bool) -> Result<()> {
        if json_output {
            println!("{}", self.to_json(estimate)?);
            return Ok(());
        }

        println!("\n{}", "=".repeat(80).bright_cyan());
        println!("{}", "Monthly Spend Estimate".bright_white().bold());
        println!("{}", "=".repeat(80).bright_cyan());

        println!(
            "\n{} Total Monthly Spend: {}",
            "💰".bright_yellow(),
            format_spend(estimate.summary.total).bright_green().bold()
        );
        println!(
            "   Billed after plan credit: {} (Mux credits {})",
            format_spend(estimate.bill.adjusted_total).bright_green(),
            format_spend(estimate.bill.mux_credits).bright_yellow()
        );

        println!("\n{} Monthly Spend by SKU Category:", "📊".bright_yellow());
        for category in [Category::Streaming, Category::Encoding, Category::Storage] {
            println!(
                "   {:<10} {}",
                category.as_str().bright_cyan(),
                format_spend(estimate.summary.category_total(category)).bright_green()
            );
        }

        println!("\n{} Spend Details:", "📋".bright_blue());
        println!(
            "   {:<10} {:<34} {:>14} {:>14} {:>14}",
            "Category", "SKU", "Usage", "Rate", "Spend"
        );
        for record in estimate
            .records
            .iter()
            .filter(|r| self.show_zero_usage || r.usage != 0.0)
        {
            println!(
                "   {:<10} {:<34} {:>14} {:>14} {:>14}",
                record.category.as_str(),
                record.sku.as_str().bright_white(),
                format_quantity(record.usage),
                format!("${:.4}", record.effective_rate),
                format_spend(record.total_spend).bright_green()
            );
        }

        if !estimate.failures.is_empty() {
            println!("\n{} Could not price:", "❌".bright_red());
            for failure in &estimate.failures {
                println!("   {}", failure.to_string().bright_red());
            }
        }

        for advisory in &estimate.advisories {
            println!("\n{} {}", "⚠️".bright_yellow(), advisory.to_string().red());
        }

        println!();
        Ok(())
    }

    pub fn display_tiers(&self, table: &RateTable, json_output: bool) -> Result<()> {
        let tiers: Vec<&Tier> = table.skus().flat_map(|sku| table.tiers(sku)).collect();
        self.print_tiers(&tiers, json_output)
    }

    pub fn print_tiers(&self, tiers: &[&Tier], json_output: bool) -> Result<()> {
        if json_output {
            println!("{}", self.to_json(&serde_json::json!({ "tier": tiers }))?);
            return Ok(());
        }

        println!(
            "   {:<34} {:<10} {:>12} {:>12} {:>10} {:>14}",
            "SKU", "Category", "Start", "End", "Price", "Prior Spend"
        );
        for tier in tiers {
            let end = tier
                .end
                .map(format_quantity)
                .unwrap_or_else(|| "∞".to_string());
            println!(
                "   {:<34} {:<10} {:>12} {:>12} {:>10} {:>14}",
                tier.sku.as_str().bright_white(),
                tier.category.as_str(),
                format_quantity(tier.start),
                end,
                tier.price,
                format!("${:.2}", tier.previous_tier_spend)
            );
        }
        Ok(())
    }

    pub fn display_conversion(
        &self,
        storage_minutes: f64,
        streaming_minutes: f64,
        json_output: bool,
    ) -> Result<()> {
        if json_output {
            let output = serde_json::json!({
                "storage_minutes": storage_minutes,
                "streaming_minutes": streaming_minutes,
            });
            println!("{}", self.to_json(&output)?);
            return Ok(());
        }

        println!(
            "{} Storage minutes: {}",
            "💾".bright_blue(),
            format_quantity(storage_minutes).bright_white().bold()
        );
        println!(
            "{} Streaming minutes: {}",
            "📺".bright_blue(),
            format_quantity(streaming_minutes).bright_white().bold()
        );
        Ok(())
    }
}

/// Whole-dollar amount with thousands separators, e.g. `$12,345`.
pub fn format_spend(amount: f64) -> String {
    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{}${}", sign, group_thousands(rounded.abs() as u64))
}

/// Quantity rounded to whole units with thousands separators.
pub fn format_quantity(quantity: f64) -> String {
    let rounded = quantity.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{}{}", sign, group_thousands(rounded.abs() as u64))
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
