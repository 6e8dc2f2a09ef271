//! `storefront dashboard [--watch]`.

use std::fmt::Write as _;

use anyhow::Result;
use chrono::Local;
use tracing::info;

use storefront_core::{compute_metrics, Metrics, Money};
use storefront_db::{ItemStore, LiveDashboard, SaleStore};

use super::{clip, Context};

pub async fn run(ctx: &Context, watch: bool) -> Result<()> {
    if !watch {
        let items = ctx.db.list_items(&ctx.session).await?;
        let sales = ctx.db.list_sales(&ctx.session).await?;
        let metrics = compute_metrics(&items, &sales, &Local::now());
        return print(ctx.json, &metrics, &ctx.config.currency_symbol);
    }

    let json = ctx.json;
    let symbol = ctx.config.currency_symbol.clone();
    let dashboard = LiveDashboard::start(&ctx.db, &ctx.session, move |metrics| {
        if let Err(e) = print(json, &metrics, &symbol) {
            tracing::error!(error = %e, "Failed to print metrics");
        }
    });
    info!("Watching for changes, press Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;
    dashboard.stop();
    Ok(())
}

fn print(json: bool, metrics: &Metrics, symbol: &str) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(metrics)?);
    } else {
        println!("{}", render(metrics, symbol));
    }
    Ok(())
}

/// Plain-text dashboard.
pub fn render(metrics: &Metrics, symbol: &str) -> String {
    let money = |m: Money| m.format_with_symbol(symbol);
    let mut out = String::new();

    // writing to a String cannot fail
    let _ = writeln!(out, "{:<12} {:>12} {:>12}", "", "Revenue", "Profit");
    for (label, period) in [
        ("Today", &metrics.today),
        ("Last 7 days", &metrics.week),
        ("This month", &metrics.month),
        ("Lifetime", &metrics.lifetime),
    ] {
        let _ = writeln!(
            out,
            "{:<12} {:>12} {:>12}",
            label,
            money(period.revenue),
            money(period.profit)
        );
    }
    let _ = writeln!(
        out,
        "Pending: {} today, {} overall",
        money(metrics.today_pending),
        money(metrics.lifetime_pending)
    );
    let _ = writeln!(
        out,
        "{} sales, {} units sold",
        metrics.sale_count, metrics.units_sold
    );
    let _ = writeln!(
        out,
        "{} items, stock value {}",
        metrics.item_count,
        money(metrics.stock_value)
    );

    if !metrics.low_stock.is_empty() {
        let names: Vec<&str> = metrics.low_stock.iter().map(|i| i.name.as_str()).collect();
        let _ = writeln!(out, "Low stock: {}", names.join(", "));
    }
    if !metrics.out_of_stock.is_empty() {
        let names: Vec<&str> = metrics.out_of_stock.iter().map(|i| i.name.as_str()).collect();
        let _ = writeln!(out, "Out of stock: {}", names.join(", "));
    }

    if !metrics.best_sellers.is_empty() {
        let _ = writeln!(out, "Best sellers:");
        for (rank, seller) in metrics.best_sellers.iter().enumerate() {
            let _ = writeln!(
                out,
                "  {}. {:<20} {:>5}  {}",
                rank + 1,
                clip(&seller.name, 20),
                seller.quantity,
                money(seller.revenue)
            );
        }
    }

    let peak = metrics.daily_revenue.iter().copied().max().unwrap_or_default();
    if peak.is_positive() {
        let _ = writeln!(out, "Daily revenue this month:");
        for (day, revenue) in metrics.daily_revenue.iter().enumerate() {
            if revenue.is_positive() {
                let bar = (revenue.cents() * 30 / peak.cents()).max(1) as usize;
                let _ = writeln!(out, "  {:>2} {:<30} {}", day + 1, "#".repeat(bar), money(*revenue));
            }
        }
    }

    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::{BestSeller, PeriodTotals};

    #[test]
    fn test_render_summary() {
        let mut daily = vec![Money::zero(); 30];
        daily[4] = Money::from_cents(3000);
        let metrics = Metrics {
            today: PeriodTotals {
                revenue: Money::from_cents(3000),
                profit: Money::from_cents(1800),
            },
            lifetime: PeriodTotals {
                revenue: Money::from_cents(3000),
                profit: Money::from_cents(1800),
            },
            best_sellers: vec![BestSeller {
                name: "Pen".to_string(),
                quantity: 3,
                revenue: Money::from_cents(3000),
            }],
            daily_revenue: daily,
            sale_count: 1,
            units_sold: 3,
            ..Default::default()
        };

        let text = render(&metrics, "₹");

        assert!(text.contains("Today"));
        assert!(text.contains("₹30"));
        assert!(text.contains("₹18"));
        assert!(text.contains("1 sales, 3 units sold"));
        assert!(text.contains("1. Pen"));
        assert!(text.contains(&format!("   5 {:<30} ₹30", "#".repeat(30))));
        assert!(!text.contains("Low stock"));
    }
}
