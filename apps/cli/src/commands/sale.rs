//! Sales: `sell`, `mark-paid`, `sales`, `receipt`.

use anyhow::{anyhow, Context as _, Result};
use chrono::Local;
use tracing::info;

use storefront_core::receipt::BillFormatter;
use storefront_core::share::whatsapp_share_url;
use storefront_core::{Cart, PaymentMethod, Sale, SaleMeta};
use storefront_db::{ItemStore, SaleStore, SalesLedger, SettingsStore};

use super::{clip, Context};

/// Parses a `--item <id>=<qty>` argument.
pub fn parse_cart_line(arg: &str) -> Result<(String, i64), String> {
    let (id, qty) = arg
        .rsplit_once('=')
        .ok_or_else(|| format!("expected <item-id>=<quantity>, got '{}'", arg))?;
    let id = id.trim();
    if id.is_empty() {
        return Err(format!("missing item id in '{}'", arg));
    }
    let qty = qty
        .trim()
        .parse::<i64>()
        .map_err(|_| format!("'{}' is not a whole quantity", qty.trim()))?;
    Ok((id.to_string(), qty))
}

pub fn parse_payment(arg: &str) -> Result<PaymentMethod, String> {
    arg.parse::<PaymentMethod>().map_err(|e| e.to_string())
}

/// Builds the cart from current item snapshots and records one sale.
pub async fn sell(
    ctx: &Context,
    lines: Vec<(String, i64)>,
    payment: PaymentMethod,
    buyer_name: Option<String>,
    buyer_number: Option<String>,
) -> Result<()> {
    let mut cart = Cart::new();
    for (id, quantity) in lines {
        let item = ctx
            .db
            .get_item(&ctx.session, &id)
            .await?
            .ok_or_else(|| anyhow!("No item with id {}", id))?;
        cart.add_item(&item, quantity)
            .with_context(|| format!("Cannot add {} x {}", quantity, item.name))?;
    }

    let meta = SaleMeta::new(payment).with_buyer(buyer_name, buyer_number);
    let ledger = SalesLedger::new(ctx.db.clone());
    let sale_id = ledger
        .record_sale(&ctx.session, &cart, meta)
        .await
        .context("Sale was not recorded")?;

    info!(sale_id = %sale_id, "Sale recorded from CLI");

    if ctx.json {
        let sale = ctx.db.get_sale(&ctx.session, &sale_id).await?;
        ctx.print_json(&sale)?;
    } else {
        println!(
            "Recorded sale {}: {} item(s), total {} ({})",
            sale_id,
            cart.total_quantity(),
            ctx.money(cart.total()),
            payment.status_label()
        );
    }
    Ok(())
}

pub async fn mark_paid(ctx: &Context, sale_id: &str) -> Result<()> {
    SalesLedger::new(ctx.db.clone())
        .mark_as_paid(&ctx.session, sale_id)
        .await
        .with_context(|| format!("Could not mark sale {} as paid", sale_id))?;
    println!("Sale {} marked as paid", sale_id);
    Ok(())
}

pub async fn list(ctx: &Context, unpaid_only: bool) -> Result<()> {
    let sales: Vec<Sale> = ctx
        .db
        .list_sales(&ctx.session)
        .await?
        .into_iter()
        .filter(|s| !unpaid_only || s.is_unpaid())
        .collect();

    if ctx.json {
        return ctx.print_json(&sales);
    }
    if sales.is_empty() {
        println!("No sales found.");
        return Ok(());
    }

    println!(
        "{:<16}  {:<36}  {:<16}  {:>5}  {:>10}  {}",
        "Date", "ID", "Buyer", "Units", "Total", "Payment"
    );
    for sale in &sales {
        let date = sale
            .timestamp
            .map(|ts| ts.with_timezone(&Local).format("%d-%m-%Y %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<16}  {:<36}  {:<16}  {:>5}  {:>10}  {}",
            date,
            sale.id,
            clip(sale.buyer_name.as_deref().unwrap_or("-"), 16),
            sale.units(),
            ctx.money(sale.effective_total()),
            sale.payment_method.method_label()
        );
    }
    Ok(())
}

/// Prints the bill text, and with `share` the WhatsApp link for it.
pub async fn receipt(ctx: &Context, sale_id: &str, share: bool, phone: Option<String>) -> Result<()> {
    let sale = ctx
        .db
        .get_sale(&ctx.session, sale_id)
        .await?
        .ok_or_else(|| anyhow!("No sale with id {}", sale_id))?;
    let profile = ctx.db.load_settings(&ctx.session).await?;

    let bill = BillFormatter::new(profile, ctx.config.currency_symbol.clone()).render(&sale, &sale.id, &Local::now());
    println!("{}", bill);

    if share {
        let phone = phone
            .or_else(|| sale.buyer_number.clone())
            .unwrap_or_default();
        let url = whatsapp_share_url(&bill, &phone).context("Cannot build share link; pass --phone")?;
        println!();
        println!("{}", url);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cart_line() {
        assert_eq!(parse_cart_line("abc=3"), Ok(("abc".to_string(), 3)));
        assert_eq!(parse_cart_line(" abc = 2 "), Ok(("abc".to_string(), 2)));
        // ids may themselves contain '='
        assert_eq!(parse_cart_line("a=b=1"), Ok(("a=b".to_string(), 1)));
    }

    #[test]
    fn test_parse_cart_line_errors() {
        assert!(parse_cart_line("abc").is_err());
        assert!(parse_cart_line("=3").is_err());
        assert!(parse_cart_line("abc=two").is_err());
    }

    #[test]
    fn test_parse_payment() {
        assert_eq!(parse_payment("UPI"), Ok(PaymentMethod::Upi));
        assert_eq!(parse_payment("cash"), Ok(PaymentMethod::Paid));
        assert!(parse_payment("card").is_err());
    }
}
