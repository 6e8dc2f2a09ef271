//! # Receipt Rendering
//!
//! Renders a sale as the plain-text bill that is shared with the buyer.
//! The whole bill is wrapped in a triple-backtick block so chat apps show
//! it in a monospace font and the columns line up.
//!
//! ## Layout
//! ```text
//! Corner Shop
//! 9876543210
//! ------------------------------
//!
//! Bill_Id: 42
//! Date: 15-03-2024  Time: 10:30
//! ------------------------------
//!
//! Buyer: Asha
//! Mobile: 9123456780
//! ------------------------------
//!
//! Item        Qty  Price   Total
//! ------------------------------
//! Pen           3     10      30
//! ------------------------------
//! Grand Total:              ₹30
//! ```

use std::fmt::Display;

use chrono::{DateTime, TimeZone};

use crate::types::{BusinessProfile, Sale};

const RULE: &str = "------------------------------";
const FENCE: &str = "```";

const ITEM_WIDTH: usize = 10;
const QTY_WIDTH: usize = 4;
const PRICE_WIDTH: usize = 6;
const TOTAL_WIDTH: usize = 7;
const LABEL_WIDTH: usize = 25;

/// Renders bills for one business.
#[derive(Debug, Clone)]
pub struct BillFormatter {
    profile: BusinessProfile,
    currency_symbol: String,
}

impl BillFormatter {
    pub fn new(profile: BusinessProfile, currency_symbol: impl Into<String>) -> Self {
        BillFormatter {
            profile,
            currency_symbol: currency_symbol.into(),
        }
    }

    /// Renders the bill text for `sale`.
    ///
    /// Date and time come from the sale timestamp, shown in the time zone of
    /// `now`; undated sales show `now` instead.
    pub fn render<Tz>(&self, sale: &Sale, bill_id: &str, now: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let when = sale
            .timestamp
            .map(|ts| ts.with_timezone(&now.timezone()))
            .unwrap_or_else(|| now.clone());

        let business_name = self.profile.business_name.as_deref().unwrap_or("Business Name");
        let phone = self.profile.phone.as_deref().unwrap_or("Business Number");
        let buyer_name = sale.buyer_name.as_deref().unwrap_or("Buyer Name");
        let buyer_number = sale.buyer_number.as_deref().unwrap_or("Buyer Number: N/A");

        let mut out = String::new();
        out.push_str(FENCE);
        out.push('\n');
        out.push_str(&format!("{}\n{}\n{}\n\n", business_name, phone, RULE));
        out.push_str(&format!("Bill_Id: {}\n", bill_id));
        out.push_str(&format!(
            "Date: {}  Time: {}\n{}\n\n",
            when.format("%d-%m-%Y"),
            when.format("%H:%M"),
            RULE
        ));
        out.push_str(&format!("Buyer: {}\nMobile: {}\n{}\n\n", buyer_name, buyer_number, RULE));

        out.push_str(&format!(
            "{:<iw$} {:>qw$} {:>pw$} {:>tw$}\n{}\n",
            "Item",
            "Qty",
            "Price",
            "Total",
            RULE,
            iw = ITEM_WIDTH,
            qw = QTY_WIDTH,
            pw = PRICE_WIDTH,
            tw = TOTAL_WIDTH,
        ));
        for line in sale.lines.lines() {
            let name: String = if line.item_name.is_empty() {
                "Item".to_string()
            } else {
                line.item_name.chars().take(ITEM_WIDTH).collect()
            };
            let line_total = if line.line_total.is_zero() {
                line.computed_total()
            } else {
                line.line_total
            };
            out.push_str(&format!(
                "{:<iw$} {:>qw$} {:>pw$} {:>tw$}\n",
                name,
                line.quantity,
                line.unit_price,
                line_total,
                iw = ITEM_WIDTH,
                qw = QTY_WIDTH,
                pw = PRICE_WIDTH,
                tw = TOTAL_WIDTH,
            ));
        }
        out.push_str(RULE);
        out.push('\n');

        out.push_str(&format!(
            "{:<w$} {}{}\n\n",
            "Grand Total:",
            self.currency_symbol,
            sale.effective_total(),
            w = LABEL_WIDTH
        ));
        out.push_str(&format!(
            "Payment: {}\nStatus: {}\n{}\n\n",
            sale.payment_method.method_label(),
            sale.payment_method.status_label(),
            RULE
        ));
        out.push_str("Thank you for shopping.\n");
        out.push_str(FENCE);

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::{LineItem, PaymentMethod, SaleLines};
    use chrono::Utc;

    fn pen_sale(method: PaymentMethod) -> Sale {
        Sale {
            id: "s1".to_string(),
            lines: SaleLines::Grouped(vec![
                LineItem::new(Some("pen".into()), "Pen", 3, Money::from_cents(1000)),
                LineItem::new(Some("nb".into()), "Notebook A5 ruled", 1, Money::from_cents(4550)),
            ]),
            total_amount: Money::from_cents(7550),
            payment_method: method,
            buyer_name: Some("Asha".to_string()),
            buyer_number: None,
            timestamp: Some(Utc.with_ymd_and_hms(2024, 3, 15, 10, 30, 0).unwrap()),
        }
    }

    #[test]
    fn test_bill_layout() {
        let profile = BusinessProfile {
            business_name: Some("Corner Shop".to_string()),
            phone: Some("9876543210".to_string()),
            ..Default::default()
        };
        let formatter = BillFormatter::new(profile, "₹");
        let now = Utc.with_ymd_and_hms(2024, 3, 16, 8, 0, 0).unwrap();

        let bill = formatter.render(&pen_sale(PaymentMethod::Upi), "42", &now);

        let expected = "```\n\
Corner Shop\n\
9876543210\n\
------------------------------\n\
\n\
Bill_Id: 42\n\
Date: 15-03-2024  Time: 10:30\n\
------------------------------\n\
\n\
Buyer: Asha\n\
Mobile: Buyer Number: N/A\n\
------------------------------\n\
\n\
Item        Qty  Price   Total\n\
------------------------------\n\
Pen           3     10      30\n\
Notebook A    1  45.50   45.50\n\
------------------------------\n\
Grand Total:              ₹75.50\n\
\n\
Payment: UPI\n\
Status: Paid\n\
------------------------------\n\
\n\
Thank you for shopping.\n\
```";
        assert_eq!(bill, expected);
    }

    #[test]
    fn test_bill_defaults_and_unpaid_status() {
        let formatter = BillFormatter::new(BusinessProfile::default(), "₹");
        let mut sale = pen_sale(PaymentMethod::Unpaid);
        sale.timestamp = None;
        let now = Utc.with_ymd_and_hms(2024, 3, 16, 8, 5, 0).unwrap();

        let bill = formatter.render(&sale, "N/A", &now);

        assert!(bill.contains("Business Name\nBusiness Number\n"));
        assert!(bill.contains("Date: 16-03-2024  Time: 08:05\n"));
        assert!(bill.contains("Payment: Not Paid\nStatus: Unpaid\n"));
    }
}
