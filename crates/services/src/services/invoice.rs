//! Invoice line math and the frozen-total split.
//!
//! `authoritative_amount` runs once at link creation and produces the value
//! stored on the link and sent to the gateway. `display_breakdown` recomputes
//! the same figures for presentation. They must never be conflated: once a
//! link is issued its payable amount is frozen, even if line items are later
//! edited for display.

use db::models::payment_link::{LineItem, PaymentLink, TdsOption};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Per-line figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct LineTotals {
    pub subtotal: f64,
    pub discount: f64,
    pub taxable: f64,
    pub tax: f64,
}

/// Aggregate figures for an invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct InvoiceBreakdown {
    pub subtotal: f64,
    pub total_discount: f64,
    pub total_tax: f64,
    pub shipping_charges: f64,
    pub adjustment: f64,
    /// TDS/TCS settlement against the post-discount subtotal. Negative for
    /// TDS, positive for TCS, zero otherwise.
    pub settlement: f64,
    pub grand_total: f64,
}

pub fn line_totals(item: &LineItem) -> LineTotals {
    let subtotal = item.rate * item.quantity;
    let discount = subtotal * item.discount_percent / 100.0;
    let taxable = subtotal - discount;
    let tax = taxable * item.tax_rate_percent / 100.0;
    LineTotals {
        subtotal,
        discount,
        taxable,
        tax,
    }
}

fn settlement(subtotal: f64, total_discount: f64, tds_option: TdsOption, tds_rate: f64) -> f64 {
    let base = subtotal - total_discount;
    match tds_option {
        TdsOption::Tds => -(base * tds_rate / 100.0),
        TdsOption::Tcs => base * tds_rate / 100.0,
        TdsOption::None => 0.0,
    }
}

fn round_paise(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn compute(
    items: &[LineItem],
    shipping_charges: f64,
    adjustment: f64,
    tds_option: TdsOption,
    tds_rate: f64,
) -> InvoiceBreakdown {
    let mut subtotal = 0.0;
    let mut total_discount = 0.0;
    let mut total_tax = 0.0;

    for item in items {
        let line = line_totals(item);
        subtotal += line.subtotal;
        total_discount += line.discount;
        total_tax += line.tax;
    }

    let settlement = settlement(subtotal, total_discount, tds_option, tds_rate);
    let grand_total = round_paise(
        subtotal - total_discount + total_tax + shipping_charges + adjustment + settlement,
    );

    InvoiceBreakdown {
        subtotal,
        total_discount,
        total_tax,
        shipping_charges,
        adjustment,
        settlement,
        grand_total,
    }
}

/// The payable total for a new link. Called exactly once, at creation; the
/// result is stored on the link and never re-derived.
pub fn authoritative_amount(
    items: &[LineItem],
    shipping_charges: f64,
    adjustment: f64,
    tds_option: TdsOption,
    tds_rate: f64,
) -> f64 {
    compute(items, shipping_charges, adjustment, tds_option, tds_rate).grand_total
}

/// Presentation breakdown for an existing link. The `grand_total` field is
/// overwritten with the stored amount so the page can never show a figure
/// that differs from what the gateway order was created for.
pub fn display_breakdown(link: &PaymentLink) -> InvoiceBreakdown {
    let mut breakdown = compute(
        &link.line_items.0,
        link.shipping_charges,
        link.adjustment,
        link.tds_option,
        link.tds_rate,
    );
    breakdown.grand_total = link.amount;
    breakdown
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(rate: f64, quantity: f64, discount: f64, tax: f64) -> LineItem {
        LineItem {
            description: "item".to_string(),
            rate,
            quantity,
            discount_percent: discount,
            tax_rate_percent: tax,
        }
    }

    #[test]
    fn test_line_math_worked_example() {
        let totals = line_totals(&item(100.0, 10.0, 10.0, 18.0));
        assert_eq!(totals.subtotal, 1000.0);
        assert_eq!(totals.discount, 100.0);
        assert_eq!(totals.taxable, 900.0);
        assert_eq!(totals.tax, 162.0);
    }

    #[test]
    fn test_tds_worked_example() {
        // Post-discount base of 900 at 10% TDS deducts 90.
        let amount = authoritative_amount(
            &[item(100.0, 10.0, 10.0, 0.0)],
            0.0,
            0.0,
            TdsOption::Tds,
            10.0,
        );
        assert_eq!(amount, 900.0 - 90.0);
    }

    #[test]
    fn test_tcs_adds_to_total() {
        let tcs = authoritative_amount(&[item(100.0, 10.0, 10.0, 0.0)], 0.0, 0.0, TdsOption::Tcs, 10.0);
        let none = authoritative_amount(&[item(100.0, 10.0, 10.0, 0.0)], 0.0, 0.0, TdsOption::None, 0.0);
        assert_eq!(tcs, none + 90.0);
    }

    #[test]
    fn test_aggregation_is_order_independent() {
        let a = item(100.0, 10.0, 10.0, 18.0);
        let b = item(40.0, 3.0, 0.0, 12.0);
        let c = item(750.0, 1.0, 5.0, 18.0);

        let fwd = compute(
            &[a.clone(), b.clone(), c.clone()],
            50.0,
            -10.0,
            TdsOption::Tds,
            2.0,
        );
        let rev = compute(&[c, b, a], 50.0, -10.0, TdsOption::Tds, 2.0);

        assert!((fwd.subtotal - rev.subtotal).abs() < 1e-9);
        assert!((fwd.total_discount - rev.total_discount).abs() < 1e-9);
        assert!((fwd.total_tax - rev.total_tax).abs() < 1e-9);
        assert!((fwd.grand_total - rev.grand_total).abs() < 1e-9);
    }

    #[test]
    fn test_shipping_and_adjustment_enter_grand_total() {
        let breakdown = compute(&[item(100.0, 1.0, 0.0, 0.0)], 25.0, -5.0, TdsOption::None, 0.0);
        assert_eq!(breakdown.grand_total, 120.0);
    }

    #[test]
    fn test_display_breakdown_keeps_stored_amount() {
        use chrono::Utc;
        use db::models::payment_link::PaymentLinkStatus;
        use sqlx::types::Json;
        use uuid::Uuid;

        // Line items were edited after issue; the stored amount must win.
        let link = PaymentLink {
            id: Uuid::new_v4(),
            order_id: "ORD-100".to_string(),
            client_name: "Studio Mitti".to_string(),
            client_email: None,
            client_phone: None,
            billing_address: None,
            gst_number: None,
            line_items: Json(vec![item(9999.0, 2.0, 0.0, 0.0)]),
            shipping_charges: 0.0,
            adjustment: 0.0,
            tds_option: TdsOption::None,
            tds_rate: 0.0,
            status: PaymentLinkStatus::Pending,
            amount: 1062.0,
            gateway_order_id: None,
            payment_id: None,
            expires_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let breakdown = display_breakdown(&link);
        assert_eq!(breakdown.grand_total, 1062.0);
        // The presentation figures still reflect the edited items.
        assert_eq!(breakdown.subtotal, 19998.0);
    }

    #[test]
    fn test_grand_total_rounds_to_paise() {
        let breakdown = compute(&[item(33.335, 1.0, 0.0, 0.0)], 0.0, 0.0, TdsOption::None, 0.0);
        assert_eq!(breakdown.grand_total, 33.34);
    }
}
