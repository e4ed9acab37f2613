//! Receipt

use std::io;

use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    orders::{Order, OrderItem},
    pricing::PricingError,
};

/// Errors that can occur when building a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Error pricing an order line.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// IO error
    #[error("IO error")]
    IO,
}

/// A printable order summary.
#[derive(Debug, Clone)]
pub struct Receipt<'a> {
    rows: SmallVec<[ReceiptRow<'a>; 8]>,
    coupon_code: Option<String>,
    subtotal: Money<'a, Currency>,
    discount: Money<'a, Currency>,
    total: Money<'a, Currency>,
}

#[derive(Debug, Clone)]
struct ReceiptRow<'a> {
    product_name: String,
    options: String,
    unit_price: Money<'a, Currency>,
    quantity: u32,
    total: Money<'a, Currency>,
}

impl<'a> Receipt<'a> {
    /// Builds a receipt from an order.
    ///
    /// # Errors
    ///
    /// Returns an error if a unit price cannot be calculated.
    pub fn from_order(order: &Order<'a>) -> Result<Self, ReceiptError> {
        let rows = order
            .items()
            .iter()
            .map(ReceiptRow::from_item)
            .collect::<Result<_, _>>()?;

        Ok(Self {
            rows,
            coupon_code: order.coupon_code().map(str::to_string),
            subtotal: order.subtotal(),
            discount: order.discount(),
            total: order.grand_total(),
        })
    }

    /// Total before the coupon
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Amount the coupon took off
    pub fn discount(&self) -> Money<'a, Currency> {
        self.discount
    }

    /// Amount charged
    pub fn total(&self) -> Money<'a, Currency> {
        self.total
    }

    /// Writes the receipt as a table followed by the totals.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiptError::IO`] if writing fails.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record(["", "Item", "Options", "Unit Price", "Qty", "Total"]);

        for (idx, row) in self.rows.iter().enumerate() {
            builder.push_record([
                format!("#{:<3}", idx + 1),
                row.product_name.clone(),
                row.options.clone(),
                row.unit_price.to_string(),
                row.quantity.to_string(),
                row.total.to_string(),
            ]);
        }

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(3..6), Alignment::right());

        writeln!(out, "\n{table}").map_err(|_err| ReceiptError::IO)?;

        write_summary_line(&mut out, "Subtotal:", &self.subtotal.to_string())?;

        if let Some(code) = &self.coupon_code {
            write_summary_line(
                &mut out,
                &format!("Coupon {code}:"),
                &format!("-{}", self.discount),
            )?;
        }

        write_summary_line(&mut out, "Total:", &self.total.to_string())?;

        writeln!(out).map_err(|_err| ReceiptError::IO)
    }
}

impl<'a> ReceiptRow<'a> {
    fn from_item(item: &OrderItem<'a>) -> Result<Self, ReceiptError> {
        let line = item.line();

        let options: SmallVec<[&str; 2]> = line
            .color()
            .into_iter()
            .chain(line.size())
            .map(|variant| variant.name())
            .collect();

        Ok(Self {
            product_name: line.product_name().to_string(),
            options: options.join(" / "),
            unit_price: line.unit_price()?,
            quantity: line.quantity(),
            total: item.total(),
        })
    }
}

fn write_summary_line(
    out: &mut impl io::Write,
    label: &str,
    value: &str,
) -> Result<(), ReceiptError> {
    writeln!(out, "{label:>20}  {value:>12}").map_err(|_err| ReceiptError::IO)
}

#[cfg(test)]
mod tests {
    use rusty_money::iso;
    use testresult::TestResult;

    use crate::{cart::Cart, catalog::Variant, coupons::Coupon, items::CartLine};

    use super::*;

    fn order(with_coupon: bool) -> Result<Order<'static>, Box<dyn std::error::Error>> {
        let mut cart = Cart::new(iso::GBP);

        cart.add_line(
            CartLine::new("Test Product", Money::from_minor(100, iso::GBP), 2)?
                .with_color(Variant::new("Red", Money::from_minor(10, iso::GBP))?)?
                .with_size(Variant::new("M", Money::from_minor(20, iso::GBP))?)?,
        )?;

        cart.add_line(CartLine::new("Socks", Money::from_minor(50, iso::GBP), 1)?)?;

        if with_coupon {
            cart.apply_coupon(Coupon::new(
                "DISCOUNT10",
                Money::from_minor(10, iso::GBP),
                Money::from_minor(0, iso::GBP),
            )?)?;
        }

        Ok(Order::checkout(&mut cart, None)?)
    }

    #[test]
    fn from_order_copies_totals() -> TestResult {
        let receipt = Receipt::from_order(&order(true)?)?;

        assert_eq!(receipt.subtotal(), Money::from_minor(310, iso::GBP));
        assert_eq!(receipt.discount(), Money::from_minor(10, iso::GBP));
        assert_eq!(receipt.total(), Money::from_minor(300, iso::GBP));

        Ok(())
    }

    #[test]
    fn write_to_renders_items_options_and_totals() -> TestResult {
        let receipt = Receipt::from_order(&order(true)?)?;

        let mut out = Vec::new();
        receipt.write_to(&mut out)?;

        let output = String::from_utf8(out)?;

        assert!(output.contains("Test Product"));
        assert!(output.contains("Red / M"));
        assert!(output.contains("Socks"));
        assert!(output.contains("Subtotal:"));
        assert!(output.contains("Coupon DISCOUNT10:"));
        assert!(output.contains("Total:"));

        Ok(())
    }

    #[test]
    fn write_to_omits_coupon_line_without_coupon() -> TestResult {
        let receipt = Receipt::from_order(&order(false)?)?;

        let mut out = Vec::new();
        receipt.write_to(&mut out)?;

        let output = String::from_utf8(out)?;

        assert!(!output.contains("Coupon"));

        Ok(())
    }
}
