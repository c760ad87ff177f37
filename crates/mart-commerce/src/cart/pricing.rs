//! Line pricing shared by carts and placed orders.
//!
//! Checkout and the admin order edit must agree on how an items total is
//! formed, so both go through [`items_total`].

use crate::error::CommerceError;
use crate::money::Money;

/// Anything priced as unit price times quantity.
pub trait PricedLine {
    fn unit_price(&self) -> Money;
    fn quantity(&self) -> i64;

    /// `unit_price * quantity`, or `None` on overflow.
    fn line_total(&self) -> Option<Money> {
        self.unit_price().try_multiply(self.quantity())
    }
}

/// Sum of `price * quantity` over `lines`.
pub fn items_total<'a, L>(lines: impl IntoIterator<Item = &'a L>) -> Result<Money, CommerceError>
where
    L: PricedLine + 'a,
{
    lines.into_iter().try_fold(Money::zero(), |acc, line| {
        line.line_total()
            .and_then(|total| acc.try_add(&total))
            .ok_or(CommerceError::Overflow)
    })
}
