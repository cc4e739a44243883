//! Price impact estimation by greedy depth walk
//!
//! Walks one side of the book level by level until the requested notional is
//! filled and reports how far the average fill price sits from the top of book.
//!
//! The notional is read in different units depending on direction:
//! - Buy: quote currency. Levels are consumed by cost (`price * quantity`).
//! - Sell: base units. Levels are consumed by quantity.
//!
//! The asymmetry is kept deliberately so that a probe of `100` means "spend
//! 100 USDT" on the buy leg and "sell 100 units" on the sell leg, matching the
//! behaviour the signal history was produced with.

use super::{Direction, OrderBookSide};
use rust_decimal::Decimal;

/// Impact reported for a side that cannot be used (empty, missing, malformed)
pub const UNUSABLE_IMPACT_PCT: Decimal = Decimal::ONE_HUNDRED;

/// Decimal places kept in the reported impact
const IMPACT_PRECISION: u32 = 3;

/// Result of a depth walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImpactEstimate {
    /// Cost of crossing in percent of the top-of-book price, in `[0, 100]`
    pub impact_pct: Decimal,
    /// Base units acquired (buy) or sold (sell)
    pub filled_quantity: Decimal,
    /// Quote currency spent (buy) or received (sell)
    pub filled_value: Decimal,
    /// Volume-weighted fill price, absent when unusable
    pub average_price: Option<Decimal>,
}

impl ImpactEstimate {
    /// Saturating "unusable" estimate
    pub fn unusable() -> Self {
        Self {
            impact_pct: UNUSABLE_IMPACT_PCT,
            filled_quantity: Decimal::ZERO,
            filled_value: Decimal::ZERO,
            average_price: None,
        }
    }

    pub fn is_unusable(&self) -> bool {
        self.average_price.is_none()
    }
}

/// Greedy order book walker
#[derive(Debug, Clone, Copy, Default)]
pub struct PriceImpactEstimator;

impl PriceImpactEstimator {
    pub fn new() -> Self {
        Self
    }

    /// Impact in percent of filling `notional` against `side`
    ///
    /// Never fails: a missing, empty or malformed side yields
    /// [`UNUSABLE_IMPACT_PCT`].
    pub fn estimate(
        &self,
        side: Option<&OrderBookSide>,
        direction: Direction,
        notional: Decimal,
    ) -> Decimal {
        self.estimate_detailed(side, direction, notional).impact_pct
    }

    /// Same as [`estimate`](Self::estimate) with fill diagnostics
    pub fn estimate_detailed(
        &self,
        side: Option<&OrderBookSide>,
        direction: Direction,
        notional: Decimal,
    ) -> ImpactEstimate {
        side.and_then(|s| walk(s, direction, notional))
            .unwrap_or_else(ImpactEstimate::unusable)
    }
}

/// Returns `None` for anything that cannot produce a meaningful fill
fn walk(side: &OrderBookSide, direction: Direction, notional: Decimal) -> Option<ImpactEstimate> {
    if notional <= Decimal::ZERO || !side.is_sorted_for(direction) {
        return None;
    }
    let best = side.best_price()?;

    let mut value = Decimal::ZERO;
    let mut acquired = Decimal::ZERO;

    for level in side.levels() {
        if level.price <= Decimal::ZERO || level.quantity < Decimal::ZERO {
            return None;
        }

        match direction {
            Direction::Buy => {
                let running = value.checked_add(level.quantity.checked_mul(level.price)?)?;
                if running < notional {
                    value = running;
                    acquired = acquired.checked_add(level.quantity)?;
                } else {
                    let remaining = notional - value;
                    acquired = acquired.checked_add(remaining.checked_div(level.price)?)?;
                    value = notional;
                    break;
                }
            }
            Direction::Sell => {
                let running = acquired.checked_add(level.quantity)?;
                if running < notional {
                    acquired = running;
                    value = value.checked_add(level.quantity.checked_mul(level.price)?)?;
                } else {
                    let remaining = notional - acquired;
                    value = value.checked_add(remaining.checked_mul(level.price)?)?;
                    acquired = notional;
                    break;
                }
            }
        }
    }

    if acquired.is_zero() {
        return None;
    }

    let average = value.checked_div(acquired)?;
    let slippage = match direction {
        Direction::Buy => average - best,
        Direction::Sell => best - average,
    };
    let impact = slippage
        .checked_div(best)?
        .checked_mul(Decimal::ONE_HUNDRED)?
        .round_dp(IMPACT_PRECISION)
        .clamp(Decimal::ZERO, UNUSABLE_IMPACT_PCT);

    Some(ImpactEstimate {
        impact_pct: impact,
        filled_quantity: acquired,
        filled_value: value,
        average_price: Some(average),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orderbook::PriceLevel;
    use rust_decimal_macros::dec;

    fn side(pairs: &[(Decimal, Decimal)]) -> OrderBookSide {
        OrderBookSide::from_pairs(pairs.iter().copied())
    }

    #[test]
    fn test_missing_side_is_unusable() {
        let estimator = PriceImpactEstimator::new();
        assert_eq!(
            estimator.estimate(None, Direction::Buy, dec!(100)),
            UNUSABLE_IMPACT_PCT
        );
    }

    #[test]
    fn test_empty_side_is_unusable() {
        let estimator = PriceImpactEstimator::new();
        let empty = OrderBookSide::default();
        assert_eq!(
            estimator.estimate(Some(&empty), Direction::Buy, dec!(100)),
            dec!(100)
        );
        assert_eq!(
            estimator.estimate(Some(&empty), Direction::Sell, dec!(100)),
            dec!(100)
        );
    }

    #[test]
    fn test_partial_fill_within_first_level() {
        // 2 units at 10 cost 20 > 15, so 1.5 units are taken from level one
        let asks = side(&[(dec!(10), dec!(2)), (dec!(11), dec!(5))]);
        let estimate =
            PriceImpactEstimator::new().estimate_detailed(Some(&asks), Direction::Buy, dec!(15));

        assert_eq!(estimate.filled_quantity, dec!(1.5));
        assert_eq!(estimate.average_price, Some(dec!(10)));
        assert_eq!(estimate.impact_pct, dec!(0));
    }

    #[test]
    fn test_buy_walks_into_second_level() {
        // 20 from level one, 22 from level two: 42 spent for 4 units
        let asks = side(&[(dec!(10), dec!(2)), (dec!(11), dec!(5))]);
        let estimate =
            PriceImpactEstimator::new().estimate_detailed(Some(&asks), Direction::Buy, dec!(42));

        assert_eq!(estimate.filled_quantity, dec!(4));
        assert_eq!(estimate.average_price, Some(dec!(10.5)));
        assert_eq!(estimate.impact_pct, dec!(5));
    }

    #[test]
    fn test_sell_walks_in_base_units() {
        // Selling 4 units: 2 at 100, 2 at 95
        let bids = side(&[(dec!(100), dec!(2)), (dec!(95), dec!(10))]);
        let estimate =
            PriceImpactEstimator::new().estimate_detailed(Some(&bids), Direction::Sell, dec!(4));

        assert_eq!(estimate.filled_quantity, dec!(4));
        assert_eq!(estimate.filled_value, dec!(390));
        assert_eq!(estimate.average_price, Some(dec!(97.5)));
        assert_eq!(estimate.impact_pct, dec!(2.5));
    }

    #[test]
    fn test_sell_within_first_level_is_filled() {
        let bids = side(&[(dec!(50), dec!(1000))]);
        let impact = PriceImpactEstimator::new().estimate(Some(&bids), Direction::Sell, dec!(100));
        assert_eq!(impact, dec!(0));
    }

    #[test]
    fn test_uniform_price_has_no_impact() {
        let estimator = PriceImpactEstimator::new();
        let asks = side(&[(dec!(3), dec!(10)), (dec!(3), dec!(10)), (dec!(3), dec!(100))]);
        for notional in [dec!(1), dec!(45), dec!(100), dec!(350)] {
            assert_eq!(
                estimator.estimate(Some(&asks), Direction::Buy, notional),
                dec!(0),
                "notional {notional}"
            );
        }

        let bids = side(&[(dec!(7), dec!(10)), (dec!(7), dec!(500))]);
        for notional in [dec!(5), dec!(100), dec!(510)] {
            assert_eq!(
                estimator.estimate(Some(&bids), Direction::Sell, notional),
                dec!(0)
            );
        }
    }

    #[test]
    fn test_shallow_book_averages_available_depth() {
        let asks = side(&[(dec!(10), dec!(1)), (dec!(12), dec!(1))]);
        let estimate =
            PriceImpactEstimator::new().estimate_detailed(Some(&asks), Direction::Buy, dec!(1000));

        assert_eq!(estimate.filled_quantity, dec!(2));
        assert_eq!(estimate.filled_value, dec!(22));
        assert_eq!(estimate.impact_pct, dec!(10));
    }

    #[test]
    fn test_malformed_levels_are_unusable() {
        let estimator = PriceImpactEstimator::new();

        let zero_price = side(&[(dec!(0), dec!(1))]);
        assert_eq!(
            estimator.estimate(Some(&zero_price), Direction::Buy, dec!(10)),
            UNUSABLE_IMPACT_PCT
        );

        let negative_qty = OrderBookSide::new(vec![PriceLevel::new(dec!(10), dec!(-1))]);
        assert_eq!(
            estimator.estimate(Some(&negative_qty), Direction::Sell, dec!(10)),
            UNUSABLE_IMPACT_PCT
        );

        // Asks in descending order cannot be walked as a buy
        let unsorted = side(&[(dec!(11), dec!(1)), (dec!(10), dec!(1))]);
        assert_eq!(
            estimator.estimate(Some(&unsorted), Direction::Buy, dec!(10)),
            UNUSABLE_IMPACT_PCT
        );
    }

    #[test]
    fn test_zero_quantity_book_is_unusable() {
        let asks = side(&[(dec!(10), dec!(0)), (dec!(11), dec!(0))]);
        let estimate =
            PriceImpactEstimator::new().estimate_detailed(Some(&asks), Direction::Buy, dec!(10));
        assert!(estimate.is_unusable());
        assert_eq!(estimate.impact_pct, UNUSABLE_IMPACT_PCT);
    }

    #[test]
    fn test_non_positive_notional_is_unusable() {
        let asks = side(&[(dec!(10), dec!(5))]);
        let estimator = PriceImpactEstimator::new();
        assert_eq!(
            estimator.estimate(Some(&asks), Direction::Buy, dec!(0)),
            UNUSABLE_IMPACT_PCT
        );
        assert_eq!(
            estimator.estimate(Some(&asks), Direction::Buy, dec!(-5)),
            UNUSABLE_IMPACT_PCT
        );
    }

    #[test]
    fn test_impact_is_rounded() {
        // 50 spent at 100, the remaining 50 at 102
        let asks = side(&[(dec!(100), dec!(0.5)), (dec!(102), dec!(10))]);
        let impact = PriceImpactEstimator::new().estimate(Some(&asks), Direction::Buy, dec!(100));
        assert_eq!(impact, dec!(0.990));
        assert!(impact.scale() <= 3);
    }
}
