//! Depth walking over one side of an order book.
//!
//! All three walks traverse levels best-first and stop as soon as the
//! requested volume is covered. None of them fail on thin books: when depth
//! runs out they report what the whole side can absorb, and the caller decides
//! whether the resulting price is still acceptable.

use rust_decimal::Decimal;
use xemm_core::{OrderBookLevel, Price, Size};

use crate::error::{StrategyError, StrategyResult};

/// Outcome of converting a quote-currency volume into base via the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeWalkResult {
    /// Base amount obtainable for the quote volume.
    pub base_amount: Size,
    /// Volume-weighted price: `quote_volume / base_amount`, zero when no base.
    pub effective_price: Price,
    /// Quote volume actually consumed (below the target on thin books).
    pub quote_volume: Decimal,
    /// Quote volume that was requested.
    pub target_quote_volume: Decimal,
}

impl VolumeWalkResult {
    /// Whether the book was deep enough to absorb the whole target.
    pub fn is_complete(&self) -> bool {
        self.quote_volume >= self.target_quote_volume
    }
}

/// Outcome of converting a base amount into quote-currency volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteVolumeResult {
    /// Base amount actually covered by the book.
    pub base_amount: Size,
    /// Quote volume exchanged for `base_amount`.
    pub quote_volume: Decimal,
    /// Base amount that was requested.
    pub target_base_amount: Size,
}

impl QuoteVolumeResult {
    pub fn is_complete(&self) -> bool {
        self.base_amount >= self.target_base_amount
    }
}

fn check_level(level: &OrderBookLevel) -> StrategyResult<()> {
    if !level.price.is_positive() {
        return Err(StrategyError::InvalidBook(format!(
            "level price must be positive, got {}",
            level.price
        )));
    }
    if level.amount.is_negative() {
        return Err(StrategyError::InvalidBook(format!(
            "level amount must be non-negative, got {}",
            level.amount
        )));
    }
    Ok(())
}

/// Walk `levels` until `target_quote_volume` of quote currency is covered.
///
/// The level that crosses the target contributes only
/// `(target - consumed_so_far) / price` of base.
pub fn walk(levels: &[OrderBookLevel], target_quote_volume: Decimal) -> StrategyResult<VolumeWalkResult> {
    if target_quote_volume < Decimal::ZERO {
        return Err(StrategyError::InvalidAmount(format!(
            "target quote volume must be non-negative, got {target_quote_volume}"
        )));
    }

    let mut quote = Decimal::ZERO;
    let mut base = Decimal::ZERO;

    for level in levels {
        if quote >= target_quote_volume {
            break;
        }
        check_level(level)?;

        let level_quote = level.quote_volume();
        if quote + level_quote >= target_quote_volume {
            let remaining = target_quote_volume - quote;
            base += remaining / level.price.inner();
            quote = target_quote_volume;
            break;
        }
        quote += level_quote;
        base += level.amount.inner();
    }

    let effective_price = if base > Decimal::ZERO {
        Price::new(quote / base)
    } else {
        Price::ZERO
    };

    Ok(VolumeWalkResult {
        base_amount: Size::new(base),
        effective_price,
        quote_volume: quote,
        target_quote_volume,
    })
}

/// Quote volume exchanged when `base_amount` is taken from `levels`.
pub fn quote_volume_for_base_amount(
    levels: &[OrderBookLevel],
    base_amount: Size,
) -> StrategyResult<QuoteVolumeResult> {
    if base_amount.is_negative() {
        return Err(StrategyError::InvalidAmount(format!(
            "base amount must be non-negative, got {base_amount}"
        )));
    }

    let target = base_amount.inner();
    let mut filled = Decimal::ZERO;
    let mut quote = Decimal::ZERO;

    for level in levels {
        if filled >= target {
            break;
        }
        check_level(level)?;

        let take = level.amount.inner().min(target - filled);
        quote += take * level.price.inner();
        filled += take;
    }

    Ok(QuoteVolumeResult {
        base_amount: Size::new(filled),
        quote_volume: quote,
        target_base_amount: base_amount,
    })
}

/// Marginal price reached when `base_amount` is taken from `levels`.
///
/// This is the price of the worst level touched, i.e. the tightest limit that
/// would still fill the whole amount. On a thin book it is the last level's
/// price. `None` for an empty side.
pub fn price_for_volume(levels: &[OrderBookLevel], base_amount: Size) -> StrategyResult<Option<Price>> {
    if base_amount.is_negative() {
        return Err(StrategyError::InvalidAmount(format!(
            "base amount must be non-negative, got {base_amount}"
        )));
    }

    let mut cumulative = Decimal::ZERO;
    let mut reached = None;

    for level in levels {
        check_level(level)?;
        reached = Some(level.price);
        cumulative += level.amount.inner();
        if cumulative >= base_amount.inner() {
            break;
        }
    }

    Ok(reached)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn lvl(price: Decimal, amount: Decimal) -> OrderBookLevel {
        OrderBookLevel::new(Price::new(price), Size::new(amount))
    }

    fn two_levels() -> Vec<OrderBookLevel> {
        vec![lvl(dec!(1), dec!(10)), lvl(dec!(2), dec!(10))]
    }

    #[test]
    fn test_walk_partial_second_level() {
        let result = walk(&two_levels(), dec!(15)).unwrap();
        assert_eq!(result.base_amount, Size::new(dec!(12.5)));
        assert_eq!(result.effective_price, Price::new(dec!(1.2)));
        assert_eq!(result.quote_volume, dec!(15));
        assert!(result.is_complete());
    }

    #[test]
    fn test_walk_insufficient_depth_returns_all_levels() {
        let result = walk(&two_levels(), dec!(1000)).unwrap();
        assert_eq!(result.base_amount, Size::new(dec!(20)));
        assert_eq!(result.quote_volume, dec!(30));
        assert_eq!(result.effective_price, Price::new(dec!(1.5)));
        assert!(!result.is_complete());
    }

    #[test]
    fn test_walk_exact_level_boundary() {
        let result = walk(&two_levels(), dec!(10)).unwrap();
        assert_eq!(result.base_amount, Size::new(dec!(10)));
        assert_eq!(result.effective_price, Price::new(dec!(1)));
    }

    #[test]
    fn test_walk_zero_target() {
        let result = walk(&two_levels(), Decimal::ZERO).unwrap();
        assert!(result.base_amount.is_zero());
        assert!(result.effective_price.is_zero());
        assert!(result.is_complete());
    }

    #[test]
    fn test_walk_empty_side() {
        let result = walk(&[], dec!(5)).unwrap();
        assert!(result.base_amount.is_zero());
        assert!(!result.is_complete());
    }

    #[test]
    fn test_walk_skips_zero_amount_levels() {
        let levels = vec![lvl(dec!(1), dec!(0)), lvl(dec!(2), dec!(10))];
        let result = walk(&levels, dec!(4)).unwrap();
        assert_eq!(result.base_amount, Size::new(dec!(2)));
        assert_eq!(result.effective_price, Price::new(dec!(2)));
    }

    #[test]
    fn test_walk_rejects_negative_target() {
        assert!(matches!(
            walk(&two_levels(), dec!(-1)),
            Err(StrategyError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_walk_rejects_malformed_level() {
        let levels = vec![lvl(dec!(0), dec!(10))];
        assert!(matches!(walk(&levels, dec!(1)), Err(StrategyError::InvalidBook(_))));
    }

    #[test]
    fn test_walk_is_pure() {
        let levels = two_levels();
        let a = walk(&levels, dec!(15)).unwrap();
        let b = walk(&levels, dec!(15)).unwrap();
        assert_eq!(a, b);
        assert_eq!(levels, two_levels());
    }

    #[test]
    fn test_quote_volume_for_base_amount() {
        let result = quote_volume_for_base_amount(&two_levels(), Size::new(dec!(12.5))).unwrap();
        assert_eq!(result.quote_volume, dec!(15));
        assert_eq!(result.base_amount, Size::new(dec!(12.5)));
        assert!(result.is_complete());
    }

    #[test]
    fn test_quote_volume_for_base_amount_thin_book() {
        let result = quote_volume_for_base_amount(&two_levels(), Size::new(dec!(50))).unwrap();
        assert_eq!(result.quote_volume, dec!(30));
        assert_eq!(result.base_amount, Size::new(dec!(20)));
        assert!(!result.is_complete());
    }

    #[test]
    fn test_walk_inverts_quote_volume() {
        let levels = two_levels();
        let quote = quote_volume_for_base_amount(&levels, Size::new(dec!(14))).unwrap();
        let back = walk(&levels, quote.quote_volume).unwrap();
        assert_eq!(back.base_amount, Size::new(dec!(14)));
    }

    #[test]
    fn test_price_for_volume_marginal_level() {
        let levels = two_levels();
        assert_eq!(
            price_for_volume(&levels, Size::new(dec!(5))).unwrap(),
            Some(Price::new(dec!(1)))
        );
        assert_eq!(
            price_for_volume(&levels, Size::new(dec!(11))).unwrap(),
            Some(Price::new(dec!(2)))
        );
        assert_eq!(
            price_for_volume(&levels, Size::new(dec!(100))).unwrap(),
            Some(Price::new(dec!(2)))
        );
        assert_eq!(price_for_volume(&[], Size::new(dec!(1))).unwrap(), None);
    }
}
