use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;

use crate::error::RentBuyError;
use crate::types::{CashFlowSeries, Money, Rate};
use crate::RentBuyResult;

/// Real discount rate via the Fisher equation: (1 + nominal) / (1 + inflation) - 1.
pub fn real_discount_rate(nominal: Rate, inflation: Rate) -> RentBuyResult<Rate> {
    let one_plus_inflation = Decimal::ONE + inflation;
    if one_plus_inflation <= Decimal::ZERO {
        return Err(RentBuyError::domain(format!(
            "real discount rate: 1 + inflation must be positive (inflation = {inflation})"
        )));
    }
    let one_plus_nominal = Decimal::ONE + nominal;
    if one_plus_nominal <= Decimal::ZERO {
        return Err(RentBuyError::domain(format!(
            "real discount rate: 1 + nominal rate must be positive (nominal = {nominal})"
        )));
    }

    Ok(one_plus_nominal / one_plus_inflation - Decimal::ONE)
}

/// Net Present Value of a series of cash flows. Index 0 is undiscounted.
pub fn npv(rate: Rate, cash_flows: &[Money]) -> RentBuyResult<Money> {
    if rate <= -Decimal::ONE {
        return Err(RentBuyError::domain(format!(
            "NPV: discount rate must be greater than -100% (got {rate})"
        )));
    }

    let mut result = Decimal::ZERO;
    let one_plus_r = Decimal::ONE + rate;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount = discount
                .checked_mul(one_plus_r)
                .ok_or_else(|| RentBuyError::domain(format!("NPV discount factor at period {t}")))?;
        }
        if discount.is_zero() {
            return Err(RentBuyError::domain(format!(
                "NPV discount factor at period {t} underflowed to zero"
            )));
        }
        let pv = cf
            .checked_div(discount)
            .ok_or_else(|| RentBuyError::domain(format!("NPV present value at period {t}")))?;
        result = result
            .checked_add(pv)
            .ok_or_else(|| RentBuyError::domain("NPV accumulation"))?;
    }

    Ok(result)
}

/// Discount a path's cash flows at the inflation-adjusted real rate.
pub fn discount_series(
    series: &CashFlowSeries,
    nominal: Rate,
    inflation: Rate,
) -> RentBuyResult<Money> {
    let real = real_discount_rate(nominal, inflation)?;
    npv(real, &series.flows)
}

/// (1 + rate)^periods, rejecting results outside the decimal range.
pub fn compound_factor(rate: Rate, periods: u32) -> RentBuyResult<Decimal> {
    (Decimal::ONE + rate)
        .checked_powu(u64::from(periods))
        .ok_or_else(|| {
            RentBuyError::domain(format!(
                "compounding {rate} over {periods} periods is not representable"
            ))
        })
}

/// Future value of a single amount: amount * (1 + rate)^periods.
pub fn future_value(amount: Money, rate: Rate, periods: u32) -> RentBuyResult<Money> {
    let factor = compound_factor(rate, periods)?;
    amount.checked_mul(factor).ok_or_else(|| {
        RentBuyError::domain(format!(
            "future value of {amount} at {rate} over {periods} periods"
        ))
    })
}

/// Level payment that retires `principal` over `periods` at `rate` per period.
///
/// A zero rate is the limit of the annuity formula: straight-line `principal / periods`.
pub fn annuity_payment(principal: Money, rate: Rate, periods: u32) -> RentBuyResult<Money> {
    if periods == 0 {
        return Err(RentBuyError::InvalidLoanTerms {
            field: "term_months".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }

    if rate.is_zero() {
        return Ok(principal / Decimal::from(periods));
    }

    let compound = compound_factor(rate, periods)?;
    let numerator = principal
        .checked_mul(rate)
        .and_then(|v| v.checked_mul(compound))
        .ok_or_else(|| RentBuyError::domain("annuity payment numerator"))?;
    let denominator = compound - Decimal::ONE;

    if denominator.is_zero() {
        return Err(RentBuyError::domain("annuity payment denominator"));
    }

    Ok(numerator / denominator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CashFlowPath;
    use rust_decimal_macros::dec;

    #[test]
    fn test_npv_basic() {
        let cfs = vec![dec!(-1000), dec!(300), dec!(400), dec!(500)];
        let result = npv(dec!(0.10), &cfs).unwrap();
        // NPV at 10%: -1000 + 300/1.1 + 400/1.21 + 500/1.331 ≈ -21.04
        assert!((result - dec!(-21.04)).abs() < dec!(0.01));
    }

    #[test]
    fn test_npv_zero_rate() {
        let cfs = vec![dec!(-100), dec!(50), dec!(50), dec!(50)];
        let result = npv(dec!(0.0), &cfs).unwrap();
        assert_eq!(result, dec!(50));
    }

    #[test]
    fn test_npv_rejects_rate_at_minus_one() {
        let err = npv(dec!(-1), &[dec!(1)]).unwrap_err();
        assert!(matches!(err, RentBuyError::DomainMathError { .. }));
    }

    #[test]
    fn test_fisher_real_rate() {
        // (1.08 / 1.05) - 1 = 0.0285714...
        let real = real_discount_rate(dec!(0.08), dec!(0.05)).unwrap();
        assert!((real - dec!(0.0285714285714)).abs() < dec!(0.0000000001));
    }

    #[test]
    fn test_fisher_equal_rates_is_zero() {
        let real = real_discount_rate(dec!(0.05), dec!(0.05)).unwrap();
        assert_eq!(real, Decimal::ZERO);
    }

    #[test]
    fn test_fisher_rejects_inflation_at_minus_one() {
        let err = real_discount_rate(dec!(0.08), dec!(-1)).unwrap_err();
        assert!(matches!(err, RentBuyError::DomainMathError { .. }));
        assert!(real_discount_rate(dec!(0.08), dec!(-1.5)).is_err());
    }

    #[test]
    fn test_discount_series_uses_real_rate() {
        let series = CashFlowSeries {
            path: CashFlowPath::Buy,
            flows: vec![dec!(-100), dec!(105)],
        };
        // nominal 5%, inflation 0% → 105 / 1.05 = 100
        let value = discount_series(&series, dec!(0.05), Decimal::ZERO).unwrap();
        assert_eq!(value, Decimal::ZERO);
    }

    #[test]
    fn test_future_value() {
        let fv = future_value(dec!(1000), dec!(0.10), 2).unwrap();
        assert_eq!(fv, dec!(1210));
    }

    #[test]
    fn test_compound_overflow_is_domain_error() {
        let err = compound_factor(dec!(100000), 40).unwrap_err();
        assert!(matches!(err, RentBuyError::DomainMathError { .. }));
    }

    #[test]
    fn test_annuity_zero_rate_is_straight_line() {
        let pmt = annuity_payment(dec!(1200), Decimal::ZERO, 12).unwrap();
        assert_eq!(pmt, dec!(100));
    }

    #[test]
    fn test_annuity_zero_periods_rejected() {
        let err = annuity_payment(dec!(1200), dec!(0.01), 0).unwrap_err();
        assert!(matches!(err, RentBuyError::InvalidLoanTerms { .. }));
    }

    #[test]
    fn test_annuity_reference_value() {
        // 100,000 over 360 months at 0.5% → 599.55
        let pmt = annuity_payment(dec!(100000), dec!(0.005), 360).unwrap();
        assert!((pmt - dec!(599.55)).abs() < dec!(0.01));
    }
}
