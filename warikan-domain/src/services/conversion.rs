use crate::model::Currency;
use rust_decimal::Decimal;

/// Multiplicative exchange-rate lookup supplied by the caller.
///
/// Implementors only provide direct quotes and an optional base currency;
/// [`ConversionRates::rate`] resolves identity, inverse quotes and the two-hop
/// path through the base currency.
pub trait ConversionRates: Send + Sync {
    fn base_currency(&self) -> Option<&Currency>;

    /// Quoted rate such that `amount_in_from * rate = amount_in_to`.
    fn direct_rate(&self, from: &Currency, to: &Currency) -> Option<Decimal>;

    fn rate(&self, from: &Currency, to: &Currency) -> Option<Decimal> {
        if from == to {
            return Some(Decimal::ONE);
        }
        if let Some(rate) = single_hop(self, from, to) {
            return Some(rate);
        }

        let base = self.base_currency()?;
        if base == from || base == to {
            return None;
        }
        let into_base = single_hop(self, from, base)?;
        let out_of_base = single_hop(self, base, to)?;
        into_base.checked_mul(out_of_base)
    }
}

fn single_hop<R>(rates: &R, from: &Currency, to: &Currency) -> Option<Decimal>
where
    R: ConversionRates + ?Sized,
{
    if let Some(rate) = usable(rates.direct_rate(from, to)) {
        return Some(rate);
    }
    let reverse = usable(rates.direct_rate(to, from))?;
    Decimal::ONE.checked_div(reverse)
}

// Zero or negative quotes are treated as missing.
fn usable(rate: Option<Decimal>) -> Option<Decimal> {
    rate.filter(|rate| *rate > Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use std::collections::HashMap;

    struct Quotes {
        base: Option<Currency>,
        quotes: HashMap<(Currency, Currency), Decimal>,
    }

    impl ConversionRates for Quotes {
        fn base_currency(&self) -> Option<&Currency> {
            self.base.as_ref()
        }

        fn direct_rate(&self, from: &Currency, to: &Currency) -> Option<Decimal> {
            self.quotes.get(&(from.clone(), to.clone())).copied()
        }
    }

    fn cur(code: &str) -> Currency {
        Currency::new(code).expect("currency")
    }

    fn dec(value: &str) -> Decimal {
        value.parse().expect("decimal")
    }

    #[fixture]
    fn quotes() -> Quotes {
        Quotes {
            base: Some(cur("USD")),
            quotes: HashMap::from([
                ((cur("EUR"), cur("USD")), dec("1.10")),
                ((cur("USD"), cur("JPY")), dec("200")),
                ((cur("GBP"), cur("EUR")), dec("0")),
            ]),
        }
    }

    #[rstest]
    #[case::identity("EUR", "EUR", Some("1"))]
    #[case::direct("EUR", "USD", Some("1.10"))]
    #[case::inverse("JPY", "USD", Some("0.005"))]
    #[case::two_hop("EUR", "JPY", Some("220"))]
    #[case::zero_quote_is_missing("GBP", "EUR", None)]
    #[case::unknown("CHF", "USD", None)]
    fn resolves_rates(
        quotes: Quotes,
        #[case] from: &str,
        #[case] to: &str,
        #[case] expected: Option<&str>,
    ) {
        assert_eq!(quotes.rate(&cur(from), &cur(to)), expected.map(dec));
    }

    #[rstest]
    fn no_two_hop_without_base(mut quotes: Quotes) {
        quotes.base = None;
        assert_eq!(quotes.rate(&cur("EUR"), &cur("JPY")), None);
    }
}
