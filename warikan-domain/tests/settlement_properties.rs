use proptest::prelude::*;
use warikan_domain::{
    Balance, Currency, Expense, Member, MemberId, Money, SettlementStatus, Split,
    compute_balances, minimize_payments, minimize_payments_by_currency, validate_settlement,
};

const NAMES: [&str; 8] = ["A", "B", "C", "D", "E", "F", "G", "H"];

fn usd() -> Currency {
    Currency::new("USD").expect("currency")
}

/// Builds a conserved balance list from amounts in units of `10^-scale`:
/// the last member absorbs the sum.
fn conserved_at_scale(units: &[i64], scale: u32, currency: &Currency) -> Vec<Balance> {
    let mut balances: Vec<Balance> = units
        .iter()
        .zip(NAMES)
        .map(|(amount, name)| {
            Balance::new(name, name, Money::new(*amount, scale), currency.clone())
        })
        .collect();
    let total: Money = balances.iter().map(|balance| balance.net).sum();
    let last = NAMES[units.len()];
    balances.push(Balance::new(last, last, -total, currency.clone()));
    balances
}

fn conserved_balances(cents: &[i64], currency: &Currency) -> Vec<Balance> {
    conserved_at_scale(cents, 2, currency)
}

fn non_zero_count(balances: &[Balance]) -> usize {
    balances.iter().filter(|balance| !balance.is_settled()).count()
}

proptest! {
    #[test]
    fn payments_settle_conserved_balances(
        cents in prop::collection::vec(-50_000i64..=50_000, 1..=7),
    ) {
        let balances = conserved_balances(&cents, &usd());

        let result = minimize_payments(&balances).expect("single currency");

        prop_assert!(result.is_complete());
        prop_assert!(validate_settlement(&balances, &result.payments));
    }

    #[test]
    fn payments_settle_sub_cent_balances(
        mills in prop::collection::vec(-500_000i64..=500_000, 1..=7),
    ) {
        let balances = conserved_at_scale(&mills, 3, &usd());

        let result = minimize_payments(&balances).expect("single currency");

        prop_assert!(result.is_complete());
        prop_assert!(validate_settlement(&balances, &result.payments));
    }

    #[test]
    fn payment_count_is_bounded(
        cents in prop::collection::vec(-50_000i64..=50_000, 1..=7),
    ) {
        let balances = conserved_balances(&cents, &usd());

        let result = minimize_payments(&balances).expect("single currency");

        let bound = non_zero_count(&balances).saturating_sub(1);
        prop_assert!(result.payments.len() <= bound);
    }

    #[test]
    fn payments_are_positive_and_between_distinct_members(
        cents in prop::collection::vec(-50_000i64..=50_000, 1..=7),
    ) {
        let balances = conserved_balances(&cents, &usd());

        let result = minimize_payments(&balances).expect("single currency");

        for payment in &result.payments {
            prop_assert!(payment.amount().is_positive());
            prop_assert_ne!(payment.from(), payment.to());
        }
    }

    #[test]
    fn recording_payments_settles_the_ledger(
        member_count in 2usize..=6,
        expense_count in 0usize..=20,
        amounts in prop::collection::vec(1i64..=100_000, 0..=20),
        payer_indexes in prop::collection::vec(0usize..=5, 0..=20),
        participant_masks in prop::collection::vec(1usize..=63, 0..=20),
    ) {
        let members: Vec<Member> = NAMES[..member_count]
            .iter()
            .map(|name| Member::new(*name, *name))
            .collect();
        let ids: Vec<MemberId> = members.iter().map(|member| member.id.clone()).collect();

        let mut expenses = Vec::with_capacity(expense_count);
        for idx in 0..expense_count {
            let amount = Money::new(*amounts.get(idx).unwrap_or(&100), 2);
            let payer = ids[payer_indexes.get(idx).copied().unwrap_or(0) % member_count].clone();
            let mask = participant_masks.get(idx).copied().unwrap_or(1);
            let mut participants: Vec<MemberId> = ids
                .iter()
                .enumerate()
                .filter(|&(bit, _)| mask & (1 << bit) != 0)
                .map(|(_, id)| id.clone())
                .collect();
            if participants.is_empty() {
                participants.push(payer.clone());
            }
            expenses.push(
                Expense::split_evenly("", amount, usd(), payer, &participants)
                    .expect("split"),
            );
        }

        let balances = compute_balances(&members, &expenses, &[]);
        let total: Money = balances.iter().map(|balance| balance.net).sum();
        prop_assert!(total.is_zero());

        let result = minimize_payments(&balances).expect("single currency");
        let settlements: Vec<_> = result
            .payments
            .into_iter()
            .map(|payment| payment.into_record(SettlementStatus::Completed))
            .collect();

        let after = compute_balances(&members, &expenses, &settlements);
        for balance in &after {
            prop_assert!(balance.is_settled(), "{} left with {}", balance.member, balance.net);
        }
    }

    #[test]
    fn per_currency_mode_never_mixes_currencies(
        usd_cents in prop::collection::vec(-10_000i64..=10_000, 1..=4),
        eur_cents in prop::collection::vec(-10_000i64..=10_000, 1..=4),
    ) {
        let eur = Currency::new("EUR").expect("currency");
        let mut balances = conserved_balances(&usd_cents, &usd());
        balances.extend(conserved_balances(&eur_cents, &eur));

        let result = minimize_payments_by_currency(&balances);

        for (currency, simplification) in &result {
            prop_assert!(simplification.is_complete());
            for payment in &simplification.payments {
                prop_assert_eq!(payment.currency(), currency);
            }
        }
    }
}

#[test]
fn splits_fold_into_balances_exactly() {
    let members = [Member::new("A", "A"), Member::new("B", "B"), Member::new("C", "C")];
    let expense = Expense {
        description: "dinner".to_string(),
        amount: Money::from_i64(90),
        currency: usd(),
        paid_by: "A".into(),
        splits: vec![
            Split {
                member: "A".into(),
                amount: Money::from_i64(30),
            },
            Split {
                member: "B".into(),
                amount: Money::from_i64(30),
            },
            Split {
                member: "C".into(),
                amount: Money::from_i64(30),
            },
        ],
    };

    let balances = compute_balances(&members, &[expense], &[]);
    let result = minimize_payments(&balances).expect("single currency");

    assert_eq!(result.payments.len(), 2);
    assert!(validate_settlement(&balances, &result.payments));
}
