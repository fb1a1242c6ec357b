use rstest::{fixture, rstest};
use std::path::PathBuf;
use warikan_application::{
    ApplicationError, LedgerSource, LedgerSourceError, SettlementMode, SettlementService,
};
use warikan_domain::{ConversionRates, Currency, Money, validate_settlement};
use warikan_infrastructure::{JsonLedgerSource, RateTable, RateTableError};

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn cur(code: &str) -> Currency {
    Currency::new(code).expect("currency")
}

fn money(value: &str) -> Money {
    value.parse().expect("amount")
}

#[fixture]
fn source() -> JsonLedgerSource {
    JsonLedgerSource::new(fixtures())
}

#[fixture]
fn rates() -> RateTable {
    RateTable::from_path(fixtures().join("rates.json")).expect("rates")
}

#[rstest]
fn ledger_file_is_decoded(source: JsonLedgerSource) {
    let ledger = source.load("trip").expect("ledger");

    assert_eq!(ledger.members.len(), 3);
    assert_eq!(ledger.expenses[1].currency, cur("EUR"));
    assert_eq!(ledger.settlements.len(), 2);
    assert_eq!(ledger.base_currency, Some(cur("USD")));
    assert_eq!(ledger.check_integrity(), Ok(()));
}

#[rstest]
#[case::missing_file("absent")]
#[case::path_traversal("../fixtures/trip")]
fn unknown_groups_are_not_found(source: JsonLedgerSource, #[case] group: &str) {
    let result = source.load(group);

    assert!(matches!(result, Err(LedgerSourceError::NotFound(name)) if name == group));
}

#[rstest]
fn malformed_ledger_is_unreadable(source: JsonLedgerSource) {
    let result = source.load("malformed");

    assert!(matches!(
        result,
        Err(LedgerSourceError::Unreadable { group, .. }) if group == "malformed"
    ));
}

#[rstest]
fn rate_file_quotes_resolve(rates: RateTable) {
    assert_eq!(rates.base_currency(), Some(&cur("USD")));
    assert_eq!(
        rates.rate(&cur("USD"), &cur("EUR")).map(|rate| rate.round_dp(4)),
        Some("0.6667".parse().expect("rate"))
    );
}

#[test]
fn missing_rate_file_is_reported() {
    let result = RateTable::from_path(fixtures().join("absent.json"));

    assert!(matches!(result, Err(RateTableError::Io { .. })));
}

#[rstest]
fn per_currency_plan_ignores_pending_settlements(source: JsonLedgerSource) {
    let service = SettlementService::new(&source);

    let plan = service
        .plan("trip", &SettlementMode::PerCurrency)
        .expect("plan");

    assert!(plan.is_complete());
    assert_eq!(plan.payment_count(), 4);
    let usd_total: Money = plan.payments[&cur("USD")]
        .iter()
        .map(|payment| payment.amount())
        .sum();
    assert_eq!(usd_total, money("50"));
    let payments: Vec<_> = plan.all_payments().cloned().collect();
    assert!(validate_settlement(&plan.balances, &payments));
}

#[rstest]
fn unified_plan_uses_rate_file(source: JsonLedgerSource, rates: RateTable) {
    let service = SettlementService::new(&source).with_rates(&rates);

    let plan = service
        .plan("trip", &SettlementMode::Unified { target: cur("USD") })
        .expect("plan");

    let payments = &plan.payments[&cur("USD")];
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].from().as_str(), "bob");
    assert_eq!(payments[0].to().as_str(), "alice");
    assert_eq!(payments[0].amount(), money("35"));
}

#[rstest]
fn unified_plan_into_unquoted_currency_fails(source: JsonLedgerSource, rates: RateTable) {
    let service = SettlementService::new(&source).with_rates(&rates);

    let result = service.plan("trip", &SettlementMode::Unified { target: cur("CHF") });

    assert!(matches!(result, Err(ApplicationError::Settlement(_))));
}
