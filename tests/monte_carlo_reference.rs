//! Monte Carlo reference tests.
//!
//! The estimator is checked against the Black-Scholes closed form within
//! its own reported standard error, and against the lattice engine for the
//! reference scenario.

use openlattice::core::{OptionType, PricingEngine};
use openlattice::engines::analytic::{bs_delta, bs_price};
use openlattice::engines::monte_carlo::MonteCarloPricingEngine;
use openlattice::engines::tree::BinomialTreeEngine;
use openlattice::instruments::VanillaOption;
use openlattice::market::Market;

fn reference_market() -> Market {
    Market::builder()
        .spot(50.0)
        .rate(0.05)
        .flat_vol(0.30)
        .build()
        .expect("reference market is valid")
}

#[test]
fn mc_reference_call_matches_closed_form() {
    let option = VanillaOption::european_call(52.0, 2.0);
    let result = MonteCarloPricingEngine::new(200_000, 42)
        .with_antithetic(true)
        .price(&option, &reference_market())
        .expect("mc prices the reference call");

    let analytic = bs_price(OptionType::Call, 50.0, 52.0, 0.05, 0.30, 2.0);
    let stderr = result.stderr.expect("stderr present");
    assert!(
        (result.price - analytic).abs() <= 4.0 * stderr + 0.05,
        "mc={} bs={} stderr={}",
        result.price,
        analytic,
        stderr
    );
}

#[test]
fn mc_and_lattice_agree_on_the_reference_scenario() {
    let option = VanillaOption::european_call(52.0, 2.0);
    let market = reference_market();

    let lattice = BinomialTreeEngine::new(1000)
        .price(&option, &market)
        .unwrap()
        .price;
    let mc = MonteCarloPricingEngine::new(200_000, 42)
        .with_antithetic(true)
        .price(&option, &market)
        .unwrap();

    assert!(
        (mc.price - lattice).abs() <= 4.0 * mc.stderr.unwrap() + 0.05,
        "mc={} lattice={}",
        mc.price,
        lattice
    );
}

#[test]
fn mc_delta_matches_closed_form_delta() {
    let option = VanillaOption::european_call(52.0, 2.0);
    let delta = MonteCarloPricingEngine::new(200_000, 42)
        .delta(&option, &reference_market())
        .expect("mc delta computes");

    let analytic = bs_delta(OptionType::Call, 50.0, 52.0, 0.05, 0.30, 2.0);
    assert!(delta > 0.0 && delta < 1.0);
    assert!(
        (delta - analytic).abs() < 0.05,
        "mc delta={delta} bs delta={analytic}"
    );
}

#[test]
fn mc_put_call_parity_within_sampling_error() {
    let market = reference_market();
    let engine = MonteCarloPricingEngine::new(200_000, 42).with_antithetic(true);

    let call = engine
        .price(&VanillaOption::european_call(52.0, 2.0), &market)
        .unwrap();
    let put = engine
        .price(&VanillaOption::european_put(52.0, 2.0), &market)
        .unwrap();

    let parity = 50.0 - 52.0 * (-0.05_f64 * 2.0).exp();
    let tolerance = 4.0 * (call.stderr.unwrap() + put.stderr.unwrap()) + 0.05;
    assert!(
        (call.price - put.price - parity).abs() <= tolerance,
        "call={} put={} parity={}",
        call.price,
        put.price,
        parity
    );
}
