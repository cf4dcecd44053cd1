//! Command-line entry point printing lattice and Monte Carlo valuations
//! for a reference vanilla-option scenario.

use openlattice::core::{PricingEngine, PricingError};
use openlattice::engines::monte_carlo::MonteCarloPricingEngine;
use openlattice::engines::tree::BinomialTreeEngine;
use openlattice::instruments::VanillaOption;
use openlattice::market::Market;

fn run() -> Result<(), PricingError> {
    let market = Market::builder()
        .spot(50.0)
        .rate(0.05)
        .flat_vol(0.30)
        .build()?;

    let euro_call = VanillaOption::european_call(52.0, 2.0);
    let euro_put = VanillaOption::european_put(52.0, 2.0);
    let amer_put = VanillaOption::american_put(52.0, 2.0);

    let tree = BinomialTreeEngine::new(1000);
    println!("--- Binomial ---");
    println!("European Call Price: {:.5}", tree.price(&euro_call, &market)?.price);
    println!("European Put Price:  {:.5}", tree.price(&euro_put, &market)?.price);
    println!("American Put Price:  {:.5}", tree.price(&amer_put, &market)?.price);
    println!("Delta of the Call:   {:.5}", tree.delta(&euro_call, &market)?);
    println!("Gamma of the Call:   {:.5}", tree.gamma(&euro_call, &market)?);

    let mc = MonteCarloPricingEngine::new(200_000, 42).with_antithetic(true);
    let mc_result = mc.price(&euro_call, &market)?;
    println!();
    println!("--- Monte Carlo ---");
    println!("European Call Price: {:.5}", mc_result.price);
    println!(
        "Standard Error:      {:.5}",
        mc_result.stderr.unwrap_or(0.0)
    );
    println!("Delta of the Call:   {:.5}", mc.delta(&euro_call, &market)?);

    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
