//! Example: Basic options pricing with Black-Scholes and the binomial tree
//!
//! Run with: cargo run --example basic_pricing

use vanilla_options::prelude::*;

fn main() -> PricingResult<()> {
    // Option parameters
    let spot = 500.0;
    let strike = 505.0;
    let time = 0.25; // 3 months
    let rate = 0.05; // 5% risk-free rate
    let div = 0.01; // 1% dividend yield
    let vol = 0.20; // 20% volatility

    println!("=== Black-Scholes Pricing ===\n");
    println!("Spot:     ${:.2}", spot);
    println!("Strike:   ${:.2}", strike);
    println!("Time:     {:.2} years ({:.0} days)", time, time * 365.0);
    println!("Rate:     {:.1}%", rate * 100.0);
    println!("Div:      {:.1}%", div * 100.0);
    println!("Vol:      {:.1}%\n", vol * 100.0);

    let builder = Contract::builder()
        .spot(spot)
        .strike(strike)
        .time_to_maturity(time)
        .risk_free_rate(rate)
        .dividend_yield(div)
        .volatility(vol);
    let call = builder.clone().build()?;
    let put = builder.option_type(OptionType::Put).build()?;

    let Shaped::Scalar(call_price) = bs_price(&call) else {
        unreachable!("scalar contract");
    };
    let Shaped::Scalar(put_price) = bs_price(&put) else {
        unreachable!("scalar contract");
    };
    println!("Call Price: ${:.4}", call_price);
    println!("Put Price:  ${:.4}", put_price);

    // Verify put-call parity: C - P = S*e^(-qT) - K*e^(-rT)
    let parity_lhs = call_price - put_price;
    let parity_rhs = spot * (-div * time).exp() - strike * (-rate * time).exp();
    println!("\nPut-Call Parity Check:");
    println!("  C - P = {:.4}", parity_lhs);
    println!("  S*e^(-qT) - K*e^(-rT) = {:.4}", parity_rhs);
    println!("  Difference: {:.6}", (parity_lhs - parity_rhs).abs());

    // Calculate Greeks for the call
    println!("\n=== Greeks (Call) ===\n");
    if let Shaped::Scalar(greeks) = bs_greeks(&call) {
        println!("Delta:  {:.4}", greeks.delta);
        println!("Gamma:  {:.4}", greeks.gamma);
        println!("Theta:  {:.4} (per day: {:.4})", greeks.theta, greeks.theta / 365.0);
        println!("Vega:   {:.4}", greeks.vega);
        println!("Rho:    {:.4}", greeks.rho);
    }

    // Implied volatility calculation
    println!("\n=== Implied Volatility ===\n");
    let market_price = call_price + 0.50; // Simulated market price
    match implied_volatility(&call, 0.3, market_price)? {
        Shaped::Scalar(iv) if !iv.is_nan() => println!(
            "Market price ${:.4} implies vol: {:.2}%",
            market_price,
            iv * 100.0
        ),
        _ => println!("Could not solve for IV"),
    }

    // Early exercise premium on a strip of puts
    println!("\n=== Binomial Tree (Puts, 200 levels) ===\n");
    let strikes = vec![480.0, 500.0, 520.0, 540.0];
    let strip = Contract::builder()
        .spot(spot)
        .strike(strikes.clone())
        .time_to_maturity(time)
        .risk_free_rate(rate)
        .dividend_yield(div)
        .volatility(vol)
        .option_type(OptionType::Put);
    let tree = BinomialTree::new(200);
    let european = tree.price(&strip.clone().build()?)?.into_vec();
    let american = tree
        .price(&strip.exercise(ExerciseStyle::American).build()?)?
        .into_vec();

    println!("Strike   European   American   Premium");
    for ((k, eu), us) in strikes.iter().zip(&european).zip(&american) {
        println!("{:>6.0}   {:>8.4}   {:>8.4}   {:>7.4}", k, eu, us, us - eu);
    }

    Ok(())
}
