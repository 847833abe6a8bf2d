//! Closed-form Black-Scholes pricing for European options.

use serde::{Deserialize, Serialize};
use services_common::{DAYS_PER_YEAR, PricingError};

/// √(2π), denominator of the standard normal density.
const SQRT_2PI: f64 = 2.5066282746310007;

/// Starting point for the implied volatility search (20%).
const IV_INITIAL_GUESS: f64 = 0.2;
/// Price tolerance at which the search is considered converged.
const IV_TOLERANCE: f64 = 1e-6;
/// Iteration cap for the implied volatility search.
const MAX_IV_ITERATIONS: u32 = 100;
/// Vega below this cannot steer a Newton step anywhere useful.
const MIN_VEGA: f64 = 1e-10;
/// Volatility iterate bounds, 0.1% to 500%.
const IV_MIN_VOLATILITY: f64 = 0.001;
const IV_MAX_VOLATILITY: f64 = 5.0;

/// Contract side of a vanilla option.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OptionType {
    /// Right to buy the underlying at the strike price.
    Call,
    /// Right to sell the underlying at the strike price.
    Put,
}

/// First-order sensitivities of an option price.
///
/// Theta is quoted per calendar day, vega per one-point volatility move and
/// rho per one-point rate move, matching how desks read these numbers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Greeks {
    /// Option price change per $1 move in the underlying.
    pub delta: f64,
    /// Delta change per $1 move in the underlying.
    pub gamma: f64,
    /// Price decay per calendar day.
    pub theta: f64,
    /// Price change per one-point volatility move.
    pub vega: f64,
    /// Price change per one-point rate move.
    pub rho: f64,
}

/// Black-Scholes model for a non-dividend underlying.
#[derive(Debug)]
pub struct BlackScholes;

impl BlackScholes {
    /// Standard normal cumulative distribution function.
    #[must_use]
    pub fn norm_cdf(x: f64) -> f64 {
        0.5 * (1.0 + libm::erf(x / std::f64::consts::SQRT_2))
    }

    /// Standard normal probability density function.
    #[must_use]
    pub fn norm_pdf(x: f64) -> f64 {
        (-0.5 * x * x).exp() / SQRT_2PI
    }

    /// The d1 term of the Black-Scholes formula.
    #[must_use]
    pub fn d1(spot: f64, strike: f64, rate: f64, volatility: f64, time: f64) -> f64 {
        ((spot / strike).ln() + (rate + 0.5 * volatility * volatility) * time)
            / (volatility * time.sqrt())
    }

    /// The d2 term of the Black-Scholes formula.
    #[must_use]
    pub fn d2(spot: f64, strike: f64, rate: f64, volatility: f64, time: f64) -> f64 {
        Self::d1(spot, strike, rate, volatility, time) - volatility * time.sqrt()
    }

    /// Exercise value if the option expired right now.
    #[must_use]
    pub fn intrinsic(option_type: OptionType, spot: f64, strike: f64) -> f64 {
        match option_type {
            OptionType::Call => (spot - strike).max(0.0),
            OptionType::Put => (strike - spot).max(0.0),
        }
    }

    /// Model price of a European option, in quote currency.
    ///
    /// With no time left or no volatility the model collapses to intrinsic
    /// value rather than dividing by zero.
    pub fn price(
        option_type: OptionType,
        spot: f64,
        strike: f64,
        rate: f64,
        volatility: f64,
        time: f64,
    ) -> Result<f64, PricingError> {
        ensure_positive("spot", spot)?;
        ensure_positive("strike", strike)?;
        ensure_non_negative("volatility", volatility)?;
        ensure_non_negative("time to expiry", time)?;

        if time <= 0.0 || volatility <= 0.0 {
            return Ok(Self::intrinsic(option_type, spot, strike));
        }

        let d1 = Self::d1(spot, strike, rate, volatility, time);
        let d2 = Self::d2(spot, strike, rate, volatility, time);
        let discounted_strike = strike * (-rate * time).exp();

        Ok(match option_type {
            OptionType::Call => spot * Self::norm_cdf(d1) - discounted_strike * Self::norm_cdf(d2),
            OptionType::Put => discounted_strike * Self::norm_cdf(-d2) - spot * Self::norm_cdf(-d1),
        })
    }

    /// The standard first-order Greeks for one option.
    ///
    /// Expired or zero-volatility inputs yield all-zero sensitivities.
    pub fn greeks(
        option_type: OptionType,
        spot: f64,
        strike: f64,
        rate: f64,
        volatility: f64,
        time: f64,
    ) -> Result<Greeks, PricingError> {
        ensure_positive("spot", spot)?;
        ensure_positive("strike", strike)?;
        ensure_non_negative("volatility", volatility)?;
        ensure_non_negative("time to expiry", time)?;

        if time <= 0.0 || volatility <= 0.0 {
            return Ok(Greeks::default());
        }

        let sqrt_t = time.sqrt();
        let d1 = Self::d1(spot, strike, rate, volatility, time);
        let d2 = Self::d2(spot, strike, rate, volatility, time);
        let pdf_d1 = Self::norm_pdf(d1);
        let discount = (-rate * time).exp();
        let decay = -spot * pdf_d1 * volatility / (2.0 * sqrt_t);

        let (delta, theta, rho) = match option_type {
            OptionType::Call => (
                Self::norm_cdf(d1),
                decay - rate * strike * discount * Self::norm_cdf(d2),
                strike * time * discount * Self::norm_cdf(d2),
            ),
            OptionType::Put => (
                Self::norm_cdf(d1) - 1.0,
                decay + rate * strike * discount * Self::norm_cdf(-d2),
                -strike * time * discount * Self::norm_cdf(-d2),
            ),
        };

        // Scale theta to per day, vega and rho to per one-point move
        Ok(Greeks {
            delta,
            gamma: pdf_d1 / (spot * volatility * sqrt_t),
            theta: theta / DAYS_PER_YEAR,
            vega: spot * pdf_d1 * sqrt_t / 100.0,
            rho: rho / 100.0,
        })
    }

    /// Solves for the volatility that reproduces an observed market price.
    ///
    /// Newton-Raphson on vega, with the iterate clamped to the model domain.
    /// Fails when vega collapses or the price never comes within tolerance.
    pub fn implied_volatility(
        option_type: OptionType,
        spot: f64,
        strike: f64,
        rate: f64,
        time: f64,
        market_price: f64,
    ) -> Result<f64, PricingError> {
        ensure_positive("spot", spot)?;
        ensure_positive("strike", strike)?;
        ensure_positive("time to expiry", time)?;
        ensure_positive("market price", market_price)?;

        let mut volatility = IV_INITIAL_GUESS;
        for iteration in 0..MAX_IV_ITERATIONS {
            let price = Self::price(option_type, spot, strike, rate, volatility, time)?;
            let diff = market_price - price;
            if diff.abs() < IV_TOLERANCE {
                return Ok(volatility);
            }

            let vega =
                spot * Self::norm_pdf(Self::d1(spot, strike, rate, volatility, time)) * time.sqrt();
            if vega.abs() < MIN_VEGA {
                return Err(PricingError::NoConvergence {
                    iterations: iteration,
                });
            }
            volatility = (volatility + diff / vega).clamp(IV_MIN_VOLATILITY, IV_MAX_VOLATILITY);
        }

        Err(PricingError::NoConvergence {
            iterations: MAX_IV_ITERATIONS,
        })
    }
}

fn ensure_positive(name: &str, value: f64) -> Result<(), PricingError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PricingError::InvalidInput(format!(
            "{name} must be positive and finite, got {value}"
        )))
    }
}

fn ensure_non_negative(name: &str, value: f64) -> Result<(), PricingError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(PricingError::InvalidInput(format!(
            "{name} must be non-negative and finite, got {value}"
        )))
    }
}
