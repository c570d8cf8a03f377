//! Classical SARIMA fitting and simulation — SARIMA(1,1,1)(0,1,0)[m] by
//! conditional-sum-of-squares maximum likelihood.
//!
//! Purpose
//! -------
//! Fit the crate's classical model to a quarterly series and expose it as a
//! [`PathSimulator`]: after one regular and one seasonal difference, the
//! remaining series is a zero-mean ARMA(1,1) whose Gaussian conditional
//! likelihood is maximized in the unconstrained parameter space
//! `theta = (phi, ma, ln sigma^2)`.
//!
//! Key behaviors
//! -------------
//! - No stationarity or invertibility enforcement: near-unit-root economic
//!   series are tolerated by leaving `phi` and `ma` unconstrained.
//! - Non-convergence surfaces as [`FitError::DidNotConverge`] carrying the
//!   optimizer's termination status; a degenerate model is never returned
//!   silently.
//! - [`SarimaFit`] captures the trailing in-sample state (levels, last
//!   differenced value, last innovation) so simulated paths continue from
//!   the end of the sample rather than from zero initial conditions.
//! - Simulated paths include model-implied stochastic innovations drawn
//!   from `N(0, sigma)`, not just the deterministic forecast mean, and are
//!   reproducible from an explicit seed.
//!
//! Invariants & assumptions
//! ------------------------
//! - The differencing recursion requires `d = 1`, `seasonal_d = 1` and
//!   `p, q <= 1`; other orders are rejected at fit time.
//! - The normalizer guarantees at least two seasonal cycles of history, so
//!   the differenced series is non-empty for the default orders.
//!
//! Conventions
//! -----------
//! - `w_t = (y_t - y_{t-m}) - (y_{t-1} - y_{t-m-1})` is the doubly
//!   differenced series; levels are recovered with
//!   `y_t = w_t + y_{t-1} + y_{t-m} - y_{t-m-1}`.
//! - Native simulation orientation is path-major `(n_paths, steps)`; the
//!   simulation generator owns the transpose to `(steps, n_paths)`.
use ndarray::{Array1, Array2, array, s};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use crate::model::{
    PathSimulator,
    errors::{FitError, FitResult},
};
use crate::optimization::{
    errors::{OptError, OptResult},
    mle::{Cost, Grad, LogLikelihood, MleOptions, OptimOutcome, Theta, maximize},
};
use crate::series::QuarterlySeries;

/// Structural orders of the SARIMA model.
///
/// Injectable configuration: the reference deployment uses non-seasonal
/// `(1,1,1)` and seasonal `(0,1,0)` with a 4-quarter season, but tests can
/// swap orders within the supported range (`p, q <= 1`, both differences
/// fixed at 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SarimaOrders {
    pub p: usize,
    pub d: usize,
    pub q: usize,
    pub seasonal_d: usize,
    pub season_length: usize,
}

impl Default for SarimaOrders {
    fn default() -> Self {
        Self { p: 1, d: 1, q: 1, seasonal_d: 1, season_length: 4 }
    }
}

impl SarimaOrders {
    fn validate(&self) -> FitResult<()> {
        if self.p > 1 || self.q > 1 {
            return Err(FitError::UnsupportedOrders {
                reason: "the CSS recursion supports AR and MA orders of at most 1",
            });
        }
        if self.d != 1 || self.seasonal_d != 1 {
            return Err(FitError::UnsupportedOrders {
                reason: "exactly one regular and one seasonal difference are supported",
            });
        }
        if self.season_length < 1 {
            return Err(FitError::UnsupportedOrders {
                reason: "season length must be at least 1",
            });
        }
        Ok(())
    }
}

/// SARIMA model specification: orders plus optimizer options.
#[derive(Debug, Clone, PartialEq)]
pub struct SarimaSpec {
    pub orders: SarimaOrders,
    pub options: MleOptions,
}

impl Default for SarimaSpec {
    fn default() -> Self {
        Self { orders: SarimaOrders::default(), options: MleOptions::default() }
    }
}

/// A fitted SARIMA model, anchored at the end of its in-sample data.
///
/// Owned by the fitter, consumed read-only by the simulation generator via
/// [`PathSimulator`]. Carries the optimizer outcome for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct SarimaFit {
    orders: SarimaOrders,
    phi: f64,
    ma: f64,
    sigma2: f64,
    log_likelihood: f64,
    optimizer: OptimOutcome,
    /// Last `season_length + 1` in-sample levels, newest last.
    tail_levels: Array1<f64>,
    /// Last in-sample doubly differenced value.
    last_w: f64,
    /// Last in-sample innovation estimate.
    last_innovation: f64,
}

impl SarimaFit {
    /// Estimated AR(1) coefficient.
    pub fn phi(&self) -> f64 {
        self.phi
    }

    /// Estimated MA(1) coefficient.
    pub fn ma(&self) -> f64 {
        self.ma
    }

    /// Estimated innovation variance.
    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }

    /// Maximized conditional log-likelihood.
    pub fn log_likelihood(&self) -> f64 {
        self.log_likelihood
    }

    /// Full optimizer outcome for diagnostics.
    pub fn optimizer(&self) -> &OptimOutcome {
        &self.optimizer
    }
}

impl SarimaSpec {
    /// Fit the SARIMA model to `series` by CSS maximum likelihood.
    ///
    /// # Errors
    /// - [`FitError::UnsupportedOrders`] for orders outside the recursion's
    ///   range.
    /// - [`FitError::SeriesTooShort`] / [`FitError::DegenerateSeries`] when
    ///   the differenced series cannot support estimation.
    /// - [`FitError::Optimization`] / [`FitError::DidNotConverge`] for
    ///   solver failures, carrying the solver's diagnostic message. The
    ///   latter fires only when the optimizer stops without reporting any
    ///   termination reason; an iteration-capped run counts as terminated.
    pub fn fit(&self, series: &QuarterlySeries) -> FitResult<SarimaFit> {
        self.orders.validate()?;
        let m = self.orders.season_length;
        let w = double_difference(series.values(), m)?;

        let mean = w.mean().unwrap_or(0.0);
        let variance = w.mapv(|x| (x - mean) * (x - mean)).mean().unwrap_or(0.0);
        if !variance.is_finite() || variance <= 0.0 {
            return Err(FitError::DegenerateSeries {
                reason: "doubly differenced series has no variance",
            });
        }

        let theta0 = array![0.1, 0.1, variance.ln()];
        let likelihood = CssLikelihood;
        let data = CssData { w: w.clone() };
        let outcome = maximize(&likelihood, theta0, &data, &self.options)?;
        if !outcome.converged {
            return Err(FitError::DidNotConverge { status: outcome.status });
        }

        let phi = outcome.theta_hat[0];
        let ma = outcome.theta_hat[1];
        let sigma2 = outcome.theta_hat[2].exp();
        if !sigma2.is_finite() || sigma2 <= 0.0 {
            return Err(FitError::NumericalFailure { context: "estimated innovation variance" });
        }

        let innovations = css_innovations(&w, phi, ma);
        Ok(SarimaFit {
            orders: self.orders,
            phi,
            ma,
            sigma2,
            log_likelihood: outcome.value,
            optimizer: outcome.clone(),
            tail_levels: series.tail_values(m + 1),
            last_w: w[w.len() - 1],
            last_innovation: innovations[innovations.len() - 1],
        })
    }
}

impl PathSimulator for SarimaFit {
    /// Simulate `n_paths` stochastic continuations of length `steps`,
    /// anchored at the end of the fitted sample.
    ///
    /// Native orientation is `(n_paths, steps)`. Identical inputs and seed
    /// produce bit-identical output.
    fn simulate_paths(&self, steps: usize, n_paths: usize, seed: u64) -> FitResult<Array2<f64>> {
        let m = self.orders.season_length;
        let normal = Normal::new(0.0, self.sigma2.sqrt())
            .map_err(|_| FitError::NumericalFailure { context: "innovation scale" })?;
        let mut rng = StdRng::seed_from_u64(seed);

        let mut paths = Array2::zeros((n_paths, steps));
        for j in 0..n_paths {
            let mut levels = self.tail_levels.to_vec();
            let mut w_prev = self.last_w;
            let mut eps_prev = self.last_innovation;
            for t in 0..steps {
                let eps = normal.sample(&mut rng);
                let w = self.phi * w_prev + eps + self.ma * eps_prev;
                let len = levels.len();
                let y = w + levels[len - 1] + levels[len - m] - levels[len - m - 1];
                paths[[j, t]] = y;
                levels.push(y);
                w_prev = w;
                eps_prev = eps;
            }
        }
        Ok(paths)
    }
}

/// Apply one seasonal difference of lag `m`, then one regular difference.
///
/// Returns `w` of length `n - m - 1`.
fn double_difference(values: &Array1<f64>, m: usize) -> FitResult<Array1<f64>> {
    let n = values.len();
    let required = m + 1 + 3;
    if n < required {
        return Err(FitError::SeriesTooShort { required: required - m - 1, actual: n.saturating_sub(m + 1) });
    }
    let seasonal = &values.slice(s![m..]) - &values.slice(s![..n - m]);
    let k = seasonal.len();
    Ok(&seasonal.slice(s![1..]) - &seasonal.slice(s![..k - 1]))
}

/// Conditional innovation recursion `e_t = w_t - phi w_{t-1} - ma e_{t-1}`
/// with `e_0 = 0`.
fn css_innovations(w: &Array1<f64>, phi: f64, ma: f64) -> Array1<f64> {
    let mut e = Array1::zeros(w.len());
    for t in 1..w.len() {
        e[t] = w[t] - phi * w[t - 1] - ma * e[t - 1];
    }
    e
}

/// Data container for the CSS likelihood: the doubly differenced series.
struct CssData {
    w: Array1<f64>,
}

/// Gaussian conditional log-likelihood of a zero-mean ARMA(1,1) in
/// `theta = (phi, ma, ln sigma^2)`.
struct CssLikelihood;

impl LogLikelihood for CssLikelihood {
    type Data = CssData;

    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<Cost> {
        let (phi, ma, log_sigma2) = (theta[0], theta[1], theta[2]);
        let sigma2 = log_sigma2.exp();
        let e = css_innovations(&data.w, phi, ma);
        let n_eff = (data.w.len() - 1) as f64;
        let sse: f64 = e.slice(s![1..]).mapv(|x| x * x).sum();
        let nll = 0.5 * n_eff * ((2.0 * std::f64::consts::PI).ln() + log_sigma2)
            + sse / (2.0 * sigma2);
        Ok(-nll)
    }

    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()> {
        if theta.len() != 3 {
            return Err(OptError::ThetaDimMismatch { expected: 3, found: theta.len() });
        }
        for (index, &value) in theta.iter().enumerate() {
            if !value.is_finite() {
                return Err(OptError::InvalidTheta0 {
                    index,
                    value,
                    reason: "Initial SARIMA parameters must be finite.",
                });
            }
        }
        if data.w.len() < 2 {
            return Err(OptError::InvalidTheta0 {
                index: 0,
                value: data.w.len() as f64,
                reason: "Differenced series must hold at least two observations.",
            });
        }
        Ok(())
    }

    fn grad(&self, theta: &Theta, data: &Self::Data) -> OptResult<Grad> {
        // Analytic derivatives of the CSS recursion: de/dphi and de/dma are
        // themselves recursions in the lagged values.
        let (phi, ma, log_sigma2) = (theta[0], theta[1], theta[2]);
        let sigma2 = log_sigma2.exp();
        let w = &data.w;
        let e = css_innovations(w, phi, ma);
        let n = w.len();

        let mut de_dphi = vec![0.0; n];
        let mut de_dma = vec![0.0; n];
        for t in 1..n {
            de_dphi[t] = -w[t - 1] - ma * de_dphi[t - 1];
            de_dma[t] = -e[t - 1] - ma * de_dma[t - 1];
        }

        let mut g_phi = 0.0;
        let mut g_ma = 0.0;
        let mut sse = 0.0;
        for t in 1..n {
            g_phi += e[t] * de_dphi[t];
            g_ma += e[t] * de_dma[t];
            sse += e[t] * e[t];
        }
        let n_eff = (n - 1) as f64;
        // d nll / d param, then flip sign for the log-likelihood gradient.
        let nll_phi = g_phi / sigma2;
        let nll_ma = g_ma / sigma2;
        let nll_ls = 0.5 * n_eff - sse / (2.0 * sigma2);
        Ok(array![-nll_phi, -nll_ma, -nll_ls])
    }
}
