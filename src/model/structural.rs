//! Bayesian structural time-series model — local linear trend plus a
//! quarterly seasonal component, estimated by Gibbs sampling.
//!
//! Purpose
//! -------
//! Provide the crate's alternative to the classical SARIMA fit: a
//! state-space decomposition `z_t = level_t + seasonal_t + noise` whose
//! states are drawn by forward-filter backward-sampling (Carter-Kohn) and
//! whose four variances are drawn from their conjugate inverse-gamma
//! conditionals. The fitted object exposes posterior component paths for
//! reporting and implements [`PathSimulator`] for predictive forecasting.
//!
//! Key behaviors
//! -------------
//! - The series is standardized internally; draws and simulated paths are
//!   mapped back to the original scale on the way out.
//! - Every failure mode is a catchable [`FitError`] so the pipeline can
//!   fall back to the classical model: invalid options, degenerate data,
//!   Cholesky breakdowns, and a potential-scale-reduction gate that
//!   rejects unmixed chains via [`FitError::ChainsNotConverged`].
//! - Predictive simulation subsamples the pooled posterior draws
//!   proportionally, so parameter uncertainty propagates into the paths.
//!
//! Invariants & assumptions
//! ------------------------
//! - The state vector is `[level, trend, season_t, season_{t-1},
//!   season_{t-2}]` with a 4-quarter seasonal constraint
//!   `season_t = -(season_{t-1} + season_{t-2} + season_{t-3}) + noise`.
//! - Variance order everywhere is `(level, trend, seasonal, observation)`.
//! - Backward-sampling covariances are symmetrized and jittered before
//!   factorization; the lag-copy rows of the transition make them
//!   borderline singular by construction.
//!
//! Conventions
//! -----------
//! - `nalgebra` carries the filter linear algebra; `ndarray` carries the
//!   stored draws, matching the rest of the crate.
//! - Native simulation orientation is `(n_paths, steps)`, like the SARIMA
//!   fit.
use nalgebra::{Cholesky, DMatrix, DVector};
use ndarray::{Array1, Array2};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use statrs::distribution::Gamma;

use crate::model::{
    PathSimulator,
    errors::{FitError, FitResult},
};
use crate::series::{Quarter, QuarterlySeries};

/// State dimension: level, trend, and three seasonal lags.
const STATE_DIM: usize = 5;

/// Number of sampled variances: level, trend, seasonal, observation.
const N_VARIANCES: usize = 4;

/// Ridge schedule applied before Cholesky factorization.
const JITTERS: [f64; 4] = [0.0, 1e-10, 1e-8, 1e-6];

/// Sampler configuration for the structural model.
///
/// Defaults follow the reference deployment: 4 chains of 250 retained
/// draws after 250 burn-in iterations, weakly informative inverse-gamma
/// priors on all four variances, and a split-chain R-hat gate at 1.2.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StructuralOptions {
    pub chains: usize,
    pub draws: usize,
    pub burn_in: usize,
    pub seed: u64,
    pub prior_shape: f64,
    pub prior_scale: f64,
    pub rhat_threshold: f64,
}

impl Default for StructuralOptions {
    fn default() -> Self {
        Self {
            chains: 4,
            draws: 250,
            burn_in: 250,
            seed: 42,
            prior_shape: 2.0,
            prior_scale: 0.01,
            rhat_threshold: 1.2,
        }
    }
}

impl StructuralOptions {
    fn validate(&self) -> FitResult<()> {
        if self.chains < 2 {
            return Err(FitError::InvalidSamplerOptions {
                reason: "at least two chains are required for the R-hat gate",
            });
        }
        if self.draws < 4 {
            return Err(FitError::InvalidSamplerOptions {
                reason: "at least four retained draws per chain are required",
            });
        }
        if !self.prior_shape.is_finite() || self.prior_shape <= 1.0 {
            return Err(FitError::InvalidSamplerOptions {
                reason: "prior shape must be finite and greater than one",
            });
        }
        if !self.prior_scale.is_finite() || self.prior_scale <= 0.0 {
            return Err(FitError::InvalidSamplerOptions {
                reason: "prior scale must be finite and strictly positive",
            });
        }
        if !self.rhat_threshold.is_finite() || self.rhat_threshold < 1.0 {
            return Err(FitError::InvalidSamplerOptions {
                reason: "R-hat threshold must be finite and at least one",
            });
        }
        Ok(())
    }
}

/// Structural model specification: sampler options only; the state-space
/// form itself is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StructuralSpec {
    pub options: StructuralOptions,
}

/// Retained draws from a single chain.
///
/// Component matrices are `(draws, n_obs)`, on the original data scale.
/// `variances` is `(draws, 4)` in standardized units.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainDraws {
    pub level: Array2<f64>,
    pub trend: Array2<f64>,
    pub seasonal: Array2<f64>,
    pub variances: Array2<f64>,
}

/// Pooled posterior output of the sampler, aligned to the in-sample index.
#[derive(Debug, Clone, PartialEq)]
pub struct PosteriorDraws {
    chains: Vec<ChainDraws>,
    periods: Vec<Quarter>,
}

/// Posterior-mean component paths, on the original data scale.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentMeans {
    pub level: Array1<f64>,
    pub trend: Array1<f64>,
    pub seasonal: Array1<f64>,
}

impl PosteriorDraws {
    /// Per-chain draws.
    pub fn chains(&self) -> &[ChainDraws] {
        &self.chains
    }

    /// In-sample quarterly index the component paths are aligned to.
    pub fn periods(&self) -> &[Quarter] {
        &self.periods
    }

    /// Total number of retained draws across all chains.
    pub fn n_draws(&self) -> usize {
        self.chains.iter().map(|c| c.level.nrows()).sum()
    }

    /// Posterior means of the level, trend, and seasonal paths, pooled
    /// across chains.
    pub fn component_means(&self) -> ComponentMeans {
        let n_obs = self.periods.len();
        let mut level = Array1::zeros(n_obs);
        let mut trend = Array1::zeros(n_obs);
        let mut seasonal = Array1::zeros(n_obs);
        let mut total = 0usize;
        for chain in &self.chains {
            for d in 0..chain.level.nrows() {
                level += &chain.level.row(d);
                trend += &chain.trend.row(d);
                seasonal += &chain.seasonal.row(d);
            }
            total += chain.level.nrows();
        }
        let scale = 1.0 / total as f64;
        ComponentMeans {
            level: level * scale,
            trend: trend * scale,
            seasonal: seasonal * scale,
        }
    }
}

/// A fitted structural model: pooled posterior plus the terminal-state
/// draws needed to continue each sampled trajectory forward.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuralFit {
    posterior: PosteriorDraws,
    /// Terminal states per pooled draw, standardized scale, `(M, 5)`.
    terminal_states: Array2<f64>,
    /// Variance draws per pooled draw, standardized scale, `(M, 4)`.
    variance_draws: Array2<f64>,
    mean: f64,
    sd: f64,
}

impl StructuralFit {
    /// Pooled posterior draws, for reporting.
    pub fn posterior(&self) -> &PosteriorDraws {
        &self.posterior
    }
}

impl StructuralSpec {
    /// Run the Gibbs sampler on `series`.
    ///
    /// # Errors
    /// - [`FitError::InvalidSamplerOptions`] for bad configuration.
    /// - [`FitError::SeriesTooShort`] / [`FitError::DegenerateSeries`] for
    ///   unusable data.
    /// - [`FitError::NumericalFailure`] if a filter covariance cannot be
    ///   factorized even after jittering.
    /// - [`FitError::ChainsNotConverged`] when the split-chain R-hat of any
    ///   variance parameter exceeds the configured threshold.
    pub fn fit(&self, series: &QuarterlySeries) -> FitResult<StructuralFit> {
        self.options.validate()?;
        let n_obs = series.len();
        if n_obs < 8 {
            return Err(FitError::SeriesTooShort { required: 8, actual: n_obs });
        }

        let mean = series.values().mean().unwrap_or(0.0);
        let sd = series.values().mapv(|v| (v - mean) * (v - mean)).mean().unwrap_or(0.0).sqrt();
        if !sd.is_finite() || sd <= 0.0 {
            return Err(FitError::DegenerateSeries {
                reason: "series has no variation to decompose",
            });
        }
        let z: Vec<f64> = series.values().iter().map(|&v| (v - mean) / sd).collect();

        let opts = &self.options;
        let mut chains = Vec::with_capacity(opts.chains);
        let m_total = opts.chains * opts.draws;
        let mut terminal_states = Array2::zeros((m_total, STATE_DIM));
        let mut variance_draws = Array2::zeros((m_total, N_VARIANCES));

        for chain in 0..opts.chains {
            let mut rng = StdRng::seed_from_u64(opts.seed.wrapping_add(chain as u64));
            let mut variances = [opts.prior_scale / (opts.prior_shape - 1.0); N_VARIANCES];

            let mut level = Array2::zeros((opts.draws, n_obs));
            let mut trend = Array2::zeros((opts.draws, n_obs));
            let mut seasonal = Array2::zeros((opts.draws, n_obs));
            let mut chain_vars = Array2::zeros((opts.draws, N_VARIANCES));

            for iter in 0..opts.burn_in + opts.draws {
                let states = sample_states(&z, &variances, &mut rng)?;
                variances = draw_variances(&z, &states, opts, &mut rng)?;

                if iter >= opts.burn_in {
                    let d = iter - opts.burn_in;
                    for t in 0..n_obs {
                        level[[d, t]] = mean + sd * states[t][0];
                        trend[[d, t]] = sd * states[t][1];
                        seasonal[[d, t]] = sd * states[t][2];
                    }
                    let pooled = chain * opts.draws + d;
                    for k in 0..STATE_DIM {
                        terminal_states[[pooled, k]] = states[n_obs - 1][k];
                    }
                    for (k, &v) in variances.iter().enumerate() {
                        chain_vars[[d, k]] = v;
                        variance_draws[[pooled, k]] = v;
                    }
                }
            }

            chains.push(ChainDraws { level, trend, seasonal, variances: chain_vars });
        }

        let rhat = max_split_rhat(&chains);
        if rhat > opts.rhat_threshold {
            return Err(FitError::ChainsNotConverged { rhat, threshold: opts.rhat_threshold });
        }

        Ok(StructuralFit {
            posterior: PosteriorDraws { chains, periods: series.periods().to_vec() },
            terminal_states,
            variance_draws,
            mean,
            sd,
        })
    }
}

impl PathSimulator for StructuralFit {
    /// Simulate predictive paths by continuing posterior trajectories.
    ///
    /// Paths subsample the pooled draws proportionally (`idx = k * M /
    /// n_paths`), so both state and variance uncertainty carry into the
    /// forecast. Native orientation is `(n_paths, steps)`.
    fn simulate_paths(&self, steps: usize, n_paths: usize, seed: u64) -> FitResult<Array2<f64>> {
        let m_draws = self.terminal_states.nrows();
        if m_draws == 0 {
            return Err(FitError::NoPosteriorDraws);
        }
        let standard = Normal::new(0.0, 1.0)
            .map_err(|_| FitError::NumericalFailure { context: "standard normal setup" })?;
        let mut rng = StdRng::seed_from_u64(seed);

        let mut paths = Array2::zeros((n_paths, steps));
        for k in 0..n_paths {
            let idx = k * m_draws / n_paths;
            let mut state = [0.0; STATE_DIM];
            for j in 0..STATE_DIM {
                state[j] = self.terminal_states[[idx, j]];
            }
            let sd_level = self.variance_draws[[idx, 0]].sqrt();
            let sd_trend = self.variance_draws[[idx, 1]].sqrt();
            let sd_seas = self.variance_draws[[idx, 2]].sqrt();
            let sd_obs = self.variance_draws[[idx, 3]].sqrt();

            for t in 0..steps {
                let new_level = state[0] + state[1] + sd_level * standard.sample(&mut rng);
                let new_trend = state[1] + sd_trend * standard.sample(&mut rng);
                let new_seas = -(state[2] + state[3] + state[4])
                    + sd_seas * standard.sample(&mut rng);
                state = [new_level, new_trend, new_seas, state[2], state[3]];

                let z = state[0] + state[2] + sd_obs * standard.sample(&mut rng);
                paths[[k, t]] = self.mean + self.sd * z;
            }
        }
        Ok(paths)
    }
}

/// State transition of the local-linear-trend-plus-seasonal form.
fn transition_matrix() -> DMatrix<f64> {
    DMatrix::from_row_slice(
        STATE_DIM,
        STATE_DIM,
        &[
            1.0, 1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, 0.0, //
            0.0, 0.0, -1.0, -1.0, -1.0, //
            0.0, 0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 0.0, 1.0, 0.0,
        ],
    )
}

/// State-innovation covariance for the current variance draw. The two
/// lag-copy rows carry no innovation.
fn innovation_covariance(variances: &[f64; N_VARIANCES]) -> DMatrix<f64> {
    let mut q = DMatrix::zeros(STATE_DIM, STATE_DIM);
    q[(0, 0)] = variances[0];
    q[(1, 1)] = variances[1];
    q[(2, 2)] = variances[2];
    q
}

/// Factorize a symmetric matrix, escalating through the ridge schedule.
fn cholesky_with_jitter(
    mat: &DMatrix<f64>, context: &'static str,
) -> FitResult<Cholesky<f64, nalgebra::Dynamic>> {
    for &jitter in JITTERS.iter() {
        let mut candidate = mat.clone();
        if jitter > 0.0 {
            for i in 0..candidate.nrows() {
                candidate[(i, i)] += jitter;
            }
        }
        if let Some(chol) = Cholesky::new(candidate) {
            return Ok(chol);
        }
    }
    Err(FitError::NumericalFailure { context })
}

/// Draw from `N(mean, cov)` via a jittered Cholesky factor.
fn draw_mvn(
    mean: &DVector<f64>, cov: &DMatrix<f64>, rng: &mut StdRng, context: &'static str,
) -> FitResult<DVector<f64>> {
    let chol = cholesky_with_jitter(cov, context)?;
    let standard = Normal::new(0.0, 1.0)
        .map_err(|_| FitError::NumericalFailure { context })?;
    let noise = DVector::from_fn(mean.len(), |_, _| standard.sample(rng));
    Ok(mean + chol.l() * noise)
}

/// Forward filter, backward sample: one draw of the full state sequence
/// conditional on the current variances (Carter-Kohn).
fn sample_states(
    z: &[f64], variances: &[f64; N_VARIANCES], rng: &mut StdRng,
) -> FitResult<Vec<[f64; STATE_DIM]>> {
    let n_obs = z.len();
    let t_mat = transition_matrix();
    let q = innovation_covariance(variances);
    let sigma_obs = variances[3];

    // Diffuse-ish start anchored at the first observation.
    let mut a = DVector::zeros(STATE_DIM);
    a[0] = z[0];
    let mut p = DMatrix::identity(STATE_DIM, STATE_DIM) * 1e4;

    let mut filtered_means = Vec::with_capacity(n_obs);
    let mut filtered_covs = Vec::with_capacity(n_obs);

    for &obs in z.iter() {
        // Observation row is [1, 0, 1, 0, 0]: level plus current seasonal.
        let pz = p.column(0) + p.column(2);
        let f = pz[0] + pz[2] + sigma_obs;
        if !f.is_finite() || f <= 0.0 {
            return Err(FitError::NumericalFailure { context: "innovation variance in filter" });
        }
        let v = obs - (a[0] + a[2]);
        let gain = &pz / f;
        let a_f = &a + &gain * v;
        let p_f = symmetrize(&(&p - &gain * pz.transpose()));
        filtered_means.push(a_f.clone());
        filtered_covs.push(p_f.clone());

        a = &t_mat * a_f;
        p = symmetrize(&(&t_mat * p_f * t_mat.transpose() + &q));
    }

    let mut states = vec![[0.0; STATE_DIM]; n_obs];
    let mut sampled = draw_mvn(
        &filtered_means[n_obs - 1],
        &filtered_covs[n_obs - 1],
        rng,
        "terminal smoothing covariance",
    )?;
    copy_state(&sampled, &mut states[n_obs - 1]);

    for t in (0..n_obs - 1).rev() {
        let a_f = &filtered_means[t];
        let p_f = &filtered_covs[t];
        let a_pred = &t_mat * a_f;
        let p_pred = symmetrize(&(&t_mat * p_f * t_mat.transpose() + &q));

        let chol = cholesky_with_jitter(&p_pred, "one-step prediction covariance")?;
        // G = P_f T' P_pred^{-1}, computed as (P_pred^{-1} T P_f)'.
        let g = chol.solve(&(&t_mat * p_f)).transpose();
        let cond_mean = a_f + &g * (&sampled - a_pred);
        let cond_cov = symmetrize(&(p_f - &g * p_pred * g.transpose()));

        sampled = draw_mvn(&cond_mean, &cond_cov, rng, "smoothing covariance")?;
        copy_state(&sampled, &mut states[t]);
    }
    Ok(states)
}

/// Draw the four variances from their inverse-gamma full conditionals.
///
/// A draw `x ~ Gamma(shape, rate)` gives `1 / x ~ InvGamma(shape, scale)`
/// with `scale = rate`, which is how each variance is sampled here.
fn draw_variances(
    z: &[f64], states: &[[f64; STATE_DIM]], opts: &StructuralOptions, rng: &mut StdRng,
) -> FitResult<[f64; N_VARIANCES]> {
    let n_obs = z.len();

    let mut ss_level = 0.0;
    let mut ss_trend = 0.0;
    for t in 1..n_obs {
        let eta = states[t][0] - states[t - 1][0] - states[t - 1][1];
        ss_level += eta * eta;
        let zeta = states[t][1] - states[t - 1][1];
        ss_trend += zeta * zeta;
    }
    let mut ss_seasonal = 0.0;
    for t in 3..n_obs {
        let omega =
            states[t][2] + states[t - 1][2] + states[t - 2][2] + states[t - 3][2];
        ss_seasonal += omega * omega;
    }
    let mut ss_obs = 0.0;
    for t in 0..n_obs {
        let resid = z[t] - states[t][0] - states[t][2];
        ss_obs += resid * resid;
    }

    let sums = [
        (ss_level, n_obs - 1),
        (ss_trend, n_obs - 1),
        (ss_seasonal, n_obs.saturating_sub(3)),
        (ss_obs, n_obs),
    ];
    let mut out = [0.0; N_VARIANCES];
    for (k, &(ss, count)) in sums.iter().enumerate() {
        let shape = opts.prior_shape + count as f64 / 2.0;
        let rate = opts.prior_scale + ss / 2.0;
        let gamma = Gamma::new(shape, rate)
            .map_err(|_| FitError::NumericalFailure { context: "variance conditional" })?;
        let draw: f64 = gamma.sample(rng);
        if !draw.is_finite() || draw <= 0.0 {
            return Err(FitError::NumericalFailure { context: "variance conditional" });
        }
        out[k] = 1.0 / draw;
    }
    Ok(out)
}

/// Maximum split-chain potential scale reduction across the four variance
/// parameters. Each chain is split in half, doubling the sequence count.
fn max_split_rhat(chains: &[ChainDraws]) -> f64 {
    let mut worst = 1.0_f64;
    for param in 0..N_VARIANCES {
        let mut sequences: Vec<Vec<f64>> = Vec::with_capacity(chains.len() * 2);
        for chain in chains {
            let draws: Vec<f64> = chain.variances.column(param).to_vec();
            let half = draws.len() / 2;
            sequences.push(draws[..half].to_vec());
            sequences.push(draws[half..2 * half].to_vec());
        }
        worst = worst.max(split_rhat(&sequences));
    }
    worst
}

fn split_rhat(sequences: &[Vec<f64>]) -> f64 {
    let m = sequences.len();
    let n = sequences[0].len();
    if n < 2 {
        return f64::INFINITY;
    }
    let seq_means: Vec<f64> =
        sequences.iter().map(|s| s.iter().sum::<f64>() / n as f64).collect();
    let grand = seq_means.iter().sum::<f64>() / m as f64;
    let b = n as f64 / (m - 1) as f64
        * seq_means.iter().map(|&mu| (mu - grand) * (mu - grand)).sum::<f64>();
    let w = sequences
        .iter()
        .zip(&seq_means)
        .map(|(s, &mu)| {
            s.iter().map(|&x| (x - mu) * (x - mu)).sum::<f64>() / (n - 1) as f64
        })
        .sum::<f64>()
        / m as f64;
    if w <= 0.0 {
        return 1.0;
    }
    let var_plus = (n - 1) as f64 / n as f64 * w + b / n as f64;
    (var_plus / w).sqrt()
}

fn symmetrize(mat: &DMatrix<f64>) -> DMatrix<f64> {
    (mat + mat.transpose()) * 0.5
}

fn copy_state(sampled: &DVector<f64>, out: &mut [f64; STATE_DIM]) {
    for k in 0..STATE_DIM {
        out[k] = sampled[k];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Option validation and the degenerate-series guard.
    // - Split R-hat on hand-built sequences (identical chains vs. separated
    //   chains).
    // - A short sampler run: posterior shapes, component-mean alignment,
    //   and the always-failing R-hat gate at threshold 1.0.
    // - Predictive simulation shape and seed reproducibility.
    //
    // Sampler runs use few draws and a generous R-hat threshold; mixing
    // quality itself is not under test here.
    // -------------------------------------------------------------------------

    fn synthetic_series(n: usize) -> QuarterlySeries {
        let start = Quarter::new(2012, 1);
        let pairs: Vec<(Quarter, f64)> = (0..n)
            .map(|i| {
                let seasonal = [1.1, -0.4, 0.2, -0.9][i % 4];
                let value = 10.0 + 0.25 * i as f64 + seasonal + (i as f64 * 0.9).sin() * 0.1;
                (Quarter::from_ordinal(start.ordinal() + i as i64), value)
            })
            .collect();
        QuarterlySeries::new(pairs).unwrap()
    }

    fn quick_options() -> StructuralOptions {
        StructuralOptions {
            chains: 2,
            draws: 10,
            burn_in: 10,
            rhat_threshold: 100.0,
            ..StructuralOptions::default()
        }
    }

    #[test]
    fn options_validation_rejects_bad_configurations() {
        let single_chain = StructuralOptions { chains: 1, ..StructuralOptions::default() };
        assert!(matches!(
            single_chain.validate(),
            Err(FitError::InvalidSamplerOptions { .. })
        ));

        let flat_prior = StructuralOptions { prior_shape: 1.0, ..StructuralOptions::default() };
        assert!(matches!(
            flat_prior.validate(),
            Err(FitError::InvalidSamplerOptions { .. })
        ));

        let low_gate =
            StructuralOptions { rhat_threshold: 0.5, ..StructuralOptions::default() };
        assert!(matches!(
            low_gate.validate(),
            Err(FitError::InvalidSamplerOptions { .. })
        ));

        assert!(StructuralOptions::default().validate().is_ok());
    }

    #[test]
    fn fit_rejects_constant_series() {
        let start = Quarter::new(2012, 1);
        let pairs: Vec<(Quarter, f64)> = (0..16)
            .map(|i| (Quarter::from_ordinal(start.ordinal() + i as i64), 3.0))
            .collect();
        let series = QuarterlySeries::new(pairs).unwrap();
        let spec = StructuralSpec { options: quick_options() };
        assert!(matches!(spec.fit(&series), Err(FitError::DegenerateSeries { .. })));
    }

    #[test]
    // Purpose
    // -------
    // Pin split R-hat behavior on hand-built sequences.
    //
    // Given
    // -----
    // - Two identical noisy sequences, then two sequences with means far
    //   apart relative to their spread.
    //
    // Expect
    // ------
    // - R-hat near 1 in the first case, well above 1.2 in the second.
    fn split_rhat_separates_mixed_from_unmixed_sequences() {
        let noise: Vec<f64> = (0..20).map(|i| (i as f64 * 1.3).sin() * 0.1).collect();
        let mixed = vec![noise.clone(), noise.clone()];
        assert!(split_rhat(&mixed) < 1.05);

        let low: Vec<f64> = noise.iter().map(|x| x + 0.0).collect();
        let high: Vec<f64> = noise.iter().map(|x| x + 10.0).collect();
        let unmixed = vec![low, high];
        assert!(split_rhat(&unmixed) > 1.2);
    }

    #[test]
    // Purpose
    // -------
    // Run a short sampler and verify the posterior container shapes and
    // index alignment.
    fn fit_produces_well_shaped_posterior() {
        let series = synthetic_series(32);
        let spec = StructuralSpec { options: quick_options() };

        let fit = spec.fit(&series).unwrap();
        let posterior = fit.posterior();

        assert_eq!(posterior.chains().len(), 2);
        assert_eq!(posterior.n_draws(), 20);
        assert_eq!(posterior.periods().len(), 32);
        for chain in posterior.chains() {
            assert_eq!(chain.level.dim(), (10, 32));
            assert_eq!(chain.trend.dim(), (10, 32));
            assert_eq!(chain.seasonal.dim(), (10, 32));
            assert_eq!(chain.variances.dim(), (10, 4));
            for &v in chain.variances.iter() {
                assert!(v.is_finite() && v > 0.0);
            }
        }

        let means = posterior.component_means();
        assert_eq!(means.level.len(), 32);
        assert_eq!(means.trend.len(), 32);
        assert_eq!(means.seasonal.len(), 32);
        // The level should track the data's scale, not the standardized one.
        assert!(means.level[31] > 5.0);
    }

    #[test]
    // Purpose
    // -------
    // An R-hat threshold of exactly 1.0 is unattainable for finite noisy
    // chains, so the gate must reject the fit as unconverged.
    fn rhat_gate_rejects_at_unit_threshold() {
        let series = synthetic_series(32);
        let options = StructuralOptions { rhat_threshold: 1.0, ..quick_options() };
        let spec = StructuralSpec { options };

        match spec.fit(&series) {
            Err(FitError::ChainsNotConverged { rhat, threshold }) => {
                assert!(rhat > 1.0);
                assert!((threshold - 1.0).abs() < 1e-12);
            }
            other => panic!("expected ChainsNotConverged, got {other:?}"),
        }
    }

    #[test]
    fn simulate_paths_shape_and_reproducibility() {
        let series = synthetic_series(32);
        let spec = StructuralSpec { options: quick_options() };
        let fit = spec.fit(&series).unwrap();

        let a = fit.simulate_paths(6, 15, 42).unwrap();
        let b = fit.simulate_paths(6, 15, 42).unwrap();
        let c = fit.simulate_paths(6, 15, 7).unwrap();

        assert_eq!(a.dim(), (15, 6));
        assert_eq!(a, b);
        assert_ne!(a, c);
        for &v in a.iter() {
            assert!(v.is_finite());
        }
    }
}
