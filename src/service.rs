//! Orchestration of cache, training, forecasting and reconciliation.

use crate::core::{
    Degradation, ForecastMetrics, ForecastOptions, ForecastRequest, ForecastResponse,
    LinearModel, Observation, SeriesId,
};
use crate::features::{assemble_window, DesignMatrix, FeatureBuilder};
use crate::forecast::{
    Anchor, FittedLinearStrategy, ForecastError, ForecastStrategy, NaiveDriftStrategy,
    RecursiveForecaster,
};
use crate::inference::{blend_toward_observed, reconcile_observed, BandPolicy};
use crate::solvers::{degradation_for, evaluate, RegressionTrainer};
use crate::store::{CacheKey, Clock, ModelStore, ResponseCache, StoreError};
use log::{debug, info, warn};

/// Serves forecasts for many series from one cache and one model store.
///
/// Methods take `&mut self`: callers are expected to serialize requests, in
/// particular concurrent train-and-forecast passes for the same series.
/// Store failures are logged and never fail a forecast.
#[derive(Debug)]
pub struct ForecastService<R, M, C>
where
    R: ResponseCache,
    M: ModelStore,
    C: Clock,
{
    options: ForecastOptions,
    cache: R,
    models: M,
    clock: C,
    trainer: RegressionTrainer,
}

impl<R, M, C> ForecastService<R, M, C>
where
    R: ResponseCache,
    M: ModelStore,
    C: Clock,
{
    pub fn new(options: ForecastOptions, cache: R, models: M, clock: C) -> Self {
        Self {
            options,
            cache,
            models,
            clock,
            trainer: RegressionTrainer::new(),
        }
    }

    pub fn options(&self) -> &ForecastOptions {
        &self.options
    }

    pub fn cache(&self) -> &R {
        &self.cache
    }

    pub fn models(&self) -> &M {
        &self.models
    }

    /// The live model for a series, if one has been trained.
    pub fn model(&self, series_id: &SeriesId) -> Result<Option<LinearModel>, StoreError> {
        self.models.load(series_id)
    }

    /// Drop the cached response for a series.
    pub fn invalidate(&mut self, series_id: &SeriesId) -> Result<(), StoreError> {
        self.cache.invalidate(series_id)
    }

    /// Return a forecast for `request`, from cache when fresh.
    ///
    /// A cached response is served only to a request with the same horizon,
    /// window, target mode and current reading. `force_recompute` skips the
    /// cache read but still refreshes the entry. Requests are rejected only
    /// when no observation carries a usable AQI.
    pub fn forecast(&mut self, request: &ForecastRequest) -> Result<ForecastResponse, ForecastError> {
        let id = &request.series_id;
        let key = CacheKey::for_request(request);

        if !request.force_recompute {
            match self.cache.read(id, &key) {
                Ok(Some(cached)) => {
                    debug!("{}: serving cached forecast", id);
                    return Ok(cached);
                }
                Ok(None) => debug!("{}: cache miss", id),
                Err(e) => warn!("{}: cache read failed: {}", id, e),
            }
        }

        let response = self.compute(request)?;
        if let Err(e) = self.cache.write(id, &key, &response, self.options.cache_ttl()) {
            warn!("{}: cache write failed: {}", id, e);
        }
        Ok(response)
    }

    /// Train (or reuse) a model and forecast, bypassing the cache entirely.
    pub fn compute(&mut self, request: &ForecastRequest) -> Result<ForecastResponse, ForecastError> {
        let id = &request.series_id;
        let now = self.clock.now();
        let mut degradations = Vec::new();

        let window = assemble_window(
            id,
            &request.history,
            request.current_observed.as_ref(),
            request.window_size,
        );

        let truth = request.current_observed.as_ref().and_then(|o| {
            o.resolved_aqi().map(|aqi| Anchor {
                timestamp: o.timestamp,
                aqi,
            })
        });
        let anchor = match truth {
            Some(anchor) => anchor,
            None if window.is_empty() => return Err(ForecastError::EmptySeries(id.clone())),
            None => {
                let fallback = last_known_anchor(&window)
                    .ok_or_else(|| ForecastError::NoResolvableAqi(id.clone()))?;
                warn!(
                    "{}: no current reading, point 0 uses the last historical AQI {} at {}",
                    id, fallback.aqi, fallback.timestamp
                );
                degradations.push(Degradation::MissingObservedReading);
                fallback
            }
        };
        // Exogenous channels come from the newest record that carries a reading.
        let exogenous = window
            .iter()
            .rev()
            .find(|o| o.resolved_aqi().is_some())
            .cloned()
            .ok_or_else(|| ForecastError::NoResolvableAqi(id.clone()))?;

        let design = FeatureBuilder::with_delta_mode(request.delta_mode).build(&window);
        let (model, metrics) = self.select_model(request, &design, now, &mut degradations);

        let forecaster =
            RecursiveForecaster::new(request.horizon, BandPolicy::from_options(&self.options));
        let naive = NaiveDriftStrategy::new(id, self.options.fallback_jitter);
        let fitted = model
            .as_ref()
            .map(|m| FittedLinearStrategy::new(m, &design.feature_order))
            .transpose()?;
        let strategy: &dyn ForecastStrategy = match &fitted {
            Some(s) => s,
            None => &naive,
        };

        let mut points = forecaster.forecast(strategy, &anchor, &exogenous);
        reconcile_observed(&mut points, truth.map(|a| a.aqi));
        blend_toward_observed(&mut points, self.options.blend_steps);

        let response = ForecastResponse {
            series_id: id.clone(),
            horizon: request.horizon,
            points,
            metrics,
            strategy: strategy.kind(),
            degradations,
            generated_at: now,
            cached: false,
        };
        debug_assert!(response.validate().is_ok());
        Ok(response)
    }

    /// Pick the model to forecast with: the stored one when reuse is requested
    /// and its layout still matches, otherwise a fresh fit. A window without
    /// training rows never gets a model.
    fn select_model(
        &mut self,
        request: &ForecastRequest,
        design: &DesignMatrix,
        now: chrono::DateTime<chrono::Utc>,
        degradations: &mut Vec<Degradation>,
    ) -> (Option<LinearModel>, ForecastMetrics) {
        let id = &request.series_id;

        if design.is_empty() {
            info!("{}: no training rows, using naive fallback", id);
            degradations.push(Degradation::InsufficientData { rows: 0 });
            return (None, ForecastMetrics::default());
        }

        if request.reuse_model {
            match self.models.load(id) {
                Ok(Some(stored)) if !stored.accepts(&design.feature_order) => {
                    warn!(
                        "{}: stored model layout {:?} does not match window, retraining",
                        id,
                        stored.feature_order.features()
                    );
                    degradations.push(Degradation::FeatureShapeMismatch);
                }
                Ok(Some(stored)) if stored.delta_mode() != request.delta_mode => {
                    warn!(
                        "{}: stored model targets {:?}, request wants delta_mode={}, retraining",
                        id, stored.target, request.delta_mode
                    );
                    degradations.push(Degradation::TargetModeMismatch);
                }
                Ok(Some(stored)) => {
                    debug!("{}: reusing model trained at {}", id, stored.trained_at);
                    let metrics = evaluate(&stored, design).metrics;
                    return (Some(stored), metrics);
                }
                Ok(None) => debug!("{}: no stored model to reuse", id),
                Err(e) => warn!("{}: model load failed: {}", id, e),
            }
        }

        match self.trainer.train(id, design, now) {
            Ok(trained) => {
                if let Err(e) = self.models.persist(&trained.model) {
                    warn!("{}: model persist failed: {}", id, e);
                }
                (Some(trained.model), trained.metrics)
            }
            Err(e) => {
                info!("{}: no model ({}), using naive fallback", id, e);
                degradations.push(degradation_for(&e, design.n_rows()));
                (None, ForecastMetrics::default())
            }
        }
    }
}

/// The newest observation in `window` with a resolvable AQI.
fn last_known_anchor(window: &[Observation]) -> Option<Anchor> {
    window.iter().rev().find_map(|o| {
        o.resolved_aqi().map(|aqi| Anchor {
            timestamp: o.timestamp,
            aqi,
        })
    })
}
