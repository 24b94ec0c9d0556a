// Recomputes every enabled indicator over the full candle series
use crate::data::CandleSeries;
use crate::indicators::{Ema, IndicatorCalculator, Macd, Rsi, Sma};
use shared::models::{IndicatorResult, IndicatorSettings};

pub struct IndicatorEngine;

impl IndicatorEngine {
    /// Disabled indicators come back as `None`. No results are cached between
    /// calls, so the output depends only on `series` and `settings`.
    pub fn compute(series: &CandleSeries, settings: &IndicatorSettings) -> IndicatorResult {
        let data = series.candles();
        IndicatorResult {
            rsi: settings
                .rsi
                .enabled
                .then(|| run(&Rsi::new(settings.rsi.period, settings.rsi.overbought, settings.rsi.oversold), data)),
            macd: settings.macd.enabled.then(|| {
                run(
                    &Macd::new(settings.macd.fast_period, settings.macd.slow_period, settings.macd.signal_period),
                    data,
                )
            }),
            sma: settings.sma.enabled.then(|| run(&Sma::new(settings.sma.period), data)),
            ema: settings.ema.enabled.then(|| run(&Ema::new(settings.ema.period), data)),
        }
    }
}

fn run<C: IndicatorCalculator>(calculator: &C, data: &[shared::models::Candle]) -> C::Output {
    tracing::trace!(
        indicator = %calculator.name(),
        parameters = %calculator.parameters(),
        candles = data.len(),
        "Computing indicator"
    );
    calculator.calculate(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_support::{candles_from_closes, SCENARIO_CLOSES};
    use shared::models::{MacdSettings, MovingAverageSettings, RsiSettings};

    fn scenario() -> CandleSeries {
        CandleSeries::from_candles(candles_from_closes(&SCENARIO_CLOSES))
    }

    #[test]
    fn test_all_disabled_by_default() {
        let result = IndicatorEngine::compute(&scenario(), &IndicatorSettings::default());
        assert_eq!(result, IndicatorResult::default());
    }

    #[test]
    fn test_enabled_indicators_use_their_own_periods() {
        let settings = IndicatorSettings {
            sma: MovingAverageSettings { enabled: true, period: 3 },
            ema: MovingAverageSettings { enabled: true, period: 3 },
            rsi: RsiSettings { enabled: true, period: 5, ..RsiSettings::default() },
            macd: MacdSettings { enabled: false, ..MacdSettings::default() },
        };
        let result = IndicatorEngine::compute(&scenario(), &settings);

        let sma = result.sma.unwrap();
        assert_eq!(sma.len(), 10);
        assert_eq!(sma[0].value, 11.0);
        assert_eq!(sma[9].value, 14.0);

        let ema = result.ema.unwrap();
        assert_eq!(ema.len(), 10);
        assert_eq!(ema[2].value, 10.5);

        let rsi = result.rsi.unwrap();
        assert_eq!(rsi.values.len(), 7);
        assert_eq!(rsi.overbought, 70.0);
        assert_eq!(rsi.oversold, 30.0);

        assert!(result.macd.is_none());
    }

    #[test]
    fn test_enabled_on_short_series_yields_empty_not_none() {
        let settings = IndicatorSettings {
            macd: MacdSettings { enabled: true, ..MacdSettings::default() },
            ..IndicatorSettings::default()
        };
        let result = IndicatorEngine::compute(&scenario(), &settings);
        assert!(result.macd.unwrap().is_empty());
    }

    #[test]
    fn test_empty_series_clears_curves() {
        let settings = IndicatorSettings { sma: MovingAverageSettings { enabled: true, period: 3 }, ..Default::default() };
        let result = IndicatorEngine::compute(&CandleSeries::new(), &settings);
        assert_eq!(result.sma, Some(Vec::new()));
    }
}
