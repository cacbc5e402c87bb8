use dose_sweep::{Simulation, SweepError};
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

pub struct SweepMetrics {
    pub forecast_calls_total: IntCounterVec,
    pub forecast_call_seconds: Histogram,
    pub sweep_candidates: IntGauge,
    pub sweeps_total: IntCounterVec,
}

impl SweepMetrics {
    pub fn new(registry: &Registry) -> prometheus::Result<Self> {
        let forecast_calls_total = IntCounterVec::new(
            Opts::new("forecast_calls_total", "Forecast engine calls by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(forecast_calls_total.clone()))?;

        let forecast_call_seconds = Histogram::with_opts(
            HistogramOpts::new("forecast_call_seconds", "Forecast engine call latency")
                .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        )?;
        registry.register(Box::new(forecast_call_seconds.clone()))?;

        let sweep_candidates = IntGauge::new(
            "sweep_candidates",
            "Candidate doses in the most recent sweep",
        )?;
        registry.register(Box::new(sweep_candidates.clone()))?;

        let sweeps_total = IntCounterVec::new(
            Opts::new("sweeps_total", "Dose sweeps by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(sweeps_total.clone()))?;

        Ok(Self {
            forecast_calls_total,
            forecast_call_seconds,
            sweep_candidates,
            sweeps_total,
        })
    }

    pub fn observe_call(&self, outcome: &str, seconds: f64) {
        self.forecast_call_seconds.observe(seconds);
        self.forecast_calls_total
            .with_label_values(&[outcome])
            .inc();
    }

    pub fn observe_sweep(&self, result: &Result<Simulation, SweepError>) {
        let outcome = match result {
            Ok(simulation) => {
                self.sweep_candidates.set(simulation.plan.len() as i64);
                "ok"
            }
            Err(err) if err.is_malformed_scenario() => "malformed_scenario",
            Err(err) if err.is_engine_failure() => "engine_failure",
            Err(_) => "error",
        };
        self.sweeps_total.with_label_values(&[outcome]).inc();
    }
}

pub fn encode_text(registry: &Registry) -> prometheus::Result<String> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|err| prometheus::Error::Msg(err.to_string()))
}
