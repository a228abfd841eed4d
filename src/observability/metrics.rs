use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub notifications_total: IntCounterVec,
    pub sla_warnings_total: IntCounterVec,
    pub orders_preparing: IntGauge,
    pub sla_tick_duration_seconds: Histogram,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let notifications_total = IntCounterVec::new(
            Opts::new("notifications_total", "Push notifications by kind and outcome"),
            &["kind", "outcome"],
        )
        .expect("valid notifications_total metric");

        let sla_warnings_total = IntCounterVec::new(
            Opts::new("sla_warnings_total", "SLA warnings fired by threshold"),
            &["threshold"],
        )
        .expect("valid sla_warnings_total metric");

        let orders_preparing =
            IntGauge::new("orders_preparing", "Orders currently in preparing status")
                .expect("valid orders_preparing metric");

        let sla_tick_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "sla_tick_duration_seconds",
            "Duration of one SLA monitor tick in seconds",
        ))
        .expect("valid sla_tick_duration_seconds metric");

        registry
            .register(Box::new(notifications_total.clone()))
            .expect("register notifications_total");
        registry
            .register(Box::new(sla_warnings_total.clone()))
            .expect("register sla_warnings_total");
        registry
            .register(Box::new(orders_preparing.clone()))
            .expect("register orders_preparing");
        registry
            .register(Box::new(sla_tick_duration_seconds.clone()))
            .expect("register sla_tick_duration_seconds");

        Self {
            registry,
            notifications_total,
            sla_warnings_total,
            orders_preparing,
            sla_tick_duration_seconds,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}
