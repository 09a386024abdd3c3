use axum::routing::get;
use axum_prometheus::PrometheusMetricLayer;
use once_cell::sync::Lazy;
use prometheus::{Encoder, Opts, TextEncoder};

/// Register additional metrics of our own structs by using this registry instance.
static REGISTRY: Lazy<Registry> = Lazy::new(|| Registry(prometheus::Registry::new()));

pub static CMD_START_COUNTER: Lazy<Counter> = Lazy::new(|| {
    Counter::new("command_start", Opts::new("command_start_usage_total", "count of /start and /help invocations"))
});
pub static CMD_ADD_GROUP_COUNTER: Lazy<Counter> = Lazy::new(|| {
    Counter::new("command_addgroup", Opts::new("command_addgroup_usage_total", "count of /addgroup invocations"))
});
pub static CMD_DEL_GROUP_COUNTER: Lazy<Counter> = Lazy::new(|| {
    Counter::new("command_delgroup", Opts::new("command_delgroup_usage_total", "count of /delgroup invocations"))
});
pub static CMD_GROUPS_COUNTER: Lazy<Counter> = Lazy::new(|| {
    Counter::new("command_groups", Opts::new("command_groups_usage_total", "count of /groups invocations"))
});
pub static CMD_PENDING_COUNTER: Lazy<Counter> = Lazy::new(|| {
    Counter::new("command_pending", Opts::new("command_pending_usage_total", "count of /pending invocations"))
});
pub static CMD_STATS_COUNTER: Lazy<Counter> = Lazy::new(|| {
    Counter::new("command_stats", Opts::new("command_stats_usage_total", "count of /stats invocations"))
});
pub static CMD_GRAPH_COUNTER: Lazy<Counter> = Lazy::new(|| {
    Counter::new("command_graph", Opts::new("command_graph_usage_total", "count of /graph invocations"))
});
pub static SUBMISSIONS_COUNTER: Lazy<ComplexCommandCounters> = Lazy::new(|| {
    let opts = Opts::new("submissions_total", "count of received and queued submissions");
    ComplexCommandCounters {
        invoked: Counter::new("submissions (received)", opts.clone().const_label("state", "received")),
        finished: Counter::new("submissions (queued)", opts.const_label("state", "queued")),
    }
});
pub static APPROVAL_COUNTER: Lazy<ComplexCommandCounters> = Lazy::new(|| {
    let opts = Opts::new("approvals_total", "count of approval callbacks and completed broadcasts");
    ComplexCommandCounters {
        invoked: Counter::new("approvals (invoked)", opts.clone().const_label("state", "invoked")),
        finished: Counter::new("approvals (finished)", opts.const_label("state", "finished")),
    }
});
pub static BROADCAST_FAILURES: Lazy<Counter> = Lazy::new(|| {
    Counter::new("broadcast_failures", Opts::new("broadcast_failures_total", "count of per-destination broadcast failures"))
});

pub fn init() -> axum::Router {
    let prometheus = REGISTRY
        .register(&CMD_START_COUNTER)
        .register(&CMD_ADD_GROUP_COUNTER)
        .register(&CMD_DEL_GROUP_COUNTER)
        .register(&CMD_GROUPS_COUNTER)
        .register(&CMD_PENDING_COUNTER)
        .register(&CMD_STATS_COUNTER)
        .register(&CMD_GRAPH_COUNTER)
        .register(&SUBMISSIONS_COUNTER.invoked)
        .register(&SUBMISSIONS_COUNTER.finished)
        .register(&APPROVAL_COUNTER.invoked)
        .register(&APPROVAL_COUNTER.finished)
        .register(&BROADCAST_FAILURES)
        .unwrap();

    let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
    axum::Router::new()
        .route("/metrics", get(|| async move {
            let mut buffer = vec![];
            let metrics = prometheus.gather();
            TextEncoder::new().encode(&metrics, &mut buffer).unwrap();
            let custom_metrics = String::from_utf8(buffer).unwrap();

            metric_handle.render() + custom_metrics.as_str()
        }))
        .layer(prometheus_layer)
}

pub struct Counter {
    inner: prometheus::Counter,
    name: String
}

pub struct ComplexCommandCounters {
    invoked: Counter,
    finished: Counter,
}

struct Registry(prometheus::Registry);

impl Counter {
    fn new(name: &str, opts: Opts) -> Counter {
        let c = prometheus::Counter::with_opts(opts)
            .unwrap_or_else(|e| panic!("unable to create {name} counter: {e}"));
        Counter { inner: c, name: name.to_string() }
    }

    pub fn inc(&self) {
        self.inner.inc()
    }
}

impl ComplexCommandCounters {
    pub fn invoked(&self) {
        self.invoked.inc()
    }

    pub fn finished(&self) {
        self.finished.inc()
    }
}

impl Registry {
    fn register(&self, counter: &Counter) -> &Self {
        self.0.register(Box::new(counter.inner.clone()))
            .unwrap_or_else(|e| panic!("unable to register the {} counter: {e}", counter.name));
        self
    }

    fn unwrap(&self) -> prometheus::Registry {
        self.0.clone()
    }
}
