//! Metrics definitions for the feed.

use shared::metrics_defs::{MetricDef, MetricType};

pub const FEED_REQUESTS: MetricDef = MetricDef {
    name: "feed.requests",
    metric_type: MetricType::Counter,
    description: "Number of feed requests, labelled by response status",
};

pub const UPSTREAM_PAGES: MetricDef = MetricDef {
    name: "feed.upstream.pages",
    metric_type: MetricType::Counter,
    description: "Number of pages fetched from the Notion query API",
};

pub const UPSTREAM_DURATION: MetricDef = MetricDef {
    name: "feed.upstream.duration",
    metric_type: MetricType::Histogram,
    description: "Time to page through a Notion database query in seconds",
};

pub const FEED_ITEMS: MetricDef = MetricDef {
    name: "feed.items",
    metric_type: MetricType::Histogram,
    description: "Number of media items returned per feed response",
};

pub const ALL_METRICS: &[MetricDef] = &[
    FEED_REQUESTS,
    UPSTREAM_PAGES,
    UPSTREAM_DURATION,
    FEED_ITEMS,
];
