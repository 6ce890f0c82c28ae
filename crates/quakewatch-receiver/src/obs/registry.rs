//! In-process metric registry.
//!
//! Counter/gauge/histogram families with dynamic labels backed by `DashMap`.
//! Labels are flattened into sorted key vectors to keep deterministic ordering.
//! Each family is a `DashMap` of series, so updates to independent series only
//! contend on a shard lock, and every update of one series happens under that
//! series' entry lock (render reads each series atomically).

use std::fmt;

use dashmap::mapref::entry::Entry;
use dashmap::mapref::one::Ref;
use dashmap::DashMap;

use quakewatch_core::error::{QuakeWatchError, Result};

/// Label set as passed by call sites: `&[("method", "POST"), ...]`.
pub type Labels<'a> = &'a [(&'a str, &'a str)];

type LabelKey = Vec<(String, String)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
    Histogram,
}

impl MetricKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram => "histogram",
        }
    }
}

#[derive(Debug, Clone)]
struct HistogramState {
    bounds: Vec<f64>,
    /// Cumulative: `buckets[i]` counts observations `<= bounds[i]`.
    buckets: Vec<u64>,
    sum: f64,
    count: u64,
}

impl HistogramState {
    fn new(bounds: &[f64]) -> Self {
        Self {
            bounds: bounds.to_vec(),
            buckets: vec![0; bounds.len()],
            sum: 0.0,
            count: 0,
        }
    }

    fn observe(&mut self, value: f64) {
        for (bound, slot) in self.bounds.iter().zip(self.buckets.iter_mut()) {
            if value <= *bound {
                *slot += 1;
            }
        }
        self.sum += value;
        self.count += 1;
    }
}

#[derive(Debug, Clone)]
enum Series {
    Counter(f64),
    Gauge(f64),
    Histogram(HistogramState),
}

struct Family {
    kind: MetricKind,
    help: Option<String>,
    series: DashMap<LabelKey, Series>,
}

impl Family {
    fn new(kind: MetricKind) -> Self {
        Self {
            kind,
            help: None,
            series: DashMap::new(),
        }
    }
}

/// Process-lifetime metric registry. Series are never removed.
#[derive(Default)]
pub struct MetricRegistry {
    families: DashMap<String, Family>,
}

impl MetricRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a family and attach its help text.
    pub fn describe(&self, name: &str, kind: MetricKind, help: &str) -> Result<()> {
        let mut fam = self
            .families
            .entry(name.to_string())
            .or_insert_with(|| Family::new(kind));
        check_kind(name, fam.kind, kind)?;
        fam.help = Some(help.to_string());
        Ok(())
    }

    /// Increment by 1.
    pub fn inc_counter(&self, name: &str, labels: Labels<'_>) -> Result<()> {
        self.increment_counter(name, labels, 1.0)
    }

    /// Increment by a non-negative delta. Creates the series on first use.
    pub fn increment_counter(&self, name: &str, labels: Labels<'_>, delta: f64) -> Result<()> {
        // NaN fails this comparison too.
        if !(delta >= 0.0) {
            return Err(QuakeWatchError::InvalidDelta {
                name: name.to_string(),
                delta,
            });
        }
        self.with_series(
            name,
            MetricKind::Counter,
            labels,
            || Ok(Series::Counter(0.0)),
            |s| {
                if let Series::Counter(v) = s {
                    *v += delta;
                }
                Ok(())
            },
        )
    }

    /// Overwrite the gauge value.
    pub fn set_gauge(&self, name: &str, labels: Labels<'_>, value: f64) -> Result<()> {
        self.with_series(
            name,
            MetricKind::Gauge,
            labels,
            || Ok(Series::Gauge(0.0)),
            |s| {
                if let Series::Gauge(v) = s {
                    *v = value;
                }
                Ok(())
            },
        )
    }

    /// Add a signed delta to the gauge value.
    pub fn add_gauge(&self, name: &str, labels: Labels<'_>, delta: f64) -> Result<()> {
        self.with_series(
            name,
            MetricKind::Gauge,
            labels,
            || Ok(Series::Gauge(0.0)),
            |s| {
                if let Series::Gauge(v) = s {
                    *v += delta;
                }
                Ok(())
            },
        )
    }

    /// Record one observation.
    ///
    /// `buckets` are the finite upper bounds, strictly ascending; `+Inf` is
    /// implicit. They are fixed by the first call for a series and every later
    /// call must pass the same bounds.
    pub fn observe_histogram(
        &self,
        name: &str,
        labels: Labels<'_>,
        value: f64,
        buckets: &[f64],
    ) -> Result<()> {
        self.with_series(
            name,
            MetricKind::Histogram,
            labels,
            || new_histogram(name, buckets),
            |s| {
                if let Series::Histogram(h) = s {
                    if h.bounds != buckets {
                        return Err(QuakeWatchError::BucketMismatch(name.to_string()));
                    }
                    h.observe(value);
                }
                Ok(())
            },
        )
    }

    /// Create an empty histogram series so it renders before the first observation.
    pub fn init_histogram(&self, name: &str, labels: Labels<'_>, buckets: &[f64]) -> Result<()> {
        self.with_series(
            name,
            MetricKind::Histogram,
            labels,
            || new_histogram(name, buckets),
            |s| match s {
                Series::Histogram(h) if h.bounds != buckets => {
                    Err(QuakeWatchError::BucketMismatch(name.to_string()))
                }
                _ => Ok(()),
            },
        )
    }

    /// Point-in-time copy of every series.
    pub fn snapshot(&self) -> Snapshot {
        let mut families: Vec<FamilySnapshot> = self
            .families
            .iter()
            .map(|f| {
                let mut series: Vec<(LabelKey, Series)> = f
                    .series
                    .iter()
                    .map(|s| (s.key().clone(), s.value().clone()))
                    .collect();
                series.sort_by(|a, b| a.0.cmp(&b.0));
                FamilySnapshot {
                    name: f.key().clone(),
                    kind: f.kind,
                    help: f.help.clone(),
                    series,
                }
            })
            .collect();
        families.sort_by(|a, b| a.name.cmp(&b.name));
        Snapshot { families }
    }

    /// Render in Prometheus text exposition format.
    pub fn render(&self) -> String {
        self.snapshot().to_string()
    }

    fn family(&self, name: &str, kind: MetricKind) -> Result<Ref<'_, String, Family>> {
        let fam = match self.families.get(name) {
            Some(fam) => fam,
            None => self
                .families
                .entry(name.to_string())
                .or_insert_with(|| Family::new(kind))
                .downgrade(),
        };
        check_kind(name, fam.kind, kind)?;
        Ok(fam)
    }

    fn with_series<I, U>(
        &self,
        name: &str,
        kind: MetricKind,
        labels: Labels<'_>,
        init: I,
        update: U,
    ) -> Result<()>
    where
        I: FnOnce() -> Result<Series>,
        U: FnOnce(&mut Series) -> Result<()>,
    {
        let fam = self.family(name, kind)?;
        let mut series = match fam.series.entry(label_key(labels)) {
            Entry::Occupied(e) => e.into_ref(),
            Entry::Vacant(e) => e.insert(init()?),
        };
        update(series.value_mut())
    }
}

fn check_kind(name: &str, existing: MetricKind, requested: MetricKind) -> Result<()> {
    if existing != requested {
        return Err(QuakeWatchError::KindMismatch {
            name: name.to_string(),
            existing: existing.as_str(),
            requested: requested.as_str(),
        });
    }
    Ok(())
}

fn new_histogram(name: &str, buckets: &[f64]) -> Result<Series> {
    let finite = buckets.iter().all(|b| b.is_finite());
    let ascending = buckets.windows(2).all(|w| w[0] < w[1]);
    if !finite || !ascending {
        return Err(QuakeWatchError::InvalidBuckets(name.to_string()));
    }
    Ok(Series::Histogram(HistogramState::new(buckets)))
}

fn label_key(labels: Labels<'_>) -> LabelKey {
    let mut key: LabelKey = labels
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    key.sort();
    key
}

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

/// Prometheus float formatting: `1.0`, `0.25`, `+Inf`, `NaN`.
fn fmt_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".into()
    } else if v == f64::INFINITY {
        "+Inf".into()
    } else if v == f64::NEG_INFINITY {
        "-Inf".into()
    } else if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}

fn label_str(key: &LabelKey, extra: Option<(&str, &str)>) -> String {
    let mut parts: Vec<String> = key
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect();
    if let Some((k, v)) = extra {
        parts.push(format!("{}=\"{}\"", k, escape_label(v)));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!("{{{}}}", parts.join(","))
    }
}

struct FamilySnapshot {
    name: String,
    kind: MetricKind,
    help: Option<String>,
    series: Vec<(LabelKey, Series)>,
}

/// Copied registry state; formatting happens when it is displayed.
pub struct Snapshot {
    families: Vec<FamilySnapshot>,
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for fam in &self.families {
            let name = &fam.name;
            if let Some(help) = &fam.help {
                writeln!(f, "# HELP {} {}", name, escape_help(help))?;
            }
            writeln!(f, "# TYPE {} {}", name, fam.kind.as_str())?;
            for (key, series) in &fam.series {
                match series {
                    Series::Counter(v) | Series::Gauge(v) => {
                        writeln!(f, "{}{} {}", name, label_str(key, None), fmt_value(*v))?;
                    }
                    Series::Histogram(h) => {
                        // Cumulative buckets, then the implicit +Inf bucket.
                        for (bound, count) in h.bounds.iter().zip(&h.buckets) {
                            let le = fmt_value(*bound);
                            writeln!(f, "{}_bucket{} {}", name, label_str(key, Some(("le", &le))), count)?;
                        }
                        writeln!(f, "{}_bucket{} {}", name, label_str(key, Some(("le", "+Inf"))), h.count)?;
                        writeln!(f, "{}_sum{} {}", name, label_str(key, None), fmt_value(h.sum))?;
                        writeln!(f, "{}_count{} {}", name, label_str(key, None), h.count)?;
                    }
                }
            }
        }
        Ok(())
    }
}
