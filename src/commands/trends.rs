use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use shiftlog::analytics::{TrendEngine, TrendReport};
use shiftlog::cache::TranslationCache;
use shiftlog::calendar::{parse_period_spec, period_ending, Period};
use shiftlog::config::{Config, TranslationConfig};
use shiftlog::i18n::t;
use shiftlog::models::SalesAggregate;
use shiftlog::notes::Section;
use shiftlog::translation::Annotator;

use super::{print_json, until_day, App};

#[derive(Serialize)]
struct Summary {
    period: Period,
    #[serde(flatten)]
    aggregate: SalesAggregate,
    avg_ticket: f64,
    avg_daily_sales: f64,
}

#[derive(Serialize)]
struct AnnotatedTrends {
    #[serde(flatten)]
    report: TrendReport,
    annotations: BTreeMap<String, String>,
}

#[derive(Serialize)]
struct PeriodRange {
    period: Period,
    previous: Period,
    days: u64,
}

/// Translation settings with the service switched on, checked again
fn forced_translation(config: &Config) -> Result<TranslationConfig> {
    let mut config = config.clone();
    config.translation.enabled = true;
    config
        .validate()
        .context("Translation cannot be enabled with this configuration")?;
    Ok(config.translation)
}

fn resolve(config: &Config, spec: &str, until: Option<String>) -> Result<Period> {
    let spec = parse_period_spec(spec)?;
    let until = until_day(&config.business_calendar(), until)?;
    Ok(period_ending(until, spec)?)
}

pub fn summary(app: &App, spec: &str, until: Option<String>) -> Result<()> {
    let period = resolve(&app.config, spec, until)?;
    let aggregate = app
        .repo
        .sum_records(&period)
        .with_context(|| format!("Failed to sum records for {period}"))?;

    tracing::info!(period = %period, days = aggregate.days_reported, "Summarized sales");
    print_json(&Summary {
        period,
        avg_ticket: aggregate.avg_ticket(),
        avg_daily_sales: aggregate.avg_daily_sales(),
        aggregate,
    })
}

pub async fn trends(app: &App, spec: &str, until: Option<String>, translate: bool) -> Result<()> {
    let period = resolve(&app.config, spec, until)?;
    let engine = TrendEngine::from_config(&app.config);
    let report = engine.section_report(app.repo.as_ref(), &period)?;

    if report.notes == 0 {
        eprintln!("{}", t!("cli.trends.empty", period = period.to_string()));
    }

    let mut annotations = BTreeMap::new();
    if translate {
        let translation = forced_translation(&app.config)?;
        let annotator = Annotator::from_config(&translation, Arc::new(TranslationCache::new()))?;

        let phrases: Vec<&str> = report
            .sections
            .iter()
            .flat_map(|section| section.top.iter().map(|delta| delta.phrase.as_str()))
            .collect();
        let annotated = annotator.annotate_all(phrases.iter().copied()).await;
        for (phrase, annotation) in phrases.into_iter().zip(annotated) {
            if annotation != phrase {
                annotations.insert(phrase.to_string(), annotation);
            }
        }
    }

    print_json(&AnnotatedTrends {
        report,
        annotations,
    })
}

pub fn spikes(app: &App, section: &str, spec: &str, until: Option<String>) -> Result<()> {
    let section = Section::from_key(section)
        .with_context(|| format!("Unknown section {section:?} (incidents, staff, soldout, complaints)"))?;
    let spec = parse_period_spec(spec)?;
    let until = until_day(&app.calendar, until)?;

    let engine = TrendEngine::from_config(&app.config);
    let spikes = engine.spikes(app.repo.as_ref(), until, spec, section)?;

    if spikes.is_empty() {
        let period = period_ending(until, spec)?;
        eprintln!(
            "{}",
            t!(
                "cli.trends.spikes_empty",
                previous = period.previous()?.to_string(),
                period = period.to_string()
            )
        );
    }
    print_json(&spikes)
}

pub fn period(config: &Config, spec: &str, until: Option<String>) -> Result<()> {
    let period = resolve(config, spec, until)?;
    print_json(&PeriodRange {
        previous: period.previous()?,
        days: period.len_days(),
        period,
    })
}
