use std::fmt;
use wikibase_model::{DataValue, Snak, SnakType};

/// Renders snak values into strings that compare equal exactly when the
/// server would consider the values equal.
pub trait ValueResolver: Send + Sync + fmt::Debug {
    fn comparable(&self, snak: &Snak, wikibase_url: &str) -> String;
}

/// Resolver for the built-in Wikibase value kinds.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardValueResolver;

impl ValueResolver for StandardValueResolver {
    fn comparable(&self, snak: &Snak, wikibase_url: &str) -> String {
        match (snak.snaktype, &snak.datavalue) {
            (SnakType::SomeValue, _) => "somevalue".to_string(),
            (SnakType::NoValue, _) => "novalue".to_string(),
            (SnakType::Value, None) => "value:".to_string(),
            (SnakType::Value, Some(value)) => render(value, wikibase_url),
        }
    }
}

fn render(value: &DataValue, wikibase_url: &str) -> String {
    match value {
        DataValue::String(s) => format!("string:{s}"),
        DataValue::EntityId(v) => {
            let id = v.resolved_id().unwrap_or_default();
            format!("entity:{}", strip_concept_uri(&id, wikibase_url))
        }
        DataValue::Quantity(q) => format!(
            "quantity:{}|{}|{}|{}",
            strip_sign(&q.amount),
            unit_id(&q.unit),
            q.upper_bound.as_deref().map(strip_sign).unwrap_or_default(),
            q.lower_bound.as_deref().map(strip_sign).unwrap_or_default(),
        ),
        DataValue::Time(t) => format!(
            "time:{}|{}|{}",
            strip_sign(&t.time),
            t.precision,
            unit_id(&t.calendarmodel)
        ),
        DataValue::MonolingualText(m) => format!("text:{}:{}", m.language, m.text),
        DataValue::GlobeCoordinate(g) => format!(
            "globe:{}|{}|{}|{}",
            g.latitude,
            g.longitude,
            g.precision.map(|p| p.to_string()).unwrap_or_default(),
            unit_id(&g.globe)
        ),
    }
}

fn strip_sign(value: &str) -> &str {
    value.strip_prefix('+').unwrap_or(value)
}

fn strip_concept_uri<'a>(id: &'a str, wikibase_url: &str) -> &'a str {
    let base = wikibase_url.trim_end_matches('/');
    id.strip_prefix(base)
        .and_then(|rest| rest.strip_prefix("/entity/"))
        .unwrap_or(id)
}

/// `http://www.wikidata.org/entity/Q11573` → `Q11573`; `"1"` stays `"1"`.
fn unit_id(unit: &str) -> &str {
    unit.rsplit('/').next().unwrap_or(unit)
}
