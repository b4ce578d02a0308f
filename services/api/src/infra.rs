use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use wikijury::leaderboard::DataType;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn parse_data_type(raw: &str) -> Result<DataType, String> {
    raw.parse::<DataType>().map_err(|err| err.to_string())
}

/// Parses a `criterion=value` pair; the criterion may be a French label.
pub(crate) fn parse_weight(raw: &str) -> Result<(String, f64), String> {
    let (label, value) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected criterion=value, got '{raw}'"))?;
    let label = label.trim();
    if label.is_empty() {
        return Err(format!("missing criterion name in '{raw}'"));
    }

    let weight = value
        .trim()
        .replace(',', ".")
        .parse::<f64>()
        .map_err(|err| format!("failed to parse weight '{}' ({err})", value.trim()))?;
    if !weight.is_finite() {
        return Err(format!("weight for '{label}' must be a finite number"));
    }

    Ok((label.to_string(), weight))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_accept_labels_and_decimal_commas() {
        assert_eq!(
            parse_weight("Octets ajoutés = 1,5"),
            Ok(("Octets ajoutés".to_string(), 1.5))
        );
        assert_eq!(parse_weight("upload_count=3"), Ok(("upload_count".to_string(), 3.0)));
    }

    #[test]
    fn malformed_weights_are_rejected() {
        assert!(parse_weight("upload_count").is_err());
        assert!(parse_weight("=2").is_err());
        assert!(parse_weight("upload_count=lots").is_err());
        assert!(parse_weight("upload_count=inf").is_err());
    }

    #[test]
    fn data_types_accept_french_names() {
        assert_eq!(parse_data_type("téléversements"), Ok(DataType::Commons));
        assert!(parse_data_type("pageviews").is_err());
    }
}
