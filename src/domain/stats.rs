use serde::Serialize;
use serde_json::Value;

/// Where the CPU figure came from. The engine has shipped both a flat
/// `cpu_percent` and a nested `cpu.percent`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CpuReading {
    Flat(f64),
    Nested(f64),
    Unknown,
}

impl CpuReading {
    pub fn from_value(raw: &Value) -> Self {
        if let Some(percent) = raw.get("cpu_percent").and_then(number) {
            return Self::Flat(percent);
        }
        match raw.get("cpu").and_then(|cpu| cpu.get("percent")).and_then(number) {
            Some(percent) => Self::Nested(percent),
            None => Self::Unknown,
        }
    }

    pub fn percent(self) -> Option<f64> {
        match self {
            Self::Flat(p) | Self::Nested(p) => Some(p),
            Self::Unknown => None,
        }
    }
}

/// Normalized resource usage. Absent values stay `None`: "no data" is not
/// "zero load".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub cpu_percent: Option<f64>,
    pub memory_usage: Option<f64>,
    pub memory_limit: Option<f64>,
    pub memory_percent: Option<f64>,
}

impl StatsSnapshot {
    pub fn normalize(raw: &Value) -> Self {
        Self {
            cpu_percent: CpuReading::from_value(raw).percent(),
            memory_usage: first_number(raw, &["memory_usage", "mem_usage"]),
            memory_limit: first_number(raw, &["memory_limit", "mem_limit"]),
            memory_percent: first_number(raw, &["memory_percent", "mem_percent"]),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cpu_percent.is_none()
            && self.memory_usage.is_none()
            && self.memory_limit.is_none()
            && self.memory_percent.is_none()
    }
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn first_number(raw: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| raw.get(*key).and_then(number))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flat_cpu_percent() {
        let stats = StatsSnapshot::normalize(&json!({"cpu_percent": 12}));
        assert_eq!(stats.cpu_percent, Some(12.0));
    }

    #[test]
    fn test_nested_cpu_percent() {
        let stats = StatsSnapshot::normalize(&json!({"cpu": {"percent": 7}}));
        assert_eq!(stats.cpu_percent, Some(7.0));
    }

    #[test]
    fn test_missing_cpu_is_absent_not_zero() {
        let stats = StatsSnapshot::normalize(&json!({}));
        assert_eq!(stats.cpu_percent, None);
        assert!(stats.is_empty());
    }

    #[test]
    fn test_flat_zero_wins_over_nested() {
        let reading = CpuReading::from_value(&json!({"cpu_percent": 0, "cpu": {"percent": 50}}));
        assert_eq!(reading, CpuReading::Flat(0.0));
    }

    #[test]
    fn test_null_flat_falls_back_to_nested() {
        let reading =
            CpuReading::from_value(&json!({"cpu_percent": null, "cpu": {"percent": 3.5}}));
        assert_eq!(reading, CpuReading::Nested(3.5));
    }

    #[test]
    fn test_memory_aliases() {
        let stats = StatsSnapshot::normalize(&json!({
            "cpu_percent": 1.25,
            "mem_usage": 120.5,
            "mem_limit": "512",
            "mem_percent": 23.53
        }));
        assert_eq!(stats.memory_usage, Some(120.5));
        assert_eq!(stats.memory_limit, Some(512.0));
        assert_eq!(stats.memory_percent, Some(23.53));
    }

    #[test]
    fn test_non_object_payload_is_unknown() {
        let stats = StatsSnapshot::normalize(&json!("busy"));
        assert!(stats.is_empty());
    }
}
