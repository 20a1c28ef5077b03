//! Health report and its renderings

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    Ok,
    Warn,
    Fail,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Warn => "WARN",
            Self::Fail => "FAIL",
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // pad() so width/alignment specifiers apply
        f.pad(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HealthItem {
    pub check: String,
    pub status: HealthStatus,
    pub detail: String,
    pub elapsed_ms: Option<f64>,
}

#[derive(Clone, Debug, Default)]
pub struct HealthReport {
    pub items: Vec<HealthItem>,
    pub fatal: bool,
}

impl HealthReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a result. A fatal check that is not OK marks the whole run fatal.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        status: HealthStatus,
        detail: impl Into<String>,
        fatal: bool,
        elapsed_ms: Option<f64>,
    ) {
        self.items.push(HealthItem {
            check: name.into(),
            status,
            detail: detail.into(),
            elapsed_ms,
        });
        if fatal && status != HealthStatus::Ok {
            self.fatal = true;
        }
    }

    pub fn has_warn(&self) -> bool {
        self.items.iter().any(|i| i.status == HealthStatus::Warn)
    }

    pub fn get(&self, check: &str) -> Option<&HealthItem> {
        self.items.iter().find(|i| i.check == check)
    }

    pub fn exit_code(&self) -> i32 {
        if self.fatal {
            1
        } else {
            0
        }
    }

    /// Aligned plain text, one line per check.
    pub fn render(&self) -> String {
        let width = self.items.iter().map(|i| i.check.len()).max().unwrap_or(4) + 2;
        self.items
            .iter()
            .map(|i| {
                let ms = i.elapsed_ms.map(|v| format!("{v:.1}ms")).unwrap_or_default();
                format!("{:<width$} {:>5}  {:>8}  {}", i.check, i.status, ms, i.detail)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// JSON array in check order.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.items).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_only_from_fatal_checks() {
        let mut r = HealthReport::new();
        r.add("a", HealthStatus::Fail, "x", false, None);
        assert!(!r.fatal);
        r.add("b", HealthStatus::Ok, "", true, None);
        assert!(!r.fatal);
        r.add("c", HealthStatus::Warn, "", true, None);
        assert!(r.fatal);
        assert_eq!(r.exit_code(), 1);
    }

    #[test]
    fn render_aligns_columns() {
        let mut r = HealthReport::new();
        r.add("version", HealthStatus::Ok, "v1", false, Some(0.04));
        r.add("beacons_parse", HealthStatus::Warn, "empty", false, None);
        let text = r.render();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "version            OK     0.0ms  v1");
        assert_eq!(lines[1], "beacons_parse    WARN            empty");
    }

    #[test]
    fn status_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&HealthStatus::Warn).unwrap(), r#""WARN""#);
    }
}
