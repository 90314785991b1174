//! Plain-text rendering of the dashboard read model.

use crate::domain::{Severity, StatsSnapshot, template};
use crate::services::DashboardView;
use std::fmt::Write;

pub fn containers(view: &DashboardView) -> String {
    let mut out = String::new();

    if let Some(error) = &view.load_error {
        let _ = writeln!(out, "{error}");
        return out;
    }
    if view.containers.is_empty() {
        out.push_str("No containers.\n");
        return out;
    }

    let _ = writeln!(
        out,
        "{:<8} {:<24} {:<28} {:<10} {:<18} URL",
        "ID", "NAME", "IMAGE", "STATUS", "NETWORK"
    );
    for container in &view.containers {
        let _ = writeln!(
            out,
            "{:<8} {:<24} {:<28} {:<10} {:<18} {}",
            container.id.as_str(),
            container.name,
            container.image,
            container.status.to_string(),
            container.network.as_deref().unwrap_or("-"),
            container.access_url().unwrap_or_else(|| "-".into()),
        );
    }
    out
}

pub fn networks(view: &DashboardView) -> String {
    let mut out = String::new();
    for name in &view.networks {
        let marker = if *name == view.selected_network { "*" } else { " " };
        let _ = writeln!(out, "{marker} {name}");
    }
    if view.networks.is_empty() {
        out.push_str("No networks.\n");
    }
    out
}

pub fn notification(view: &DashboardView) -> String {
    match &view.notification {
        Some(n) => {
            let tag = match n.severity {
                Severity::Success => "ok",
                Severity::Error => "error",
                Severity::Info => "info",
            };
            format!("[{tag}] {}\n", n.message)
        }
        None => String::new(),
    }
}

pub fn stats(stats: &StatsSnapshot) -> String {
    if stats.is_empty() {
        return "No stats available.\n".to_string();
    }

    let mut out = String::new();
    let rows = [
        ("CPU %", stats.cpu_percent),
        ("Memory usage", stats.memory_usage),
        ("Memory limit", stats.memory_limit),
        ("Memory %", stats.memory_percent),
    ];
    for (label, value) in rows {
        match value {
            Some(value) => {
                let _ = writeln!(out, "{label:<14} {value:.2}");
            }
            None => {
                let _ = writeln!(out, "{label:<14} -");
            }
        }
    }
    out
}

pub fn templates() -> String {
    let mut out = String::new();
    for t in template::list() {
        let port = t
            .port
            .map(|p| format!("{}:{}", p.host_port, p.container_port))
            .unwrap_or_else(|| "-".into());
        let _ = writeln!(out, "{:<10} {:<18} {}", t.id, t.image, port);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ContainerStatus, ManagedContainer};

    fn view(containers: Vec<ManagedContainer>) -> DashboardView {
        DashboardView {
            containers,
            networks: vec!["dockernest-net".into(), "lab".into()],
            selected_network: "lab".into(),
            notification: None,
            load_error: None,
        }
    }

    #[test]
    fn test_container_table_shows_access_url() {
        let mut web = ManagedContainer::new("7", "web", ContainerStatus::Running);
        web.ports.insert("80/tcp".into(), Some("8080".into()));

        let table = containers(&view(vec![web]));
        assert!(table.contains("web"));
        assert!(table.contains("http://localhost:8080"));
    }

    #[test]
    fn test_load_error_replaces_table() {
        let mut v = view(Vec::new());
        v.load_error = Some("Could not load containers: timeout".into());
        assert_eq!(containers(&v), "Could not load containers: timeout\n");
    }

    #[test]
    fn test_selected_network_marked() {
        assert_eq!(networks(&view(Vec::new())), "  dockernest-net\n* lab\n");
    }

    #[test]
    fn test_absent_stats_are_dashes_not_zero() {
        let rendered = stats(&StatsSnapshot {
            cpu_percent: Some(12.0),
            ..StatsSnapshot::default()
        });
        assert!(rendered.contains("CPU %          12.00"));
        assert!(rendered.contains("Memory usage   -"));
    }
}
