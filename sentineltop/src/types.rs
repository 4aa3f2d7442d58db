//! Types that mirror the monitoring API's JSON schema.
//!
//! Every nested field is optional on the wire: the backend omits values it
//! could not collect, and the dashboard keeps whatever it showed before.

use serde::{Deserialize, Deserializer, Serialize};

/// `null` decodes like a missing field.
fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CpuMetrics {
    #[serde(default)]
    pub usage: Option<f64>,
    #[serde(default)]
    pub cores: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryMetrics {
    #[serde(default)]
    pub percent: Option<f64>,
    #[serde(default)]
    pub total_gb: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiskMetrics {
    #[serde(default)]
    pub percent: Option<f64>,
    #[serde(default)]
    pub total_gb: Option<f64>,
    #[serde(default)]
    pub total_tb: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkMetrics {
    #[serde(default)]
    pub out_mbps: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerMetrics {
    #[serde(default)]
    pub cpu: Option<CpuMetrics>,
    #[serde(default)]
    pub memory: Option<MemoryMetrics>,
    #[serde(default)]
    pub disk: Option<DiskMetrics>,
    #[serde(default)]
    pub network: Option<NetworkMetrics>,
}

/// Recent samples the backend keeps per server; labels are preformatted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerHistory {
    #[serde(default, deserialize_with = "null_as_default")]
    pub timestamps: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cpu: Vec<Option<f64>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub memory: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VmCount {
    #[serde(default)]
    pub active: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub online: bool,
    #[serde(default)]
    pub metrics: Option<ServerMetrics>,
    #[serde(default)]
    pub history: Option<ServerHistory>,
    #[serde(default)]
    pub vms: Option<VmCount>,
    #[serde(default)]
    pub uptime: Option<Uptime>,
}

/// Preformatted text from some backends, seconds from others.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Uptime {
    Seconds(f64),
    Text(String),
    Other(serde_json::Value),
}

impl Uptime {
    /// Display form; `None` for zero, empty or unrecognised values.
    pub fn display(&self) -> Option<String> {
        match self {
            Uptime::Text(t) if !t.trim().is_empty() => Some(t.clone()),
            Uptime::Seconds(s) if s.is_finite() && *s >= 1.0 => Some(format_uptime(*s as u64)),
            _ => None,
        }
    }
}

/// `3d 4h`, `5h 12m` or `7m`.
pub fn format_uptime(secs: u64) -> String {
    let days = secs / 86_400;
    let hours = secs % 86_400 / 3_600;
    let mins = secs % 3_600 / 60;
    if days > 0 {
        format!("{days}d {hours}h")
    } else if hours > 0 {
        format!("{hours}h {mins}m")
    } else {
        format!("{mins}m")
    }
}

/// One `/api/metrics/` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub servers: Option<Vec<ServerEntry>>,
}

impl MetricsSnapshot {
    /// A payload is usable only when the backend reports success and sent a server list.
    pub fn is_usable(&self) -> bool {
        self.success && self.servers.is_some()
    }

    pub fn servers(&self) -> &[ServerEntry] {
        self.servers.as_deref().unwrap_or(&[])
    }
}

fn default_success() -> bool {
    true
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionSeries {
    #[serde(default, deserialize_with = "null_as_default")]
    pub labels: Vec<String>,
    /// `null` points are gaps in the line.
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Predictions {
    #[serde(default)]
    pub cpu: Option<PredictionSeries>,
    #[serde(default)]
    pub memory: Option<PredictionSeries>,
}

/// One `/api/predictions/{n}/` payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionSet {
    #[serde(default)]
    pub predictions: Predictions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VmSnapshot {
    pub vmid: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub node: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default)]
    pub cpu: Option<f64>,
    // the per-server endpoint says `memory`, the bulk endpoint says `mem`
    #[serde(default, alias = "memory")]
    pub mem: Option<f64>,
    #[serde(default)]
    pub disk: Option<f64>,
    #[serde(default)]
    pub net_in: Option<f64>,
    #[serde(default)]
    pub net_out: Option<f64>,
}

impl VmSnapshot {
    pub fn is_running(&self) -> bool {
        self.status == "running"
    }
}

/// `/api/server/{n}/vms/`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerVmsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub vms: Option<Vec<VmSnapshot>>,
}

/// `/api/vms/metrics/`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VmMetricsResponse {
    #[serde(default)]
    pub vms: Vec<VmSnapshot>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_tolerates_missing_fields() {
        let json = r#"{"servers":[{"name":"pve1","online":true,"metrics":{"cpu":{"usage":12.5}}}]}"#;
        let s: MetricsSnapshot = serde_json::from_str(json).unwrap();
        assert!(s.is_usable());
        let m = s.servers()[0].metrics.as_ref().unwrap();
        assert_eq!(m.cpu.as_ref().unwrap().usage, Some(12.5));
        assert!(m.memory.is_none());
        assert!(s.servers()[0].history.is_none());
    }

    #[test]
    fn snapshot_without_servers_is_not_usable() {
        let s: MetricsSnapshot = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(!s.is_usable());
        let s: MetricsSnapshot =
            serde_json::from_str(r#"{"success":false,"servers":[]}"#).unwrap();
        assert!(!s.is_usable());
    }

    #[test]
    fn vm_memory_alias() {
        let a: VmSnapshot =
            serde_json::from_str(r#"{"vmid":100,"status":"running","memory":42.0}"#).unwrap();
        let b: VmSnapshot =
            serde_json::from_str(r#"{"vmid":100,"status":"stopped","mem":42.0}"#).unwrap();
        assert_eq!(a.mem, Some(42.0));
        assert_eq!(b.mem, Some(42.0));
        assert!(a.is_running());
        assert!(!b.is_running());
    }

    #[test]
    fn loose_server_fields_do_not_reject_the_snapshot() {
        let json = r#"{"success":true,"servers":[
            {"name":"pve","online":true,"uptime":86400,"history":{"timestamps":["a","b"],"cpu":[1.0,null],"memory":null}},
            {"name":null,"online":null,"uptime":"2d 1h"},
            {"name":"x","uptime":0},
            {"name":"y","uptime":{"raw":5}}
        ]}"#;
        let s: MetricsSnapshot = serde_json::from_str(json).unwrap();
        let servers = s.servers();
        assert_eq!(servers[0].uptime.as_ref().and_then(Uptime::display).as_deref(), Some("1d 0h"));
        assert_eq!(servers[0].history.as_ref().unwrap().cpu, vec![Some(1.0), None]);
        assert!(servers[0].history.as_ref().unwrap().memory.is_empty());
        assert_eq!(servers[1].name, "");
        assert!(!servers[1].online);
        assert_eq!(servers[1].uptime.as_ref().and_then(Uptime::display).as_deref(), Some("2d 1h"));
        assert!(servers[2].uptime.as_ref().and_then(Uptime::display).is_none());
        assert!(servers[3].uptime.as_ref().and_then(Uptime::display).is_none());
    }

    #[test]
    fn null_vm_numbers_and_prediction_points() {
        let vm: VmSnapshot = serde_json::from_str(
            r#"{"vmid":7,"node":null,"name":null,"status":"running","cpu":null,"mem":3.5,"disk":null}"#,
        )
        .unwrap();
        assert_eq!(vm.cpu, None);
        assert_eq!(vm.mem, Some(3.5));
        assert!(vm.node.is_empty());

        let p: PredictionSet = serde_json::from_str(
            r#"{"predictions":{"cpu":{"labels":["a","b"],"data":[1.0,null]},"memory":{"labels":null,"data":null}}}"#,
        )
        .unwrap();
        assert_eq!(p.predictions.cpu.unwrap().data, vec![Some(1.0), None]);
        assert!(p.predictions.memory.unwrap().data.is_empty());
    }

    #[test]
    fn uptime_formatting() {
        assert_eq!(format_uptime(59), "0m");
        assert_eq!(format_uptime(3_600 * 5 + 60 * 12), "5h 12m");
        assert_eq!(format_uptime(86_400 * 3 + 3_600 * 4 + 59), "3d 4h");
    }
}
