//! Display state: one card per server slot, filled from snapshots.
//!
//! Slots are addressed by 1-based server number, the position of the server in
//! the `/api/metrics/` list. A slot only changes where the snapshot carries a
//! value, so a partial payload never blanks a gauge.

use std::collections::{BTreeMap, VecDeque};

use crate::chart::{merge_history_with_prediction, MergedSeries};
use crate::gauge::GaugeReading;
use crate::history::{push_capped, SPARK_CAP};
use crate::types::{DiskMetrics, MetricsSnapshot, PredictionSet, ServerEntry, Uptime};

pub const PLACEHOLDER: &str = "--";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerStatus {
    Pending,
    Online,
    Offline,
    ConnectionError,
}

impl ServerStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ServerStatus::Pending => "CONNECTING",
            ServerStatus::Online => "ONLINE",
            ServerStatus::Offline => "OFFLINE",
            ServerStatus::ConnectionError => "CONNECTION ERROR",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerCard {
    pub number: usize,
    pub name: String,
    pub status: ServerStatus,
    pub cpu: Option<GaugeReading>,
    pub memory: Option<GaugeReading>,
    pub disk: Option<GaugeReading>,
    pub network: Option<GaugeReading>,
    pub cores: String,
    pub ram_total: String,
    pub storage: String,
    pub vms_active: String,
    pub uptime: String,
    pub cpu_chart: MergedSeries,
    pub mem_chart: MergedSeries,
    /// Outbound Mbps per successful poll, rounded.
    pub net_hist: VecDeque<u64>,
}

impl ServerCard {
    pub fn new(number: usize) -> Self {
        Self {
            number,
            name: format!("Server {number}"),
            status: ServerStatus::Pending,
            cpu: None,
            memory: None,
            disk: None,
            network: None,
            cores: PLACEHOLDER.into(),
            ram_total: PLACEHOLDER.into(),
            storage: PLACEHOLDER.into(),
            vms_active: "0".into(),
            uptime: PLACEHOLDER.into(),
            cpu_chart: MergedSeries::default(),
            mem_chart: MergedSeries::default(),
            net_hist: VecDeque::with_capacity(SPARK_CAP),
        }
    }

    fn apply(&mut self, server: &ServerEntry, prediction: Option<&PredictionSet>) {
        if !server.name.is_empty() {
            self.name = server.name.clone();
        }
        self.status = if server.online {
            ServerStatus::Online
        } else {
            ServerStatus::Offline
        };

        if let Some(m) = server.metrics.as_ref() {
            let cpu = m.cpu.as_ref();
            if let Some(v) = cpu.and_then(|c| c.usage) {
                self.cpu = Some(GaugeReading::from_percent(v));
            }
            if let Some(v) = m.memory.as_ref().and_then(|mm| mm.percent) {
                self.memory = Some(GaugeReading::from_percent(v));
            }
            if let Some(v) = m.disk.as_ref().and_then(|d| d.percent) {
                self.disk = Some(GaugeReading::from_percent(v));
            }
            let mbps = m.network.as_ref().and_then(|n| n.out_mbps).unwrap_or(0.0);
            self.network = Some(GaugeReading::from_mbps(mbps));

            self.cores = cpu
                .and_then(|c| c.cores)
                .filter(|&n| n > 0)
                .map(|n| n.to_string())
                .unwrap_or_else(|| PLACEHOLDER.into());
            self.ram_total = m
                .memory
                .as_ref()
                .and_then(|mm| mm.total_gb)
                .filter(|&gb| gb > 0.0)
                .map(|gb| format!("{gb} GB"))
                .unwrap_or_else(|| PLACEHOLDER.into());
            self.storage = format_storage(m.disk.as_ref());
            self.vms_active = server
                .vms
                .as_ref()
                .and_then(|v| v.active)
                .map(|n| n.to_string())
                .unwrap_or_else(|| "0".into());
            self.uptime = server
                .uptime
                .as_ref()
                .and_then(Uptime::display)
                .unwrap_or_else(|| PLACEHOLDER.into());
        }

        if let Some(h) = server.history.as_ref().filter(|h| !h.timestamps.is_empty()) {
            let p = prediction.map(|p| &p.predictions);
            self.cpu_chart =
                merge_history_with_prediction(&h.timestamps, &h.cpu, p.and_then(|p| p.cpu.as_ref()));
            self.mem_chart = merge_history_with_prediction(
                &h.timestamps,
                &h.memory,
                p.and_then(|p| p.memory.as_ref()),
            );
        }
    }
}

/// `X.XX TB` from one terabyte up, else `X.X GB`, else `--`.
pub fn format_storage(disk: Option<&DiskMetrics>) -> String {
    let Some(d) = disk else {
        return PLACEHOLDER.into();
    };
    match (d.total_tb, d.total_gb) {
        (Some(tb), _) if tb >= 1.0 => format!("{tb:.2} TB"),
        (_, Some(gb)) if gb > 0.0 => format!("{gb:.1} GB"),
        _ => PLACEHOLDER.into(),
    }
}

#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    cards: Vec<ServerCard>,
}

impl Dashboard {
    /// Pre-create `n` slots so the layout is stable before the first response.
    pub fn with_slots(n: usize) -> Self {
        Self {
            cards: (1..=n).map(ServerCard::new).collect(),
        }
    }

    pub fn cards(&self) -> &[ServerCard] {
        &self.cards
    }

    /// 1-based.
    pub fn card(&self, number: usize) -> Option<&ServerCard> {
        number.checked_sub(1).and_then(|i| self.cards.get(i))
    }

    pub fn card_mut(&mut self, number: usize) -> Option<&mut ServerCard> {
        number.checked_sub(1).and_then(|i| self.cards.get_mut(i))
    }

    fn ensure_slots(&mut self, n: usize) {
        while self.cards.len() < n {
            let next = self.cards.len() + 1;
            self.cards.push(ServerCard::new(next));
        }
    }

    pub fn render(&mut self, snap: &MetricsSnapshot, predictions: &BTreeMap<usize, PredictionSet>) {
        let servers = snap.servers();
        self.ensure_slots(servers.len());
        for (i, server) in servers.iter().enumerate() {
            let number = i + 1;
            self.cards[i].apply(server, predictions.get(&number));
        }
    }

    /// Feed the network sparklines; called once per fresh snapshot.
    pub fn record_network(&mut self, snap: &MetricsSnapshot) {
        let servers = snap.servers();
        self.ensure_slots(servers.len());
        for (card, server) in self.cards.iter_mut().zip(servers) {
            let mbps = server
                .metrics
                .as_ref()
                .and_then(|m| m.network.as_ref())
                .and_then(|n| n.out_mbps)
                .unwrap_or(0.0)
                .max(0.0);
            push_capped(&mut card.net_hist, mbps.round() as u64, SPARK_CAP);
        }
    }

    pub fn mark_all_errored(&mut self) {
        for card in &mut self.cards {
            card.status = ServerStatus::ConnectionError;
        }
    }

    pub fn set_vms_active(&mut self, number: usize, active: usize) {
        if let Some(card) = self.card_mut(number) {
            card.vms_active = active.to_string();
        }
    }
}
