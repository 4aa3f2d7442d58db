//! Per-server VM lists: fetched on expand, cached until the next expand.

use std::collections::{BTreeMap, BTreeSet};

use crate::types::{ServerVmsResponse, VmSnapshot};

#[derive(Debug, Default)]
pub struct VmPanel {
    /// Last successful list per server number.
    cache: BTreeMap<usize, Vec<VmSnapshot>>,
    /// What the panel currently shows; differs from the cache after a rejected fetch.
    shown: BTreeMap<usize, Vec<VmSnapshot>>,
    expanded: BTreeSet<usize>,
}

impl VmPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self, server: usize) -> bool {
        self.expanded.contains(&server)
    }

    pub fn any_expanded(&self) -> bool {
        !self.expanded.is_empty()
    }

    /// Opens the panel and shows the cached list straight away. Returns true if opened.
    pub fn expand(&mut self, server: usize) -> bool {
        if !self.expanded.insert(server) {
            return false;
        }
        if let Some(cached) = self.cache.get(&server) {
            self.shown.insert(server, cached.clone());
        }
        true
    }

    /// Hides the panel; the cache stays.
    pub fn collapse(&mut self, server: usize) {
        self.expanded.remove(&server);
    }

    pub fn shown(&self, server: usize) -> Option<&[VmSnapshot]> {
        self.shown.get(&server).map(Vec::as_slice)
    }

    pub fn cached(&self, server: usize) -> Option<&[VmSnapshot]> {
        self.cache.get(&server).map(Vec::as_slice)
    }

    /// Applies a `/api/server/{n}/vms/` reply and returns how many VMs are running.
    pub fn apply_list(&mut self, server: usize, resp: ServerVmsResponse) -> usize {
        let vms = match (resp.success, resp.vms) {
            (true, Some(vms)) => {
                self.cache.insert(server, vms.clone());
                vms
            }
            _ => Vec::new(),
        };
        let running = vms.iter().filter(|vm| vm.is_running()).count();
        self.shown.insert(server, vms);
        running
    }

    /// Refreshes known VMs in place from the bulk endpoint, matched on (vmid, node).
    /// Returns the number of rows touched.
    pub fn apply_metrics(&mut self, update: &[VmSnapshot]) -> usize {
        let mut touched = 0;
        for list in self.cache.values_mut().chain(self.shown.values_mut()) {
            for vm in list.iter_mut() {
                if let Some(fresh) = update
                    .iter()
                    .find(|u| u.vmid == vm.vmid && u.node == vm.node)
                {
                    vm.cpu = fresh.cpu.or(vm.cpu);
                    vm.mem = fresh.mem.or(vm.mem);
                    vm.disk = fresh.disk.or(vm.disk);
                    vm.net_in = fresh.net_in.or(vm.net_in);
                    vm.net_out = fresh.net_out.or(vm.net_out);
                    if !fresh.status.is_empty() {
                        vm.status = fresh.status.clone();
                    }
                    touched += 1;
                }
            }
        }
        touched
    }
}
