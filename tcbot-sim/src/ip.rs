use std::{collections::BTreeMap, fmt, io, net::Ipv4Addr};

/// Interface name to the IPv4 addresses bound to it.
pub type InterfaceAddresses = BTreeMap<String, Vec<Ipv4Addr>>;

/// A source of interface addresses, usually the live OS interface table.
pub trait InterfaceSource: Send {
    /// Lists every interface along with its IPv4 addresses.
    fn list_interface_addresses(&self) -> io::Result<InterfaceAddresses>;
}

/// Reads the OS interface table through `pnet`'s datalink layer.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemInterfaces;

impl InterfaceSource for SystemInterfaces {
    fn list_interface_addresses(&self) -> io::Result<InterfaceAddresses> {
        let mut result = InterfaceAddresses::new();

        for iface in pnet::datalink::interfaces() {
            let ips: Vec<Ipv4Addr> = iface
                .ips
                .iter()
                .filter_map(|network| match network.ip() {
                    std::net::IpAddr::V4(v4) => Some(v4),
                    std::net::IpAddr::V6(_) => None,
                })
                .collect();

            result.insert(iface.name, ips);
        }

        Ok(result)
    }
}

/// Snapshot of the interfaces that currently have at least one IPv4 address.
#[derive(Debug, Default, Clone)]
pub struct Inventory {
    current: InterfaceAddresses,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the snapshot with a fresh listing from `source`.
    ///
    /// Interfaces without IPv4 addresses are dropped. On error the previous snapshot is kept.
    pub fn refresh(&mut self, source: &dyn InterfaceSource) -> io::Result<()> {
        let mut listing = source.list_interface_addresses()?;
        listing.retain(|_, ips| !ips.is_empty());

        tracing::debug!(interfaces = listing.len(), "refreshed interface inventory");

        self.current = listing;
        Ok(())
    }

    pub fn current(&self) -> &InterfaceAddresses {
        &self.current
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Finds the sub-interface carrying the given VLAN tag, named `<base>.<vlan>`.
    pub fn find_vlan(&self, vlan: u16) -> Option<&str> {
        let suffix = format!(".{vlan}");
        self.current.keys().find(|name| name.ends_with(&suffix)).map(String::as_str)
    }
}

impl fmt::Display for Inventory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self
            .current
            .iter()
            .map(|(name, ips)| {
                let texts: Vec<String> = ips.iter().map(Ipv4Addr::to_string).collect();
                format!("{name}: {}", texts.join(", "))
            })
            .collect();

        f.write_str(&lines.join("\n"))
    }
}
