use std::collections::HashMap;

use rtlbridge_elab::{Database, NetId, NetlistId};
use rtlbridge_netlist::SigBit;

use crate::Error;

/// Mapping from the nets of one source netlist to bits of the module it is imported into.
///
/// Each net is mapped at most once; later references to it reuse the recorded bit.
#[derive(Debug, Clone)]
pub struct NetMap {
    netlist: NetlistId,
    bits: HashMap<NetId, SigBit>,
}

impl NetMap {
    pub fn new(netlist: NetlistId) -> Self {
        NetMap { netlist, bits: HashMap::new() }
    }

    pub fn contains(&self, net: NetId) -> bool {
        self.bits.contains_key(&net)
    }

    pub fn get(&self, net: NetId) -> Option<SigBit> {
        self.bits.get(&net).copied()
    }

    pub fn insert(&mut self, net: NetId, bit: SigBit) {
        let previous = self.bits.insert(net, bit);
        assert!(previous.is_none(), "net {net:?} is mapped twice");
    }

    /// Returns the bit a net is mapped to.  Nets owned by another netlist are an error; nets of
    /// this netlist must have been imported already.
    pub fn at(&self, db: &Database, net: NetId) -> Result<SigBit, Error> {
        if db.is_external_to(net, self.netlist) {
            return Err(Error::ExternalReference {
                netlist: db.netlist(self.netlist).name.clone(),
                net: db.net(net).name.clone(),
                owner: db.full_name(db.net(net).owner).unwrap_or_else(|| db.netlist(db.net(net).owner).name.clone()),
            });
        }
        match self.bits.get(&net) {
            Some(&bit) => Ok(bit),
            None => panic!("net {:?} was not imported", db.net(net).name),
        }
    }
}
