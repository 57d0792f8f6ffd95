use crate::magic::Magic;
use crate::network::{Network, NetworkSpec, VariantParams};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

/// Raw scalar value under which a descriptor is indexed.
///
/// The reverse index is keyed by value alone, not by (field, value): two
/// fields sharing the same raw value collide and the most recently added
/// descriptor wins. Use `Registry::get_by` when a specific field matters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Text(String),
    Value(u32),
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Text(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Text(s)
    }
}

impl From<u32> for Key {
    fn from(value: u32) -> Self {
        Key::Value(value)
    }
}

impl From<u16> for Key {
    fn from(value: u16) -> Self {
        Key::Value(value.into())
    }
}

impl From<Magic> for Key {
    fn from(magic: Magic) -> Self {
        Key::Value(magic.to_u32())
    }
}

/// Scalar descriptor field a keyed lookup can be restricted to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Alias,
    Pubkeyhash,
    Privatekey,
    Scripthash,
    Xpubkey,
    Xprivkey,
    Zaddr,
    Zkey,
    NetworkMagic,
    Port,
}

impl Field {
    fn matches(self, network: &Network, key: &Key) -> bool {
        match (self, key) {
            (Field::Name, Key::Text(s)) => network.name() == s,
            (Field::Alias, Key::Text(s)) => network.alias() == s,
            (Field::Pubkeyhash, Key::Value(v)) => network.pubkeyhash() == Some(*v),
            (Field::Privatekey, Key::Value(v)) => network.privatekey() == Some(*v),
            (Field::Scripthash, Key::Value(v)) => network.scripthash() == Some(*v),
            (Field::Xpubkey, Key::Value(v)) => network.xpubkey() == Some(*v),
            (Field::Xprivkey, Key::Value(v)) => network.xprivkey() == Some(*v),
            (Field::Zaddr, Key::Value(v)) => network.zaddr() == Some(*v),
            (Field::Zkey, Key::Value(v)) => network.zkey() == Some(*v),
            (Field::NetworkMagic, Key::Value(v)) => {
                network.magic().map(Magic::to_u32) == Some(*v)
            }
            (Field::Port, Key::Value(v)) => network.port().map(u32::from) == Some(*v),
            _ => false,
        }
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Field::Name),
            "alias" => Ok(Field::Alias),
            "pubkeyhash" => Ok(Field::Pubkeyhash),
            "privatekey" => Ok(Field::Privatekey),
            "scripthash" => Ok(Field::Scripthash),
            "xpubkey" => Ok(Field::Xpubkey),
            "xprivkey" => Ok(Field::Xprivkey),
            "zaddr" => Ok(Field::Zaddr),
            "zkey" => Ok(Field::Zkey),
            "networkMagic" | "network_magic" => Ok(Field::NetworkMagic),
            "port" => Ok(Field::Port),
            _ => Err(format!("Unknown network field: {}", s)),
        }
    }
}

/// What `Registry::get` resolves: either a descriptor the caller already
/// holds (returned by identity) or a raw scalar key
#[derive(Debug, Clone)]
pub enum Query {
    Network(Arc<Network>),
    Key(Key),
}

impl From<Arc<Network>> for Query {
    fn from(network: Arc<Network>) -> Self {
        Query::Network(network)
    }
}

impl From<&Arc<Network>> for Query {
    fn from(network: &Arc<Network>) -> Self {
        Query::Network(network.clone())
    }
}

impl From<Key> for Query {
    fn from(key: Key) -> Self {
        Query::Key(key)
    }
}

impl From<&str> for Query {
    fn from(s: &str) -> Self {
        Query::Key(Key::from(s))
    }
}

impl From<String> for Query {
    fn from(s: String) -> Self {
        Query::Key(Key::from(s))
    }
}

impl From<u32> for Query {
    fn from(value: u32) -> Self {
        Query::Key(Key::from(value))
    }
}

impl From<u16> for Query {
    fn from(value: u16) -> Self {
        Query::Key(Key::from(value))
    }
}

impl From<Magic> for Query {
    fn from(magic: Magic) -> Self {
        Query::Key(Key::from(magic))
    }
}

/// Ordered collection of network descriptors plus a reverse index from raw
/// scalar value to descriptor.
///
/// `Registry::builtin()` pre-registers the livenet and testnet descriptors;
/// `Registry::new()` starts empty for embedders and tests that want
/// isolation. Reads take `&self` and mutations `&mut self`, so sharing an
/// instance across threads requires external serialization of mutation, as
/// documented. The regtest toggle is the one exception: it is atomic and
/// works through any shared reference.
#[derive(Debug, Default)]
pub struct Registry {
    order: Vec<Arc<Network>>,
    index: HashMap<Key, Arc<Network>>,
}

impl Registry {
    /// Empty registry with nothing pre-registered
    pub fn new() -> Self {
        Registry::default()
    }

    /// Registry pre-populated with the livenet and testnet descriptors
    pub fn builtin() -> Self {
        let mut registry = Registry::new();
        registry.insert(Arc::new(Network::from_spec(livenet_spec())));
        registry.insert(Arc::new(Network::with_variants(
            testnet_spec(),
            testnet_variant(),
            regtest_variant(),
        )));
        registry
    }

    /// Construct a descriptor from `spec`, append it to the ordered list and
    /// index every defined scalar field value. Values already present in the
    /// index are silently overwritten, so a later `add` wins collisions.
    pub fn add(&mut self, spec: NetworkSpec) -> Arc<Network> {
        let network = Arc::new(Network::from_spec(spec));
        self.insert(network.clone());
        network
    }

    /// Remove `network` from the ordered list and purge every reverse-index
    /// entry pointing at it, both by identity. No-op if it was never
    /// registered.
    pub fn remove(&mut self, network: &Arc<Network>) {
        let mut found = false;
        self.order.retain(|candidate| {
            let same = !found && Arc::ptr_eq(candidate, network);
            found |= same;
            !same
        });
        if !found {
            return;
        }
        self.index
            .retain(|_, candidate| !Arc::ptr_eq(candidate, network));
        log::debug!("unregistered network {}", network);
    }

    /// Resolve a descriptor.
    ///
    /// A descriptor query is matched by identity against the ordered list
    /// and returned unchanged. A key query is a direct reverse-index lookup
    /// with last-write-wins collision semantics. `None` means no match; no
    /// lookup ever fails otherwise.
    pub fn get(&self, query: impl Into<Query>) -> Option<Arc<Network>> {
        match query.into() {
            Query::Network(network) => self
                .order
                .iter()
                .find(|candidate| Arc::ptr_eq(candidate, &network))
                .cloned(),
            Query::Key(key) => {
                let hit = self.index.get(&key).cloned();
                if hit.is_none() {
                    log::trace!("no network indexed under {:?}", key);
                }
                hit
            }
        }
    }

    /// Resolve a key against specific fields only: scan the ordered list in
    /// insertion order and return the first descriptor for which *any* of
    /// `fields` equals `key`. Unlike the reverse index this path is
    /// first-write-wins, which makes it authoritative when a raw value is
    /// known to collide across fields.
    pub fn get_by(&self, key: impl Into<Key>, fields: &[Field]) -> Option<Arc<Network>> {
        let key = key.into();
        self.order
            .iter()
            .find(|network| fields.iter().any(|field| field.matches(*network, &key)))
            .cloned()
    }

    /// Switch every mode-switchable descriptor (the builtin testnet) to its
    /// regtest bundle. Object identity is preserved: previously obtained
    /// references observe the switch immediately.
    pub fn enable_regtest(&self) {
        for network in self.switchable() {
            network.set_regtest_active(true);
        }
    }

    /// Switch every mode-switchable descriptor back to its testnet bundle
    pub fn disable_regtest(&self) {
        for network in self.switchable() {
            network.set_regtest_active(false);
        }
    }

    /// The production network descriptor, if registered
    pub fn livenet(&self) -> Option<Arc<Network>> {
        self.get(LIVENET)
    }

    /// Alias for `livenet`
    pub fn mainnet(&self) -> Option<Arc<Network>> {
        self.livenet()
    }

    /// The test network descriptor, if registered
    pub fn testnet(&self) -> Option<Arc<Network>> {
        self.get(TESTNET)
    }

    /// The network consumers should assume when none is named: livenet
    pub fn default_network(&self) -> Option<Arc<Network>> {
        self.livenet()
    }

    pub fn networks(&self) -> impl Iterator<Item = &Arc<Network>> {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn insert(&mut self, network: Arc<Network>) {
        for key in index_keys(&network) {
            self.index.insert(key, network.clone());
        }
        self.order.push(network.clone());
        log::debug!("registered network {}", network);
    }

    fn switchable(&self) -> impl Iterator<Item = &Arc<Network>> {
        self.order
            .iter()
            .filter(|network| network.variants().is_some())
    }
}

/// Every raw scalar value a descriptor is reachable under. Sequences
/// (`dns_seeds`) are never indexed; a mode-switchable descriptor is indexed
/// under both bundles' port and magic so lookups resolve regardless of the
/// current mode.
fn index_keys(network: &Network) -> Vec<Key> {
    let mut keys = Vec::new();
    if !network.name().is_empty() {
        keys.push(Key::from(network.name()));
    }
    if !network.alias().is_empty() {
        keys.push(Key::from(network.alias()));
    }
    let prefixes = [
        network.pubkeyhash(),
        network.privatekey(),
        network.scripthash(),
        network.xpubkey(),
        network.xprivkey(),
        network.zaddr(),
        network.zkey(),
    ];
    keys.extend(prefixes.into_iter().flatten().map(Key::Value));
    match network.variants() {
        Some(variants) => {
            for bundle in [&variants.testnet, &variants.regtest] {
                keys.push(Key::from(bundle.magic));
                keys.push(Key::from(bundle.port));
            }
        }
        None => {
            if let Some(magic) = network.magic() {
                keys.push(Key::from(magic));
            }
            if let Some(port) = network.port() {
                keys.push(Key::from(port));
            }
        }
    }
    keys
}

pub(crate) const LIVENET: &str = "livenet";
pub(crate) const TESTNET: &str = "testnet";

fn livenet_spec() -> NetworkSpec {
    NetworkSpec {
        name: LIVENET.to_string(),
        alias: "mainnet".to_string(),
        pubkeyhash: Some(0x1cb8),
        privatekey: Some(0x80),
        scripthash: Some(0x1cbd),
        xpubkey: Some(0x0488b21e),
        xprivkey: Some(0x0488ade4),
        zaddr: Some(0x169a),
        zkey: Some(0xab36),
        network_magic: Some(Magic::from_u32(0x24e92764)),
        port: Some(8233),
        dns_seeds: Some(vec![
            "dnsseed.z.cash".to_string(),
            "dnsseed.str4d.xyz".to_string(),
            "dnsseed.znodes.org".to_string(),
        ]),
    }
}

fn testnet_spec() -> NetworkSpec {
    NetworkSpec {
        name: TESTNET.to_string(),
        alias: "test".to_string(),
        pubkeyhash: Some(0x1d25),
        privatekey: Some(0xef),
        scripthash: Some(0x1cba),
        xpubkey: Some(0x043587cf),
        xprivkey: Some(0x04358394),
        zaddr: Some(0x16b6),
        zkey: Some(0xac08),
        ..Default::default()
    }
}

fn testnet_variant() -> VariantParams {
    VariantParams {
        port: 18233,
        magic: Magic::from_u32(0xfa1af9bf),
        dns_seeds: vec!["dnsseed.testnet.z.cash".to_string()],
    }
}

fn regtest_variant() -> VariantParams {
    VariantParams {
        port: 18444,
        magic: Magic::from_u32(0xaae83f5f),
        dns_seeds: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str, pubkeyhash: u32, scripthash: u32) -> NetworkSpec {
        NetworkSpec {
            name: name.to_string(),
            alias: format!("{}-alias", name),
            pubkeyhash: Some(pubkeyhash),
            scripthash: Some(scripthash),
            ..Default::default()
        }
    }

    #[test]
    fn test_builtin_livenet_constants() {
        let registry = Registry::builtin();
        let livenet = registry.livenet().unwrap();
        assert_eq!(livenet.pubkeyhash(), Some(0x1cb8));
        assert_eq!(livenet.magic(), Some(Magic::from_u32(0x24e92764)));
        assert_eq!(livenet.port(), Some(8233));
        assert_eq!(livenet.dns_seeds().len(), 3);
    }

    #[test]
    fn test_builtin_accessors_share_identity() {
        let registry = Registry::builtin();
        let livenet = registry.livenet().unwrap();
        assert!(Arc::ptr_eq(&livenet, &registry.mainnet().unwrap()));
        assert!(Arc::ptr_eq(&livenet, &registry.default_network().unwrap()));
        assert!(Arc::ptr_eq(&livenet, &registry.get("mainnet").unwrap()));
        assert_eq!(registry.len(), 2);
        let names: Vec<_> = registry.networks().map(|n| n.name().to_string()).collect();
        assert_eq!(names, ["livenet", "testnet"]);
    }

    #[test]
    fn test_get_with_descriptor_is_identity_pass_through() {
        let registry = Registry::builtin();
        let livenet = registry.livenet().unwrap();
        let resolved = registry.get(&livenet).unwrap();
        assert!(Arc::ptr_eq(&resolved, &livenet));
    }

    #[test]
    fn test_get_by_raw_values() {
        let registry = Registry::builtin();
        let livenet = registry.livenet().unwrap();
        assert!(Arc::ptr_eq(&registry.get(0x1cb8u32).unwrap(), &livenet));
        assert!(Arc::ptr_eq(&registry.get(8233u16).unwrap(), &livenet));
        assert!(Arc::ptr_eq(
            &registry.get(Magic::from_u32(0x24e92764)).unwrap(),
            &livenet
        ));
    }

    #[test]
    fn test_unknown_lookups_are_absent() {
        let registry = Registry::builtin();
        assert!(registry.get("nonexistent-key").is_none());
        assert!(registry.get(0xffff_ffffu32).is_none());
        assert!(registry.get_by(0xffff_ffffu32, &[Field::Pubkeyhash]).is_none());
    }

    #[test]
    fn test_regtest_toggle_switches_fields_in_place() {
        let registry = Registry::builtin();
        let testnet = registry.testnet().unwrap();
        assert_eq!(testnet.pubkeyhash(), Some(0x1d25));
        assert_eq!(testnet.port(), Some(18233));
        assert_eq!(testnet.magic(), Some(Magic::from_u32(0xfa1af9bf)));
        assert!(!testnet.dns_seeds().is_empty());

        registry.enable_regtest();
        // Same identity, switched values, observed through the old reference
        assert_eq!(testnet.port(), Some(18444));
        assert_eq!(testnet.magic(), Some(Magic::from_u32(0xaae83f5f)));
        assert!(testnet.dns_seeds().is_empty());
        assert!(Arc::ptr_eq(&testnet, &registry.testnet().unwrap()));

        registry.disable_regtest();
        assert_eq!(testnet.port(), Some(18233));
    }

    #[test]
    fn test_both_variant_bundles_are_indexed_regardless_of_mode() {
        let registry = Registry::builtin();
        let testnet = registry.testnet().unwrap();
        for key in [18233u32, 18444, 0xfa1af9bf, 0xaae83f5f] {
            assert!(Arc::ptr_eq(&registry.get(key).unwrap(), &testnet));
        }
        registry.enable_regtest();
        assert!(Arc::ptr_eq(&registry.get(18233u32).unwrap(), &testnet));
        assert!(Arc::ptr_eq(&registry.get(18444u32).unwrap(), &testnet));
    }

    #[test]
    fn test_remove_purges_list_and_index() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut registry = Registry::builtin();
        let added = registry.add(spec("extranet", 0x7001, 0x7002));
        assert!(registry.get("extranet").is_some());

        registry.remove(&added);
        assert!(registry.get(&added).is_none());
        assert!(registry.get("extranet").is_none());
        assert!(registry.get("extranet-alias").is_none());
        assert!(registry.get(0x7001u32).is_none());
        assert!(registry.get(0x7002u32).is_none());
        assert_eq!(registry.len(), 2);

        // Removing again is a silent no-op
        registry.remove(&added);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_index_collision_is_last_write_wins() {
        let mut registry = Registry::new();
        // first's pubkeyhash equals second's scripthash
        let first = registry.add(spec("first", 0x6000, 0x6001));
        let second = registry.add(spec("second", 0x6002, 0x6000));

        assert!(Arc::ptr_eq(&registry.get(0x6000u32).unwrap(), &second));

        // The keyed scan is first-write-wins per named field instead
        let by_pubkeyhash = registry.get_by(0x6000u32, &[Field::Pubkeyhash]).unwrap();
        assert!(Arc::ptr_eq(&by_pubkeyhash, &first));
        let by_scripthash = registry.get_by(0x6000u32, &[Field::Scripthash]).unwrap();
        assert!(Arc::ptr_eq(&by_scripthash, &second));
        // Any-match across several fields still returns the first in order
        let by_either = registry
            .get_by(0x6000u32, &[Field::Pubkeyhash, Field::Scripthash])
            .unwrap();
        assert!(Arc::ptr_eq(&by_either, &first));
    }

    #[test]
    fn test_get_by_matches_textual_fields() {
        let registry = Registry::builtin();
        let testnet = registry.testnet().unwrap();
        let hit = registry.get_by("test", &[Field::Alias]).unwrap();
        assert!(Arc::ptr_eq(&hit, &testnet));
        assert!(registry.get_by("test", &[Field::Name]).is_none());
    }

    #[test]
    fn test_field_parses_from_textual_names() {
        assert_eq!(Field::from_str("pubkeyhash").unwrap(), Field::Pubkeyhash);
        assert_eq!(Field::from_str("networkMagic").unwrap(), Field::NetworkMagic);
        assert_eq!(Field::from_str("network_magic").unwrap(), Field::NetworkMagic);
        assert!(Field::from_str("dnsSeeds").is_err());
    }

    #[test]
    fn test_empty_spec_registers_without_index_entries() {
        let mut registry = Registry::new();
        let blank = registry.add(NetworkSpec::default());
        assert_eq!(registry.len(), 1);
        assert!(registry.get("").is_none());
        assert!(Arc::ptr_eq(&registry.get(&blank).unwrap(), &blank));
    }

    #[test]
    fn test_descriptor_from_another_registry_is_not_resolved() {
        let mut other = Registry::new();
        let foreign = other.add(spec("foreign", 0x5000, 0x5001));
        let registry = Registry::builtin();
        assert!(registry.get(&foreign).is_none());
    }
}
