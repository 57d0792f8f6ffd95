use crate::magic::Magic;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// Construction record for a network descriptor.
///
/// Every field except `name` and `alias` is optional and no validation is
/// performed: a spec with missing fields still produces a descriptor whose
/// absent fields read as `None`. Downstream consumers guard against that.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSpec {
    pub name: String,
    pub alias: String,
    pub pubkeyhash: Option<u32>,
    pub privatekey: Option<u32>,
    pub scripthash: Option<u32>,
    pub xpubkey: Option<u32>,
    pub xprivkey: Option<u32>,
    pub zaddr: Option<u32>,
    pub zkey: Option<u32>,
    pub network_magic: Option<Magic>,
    pub port: Option<u16>,
    pub dns_seeds: Option<Vec<String>>,
}

/// One precomputed bundle of mode-dependent parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct VariantParams {
    pub port: u16,
    pub magic: Magic,
    pub dns_seeds: Vec<String>,
}

/// The two bundles a mode-switchable descriptor picks between at read time
#[derive(Debug, Clone)]
pub(crate) struct Variants {
    pub testnet: VariantParams,
    pub regtest: VariantParams,
}

/// Immutable descriptor of one network's protocol parameters.
///
/// All fields are private and reachable only through getters, so a
/// descriptor cannot be mutated through aliasing once constructed. The one
/// sanctioned runtime change is the regtest flag: descriptors built with a
/// variant pair resolve `port`, `magic` and `dns_seeds` against whichever
/// bundle the flag selects, without ever changing object identity.
#[derive(Debug)]
pub struct Network {
    name: String,
    alias: String,
    pubkeyhash: Option<u32>,
    privatekey: Option<u32>,
    scripthash: Option<u32>,
    xpubkey: Option<u32>,
    xprivkey: Option<u32>,
    zaddr: Option<u32>,
    zkey: Option<u32>,
    magic: Option<Magic>,
    port: Option<u16>,
    dns_seeds: Vec<String>,
    variants: Option<Variants>,
    regtest_active: AtomicBool,
}

impl Network {
    pub(crate) fn from_spec(spec: NetworkSpec) -> Self {
        Network {
            name: spec.name,
            alias: spec.alias,
            pubkeyhash: spec.pubkeyhash,
            privatekey: spec.privatekey,
            scripthash: spec.scripthash,
            xpubkey: spec.xpubkey,
            xprivkey: spec.xprivkey,
            zaddr: spec.zaddr,
            zkey: spec.zkey,
            magic: spec.network_magic,
            port: spec.port,
            dns_seeds: spec.dns_seeds.unwrap_or_default(),
            variants: None,
            regtest_active: AtomicBool::new(false),
        }
    }

    /// Build a descriptor whose port, magic and seeds are resolved at read
    /// time against one of two bundles; static values in the spec for those
    /// three fields are ignored
    pub(crate) fn with_variants(
        spec: NetworkSpec,
        testnet: VariantParams,
        regtest: VariantParams,
    ) -> Self {
        let mut network = Network::from_spec(spec);
        network.magic = None;
        network.port = None;
        network.dns_seeds = Vec::new();
        network.variants = Some(Variants { testnet, regtest });
        network
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn pubkeyhash(&self) -> Option<u32> {
        self.pubkeyhash
    }

    pub fn privatekey(&self) -> Option<u32> {
        self.privatekey
    }

    pub fn scripthash(&self) -> Option<u32> {
        self.scripthash
    }

    pub fn xpubkey(&self) -> Option<u32> {
        self.xpubkey
    }

    pub fn xprivkey(&self) -> Option<u32> {
        self.xprivkey
    }

    pub fn zaddr(&self) -> Option<u32> {
        self.zaddr
    }

    pub fn zkey(&self) -> Option<u32> {
        self.zkey
    }

    /// Network magic, resolved against the active bundle when this
    /// descriptor is mode-switchable
    pub fn magic(&self) -> Option<Magic> {
        match &self.variants {
            Some(variants) => Some(self.current(variants).magic),
            None => self.magic,
        }
    }

    /// Default P2P port, resolved against the active bundle when this
    /// descriptor is mode-switchable
    pub fn port(&self) -> Option<u16> {
        match &self.variants {
            Some(variants) => Some(self.current(variants).port),
            None => self.port,
        }
    }

    /// DNS seed hostnames, resolved against the active bundle when this
    /// descriptor is mode-switchable
    pub fn dns_seeds(&self) -> &[String] {
        match &self.variants {
            Some(variants) => &self.current(variants).dns_seeds,
            None => &self.dns_seeds,
        }
    }

    /// Whether the regtest bundle is currently selected
    pub fn regtest_active(&self) -> bool {
        self.regtest_active.load(Ordering::Relaxed)
    }

    pub(crate) fn set_regtest_active(&self, active: bool) {
        self.regtest_active.store(active, Ordering::Relaxed);
    }

    pub(crate) fn variants(&self) -> Option<&Variants> {
        self.variants.as_ref()
    }

    fn current<'a>(&self, variants: &'a Variants) -> &'a VariantParams {
        if self.regtest_active() {
            &variants.regtest
        } else {
            &variants.testnet
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
