//! # OCCI Infrastructure
//!
//! Compute, network and storage Kinds with their links, mixins and action
//! state machines, ready to be registered with a [`CategoryRegistry`].
//!
//! ```rust
//! use occi_core::CategoryRegistry;
//! use occi_infrastructure::Infrastructure;
//!
//! let registry = CategoryRegistry::new();
//! let infrastructure = Infrastructure::new().unwrap();
//! infrastructure.register(&registry).unwrap();
//!
//! let compute = registry.lookup_location("compute/").unwrap();
//! let vm = registry.instantiate(&compute).unwrap();
//! assert_eq!(vm.attribute("occi.compute.state").map(ToString::to_string).as_deref(), Some("inactive"));
//! ```

pub mod attributes;
mod error;
pub mod lifecycle;

pub use crate::error::{InfrastructureError, InfrastructureErrorExt};
pub use crate::lifecycle::{LifecycleBehavior, Transition};

use crate::attributes::{
    COMPUTE_ARCHITECTURE, COMPUTE_CORES, COMPUTE_HOSTNAME, COMPUTE_MEMORY, COMPUTE_SPEED, COMPUTE_STATE, METHOD,
    NETWORK_ADDRESS, NETWORK_ALLOCATION, NETWORK_GATEWAY, NETWORK_LABEL, NETWORK_STATE, NETWORK_VLAN,
    NETWORKINTERFACE_ADDRESS, NETWORKINTERFACE_ALLOCATION, NETWORKINTERFACE_GATEWAY, NETWORKINTERFACE_INTERFACE,
    NETWORKINTERFACE_MAC, NETWORKINTERFACE_STATE, SIZE, STORAGE_SIZE, STORAGE_STATE, STORAGELINK_DEVICEID,
    STORAGELINK_MOUNTPOINT, STORAGELINK_STATE,
};
use occi_core::{Attribute, AttributeValue, Category, CategoryRef, CategoryRegistry, builtin};
use occi_domain::constants::INFRASTRUCTURE_SCHEME;
use std::sync::Arc;
use tracing::info;

const COMPUTE_ACTION_SCHEME: &str = "http://schemas.ogf.org/occi/infrastructure/compute/action#";
const NETWORK_ACTION_SCHEME: &str = "http://schemas.ogf.org/occi/infrastructure/network/action#";
const STORAGE_ACTION_SCHEME: &str = "http://schemas.ogf.org/occi/infrastructure/storage/action#";

const COMPUTE_TRANSITIONS: &[Transition] = &[
    Transition { action: "start", from: &["inactive", "suspended"], to: Some("active") },
    Transition { action: "stop", from: &["active"], to: Some("inactive") },
    Transition { action: "restart", from: &["active"], to: Some("active") },
    Transition { action: "suspend", from: &["active"], to: Some("suspended") },
];

const NETWORK_TRANSITIONS: &[Transition] = &[
    Transition { action: "up", from: &["inactive"], to: Some("active") },
    Transition { action: "down", from: &["active"], to: Some("inactive") },
];

const STORAGE_TRANSITIONS: &[Transition] = &[
    Transition { action: "online", from: &["offline"], to: Some("online") },
    Transition { action: "offline", from: &["online"], to: Some("offline") },
    Transition { action: "backup", from: &["online"], to: None },
    Transition { action: "snapshot", from: &["online"], to: None },
    Transition { action: "resize", from: &["online", "offline"], to: None },
];

/// Every category of the Infrastructure extension.
#[derive(Debug, Clone)]
pub struct Infrastructure {
    pub compute: CategoryRef,
    pub network: CategoryRef,
    pub storage: CategoryRef,
    pub ipnetwork: CategoryRef,
    pub network_interface: CategoryRef,
    pub ip_network_interface: CategoryRef,
    pub storage_link: CategoryRef,
}

impl Infrastructure {
    /// Builds the category definitions.
    ///
    /// # Errors
    /// Returns [`InfrastructureError::Category`] if a definition is rejected.
    pub fn new() -> Result<Self, InfrastructureError> {
        let resource = builtin::resource_kind();
        let link = builtin::link_kind();

        let compute_actions = ["start", "stop", "restart", "suspend"]
            .into_iter()
            .map(|term| Category::action(term, COMPUTE_ACTION_SCHEME).attribute(Attribute::string(METHOD)).build())
            .collect::<Result<Vec<_>, _>>()
            .context("compute actions")?;
        let compute = Category::kind("compute", INFRASTRUCTURE_SCHEME)
            .title("Compute Resource")
            .related(&resource)
            .attributes([
                Attribute::string(COMPUTE_ARCHITECTURE),
                Attribute::int(COMPUTE_CORES),
                Attribute::string(COMPUTE_HOSTNAME),
                Attribute::float(COMPUTE_SPEED),
                Attribute::float(COMPUTE_MEMORY),
                Attribute::string(COMPUTE_STATE).immutable(),
            ])
            .actions(&compute_actions)
            .location("compute/")
            .build()
            .context("compute")?;

        let network_actions = ["up", "down"]
            .into_iter()
            .map(|term| Category::action(term, NETWORK_ACTION_SCHEME).build())
            .collect::<Result<Vec<_>, _>>()
            .context("network actions")?;
        let network = Category::kind("network", INFRASTRUCTURE_SCHEME)
            .title("Network Resource")
            .related(&resource)
            .attributes([
                Attribute::int(NETWORK_VLAN),
                Attribute::string(NETWORK_LABEL),
                Attribute::string(NETWORK_STATE).immutable(),
            ])
            .actions(&network_actions)
            .location("network/")
            .build()
            .context("network")?;

        let ipnetwork = Category::mixin("ipnetwork", "http://schemas.ogf.org/occi/infrastructure/network#")
            .title("IP Network Mixin")
            .attributes([
                Attribute::string(NETWORK_ADDRESS),
                Attribute::string(NETWORK_GATEWAY),
                Attribute::string(NETWORK_ALLOCATION),
            ])
            .location("ipnetwork/")
            .build()
            .context("ipnetwork")?;

        let mut storage_actions = ["online", "offline", "backup", "snapshot"]
            .into_iter()
            .map(|term| Category::action(term, STORAGE_ACTION_SCHEME).build())
            .collect::<Result<Vec<_>, _>>()
            .context("storage actions")?;
        storage_actions.push(
            Category::action("resize", STORAGE_ACTION_SCHEME)
                .attribute(Attribute::float(SIZE).required())
                .build()
                .context("storage resize")?,
        );
        let storage = Category::kind("storage", INFRASTRUCTURE_SCHEME)
            .title("Storage Resource")
            .related(&resource)
            .attributes([
                Attribute::float(STORAGE_SIZE).required(),
                Attribute::string(STORAGE_STATE).immutable(),
            ])
            .actions(&storage_actions)
            .location("storage/")
            .build()
            .context("storage")?;

        let network_interface = Category::kind("networkinterface", INFRASTRUCTURE_SCHEME)
            .title("NetworkInterface Link")
            .related(&link)
            .attributes([
                Attribute::string(NETWORKINTERFACE_INTERFACE),
                Attribute::string(NETWORKINTERFACE_MAC),
                Attribute::string(NETWORKINTERFACE_STATE),
            ])
            .location("link/networkinterface/")
            .build()
            .context("networkinterface")?;

        let ip_network_interface =
            Category::mixin("ipnetworkinterface", "http://schemas.ogf.org/occi/infrastructure/networkinterface#")
                .title("IP NetworkInterface Mixin")
                .attributes([
                    Attribute::string(NETWORKINTERFACE_ADDRESS),
                    Attribute::string(NETWORKINTERFACE_GATEWAY),
                    Attribute::string(NETWORKINTERFACE_ALLOCATION).required(),
                ])
                .location("link/ipnetworkinterface/")
                .build()
                .context("ipnetworkinterface")?;

        let storage_link = Category::kind("storagelink", INFRASTRUCTURE_SCHEME)
            .title("Storage Link")
            .related(&link)
            .attributes([
                Attribute::string(STORAGELINK_DEVICEID).required(),
                Attribute::string(STORAGELINK_MOUNTPOINT),
                Attribute::string(STORAGELINK_STATE),
            ])
            .location("link/storage/")
            .build()
            .context("storagelink")?;

        Ok(Self { compute, network, storage, ipnetwork, network_interface, ip_network_interface, storage_link })
    }

    /// Registers every category; the resource Kinds get their state machines.
    ///
    /// # Errors
    /// Returns [`InfrastructureError::Category`] when a location is already taken.
    pub fn register(&self, registry: &CategoryRegistry) -> Result<(), InfrastructureError> {
        registry
            .register_with_behavior(self.compute.clone(), Arc::new(compute_behavior()))
            .context("compute")?;
        registry
            .register_with_behavior(
                self.network.clone(),
                Arc::new(LifecycleBehavior::new(NETWORK_STATE, "inactive", NETWORK_TRANSITIONS)),
            )
            .context("network")?;
        registry
            .register_with_behavior(
                self.storage.clone(),
                Arc::new(
                    LifecycleBehavior::new(STORAGE_STATE, "offline", STORAGE_TRANSITIONS)
                        .copies(&[(SIZE, STORAGE_SIZE)]),
                ),
            )
            .context("storage")?;
        for category in [&self.ipnetwork, &self.network_interface, &self.ip_network_interface, &self.storage_link] {
            registry.register(category.clone()).context("infrastructure")?;
        }
        info!(scheme = INFRASTRUCTURE_SCHEME, "Infrastructure categories registered");
        Ok(())
    }

    /// All categories, resource Kinds first.
    #[must_use]
    pub fn all(&self) -> [CategoryRef; 7] {
        [
            self.compute.clone(),
            self.network.clone(),
            self.storage.clone(),
            self.ipnetwork.clone(),
            self.network_interface.clone(),
            self.ip_network_interface.clone(),
            self.storage_link.clone(),
        ]
    }
}

fn compute_behavior() -> LifecycleBehavior {
    LifecycleBehavior::new(COMPUTE_STATE, "inactive", COMPUTE_TRANSITIONS).defaults([
        (COMPUTE_ARCHITECTURE, AttributeValue::from("x86_64")),
        (COMPUTE_SPEED, AttributeValue::Float(2.67)),
        (COMPUTE_MEMORY, AttributeValue::Float(1.0)),
    ])
}
