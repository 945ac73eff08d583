//! Attribute names of the Infrastructure extension.

pub const COMPUTE_ARCHITECTURE: &str = "occi.compute.architecture";
pub const COMPUTE_CORES: &str = "occi.compute.cores";
pub const COMPUTE_HOSTNAME: &str = "occi.compute.hostname";
pub const COMPUTE_SPEED: &str = "occi.compute.speed";
pub const COMPUTE_MEMORY: &str = "occi.compute.memory";
pub const COMPUTE_STATE: &str = "occi.compute.state";

pub const NETWORK_VLAN: &str = "occi.network.vlan";
pub const NETWORK_LABEL: &str = "occi.network.label";
pub const NETWORK_STATE: &str = "occi.network.state";
pub const NETWORK_ADDRESS: &str = "occi.network.address";
pub const NETWORK_GATEWAY: &str = "occi.network.gateway";
pub const NETWORK_ALLOCATION: &str = "occi.network.allocation";

pub const STORAGE_SIZE: &str = "occi.storage.size";
pub const STORAGE_STATE: &str = "occi.storage.state";

pub const NETWORKINTERFACE_INTERFACE: &str = "occi.networkinterface.interface";
pub const NETWORKINTERFACE_MAC: &str = "occi.networkinterface.mac";
pub const NETWORKINTERFACE_STATE: &str = "occi.networkinterface.state";
pub const NETWORKINTERFACE_ADDRESS: &str = "occi.networkinterface.address";
pub const NETWORKINTERFACE_GATEWAY: &str = "occi.networkinterface.gateway";
pub const NETWORKINTERFACE_ALLOCATION: &str = "occi.networkinterface.allocation";

pub const STORAGELINK_DEVICEID: &str = "occi.storagelink.deviceid";
pub const STORAGELINK_MOUNTPOINT: &str = "occi.storagelink.mountpoint";
pub const STORAGELINK_STATE: &str = "occi.storagelink.state";

/// Parameter shared by the compute actions.
pub const METHOD: &str = "method";
/// Parameter of the storage `resize` action.
pub const SIZE: &str = "size";
