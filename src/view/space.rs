//! Memory spaces: where a view's authoritative contents live.

/// A memory space a view can be allocated in.
pub trait MemorySpace: Send + Sync + 'static {
    /// Name used in logs.
    const NAME: &'static str;

    /// Whether host code can read this space directly. Mirrors of
    /// host-accessible views share storage instead of allocating.
    const HOST_ACCESSIBLE: bool;
}

/// General-purpose host memory.
#[derive(Clone, Copy, Debug, Default)]
pub struct HostSpace;

/// Memory owned by the execution device.
///
/// On the CPU thread-pool backend this is ordinary RAM, but it is kept as a
/// separate residency so that every transfer to the host stays an explicit
/// [`deep_copy`](super::deep_copy).
#[derive(Clone, Copy, Debug, Default)]
pub struct DeviceSpace;

impl MemorySpace for HostSpace {
    const NAME: &'static str = "Host";
    const HOST_ACCESSIBLE: bool = true;
}

impl MemorySpace for DeviceSpace {
    const NAME: &'static str = "Device";
    const HOST_ACCESSIBLE: bool = false;
}
