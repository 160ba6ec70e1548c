/// Opaque handles issued by the graphics device.
///
/// The compositor only compares and forwards these; their numeric value is
/// meaningful to the device implementation alone.

macro_rules! device_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u64);

        impl $name {
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            pub const fn raw(&self) -> u64 {
                self.0
            }
        }
    };
}

device_handle!(
    /// GPU image (texture, attachment, backbuffer)
    ImageHandle
);

device_handle!(
    /// CPU-visible completion marker for a submission
    FenceHandle
);

device_handle!(
    /// GPU-side ordering primitive between submissions
    SemaphoreHandle
);

impl ImageHandle {
    /// Placeholder image used as the default of texture uniforms
    pub const NULL: ImageHandle = ImageHandle(0);

    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}
