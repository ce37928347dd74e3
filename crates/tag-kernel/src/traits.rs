use crate::profile::Profile;
use crate::types::{KernelError, SolidHandle, TriMesh};

/// Core geometry kernel trait. Everything the tag pipeline needs from a CAD
/// kernel, and nothing more. Implemented by `TruckKernel` (real B-rep) and
/// `MockKernel` (deterministic test double).
pub trait Kernel {
    /// Extrude a closed planar profile from `base_z` upward by `height`.
    /// A negative height extrudes downward.
    fn extrude(
        &mut self,
        profile: &Profile,
        base_z: f64,
        height: f64,
    ) -> Result<SolidHandle, KernelError>;

    /// Boolean union of two solids.
    fn union(&mut self, a: &SolidHandle, b: &SolidHandle) -> Result<SolidHandle, KernelError>;

    /// Boolean subtraction: a minus b.
    fn subtract(&mut self, a: &SolidHandle, b: &SolidHandle) -> Result<SolidHandle, KernelError>;

    /// Boolean intersection of two solids.
    fn intersect(&mut self, a: &SolidHandle, b: &SolidHandle)
        -> Result<SolidHandle, KernelError>;

    /// Rigid translation.
    fn translate(
        &mut self,
        solid: &SolidHandle,
        offset: [f64; 3],
    ) -> Result<SolidHandle, KernelError>;

    /// Mirror across the YZ plane through x = 0 (the plate's vertical
    /// symmetry plane). The result keeps outward-facing orientation.
    fn mirror_x(&mut self, solid: &SolidHandle) -> Result<SolidHandle, KernelError>;

    /// Cosmetic fillet of the top-face boundary edges. Backends without
    /// fillet support decline with `KernelError::NotSupported`.
    fn fillet_top_edges(
        &mut self,
        solid: &SolidHandle,
        radius: f64,
    ) -> Result<SolidHandle, KernelError>;

    /// Tessellate a solid to a triangle mesh at the given tolerance.
    fn tessellate(&mut self, solid: &SolidHandle, tolerance: f64)
        -> Result<TriMesh, KernelError>;
}
