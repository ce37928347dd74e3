//! Geometry-kernel capability layer.
//!
//! The rest of the workspace composes solids only through the [`Kernel`]
//! trait: profile extrusion, booleans, rigid moves, mirroring, and
//! tessellation. Two implementations are provided: [`TruckKernel`] wrapping
//! the truck B-rep stack, and [`MockKernel`], a deterministic test double
//! that models every solid as a set of axis-aligned boxes.

pub mod mock_kernel;
pub mod profile;
pub mod tessellation;
pub mod traits;
pub mod truck_kernel;
pub mod types;

pub use mock_kernel::MockKernel;
pub use profile::Profile;
pub use traits::Kernel;
pub use truck_kernel::TruckKernel;
pub use types::{KernelError, SolidHandle, TriMesh};
