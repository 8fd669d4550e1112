/// Placement of a voxel grid in patient space.
///
/// Standard anatomical directions apply:
///  - x increases from patient right to left
///  - y increases from patient anterior to posterior
///  - z increases from patient inferior to superior
///
/// `size` is ordered (columns, rows, slices), i.e. (x, y, z) — the reverse
/// of the `[slice, row, column]` layout used by [`Volume::data`]. A frame
/// may be shared by multiple volumes that are registered to the same
/// coordinate system.
///
/// [`Volume::data`]: crate::volume::Volume
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOfReference {
    /// Patient-space coordinates of the first voxel (mm).
    pub start: (f32, f32, f32),
    /// Voxel size in each direction (mm).
    pub spacing: (f32, f32, f32),
    /// Number of voxels in each direction, ordered (x, y, z).
    pub size: (usize, usize, usize),
    /// A known FrameOfReferenceUID, reused on export when present.
    pub uid: Option<String>,
}

impl FrameOfReference {
    pub fn new(
        start: (f32, f32, f32),
        spacing: (f32, f32, f32),
        size: (usize, usize, usize),
    ) -> Self {
        Self {
            start,
            spacing,
            size,
            uid: None,
        }
    }

    /// Attach a known FrameOfReferenceUID to this frame.
    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    /// Unit-spacing frame at the origin matching a volume of the given
    /// (slices, rows, columns) dimensions.
    pub fn unit(dim: (usize, usize, usize)) -> Self {
        Self::new((0.0, 0.0, 0.0), (1.0, 1.0, 1.0), (dim.2, dim.1, dim.0))
    }

    /// Total number of voxels described by this frame.
    pub fn num_voxels(&self) -> usize {
        self.size.0 * self.size.1 * self.size.2
    }

    /// z coordinate of the slice at `index` (mm).
    pub fn slice_location(&self, index: usize) -> f32 {
        self.start.2 + index as f32 * self.spacing.2
    }
}
