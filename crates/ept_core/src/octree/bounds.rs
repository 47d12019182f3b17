//! Axis-aligned bounding box with double precision for dataset-scale extents.

use glam::DVec3;

use crate::error::{EptError, Result};

/// Double-precision axis-aligned bounding box.
///
/// Every octree [`Key`](super::Key) carries one of these. Components are
/// addressable by a logical index: `0..3` are the minimum x/y/z, `3..6` the
/// maximum x/y/z, which is the order EPT metadata lists them in.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DAabb3 {
	/// Minimum corner (inclusive).
	pub min: DVec3,
	/// Maximum corner (inclusive).
	pub max: DVec3,
}

impl DAabb3 {
	/// Create a new AABB from min and max corners.
	///
	/// # Panics
	/// Debug-asserts that min <= max on all axes.
	pub fn new(min: DVec3, max: DVec3) -> Self {
		debug_assert!(
			min.x <= max.x && min.y <= max.y && min.z <= max.z,
			"AABB min must be <= max on all axes"
		);
		Self { min, max }
	}

	/// Create from `[minx, miny, minz, maxx, maxy, maxz]`.
	pub fn from_array(b: [f64; 6]) -> Self {
		Self::new(DVec3::new(b[0], b[1], b[2]), DVec3::new(b[3], b[4], b[5]))
	}

	/// Parse the `bounds` member of an EPT metadata document.
	///
	/// Rejects anything but six numbers, and boxes whose min exceeds max on
	/// any axis.
	pub fn from_json(value: &serde_json::Value) -> Result<Self> {
		let invalid = || EptError::InvalidBounds(value.to_string());

		let items = value.as_array().filter(|a| a.len() == 6).ok_or_else(invalid)?;
		let mut b = [0.0; 6];
		for (slot, item) in b.iter_mut().zip(items) {
			*slot = item.as_f64().ok_or_else(invalid)?;
		}

		let (min, max) = (DVec3::new(b[0], b[1], b[2]), DVec3::new(b[3], b[4], b[5]));
		if !min.cmple(max).all() {
			return Err(invalid());
		}
		Ok(Self { min, max })
	}

	/// `[minx, miny, minz, maxx, maxy, maxz]`
	pub fn to_array(&self) -> [f64; 6] {
		[self.min.x, self.min.y, self.min.z, self.max.x, self.max.y, self.max.z]
	}

	/// Component at logical index `0..6`.
	pub fn get(&self, i: usize) -> Result<f64> {
		match i {
			0 => Ok(self.min.x),
			1 => Ok(self.min.y),
			2 => Ok(self.min.z),
			3 => Ok(self.max.x),
			4 => Ok(self.max.y),
			5 => Ok(self.max.z),
			_ => Err(EptError::InvalidIndex { accessor: "bounds", index: i }),
		}
	}

	/// Mutable component at logical index `0..6`.
	pub fn get_mut(&mut self, i: usize) -> Result<&mut f64> {
		match i {
			0 => Ok(&mut self.min.x),
			1 => Ok(&mut self.min.y),
			2 => Ok(&mut self.min.z),
			3 => Ok(&mut self.max.x),
			4 => Ok(&mut self.max.y),
			5 => Ok(&mut self.max.z),
			_ => Err(EptError::InvalidIndex { accessor: "bounds", index: i }),
		}
	}

	/// Check if this AABB overlaps with another.
	///
	/// Two AABBs overlap if they share any interior or boundary points.
	#[inline]
	pub fn overlaps(&self, other: &DAabb3) -> bool {
		self.min.x <= other.max.x
			&& self.max.x >= other.min.x
			&& self.min.y <= other.max.y
			&& self.max.y >= other.min.y
			&& self.min.z <= other.max.z
			&& self.max.z >= other.min.z
	}

	/// Check if this AABB contains a point.
	#[inline]
	pub fn contains_point(&self, point: DVec3) -> bool {
		point.cmpge(self.min).all() && point.cmple(self.max).all()
	}

	/// Get the size of the AABB (max - min).
	#[inline]
	pub fn size(&self) -> DVec3 {
		self.max - self.min
	}

	/// Get the center of the AABB.
	#[inline]
	pub fn center(&self) -> DVec3 {
		(self.min + self.max) * 0.5
	}

	#[inline]
	pub fn volume(&self) -> f64 {
		self.size().element_product()
	}

	/// Volume shared with `other`; zero when they only touch or are disjoint.
	pub fn intersection_volume(&self, other: &DAabb3) -> f64 {
		let extent = self.max.min(other.max) - self.min.max(other.min);
		extent.max(DVec3::ZERO).element_product()
	}
}
