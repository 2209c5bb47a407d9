use crate::{Coord3i, Error};

#[derive(Debug, Clone, PartialEq)]
pub struct Volume<T> {
    dims: [usize; 3],
    data: Vec<T>,
}

impl<T> Volume<T> {
    pub fn from_vec(dims: [usize; 3], data: Vec<T>) -> Result<Self, Error> {
        let expected = checked_len(dims)?;
        if data.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self { dims, data })
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    pub fn width(&self) -> usize {
        self.dims[0]
    }

    pub fn height(&self) -> usize {
        self.dims[1]
    }

    pub fn depth(&self) -> usize {
        self.dims[2]
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    pub fn as_view(&self) -> VolumeView<'_, T> {
        VolumeView {
            dims: self.dims,
            data: &self.data,
        }
    }

    pub fn get(&self, x: usize, y: usize, z: usize) -> Option<&T> {
        self.as_view().get(x, y, z)
    }

    pub fn get_mut(&mut self, x: usize, y: usize, z: usize) -> Option<&mut T> {
        let idx = linear_index(self.dims, x, y, z)?;
        self.data.get_mut(idx)
    }

    pub fn get_coord_mut(&mut self, c: Coord3i) -> Option<&mut T> {
        let idx = coord_index(self.dims, c)?;
        self.data.get_mut(idx)
    }
}

impl<T: Clone> Volume<T> {
    pub fn new_fill(dims: [usize; 3], value: T) -> Result<Self, Error> {
        let len = checked_len(dims)?;
        Ok(Self {
            dims,
            data: vec![value; len],
        })
    }
}

impl Volume<u8> {
    /// Binary mask with value `1` at every listed voxel and `0` elsewhere.
    pub fn mask_from_coords(dims: [usize; 3], coords: &[Coord3i]) -> Result<Self, Error> {
        let mut out = Self::new_fill(dims, 0u8)?;
        for &c in coords {
            *out.get_coord_mut(c).ok_or(Error::OutOfBounds)? = 1;
        }
        Ok(out)
    }
}

/// Borrowed read-only volume, addressed x-fastest, then y, then z.
#[derive(Debug, Clone, Copy)]
pub struct VolumeView<'a, T> {
    dims: [usize; 3],
    data: &'a [T],
}

impl<'a, T> VolumeView<'a, T> {
    pub fn from_slice(dims: [usize; 3], data: &'a [T]) -> Result<Self, Error> {
        let expected = checked_len(dims)?;
        if data.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self { dims, data })
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    pub fn width(&self) -> usize {
        self.dims[0]
    }

    pub fn height(&self) -> usize {
        self.dims[1]
    }

    pub fn depth(&self) -> usize {
        self.dims[2]
    }

    pub fn data(&self) -> &'a [T] {
        self.data
    }

    pub fn get(&self, x: usize, y: usize, z: usize) -> Option<&'a T> {
        let idx = linear_index(self.dims, x, y, z)?;
        self.data.get(idx)
    }

    pub fn get_coord(&self, c: Coord3i) -> Option<&'a T> {
        let idx = coord_index(self.dims, c)?;
        self.data.get(idx)
    }

    pub fn index_of(&self, c: Coord3i) -> Option<usize> {
        coord_index(self.dims, c)
    }

    pub fn coord_of(&self, idx: usize) -> Coord3i {
        let [w, h, _] = self.dims;
        let x = idx % w;
        let y = (idx / w) % h;
        let z = idx / (w * h);
        Coord3i::new(x as i32, y as i32, z as i32)
    }

    pub fn to_volume(&self) -> Volume<T>
    where
        T: Clone,
    {
        Volume {
            dims: self.dims,
            data: self.data.to_vec(),
        }
    }
}

impl VolumeView<'_, u8> {
    /// Voxels outside the volume read as background.
    #[inline]
    pub fn is_object(&self, c: Coord3i) -> bool {
        self.get_coord(c).is_some_and(|&v| v != 0)
    }

    pub fn count_nonzero(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }
}

fn checked_len(dims: [usize; 3]) -> Result<usize, Error> {
    if dims.contains(&0) {
        return Err(Error::InvalidDimensions { dims });
    }

    let len = dims[0]
        .checked_mul(dims[1])
        .and_then(|v| v.checked_mul(dims[2]))
        .ok_or(Error::InvalidDimensions { dims })?;
    if i32::try_from(dims.iter().copied().max().unwrap_or(0)).is_err() {
        return Err(Error::InvalidDimensions { dims });
    }

    Ok(len)
}

#[inline]
fn linear_index(dims: [usize; 3], x: usize, y: usize, z: usize) -> Option<usize> {
    if x >= dims[0] || y >= dims[1] || z >= dims[2] {
        return None;
    }
    Some((z * dims[1] + y) * dims[0] + x)
}

#[inline]
fn coord_index(dims: [usize; 3], c: Coord3i) -> Option<usize> {
    if !c.is_valid() {
        return None;
    }
    linear_index(dims, c.x as usize, c.y as usize, c.z as usize)
}
