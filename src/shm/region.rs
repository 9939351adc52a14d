//! Named shared-memory regions.
//!
//! A [`SharedRegion`] maps a file under `/dev/shm` (the kernel's tmpfs
//! backing for POSIX shared memory objects) and views it as a single
//! fixed-layout record. The engine creates and unlinks regions; readers
//! only open existing files and never unlink, so a crash on either side
//! cannot corrupt the other's view — at worst a reader sees the region
//! disappear.

use super::error::TransportError;
use memmap2::MmapMut;
use std::fs::{self, OpenOptions};
use std::marker::PhantomData;
use std::mem;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Directory backing POSIX shared memory objects on Linux.
pub const DEFAULT_SHM_DIR: &str = "/dev/shm";

/// Marker for types that may live inside a shared region.
///
/// # Safety
///
/// Implementors must be `#[repr(C)]`, contain no pointers or references,
/// and be valid when every byte is zero — region creation zero-fills the
/// mapping and that state must be the type's correct initial state
/// (sequence 0, not ready, empty ring). All mutation of a mapped value
/// goes through interior mutability (atomics, `UnsafeCell`).
pub unsafe trait SharedLayout: Sized + Send + Sync {}

/// A typed view over one named shared-memory region.
///
/// The creating side (`owner`) removes the backing file on drop;
/// attached readers leave it in place.
pub struct SharedRegion<T: SharedLayout> {
    /// Well-known region name, e.g. `/hft_orderbook`.
    name: String,
    /// Backing file path.
    path: PathBuf,
    /// The live mapping. Kept for the lifetime of the region view.
    mmap: MmapMut,
    /// Whether this handle created the region and should unlink it.
    owner: bool,
    _marker: PhantomData<T>,
}

/// Resolve a region name like `/hft_orderbook` to its backing file.
fn region_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(name.trim_start_matches('/'))
}

impl<T: SharedLayout> SharedRegion<T> {
    /// Create (or reset) a region under [`DEFAULT_SHM_DIR`].
    ///
    /// The backing file is truncated and zero-filled, which is the
    /// layout's sentinel state. Call this only from the single process
    /// that owns the region.
    ///
    /// # Errors
    ///
    /// [`TransportError::Io`] when the file cannot be created, sized, or
    /// mapped. Failures here are fatal at startup.
    pub fn create(name: &str) -> Result<Self, TransportError> {
        Self::create_in(Path::new(DEFAULT_SHM_DIR), name)
    }

    /// Create (or reset) a region with an explicit backing directory.
    ///
    /// Used by tests to keep regions out of the system-wide namespace.
    pub fn create_in(dir: &Path, name: &str) -> Result<Self, TransportError> {
        let path = region_path(dir, name);
        let size = mem::size_of::<T>() as u64;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(|e| TransportError::Io {
                message: e.to_string(),
                path: Some(path.clone()),
            })?;

        // Zero-fills: a fresh region starts in its sentinel state.
        file.set_len(size).map_err(|e| TransportError::Io {
            message: e.to_string(),
            path: Some(path.clone()),
        })?;

        // SAFETY: the file was just created with the layout size and is
        // owned by this process; it is not truncated while mapped.
        let mmap = unsafe {
            MmapMut::map_mut(&file).map_err(|e| TransportError::Io {
                message: e.to_string(),
                path: Some(path.clone()),
            })?
        };

        debug!("created shared region {} ({size} bytes)", path.display());
        Ok(Self {
            name: name.to_string(),
            path,
            mmap,
            owner: true,
            _marker: PhantomData,
        })
    }

    /// Attach to an existing region under [`DEFAULT_SHM_DIR`].
    ///
    /// Readers only attach; they never create or unlink.
    ///
    /// # Errors
    ///
    /// [`TransportError::Io`] when the file is missing or cannot be
    /// mapped, [`TransportError::SizeMismatch`] when its size does not
    /// match the layout type.
    pub fn open(name: &str) -> Result<Self, TransportError> {
        Self::open_in(Path::new(DEFAULT_SHM_DIR), name)
    }

    /// Attach to an existing region with an explicit backing directory.
    pub fn open_in(dir: &Path, name: &str) -> Result<Self, TransportError> {
        let path = region_path(dir, name);
        let expected = mem::size_of::<T>() as u64;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| TransportError::Io {
                message: e.to_string(),
                path: Some(path.clone()),
            })?;

        let actual = file
            .metadata()
            .map_err(|e| TransportError::Io {
                message: e.to_string(),
                path: Some(path.clone()),
            })?
            .len();
        if actual != expected {
            return Err(TransportError::SizeMismatch {
                path,
                expected,
                actual,
            });
        }

        // SAFETY: size was just verified against the layout; the owner
        // never truncates a live region, only unlinks it, and an unlink
        // keeps this mapping valid.
        let mmap = unsafe {
            MmapMut::map_mut(&file).map_err(|e| TransportError::Io {
                message: e.to_string(),
                path: Some(path.clone()),
            })?
        };

        debug!("attached shared region {}", path.display());
        Ok(Self {
            name: name.to_string(),
            path,
            mmap,
            owner: false,
            _marker: PhantomData,
        })
    }

    /// The typed view of the mapped memory.
    #[must_use]
    pub fn get(&self) -> &T {
        // SAFETY: the mapping is at least `size_of::<T>()` bytes
        // (enforced at create/open), page alignment satisfies any
        // `repr(C)` field alignment, and `SharedLayout` guarantees every
        // byte pattern reachable through the region protocols is valid
        // for `T`. Mutation happens only through `T`'s interior
        // mutability, so handing out `&T` is sound.
        unsafe { &*self.mmap.as_ptr().cast::<T>() }
    }

    /// The well-known region name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the backing file still exists.
    ///
    /// A mapped region stays readable after an unlink; this lets readers
    /// detect that the writer has shut down and surface
    /// [`TransportError::RegionGone`].
    #[must_use]
    pub fn still_linked(&self) -> bool {
        self.path.exists()
    }
}

impl<T: SharedLayout> Drop for SharedRegion<T> {
    fn drop(&mut self) {
        if self.owner {
            if let Err(e) = fs::remove_file(&self.path) {
                warn!("failed to unlink shared region {}: {e}", self.path.display());
            } else {
                debug!("unlinked shared region {}", self.path.display());
            }
        }
    }
}

impl<T: SharedLayout> std::fmt::Debug for SharedRegion<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedRegion")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("owner", &self.owner)
            .field("size", &mem::size_of::<T>())
            .finish()
    }
}
