//! Disc image format registry

/// Extension and size based format detection
pub mod detect;
/// Raw image geometry types and presets
pub mod geometry;

pub use detect::{resolve, resolve_extension, Detection};
pub use geometry::{Density, Geometry, SideLayout};

/// The disc image encodings this crate knows how to mount
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    /// Acorn DFS single-sided sector dump (.ssd)
    Ssd,
    /// Acorn DFS double-sided sector dump (.dsd)
    Dsd,
    /// Acorn ADFS M sector dump (.adf)
    Adf,
    /// Acorn ADFS L sector dump (.adl)
    Adl,
    /// FDI container image (.fdi), self-describing geometry
    Fdi,
}

impl FormatKind {
    /// Human-readable format name
    pub fn name(&self) -> &'static str {
        match self {
            FormatKind::Ssd => "DFS single-sided",
            FormatKind::Dsd => "DFS double-sided",
            FormatKind::Adf => "ADFS M",
            FormatKind::Adl => "ADFS L",
            FormatKind::Fdi => "FDI container",
        }
    }

    /// The registered filename extension, lower case
    pub fn extension(&self) -> &'static str {
        match self {
            FormatKind::Ssd => "ssd",
            FormatKind::Dsd => "dsd",
            FormatKind::Adf => "adf",
            FormatKind::Adl => "adl",
            FormatKind::Fdi => "fdi",
        }
    }

    /// Canonical image size in bytes, or `None` for self-describing
    /// container formats
    pub fn canonical_size(&self) -> Option<usize> {
        self.geometry().map(|g| g.total_capacity())
    }

    /// Default raw geometry, or `None` for container formats
    pub fn geometry(&self) -> Option<Geometry> {
        match self {
            FormatKind::Ssd => Some(Geometry::dfs_single()),
            FormatKind::Dsd => Some(Geometry::dfs_double()),
            FormatKind::Adf => Some(Geometry::adfs_m()),
            FormatKind::Adl => Some(Geometry::adfs_l()),
            FormatKind::Fdi => None,
        }
    }
}

/// One entry in the format registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatDescriptor {
    /// Format this entry describes
    pub kind: FormatKind,
    /// Filename extension, lower case, matched case-insensitively
    pub extension: &'static str,
}

/// The registry of supported formats. Extensions are unique.
pub const REGISTRY: &[FormatDescriptor] = &[
    FormatDescriptor {
        kind: FormatKind::Ssd,
        extension: "ssd",
    },
    FormatDescriptor {
        kind: FormatKind::Dsd,
        extension: "dsd",
    },
    FormatDescriptor {
        kind: FormatKind::Adf,
        extension: "adf",
    },
    FormatDescriptor {
        kind: FormatKind::Adl,
        extension: "adl",
    },
    FormatDescriptor {
        kind: FormatKind::Fdi,
        extension: "fdi",
    },
];

/// Look an extension up in the registry, case-insensitively
pub fn lookup_extension(ext: &str) -> Option<FormatKind> {
    REGISTRY
        .iter()
        .find(|d| d.extension.eq_ignore_ascii_case(ext))
        .map(|d| d.kind)
}
