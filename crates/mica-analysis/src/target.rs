//! Compile-target description.
//!
//! The target decides the width of the machine-word kinds (`int`, `uint`,
//! `uintptr`, pointers) and one alignment quirk, and selects which
//! predeclared universe a checker works against.

use std::fmt;

/// Target operating system.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Os {
    Linux,
    Mac,
    Windows,
    Other,
}

/// Target architecture.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Arch {
    I386,
    Amd64,
    Arm,
    Arm64,
}

impl Arch {
    /// Word width in bits.
    #[inline]
    pub const fn bits(self) -> u32 {
        match self {
            Arch::I386 | Arch::Arm => 32,
            Arch::Amd64 | Arch::Arm64 => 64,
        }
    }
}

/// An (os, arch) pair.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Target {
    pub os: Os,
    pub arch: Arch,
}

impl Target {
    pub const fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// Word (and pointer) size in bytes.
    #[inline]
    pub const fn word_size(self) -> u32 {
        self.arch.bits() / 8
    }

    #[inline]
    pub const fn is_64bit(self) -> bool {
        self.arch.bits() > 32
    }

    /// Alignment of 8-byte scalars. 8 everywhere except linux/i386, where
    /// the ABI aligns them to 4.
    #[inline]
    pub const fn align64(self) -> u32 {
        match (self.os, self.arch) {
            (Os::Linux, Arch::I386) => 4,
            _ => 8,
        }
    }
}

impl Default for Target {
    /// linux/amd64, the reference target.
    fn default() -> Self {
        Self::new(Os::Linux, Arch::Amd64)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let os = match self.os {
            Os::Linux => "linux",
            Os::Mac => "mac",
            Os::Windows => "windows",
            Os::Other => "other",
        };
        let arch = match self.arch {
            Arch::I386 => "386",
            Arch::Amd64 => "amd64",
            Arch::Arm => "arm",
            Arch::Arm64 => "arm64",
        };
        write!(f, "{}/{}", os, arch)
    }
}
