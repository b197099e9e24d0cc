//! Target, family, and architecture definitions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TargetError};

/// Operating-system family of a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    Osx,
    Ios,
    Linux,
    Mingw,
    Android,
    Wasm,
}

impl Family {
    /// Suffix of produced executables.
    pub fn exe_suffix(self) -> &'static str {
        match self {
            Family::Osx | Family::Ios | Family::Linux => "kexe",
            Family::Mingw => "exe",
            Family::Android => "so",
            Family::Wasm => "wasm",
        }
    }

    pub fn dynamic_prefix(self) -> &'static str {
        match self {
            Family::Mingw | Family::Wasm => "",
            _ => "lib",
        }
    }

    pub fn dynamic_suffix(self) -> &'static str {
        match self {
            Family::Osx | Family::Ios => "dylib",
            Family::Linux | Family::Android => "so",
            Family::Mingw => "dll",
            Family::Wasm => "wasm",
        }
    }

    pub fn static_prefix(self) -> &'static str {
        match self {
            Family::Wasm => "",
            _ => "lib",
        }
    }

    pub fn static_suffix(self) -> &'static str {
        match self {
            Family::Wasm => "wasm",
            _ => "a",
        }
    }

    /// Whether this family uses the Apple toolchain layout.
    pub fn is_apple(self) -> bool {
        matches!(self, Family::Osx | Family::Ios)
    }

    /// Upper-case name used in preprocessor defines (e.g. `KONAN_LINUX`).
    pub fn define_name(self) -> &'static str {
        match self {
            Family::Osx => "MACOSX",
            Family::Ios => "IOS",
            Family::Linux => "LINUX",
            Family::Mingw => "WINDOWS",
            Family::Android => "ANDROID",
            Family::Wasm => "WASM",
        }
    }
}

/// CPU architecture of a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Architecture {
    X64,
    Arm64,
    Arm32,
    Mips32,
    Mipsel32,
    Wasm32,
}

impl Architecture {
    /// Pointer width in bits.
    pub fn bitness(self) -> u32 {
        match self {
            Architecture::X64 | Architecture::Arm64 => 64,
            Architecture::Arm32
            | Architecture::Mips32
            | Architecture::Mipsel32
            | Architecture::Wasm32 => 32,
        }
    }

    /// Upper-case name used in preprocessor defines (e.g. `KONAN_X64`).
    pub fn define_name(self) -> &'static str {
        match self {
            Architecture::X64 => "X64",
            Architecture::Arm64 => "ARM64",
            Architecture::Arm32 => "ARM32",
            Architecture::Mips32 => "MIPS32",
            Architecture::Mipsel32 => "MIPSEL32",
            Architecture::Wasm32 => "WASM32",
        }
    }
}

/// A compilation target known to the toolchain.
///
/// The serialized form is the target name used as a key suffix in the
/// property file (`linkerKonanFlags.raspberrypi`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KonanTarget {
    AndroidArm32,
    AndroidArm64,
    #[serde(alias = "ios")]
    Iphone,
    IphoneSim,
    Linux,
    Mingw,
    #[serde(alias = "macos", alias = "osx")]
    Macbook,
    #[serde(alias = "raspberry_pi")]
    Raspberrypi,
    LinuxMips32,
    LinuxMipsel32,
    Wasm32,
}

impl KonanTarget {
    /// Every known target, in declaration order.
    pub const ALL: [KonanTarget; 11] = [
        KonanTarget::AndroidArm32,
        KonanTarget::AndroidArm64,
        KonanTarget::Iphone,
        KonanTarget::IphoneSim,
        KonanTarget::Linux,
        KonanTarget::Mingw,
        KonanTarget::Macbook,
        KonanTarget::Raspberrypi,
        KonanTarget::LinuxMips32,
        KonanTarget::LinuxMipsel32,
        KonanTarget::Wasm32,
    ];

    /// Canonical name, as spelled in property keys.
    pub fn name(self) -> &'static str {
        match self {
            KonanTarget::AndroidArm32 => "android_arm32",
            KonanTarget::AndroidArm64 => "android_arm64",
            KonanTarget::Iphone => "iphone",
            KonanTarget::IphoneSim => "iphone_sim",
            KonanTarget::Linux => "linux",
            KonanTarget::Mingw => "mingw",
            KonanTarget::Macbook => "macbook",
            KonanTarget::Raspberrypi => "raspberrypi",
            KonanTarget::LinuxMips32 => "linux_mips32",
            KonanTarget::LinuxMipsel32 => "linux_mipsel32",
            KonanTarget::Wasm32 => "wasm32",
        }
    }

    pub fn family(self) -> Family {
        match self {
            KonanTarget::AndroidArm32 | KonanTarget::AndroidArm64 => Family::Android,
            KonanTarget::Iphone | KonanTarget::IphoneSim => Family::Ios,
            KonanTarget::Linux
            | KonanTarget::Raspberrypi
            | KonanTarget::LinuxMips32
            | KonanTarget::LinuxMipsel32 => Family::Linux,
            KonanTarget::Mingw => Family::Mingw,
            KonanTarget::Macbook => Family::Osx,
            KonanTarget::Wasm32 => Family::Wasm,
        }
    }

    pub fn architecture(self) -> Architecture {
        match self {
            KonanTarget::AndroidArm32 | KonanTarget::Raspberrypi => Architecture::Arm32,
            KonanTarget::AndroidArm64 | KonanTarget::Iphone => Architecture::Arm64,
            KonanTarget::IphoneSim
            | KonanTarget::Linux
            | KonanTarget::Mingw
            | KonanTarget::Macbook => Architecture::X64,
            KonanTarget::LinuxMips32 => Architecture::Mips32,
            KonanTarget::LinuxMipsel32 => Architecture::Mipsel32,
            KonanTarget::Wasm32 => Architecture::Wasm32,
        }
    }

    /// Whether the toolchain can run on this target.
    pub fn is_host_capable(self) -> bool {
        matches!(
            self,
            KonanTarget::Linux | KonanTarget::Macbook | KonanTarget::Mingw
        )
    }

    /// `self`, if the toolchain can run on it.
    pub fn as_host(self) -> Result<KonanTarget> {
        if self.is_host_capable() {
            Ok(self)
        } else {
            Err(TargetError::UnsupportedHost {
                os: self.family().define_name().to_ascii_lowercase(),
                arch: self.architecture().define_name().to_ascii_lowercase(),
            })
        }
    }

    /// Map an OS/architecture pair (as in `std::env::consts`) to a host target.
    pub fn host_for(os: &str, arch: &str) -> Result<KonanTarget> {
        match (os, arch) {
            ("linux", "x86_64") => Ok(KonanTarget::Linux),
            // Apple silicon runs the x64 toolchain under translation.
            ("macos", "x86_64") | ("macos", "aarch64") => Ok(KonanTarget::Macbook),
            ("windows", "x86_64") => Ok(KonanTarget::Mingw),
            _ => Err(TargetError::UnsupportedHost {
                os: os.to_string(),
                arch: arch.to_string(),
            }),
        }
    }

    /// The host target for the running machine.
    pub fn detect_host() -> Result<KonanTarget> {
        Self::host_for(std::env::consts::OS, std::env::consts::ARCH)
    }
}

impl fmt::Display for KonanTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KonanTarget {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        if let Some(target) = KonanTarget::ALL
            .iter()
            .copied()
            .find(|t| t.name() == normalized)
        {
            return Ok(target);
        }
        match normalized.as_str() {
            "ios" => Ok(KonanTarget::Iphone),
            "macos" | "osx" => Ok(KonanTarget::Macbook),
            "raspberry_pi" => Ok(KonanTarget::Raspberrypi),
            _ => Err(TargetError::UnknownTarget {
                name: s.to_string(),
            }),
        }
    }
}
