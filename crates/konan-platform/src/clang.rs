//! Clang invocation wiring.

use std::path::{Path, PathBuf};

use konan_properties::{keys, KonanPropertyValues};
use konan_target::{Family, KonanTarget};

use crate::configurables::{require, Configurables};
use crate::error::Result;

/// Clang search paths and arguments for one configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClangArgs {
    target: KonanTarget,
    host: KonanTarget,
    llvm_bin: PathBuf,
    bin_dir: PathBuf,
    common_clang_args: Vec<String>,
    specific_clang_args: Vec<String>,
    jdk_home: Option<PathBuf>,
}

impl ClangArgs {
    /// Derive clang wiring from `configurables`.
    ///
    /// Resolves the LLVM home and target toolchain (and, where the target
    /// needs them, the sysroot, quadruple, and minimum OS version) to
    /// absolute paths, so a dependency base directory must be configured.
    pub fn new(configurables: &Configurables) -> Result<Self> {
        let target = configurables.target();
        let host = configurables.host();
        let llvm_bin = configurables.absolute_llvm_home()?.join("bin");
        let toolchain = configurables.absolute_target_toolchain()?;
        let bin_dir = if host == KonanTarget::Macbook {
            toolchain.join("usr").join("bin")
        } else {
            toolchain.join("bin")
        };

        let mut common_clang_args = vec![
            format!("-B{}", bin_dir.display()),
            "-fno-stack-protector".to_string(),
        ];
        if configurables.gcc_toolchain().is_some() {
            common_clang_args.push(format!(
                "--gcc-toolchain={}",
                configurables.absolute_gcc_toolchain()?.display()
            ));
        }

        let specific_clang_args = specific_args(configurables)?;
        let jdk_home = configurables.jdk_home().map(PathBuf::from);

        tracing::debug!(konan_target = %target, host = %host, "derived clang arguments");
        Ok(ClangArgs {
            target,
            host,
            llvm_bin,
            bin_dir,
            common_clang_args,
            specific_clang_args,
            jdk_home,
        })
    }

    pub fn target(&self) -> KonanTarget {
        self.target
    }

    /// Directory holding the target toolchain binaries.
    pub fn bin_dir(&self) -> &Path {
        &self.bin_dir
    }

    /// Directories to search for clang and its helpers, LLVM first.
    pub fn clang_paths(&self) -> Vec<PathBuf> {
        vec![self.llvm_bin.clone(), self.bin_dir.clone()]
    }

    /// The clang executable from the LLVM distribution.
    pub fn clang_executable(&self) -> PathBuf {
        if self.host == KonanTarget::Mingw {
            self.llvm_bin.join("clang.exe")
        } else {
            self.llvm_bin.join("clang")
        }
    }

    pub fn common_clang_args(&self) -> &[String] {
        &self.common_clang_args
    }

    pub fn specific_clang_args(&self) -> &[String] {
        &self.specific_clang_args
    }

    pub fn clang_args(&self) -> Vec<String> {
        self.common_clang_args
            .iter()
            .chain(&self.specific_clang_args)
            .cloned()
            .collect()
    }

    /// Arguments for compiling the runtime's own C/C++ sources.
    pub fn clang_args_for_konan_sources(&self) -> Vec<String> {
        let mut args = self.clang_args();
        let mut defines = vec![
            format!("-DKONAN_{}=1", self.target.family().define_name()),
            format!("-DKONAN_{}=1", self.target.architecture().define_name()),
        ];
        if self.target.family().is_apple() {
            defines.push("-DKONAN_OBJC_INTEROP=1".to_string());
        }
        for define in defines {
            if !args.contains(&define) {
                args.push(define);
            }
        }
        args
    }

    /// Include flags for compiling JNI bridges on the host.
    ///
    /// Empty when `jdkHome` is not configured.
    pub fn host_compiler_args_for_jni(&self) -> Vec<String> {
        let Some(jdk) = &self.jdk_home else {
            return Vec::new();
        };
        let include = jdk.join("include");
        let platform_dir = match self.host.family() {
            Family::Osx => "darwin",
            Family::Mingw => "win32",
            _ => "linux",
        };
        vec![
            format!("-I{}", include.display()),
            format!("-I{}", include.join(platform_dir).display()),
        ]
    }

    /// Full clang command line: executable followed by [`Self::clang_args`].
    pub fn clang_command(&self) -> Vec<String> {
        let mut cmd = vec![self.clang_executable().display().to_string()];
        cmd.extend(self.clang_args());
        cmd
    }
}

fn specific_args(c: &Configurables) -> Result<Vec<String>> {
    let target = c.target();
    let elf_defines = |bits: u32| {
        vec![
            "-DUSE_GCC_UNWIND=1".to_string(),
            "-DUSE_ELF_SYMBOLS=1".to_string(),
            format!("-DELFSIZE={bits}"),
        ]
    };
    let sysroot_flag = || -> Result<String> {
        Ok(format!("--sysroot={}", c.absolute_target_sys_root()?.display()))
    };
    let quadruple = || -> Result<String> { Ok(require(c, keys::QUADRUPLE, c.target_arg())?) };
    let os_min = || -> Result<String> {
        Ok(require(c, keys::OS_VERSION_MIN, c.os_version_min())?)
    };
    let bits = target.architecture().bitness();

    let args = match target {
        KonanTarget::Linux => {
            let mut args = vec![sysroot_flag()?];
            args.extend(elf_defines(bits));
            args
        }
        KonanTarget::Raspberrypi => {
            let mut args = vec![
                "-target".to_string(),
                quadruple()?,
                "-mfpu=vfp".to_string(),
                "-mfloat-abi=hard".to_string(),
                sysroot_flag()?,
            ];
            args.extend(elf_defines(bits));
            args
        }
        KonanTarget::LinuxMips32 | KonanTarget::LinuxMipsel32 => {
            let mut args = vec!["-target".to_string(), quadruple()?, sysroot_flag()?];
            args.extend(elf_defines(bits));
            args
        }
        KonanTarget::Mingw => vec![
            "-target".to_string(),
            quadruple()?,
            sysroot_flag()?,
            "-Xclang".to_string(),
            "-flto-visibility-public-std".to_string(),
        ],
        KonanTarget::Macbook => vec![
            sysroot_flag()?,
            format!("-mmacosx-version-min={}", os_min()?),
        ],
        KonanTarget::Iphone => vec![
            "-stdlib=libc++".to_string(),
            "-arch".to_string(),
            "arm64".to_string(),
            "-isysroot".to_string(),
            c.absolute_target_sys_root()?.display().to_string(),
            format!("-miphoneos-version-min={}", os_min()?),
        ],
        KonanTarget::IphoneSim => vec![
            "-stdlib=libc++".to_string(),
            "-isysroot".to_string(),
            c.absolute_target_sys_root()?.display().to_string(),
            format!("-miphoneos-version-min={}", os_min()?),
        ],
        KonanTarget::AndroidArm32 | KonanTarget::AndroidArm64 => {
            let mut args = vec![
                "-target".to_string(),
                quadruple()?,
                sysroot_flag()?,
                "-D__ANDROID__".to_string(),
            ];
            args.extend(elf_defines(bits));
            args.push("-DKONAN_ANDROID".to_string());
            args
        }
        KonanTarget::Wasm32 => {
            let mut args = vec!["-target".to_string(), quadruple()?];
            args.extend(
                [
                    "-O1",
                    "-fno-rtti",
                    "-fno-exceptions",
                    "-DKONAN_WASM=1",
                    "-D_LIBCPP_ABI_VERSION=2",
                    "-D_LIBCPP_NO_EXCEPTIONS=1",
                    "-DKONAN_NO_FFI=1",
                    "-DKONAN_NO_THREADS=1",
                    "-DKONAN_NO_EXCEPTIONS=1",
                    "-DKONAN_INTERNAL_DLMALLOC=1",
                    "-DKONAN_INTERNAL_SNPRINTF=1",
                    "-DKONAN_INTERNAL_NOW=1",
                    "-nostdinc",
                    "-Xclang",
                    "-nobuiltininc",
                    "-Xclang",
                    "-nostdsysteminc",
                ]
                .map(String::from),
            );
            args
        }
    };
    Ok(args)
}

/// Clang wiring for a host/target pair.
#[derive(Debug, Clone)]
pub struct ClangManager {
    pub host_args: ClangArgs,
    pub target_args: ClangArgs,
}

impl ClangManager {
    pub fn new(host: &Configurables, target: &Configurables) -> Result<Self> {
        Ok(ClangManager {
            host_args: ClangArgs::new(host)?,
            target_args: ClangArgs::new(target)?,
        })
    }

    /// Search path for the clang that compiles host-side code.
    pub fn host_clang_path(&self) -> Vec<PathBuf> {
        self.host_args.clang_paths()
    }

    pub fn host_compiler_args_for_jni(&self) -> Vec<String> {
        self.host_args.host_compiler_args_for_jni()
    }

    /// Clang command line compiling for the target.
    pub fn target_clang_cmd(&self) -> Vec<String> {
        self.target_args.clang_command()
    }
}
