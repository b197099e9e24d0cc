//! Linker invocation wiring, one flavour per toolchain family.
//!
//! Every linker resolves its paths when it is created, so building a
//! command line afterwards cannot fail.

use std::fmt;
use std::path::{Path, PathBuf};

use konan_properties::{keys, KonanPropertyValues};
use konan_target::{Architecture, KonanTarget};

use crate::configurables::{require, Configurables, ConfigurablesKind};
use crate::error::Result;

/// Per-link switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkOptions {
    pub optimize: bool,
    pub debug: bool,
    /// Produce a shared library instead of an executable.
    pub dynamic: bool,
}

/// Builds linker command lines for a target.
pub trait LinkerFlags: fmt::Debug + Send + Sync {
    fn target(&self) -> KonanTarget;

    /// The program the command line starts with.
    fn linker_path(&self) -> &Path;

    fn link_command(&self, objects: &[String], executable: &str, options: &LinkOptions)
        -> Vec<String>;

    /// Keep only the static libraries among `binaries`.
    fn filter_static_libraries(&self, binaries: &[String]) -> Vec<String> {
        let suffix = format!(".{}", self.target().family().static_suffix());
        binaries
            .iter()
            .filter(|b| b.ends_with(&suffix))
            .cloned()
            .collect()
    }
}

/// Flag lists every linker appends depending on [`LinkOptions`].
#[derive(Debug, Clone, PartialEq, Eq)]
struct ModeFlags {
    optimization: Vec<String>,
    no_debug: Vec<String>,
    dynamic: Vec<String>,
    konan: Vec<String>,
}

impl ModeFlags {
    fn new(c: &Configurables) -> Self {
        ModeFlags {
            optimization: c.linker_optimization_flags(),
            no_debug: c.linker_no_debug_flags(),
            dynamic: c.linker_dynamic_flags(),
            konan: c.linker_konan_flags(),
        }
    }

    fn push(&self, cmd: &mut Vec<String>, options: &LinkOptions) {
        if options.optimize {
            cmd.extend(self.optimization.iter().cloned());
        }
        if !options.debug {
            cmd.extend(self.no_debug.iter().cloned());
        }
        if options.dynamic {
            cmd.extend(self.dynamic.iter().cloned());
        }
    }
}

fn path_arg(path: &Path) -> String {
    path.display().to_string()
}

/// GNU/Linux targets: `ld.gold` against a GCC sysroot.
#[derive(Debug, Clone)]
pub struct GccBasedLinker {
    target: KonanTarget,
    linker: PathBuf,
    sysroot: PathBuf,
    crt_dir: PathBuf,
    lib_gcc: PathBuf,
    llvm_lib: PathBuf,
    dynamic_linker: String,
    abi_specific_libraries: Vec<String>,
    flags: ModeFlags,
}

impl GccBasedLinker {
    pub fn new(c: &Configurables) -> Result<Self> {
        let sysroot = c.absolute_target_sys_root()?;
        let lib_gcc = sysroot.join(require(c, keys::LIB_GCC, c.lib_gcc())?);
        let crt_dir = if c.target().architecture().bitness() == 64 {
            sysroot.join("usr/lib64")
        } else {
            sysroot.join("usr/lib")
        };
        Ok(GccBasedLinker {
            target: c.target(),
            linker: c.absolute_target_toolchain()?.join("bin/ld.gold"),
            crt_dir,
            lib_gcc,
            llvm_lib: c.absolute_llvm_home()?.join("lib"),
            dynamic_linker: require(c, keys::DYNAMIC_LINKER, c.dynamic_linker())?,
            abi_specific_libraries: c.abi_specific_libraries(),
            flags: ModeFlags::new(c),
            sysroot,
        })
    }
}

impl LinkerFlags for GccBasedLinker {
    fn target(&self) -> KonanTarget {
        self.target
    }

    fn linker_path(&self) -> &Path {
        &self.linker
    }

    fn link_command(
        &self,
        objects: &[String],
        executable: &str,
        options: &LinkOptions,
    ) -> Vec<String> {
        let (crt_begin, crt_end) = if options.dynamic {
            ("crtbeginS.o", "crtendS.o")
        } else {
            ("crtbegin.o", "crtend.o")
        };

        let mut cmd = vec![
            path_arg(&self.linker),
            format!("--sysroot={}", self.sysroot.display()),
            "-export-dynamic".into(),
            "-z".into(),
            "relro".into(),
            "--build-id".into(),
            "--eh-frame-hdr".into(),
            "-dynamic-linker".into(),
            self.dynamic_linker.clone(),
            "-o".into(),
            executable.into(),
        ];
        if !options.dynamic {
            cmd.push(path_arg(&self.crt_dir.join("crt1.o")));
        }
        cmd.push(path_arg(&self.crt_dir.join("crti.o")));
        cmd.push(path_arg(&self.lib_gcc.join(crt_begin)));
        cmd.push(format!("-L{}", self.llvm_lib.display()));
        cmd.push(format!("-L{}", self.lib_gcc.display()));
        for lib in &self.abi_specific_libraries {
            cmd.push(format!("-L{}", self.sysroot.join(lib).display()));
        }
        for lib in ["../lib", "lib", "usr/lib"] {
            cmd.push(format!("-L{}", self.sysroot.join(lib).display()));
        }
        if options.dynamic {
            cmd.push("-shared".into());
        }
        self.flags.push(&mut cmd, options);
        cmd.extend(objects.iter().cloned());
        cmd.extend(self.flags.konan.iter().cloned());
        cmd.extend(
            [
                "-lgcc",
                "--as-needed",
                "-lgcc_s",
                "--no-as-needed",
                "-lc",
                "-lgcc",
                "--as-needed",
                "-lgcc_s",
                "--no-as-needed",
            ]
            .map(String::from),
        );
        cmd.push(path_arg(&self.lib_gcc.join(crt_end)));
        cmd.push(path_arg(&self.crt_dir.join("crtn.o")));
        cmd
    }
}

/// macOS and iOS targets: Apple `ld` with LTO support.
#[derive(Debug, Clone)]
pub struct MacOsBasedLinker {
    target: KonanTarget,
    linker: PathBuf,
    lib_lto: PathBuf,
    sysroot: PathBuf,
    arch: &'static str,
    os_version_min_flag: String,
    os_version_min: String,
    flags: ModeFlags,
}

impl MacOsBasedLinker {
    pub fn new(c: &Configurables) -> Result<Self> {
        let toolchain = c.absolute_target_toolchain()?;
        let target = c.target();
        let arch = match target.architecture() {
            Architecture::Arm64 => "arm64",
            _ => "x86_64",
        };
        let default_flag = match target {
            KonanTarget::Iphone => "-iphoneos_version_min",
            KonanTarget::IphoneSim => "-ios_simulator_version_min",
            _ => "-macosx_version_min",
        };
        Ok(MacOsBasedLinker {
            target,
            linker: toolchain.join("usr/bin/ld"),
            lib_lto: toolchain.join("usr/lib/libLTO.dylib"),
            sysroot: c.absolute_target_sys_root()?,
            arch,
            os_version_min_flag: c
                .os_version_min_flag_ld()
                .unwrap_or_else(|| default_flag.to_string()),
            os_version_min: require(c, keys::OS_VERSION_MIN, c.os_version_min())?,
            flags: ModeFlags::new(c),
        })
    }
}

impl LinkerFlags for MacOsBasedLinker {
    fn target(&self) -> KonanTarget {
        self.target
    }

    fn linker_path(&self) -> &Path {
        &self.linker
    }

    fn link_command(
        &self,
        objects: &[String],
        executable: &str,
        options: &LinkOptions,
    ) -> Vec<String> {
        let mut cmd = vec![
            path_arg(&self.linker),
            "-demangle".into(),
            "-object_path_lto".into(),
            "temporary.o".into(),
            "-lto_library".into(),
            path_arg(&self.lib_lto),
            "-dynamic".into(),
            "-arch".into(),
            self.arch.into(),
            self.os_version_min_flag.clone(),
            format!("{}.0", self.os_version_min),
            "-syslibroot".into(),
            path_arg(&self.sysroot),
            "-o".into(),
            executable.into(),
        ];
        cmd.extend(objects.iter().cloned());
        self.flags.push(&mut cmd, options);
        cmd.extend(self.flags.konan.iter().cloned());
        cmd.push("-lSystem".into());
        cmd
    }
}

/// Android targets: the NDK clang driver producing a shared object.
#[derive(Debug, Clone)]
pub struct AndroidLinker {
    target: KonanTarget,
    clang: PathBuf,
    flags: ModeFlags,
}

impl AndroidLinker {
    pub fn new(c: &Configurables) -> Result<Self> {
        Ok(AndroidLinker {
            target: c.target(),
            clang: c.absolute_target_toolchain()?.join("bin/clang"),
            flags: ModeFlags::new(c),
        })
    }
}

impl LinkerFlags for AndroidLinker {
    fn target(&self) -> KonanTarget {
        self.target
    }

    fn linker_path(&self) -> &Path {
        &self.clang
    }

    fn link_command(
        &self,
        objects: &[String],
        executable: &str,
        options: &LinkOptions,
    ) -> Vec<String> {
        // Always a shared object, always against liblog.
        let mut cmd = vec![
            path_arg(&self.clang),
            "-o".into(),
            executable.into(),
            "-fPIC".into(),
            "-shared".into(),
            "-llog".into(),
        ];
        cmd.extend(objects.iter().cloned());
        self.flags.push(&mut cmd, options);
        cmd.extend(self.flags.konan.iter().cloned());
        cmd
    }
}

/// MinGW-w64 targets: the toolchain's `clang++` driver.
#[derive(Debug, Clone)]
pub struct MingwLinker {
    target: KonanTarget,
    linker: PathBuf,
    flags: ModeFlags,
}

impl MingwLinker {
    pub fn new(c: &Configurables) -> Result<Self> {
        Ok(MingwLinker {
            target: c.target(),
            linker: c.absolute_target_toolchain()?.join("bin/clang++"),
            flags: ModeFlags::new(c),
        })
    }
}

impl LinkerFlags for MingwLinker {
    fn target(&self) -> KonanTarget {
        self.target
    }

    fn linker_path(&self) -> &Path {
        &self.linker
    }

    fn link_command(
        &self,
        objects: &[String],
        executable: &str,
        options: &LinkOptions,
    ) -> Vec<String> {
        let mut cmd = vec![path_arg(&self.linker), "-o".into(), executable.into()];
        cmd.extend(objects.iter().cloned());
        if options.dynamic {
            cmd.push("-shared".into());
        }
        self.flags.push(&mut cmd, options);
        cmd.extend(self.flags.konan.iter().cloned());
        cmd
    }
}

/// WebAssembly: `wasm-ld` from the LLVM distribution.
#[derive(Debug, Clone)]
pub struct WasmLinker {
    target: KonanTarget,
    linker: PathBuf,
    flags: ModeFlags,
}

impl WasmLinker {
    pub fn new(c: &Configurables) -> Result<Self> {
        Ok(WasmLinker {
            target: c.target(),
            linker: c.absolute_llvm_home()?.join("bin/wasm-ld"),
            flags: ModeFlags::new(c),
        })
    }
}

impl LinkerFlags for WasmLinker {
    fn target(&self) -> KonanTarget {
        self.target
    }

    fn linker_path(&self) -> &Path {
        &self.linker
    }

    fn link_command(
        &self,
        objects: &[String],
        executable: &str,
        options: &LinkOptions,
    ) -> Vec<String> {
        let mut cmd = vec![path_arg(&self.linker)];
        cmd.extend(objects.iter().cloned());
        cmd.push("-o".into());
        cmd.push(executable.into());
        // No shared libraries on wasm; only optimization and debug switches apply.
        let options = LinkOptions {
            dynamic: false,
            ..*options
        };
        self.flags.push(&mut cmd, &options);
        cmd.extend(self.flags.konan.iter().cloned());
        cmd
    }
}

/// Create the linker matching the kind of `configurables`.
pub fn linker(configurables: &Configurables) -> Result<Box<dyn LinkerFlags>> {
    let linker: Box<dyn LinkerFlags> = match configurables.kind() {
        ConfigurablesKind::Gcc => Box::new(GccBasedLinker::new(configurables)?),
        ConfigurablesKind::Apple => Box::new(MacOsBasedLinker::new(configurables)?),
        ConfigurablesKind::Android => Box::new(AndroidLinker::new(configurables)?),
        ConfigurablesKind::Mingw => Box::new(MingwLinker::new(configurables)?),
        ConfigurablesKind::Wasm => Box::new(WasmLinker::new(configurables)?),
    };
    tracing::debug!(konan_target = %configurables.target(), linker = %linker.linker_path().display(), "created linker");
    Ok(linker)
}
