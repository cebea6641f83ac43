use std::cmp::Ordering;
use std::env;
use std::process::Command;

// CPU features the vector path can be built on
#[derive(PartialEq, Eq, Debug)]
struct CpuFeature {
    name: &'static str,
    // every token must be present in the platform feature listing
    required: &'static [&'static str],
    cfg_flag: &'static str,
    detected: bool,
}

impl CpuFeature {
    // Lowest number == Highest Priority
    fn priority(&self) -> usize {
        match self.name {
            "avx2" => 0,
            "neon" => 1,
            _ => usize::MAX,
        }
    }

    fn features() -> Vec<CpuFeature> {
        vec![
            CpuFeature {
                name: "avx2",
                required: &["avx2", "fma"],
                cfg_flag: "avx2",
                detected: false,
            },
            CpuFeature {
                name: "neon",
                required: &["neon"],
                cfg_flag: "neon",
                detected: false,
            },
        ]
    }
}

impl Ord for CpuFeature {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority().cmp(&other.priority())
    }
}

impl PartialOrd for CpuFeature {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

trait CpuFeatureDetector {
    fn detect_features(&self, features: &mut [CpuFeature]);
    fn is_applicable(&self) -> bool;
}

// Linux CPU feature detector
struct LinuxDetector;
impl CpuFeatureDetector for LinuxDetector {
    fn detect_features(&self, features: &mut [CpuFeature]) {
        if let Ok(cpuinfo) = std::fs::read_to_string("/proc/cpuinfo") {
            let contents = cpuinfo.to_lowercase();
            let flags: Vec<&str> = contents
                .lines()
                .filter(|line| line.starts_with("flags") || line.starts_with("features"))
                .flat_map(|line| line.split_whitespace())
                .collect();

            for feature in features.iter_mut() {
                feature.detected = feature
                    .required
                    .iter()
                    .all(|required| flags.contains(required));
            }
        }
    }

    fn is_applicable(&self) -> bool {
        cfg!(target_os = "linux")
    }
}

// macOS CPU feature detector
struct MacOSDetector;
impl CpuFeatureDetector for MacOSDetector {
    fn detect_features(&self, features: &mut [CpuFeature]) {
        let output = Command::new("sysctl").args(["-a"]).output();

        if let Ok(output) = output {
            let contents = String::from_utf8_lossy(&output.stdout).to_lowercase();

            for feature in features.iter_mut() {
                feature.detected = match feature.name {
                    "avx2" => {
                        contents.contains("hw.optional.avx2_0: 1")
                            && contents.contains("hw.optional.fma: 1")
                    }
                    "neon" => contents.contains("hw.optional.neon: 1"),
                    _ => false,
                }
            }
        }
    }

    fn is_applicable(&self) -> bool {
        cfg!(target_os = "macos")
    }
}

struct PlatformDetector;
impl PlatformDetector {
    fn cpu_features_detectors() -> Vec<Box<dyn CpuFeatureDetector>> {
        vec![Box::new(LinuxDetector), Box::new(MacOSDetector)]
    }

    fn detect_cpu_features(features: &mut [CpuFeature]) {
        for detector in Self::cpu_features_detectors() {
            if detector.is_applicable() {
                detector.detect_features(features);
                break;
            }
        }
    }

    // NEON is part of the aarch64 baseline, so it never depends on detection.
    fn apply_target_baseline(features: &mut [CpuFeature], target_arch: &str) {
        for feature in features.iter_mut() {
            if feature.name == "neon" {
                feature.detected = target_arch == "aarch64";
            }
        }
    }

    fn apply(features: &mut [CpuFeature], target_arch: &str) {
        features.sort();

        let cfg_flag = features
            .iter()
            .filter(|cpu_feature| match cpu_feature.name {
                "avx2" => target_arch == "x86_64" || target_arch == "x86",
                "neon" => target_arch == "aarch64",
                _ => false,
            })
            .find(|cpu_feature| cpu_feature.detected)
            .map(|cpu_feature| cpu_feature.cfg_flag)
            .unwrap_or("fallback");

        println!("cargo:rustc-cfg={cfg_flag}");

        println!("cargo::rustc-check-cfg=cfg(avx2)");
        println!("cargo::rustc-check-cfg=cfg(neon)");
        println!("cargo::rustc-check-cfg=cfg(fallback)");
    }
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let mut features = CpuFeature::features();

    let target_arch = env::var("CARGO_CFG_TARGET_ARCH").unwrap_or_default();

    let host = env::var("HOST").unwrap_or_default();
    let target = env::var("TARGET").unwrap_or_default();

    // Only run CPU detection for native builds
    if host == target {
        PlatformDetector::detect_cpu_features(&mut features);
    }
    PlatformDetector::apply_target_baseline(&mut features, &target_arch);

    PlatformDetector::apply(&mut features, &target_arch);
}
