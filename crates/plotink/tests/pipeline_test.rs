//! End-to-end pipeline tests against a stub toolchain.
//!
//! Shell-script stand-ins for the compiler, rasterizer, and uploader let the
//! whole orchestration run without a TeX installation: the stub rasterizer
//! always emits the same pre-rendered PNG, so fingerprints are predictable.

#![cfg(unix)]

use plotink::{
    CaseRegistry, Error, Fingerprint, FnCase, Harness, HarnessConfig, UploadPolicy, Verdict,
};
use plotink_figure::{Axes, Figure, Series};
use std::os::unix::fs::PermissionsExt as _;
use std::path::{Path, PathBuf};

fn sample_figure() -> Figure {
    let mut axes = Axes::new().with_xlabel("x").with_ylabel("y");
    axes.push_series(Series::line(vec![(0.0, 0.0), (1.0, 1.0), (2.0, 4.0)]).with_label("quad"));
    Figure::single(axes)
}

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}")).expect("write script");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).expect("chmod");
    path
}

struct StubToolchain {
    _dir: tempfile::TempDir,
    compiler: PathBuf,
    rasterizer: PathBuf,
    uploader: PathBuf,
    canned_png: PathBuf,
}

impl StubToolchain {
    /// Build stub tools plus the canned PNG the rasterizer always produces.
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");

        let canned_png = dir.path().join("canned.png");
        let image = image::RgbaImage::from_fn(96, 96, |x, y| {
            if (x / 12 + y / 12) % 2 == 0 {
                image::Rgba([30, 60, 120, 255])
            } else {
                image::Rgba([240, 240, 240, 255])
            }
        });
        image.save(&canned_png).expect("save canned png");

        // $2 is the wrapper file name; the compiler's jobname output is the
        // same stem with a .pdf extension.
        let compiler = write_script(
            dir.path(),
            "stub-latex",
            "printf 'This is stub-latex\\n'\nbase=\"${2%.tex}\"\nprintf '%%PDF-stub\\n' > \"$base.pdf\"\n",
        );
        // pdftoppm CLI: -rx <dpi> -ry <dpi> -png <pdf> <prefix>
        let rasterizer = write_script(
            dir.path(),
            "stub-ppm",
            &format!("cp {} \"$7-1.png\"\n", canned_png.display()),
        );
        let uploader = write_script(
            dir.path(),
            "stub-curl",
            "echo \"https://share.example/$(basename \"$2\")\"\n",
        );

        Self {
            _dir: dir,
            compiler,
            rasterizer,
            uploader,
            canned_png,
        }
    }

    fn config(&self, workspace_root: &Path) -> HarnessConfig {
        HarnessConfig {
            compiler: self.compiler.to_string_lossy().to_string(),
            rasterizer: self.rasterizer.to_string_lossy().to_string(),
            uploader: self.uploader.to_string_lossy().to_string(),
            upload: UploadPolicy::Never,
            workspace_root: Some(workspace_root.to_path_buf()),
            ..Default::default()
        }
    }

    fn canned_fingerprint(&self) -> Fingerprint {
        Fingerprint::of_image(&self.canned_png).expect("fingerprint")
    }
}

#[test]
fn matching_fingerprint_passes_without_uploads() {
    let stub = StubToolchain::new();
    let root = tempfile::tempdir().expect("root");
    let harness = Harness::new(stub.config(root.path()));

    let expected = stub.canned_fingerprint().to_string();
    let case = FnCase::new("simple_line", expected.clone(), sample_figure);

    let verdict = harness.run_case(&case).expect("pipeline ok");
    match verdict {
        Verdict::Pass { case, fingerprint } => {
            assert_eq!(case, "simple_line");
            assert_eq!(fingerprint.to_string(), expected);
        }
        other => panic!("expected pass, got {other:?}"),
    }
}

#[test]
fn pipeline_leaves_all_artifacts_in_one_workspace() {
    let stub = StubToolchain::new();
    let root = tempfile::tempdir().expect("root");
    let harness = Harness::new(stub.config(root.path()));

    let case = FnCase::new(
        "artifact_audit",
        stub.canned_fingerprint().to_string(),
        sample_figure,
    );
    harness.run_case(&case).expect("pipeline ok");

    let mut entries: Vec<PathBuf> = std::fs::read_dir(root.path())
        .expect("read root")
        .map(|entry| entry.expect("entry").path())
        .collect();
    assert_eq!(entries.len(), 1, "exactly one workspace: {entries:?}");
    let workspace = entries.pop().expect("workspace dir");
    assert!(
        workspace
            .file_name()
            .expect("name")
            .to_string_lossy()
            .starts_with("artifact_audit-")
    );

    for suffix in ["_tikz.tex", ".tex", ".pdf", "-1.png", "_reference.pdf"] {
        let path = workspace.join(format!("artifact_audit{suffix}"));
        assert!(path.is_file(), "missing artifact {}", path.display());
    }

    let markup =
        std::fs::read_to_string(workspace.join("artifact_audit_tikz.tex")).expect("markup");
    assert!(markup.contains("\\begin{axis}"));
    assert!(markup.contains("width=7.5cm,"));

    let wrapper = std::fs::read_to_string(workspace.join("artifact_audit.tex")).expect("wrapper");
    assert!(wrapper.contains("\\documentclass{standalone}"));
    assert!(wrapper.contains("\\input{artifact_audit_tikz.tex}"));

    let reference = std::fs::read(workspace.join("artifact_audit_reference.pdf")).expect("ref");
    assert!(reference.starts_with(b"%PDF-"));
}

#[test]
fn mismatch_fails_with_distance_and_no_uploads_when_disabled() {
    let stub = StubToolchain::new();
    let root = tempfile::tempdir().expect("root");
    let harness = Harness::new(stub.config(root.path()));

    // Flip the low bit of the canned fingerprint.
    let expected = Fingerprint::from_bits(stub.canned_fingerprint().bits() ^ 1);
    let case = FnCase::new("bar_chart", expected.to_string(), sample_figure);

    let verdict = harness.run_case(&case).expect("pipeline ok");
    match verdict {
        Verdict::Fail {
            computed,
            expected: reported,
            distance,
            max_distance,
            uploads,
            artifacts,
            ..
        } => {
            assert_eq!(computed, stub.canned_fingerprint());
            assert_eq!(reported, expected);
            assert_eq!(distance, 1);
            assert_eq!(max_distance, 64);
            assert!(uploads.is_empty());
            assert!(artifacts.raster.is_file());
        }
        other => panic!("expected fail, got {other:?}"),
    }
}

#[test]
fn headless_mismatch_uploads_document_raster_reference_in_order() {
    let stub = StubToolchain::new();
    let root = tempfile::tempdir().expect("root");
    let mut config = stub.config(root.path());
    config.upload = UploadPolicy::Always;
    let harness = Harness::new(config);

    let expected = Fingerprint::from_bits(!stub.canned_fingerprint().bits());
    let case = FnCase::new("scatter_points", expected.to_string(), sample_figure);

    let verdict = harness.run_case(&case).expect("pipeline ok");
    let Verdict::Fail { uploads, .. } = verdict else {
        panic!("expected fail");
    };
    assert_eq!(uploads.len(), 3);
    assert_eq!(uploads[0].url, "https://share.example/scatter_points.pdf");
    assert_eq!(uploads[1].url, "https://share.example/scatter_points-1.png");
    assert_eq!(
        uploads[2].url,
        "https://share.example/scatter_points_reference.pdf"
    );
}

#[test]
fn compiler_failure_is_a_toolchain_error_not_a_mismatch() {
    let stub = StubToolchain::new();
    let root = tempfile::tempdir().expect("root");
    let mut config = stub.config(root.path());
    let broken = write_script(
        stub._dir.path(),
        "broken-latex",
        "echo '! Undefined control sequence.' >&2\nexit 1\n",
    );
    config.compiler = broken.to_string_lossy().to_string();
    let harness = Harness::new(config);

    let case = FnCase::new(
        "simple_line",
        stub.canned_fingerprint().to_string(),
        sample_figure,
    );
    let err = harness.run_case(&case).unwrap_err();
    match err {
        Error::Toolchain { output, .. } => {
            assert!(output.contains("Undefined control sequence"));
        }
        other => panic!("expected Toolchain error, got {other:?}"),
    }
}

#[test]
fn rasterizer_without_page_output_is_a_missing_artifact() {
    let stub = StubToolchain::new();
    let root = tempfile::tempdir().expect("root");
    let mut config = stub.config(root.path());
    let silent = write_script(stub._dir.path(), "silent-ppm", "exit 0\n");
    config.rasterizer = silent.to_string_lossy().to_string();
    let harness = Harness::new(config);

    let case = FnCase::new(
        "simple_line",
        stub.canned_fingerprint().to_string(),
        sample_figure,
    );
    let err = harness.run_case(&case).unwrap_err();
    assert!(matches!(err, Error::MissingArtifact { .. }));
}

#[test]
fn batch_isolates_failures_between_cases() {
    let stub = StubToolchain::new();
    let root = tempfile::tempdir().expect("root");
    let harness = Harness::new(stub.config(root.path()));

    let good = stub.canned_fingerprint();
    let bad = Fingerprint::from_bits(good.bits() ^ 0xff);

    let mut registry = CaseRegistry::new();
    registry.register(FnCase::new("a_passes", good.to_string(), sample_figure));
    registry.register(FnCase::new("b_fails", bad.to_string(), sample_figure));
    registry.register(FnCase::new("c_passes", good.to_string(), sample_figure));

    let report = harness.run_all(&registry);
    assert_eq!(report.outcomes.len(), 3);
    assert!(!report.all_passed());
    assert_eq!(report.passed(), 2);
    assert_eq!(report.failed(), 1);
    assert!(report.outcomes[0].is_pass());
    assert!(!report.outcomes[1].is_pass());
    assert!(report.outcomes[2].is_pass());
}

#[test]
fn pipeline_is_deterministic_for_fixed_inputs() {
    let stub = StubToolchain::new();
    let root = tempfile::tempdir().expect("root");
    let harness = Harness::new(stub.config(root.path()));

    let case = FnCase::new(
        "simple_line",
        stub.canned_fingerprint().to_string(),
        sample_figure,
    );
    for _ in 0..3 {
        assert!(harness.run_case(&case).expect("pipeline ok").is_pass());
    }
}
