// Shared test helpers for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

use reggie::core::config::{BuildSettings, DeclarationFiles, RunSettings};
use reggie::core::execution::MatrixSettings;

/// Stand-in for the simulation binary. It fails when `parameter.ini` says
/// `fail = yes` and sleeps when it declares `sleep = N`.
const SOLVER_SCRIPT: &str = r#"#!/bin/sh
echo "solver called with: $@"
if grep -q '^fail = yes' parameter.ini; then
  echo "deliberate failure" >&2
  exit 7
fi
delay=$(sed -n 's/^sleep = //p' parameter.ini)
if [ -n "$delay" ]; then
  sleep "$delay"
fi
exit 0
"#;

/// Stand-in for `cmake`: records its arguments and fails for `-DBROKEN=ON`.
const CONFIGURE_SCRIPT: &str = r#"#!/bin/sh
echo "$@" > configure_args.txt
for arg in "$@"; do
  if [ "$arg" = "-DBROKEN=ON" ]; then
    echo "configure: BROKEN is not supported" >&2
    exit 3
  fi
done
exit 0
"#;

/// Stand-in for an MPI launcher: drops `-np N` and runs the rest.
const LAUNCHER_SCRIPT: &str = r#"#!/bin/sh
echo "launcher $1 $2"
shift 2
exec "$@"
"#;

/// A scratch layout: `tools/` with the fake toolchain, `src/` as the base
/// directory, `checks/` for declarations and `out/` for the stage tree.
pub struct Fixture {
    pub dir: TempDir,
    pub tools: PathBuf,
    pub base_dir: PathBuf,
    pub check_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempdir().expect("Failed to create temporary directory");
        let root = dir.path().canonicalize().expect("Failed to canonicalize temp dir");
        let tools = root.join("tools");
        let base_dir = root.join("src");
        let check_dir = root.join("checks");
        let output_dir = root.join("out");
        for d in [&tools, &base_dir, &check_dir] {
            fs::create_dir_all(d).expect("Failed to create fixture directory");
        }

        let solver = write_script(&tools.join("solver.sh"), SOLVER_SCRIPT);
        write_script(&tools.join("configure.sh"), CONFIGURE_SCRIPT);
        write_script(&tools.join("launcher.sh"), LAUNCHER_SCRIPT);
        let make_script = format!(
            "#!/bin/sh\necho \"make $@\" >> make.log\ncp '{}' ./solver\nchmod +x ./solver\n",
            solver.display()
        );
        write_script(&tools.join("make.sh"), &make_script);

        Self {
            dir,
            tools,
            base_dir,
            check_dir,
            output_dir,
        }
    }

    pub fn root(&self) -> &Path {
        self.tools.parent().expect("tools has a parent")
    }

    pub fn build_settings(&self) -> BuildSettings {
        BuildSettings {
            configure_program: self.tools.join("configure.sh").display().to_string(),
            make_program: self.tools.join("make.sh").display().to_string(),
            jobs: Some(2),
        }
    }

    /// A `make` stand-in that links the solver and then fails on a later
    /// target. Returns its path for `BuildSettings::make_program`.
    pub fn make_that_fails_late(&self) -> String {
        let script = format!(
            "#!/bin/sh\necho \"make $@\" >> make.log\ncp '{}' ./solver\nchmod +x ./solver\necho \"make: *** [docs] Error 2\" >&2\nexit 2\n",
            self.tools.join("solver.sh").display()
        );
        write_script(&self.tools.join("make_fails.sh"), &script)
            .display()
            .to_string()
    }

    pub fn run_settings(&self) -> RunSettings {
        RunSettings {
            jobs: 1,
            timeout_secs: None,
            mpi_launcher: self.tools.join("launcher.sh").display().to_string(),
        }
    }

    pub fn settings(&self) -> MatrixSettings {
        MatrixSettings {
            base_dir: self.base_dir.clone(),
            check_dir: self.check_dir.clone(),
            output_dir: self.output_dir.clone(),
            build: self.build_settings(),
            run: self.run_settings(),
            files: DeclarationFiles::default(),
        }
    }

    /// Writes `builds.ini` into the check directory.
    pub fn builds(&self, content: &str) {
        fs::write(self.check_dir.join("builds.ini"), content).expect("Failed to write builds.ini");
    }

    /// Creates an example directory with the given declaration files.
    pub fn example(&self, name: &str, files: &[(&str, &str)]) -> PathBuf {
        let dir = self.check_dir.join(name);
        fs::create_dir_all(&dir).expect("Failed to create example directory");
        for (file, content) in files {
            fs::write(dir.join(file), content).expect("Failed to write example file");
        }
        dir
    }

    /// Writes a `reggie.toml` pointing at the fixture and returns its path.
    pub fn config_file(&self, run_jobs: usize) -> PathBuf {
        let content = format!(
            r#"language = "en"
base_dir = "src"
check_dir = "checks"
output_dir = "out"

[build]
configure_program = "{}"
make_program = "{}"
jobs = 2

[run]
jobs = {}
mpi_launcher = "{}"
"#,
            self.tools.join("configure.sh").display(),
            self.tools.join("make.sh").display(),
            run_jobs,
            self.tools.join("launcher.sh").display()
        );
        let path = self.root().join("reggie.toml");
        fs::write(&path, content).expect("Failed to write reggie.toml");
        path
    }
}

/// Writes an executable shell script and returns its path.
pub fn write_script(path: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    fs::write(path, body).expect("Failed to write script");
    let mut permissions = fs::metadata(path).expect("Failed to stat script").permissions();
    permissions.set_mode(0o755);
    fs::set_permissions(path, permissions).expect("Failed to make script executable");
    path.to_path_buf()
}

/// The simple example used by most scenarios: one command line, one run.
pub fn simple_example_files() -> Vec<(&'static str, &'static str)> {
    vec![
        ("command_line.ini", "ranks = 1\n"),
        ("run.ini", "N = 8\n"),
        ("mesh.h5", "fake mesh data\n"),
    ]
}
