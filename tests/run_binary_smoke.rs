use std::fs;
use std::path::PathBuf;
use std::process::Command;

fn unique_dir(name: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!(
        "sketchsweep_smoke_{}_{}",
        name,
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    fs::create_dir_all(&path).unwrap();
    path
}

#[test]
fn help_lists_sweep_flags() {
    let exe = env!("CARGO_BIN_EXE_sketchsweep");
    let output = Command::new(exe)
        .arg("--help")
        .output()
        .unwrap_or_else(|e| panic!("failed to run {exe}: {e}"));
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for flag in ["--config", "--program", "--jobs", "--skip-memory", "--baseline"] {
        assert!(stdout.contains(flag), "missing {flag} in help");
    }
}

#[test]
fn malformed_config_ends_the_run() {
    let dir = unique_dir("bad_config");
    let config = dir.join("harness.toml");
    fs::write(&config, "[phi_sweep\n").unwrap();

    let exe = env!("CARGO_BIN_EXE_sketchsweep");
    let output = Command::new(exe)
        .arg("--config")
        .arg(&config)
        .output()
        .unwrap_or_else(|e| panic!("failed to run {exe}: {e}"));

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("failed to parse config"),
        "unexpected stderr: {stderr}"
    );
    let _ = fs::remove_dir_all(&dir);
}

#[cfg(unix)]
#[test]
fn full_run_against_fake_program() {
    use std::os::unix::fs::PermissionsExt;

    let dir = unique_dir("full");
    let program = dir.join("fake_sketch.sh");
    fs::write(
        &program,
        "#!/bin/sh\n\
         echo \"Real K value: 12\"\n\
         echo \"Time to count $1 items: 2.0 secs\"\n\
         echo \"Time to stream items into sketch: 0.5 secs\"\n\
         printf 'True Positives: 10.000000\\t False Positives: 2.000000\\tFalse Negatives: 2.000000\\n'\n\
         echo \"Size of Sketch in Bytes: 4096\"\n\
         echo \"precision: 83.33 percent\"\n\
         echo \"recall: 83.33 percent\"\n",
    )
    .unwrap();
    fs::set_permissions(&program, fs::Permissions::from_mode(0o755)).unwrap();

    let config = dir.join("harness.toml");
    fs::write(
        &config,
        format!(
            "[program]\npath = \"{}\"\nbuild_command = [\"true\"]\n\n\
             [phi_sweep]\ncount = 3\nn_items = 1000\n\n\
             [memory_sweep]\nn_items = 1000\n\
             [[memory_sweep.runs]]\nsketch = \"cms\"\nbudgets = [512, 1024]\n\n\
             [output]\ndir = \"{}\"\n",
            program.display(),
            dir.join("charts").display()
        ),
    )
    .unwrap();

    let exe = env!("CARGO_BIN_EXE_sketchsweep");
    let output = Command::new(exe)
        .env("RUST_LOG", "debug")
        .arg("--config")
        .arg(&config)
        .arg("--dump-json")
        .output()
        .unwrap_or_else(|e| panic!("failed to run {exe}: {e}"));
    if !output.status.success() {
        panic!(
            "harness failed: status={} stderr={}",
            output.status,
            String::from_utf8_lossy(&output.stderr)
        );
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"phi_results\""));
    assert!(stdout.contains("\"buckets\": 1024"));
    let charts = fs::read_dir(dir.join("charts")).unwrap().count();
    assert_eq!(charts, 4);

    let _ = fs::remove_dir_all(&dir);
}
