use std::path::PathBuf;
use std::process::Command;

use pillow_generator::Project;
use pillow_generator::layer::Layer;
use pillow_generator::params::ParamTarget;
use pillow_generator::project_file::save_project;

fn pillowgen() -> Command {
    let exe = std::env::var_os("CARGO_BIN_EXE_pillowgen")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) { "pillowgen.exe" } else { "pillowgen" });
            p
        });
    Command::new(exe)
}

#[test]
fn generate_writes_python_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut project = Project::new();
    let title = Layer::new_text("Title", "Hello");
    let id = title.id;
    project.add_layer(title);
    project.set_parameter(ParamTarget::Text(id), true);

    let project_path = dir.path().join("card.pgp");
    save_project(&project, &project_path).unwrap();
    let out_path = dir.path().join("card.py");

    let status = pillowgen()
        .args(["generate", "--in"])
        .arg(&project_path)
        .args(["--function", "make_card", "--save-param", "dest", "--out"])
        .arg(&out_path)
        .status()
        .unwrap();
    assert!(status.success());

    let source = std::fs::read_to_string(&out_path).unwrap();
    assert!(source.contains("def make_card(dest: str, text: str):"));
    assert!(source.contains("result.save(dest)"));
}

#[test]
fn params_lists_signature_and_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut project = Project::new();
    let title = Layer::new_text("Title", "Hello");
    let id = title.id;
    project.add_layer(title);
    project.set_parameter(ParamTarget::Text(id), true);
    let project_path = dir.path().join("card.pgp");
    save_project(&project, &project_path).unwrap();

    let output = pillowgen().args(["params", "--in"]).arg(&project_path).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("text: str"));

    let status = pillowgen()
        .args(["params", "--in"])
        .arg(dir.path().join("missing.pgp"))
        .status()
        .unwrap();
    assert!(!status.success());
}
