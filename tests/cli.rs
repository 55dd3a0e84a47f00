//! Driver tests for `slimc`, running against real files on disk.

#![cfg(feature = "cli")]

use std::io::Write;

use slim::cli::{run, Cli, Emit};

fn write_source(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

#[test]
fn checking_a_valid_file_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source(
        &dir,
        "ok.slim",
        "shared vec3 tint = vec3(1.0, 0.5, 0.25);\nshader fragment { return vec4(tint, 1.0); }\n",
    );

    let cli = Cli {
        file: path,
        emit: Emit::Check,
        json: false,
    };
    assert_eq!(run(&cli), 0);
}

#[test]
fn type_errors_exit_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source(&dir, "bad.slim", "shared float f = 1;\n");

    let cli = Cli {
        file: path,
        emit: Emit::Check,
        json: true,
    };
    assert_eq!(run(&cli), 1);
}

#[test]
fn missing_files_are_an_io_failure() {
    let dir = tempfile::tempdir().unwrap();
    let cli = Cli {
        file: dir.path().join("absent.slim"),
        emit: Emit::Check,
        json: false,
    };
    assert_eq!(run(&cli), 2);
}

#[test]
fn token_and_ast_dumps_run() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source(&dir, "dump.slim", "shared float f = 1.0;\n");

    let tokens = Cli {
        file: path.clone(),
        emit: Emit::Tokens,
        json: false,
    };
    assert_eq!(run(&tokens), 0);

    let ast = Cli {
        file: path,
        emit: Emit::Ast,
        json: false,
    };
    assert_eq!(run(&ast), 0);
}
