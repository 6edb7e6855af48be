//! Statement-level assertions on the assembled script, independent of
//! rendered whitespace.

use serial_test::serial;
use startgen::{
    BuildManifest, MockFileSystem, ScriptConfig, StartupScriptGenerator, Statement,
};
use std::path::PathBuf;

const APP: &str = "/srv/app";

const PYTHON_VERSION_PROBE: &str =
    "$(python -c \"import sys; print(str(sys.version_info.major) + '.' + str(sys.version_info.minor))\")";

#[test]
#[serial]
fn test_flask_app_with_virtual_env_statement_sequence() {
    let fs = MockFileSystem::with_root(PathBuf::from(APP));
    fs.add_dir(APP);
    fs.add_file("app.py", "app = object()");
    fs.add_dir("antenv");

    let config = ScriptConfig {
        app_path: PathBuf::from(APP),
        bind_port: Some("8080".to_string()),
        virtual_env_name: Some("antenv".to_string()),
        default_app_module: "application:app".to_string(),
        ..Default::default()
    };

    let script = StartupScriptGenerator::new(config, BuildManifest::default(), &fs)
        .with_cpu_count(2)
        .generate()
        .unwrap();

    let expected = vec![
        Statement::Blank,
        Statement::Comment(
            "Enter the source directory to make sure the script runs where the user expects"
                .to_string(),
        ),
        Statement::ChangeDir("/srv/app".to_string()),
        Statement::Blank,
        Statement::Export {
            name: "PORT".to_string(),
            value: "8080".to_string(),
        },
        Statement::Assign {
            name: "PYTHON_VERSION".to_string(),
            value: PYTHON_VERSION_PROBE.to_string(),
        },
        Statement::Echo(
            "Using packages from virtual environment 'antenv' located at '/srv/app/antenv'."
                .to_string(),
        ),
        Statement::Export {
            name: "PYTHONPATH".to_string(),
            value: "$PYTHONPATH:\"/srv/app/antenv/lib/python$PYTHON_VERSION/site-packages\""
                .to_string(),
        },
        Statement::Echo("\"Updated PYTHONPATH to '$PYTHONPATH'\"".to_string()),
        Statement::Run(
            "GUNICORN_CMD_ARGS=\"--timeout 600 --access-logfile '-' --error-logfile '-' \
             --workers=5 --bind=0.0.0.0:8080 --chdir=/srv/app\" gunicorn app:app"
                .to_string(),
        ),
    ];

    assert_eq!(script.statements(), &expected[..]);
}

#[test]
#[serial]
fn test_rendered_text_matches_statement_rendering() {
    let fs = MockFileSystem::with_root(PathBuf::from(APP));
    fs.add_dir(APP);
    fs.add_file("app.py", "app = object()");

    let config = ScriptConfig {
        app_path: PathBuf::from(APP),
        default_app_module: "application:app".to_string(),
        ..Default::default()
    };

    let script = StartupScriptGenerator::new(config, BuildManifest::default(), &fs)
        .with_cpu_count(1)
        .generate()
        .unwrap();

    let mut expected = String::from("#!/bin/sh\n");
    for statement in script.statements() {
        expected.push_str(&statement.render());
        expected.push('\n');
    }
    assert_eq!(script.render(), expected);
}
